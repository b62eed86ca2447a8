use crate::icmp::v4::{DgramSocket, SequenceNumber, TSocket};
use crate::ping_statistics::run_aggregator;
use crate::records::{latency_measurement_channel, LatencyMeasurementSender};
use crate::{Destination, PingError, PingReceiver, PingResult, PingSender, PingStatistics, RequestTracker, Session};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

/// Read failures in a row after which the receiver gives up.
pub const MAX_CONSECUTIVE_RECEIVE_ERRORS: usize = 10;

#[allow(clippy::module_name_repetitions)]
#[derive(Clone, Debug)]
pub struct PingRunnerConfig {
    pub destination: String,
    /// Pause between two echo requests.
    pub interval: Duration,
    /// Socket read timeout. Bounds how long a halt request may go unnoticed by the receiver.
    pub receive_timeout: Duration,
    pub channel_size: usize,
    /// Requests without reply are forgotten after this long.
    pub request_expiry: Duration,
}

impl PingRunnerConfig {
    pub fn new(destination: &str, interval: Duration) -> Self {
        PingRunnerConfig {
            destination: destination.to_owned(),
            interval,
            receive_timeout: Duration::from_secs(1),
            channel_size: 64,
            request_expiry: (interval * 30).max(Duration::from_secs(30)),
        }
    }
}

pub struct PingRunner {
    pings_sent: Arc<AtomicU64>,
    tracker: RequestTracker,
    sender_halt_tx: mpsc::Sender<()>,
    sender_thread: Option<JoinHandle<PingResult<()>>>,
    receiver_halt_tx: mpsc::Sender<()>,
    receiver_thread: Option<JoinHandle<PingResult<()>>>,
    aggregator_thread: Option<JoinHandle<PingStatistics>>,
}

impl PingRunner {
    /// Spawns the sender, the receiver and the statistics aggregator on `session`.
    pub fn start<S>(config: &PingRunnerConfig, session: Session<S>) -> Self
    where
        S: TSocket + 'static,
    {
        let destination = Destination::normalize(&config.destination);
        println!("Begin Pinging {destination}");

        let session = Arc::new(session);
        let tracker = RequestTracker::new();
        let pings_sent = Arc::new(AtomicU64::new(0));
        let (measurement_tx, measurement_rx) = latency_measurement_channel(config.channel_size);

        let aggregator_thread = {
            let pings_sent = pings_sent.clone();
            std::thread::spawn(move || run_aggregator(&measurement_rx, &pings_sent))
        };

        let ping_receiver = PingReceiver::new(session.clone(), tracker.clone());
        let (receiver_halt_tx, receiver_halt_rx) = mpsc::channel::<()>();
        let receiver_thread = Self::start_receiver_thread(ping_receiver, measurement_tx, receiver_halt_rx);

        let ping_sender = PingSender::new(session, tracker.clone(), destination);
        let (sender_halt_tx, sender_halt_rx) = mpsc::channel::<()>();
        let sender_thread = Self::start_sender_thread(
            ping_sender,
            tracker.clone(),
            pings_sent.clone(),
            config.clone(),
            sender_halt_rx,
        );

        PingRunner {
            pings_sent,
            tracker,
            sender_halt_tx,
            sender_thread: Some(sender_thread),
            receiver_halt_tx,
            receiver_thread: Some(receiver_thread),
            aggregator_thread: Some(aggregator_thread),
        }
    }

    pub fn pings_sent(&self) -> u64 {
        self.pings_sent.load(Ordering::SeqCst)
    }

    pub fn pending_requests(&self) -> usize {
        self.tracker.len()
    }

    /// Blocks until the sender or the receiver stops on a fatal error, then shuts the rest down.
    pub fn wait(mut self) -> PingResult<PingStatistics> {
        loop {
            let sender_finished = self.sender_thread.as_ref().map_or(true, JoinHandle::is_finished);
            let receiver_finished = self.receiver_thread.as_ref().map_or(true, JoinHandle::is_finished);
            if sender_finished || receiver_finished {
                break;
            }
            std::thread::sleep(Duration::from_millis(50));
        }
        self.shutdown()
    }

    /// Stops sending and receiving and returns the final statistics.
    pub fn halt(mut self) -> PingResult<PingStatistics> {
        self.shutdown()
    }

    fn shutdown(&mut self) -> PingResult<PingStatistics> {
        // mpsc::Sender::send() returns error only if mpsc::Receiver is closed.
        let _maybe_err_1 = self.sender_halt_tx.send(());
        let _maybe_err_2 = self.receiver_halt_tx.send(());

        let sender_result = join(self.sender_thread.take());
        // The receiver owns the last measurement sender; once it is gone the aggregator ends.
        let receiver_result = join(self.receiver_thread.take());
        let statistics = match self.aggregator_thread.take() {
            Some(handle) => handle.join().map_err(|_| thread_panicked("aggregator"))?,
            None => PingStatistics::new(),
        };

        sender_result?;
        receiver_result?;
        Ok(statistics)
    }

    fn start_receiver_thread<S>(
        ping_receiver: PingReceiver<S>,
        measurement_tx: LatencyMeasurementSender,
        halt_rx: mpsc::Receiver<()>,
    ) -> JoinHandle<PingResult<()>>
    where
        S: TSocket + 'static,
    {
        std::thread::spawn(move || {
            tracing::trace!("PingReceiver thread start");
            let mut consecutive_errors = 0;
            loop {
                match ping_receiver.await_one_reply() {
                    Ok(Some(measurement)) => {
                        consecutive_errors = 0;
                        measurement_tx.send(measurement)?;
                    }
                    Ok(None) => consecutive_errors = 0,
                    Err(e) => {
                        consecutive_errors += 1;
                        if consecutive_errors >= MAX_CONSECUTIVE_RECEIVE_ERRORS {
                            tracing::debug!("giving up after {consecutive_errors} failed reads in a row");
                            return Err(e);
                        }
                        tracing::warn!("receive failed: {e}");
                    }
                }

                // Check termination.
                match halt_rx.try_recv() {
                    Ok(()) | Err(mpsc::TryRecvError::Disconnected) => break,
                    Err(mpsc::TryRecvError::Empty) => {}
                }
            }
            tracing::trace!("PingReceiver thread end");
            Ok(())
        })
    }

    fn start_sender_thread<S>(
        ping_sender: PingSender<S>,
        tracker: RequestTracker,
        pings_sent: Arc<AtomicU64>,
        config: PingRunnerConfig,
        halt_rx: mpsc::Receiver<()>,
    ) -> JoinHandle<PingResult<()>>
    where
        S: TSocket + 'static,
    {
        std::thread::spawn(move || {
            tracing::trace!("PingSender thread start");
            let mut sequence_number: Option<SequenceNumber> = None;
            loop {
                let next = sequence_number.map_or_else(SequenceNumber::start_value, SequenceNumber::next);
                sequence_number = Some(next);

                // (1) Count first so a reply never sees a smaller denominator than its request.
                pings_sent.fetch_add(1, Ordering::SeqCst);
                match ping_sender.cycle(next) {
                    Err(e) if e.is_fatal() => return Err(e),
                    Err(e) => tracing::warn!("sending icmp_seq={next} failed: {e}"),
                    Ok(()) => {}
                }

                // (2) Forget requests that will not be answered anymore.
                let evicted = tracker.evict_older_than(config.request_expiry, Instant::now());
                if evicted > 0 {
                    tracing::trace!("evicted {evicted} unanswered requests");
                }

                // (3) Sleep, or stop when halted.
                match halt_rx.recv_timeout(config.interval) {
                    Ok(()) | Err(mpsc::RecvTimeoutError::Disconnected) => break,
                    Err(mpsc::RecvTimeoutError::Timeout) => {}
                }
            }
            tracing::trace!("PingSender thread end");
            Ok(())
        })
    }
}

impl Drop for PingRunner {
    fn drop(&mut self) {
        if self.sender_thread.is_some() || self.receiver_thread.is_some() {
            let _ = self.shutdown();
        }
    }
}

fn join(handle: Option<JoinHandle<PingResult<()>>>) -> PingResult<()> {
    match handle {
        Some(handle) => handle.join().map_err(|_| thread_panicked("ping"))?,
        None => Ok(()),
    }
}

fn thread_panicked(name: &str) -> PingError {
    PingError::Io(std::io::Error::new(std::io::ErrorKind::Other, format!("{name} thread panicked")))
}

/// Pings `destination` every `wait_millis` milliseconds until a fatal error occurs.
pub fn start_pinging(destination: &str, wait_millis: u64) -> PingResult<()> {
    let config = PingRunnerConfig::new(destination, Duration::from_millis(wait_millis));
    let session = Session::<DgramSocket>::open(config.receive_timeout)?;
    let ping_runner = PingRunner::start(&config, session);
    ping_runner.wait().map(|_| ())
}
