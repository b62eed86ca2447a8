use crate::icmp::v4::{decode_message, IcmpMessage, TSocket, MAX_ICMP_MESSAGE_SIZE};
use crate::{EchoReply, LatencyMeasurement, PingResult, RequestTracker, Session};
use std::sync::Arc;
use std::time::Instant;

pub(crate) struct PingReceiver<S> {
    session: Arc<Session<S>>,
    tracker: RequestTracker,
}

impl<S> PingReceiver<S>
where
    S: TSocket + 'static,
{
    pub(crate) fn new(session: Arc<Session<S>>, tracker: RequestTracker) -> Self {
        PingReceiver { session, tracker }
    }

    /// Reads one datagram and turns it into a measurement if it answers a known request.
    ///
    /// Only socket errors are returned. Timeouts, malformed datagrams, other ICMP types and
    /// replies to unknown requests yield `Ok(None)`.
    pub(crate) fn await_one_reply(&self) -> PingResult<Option<LatencyMeasurement>> {
        // (1) Receive on socket.
        let Some((bytes, source)) = self.session.receive(MAX_ICMP_MESSAGE_SIZE)? else {
            return Ok(None);
        };
        let receive_time = Instant::now();
        tracing::trace!("icmpv4 received {} bytes", bytes.len());

        // (2) Decode.
        let reply = match decode_message(&bytes) {
            Ok(IcmpMessage::EchoReply(echo)) => EchoReply { source, sequence_number: echo.sequence_number },
            Ok(IcmpMessage::EchoRequest(echo)) => {
                tracing::warn!("Received unexpected echo request from {source} (icmp_seq={})", echo.sequence_number);
                return Ok(None);
            }
            Ok(IcmpMessage::Unexpected { icmp_type, icmp_code }) => {
                tracing::warn!("Received unexpected response from {source}, expected echo (type={icmp_type} code={icmp_code})");
                return Ok(None);
            }
            Err(e) => {
                tracing::warn!("discarding datagram from {source}: {e}");
                return Ok(None);
            }
        };

        // (3) Match with the request.
        let Some(request) = self.tracker.lookup(reply.sequence_number) else {
            tracing::warn!("discarding echo reply from {} with unknown icmp_seq={}", reply.source, reply.sequence_number);
            return Ok(None);
        };
        let measurement = LatencyMeasurement {
            sequence_number: reply.sequence_number,
            round_trip_time: receive_time.saturating_duration_since(request.send_time),
        };
        println!(
            "Received Echo from {}: icmp_seq={} time={:.2} ms",
            reply.source.ip(),
            reply.sequence_number,
            measurement.as_millis_f64()
        );
        Ok(Some(measurement))
    }
}
