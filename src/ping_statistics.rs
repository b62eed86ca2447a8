use crate::records::LatencyMeasurementReceiver;
use crate::LatencyMeasurement;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Running round-trip statistics, updated once per matched reply.
#[derive(Clone, Debug, PartialEq)]
pub struct PingStatistics {
    /// Sent counter as read when the last measurement was recorded.
    pub pings_sent: u64,
    pub pings_received: u64,
    pub min_latency_ms: f64,
    pub max_latency_ms: f64,
    pub avg_latency_ms: f64,
}

impl Default for PingStatistics {
    fn default() -> Self {
        PingStatistics {
            pings_sent: 0,
            pings_received: 0,
            min_latency_ms: f64::MAX,
            max_latency_ms: 0.0,
            avg_latency_ms: 0.0,
        }
    }
}

impl PingStatistics {
    pub fn new() -> Self {
        Self::default()
    }

    #[allow(clippy::cast_precision_loss)]
    pub fn record(&mut self, measurement: &LatencyMeasurement, pings_sent: u64) {
        let latency_ms = measurement.as_millis_f64();
        self.pings_sent = pings_sent;
        self.pings_received += 1;
        self.min_latency_ms = self.min_latency_ms.min(latency_ms);
        self.max_latency_ms = self.max_latency_ms.max(latency_ms);
        let n = self.pings_received as f64;
        self.avg_latency_ms = (self.avg_latency_ms * (n - 1.0) + latency_ms) / n;
    }

    /// Received over sent, in percent. Zero before anything was sent.
    #[allow(clippy::cast_precision_loss)]
    pub fn success_rate(&self) -> f64 {
        if self.pings_sent == 0 {
            return 0.0;
        }
        self.pings_received as f64 / self.pings_sent as f64 * 100.0
    }
}

impl fmt::Display for PingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Sent: {}  Received: {}", self.pings_sent, self.pings_received)?;
        writeln!(f, "Success Rate: {:.2} %", self.success_rate())?;
        write!(
            f,
            "round-trip Max/Min/Avg = {:.2} / {:.2} / {:.2} ms",
            self.max_latency_ms, self.min_latency_ms, self.avg_latency_ms
        )
    }
}

/// Drains measurements until every sender is gone, printing a snapshot after each one.
pub(crate) fn run_aggregator(measurement_rx: &LatencyMeasurementReceiver, pings_sent: &Arc<AtomicU64>) -> PingStatistics {
    let mut statistics = PingStatistics::new();
    for measurement in measurement_rx {
        statistics.record(&measurement, pings_sent.load(Ordering::SeqCst));
        println!("{statistics}");
    }
    tracing::trace!("measurement channel closed, aggregator done");
    statistics
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icmp::v4::SequenceNumber;
    use crate::records::latency_measurement_channel;
    use std::time::Duration;

    fn measurement(millis: u64) -> LatencyMeasurement {
        LatencyMeasurement {
            sequence_number: SequenceNumber::start_value(),
            round_trip_time: Duration::from_millis(millis),
        }
    }

    fn assert_close(expected: f64, actual: f64) {
        assert!((expected - actual).abs() < 1e-9, "expected {expected}, got {actual}");
    }

    #[test]
    fn min_max_avg_over_a_sequence() {
        let latencies = [12u64, 3, 7, 30, 8];
        let mut statistics = PingStatistics::new();
        for latency in latencies {
            statistics.record(&measurement(latency), 5);
        }

        assert_eq!(5, statistics.pings_received);
        assert_close(3.0, statistics.min_latency_ms);
        assert_close(30.0, statistics.max_latency_ms);
        assert_close(12.0, statistics.avg_latency_ms);
    }

    #[test]
    fn single_measurement_is_min_max_and_avg() {
        let mut statistics = PingStatistics::new();
        statistics.record(&measurement(5), 1);

        assert_close(5.0, statistics.min_latency_ms);
        assert_close(5.0, statistics.max_latency_ms);
        assert_close(5.0, statistics.avg_latency_ms);
    }

    #[test]
    fn success_rate_uses_sent_counter_at_record_time() {
        let mut statistics = PingStatistics::new();
        statistics.record(&measurement(1), 4);
        assert_close(25.0, statistics.success_rate());

        statistics.record(&measurement(1), 4);
        assert_close(50.0, statistics.success_rate());

        statistics.record(&measurement(1), 6);
        assert_close(50.0, statistics.success_rate());
    }

    #[test]
    fn success_rate_without_sent_pings_is_zero() {
        assert_close(0.0, PingStatistics::new().success_rate());
    }

    #[test]
    fn snapshot_format() {
        let mut statistics = PingStatistics::new();
        statistics.record(&measurement(2), 3);
        statistics.record(&measurement(4), 3);

        assert_eq!(
            "Sent: 3  Received: 2\nSuccess Rate: 66.67 %\nround-trip Max/Min/Avg = 4.00 / 2.00 / 3.00 ms",
            format!("{statistics}")
        );
    }

    #[test]
    fn aggregator_drains_channel_until_closed() {
        let (tx, rx) = latency_measurement_channel(8);
        let pings_sent = Arc::new(AtomicU64::new(4));
        for latency in [10u64, 20, 30] {
            tx.send(measurement(latency)).unwrap();
        }
        drop(tx);

        let statistics = run_aggregator(&rx, &pings_sent);

        assert_eq!(3, statistics.pings_received);
        assert_eq!(4, statistics.pings_sent);
        assert_close(10.0, statistics.min_latency_ms);
        assert_close(30.0, statistics.max_latency_ms);
        assert_close(20.0, statistics.avg_latency_ms);
        assert_close(75.0, statistics.success_rate());
    }
}
