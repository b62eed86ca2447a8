use crate::icmp::v4::SequenceNumber;
use crate::Destination;
use std::net::SocketAddr;
use std::sync::mpsc;
use std::time::{Duration, Instant};

/// One echo request as the sender saw it. Never mutated after creation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EchoRequest {
    pub destination: Destination,
    pub sequence_number: SequenceNumber,
    pub send_time: Instant,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EchoReply {
    pub source: SocketAddr,
    pub sequence_number: SequenceNumber,
}

/// Round-trip time of one matched reply.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LatencyMeasurement {
    pub sequence_number: SequenceNumber,
    pub round_trip_time: Duration,
}

impl LatencyMeasurement {
    #[allow(clippy::cast_precision_loss)]
    pub fn as_millis_f64(&self) -> f64 {
        self.round_trip_time.as_nanos() as f64 / 1e6
    }
}

pub(crate) type LatencyMeasurementSender = mpsc::SyncSender<LatencyMeasurement>;
pub(crate) type LatencyMeasurementReceiver = mpsc::Receiver<LatencyMeasurement>;
pub(crate) fn latency_measurement_channel(channel_size: usize) -> (LatencyMeasurementSender, LatencyMeasurementReceiver) {
    mpsc::sync_channel::<LatencyMeasurement>(channel_size)
}
