#![warn(rust_2018_idioms)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub use destination::{Destination, DEFAULT_ECHO_PORT};
pub use icmp::v4::{DgramSocket, SequenceNumber, TSocket};
pub use ping_error::{GenericError, PingError, PingResult};
pub use ping_runner::*;
pub use ping_statistics::PingStatistics;
pub use records::{EchoReply, EchoRequest, LatencyMeasurement};
pub use request_tracker::RequestTracker;
pub use session::Session;

use ping_receiver::PingReceiver;
use ping_sender::PingSender;

mod destination;
mod icmp;
mod ping_error;
mod ping_receiver;
mod ping_runner;
mod ping_sender;
mod ping_statistics;
mod records;
mod request_tracker;
mod session;
