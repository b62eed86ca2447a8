mod icmpv4;
pub(crate) use icmpv4::{decode_message, echo_identifier, encode_echo_request, IcmpMessage, PAYLOAD_SIZE};

mod sequence_number;
pub use sequence_number::SequenceNumber;

mod socket;
pub use socket::dgram_socket::DgramSocket;
pub use socket::TSocket;
pub(crate) use socket::MAX_ICMP_MESSAGE_SIZE;
