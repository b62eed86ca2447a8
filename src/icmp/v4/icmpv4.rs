use crate::icmp::v4::SequenceNumber;
use crate::PingError;
use pnet_packet::icmp::{
    echo_reply::EchoReplyPacket,
    echo_request::{EchoRequestPacket, MutableEchoRequestPacket},
    IcmpCode, IcmpPacket, IcmpTypes,
};
use pnet_packet::Packet;

pub(crate) const PAYLOAD_SIZE: usize = 56;

/// Identifier and sequence number of an ICMP echo message.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Echo {
    pub identifier: u16,
    pub sequence_number: SequenceNumber,
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum IcmpMessage {
    EchoRequest(Echo),
    EchoReply(Echo),
    Unexpected { icmp_type: u8, icmp_code: u8 },
}

/// Identifier of this process's echo requests. The kernel may replace it on datagram sockets.
#[allow(clippy::cast_possible_truncation)]
pub(crate) fn echo_identifier() -> u16 {
    (std::process::id() & 0xffff) as u16
}

pub(crate) fn encode_echo_request(
    identifier: u16,
    sequence_number: SequenceNumber,
    payload: &[u8],
) -> Result<Vec<u8>, PingError> {
    let buf = vec![0u8; EchoRequestPacket::minimum_packet_size() + payload.len()];
    let mut package = MutableEchoRequestPacket::owned(buf)
        .ok_or_else(|| PingError::Encoding("buffer too small for echo request".to_owned()))?;
    package.set_icmp_type(IcmpTypes::EchoRequest);
    package.set_icmp_code(IcmpCode::new(0));
    package.set_identifier(identifier);
    package.set_sequence_number(sequence_number.into());
    package.set_payload(payload);

    package.set_checksum(0_u16);
    let icmp_package = IcmpPacket::new(package.packet())
        .ok_or_else(|| PingError::Encoding("could not view echo request as ICMP package".to_owned()))?;
    let checksum = pnet_packet::icmp::checksum(&icmp_package);
    package.set_checksum(checksum);
    Ok(package.packet().to_vec())
}

pub(crate) fn decode_message(bytes: &[u8]) -> Result<IcmpMessage, PingError> {
    let icmp_package = IcmpPacket::new(bytes)
        .ok_or_else(|| PingError::Decoding(format!("{} bytes are too short for an ICMP header", bytes.len())))?;
    let icmp_type = icmp_package.get_icmp_type();

    if icmp_type == IcmpTypes::EchoReply {
        let package = EchoReplyPacket::new(bytes)
            .ok_or_else(|| PingError::Decoding(format!("{} bytes are too short for an echo reply", bytes.len())))?;
        Ok(IcmpMessage::EchoReply(Echo {
            identifier: package.get_identifier(),
            sequence_number: package.get_sequence_number().into(),
        }))
    } else if icmp_type == IcmpTypes::EchoRequest {
        let package = EchoRequestPacket::new(bytes)
            .ok_or_else(|| PingError::Decoding(format!("{} bytes are too short for an echo request", bytes.len())))?;
        Ok(IcmpMessage::EchoRequest(Echo {
            identifier: package.get_identifier(),
            sequence_number: package.get_sequence_number().into(),
        }))
    } else {
        Ok(IcmpMessage::Unexpected { icmp_type: icmp_type.0, icmp_code: icmp_package.get_icmp_code().0 })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::icmp::v4::tests::echo_reply_for;

    #[test]
    fn encoded_request_is_type_8_code_0_with_payload() {
        let bytes = encode_echo_request(0x1234, SequenceNumber::from(7), &[0u8; PAYLOAD_SIZE]).unwrap();

        assert_eq!(EchoRequestPacket::minimum_packet_size() + PAYLOAD_SIZE, bytes.len());
        assert_eq!(8, bytes[0]);
        assert_eq!(0, bytes[1]);
    }

    #[test]
    fn encoded_request_has_valid_checksum() {
        let bytes = encode_echo_request(1, SequenceNumber::start_value(), &[0xAB; PAYLOAD_SIZE]).unwrap();
        let package = IcmpPacket::new(&bytes).unwrap();

        assert_eq!(package.get_checksum(), pnet_packet::icmp::checksum(&package));
    }

    #[test]
    fn decoding_an_encoded_request_recovers_identifier_and_sequence_number() {
        let bytes = encode_echo_request(0xBEEF, SequenceNumber::from(513), &[0u8; PAYLOAD_SIZE]).unwrap();

        let message = decode_message(&bytes).unwrap();

        assert_eq!(
            IcmpMessage::EchoRequest(Echo { identifier: 0xBEEF, sequence_number: SequenceNumber::from(513) }),
            message
        );
    }

    #[test]
    fn decoding_a_reply_recovers_identifier_and_sequence_number() {
        let request = encode_echo_request(0xBEEF, SequenceNumber::from(9), &[0u8; PAYLOAD_SIZE]).unwrap();
        let reply = echo_reply_for(&request);

        let message = decode_message(&reply).unwrap();

        assert_eq!(
            IcmpMessage::EchoReply(Echo { identifier: 0xBEEF, sequence_number: SequenceNumber::from(9) }),
            message
        );
    }

    #[test]
    fn destination_unreachable_is_unexpected() {
        // type 3 (destination unreachable), code 3 (port unreachable)
        let bytes = [3u8, 3, 0, 0, 0, 0, 0, 0];

        let message = decode_message(&bytes).unwrap();

        assert_eq!(IcmpMessage::Unexpected { icmp_type: 3, icmp_code: 3 }, message);
    }

    #[test]
    fn too_short_datagram_fails_to_decode() {
        assert!(matches!(decode_message(&[0u8, 0]), Err(PingError::Decoding(_))));
        assert!(matches!(decode_message(&[]), Err(PingError::Decoding(_))));
    }

    #[test]
    fn truncated_echo_reply_fails_to_decode() {
        assert!(matches!(decode_message(&[0u8, 0, 0, 0, 0]), Err(PingError::Decoding(_))));
    }

    #[test]
    fn echo_identifier_is_derived_from_process_id() {
        assert_eq!((std::process::id() & 0xffff) as u16, echo_identifier());
    }
}
