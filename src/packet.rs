//! SDN-WISE Packet Codec
//!
//! Translates between the fixed binary wire layout and an in-memory
//! packet. Stateless.
//!
//! # Wire layout (big-endian, minimum 7 bytes)
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 1 | declared length (informational, never bounds parsing) |
//! | 1 | 1 | type tag |
//! | 2 | 2 | destination address |
//! | 4 | 2 | source address |
//! | 6 | 1 | time-to-live |
//! | 7+ | varies | type-specific payload |
//!
//! Decoding is permissive: unknown type tags decode successfully, and a
//! buffer long enough for the header but too short for a type's payload
//! simply yields a packet without that body.

use crate::error::AgentError;
use crate::flow::FlowAction;

/// Minimum wire header size
pub const MIN_HEADER_LEN: usize = 7;

/// Minimum total length carrying a full FLOW_RULE body
pub const FLOW_RULE_MIN_LEN: usize = 14;

/// SDN-WISE type tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PacketType {
    /// Sensor data to be forwarded by the flow table
    Data,
    /// Neighbor beacon
    Beacon,
    /// Telemetry report
    Report,
    /// Rule request toward the controller
    Request,
    /// Controller response
    Response,
    /// Path setup
    OpenPath,
    /// Node configuration
    Config,
    /// Proxy registration
    RegProxy,
    /// Flow rule installation
    FlowRule,
    /// Tag outside the known set; decoded, then ignored by the dispatcher
    Unknown(u8),
}

impl PacketType {
    /// Parse a wire type tag; never fails
    pub fn from_wire(tag: u8) -> Self {
        match tag {
            0x01 => Self::Data,
            0x02 => Self::Beacon,
            0x03 => Self::Report,
            0x04 => Self::Request,
            0x05 => Self::Response,
            0x06 => Self::OpenPath,
            0x10 => Self::Config,
            0x11 => Self::RegProxy,
            0x12 => Self::FlowRule,
            other => Self::Unknown(other),
        }
    }

    /// Wire tag for this type
    pub fn to_wire(self) -> u8 {
        match self {
            Self::Data => 0x01,
            Self::Beacon => 0x02,
            Self::Report => 0x03,
            Self::Request => 0x04,
            Self::Response => 0x05,
            Self::OpenPath => 0x06,
            Self::Config => 0x10,
            Self::RegProxy => 0x11,
            Self::FlowRule => 0x12,
            Self::Unknown(other) => other,
        }
    }
}

/// Body of a FLOW_RULE packet (bytes 7..10)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRuleBody {
    /// Action to install
    pub action: FlowAction,
    /// Next hop for `FlowAction::Forward`
    pub next_hop: u16,
}

/// Decoded wire packet (transient, never persisted)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Packet {
    /// Declared payload length byte; carried, never trusted
    pub declared_len: u8,
    /// Type tag
    pub packet_type: PacketType,
    /// Destination node address
    pub dst_addr: u16,
    /// Source node address
    pub src_addr: u16,
    /// Time-to-live, carried but not enforced here
    pub ttl: u8,
    /// Flow-rule body, present only for FLOW_RULE packets whose buffer
    /// carried the full payload with an intelligible action byte
    pub rule: Option<FlowRuleBody>,
}

/// Decode a wire buffer
///
/// Fails only when the buffer is shorter than [`MIN_HEADER_LEN`]; no other
/// validation is performed.
pub fn decode(buf: &[u8]) -> Result<Packet, AgentError> {
    if buf.len() < MIN_HEADER_LEN {
        return Err(AgentError::Malformed {
            len: buf.len(),
            min: MIN_HEADER_LEN,
        });
    }

    let packet_type = PacketType::from_wire(buf[1]);

    let rule = if packet_type == PacketType::FlowRule && buf.len() >= FLOW_RULE_MIN_LEN {
        FlowAction::from_wire(buf[7]).map(|action| FlowRuleBody {
            action,
            next_hop: u16::from_be_bytes([buf[8], buf[9]]),
        })
    } else {
        None
    };

    Ok(Packet {
        declared_len: buf[0],
        packet_type,
        dst_addr: u16::from_be_bytes([buf[2], buf[3]]),
        src_addr: u16::from_be_bytes([buf[4], buf[5]]),
        ttl: buf[6],
        rule,
    })
}

/// Write the 7-byte wire header into `buf`
///
/// `buf` must hold at least [`MIN_HEADER_LEN`] bytes; payload bytes beyond
/// the header are the caller's business.
pub fn encode_header(
    buf: &mut [u8],
    declared_len: u8,
    packet_type: PacketType,
    dst_addr: u16,
    src_addr: u16,
    ttl: u8,
) {
    buf[0] = declared_len;
    buf[1] = packet_type.to_wire();
    buf[2..4].copy_from_slice(&dst_addr.to_be_bytes());
    buf[4..6].copy_from_slice(&src_addr.to_be_bytes());
    buf[6] = ttl;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_too_short() {
        for len in 0..MIN_HEADER_LEN {
            let buf = vec![0u8; len];
            assert!(matches!(
                decode(&buf),
                Err(AgentError::Malformed { len: l, min: 7 }) if l == len
            ));
        }
    }

    #[test]
    fn test_decode_minimal_header() {
        let buf = [7, 0x01, 0x00, 0x05, 0x00, 0x03, 64];
        let pkt = decode(&buf).unwrap();

        assert_eq!(pkt.declared_len, 7);
        assert_eq!(pkt.packet_type, PacketType::Data);
        assert_eq!(pkt.dst_addr, 5);
        assert_eq!(pkt.src_addr, 3);
        assert_eq!(pkt.ttl, 64);
        assert!(pkt.rule.is_none());
    }

    #[test]
    fn test_decode_big_endian_addresses() {
        let buf = [7, 0x01, 0xAB, 0xCD, 0x12, 0x34, 1];
        let pkt = decode(&buf).unwrap();
        assert_eq!(pkt.dst_addr, 0xABCD);
        assert_eq!(pkt.src_addr, 0x1234);
    }

    #[test]
    fn test_decode_unknown_type() {
        let buf = [7, 0x7F, 0, 1, 0, 2, 1];
        let pkt = decode(&buf).unwrap();
        assert_eq!(pkt.packet_type, PacketType::Unknown(0x7F));
    }

    #[test]
    fn test_decode_flow_rule_body() {
        let mut buf = [0u8; 14];
        encode_header(&mut buf, 14, PacketType::FlowRule, 7, 3, 10);
        buf[7] = 1; // FORWARD
        buf[8..10].copy_from_slice(&0x0042u16.to_be_bytes());

        let pkt = decode(&buf).unwrap();
        let body = pkt.rule.unwrap();
        assert_eq!(body.action, FlowAction::Forward);
        assert_eq!(body.next_hop, 0x0042);
    }

    #[test]
    fn test_decode_flow_rule_short_payload() {
        // Header fits but the rule body does not; not an error.
        let mut buf = [0u8; 13];
        encode_header(&mut buf, 14, PacketType::FlowRule, 7, 3, 10);
        buf[7] = 1;

        let pkt = decode(&buf).unwrap();
        assert_eq!(pkt.packet_type, PacketType::FlowRule);
        assert!(pkt.rule.is_none());
    }

    #[test]
    fn test_decode_flow_rule_bad_action() {
        let mut buf = [0u8; 14];
        encode_header(&mut buf, 14, PacketType::FlowRule, 7, 3, 10);
        buf[7] = 9;

        let pkt = decode(&buf).unwrap();
        assert!(pkt.rule.is_none());
    }

    #[test]
    fn test_type_tag_round_trip() {
        for tag in [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x10, 0x11, 0x12, 0x55] {
            assert_eq!(PacketType::from_wire(tag).to_wire(), tag);
        }
    }
}
