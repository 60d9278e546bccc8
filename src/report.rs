//! Telemetry Reporter
//!
//! Builds the fixed 20-byte REPORT packet the controller collects from
//! every sensor node. Sinks never report.

use tracing::info;

use crate::agent::NodeRole;
use crate::packet::{encode_header, PacketType};
use crate::stats::NodeStats;

/// Fixed report packet size
pub const REPORT_LEN: usize = 20;

/// Declared-length byte of a report; fixed, independent of payload use
pub const REPORT_DECLARED_LEN: u8 = 20;

/// Offset of the `packets_sent` counter within the report
pub const REPORT_SENT_OFFSET: usize = 7;

/// Build one telemetry report and bump `packets_sent`
///
/// Bytes 2-3 carry the emitting node's address (the header's destination
/// slot, where the controller parses it from), bytes 7-10 the pre-call
/// `packets_sent` as u32 big-endian; remaining bytes are reserved zero.
/// Returns `None` when role = Sink, leaving the counters untouched.
pub fn build_report(
    node_addr: u16,
    role: NodeRole,
    stats: &mut NodeStats,
) -> Option<[u8; REPORT_LEN]> {
    if role == NodeRole::Sink {
        return None;
    }

    let mut buf = [0u8; REPORT_LEN];
    encode_header(
        &mut buf,
        REPORT_DECLARED_LEN,
        PacketType::Report,
        node_addr,
        0,
        0,
    );
    buf[REPORT_SENT_OFFSET..REPORT_SENT_OFFSET + 4]
        .copy_from_slice(&stats.packets_sent().to_be_bytes());

    let snap = stats.snapshot();
    info!(
        node_addr,
        packets_sent = snap.packets_sent,
        packets_received = snap.packets_received,
        "report built"
    );

    stats.record_sent();
    Some(buf)
}
