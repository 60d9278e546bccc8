//! Packet Dispatcher and agent state
//!
//! `WiseAgent` owns the flow table, the counters, and this node's
//! identity, and turns decoded packets into forwarding decisions. It never
//! transmits: decisions are handed back to the caller-owned transport.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::AgentError;
use crate::flow::{FlowAction, FlowTable};
use crate::packet::{Packet, PacketType};
use crate::report;
use crate::stats::{NodeStats, StatsSnapshot};

/// Role of this node in the sensor network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeRole {
    /// Ordinary sensing/forwarding node
    Sensor,
    /// Data collector / controller attachment point; emits no telemetry
    Sink,
}

/// Outcome of dispatching one packet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// DATA matched a rule; the transport should deliver to this next hop
    Forwarded(u16),
    /// DATA matched nothing; escalation is observational only
    Dropped,
    /// FLOW_RULE installed into the table
    RuleInstalled,
    /// CONFIG acknowledged, uninterpreted
    ConfigurationNoted,
    /// Reserved for sink-side report intake; `dispatch` does not yet
    /// produce it — inbound REPORT packets are ignored like the other
    /// unhandled tags
    ReportNoted,
    /// Anything else, including rejected or truncated FLOW_RULE packets
    Ignored(PacketType),
}

/// Forwarding agent for one sensor node
pub struct WiseAgent {
    node_addr: u16,
    role: NodeRole,
    flows: FlowTable,
    stats: NodeStats,
}

impl WiseAgent {
    /// Create an agent with zeroed counters and an empty flow table
    pub fn new(node_addr: u16, role: NodeRole, flow_capacity: usize) -> Self {
        info!(node_addr, ?role, flow_capacity, "agent initialized");
        Self {
            node_addr,
            role,
            flows: FlowTable::new(flow_capacity),
            stats: NodeStats::new(),
        }
    }

    /// This node's 16-bit address
    pub fn node_addr(&self) -> u16 {
        self.node_addr
    }

    /// This node's role
    pub fn role(&self) -> NodeRole {
        self.role
    }

    /// Install a forwarding rule directly, bypassing the wire path
    pub fn install_rule(
        &mut self,
        src_addr: u16,
        dst_addr: u16,
        action: FlowAction,
        next_hop: u16,
    ) -> Result<(), AgentError> {
        self.flows.add(src_addr, dst_addr, action, next_hop)
    }

    /// Dispatch one decoded packet
    ///
    /// Counts the packet as received exactly once, then branches on type.
    /// Malformed buffers never reach this point; truncated or unsupported
    /// packets are a one-shot no-op.
    pub fn dispatch(&mut self, pkt: &Packet) -> Decision {
        self.stats.record_received();
        debug!(
            ty = ?pkt.packet_type,
            src = pkt.src_addr,
            dst = pkt.dst_addr,
            ttl = pkt.ttl,
            "rx"
        );

        match pkt.packet_type {
            PacketType::FlowRule => match pkt.rule {
                Some(body) => {
                    match self
                        .flows
                        .add(pkt.src_addr, pkt.dst_addr, body.action, body.next_hop)
                    {
                        Ok(()) => Decision::RuleInstalled,
                        // Bounded table, lossy install: the rejected rule
                        // is logged by the table and not escalated.
                        Err(_) => Decision::Ignored(PacketType::FlowRule),
                    }
                }
                None => {
                    warn!(src = pkt.src_addr, dst = pkt.dst_addr, "flow rule without full body");
                    Decision::Ignored(PacketType::FlowRule)
                }
            },

            PacketType::Data => match self.flows.lookup(pkt.src_addr, pkt.dst_addr) {
                Some(rule) => {
                    rule.hit_count += 1;
                    let next_hop = rule.next_hop;
                    self.stats.record_forwarded();
                    debug!(next_hop, "forwarding");
                    Decision::Forwarded(next_hop)
                }
                None => {
                    self.stats.record_dropped();
                    warn!(
                        src = pkt.src_addr,
                        dst = pkt.dst_addr,
                        "no flow rule, would ask controller"
                    );
                    Decision::Dropped
                }
            },

            PacketType::Config => {
                info!("configuration packet received");
                Decision::ConfigurationNoted
            }

            other => {
                debug!(ty = ?other, "unhandled packet type");
                Decision::Ignored(other)
            }
        }
    }

    /// Build the periodic telemetry report
    ///
    /// Returns `None` (without touching counters) when this node is the
    /// sink; otherwise yields the fixed 20-byte report and bumps
    /// `packets_sent`.
    pub fn build_report(&mut self) -> Option<[u8; report::REPORT_LEN]> {
        report::build_report(self.node_addr, self.role, &mut self.stats)
    }

    /// Current counter values
    pub fn snapshot_statistics(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    /// Active rule count
    pub fn flow_count(&self) -> usize {
        self.flows.len()
    }

    /// Flow table capacity
    pub fn flow_capacity(&self) -> usize {
        self.flows.capacity()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::{decode, encode_header, FLOW_RULE_MIN_LEN};

    fn sensor() -> WiseAgent {
        WiseAgent::new(0x0001, NodeRole::Sensor, 10)
    }

    fn data_packet(src: u16, dst: u16) -> Packet {
        let mut buf = [0u8; 7];
        encode_header(&mut buf, 7, PacketType::Data, dst, src, 32);
        decode(&buf).unwrap()
    }

    fn flow_rule_packet(src: u16, dst: u16, action: u8, next_hop: u16) -> Packet {
        let mut buf = [0u8; FLOW_RULE_MIN_LEN];
        encode_header(&mut buf, 14, PacketType::FlowRule, dst, src, 32);
        buf[7] = action;
        buf[8..10].copy_from_slice(&next_hop.to_be_bytes());
        decode(&buf).unwrap()
    }

    #[test]
    fn test_data_miss_drops() {
        let mut agent = sensor();
        assert_eq!(agent.dispatch(&data_packet(3, 5)), Decision::Dropped);

        let snap = agent.snapshot_statistics();
        assert_eq!(snap.packets_received, 1);
        assert_eq!(snap.packets_dropped, 1);
        assert_eq!(snap.packets_forwarded, 0);
        assert_eq!(snap.packets_sent, 0);
        assert_eq!(agent.flow_count(), 0);
    }

    #[test]
    fn test_flow_rule_then_data_forwards() {
        let mut agent = sensor();
        assert_eq!(
            agent.dispatch(&flow_rule_packet(3, 5, 1, 0x0042)),
            Decision::RuleInstalled
        );
        assert_eq!(
            agent.dispatch(&data_packet(3, 5)),
            Decision::Forwarded(0x0042)
        );

        let snap = agent.snapshot_statistics();
        assert_eq!(snap.packets_received, 2);
        assert_eq!(snap.packets_forwarded, 1);
        assert_eq!(snap.packets_dropped, 0);
    }

    #[test]
    fn test_flow_rule_table_full_is_lossy() {
        let mut agent = WiseAgent::new(1, NodeRole::Sensor, 1);
        assert_eq!(
            agent.dispatch(&flow_rule_packet(3, 5, 1, 9)),
            Decision::RuleInstalled
        );
        assert_eq!(
            agent.dispatch(&flow_rule_packet(4, 6, 1, 9)),
            Decision::Ignored(PacketType::FlowRule)
        );
        assert_eq!(agent.flow_count(), 1);
    }

    #[test]
    fn test_flow_rule_short_body_ignored() {
        let mut agent = sensor();
        // Header only: the codec leaves the rule body absent.
        let mut buf = [0u8; 7];
        encode_header(&mut buf, 14, PacketType::FlowRule, 5, 3, 32);
        let pkt = decode(&buf).unwrap();

        assert_eq!(agent.dispatch(&pkt), Decision::Ignored(PacketType::FlowRule));
        assert_eq!(agent.flow_count(), 0);
        assert_eq!(agent.snapshot_statistics().packets_received, 1);
    }

    #[test]
    fn test_config_noted() {
        let mut agent = sensor();
        let mut buf = [0u8; 7];

        encode_header(&mut buf, 7, PacketType::Config, 1, 2, 32);
        assert_eq!(
            agent.dispatch(&decode(&buf).unwrap()),
            Decision::ConfigurationNoted
        );
        assert_eq!(agent.snapshot_statistics().packets_received, 1);
    }

    #[test]
    fn test_other_types_ignored() {
        let mut agent = sensor();
        let mut buf = [0u8; 7];
        for ty in [
            PacketType::Beacon,
            PacketType::Report,
            PacketType::Request,
            PacketType::Response,
            PacketType::OpenPath,
            PacketType::RegProxy,
            PacketType::Unknown(0x7F),
        ] {
            encode_header(&mut buf, 7, ty, 1, 2, 32);
            assert_eq!(agent.dispatch(&decode(&buf).unwrap()), Decision::Ignored(ty));
        }
        assert_eq!(agent.snapshot_statistics().packets_received, 7);
    }

    #[test]
    fn test_hit_count_tracks_forwards() {
        let mut agent = sensor();
        agent.dispatch(&flow_rule_packet(3, 5, 1, 100));
        // Shadowed duplicate must never accumulate hits.
        agent.dispatch(&flow_rule_packet(3, 5, 1, 200));

        for _ in 0..3 {
            assert_eq!(agent.dispatch(&data_packet(3, 5)), Decision::Forwarded(100));
        }
        // Misses touch no rule.
        assert_eq!(agent.dispatch(&data_packet(4, 5)), Decision::Dropped);

        let hits: Vec<u32> = agent.flows.iter().map(|r| r.hit_count).collect();
        assert_eq!(hits, vec![3, 0]);
    }

    #[test]
    fn test_duplicate_rules_first_match_forwards() {
        let mut agent = sensor();
        agent.dispatch(&flow_rule_packet(3, 5, 1, 100));
        agent.dispatch(&flow_rule_packet(3, 5, 1, 200));

        assert_eq!(agent.dispatch(&data_packet(3, 5)), Decision::Forwarded(100));
        assert_eq!(agent.flow_count(), 2);
    }

    #[test]
    fn test_install_rule_direct() {
        let mut agent = sensor();
        agent.install_rule(3, 5, FlowAction::Forward, 0x0042).unwrap();
        assert_eq!(
            agent.dispatch(&data_packet(3, 5)),
            Decision::Forwarded(0x0042)
        );
    }
}
