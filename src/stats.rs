//! Node Statistics
//!
//! Four monotonic counters owned by the agent, zeroed at process start.
//! No atomics: the engine runs on a single logical thread and the host
//! serializes delivery of its trigger events.

use serde::Serialize;

/// Per-node packet counters
#[derive(Debug, Default)]
pub struct NodeStats {
    packets_sent: u32,
    packets_received: u32,
    packets_forwarded: u32,
    packets_dropped: u32,
}

impl NodeStats {
    /// Fresh counters, all zero
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub(crate) fn record_sent(&mut self) {
        self.packets_sent = self.packets_sent.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_received(&mut self) {
        self.packets_received = self.packets_received.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_forwarded(&mut self) {
        self.packets_forwarded = self.packets_forwarded.wrapping_add(1);
    }

    #[inline]
    pub(crate) fn record_dropped(&mut self) {
        self.packets_dropped = self.packets_dropped.wrapping_add(1);
    }

    /// Packets originated by this node (reports)
    pub fn packets_sent(&self) -> u32 {
        self.packets_sent
    }

    /// Copy the current counter values
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            packets_sent: self.packets_sent,
            packets_received: self.packets_received,
            packets_forwarded: self.packets_forwarded,
            packets_dropped: self.packets_dropped,
        }
    }
}

/// Point-in-time copy of the counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Packets originated by this node
    pub packets_sent: u32,
    /// Packets handed to the dispatcher
    pub packets_received: u32,
    /// DATA packets matched by a flow rule
    pub packets_forwarded: u32,
    /// DATA packets with no matching rule
    pub packets_dropped: u32,
}
