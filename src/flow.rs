//! Bounded Flow Table
//!
//! Fixed-capacity store of forwarding rules keyed by (source, destination)
//! address pairs.
//!
//! # Design
//!
//! - Append-only slots, bulk clear, no per-rule removal
//! - Linear first-match lookup; insertion order is implicit priority
//! - Duplicate keys are legal and shadowed by the earlier rule
//! - No interior mutability: callers hold `&mut` (single logical thread)

use tracing::{debug, info, warn};

use crate::error::AgentError;

/// Default rule capacity for a sensor-class node
pub const DEFAULT_FLOW_CAPACITY: usize = 10;

/// Forwarding action carried by a flow rule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum FlowAction {
    /// Drop matching packets
    Drop = 0,
    /// Forward matching packets to `next_hop`
    Forward = 1,
    /// Escalate matching packets to the controller
    AskController = 2,
}

impl FlowAction {
    /// Parse the wire action byte; out-of-range bytes are rejected
    pub fn from_wire(byte: u8) -> Option<Self> {
        match byte {
            0 => Some(Self::Drop),
            1 => Some(Self::Forward),
            2 => Some(Self::AskController),
            _ => None,
        }
    }
}

/// One forwarding policy
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowRule {
    /// True once the slot is populated; reset only by table clear
    pub active: bool,
    /// Source node address (lookup key, with `dst_addr`)
    pub src_addr: u16,
    /// Destination node address (lookup key, with `src_addr`)
    pub dst_addr: u16,
    /// Action to apply on match
    pub action: FlowAction,
    /// Next-hop node address, meaningful only for `FlowAction::Forward`
    pub next_hop: u16,
    /// Matching lookups against this rule; reset only by table clear
    pub hit_count: u32,
}

/// Bounded, ordered flow table
///
/// Holds at most `capacity` active rules. `add` beyond capacity fails
/// without mutating state; `lookup` returns the first active match in
/// insertion order.
pub struct FlowTable {
    rules: Vec<FlowRule>,
    capacity: usize,
}

impl FlowTable {
    /// Create an empty table with the given rule capacity
    pub fn new(capacity: usize) -> Self {
        Self {
            rules: Vec::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a new active rule at the next free slot
    ///
    /// The new rule starts with `hit_count = 0`. Duplicate keys are not
    /// detected; the earlier rule keeps winning lookups.
    pub fn add(
        &mut self,
        src_addr: u16,
        dst_addr: u16,
        action: FlowAction,
        next_hop: u16,
    ) -> Result<(), AgentError> {
        if self.rules.len() >= self.capacity {
            warn!(src_addr, dst_addr, "flow table full, rule rejected");
            return Err(AgentError::TableFull);
        }

        self.rules.push(FlowRule {
            active: true,
            src_addr,
            dst_addr,
            action,
            next_hop,
            hit_count: 0,
        });

        info!(
            src_addr,
            dst_addr,
            ?action,
            next_hop,
            slots = self.rules.len(),
            "flow rule added"
        );
        Ok(())
    }

    /// First active rule matching both addresses, in insertion order
    ///
    /// Returns `&mut` so the caller can bump `hit_count` without a second
    /// traversal.
    #[inline]
    pub fn lookup(&mut self, src_addr: u16, dst_addr: u16) -> Option<&mut FlowRule> {
        self.rules
            .iter_mut()
            .find(|r| r.active && r.src_addr == src_addr && r.dst_addr == dst_addr)
    }

    /// Deactivate all rules and reset the active count to zero
    ///
    /// Idempotent; used at startup.
    pub fn clear(&mut self) {
        self.rules.clear();
        debug!("flow table cleared");
    }

    /// Number of active rules
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// True when no rule is installed
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Rule capacity
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate installed rules in insertion order
    pub fn iter(&self) -> impl Iterator<Item = &FlowRule> {
        self.rules.iter()
    }
}

impl Default for FlowTable {
    fn default() -> Self {
        Self::new(DEFAULT_FLOW_CAPACITY)
    }
}
