//! SDN-WISE Forwarding Agent
//!
//! Software-defined forwarding engine for a resource-constrained wireless
//! sensor node. The controller installs (source, destination)-keyed flow
//! rules over the wire; the agent classifies incoming packets, consults
//! the rule table, and periodically reports telemetry back to the sink.
//!
//! # Architecture
//!
//! ```text
//! inbound bytes ──▶ packet::decode ──▶ WiseAgent::dispatch ──▶ Decision
//!                                        │        │
//!                                   FlowTable  NodeStats
//!                                                 │
//! report timer ──▶ WiseAgent::build_report ◀──────┘──▶ outbound bytes
//! ```
//!
//! The engine itself never blocks and never transmits: decisions and
//! report buffers are handed to the caller-owned transport. The
//! [`runtime`] module supplies one such caller, a single-task UDP loop,
//! which keeps the two trigger points ("packet arrived", "timer fired")
//! strictly serialized as the engine requires.

#![warn(missing_docs)]

pub mod agent;
pub mod config;
pub mod error;
pub mod flow;
pub mod packet;
pub mod report;
pub mod runtime;
pub mod stats;

pub use agent::{Decision, NodeRole, WiseAgent};
pub use config::AgentConfig;
pub use error::{AgentError, AgentResult};
pub use flow::{FlowAction, FlowRule, FlowTable, DEFAULT_FLOW_CAPACITY};
pub use packet::{decode, Packet, PacketType, FLOW_RULE_MIN_LEN, MIN_HEADER_LEN};
pub use runtime::AgentRuntime;
pub use stats::{NodeStats, StatsSnapshot};
