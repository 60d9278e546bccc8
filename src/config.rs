//! Agent Configuration

use std::collections::HashMap;
use std::net::SocketAddr;

use serde::{Deserialize, Serialize};

use crate::agent::NodeRole;
use crate::error::AgentError;
use crate::flow::DEFAULT_FLOW_CAPACITY;

/// Runtime configuration for one agent instance
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// This node's 16-bit address
    pub node_addr: u16,
    /// Node role
    pub role: NodeRole,
    /// Flow table capacity
    pub flow_capacity: usize,
    /// UDP port the agent listens on
    pub bind_port: u16,
    /// Controller/sink endpoint for telemetry reports
    pub controller_addr: SocketAddr,
    /// Next-hop address → UDP endpoint, for forwarded DATA packets
    pub peers: HashMap<u16, SocketAddr>,
    /// Grace period before the event loop starts (network formation)
    pub startup_delay_secs: u64,
    /// Telemetry report interval
    pub report_interval_secs: u64,
    /// Statistics printout interval
    pub stats_interval_secs: u64,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            node_addr: 0x0001,
            role: NodeRole::Sensor,
            flow_capacity: DEFAULT_FLOW_CAPACITY,
            bind_port: 8765,
            controller_addr: SocketAddr::from(([127, 0, 0, 1], 5678)),
            peers: HashMap::new(),
            startup_delay_secs: 10,
            report_interval_secs: 30,
            stats_interval_secs: 60,
        }
    }
}

impl AgentConfig {
    /// Load from a JSON file
    pub fn load(path: &str) -> Result<Self, AgentError> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| AgentError::Config(e.to_string()))
    }

    /// Save to a JSON file
    pub fn save(&self, path: &str) -> Result<(), AgentError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| AgentError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// UDP endpoint for a next-hop node address, if mapped
    pub fn peer(&self, next_hop: u16) -> Option<SocketAddr> {
        self.peers.get(&next_hop).copied()
    }
}
