//! Agent event loop
//!
//! Owns the UDP socket and the two periodic timers, and drives the core
//! engine from a single task. `tokio::select!` serializes the "packet
//! arrived" and "timer fired" triggers, so the engine needs no locks.

use std::net::SocketAddr;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio::time::{interval, sleep};
use tracing::{debug, info, warn};

use crate::agent::{Decision, WiseAgent};
use crate::config::AgentConfig;
use crate::error::AgentError;
use crate::packet::decode;

/// Largest datagram the agent will accept
const MAX_DATAGRAM: usize = 256;

/// UDP-driven runtime around a [`WiseAgent`]
pub struct AgentRuntime {
    config: AgentConfig,
    agent: WiseAgent,
    socket: UdpSocket,
}

impl AgentRuntime {
    /// Bind the agent socket and initialize the engine
    pub async fn bind(config: AgentConfig) -> Result<Self, AgentError> {
        let socket = UdpSocket::bind(("0.0.0.0", config.bind_port)).await?;
        info!(
            addr = %socket.local_addr()?,
            node_addr = config.node_addr,
            "listening"
        );
        let agent = WiseAgent::new(config.node_addr, config.role, config.flow_capacity);
        Ok(Self {
            config,
            agent,
            socket,
        })
    }

    /// Address the socket actually bound to
    pub fn local_addr(&self) -> Result<SocketAddr, AgentError> {
        Ok(self.socket.local_addr()?)
    }

    /// Run the event loop until the process is stopped
    pub async fn run(mut self) -> Result<(), AgentError> {
        if self.config.startup_delay_secs > 0 {
            debug!(secs = self.config.startup_delay_secs, "startup delay");
            sleep(Duration::from_secs(self.config.startup_delay_secs)).await;
        }

        let mut report_timer = interval(Duration::from_secs(self.config.report_interval_secs));
        let mut stats_timer = interval(Duration::from_secs(self.config.stats_interval_secs));
        // Both intervals tick immediately on creation; swallow those so the
        // first report goes out one full interval after startup.
        report_timer.tick().await;
        stats_timer.tick().await;

        let mut buf = [0u8; MAX_DATAGRAM];
        loop {
            tokio::select! {
                res = self.socket.recv_from(&mut buf) => {
                    match res {
                        Ok((len, from)) => self.handle_datagram(&buf[..len], from).await,
                        // The agent runs until power-off; a transient
                        // socket error costs at most one datagram.
                        Err(e) => warn!(%e, "socket receive error"),
                    }
                }
                _ = report_timer.tick() => {
                    self.send_report().await;
                }
                _ = stats_timer.tick() => {
                    self.log_stats();
                }
            }
        }
    }

    async fn handle_datagram(&mut self, buf: &[u8], from: SocketAddr) {
        debug!(%from, len = buf.len(), "datagram");

        let pkt = match decode(buf) {
            Ok(pkt) => pkt,
            Err(e) => {
                warn!(%from, %e, "dropping datagram");
                return;
            }
        };

        match self.agent.dispatch(&pkt) {
            Decision::Forwarded(next_hop) => match self.config.peer(next_hop) {
                Some(addr) => {
                    if let Err(e) = self.socket.send_to(buf, addr).await {
                        warn!(next_hop, %addr, %e, "forward failed");
                    }
                }
                None => warn!(next_hop, "no peer mapping for next hop"),
            },
            decision => debug!(?decision, "dispatched"),
        }
    }

    async fn send_report(&mut self) {
        let Some(report) = self.agent.build_report() else {
            return; // sink role
        };
        if let Err(e) = self
            .socket
            .send_to(&report, self.config.controller_addr)
            .await
        {
            warn!(%e, "report send failed");
        }
    }

    fn log_stats(&self) {
        let snap = self.agent.snapshot_statistics();
        info!(
            tx = snap.packets_sent,
            rx = snap.packets_received,
            fwd = snap.packets_forwarded,
            drop = snap.packets_dropped,
            flows = self.agent.flow_count(),
            flow_capacity = self.agent.flow_capacity(),
            "stats"
        );
    }
}
