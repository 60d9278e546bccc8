//! Error types for the WISE agent

use thiserror::Error;

/// Agent error type
///
/// Every variant is local to a single packet or a single config load; no
/// condition here is fatal to the agent process.
#[derive(Error, Debug)]
pub enum AgentError {
    /// Buffer shorter than the minimum wire header
    #[error("malformed packet: {len} bytes, need at least {min}")]
    Malformed {
        /// Length of the rejected buffer
        len: usize,
        /// Minimum acceptable length
        min: usize,
    },

    /// Flow table at capacity, rule rejected
    #[error("flow table full")]
    TableFull,

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),

    /// IO error from the transport layer
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the WISE agent
pub type AgentResult<T> = Result<T, AgentError>;
