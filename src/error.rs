//! # Error Types
//!
//! Custom error types for the HITL bridge using `thiserror`.

use thiserror::Error;

/// Main error type for the HITL bridge
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Configuration file could not be parsed
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration parsed but holds unusable values
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Inbound simulator packet could not be decoded
    #[error("Decode error: {0}")]
    Decode(#[from] DecodeError),

    /// Outbound datagram could not be sent
    #[error("Transmit error: {0}")]
    Transmit(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure to turn a simulator answer packet into a flight snapshot
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DecodeError {
    /// Field count, field ids or number format do not match the protocol
    #[error("malformed packet: {0}")]
    Malformed(String),

    /// A field parsed but its value is not physically plausible
    #[error("{field} out of range: {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
    },
}

/// Result type alias for the HITL bridge
pub type Result<T> = std::result::Result<T, BridgeError>;
