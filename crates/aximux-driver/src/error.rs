//! Error types for mux driver operations

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for mux operations
pub type Result<T> = std::result::Result<T, MuxError>;

/// Errors that can occur during mux operations
#[derive(Debug, Error)]
pub enum MuxError {
    /// Register window cannot be mapped or acquired
    #[error("Register window unavailable: {reason}")]
    Resource {
        /// Reason for failure
        reason: String,
    },

    /// Device node not found at the expected path
    #[error("Device not found: {path}")]
    DeviceNotFound {
        /// Path that was checked
        path: PathBuf,
    },

    /// No mux devices detected on the system
    #[error("No mux devices detected")]
    NoDevicesFound,

    /// Register access beyond the mapped window
    #[error("Register word {word:#x} beyond window of {words} words")]
    OutOfBounds {
        /// Requested word offset
        word: usize,
        /// Words the window covers
        words: usize,
    },

    /// Instance registry is at capacity
    #[error("Instance registry full ({capacity} instances)")]
    Capacity {
        /// Registry capacity
        capacity: usize,
    },

    /// External configuration inconsistent with hardware capability
    #[error("Configuration error: {reason}")]
    Config {
        /// Reason for failure
        reason: String,
    },

    /// Source write outside the port's configured alternates
    #[error("Source {value} out of range for port {port} ({alternate_count} alternates)")]
    Range {
        /// Port index
        port: usize,
        /// Rejected source value
        value: u32,
        /// Alternates the port declares
        alternate_count: usize,
    },

    /// Hardware selector reads outside the port's configured alternates
    #[error("Port {port} selector reads {value}, outside {alternate_count} configured alternates")]
    Validation {
        /// Port index
        port: usize,
        /// Decoded source value
        value: u32,
        /// Alternates the port declares
        alternate_count: usize,
    },

    /// Port index outside the instance's port table
    #[error("Port index {index} out of range (have {count} ports)")]
    InvalidPort {
        /// Requested index
        index: usize,
        /// Ports the instance exposes
        count: usize,
    },

    /// Attribute key not present in the port's schema
    #[error("Port {port} exposes no attribute '{key}'")]
    NoSuchAttribute {
        /// Port index
        port: usize,
        /// Requested attribute key
        key: String,
    },

    /// Write to an attribute the schema exposes read-only
    #[error("Attribute '{key}' of port {port} is read-only")]
    ReadOnlyAttribute {
        /// Port index
        port: usize,
        /// Attribute key
        key: String,
    },

    /// Write payload could not be parsed for the attribute
    #[error("Invalid write to '{key}': {reason}")]
    InvalidWrite {
        /// Attribute key
        key: String,
        /// Reason the payload was rejected
        reason: String,
    },

    /// I/O error during device or config access
    #[error("I/O error: {source}")]
    Io {
        /// Underlying I/O error
        #[from]
        source: std::io::Error,
    },
}

impl MuxError {
    /// Create a resource error
    pub fn resource(reason: impl Into<String>) -> Self {
        Self::Resource {
            reason: reason.into(),
        }
    }

    /// Create a device not found error
    pub fn device_not_found(path: impl Into<PathBuf>) -> Self {
        Self::DeviceNotFound { path: path.into() }
    }

    /// Create a configuration error
    pub fn config(reason: impl Into<String>) -> Self {
        Self::Config {
            reason: reason.into(),
        }
    }

    /// Create an invalid write error
    pub fn invalid_write(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidWrite {
            key: key.into(),
            reason: reason.into(),
        }
    }
}
