//! Error types for switch configuration and driver calls.

use std::time::Duration;

use thiserror::Error;

/// Rejections raised while validating a vendor configuration.
///
/// These are always raised before any hardware session is attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unknown switch vendor: {0}")]
    UnknownVendor(String),

    #[error("vendor {vendor} requires exactly {expected} arguments <{fields}>, got {actual}")]
    Arity {
        vendor: String,
        expected: usize,
        actual: usize,
        fields: String,
    },

    #[error("switch parameters must be a JSON object")]
    NotAnObject,

    #[error("missing parameter '{0}'")]
    MissingField(String),

    #[error("unknown parameter '{0}'")]
    UnknownField(String),

    #[error("parameter '{0}' must be a string")]
    WrongType(String),

    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Failures raised by a switch driver while programming a port.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("cannot connect to {host}: {source}")]
    Connect {
        host: String,
        #[source]
        source: std::io::Error,
    },

    #[error("authentication failed on {0}")]
    Authentication(String),

    #[error("switch rejected '{command}': {output}")]
    Rejected { command: String, output: String },

    #[error("session I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("switch did not answer within {0:?}")]
    Timeout(Duration),

    #[error("invalid port name: {0:?}")]
    InvalidPort(String),

    #[error("no driver registered for switch '{0}'")]
    NotRegistered(String),

    #[error("injected failure on port {0}")]
    Injected(String),
}
