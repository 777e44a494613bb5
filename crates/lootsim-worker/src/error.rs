//! Error types for the worker binary.
//!
//! [`WorkerError`] wraps every failure mode of startup and of the message
//! loop. Malformed requests are not fatal: they are reported back to the
//! caller as a `rejected` message and the loop keeps reading.

/// Top-level error for the worker binary.
#[derive(Debug, thiserror::Error)]
pub enum WorkerError {
    /// Configuration loading failed.
    #[error("config error: {source}")]
    Config {
        /// The underlying config error.
        #[from]
        source: lootsim_core::config::ConfigError,
    },

    /// Reading requests or writing responses failed.
    #[error("stdio error: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// A request line was not a valid message.
    #[error("invalid request: {source}")]
    Decode {
        /// The underlying JSON error.
        source: serde_json::Error,
    },

    /// A response could not be serialized.
    #[error("failed to encode response: {source}")]
    Encode {
        /// The underlying JSON error.
        source: serde_json::Error,
    },
}
