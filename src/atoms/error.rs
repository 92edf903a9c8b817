// ── Vaultdesk Atoms: Error Types ──────────────────────────────────────────
// Single canonical error enum for the crate, built with `thiserror`.
//
// Design rules:
//   • Variants are coarse-grained by domain (I/O, config, RPC…).
//   • The `#[from]` attribute wires std/external error conversions automatically.
//   • Nothing in the position controller returns these for user-level
//     conditions (missing config, bad input, unprepared writes). Those are
//     states, not errors. EngineError is for ambient failures only.

use thiserror::Error;

// ── Primary error enum ─────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum EngineError {
    /// Filesystem or OS-level I/O failure.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization / deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML network table could not be parsed.
    #[error("Config parse error: {0}")]
    Toml(#[from] toml::de::Error),

    /// HTTP / network failure (reqwest layer).
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Network table or CLI configuration is invalid or missing.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON-RPC endpoint returned an error object or a malformed result.
    #[error("RPC error: {method}: {message}")]
    Rpc { method: String, message: String },

    /// Catch-all for errors that do not yet have a dedicated variant.
    #[error("{0}")]
    Other(String),
}

// ── Convenience constructors ───────────────────────────────────────────────

impl EngineError {
    /// Create an RPC error with method name and message.
    pub fn rpc(method: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Rpc { method: method.into(), message: message.into() }
    }
}

// ── String → EngineError ───────────────────────────────────────────────────

impl From<String> for EngineError {
    fn from(s: String) -> Self {
        EngineError::Other(s)
    }
}

impl From<&str> for EngineError {
    fn from(s: &str) -> Self {
        EngineError::Other(s.to_string())
    }
}

// ── Convenience alias ──────────────────────────────────────────────────────

/// All fallible operations return this type.
pub type EngineResult<T> = Result<T, EngineError>;

impl From<EngineError> for String {
    fn from(e: EngineError) -> Self {
        e.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rpc_error_display() {
        let e = EngineError::rpc("eth_call", "execution reverted");
        assert_eq!(e.to_string(), "RPC error: eth_call: execution reverted");
    }

    #[test]
    fn string_bridge() {
        let e: EngineError = "boom".into();
        assert!(matches!(e, EngineError::Other(ref m) if m == "boom"));
        let s: String = e.into();
        assert_eq!(s, "boom");
    }
}
