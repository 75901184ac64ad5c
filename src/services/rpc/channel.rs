//! Request channel abstraction
//!
//! A request channel is an already-connected, multiplexed connection to the
//! index server. Each call sends one request and resolves with exactly one
//! response or error; request/response correlation is the channel's business.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Errors raised by a request channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelError {
    /// Underlying socket or stream error
    Io(String),
    /// The connection was closed before a response arrived
    Closed,
    /// The server answered with a JSON-RPC error object
    Rpc { code: i64, message: String },
    /// Malformed framing or message body
    Protocol(String),
}

impl std::fmt::Display for ChannelError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChannelError::Io(msg) => write!(f, "IO error: {msg}"),
            ChannelError::Closed => write!(f, "Connection closed"),
            ChannelError::Rpc { code, message } => write!(f, "Server error {code}: {message}"),
            ChannelError::Protocol(msg) => write!(f, "Protocol error: {msg}"),
        }
    }
}

impl std::error::Error for ChannelError {}

impl From<std::io::Error> for ChannelError {
    fn from(err: std::io::Error) -> Self {
        ChannelError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ChannelError {
    fn from(err: serde_json::Error) -> Self {
        ChannelError::Protocol(err.to_string())
    }
}

/// Async request/response channel to the index server
#[async_trait]
pub trait RequestChannel: Send + Sync {
    /// Send a request and wait for its response
    ///
    /// There is no timeout: the future resolves only when the server answers
    /// or the channel fails.
    ///
    /// # Errors
    ///
    /// Returns an error if the request cannot be sent, the connection closes
    /// first, or the server answers with an error object.
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ChannelError>;

    /// Send a notification (no response expected)
    ///
    /// # Errors
    ///
    /// Returns an error if the notification cannot be written.
    async fn send_notification(&self, method: &str, params: Value) -> Result<(), ChannelError>;
}

/// Type alias for a shared request channel.
pub type SharedChannel = Arc<dyn RequestChannel>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_channel_error_display() {
        assert_eq!(ChannelError::Closed.to_string(), "Connection closed");
        assert_eq!(
            ChannelError::Rpc {
                code: -32601,
                message: "Method not found".into()
            }
            .to_string(),
            "Server error -32601: Method not found"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let err: ChannelError =
            std::io::Error::new(std::io::ErrorKind::ConnectionRefused, "refused").into();
        assert_eq!(err, ChannelError::Io("refused".into()));
    }
}
