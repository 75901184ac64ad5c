use crate::services::rpc::{ChannelError, RemoteUri};
use std::io;

/// Errors surfaced by the remote index filesystem
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VfsError {
    /// The one-time connect step failed. Fatal for the filesystem instance.
    ConnectionUnavailable(String),
    /// A single request/response round trip failed at the channel level.
    Transport(ChannelError),
    /// A response payload did not have the expected shape.
    Decode(String),
    /// No entry exists at this location in the index.
    FileNotFound(RemoteUri),
    /// A mutating operation was attempted.
    ReadOnlyViolation {
        operation: &'static str,
        uri: RemoteUri,
    },
}

impl VfsError {
    pub fn read_only(operation: &'static str, uri: RemoteUri) -> Self {
        VfsError::ReadOnlyViolation { operation, uri }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, VfsError::FileNotFound(_))
    }
}

impl std::fmt::Display for VfsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VfsError::ConnectionUnavailable(msg) => write!(f, "Index server unavailable: {msg}"),
            VfsError::Transport(err) => write!(f, "Transport error: {err}"),
            VfsError::Decode(msg) => write!(f, "Decode error: {msg}"),
            VfsError::FileNotFound(uri) => write!(f, "File not found: {uri}"),
            VfsError::ReadOnlyViolation { operation, uri } => {
                write!(f, "Cannot {operation} {uri}: filesystem is read-only")
            }
        }
    }
}

impl std::error::Error for VfsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            VfsError::Transport(err) => Some(err),
            _ => None,
        }
    }
}

impl From<ChannelError> for VfsError {
    fn from(err: ChannelError) -> Self {
        VfsError::Transport(err)
    }
}

impl From<VfsError> for io::Error {
    fn from(err: VfsError) -> Self {
        let kind = match &err {
            VfsError::ConnectionUnavailable(_) => io::ErrorKind::NotConnected,
            VfsError::Transport(_) => io::ErrorKind::Other,
            VfsError::Decode(_) => io::ErrorKind::InvalidData,
            VfsError::FileNotFound(_) => io::ErrorKind::NotFound,
            VfsError::ReadOnlyViolation { .. } => io::ErrorKind::ReadOnlyFilesystem,
        };
        io::Error::new(kind, err)
    }
}
