//! Translation between host URIs and the string form used on the wire

use crate::fs::VfsError;
use serde::{Deserialize, Serialize};
use url::Url;

/// URI scheme reserved for the remote index filesystem
pub const LSIF_SCHEME: &str = "lsif";

/// String form of a resource identifier as sent to the index server
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RemoteUri(String);

impl RemoteUri {
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for RemoteUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for RemoteUri {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Convert a host URI into its wire form.
///
/// The serialized form of a parsed `Url` is already normalized and
/// percent-encoded, so this never fails.
pub fn to_remote(uri: &Url) -> RemoteUri {
    RemoteUri(uri.as_str().to_owned())
}

/// Parse a wire URI back into a host URI.
pub fn from_remote(uri: &RemoteUri) -> Result<Url, VfsError> {
    Url::parse(uri.as_str()).map_err(|e| VfsError::Decode(format!("invalid URI '{uri}': {e}")))
}

/// URI of the entry `name` inside the directory `parent`.
///
/// `name` is a single path segment; reserved characters in it are
/// percent-encoded rather than treated as separators.
pub fn child(parent: &Url, name: &str) -> Result<Url, VfsError> {
    let mut uri = parent.clone();
    uri.path_segments_mut()
        .map_err(|_| VfsError::Decode(format!("'{parent}' cannot contain entries")))?
        .pop_if_empty()
        .push(name);
    Ok(uri)
}
