//! Typed requests understood by the index server and their dispatcher

use super::channel::RequestChannel;
use super::gate::{GateState, ReadinessGate};
use super::uri::{self, RemoteUri};
use crate::fs::{DirectoryEntry, FileStat, VfsError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lsp_types::request::Request;
use serde::{Deserialize, Serialize};
use url::Url;

/// Parameters shared by every index request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UriParams {
    pub uri: RemoteUri,
}

/// `statFile`: metadata for one entry, `null` when absent
#[derive(Debug)]
pub enum StatFileRequest {}

impl Request for StatFileRequest {
    type Params = UriParams;
    type Result = Option<FileStat>;
    const METHOD: &'static str = "statFile";
}

/// `readFile`: whole file content as a base64 string
#[derive(Debug)]
pub enum ReadFileRequest {}

impl Request for ReadFileRequest {
    type Params = UriParams;
    type Result = Option<String>;
    const METHOD: &'static str = "readFile";
}

/// `readDirectory`: `[name, kind]` pairs in server order
#[derive(Debug)]
pub enum ReadDirectoryRequest {}

impl Request for ReadDirectoryRequest {
    type Params = UriParams;
    type Result = Option<Vec<DirectoryEntry>>;
    const METHOD: &'static str = "readDirectory";
}

/// Send a typed request over a channel and decode its result.
pub async fn call<R: Request>(
    channel: &dyn RequestChannel,
    params: R::Params,
) -> Result<R::Result, VfsError> {
    let params = serde_json::to_value(params)
        .map_err(|e| VfsError::Decode(format!("{} params: {e}", R::METHOD)))?;
    let value = channel.send_request(R::METHOD, params).await?;
    serde_json::from_value(value)
        .map_err(|e| VfsError::Decode(format!("{} response: {e}", R::METHOD)))
}

/// Decode the base64 payload of a `readFile` response.
pub fn decode_content(encoded: &str) -> Result<Vec<u8>, VfsError> {
    BASE64
        .decode(encoded)
        .map_err(|e| VfsError::Decode(format!("invalid base64 content: {e}")))
}

/// Issues index requests once the connection is ready
///
/// Every call waits on the readiness gate, translates the URI and performs
/// exactly one round trip. Nothing is retried.
#[derive(Debug)]
pub struct Dispatcher {
    gate: ReadinessGate,
}

impl Dispatcher {
    pub fn new(gate: ReadinessGate) -> Self {
        Self { gate }
    }

    pub fn gate_state(&self) -> GateState {
        self.gate.state()
    }

    /// Metadata for `uri`, or `None` if the index has no such entry
    pub async fn stat_file(&self, uri: &Url) -> Result<Option<FileStat>, VfsError> {
        let channel = self.gate.ready().await?;
        call::<StatFileRequest>(channel.as_ref(), params(uri)).await
    }

    /// Raw bytes of the file at `uri`
    pub async fn read_file(&self, uri: &Url) -> Result<Vec<u8>, VfsError> {
        let channel = self.gate.ready().await?;
        let remote = uri::to_remote(uri);
        match call::<ReadFileRequest>(channel.as_ref(), UriParams { uri: remote.clone() }).await? {
            Some(encoded) => decode_content(&encoded),
            None => Err(VfsError::FileNotFound(remote)),
        }
    }

    /// Children of the directory at `uri`, in the order the server sent them
    pub async fn read_directory(&self, uri: &Url) -> Result<Vec<DirectoryEntry>, VfsError> {
        let channel = self.gate.ready().await?;
        let entries = call::<ReadDirectoryRequest>(channel.as_ref(), params(uri)).await?;
        Ok(entries.unwrap_or_default())
    }
}

fn params(uri: &Url) -> UriParams {
    UriParams {
        uri: uri::to_remote(uri),
    }
}
