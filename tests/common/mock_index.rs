// In-memory index server and connectors for filesystem tests

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use lsif_fs::services::rpc::{ChannelError, Connector, RequestChannel, SharedChannel};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

/// Answers `statFile` / `readFile` / `readDirectory` from fixed tables
///
/// Unconfigured URIs answer `null`, like the real server does for paths it
/// does not know.
#[derive(Debug, Default, Clone)]
pub struct MockIndex {
    stats: HashMap<String, Value>,
    files: HashMap<String, Value>,
    directories: HashMap<String, Value>,
}

impl MockIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_stat(mut self, uri: &str, stat: Value) -> Self {
        self.stats.insert(uri.to_string(), stat);
        self
    }

    /// Serve `content` base64-encoded, as the server does
    pub fn with_file(mut self, uri: &str, content: &[u8]) -> Self {
        self.files
            .insert(uri.to_string(), Value::String(BASE64.encode(content)));
        self
    }

    /// Serve a raw (possibly malformed) `readFile` payload
    pub fn with_raw_file(mut self, uri: &str, payload: Value) -> Self {
        self.files.insert(uri.to_string(), payload);
        self
    }

    pub fn with_directory(mut self, uri: &str, entries: &[(&str, u32)]) -> Self {
        let entries: Vec<Value> = entries
            .iter()
            .map(|(name, kind)| json!([name, kind]))
            .collect();
        self.directories.insert(uri.to_string(), Value::Array(entries));
        self
    }
}

#[async_trait]
impl RequestChannel for MockIndex {
    async fn send_request(&self, method: &str, params: Value) -> Result<Value, ChannelError> {
        let uri = params["uri"].as_str().unwrap_or_default();
        let table = match method {
            "statFile" => &self.stats,
            "readFile" => &self.files,
            "readDirectory" => &self.directories,
            _ => {
                return Err(ChannelError::Rpc {
                    code: -32601,
                    message: format!("Method not found: {method}"),
                })
            }
        };
        Ok(table.get(uri).cloned().unwrap_or(Value::Null))
    }

    async fn send_notification(&self, _method: &str, _params: Value) -> Result<(), ChannelError> {
        Ok(())
    }
}

/// Connector that counts invocations and can hold the connect open
pub struct MockConnector {
    channel: Option<SharedChannel>,
    calls: AtomicUsize,
    release: Option<Notify>,
}

impl MockConnector {
    /// Resolves immediately with `channel`
    pub fn ready(channel: SharedChannel) -> Arc<Self> {
        Arc::new(Self {
            channel: Some(channel),
            calls: AtomicUsize::new(0),
            release: None,
        })
    }

    /// Resolves with `channel` only after [`MockConnector::release`]
    pub fn held(channel: SharedChannel) -> Arc<Self> {
        Arc::new(Self {
            channel: Some(channel),
            calls: AtomicUsize::new(0),
            release: Some(Notify::new()),
        })
    }

    /// Always fails to connect
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            channel: None,
            calls: AtomicUsize::new(0),
            release: None,
        })
    }

    pub fn release(&self) {
        if let Some(release) = &self.release {
            release.notify_one();
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Connector for MockConnector {
    async fn connect(&self) -> Result<SharedChannel, ChannelError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(release) = &self.release {
            release.notified().await;
        }
        self.channel
            .clone()
            .ok_or_else(|| ChannelError::Io("connection refused".to_string()))
    }
}
