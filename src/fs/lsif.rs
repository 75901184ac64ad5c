//! Read-only filesystem projected from a remote LSIF content index

use super::error::VfsError;
use super::provider::{
    DeleteOptions, FileSystemProvider, ProviderCapabilities, RenameOptions, WatchOptions,
    WriteOptions,
};
use super::types::{DirectoryEntry, FileStat};
use super::watch::{ChangeEmitter, ChangeSubscription, Disposable, WatchHandle};
use crate::config::Config;
use crate::services::rpc::uri;
use crate::services::rpc::{Connector, Dispatcher, GateState, ReadinessGate, TcpConnector};
use async_trait::async_trait;
use std::sync::Arc;
use url::Url;

/// Filesystem provider backed by the index server
///
/// Reads wait for the connection, then issue exactly one request each.
/// Every mutating operation fails with [`VfsError::ReadOnlyViolation`]
/// without touching the connection.
///
/// No read has a timeout: if the server never answers, the call never
/// completes.
#[derive(Debug)]
pub struct LsifFileSystem {
    dispatcher: Dispatcher,
    emitter: ChangeEmitter,
    stat_errors_as_not_found: bool,
}

impl LsifFileSystem {
    pub fn new(connector: Arc<dyn Connector>) -> Self {
        Self {
            dispatcher: Dispatcher::new(ReadinessGate::new(connector)),
            emitter: ChangeEmitter::new(),
            stat_errors_as_not_found: false,
        }
    }

    /// Filesystem connecting over TCP as described by `config`
    pub fn from_config(config: &Config) -> Self {
        Self::new(Arc::new(TcpConnector::new(config.server.clone())))
            .with_stat_errors_as_not_found(config.stat_errors_as_not_found)
    }

    /// Fold every failed `stat` round trip into `FileNotFound`.
    pub fn with_stat_errors_as_not_found(mut self, enabled: bool) -> Self {
        self.stat_errors_as_not_found = enabled;
        self
    }

    pub fn connection_state(&self) -> GateState {
        self.dispatcher.gate_state()
    }
}

#[async_trait]
impl FileSystemProvider for LsifFileSystem {
    fn capabilities(&self) -> ProviderCapabilities {
        ProviderCapabilities {
            read_only: true,
            case_sensitive: true,
        }
    }

    fn on_did_change_file(&self) -> ChangeSubscription {
        self.emitter.subscribe()
    }

    fn watch(&self, _uri: &Url, _options: &WatchOptions) -> Box<dyn Disposable> {
        Box::new(WatchHandle)
    }

    async fn stat(&self, uri: &Url) -> Result<FileStat, VfsError> {
        match self.dispatcher.stat_file(uri).await {
            Ok(Some(stat)) => Ok(stat),
            Ok(None) => Err(VfsError::FileNotFound(uri::to_remote(uri))),
            Err(VfsError::Transport(_)) if self.stat_errors_as_not_found => {
                Err(VfsError::FileNotFound(uri::to_remote(uri)))
            }
            Err(e) => Err(e),
        }
    }

    async fn read_directory(&self, uri: &Url) -> Result<Vec<DirectoryEntry>, VfsError> {
        self.dispatcher.read_directory(uri).await
    }

    async fn read_file(&self, uri: &Url) -> Result<Vec<u8>, VfsError> {
        self.dispatcher.read_file(uri).await
    }

    async fn create_directory(&self, uri: &Url) -> Result<(), VfsError> {
        Err(VfsError::read_only("create directory", uri::to_remote(uri)))
    }

    async fn write_file(
        &self,
        uri: &Url,
        _content: &[u8],
        _options: &WriteOptions,
    ) -> Result<(), VfsError> {
        Err(VfsError::read_only("write", uri::to_remote(uri)))
    }

    async fn delete(&self, uri: &Url, _options: &DeleteOptions) -> Result<(), VfsError> {
        Err(VfsError::read_only("delete", uri::to_remote(uri)))
    }

    async fn rename(
        &self,
        old_uri: &Url,
        _new_uri: &Url,
        _options: &RenameOptions,
    ) -> Result<(), VfsError> {
        Err(VfsError::read_only("rename", uri::to_remote(old_uri)))
    }
}
