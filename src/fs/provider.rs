use super::error::VfsError;
use super::types::{DirectoryEntry, FileStat};
use super::watch::{ChangeSubscription, Disposable};
use async_trait::async_trait;
use url::Url;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WatchOptions {
    pub recursive: bool,
    /// Glob patterns to leave out of the watch
    pub excludes: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WriteOptions {
    pub create: bool,
    pub overwrite: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DeleteOptions {
    pub recursive: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenameOptions {
    pub overwrite: bool,
}

/// Flags a host reads when registering a provider for its scheme
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProviderCapabilities {
    pub read_only: bool,
    pub case_sensitive: bool,
}

/// Filesystem provider contract expected by the host
///
/// Paths are URIs in the scheme the provider is registered for. Listing order
/// is whatever the provider returns.
#[async_trait]
pub trait FileSystemProvider: Send + Sync {
    fn capabilities(&self) -> ProviderCapabilities;

    /// Subscribe to change events from this provider
    fn on_did_change_file(&self) -> ChangeSubscription;

    /// Start watching `uri`. Dropping or disposing the handle stops the watch.
    fn watch(&self, uri: &Url, options: &WatchOptions) -> Box<dyn Disposable>;

    /// # Errors
    ///
    /// Returns `FileNotFound` if nothing exists at `uri`.
    async fn stat(&self, uri: &Url) -> Result<FileStat, VfsError>;

    async fn read_directory(&self, uri: &Url) -> Result<Vec<DirectoryEntry>, VfsError>;

    async fn read_file(&self, uri: &Url) -> Result<Vec<u8>, VfsError>;

    async fn create_directory(&self, uri: &Url) -> Result<(), VfsError>;

    async fn write_file(
        &self,
        uri: &Url,
        content: &[u8],
        options: &WriteOptions,
    ) -> Result<(), VfsError>;

    async fn delete(&self, uri: &Url, options: &DeleteOptions) -> Result<(), VfsError>;

    async fn rename(
        &self,
        old_uri: &Url,
        new_uri: &Url,
        options: &RenameOptions,
    ) -> Result<(), VfsError>;
}
