// Read-only virtual filesystem over a remote content index
//
// The host talks to a `FileSystemProvider`; `LsifFileSystem` implements it on
// top of the RPC layer in `services::rpc`.

pub mod error;
pub mod lsif;
pub mod provider;
pub mod types;
pub mod watch;

pub use error::VfsError;
pub use lsif::LsifFileSystem;
pub use provider::{
    DeleteOptions, FileSystemProvider, ProviderCapabilities, RenameOptions, WatchOptions,
    WriteOptions,
};
pub use types::{DirectoryEntry, FileKind, FileStat};
pub use watch::{
    ChangeEmitter, ChangeSubscription, Disposable, FileChangeEvent, FileChangeType, WatchHandle,
};
