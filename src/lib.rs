// Library exports for embedding and testing
//
// # Mutex Usage Policy
//
//   - `parking_lot::Mutex`    : the tab store (`SharedTabStore`), the
//                               persistence writer and in-memory storage.
//                               Locks are held only for one dispatch or one
//                               write and never across an `.await`.
//
//   - `tokio::sync::mpsc`     : message completions flow into the store over
//                               a channel rather than a shared lock.
//
// Store subscribers run while the store is borrowed mutably; they must not
// lock the `SharedTabStore` they are subscribed to.

/// Crate version, for the CLI banner
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub mod cli;
pub mod debug;
pub mod error;
pub mod fault;
pub mod session;
pub mod status_service;
pub mod store;
pub mod tab;

pub use error::{StorageError, TabError};
pub use fault::{CollectingFaultReporter, FaultReporter, LogFaultReporter};
pub use session::{
    FileStore, HydrateOutcome, KeyValueStore, MemoryStore, PersistenceWriter,
    TabsPersistenceService,
};
pub use status_service::{MessageCompletion, MessageStatus, TaskStatusService};
pub use store::{SharedTabStore, SubscriptionId, TabAction, TabStore};
pub use tab::{
    ActiveContext, ContextMode, OpenOptions, Tab, TabDescriptor, TabId, TabKind, TabManager,
    TabMetaUpdate, TabStatus, TaskOutcome,
};
