//! Persistence lifecycle: hydrate once, then write on every change.

use super::hydrate::{HydrateOutcome, hydrate};
use super::storage::{FileStore, KeyValueStore};
use super::writer::PersistenceWriter;
use crate::fault::{FaultReporter, LogFaultReporter};
use crate::store::{SubscriptionId, TabStore};
use chat_tabs_config::{DEFAULT_STORAGE_KEY, TabsConfig, WriteMode};
use parking_lot::Mutex;
use std::sync::Arc;

/// Connects a [`TabStore`] to a storage medium.
///
/// `init` is idempotent and `dispose` undoes it, after which `init` may run
/// again. Neither may be called from inside a store subscriber.
pub struct TabsPersistenceService {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    reporter: Arc<dyn FaultReporter>,
    write_mode: WriteMode,
    enabled: bool,
    writer: Option<Arc<Mutex<PersistenceWriter>>>,
    subscription: Option<SubscriptionId>,
}

impl std::fmt::Debug for TabsPersistenceService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabsPersistenceService")
            .field("key", &self.key)
            .field("write_mode", &self.write_mode)
            .field("enabled", &self.enabled)
            .field("initialized", &self.subscription.is_some())
            .finish()
    }
}

impl TabsPersistenceService {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        reporter: Arc<dyn FaultReporter>,
    ) -> Self {
        Self {
            storage,
            key: key.into(),
            reporter,
            write_mode: WriteMode::Inline,
            enabled: true,
            writer: None,
            subscription: None,
        }
    }

    /// File-backed service using the configured key, directory and write mode
    pub fn from_config(config: &TabsConfig) -> Self {
        let key = if config.storage_key.is_empty() {
            DEFAULT_STORAGE_KEY
        } else {
            config.storage_key.as_str()
        };
        let storage = Arc::new(FileStore::new(config.resolved_storage_dir()));
        Self::new(storage, key, Arc::new(LogFaultReporter))
            .with_write_mode(config.write_mode)
            .with_enabled(config.persistence_enabled)
    }

    pub fn with_write_mode(mut self, mode: WriteMode) -> Self {
        self.write_mode = mode;
        self
    }

    /// A disabled service never touches the storage medium
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn storage(&self) -> &Arc<dyn KeyValueStore> {
        &self.storage
    }

    pub fn is_initialized(&self) -> bool {
        self.subscription.is_some()
    }

    /// Hydrate the store and start persisting its changes.
    ///
    /// Returns what hydration did, or `None` when nothing ran (already
    /// initialized, disabled, or the medium failed and the fault was reported).
    pub fn init(&mut self, store: &mut TabStore) -> Option<HydrateOutcome> {
        if self.subscription.is_some() {
            return None;
        }
        if !self.enabled {
            log::info!("Chat tab persistence disabled");
            return None;
        }

        let outcome = match hydrate(store, self.storage.as_ref(), &self.key) {
            Ok(outcome) => {
                log::debug!("Chat tabs hydration: {:?}", outcome);
                Some(outcome)
            }
            Err(e) => {
                self.reporter.report("hydrate", &e);
                None
            }
        };

        let writer = Arc::new(Mutex::new(PersistenceWriter::new(
            Arc::clone(&self.storage),
            self.key.clone(),
            Arc::clone(&self.reporter),
            self.write_mode,
        )));
        let sink = Arc::clone(&writer);
        self.subscription = Some(store.subscribe(move |state: &TabStore| {
            sink.lock().persist(state.manager());
        }));
        self.writer = Some(writer);

        outcome
    }

    /// Stop persisting. Queued background writes are flushed before this returns.
    pub fn dispose(&mut self, store: &mut TabStore) {
        if let Some(id) = self.subscription.take() {
            store.unsubscribe(id);
        }
        if let Some(writer) = self.writer.take() {
            writer.lock().reset();
        }
    }
}
