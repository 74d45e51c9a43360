//! Writes the tab document whenever the registry changes.
//!
//! Each snapshot is serialized and compared with the last one written; an
//! identical string is not written again. Storage faults are handed to the
//! fault reporter and never returned to the caller.

use super::codec::encode;
use super::storage::KeyValueStore;
use crate::error::StorageError;
use crate::fault::FaultReporter;
use crate::tab::TabManager;
use chat_tabs_config::WriteMode;
use std::sync::Arc;
use std::sync::mpsc::{self, Sender};
use std::thread::JoinHandle;

/// Dedicated thread applying queued writes in FIFO order
struct BackgroundWriter {
    sender: Option<Sender<String>>,
    handle: Option<JoinHandle<()>>,
}

impl BackgroundWriter {
    fn spawn(
        storage: Arc<dyn KeyValueStore>,
        key: String,
        reporter: Arc<dyn FaultReporter>,
    ) -> std::io::Result<Self> {
        let (sender, receiver) = mpsc::channel::<String>();
        let handle = std::thread::Builder::new()
            .name("chat-tabs-writer".into())
            .spawn(move || {
                for serialized in receiver {
                    if let Err(e) = storage.set(&key, &serialized) {
                        reporter.report("persist", &e);
                    }
                }
                log::debug!("Chat tabs writer thread exiting");
            })?;
        Ok(Self {
            sender: Some(sender),
            handle: Some(handle),
        })
    }

    fn enqueue(&self, serialized: String) -> bool {
        self.sender
            .as_ref()
            .is_some_and(|sender| sender.send(serialized).is_ok())
    }
}

impl Drop for BackgroundWriter {
    fn drop(&mut self) {
        // Closing the channel lets the thread drain what is queued and exit
        self.sender.take();
        if let Some(handle) = self.handle.take()
            && handle.join().is_err()
        {
            log::error!("Chat tabs writer thread panicked");
        }
    }
}

pub struct PersistenceWriter {
    storage: Arc<dyn KeyValueStore>,
    key: String,
    reporter: Arc<dyn FaultReporter>,
    /// Last document handed to the medium; empty until the first write
    last_serialized: String,
    background: Option<BackgroundWriter>,
}

impl std::fmt::Debug for PersistenceWriter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PersistenceWriter")
            .field("key", &self.key)
            .field("last_serialized_len", &self.last_serialized.len())
            .field("background", &self.background.is_some())
            .finish()
    }
}

impl PersistenceWriter {
    pub fn new(
        storage: Arc<dyn KeyValueStore>,
        key: impl Into<String>,
        reporter: Arc<dyn FaultReporter>,
        mode: WriteMode,
    ) -> Self {
        let key = key.into();
        let background = match mode {
            WriteMode::Inline => None,
            WriteMode::Background => match BackgroundWriter::spawn(
                Arc::clone(&storage),
                key.clone(),
                Arc::clone(&reporter),
            ) {
                Ok(writer) => Some(writer),
                Err(e) => {
                    log::warn!("Could not start writer thread, writing inline: {}", e);
                    None
                }
            },
        };

        Self {
            storage,
            key,
            reporter,
            last_serialized: String::new(),
            background,
        }
    }

    /// Persist the registry if its encoded form changed.
    ///
    /// Returns true when a write was issued (or queued).
    pub fn persist(&mut self, manager: &TabManager) -> bool {
        let snapshot = encode(manager.tabs(), manager.active_tab_id());
        let serialized = match serde_json::to_string(&snapshot) {
            Ok(serialized) => serialized,
            Err(e) => {
                self.reporter.report("persist", &StorageError::Serialize(e));
                return false;
            }
        };

        if serialized == self.last_serialized {
            return false;
        }

        if let Some(background) = &self.background {
            if background.enqueue(serialized.clone()) {
                self.last_serialized = serialized;
                return true;
            }
            log::warn!("Chat tabs writer thread is gone, writing inline");
            self.background = None;
        }

        match self.storage.set(&self.key, &serialized) {
            Ok(()) => {
                log::debug!("Persisted {} chat tabs", snapshot.tabs.len());
                self.last_serialized = serialized;
                true
            }
            Err(e) => {
                // Not remembered, so the next change retries the write
                self.reporter.report("persist", &e);
                false
            }
        }
    }

    /// Forget the last written document, so the next `persist` always writes
    pub fn reset(&mut self) {
        self.last_serialized.clear();
    }

    pub fn last_serialized(&self) -> &str {
        &self.last_serialized
    }
}
