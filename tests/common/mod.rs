//! Shared integration test helpers for chat-tabs.
//!
//! Include this module at the top of each test file that needs it:
//!
//! ```ignore
//! mod common;
//! use common::{file_store_in_tmp_dir, topic};
//! ```
//!
//! The `#[allow(dead_code)]` attribute suppresses warnings when only a subset
//! of helpers is used per file.

#![allow(dead_code)]

use chat_tabs::{FileStore, OpenOptions, TabDescriptor, TabStore};
use chat_tabs_config::{TabsConfig, WriteMode};
use tempfile::TempDir;

/// Storage key used by every integration test
pub const KEY: &str = "chat-tabs-state";

/// Creates a temporary directory and a `FileStore` writing inside it.
///
/// The `TempDir` must be kept alive for the duration of the test.
pub fn file_store_in_tmp_dir() -> (FileStore, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let store = FileStore::new(temp_dir.path().join("storage"));
    (store, temp_dir)
}

/// A `TabsConfig` whose storage directory lives inside `temp_dir`
pub fn config_in(temp_dir: &TempDir, write_mode: WriteMode) -> TabsConfig {
    TabsConfig {
        storage_dir: Some(temp_dir.path().join("storage")),
        write_mode,
        ..TabsConfig::default()
    }
}

/// Topic descriptor owned by assistant `A`
pub fn topic(topic_id: &str) -> TabDescriptor {
    TabDescriptor::topic("A", topic_id, format!("Topic {topic_id}"))
}

/// Open several topic tabs in order; the last one ends up active
pub fn open_topics(store: &mut TabStore, topic_ids: &[&str]) {
    for topic_id in topic_ids {
        store.open(topic(topic_id), OpenOptions::default());
    }
}

/// Ids of the open tabs in display order
pub fn tab_ids(store: &TabStore) -> Vec<String> {
    store.tabs().iter().map(|t| t.id.clone()).collect()
}
