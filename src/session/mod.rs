//! Tab persistence across restarts
//!
//! This module provides durable storage of the open tab set: encode the
//! registry into a small versioned JSON document on every change, and on
//! startup read it back, repair or discard what does not validate, and seed
//! the registry once.
//!
//! Only identity and display fields are persisted. Task status is transient
//! and always starts idle after a restart.

pub mod codec;
pub mod hydrate;
pub mod service;
pub mod storage;
pub mod writer;

pub use codec::{encode, normalize};
pub use hydrate::{HydrateOutcome, Rejection, hydrate, validate_document};
pub use service::TabsPersistenceService;
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use writer::PersistenceWriter;

use crate::tab::{Tab, TabDescriptor, TabId, TabKind};
use serde::{Deserialize, Serialize};

/// Schema version written into every snapshot. Any other version is wiped.
pub const CURRENT_VERSION: u32 = 1;

/// Top-level persisted document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTabsState {
    pub version: u32,
    pub tabs: Vec<PersistedTab>,
    pub active_tab_id: Option<TabId>,
}

/// Display-only form of a tab
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedTab {
    pub id: TabId,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: TabKind,
    #[serde(rename = "assistantId")]
    pub owner_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub topic_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

impl PersistedTab {
    /// Context id matching this tab's kind
    pub fn context_id(&self) -> Option<&str> {
        match self.kind {
            TabKind::Topic => self.topic_id.as_deref(),
            TabKind::Session => self.session_id.as_deref(),
        }
    }

    /// Rebuild an idle registry tab
    pub fn into_tab(self) -> Tab {
        let context_id = self.context_id().map(str::to_string);
        Tab::new(TabDescriptor {
            id: self.id,
            kind: self.kind,
            owner_id: self.owner_id,
            title: self.title,
            context_id,
        })
    }
}

impl From<&Tab> for PersistedTab {
    fn from(tab: &Tab) -> Self {
        let (topic_id, session_id) = match tab.kind {
            TabKind::Topic => (tab.context_id.clone(), None),
            TabKind::Session => (None, tab.context_id.clone()),
        };
        Self {
            id: tab.id.clone(),
            title: tab.title.clone(),
            kind: tab.kind,
            owner_id: tab.owner_id.clone(),
            topic_id,
            session_id,
        }
    }
}

/// Result of a successful normalization
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NormalizedTabs {
    pub tabs: Vec<PersistedTab>,
    pub active_tab_id: Option<TabId>,
}
