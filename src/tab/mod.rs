//! Tab management for conversational work tabs
//!
//! This module provides the core tab infrastructure including:
//! - `Tab`: one open topic or agent session, with its aggregated task status
//! - `TabManager`: ordered registry of tabs, the active pointer and task routing
//! - `TabId`: stable identifier derived from the tab's context
//! - `ActiveContext`: which owner/context is "current" outside the tab set

mod active_context;
mod manager;
mod task_status;

pub use active_context::{ActiveContext, ContextMode};
pub use manager::TabManager;
pub use task_status::TaskOutcome;

use serde::{Deserialize, Serialize};

/// Unique identifier for a tab
pub type TabId = String;

/// Build the tab id for a topic tab
pub fn topic_tab_id(topic_id: &str) -> TabId {
    format!("topic:{topic_id}")
}

/// Build the tab id for an agent session tab
pub fn session_tab_id(owner_id: &str, session_id: &str) -> TabId {
    format!("session:{owner_id}:{session_id}")
}

/// Which flavor of context a tab displays
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabKind {
    Topic,
    Session,
}

impl TabKind {
    /// Parse the persisted tag
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "topic" => Some(TabKind::Topic),
            "session" => Some(TabKind::Session),
            _ => None,
        }
    }

    pub fn as_tag(self) -> &'static str {
        match self {
            TabKind::Topic => "topic",
            TabKind::Session => "session",
        }
    }
}

/// Badge shown on a tab
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TabStatus {
    #[default]
    Idle,
    Running,
    Success,
    Error,
}

impl TabStatus {
    /// A finished-batch badge that viewing the tab acknowledges
    pub fn is_completed(self) -> bool {
        matches!(self, TabStatus::Success | TabStatus::Error)
    }
}

/// A single open work context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tab {
    /// Stable id, see [`topic_tab_id`] and [`session_tab_id`]
    pub id: TabId,
    /// Topic or session; fixed once the tab exists
    pub kind: TabKind,
    /// Owning assistant/agent; fixed once the tab exists
    pub owner_id: String,
    /// Topic id or session id, depending on `kind`
    pub context_id: Option<String>,
    /// Display title (may be empty; the renderer falls back to the owner name)
    pub title: String,
    /// Aggregated status of this tab's background tasks
    pub status: TabStatus,
    /// Number of in-flight tasks attributed to this tab
    pub pending_task_count: u32,
    /// Set when a task in the current batch failed; cleared once the batch drains
    pub has_pending_failure: bool,
}

impl Tab {
    /// Create an idle tab from a descriptor
    pub fn new(descriptor: TabDescriptor) -> Self {
        Self {
            id: descriptor.id,
            kind: descriptor.kind,
            owner_id: descriptor.owner_id,
            context_id: non_empty(descriptor.context_id),
            title: descriptor.title,
            status: TabStatus::Idle,
            pending_task_count: 0,
            has_pending_failure: false,
        }
    }

    /// Viewing a tab acknowledges its last result
    pub(crate) fn reset_completed_status(&mut self) {
        if self.status.is_completed() {
            self.status = TabStatus::Idle;
            self.has_pending_failure = false;
        }
    }

    /// Refresh the display fields from a descriptor for the same id.
    ///
    /// `kind` and `owner_id` are identity and are left untouched.
    fn merge_display(&mut self, descriptor: TabDescriptor) {
        self.title = descriptor.title;
        if let Some(context_id) = non_empty(descriptor.context_id) {
            self.context_id = Some(context_id);
        }
    }
}

/// Everything needed to open (or refresh) a tab
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TabDescriptor {
    pub id: TabId,
    pub kind: TabKind,
    pub owner_id: String,
    pub title: String,
    pub context_id: Option<String>,
}

impl TabDescriptor {
    /// Descriptor for a topic owned by an assistant
    pub fn topic(
        owner_id: impl Into<String>,
        topic_id: impl Into<String>,
        title: impl Into<String>,
    ) -> Self {
        let topic_id = topic_id.into();
        Self {
            id: topic_tab_id(&topic_id),
            kind: TabKind::Topic,
            owner_id: owner_id.into(),
            title: title.into(),
            context_id: Some(topic_id),
        }
    }

    /// Descriptor for an agent session; an empty title becomes "Session"
    pub fn session(
        owner_id: impl Into<String>,
        session_id: impl Into<String>,
        title: Option<String>,
    ) -> Self {
        let owner_id = owner_id.into();
        let session_id = session_id.into();
        Self {
            id: session_tab_id(&owner_id, &session_id),
            kind: TabKind::Session,
            title: title
                .filter(|t| !t.is_empty())
                .unwrap_or_else(|| "Session".to_string()),
            owner_id,
            context_id: Some(session_id),
        }
    }
}

/// Options for [`TabManager::open`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenOptions {
    /// When false, the previously active tab stays active
    pub activate: bool,
}

impl Default for OpenOptions {
    fn default() -> Self {
        Self { activate: true }
    }
}

/// Partial update of a tab's display fields
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabMetaUpdate {
    pub title: Option<String>,
    pub context_id: Option<String>,
}

impl TabMetaUpdate {
    pub fn title(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }

    fn apply(self, tab: &mut Tab) {
        if let Some(title) = self.title {
            tab.title = title;
        }
        if let Some(context_id) = non_empty(self.context_id) {
            tab.context_id = Some(context_id);
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
