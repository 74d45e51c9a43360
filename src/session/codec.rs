//! Encoding and normalization of the persisted tab document.
//!
//! `normalize` accepts any JSON value and never fails: entries that do not
//! validate are dropped one by one, and only a non-object top level is
//! rejected outright.

use super::{CURRENT_VERSION, NormalizedTabs, PersistedTab, PersistedTabsState};
use crate::tab::{Tab, TabKind};
use serde_json::{Map, Value};
use std::collections::HashSet;

/// Project the registry onto its persisted form
pub fn encode(tabs: &[Tab], active_tab_id: Option<&str>) -> PersistedTabsState {
    PersistedTabsState {
        version: CURRENT_VERSION,
        tabs: tabs.iter().map(PersistedTab::from).collect(),
        active_tab_id: active_tab_id.map(str::to_string),
    }
}

/// Validate and repair untrusted persisted data.
///
/// Returns `None` only when `raw` is not a JSON object. The `version` field
/// is not inspected here.
pub fn normalize(raw: &Value) -> Option<NormalizedTabs> {
    let candidate = raw.as_object()?;
    let raw_tabs = candidate
        .get("tabs")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut seen = HashSet::new();
    let mut tabs = Vec::new();
    for entry in raw_tabs {
        let Some(tab) = entry.as_object().and_then(normalize_tab) else {
            continue;
        };
        if seen.insert(tab.id.clone()) {
            tabs.push(tab);
        }
    }

    if tabs.is_empty() {
        return Some(NormalizedTabs::default());
    }

    let active_tab_id = candidate
        .get("activeTabId")
        .and_then(Value::as_str)
        .filter(|id| tabs.iter().any(|t| t.id == *id))
        .map(str::to_string)
        .or_else(|| tabs.first().map(|t| t.id.clone()));

    Some(NormalizedTabs {
        tabs,
        active_tab_id,
    })
}

fn normalize_tab(entry: &Map<String, Value>) -> Option<PersistedTab> {
    let id = entry.get("id")?.as_str()?;
    let title = entry.get("title")?.as_str()?;
    let kind = TabKind::from_tag(entry.get("type")?.as_str()?)?;
    let owner_id = entry.get("assistantId")?.as_str()?;

    let context = |field: &str| {
        entry
            .get(field)
            .and_then(Value::as_str)
            .filter(|v| !v.is_empty())
            .map(str::to_string)
    };
    let (topic_id, session_id) = match kind {
        TabKind::Topic => (context("topicId"), None),
        TabKind::Session => (None, context("sessionId")),
    };

    Some(PersistedTab {
        id: id.to_string(),
        title: title.to_string(),
        kind,
        owner_id: owner_id.to_string(),
        topic_id,
        session_id,
    })
}
