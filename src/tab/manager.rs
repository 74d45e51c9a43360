//! Tab registry: ordered tabs, the active pointer and task routing

use super::{OpenOptions, Tab, TabDescriptor, TabId, TabMetaUpdate};
use crate::error::TabError;
use std::collections::{HashMap, HashSet};

/// Ordered collection of open tabs plus the active tab pointer.
///
/// Also owns the correlation map used by the task status aggregator
/// (see `task_status.rs`), since a tab close must purge its routes in the
/// same transition.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabManager {
    /// All open tabs, in display order
    tabs: Vec<Tab>,
    /// Currently active tab ID; always names a tab in `tabs` when set
    active_tab_id: Option<TabId>,
    /// In-flight task correlation id -> owning tab id
    pub(super) task_routes: HashMap<String, TabId>,
}

impl TabManager {
    /// Create a new empty tab manager
    pub fn new() -> Self {
        Self::default()
    }

    /// Open a tab, or refresh it in place if its id is already open.
    ///
    /// A refreshed tab keeps its position and task status. The opened tab
    /// becomes active unless `options.activate` is false, in which case the
    /// previously active tab (if any) stays active.
    pub fn open(&mut self, descriptor: TabDescriptor, options: OpenOptions) {
        let previous_active = self.active_tab_id.clone();
        let id = descriptor.id.clone();

        if let Some(existing) = self.get_tab_mut(&id) {
            existing.merge_display(descriptor);
            log::debug!("Refreshed tab {}", id);
        } else {
            self.tabs.push(Tab::new(descriptor));
            log::info!("Opened tab {} (total: {})", id, self.tabs.len());
        }

        self.active_tab_id = match previous_active {
            Some(prev) if !options.activate && prev != id => Some(prev),
            _ => Some(id),
        };
        self.reset_active_badge();
    }

    /// Close a tab by ID.
    ///
    /// Returns false if no such tab is open. Routes for the tab's in-flight
    /// tasks are dropped, so their completions become no-ops.
    pub fn close(&mut self, id: &str) -> bool {
        let Some(idx) = self.tabs.iter().position(|t| t.id == id) else {
            return false;
        };

        log::info!("Closing tab {} (index {})", id, idx);
        self.tabs.remove(idx);
        self.task_routes.retain(|_, tab_id| tab_id != id);

        if self.active_tab_id.as_deref() == Some(id) {
            // Prefer the tab that slid into the closed slot, else the one before it
            self.active_tab_id = if self.tabs.is_empty() {
                None
            } else {
                let new_idx = idx.min(self.tabs.len() - 1);
                Some(self.tabs[new_idx].id.clone())
            };
            self.reset_active_badge();
        }

        true
    }

    /// Make a tab active, or clear the active tab with `None`.
    ///
    /// An id that is not open leaves the current active tab unchanged.
    /// Activating a tab clears a finished `success`/`error` badge.
    pub fn activate(&mut self, id: Option<&str>) {
        match id {
            None => {
                self.active_tab_id = None;
                log::debug!("Cleared active tab");
            }
            Some(id) if self.contains(id) => {
                self.active_tab_id = Some(id.to_string());
                self.reset_active_badge();
                log::debug!("Switched to tab {}", id);
            }
            Some(id) => {
                log::debug!("Ignoring activation of unknown tab {}", id);
            }
        }
    }

    /// Replace the display order with a permutation of the open tab ids.
    ///
    /// Anything other than an exact permutation (missing, extra or
    /// duplicated ids) is rejected and the registry is left untouched.
    pub fn reorder(&mut self, new_order: &[TabId]) -> Result<(), TabError> {
        let current: HashSet<&str> = self.tabs.iter().map(|t| t.id.as_str()).collect();
        let requested: HashSet<&str> = new_order.iter().map(String::as_str).collect();

        if new_order.len() != self.tabs.len() || requested != current {
            let err = TabError::ReorderMismatch {
                expected: self.tabs.len(),
                received: new_order.len(),
            };
            log::warn!("Rejected tab reorder: {}", err);
            return Err(err);
        }

        let mut by_id: HashMap<TabId, Tab> = self
            .tabs
            .drain(..)
            .map(|tab| (tab.id.clone(), tab))
            .collect();
        self.tabs = new_order
            .iter()
            .filter_map(|id| by_id.remove(id))
            .collect();

        log::debug!("Reordered {} tabs", self.tabs.len());
        Ok(())
    }

    /// Merge display fields into an open tab. Returns false if the id is absent.
    pub fn update_meta(&mut self, id: &str, update: TabMetaUpdate) -> bool {
        match self.get_tab_mut(id) {
            Some(tab) => {
                update.apply(tab);
                true
            }
            None => false,
        }
    }

    /// Replace the whole registry with hydrated tabs.
    ///
    /// Task counters are reset and the correlation map emptied. The active id
    /// falls back to the first tab when `active` does not name one of `tabs`.
    pub(crate) fn seed(&mut self, tabs: Vec<Tab>, active: Option<TabId>) {
        self.tabs = tabs
            .into_iter()
            .map(|mut tab| {
                tab.status = Default::default();
                tab.pending_task_count = 0;
                tab.has_pending_failure = false;
                tab
            })
            .collect();
        self.task_routes.clear();
        self.active_tab_id = active
            .filter(|id| self.contains(id))
            .or_else(|| self.tabs.first().map(|t| t.id.clone()));
    }

    /// Clear a finished badge on the active tab
    fn reset_active_badge(&mut self) {
        if let Some(id) = self.active_tab_id.clone()
            && let Some(tab) = self.get_tab_mut(&id)
        {
            tab.reset_completed_status();
        }
    }

    /// Get a reference to the active tab
    pub fn active_tab(&self) -> Option<&Tab> {
        self.active_tab_id.as_deref().and_then(|id| self.get_tab(id))
    }

    /// Get the active tab ID
    pub fn active_tab_id(&self) -> Option<&str> {
        self.active_tab_id.as_deref()
    }

    /// Get index of active tab (0-based)
    pub fn active_tab_index(&self) -> Option<usize> {
        let id = self.active_tab_id.as_deref()?;
        self.tabs.iter().position(|t| t.id == id)
    }

    /// Get all tabs as a slice, in display order
    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    /// Get a tab by ID
    pub fn get_tab(&self, id: &str) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.id == id)
    }

    pub(super) fn get_tab_mut(&mut self, id: &str) -> Option<&mut Tab> {
        self.tabs.iter_mut().find(|t| t.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.tabs.iter().any(|t| t.id == id)
    }

    /// Get the number of tabs
    pub fn tab_count(&self) -> usize {
        self.tabs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}
