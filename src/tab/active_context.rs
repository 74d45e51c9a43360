//! "Current context" state kept alongside the tab set.
//!
//! Collaborators outside the tab strip (the message pane, the session
//! picker) track which owner and session are current independently of the
//! tab list. Hydration re-derives this from the restored active tab.

use super::{Tab, TabKind};
use std::collections::HashMap;

/// Whether a topic or an agent session is in view
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContextMode {
    #[default]
    Topic,
    Session,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ActiveContext {
    pub mode: ContextMode,
    /// Agent whose session is in view; `None` in topic mode
    pub active_agent_id: Option<String>,
    /// Last viewed session per agent
    pub active_session_ids: HashMap<String, String>,
}

impl ActiveContext {
    /// Point the context at `tab`, or reset to topic mode when there is none.
    ///
    /// Remembered sessions for other agents are kept.
    pub fn follow(&mut self, tab: Option<&Tab>) {
        match tab {
            Some(tab) if tab.kind == TabKind::Session => {
                self.mode = ContextMode::Session;
                self.active_agent_id = Some(tab.owner_id.clone());
                if let Some(session_id) = &tab.context_id {
                    self.active_session_ids
                        .insert(tab.owner_id.clone(), session_id.clone());
                }
            }
            _ => {
                self.mode = ContextMode::Topic;
                self.active_agent_id = None;
            }
        }
    }

    /// Session currently remembered for an agent
    pub fn session_for(&self, agent_id: &str) -> Option<&str> {
        self.active_session_ids.get(agent_id).map(String::as_str)
    }
}
