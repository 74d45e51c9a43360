//! Single-owner store for the tab registry.
//!
//! Every change goes through [`TabStore::dispatch`], which applies one
//! [`TabAction`] to completion and then notifies subscribers with the
//! resulting state. Subscribers never see a half-applied action.
//!
//! On a multi-threaded runtime, share the store as [`SharedTabStore`] so all
//! dispatches are serialized by one mutex.

use crate::error::TabError;
use crate::tab::{
    ActiveContext, OpenOptions, Tab, TabDescriptor, TabId, TabManager, TabMetaUpdate,
    TaskOutcome,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// Store shared between the UI thread, the completion listener and the
/// persistence writer
pub type SharedTabStore = Arc<Mutex<TabStore>>;

/// A state transition on the tab registry
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabAction {
    Open {
        descriptor: TabDescriptor,
        options: OpenOptions,
    },
    Close(TabId),
    Activate(Option<TabId>),
    Reorder(Vec<TabId>),
    UpdateMeta {
        id: TabId,
        update: TabMetaUpdate,
    },
    StartTask {
        tab_id: TabId,
        correlation_id: String,
    },
    CompleteTask {
        correlation_id: String,
        outcome: TaskOutcome,
    },
    /// Seed the registry from persisted tabs (see `session::hydrate`)
    Hydrate {
        tabs: Vec<Tab>,
        active_tab_id: Option<TabId>,
    },
}

/// Handle returned by [`TabStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&TabStore) + Send>;

struct Subscriber {
    id: SubscriptionId,
    listener: Listener,
}

#[derive(Default)]
pub struct TabStore {
    manager: TabManager,
    context: ActiveContext,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl std::fmt::Debug for TabStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TabStore")
            .field("manager", &self.manager)
            .field("context", &self.context)
            .field("subscriber_count", &self.subscribers.len())
            .finish()
    }
}

impl TabStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty store wrapped for sharing
    pub fn shared() -> SharedTabStore {
        Arc::new(Mutex::new(Self::new()))
    }

    /// Apply an action and notify subscribers.
    ///
    /// A rejected action leaves the state untouched and notifies no one.
    pub fn dispatch(&mut self, action: TabAction) -> Result<(), TabError> {
        match action {
            TabAction::Open {
                descriptor,
                options,
            } => self.manager.open(descriptor, options),
            TabAction::Close(id) => {
                self.manager.close(&id);
            }
            TabAction::Activate(id) => self.manager.activate(id.as_deref()),
            TabAction::Reorder(order) => self.manager.reorder(&order)?,
            TabAction::UpdateMeta { id, update } => {
                self.manager.update_meta(&id, update);
            }
            TabAction::StartTask {
                tab_id,
                correlation_id,
            } => self.manager.start_task(&tab_id, &correlation_id),
            TabAction::CompleteTask {
                correlation_id,
                outcome,
            } => self.manager.complete_task(&correlation_id, outcome),
            TabAction::Hydrate {
                tabs,
                active_tab_id,
            } => {
                self.manager.seed(tabs, active_tab_id);
                self.context.follow(self.manager.active_tab());
                log::info!(
                    "Hydrated {} tabs (active: {:?})",
                    self.manager.tab_count(),
                    self.manager.active_tab_id()
                );
            }
        }

        self.notify();
        Ok(())
    }

    /// Register a listener called after every applied action
    pub fn subscribe(&mut self, listener: impl FnMut(&TabStore) + Send + 'static) -> SubscriptionId {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.subscribers.push(Subscriber {
            id,
            listener: Box::new(listener),
        });
        id
    }

    /// Remove a listener. Returns false if it was already gone.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    fn notify(&mut self) {
        // Listeners get `&TabStore`, so they are moved out for the duration
        let mut subscribers = std::mem::take(&mut self.subscribers);
        for subscriber in &mut subscribers {
            (subscriber.listener)(self);
        }
        self.subscribers = subscribers;
    }

    /// Dispatch an action that has no rejection path.
    pub(crate) fn apply(&mut self, action: TabAction) {
        match self.dispatch(action) {
            Ok(()) => {}
            Err(e) => log::warn!("Tab action rejected: {}", e),
        }
    }

    pub fn open(&mut self, descriptor: TabDescriptor, options: OpenOptions) {
        self.apply(TabAction::Open {
            descriptor,
            options,
        });
    }

    pub fn close(&mut self, id: &str) {
        self.apply(TabAction::Close(id.to_string()));
    }

    pub fn activate(&mut self, id: Option<&str>) {
        self.apply(TabAction::Activate(id.map(str::to_string)));
    }

    pub fn reorder(&mut self, order: Vec<TabId>) -> Result<(), TabError> {
        self.dispatch(TabAction::Reorder(order))
    }

    pub fn update_meta(&mut self, id: &str, update: TabMetaUpdate) {
        self.apply(TabAction::UpdateMeta {
            id: id.to_string(),
            update,
        });
    }

    pub fn start_task(&mut self, tab_id: &str, correlation_id: &str) {
        self.apply(TabAction::StartTask {
            tab_id: tab_id.to_string(),
            correlation_id: correlation_id.to_string(),
        });
    }

    pub fn complete_task(&mut self, correlation_id: &str, outcome: TaskOutcome) {
        self.apply(TabAction::CompleteTask {
            correlation_id: correlation_id.to_string(),
            outcome,
        });
    }

    pub fn manager(&self) -> &TabManager {
        &self.manager
    }

    pub fn tabs(&self) -> &[Tab] {
        self.manager.tabs()
    }

    pub fn active_tab_id(&self) -> Option<&str> {
        self.manager.active_tab_id()
    }

    pub fn active_context(&self) -> &ActiveContext {
        &self.context
    }
}
