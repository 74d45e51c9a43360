//! Routes message-completion events into the tab registry.
//!
//! Producers (the chat engine) send a [`MessageCompletion`] per finished
//! message over an unbounded channel. A tokio task drains the channel and
//! dispatches `complete_task` on the shared store, where the correlation id
//! is the message id.

use crate::store::SharedTabStore;
use crate::tab::TaskOutcome;
use serde::{Deserialize, Serialize};
use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

/// Final status a message reports when it completes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageStatus {
    Pending,
    Processing,
    Success,
    Error,
    /// Stopped by the user
    #[serde(rename = "pause")]
    Paused,
}

impl From<MessageStatus> for TaskOutcome {
    fn from(status: MessageStatus) -> Self {
        match status {
            MessageStatus::Error => TaskOutcome::Error,
            MessageStatus::Paused => TaskOutcome::Cancelled,
            _ => TaskOutcome::Success,
        }
    }
}

/// Event sent when a message finishes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageCompletion {
    pub message_id: String,
    pub status: MessageStatus,
}

impl MessageCompletion {
    pub fn new(message_id: impl Into<String>, status: MessageStatus) -> Self {
        Self {
            message_id: message_id.into(),
            status,
        }
    }
}

/// Listens for completions and applies them to the store
#[derive(Debug, Default)]
pub struct TaskStatusService {
    sender: Option<mpsc::UnboundedSender<MessageCompletion>>,
    task: Option<JoinHandle<()>>,
}

impl TaskStatusService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start listening. Calling again while running returns the existing sender.
    pub fn init(
        &mut self,
        store: SharedTabStore,
        runtime: &Handle,
    ) -> mpsc::UnboundedSender<MessageCompletion> {
        if let Some(sender) = &self.sender {
            return sender.clone();
        }

        let (tx, mut rx) = mpsc::unbounded_channel::<MessageCompletion>();
        let handle = runtime.spawn(async move {
            while let Some(completion) = rx.recv().await {
                let outcome = TaskOutcome::from(completion.status);
                log::trace!(
                    "Message {} completed: {:?}",
                    completion.message_id,
                    outcome
                );
                store.lock().complete_task(&completion.message_id, outcome);
            }
            log::debug!("Task status listener stopped");
        });

        self.sender = Some(tx.clone());
        self.task = Some(handle);
        tx
    }

    pub fn is_running(&self) -> bool {
        self.sender.is_some()
    }

    /// Sender for an already started service
    pub fn sender(&self) -> Option<mpsc::UnboundedSender<MessageCompletion>> {
        self.sender.clone()
    }

    /// Stop listening immediately. Completions still queued are dropped.
    pub fn dispose(&mut self) {
        self.sender = None;
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    /// Stop listening after the queue drains.
    ///
    /// Resolves once every sender clone handed out by `init` is dropped.
    pub async fn shutdown(&mut self) {
        self.sender = None;
        if let Some(task) = self.task.take()
            && let Err(e) = task.await
            && !e.is_cancelled()
        {
            log::error!("Task status listener panicked: {}", e);
        }
    }
}
