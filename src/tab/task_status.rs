//! Task status aggregation for tabs.
//!
//! A tab can have several background tasks in flight at once (parallel tool
//! calls, regenerations). Each start increments the tab's pending count and
//! records a correlation id route; each completion consumes the route and
//! decrements. The badge only resolves once the count drains to zero, and a
//! failure anywhere in the batch wins over later successes.

use super::{TabId, TabManager, TabStatus};
use serde::{Deserialize, Serialize};

/// How a background task ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskOutcome {
    Success,
    Error,
    Cancelled,
}

impl TabManager {
    /// Record a task starting on a tab.
    ///
    /// Unknown tab ids are ignored. Reusing a correlation id that is still in
    /// flight re-routes it to `tab_id`.
    pub fn start_task(&mut self, tab_id: &str, correlation_id: &str) {
        let Some(tab) = self.get_tab_mut(tab_id) else {
            log::debug!(
                "Ignoring task {} for unknown tab {}",
                correlation_id,
                tab_id
            );
            return;
        };

        tab.pending_task_count = tab.pending_task_count.saturating_add(1);
        if tab.pending_task_count == 1 {
            tab.has_pending_failure = false;
        }
        tab.status = TabStatus::Running;

        let tab_id: TabId = tab.id.clone();
        log::debug!(
            "Task {} started on tab {} (pending: {})",
            correlation_id,
            tab_id,
            tab.pending_task_count
        );
        self.task_routes.insert(correlation_id.to_string(), tab_id);
    }

    /// Record a task completing.
    ///
    /// The route is always consumed. Completions for unknown correlation ids
    /// (already completed, or their tab was closed) are no-ops.
    pub fn complete_task(&mut self, correlation_id: &str, outcome: TaskOutcome) {
        let Some(tab_id) = self.task_routes.remove(correlation_id) else {
            log::debug!("No route for completed task {}", correlation_id);
            return;
        };
        let Some(tab) = self.get_tab_mut(&tab_id) else {
            return;
        };

        tab.pending_task_count = tab.pending_task_count.saturating_sub(1);
        if outcome == TaskOutcome::Error {
            tab.has_pending_failure = true;
        }
        if tab.pending_task_count > 0 {
            return;
        }

        tab.status = if tab.has_pending_failure {
            TabStatus::Error
        } else if outcome == TaskOutcome::Cancelled {
            TabStatus::Idle
        } else {
            TabStatus::Success
        };
        tab.has_pending_failure = false;
        log::debug!("Tab {} settled as {:?}", tab_id, tab.status);
    }

    /// Tab a correlation id is currently routed to
    pub fn task_route(&self, correlation_id: &str) -> Option<&str> {
        self.task_routes.get(correlation_id).map(String::as_str)
    }

    /// Number of tasks in flight across all tabs
    pub fn pending_route_count(&self) -> usize {
        self.task_routes.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab::{OpenOptions, TabDescriptor};

    const TAB: &str = "topic:t1";

    fn manager() -> TabManager {
        let mut mgr = TabManager::new();
        mgr.open(TabDescriptor::topic("A", "t1", "T1"), OpenOptions::default());
        mgr
    }

    fn run_batch(outcomes: &[TaskOutcome]) -> TabManager {
        let mut mgr = manager();
        for i in 0..outcomes.len() {
            mgr.start_task(TAB, &format!("c{i}"));
        }
        for (i, outcome) in outcomes.iter().enumerate() {
            mgr.complete_task(&format!("c{i}"), *outcome);
        }
        mgr
    }

    #[test]
    fn start_marks_running_and_routes() {
        let mut mgr = manager();
        mgr.start_task(TAB, "c1");
        let tab = mgr.get_tab(TAB).unwrap();
        assert_eq!(tab.status, TabStatus::Running);
        assert_eq!(tab.pending_task_count, 1);
        assert_eq!(mgr.task_route("c1"), Some(TAB));
    }

    #[test]
    fn start_on_unknown_tab_is_noop() {
        let mut mgr = manager();
        let before = mgr.clone();
        mgr.start_task("topic:missing", "c1");
        assert_eq!(mgr, before);
        assert_eq!(mgr.pending_route_count(), 0);
    }

    #[test]
    fn all_success_resolves_success() {
        use TaskOutcome::*;
        let mgr = run_batch(&[Success, Success, Success]);
        let tab = mgr.get_tab(TAB).unwrap();
        assert_eq!(tab.status, TabStatus::Success);
        assert_eq!(tab.pending_task_count, 0);
        assert!(!tab.has_pending_failure);
        assert_eq!(mgr.pending_route_count(), 0);
    }

    #[test]
    fn any_error_dominates_regardless_of_order() {
        use TaskOutcome::*;
        for outcomes in [
            [Error, Success, Success],
            [Success, Error, Success],
            [Success, Success, Error],
            [Cancelled, Error, Cancelled],
        ] {
            let mgr = run_batch(&outcomes);
            let tab = mgr.get_tab(TAB).unwrap();
            assert_eq!(tab.status, TabStatus::Error, "{outcomes:?}");
            assert!(!tab.has_pending_failure);
        }
    }

    #[test]
    fn all_cancelled_resolves_idle() {
        use TaskOutcome::*;
        let mgr = run_batch(&[Cancelled, Cancelled]);
        assert_eq!(mgr.get_tab(TAB).unwrap().status, TabStatus::Idle);
    }

    #[test]
    fn last_outcome_decides_between_idle_and_success() {
        use TaskOutcome::*;
        let mgr = run_batch(&[Cancelled, Success]);
        assert_eq!(mgr.get_tab(TAB).unwrap().status, TabStatus::Success);
        let mgr = run_batch(&[Success, Cancelled]);
        assert_eq!(mgr.get_tab(TAB).unwrap().status, TabStatus::Idle);
    }

    #[test]
    fn partial_completion_stays_running() {
        let mut mgr = manager();
        mgr.start_task(TAB, "c1");
        mgr.start_task(TAB, "c2");
        mgr.complete_task("c1", TaskOutcome::Error);

        let tab = mgr.get_tab(TAB).unwrap();
        assert_eq!(tab.status, TabStatus::Running);
        assert_eq!(tab.pending_task_count, 1);
        assert!(tab.has_pending_failure);
    }

    #[test]
    fn pending_count_tracks_starts_minus_completes() {
        let mut mgr = manager();
        for i in 0..5 {
            mgr.start_task(TAB, &format!("c{i}"));
        }
        for i in 0..3 {
            mgr.complete_task(&format!("c{i}"), TaskOutcome::Success);
            // Completing the same id twice must not double-decrement
            mgr.complete_task(&format!("c{i}"), TaskOutcome::Success);
        }
        assert_eq!(mgr.get_tab(TAB).unwrap().pending_task_count, 2);
        mgr.complete_task("never-started", TaskOutcome::Error);
        assert_eq!(mgr.get_tab(TAB).unwrap().pending_task_count, 2);
        assert!(!mgr.get_tab(TAB).unwrap().has_pending_failure);
    }

    #[test]
    fn new_batch_clears_stale_failure() {
        let mut mgr = manager();
        mgr.start_task(TAB, "c1");
        mgr.get_tab_mut(TAB).unwrap().has_pending_failure = true;
        mgr.complete_task("c1", TaskOutcome::Success);
        assert_eq!(mgr.get_tab(TAB).unwrap().status, TabStatus::Error);

        mgr.start_task(TAB, "c2");
        assert!(!mgr.get_tab(TAB).unwrap().has_pending_failure);
        mgr.complete_task("c2", TaskOutcome::Success);
        assert_eq!(mgr.get_tab(TAB).unwrap().status, TabStatus::Success);
    }

    #[test]
    fn close_purges_routes_and_later_completion_is_noop() {
        let mut mgr = manager();
        mgr.open(TabDescriptor::topic("A", "t2", "T2"), OpenOptions::default());
        mgr.start_task(TAB, "c1");
        mgr.start_task("topic:t2", "c2");

        mgr.close(TAB);
        assert_eq!(mgr.task_route("c1"), None);
        assert_eq!(mgr.task_route("c2"), Some("topic:t2"));

        let before = mgr.clone();
        mgr.complete_task("c1", TaskOutcome::Error);
        assert_eq!(mgr, before);
    }

    #[test]
    fn reused_correlation_id_is_rerouted() {
        let mut mgr = manager();
        mgr.open(TabDescriptor::topic("A", "t2", "T2"), OpenOptions::default());
        mgr.start_task(TAB, "c1");
        mgr.start_task("topic:t2", "c1");
        assert_eq!(mgr.task_route("c1"), Some("topic:t2"));
        assert_eq!(mgr.pending_route_count(), 1);
    }

    #[test]
    fn activate_clears_badge_without_touching_count() {
        let mut mgr = run_batch(&[TaskOutcome::Error]);
        mgr.open(TabDescriptor::topic("A", "t2", "T2"), OpenOptions::default());
        mgr.start_task(TAB, "c9");
        mgr.get_tab_mut(TAB).unwrap().status = TabStatus::Success;

        mgr.activate(Some(TAB));
        let tab = mgr.get_tab(TAB).unwrap();
        assert_eq!(tab.status, TabStatus::Idle);
        assert_eq!(tab.pending_task_count, 1);
    }
}
