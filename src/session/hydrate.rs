//! One-time startup load of the persisted tab document.

use super::codec::normalize;
use super::storage::KeyValueStore;
use super::{CURRENT_VERSION, NormalizedTabs, PersistedTab};
use crate::error::StorageError;
use crate::store::{TabAction, TabStore};
use serde_json::{Number, Value};

/// What hydration did with the stored document
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HydrateOutcome {
    /// Nothing stored under the key
    Absent,
    /// Stored text was not JSON; the key was removed
    Corrupt,
    /// Stored document had another schema version; the key was removed
    VersionMismatch { found: Option<Number> },
    /// The registry already had tabs, so nothing was loaded
    Skipped,
    /// The registry was seeded with this many tabs
    Seeded { tabs: usize },
}

/// Why a stored document cannot be loaded
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    /// Not JSON
    Corrupt(String),
    /// Missing, non-numeric or foreign schema version
    VersionMismatch { found: Option<Number> },
}

impl From<Rejection> for HydrateOutcome {
    fn from(rejection: Rejection) -> Self {
        match rejection {
            Rejection::Corrupt(_) => HydrateOutcome::Corrupt,
            Rejection::VersionMismatch { found } => HydrateOutcome::VersionMismatch { found },
        }
    }
}

/// Parse, version-check and normalize a stored document without touching
/// any storage
pub fn validate_document(stored: &str) -> Result<NormalizedTabs, Rejection> {
    let parsed: Value =
        serde_json::from_str(stored).map_err(|e| Rejection::Corrupt(e.to_string()))?;

    // Compared as a number, so `1.0` is the same version as `1`
    let found = match parsed.get("version") {
        Some(Value::Number(n)) => Some(n.clone()),
        _ => None,
    };
    let current = f64::from(CURRENT_VERSION);
    if found.as_ref().and_then(Number::as_f64) != Some(current) {
        return Err(Rejection::VersionMismatch { found });
    }

    // Only an object can carry a version, and normalize accepts every object
    Ok(normalize(&parsed).unwrap_or_default())
}

/// Load, validate and seed the registry from `key`.
///
/// Unusable data is deleted and never retried. Seeding only happens into an
/// empty registry. Errors are storage-medium failures only.
pub fn hydrate(
    store: &mut TabStore,
    storage: &dyn KeyValueStore,
    key: &str,
) -> Result<HydrateOutcome, StorageError> {
    let Some(stored) = storage.get(key)? else {
        return Ok(HydrateOutcome::Absent);
    };

    let normalized = match validate_document(&stored) {
        Ok(normalized) => normalized,
        Err(rejection) => {
            match &rejection {
                Rejection::Corrupt(e) => {
                    log::warn!("Invalid chat tabs payload, clearing storage: {}", e)
                }
                Rejection::VersionMismatch { found } => log::info!(
                    "Discarding chat tabs snapshot with version {:?} (expected {})",
                    found,
                    CURRENT_VERSION
                ),
            }
            storage.remove(key)?;
            return Ok(rejection.into());
        }
    };

    if !store.manager().is_empty() {
        log::debug!("Registry already has tabs, skipping hydration");
        return Ok(HydrateOutcome::Skipped);
    }

    let count = normalized.tabs.len();
    let tabs = normalized
        .tabs
        .into_iter()
        .map(PersistedTab::into_tab)
        .collect();
    store.apply(TabAction::Hydrate {
        tabs,
        active_tab_id: normalized.active_tab_id,
    });

    Ok(HydrateOutcome::Seeded { tabs: count })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::storage::MemoryStore;
    use crate::tab::{ContextMode, OpenOptions, TabDescriptor, TabStatus};

    const KEY: &str = "chat-tabs-state";

    fn storage_with(value: &str) -> MemoryStore {
        let storage = MemoryStore::new();
        storage.set(KEY, value).unwrap();
        storage
    }

    #[test]
    fn absent_key_does_nothing() {
        let mut store = TabStore::new();
        let outcome = hydrate(&mut store, &MemoryStore::new(), KEY).unwrap();
        assert_eq!(outcome, HydrateOutcome::Absent);
        assert!(store.tabs().is_empty());
    }

    #[test]
    fn corrupt_payload_is_removed() {
        let storage = storage_with("{not json");
        let mut store = TabStore::new();
        assert_eq!(
            hydrate(&mut store, &storage, KEY).unwrap(),
            HydrateOutcome::Corrupt
        );
        assert_eq!(storage.get(KEY).unwrap(), None);
    }

    #[test]
    fn version_mismatch_is_removed() {
        let storage = storage_with(r#"{"version":2,"tabs":[],"activeTabId":null}"#);
        let mut store = TabStore::new();
        assert_eq!(
            hydrate(&mut store, &storage, KEY).unwrap(),
            HydrateOutcome::VersionMismatch {
                found: Some(Number::from(2u64))
            }
        );
        assert_eq!(storage.get(KEY).unwrap(), None);

        let storage = storage_with(r#"{"tabs":[]}"#);
        assert_eq!(
            hydrate(&mut store, &storage, KEY).unwrap(),
            HydrateOutcome::VersionMismatch { found: None }
        );
        assert_eq!(storage.get(KEY).unwrap(), None);
    }

    #[test]
    fn seeds_empty_registry_idle() {
        let storage = storage_with(
            r#"{"version":1,"tabs":[
                {"id":"topic:t1","title":"T1","type":"topic","assistantId":"A","topicId":"t1"},
                {"id":"session:agent:s1","title":"S","type":"session","assistantId":"agent","sessionId":"s1"}
            ],"activeTabId":"session:agent:s1"}"#,
        );
        let mut store = TabStore::new();

        assert_eq!(
            hydrate(&mut store, &storage, KEY).unwrap(),
            HydrateOutcome::Seeded { tabs: 2 }
        );
        assert_eq!(store.tabs().len(), 2);
        assert_eq!(store.active_tab_id(), Some("session:agent:s1"));
        assert!(store.tabs().iter().all(|t| t.status == TabStatus::Idle));
        assert_eq!(store.active_context().mode, ContextMode::Session);
        assert_eq!(
            store.active_context().active_agent_id.as_deref(),
            Some("agent")
        );
        // Stored data is left in place after a successful load
        assert!(storage.get(KEY).unwrap().is_some());
    }

    #[test]
    fn empty_normalization_seeds_nothing_but_keeps_key() {
        let storage = storage_with(r#"{"version":1,"tabs":[null,42]}"#);
        let mut store = TabStore::new();
        assert_eq!(
            hydrate(&mut store, &storage, KEY).unwrap(),
            HydrateOutcome::Seeded { tabs: 0 }
        );
        assert!(store.tabs().is_empty());
        assert_eq!(store.active_tab_id(), None);
        assert!(storage.get(KEY).unwrap().is_some());
    }

    #[test]
    fn non_empty_registry_is_not_overwritten() {
        let storage = storage_with(
            r#"{"version":1,"tabs":[{"id":"topic:old","title":"Old","type":"topic","assistantId":"A"}],"activeTabId":null}"#,
        );
        let mut store = TabStore::new();
        store.open(TabDescriptor::topic("B", "new", "New"), OpenOptions::default());

        assert_eq!(
            hydrate(&mut store, &storage, KEY).unwrap(),
            HydrateOutcome::Skipped
        );
        assert_eq!(store.tabs().len(), 1);
        assert_eq!(store.tabs()[0].id, "topic:new");
    }

    #[test]
    fn validate_document_classifies_without_side_effects() {
        assert!(matches!(
            validate_document("nope"),
            Err(Rejection::Corrupt(_))
        ));
        assert_eq!(
            validate_document("[1,2]"),
            Err(Rejection::VersionMismatch { found: None })
        );
        assert_eq!(
            validate_document(r#"{"version":"1","tabs":[]}"#),
            Err(Rejection::VersionMismatch { found: None })
        );
        let normalized = validate_document(
            r#"{"version":1,"tabs":[{"id":"topic:t","title":"T","type":"topic","assistantId":"A"}]}"#,
        )
        .unwrap();
        assert_eq!(normalized.active_tab_id.as_deref(), Some("topic:t"));
    }

    #[test]
    fn float_version_matches_current() {
        let normalized = validate_document(
            r#"{"version":1.0,"tabs":[{"id":"topic:t","title":"T","type":"topic","assistantId":"A"}],"activeTabId":"topic:t"}"#,
        )
        .unwrap();
        assert_eq!(normalized.tabs.len(), 1);
        assert_eq!(normalized.active_tab_id.as_deref(), Some("topic:t"));

        match validate_document(r#"{"version":1.5,"tabs":[]}"#) {
            Err(Rejection::VersionMismatch { found: Some(n) }) => {
                assert_eq!(n.as_f64(), Some(1.5))
            }
            other => panic!("expected version mismatch, got {other:?}"),
        }
    }

    #[test]
    fn float_version_document_survives_hydrate() {
        let storage = storage_with(
            r#"{"version":1.0,"tabs":[{"id":"topic:t","title":"T","type":"topic","assistantId":"A"}],"activeTabId":"topic:t"}"#,
        );
        let mut store = TabStore::new();
        assert_eq!(
            hydrate(&mut store, &storage, KEY).unwrap(),
            HydrateOutcome::Seeded { tabs: 1 }
        );
        assert!(storage.get(KEY).unwrap().is_some());
    }
}
