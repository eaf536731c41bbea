//! Session visit tracking.
//!
//! Counts visits within a session, stamps the last visit time, assigns a
//! visitor id on first sight, and keeps a device-info snapshot for the
//! welcome flow. Everything here is best-effort: the store may be
//! unavailable or full, and tracking must degrade to in-memory values
//! without surfacing an error.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::clock::Clock;
use crate::environment::EnvironmentInfo;
use crate::store::KeyValueStore;

pub const VISIT_COUNT_KEY: &str = "postern.visit_count";
pub const LAST_VISIT_KEY: &str = "postern.last_visit";
pub const VISITOR_ID_KEY: &str = "postern.visitor_id";
pub const DEVICE_INFO_KEY: &str = "postern.device_info";

/// What the tracker knows after recording a visit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisitSummary {
    /// Visits recorded this session, including this one.
    pub visit_count: u64,
    /// When this visit was recorded.
    pub last_visit: DateTime<Utc>,
    /// Stable id for the session's visitor.
    pub visitor_id: String,
}

/// Device-info snapshot persisted alongside the visit counters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceInfo {
    pub user_agent: Option<String>,
    pub plugin_count: Option<usize>,
    pub language_count: Option<usize>,
    pub automation_flag: Option<bool>,
}

/// Records visits into the session store.
pub struct VisitTracker<S: KeyValueStore> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
}

impl<S: KeyValueStore> VisitTracker<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Record a visit and return the updated summary.
    ///
    /// A corrupt or missing counter reads as zero; failed writes are
    /// logged at debug level and otherwise ignored.
    pub fn record_visit(&self) -> VisitSummary {
        let now = self.clock.now();

        let previous = self
            .store
            .get(VISIT_COUNT_KEY)
            .ok()
            .flatten()
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(0);
        let visit_count = previous + 1;

        let visitor_id = self.ensure_visitor_id();

        self.set_best_effort(VISIT_COUNT_KEY, &visit_count.to_string());
        self.set_best_effort(LAST_VISIT_KEY, &now.to_rfc3339());

        VisitSummary {
            visit_count,
            last_visit: now,
            visitor_id,
        }
    }

    /// Persist a device-info snapshot of the given environment.
    pub fn record_environment(&self, env: &dyn EnvironmentInfo) {
        let info = DeviceInfo {
            user_agent: env.user_agent(),
            plugin_count: env.plugin_count(),
            language_count: env.language_count(),
            automation_flag: env.automation_flag(),
        };

        match serde_json::to_string(&info) {
            Ok(blob) => self.set_best_effort(DEVICE_INFO_KEY, &blob),
            Err(e) => tracing::debug!(error = %e, "Device info not serializable"),
        }
    }

    /// The stored device-info snapshot, if one exists and parses.
    pub fn device_info(&self) -> Option<DeviceInfo> {
        let blob = self.store.get(DEVICE_INFO_KEY).ok().flatten()?;
        serde_json::from_str(&blob).ok()
    }

    /// The last recorded visit time, if one exists and parses.
    pub fn last_visit(&self) -> Option<DateTime<Utc>> {
        let stamp = self.store.get(LAST_VISIT_KEY).ok().flatten()?;
        DateTime::parse_from_rfc3339(&stamp)
            .ok()
            .map(|t| t.with_timezone(&Utc))
    }

    fn ensure_visitor_id(&self) -> String {
        if let Ok(Some(id)) = self.store.get(VISITOR_ID_KEY) {
            if !id.is_empty() {
                return id;
            }
        }

        let id = Uuid::new_v4().to_string();
        self.set_best_effort(VISITOR_ID_KEY, &id);
        id
    }

    fn set_best_effort(&self, key: &str, value: &str) {
        if let Err(e) = self.store.set(key, value) {
            tracing::debug!(key, error = %e, "Dropping visit tracking write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::environment::StaticEnvironment;
    use crate::store::MemoryStore;
    use chrono::Duration;

    fn tracker() -> (VisitTracker<MemoryStore>, Arc<MemoryStore>, Arc<ManualClock>) {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(ManualClock::new(Utc::now()));
        (
            VisitTracker::new(store.clone(), clock.clone()),
            store,
            clock,
        )
    }

    #[test]
    fn test_visits_accumulate() {
        let (tracker, _store, clock) = tracker();

        let first = tracker.record_visit();
        assert_eq!(first.visit_count, 1);

        clock.advance(Duration::minutes(10));
        let second = tracker.record_visit();
        assert_eq!(second.visit_count, 2);
        assert_eq!(second.last_visit - first.last_visit, Duration::minutes(10));
    }

    #[test]
    fn test_visitor_id_is_stable_within_session() {
        let (tracker, store, clock) = tracker();

        let first = tracker.record_visit();
        let second = tracker.record_visit();
        assert_eq!(first.visitor_id, second.visitor_id);

        // A fresh tracker over the same store keeps the id
        let reloaded = VisitTracker::new(store, clock);
        assert_eq!(reloaded.record_visit().visitor_id, first.visitor_id);
    }

    #[test]
    fn test_corrupt_counter_reads_as_zero() {
        let (tracker, store, _clock) = tracker();
        store.set(VISIT_COUNT_KEY, "three").unwrap();

        assert_eq!(tracker.record_visit().visit_count, 1);
    }

    #[test]
    fn test_storage_failure_degrades_silently() {
        let store = Arc::new(MemoryStore::with_quota(0));
        let tracker = VisitTracker::new(store, Arc::new(ManualClock::new(Utc::now())));

        let summary = tracker.record_visit();
        assert_eq!(summary.visit_count, 1);
        assert!(!summary.visitor_id.is_empty());

        // Without persistence every visit looks like the first
        assert_eq!(tracker.record_visit().visit_count, 1);
    }

    #[test]
    fn test_device_info_roundtrip() {
        let (tracker, _store, _clock) = tracker();
        let env = StaticEnvironment::interactive("Mozilla/5.0").with_language_count(2);

        tracker.record_environment(&env);
        let info = tracker.device_info().unwrap();

        assert_eq!(info.user_agent.as_deref(), Some("Mozilla/5.0"));
        assert_eq!(info.language_count, Some(2));
        assert_eq!(info.automation_flag, Some(false));
    }

    #[test]
    fn test_last_visit_readback() {
        let (tracker, _store, _clock) = tracker();
        assert_eq!(tracker.last_visit(), None);

        let summary = tracker.record_visit();
        assert_eq!(tracker.last_visit().unwrap(), summary.last_visit);
    }
}
