use crate::core::error::ClientError;
use crate::core::session::Session;
use crate::models::dashboard::DashboardSnapshot;
use crate::stores::skill_store::SkillStore;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Single read path for the aggregate dashboard view.
///
/// Each refresh replaces the whole snapshot in one step, so observers never
/// see new skills paired with old XP. A failed refresh keeps the last good
/// snapshot.
pub struct DashboardSync {
    session: Arc<Session>,
    skills: Arc<SkillStore>,
    snapshot: watch::Sender<Option<Arc<DashboardSnapshot>>>,
    issued: AtomicU64,
    applied: AtomicU64,
    closed: AtomicBool,
}

enum Publish {
    Published,
    Stale,
    Closed,
}

impl DashboardSync {
    pub fn new(session: Arc<Session>, skills: Arc<SkillStore>) -> Self {
        let (snapshot, _) = watch::channel(None);
        Self {
            session,
            skills,
            snapshot,
            issued: AtomicU64::new(0),
            applied: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Fetch `/dashboard/summary` and publish it.
    ///
    /// When refreshes overlap, a response older than one already published
    /// is dropped and the published snapshot is returned instead. The skill
    /// store is only re-seeded if no commit replaced it while the fetch was
    /// in flight.
    pub async fn refresh(&self) -> Result<Arc<DashboardSnapshot>, ClientError> {
        let backend = self.session.backend()?;
        let ticket = self.issued.fetch_add(1, Ordering::AcqRel) + 1;
        let revision = self.skills.revision();

        let fetched = match self.session.track(backend.fetch_dashboard().await) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(e) => {
                warn!(error = %e, "Dashboard refresh failed, keeping last snapshot");
                return Err(e);
            }
        };

        let mut outcome = Publish::Stale;
        self.snapshot.send_if_modified(|current| {
            if self.closed.load(Ordering::Acquire) {
                outcome = Publish::Closed;
                return false;
            }
            if self.applied.load(Ordering::Acquire) >= ticket {
                return false;
            }
            self.applied.store(ticket, Ordering::Release);
            if !self.skills.reseed(revision, fetched.user.skills.clone()) {
                debug!(ticket, "Skill set changed during refresh, keeping confirmed skills");
            }
            *current = Some(Arc::clone(&fetched));
            outcome = Publish::Published;
            true
        });

        match outcome {
            Publish::Published => {
                info!(
                    total_xp = fetched.user.total_xp,
                    league = %fetched.user.league(),
                    skills = fetched.user.skills.len(),
                    recommendations = fetched.recommendations.len(),
                    "Dashboard snapshot refreshed"
                );
                Ok(fetched)
            }
            Publish::Stale => {
                debug!(ticket, "Discarding dashboard response older than the published snapshot");
                Ok(self.snapshot().unwrap_or(fetched))
            }
            Publish::Closed => {
                debug!(ticket, "Dashboard closed, discarding response");
                Err(ClientError::SessionExpired)
            }
        }
    }

    /// Last good snapshot, if any refresh has succeeded
    pub fn snapshot(&self) -> Option<Arc<DashboardSnapshot>> {
        self.snapshot.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Arc<DashboardSnapshot>>> {
        self.snapshot.subscribe()
    }

    /// Drop the snapshot and ignore every later response
    pub(crate) fn close(&self) {
        self.snapshot.send_modify(|current| {
            self.closed.store(true, Ordering::Release);
            *current = None;
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::league::League;
    use crate::models::skill::SkillSet;
    use crate::testing::{session_with, FakeBackend};

    fn setup(backend: FakeBackend) -> (Arc<FakeBackend>, Arc<SkillStore>, DashboardSync) {
        let backend = Arc::new(backend);
        let store = Arc::new(SkillStore::new());
        let sync = DashboardSync::new(session_with(Arc::clone(&backend)), Arc::clone(&store));
        (backend, store, sync)
    }

    #[tokio::test]
    async fn test_refresh_publishes_snapshot_and_skills() {
        let (backend, store, sync) = setup(FakeBackend::with_skills(&["python", "docker"]));
        backend.set_total_xp(2_500);
        assert!(sync.snapshot().is_none());

        let snapshot = sync.refresh().await.unwrap();

        assert_eq!(snapshot.user.total_xp, 2_500);
        assert_eq!(snapshot.user.league(), League::Silver);
        assert_eq!(sync.snapshot().unwrap().user.total_xp, 2_500);
        assert_eq!(store.current_skills().to_names(), vec!["python", "docker"]);
    }

    #[tokio::test]
    async fn test_failed_refresh_keeps_last_snapshot() {
        let (backend, store, sync) = setup(FakeBackend::with_skills(&["rust"]));
        backend.set_total_xp(100);
        sync.refresh().await.unwrap();

        backend.set_total_xp(900);
        backend.fail_dashboard(Some(ClientError::Network("connection reset".to_string())));

        let result = sync.refresh().await;

        assert!(matches!(result, Err(ClientError::Network(_))));
        assert_eq!(sync.snapshot().unwrap().user.total_xp, 100);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_session_expired_stops_further_calls() {
        let (backend, _store, sync) = setup(FakeBackend::new());
        backend.fail_dashboard(Some(ClientError::SessionExpired));

        assert_eq!(sync.refresh().await.unwrap_err(), ClientError::SessionExpired);
        assert_eq!(sync.refresh().await.unwrap_err(), ClientError::SessionExpired);
        assert_eq!(backend.dashboard_calls(), 1);
    }

    #[tokio::test]
    async fn test_older_response_landing_late_is_dropped() {
        let (backend, store, sync) = setup(FakeBackend::with_skills(&["java"]));
        backend.set_total_xp(100);
        let hold = backend.hold_dashboard();

        let (first, second) = tokio::join!(sync.refresh(), async {
            backend.set_total_xp(500);
            backend.set_server_skills(&["java", "rust"]);
            let second = sync.refresh().await;
            hold.notify_one();
            second
        });

        assert_eq!(second.unwrap().user.total_xp, 500);
        assert_eq!(first.unwrap().user.total_xp, 500);
        assert_eq!(sync.snapshot().unwrap().user.total_xp, 500);
        assert_eq!(store.current_skills().to_names(), vec!["java", "rust"]);
        assert_eq!(backend.dashboard_calls(), 2);
    }

    #[tokio::test]
    async fn test_refresh_does_not_roll_back_direct_replacement() {
        let (backend, store, sync) = setup(FakeBackend::with_skills(&["java"]));
        let hold = backend.hold_dashboard();

        let (refreshed, _) = tokio::join!(sync.refresh(), async {
            store.replace_confirmed(&SkillSet::from_confirmed(["java", "go"]));
            hold.notify_one();
        });

        assert_eq!(
            refreshed.unwrap().user.skill_set(),
            SkillSet::from_confirmed(["java"])
        );
        assert_eq!(store.current_skills().to_names(), vec!["java", "go"]);
    }

    #[tokio::test]
    async fn test_response_after_close_is_discarded() {
        let (backend, store, sync) = setup(FakeBackend::with_skills(&["java"]));
        let hold = backend.hold_dashboard();

        let (refreshed, _) = tokio::join!(sync.refresh(), async {
            sync.close();
            store.close();
            hold.notify_one();
        });

        assert_eq!(refreshed.unwrap_err(), ClientError::SessionExpired);
        assert!(sync.snapshot().is_none());
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_subscribers_notified() {
        let (_backend, _store, sync) = setup(FakeBackend::new());
        let mut rx = sync.subscribe();

        sync.refresh().await.unwrap();

        assert!(rx.has_changed().unwrap());
        assert!(rx.borrow_and_update().is_some());
    }
}
