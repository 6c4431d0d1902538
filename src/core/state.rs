// Application state (AppState)

use crate::assessment::controller::AssessmentController;
use crate::core::session::Session;
use crate::merge::engine::MergeEngine;
use crate::stores::{history_cache::HistoryCache, skill_store::SkillStore};
use crate::sync::coordinator::DashboardSync;
use std::sync::{Arc, Weak};
use tracing::info;

/// Shared application state
///
/// Contains every component of one signed-in session. All fields are
/// wrapped in Arc so views can hold their own handles.
#[derive(Clone)]
pub struct AppState {
    /// Authenticated session context
    pub session: Arc<Session>,

    /// Confirmed skill set of the signed-in user
    pub skill_store: Arc<SkillStore>,

    /// Assessment history per skill
    pub history_cache: Arc<HistoryCache>,

    /// Aggregate dashboard snapshot
    pub dashboard: Arc<DashboardSync>,

    /// Skill-set mutations
    pub merge: Arc<MergeEngine>,

    /// Assessment state machine
    pub assessment: Arc<AssessmentController>,
}

impl AppState {
    pub fn new(session: Session) -> Self {
        let session = Arc::new(session);
        let skill_store = Arc::new(SkillStore::new());
        let history_cache = Arc::new(HistoryCache::new());

        let dashboard = Arc::new(DashboardSync::new(
            Arc::clone(&session),
            Arc::clone(&skill_store),
        ));

        let merge = Arc::new(MergeEngine::new(
            Arc::clone(&session),
            Arc::clone(&skill_store),
            Arc::clone(&dashboard),
        ));

        let assessment = Arc::new(AssessmentController::new(
            Arc::clone(&session),
            Arc::clone(&dashboard),
            Arc::clone(&history_cache),
        ));

        session.on_expire(discard_on_expiry(
            Arc::downgrade(&skill_store),
            Arc::downgrade(&history_cache),
            Arc::downgrade(&dashboard),
            Arc::downgrade(&assessment),
        ));

        Self {
            session,
            skill_store,
            history_cache,
            dashboard,
            merge,
            assessment,
        }
    }

    pub fn is_expired(&self) -> bool {
        self.session.is_expired()
    }

    /// End the session. Everything cached for this user is dropped, and
    /// responses still in flight are discarded when they land.
    pub fn logout(&self) {
        self.session.expire();

        info!(user_id = self.session.identity().user_id, "Signed out");
    }
}

// Components hold the session, so the hook only keeps weak handles
fn discard_on_expiry(
    skill_store: Weak<SkillStore>,
    history_cache: Weak<HistoryCache>,
    dashboard: Weak<DashboardSync>,
    assessment: Weak<AssessmentController>,
) -> impl FnOnce() + Send + Sync + 'static {
    move || {
        if let Some(assessment) = assessment.upgrade() {
            assessment.reset();
        }
        if let Some(dashboard) = dashboard.upgrade() {
            dashboard.close();
        }
        if let Some(skill_store) = skill_store.upgrade() {
            skill_store.close();
        }
        if let Some(history_cache) = history_cache.upgrade() {
            history_cache.clear();
        }
    }
}
