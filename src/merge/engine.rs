use crate::core::error::SkillError;
use crate::core::session::Session;
use crate::merge::onboarding::OnboardingDraft;
use crate::models::skill::{SkillName, SkillSet};
use crate::stores::skill_store::SkillStore;
use crate::sync::coordinator::DashboardSync;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// Result of a skill mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// The change left the confirmed set as it was; nothing was sent
    Unchanged,
    /// The backend confirmed this set
    Committed(SkillSet),
}

/// Computes the next full skill set for a change and persists it as one
/// replace call.
///
/// Mutations are serialized, so each one is computed against the set the
/// previous one left behind.
pub struct MergeEngine {
    session: Arc<Session>,
    store: Arc<SkillStore>,
    sync: Arc<DashboardSync>,
    commit_lock: Mutex<()>,
}

impl MergeEngine {
    pub fn new(session: Arc<Session>, store: Arc<SkillStore>, sync: Arc<DashboardSync>) -> Self {
        Self {
            session,
            store,
            sync,
            commit_lock: Mutex::new(()),
        }
    }

    /// Add one skill. Blank names are rejected before any network call.
    pub async fn add(&self, raw: &str) -> Result<CommitOutcome, SkillError> {
        let name = SkillName::parse(raw)?;
        let _guard = self.commit_lock.lock().await;

        let mut next = self.store.current_skills();
        if !next.insert(name.clone()) {
            debug!(skill = %name, "Skill already present");
            return Ok(CommitOutcome::Unchanged);
        }
        self.commit_locked(next, None).await
    }

    pub async fn remove(&self, raw: &str) -> Result<CommitOutcome, SkillError> {
        let name = SkillName::parse(raw)?;
        let _guard = self.commit_lock.lock().await;

        let mut next = self.store.current_skills();
        if !next.remove(&name) {
            debug!(skill = %name, "Skill not present, nothing to remove");
            return Ok(CommitOutcome::Unchanged);
        }
        self.commit_locked(next, None).await
    }

    /// Union the confirmed set with extracted names. Blank entries are
    /// skipped.
    pub async fn merge_extracted<S: AsRef<str>>(
        &self,
        extracted: &[S],
    ) -> Result<CommitOutcome, SkillError> {
        let incoming = SkillSet::from_confirmed(extracted);
        let _guard = self.commit_lock.lock().await;

        let current = self.store.current_skills();
        let next = current.union(&incoming);
        if next.len() == current.len() {
            debug!(extracted = extracted.len(), "No new skills extracted");
            return Ok(CommitOutcome::Unchanged);
        }
        info!(
            extracted = extracted.len(),
            added = next.len() - current.len(),
            "Merging extracted skills"
        );
        self.commit_locked(next, None).await
    }

    /// Upload a resume and return the raw extracted names
    pub async fn extract_resume(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Vec<String>, SkillError> {
        let backend = self.session.backend()?;
        info!(file_name, bytes = contents.len(), "Uploading resume for skill extraction");

        let extracted = self
            .session
            .track(backend.parse_resume(file_name, contents).await)
            .map_err(|e| {
                warn!(file_name, error = %e, "Resume extraction failed");
                e
            })?;

        info!(file_name, extracted = extracted.len(), "Resume parsed");
        Ok(extracted)
    }

    /// Upload a resume and merge whatever it yields into the skill set
    pub async fn import_resume(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<CommitOutcome, SkillError> {
        let extracted = self.extract_resume(file_name, contents).await?;
        self.merge_extracted(&extracted).await
    }

    /// Bulk-save the onboarding draft together with the display name
    pub async fn save_onboarding(&self, draft: &OnboardingDraft) -> Result<CommitOutcome, SkillError> {
        let skills = draft.validated_skills()?;
        let _guard = self.commit_lock.lock().await;
        self.commit_locked(skills.clone(), draft.display_name()).await
    }

    /// Persist `next` as the full skill set
    pub async fn commit(&self, next: SkillSet) -> Result<CommitOutcome, SkillError> {
        let _guard = self.commit_lock.lock().await;
        self.commit_locked(next, None).await
    }

    async fn commit_locked(
        &self,
        next: SkillSet,
        display_name: Option<&str>,
    ) -> Result<CommitOutcome, SkillError> {
        let backend = self.session.backend()?;
        info!(skills = next.len(), renamed = display_name.is_some(), "Committing skill set");

        let confirmed = match self
            .session
            .track(backend.replace_skills(&next, display_name).await)
        {
            Ok(confirmed) => confirmed,
            Err(e) => {
                warn!(error = %e, "Skill update failed, keeping confirmed set");
                return Err(e.into());
            }
        };

        if !self.store.replace_confirmed(&confirmed) {
            warn!("Skill store closed while the update was in flight, discarding confirmation");
            return Err(SkillError::SessionExpired);
        }

        if let Err(e) = self.sync.refresh().await {
            warn!(error = %e, "Dashboard refresh after skill update failed");
        }

        Ok(CommitOutcome::Committed(confirmed))
    }
}
