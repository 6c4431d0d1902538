use crate::core::error::ClientError;
use crate::models::assessment::{AssessmentResult, HistoryEntry, Question, Submission};
use crate::models::dashboard::DashboardSnapshot;
use crate::models::profile::Profile;
use crate::models::skill::{SkillName, SkillSet};
use async_trait::async_trait;

/// Authenticated remote operations consumed by the client core.
///
/// [`crate::api::client::ApiClient`] implements this over HTTP; tests swap in
/// an in-memory backend.
#[async_trait]
pub trait Backend: Send + Sync {
    /// `GET /user/me`
    async fn fetch_profile(&self) -> Result<Profile, ClientError>;

    /// `POST /user/skills`: full-set replace. Returns the set the server
    /// confirmed.
    async fn replace_skills(
        &self,
        skills: &SkillSet,
        display_name: Option<&str>,
    ) -> Result<SkillSet, ClientError>;

    /// `POST /resume/parse`: returns the raw extracted skill names
    async fn parse_resume(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Vec<String>, ClientError>;

    /// `GET /user/assessments/questions?skill=S`
    async fn fetch_questions(&self, skill: &SkillName) -> Result<Vec<Question>, ClientError>;

    /// `GET /user/assessments/history?skill=S`
    async fn fetch_history(&self, skill: &SkillName) -> Result<Vec<HistoryEntry>, ClientError>;

    /// `POST /user/assessments/submit`
    async fn submit_assessment(
        &self,
        submission: &Submission,
    ) -> Result<AssessmentResult, ClientError>;

    /// `GET /dashboard/summary`
    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, ClientError>;
}
