use crate::api::backend::Backend;
use crate::core::error::ClientError;
use crate::models::assessment::{AssessmentResult, HistoryEntry, Question, QuestionSet, Submission};
use crate::models::dashboard::DashboardSnapshot;
use crate::models::profile::Profile;
use crate::models::skill::{SkillName, SkillSet};
use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// API client for communicating with the Skill Radar backend
#[derive(Clone)]
pub struct ApiClient {
    client: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// Response of the `/auth/*` endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
    pub user_id: i64,
    pub username: String,
}

#[derive(Debug, Serialize)]
struct SkillsUpdate<'a> {
    skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct SkillsUpdateResponse {
    #[serde(default)]
    skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
struct ResumeResponse {
    #[serde(default)]
    extracted_skills: Vec<String>,
}

impl ApiClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: None,
        })
    }

    /// A copy of this client that sends `token` as the bearer credential.
    /// Shares the underlying connection pool.
    pub fn with_token(&self, token: String) -> Self {
        Self {
            client: self.client.clone(),
            base_url: self.base_url.clone(),
            token: Some(token),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<AuthResponse, ClientError> {
        let request = self
            .client
            .post(self.url("/auth/login"))
            .json(&LoginRequest { email, password });
        self.send_unauthenticated(request).await
    }

    pub async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<AuthResponse, ClientError> {
        let request = self.client.post(self.url("/auth/register")).json(&RegisterRequest {
            username,
            email,
            password,
        });
        self.send_unauthenticated(request).await
    }

    pub async fn guest(&self) -> Result<AuthResponse, ClientError> {
        let request = self.client.post(self.url("/auth/guest"));
        self.send_unauthenticated(request).await
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn authorize(&self, request: RequestBuilder) -> Result<RequestBuilder, ClientError> {
        match &self.token {
            Some(token) => Ok(request.bearer_auth(token)),
            None => Err(ClientError::SessionExpired),
        }
    }

    async fn send_unauthenticated<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> Result<T, ClientError> {
        let response = request.send().await?;
        let response = Self::check_status(response, false).await?;
        Ok(response.json::<T>().await?)
    }

    async fn send_json<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, ClientError> {
        let response = self.authorize(request)?.send().await?;
        let response = Self::check_status(response, true).await?;
        Ok(response.json::<T>().await?)
    }

    /// Map a non-success status to the error taxonomy.
    ///
    /// On authenticated calls 401/403 means the session is gone. On auth
    /// calls the same statuses are ordinary rejections (wrong password).
    async fn check_status(response: Response, authenticated: bool) -> Result<Response, ClientError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if authenticated && matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
            warn!(status = status.as_u16(), "Backend rejected bearer credential");
            return Err(ClientError::SessionExpired);
        }

        let body = response.text().await.unwrap_or_default();
        let reason = rejection_reason(status, &body);
        debug!(status = status.as_u16(), reason = %reason, "Backend rejected request");

        Err(ClientError::RemoteRejection {
            status: status.as_u16(),
            reason,
        })
    }
}

/// Pull the human readable reason out of an error body (`{"detail": ...}`)
fn rejection_reason(status: StatusCode, body: &str) -> String {
    let detail = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("detail").cloned());

    match detail {
        Some(serde_json::Value::String(reason)) => reason,
        Some(other) => other.to_string(),
        None if !body.trim().is_empty() => body.trim().to_string(),
        None => status
            .canonical_reason()
            .unwrap_or("Request failed")
            .to_string(),
    }
}

#[async_trait]
impl Backend for ApiClient {
    async fn fetch_profile(&self) -> Result<Profile, ClientError> {
        self.send_json(self.client.get(self.url("/user/me"))).await
    }

    async fn replace_skills(
        &self,
        skills: &SkillSet,
        display_name: Option<&str>,
    ) -> Result<SkillSet, ClientError> {
        let body = SkillsUpdate {
            skills: skills.to_names(),
            name: display_name,
        };
        let response: SkillsUpdateResponse = self
            .send_json(self.client.post(self.url("/user/skills")).json(&body))
            .await?;

        // Older servers answer with a bare message; a success status then
        // confirms exactly what was sent.
        Ok(match response.skills {
            Some(confirmed) => SkillSet::from_confirmed(confirmed),
            None => skills.clone(),
        })
    }

    async fn parse_resume(
        &self,
        file_name: &str,
        contents: Vec<u8>,
    ) -> Result<Vec<String>, ClientError> {
        let part = reqwest::multipart::Part::bytes(contents).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response: ResumeResponse = self
            .send_json(self.client.post(self.url("/resume/parse")).multipart(form))
            .await?;
        Ok(response.extracted_skills)
    }

    async fn fetch_questions(&self, skill: &SkillName) -> Result<Vec<Question>, ClientError> {
        let request = self
            .client
            .get(self.url("/user/assessments/questions"))
            .query(&[("skill", skill.as_str())]);
        let set: QuestionSet = self.send_json(request).await?;
        Ok(set.questions)
    }

    async fn fetch_history(&self, skill: &SkillName) -> Result<Vec<HistoryEntry>, ClientError> {
        let request = self
            .client
            .get(self.url("/user/assessments/history"))
            .query(&[("skill", skill.as_str())]);
        self.send_json(request).await
    }

    async fn submit_assessment(
        &self,
        submission: &Submission,
    ) -> Result<AssessmentResult, ClientError> {
        let request = self
            .client
            .post(self.url("/user/assessments/submit"))
            .json(submission);
        self.send_json(request).await
    }

    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, ClientError> {
        self.send_json(self.client.get(self.url("/dashboard/summary"))).await
    }
}
