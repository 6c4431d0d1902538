//! In-memory backend used by the unit tests.
//!
//! Behaves like the real server for the happy path (full-set replace,
//! XP accounting, dashboard aggregation) and lets a test script failures or
//! hold a question fetch open until released.

use crate::api::backend::Backend;
use crate::core::error::ClientError;
use crate::core::session::Session;
use crate::models::assessment::{AnswerPayload, AssessmentResult, HistoryEntry, Question, Submission};
use crate::models::dashboard::{DashboardSnapshot, DashboardUser};
use crate::models::league::League;
use crate::models::profile::{Identity, Profile};
use crate::models::skill::{Skill, SkillName, SkillSet};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
struct FakeState {
    skills: SkillSet,
    total_xp: u64,
    questions: HashMap<String, Result<Vec<Question>, ClientError>>,
    history: HashMap<String, Result<Vec<HistoryEntry>, ClientError>>,
    gates: HashMap<String, Arc<Notify>>,
    dashboard_hold: Option<Arc<Notify>>,
    replace_hold: Option<Arc<Notify>>,
    submit_hold: Option<Arc<Notify>>,
    submit_results: VecDeque<Result<AssessmentResult, ClientError>>,
    extracted: Vec<String>,
    replace_error: Option<ClientError>,
    dashboard_error: Option<ClientError>,
    replace_calls: Vec<(SkillSet, Option<String>)>,
    submissions: Vec<(String, Vec<AnswerPayload>)>,
    dashboard_calls: usize,
    question_calls: usize,
}

#[derive(Default)]
pub struct FakeBackend {
    state: Mutex<FakeState>,
}

/// `count` questions with ids `1..=count` and four options each
pub fn questions(skill: &str, count: u32) -> Vec<Question> {
    (1..=count)
        .map(|id| Question {
            id,
            prompt: format!("{} question {}", skill, id),
            options: vec![
                "first".to_string(),
                "second".to_string(),
                "third".to_string(),
                "fourth".to_string(),
            ],
            skill: Some(skill.to_string()),
        })
        .collect()
}

pub fn history_entry(skill: &str, score: f64) -> HistoryEntry {
    HistoryEntry {
        id: Some(1),
        skill: skill.to_string(),
        date: NaiveDate::from_ymd_opt(2026, 2, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap(),
        score,
        passed: score >= 70.0,
        xp_earned: Some(if score >= 70.0 { 1000 } else { 0 }),
    }
}

pub fn result(passed: bool, score: f64, xp_earned: u64) -> AssessmentResult {
    AssessmentResult {
        passed,
        score,
        xp_earned,
        new_total_xp: None,
    }
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_skills(skills: &[&str]) -> Self {
        let backend = Self::new();
        backend.state.lock().unwrap().skills = SkillSet::from_confirmed(skills);
        backend
    }

    pub fn set_total_xp(&self, xp: u64) {
        self.state.lock().unwrap().total_xp = xp;
    }

    pub fn set_questions(&self, skill: &str, questions: Vec<Question>) {
        self.state
            .lock()
            .unwrap()
            .questions
            .insert(skill.to_string(), Ok(questions));
    }

    pub fn fail_questions(&self, skill: &str, err: ClientError) {
        self.state
            .lock()
            .unwrap()
            .questions
            .insert(skill.to_string(), Err(err));
    }

    pub fn set_history(&self, skill: &str, history: Vec<HistoryEntry>) {
        self.state
            .lock()
            .unwrap()
            .history
            .insert(skill.to_string(), Ok(history));
    }

    pub fn fail_history(&self, skill: &str, err: ClientError) {
        self.state
            .lock()
            .unwrap()
            .history
            .insert(skill.to_string(), Err(err));
    }

    /// Hold question fetches for `skill` until the returned handle is notified
    pub fn gate_questions(&self, skill: &str) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.state
            .lock()
            .unwrap()
            .gates
            .insert(skill.to_string(), Arc::clone(&gate));
        gate
    }

    /// Hold the next dashboard fetch open until notified. The snapshot is
    /// taken when the call arrives, so it reflects the state at that point.
    pub fn hold_dashboard(&self) -> Arc<Notify> {
        let hold = Arc::new(Notify::new());
        self.state.lock().unwrap().dashboard_hold = Some(Arc::clone(&hold));
        hold
    }

    /// Apply the next skills replace but hold its response until notified
    pub fn hold_replace(&self) -> Arc<Notify> {
        let hold = Arc::new(Notify::new());
        self.state.lock().unwrap().replace_hold = Some(Arc::clone(&hold));
        hold
    }

    /// Grade the next submission but hold its response until notified
    pub fn hold_submit(&self) -> Arc<Notify> {
        let hold = Arc::new(Notify::new());
        self.state.lock().unwrap().submit_hold = Some(Arc::clone(&hold));
        hold
    }

    /// Change the server-side skill set behind the client's back
    pub fn set_server_skills(&self, skills: &[&str]) {
        self.state.lock().unwrap().skills = SkillSet::from_confirmed(skills);
    }

    pub fn push_submit_result(&self, result: Result<AssessmentResult, ClientError>) {
        self.state.lock().unwrap().submit_results.push_back(result);
    }

    pub fn set_extracted(&self, names: &[&str]) {
        self.state.lock().unwrap().extracted = names.iter().map(|n| n.to_string()).collect();
    }

    pub fn fail_replace(&self, err: Option<ClientError>) {
        self.state.lock().unwrap().replace_error = err;
    }

    pub fn fail_dashboard(&self, err: Option<ClientError>) {
        self.state.lock().unwrap().dashboard_error = err;
    }

    pub fn server_skills(&self) -> SkillSet {
        self.state.lock().unwrap().skills.clone()
    }

    pub fn replace_calls(&self) -> Vec<(SkillSet, Option<String>)> {
        self.state.lock().unwrap().replace_calls.clone()
    }

    pub fn submissions(&self) -> Vec<(String, Vec<AnswerPayload>)> {
        self.state.lock().unwrap().submissions.clone()
    }

    pub fn dashboard_calls(&self) -> usize {
        self.state.lock().unwrap().dashboard_calls
    }

    pub fn question_calls(&self) -> usize {
        self.state.lock().unwrap().question_calls
    }
}

#[async_trait]
impl Backend for FakeBackend {
    async fn fetch_profile(&self) -> Result<Profile, ClientError> {
        let state = self.state.lock().unwrap();
        Ok(Profile {
            id: 1,
            username: "ada".to_string(),
            email: Some("ada@example.com".to_string()),
            skills: state.skills.to_names(),
        })
    }

    async fn replace_skills(
        &self,
        skills: &SkillSet,
        display_name: Option<&str>,
    ) -> Result<SkillSet, ClientError> {
        let (confirmed, hold) = {
            let mut state = self.state.lock().unwrap();
            state
                .replace_calls
                .push((skills.clone(), display_name.map(str::to_string)));
            if let Some(err) = state.replace_error.clone() {
                return Err(err);
            }
            state.skills = skills.clone();
            (state.skills.clone(), state.replace_hold.take())
        };
        if let Some(hold) = hold {
            hold.notified().await;
        }
        Ok(confirmed)
    }

    async fn parse_resume(
        &self,
        _file_name: &str,
        _contents: Vec<u8>,
    ) -> Result<Vec<String>, ClientError> {
        Ok(self.state.lock().unwrap().extracted.clone())
    }

    async fn fetch_questions(&self, skill: &SkillName) -> Result<Vec<Question>, ClientError> {
        let gate = {
            let mut state = self.state.lock().unwrap();
            state.question_calls += 1;
            state.gates.get(skill.as_str()).cloned()
        };
        if let Some(gate) = gate {
            gate.notified().await;
        }
        let state = self.state.lock().unwrap();
        state
            .questions
            .get(skill.as_str())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn fetch_history(&self, skill: &SkillName) -> Result<Vec<HistoryEntry>, ClientError> {
        let state = self.state.lock().unwrap();
        state
            .history
            .get(skill.as_str())
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }

    async fn submit_assessment(
        &self,
        submission: &Submission,
    ) -> Result<AssessmentResult, ClientError> {
        let (outcome, hold) = {
            let mut state = self.state.lock().unwrap();
            state
                .submissions
                .push((submission.skill.clone(), submission.answers.clone()));
            let outcome = state
                .submit_results
                .pop_front()
                .unwrap_or_else(|| Ok(result(false, 0.0, 0)));
            if let Ok(result) = &outcome {
                state.total_xp += result.xp_earned;
            }
            let total_xp = state.total_xp;
            let outcome = outcome.map(|mut result| {
                result.new_total_xp = Some(total_xp);
                result
            });
            (outcome, state.submit_hold.take())
        };
        if let Some(hold) = hold {
            hold.notified().await;
        }
        outcome
    }

    async fn fetch_dashboard(&self) -> Result<DashboardSnapshot, ClientError> {
        let (snapshot, hold) = {
            let mut state = self.state.lock().unwrap();
            state.dashboard_calls += 1;
            if let Some(err) = state.dashboard_error.clone() {
                return Err(err);
            }
            let snapshot = DashboardSnapshot {
                user: DashboardUser {
                    username: "ada".to_string(),
                    total_xp: state.total_xp,
                    league: Some(League::for_xp(state.total_xp).to_string()),
                    skills: state.skills.iter().cloned().map(Skill::new).collect(),
                },
                trends: Vec::new(),
                recommendations: Vec::new(),
                news: Vec::new(),
                latest_results: Vec::new(),
            };
            (snapshot, state.dashboard_hold.take())
        };
        if let Some(hold) = hold {
            hold.notified().await;
        }
        Ok(snapshot)
    }
}

pub fn session_with(backend: Arc<FakeBackend>) -> Arc<Session> {
    Arc::new(Session::new(
        Identity {
            user_id: 1,
            username: "ada".to_string(),
        },
        backend,
    ))
}
