use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Selected option index per question id
pub type Answers = BTreeMap<u32, usize>;

/// A multiple-choice question. The option index is the answer key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: u32,
    #[serde(rename = "question")]
    pub prompt: String,
    pub options: Vec<String>,
    #[serde(default)]
    pub skill: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct QuestionSet {
    #[serde(default)]
    pub questions: Vec<Question>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerPayload {
    pub question_id: u32,
    pub selected_option: usize,
}

#[derive(Debug, Serialize)]
pub struct Submission {
    pub skill: String,
    pub answers: Vec<AnswerPayload>,
}

impl Submission {
    pub fn new(skill: &str, answers: &Answers) -> Self {
        Self {
            skill: skill.to_string(),
            answers: answers
                .iter()
                .map(|(&question_id, &selected_option)| AnswerPayload {
                    question_id,
                    selected_option,
                })
                .collect(),
        }
    }
}

/// Outcome of one submission, scored by the backend (pass at 70%)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    #[serde(deserialize_with = "crate::utils::flag::deserialize")]
    pub passed: bool,
    pub score: f64,
    #[serde(default)]
    pub xp_earned: u64,
    #[serde(default)]
    pub new_total_xp: Option<u64>,
}

/// One past attempt. Read-only, newest first.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(default)]
    pub id: Option<i64>,
    pub skill: String,
    pub date: NaiveDateTime,
    pub score: f64,
    #[serde(deserialize_with = "crate::utils::flag::deserialize")]
    pub passed: bool,
    #[serde(default)]
    pub xp_earned: Option<u64>,
}
