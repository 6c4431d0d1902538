use crate::core::error::AssessmentError;
use crate::models::assessment::{Answers, AssessmentResult, HistoryEntry, Question, Submission};
use crate::models::skill::SkillName;
use std::fmt;

/// Phase of one assessment attempt.
///
/// `Passed` and `Failed` are the two completed outcomes. Both are terminal
/// for the attempt and allow a retry or a dismiss.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssessmentState {
    #[default]
    Idle,
    Loading,
    InProgress,
    Submitting,
    Passed,
    Failed,
}

impl AssessmentState {
    pub fn is_completed(self) -> bool {
        matches!(self, AssessmentState::Passed | AssessmentState::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            AssessmentState::Idle => "idle",
            AssessmentState::Loading => "loading",
            AssessmentState::InProgress => "in progress",
            AssessmentState::Submitting => "submitting",
            AssessmentState::Passed => "passed",
            AssessmentState::Failed => "failed",
        }
    }
}

impl fmt::Display for AssessmentState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything a view needs to render the assessment
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AssessmentView {
    pub state: AssessmentState,
    pub skill: Option<SkillName>,
    pub questions: Vec<Question>,
    pub answers: Answers,
    pub history: Vec<HistoryEntry>,
    pub result: Option<AssessmentResult>,
    pub last_error: Option<String>,
}

impl AssessmentView {
    pub(crate) fn loading(skill: SkillName) -> Self {
        Self {
            state: AssessmentState::Loading,
            skill: Some(skill),
            ..Self::default()
        }
    }

    /// Questions are loaded and answers can be collected. An empty question
    /// list is never ready.
    pub fn is_ready(&self) -> bool {
        self.state == AssessmentState::InProgress && !self.questions.is_empty()
    }

    /// Number of fetched questions that have a selection
    pub fn answered(&self) -> usize {
        self.questions
            .iter()
            .filter(|question| self.answers.contains_key(&question.id))
            .count()
    }

    pub fn total(&self) -> usize {
        self.questions.len()
    }

    pub fn can_submit(&self) -> bool {
        self.is_ready() && self.answered() == self.total()
    }

    pub(crate) fn require(
        &self,
        operation: &'static str,
        allowed: &[AssessmentState],
    ) -> Result<(), AssessmentError> {
        if allowed.contains(&self.state) {
            Ok(())
        } else {
            Err(AssessmentError::InvalidState {
                operation,
                state: self.state.as_str(),
            })
        }
    }

    /// Package the answers for submission, enforcing the gate: in progress,
    /// questions loaded, and every question answered.
    pub(crate) fn prepare_submission(&self) -> Result<Submission, AssessmentError> {
        self.require("submit", &[AssessmentState::InProgress])?;

        let skill = match &self.skill {
            Some(skill) if !self.questions.is_empty() => skill,
            Some(skill) => return Err(AssessmentError::NotReady(skill.to_string())),
            None => return Err(AssessmentError::NotReady(String::new())),
        };

        let answered = self.answered();
        if answered < self.total() {
            return Err(AssessmentError::Incomplete {
                answered,
                total: self.total(),
            });
        }

        Ok(Submission::new(skill.as_str(), &self.answers))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::questions;

    fn in_progress(count: u32) -> AssessmentView {
        AssessmentView {
            state: AssessmentState::InProgress,
            skill: Some(SkillName::parse("python").unwrap()),
            questions: questions("python", count),
            ..AssessmentView::default()
        }
    }

    #[test]
    fn test_default_is_idle() {
        let view = AssessmentView::default();
        assert_eq!(view.state, AssessmentState::Idle);
        assert!(!view.is_ready());
        assert!(!view.can_submit());
    }

    #[test]
    fn test_completed_states() {
        assert!(AssessmentState::Passed.is_completed());
        assert!(AssessmentState::Failed.is_completed());
        assert!(!AssessmentState::Submitting.is_completed());
    }

    #[test]
    fn test_gate_blocks_partial_answers() {
        let mut view = in_progress(3);
        view.answers.insert(1, 0);
        view.answers.insert(2, 1);

        assert!(!view.can_submit());
        assert_eq!(
            view.prepare_submission().unwrap_err(),
            AssessmentError::Incomplete {
                answered: 2,
                total: 3
            }
        );

        view.answers.insert(3, 3);
        assert!(view.can_submit());
        assert_eq!(view.prepare_submission().unwrap().answers.len(), 3);
    }

    #[test]
    fn test_empty_question_list_is_not_ready() {
        let view = in_progress(0);
        assert!(!view.is_ready());
        assert_eq!(
            view.prepare_submission().unwrap_err(),
            AssessmentError::NotReady("python".to_string())
        );
    }

    #[test]
    fn test_answers_for_unknown_questions_do_not_count() {
        let mut view = in_progress(2);
        view.answers.insert(1, 0);
        view.answers.insert(99, 0);
        assert_eq!(view.answered(), 1);
        assert!(!view.can_submit());
    }

    #[test]
    fn test_submit_outside_in_progress() {
        let mut view = in_progress(1);
        view.answers.insert(1, 0);
        view.state = AssessmentState::Loading;

        assert_eq!(
            view.prepare_submission().unwrap_err(),
            AssessmentError::InvalidState {
                operation: "submit",
                state: "loading"
            }
        );
    }
}
