use crate::assessment::state::{AssessmentState, AssessmentView};
use crate::core::error::{AssessmentError, ClientError, ValidationError};
use crate::core::session::Session;
use crate::models::assessment::{AssessmentResult, HistoryEntry, Question};
use crate::models::skill::SkillName;
use crate::stores::history_cache::HistoryCache;
use crate::sync::coordinator::DashboardSync;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Drives one skill assessment at a time:
/// `Idle -> Loading -> InProgress -> Submitting -> Passed | Failed`.
///
/// Every `start` takes a new generation number. Fetch results carrying an
/// older generation are dropped, so a slow response for a previous skill
/// never overwrites the current attempt.
pub struct AssessmentController {
    session: Arc<Session>,
    sync: Arc<DashboardSync>,
    history_cache: Arc<HistoryCache>,
    view: watch::Sender<AssessmentView>,
    generation: AtomicU64,
}

impl AssessmentController {
    pub fn new(
        session: Arc<Session>,
        sync: Arc<DashboardSync>,
        history_cache: Arc<HistoryCache>,
    ) -> Self {
        let (view, _) = watch::channel(AssessmentView::default());
        Self {
            session,
            sync,
            history_cache,
            view,
            generation: AtomicU64::new(0),
        }
    }

    pub fn view(&self) -> AssessmentView {
        self.view.borrow().clone()
    }

    pub fn state(&self) -> AssessmentState {
        self.view.borrow().state
    }

    pub fn subscribe(&self) -> watch::Receiver<AssessmentView> {
        self.view.subscribe()
    }

    /// Unconditional return to `Idle`, used on sign-out
    pub(crate) fn reset(&self) {
        self.view.send_modify(|view| {
            self.generation.fetch_add(1, Ordering::AcqRel);
            *view = AssessmentView::default();
        });
    }

    /// Begin an attempt for `skill`: reset, then fetch questions and history
    /// together.
    ///
    /// Either fetch may fail on its own. A failed history fetch leaves the
    /// history empty; a failed or empty question fetch keeps the attempt in
    /// `Loading` (not ready) and returns the error.
    pub async fn start(&self, skill: &str) -> Result<(), AssessmentError> {
        let skill = SkillName::parse(skill)?;
        let backend = self.session.backend()?;

        let generation = self.transition(|view| {
            view.require(
                "start",
                &[
                    AssessmentState::Idle,
                    AssessmentState::Loading,
                    AssessmentState::InProgress,
                    AssessmentState::Passed,
                    AssessmentState::Failed,
                ],
            )?;
            *view = AssessmentView::loading(skill.clone());
            Ok(self.generation.fetch_add(1, Ordering::AcqRel) + 1)
        })?;

        info!(skill = %skill, generation, "Loading assessment");

        let (questions, history) = tokio::join!(
            backend.fetch_questions(&skill),
            backend.fetch_history(&skill)
        );
        let questions = self.session.track(questions);
        let history = self.session.track(history);

        self.apply_loaded(generation, &skill, questions, history)
    }

    /// Start over for `skill` after a completed attempt. Questions are
    /// fetched fresh.
    pub async fn retry(&self, skill: &str) -> Result<(), AssessmentError> {
        self.view
            .borrow()
            .require("retry", &[AssessmentState::Passed, AssessmentState::Failed])?;
        self.start(skill).await
    }

    /// Leave the assessment and return to `Idle`. Any fetch still in flight
    /// is ignored when it lands.
    pub fn dismiss(&self) -> Result<(), AssessmentError> {
        self.transition(|view| {
            if view.state == AssessmentState::Submitting {
                return Err(AssessmentError::InvalidState {
                    operation: "dismiss",
                    state: view.state.as_str(),
                });
            }
            self.generation.fetch_add(1, Ordering::AcqRel);
            *view = AssessmentView::default();
            Ok(())
        })
    }

    /// Record the selected option for a question. Last write wins.
    pub fn select_answer(&self, question_id: u32, option: usize) -> Result<(), AssessmentError> {
        self.transition(|view| {
            view.require("select an answer", &[AssessmentState::InProgress])?;

            let question = view
                .questions
                .iter()
                .find(|question| question.id == question_id)
                .ok_or(ValidationError::UnknownQuestion(question_id))?;

            if option >= question.options.len() {
                return Err(ValidationError::OptionOutOfRange {
                    question_id,
                    option,
                    options: question.options.len(),
                }
                .into());
            }

            view.answers.insert(question_id, option);
            Ok(())
        })
    }

    /// Submit the collected answers.
    ///
    /// Only allowed once every fetched question has a selection. On failure
    /// the attempt returns to `InProgress` with its answers intact so the
    /// user can submit again.
    pub async fn submit(&self) -> Result<AssessmentResult, AssessmentError> {
        let backend = self.session.backend()?;

        let (generation, submission) = self.transition(|view| {
            let submission = view.prepare_submission()?;
            view.state = AssessmentState::Submitting;
            view.last_error = None;
            Ok((self.generation.load(Ordering::Acquire), submission))
        })?;

        info!(
            skill = %submission.skill,
            answers = submission.answers.len(),
            "Submitting assessment"
        );

        let outcome = self.session.track(backend.submit_assessment(&submission).await);

        let mut current = true;
        self.view.send_if_modified(|view| {
            if self.generation.load(Ordering::Acquire) != generation {
                current = false;
                return false;
            }
            match &outcome {
                Ok(result) => {
                    view.state = if result.passed {
                        AssessmentState::Passed
                    } else {
                        AssessmentState::Failed
                    };
                    view.result = Some(result.clone());
                }
                Err(e) => {
                    view.state = AssessmentState::InProgress;
                    view.last_error = Some(e.to_string());
                }
            }
            true
        });

        let result = match outcome {
            Ok(result) => result,
            Err(e) => {
                warn!(skill = %submission.skill, error = %e, "Assessment submission failed");
                return Err(e.into());
            }
        };

        if !current {
            debug!(skill = %submission.skill, generation, "Assessment reset during submission, discarding result");
            return Err(AssessmentError::Superseded);
        }

        info!(
            skill = %submission.skill,
            passed = result.passed,
            score = result.score,
            xp_earned = result.xp_earned,
            "Assessment completed"
        );

        if let Err(e) = self.sync.refresh().await {
            warn!(error = %e, "Dashboard refresh after assessment failed");
        }

        Ok(result)
    }

    fn apply_loaded(
        &self,
        generation: u64,
        skill: &SkillName,
        questions: Result<Vec<Question>, ClientError>,
        history: Result<Vec<HistoryEntry>, ClientError>,
    ) -> Result<(), AssessmentError> {
        let mut outcome = Ok(());
        let expired = matches!(&questions, Err(e) if e.is_session_expired())
            || matches!(&history, Err(e) if e.is_session_expired());

        self.view.send_if_modified(|view| {
            if self.generation.load(Ordering::Acquire) != generation {
                debug!(skill = %skill, generation, "Discarding stale assessment data");
                outcome = Err(if expired {
                    ClientError::SessionExpired.into()
                } else {
                    AssessmentError::Superseded
                });
                return false;
            }

            if expired {
                warn!(skill = %skill, "Session expired while loading assessment");
                view.last_error = Some(ClientError::SessionExpired.to_string());
                outcome = Err(ClientError::SessionExpired.into());
                return true;
            }

            match history {
                Ok(entries) => {
                    self.history_cache.put(skill.clone(), entries.clone());
                    view.history = entries;
                }
                Err(e) => {
                    warn!(skill = %skill, error = %e, "Failed to fetch assessment history");
                }
            }

            match questions {
                Ok(questions) if !questions.is_empty() => {
                    info!(skill = %skill, questions = questions.len(), "Assessment ready");
                    view.questions = questions;
                    view.state = AssessmentState::InProgress;
                }
                Ok(_) => {
                    warn!(skill = %skill, "Backend returned no questions");
                    let err = AssessmentError::NotReady(skill.to_string());
                    view.last_error = Some(err.to_string());
                    outcome = Err(err);
                }
                Err(e) => {
                    warn!(skill = %skill, error = %e, "Failed to fetch assessment questions");
                    view.last_error = Some(e.to_string());
                    outcome = Err(e.into());
                }
            }

            true
        });

        outcome
    }

    /// Check and apply a transition against the current view in one step.
    /// Observers are notified only when the transition succeeds.
    fn transition<T>(
        &self,
        apply: impl FnOnce(&mut AssessmentView) -> Result<T, AssessmentError>,
    ) -> Result<T, AssessmentError> {
        let mut outcome = None;
        self.view.send_if_modified(|view| {
            let result = apply(view);
            let applied = result.is_ok();
            outcome = Some(result);
            applied
        });
        outcome.unwrap_or(Err(AssessmentError::Superseded))
    }
}
