use crate::models::skill::{Skill, SkillName, SkillSet};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::watch;

/// Skills last confirmed by the backend.
///
/// Read-only outside the crate: only server-confirmed data (a commit
/// response, the profile, a dashboard snapshot) replaces the contents, and
/// always as a whole.
///
/// Direct replacements bump a revision. A dashboard snapshot only re-seeds
/// the store if no direct replacement happened after its fetch was issued,
/// so a slow snapshot cannot roll back a committed skill set. Once closed
/// (sign-out, expired session) the store stays empty.
pub struct SkillStore {
    skills: watch::Sender<Arc<Vec<Skill>>>,
    revision: AtomicU64,
    closed: AtomicBool,
}

impl SkillStore {
    pub fn new() -> Self {
        let (skills, _) = watch::channel(Arc::new(Vec::new()));
        Self {
            skills,
            revision: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Normalized names of the confirmed skills
    pub fn current_skills(&self) -> SkillSet {
        self.skills
            .borrow()
            .iter()
            .map(|skill| skill.name.clone())
            .collect()
    }

    /// Confirmed skills with display metadata, in display order
    pub fn skills(&self) -> Arc<Vec<Skill>> {
        Arc::clone(&self.skills.borrow())
    }

    pub fn contains(&self, name: &SkillName) -> bool {
        self.skills.borrow().iter().any(|skill| &skill.name == name)
    }

    /// Observe replacements of the confirmed set
    pub fn subscribe(&self) -> watch::Receiver<Arc<Vec<Skill>>> {
        self.skills.subscribe()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    pub(crate) fn revision(&self) -> u64 {
        self.revision.load(Ordering::Acquire)
    }

    /// Replace with a bare name set, e.g. the echo of a skills update.
    /// Metadata is carried over for names that survive. Returns false if
    /// the store is closed.
    pub(crate) fn replace_confirmed(&self, confirmed: &SkillSet) -> bool {
        self.skills.send_if_modified(|current| {
            if self.is_closed() {
                return false;
            }
            let next = confirmed
                .iter()
                .map(|name| {
                    current
                        .iter()
                        .find(|skill| &skill.name == name)
                        .cloned()
                        .unwrap_or_else(|| Skill::new(name.clone()))
                })
                .collect();
            *current = Arc::new(next);
            self.revision.fetch_add(1, Ordering::AcqRel);
            true
        })
    }

    /// Re-seed from a dashboard snapshot whose fetch was issued at
    /// `seen_revision`. Duplicates keep the first occurrence.
    ///
    /// Skipped (returns false) when the store was replaced directly since
    /// then, or is closed.
    pub(crate) fn reseed(&self, seen_revision: u64, skills: Vec<Skill>) -> bool {
        self.skills.send_if_modified(|current| {
            if self.is_closed() || self.revision() != seen_revision {
                return false;
            }
            let mut seen = SkillSet::new();
            let next = skills
                .into_iter()
                .filter(|skill| seen.insert(skill.name.clone()))
                .collect();
            *current = Arc::new(next);
            true
        })
    }

    /// Empty the store for good
    pub(crate) fn close(&self) {
        self.skills.send_modify(|current| {
            self.closed.store(true, Ordering::Release);
            self.revision.fetch_add(1, Ordering::AcqRel);
            *current = Arc::new(Vec::new());
        });
    }

    pub fn len(&self) -> usize {
        self.skills.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.skills.borrow().is_empty()
    }
}

impl Default for SkillStore {
    fn default() -> Self {
        Self::new()
    }
}
