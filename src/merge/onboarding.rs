use crate::core::error::ValidationError;
use crate::models::profile::Identity;
use crate::models::skill::{SkillName, SkillSet};

/// Skills and display name collected during onboarding, before the first
/// save. Purely local; nothing here is confirmed by the backend.
#[derive(Debug, Clone, Default)]
pub struct OnboardingDraft {
    display_name: String,
    skills: SkillSet,
}

impl OnboardingDraft {
    pub fn new(display_name: &str) -> Self {
        Self {
            display_name: display_name.to_string(),
            skills: SkillSet::new(),
        }
    }

    /// Guests start without a name so they are prompted for a real one
    pub fn for_identity(identity: &Identity) -> Self {
        if identity.is_guest() {
            Self::new("")
        } else {
            Self::new(&identity.username)
        }
    }

    pub fn set_display_name(&mut self, name: &str) {
        self.display_name = name.to_string();
    }

    /// Trimmed display name, `None` when left blank
    pub fn display_name(&self) -> Option<&str> {
        let trimmed = self.display_name.trim();
        (!trimmed.is_empty()).then_some(trimmed)
    }

    pub fn add(&mut self, raw: &str) -> Result<bool, ValidationError> {
        Ok(self.skills.insert(SkillName::parse(raw)?))
    }

    pub fn remove(&mut self, raw: &str) -> Result<bool, ValidationError> {
        Ok(self.skills.remove(&SkillName::parse(raw)?))
    }

    /// Union extracted names into the draft. Returns how many were new.
    pub fn merge_extracted<S: AsRef<str>>(&mut self, extracted: &[S]) -> usize {
        let before = self.skills.len();
        self.skills = self.skills.union(&SkillSet::from_confirmed(extracted));
        self.skills.len() - before
    }

    pub fn skills(&self) -> &SkillSet {
        &self.skills
    }

    /// The skills to save; at least one is required
    pub fn validated_skills(&self) -> Result<&SkillSet, ValidationError> {
        if self.skills.is_empty() {
            return Err(ValidationError::NoSkills);
        }
        Ok(&self.skills)
    }
}
