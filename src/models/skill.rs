use crate::core::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A trimmed, lowercased skill name. Never empty.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SkillName(String);

impl SkillName {
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let normalized = raw.trim().to_lowercase();
        if normalized.is_empty() {
            return Err(ValidationError::EmptySkillName);
        }
        Ok(Self(normalized))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for SkillName {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        SkillName::parse(&value)
    }
}

impl From<SkillName> for String {
    fn from(name: SkillName) -> Self {
        name.0
    }
}

impl AsRef<str> for SkillName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SkillName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A skill as shown on the dashboard, with optional display metadata
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Skill {
    #[serde(rename = "skill_name")]
    pub name: SkillName,
    #[serde(default)]
    pub proficiency: Option<u32>,
    #[serde(default, deserialize_with = "crate::utils::flag::deserialize")]
    pub validated: bool,
}

impl Skill {
    pub fn new(name: SkillName) -> Self {
        Self {
            name,
            proficiency: None,
            validated: false,
        }
    }
}

/// Deduplicated collection of skill names.
///
/// Semantically a set: equality ignores order. Iteration follows insertion
/// order so views can display skills the way they were added.
#[derive(Clone, Debug, Default, Serialize)]
#[serde(transparent)]
pub struct SkillSet {
    names: Vec<SkillName>,
}

impl SkillSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a set from names confirmed by the backend, skipping blanks.
    pub fn from_confirmed<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .filter_map(|name| SkillName::parse(name.as_ref()).ok())
            .collect()
    }

    /// Insert a name. Returns false if it was already present.
    pub fn insert(&mut self, name: SkillName) -> bool {
        if self.names.contains(&name) {
            return false;
        }
        self.names.push(name);
        true
    }

    /// Remove a name. Returns false if it was not present.
    pub fn remove(&mut self, name: &SkillName) -> bool {
        let before = self.names.len();
        self.names.retain(|existing| existing != name);
        self.names.len() != before
    }

    pub fn contains(&self, name: &SkillName) -> bool {
        self.names.contains(name)
    }

    pub fn union(&self, other: &SkillSet) -> SkillSet {
        let mut merged = self.clone();
        for name in other.iter() {
            merged.insert(name.clone());
        }
        merged
    }

    pub fn iter(&self) -> impl Iterator<Item = &SkillName> {
        self.names.iter()
    }

    /// Names in insertion order, ready for a request body
    pub fn to_names(&self) -> Vec<String> {
        self.names.iter().map(|name| name.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl PartialEq for SkillSet {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().all(|name| other.contains(name))
    }
}

impl Eq for SkillSet {}

impl FromIterator<SkillName> for SkillSet {
    fn from_iter<T: IntoIterator<Item = SkillName>>(iter: T) -> Self {
        let mut set = SkillSet::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<'a> IntoIterator for &'a SkillSet {
    type Item = &'a SkillName;
    type IntoIter = std::slice::Iter<'a, SkillName>;

    fn into_iter(self) -> Self::IntoIter {
        self.names.iter()
    }
}
