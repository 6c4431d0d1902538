use crate::models::skill::SkillSet;
use serde::{Deserialize, Serialize};

/// Identity of the authenticated user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub user_id: i64,
    pub username: String,
}

impl Identity {
    /// Guest accounts get a generated `Guest_xxxxxxxx` username
    pub fn is_guest(&self) -> bool {
        self.username.starts_with("Guest_")
    }
}

/// Response of `GET /user/me`
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Profile {
    pub id: i64,
    pub username: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
}

impl Profile {
    pub fn skill_set(&self) -> SkillSet {
        SkillSet::from_confirmed(&self.skills)
    }
}
