use crate::models::assessment::HistoryEntry;
use crate::models::league::League;
use crate::models::skill::{Skill, SkillSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Aggregate read-model returned by `GET /dashboard/summary`
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DashboardSnapshot {
    pub user: DashboardUser,
    #[serde(default)]
    pub trends: Vec<TrendPoint>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    #[serde(default)]
    pub news: Vec<NewsItem>,
    #[serde(default)]
    pub latest_results: Vec<HistoryEntry>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardUser {
    pub username: String,
    #[serde(default)]
    pub total_xp: u64,
    #[serde(default)]
    pub league: Option<String>,
    #[serde(default)]
    pub skills: Vec<Skill>,
}

impl DashboardUser {
    pub fn skill_set(&self) -> SkillSet {
        self.skills.iter().map(|skill| skill.name.clone()).collect()
    }

    /// League reported by the backend, falling back to the XP ladder
    pub fn league(&self) -> League {
        self.league
            .as_deref()
            .and_then(|name| name.parse().ok())
            .unwrap_or_else(|| League::for_xp(self.total_xp))
    }
}

/// One month of market interest, keyed by skill
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub name: String,
    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recommendation {
    pub name: String,
    #[serde(default)]
    pub xp: u64,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub target_skill: Option<String>,
    #[serde(default)]
    pub platform: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
}
