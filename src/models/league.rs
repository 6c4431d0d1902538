use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Rank tier derived from accumulated XP
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum League {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

const LADDER: [(League, u64); 5] = [
    (League::Bronze, 0),
    (League::Silver, 2_000),
    (League::Gold, 5_000),
    (League::Platinum, 10_000),
    (League::Diamond, 25_000),
];

impl League {
    pub fn for_xp(total_xp: u64) -> League {
        LADDER
            .iter()
            .rev()
            .find(|(_, threshold)| total_xp >= *threshold)
            .map(|(league, _)| *league)
            .unwrap_or(League::Bronze)
    }

    pub fn threshold(self) -> u64 {
        LADDER
            .iter()
            .find(|(league, _)| *league == self)
            .map(|(_, threshold)| *threshold)
            .unwrap_or(0)
    }

    pub fn next(self) -> Option<League> {
        LADDER
            .iter()
            .map(|(league, _)| *league)
            .find(|league| *league > self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            League::Bronze => "Bronze",
            League::Silver => "Silver",
            League::Gold => "Gold",
            League::Platinum => "Platinum",
            League::Diamond => "Diamond",
        }
    }
}

/// XP still needed to reach the next league, `None` at the top tier
pub fn xp_to_next_league(total_xp: u64) -> Option<u64> {
    League::for_xp(total_xp)
        .next()
        .map(|next| next.threshold().saturating_sub(total_xp))
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for League {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LADDER
            .iter()
            .map(|(league, _)| *league)
            .find(|league| league.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown league: {}", s))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_for_xp_boundaries() {
        assert_eq!(League::for_xp(0), League::Bronze);
        assert_eq!(League::for_xp(1_999), League::Bronze);
        assert_eq!(League::for_xp(2_000), League::Silver);
        assert_eq!(League::for_xp(9_999), League::Gold);
        assert_eq!(League::for_xp(10_000), League::Platinum);
        assert_eq!(League::for_xp(1_000_000), League::Diamond);
    }

    #[test]
    fn test_xp_to_next_league() {
        assert_eq!(xp_to_next_league(0), Some(2_000));
        assert_eq!(xp_to_next_league(4_500), Some(500));
        assert_eq!(xp_to_next_league(25_000), None);
    }

    #[test]
    fn test_parse_league() {
        assert_eq!("gold".parse::<League>(), Ok(League::Gold));
        assert_eq!(" Diamond ".parse::<League>(), Ok(League::Diamond));
        assert!("Unranked".parse::<League>().is_err());
    }
}
