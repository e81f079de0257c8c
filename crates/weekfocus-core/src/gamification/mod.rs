//! Experience points, levels and badges.

mod engine;

pub use engine::{BadgeContext, GamificationEngine, GamificationState};

use serde::{Deserialize, Serialize};

/// Ordinal level derived from cumulative experience.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserLevel {
    Rookie,
    Explorer,
    Achiever,
    Expert,
    Master,
    Wizard,
}

impl UserLevel {
    pub const ALL: [UserLevel; 6] = [
        UserLevel::Rookie,
        UserLevel::Explorer,
        UserLevel::Achiever,
        UserLevel::Expert,
        UserLevel::Master,
        UserLevel::Wizard,
    ];

    /// Inclusive experience floor of the level.
    pub fn experience_floor(self) -> u64 {
        match self {
            UserLevel::Rookie => 0,
            UserLevel::Explorer => 200,
            UserLevel::Achiever => 600,
            UserLevel::Expert => 1200,
            UserLevel::Master => 2500,
            UserLevel::Wizard => 5000,
        }
    }

    /// Highest level whose floor is at or below `xp`.
    pub fn for_experience(xp: u64) -> UserLevel {
        Self::ALL
            .iter()
            .rev()
            .copied()
            .find(|level| xp >= level.experience_floor())
            .unwrap_or(UserLevel::Rookie)
    }

    /// The following level; wizard is its own successor.
    pub fn next(self) -> UserLevel {
        match self {
            UserLevel::Rookie => UserLevel::Explorer,
            UserLevel::Explorer => UserLevel::Achiever,
            UserLevel::Achiever => UserLevel::Expert,
            UserLevel::Expert => UserLevel::Master,
            UserLevel::Master | UserLevel::Wizard => UserLevel::Wizard,
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            UserLevel::Rookie => "Rookie",
            UserLevel::Explorer => "Explorer",
            UserLevel::Achiever => "Achiever",
            UserLevel::Expert => "Expert",
            UserLevel::Master => "Master",
            UserLevel::Wizard => "Wizard",
        }
    }
}

impl Default for UserLevel {
    fn default() -> Self {
        UserLevel::Rookie
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeRarity {
    Common,
    Uncommon,
    Rare,
    Epic,
}

/// One-time achievements, each granting a fixed experience bonus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    HatTrick,
    EarlyBird,
    Productive,
    Consistent,
    PerfectWeek,
    Speedster,
}

impl Badge {
    pub const ALL: [Badge; 6] = [
        Badge::HatTrick,
        Badge::EarlyBird,
        Badge::Productive,
        Badge::Consistent,
        Badge::PerfectWeek,
        Badge::Speedster,
    ];

    pub fn experience_reward(self) -> u64 {
        match self {
            Badge::HatTrick => 50,
            Badge::EarlyBird => 25,
            Badge::Productive => 30,
            Badge::Consistent => 100,
            Badge::PerfectWeek => 75,
            Badge::Speedster => 40,
        }
    }

    pub fn rarity(self) -> BadgeRarity {
        match self {
            Badge::HatTrick | Badge::EarlyBird => BadgeRarity::Common,
            Badge::Productive | Badge::Speedster => BadgeRarity::Uncommon,
            Badge::Consistent => BadgeRarity::Rare,
            Badge::PerfectWeek => BadgeRarity::Epic,
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Badge::HatTrick => "Hat-trick",
            Badge::EarlyBird => "Early Bird",
            Badge::Productive => "Productive",
            Badge::Consistent => "Consistent",
            Badge::PerfectWeek => "Perfect Week",
            Badge::Speedster => "Speedster",
        }
    }

    pub fn description(self) -> &'static str {
        match self {
            Badge::HatTrick => "All 3 priorities completed in one week",
            Badge::EarlyBird => "Daily check-in before 9 AM",
            Badge::Productive => "5 tasks completed in focus mode",
            Badge::Consistent => "7 successful weeks in a row",
            Badge::PerfectWeek => "100% weekly completion",
            Badge::Speedster => "10 tasks completed in a single day",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_lookup_boundaries() {
        assert_eq!(UserLevel::for_experience(0), UserLevel::Rookie);
        assert_eq!(UserLevel::for_experience(199), UserLevel::Rookie);
        assert_eq!(UserLevel::for_experience(200), UserLevel::Explorer);
        assert_eq!(UserLevel::for_experience(599), UserLevel::Explorer);
        assert_eq!(UserLevel::for_experience(600), UserLevel::Achiever);
        assert_eq!(UserLevel::for_experience(1200), UserLevel::Expert);
        assert_eq!(UserLevel::for_experience(2500), UserLevel::Master);
        assert_eq!(UserLevel::for_experience(5000), UserLevel::Wizard);
        assert_eq!(UserLevel::for_experience(10_000), UserLevel::Wizard);
    }

    #[test]
    fn levels_are_ordered_and_saturate() {
        assert!(UserLevel::Rookie < UserLevel::Wizard);
        assert_eq!(UserLevel::Wizard.next(), UserLevel::Wizard);
        for pair in UserLevel::ALL.windows(2) {
            assert!(pair[0].experience_floor() < pair[1].experience_floor());
            assert_eq!(pair[0].next(), pair[1]);
        }
    }

    #[test]
    fn badge_tags_serialize_snake_case() {
        assert_eq!(serde_json::to_string(&Badge::HatTrick).unwrap(), "\"hat_trick\"");
        assert_eq!(serde_json::to_string(&UserLevel::Wizard).unwrap(), "\"wizard\"");
    }
}
