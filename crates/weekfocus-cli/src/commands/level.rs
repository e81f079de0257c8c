use clap::Subcommand;
use serde::Serialize;
use weekfocus_core::{Badge, BadgeRarity, UserLevel};

use super::{open_app, print_json, CmdResult};

#[derive(Subcommand)]
pub enum LevelAction {
    /// Print level, experience and streak
    Status,
    /// List every badge and whether it is unlocked
    Badges,
}

#[derive(Serialize)]
struct BadgeView {
    badge: Badge,
    title: &'static str,
    description: &'static str,
    rarity: BadgeRarity,
    experience_reward: u64,
    unlocked: bool,
}

#[derive(Serialize)]
struct LevelStatus {
    level: UserLevel,
    experience_points: u64,
    next_level: UserLevel,
    experience_to_next_level: u64,
    progress_to_next_level: f64,
    weekly_streak: u32,
    total_completed_weeks: u32,
    unlocked_badges: Vec<Badge>,
}

pub fn run(action: LevelAction) -> CmdResult {
    let app = open_app()?;
    let engine = app.gamification();

    match action {
        LevelAction::Status => {
            let state = engine.state();
            print_json(&LevelStatus {
                level: state.current_level,
                experience_points: state.experience_points,
                next_level: state.current_level.next(),
                experience_to_next_level: engine.experience_to_next_level(),
                progress_to_next_level: engine.progress_to_next_level(),
                weekly_streak: state.weekly_streak,
                total_completed_weeks: state.total_completed_weeks,
                unlocked_badges: state.unlocked_badges.iter().copied().collect(),
            })?;
        }
        LevelAction::Badges => {
            let badges: Vec<_> = Badge::ALL
                .iter()
                .map(|&badge| BadgeView {
                    badge,
                    title: badge.title(),
                    description: badge.description(),
                    rarity: badge.rarity(),
                    experience_reward: badge.experience_reward(),
                    unlocked: engine.has_badge(badge),
                })
                .collect();
            print_json(&badges)?;
        }
    }
    Ok(())
}
