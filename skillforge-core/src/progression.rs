//! XP and level progression rules.
//!
//! A profile at level `L` levels up whenever its total XP reaches `L * 1000`.
//! XP is cumulative and never reset, so a single large reward can cross
//! several thresholds at once.

use crate::UserProfile;
use serde::{Deserialize, Serialize};

/// XP needed per level step.
pub const XP_PER_LEVEL: u64 = 1000;

/// Level assigned to new profiles.
pub const STARTING_LEVEL: u32 = 1;

/// Smallest XP reward a generated task may carry.
pub const MIN_TASK_XP: u32 = 50;

/// Largest XP reward a generated task may carry.
pub const MAX_TASK_XP: u32 = 200;

/// Total XP at which a profile at `level` advances to the next level.
pub fn xp_threshold(level: u32) -> u64 {
    u64::from(level).saturating_mul(XP_PER_LEVEL)
}

/// Add `reward` to the profile and apply level-ups. Returns levels gained.
pub fn apply_xp(profile: &mut UserProfile, reward: u64) -> u32 {
    profile.xp = profile.xp.saturating_add(reward);

    let mut gained = 0;
    while profile.level < u32::MAX && profile.xp >= xp_threshold(profile.level) {
        profile.level += 1;
        gained += 1;
    }
    gained
}

// ============================================================================
// PROGRESS SUMMARIES
// ============================================================================

/// Position of a profile between its current and next level threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct LevelProgress {
    pub level: u32,
    pub xp: u64,
    /// Threshold that was crossed to reach `level` (0 at level 1).
    pub current_threshold: u64,
    /// Threshold that promotes to `level + 1`.
    pub next_threshold: u64,
    pub xp_into_level: u64,
    pub xp_to_next_level: u64,
}

impl LevelProgress {
    pub fn of(profile: &UserProfile) -> Self {
        let current_threshold = if profile.level <= STARTING_LEVEL {
            0
        } else {
            xp_threshold(profile.level - 1)
        };
        let next_threshold = xp_threshold(profile.level);
        Self {
            level: profile.level,
            xp: profile.xp,
            current_threshold,
            next_threshold,
            xp_into_level: profile.xp.saturating_sub(current_threshold),
            xp_to_next_level: next_threshold.saturating_sub(profile.xp),
        }
    }
}

/// Completed task counts for a roadmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub struct RoadmapProgress {
    pub completed_tasks: usize,
    pub total_tasks: usize,
    /// Rounded completion percentage, 0 for a roadmap without tasks.
    pub percent: u8,
}

impl RoadmapProgress {
    pub fn new(completed_tasks: usize, total_tasks: usize) -> Self {
        let percent = if total_tasks == 0 {
            0
        } else {
            let ratio = completed_tasks.min(total_tasks) as f64 / total_tasks as f64;
            (ratio * 100.0).round() as u8
        };
        Self {
            completed_tasks,
            total_tasks,
            percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::UserUid;
    use proptest::prelude::*;

    fn profile(xp: u64, level: u32) -> UserProfile {
        let mut p = UserProfile::new(UserUid::new("u1"), "Ada", "ada@example.com");
        p.xp = xp;
        p.level = level;
        p
    }

    #[test]
    fn test_level_up_at_threshold() {
        let mut p = profile(950, 1);
        let gained = apply_xp(&mut p, 100);
        assert_eq!(p.xp, 1050);
        assert_eq!(p.level, 2);
        assert_eq!(gained, 1);
    }

    #[test]
    fn test_no_level_up_below_threshold() {
        let mut p = profile(800, 1);
        assert_eq!(apply_xp(&mut p, 199), 0);
        assert_eq!(p.xp, 999);
        assert_eq!(p.level, 1);
    }

    #[test]
    fn test_multiple_levels_in_one_reward() {
        // 2999 XP at level 1 crosses 1000 and 2000, then stops below 3000.
        let mut p = profile(0, 1);
        assert_eq!(apply_xp(&mut p, 2999), 2);
        assert_eq!(p.level, 3);

        assert_eq!(apply_xp(&mut p, 1), 1);
        assert_eq!(p.level, 4);
    }

    #[test]
    fn test_xp_saturates() {
        let mut p = profile(u64::MAX - 10, 5);
        apply_xp(&mut p, 100);
        assert_eq!(p.xp, u64::MAX);
    }

    #[test]
    fn test_level_progress_fields() {
        let progress = LevelProgress::of(&profile(1250, 2));
        assert_eq!(progress.current_threshold, 1000);
        assert_eq!(progress.next_threshold, 2000);
        assert_eq!(progress.xp_into_level, 250);
        assert_eq!(progress.xp_to_next_level, 750);

        let fresh = LevelProgress::of(&profile(0, 1));
        assert_eq!(fresh.current_threshold, 0);
        assert_eq!(fresh.xp_to_next_level, 1000);
    }

    #[test]
    fn test_roadmap_progress_percent() {
        assert_eq!(RoadmapProgress::new(0, 0).percent, 0);
        assert_eq!(RoadmapProgress::new(1, 3).percent, 33);
        assert_eq!(RoadmapProgress::new(2, 3).percent, 67);
        assert_eq!(RoadmapProgress::new(5, 5).percent, 100);
    }

    proptest! {
        #[test]
        fn prop_xp_and_level_never_decrease(
            rewards in prop::collection::vec(MIN_TASK_XP..=MAX_TASK_XP, 0..60)
        ) {
            let mut p = profile(0, STARTING_LEVEL);
            for reward in rewards {
                let (xp_before, level_before) = (p.xp, p.level);
                apply_xp(&mut p, u64::from(reward));
                prop_assert!(p.xp >= xp_before);
                prop_assert!(p.level >= level_before);
                prop_assert!(p.xp < xp_threshold(p.level));
            }
        }

        #[test]
        fn prop_level_boundary_promotes(level in 1u32..50, reward in 1u64..=200) {
            let mut p = profile(xp_threshold(level) - 1, level);
            apply_xp(&mut p, reward);
            prop_assert!(p.level >= level + 1);
        }
    }
}
