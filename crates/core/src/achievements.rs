//! Achievement evaluation over a run's aggregate stats.
//!
//! Evaluation is a pure predicate set: it never records anything itself and never
//! reports an id the caller already holds.

use arrayvec::ArrayVec;

use crate::types::{AchievementId, Difficulty};

/// Aggregate stats of a finished or in-progress run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunStats {
    pub score: u32,
    pub level: u32,
    pub rows_cleared: u32,
    pub difficulty: Difficulty,
    pub combo: u32,
    pub tetris_count: u32,
}

/// Whether a run satisfies the unlock condition of one achievement
pub fn qualifies(id: AchievementId, run: &RunStats) -> bool {
    match id {
        AchievementId::BlockPlacer => run.level >= 10,
        AchievementId::BlockMaster => run.level >= 25,
        AchievementId::AlmostImpossible => run.level >= 15 && run.difficulty == Difficulty::Hard,
        AchievementId::BoardMaster => run.tetris_count >= 2,
        AchievementId::Secret => run.combo >= 10,
    }
}

/// Achievements newly earned by `run`, skipping any for which `is_unlocked` holds
pub fn evaluate(
    run: &RunStats,
    is_unlocked: impl Fn(AchievementId) -> bool,
) -> ArrayVec<AchievementId, 5> {
    AchievementId::ALL
        .into_iter()
        .filter(|&id| !is_unlocked(id) && qualifies(id, run))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn none_unlocked(_: AchievementId) -> bool {
        false
    }

    #[test]
    fn test_level_thresholds() {
        let run = RunStats {
            level: 9,
            ..Default::default()
        };
        assert!(evaluate(&run, none_unlocked).is_empty());

        let run = RunStats {
            level: 25,
            ..Default::default()
        };
        assert_eq!(
            evaluate(&run, none_unlocked).as_slice(),
            &[AchievementId::BlockPlacer, AchievementId::BlockMaster]
        );
    }

    #[test]
    fn test_almost_impossible_needs_hard() {
        let medium = RunStats {
            level: 15,
            difficulty: Difficulty::Medium,
            ..Default::default()
        };
        assert!(!evaluate(&medium, none_unlocked).contains(&AchievementId::AlmostImpossible));

        let hard = RunStats {
            difficulty: Difficulty::Hard,
            ..medium
        };
        assert!(evaluate(&hard, none_unlocked).contains(&AchievementId::AlmostImpossible));
    }

    #[test]
    fn test_board_master_needs_two_tetrises() {
        let one = RunStats {
            tetris_count: 1,
            ..Default::default()
        };
        assert!(evaluate(&one, none_unlocked).is_empty());

        let two = RunStats {
            tetris_count: 2,
            ..Default::default()
        };
        assert_eq!(evaluate(&two, none_unlocked).as_slice(), &[AchievementId::BoardMaster]);
    }

    #[test]
    fn test_already_unlocked_is_not_signalled_again() {
        let run = RunStats {
            level: 12,
            combo: 10,
            ..Default::default()
        };
        let fresh = evaluate(&run, |id| id == AchievementId::BlockPlacer);
        assert_eq!(fresh.as_slice(), &[AchievementId::Secret]);
    }
}
