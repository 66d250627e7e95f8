//! Experience points awarded per scored answer.
//!
//! Harder questions pay more when answered correctly; a wrong answer still
//! earns a flat participation award. Skipped questions are never scored and
//! earn nothing.
//!
//! ```
//! # use quiz_core::model::Difficulty;
//! # use quiz_core::xp::xp_for_answer;
//! let hard = Difficulty::new(4).unwrap();
//! assert_eq!(xp_for_answer(hard, true), 45);
//! assert_eq!(xp_for_answer(hard, false), 2);
//! ```

use crate::model::Difficulty;

/// XP per difficulty level before the correctness bonus.
pub const XP_PER_DIFFICULTY: u32 = 10;

/// Added to the base award for a correct answer.
pub const CORRECT_BONUS: u32 = 5;

/// Flat award for a wrong answer, regardless of difficulty.
pub const WRONG_ANSWER_XP: u32 = 2;

/// Base award for a difficulty level (10, 20, 30, 40).
#[must_use]
pub fn base_xp(difficulty: Difficulty) -> u32 {
    u32::from(difficulty.value()) * XP_PER_DIFFICULTY
}

/// XP earned by one scored answer.
#[must_use]
pub fn xp_for_answer(difficulty: Difficulty, is_correct: bool) -> u32 {
    if is_correct {
        base_xp(difficulty) + CORRECT_BONUS
    } else {
        WRONG_ANSWER_XP
    }
}
