use serde::{Deserialize, Serialize};

use crate::config::EngineConfig;
use crate::dice::{Faces, MAX_ROLLS};
use crate::ledger::GameLedger;
use crate::patterns::{straight_draw, AnchorMode, FaceCounts, StraightDraw};
use crate::player::Scorecard;
use crate::scoring::{compute_score, Category};

/// Per-turn bookkeeping for an automated player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnContext {
    /// 0 before the first roll, 3 once the last roll is made.
    pub roll_count: u8,
    /// Category the keep heuristics are currently working towards.
    pub pursued: Option<Category>,
    pub last_locked: Option<(Category, u16)>,
}

impl TurnContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_final_roll(&self) -> bool {
        self.roll_count >= MAX_ROLLS
    }

    pub fn rolls_left(&self) -> u8 {
        MAX_ROLLS.saturating_sub(self.roll_count)
    }

    /// Clears per-turn state; the last locked category survives for reporting.
    pub fn reset(&mut self) {
        self.roll_count = 0;
        self.pursued = None;
    }
}

/// Everything a decision looks at: the dice, what is still open, and where
/// in the turn we are.
#[derive(Debug, Clone)]
pub struct Situation {
    pub dice: Faces,
    pub counts: FaceCounts,
    pub open: Vec<Category>,
    pub roll_count: u8,
    pub upper_section_score: u16,
    pub anchor_mode: AnchorMode,
}

impl Situation {
    pub fn new(dice: Faces, open: Vec<Category>, roll_count: u8) -> Self {
        Self {
            counts: FaceCounts::of(&dice),
            dice,
            open,
            roll_count,
            upper_section_score: 0,
            anchor_mode: AnchorMode::default(),
        }
    }

    /// Situation for `scorecard`'s owner, with the open list taken from the
    /// shared ledger.
    pub fn for_player(
        dice: Faces,
        ledger: &GameLedger,
        scorecard: &Scorecard,
        roll_count: u8,
        config: &EngineConfig,
    ) -> Self {
        Self::new(dice, ledger.open_categories(), roll_count)
            .with_upper_section_score(scorecard.upper_subtotal())
            .with_anchor_mode(config.anchor_mode)
    }

    pub fn with_upper_section_score(mut self, score: u16) -> Self {
        self.upper_section_score = score;
        self
    }

    pub fn with_anchor_mode(mut self, mode: AnchorMode) -> Self {
        self.anchor_mode = mode;
        self
    }

    pub fn is_open(&self, category: Category) -> bool {
        self.open.contains(&category)
    }

    pub fn is_final_roll(&self) -> bool {
        self.roll_count >= MAX_ROLLS
    }

    pub fn score(&self, category: Category) -> u16 {
        compute_score(category, &self.dice)
    }

    /// Score if `category` is open and scores above zero.
    pub fn open_score(&self, category: Category) -> Option<u16> {
        if !self.is_open(category) {
            return None;
        }
        Some(self.score(category)).filter(|&s| s > 0)
    }

    pub fn straight_draw(&self) -> Option<StraightDraw> {
        straight_draw(&self.counts, self.anchor_mode)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_context_rolls_left() {
        let mut ctx = TurnContext::new();
        assert_eq!(ctx.rolls_left(), 3);
        ctx.roll_count = 3;
        assert!(ctx.is_final_roll());
        assert_eq!(ctx.rolls_left(), 0);
        ctx.pursued = Some(Category::Yahtzee);
        ctx.last_locked = Some((Category::Sixes, 18));
        ctx.reset();
        assert_eq!(ctx.roll_count, 0);
        assert_eq!(ctx.pursued, None);
        assert_eq!(ctx.last_locked, Some((Category::Sixes, 18)));
    }

    #[test]
    fn test_open_score_ignores_closed_and_zero() {
        let dice = Faces::new([5, 5, 5, 5, 2]).unwrap();
        let s = Situation::new(dice, vec![Category::Fives, Category::Yahtzee], 3);
        assert_eq!(s.open_score(Category::Fives), Some(20));
        assert_eq!(s.open_score(Category::Yahtzee), None);
        assert_eq!(s.open_score(Category::FourOfAKind), None);
    }

    #[test]
    fn test_for_player_uses_ledger_and_upper_total() {
        let mut ledger = GameLedger::new();
        let id = uuid::Uuid::new_v4();
        ledger.fill(id, Category::Sixes, 24).unwrap();
        let mut sc = Scorecard::new();
        sc.record(Category::Sixes, 24).unwrap();
        let dice = Faces::new([1, 2, 3, 4, 5]).unwrap();
        let s = Situation::for_player(dice, &ledger, &sc, 1, &EngineConfig::default());
        assert!(!s.is_open(Category::Sixes));
        assert_eq!(s.open.len(), 11);
        assert_eq!(s.upper_section_score, 24);
    }
}
