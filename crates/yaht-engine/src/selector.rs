//! Chooses the category to lock, or asks for another roll.
//!
//! Like the keep rules, selection is an ordered table of plain functions.
//! Every `Lock` a rule produces names an open category, so the ledger never
//! sees a second fill from here.

use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::fmt;
use tracing::debug;

use crate::scoring::{Category, LARGE_STRAIGHT_SCORE, SMALL_STRAIGHT_SCORE, YAHTZEE_SCORE};
use crate::turn::Situation;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum CategoryOutcome {
    Lock { category: Category, score: u16 },
    RollAgain,
}

impl CategoryOutcome {
    fn lock(category: Category, score: u16) -> Self {
        Self::Lock { category, score }
    }

    pub fn locked(&self) -> Option<(Category, u16)> {
        match *self {
            Self::Lock { category, score } => Some((category, score)),
            Self::RollAgain => None,
        }
    }
}

impl fmt::Display for CategoryOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lock { category, score } => write!(f, "lock {category} for {score}"),
            Self::RollAgain => write!(f, "roll again"),
        }
    }
}

pub type SelectRule = fn(&Situation) -> Option<CategoryOutcome>;

pub const SELECT_RULES: &[(&str, SelectRule)] = &[
    ("large_straight", large_straight),
    ("small_straight", small_straight),
    ("final_roll_conflicts", final_roll_conflicts),
    ("yahtzee", yahtzee),
    ("large_straight_draw", large_straight_draw),
    ("full_house", full_house),
    ("final_roll_best", final_roll_best),
    ("chase_yahtzee", chase_yahtzee),
    ("highest_score", highest_score),
    ("nothing_scores", nothing_scores),
];

pub fn select(situation: &Situation) -> CategoryOutcome {
    select_with_rule(situation).1
}

/// Like [`select`], also naming the rule that decided.
pub fn select_with_rule(situation: &Situation) -> (&'static str, CategoryOutcome) {
    let (rule, outcome) = SELECT_RULES
        .iter()
        .find_map(|(name, rule)| rule(situation).map(|o| (*name, o)))
        .unwrap_or_else(|| ("sacrifice", sacrifice(situation)));
    debug!(
        rule,
        dice = %situation.dice,
        roll = situation.roll_count,
        %outcome,
        "category rule fired"
    );
    (rule, outcome)
}

/// Open categories that score above zero with the current dice.
pub fn scorable(s: &Situation) -> Vec<(Category, u16)> {
    s.open
        .iter()
        .filter_map(|&c| s.open_score(c).map(|score| (c, score)))
        .collect()
}

/// Highest score; equal scores go to the harder category.
pub fn best_of(candidates: &[(Category, u16)]) -> Option<(Category, u16)> {
    candidates
        .iter()
        .copied()
        .max_by_key(|(c, score)| (*score, Reverse(c.difficulty_rank())))
}

// -- Rules --

fn large_straight(s: &Situation) -> Option<CategoryOutcome> {
    s.open_score(Category::LargeStraight)
        .map(|_| CategoryOutcome::lock(Category::LargeStraight, LARGE_STRAIGHT_SCORE))
}

fn small_straight(s: &Situation) -> Option<CategoryOutcome> {
    s.open_score(Category::SmallStraight)?;
    if !s.is_final_roll() && s.is_open(Category::LargeStraight) && s.straight_draw().is_some() {
        return Some(CategoryOutcome::RollAgain);
    }
    Some(CategoryOutcome::lock(Category::SmallStraight, SMALL_STRAIGHT_SCORE))
}

/// Runs ahead of the Yahtzee rule, so a final-roll five of a kind goes to
/// Four of a Kind while that box is open.
fn final_roll_conflicts(s: &Situation) -> Option<CategoryOutcome> {
    if !s.is_final_roll() {
        return None;
    }
    four_of_a_kind_conflict(s).or_else(|| three_of_a_kind_conflict(s))
}

fn yahtzee(s: &Situation) -> Option<CategoryOutcome> {
    s.open_score(Category::Yahtzee)
        .map(|_| CategoryOutcome::lock(Category::Yahtzee, YAHTZEE_SCORE))
}

fn large_straight_draw(s: &Situation) -> Option<CategoryOutcome> {
    if !s.is_final_roll() && s.is_open(Category::LargeStraight) && s.straight_draw().is_some() {
        Some(CategoryOutcome::RollAgain)
    } else {
        None
    }
}

fn full_house(s: &Situation) -> Option<CategoryOutcome> {
    s.open_score(Category::FullHouse)
        .map(|score| CategoryOutcome::lock(Category::FullHouse, score))
}

fn final_roll_best(s: &Situation) -> Option<CategoryOutcome> {
    if !s.is_final_roll() {
        return None;
    }
    let mut candidates = scorable(s);
    if candidates.len() < 2 {
        return None;
    }
    if let Some(score) = s.open_score(Category::FourOfAKind) {
        return Some(CategoryOutcome::lock(Category::FourOfAKind, score));
    }
    // Two points in Aces is a wasted slot if anything else pays more.
    if let Some(aces) = s.open_score(Category::Aces).filter(|&a| a <= 2) {
        let better_elsewhere = candidates
            .iter()
            .any(|&(c, score)| c != Category::Aces && score > aces);
        if better_elsewhere {
            candidates.retain(|(c, _)| *c != Category::Aces);
        }
    }
    best_of(&candidates).map(|(c, score)| CategoryOutcome::lock(c, score))
}

fn chase_yahtzee(s: &Situation) -> Option<CategoryOutcome> {
    if !s.is_final_roll() && s.counts.max_count() >= 3 && s.is_open(Category::Yahtzee) {
        Some(CategoryOutcome::RollAgain)
    } else {
        None
    }
}

fn highest_score(s: &Situation) -> Option<CategoryOutcome> {
    best_of(&scorable(s)).map(|(c, score)| CategoryOutcome::lock(c, score))
}

fn nothing_scores(s: &Situation) -> Option<CategoryOutcome> {
    if !s.is_final_roll() || s.open.is_empty() {
        Some(CategoryOutcome::RollAgain)
    } else {
        None
    }
}

/// Out of rolls with nothing scoring: give up the least useful slot, keeping
/// Aces back while anything else is open.
fn sacrifice(s: &Situation) -> CategoryOutcome {
    s.open
        .iter()
        .find(|&&c| c != Category::Aces)
        .or_else(|| s.open.first())
        .map(|&c| CategoryOutcome::lock(c, 0))
        .unwrap_or(CategoryOutcome::RollAgain)
}

// -- Final-roll conflicts --

/// Four of a Kind beats the matching number category and Three of a Kind
/// whenever it scores at least as much as each.
pub fn four_of_a_kind_conflict(s: &Situation) -> Option<CategoryOutcome> {
    let four = s.open_score(Category::FourOfAKind)?;
    let face = s.counts.face_with_at_least(4)?;
    let number = Category::for_face(face)
        .and_then(|c| s.open_score(c))
        .unwrap_or(0);
    let three = s.open_score(Category::ThreeOfAKind).unwrap_or(0);
    if four >= number && four >= three {
        Some(CategoryOutcome::lock(Category::FourOfAKind, four))
    } else {
        None
    }
}

/// Three of a Kind beats the matching number category outright, or any open
/// number category by more than 20%.
pub fn three_of_a_kind_conflict(s: &Situation) -> Option<CategoryOutcome> {
    let three = s.open_score(Category::ThreeOfAKind)?;
    let face = s.counts.face_with_at_least(3)?;
    if let Some(four) = s.open_score(Category::FourOfAKind) {
        if four >= three {
            return None;
        }
    }
    let lock = Some(CategoryOutcome::lock(Category::ThreeOfAKind, three));
    if let Some(matching) = Category::for_face(face).filter(|c| s.is_open(*c)) {
        if three > s.score(matching) {
            return lock;
        }
    }
    let beats_a_number = Category::UPPER
        .iter()
        .filter(|c| s.is_open(**c))
        .any(|&c| three as f64 > s.score(c) as f64 * 1.2);
    if beats_a_number {
        lock
    } else {
        None
    }
}
