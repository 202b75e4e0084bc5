//! Per-roll keep/reroll decisions for the computer player.
//!
//! [`decide`] walks [`KEEP_RULES`] top-down and the first rule that matches
//! picks the category to chase and the dice to set aside. Each rule is a
//! plain function over a [`Situation`] so it can be exercised on its own.

use serde::Serialize;
use tracing::debug;

use crate::dice::{KeepMask, MAX_FACE, MAX_ROLLS, NUM_DICE};
use crate::expected::{self, ValueInputs};
use crate::patterns::{keep_matching, keep_one_each, kept_count};
use crate::scoring::Category;
use crate::turn::Situation;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StrategyDecision {
    pub keep: KeepMask,
    pub roll_again: bool,
    pub pursued: Option<Category>,
    /// Name of the rule that produced this decision.
    pub rule: &'static str,
}

/// Category to chase and dice to keep for it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeepPlan {
    pub pursued: Option<Category>,
    pub keep: KeepMask,
}

pub type KeepRule = fn(&Situation) -> Option<KeepPlan>;

/// Priority order matters: earlier rules shadow later ones.
pub const KEEP_RULES: &[(&str, KeepRule)] = &[
    ("large_straight_anchor", large_straight_anchor),
    ("four_or_more_of_a_kind", four_or_more_of_a_kind),
    ("five_of_a_kind", five_of_a_kind),
    ("single_open_category", single_open_category),
    ("full_house_draw", full_house_draw),
    ("small_straight_run", small_straight_run),
    ("best_expected_value", best_expected_value),
];

pub fn decide(situation: &Situation) -> StrategyDecision {
    for (name, rule) in KEEP_RULES {
        if let Some(plan) = rule(situation) {
            let roll_again = should_roll_again(situation.roll_count, plan.pursued, &plan.keep);
            debug!(
                rule = *name,
                dice = %situation.dice,
                pursued = ?plan.pursued,
                keep = ?plan.keep,
                roll_again,
                "keep rule fired"
            );
            return StrategyDecision {
                keep: plan.keep,
                roll_again,
                pursued: plan.pursued,
                rule: *name,
            };
        }
    }
    // best_expected_value always answers; this is unreachable in practice.
    StrategyDecision {
        keep: [false; NUM_DICE],
        roll_again: situation.roll_count < MAX_ROLLS,
        pursued: None,
        rule: "none",
    }
}

/// Dice that must be held before a pursued category counts as made.
pub fn completion_threshold(category: Category) -> usize {
    match category {
        Category::Yahtzee
        | Category::FullHouse
        | Category::SmallStraight
        | Category::LargeStraight => 5,
        Category::FourOfAKind => 4,
        _ => 3,
    }
}

pub fn should_roll_again(roll_count: u8, pursued: Option<Category>, keep: &KeepMask) -> bool {
    if roll_count >= MAX_ROLLS {
        return false;
    }
    let Some(category) = pursued else {
        return true;
    };
    let kept = kept_count(keep);
    kept == 0 || kept < completion_threshold(category)
}

// -- Rules --

fn large_straight_anchor(s: &Situation) -> Option<KeepPlan> {
    if !s.is_open(Category::LargeStraight) {
        return None;
    }
    let draw = s.straight_draw()?;
    Some(KeepPlan {
        pursued: Some(Category::LargeStraight),
        keep: draw.keep_mask(&s.dice),
    })
}

fn four_or_more_of_a_kind(s: &Situation) -> Option<KeepPlan> {
    let face = s.counts.face_with_at_least(4)?;
    Some(KeepPlan {
        pursued: Some(Category::Yahtzee),
        keep: keep_matching(&s.dice, face),
    })
}

fn five_of_a_kind(s: &Situation) -> Option<KeepPlan> {
    if s.counts.max_count() < 5 || !s.is_open(Category::Yahtzee) {
        return None;
    }
    Some(KeepPlan {
        pursued: Some(Category::Yahtzee),
        keep: [true; NUM_DICE],
    })
}

fn single_open_category(s: &Situation) -> Option<KeepPlan> {
    match s.open.as_slice() {
        [only] => Some(plan_for(*only, s)),
        _ => None,
    }
}

fn full_house_draw(s: &Situation) -> Option<KeepPlan> {
    if s.is_open(Category::FullHouse) && s.counts.has_full_house_draw() {
        Some(plan_for(Category::FullHouse, s))
    } else {
        None
    }
}

fn small_straight_run(s: &Situation) -> Option<KeepPlan> {
    if s.is_open(Category::SmallStraight) && s.counts.longest_run().len >= 3 {
        Some(plan_for(Category::SmallStraight, s))
    } else {
        None
    }
}

fn best_expected_value(s: &Situation) -> Option<KeepPlan> {
    match best_by_value(s) {
        Some((category, _)) => Some(plan_for(category, s)),
        None => Some(KeepPlan {
            pursued: None,
            keep: [false; NUM_DICE],
        }),
    }
}

/// Expected value of every open category, in difficulty order.
pub fn expected_values(s: &Situation) -> Vec<(Category, f64)> {
    Category::DIFFICULTY_ORDER
        .iter()
        .filter(|c| s.is_open(**c))
        .map(|&category| {
            let v = expected::value(&ValueInputs {
                category,
                current_score: s.score(category),
                // Weighted against the whole turn's roll budget, whatever
                // roll we are on.
                rolls_remaining: MAX_ROLLS,
                roll_count: s.roll_count,
                counts: s.counts,
                upper_section_score: s.upper_section_score,
                open_count: s.open.len(),
            });
            (category, v)
        })
        .collect()
}

/// Highest positive expected value; the harder category wins a tie.
pub fn best_by_value(s: &Situation) -> Option<(Category, f64)> {
    let mut best: Option<(Category, f64)> = None;
    for (category, v) in expected_values(s) {
        let current = best.map(|(_, b)| b).unwrap_or(0.0);
        if v > current {
            best = Some((category, v));
        }
    }
    best
}

// -- Keep heuristics --

fn plan_for(category: Category, s: &Situation) -> KeepPlan {
    KeepPlan {
        pursued: Some(category),
        keep: keep_for(category, s),
    }
}

/// Dice to keep while working towards `category`.
pub fn keep_for(category: Category, s: &Situation) -> KeepMask {
    match category {
        Category::Yahtzee | Category::ThreeOfAKind | Category::FourOfAKind => {
            keep_matching(&s.dice, s.counts.modal_face())
        }
        Category::SmallStraight | Category::LargeStraight => keep_for_straight(s),
        Category::FullHouse => keep_for_full_house(s),
        number => keep_for_number(number, s),
    }
}

fn keep_for_straight(s: &Situation) -> KeepMask {
    let run = s.counts.longest_run();
    if run.len >= 3 {
        keep_one_each(&s.dice, |f| run.contains(f))
    } else {
        keep_one_each(&s.dice, |f| f >= 4)
    }
}

fn keep_for_full_house(s: &Situation) -> KeepMask {
    let triple = s.counts.face_with_at_least(3);
    let pairs: Vec<u8> = (1..=MAX_FACE)
        .rev()
        .filter(|&f| Some(f) != triple && s.counts.get(f) >= 2)
        .collect();
    let keep_faces = |a: u8, b: u8| {
        let mut keep = [false; NUM_DICE];
        for (k, d) in keep.iter_mut().zip(s.dice.iter()) {
            *k = d == a || d == b;
        }
        keep
    };
    match (triple, pairs.as_slice()) {
        // Two pairs: hold both, hoping the higher one fills out.
        (None, [high, low, ..]) => keep_faces(*high, *low),
        (None, [pair]) => keep_matching(&s.dice, *pair),
        (Some(t), [pair, ..]) => keep_faces(t, *pair),
        (Some(t), []) => keep_matching(&s.dice, t),
        (None, []) => [false; NUM_DICE],
    }
}

fn keep_for_number(category: Category, s: &Situation) -> KeepMask {
    let Some(face) = category.face() else {
        return [false; NUM_DICE];
    };
    let count = s.counts.get(face);
    let floor = if category == Category::Aces { 4 } else { 3 };
    if category.is_low_number() && count < floor && !s.is_final_roll() {
        // A weak partial match is worth less than a fresh roll.
        return [false; NUM_DICE];
    }
    keep_matching(&s.dice, face)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::Faces;
    use crate::patterns::AnchorMode;

    fn situation(dice: [u8; 5], open: &[Category], roll_count: u8) -> Situation {
        Situation::new(Faces::new(dice).unwrap(), open.to_vec(), roll_count)
    }

    fn all_open(dice: [u8; 5], roll_count: u8) -> Situation {
        situation(dice, &Category::ALL, roll_count)
    }

    #[test]
    fn test_anchor_keeps_one_two_and_three_four_five() {
        let s = situation(
            [2, 2, 3, 4, 5],
            &[Category::LargeStraight, Category::SmallStraight],
            1,
        );
        let d = decide(&s);
        assert_eq!(d.rule, "large_straight_anchor");
        assert_eq!(d.keep, [true, false, true, true, true]);
        assert_eq!(d.pursued, Some(Category::LargeStraight));
        assert!(d.roll_again);
    }

    #[test]
    fn test_anchor_with_ace() {
        let d = decide(&all_open([5, 1, 3, 3, 4], 2));
        assert_eq!(d.rule, "large_straight_anchor");
        assert_eq!(d.keep, [true, true, true, false, true]);
    }

    #[test]
    fn test_anchor_skipped_when_large_straight_filled() {
        let open: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|c| *c != Category::LargeStraight)
            .collect();
        let d = decide(&situation([2, 2, 3, 4, 5], &open, 1));
        assert_ne!(d.rule, "large_straight_anchor");
    }

    #[test]
    fn test_literal_mode_ignores_one_two_three_four() {
        let s = all_open([1, 2, 3, 4, 4], 1);
        assert_ne!(decide(&s).rule, "large_straight_anchor");
        let s = s.with_anchor_mode(AnchorMode::Generalized);
        let d = decide(&s);
        assert_eq!(d.rule, "large_straight_anchor");
        assert_eq!(d.keep, [true, true, true, true, false]);
    }

    #[test]
    fn test_four_of_a_kind_keeps_the_four() {
        let d = decide(&all_open([3, 6, 3, 3, 3], 1));
        assert_eq!(d.rule, "four_or_more_of_a_kind");
        assert_eq!(d.keep, [true, false, true, true, true]);
        assert_eq!(d.pursued, Some(Category::Yahtzee));
        assert!(d.roll_again);
    }

    #[test]
    fn test_yahtzee_keeps_all_and_stops() {
        let d = decide(&situation([6, 6, 6, 6, 6], &[Category::Yahtzee, Category::Sixes], 1));
        assert_eq!(d.keep, [true; 5]);
        assert!(!d.roll_again);
    }

    #[test]
    fn test_five_of_a_kind_rule_on_its_own() {
        let s = situation([2, 2, 2, 2, 2], &[Category::Yahtzee], 2);
        let plan = five_of_a_kind(&s).unwrap();
        assert_eq!(plan.keep, [true; 5]);
        let closed = situation([2, 2, 2, 2, 2], &[Category::Twos], 2);
        assert!(five_of_a_kind(&closed).is_none());
    }

    #[test]
    fn test_single_open_category_dispatch() {
        let d = decide(&situation([1, 3, 5, 5, 6], &[Category::Fives], 1));
        assert_eq!(d.rule, "single_open_category");
        assert_eq!(d.keep, [false, false, true, true, false]);
        assert_eq!(d.pursued, Some(Category::Fives));
        assert!(d.roll_again);
    }

    #[test]
    fn test_two_pairs_pursue_full_house() {
        let d = decide(&all_open([4, 1, 4, 6, 1], 1));
        assert_eq!(d.rule, "full_house_draw");
        assert_eq!(d.keep, [true, true, true, false, true]);
        assert!(d.roll_again);
    }

    #[test]
    fn test_made_full_house_keeps_everything() {
        let d = decide(&all_open([2, 5, 2, 5, 5], 1));
        assert_eq!(d.rule, "full_house_draw");
        assert_eq!(d.keep, [true; 5]);
        assert!(!d.roll_again);
    }

    #[test]
    fn test_run_of_three_pursues_small_straight() {
        let d = decide(&all_open([1, 2, 3, 6, 6], 1));
        assert_eq!(d.rule, "small_straight_run");
        assert_eq!(d.keep, [true, true, true, false, false]);
    }

    #[test]
    fn test_straight_keep_drops_duplicates() {
        let s = all_open([3, 4, 4, 5, 1], 1);
        assert_eq!(keep_for(Category::SmallStraight, &s), [true, true, false, true, false]);
    }

    #[test]
    fn test_straight_keep_fallback_high_faces() {
        let s = all_open([1, 1, 4, 6, 6], 1);
        assert_eq!(keep_for(Category::LargeStraight, &s), [false, false, true, true, false]);
    }

    #[test]
    fn test_full_house_keep_variants() {
        let pair_only = all_open([3, 3, 1, 5, 6], 1);
        assert_eq!(keep_for(Category::FullHouse, &pair_only), [true, true, false, false, false]);
        let triple_only = all_open([3, 3, 3, 5, 6], 1);
        assert_eq!(keep_for(Category::FullHouse, &triple_only), [true, true, true, false, false]);
        let nothing = all_open([1, 2, 4, 5, 6], 1);
        assert_eq!(keep_for(Category::FullHouse, &nothing), [false; 5]);
    }

    #[test]
    fn test_low_number_floor() {
        let s = all_open([1, 1, 1, 5, 6], 1);
        assert_eq!(keep_for(Category::Aces, &s), [false; 5]);
        let s = all_open([1, 1, 1, 1, 6], 2);
        assert_eq!(keep_for(Category::Aces, &s), [true, true, true, true, false]);
        let s = all_open([2, 2, 4, 5, 6], 1);
        assert_eq!(keep_for(Category::Twos, &s), [false; 5]);
        let s = all_open([2, 2, 4, 5, 6], 3);
        assert_eq!(keep_for(Category::Twos, &s), [true, true, false, false, false]);
        // No floor for the high numbers
        let s = all_open([6, 2, 4, 5, 1], 1);
        assert_eq!(keep_for(Category::Sixes, &s), [true, false, false, false, false]);
    }

    #[test]
    fn test_kind_keep_uses_modal_face() {
        let s = all_open([2, 2, 5, 5, 1], 1);
        assert_eq!(keep_for(Category::ThreeOfAKind, &s), [false, false, true, true, false]);
    }

    #[test]
    fn test_expected_value_picks_three_of_a_kind_over_decoy() {
        // Three twos: Twos is halved as a decoy, Three of a Kind wins.
        let s = situation(
            [2, 2, 2, 5, 6],
            &[
                Category::Twos,
                Category::ThreeOfAKind,
                Category::Sixes,
                Category::Yahtzee,
            ],
            1,
        );
        let d = decide(&s);
        assert_eq!(d.rule, "best_expected_value");
        assert_eq!(d.pursued, Some(Category::ThreeOfAKind));
        assert_eq!(d.keep, [true, true, true, false, false]);
        assert!(!d.roll_again);
    }

    #[test]
    fn test_nothing_valuable_keeps_nothing() {
        // Only Yahtzee and Full House open, neither scores.
        let s = situation([1, 2, 4, 5, 6], &[Category::Yahtzee, Category::FullHouse], 1);
        let d = decide(&s);
        assert_eq!(d.rule, "best_expected_value");
        assert_eq!(d.pursued, None);
        assert_eq!(d.keep, [false; 5]);
        assert!(d.roll_again);
    }

    #[test]
    fn test_should_roll_again_thresholds() {
        let four = [true, true, true, true, false];
        assert!(should_roll_again(1, Some(Category::Yahtzee), &four));
        assert!(!should_roll_again(1, Some(Category::FourOfAKind), &four));
        assert!(!should_roll_again(2, Some(Category::ThreeOfAKind), &four));
        assert!(should_roll_again(2, Some(Category::LargeStraight), &four));
        assert!(should_roll_again(1, None, &[true; 5]));
        assert!(should_roll_again(1, Some(Category::Sixes), &[false; 5]));
        assert!(!should_roll_again(3, None, &[false; 5]));
    }
}
