//! Heuristic value of pursuing a category with the dice on the table.
//!
//! This is a fixed weighting ladder, not a probability model. The
//! multipliers are part of the engine's observable behaviour: changing them
//! changes which dice the computer keeps.

use crate::dice::MAX_ROLLS;
use crate::patterns::FaceCounts;
use crate::scoring::{Category, UPPER_BONUS_THRESHOLD, UPPER_BONUS_VALUE};

#[derive(Debug, Clone, Copy)]
pub struct ValueInputs {
    pub category: Category,
    /// Score the category would get with the current dice.
    pub current_score: u16,
    pub rolls_remaining: u8,
    /// 1-based index of the roll just made.
    pub roll_count: u8,
    pub counts: FaceCounts,
    /// The deciding player's upper-section subtotal.
    pub upper_section_score: u16,
    /// Categories still open in the ledger.
    pub open_count: usize,
}

pub fn difficulty_multiplier(category: Category) -> f64 {
    match category {
        Category::Yahtzee => 1.2,
        Category::LargeStraight => 1.1,
        Category::FullHouse => 1.1,
        Category::SmallStraight => 1.0,
        Category::FourOfAKind => 0.95,
        Category::ThreeOfAKind => 0.8,
        _ => 0.7,
    }
}

pub fn value(inputs: &ValueInputs) -> f64 {
    let ValueInputs {
        category,
        current_score,
        rolls_remaining,
        roll_count,
        counts,
        upper_section_score,
        open_count,
    } = *inputs;
    let base = current_score as f64;
    let final_roll = roll_count >= MAX_ROLLS;

    // A made Four of a Kind or Yahtzee outranks the matching number category
    // once rolling is over.
    if matches!(category, Category::FourOfAKind | Category::Yahtzee) && current_score > 0 && final_roll {
        return base * 2.5;
    }
    if category == Category::FullHouse && final_roll && current_score == 25 {
        return base * 1.5;
    }

    let mut v = base;
    if category == Category::FullHouse && roll_count == 1 {
        v *= 1.2;
    }
    if category.is_upper() && upper_section_score < UPPER_BONUS_THRESHOLD {
        v += UPPER_BONUS_VALUE as f64 / rolls_remaining.max(1) as f64;
    }
    if category == Category::Yahtzee {
        v *= 1.5;
    }
    v *= difficulty_multiplier(category);

    if let Some(face) = category.face() {
        if category.is_low_number() && open_count > 3 && counts.get(face) >= 3 {
            v *= 0.5;
        }
    }
    if category == Category::Aces && counts.get(1) <= 2 {
        v *= 0.2;
    }
    v
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::Faces;
    use crate::scoring::compute_score;

    fn inputs(category: Category, dice: [u8; 5], roll_count: u8) -> ValueInputs {
        let faces = Faces::new(dice).unwrap();
        ValueInputs {
            category,
            current_score: compute_score(category, &faces),
            rolls_remaining: MAX_ROLLS,
            roll_count,
            counts: FaceCounts::of(&faces),
            upper_section_score: 0,
            open_count: 12,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_upper_bonus_credit_and_multiplier() {
        let v = value(&inputs(Category::Sixes, [6, 6, 6, 1, 2], 1));
        assert!(approx(v, (18.0 + 35.0 / 3.0) * 0.7));
    }

    #[test]
    fn test_no_bonus_credit_once_threshold_reached() {
        let mut i = inputs(Category::Sixes, [6, 6, 6, 1, 2], 1);
        i.upper_section_score = 63;
        assert!(approx(value(&i), 18.0 * 0.7));
    }

    #[test]
    fn test_yahtzee_weighting() {
        assert!(approx(value(&inputs(Category::Yahtzee, [4, 4, 4, 4, 4], 1)), 50.0 * 1.5 * 1.2));
        assert!(approx(value(&inputs(Category::Yahtzee, [4, 4, 4, 4, 4], 3)), 125.0));
        assert!(approx(value(&inputs(Category::Yahtzee, [4, 4, 4, 4, 2], 3)), 0.0));
    }

    #[test]
    fn test_four_of_a_kind_final_roll_override() {
        let v = value(&inputs(Category::FourOfAKind, [5, 5, 5, 5, 2], 3));
        assert!(approx(v, 55.0));
        let early = value(&inputs(Category::FourOfAKind, [5, 5, 5, 5, 2], 2));
        assert!(approx(early, 22.0 * 0.95));
    }

    #[test]
    fn test_full_house_boosts() {
        assert!(approx(value(&inputs(Category::FullHouse, [2, 2, 3, 3, 3], 1)), 25.0 * 1.2 * 1.1));
        assert!(approx(value(&inputs(Category::FullHouse, [2, 2, 3, 3, 3], 2)), 25.0 * 1.1));
        assert!(approx(value(&inputs(Category::FullHouse, [2, 2, 3, 3, 3], 3)), 37.5));
    }

    #[test]
    fn test_low_number_decoy_penalty() {
        let v = value(&inputs(Category::Threes, [3, 3, 3, 5, 6], 1));
        assert!(approx(v, (9.0 + 35.0 / 3.0) * 0.7 * 0.5));

        let mut late = inputs(Category::Threes, [3, 3, 3, 5, 6], 1);
        late.open_count = 3;
        assert!(approx(value(&late), (9.0 + 35.0 / 3.0) * 0.7));
    }

    #[test]
    fn test_aces_severe_penalty() {
        let v = value(&inputs(Category::Aces, [1, 1, 4, 5, 6], 1));
        assert!(approx(v, (2.0 + 35.0 / 3.0) * 0.7 * 0.2));
        // Three aces trip the decoy penalty instead
        let v = value(&inputs(Category::Aces, [1, 1, 1, 5, 6], 1));
        assert!(approx(v, (3.0 + 35.0 / 3.0) * 0.7 * 0.5));
    }

    #[test]
    fn test_straights_and_kinds() {
        assert!(approx(value(&inputs(Category::LargeStraight, [1, 2, 3, 4, 5], 1)), 44.0));
        assert!(approx(value(&inputs(Category::SmallStraight, [1, 2, 3, 4, 6], 1)), 30.0));
        assert!(approx(value(&inputs(Category::ThreeOfAKind, [2, 2, 2, 5, 6], 1)), 17.0 * 0.8));
    }
}
