use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::dice::{Faces, ValidationError};
use crate::patterns::FaceCounts;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    // Upper section
    Aces,
    Twos,
    Threes,
    Fours,
    Fives,
    Sixes,
    // Lower section
    ThreeOfAKind,
    FourOfAKind,
    FullHouse,
    SmallStraight,
    LargeStraight,
    Yahtzee,
}

impl Category {
    pub const ALL: [Category; 12] = [
        Category::Aces,
        Category::Twos,
        Category::Threes,
        Category::Fours,
        Category::Fives,
        Category::Sixes,
        Category::ThreeOfAKind,
        Category::FourOfAKind,
        Category::FullHouse,
        Category::SmallStraight,
        Category::LargeStraight,
        Category::Yahtzee,
    ];

    pub const UPPER: [Category; 6] = [
        Category::Aces,
        Category::Twos,
        Category::Threes,
        Category::Fours,
        Category::Fives,
        Category::Sixes,
    ];

    /// Hardest to easiest. Breaks ties between equal scores or values.
    pub const DIFFICULTY_ORDER: [Category; 12] = [
        Category::Yahtzee,
        Category::LargeStraight,
        Category::SmallStraight,
        Category::FullHouse,
        Category::FourOfAKind,
        Category::ThreeOfAKind,
        Category::Sixes,
        Category::Fives,
        Category::Fours,
        Category::Threes,
        Category::Twos,
        Category::Aces,
    ];

    pub fn is_upper(&self) -> bool {
        self.face().is_some()
    }

    /// Target face for the number categories.
    pub fn face(&self) -> Option<u8> {
        match self {
            Category::Aces => Some(1),
            Category::Twos => Some(2),
            Category::Threes => Some(3),
            Category::Fours => Some(4),
            Category::Fives => Some(5),
            Category::Sixes => Some(6),
            _ => None,
        }
    }

    pub fn for_face(face: u8) -> Option<Category> {
        match face {
            1..=6 => Some(Category::UPPER[face as usize - 1]),
            _ => None,
        }
    }

    /// Aces, Twos and Threes.
    pub fn is_low_number(&self) -> bool {
        matches!(self, Category::Aces | Category::Twos | Category::Threes)
    }

    /// Position in [`Category::DIFFICULTY_ORDER`]; lower is harder.
    pub fn difficulty_rank(&self) -> usize {
        match self {
            Category::Yahtzee => 0,
            Category::LargeStraight => 1,
            Category::SmallStraight => 2,
            Category::FullHouse => 3,
            Category::FourOfAKind => 4,
            Category::ThreeOfAKind => 5,
            Category::Sixes => 6,
            Category::Fives => 7,
            Category::Fours => 8,
            Category::Threes => 9,
            Category::Twos => 10,
            Category::Aces => 11,
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Category::Aces => "Aces",
            Category::Twos => "Twos",
            Category::Threes => "Threes",
            Category::Fours => "Fours",
            Category::Fives => "Fives",
            Category::Sixes => "Sixes",
            Category::ThreeOfAKind => "Three of a Kind",
            Category::FourOfAKind => "Four of a Kind",
            Category::FullHouse => "Full House",
            Category::SmallStraight => "Small Straight",
            Category::LargeStraight => "Large Straight",
            Category::Yahtzee => "Yahtzee",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category: {0:?}")]
pub struct UnknownCategory(pub String);

impl FromStr for Category {
    type Err = UnknownCategory;

    /// Accepts display names ("Three of a Kind") and compact spellings
    /// ("ThreeOfAKind", "three-of-a-kind"), ignoring case.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .map(|c| c.to_ascii_lowercase())
            .collect();
        let cat = match key.as_str() {
            "aces" | "ones" => Category::Aces,
            "twos" => Category::Twos,
            "threes" => Category::Threes,
            "fours" => Category::Fours,
            "fives" => Category::Fives,
            "sixes" => Category::Sixes,
            "threeofakind" | "3ofakind" => Category::ThreeOfAKind,
            "fourofakind" | "4ofakind" => Category::FourOfAKind,
            "fullhouse" => Category::FullHouse,
            "smallstraight" => Category::SmallStraight,
            "largestraight" => Category::LargeStraight,
            "yahtzee" => Category::Yahtzee,
            _ => return Err(UnknownCategory(s.to_string())),
        };
        Ok(cat)
    }
}

pub const UPPER_BONUS_THRESHOLD: u16 = 63;
pub const UPPER_BONUS_VALUE: u16 = 35;
pub const FULL_HOUSE_SCORE: u16 = 25;
pub const SMALL_STRAIGHT_SCORE: u16 = 30;
pub const LARGE_STRAIGHT_SCORE: u16 = 40;
pub const YAHTZEE_SCORE: u16 = 50;

/// Compute the score for a given category and dice values.
pub fn compute_score(category: Category, dice: &Faces) -> u16 {
    let counts = FaceCounts::of(dice);
    match category {
        Category::Aces
        | Category::Twos
        | Category::Threes
        | Category::Fours
        | Category::Fives
        | Category::Sixes => {
            let face = category.face().unwrap_or(0);
            counts.get(face) as u16 * face as u16
        }
        Category::ThreeOfAKind => {
            if counts.has_n_of_a_kind(3) {
                dice.sum()
            } else {
                0
            }
        }
        Category::FourOfAKind => {
            if counts.has_n_of_a_kind(4) {
                dice.sum()
            } else {
                0
            }
        }
        Category::FullHouse => {
            if is_full_house(&counts) {
                FULL_HOUSE_SCORE
            } else {
                0
            }
        }
        Category::SmallStraight => {
            if counts.longest_run().len >= 4 {
                SMALL_STRAIGHT_SCORE
            } else {
                0
            }
        }
        Category::LargeStraight => {
            if counts.longest_run().len == 5 {
                LARGE_STRAIGHT_SCORE
            } else {
                0
            }
        }
        Category::Yahtzee => {
            if counts.has_n_of_a_kind(5) {
                YAHTZEE_SCORE
            } else {
                0
            }
        }
    }
}

/// Validating entry point for raw dice input.
pub fn score_slice(category: Category, dice: &[u8]) -> Result<u16, ValidationError> {
    let faces = Faces::from_slice(dice)?;
    Ok(compute_score(category, &faces))
}

/// Scores for every category in `categories`, in the given order.
pub fn score_all(categories: &[Category], dice: &Faces) -> Vec<(Category, u16)> {
    categories
        .iter()
        .map(|&c| (c, compute_score(c, dice)))
        .collect()
}

fn is_full_house(counts: &FaceCounts) -> bool {
    let triples = (1..=6u8).filter(|&f| counts.get(f) == 3).count();
    let pairs = (1..=6u8).filter(|&f| counts.get(f) == 2).count();
    triples == 1 && pairs == 1
}
