use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::scoring::Category;

/// Scores a single player locked in. Whether a category is still open is
/// the ledger's business; this only records what this player earned.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Scorecard {
    pub scores: HashMap<Category, u16>,
}

impl Scorecard {
    pub fn new() -> Self {
        Self {
            scores: HashMap::new(),
        }
    }

    pub fn is_category_used(&self, category: Category) -> bool {
        self.scores.contains_key(&category)
    }

    pub fn record(&mut self, category: Category, score: u16) -> Result<(), ScorecardError> {
        if self.is_category_used(category) {
            return Err(ScorecardError::CategoryAlreadyUsed(category));
        }
        self.scores.insert(category, score);
        Ok(())
    }

    pub fn score(&self, category: Category) -> Option<u16> {
        self.scores.get(&category).copied()
    }

    pub fn upper_subtotal(&self) -> u16 {
        Category::UPPER
            .iter()
            .filter_map(|c| self.scores.get(c))
            .sum()
    }

    pub fn lower_total(&self) -> u16 {
        Category::ALL
            .iter()
            .filter(|c| !c.is_upper())
            .filter_map(|c| self.scores.get(c))
            .sum()
    }

    pub fn total(&self) -> u16 {
        self.upper_subtotal() + self.lower_total()
    }

    /// Filled entries in scorecard order.
    pub fn entries(&self) -> Vec<(Category, u16)> {
        Category::ALL
            .iter()
            .filter_map(|c| self.scores.get(c).map(|s| (*c, *s)))
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ScorecardError {
    #[error("category already used: {0}")]
    CategoryAlreadyUsed(Category),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub id: Uuid,
    pub name: String,
    pub scorecard: Scorecard,
    pub is_computer: bool,
}

impl Player {
    pub fn new(id: Uuid, name: String) -> Self {
        Self {
            id,
            name,
            scorecard: Scorecard::new(),
            is_computer: false,
        }
    }

    pub fn computer(id: Uuid, name: String) -> Self {
        Self {
            is_computer: true,
            ..Self::new(id, name)
        }
    }
}
