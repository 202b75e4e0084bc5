use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::scoring::Category;

/// Who filled a category, and for how much.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fill {
    pub player_id: Uuid,
    pub score: u16,
}

/// Categories filled so far in one match, shared by both players.
///
/// Once either player fills a category it is closed for everyone. Each
/// category is filled at most once; a second fill is rejected and leaves the
/// ledger untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameLedger {
    fills: BTreeMap<Category, Fill>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("{category} was already filled")]
    Rejected { category: Category, by: Uuid },
}

impl GameLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_filled(&self, category: Category) -> bool {
        self.fills.contains_key(&category)
    }

    pub fn is_open(&self, category: Category) -> bool {
        !self.is_filled(category)
    }

    /// Open categories in scorecard order. The ledger is shared, so every
    /// player sees the same list.
    pub fn open_categories(&self) -> Vec<Category> {
        Category::ALL
            .iter()
            .filter(|c| self.is_open(**c))
            .copied()
            .collect()
    }

    pub fn fill(&mut self, player_id: Uuid, category: Category, score: u16) -> Result<(), LedgerError> {
        if let Some(existing) = self.fills.get(&category) {
            return Err(LedgerError::Rejected {
                category,
                by: existing.player_id,
            });
        }
        self.fills.insert(category, Fill { player_id, score });
        Ok(())
    }

    pub fn fill_of(&self, category: Category) -> Option<&Fill> {
        self.fills.get(&category)
    }

    pub fn filled_by(&self, player_id: Uuid) -> impl Iterator<Item = (Category, u16)> + '_ {
        self.fills
            .iter()
            .filter(move |(_, f)| f.player_id == player_id)
            .map(|(c, f)| (*c, f.score))
    }

    pub fn filled_count(&self) -> usize {
        self.fills.len()
    }

    pub fn is_complete(&self) -> bool {
        self.fills.len() == Category::ALL.len()
    }
}
