//! Human-readable breakdown of a single roll: what each open category would
//! pay, how the engine values it, and what it would do next.

use serde::Serialize;
use std::fmt;

use crate::config::EngineConfig;
use crate::dice::Faces;
use crate::ledger::GameLedger;
use crate::player::Scorecard;
use crate::scoring::Category;
use crate::selector::{self, CategoryOutcome};
use crate::strategy::{self, StrategyDecision};
use crate::turn::{Situation, TurnContext};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRow {
    pub category: Category,
    pub score: u16,
    pub expected_value: f64,
    pub stars: u8,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RollAnalysis {
    pub dice: Faces,
    pub roll_count: u8,
    pub rows: Vec<CategoryRow>,
    pub decision: StrategyDecision,
    /// Present once the engine would stop rolling.
    pub outcome: Option<CategoryOutcome>,
    pub selector_rule: Option<&'static str>,
    /// What the previous turn locked, when the report comes from a match.
    pub last_locked: Option<(Category, u16)>,
}

pub fn stars(score: u16) -> u8 {
    match score {
        25.. => 3,
        15..=24 => 2,
        1..=14 => 1,
        0 => 0,
    }
}

pub fn analyze(
    faces: Faces,
    ctx: &TurnContext,
    ledger: &GameLedger,
    scorecard: &Scorecard,
    config: &EngineConfig,
) -> RollAnalysis {
    let situation = Situation::for_player(faces, ledger, scorecard, ctx.roll_count, config);
    RollAnalysis {
        last_locked: ctx.last_locked,
        ..analyze_situation(&situation)
    }
}

/// Same report for a hand-built situation, e.g. an open list typed in by a
/// user rather than read from a match.
pub fn analyze_situation(situation: &Situation) -> RollAnalysis {
    let mut rows: Vec<CategoryRow> = strategy::expected_values(situation)
        .into_iter()
        .map(|(category, expected_value)| {
            let score = situation.score(category);
            CategoryRow {
                category,
                score,
                expected_value,
                stars: stars(score),
            }
        })
        .collect();
    rows.sort_by(|a, b| b.score.cmp(&a.score));

    let decision = strategy::decide(situation);
    let (selector_rule, outcome) = if decision.roll_again {
        (None, None)
    } else {
        let (rule, outcome) = selector::select_with_rule(situation);
        (Some(rule), Some(outcome))
    };
    RollAnalysis {
        dice: situation.dice,
        roll_count: situation.roll_count,
        rows,
        decision,
        outcome,
        selector_rule,
        last_locked: None,
    }
}

impl fmt::Display for RollAnalysis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some((category, score)) = self.last_locked {
            writeln!(f, "Last locked: {category} for {score}")?;
        }
        writeln!(f, "Roll {} of 3: {}", self.roll_count, self.dice)?;
        writeln!(f, "{:<16} {:>5} {:>8}", "Category", "Score", "Value")?;
        for row in &self.rows {
            writeln!(
                f,
                "{:<16} {:>5} {:>8.2}  {}",
                row.category.display_name(),
                row.score,
                row.expected_value,
                "\u{2605}".repeat(row.stars as usize)
            )?;
        }
        let keep: Vec<String> = self
            .dice
            .iter()
            .zip(self.decision.keep)
            .filter(|(_, k)| *k)
            .map(|(d, _)| d.to_string())
            .collect();
        write!(f, "Keep [{}]", keep.join(", "))?;
        if let Some(target) = self.decision.pursued {
            write!(f, " for {target}")?;
        }
        writeln!(f, " ({})", self.decision.rule)?;
        match self.outcome {
            Some(outcome) => writeln!(f, "Then: {outcome}"),
            None => writeln!(f, "Then: roll again"),
        }
    }
}
