use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};
use uuid::Uuid;

use crate::config::EngineConfig;
use crate::dice::{DiceRoller, DiceSet, Faces, KeepMask, ValidationError, MAX_ROLLS};
use crate::ledger::{GameLedger, LedgerError};
use crate::player::{Player, ScorecardError};
use crate::scoring::{compute_score, Category};
use crate::selector::{self, CategoryOutcome};
use crate::strategy;
use crate::turn::{Situation, TurnContext};

/// Ties on the opening toss are rerolled at most this many times.
const MAX_TOSS_ATTEMPTS: usize = 64;

// -- Turn State --

#[derive(Debug, Clone, Serialize)]
pub struct TurnState {
    pub player_id: Uuid,
    pub dice: DiceSet,
    pub ctx: TurnContext,
    pub rolls: Vec<RollRecord>,
}

impl TurnState {
    pub fn new(player_id: Uuid) -> Self {
        Self {
            player_id,
            dice: DiceSet::new(),
            ctx: TurnContext::new(),
            rolls: Vec::new(),
        }
    }

    pub fn can_roll(&self) -> bool {
        self.ctx.roll_count < MAX_ROLLS
    }

    pub fn can_hold(&self) -> bool {
        self.ctx.roll_count > 0 && self.can_roll()
    }

    pub fn can_lock(&self) -> bool {
        self.ctx.roll_count > 0
    }

    pub fn roll(&mut self, roller: &mut impl DiceRoller) -> Result<(), GameError> {
        if !self.can_roll() {
            return Err(GameError::CannotRoll);
        }
        if self.ctx.roll_count == 0 {
            self.dice.release_all();
        }
        self.dice.roll_unheld(roller)?;
        self.ctx.roll_count += 1;
        self.rolls.push(RollRecord {
            dice: self.dice.faces(),
            keep: [false; 5],
        });
        Ok(())
    }

    pub fn hold(&mut self, held: KeepMask) -> Result<(), GameError> {
        if !self.can_hold() {
            return Err(GameError::CannotHold);
        }
        self.dice.set_held(held);
        self.note_keep(held);
        Ok(())
    }

    fn note_keep(&mut self, keep: KeepMask) {
        if let Some(last) = self.rolls.last_mut() {
            last.keep = keep;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
    pub dice: Faces,
    /// Dice set aside after this roll.
    pub keep: KeepMask,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnRecord {
    pub player_id: Uuid,
    pub player_name: String,
    pub round: u16,
    pub rolls: Vec<RollRecord>,
    pub category: Category,
    pub score: u16,
    pub played_at: DateTime<Utc>,
}

// -- Match --

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MatchPhase {
    Toss,
    Playing,
    Finished,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MatchOutcome {
    Winner { player_id: Uuid, name: String, total: u16 },
    Tie { total: u16 },
}

/// Two players sharing one ledger. Every category can be filled once per
/// match, by whichever player gets there first.
#[derive(Debug, Clone, Serialize)]
pub struct Match {
    pub phase: MatchPhase,
    pub players: Vec<Player>,
    pub ledger: GameLedger,
    pub first_player_index: usize,
    pub current_player_index: usize,
    pub turn: Option<TurnState>,
    pub round: u16,
    pub history: Vec<TurnRecord>,
    #[serde(skip)]
    pub config: EngineConfig,
}

impl Match {
    pub fn new(players: Vec<Player>, config: EngineConfig) -> Result<Self, GameError> {
        if players.len() != 2 {
            return Err(GameError::PlayerCount(players.len()));
        }
        Ok(Self {
            phase: MatchPhase::Toss,
            players,
            ledger: GameLedger::new(),
            first_player_index: 0,
            current_player_index: 0,
            turn: None,
            round: 0,
            history: Vec::new(),
            config,
        })
    }

    /// Both players roll one die; the higher roll starts. Ties reroll.
    pub fn toss_for_first_player(&mut self, roller: &mut impl DiceRoller) -> Result<Uuid, GameError> {
        if self.phase != MatchPhase::Toss {
            return Err(GameError::AlreadyStarted);
        }
        for _ in 0..MAX_TOSS_ATTEMPTS {
            let mut dice = DiceSet::new();
            dice.roll_unheld(roller)?;
            let faces = dice.faces();
            let (a, b) = (faces.get(0), faces.get(1));
            debug!(first = a, second = b, "toss");
            if a != b {
                let first = if a > b { 0 } else { 1 };
                self.start(first)?;
                return Ok(self.players[first].id);
            }
        }
        Err(GameError::TossUndecided)
    }

    /// Starts play with `first` to move, skipping the toss.
    pub fn start(&mut self, first: usize) -> Result<(), GameError> {
        if self.phase != MatchPhase::Toss {
            return Err(GameError::AlreadyStarted);
        }
        if first >= self.players.len() {
            return Err(GameError::NoSuchSeat(first));
        }
        self.phase = MatchPhase::Playing;
        self.first_player_index = first;
        self.current_player_index = first;
        self.round = 1;
        self.turn = Some(TurnState::new(self.current_player().id));
        info!(first = %self.current_player().name, "match started");
        Ok(())
    }

    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    pub fn is_current_player(&self, player_id: Uuid) -> bool {
        self.current_player().id == player_id
    }

    pub fn player(&self, player_id: Uuid) -> Option<&Player> {
        self.players.iter().find(|p| p.id == player_id)
    }

    pub fn is_finished(&self) -> bool {
        self.phase == MatchPhase::Finished
    }

    fn active_turn(&mut self, player_id: Uuid) -> Result<&mut TurnState, GameError> {
        match self.phase {
            MatchPhase::Toss => return Err(GameError::NotStarted),
            MatchPhase::Finished => return Err(GameError::GameOver),
            MatchPhase::Playing => {}
        }
        if !self.is_current_player(player_id) {
            return Err(GameError::NotYourTurn);
        }
        self.turn.as_mut().ok_or(GameError::NoActiveTurn)
    }

    pub fn roll_dice(&mut self, player_id: Uuid, roller: &mut impl DiceRoller) -> Result<(), GameError> {
        self.active_turn(player_id)?.roll(roller)
    }

    pub fn hold_dice(&mut self, player_id: Uuid, held: KeepMask) -> Result<(), GameError> {
        self.active_turn(player_id)?.hold(held)
    }

    /// What the current player is looking at after their latest roll.
    pub fn situation(&self) -> Result<Situation, GameError> {
        let turn = self.turn.as_ref().ok_or(GameError::NoActiveTurn)?;
        Ok(Situation::for_player(
            turn.dice.faces(),
            &self.ledger,
            &self.current_player().scorecard,
            turn.ctx.roll_count,
            &self.config,
        ))
    }

    /// Scores the current dice in `category`: first the shared ledger, then
    /// the player's own scorecard.
    pub fn lock(&mut self, player_id: Uuid, category: Category) -> Result<u16, GameError> {
        self.finish_turn(player_id, category).map(|record| record.score)
    }

    fn finish_turn(&mut self, player_id: Uuid, category: Category) -> Result<TurnRecord, GameError> {
        let turn = self.active_turn(player_id)?;
        if !turn.can_lock() {
            return Err(GameError::CannotLock);
        }
        let score = compute_score(category, &turn.dice.faces());
        let rolls = turn.rolls.clone();

        self.ledger.fill(player_id, category, score)?;
        let player = &mut self.players[self.current_player_index];
        player.scorecard.record(category, score)?;
        if let Some(turn) = self.turn.as_mut() {
            turn.ctx.last_locked = Some((category, score));
        }

        let record = TurnRecord {
            player_id,
            player_name: player.name.clone(),
            round: self.round,
            rolls,
            category,
            score,
            played_at: Utc::now(),
        };
        info!(
            player = %record.player_name,
            round = record.round,
            %category,
            score,
            total = player.scorecard.total(),
            "locked"
        );
        self.history.push(record.clone());
        self.advance_turn();
        Ok(record)
    }

    fn advance_turn(&mut self) {
        let mut ctx = self.turn.take().map(|t| t.ctx).unwrap_or_default();
        if self.ledger.is_complete() {
            self.phase = MatchPhase::Finished;
            info!(turns = self.history.len(), "match finished");
            return;
        }
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        if self.current_player_index == self.first_player_index {
            self.round += 1;
        }
        // The next turn starts fresh but still knows what was just locked.
        ctx.reset();
        self.turn = Some(TurnState {
            ctx,
            ..TurnState::new(self.current_player().id)
        });
    }

    /// Plays the current player's whole turn with the built-in strategy.
    pub fn play_computer_turn(&mut self, roller: &mut impl DiceRoller) -> Result<TurnRecord, GameError> {
        let player_id = self.current_player().id;
        self.active_turn(player_id)?;
        if !self.current_player().is_computer {
            return Err(GameError::NotComputer);
        }
        if self.ledger.open_categories().is_empty() {
            return Err(GameError::NoOpenCategories);
        }
        loop {
            self.roll_dice(player_id, roller)?;
            let situation = self.situation()?;
            let decision = strategy::decide(&situation);
            if let Some(turn) = self.turn.as_mut() {
                turn.ctx.pursued = decision.pursued;
                turn.note_keep(decision.keep);
            }
            if decision.roll_again {
                self.hold_dice(player_id, decision.keep)?;
                continue;
            }
            match selector::select(&situation) {
                CategoryOutcome::Lock { category, .. } => {
                    return self.finish_turn(player_id, category);
                }
                CategoryOutcome::RollAgain if !situation.is_final_roll() => {
                    self.hold_dice(player_id, decision.keep)?;
                }
                CategoryOutcome::RollAgain => return Err(GameError::NoOpenCategories),
            }
        }
    }

    /// Lets the computer play both seats until the ledger is full.
    pub fn play_to_end(&mut self, roller: &mut impl DiceRoller) -> Result<Vec<TurnRecord>, GameError> {
        if self.phase == MatchPhase::Toss {
            self.toss_for_first_player(roller)?;
        }
        let mut turns = Vec::new();
        while !self.is_finished() {
            turns.push(self.play_computer_turn(roller)?);
        }
        Ok(turns)
    }

    pub fn outcome(&self) -> Option<MatchOutcome> {
        if !self.is_finished() {
            return None;
        }
        let [a, b] = [&self.players[0], &self.players[1]];
        let (ta, tb) = (a.scorecard.total(), b.scorecard.total());
        Some(match ta.cmp(&tb) {
            std::cmp::Ordering::Equal => MatchOutcome::Tie { total: ta },
            std::cmp::Ordering::Greater => MatchOutcome::Winner {
                player_id: a.id,
                name: a.name.clone(),
                total: ta,
            },
            std::cmp::Ordering::Less => MatchOutcome::Winner {
                player_id: b.id,
                name: b.name.clone(),
                total: tb,
            },
        })
    }
}

// -- Errors --

#[derive(Debug, Clone, thiserror::Error)]
pub enum GameError {
    #[error("a match needs exactly 2 players, got {0}")]
    PlayerCount(usize),
    #[error("no player in seat {0}")]
    NoSuchSeat(usize),
    #[error("match already started")]
    AlreadyStarted,
    #[error("match not started")]
    NotStarted,
    #[error("toss kept tying")]
    TossUndecided,
    #[error("cannot roll now")]
    CannotRoll,
    #[error("cannot hold dice now")]
    CannotHold,
    #[error("cannot lock a category before rolling")]
    CannotLock,
    #[error("no active turn")]
    NoActiveTurn,
    #[error("no open categories left")]
    NoOpenCategories,
    #[error("not your turn")]
    NotYourTurn,
    #[error("current player is not computer-controlled")]
    NotComputer,
    #[error("game over")]
    GameOver,
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Scorecard(#[from] ScorecardError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}
