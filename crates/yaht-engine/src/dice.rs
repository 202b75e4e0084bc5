use std::collections::VecDeque;
use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::warn;

pub const NUM_DICE: usize = 5;
pub const MAX_ROLLS: u8 = 3;
pub const MIN_FACE: u8 = 1;
pub const MAX_FACE: u8 = 6;

/// Which dice are set aside (true) and which get rerolled (false).
pub type KeepMask = [bool; NUM_DICE];

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("expected 5 dice, got {0}")]
    WrongLength(usize),
    #[error("die {index} shows {value}, faces must be in 1..=6")]
    FaceOutOfRange { index: usize, value: u8 },
    #[error("{0:?} is not a die face")]
    NotANumber(String),
}

/// Five face values, each guaranteed to be in `1..=6`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "Vec<u8>", into = "Vec<u8>")]
pub struct Faces([u8; NUM_DICE]);

impl Faces {
    pub fn new(values: [u8; NUM_DICE]) -> Result<Self, ValidationError> {
        Self::from_slice(&values)
    }

    pub fn from_slice(values: &[u8]) -> Result<Self, ValidationError> {
        if values.len() != NUM_DICE {
            return Err(ValidationError::WrongLength(values.len()));
        }
        let mut faces = [0u8; NUM_DICE];
        for (i, &v) in values.iter().enumerate() {
            if !(MIN_FACE..=MAX_FACE).contains(&v) {
                return Err(ValidationError::FaceOutOfRange { index: i, value: v });
            }
            faces[i] = v;
        }
        Ok(Self(faces))
    }

    pub fn values(&self) -> [u8; NUM_DICE] {
        self.0
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn get(&self, index: usize) -> u8 {
        self.0[index]
    }

    pub fn sum(&self) -> u16 {
        self.0.iter().map(|&d| d as u16).sum()
    }

    pub fn sorted(&self) -> [u8; NUM_DICE] {
        let mut v = self.0;
        v.sort();
        v
    }
}

impl TryFrom<Vec<u8>> for Faces {
    type Error = ValidationError;

    fn try_from(values: Vec<u8>) -> Result<Self, Self::Error> {
        Self::from_slice(&values)
    }
}

impl From<Faces> for Vec<u8> {
    fn from(faces: Faces) -> Self {
        faces.0.to_vec()
    }
}

impl std::str::FromStr for Faces {
    type Err = ValidationError;

    /// Parses "2,2,3,4,5" or "2 2 3 4 5".
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let values = s
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|t| !t.is_empty())
            .map(|t| {
                t.parse::<u8>()
                    .map_err(|_| ValidationError::NotANumber(t.to_string()))
            })
            .collect::<Result<Vec<u8>, _>>()?;
        Self::from_slice(&values)
    }
}

impl fmt::Display for Faces {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}, {}, {}]",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4]
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Die {
    value: u8,
    held: bool,
}

impl Die {
    pub fn new() -> Self {
        Self {
            value: 1,
            held: false,
        }
    }

    pub fn value(&self) -> u8 {
        self.value
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

impl Default for Die {
    fn default() -> Self {
        Self::new()
    }
}

/// Source of fresh face values for the unheld dice.
///
/// The returned array covers all five positions; values at held positions
/// are ignored by [`DiceSet::roll_unheld`].
pub trait DiceRoller {
    fn roll_unheld(&mut self, held: KeepMask) -> [u8; NUM_DICE];
}

/// Uniform random dice backed by any `rand` generator.
#[derive(Debug)]
pub struct RngRoller<R> {
    rng: R,
}

impl<R: Rng> RngRoller<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    pub fn roll_one(&mut self) -> u8 {
        self.rng.gen_range(MIN_FACE..=MAX_FACE)
    }
}

impl<R: Rng> DiceRoller for RngRoller<R> {
    fn roll_unheld(&mut self, held: KeepMask) -> [u8; NUM_DICE] {
        let mut out = [0u8; NUM_DICE];
        for (v, &h) in out.iter_mut().zip(held.iter()) {
            if !h {
                *v = self.roll_one();
            }
        }
        out
    }
}

/// Replays pre-entered rolls, then falls back to all-ones.
///
/// Covers manual dice entry: each queued roll supplies the faces for the
/// unheld positions of one roll. Every fallback roll is logged and counted
/// in [`ScriptedRoller::fallback_rolls`].
#[derive(Debug, Default)]
pub struct ScriptedRoller {
    rolls: VecDeque<Faces>,
    fallback_rolls: usize,
}

impl ScriptedRoller {
    pub fn new(rolls: impl IntoIterator<Item = Faces>) -> Self {
        Self {
            rolls: rolls.into_iter().collect(),
            fallback_rolls: 0,
        }
    }

    pub fn remaining(&self) -> usize {
        self.rolls.len()
    }

    /// Rolls answered with all-ones because the script had run out.
    pub fn fallback_rolls(&self) -> usize {
        self.fallback_rolls
    }
}

impl DiceRoller for ScriptedRoller {
    fn roll_unheld(&mut self, _held: KeepMask) -> [u8; NUM_DICE] {
        match self.rolls.pop_front() {
            Some(faces) => faces.values(),
            None => {
                self.fallback_rolls += 1;
                warn!(fallback_rolls = self.fallback_rolls, "dice script exhausted, rolling all ones");
                [MIN_FACE; NUM_DICE]
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DiceSet {
    dice: [Die; NUM_DICE],
}

impl DiceSet {
    pub fn new() -> Self {
        Self {
            dice: [Die::new(); NUM_DICE],
        }
    }

    pub fn from_faces(faces: Faces) -> Self {
        let mut set = Self::new();
        for (die, v) in set.dice.iter_mut().zip(faces.iter()) {
            die.value = v;
        }
        set
    }

    /// Rerolls every unheld die. Held dice keep their value whatever the
    /// roller returns for their position; out-of-range roller output is
    /// rejected before any die changes.
    pub fn roll_unheld(&mut self, roller: &mut impl DiceRoller) -> Result<(), ValidationError> {
        let held = self.held();
        let fresh = roller.roll_unheld(held);
        let mut next = self.values();
        for (i, v) in fresh.iter().enumerate() {
            if !held[i] {
                next[i] = *v;
            }
        }
        let faces = Faces::new(next)?;
        for (die, v) in self.dice.iter_mut().zip(faces.iter()) {
            die.value = v;
        }
        Ok(())
    }

    pub fn set_held(&mut self, held: KeepMask) {
        for (die, &h) in self.dice.iter_mut().zip(held.iter()) {
            die.held = h;
        }
    }

    pub fn release_all(&mut self) {
        for die in &mut self.dice {
            die.held = false;
        }
    }

    pub fn held(&self) -> KeepMask {
        let mut held = [false; NUM_DICE];
        for (h, die) in held.iter_mut().zip(self.dice.iter()) {
            *h = die.held;
        }
        held
    }

    pub fn held_count(&self) -> usize {
        self.dice.iter().filter(|d| d.held).count()
    }

    pub fn values(&self) -> [u8; NUM_DICE] {
        [
            self.dice[0].value,
            self.dice[1].value,
            self.dice[2].value,
            self.dice[3].value,
            self.dice[4].value,
        ]
    }

    pub fn faces(&self) -> Faces {
        // Die values only ever come from validated faces.
        Faces(self.values())
    }
}

impl Default for DiceSet {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DiceSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, die) in self.dice.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            if die.held {
                write!(f, "[{}]", die.value)?;
            } else {
                write!(f, "{}", die.value)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn faces(v: [u8; 5]) -> Faces {
        Faces::new(v).unwrap()
    }

    #[test]
    fn test_die_default_value() {
        let die = Die::new();
        assert_eq!(die.value(), 1);
        assert!(!die.is_held());
    }

    #[test]
    fn test_faces_rejects_wrong_length() {
        assert_eq!(
            Faces::from_slice(&[1, 2, 3]),
            Err(ValidationError::WrongLength(3))
        );
        assert_eq!(
            Faces::from_slice(&[1, 2, 3, 4, 5, 6]),
            Err(ValidationError::WrongLength(6))
        );
    }

    #[test]
    fn test_faces_rejects_out_of_range() {
        assert_eq!(
            Faces::new([1, 2, 7, 4, 5]),
            Err(ValidationError::FaceOutOfRange { index: 2, value: 7 })
        );
        assert!(Faces::new([0, 2, 3, 4, 5]).is_err());
    }

    #[test]
    fn test_faces_parse() {
        let f: Faces = "2,2,3,4,5".parse().unwrap();
        assert_eq!(f.values(), [2, 2, 3, 4, 5]);
        let f: Faces = "6 6 1 2 3".parse().unwrap();
        assert_eq!(f.values(), [6, 6, 1, 2, 3]);
        assert_eq!(
            "1,2,x,4,5".parse::<Faces>(),
            Err(ValidationError::NotANumber("x".into()))
        );
        assert_eq!(
            "1,2,300,4,5".parse::<Faces>(),
            Err(ValidationError::NotANumber("300".into()))
        );
        assert_eq!(
            "1,2,3,4".parse::<Faces>(),
            Err(ValidationError::WrongLength(4))
        );
    }

    #[test]
    fn test_faces_serde_validates() {
        let f: Faces = serde_json::from_str("[1,2,3,4,5]").unwrap();
        assert_eq!(f.sum(), 15);
        assert!(serde_json::from_str::<Faces>("[1,2,3,4,9]").is_err());
    }

    #[test]
    fn test_rng_roller_in_range() {
        let mut roller = RngRoller::new(rand::rngs::StdRng::seed_from_u64(42));
        for _ in 0..100 {
            let out = roller.roll_unheld([false; 5]);
            assert!(out.iter().all(|v| (1..=6).contains(v)));
        }
    }

    #[test]
    fn test_held_dice_survive_reroll() {
        let mut roller = RngRoller::new(rand::rngs::StdRng::seed_from_u64(7));
        let mut ds = DiceSet::from_faces(faces([6, 1, 6, 2, 6]));
        ds.set_held([true, false, true, false, true]);
        for _ in 0..50 {
            ds.roll_unheld(&mut roller).unwrap();
            let v = ds.values();
            assert_eq!((v[0], v[2], v[4]), (6, 6, 6));
        }
    }

    #[test]
    fn test_scripted_roller_ignores_held_positions() {
        let mut roller = ScriptedRoller::new([faces([1, 1, 1, 1, 1])]);
        let mut ds = DiceSet::from_faces(faces([5, 5, 2, 3, 4]));
        ds.set_held([true, true, false, false, false]);
        ds.roll_unheld(&mut roller).unwrap();
        assert_eq!(ds.values(), [5, 5, 1, 1, 1]);
        assert_eq!(roller.remaining(), 0);
        assert_eq!(roller.fallback_rolls(), 0);
    }

    #[test]
    fn test_scripted_roller_counts_fallback_rolls() {
        let mut roller = ScriptedRoller::new([faces([2, 3, 4, 5, 6])]);
        assert_eq!(roller.roll_unheld([false; 5]), [2, 3, 4, 5, 6]);
        assert_eq!(roller.roll_unheld([false; 5]), [1; 5]);
        assert_eq!(roller.roll_unheld([false; 5]), [1; 5]);
        assert_eq!(roller.fallback_rolls(), 2);
    }

    struct BrokenRoller;

    impl DiceRoller for BrokenRoller {
        fn roll_unheld(&mut self, _held: KeepMask) -> [u8; NUM_DICE] {
            [3, 3, 7, 3, 3]
        }
    }

    #[test]
    fn test_bad_roller_output_leaves_dice_unchanged() {
        let mut ds = DiceSet::from_faces(faces([6, 5, 4, 2, 1]));
        ds.set_held([true, false, false, false, false]);
        assert_eq!(
            ds.roll_unheld(&mut BrokenRoller),
            Err(ValidationError::FaceOutOfRange { index: 2, value: 7 })
        );
        assert_eq!(ds.values(), [6, 5, 4, 2, 1]);
        assert_eq!(ds.held(), [true, false, false, false, false]);
    }

    #[test]
    fn test_release_all_and_held_count() {
        let mut ds = DiceSet::new();
        ds.set_held([true, false, true, true, false]);
        assert_eq!(ds.held_count(), 3);
        assert_eq!(ds.held(), [true, false, true, true, false]);
        ds.release_all();
        assert_eq!(ds.held_count(), 0);
    }

    #[test]
    fn test_display_marks_held() {
        let mut ds = DiceSet::from_faces(faces([2, 2, 3, 4, 5]));
        ds.set_held([true, false, true, true, true]);
        assert_eq!(ds.to_string(), "[2] 2 [3] [4] [5]");
    }
}
