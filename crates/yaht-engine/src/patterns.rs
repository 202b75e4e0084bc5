//! Shape queries over a roll: face counts, runs of consecutive faces and
//! Large Straight draws. Shared by scoring, the keep heuristics and the
//! category selector so every rule reads the dice the same way.

use serde::{Deserialize, Serialize};

use crate::dice::{Faces, KeepMask, MAX_FACE, NUM_DICE};

/// Number of dice showing each face; index 0 unused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceCounts([u8; 7]);

/// A run of distinct consecutive faces, `start..start + len`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
    pub start: u8,
    pub len: u8,
}

impl Run {
    pub fn contains(&self, face: u8) -> bool {
        face >= self.start && face < self.start + self.len
    }
}

impl FaceCounts {
    pub fn of(dice: &Faces) -> Self {
        let mut counts = [0u8; 7];
        for d in dice.iter() {
            counts[d as usize] += 1;
        }
        Self(counts)
    }

    pub fn get(&self, face: u8) -> u8 {
        self.0.get(face as usize).copied().unwrap_or(0)
    }

    pub fn has(&self, face: u8) -> bool {
        self.get(face) > 0
    }

    pub fn has_all(&self, faces: &[u8]) -> bool {
        faces.iter().all(|&f| self.has(f))
    }

    pub fn has_n_of_a_kind(&self, n: u8) -> bool {
        self.max_count() >= n
    }

    pub fn max_count(&self) -> u8 {
        self.0[1..].iter().copied().max().unwrap_or(0)
    }

    /// Most frequent face; ties go to the higher face.
    pub fn modal_face(&self) -> u8 {
        (1..=MAX_FACE)
            .max_by_key(|&f| (self.get(f), f))
            .unwrap_or(MAX_FACE)
    }

    /// First face showing at least `n` times.
    pub fn face_with_at_least(&self, n: u8) -> Option<u8> {
        (1..=MAX_FACE).find(|&f| self.get(f) >= n)
    }

    /// Faces showing exactly twice.
    pub fn pair_count(&self) -> usize {
        (1..=MAX_FACE).filter(|&f| self.get(f) == 2).count()
    }

    /// Two pairs, or a triple alongside a pair.
    pub fn has_full_house_draw(&self) -> bool {
        let pairs = self.pair_count();
        pairs >= 2 || (self.face_with_at_least(3).is_some() && pairs >= 1)
    }

    /// Longest run of consecutive faces present. Equal-length runs resolve to
    /// the lowest one.
    pub fn longest_run(&self) -> Run {
        let mut best = Run { start: 0, len: 0 };
        let mut current = Run { start: 0, len: 0 };
        for f in 1..=MAX_FACE {
            if self.has(f) {
                if current.len == 0 {
                    current.start = f;
                }
                current.len += 1;
                if current.len > best.len {
                    best = current;
                }
            } else {
                current.len = 0;
            }
        }
        best
    }

    /// Faces of the Large Straight window starting at `start` that are absent.
    pub fn missing_in_window(&self, start: u8) -> Vec<u8> {
        (start..start + 5).filter(|&f| !self.has(f)).collect()
    }
}

/// How near-Large-Straight anchors are recognised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnchorMode {
    /// Only rolls holding 2-3-4-5 or 1-3-4-5 count as anchors, whatever the
    /// fifth die shows.
    #[default]
    Literal,
    /// Any roll exactly one face short of 1-2-3-4-5 or 2-3-4-5-6.
    Generalized,
}

/// A roll one die away from a Large Straight: keep one die of each face in
/// `keep`, reroll the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StraightDraw {
    pub keep: Vec<u8>,
}

impl StraightDraw {
    pub fn keep_mask(&self, dice: &Faces) -> KeepMask {
        keep_one_each(dice, |f| self.keep.contains(&f))
    }
}

/// Detects a single-substitution Large Straight draw. A completed Large
/// Straight is not a draw.
pub fn straight_draw(counts: &FaceCounts, mode: AnchorMode) -> Option<StraightDraw> {
    if counts.longest_run().len == 5 {
        return None;
    }
    match mode {
        AnchorMode::Literal => {
            let anchor = if counts.has_all(&[2, 3, 4, 5]) {
                2
            } else if counts.has_all(&[1, 3, 4, 5]) {
                1
            } else {
                return None;
            };
            Some(StraightDraw {
                keep: vec![anchor, 3, 4, 5],
            })
        }
        AnchorMode::Generalized => {
            let candidates: Vec<(u8, Vec<u8>)> = [1u8, 2]
                .into_iter()
                .filter(|&start| counts.missing_in_window(start).len() == 1)
                .map(|start| {
                    let present = (start..start + 5).filter(|&f| counts.has(f)).collect();
                    (start, present)
                })
                .collect();
            // Prefer the window whose kept faces already form a Small Straight,
            // then the higher window.
            candidates
                .into_iter()
                .max_by_key(|(start, present): &(u8, Vec<u8>)| {
                    let contiguous = present.windows(2).all(|w| w[1] == w[0] + 1);
                    (contiguous, *start)
                })
                .map(|(_, keep)| StraightDraw { keep })
        }
    }
}

/// Keeps every die showing `face`.
pub fn keep_matching(dice: &Faces, face: u8) -> KeepMask {
    let mut keep = [false; NUM_DICE];
    for (k, d) in keep.iter_mut().zip(dice.iter()) {
        *k = d == face;
    }
    keep
}

/// Keeps the first die of each face accepted by `wanted`.
pub fn keep_one_each(dice: &Faces, wanted: impl Fn(u8) -> bool) -> KeepMask {
    let mut keep = [false; NUM_DICE];
    let mut seen = [false; 7];
    for (k, d) in keep.iter_mut().zip(dice.iter()) {
        if wanted(d) && !seen[d as usize] {
            *k = true;
            seen[d as usize] = true;
        }
    }
    keep
}

pub fn kept_count(keep: &KeepMask) -> usize {
    keep.iter().filter(|&&k| k).count()
}
