//! Mini-game state machines.
//!
//! Every game follows the same shape: a struct owning score/level plus a
//! tagged-union `phase`, and a single `apply` transition taking one action.
//! Randomness (problem generation, shuffles) is injected by the caller.

use serde::{Deserialize, Serialize};

pub mod arithmetic;
pub mod bridge;
pub mod matching;
pub mod sequencing;

/// Number of levels after which the level-based games complete.
pub const LEVEL_COUNT: u32 = 3;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameKind {
  Arithmetic,
  Matching,
  Sequencing,
  Bridge,
}

impl GameKind {
  pub fn key(self) -> &'static str {
    match self {
      GameKind::Arithmetic => "arithmetic",
      GameKind::Matching => "matching",
      GameKind::Sequencing => "sequencing",
      GameKind::Bridge => "bridge",
    }
  }

  pub const ALL: [GameKind; 4] = [GameKind::Arithmetic, GameKind::Matching, GameKind::Sequencing, GameKind::Bridge];
}

/// Result of one scoring action, rendered for the player.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Feedback {
  pub correct: bool,
  pub points: u32,
  pub text: String,
  /// Set when the action finished a level and a new one was unlocked.
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub level_up: bool,
  /// Set when the action moved the game into its end state.
  #[serde(skip_serializing_if = "std::ops::Not::not")]
  pub finished: bool,
}

impl Feedback {
  pub fn hit(points: u32, text: String) -> Self {
    Self { correct: true, points, text, level_up: false, finished: false }
  }

  pub fn miss(text: String) -> Self {
    Self { correct: false, points: 0, text, level_up: false, finished: false }
  }

  /// Non-scoring end-of-game message (e.g. the drill running out of time).
  pub fn closing(text: String) -> Self {
    Self { correct: false, points: 0, text, level_up: false, finished: true }
  }

  /// Append the end-of-game line to the feedback of the final scoring action.
  pub fn finish(mut self, closing: &str) -> Self {
    self.text = format!("{} {}", self.text, closing);
    self.finished = true;
    self
  }
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GameError {
  #[error("the game is over; restart to play again")]
  Finished,
  #[error("an answer is required")]
  EmptyAnswer,
  #[error("no card at position {0}")]
  UnknownCard(usize),
  #[error("that pair is already matched")]
  AlreadyMatched,
  #[error("item {0} is not in the available pool")]
  ItemNotAvailable(u32),
  #[error("no item at sequence position {0}")]
  NoSuchPosition(usize),
  #[error("unknown material {0:?}")]
  UnknownMaterial(String),
  #[error("no {0:?} in the current design")]
  MaterialNotSelected(String),
}

/// `slice_len` shared by the level-sized datasets: `min(base + level, available)`.
pub(crate) fn level_size(base: usize, level: u32, available: usize) -> usize {
  (base + level as usize).min(available)
}
