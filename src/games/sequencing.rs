//! Sequencing game: move items from an available pool into a sequence until it
//! matches the target order (or, for unordered categories, until the pool is empty).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{level_size, Feedback, GameError, LEVEL_COUNT};
use crate::domain::Language;
use crate::i18n::messages;
use crate::seeds::SEQUENCE_CATEGORIES;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct SequenceItem {
  pub id: u32,
  pub label: &'static str,
  pub detail: &'static str,
  #[serde(skip)]
  pub order: Option<u32>,
}

#[derive(Clone, Copy, Debug)]
pub struct SequenceCategory {
  pub key: &'static str,
  /// Ordered categories check each position; unordered ones only need every item placed.
  pub ordered: bool,
  pub base: usize,
  pub items: &'static [SequenceItem],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SequencePhase {
  Arranging,
  Complete,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SequenceAction {
  Place { item: u32 },
  Remove { position: usize },
  Check,
  Restart,
}

#[derive(Clone, Debug, Serialize)]
pub struct SequencingGame {
  pub score: u32,
  pub level: u32,
  pub category: &'static str,
  pub ordered: bool,
  pub available: Vec<SequenceItem>,
  pub sequence: Vec<SequenceItem>,
  pub phase: SequencePhase,
  #[serde(skip)]
  target: Vec<SequenceItem>,
  #[serde(skip)]
  lang: Language,
}

impl SequencingGame {
  pub fn new(lang: Language, rng: &mut impl Rng) -> Self {
    let mut g = Self {
      score: 0,
      level: 1,
      category: "",
      ordered: true,
      available: Vec::new(),
      sequence: Vec::new(),
      phase: SequencePhase::Arranging,
      target: Vec::new(),
      lang,
    };
    g.load_level(rng);
    g
  }

  fn load_level(&mut self, rng: &mut impl Rng) {
    let idx = (self.level.saturating_sub(1) as usize).min(SEQUENCE_CATEGORIES.len() - 1);
    let cat = &SEQUENCE_CATEGORIES[idx];
    let n = level_size(cat.base, self.level, cat.items.len());
    self.category = cat.key;
    self.ordered = cat.ordered;
    self.target = cat.items[..n].to_vec();
    self.target.sort_by_key(|it| it.order);
    self.available = self.target.clone();
    self.available.shuffle(rng);
    self.sequence.clear();
  }

  pub fn is_complete(&self) -> bool {
    self.phase == SequencePhase::Complete
  }

  fn is_solved(&self) -> bool {
    if self.sequence.len() != self.target.len() {
      return false;
    }
    if !self.ordered {
      return self.available.is_empty();
    }
    self.sequence.iter().zip(&self.target).all(|(a, b)| a.order == b.order)
  }

  pub fn apply(&mut self, action: SequenceAction, rng: &mut impl Rng) -> Result<Option<Feedback>, GameError> {
    if self.is_complete() && !matches!(action, SequenceAction::Restart) {
      return Err(GameError::Finished);
    }
    match action {
      SequenceAction::Restart => {
        *self = Self::new(self.lang, rng);
        Ok(None)
      }
      SequenceAction::Place { item } => {
        let pos = self.available.iter().position(|it| it.id == item).ok_or(GameError::ItemNotAvailable(item))?;
        let it = self.available.remove(pos);
        self.sequence.push(it);
        Ok(None)
      }
      SequenceAction::Remove { position } => {
        if position >= self.sequence.len() {
          return Err(GameError::NoSuchPosition(position));
        }
        let it = self.sequence.remove(position);
        self.available.push(it);
        Ok(None)
      }
      SequenceAction::Check => {
        let t = messages(self.lang);
        if !self.is_solved() {
          return Ok(Some(Feedback::miss(t.wrong.to_string())));
        }
        let points = self.level * 20;
        self.score += points;
        let mut feedback = Feedback::hit(points, format!("{} +{} {}", t.correct, points, t.points_earned));
        debug!(target: "game", level = self.level, score = self.score, category = self.category, "Sequence solved");
        if self.level < LEVEL_COUNT {
          self.level += 1;
          self.load_level(rng);
          feedback.level_up = true;
          feedback.text = format!("{} {}", feedback.text, t.new_level);
        } else {
          self.phase = SequencePhase::Complete;
          feedback = feedback.finish(t.well_done);
        }
        Ok(Some(feedback))
      }
    }
  }
}
