//! Matching game: pair cards that share an identifier but show different sides
//! (symbol vs name, organ vs function, planet vs fact).

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{level_size, Feedback, GameError, LEVEL_COUNT};
use crate::domain::Language;
use crate::i18n::messages;
use crate::seeds::MATCH_SETS;

#[derive(Clone, Copy, Debug)]
pub struct PairItem {
  pub id: u32,
  pub left: &'static str,
  pub right: &'static str,
}

/// One dataset; `base + level` items are dealt (capped by the dataset size).
#[derive(Clone, Copy, Debug)]
pub struct MatchSet {
  pub key: &'static str,
  pub left_side: &'static str,
  pub right_side: &'static str,
  pub base: usize,
  pub items: &'static [PairItem],
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
  Left,
  Right,
}

#[derive(Clone, Debug, Serialize)]
pub struct Card {
  pub pair_id: u32,
  pub side: Side,
  /// Side name for display ("symbol", "name", ...).
  pub kind: &'static str,
  pub label: &'static str,
  pub matched: bool,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum MatchPhase {
  Choosing { selected: Option<usize> },
  Complete,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum MatchAction {
  Pick { card: usize },
  Restart,
}

#[derive(Clone, Debug, Serialize)]
pub struct MatchingGame {
  pub score: u32,
  pub level: u32,
  pub dataset: &'static str,
  pub cards: Vec<Card>,
  pub phase: MatchPhase,
  #[serde(skip)]
  lang: Language,
}

fn deal(level: u32, rng: &mut impl Rng) -> (&'static str, Vec<Card>) {
  let idx = (level.saturating_sub(1) as usize).min(MATCH_SETS.len() - 1);
  let set = &MATCH_SETS[idx];
  let n = level_size(set.base, level, set.items.len());
  let mut cards: Vec<Card> = set.items[..n]
    .iter()
    .flat_map(|it| {
      [
        Card { pair_id: it.id, side: Side::Left, kind: set.left_side, label: it.left, matched: false },
        Card { pair_id: it.id, side: Side::Right, kind: set.right_side, label: it.right, matched: false },
      ]
    })
    .collect();
  cards.shuffle(rng);
  (set.key, cards)
}

impl MatchingGame {
  pub fn new(lang: Language, rng: &mut impl Rng) -> Self {
    let (dataset, cards) = deal(1, rng);
    Self { score: 0, level: 1, dataset, cards, phase: MatchPhase::Choosing { selected: None }, lang }
  }

  pub fn is_complete(&self) -> bool {
    matches!(self.phase, MatchPhase::Complete)
  }

  pub fn apply(&mut self, action: MatchAction, rng: &mut impl Rng) -> Result<Option<Feedback>, GameError> {
    let card = match action {
      MatchAction::Restart => {
        *self = Self::new(self.lang, rng);
        return Ok(None);
      }
      MatchAction::Pick { card } => card,
    };
    let selected = match self.phase {
      MatchPhase::Complete => return Err(GameError::Finished),
      MatchPhase::Choosing { selected } => selected,
    };
    let picked = self.cards.get(card).ok_or(GameError::UnknownCard(card))?;
    if picked.matched {
      return Err(GameError::AlreadyMatched);
    }

    let Some(first) = selected else {
      self.phase = MatchPhase::Choosing { selected: Some(card) };
      return Ok(None);
    };
    self.phase = MatchPhase::Choosing { selected: None };

    let t = messages(self.lang);
    let a = &self.cards[first];
    let b = &self.cards[card];
    if a.pair_id != b.pair_id || a.side == b.side {
      return Ok(Some(Feedback::miss(t.wrong.to_string())));
    }

    self.cards[first].matched = true;
    self.cards[card].matched = true;
    let points = self.level * 10;
    self.score += points;
    let mut feedback = Feedback::hit(points, format!("{} +{} {}", t.correct, points, t.points_earned));

    if self.cards.iter().all(|c| c.matched) {
      debug!(target: "game", level = self.level, score = self.score, dataset = self.dataset, "Matching board cleared");
      if self.level < LEVEL_COUNT {
        self.level += 1;
        let (dataset, cards) = deal(self.level, rng);
        self.dataset = dataset;
        self.cards = cards;
        feedback.level_up = true;
        feedback.text = format!("{} {}", feedback.text, t.new_level);
      } else {
        self.phase = MatchPhase::Complete;
        feedback = feedback.finish(t.well_done);
      }
    }
    Ok(Some(feedback))
  }
}
