//! Bridge building: pick material quantities so the bridge is strong enough for
//! the span and load while staying within budget.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Feedback, GameError, LEVEL_COUNT};
use crate::domain::Language;
use crate::i18n::{messages, BRIDGE_EFFICIENCY, BRIDGE_OVER_BUDGET, BRIDGE_TOO_WEAK};
use crate::seeds::{BRIDGE_CHALLENGES, MATERIALS};
use crate::util::{div_ceil, fill_template, round_percent};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Material {
  pub name: &'static str,
  pub strength: u32,
  pub cost: u32,
  pub weight: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BridgeChallenge {
  pub name: &'static str,
  pub distance: u32,
  pub weight: u32,
  pub budget: u32,
  pub description: &'static str,
}

impl BridgeChallenge {
  /// `distance*2 + weight/10`, kept in tenths so fractional loads stay exact.
  fn required_tenths(&self) -> u32 {
    self.distance * 20 + self.weight
  }

  pub fn required_strength(&self) -> u32 {
    div_ceil(self.required_tenths(), 10)
  }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Totals {
  pub strength: u32,
  pub cost: u32,
  pub weight: u32,
}

#[derive(Clone, Debug, Serialize)]
pub struct Selection {
  pub material: &'static str,
  pub quantity: u32,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "constraint", rename_all = "snake_case")]
pub enum Violation {
  TooWeak { required: u32, actual: u32 },
  OverBudget { cost: u32, budget: u32 },
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Verdict {
  Success { efficiency: u32, points: u32 },
  Failure { violations: Vec<Violation> },
}

/// Succeeds iff `strength >= distance*2 + weight/10` and `cost <= budget`.
/// Every violated constraint is reported.
pub fn evaluate(challenge: &BridgeChallenge, totals: Totals, level: u32) -> Verdict {
  let mut violations = Vec::new();
  if totals.strength * 10 < challenge.required_tenths() {
    violations.push(Violation::TooWeak { required: challenge.required_strength(), actual: totals.strength });
  }
  if totals.cost > challenge.budget {
    violations.push(Violation::OverBudget { cost: totals.cost, budget: challenge.budget });
  }
  if !violations.is_empty() {
    return Verdict::Failure { violations };
  }
  let efficiency = round_percent(challenge.budget - totals.cost, challenge.budget);
  Verdict::Success { efficiency, points: level * 50 + efficiency }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum BridgePhase {
  Design,
  Testing { verdict: Verdict },
  Complete,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BridgeAction {
  AddMaterial { material: String },
  RemoveMaterial { material: String },
  ResetBridge,
  Test,
  Restart,
}

#[derive(Clone, Debug, Serialize)]
pub struct BridgeGame {
  pub score: u32,
  pub level: u32,
  pub challenge: BridgeChallenge,
  pub selected: Vec<Selection>,
  pub totals: Totals,
  pub phase: BridgePhase,
  #[serde(skip)]
  lang: Language,
}

fn material(name: &str) -> Option<&'static Material> {
  MATERIALS.iter().find(|m| m.name.eq_ignore_ascii_case(name.trim()))
}

fn challenge_for(level: u32) -> BridgeChallenge {
  let idx = (level.saturating_sub(1) as usize).min(BRIDGE_CHALLENGES.len() - 1);
  BRIDGE_CHALLENGES[idx]
}

impl BridgeGame {
  pub fn new(lang: Language) -> Self {
    Self {
      score: 0,
      level: 1,
      challenge: challenge_for(1),
      selected: Vec::new(),
      totals: Totals::default(),
      phase: BridgePhase::Design,
      lang,
    }
  }

  pub fn is_complete(&self) -> bool {
    matches!(self.phase, BridgePhase::Complete)
  }

  fn recompute(&mut self) {
    let mut t = Totals::default();
    for s in &self.selected {
      if let Some(m) = material(s.material) {
        t.strength += m.strength * s.quantity;
        t.cost += m.cost * s.quantity;
        t.weight += m.weight * s.quantity;
      }
    }
    self.totals = t;
  }

  fn reset_design(&mut self) {
    self.selected.clear();
    self.totals = Totals::default();
    self.phase = BridgePhase::Design;
  }

  // The bridge game draws nothing at random; the parameter keeps the games uniform.
  pub fn apply(&mut self, action: BridgeAction, _rng: &mut impl Rng) -> Result<Option<Feedback>, GameError> {
    if self.is_complete() && !matches!(action, BridgeAction::Restart) {
      return Err(GameError::Finished);
    }
    match action {
      BridgeAction::Restart => {
        *self = Self::new(self.lang);
        Ok(None)
      }
      BridgeAction::ResetBridge => {
        self.reset_design();
        Ok(None)
      }
      BridgeAction::AddMaterial { material: name } => {
        let m = material(&name).ok_or(GameError::UnknownMaterial(name))?;
        match self.selected.iter_mut().find(|s| s.material == m.name) {
          Some(s) => s.quantity += 1,
          None => self.selected.push(Selection { material: m.name, quantity: 1 }),
        }
        self.recompute();
        self.phase = BridgePhase::Design;
        Ok(None)
      }
      BridgeAction::RemoveMaterial { material: name } => {
        let m = material(&name).ok_or_else(|| GameError::UnknownMaterial(name.clone()))?;
        let pos = self.selected.iter().position(|s| s.material == m.name).ok_or(GameError::MaterialNotSelected(name))?;
        self.selected[pos].quantity -= 1;
        if self.selected[pos].quantity == 0 {
          self.selected.remove(pos);
        }
        self.recompute();
        self.phase = BridgePhase::Design;
        Ok(None)
      }
      BridgeAction::Test => Ok(Some(self.test())),
    }
  }

  fn test(&mut self) -> Feedback {
    let t = messages(self.lang);
    let verdict = evaluate(&self.challenge, self.totals, self.level);
    debug!(target: "game", level = self.level, challenge = self.challenge.name, totals = ?self.totals, ?verdict, "Bridge tested");
    match verdict {
      Verdict::Success { efficiency, points } => {
        self.score += points;
        let eff = fill_template(BRIDGE_EFFICIENCY, &[("efficiency", &efficiency.to_string())]);
        let mut feedback = Feedback::hit(points, format!("{} {} +{} {}", t.correct, eff, points, t.points_earned));
        if self.level < LEVEL_COUNT {
          self.level += 1;
          self.challenge = challenge_for(self.level);
          self.reset_design();
          feedback.level_up = true;
          feedback.text = format!("{} {}", feedback.text, t.new_level);
        } else {
          self.phase = BridgePhase::Complete;
          feedback = feedback.finish(t.well_done);
        }
        feedback
      }
      Verdict::Failure { violations } => {
        let details: Vec<String> = violations
          .iter()
          .map(|v| match v {
            Violation::TooWeak { required, .. } => fill_template(BRIDGE_TOO_WEAK, &[("required", &required.to_string())]),
            Violation::OverBudget { cost, budget } => {
              fill_template(BRIDGE_OVER_BUDGET, &[("cost", &cost.to_string()), ("budget", &budget.to_string())])
            }
          })
          .collect();
        let feedback = Feedback::miss(format!("{} {}", t.wrong, details.join(" ")));
        self.phase = BridgePhase::Testing { verdict: Verdict::Failure { violations } };
        feedback
      }
    }
  }
}
