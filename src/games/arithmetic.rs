//! Arithmetic drill: timed, streak-based scoring over grade-keyed problems.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{Feedback, GameError};
use crate::config::DrillSettings;
use crate::domain::{Grade, Language};
use crate::i18n::{messages, DRILL_ANSWER_WAS};
use crate::util::fill_template;

/// Consecutive correct answers needed for each level step.
const STREAK_PER_LEVEL: u32 = 5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
  #[serde(rename = "+")] Add,
  #[serde(rename = "-")] Sub,
  #[serde(rename = "×")] Mul,
  #[serde(rename = "÷")] Div,
}

/// Operand range and operator set; both widen monotonically with grade.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GradeSettings {
  pub range: i64,
  pub ops: &'static [Operator],
}

const ADD: &[Operator] = &[Operator::Add];
const ADD_SUB: &[Operator] = &[Operator::Add, Operator::Sub];
const ADD_SUB_MUL: &[Operator] = &[Operator::Add, Operator::Sub, Operator::Mul];
const ALL_OPS: &[Operator] = &[Operator::Add, Operator::Sub, Operator::Mul, Operator::Div];

pub fn grade_settings(grade: Grade) -> GradeSettings {
  match grade.number() {
    0..=6 => GradeSettings { range: 10, ops: ADD },
    7 => GradeSettings { range: 20, ops: ADD_SUB },
    8 => GradeSettings { range: 50, ops: ADD_SUB_MUL },
    9 => GradeSettings { range: 100, ops: ALL_OPS },
    10 => GradeSettings { range: 200, ops: ALL_OPS },
    11 => GradeSettings { range: 500, ops: ALL_OPS },
    _ => GradeSettings { range: 1000, ops: ALL_OPS },
  }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Problem {
  pub lhs: i64,
  pub op: Operator,
  pub rhs: i64,
  #[serde(skip)]
  pub answer: i64,
}

impl Problem {
  pub fn generate(settings: GradeSettings, rng: &mut impl Rng) -> Self {
    let op = settings.ops.choose(rng).copied().unwrap_or(Operator::Add);
    let range = settings.range.max(1);
    // × and ÷ keep operands small regardless of the grade range.
    let small = (range / 5).clamp(1, 12);
    match op {
      Operator::Add => {
        let (a, b) = (rng.gen_range(1..=range), rng.gen_range(1..=range));
        Problem { lhs: a, op, rhs: b, answer: a + b }
      }
      Operator::Sub => {
        let a = rng.gen_range(1..=range);
        let b = rng.gen_range(1..=a);
        Problem { lhs: a, op, rhs: b, answer: a - b }
      }
      Operator::Mul => {
        let (a, b) = (rng.gen_range(1..=small), rng.gen_range(1..=small));
        Problem { lhs: a, op, rhs: b, answer: a * b }
      }
      Operator::Div => {
        let (b, q) = (rng.gen_range(1..=small), rng.gen_range(1..=small));
        Problem { lhs: b * q, op, rhs: b, answer: q }
      }
    }
  }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DrillPhase {
  Playing { problem: Problem, time_left: u32 },
  Over { high_score: bool, message: String },
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DrillAction {
  Answer { value: String },
  Tick { seconds: u32 },
  Restart,
}

#[derive(Clone, Debug, Serialize)]
pub struct ArithmeticDrill {
  pub grade: Grade,
  pub score: u32,
  pub level: u32,
  pub streak: u32,
  pub phase: DrillPhase,
  #[serde(skip)]
  lang: Language,
  #[serde(skip)]
  settings: DrillSettings,
}

impl ArithmeticDrill {
  pub fn new(grade: Grade, lang: Language, settings: DrillSettings, rng: &mut impl Rng) -> Self {
    let problem = Problem::generate(grade_settings(grade), rng);
    Self {
      grade,
      score: 0,
      level: 1,
      streak: 0,
      phase: DrillPhase::Playing { problem, time_left: settings.duration_secs },
      lang,
      settings,
    }
  }

  pub fn is_over(&self) -> bool {
    matches!(self.phase, DrillPhase::Over { .. })
  }

  pub fn apply(&mut self, action: DrillAction, rng: &mut impl Rng) -> Result<Option<Feedback>, GameError> {
    match action {
      DrillAction::Restart => {
        *self = Self::new(self.grade, self.lang, self.settings, rng);
        Ok(None)
      }
      DrillAction::Tick { seconds } => {
        let DrillPhase::Playing { time_left, .. } = &mut self.phase else {
          return Ok(None);
        };
        *time_left = time_left.saturating_sub(seconds);
        if *time_left > 0 {
          return Ok(None);
        }
        let t = messages(self.lang);
        let high_score = self.score > self.settings.high_score;
        let message = if high_score { format!("{} {}", t.game_over, t.new_high_score) } else { t.game_over.to_string() };
        debug!(target: "game", score = self.score, level = self.level, high_score, "Drill time is up");
        self.phase = DrillPhase::Over { high_score, message: message.clone() };
        Ok(Some(Feedback::closing(message)))
      }
      DrillAction::Answer { value } => {
        let problem = match &self.phase {
          DrillPhase::Playing { problem, .. } => *problem,
          DrillPhase::Over { .. } => return Err(GameError::Finished),
        };
        let value = value.trim();
        if value.is_empty() {
          return Err(GameError::EmptyAnswer);
        }
        let t = messages(self.lang);
        let feedback = if value.parse::<i64>().ok() == Some(problem.answer) {
          let points = self.level * 10 + self.streak * 5;
          self.score += points;
          self.streak += 1;
          if self.streak % STREAK_PER_LEVEL == 0 {
            self.level += 1;
          }
          Feedback::hit(points, format!("{} +{} {}", t.correct, points, t.points_earned))
        } else {
          self.streak = 0;
          let answer = problem.answer.to_string();
          Feedback::miss(format!("{} {}", t.wrong, fill_template(DRILL_ANSWER_WAS, &[("answer", &answer)])))
        };
        if let DrillPhase::Playing { problem, .. } = &mut self.phase {
          *problem = Problem::generate(grade_settings(self.grade), rng);
        }
        Ok(Some(feedback))
      }
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use rand::rngs::StdRng;
  use rand::SeedableRng;

  fn drill(grade: u8) -> (ArithmeticDrill, StdRng) {
    let mut rng = StdRng::seed_from_u64(7);
    let d = ArithmeticDrill::new(Grade::new(grade).unwrap(), Language::En, DrillSettings::default(), &mut rng);
    (d, rng)
  }

  fn current(d: &ArithmeticDrill) -> Problem {
    match d.phase {
      DrillPhase::Playing { problem, .. } => problem,
      DrillPhase::Over { .. } => panic!("drill is over"),
    }
  }

  fn answer_right(d: &mut ArithmeticDrill, rng: &mut StdRng) -> Feedback {
    let v = current(d).answer.to_string();
    d.apply(DrillAction::Answer { value: v }, rng).unwrap().unwrap()
  }

  fn answer_wrong(d: &mut ArithmeticDrill, rng: &mut StdRng) -> Feedback {
    let v = (current(d).answer + 1).to_string();
    d.apply(DrillAction::Answer { value: v }, rng).unwrap().unwrap()
  }

  #[test]
  fn grade_six_is_addition_up_to_ten() {
    let s = grade_settings(Grade::new(6).unwrap());
    assert_eq!(s.ops, &[Operator::Add]);
    assert_eq!(s.range, 10);
    let mut rng = StdRng::seed_from_u64(1);
    for _ in 0..200 {
      let p = Problem::generate(s, &mut rng);
      assert_eq!(p.op, Operator::Add);
      assert!((1..=10).contains(&p.lhs) && (1..=10).contains(&p.rhs));
      assert_eq!(p.answer, p.lhs + p.rhs);
    }
  }

  #[test]
  fn settings_widen_with_grade() {
    let mut prev = grade_settings(Grade::new(6).unwrap());
    for g in Grade::all().skip(1) {
      let s = grade_settings(g);
      assert!(s.range >= prev.range);
      assert!(s.ops.len() >= prev.ops.len());
      prev = s;
    }
  }

  #[test]
  fn generated_problems_are_well_formed_for_upper_grades() {
    let mut rng = StdRng::seed_from_u64(99);
    let s = grade_settings(Grade::new(12).unwrap());
    for _ in 0..500 {
      let p = Problem::generate(s, &mut rng);
      match p.op {
        Operator::Sub => assert!(p.answer >= 0),
        Operator::Div => {
          assert_eq!(p.lhs % p.rhs, 0);
          assert!(p.rhs <= 12 && p.answer <= 12);
        }
        Operator::Mul => assert!(p.lhs <= 12 && p.rhs <= 12),
        Operator::Add => assert!(p.lhs <= 1000),
      }
    }
  }

  #[test]
  fn correct_answer_awards_level_and_streak_points() {
    let (mut d, mut rng) = drill(6);
    let f = answer_right(&mut d, &mut rng);
    assert!(f.correct);
    assert_eq!(f.points, 10);
    assert!(f.text.starts_with("Correct!"));
    let f = answer_right(&mut d, &mut rng);
    assert_eq!(f.points, 15);
    assert_eq!(d.score, 25);
    assert_eq!(d.streak, 2);
  }

  #[test]
  fn wrong_answer_resets_streak_and_reveals_answer() {
    let (mut d, mut rng) = drill(7);
    answer_right(&mut d, &mut rng);
    answer_right(&mut d, &mut rng);
    let expected = current(&d).answer;
    let f = answer_wrong(&mut d, &mut rng);
    assert!(!f.correct);
    assert_eq!(d.streak, 0);
    assert_eq!(f.text, format!("Wrong! Answer: {expected}"));
    let f = d.apply(DrillAction::Answer { value: "seven".into() }, &mut rng).unwrap().unwrap();
    assert!(!f.correct);
  }

  #[test]
  fn level_rises_once_per_five_in_a_row() {
    let (mut d, mut rng) = drill(9);
    for _ in 0..4 {
      answer_right(&mut d, &mut rng);
    }
    assert_eq!(d.level, 1);
    answer_right(&mut d, &mut rng);
    assert_eq!(d.level, 2);
    for _ in 0..4 {
      answer_right(&mut d, &mut rng);
    }
    assert_eq!(d.level, 2);
    answer_right(&mut d, &mut rng);
    assert_eq!(d.level, 3);
    answer_wrong(&mut d, &mut rng);
    for _ in 0..4 {
      answer_right(&mut d, &mut rng);
    }
    assert_eq!(d.level, 3);
  }

  #[test]
  fn empty_answer_is_rejected_without_touching_state() {
    let (mut d, mut rng) = drill(8);
    let before = current(&d);
    assert_eq!(d.apply(DrillAction::Answer { value: "  ".into() }, &mut rng), Err(GameError::EmptyAnswer));
    assert_eq!(current(&d), before);
  }

  #[test]
  fn countdown_ends_the_drill() {
    let (mut d, mut rng) = drill(10);
    assert!(d.apply(DrillAction::Tick { seconds: 59 }, &mut rng).unwrap().is_none());
    assert!(!d.is_over());
    let f = d.apply(DrillAction::Tick { seconds: 5 }, &mut rng).unwrap().unwrap();
    assert!(f.finished && !f.correct);
    assert_eq!(f.text, "Game Over!");
    assert!(d.is_over());
    assert!(matches!(&d.phase, DrillPhase::Over { high_score: false, .. }));
    assert!(d.apply(DrillAction::Tick { seconds: 1 }, &mut rng).unwrap().is_none());
    assert_eq!(d.apply(DrillAction::Answer { value: "1".into() }, &mut rng), Err(GameError::Finished));
    d.apply(DrillAction::Restart, &mut rng).unwrap();
    assert!(!d.is_over());
    assert_eq!((d.score, d.level, d.streak), (0, 1, 0));
  }

  #[test]
  fn beating_the_high_score_raises_the_flag() {
    let mut rng = StdRng::seed_from_u64(5);
    let settings = DrillSettings { duration_secs: 10, high_score: 20 };
    let mut d = ArithmeticDrill::new(Grade::new(6).unwrap(), Language::Hi, settings, &mut rng);
    answer_right(&mut d, &mut rng);
    answer_right(&mut d, &mut rng);
    assert_eq!(d.score, 25);
    let f = d.apply(DrillAction::Tick { seconds: 10 }, &mut rng).unwrap().unwrap();
    assert_eq!(f.text, "खेल समाप्त! नया उच्च स्कोर!");
    match &d.phase {
      DrillPhase::Over { high_score, message } => {
        assert!(*high_score);
        assert_eq!(message, &f.text);
      }
      other => panic!("unexpected {other:?}"),
    }
  }

  #[test]
  fn localized_feedback() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut d = ArithmeticDrill::new(Grade::new(6).unwrap(), Language::Hi, DrillSettings::default(), &mut rng);
    let f = answer_right(&mut d, &mut rng);
    assert!(f.text.starts_with("सही!"));
  }
}
