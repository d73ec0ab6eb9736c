//! Built-in content: the embedded question bank, the fixed datasets of the
//! four mini-games, and the illustrative teacher dashboard rows.

use crate::games::bridge::{BridgeChallenge, Material};
use crate::games::matching::{MatchSet, PairItem};
use crate::games::sequencing::{SequenceCategory, SequenceItem};

/// Question bank shipped with the binary. Parsed once at startup.
pub const BUILTIN_QUESTION_BANK: &str = include_str!("../content/questions.toml");

// ---------------------------------------------------------------------------
// Matching game datasets (one per level)
// ---------------------------------------------------------------------------

const ELEMENTS: &[PairItem] = &[
  PairItem { id: 1, left: "H", right: "Hydrogen" },
  PairItem { id: 2, left: "He", right: "Helium" },
  PairItem { id: 3, left: "O", right: "Oxygen" },
  PairItem { id: 4, left: "C", right: "Carbon" },
  PairItem { id: 5, left: "N", right: "Nitrogen" },
  PairItem { id: 6, left: "Ca", right: "Calcium" },
  PairItem { id: 7, left: "Fe", right: "Iron" },
  PairItem { id: 8, left: "Au", right: "Gold" },
];

const BODY_PARTS: &[PairItem] = &[
  PairItem { id: 1, left: "Heart", right: "Pumps blood" },
  PairItem { id: 2, left: "Lungs", right: "Help us breathe" },
  PairItem { id: 3, left: "Brain", right: "Controls thinking" },
  PairItem { id: 4, left: "Stomach", right: "Digests food" },
  PairItem { id: 5, left: "Eyes", right: "Help us see" },
  PairItem { id: 6, left: "Ears", right: "Help us hear" },
];

const PLANETS: &[PairItem] = &[
  PairItem { id: 1, left: "Mercury", right: "Closest to Sun" },
  PairItem { id: 2, left: "Venus", right: "Hottest planet" },
  PairItem { id: 3, left: "Earth", right: "Our home planet" },
  PairItem { id: 4, left: "Mars", right: "The red planet" },
  PairItem { id: 5, left: "Jupiter", right: "Largest planet" },
  PairItem { id: 6, left: "Saturn", right: "Has beautiful rings" },
];

pub const MATCH_SETS: [MatchSet; 3] = [
  MatchSet { key: "elements", left_side: "symbol", right_side: "name", base: 4, items: ELEMENTS },
  MatchSet { key: "body_parts", left_side: "organ", right_side: "function", base: 3, items: BODY_PARTS },
  MatchSet { key: "planets", left_side: "planet", right_side: "fact", base: 3, items: PLANETS },
];

// ---------------------------------------------------------------------------
// Sequencing game categories (one per level)
// ---------------------------------------------------------------------------

const COMPUTER_BUILD: &[SequenceItem] = &[
  SequenceItem { id: 1, label: "Power Supply", detail: "Provides electricity", order: Some(1) },
  SequenceItem { id: 2, label: "Motherboard", detail: "Connects all parts", order: Some(2) },
  SequenceItem { id: 3, label: "CPU", detail: "Processes information", order: Some(3) },
  SequenceItem { id: 4, label: "RAM", detail: "Stores temporary data", order: Some(4) },
  SequenceItem { id: 5, label: "Storage", detail: "Saves files permanently", order: Some(5) },
  SequenceItem { id: 6, label: "Graphics Card", detail: "Renders images", order: Some(6) },
];

const CODING_STEPS: &[SequenceItem] = &[
  SequenceItem { id: 1, label: "Input", detail: "Get data from user", order: Some(1) },
  SequenceItem { id: 2, label: "Process", detail: "Perform calculations", order: Some(2) },
  SequenceItem { id: 3, label: "Store", detail: "Save the result", order: Some(3) },
  SequenceItem { id: 4, label: "Output", detail: "Show result to user", order: Some(4) },
];

const DEVICES: &[SequenceItem] = &[
  SequenceItem { id: 1, label: "Smartphone", detail: "Communication", order: None },
  SequenceItem { id: 2, label: "Laptop", detail: "Computing", order: None },
  SequenceItem { id: 3, label: "Tablet", detail: "Media & Reading", order: None },
  SequenceItem { id: 4, label: "Smart Watch", detail: "Health Tracking", order: None },
  SequenceItem { id: 5, label: "Router", detail: "Internet Connection", order: None },
  SequenceItem { id: 6, label: "Printer", detail: "Document Printing", order: None },
];

pub const SEQUENCE_CATEGORIES: [SequenceCategory; 3] = [
  SequenceCategory { key: "computer_build", ordered: true, base: 3, items: COMPUTER_BUILD },
  SequenceCategory { key: "coding_steps", ordered: true, base: 4, items: CODING_STEPS },
  SequenceCategory { key: "device_match", ordered: false, base: 4, items: DEVICES },
];

// ---------------------------------------------------------------------------
// Bridge game
// ---------------------------------------------------------------------------

pub const MATERIALS: [Material; 6] = [
  Material { name: "Wood", strength: 3, cost: 2, weight: 2 },
  Material { name: "Steel", strength: 5, cost: 4, weight: 5 },
  Material { name: "Concrete", strength: 4, cost: 3, weight: 4 },
  Material { name: "Cable", strength: 4, cost: 5, weight: 1 },
  Material { name: "Bamboo", strength: 2, cost: 1, weight: 1 },
  Material { name: "Carbon Fiber", strength: 5, cost: 6, weight: 1 },
];

pub const BRIDGE_CHALLENGES: [BridgeChallenge; 3] = [
  BridgeChallenge { name: "Small Creek Bridge", distance: 10, weight: 50, budget: 100, description: "Build a bridge to cross a small creek" },
  BridgeChallenge { name: "River Bridge", distance: 25, weight: 100, budget: 200, description: "Build a stronger bridge for heavier traffic" },
  BridgeChallenge { name: "Canyon Bridge", distance: 50, weight: 200, budget: 300, description: "Build a massive bridge across a deep canyon" },
];

// ---------------------------------------------------------------------------
// Teacher dashboard (illustrative rows, not derived from submitted results)
// ---------------------------------------------------------------------------

#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct ClassRow {
  pub id: u32,
  pub name: &'static str,
  pub subject: &'static str,
  pub grade: &'static str,
  pub students: u32,
  pub avg_score: u32,
}

#[derive(Clone, Copy, Debug, serde::Serialize)]
pub struct StudentRow {
  pub name: &'static str,
  pub class: &'static str,
  pub subject: &'static str,
  pub score: u32,
  pub status: &'static str,
}

pub const CLASS_ROWS: [ClassRow; 4] = [
  ClassRow { id: 1, name: "Advanced Mathematics", subject: "Mathematics", grade: "Grade 10", students: 28, avg_score: 87 },
  ClassRow { id: 2, name: "Basic Science", subject: "Science", grade: "Grade 8", students: 32, avg_score: 91 },
  ClassRow { id: 3, name: "Computer Fundamentals", subject: "Technology", grade: "Grade 9", students: 25, avg_score: 83 },
  ClassRow { id: 4, name: "Engineering Basics", subject: "Engineering", grade: "Grade 11", students: 22, avg_score: 89 },
];

pub const STUDENT_ROWS: [StudentRow; 5] = [
  StudentRow { name: "Arjun Patel", class: "Grade 10", subject: "Mathematics", score: 95, status: "Completed" },
  StudentRow { name: "Priya Sharma", class: "Grade 8", subject: "Science", score: 92, status: "Completed" },
  StudentRow { name: "Ravi Kumar", class: "Grade 9", subject: "Technology", score: 88, status: "In Progress" },
  StudentRow { name: "Sneha Singh", class: "Grade 11", subject: "Engineering", score: 94, status: "Completed" },
  StudentRow { name: "Vikram Rao", class: "Grade 10", subject: "Mathematics", score: 85, status: "Pending" },
];
