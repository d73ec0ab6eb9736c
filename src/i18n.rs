//! Localized feedback strings emitted by the quiz, the mini-games and the
//! account flows. Tables are static; lookups never fail (unknown codes are
//! already mapped to English by `Language::parse_or_default`).

use crate::domain::Language;

pub struct Messages {
  pub correct: &'static str,
  pub wrong: &'static str,
  pub incorrect: &'static str,
  pub points_earned: &'static str,
  pub new_level: &'static str,
  pub game_over: &'static str,
  pub well_done: &'static str,
  pub quiz_complete: &'static str,
  pub new_high_score: &'static str,
  pub no_questions: &'static str,
  pub no_questions_desc: &'static str,
  pub required_fields: &'static str,
  pub grade_required: &'static str,
  pub login_error: &'static str,
}

const EN: Messages = Messages {
  correct: "Correct!",
  wrong: "Wrong!",
  incorrect: "Incorrect",
  points_earned: "points earned!",
  new_level: "New Level Unlocked!",
  game_over: "Game Over!",
  well_done: "Well Done!",
  quiz_complete: "Quiz Complete!",
  new_high_score: "New High Score!",
  no_questions: "No Questions Found",
  no_questions_desc: "No quiz questions are available for this subject and grade.",
  required_fields: "Please fill in all required fields",
  grade_required: "Grade selection is required for students",
  login_error: "Invalid email or password",
};

const HI: Messages = Messages {
  correct: "सही!",
  wrong: "गलत!",
  incorrect: "गलत",
  points_earned: "अंक अर्जित!",
  new_level: "नया स्तर खुला!",
  game_over: "खेल समाप्त!",
  well_done: "बहुत अच्छा!",
  quiz_complete: "क्विज पूर्ण!",
  new_high_score: "नया उच्च स्कोर!",
  no_questions: "कोई प्रश्न नहीं मिला",
  no_questions_desc: "इस विषय और कक्षा के लिए कोई प्रश्न उपलब्ध नहीं हैं।",
  required_fields: "कृपया सभी आवश्यक फ़ील्ड भरें",
  grade_required: "छात्रों के लिए कक्षा चयन आवश्यक है",
  login_error: "अमान्य ईमेल या पासवर्ड",
};

const OD: Messages = Messages {
  correct: "ସଠିକ୍!",
  wrong: "ଭୁଲ!",
  incorrect: "ଭୁଲ",
  points_earned: "ପଏଣ୍ଟ ଅର୍ଜନ!",
  new_level: "ନୂତନ ସ୍ତର ଖୋଲିଗଲା!",
  game_over: "ଖେଳ ସମାପ୍ତ!",
  well_done: "ବହୁତ ଭଲ!",
  quiz_complete: "କୁଇଜ୍ ସମ୍ପୂର୍ଣ୍ଣ!",
  new_high_score: "ନୂତନ ଉଚ୍ଚ ସ୍କୋର!",
  no_questions: "କୌଣସି ପ୍ରଶ୍ନ ମିଳିଲା ନାହିଁ",
  no_questions_desc: "ଏହି ବିଷୟ ଏବଂ ଶ୍ରେଣୀ ପାଇଁ କୌଣସି ପ୍ରଶ୍ନ ଉପଲବ୍ଧ ନାହିଁ।",
  required_fields: "ଦୟାକରି ସମସ୍ତ ଆବଶ୍ୟକ ଫିଲ୍ଡ ପୂରଣ କରନ୍ତୁ",
  grade_required: "ଛାତ୍ରମାନଙ୍କ ପାଇଁ ଶ୍ରେଣୀ ବାଛିବା ଆବଶ୍ୟକ",
  login_error: "ଅବୈଧ ଇମେଲ କିମ୍ବା ପାସୱାର୍ଡ",
};

pub fn messages(lang: Language) -> &'static Messages {
  match lang {
    Language::En => &EN,
    Language::Hi => &HI,
    Language::Od => &OD,
  }
}

// Constraint details of the bridge game are English-only in every language.
pub const BRIDGE_TOO_WEAK: &str = "Bridge too weak! Need {required} strength.";
pub const BRIDGE_OVER_BUDGET: &str = "Over budget! Cost: {cost}, Budget: {budget}";
pub const BRIDGE_EFFICIENCY: &str = "Efficiency: {efficiency}%";
pub const DRILL_ANSWER_WAS: &str = "Answer: {answer}";
