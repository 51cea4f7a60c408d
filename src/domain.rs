//! Domain models: challenge templates and stamped challenges, session stats,
//! languages and the multiple-choice question bank.

use std::collections::BTreeSet;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Which template pool a challenge is drawn from.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
  Easy,
  Medium,
  Hard,
}

impl Difficulty {
  pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

  pub fn as_str(&self) -> &'static str {
    match self {
      Difficulty::Easy => "easy",
      Difficulty::Medium => "medium",
      Difficulty::Hard => "hard",
    }
  }
}

/// Completion rule of a challenge. Variant-specific parameters live on the variant,
/// so a speed challenge always has a time limit and a category challenge a category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum ChallengeRule {
  /// Correct answers count only while the attempt stays within `time_limit` seconds.
  Speed {
    #[serde(rename = "timeLimit")]
    time_limit: u32,
  },
  /// Current run of consecutive correct answers.
  Streak,
  /// Correct answers, once the session has touched `category`.
  Category { category: String },
  /// Correct answers while the whole session is error-free.
  Accuracy,
  /// Questions answered, right or wrong.
  Volume,
  /// Distinct language pairs played.
  MultiLanguage {
    #[serde(rename = "languagePairs")]
    language_pairs: Vec<String>,
  },
  /// Anything we do not recognise (e.g. a newer config). Never makes progress.
  #[serde(other)]
  Unknown,
}

impl ChallengeRule {
  pub fn kind(&self) -> &'static str {
    match self {
      ChallengeRule::Speed { .. } => "speed",
      ChallengeRule::Streak => "streak",
      ChallengeRule::Category { .. } => "category",
      ChallengeRule::Accuracy => "accuracy",
      ChallengeRule::Volume => "volume",
      ChallengeRule::MultiLanguage { .. } => "multi-language",
      ChallengeRule::Unknown => "unknown",
    }
  }

  pub fn time_limit(&self) -> Option<u32> {
    match self {
      ChallengeRule::Speed { time_limit } => Some(*time_limit),
      _ => None,
    }
  }

  pub fn category(&self) -> Option<&str> {
    match self {
      ChallengeRule::Category { category } => Some(category),
      _ => None,
    }
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Reward {
  pub xp: u32,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub badge: Option<String>,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub title: Option<String>,
}

/// Immutable blueprint a day's challenge is stamped from.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChallengeTemplate {
  pub title: String,
  pub description: String,
  #[serde(flatten)]
  pub rule: ChallengeRule,
  pub difficulty: Difficulty,
  pub target: u32,
  pub reward: Reward,
  #[serde(default)]
  pub icon: String,
  #[serde(default)]
  pub color: String,
}

/// A daily task stamped from a template.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Challenge {
  pub id: String,
  #[serde(flatten)]
  pub template: ChallengeTemplate,
  pub progress: u32,
  /// Latched: once set it stays set, even when a later evaluation drops
  /// `progress` back below the target (an accuracy miss resets it to 0).
  pub completed: bool,
  #[serde(rename = "expiresAt")]
  pub expires_at: DateTime<Utc>,
}

impl Challenge {
  pub fn target(&self) -> u32 {
    self.template.target
  }

  pub fn rule(&self) -> &ChallengeRule {
    &self.template.rule
  }

  /// Store an evaluated progress value: clamp to the target and latch `completed`.
  /// Returns true when this call completed the challenge.
  pub fn apply_progress(&mut self, value: u32) -> bool {
    let was_completed = self.completed;
    self.progress = value.min(self.template.target);
    if self.progress >= self.template.target {
      self.completed = true;
    }
    self.completed && !was_completed
  }
}

/// Three challenges for one calendar day plus the player's daily streak.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyChallengeSet {
  pub date: NaiveDate,
  pub challenges: Vec<Challenge>,
  #[serde(rename = "streakDay")]
  pub streak_day: u32,
  pub completed: bool,
}

/// Running tally of one game session. Owned by the session, never by the engine.
#[derive(Clone, Debug, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct GameSessionStats {
  #[serde(rename = "questionsAnswered")]
  pub questions_answered: u32,
  #[serde(rename = "correctAnswers")]
  pub correct_answers: u32,
  #[serde(rename = "currentStreak")]
  pub current_streak: u32,
  #[serde(rename = "longestStreak", default)]
  pub longest_streak: u32,
  #[serde(rename = "timeSpent")]
  pub time_spent: u32,
  #[serde(rename = "categoriesPlayed", default)]
  pub categories_played: BTreeSet<String>,
  #[serde(rename = "languagePairsPlayed", default)]
  pub language_pairs_played: BTreeSet<String>,
}

impl GameSessionStats {
  /// Stats for a session that starts on `language_pair`.
  pub fn for_pair(language_pair: &str) -> Self {
    let mut s = Self::default();
    s.language_pairs_played.insert(language_pair.to_string());
    s
  }

  pub fn record_answer(&mut self, correct: bool, category: &str, language_pair: &str) {
    self.questions_answered += 1;
    if correct {
      self.correct_answers += 1;
      self.current_streak += 1;
    } else {
      self.current_streak = 0;
    }
    self.longest_streak = self.longest_streak.max(self.current_streak);
    if !self.categories_played.contains(category) {
      self.categories_played.insert(category.to_string());
    }
    if !self.language_pairs_played.contains(language_pair) {
      self.language_pairs_played.insert(language_pair.to_string());
    }
  }

  pub fn record_time(&mut self, seconds: u32) {
    self.time_spent = seconds;
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Language {
  pub code: String,
  pub name: String,
  #[serde(rename = "nativeName")]
  pub native_name: String,
  pub flag: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LanguagePair {
  pub id: String,
  pub from: String,
  pub to: String,
  pub name: String,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
  Translate,
  Meaning,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum QuestionLevel {
  Beginner,
  Intermediate,
  Advanced,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct AnswerOption {
  pub id: String,
  pub text: String,
  #[serde(rename = "isCorrect")]
  pub is_correct: bool,
}

/// One multiple-choice vocabulary question.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Question {
  pub id: String,
  pub question: String,
  pub options: Vec<AnswerOption>,
  #[serde(rename = "correctAnswer")]
  pub correct_answer: String,
  #[serde(default)]
  pub explanation: Option<String>,
  #[serde(rename = "type")]
  pub kind: QuestionKind,
  #[serde(rename = "difficulty")]
  pub level: QuestionLevel,
  pub category: String,
}

impl Question {
  pub fn is_correct_option(&self, option_id: &str) -> bool {
    self.options.iter().any(|o| o.id == option_id && o.is_correct)
  }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct VocabularySet {
  #[serde(rename = "languagePairId")]
  pub language_pair_id: String,
  pub questions: Vec<Question>,
}
