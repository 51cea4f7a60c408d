//! A game session: one player working through a shuffled question deck for a
//! language pair, optionally on behalf of one of today's challenges.

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rand::seq::SliceRandom;
use uuid::Uuid;

use crate::catalog::QuestionBank;
use crate::domain::{Challenge, GameSessionStats, Question};

#[derive(Clone, Debug)]
pub struct GameSession {
  pub id: String,
  pub player: String,
  pub language_pair: String,
  pub challenge_id: Option<String>,
  /// Day the linked challenge belongs to; a session started before midnight
  /// keeps reporting against that day's set.
  pub date: NaiveDate,
  pub stats: GameSessionStats,
  order: Vec<String>,
  cursor: usize,
  pub started_at: DateTime<Utc>,
  /// Start time, then the time of the latest answer.
  pub last_active: DateTime<Utc>,
}

/// Outcome of answering the current question.
#[derive(Clone, Debug)]
pub struct AnswerOutcome {
  pub correct: bool,
  pub question: Question,
}

impl GameSession {
  /// Build a session deck. Category challenges only draw from their category.
  pub fn start(
    bank: &QuestionBank,
    player: &str,
    language_pair: &str,
    challenge: Option<&Challenge>,
    date: NaiveDate,
    now: DateTime<Utc>,
  ) -> Self {
    let mut order: Vec<String> = match challenge.and_then(|c| c.rule().category()) {
      Some(cat) => bank.questions_for_category(language_pair, cat).into_iter().map(|q| q.id.clone()).collect(),
      None => bank.questions_for(language_pair).iter().map(|q| q.id.clone()).collect(),
    };
    order.shuffle(&mut rand::thread_rng());

    Self {
      id: Uuid::new_v4().to_string(),
      player: player.to_string(),
      language_pair: language_pair.to_string(),
      challenge_id: challenge.map(|c| c.id.clone()),
      date,
      stats: GameSessionStats::for_pair(language_pair),
      order,
      cursor: 0,
      started_at: now,
      last_active: now,
    }
  }

  pub fn deck_len(&self) -> usize {
    self.order.len()
  }

  pub fn current_question_id(&self) -> Option<&str> {
    self.order.get(self.cursor).map(String::as_str)
  }

  pub fn current_question<'a>(&self, bank: &'a QuestionBank) -> Option<&'a Question> {
    self.current_question_id().and_then(|id| bank.find(id))
  }

  /// Move to the next question, wrapping around the deck.
  pub fn advance(&mut self) {
    if !self.order.is_empty() {
      self.cursor = (self.cursor + 1) % self.order.len();
    }
  }

  /// Seconds since the session began, never negative.
  pub fn elapsed_secs(&self, now: DateTime<Utc>) -> u32 {
    (now - self.started_at).num_seconds().clamp(0, u32::MAX as i64) as u32
  }

  pub fn idle_for(&self, now: DateTime<Utc>) -> Duration {
    now - self.last_active
  }

  /// Answer the current question and step to the next one. `elapsed` overrides the
  /// server-measured time (the client's countdown is authoritative when it has one).
  /// Returns None when the deck is empty or `question_id` is not the current question.
  pub fn answer(
    &mut self,
    bank: &QuestionBank,
    question_id: &str,
    option_id: &str,
    elapsed: Option<u32>,
    now: DateTime<Utc>,
  ) -> Option<AnswerOutcome> {
    if self.current_question_id() != Some(question_id) {
      return None;
    }
    let question = bank.find(question_id)?.clone();
    let correct = question.is_correct_option(option_id);
    self.stats.record_answer(correct, &question.category, &self.language_pair);
    let secs = elapsed.unwrap_or_else(|| self.elapsed_secs(now));
    self.stats.record_time(secs);
    self.last_active = now;
    self.advance();
    Some(AnswerOutcome { correct, question })
  }
}
