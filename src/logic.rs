//! Core behaviors shared by both HTTP and WebSocket handlers.
//!
//! This includes:
//!   - Serving today's challenge set for a player
//!   - Starting game sessions (optionally bound to one of today's challenges)
//!   - Evaluating answers and feeding session stats back into challenge progress
//!   - Ending sessions
//!   - Dictionary lookups with a local question-bank fallback

use chrono::NaiveDate;
use thiserror::Error;
use tracing::{debug, error, info, instrument, warn};

use crate::challenges::{completed_count, time_until_reset, total_xp};
use crate::domain::{DailyChallengeSet, GameSessionStats};
use crate::protocol::*;
use crate::session::GameSession;
use crate::state::AppState;
use crate::tracker::{ProgressUpdate, TrackerError};
use crate::util::normalize_player;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0}")]
  BadRequest(String),
  #[error("{0}")]
  NotFound(String),
  #[error("{0}")]
  Conflict(String),
  #[error("{0}")]
  Internal(String),
}

impl From<TrackerError> for ApiError {
  fn from(e: TrackerError) -> Self {
    match e {
      TrackerError::UnknownChallenge(id) => ApiError::NotFound(format!("Unknown challengeId: {}", id)),
      other => {
        error!(target: "challenge", error = %other, "Progress tracking failed");
        ApiError::Internal(other.to_string())
      }
    }
  }
}

// The tracker writes through a blocking store (possibly a file); keep it off the async workers.

async fn tracker_today(state: &AppState, player: &str, date: NaiveDate) -> Result<DailyChallengeSet, ApiError> {
  let tracker = state.tracker.clone();
  let player = player.to_string();
  tokio::task::spawn_blocking(move || tracker.today(&player, date))
    .await
    .map_err(|e| ApiError::Internal(format!("tracker task failed: {}", e)))?
    .map_err(ApiError::from)
}

async fn tracker_record(
  state: &AppState,
  player: String,
  date: NaiveDate,
  challenge_id: String,
  stats: GameSessionStats,
) -> Result<ProgressUpdate, ApiError> {
  let tracker = state.tracker.clone();
  tokio::task::spawn_blocking(move || tracker.record(&player, date, &challenge_id, &stats))
    .await
    .map_err(|e| ApiError::Internal(format!("tracker task failed: {}", e)))?
    .map_err(ApiError::from)
}

#[instrument(level = "info", skip(state))]
pub async fn todays_challenges(state: &AppState, player_id: Option<&str>) -> Result<DailySetOut, ApiError> {
  let player = normalize_player(player_id);
  let now = state.now();
  let set = tracker_today(state, &player, now.date_naive()).await?;
  debug!(target: "challenge", %player, date = %set.date, "Daily set served");
  Ok(DailySetOut {
    date: set.date.format("%Y-%m-%d").to_string(),
    completed_count: completed_count(&set.challenges),
    total_xp: total_xp(&set.challenges),
    resets_in_seconds: time_until_reset(now).num_seconds(),
    streak_day: set.streak_day,
    completed: set.completed,
    challenges: set.challenges,
  })
}

pub fn templates(state: &AppState) -> TemplatesOut {
  TemplatesOut { templates: state.tracker.catalog().templates().to_vec() }
}

pub fn languages(state: &AppState) -> LanguagesOut {
  LanguagesOut {
    languages: state.languages.clone(),
    pairs: state.language_pairs.clone(),
    pairs_with_questions: state.bank.pairs().into_iter().map(str::to_string).collect(),
  }
}

#[instrument(level = "info", skip(state, body), fields(pair = %body.language_pair, challenge = ?body.challenge_id))]
pub async fn start_session(state: &AppState, body: StartSessionIn) -> Result<SessionOut, ApiError> {
  if !state.is_known_pair(&body.language_pair) {
    return Err(ApiError::BadRequest(format!("Unknown language pair: {}", body.language_pair)));
  }
  let player = normalize_player(body.player_id.as_deref());
  let now = state.now();
  let today = now.date_naive();
  state.prune_sessions(now).await;

  let challenge = match &body.challenge_id {
    Some(id) => {
      let set = tracker_today(state, &player, today).await?;
      let found = set.challenges.into_iter().find(|c| &c.id == id);
      Some(found.ok_or_else(|| ApiError::NotFound(format!("Unknown challengeId: {}", id)))?)
    }
    None => None,
  };

  let session = GameSession::start(&state.bank, &player, &body.language_pair, challenge.as_ref(), today, now);
  if session.deck_len() == 0 {
    warn!(target: "vocab_backend", pair = %body.language_pair, "Session started with an empty deck");
  }
  let out = SessionOut {
    session_id: session.id.clone(),
    language_pair: session.language_pair.clone(),
    deck_size: session.deck_len(),
    question: session.current_question(&state.bank).map(question_out),
    time_limit: challenge.as_ref().and_then(|c| c.rule().time_limit()),
    challenge,
  };
  info!(target: "vocab_backend", %player, session = %out.session_id, deck = out.deck_size, "Game session started");
  state.insert_session(session).await;
  Ok(out)
}

#[instrument(level = "info", skip(state))]
pub async fn next_question(state: &AppState, session_id: &str) -> Result<NextQuestionOut, ApiError> {
  let sessions = state.sessions.read().await;
  let session = sessions
    .get(session_id)
    .ok_or_else(|| ApiError::NotFound(format!("Unknown sessionId: {}", session_id)))?;
  Ok(NextQuestionOut {
    session_id: session_id.to_string(),
    question: session.current_question(&state.bank).map(question_out),
  })
}

/// Grade an answer, update the session tally, then re-evaluate the linked challenge.
#[instrument(level = "info", skip(state, body), fields(session = %body.session_id, question = %body.question_id))]
pub async fn submit_answer(state: &AppState, body: AnswerIn) -> Result<AnswerOut, ApiError> {
  let now = state.now();
  let (mut out, linked) = {
    let mut sessions = state.sessions.write().await;
    let session = sessions
      .get_mut(&body.session_id)
      .ok_or_else(|| ApiError::NotFound(format!("Unknown sessionId: {}", body.session_id)))?;

    let outcome = session
      .answer(&state.bank, &body.question_id, &body.option_id, body.time_spent, now)
      .ok_or_else(|| ApiError::Conflict(format!("Question {} is not the current question", body.question_id)))?;

    let out = AnswerOut {
      correct: outcome.correct,
      correct_answer: outcome.question.correct_answer.clone(),
      explanation: outcome.question.explanation.clone().unwrap_or_default(),
      stats: session.stats.clone(),
      challenge: None,
      challenge_completed: false,
      daily_set_completed: false,
      next_question: session.current_question(&state.bank).map(question_out),
    };
    let linked = session.challenge_id.clone().map(|id| (session.player.clone(), session.date, id));
    (out, linked)
  };

  if let Some((player, date, challenge_id)) = linked {
    let update = tracker_record(state, player, date, challenge_id.clone(), out.stats.clone()).await?;
    info!(
      target: "challenge",
      id = %challenge_id,
      progress = update.challenge.progress,
      target_value = update.challenge.target(),
      completed = update.challenge.completed,
      "Challenge progress evaluated"
    );
    out.challenge_completed = update.newly_completed;
    out.daily_set_completed = update.set_completed;
    out.challenge = Some(update.challenge);
  }

  info!(target: "vocab_backend", session = %body.session_id, correct = out.correct, answered = out.stats.questions_answered, "Answer graded");
  Ok(out)
}

#[instrument(level = "info", skip(state))]
pub async fn end_session(state: &AppState, session_id: &str) -> Result<SessionEndedOut, ApiError> {
  let session = state
    .remove_session(session_id)
    .await
    .ok_or_else(|| ApiError::NotFound(format!("Unknown sessionId: {}", session_id)))?;
  info!(target: "vocab_backend", session = %session.id, answered = session.stats.questions_answered, "Game session ended");
  Ok(SessionEndedOut { session_id: session.id, stats: session.stats })
}

/// Word lookup: remote dictionary when enabled, otherwise (or on failure) the local bank.
#[instrument(level = "info", skip(state), fields(%word, %target))]
pub async fn lookup(state: &AppState, word: &str, target: &str) -> LookupOut {
  let word = word.trim();
  if word.is_empty() {
    return LookupOut { word: String::new(), found: false, translation: None, definition: None };
  }
  if let Some(dict) = &state.dictionary {
    match dict.lookup_with_translation(word, target).await {
      Ok(w) => {
        return LookupOut { word: w.word, found: true, translation: Some(w.translation), definition: w.definition };
      }
      Err(e) => warn!(target: "vocab_backend", error = %e, "Dictionary lookup failed; trying local bank"),
    }
  }
  lookup_local(state, word, target)
}

fn lookup_local(state: &AppState, word: &str, target: &str) -> LookupOut {
  let pair = format!("en-{}", target);
  let hit = state.bank.questions_for(&pair).iter().find(|q| q.question.eq_ignore_ascii_case(word));
  LookupOut {
    word: word.to_string(),
    found: hit.is_some(),
    translation: hit.map(|q| q.correct_answer.clone()),
    definition: None,
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::config::AppConfig;
  use crate::state::test_support::{fixed_state, movable_state};
  use chrono::{Duration, TimeZone, Utc};

  fn answer_for(state: &AppState, session_id: &str, question_id: &str, right: bool) -> AnswerIn {
    let q = state.bank.find(question_id).unwrap();
    let opt = q.options.iter().find(|o| o.is_correct == right).unwrap();
    AnswerIn {
      session_id: session_id.into(),
      question_id: question_id.into(),
      option_id: opt.id.clone(),
      time_spent: Some(10),
    }
  }

  #[tokio::test]
  async fn todays_set_is_the_new_year_set() {
    let state = fixed_state(2025, 1, 1, 8);
    let out = todays_challenges(&state, Some("ana")).await.unwrap();
    assert_eq!(out.date, "2025-01-01");
    assert_eq!(out.challenges.len(), 3);
    assert_eq!(out.challenges[0].template.title, "Perfect Start");
    assert_eq!(out.resets_in_seconds, 16 * 3600);
    assert_eq!(out.completed_count, 0);
  }

  #[tokio::test]
  async fn answering_drives_the_linked_challenge() {
    let state = fixed_state(2025, 1, 1, 8);
    let started = start_session(
      &state,
      StartSessionIn {
        player_id: Some("ana".into()),
        language_pair: "en-es".into(),
        challenge_id: Some("daily-2025-01-01-0".into()),
      },
    )
    .await
    .unwrap();
    assert_eq!(started.deck_size, 10);

    let mut qid = started.question.unwrap().id;
    let mut completed_at = None;
    for i in 0..4 {
      let out = submit_answer(&state, answer_for(&state, &started.session_id, &qid, true)).await.unwrap();
      assert!(out.correct);
      if out.challenge_completed {
        completed_at = Some(i);
      }
      qid = out.next_question.unwrap().id;
    }
    // "Perfect Start" needs a streak of 3
    assert_eq!(completed_at, Some(2));
    let set = todays_challenges(&state, Some("ana")).await.unwrap();
    assert_eq!(set.completed_count, 1);
    assert_eq!(set.total_xp, 30);
  }

  #[tokio::test]
  async fn wrong_question_id_is_a_conflict() {
    let state = fixed_state(2025, 1, 1, 8);
    let started = start_session(
      &state,
      StartSessionIn { player_id: None, language_pair: "en-de".into(), challenge_id: None },
    )
    .await
    .unwrap();
    let current = started.question.unwrap().id;
    let other = state.bank.questions_for("en-de").iter().find(|q| q.id != current).unwrap().id.clone();
    let err = submit_answer(&state, answer_for(&state, &started.session_id, &other, true)).await.unwrap_err();
    assert!(matches!(err, ApiError::Conflict(_)));
  }

  #[tokio::test]
  async fn start_rejects_unknown_pair_and_challenge() {
    let state = fixed_state(2025, 1, 1, 8);
    let bad_pair = StartSessionIn { player_id: None, language_pair: "xx-yy".into(), challenge_id: None };
    assert!(matches!(start_session(&state, bad_pair).await, Err(ApiError::BadRequest(_))));
    let bad_challenge =
      StartSessionIn { player_id: None, language_pair: "en-es".into(), challenge_id: Some("daily-2024-12-31-0".into()) };
    assert!(matches!(start_session(&state, bad_challenge).await, Err(ApiError::NotFound(_))));
  }

  #[tokio::test]
  async fn ended_session_is_gone() {
    let state = fixed_state(2025, 1, 1, 8);
    let started = start_session(
      &state,
      StartSessionIn { player_id: None, language_pair: "en-es".into(), challenge_id: None },
    )
    .await
    .unwrap();
    let qid = started.question.unwrap().id;
    submit_answer(&state, answer_for(&state, &started.session_id, &qid, true)).await.unwrap();

    let ended = end_session(&state, &started.session_id).await.unwrap();
    assert_eq!(ended.stats.correct_answers, 1);
    assert!(matches!(next_question(&state, &started.session_id).await, Err(ApiError::NotFound(_))));
    assert!(matches!(end_session(&state, &started.session_id).await, Err(ApiError::NotFound(_))));
  }

  #[tokio::test]
  async fn repeated_starts_do_not_pile_up() {
    let start = Utc.with_ymd_and_hms(2025, 1, 1, 8, 0, 0).unwrap();
    let cfg = AppConfig { max_sessions: 50, ..Default::default() };
    let (state, clock) = movable_state(cfg, start);
    let fresh = || StartSessionIn { player_id: None, language_pair: "en-es".into(), challenge_id: None };

    for _ in 0..500 {
      start_session(&state, fresh()).await.unwrap();
    }
    assert_eq!(state.sessions.read().await.len(), 50);

    // an hour later every one of them has gone idle
    *clock.lock().unwrap() = start + Duration::hours(1);
    start_session(&state, fresh()).await.unwrap();
    assert_eq!(state.sessions.read().await.len(), 1);
  }

  #[tokio::test]
  async fn offline_lookup_uses_the_bank() {
    let state = fixed_state(2025, 1, 1, 8);
    let out = lookup(&state, "cat", "fr").await;
    assert!(out.found);
    assert_eq!(out.translation.as_deref(), Some("Chat"));
    assert!(!lookup(&state, "zebra", "fr").await.found);
  }
}
