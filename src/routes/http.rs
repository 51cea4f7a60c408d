//! HTTP endpoint handlers. These are thin wrappers that forward to core logic.
//! Each handler is instrumented and logs parameters and basic result info.

use std::sync::Arc;
use axum::{extract::{State, Query}, http::StatusCode, Json, response::{IntoResponse, Response}};
use tracing::{info, instrument};

use crate::protocol::*;
use crate::state::AppState;
use crate::logic::{self, ApiError};

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = match &self {
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::Conflict(_) => StatusCode::CONFLICT,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(ErrorOut { error: self.to_string() })).into_response()
  }
}

#[instrument(level = "info")]
pub async fn http_health() -> impl IntoResponse { Json(HealthOut { ok: true }) }

#[instrument(level = "info", skip(state))]
pub async fn http_get_languages(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::languages(&state))
}

#[instrument(level = "info", skip(state))]
pub async fn http_get_templates(State(state): State<Arc<AppState>>) -> impl IntoResponse {
  Json(logic::templates(&state))
}

#[instrument(level = "info", skip(state), fields(player = ?q.player_id))]
pub async fn http_get_today(
  State(state): State<Arc<AppState>>,
  Query(q): Query<PlayerQuery>,
) -> Result<Json<DailySetOut>, ApiError> {
  let out = logic::todays_challenges(&state, q.player_id.as_deref()).await?;
  info!(target: "challenge", date = %out.date, completed = out.completed_count, "HTTP daily set served");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(pair = %body.language_pair))]
pub async fn http_post_start_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<StartSessionIn>,
) -> Result<Json<SessionOut>, ApiError> {
  Ok(Json(logic::start_session(&state, body).await?))
}

#[instrument(level = "info", skip(state), fields(%q.session_id))]
pub async fn http_get_question(
  State(state): State<Arc<AppState>>,
  Query(q): Query<SessionQuery>,
) -> Result<Json<NextQuestionOut>, ApiError> {
  Ok(Json(logic::next_question(&state, &q.session_id).await?))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id, %body.question_id))]
pub async fn http_post_answer(
  State(state): State<Arc<AppState>>,
  Json(body): Json<AnswerIn>,
) -> Result<Json<AnswerOut>, ApiError> {
  let out = logic::submit_answer(&state, body).await?;
  info!(target: "challenge", correct = out.correct, challenge_completed = out.challenge_completed, "HTTP answer evaluated");
  Ok(Json(out))
}

#[instrument(level = "info", skip(state, body), fields(%body.session_id))]
pub async fn http_post_end_session(
  State(state): State<Arc<AppState>>,
  Json(body): Json<SessionQuery>,
) -> Result<Json<SessionEndedOut>, ApiError> {
  Ok(Json(logic::end_session(&state, &body.session_id).await?))
}

#[instrument(level = "info", skip(state), fields(%q.word, %q.target))]
pub async fn http_get_lookup(
  State(state): State<Arc<AppState>>,
  Query(q): Query<LookupQuery>,
) -> impl IntoResponse {
  Json(logic::lookup(&state, &q.word, &q.target).await)
}
