//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{info, error, instrument, debug};

use crate::protocol::{ClientWsMessage, ServerWsMessage};
use crate::logic::{self, ApiError};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "vocab_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "vocab_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let out = reply_json(&txt, &state).await;
        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "vocab_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "vocab_backend", "WebSocket disconnected");
}

/// Parse, dispatch, serialize response.
async fn reply_json(txt: &str, state: &AppState) -> String {
  let reply_msg = match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "vocab_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  };

  serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
    serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
  })
}

fn ws_error(e: ApiError) -> ServerWsMessage {
  ServerWsMessage::Error { message: e.to_string() }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::TodaysChallenges { player_id } => {
      match logic::todays_challenges(state, player_id.as_deref()).await {
        Ok(set) => {
          info!(target: "challenge", date = %set.date, "WS daily set served");
          ServerWsMessage::Challenges { set }
        }
        Err(e) => ws_error(e),
      }
    }

    ClientWsMessage::StartSession { body } => match logic::start_session(state, body).await {
      Ok(session) => ServerWsMessage::SessionStarted { session },
      Err(e) => ws_error(e),
    },

    ClientWsMessage::NextQuestion { session_id } => match logic::next_question(state, &session_id).await {
      Ok(question) => ServerWsMessage::Question { question },
      Err(e) => ws_error(e),
    },

    ClientWsMessage::SubmitAnswer { body } => match logic::submit_answer(state, body).await {
      Ok(result) => {
        info!(target: "challenge", correct = result.correct, "WS submit_answer evaluated");
        ServerWsMessage::AnswerResult { result }
      }
      Err(e) => ws_error(e),
    },

    ClientWsMessage::EndSession { session_id } => match logic::end_session(state, &session_id).await {
      Ok(ended) => ServerWsMessage::SessionEnded { ended },
      Err(e) => ws_error(e),
    },

    ClientWsMessage::Lookup { word, target } => ServerWsMessage::Lookup {
      result: logic::lookup(state, &word, &target).await,
    },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::state::test_support::fixed_state;
  use serde_json::Value;

  #[tokio::test]
  async fn ws_flow_over_json() {
    let state = fixed_state(2025, 1, 1, 12);

    let pong: Value = serde_json::from_str(&reply_json(r#"{"type":"ping"}"#, &state).await).unwrap();
    assert_eq!(pong["type"], "pong");

    let set: Value =
      serde_json::from_str(&reply_json(r#"{"type":"todays_challenges","playerId":"ana"}"#, &state).await).unwrap();
    assert_eq!(set["type"], "challenges");
    assert_eq!(set["challenges"][2]["title"], "Marathon");
    assert_eq!(set["challenges"][2]["type"], "volume");

    let started: Value = serde_json::from_str(
      &reply_json(r#"{"type":"start_session","playerId":"ana","languagePair":"en-fr","challengeId":"daily-2025-01-01-2"}"#, &state)
        .await,
    )
    .unwrap();
    assert_eq!(started["type"], "session_started");
    let sid = started["sessionId"].as_str().unwrap().to_string();
    let qid = started["question"]["id"].as_str().unwrap().to_string();

    let msg = serde_json::json!({ "type": "submit_answer", "sessionId": sid, "questionId": qid, "optionId": "zz" });
    let res: Value = serde_json::from_str(&reply_json(&msg.to_string(), &state).await).unwrap();
    assert_eq!(res["type"], "answer_result");
    assert_eq!(res["correct"], false);
    // Marathon is volume-based, so a wrong answer still counts
    assert_eq!(res["challenge"]["progress"], 1);

    let msg = serde_json::json!({ "type": "end_session", "sessionId": sid });
    let ended: Value = serde_json::from_str(&reply_json(&msg.to_string(), &state).await).unwrap();
    assert_eq!(ended["type"], "session_ended");
    assert_eq!(ended["stats"]["questionsAnswered"], 1);
  }

  #[tokio::test]
  async fn bad_json_is_reported() {
    let state = fixed_state(2025, 1, 1, 12);
    let err: Value = serde_json::from_str(&reply_json("{nope", &state).await).unwrap();
    assert_eq!(err["type"], "error");
    let unknown: Value =
      serde_json::from_str(&reply_json(r#"{"type":"next_question","sessionId":"missing"}"#, &state).await).unwrap();
    assert_eq!(unknown["type"], "error");
  }
}
