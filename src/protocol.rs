//! Public protocol structs for WebSocket and HTTP endpoints (serde ready).
//! Keep this small and stable to evolve backend and frontend independently.

use serde::{Deserialize, Serialize};

use crate::domain::{Challenge, ChallengeTemplate, GameSessionStats, Language, LanguagePair, Question};

/// Messages the client can send over WebSocket.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientWsMessage {
    Ping,
    TodaysChallenges {
        #[serde(rename = "playerId", default)]
        player_id: Option<String>,
    },
    StartSession {
        #[serde(flatten)]
        body: StartSessionIn,
    },
    NextQuestion {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    SubmitAnswer {
        #[serde(flatten)]
        body: AnswerIn,
    },
    EndSession {
        #[serde(rename = "sessionId")]
        session_id: String,
    },
    Lookup {
        word: String,
        target: String,
    },
}

/// Messages the server sends back over WebSocket.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerWsMessage {
    Pong,
    Challenges {
        #[serde(flatten)]
        set: DailySetOut,
    },
    SessionStarted {
        #[serde(flatten)]
        session: SessionOut,
    },
    Question {
        #[serde(flatten)]
        question: NextQuestionOut,
    },
    AnswerResult {
        #[serde(flatten)]
        result: AnswerOut,
    },
    SessionEnded {
        #[serde(flatten)]
        ended: SessionEndedOut,
    },
    Lookup {
        #[serde(flatten)]
        result: LookupOut,
    },
    Error {
        message: String,
    },
}

/// Question as shown to the player: options without the correctness flag.
#[derive(Debug, Serialize)]
pub struct QuestionOut {
    pub id: String,
    pub question: String,
    pub category: String,
    pub options: Vec<OptionOut>,
}

#[derive(Debug, Serialize)]
pub struct OptionOut {
    pub id: String,
    pub text: String,
}

/// Convert a bank `Question` (internal) to the public DTO.
pub fn question_out(q: &Question) -> QuestionOut {
    QuestionOut {
        id: q.id.clone(),
        question: q.question.clone(),
        category: q.category.clone(),
        options: q.options.iter().map(|o| OptionOut { id: o.id.clone(), text: o.text.clone() }).collect(),
    }
}

//
// HTTP request/response DTOs
//

#[derive(Debug, Deserialize)]
pub struct PlayerQuery {
    #[serde(rename = "playerId", default)]
    pub player_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DailySetOut {
    pub date: String,
    pub challenges: Vec<Challenge>,
    #[serde(rename = "streakDay")]
    pub streak_day: u32,
    pub completed: bool,
    #[serde(rename = "completedCount")]
    pub completed_count: usize,
    #[serde(rename = "totalXp")]
    pub total_xp: u32,
    #[serde(rename = "resetsInSeconds")]
    pub resets_in_seconds: i64,
}

#[derive(Debug, Serialize)]
pub struct TemplatesOut {
    pub templates: Vec<ChallengeTemplate>,
}

#[derive(Debug, Deserialize)]
pub struct StartSessionIn {
    #[serde(rename = "playerId", default)]
    pub player_id: Option<String>,
    #[serde(rename = "languagePair")]
    pub language_pair: String,
    #[serde(rename = "challengeId", default)]
    pub challenge_id: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct SessionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "languagePair")]
    pub language_pair: String,
    pub challenge: Option<Challenge>,
    /// Countdown length for speed challenges.
    #[serde(rename = "timeLimit")]
    pub time_limit: Option<u32>,
    #[serde(rename = "deckSize")]
    pub deck_size: usize,
    pub question: Option<QuestionOut>,
}

#[derive(Debug, Deserialize)]
pub struct SessionQuery {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Serialize)]
pub struct NextQuestionOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub question: Option<QuestionOut>,
}

#[derive(Debug, Deserialize)]
pub struct AnswerIn {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    #[serde(rename = "questionId")]
    pub question_id: String,
    #[serde(rename = "optionId")]
    pub option_id: String,
    /// Seconds the client's countdown has consumed, if it runs one.
    #[serde(rename = "timeSpent", default)]
    pub time_spent: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct AnswerOut {
    pub correct: bool,
    #[serde(rename = "correctAnswer")]
    pub correct_answer: String,
    pub explanation: String,
    pub stats: GameSessionStats,
    pub challenge: Option<Challenge>,
    #[serde(rename = "challengeCompleted")]
    pub challenge_completed: bool,
    #[serde(rename = "dailySetCompleted")]
    pub daily_set_completed: bool,
    #[serde(rename = "nextQuestion")]
    pub next_question: Option<QuestionOut>,
}

/// Final tally of a session closed by the client.
#[derive(Debug, Serialize)]
pub struct SessionEndedOut {
    #[serde(rename = "sessionId")]
    pub session_id: String,
    pub stats: GameSessionStats,
}

#[derive(Debug, Deserialize)]
pub struct LookupQuery {
    pub word: String,
    #[serde(default = "default_target")]
    pub target: String,
}

fn default_target() -> String {
    "es".into()
}

#[derive(Debug, Serialize)]
pub struct LookupOut {
    pub word: String,
    pub found: bool,
    pub translation: Option<String>,
    pub definition: Option<String>,
}

#[derive(Serialize)]
pub struct LanguagesOut {
    pub languages: Vec<Language>,
    pub pairs: Vec<LanguagePair>,
    #[serde(rename = "pairsWithQuestions")]
    pub pairs_with_questions: Vec<String>,
}

#[derive(Serialize)]
pub struct ErrorOut {
    pub error: String,
}

#[derive(Serialize)]
pub struct HealthOut {
    pub ok: bool,
}
