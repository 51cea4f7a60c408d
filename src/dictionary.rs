//! Minimal client for the free dictionary + translation APIs.
//!
//! - definitions: dictionaryapi.dev (`/entries/en/{word}`)
//! - translations: MyMemory (`/get?q=..&langpair=from|to`)
//!
//! Calls are instrumented and log status and latency, not payloads.

use std::time::Duration;

use reqwest::header::USER_AGENT;
use serde::{Deserialize, Serialize};
use tracing::{error, info, instrument};

use crate::util::trunc_for_log;

#[derive(Clone)]
pub struct DictionaryClient {
  pub client: reqwest::Client,
  pub dictionary_base_url: String,
  pub translate_base_url: String,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct DictionaryWord {
  pub word: String,
  #[serde(default)]
  pub phonetic: Option<String>,
  #[serde(default)]
  pub meanings: Vec<Meaning>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Meaning {
  #[serde(rename = "partOfSpeech")]
  pub part_of_speech: String,
  #[serde(default)]
  pub definitions: Vec<Definition>,
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Definition {
  pub definition: String,
  #[serde(default)]
  pub example: Option<String>,
  #[serde(default)]
  pub synonyms: Vec<String>,
}

impl DictionaryWord {
  /// First definition of the first meaning, if any.
  pub fn first_definition(&self) -> Option<&str> {
    self.meanings.first()?.definitions.first().map(|d| d.definition.as_str())
  }
}

#[derive(Clone, Debug, Serialize, PartialEq)]
pub struct WordWithTranslation {
  pub word: String,
  pub translation: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub definition: Option<String>,
}

#[derive(Deserialize)]
struct MyMemoryResponse {
  #[serde(rename = "responseData")]
  response_data: MyMemoryData,
}

#[derive(Deserialize)]
struct MyMemoryData {
  #[serde(rename = "translatedText")]
  translated_text: String,
}

impl DictionaryClient {
  /// Build the client unless DICTIONARY_DISABLED is set (offline deployments, tests).
  pub fn from_env() -> Option<Self> {
    if matches!(std::env::var("DICTIONARY_DISABLED").as_deref(), Ok("1") | Ok("true")) {
      return None;
    }
    let dictionary_base_url = std::env::var("DICTIONARY_BASE_URL")
      .unwrap_or_else(|_| "https://api.dictionaryapi.dev/api/v2".into());
    let translate_base_url =
      std::env::var("TRANSLATE_BASE_URL").unwrap_or_else(|_| "https://api.mymemory.translated.net".into());
    Self::new(dictionary_base_url, translate_base_url)
  }

  pub fn new(dictionary_base_url: String, translate_base_url: String) -> Option<Self> {
    let client = reqwest::Client::builder().timeout(Duration::from_secs(10)).build().ok()?;
    Some(Self { client, dictionary_base_url, translate_base_url })
  }

  /// English definition lookup.
  #[instrument(level = "info", skip(self), fields(%word))]
  pub async fn lookup_definition(&self, word: &str) -> Result<DictionaryWord, String> {
    let url = format!("{}/entries/en/{}", self.dictionary_base_url, word.trim().to_lowercase());
    let start = std::time::Instant::now();
    let res = self
      .client
      .get(&url)
      .header(USER_AGENT, "vocab-quiz-backend/0.1")
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("Dictionary HTTP {}: {}", status, trunc_for_log(&body, 200)));
    }

    let mut entries: Vec<DictionaryWord> = res.json().await.map_err(|e| e.to_string())?;
    info!(elapsed = ?start.elapsed(), entries = entries.len(), "Dictionary response received");
    if entries.is_empty() {
      return Err("Word not found".into());
    }
    Ok(entries.swap_remove(0))
  }

  /// Translate `text` between two language codes.
  #[instrument(level = "info", skip(self, text), fields(text_len = text.len(), %from, %to))]
  pub async fn translate(&self, text: &str, from: &str, to: &str) -> Result<String, String> {
    let url = format!("{}/get", self.translate_base_url);
    let langpair = format!("{}|{}", from, to);
    let start = std::time::Instant::now();
    let res = self
      .client
      .get(&url)
      .query(&[("q", text), ("langpair", langpair.as_str())])
      .header(USER_AGENT, "vocab-quiz-backend/0.1")
      .send()
      .await
      .map_err(|e| e.to_string())?;

    if !res.status().is_success() {
      let status = res.status();
      let body = res.text().await.unwrap_or_default();
      return Err(format!("Translate HTTP {}: {}", status, trunc_for_log(&body, 200)));
    }

    let body: MyMemoryResponse = res.json().await.map_err(|e| e.to_string())?;
    info!(elapsed = ?start.elapsed(), "Translation received");
    let text = body.response_data.translated_text.trim().to_string();
    if text.is_empty() { Err("Empty translation".into()) } else { Ok(text) }
  }

  /// Definition and translation fetched concurrently. Without a translation there is
  /// nothing to show, so that failure wins; a missing definition is tolerated.
  #[instrument(level = "info", skip(self), fields(%word, %target))]
  pub async fn lookup_with_translation(&self, word: &str, target: &str) -> Result<WordWithTranslation, String> {
    let (definition, translation) =
      tokio::join!(self.lookup_definition(word), self.translate(word, "en", target));

    let translation = translation.map_err(|e| {
      error!(target: "vocab_backend", error = %e, "Translation failed");
      e
    })?;
    let definition = match definition {
      Ok(d) => d.first_definition().map(str::to_string),
      Err(e) => {
        error!(target: "vocab_backend", error = %e, "Definition lookup failed; continuing without it");
        None
      }
    };
    Ok(WordWithTranslation { word: word.to_string(), translation, definition })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn parses_dictionary_payload() {
    let raw = r#"[{"word":"cat","phonetic":"/kæt/","meanings":[{"partOfSpeech":"noun","definitions":[{"definition":"A small domesticated carnivorous mammal.","synonyms":[]}]}]}]"#;
    let words: Vec<DictionaryWord> = serde_json::from_str(raw).unwrap();
    assert_eq!(words[0].first_definition(), Some("A small domesticated carnivorous mammal."));
  }

  #[test]
  fn parses_translation_payload() {
    let raw = r#"{"responseData":{"translatedText":"gato","match":1},"responseStatus":200}"#;
    let body: MyMemoryResponse = serde_json::from_str(raw).unwrap();
    assert_eq!(body.response_data.translated_text, "gato");
  }

  #[test]
  fn word_without_meanings_has_no_definition() {
    let w = DictionaryWord { word: "x".into(), phonetic: None, meanings: vec![] };
    assert_eq!(w.first_definition(), None);
  }
}
