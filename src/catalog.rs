//! Validated, read-only content stores: the challenge template catalog and the
//! question bank indexed by language pair.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{info, warn};

use crate::domain::{ChallengeTemplate, Difficulty, Question, VocabularySet};
use crate::seeds::seed_templates;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
  #[error("template catalog has no {0} templates")]
  EmptyPool(&'static str),
}

/// Template catalog with at least one template per difficulty tier.
#[derive(Clone, Debug)]
pub struct Catalog {
  templates: Vec<ChallengeTemplate>,
}

impl Catalog {
  pub fn new(templates: Vec<ChallengeTemplate>) -> Result<Self, CatalogError> {
    for d in Difficulty::ALL {
      if !templates.iter().any(|t| t.difficulty == d) {
        return Err(CatalogError::EmptyPool(d.as_str()));
      }
    }
    Ok(Self { templates })
  }

  /// The built-in catalog; it covers every tier.
  pub fn builtin() -> Self {
    Self { templates: seed_templates() }
  }

  pub fn templates(&self) -> &[ChallengeTemplate] {
    &self.templates
  }

  pub fn len(&self) -> usize {
    self.templates.len()
  }

  /// Templates of one tier, in catalog order.
  pub fn pool(&self, difficulty: Difficulty) -> Vec<&ChallengeTemplate> {
    self.templates.iter().filter(|t| t.difficulty == difficulty).collect()
  }
}

/// Multiple-choice questions grouped by language pair id.
#[derive(Clone, Debug, Default)]
pub struct QuestionBank {
  by_pair: HashMap<String, Vec<Question>>,
}

impl QuestionBank {
  pub fn new(sets: Vec<VocabularySet>) -> Self {
    let mut bank = Self::default();
    for set in sets {
      bank.extend(set);
    }
    bank
  }

  /// Append a vocabulary set. Questions whose id already exists in the pair are skipped.
  pub fn extend(&mut self, set: VocabularySet) {
    let pair = set.language_pair_id.clone();
    let entry = self.by_pair.entry(pair.clone()).or_default();
    let mut added = 0usize;
    for q in set.questions {
      if entry.iter().any(|existing| existing.id == q.id) {
        warn!(target: "vocab_backend", %pair, id = %q.id, "Skipping duplicate question id");
        continue;
      }
      entry.push(q);
      added += 1;
    }
    info!(target: "vocab_backend", %pair, added, total = entry.len(), "Vocabulary set loaded");
  }

  pub fn questions_for(&self, pair: &str) -> &[Question] {
    self.by_pair.get(pair).map(Vec::as_slice).unwrap_or(&[])
  }

  pub fn questions_for_category(&self, pair: &str, category: &str) -> Vec<&Question> {
    self.questions_for(pair).iter().filter(|q| q.category == category).collect()
  }

  /// Look a question up by id. Ids are prefixed with their pair id, so try that first.
  pub fn find(&self, question_id: &str) -> Option<&Question> {
    self
      .by_pair
      .iter()
      .filter(|(pair, _)| question_id.starts_with(pair.as_str()))
      .chain(self.by_pair.iter())
      .find_map(|(_, qs)| qs.iter().find(|q| q.id == question_id))
  }

  pub fn pairs(&self) -> Vec<&str> {
    let mut pairs: Vec<&str> = self.by_pair.keys().map(String::as_str).collect();
    pairs.sort_unstable();
    pairs
  }
}
