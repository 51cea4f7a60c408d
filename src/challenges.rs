//! Daily challenge engine.
//!
//! Two pure functions sit at the core:
//!   - `generate_daily_set`: date → the day's three challenges (one per tier)
//!   - `evaluate_progress`: challenge + session stats → raw progress value
//!
//! Neither reads the clock nor touches storage; callers own both.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, Utc};

use crate::catalog::Catalog;
use crate::domain::{Challenge, ChallengeRule, Difficulty, GameSessionStats};

/// Stable id of the challenge in `slot` for `date`.
pub fn daily_id(date: NaiveDate, slot: usize) -> String {
  format!("daily-{}-{}", date.format("%Y-%m-%d"), slot)
}

/// Combination index of a date: 1-based day of year modulo the catalog size.
pub fn day_seed(date: NaiveDate, catalog_len: usize) -> usize {
  (date.ordinal() as usize) % catalog_len.max(1)
}

/// Midnight UTC of the day after `date`.
pub fn expires_at(date: NaiveDate) -> DateTime<Utc> {
  date.and_time(NaiveTime::MIN).and_utc() + Duration::hours(24)
}

/// Build the day's challenge set: easy, medium, hard in that order.
///
/// Each tier is indexed with its own offset (`seed`, `seed + 1`, `seed + 2`) so the
/// three picks drift independently across the year.
pub fn generate_daily_set(date: NaiveDate, catalog: &Catalog) -> Vec<Challenge> {
  let seed = day_seed(date, catalog.len());
  Difficulty::ALL
    .iter()
    .enumerate()
    .filter_map(|(slot, tier)| {
      let pool = catalog.pool(*tier);
      if pool.is_empty() {
        return None;
      }
      let tpl = pool[(seed + slot) % pool.len()];
      Some(Challenge {
        id: daily_id(date, slot),
        template: tpl.clone(),
        progress: 0,
        completed: false,
        expires_at: expires_at(date),
      })
    })
    .collect()
}

/// Raw progress of `challenge` given the session so far. Not clamped to the target;
/// use `Challenge::apply_progress` to store it.
pub fn evaluate_progress(challenge: &Challenge, stats: &GameSessionStats) -> u32 {
  match challenge.rule() {
    // a zero limit means no countdown was configured
    ChallengeRule::Speed { time_limit } => {
      if *time_limit > 0 && stats.time_spent <= *time_limit { stats.correct_answers } else { 0 }
    }
    ChallengeRule::Streak => stats.current_streak,
    ChallengeRule::Category { category } => {
      if stats.categories_played.contains(category) { stats.correct_answers } else { 0 }
    }
    ChallengeRule::Accuracy => {
      // session-lifetime accuracy; one miss anywhere zeroes it
      if stats.questions_answered > 0 && stats.correct_answers == stats.questions_answered {
        stats.correct_answers
      } else {
        0
      }
    }
    ChallengeRule::Volume => stats.questions_answered,
    ChallengeRule::MultiLanguage { .. } => stats.language_pairs_played.len() as u32,
    ChallengeRule::Unknown => 0,
  }
}

/// Store `progress` on the challenge with `challenge_id`; others are left untouched.
/// Returns true if that challenge became completed with this update.
pub fn update_challenge_progress(challenges: &mut [Challenge], challenge_id: &str, progress: u32) -> bool {
  challenges
    .iter_mut()
    .find(|c| c.id == challenge_id)
    .map(|c| c.apply_progress(progress))
    .unwrap_or(false)
}

pub fn completed_count(challenges: &[Challenge]) -> usize {
  challenges.iter().filter(|c| c.completed).count()
}

/// XP earned so far from completed challenges.
pub fn total_xp(challenges: &[Challenge]) -> u32 {
  challenges.iter().filter(|c| c.completed).map(|c| c.template.reward.xp).sum()
}

/// Time left until the daily set rolls over (next UTC midnight).
pub fn time_until_reset(now: DateTime<Utc>) -> Duration {
  expires_at(now.date_naive()) - now
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::collections::HashSet;

  use crate::seeds::seed_templates;

  fn catalog() -> Catalog {
    Catalog::new(seed_templates()).unwrap()
  }

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn stats(answered: u32, correct: u32, streak: u32, time: u32) -> GameSessionStats {
    GameSessionStats {
      questions_answered: answered,
      correct_answers: correct,
      current_streak: streak,
      longest_streak: streak,
      time_spent: time,
      ..Default::default()
    }
  }

  fn challenge_with(title: &str) -> Challenge {
    let tpl = seed_templates().into_iter().find(|t| t.title == title).unwrap();
    Challenge { id: "t".into(), template: tpl, progress: 0, completed: false, expires_at: expires_at(date(2025, 1, 1)) }
  }

  #[test]
  fn same_date_gives_identical_set() {
    let cat = catalog();
    let d = date(2025, 6, 17);
    assert_eq!(generate_daily_set(d, &cat), generate_daily_set(d, &cat));
  }

  #[test]
  fn every_set_has_one_challenge_per_tier() {
    let cat = catalog();
    let mut d = date(2024, 1, 1);
    while d < date(2026, 1, 1) {
      let set = generate_daily_set(d, &cat);
      assert_eq!(set.len(), 3);
      let tiers: Vec<Difficulty> = set.iter().map(|c| c.template.difficulty).collect();
      assert_eq!(tiers, Difficulty::ALL);
      assert!(set.iter().all(|c| c.progress == 0 && !c.completed));
      d = d.succ_opt().unwrap();
    }
  }

  #[test]
  fn a_year_covers_every_template() {
    let cat = catalog();
    let mut seen = HashSet::new();
    let mut d = date(2025, 1, 1);
    while d.year() == 2025 {
      for c in generate_daily_set(d, &cat) {
        seen.insert(c.template.title);
      }
      d = d.succ_opt().unwrap();
    }
    assert_eq!(seen.len(), cat.len());
  }

  #[test]
  fn new_year_2025_set() {
    let set = generate_daily_set(date(2025, 1, 1), &catalog());
    let titles: Vec<&str> = set.iter().map(|c| c.template.title.as_str()).collect();
    assert_eq!(titles, ["Perfect Start", "Ace Student", "Marathon"]);
    assert_eq!(set[0].id, "daily-2025-01-01-0");
    assert_eq!(set[2].id, "daily-2025-01-01-2");
    assert_eq!(set[1].expires_at.to_rfc3339(), "2025-01-02T00:00:00+00:00");
  }

  #[test]
  fn accuracy_needs_a_clean_session() {
    let c = challenge_with("Ace Student");
    assert_eq!(evaluate_progress(&c, &stats(0, 0, 0, 0)), 0);
    assert_eq!(evaluate_progress(&c, &stats(5, 4, 3, 10)), 0);
    assert_eq!(evaluate_progress(&c, &stats(5, 5, 5, 10)), 5);
  }

  #[test]
  fn speed_is_all_or_nothing_on_the_time_gate() {
    let c = challenge_with("Quick Fire");
    assert_eq!(c.rule().time_limit(), Some(30));
    assert_eq!(evaluate_progress(&c, &stats(6, 4, 2, 31)), 0);
    assert_eq!(evaluate_progress(&c, &stats(6, 4, 2, 30)), 4);
  }

  #[test]
  fn speed_without_a_time_limit_never_progresses() {
    let mut c = challenge_with("Quick Fire");
    c.template.rule = ChallengeRule::Speed { time_limit: 0 };
    assert_eq!(evaluate_progress(&c, &stats(3, 3, 3, 0)), 0);
  }

  #[test]
  fn category_requires_the_category_played() {
    let c = challenge_with("Animal Lover");
    let mut s = stats(3, 3, 3, 0);
    assert_eq!(evaluate_progress(&c, &s), 0);
    s.categories_played.insert("Animals".into());
    assert_eq!(evaluate_progress(&c, &s), 3);
  }

  #[test]
  fn volume_counts_wrong_answers_too() {
    let c = challenge_with("Daily Grind");
    assert_eq!(evaluate_progress(&c, &stats(7, 2, 0, 0)), 7);
  }

  #[test]
  fn multi_language_counts_pairs() {
    let mut c = challenge_with("Polyglot Practice");
    let mut s = stats(10, 10, 10, 45);
    s.categories_played.insert("Animals".into());
    s.language_pairs_played.extend(["en-es".to_string(), "en-fr".to_string()]);
    let p = evaluate_progress(&c, &s);
    assert_eq!(p, 2);
    c.apply_progress(p);
    assert_eq!(c.progress, 2);
    assert!(!c.completed);
  }

  #[test]
  fn streak_clamps_to_target() {
    let mut c = challenge_with("Streak Master");
    let p = evaluate_progress(&c, &stats(9, 9, 9, 0));
    assert_eq!(p, 9);
    assert!(c.apply_progress(p));
    assert_eq!(c.progress, 8);
    assert!(c.completed);
  }

  #[test]
  fn unknown_rule_never_progresses() {
    let mut c = challenge_with("Daily Grind");
    c.template.rule = ChallengeRule::Unknown;
    assert_eq!(evaluate_progress(&c, &stats(20, 20, 20, 0)), 0);
  }

  #[test]
  fn zero_target_counts_as_done() {
    let mut c = challenge_with("Daily Grind");
    c.template.target = 0;
    assert!(c.apply_progress(0));
  }

  #[test]
  fn update_touches_only_the_matching_challenge() {
    let mut set = generate_daily_set(date(2025, 1, 1), &catalog());
    assert!(update_challenge_progress(&mut set, "daily-2025-01-01-0", 5));
    assert!(!update_challenge_progress(&mut set, "missing", 5));
    assert_eq!(set[0].progress, 3);
    assert_eq!(set[1].progress, 0);
    assert_eq!(completed_count(&set), 1);
    assert_eq!(total_xp(&set), 30);
  }

  #[test]
  fn reset_countdown() {
    let now = date(2025, 3, 10).and_hms_opt(22, 30, 0).unwrap().and_utc();
    assert_eq!(time_until_reset(now), Duration::minutes(90));
  }
}
