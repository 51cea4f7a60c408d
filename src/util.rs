//! Small utility helpers used across modules.

/// Log-safe truncation for large strings, cut on a char boundary.
/// Avoids spamming logs with huge upstream error bodies.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

/// Player ids are used in storage keys; keep them to a safe alphabet.
/// Empty or fully-filtered ids become "guest".
pub fn normalize_player(raw: Option<&str>) -> String {
  let cleaned: String = raw
    .unwrap_or_default()
    .trim()
    .chars()
    .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '@'))
    .take(64)
    .collect();
  if cleaned.is_empty() { "guest".into() } else { cleaned }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn truncation_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let t = trunc_for_log("ありがとう", 4);
    assert!(t.starts_with("あ…"));
  }

  #[test]
  fn player_ids_are_sanitized() {
    assert_eq!(normalize_player(None), "guest");
    assert_eq!(normalize_player(Some("  ")), "guest");
    assert_eq!(normalize_player(Some("ana:evil key")), "anaevilkey");
    assert_eq!(normalize_player(Some("bo@example.com")), "bo@example.com");
  }
}
