//! Small utility helpers used across modules.

use once_cell::sync::Lazy;
use regex::Regex;

static ID_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\A[a-zA-Z0-9_\-]+\z").expect("valid id regex"));

/// Very small and safe string templating.
/// Replaces occurrences of `{key}` in the template with provided values in a
/// single left-to-right pass: inserted values are never scanned again.
/// Braces that do not enclose a known key are kept as they are.
pub fn fill_template(tpl: &str, pairs: &[(&str, &str)]) -> String {
  let mut out = String::with_capacity(tpl.len());
  let mut rest = tpl;
  while let Some(open) = rest.find('{') {
    out.push_str(&rest[..open]);
    let tail = &rest[open..];
    let hit = tail[1..].find('}').and_then(|close| {
      let key = &tail[1..1 + close];
      pairs.iter().find(|(k, _)| *k == key).map(|(_, v)| (*v, close + 2))
    });
    match hit {
      Some((value, consumed)) => {
        out.push_str(value);
        rest = &tail[consumed..];
      }
      None => {
        out.push('{');
        rest = &tail[1..];
      }
    }
  }
  out.push_str(rest);
  out
}

/// Identifier check shared by problems and boxes: letters, digits, `_` and `-`.
/// The empty string is rejected here; callers that tolerate it say so.
pub fn id_checker(id: &str) -> bool {
  ID_RE.is_match(id)
}

/// Escape text for use in HTML content and quoted attribute values.
pub fn escape_html(s: &str) -> String {
  let mut out = String::with_capacity(s.len());
  for ch in s.chars() {
    match ch {
      '&' => out.push_str("&amp;"),
      '<' => out.push_str("&lt;"),
      '>' => out.push_str("&gt;"),
      '"' => out.push_str("&quot;"),
      '\'' => out.push_str("&#x27;"),
      _ => out.push(ch),
    }
  }
  out
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
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

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn id_checker_accepts_identifier_charset() {
    for id in ["a", "Box_1", "q-2", "ABC", "0", "__", "a-b_c-9"] {
      assert!(id_checker(id), "{id} should be accepted");
    }
  }

  #[test]
  fn id_checker_rejects_everything_else() {
    for id in ["", "a/b", "a b", "é", "q.1", "x\n", "a+b"] {
      assert!(!id_checker(id), "{id:?} should be rejected");
    }
  }

  #[test]
  fn fill_template_replaces_every_occurrence() {
    let out = fill_template("<p id=\"{id}\">{id}:{v}</p>", &[("id", "x"), ("v", "1")]);
    assert_eq!(out, "<p id=\"x\">x:1</p>");
  }

  #[test]
  fn fill_template_does_not_rescan_inserted_values() {
    let out = fill_template("[{a}] [{b}]", &[("a", "{b}"), ("b", "x")]);
    assert_eq!(out, "[{b}] [x]");
    assert_eq!(fill_template("{\"k\": {v}} {nope}", &[("v", "1")]), "{\"k\": 1} {nope}");
  }

  #[test]
  fn escape_html_covers_markup_characters() {
    assert_eq!(escape_html("<a href=\"x\">&'"), "&lt;a href=&quot;x&quot;&gt;&amp;&#x27;");
  }

  #[test]
  fn trunc_for_log_respects_char_boundaries() {
    assert_eq!(trunc_for_log("short", 10), "short");
    let out = trunc_for_log("ééééé", 3);
    assert!(out.starts_with("é…"));
    assert!(out.ends_with("(10 bytes total)"));
  }
}
