use regex::Regex;

pub fn normalize_token(value: &str) -> String {
  value
    .to_lowercase()
    .chars()
    .map(|c| if c.is_ascii_alphanumeric() { c } else { ' ' })
    .collect::<String>()
    .split_whitespace()
    .collect::<Vec<&str>>()
    .join("_")
}

// Lower-cases and drops every whitespace character, keeping punctuation.
pub fn compact_lower(value: &str) -> String {
  value
    .chars()
    .filter(|c| !c.is_whitespace())
    .flat_map(char::to_lowercase)
    .collect()
}

pub fn clean_label(text: &str) -> String {
  let tag_re = Regex::new(r"<[^>]+>").expect("regex");
  let no_tags = tag_re.replace_all(text, " ");
  no_tags.split_whitespace().collect::<Vec<&str>>().join(" ")
}

pub fn contains_any(haystack: &str, needles: &[&str]) -> bool {
  let lowered = haystack.to_lowercase();
  needles.iter().any(|n| lowered.contains(n))
}

pub fn is_blank(value: &str) -> bool {
  value.trim().is_empty()
}

#[cfg(test)]
mod tests {
  use super::{clean_label, compact_lower, contains_any, normalize_token};

  #[test]
  fn normalizes_wire_tags() {
    assert_eq!(normalize_token("MULTIPLE_CHOICE"), "multiple_choice");
    assert_eq!(normalize_token(" Input-Box "), "input_box");
  }

  #[test]
  fn compact_keeps_punctuation() {
    assert_eq!(
      compact_lower("What was the date of your  last injection?"),
      "whatwasthedateofyourlastinjection?"
    );
  }

  #[test]
  fn clean_label_strips_markup() {
    assert_eq!(clean_label("<b>Your</b>\n height"), "Your height");
    assert!(contains_any("Please UPDATE your address", &["update your address"]));
  }
}
