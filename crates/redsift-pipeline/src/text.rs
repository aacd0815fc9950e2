//! Sanitisation of model output before it is hashed and stored.

/// Strip control characters (keeping newlines and tabs) and surrounding
/// whitespace.
pub fn sanitize(text: &str) -> String {
  text
    .chars()
    .filter(|c| !c.is_control() || matches!(c, '\n' | '\t'))
    .collect::<String>()
    .trim()
    .to_owned()
}
