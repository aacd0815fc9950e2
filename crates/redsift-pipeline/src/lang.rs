//! Language detection ahead of the analysis fan-out.

/// Detects the language of a piece of text.
pub trait LanguageDetector: Send + Sync {
  /// ISO 639-3 code of the dominant language, or `None` if detection is not
  /// confident enough to act on.
  fn detect(&self, text: &str) -> Option<String>;
}

/// [`LanguageDetector`] backed by `whatlang`.
///
/// Results `whatlang` itself marks unreliable count as a failed detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct WhatlangDetector;

impl LanguageDetector for WhatlangDetector {
  fn detect(&self, text: &str) -> Option<String> {
    whatlang::detect(text)
      .filter(whatlang::Info::is_reliable)
      .map(|info| info.lang().code().to_owned())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn detects_english_prose() {
    let text = "The quick brown fox jumps over the lazy dog while the farmer \
                watches from the porch and wonders whether it will rain today.";
    assert_eq!(WhatlangDetector.detect(text).as_deref(), Some("eng"));
  }

  #[test]
  fn detects_greek_prose() {
    let text = "Η γρήγορη καφέ αλεπού πηδάει πάνω από τον τεμπέλη σκύλο \
                ενώ ο αγρότης κοιτάζει από τη βεράντα.";
    assert_eq!(WhatlangDetector.detect(text).as_deref(), Some("ell"));
  }

  #[test]
  fn empty_text_is_undetected() {
    assert_eq!(WhatlangDetector.detect(""), None);
  }
}
