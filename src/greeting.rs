//! Greeting text.
//!
//! The card shows a short greeting under the tree. It starts as
//! [`DEFAULT_GREETING`] and can be replaced by whatever a [`GreetingSource`]
//! composes from a user prompt. Text generators live outside this crate;
//! [`StaticGreeting`] is the built-in source.

use crate::error::GreetingError;

/// "May every year bring joy, and every season go your way."
pub const DEFAULT_GREETING: &str = "愿岁岁常欢愉，\n年年皆胜意。";

/// Produces a greeting from a prompt.
pub trait GreetingSource {
    fn compose(&mut self, prompt: &str) -> Result<String, GreetingError>;
}

/// Always answers with the same text.
#[derive(Debug, Clone)]
pub struct StaticGreeting {
    text: String,
}

impl StaticGreeting {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

impl Default for StaticGreeting {
    fn default() -> Self {
        Self::new(DEFAULT_GREETING)
    }
}

impl GreetingSource for StaticGreeting {
    fn compose(&mut self, _prompt: &str) -> Result<String, GreetingError> {
        Ok(self.text.clone())
    }
}

/// Ask `source` for a greeting and clean it up for display.
///
/// Blank prompts are rejected before the source is called.
pub fn compose_greeting(
    source: &mut dyn GreetingSource,
    prompt: &str,
) -> Result<String, GreetingError> {
    let prompt = prompt.trim();
    if prompt.is_empty() {
        return Err(GreetingError::EmptyPrompt);
    }
    let raw = source.compose(prompt)?;
    Ok(normalize_greeting(&raw))
}

/// Turn escaped `\n` sequences into real line breaks and trim.
///
/// Generators often return the two characters `\` `n` instead of a newline.
/// Blank output falls back to [`DEFAULT_GREETING`].
pub fn normalize_greeting(raw: &str) -> String {
    let text = raw.replace("\\n", "\n");
    let text = text.trim();
    if text.is_empty() {
        DEFAULT_GREETING.to_owned()
    } else {
        text.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Failing;

    impl GreetingSource for Failing {
        fn compose(&mut self, _prompt: &str) -> Result<String, GreetingError> {
            Err(GreetingError::Source("quota exhausted".into()))
        }
    }

    #[test]
    fn test_normalize_escaped_newlines() {
        assert_eq!(normalize_greeting("  snow\\nand stars \n"), "snow\nand stars");
    }

    #[test]
    fn test_normalize_blank_falls_back() {
        assert_eq!(normalize_greeting("   "), DEFAULT_GREETING);
    }

    #[test]
    fn test_empty_prompt_rejected() {
        let mut source = StaticGreeting::new("hi");
        assert!(matches!(
            compose_greeting(&mut source, "  "),
            Err(GreetingError::EmptyPrompt)
        ));
    }

    #[test]
    fn test_static_source() {
        let mut source = StaticGreeting::new("Warm\\nwishes");
        assert_eq!(compose_greeting(&mut source, "winter").unwrap(), "Warm\nwishes");
    }

    #[test]
    fn test_source_failure_propagates() {
        assert!(matches!(
            compose_greeting(&mut Failing, "winter"),
            Err(GreetingError::Source(_))
        ));
    }
}
