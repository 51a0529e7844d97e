use shared::{legacy, RichText};

/// Turns handler-supplied markup into rich text
pub trait TextFormatter: Send + Sync {
    fn format(&self, markup: &str) -> RichText;
}

/// Legacy section-sign markup, with an alternate code character (`&` by default)
#[derive(Debug, Clone, Copy)]
pub struct LegacyFormatter {
    alternate: Option<char>,
}

impl LegacyFormatter {
    pub fn new() -> Self {
        Self {
            alternate: Some('&'),
        }
    }

    /// Only the section sign starts a code
    pub fn strict() -> Self {
        Self { alternate: None }
    }
}

impl Default for LegacyFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl TextFormatter for LegacyFormatter {
    fn format(&self, markup: &str) -> RichText {
        match self.alternate {
            Some(alt) => legacy::deserialize(&legacy::translate_alternate(markup, alt)),
            None => legacy::deserialize(markup),
        }
    }
}
