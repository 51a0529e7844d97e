use crate::text::{legacy, RichText};
use serde::{Deserialize, Serialize};

/// One sidebar line supplied by a content handler for a single render pass
///
/// The position doubles as the line's score and is its identity within a
/// batch: a later entry with the same position overwrites an earlier one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    name: RichText,
    position: i32,
}

impl Entry {
    /// Creates an entry from section-sign legacy markup
    pub fn new(markup: &str, position: i32) -> Self {
        Self {
            name: legacy::deserialize(markup),
            position,
        }
    }

    pub fn from_text(name: RichText, position: i32) -> Self {
        Self { name, position }
    }

    pub fn name(&self) -> &RichText {
        &self.name
    }

    pub fn set_name(&mut self, name: RichText) {
        self.name = name;
    }

    pub fn position(&self) -> i32 {
        self.position
    }

    pub fn set_position(&mut self, position: i32) {
        self.position = position;
    }
}
