//! Styled text values shown on the sidebar
//!
//! A [`RichText`] is an immutable list of spans, each carrying its own
//! [`Style`]. Values are compared by value and replaced wholesale when a
//! line changes; nothing mutates a text that is already attached to a board.
//!
//! The [`legacy`] submodule converts between rich text and the section-sign
//! markup (`§6§lGold bold`) that content handlers usually produce.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The sixteen legacy chat colors, in code order `0`-`f`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NamedColor {
    Black,
    DarkBlue,
    DarkGreen,
    DarkAqua,
    DarkRed,
    DarkPurple,
    Gold,
    Gray,
    DarkGray,
    Blue,
    Green,
    Aqua,
    Red,
    LightPurple,
    Yellow,
    White,
}

impl NamedColor {
    pub const ALL: [NamedColor; 16] = [
        NamedColor::Black,
        NamedColor::DarkBlue,
        NamedColor::DarkGreen,
        NamedColor::DarkAqua,
        NamedColor::DarkRed,
        NamedColor::DarkPurple,
        NamedColor::Gold,
        NamedColor::Gray,
        NamedColor::DarkGray,
        NamedColor::Blue,
        NamedColor::Green,
        NamedColor::Aqua,
        NamedColor::Red,
        NamedColor::LightPurple,
        NamedColor::Yellow,
        NamedColor::White,
    ];

    /// Looks up a color by its legacy code character (case-insensitive)
    pub fn from_code(code: char) -> Option<Self> {
        code.to_digit(16).map(|index| Self::ALL[index as usize])
    }

    /// Legacy code character for this color
    pub fn code(self) -> char {
        let index = Self::ALL
            .iter()
            .position(|color| *color == self)
            .unwrap_or(0);
        char::from_digit(index as u32, 16).unwrap_or('0')
    }

    /// Conventional RGB palette for the color
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            NamedColor::Black => (0, 0, 0),
            NamedColor::DarkBlue => (0, 0, 170),
            NamedColor::DarkGreen => (0, 170, 0),
            NamedColor::DarkAqua => (0, 170, 170),
            NamedColor::DarkRed => (170, 0, 0),
            NamedColor::DarkPurple => (170, 0, 170),
            NamedColor::Gold => (255, 170, 0),
            NamedColor::Gray => (170, 170, 170),
            NamedColor::DarkGray => (85, 85, 85),
            NamedColor::Blue => (85, 85, 255),
            NamedColor::Green => (85, 255, 85),
            NamedColor::Aqua => (85, 255, 255),
            NamedColor::Red => (255, 85, 85),
            NamedColor::LightPurple => (255, 85, 255),
            NamedColor::Yellow => (255, 255, 85),
            NamedColor::White => (255, 255, 255),
        }
    }

    /// Palette color as normalized floats, for renderers
    pub fn rgb_f32(self) -> (f32, f32, f32) {
        let (r, g, b) = self.rgb();
        (r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
    }
}

/// Color and decorations applied to one span
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Style {
    pub color: Option<NamedColor>,
    pub bold: bool,
    pub italic: bool,
    pub underlined: bool,
    pub strikethrough: bool,
    pub obfuscated: bool,
}

impl Style {
    pub fn colored(color: NamedColor) -> Self {
        Self {
            color: Some(color),
            ..Self::default()
        }
    }

    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn with_bold(mut self) -> Self {
        self.bold = true;
        self
    }

    /// Decoration flags keyed by their legacy code, in code order `k`-`o`
    pub fn decorations(&self) -> [(char, bool); 5] {
        [
            ('k', self.obfuscated),
            ('l', self.bold),
            ('m', self.strikethrough),
            ('n', self.underlined),
            ('o', self.italic),
        ]
    }

    /// Sets the decoration for a legacy code; returns false for non-decoration codes
    pub fn apply_decoration(&mut self, code: char) -> bool {
        match code.to_ascii_lowercase() {
            'k' => self.obfuscated = true,
            'l' => self.bold = true,
            'm' => self.strikethrough = true,
            'n' => self.underlined = true,
            'o' => self.italic = true,
            _ => return false,
        }
        true
    }

    /// True when every decoration set on `self` is also set on `other`
    fn decorations_within(&self, other: &Style) -> bool {
        self.decorations()
            .iter()
            .zip(other.decorations().iter())
            .all(|((_, mine), (_, theirs))| !*mine || *theirs)
    }
}

/// A run of text sharing one style
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Span {
    pub text: String,
    pub style: Style,
}

/// Immutable styled text
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RichText {
    spans: Vec<Span>,
}

impl RichText {
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::styled(text, Style::default())
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            spans: vec![Span {
                text: text.into(),
                style,
            }],
        }
    }

    /// Appends a span, merging it into the last one when the styles match
    pub fn push(mut self, text: impl Into<String>, style: Style) -> Self {
        self.push_span(text.into(), style);
        self
    }

    pub(crate) fn push_span(&mut self, text: String, style: Style) {
        match self.spans.last_mut() {
            Some(last) if last.style == style => last.text.push_str(&text),
            _ => self.spans.push(Span { text, style }),
        }
    }

    pub fn spans(&self) -> &[Span] {
        &self.spans
    }

    /// Concatenated text with all styling dropped
    pub fn plain_text(&self) -> String {
        self.spans.iter().map(|span| span.text.as_str()).collect()
    }

    /// True when the value carries no spans at all
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty()
    }
}

impl fmt::Display for RichText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for span in &self.spans {
            f.write_str(&span.text)?;
        }
        Ok(())
    }
}

pub mod legacy {
    //! Section-sign markup codec
    //!
    //! `§` followed by `0-9a-f` selects a color and clears decorations,
    //! `k-o` add a decoration and `r` resets everything. Anything else after
    //! the marker is kept as literal text.

    use super::{NamedColor, RichText, Style};

    pub const SECTION_SIGN: char = '§';

    /// True for characters that form a valid code after the marker
    pub fn is_code(code: char) -> bool {
        matches!(code.to_ascii_lowercase(), '0'..='9' | 'a'..='f' | 'k'..='o' | 'r')
    }

    /// Parses legacy markup into rich text
    pub fn deserialize(markup: &str) -> RichText {
        let mut text = RichText::empty();
        let mut style = Style::default();
        let mut buffer = String::new();
        let mut chars = markup.chars().peekable();

        while let Some(c) = chars.next() {
            if c != SECTION_SIGN {
                buffer.push(c);
                continue;
            }

            let code = match chars.peek() {
                Some(code) if is_code(*code) => *code,
                _ => {
                    buffer.push(c);
                    continue;
                }
            };
            chars.next();

            if !buffer.is_empty() {
                text.push_span(std::mem::take(&mut buffer), style);
            }

            if let Some(color) = NamedColor::from_code(code) {
                style = Style::colored(color);
            } else if !style.apply_decoration(code) {
                style = Style::default();
            }
        }

        if !buffer.is_empty() {
            text.push_span(buffer, style);
        }

        // Keep a trailing style so "§l" still renders to a non-empty string
        if text.is_empty() && style != Style::default() {
            text.push_span(String::new(), style);
        }

        text
    }

    /// Writes rich text back out as canonical legacy markup
    pub fn serialize(text: &RichText) -> String {
        let mut out = String::new();
        let mut current = Style::default();

        for span in text.spans() {
            let next = span.style;
            if current != next {
                let needs_reset = current.color != next.color || !current.decorations_within(&next);
                if needs_reset {
                    out.push(SECTION_SIGN);
                    match next.color {
                        Some(color) => out.push(color.code()),
                        None => out.push('r'),
                    }
                    current = Style {
                        color: next.color,
                        ..Style::default()
                    };
                }
                for ((code, wanted), (_, present)) in
                    next.decorations().iter().zip(current.decorations().iter())
                {
                    if *wanted && !*present {
                        out.push(SECTION_SIGN);
                        out.push(*code);
                    }
                }
                current = next;
            }
            out.push_str(&span.text);
        }

        out
    }

    /// Rewrites `alt` followed by a valid code into the section-sign form
    pub fn translate_alternate(markup: &str, alt: char) -> String {
        let mut out = String::with_capacity(markup.len());
        let mut chars = markup.chars().peekable();

        while let Some(c) = chars.next() {
            match chars.peek() {
                Some(code) if c == alt && is_code(*code) => out.push(SECTION_SIGN),
                _ => out.push(c),
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::legacy::{deserialize, serialize, translate_alternate};
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn test_plain_text_has_single_span() {
        let text = deserialize("Hello");
        assert_eq!(text, RichText::plain("Hello"));
        assert_eq!(text.plain_text(), "Hello");
    }

    #[test]
    fn test_color_and_bold_codes() {
        let text = deserialize("§6§lArena §rv1");
        let spans = text.spans();

        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "Arena ");
        assert_eq!(spans[0].style.color, Some(NamedColor::Gold));
        assert!(spans[0].style.bold);
        assert_eq!(spans[1].text, "v1");
        assert_eq!(spans[1].style, Style::default());
    }

    #[test]
    fn test_color_code_clears_decorations() {
        let text = deserialize("§lA§cB");
        assert!(text.spans()[0].style.bold);
        assert_eq!(text.spans()[1].style, Style::colored(NamedColor::Red));
    }

    #[test]
    fn test_uppercase_codes_are_accepted() {
        assert_eq!(
            deserialize("§AGo"),
            RichText::styled("Go", Style::colored(NamedColor::Green))
        );
    }

    #[test]
    fn test_unknown_and_dangling_codes_stay_literal() {
        assert_eq!(deserialize("50§z off").plain_text(), "50§z off");
        assert_eq!(deserialize("trailing§").plain_text(), "trailing§");
    }

    #[test]
    fn test_bold_reset_keeps_empty_styled_span() {
        let text = deserialize("§l");
        assert!(!text.is_empty());
        assert_eq!(text.plain_text(), "");
        assert_eq!(serialize(&text), "§l");
    }

    #[test]
    fn test_adjacent_equal_styles_merge() {
        let text = deserialize("§aab§acd");
        assert_eq!(text.spans().len(), 1);
        assert_eq!(text.spans()[0].text, "abcd");
    }

    #[test]
    fn test_serialize_is_canonical() {
        let text = RichText::styled("Kills: ", Style::colored(NamedColor::Gray))
            .push("12", Style::colored(NamedColor::White).with_bold())
            .push(" total", Style::default());

        assert_eq!(serialize(&text), "§7Kills: §f§l12§r total");
        assert_eq!(deserialize(&serialize(&text)), text);
    }

    #[test]
    fn test_translate_alternate_codes() {
        assert_eq!(translate_alternate("&6Gold &lbold", '&'), "§6Gold §lbold");
        assert_eq!(translate_alternate("Tom & Jerry &z", '&'), "Tom & Jerry &z");
    }

    #[test]
    fn test_color_codes_roundtrip_through_lookup() {
        for color in NamedColor::ALL {
            assert_eq!(NamedColor::from_code(color.code()), Some(color));
        }
        assert_eq!(NamedColor::from_code('g'), None);
    }

    #[test]
    fn test_rgb_f32_is_normalized() {
        let (r, g, b) = NamedColor::Gold.rgb_f32();
        assert_approx_eq!(r, 1.0, 0.001);
        assert_approx_eq!(g, 170.0 / 255.0, 0.001);
        assert_approx_eq!(b, 0.0, 0.001);
    }
}
