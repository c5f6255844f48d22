// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-character linguistic attributes.

use icu_segmenter::options::{LineBreakOptions, WordBreakInvariantOptions};
use icu_segmenter::{GraphemeClusterSegmenter, LineSegmenter, WordSegmenter};

use crate::util::is_mandatory_linebreak;

/// Linguistic attributes of one character.
///
/// Break attributes describe the boundary *before* the character.
#[derive(Copy, Clone, Default, PartialEq, Eq)]
pub struct CharAttributes {
    flags: u8,
}

impl CharAttributes {
    const LINE_BREAK_SHIFT: u8 = 0;
    const MANDATORY_BREAK_SHIFT: u8 = 1;
    const CHAR_BREAK_SHIFT: u8 = 2;
    const WHITE_SHIFT: u8 = 3;
    const CURSOR_POSITION_SHIFT: u8 = 4;
    const WORD_START_SHIFT: u8 = 5;
    const WORD_END_SHIFT: u8 = 6;

    const LINE_BREAK_MASK: u8 = 1 << Self::LINE_BREAK_SHIFT;
    const MANDATORY_BREAK_MASK: u8 = 1 << Self::MANDATORY_BREAK_SHIFT;
    const CHAR_BREAK_MASK: u8 = 1 << Self::CHAR_BREAK_SHIFT;
    const WHITE_MASK: u8 = 1 << Self::WHITE_SHIFT;
    const CURSOR_POSITION_MASK: u8 = 1 << Self::CURSOR_POSITION_SHIFT;
    const WORD_START_MASK: u8 = 1 << Self::WORD_START_SHIFT;
    const WORD_END_MASK: u8 = 1 << Self::WORD_END_SHIFT;

    fn set(&mut self, mask: u8, value: bool) {
        if value {
            self.flags |= mask;
        } else {
            self.flags &= !mask;
        }
    }

    /// A line may be broken before this character.
    pub fn is_line_break(self) -> bool {
        self.flags & Self::LINE_BREAK_MASK != 0
    }

    /// A line must be broken before this character.
    pub fn is_mandatory_break(self) -> bool {
        self.flags & Self::MANDATORY_BREAK_MASK != 0
    }

    /// A line may be broken before this character in an emergency.
    pub fn is_char_break(self) -> bool {
        self.flags & Self::CHAR_BREAK_MASK != 0
    }

    /// This character is white space.
    pub fn is_white(self) -> bool {
        self.flags & Self::WHITE_MASK != 0
    }

    /// The cursor can be placed before this character.
    pub fn is_cursor_position(self) -> bool {
        self.flags & Self::CURSOR_POSITION_MASK != 0
    }

    /// This character starts a word.
    pub fn is_word_start(self) -> bool {
        self.flags & Self::WORD_START_MASK != 0
    }

    /// This character follows the end of a word.
    pub fn is_word_end(self) -> bool {
        self.flags & Self::WORD_END_MASK != 0
    }
}

impl core::fmt::Debug for CharAttributes {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CharAttributes")
            .field("line_break", &self.is_line_break())
            .field("mandatory_break", &self.is_mandatory_break())
            .field("char_break", &self.is_char_break())
            .field("white", &self.is_white())
            .field("cursor_position", &self.is_cursor_position())
            .field("word_start", &self.is_word_start())
            .field("word_end", &self.is_word_end())
            .finish()
    }
}

/// Computes the attributes of every character of `text`.
///
/// The result has exactly one entry per character.
pub(crate) fn analyze_text(text: &str) -> Vec<CharAttributes> {
    let char_offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
    let mut attributes: Vec<CharAttributes> = text
        .chars()
        .map(|ch| {
            let mut attrs = CharAttributes::default();
            attrs.set(CharAttributes::WHITE_MASK, ch.is_whitespace());
            attrs
        })
        .collect();
    if text.is_empty() {
        return attributes;
    }

    let char_at = |offset: usize| char_offsets.binary_search(&offset).ok();

    for boundary in LineSegmenter::new_auto(LineBreakOptions::default()).segment_str(text) {
        if boundary == 0 {
            continue;
        }
        let Some(index) = char_at(boundary) else {
            continue;
        };
        // CR LF breaks once, after the LF.
        let mandatory = text[..boundary].chars().next_back().is_some_and(|prev| {
            is_mandatory_linebreak(prev) && !(prev == '\r' && text[boundary..].starts_with('\n'))
        });
        attributes[index].set(CharAttributes::LINE_BREAK_MASK, true);
        attributes[index].set(CharAttributes::MANDATORY_BREAK_MASK, mandatory);
    }

    for boundary in GraphemeClusterSegmenter::new().segment_str(text) {
        if let Some(index) = char_at(boundary) {
            attributes[index].set(CharAttributes::CHAR_BREAK_MASK, true);
            attributes[index].set(CharAttributes::CURSOR_POSITION_MASK, true);
        }
    }

    let mut words = WordSegmenter::new_auto(WordBreakInvariantOptions::default()).segment_str(text);
    let mut segment_start = 0;
    while let Some(boundary) = words.next() {
        if boundary == 0 {
            continue;
        }
        if words.is_word_like() {
            if let Some(start) = char_at(segment_start) {
                attributes[start].set(CharAttributes::WORD_START_MASK, true);
            }
            if let Some(end) = char_at(boundary) {
                attributes[end].set(CharAttributes::WORD_END_MASK, true);
            }
        }
        segment_start = boundary;
    }

    attributes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_text_has_no_attributes() {
        assert!(analyze_text("").is_empty());
    }

    #[test]
    fn break_opportunities_follow_spaces() {
        let attrs = analyze_text("ab cd");
        assert_eq!(attrs.len(), 5);
        assert!(!attrs[1].is_line_break());
        assert!(attrs[2].is_white());
        assert!(attrs[3].is_line_break());
        assert!(!attrs[3].is_mandatory_break());
        assert!(attrs[0].is_word_start());
        assert!(attrs[3].is_word_start());
        assert!(attrs[2].is_word_end());
    }

    #[test]
    fn newline_forces_a_break() {
        let attrs = analyze_text("ab\ncd");
        assert!(attrs[3].is_line_break());
        assert!(attrs[3].is_mandatory_break());
    }

    #[test]
    fn combining_marks_are_not_cursor_positions() {
        let attrs = analyze_text("ao\u{328}a");
        assert_eq!(attrs.len(), 4);
        assert!(attrs[1].is_cursor_position());
        assert!(!attrs[2].is_cursor_position());
        assert!(!attrs[2].is_char_break());
        assert!(attrs[3].is_cursor_position());
    }
}
