// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Output records of a calculated layout.

use core::ops::Range;

use peniko::kurbo::Point;

use crate::analysis::CharAttributes;
use crate::input::SourceId;
use crate::shape::{FontMetrics, GlyphOrientation};
use crate::style::{Alignment, Direction, WritingMode};

/// A laid out paragraph.
#[derive(Clone, Debug, PartialEq)]
pub struct Paragraph {
    /// Base direction.
    pub direction: Direction,
    /// Alignment of the paragraph's lines.
    pub alignment: Alignment,
    /// Lines of the paragraph.
    pub lines: Range<usize>,
    /// Characters of the paragraph.
    pub char_range: Range<usize>,
}

/// A laid out line.
#[derive(Clone, Debug, PartialEq)]
pub struct Line {
    /// Index of the paragraph this line belongs to.
    pub paragraph: usize,
    /// Block coordinate of the baseline.
    pub baseline: f64,
    /// Ascent of the line box.
    pub ascent: f64,
    /// Descent of the line box.
    pub descent: f64,
    /// Whether the line overflowed the wrap shapes and should not be drawn.
    pub hidden: bool,
    /// The wrap shape the line was placed in, if text is flowed.
    pub shape_index: Option<usize>,
    /// Chunks of the line.
    pub chunks: Range<usize>,
    /// Characters of the line, in logical order.
    pub char_range: Range<usize>,
    /// Glyphs of the line, in visual order.
    pub glyph_range: Range<usize>,
    pub(crate) visual_range: Range<usize>,
    pub(crate) height_retries: u32,
}

/// A contiguous region of text on a line.
#[derive(Clone, Debug, PartialEq)]
pub struct Chunk {
    /// Index of the line this chunk belongs to.
    pub line: usize,
    /// Inline coordinate of the chunk's left edge after alignment.
    pub left: f64,
    /// Width of the text, excluding trailing white space.
    pub text_width: f64,
    /// Width available to the chunk. Infinite for text that is not flowed.
    pub available_width: f64,
    /// Spans of the chunk.
    pub spans: Range<usize>,
}

/// A run of characters with one style within a chunk.
#[derive(Clone, Debug, PartialEq)]
pub struct Span {
    /// Index of the chunk this span belongs to.
    pub chunk: usize,
    /// Index of the input item the span's text came from.
    pub input_index: usize,
    /// The object the span's text came from.
    pub source: SourceId,
    /// Font size.
    pub font_size: f64,
    /// Metrics of the span's font.
    pub line_height: FontMetrics,
    /// Baseline shift, positive away from the block end.
    pub baseline_shift: f64,
    /// Accumulated block offset from `dy` and non-initial `y` attributes.
    pub block_offset: f64,
    /// Bidi embedding level.
    pub bidi_level: u8,
    /// Glyph orientation.
    pub orientation: GlyphOrientation,
    /// Inline coordinate of the span's left edge.
    pub x_start: f64,
    /// Inline coordinate of the span's right edge.
    pub x_end: f64,
    /// Characters of the span.
    pub char_range: Range<usize>,
}

/// A laid out character, in logical order.
#[derive(Clone, Debug, PartialEq)]
pub struct Character {
    /// The character.
    pub ch: char,
    /// Index of the span this character belongs to.
    pub span: usize,
    /// Index of the line this character belongs to.
    pub line: usize,
    /// The first glyph of this character's cluster.
    pub glyph: Option<usize>,
    /// Inline coordinate of the character's logical start edge.
    pub inline: f64,
    /// Block coordinate of the character's baseline.
    pub block: f64,
    /// Distance to the next cursor stop in the writing direction.
    pub advance: f64,
    /// Whether the character is set right-to-left.
    pub rtl: bool,
    /// Linguistic attributes.
    pub attributes: CharAttributes,
    /// Index of the input item the character came from.
    pub input_index: usize,
    /// Byte offset of the character within its input item's text.
    pub source_byte: usize,
}

impl Character {
    /// Inline coordinate of the character's logical end edge.
    pub fn inline_end(&self) -> f64 {
        if self.rtl {
            self.inline - self.advance
        } else {
            self.inline + self.advance
        }
    }
}

/// A positioned glyph.
#[derive(Clone, Debug, PartialEq)]
pub struct Glyph {
    /// Glyph identifier within its font.
    pub glyph_id: u32,
    /// Position of the glyph origin in document coordinates.
    pub position: Point,
    /// Inline coordinate of the glyph origin.
    pub inline: f64,
    /// Block coordinate of the glyph origin.
    pub block: f64,
    /// Advance along the inline axis.
    pub advance: f64,
    /// Rotation in degrees, clockwise.
    pub rotation: f64,
    /// Index of the first character of the glyph's cluster.
    pub character: usize,
    /// Characters of the glyph's cluster.
    pub cluster: Range<usize>,
    /// Index of the span this glyph belongs to.
    pub span: usize,
    /// Orientation of the glyph.
    pub orientation: GlyphOrientation,
    /// Whether the glyph is on a hidden line.
    pub hidden: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct LayoutData {
    pub(crate) writing_mode: WritingMode,
    pub(crate) paragraphs: Vec<Paragraph>,
    pub(crate) lines: Vec<Line>,
    pub(crate) chunks: Vec<Chunk>,
    pub(crate) spans: Vec<Span>,
    pub(crate) characters: Vec<Character>,
    pub(crate) glyphs: Vec<Glyph>,
    /// Logical character indices of each line in left-to-right visual order.
    pub(crate) visual_chars: Vec<usize>,
    pub(crate) input_truncated: bool,
}
