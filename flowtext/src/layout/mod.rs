// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The layout: input stream, options and calculated output.

mod alignment;
mod calculator;
mod data;
mod iterator;
mod measure;
mod output;

pub use data::{Character, Chunk, Glyph, Line, Paragraph, Span};
pub use iterator::{LayoutIterator, TextPosition};

use peniko::kurbo::{Point, Rect};

use crate::flow::{Axes, WrapShape};
use crate::input::{ControlCode, InputItem, PositionAttrs, SourceId, StyledTextRun};
use crate::shape::Shaper;
use crate::style::TextStyle;

use calculator::Calculator;
use data::LayoutData;

/// Where lines wrap.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum WrapMode {
    /// Lines only end at mandatory breaks.
    #[default]
    None,
    /// Text is flowed into the layout's wrap shapes, in order.
    ShapeInside,
    /// Lines wrap at the given inline size around the text origin.
    InlineSize(f64),
}

/// How cursor stops inside a ligature are positioned.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum LigatureCursorPolicy {
    /// The ligature's advance is divided equally between its cursor stops.
    #[default]
    Subdivide,
    /// Every stop inside a ligature sits at its start.
    Collapse,
}

/// Options controlling a [`Layout`] calculation.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutOptions {
    /// Line wrapping mode.
    pub wrap_mode: WrapMode,
    /// Placement of cursor stops inside ligatures.
    pub ligature_cursor: LigatureCursorPolicy,
    /// Whether text that does not fit the wrap shapes is laid out on hidden
    /// lines, or dropped.
    pub emit_hidden_lines: bool,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            wrap_mode: WrapMode::None,
            ligature_cursor: LigatureCursorPolicy::Subdivide,
            emit_hidden_lines: true,
        }
    }
}

/// A text layout.
///
/// Input is appended as styled runs and control codes, then laid out with
/// [`calculate`](Self::calculate). Output tables stay valid until the next
/// calculation or [`clear`](Self::clear).
#[derive(Clone, Debug, Default)]
pub struct Layout {
    input: Vec<InputItem>,
    wrap_shapes: Vec<WrapShape>,
    exclusions: Vec<WrapShape>,
    options: LayoutOptions,
    pub(crate) data: LayoutData,
    generation: u64,
}

impl Layout {
    /// Creates an empty layout.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a run of text. Its source identifier is its index in the
    /// input stream.
    pub fn append_text(
        &mut self,
        text: impl Into<String>,
        style: TextStyle,
        positions: PositionAttrs,
    ) {
        let source = SourceId(self.input.len() as u64);
        self.append_run(StyledTextRun {
            source,
            text: text.into(),
            style,
            positions,
        });
    }

    /// Appends a run of text with an explicit source identifier.
    pub fn append_run(&mut self, run: StyledTextRun) {
        self.input.push(InputItem::Text(run));
    }

    /// Appends a paragraph or shape break.
    pub fn append_control_code(&mut self, code: ControlCode) {
        self.input.push(InputItem::Control(code));
    }

    /// Appends a shape to flow text into. Shapes are filled in the order
    /// they are appended.
    pub fn append_wrap_shape(&mut self, shape: WrapShape) {
        self.wrap_shapes.push(shape);
    }

    /// Appends a shape text must flow around.
    pub fn append_exclusion(&mut self, shape: WrapShape) {
        self.exclusions.push(shape);
    }

    /// Removes all input, shapes and output. Options are kept.
    pub fn clear(&mut self) {
        self.input.clear();
        self.wrap_shapes.clear();
        self.exclusions.clear();
        self.data = LayoutData::default();
        self.generation += 1;
    }

    /// The options used by the next calculation.
    pub fn options(&self) -> &LayoutOptions {
        &self.options
    }

    /// Sets the options used by the next calculation.
    pub fn set_options(&mut self, options: LayoutOptions) {
        self.options = options;
    }

    /// The input stream.
    pub fn input(&self) -> &[InputItem] {
        &self.input
    }

    /// The wrap shapes.
    pub fn wrap_shapes(&self) -> &[WrapShape] {
        &self.wrap_shapes
    }

    /// Lays out the input, replacing any previous output.
    ///
    /// Returns `true` if at least one line was produced.
    pub fn calculate<S: Shaper + ?Sized>(&mut self, shaper: &mut S) -> bool {
        let calculator = Calculator::new(
            &self.input,
            &self.wrap_shapes,
            &self.exclusions,
            &self.options,
            shaper,
        );
        self.data = calculator.calculate();
        self.generation += 1;
        log::debug!(
            "layout generation {}: {} paragraphs, {} lines, {} glyphs",
            self.generation,
            self.data.paragraphs.len(),
            self.data.lines.len(),
            self.data.glyphs.len()
        );
        !self.data.lines.is_empty()
    }

    /// Counter incremented by every calculation. Positions from another
    /// generation are rejected.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Paragraphs, in order.
    pub fn paragraphs(&self) -> &[Paragraph] {
        &self.data.paragraphs
    }

    /// Lines, in order.
    pub fn lines(&self) -> &[Line] {
        &self.data.lines
    }

    /// Chunks, in logical order within each line.
    pub fn chunks(&self) -> &[Chunk] {
        &self.data.chunks
    }

    /// Spans, in logical order within each chunk.
    pub fn spans(&self) -> &[Span] {
        &self.data.spans
    }

    /// Characters, in logical order.
    pub fn characters(&self) -> &[Character] {
        &self.data.characters
    }

    /// Glyphs, in visual order within each line.
    pub fn glyphs(&self) -> &[Glyph] {
        &self.data.glyphs
    }

    /// Logical indices of the characters of `line`, left to right.
    pub fn line_visual_order(&self, line: usize) -> &[usize] {
        let Some(line) = self.data.lines.get(line) else {
            return &[];
        };
        &self.data.visual_chars[line.visual_range.clone()]
    }

    /// The glyph drawn for a character. Characters inside a ligature map to
    /// the ligature glyph.
    pub fn char_to_glyph(&self, char_index: usize) -> Option<usize> {
        self.data.characters.get(char_index)?.glyph
    }

    /// Returns `true` if some input did not fit the wrap shapes.
    pub fn input_truncated(&self) -> bool {
        self.data.input_truncated
    }

    /// The union of the boxes of all visible glyphs, in document
    /// coordinates.
    pub fn bounding_box(&self) -> Option<Rect> {
        let axes = Axes::new(self.data.writing_mode);
        self.data
            .glyphs
            .iter()
            .filter(|glyph| !glyph.hidden)
            .map(|glyph| {
                let metrics = &self.data.spans[glyph.span].line_height;
                let p0 = axes.to_document(glyph.inline, glyph.block - metrics.ascent);
                let p1 = axes.to_document(
                    glyph.inline + glyph.advance,
                    glyph.block + metrics.descent,
                );
                Rect::from_points(p0, p1)
            })
            .reduce(|a, b| a.union(b))
    }

    pub(crate) fn axes(&self) -> Axes {
        Axes::new(self.data.writing_mode)
    }

    pub(crate) fn to_document(&self, inline: f64, block: f64) -> Point {
        self.axes().to_document(inline, block)
    }
}
