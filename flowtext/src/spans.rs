// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Unbroken spans: runs of constant style that have not been wrapped yet.

use core::ops::Range;

use crate::flow::Axes;
use crate::input::{CharPosition, InputItem};
use crate::itemize::ParagraphInfo;
use crate::shape::{FontMetrics, GlyphOrientation, ShapeRequest, ShapedGlyph, Shaper};
use crate::style::TextStyle;

/// A character of an unbroken span and the glyphs it owns.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SpanChar {
    pub(crate) ch: char,
    /// Byte offset within the paragraph text.
    pub(crate) byte: usize,
    /// Glyphs whose cluster starts at this character. Empty for characters
    /// inside a ligature or otherwise merged into a preceding cluster.
    pub(crate) glyphs: Range<usize>,
    /// Span-local index of the first character of this character's cluster.
    pub(crate) cluster_start: usize,
}

/// A maximal run of text with constant style and at most one positional
/// attribute change, at its start.
#[derive(Clone, Debug)]
pub(crate) struct UnbrokenSpan {
    /// The item this span was shaped with; `None` for style-only spans.
    pub(crate) item_index: Option<usize>,
    /// Index into the layout's input stream.
    pub(crate) input_index: usize,
    /// Byte offset of the span start within its input run's text.
    pub(crate) input_byte_start: usize,
    pub(crate) text_range: Range<usize>,
    pub(crate) char_index_in_para: usize,
    pub(crate) chars: Vec<SpanChar>,
    /// Glyphs in logical order, in document units.
    pub(crate) glyphs: Vec<ShapedGlyph>,
    pub(crate) font_size: f64,
    /// The font's own box. Not the CSS `line-height`.
    pub(crate) line_height: FontMetrics,
    pub(crate) line_height_multiplier: f64,
    pub(crate) baseline_shift: f64,
    pub(crate) orientation: GlyphOrientation,
    pub(crate) bidi_level: u8,
    pub(crate) letter_spacing: f64,
    pub(crate) word_spacing: f64,
    // Re-oriented so that x is on the inline axis and y on the block axis.
    pub(crate) x: Option<f64>,
    pub(crate) y: Option<f64>,
    pub(crate) dx: Option<f64>,
    pub(crate) dy: Option<f64>,
    pub(crate) rotate: Option<f64>,
}

impl UnbrokenSpan {
    pub(crate) fn is_rtl(&self) -> bool {
        self.bidi_level & 1 == 1
    }

    pub(crate) fn is_style_only(&self) -> bool {
        self.item_index.is_none()
    }

    /// Byte offset of a character within its input run's text.
    pub(crate) fn source_byte(&self, char_index: usize) -> usize {
        self.input_byte_start + self.chars[char_index].byte - self.text_range.start
    }

    /// The line box this span needs, with its line height applied.
    pub(crate) fn effective_line_height(&self) -> FontMetrics {
        let mut metrics = self.line_height;
        metrics.compute_effective(self.line_height_multiplier);
        metrics
    }

    pub(crate) fn is_cluster_start(&self, char_index: usize) -> bool {
        self.chars
            .get(char_index)
            .is_some_and(|c| c.cluster_start == char_index)
    }

    /// Sum of the advances of the glyphs owned by a character.
    pub(crate) fn glyph_advance(&self, char_index: usize) -> f64 {
        self.glyphs[self.chars[char_index].glyphs.clone()]
            .iter()
            .map(|glyph| glyph.advance)
            .sum()
    }

    /// Span-local range of the characters in the cluster starting at
    /// `char_index`.
    pub(crate) fn cluster_chars(&self, char_index: usize) -> Range<usize> {
        let end = (char_index + 1..self.chars.len())
            .find(|&i| self.chars[i].cluster_start == i)
            .unwrap_or(self.chars.len());
        char_index..end
    }
}

/// A position within a paragraph's unbroken spans, at character granularity.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) struct UnbrokenSpanPosition {
    pub(crate) span: usize,
    pub(crate) char_index: usize,
}

impl UnbrokenSpanPosition {
    /// Moves to the next character, rolling over into the next span.
    pub(crate) fn increment(&mut self, spans: &[UnbrokenSpan]) {
        self.char_index += 1;
        if self.char_index >= spans[self.span].chars.len() {
            self.span += 1;
            self.char_index = 0;
        }
    }

    pub(crate) fn is_end(&self, spans: &[UnbrokenSpan]) -> bool {
        self.span >= spans.len()
    }

    pub(crate) fn is_span_start(&self) -> bool {
        self.char_index == 0
    }

    /// Index of the character at this position within the paragraph.
    pub(crate) fn char_index_in_para(&self, para: &ParagraphInfo) -> usize {
        para.unbroken_spans
            .get(self.span)
            .map_or(para.char_count(), |span| {
                span.char_index_in_para + self.char_index
            })
    }
}

impl ParagraphInfo {
    /// Builds the unbroken spans of an itemized paragraph.
    pub(crate) fn build_spans<S: Shaper + ?Sized>(
        &mut self,
        input: &[InputItem],
        axes: Axes,
        shaper: &mut S,
    ) {
        let scale = 1.0 / shaper.units_per_pixel();
        let mut spans = Vec::new();
        for (input_item, info) in self.input_items.iter().enumerate() {
            let Some(run) = input[info.input_index].as_text() else {
                continue;
            };
            let builder = SpanBuilder {
                para: self,
                style: &run.style,
                input_item,
                input_index: info.input_index,
                input_text_start: info.text_range.start,
                axes,
                scale,
            };
            if info.text_range.is_empty() {
                spans.push(builder.style_only(shaper));
                continue;
            }

            let mut span_start: Option<(usize, usize, CharPosition)> = None;
            let mut char_index = info.char_start;
            // The last rotation given holds for the rest of the run.
            let mut rotate = None;
            for (local_index, (offset, _)) in run.text.char_indices().enumerate() {
                let byte = info.text_range.start + offset;
                let mut position = run.positions.for_char(local_index);
                let item = self.item_at(char_index);
                let starts_span = match span_start {
                    None => true,
                    Some((_, start_char, _)) => {
                        position.is_set() || self.item_at(start_char) != item
                    }
                };
                rotate = position.rotate.or(rotate);
                position.rotate = rotate;
                if starts_span {
                    if let Some((start_byte, start_char, start_position)) = span_start {
                        spans.push(builder.shaped(
                            start_byte..byte,
                            start_char,
                            start_position,
                            shaper,
                        ));
                    }
                    span_start = Some((byte, char_index, position));
                }
                char_index += 1;
            }
            if let Some((start_byte, start_char, start_position)) = span_start {
                spans.push(builder.shaped(
                    start_byte..info.text_range.end,
                    start_char,
                    start_position,
                    shaper,
                ));
            }
        }
        debug_assert!(
            spans_conserve_text(&spans, &self.text),
            "unbroken spans must reconstruct the paragraph text"
        );
        self.unbroken_spans = spans;
    }
}

/// Returns `true` if the spans tile the paragraph text exactly.
pub(crate) fn spans_conserve_text(spans: &[UnbrokenSpan], text: &str) -> bool {
    let mut end = 0;
    let mut chars = 0;
    for span in spans {
        if span.text_range.start != end || span.char_index_in_para != chars {
            return false;
        }
        end = span.text_range.end;
        chars += span.chars.len();
    }
    end == text.len() && chars == text.chars().count()
}

struct SpanBuilder<'a> {
    para: &'a ParagraphInfo,
    style: &'a TextStyle,
    input_item: usize,
    input_index: usize,
    input_text_start: usize,
    axes: Axes,
    scale: f64,
}

impl SpanBuilder<'_> {
    fn empty_span(&self, text_start: usize, char_index_in_para: usize) -> UnbrokenSpan {
        UnbrokenSpan {
            item_index: None,
            input_index: self.input_index,
            input_byte_start: text_start - self.input_text_start,
            text_range: text_start..text_start,
            char_index_in_para,
            chars: Vec::new(),
            glyphs: Vec::new(),
            font_size: self.style.font_size,
            line_height: FontMetrics::default(),
            line_height_multiplier: self.style.line_height_multiplier(),
            baseline_shift: self.style.resolved_baseline_shift(),
            orientation: GlyphOrientation::Horizontal,
            bidi_level: 0,
            letter_spacing: self.style.letter_spacing,
            word_spacing: self.style.word_spacing,
            x: None,
            y: None,
            dx: None,
            dy: None,
            rotate: None,
        }
    }

    fn style_only<S: Shaper + ?Sized>(&self, shaper: &mut S) -> UnbrokenSpan {
        let start = self.para.input_items[self.input_item].text_range.start;
        let char_index = self.para.input_items[self.input_item].char_start;
        let mut span = self.empty_span(start, char_index);
        if let Some(font) = shaper.select_font(self.style, ' ') {
            span.line_height = shaper
                .metrics(font, self.style.font_size)
                .scaled(self.scale);
        }
        span
    }

    fn shaped<S: Shaper + ?Sized>(
        &self,
        text_range: Range<usize>,
        char_index_in_para: usize,
        position: CharPosition,
        shaper: &mut S,
    ) -> UnbrokenSpan {
        let mut span = self.empty_span(text_range.start, char_index_in_para);
        span.text_range = text_range.clone();
        let position = self.axes.reorient(position);
        span.x = position.x;
        span.y = position.y;
        span.dx = position.dx;
        span.dy = position.dy;
        span.rotate = position.rotate;

        let Some(item_index) = self.para.item_at(char_index_in_para) else {
            return span;
        };
        let item = &self.para.items[item_index];
        span.item_index = Some(item_index);
        span.bidi_level = item.bidi_level;
        span.orientation = item.orientation;
        span.line_height = shaper
            .metrics(item.font, self.style.font_size)
            .scaled(self.scale);

        let text = &self.para.text[text_range.clone()];
        let request = ShapeRequest {
            text,
            font: item.font,
            font_size: self.style.font_size,
            script: item.script,
            bidi_level: item.bidi_level,
            language: &item.language,
            letter_spacing: self.style.letter_spacing,
            word_spacing: self.style.word_spacing,
            ligatures: self.style.ligatures,
            orientation: item.orientation,
        };
        let mut glyphs = shaper.shape(&request);
        glyphs.sort_by_key(|glyph| glyph.cluster);
        for glyph in &mut glyphs {
            glyph.advance *= self.scale;
            glyph.x_offset *= self.scale;
            glyph.y_offset *= self.scale;
        }

        let offsets: Vec<usize> = text.char_indices().map(|(offset, _)| offset).collect();
        let mut chars: Vec<SpanChar> = text
            .char_indices()
            .map(|(offset, ch)| SpanChar {
                ch,
                byte: text_range.start + offset,
                glyphs: 0..0,
                cluster_start: 0,
            })
            .collect();
        let mut owner_of_glyph = Vec::with_capacity(glyphs.len());
        for glyph in &glyphs {
            let cluster = glyph.cluster as usize;
            let owner = offsets
                .partition_point(|&offset| offset <= cluster)
                .saturating_sub(1);
            owner_of_glyph.push(owner);
        }
        let mut next_glyph = 0;
        for (index, c) in chars.iter_mut().enumerate() {
            let start = next_glyph;
            while next_glyph < owner_of_glyph.len() && owner_of_glyph[next_glyph] <= index {
                next_glyph += 1;
            }
            c.glyphs = start..next_glyph;
        }
        let mut cluster_start = 0;
        for index in 0..chars.len() {
            if index == 0 || !chars[index].glyphs.is_empty() {
                cluster_start = index;
            }
            chars[index].cluster_start = cluster_start;
        }
        span.chars = chars;
        span.glyphs = glyphs;
        span
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::{PositionAttrs, StyledTextRun};
    use crate::style::WritingMode;
    use crate::{FixedAdvanceShaper, SourceId};

    fn run(text: &str, positions: PositionAttrs) -> InputItem {
        InputItem::Text(StyledTextRun {
            source: SourceId(0),
            text: text.into(),
            style: TextStyle::default().with_font_size(10.0),
            positions,
        })
    }

    fn paragraph(input: &[InputItem], shaper: &mut FixedAdvanceShaper) -> ParagraphInfo {
        let mut para = ParagraphInfo::new(input, 0..input.len(), &TextStyle::default());
        para.itemize(input, WritingMode::HorizontalTb, shaper);
        para.build_spans(input, Axes::new(WritingMode::HorizontalTb), shaper);
        para
    }

    #[test]
    fn positional_attributes_start_spans() {
        let mut shaper = FixedAdvanceShaper::new();
        let input = [run(
            "abcdef",
            PositionAttrs {
                dx: vec![1.0, 0.0],
                rotate: vec![],
                x: vec![],
                y: vec![],
                dy: vec![],
            },
        )];
        let para = paragraph(&input, &mut shaper);
        let ranges: Vec<_> = para
            .unbroken_spans
            .iter()
            .map(|span| span.text_range.clone())
            .collect();
        // Only characters with a value start a span.
        assert_eq!(ranges, vec![0..1, 1..6]);
        assert_eq!(para.unbroken_spans[0].dx, Some(1.0));
        assert_eq!(para.unbroken_spans[1].dx, Some(0.0));
        assert!(spans_conserve_text(&para.unbroken_spans, &para.text));
    }

    #[test]
    fn rotation_carries_across_item_boundaries() {
        let mut shaper = FixedAdvanceShaper::new();
        let input = [run(
            "ab\u{6F22}\u{5B57}",
            PositionAttrs {
                rotate: vec![10.0],
                ..PositionAttrs::default()
            },
        )];
        let para = paragraph(&input, &mut shaper);
        assert_eq!(para.unbroken_spans.len(), 2);
        assert_eq!(para.unbroken_spans[1].text_range.start, 2);
        let rotations: Vec<_> = para.unbroken_spans.iter().map(|span| span.rotate).collect();
        assert_eq!(rotations, vec![Some(10.0), Some(10.0)]);
    }

    #[test]
    fn style_only_runs_keep_a_span() {
        let mut shaper = FixedAdvanceShaper::new();
        let input = [
            run("ab", PositionAttrs::default()),
            run("", PositionAttrs::default()),
            run("cd", PositionAttrs::default()),
        ];
        let para = paragraph(&input, &mut shaper);
        assert_eq!(para.unbroken_spans.len(), 3);
        assert!(para.unbroken_spans[1].is_style_only());
        assert_eq!(para.unbroken_spans[1].text_range, 2..2);
        assert_eq!(para.unbroken_spans[2].char_index_in_para, 2);
    }

    #[test]
    fn ligature_characters_share_a_cluster() {
        let mut shaper = FixedAdvanceShaper::new().with_common_ligatures();
        let input = [run("affib", PositionAttrs::default())];
        let para = paragraph(&input, &mut shaper);
        let span = &para.unbroken_spans[0];
        let starts: Vec<_> = span.chars.iter().map(|c| c.cluster_start).collect();
        assert_eq!(starts, vec![0, 1, 1, 1, 4]);
        assert_eq!(span.cluster_chars(1), 1..4);
        assert_eq!(span.glyph_advance(1), 15.0);
        assert_eq!(span.glyph_advance(2), 0.0);
    }

    #[test]
    fn position_increments_across_spans() {
        let mut shaper = FixedAdvanceShaper::new();
        let input = [
            run("a", PositionAttrs::default()),
            run("", PositionAttrs::default()),
            run("b", PositionAttrs::default()),
        ];
        let para = paragraph(&input, &mut shaper);
        let spans = &para.unbroken_spans;
        let mut position = UnbrokenSpanPosition::default();
        position.increment(spans);
        assert_eq!((position.span, position.char_index), (1, 0));
        position.increment(spans);
        assert_eq!((position.span, position.char_index), (2, 0));
        assert_eq!(position.char_index_in_para(&para), 1);
        position.increment(spans);
        assert!(position.is_end(spans));
        assert_eq!(position.char_index_in_para(&para), 2);
    }
}
