// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Measuring spans and filling scan runs with chunks.

use smallvec::SmallVec;

use super::calculator::{is_mandatory_break_at, Calculator};
use crate::analysis::CharAttributes;
use crate::flow::ScanRun;
use crate::itemize::ParagraphInfo;
use crate::shape::{FontMetrics, Shaper};
use crate::spans::{UnbrokenSpan, UnbrokenSpanPosition};
use crate::util::HEIGHT_EPSILON;

/// The part of an unbroken span that lies on one line.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(super) struct BrokenSpan {
    pub(super) start: UnbrokenSpanPosition,
    pub(super) end: UnbrokenSpanPosition,
    pub(super) start_glyph_index: usize,
    pub(super) end_glyph_index: usize,
    /// Includes `dx`, letter spacing and word spacing.
    pub(super) width: f64,
    pub(super) whitespace_count: usize,
    pub(super) ends_with_whitespace: bool,
    /// Width of the last white space character measured.
    pub(super) each_whitespace_width: f64,
    pub(super) letter_spacing: f64,
    pub(super) word_spacing: f64,
}

impl BrokenSpan {
    pub(super) fn empty_at(position: UnbrokenSpanPosition) -> Self {
        Self {
            start: position,
            end: position,
            ..Self::default()
        }
    }

    fn set_zero(&mut self) {
        *self = Self::empty_at(self.start);
    }

    /// Span-local range of the characters covered.
    pub(super) fn char_range(&self, spans: &[UnbrokenSpan]) -> core::ops::Range<usize> {
        let end = if self.end.span == self.start.span {
            self.end.char_index
        } else {
            spans
                .get(self.start.span)
                .map_or(0, |span| span.chars.len())
        };
        self.start.char_index..end
    }
}

/// The contents of one scan run, or the part of it up to an explicit `x`.
#[derive(Clone, Debug)]
pub(super) struct ChunkInfo {
    pub(super) broken_spans: SmallVec<[BrokenSpan; 4]>,
    pub(super) scanrun_width: f64,
    pub(super) text_width: f64,
    /// Left edge before alignment.
    pub(super) x: f64,
    pub(super) whitespace_count: usize,
    /// Width excluded from `text_width` at the end of the chunk.
    pub(super) trimmed_width: f64,
}

/// Width a character occupies on the line.
pub(super) fn char_width(span: &UnbrokenSpan, char_index: usize, attrs: CharAttributes) -> f64 {
    let mut width = span.glyph_advance(char_index);
    if attrs.is_cursor_position() {
        width += span.letter_spacing;
    }
    if attrs.is_white() {
        width += span.word_spacing;
    }
    width
}

impl<S: Shaper + ?Sized> Calculator<'_, S> {
    /// Measures from `span.start` forward until the end of its unbroken span,
    /// a mandatory break, or until the width exceeds `maximum_width`.
    ///
    /// Records break opportunities in `last_break` and `last_emergency_break`
    /// as they are passed. Returns `false` if measuring stopped early.
    pub(super) fn measure_unbroken_span(
        &self,
        para: &ParagraphInfo,
        span: &mut BrokenSpan,
        last_break: &mut BrokenSpan,
        last_emergency_break: &mut BrokenSpan,
        maximum_width: f64,
    ) -> bool {
        span.set_zero();
        let spans = &para.unbroken_spans;
        let unbroken = &spans[span.start.span];

        if span.start.is_span_start() {
            if let Some(dx) = unbroken.dx {
                span.width += dx;
            }
        }
        if unbroken.is_style_only() {
            span.end.span += 1;
            span.end.char_index = 0;
            return true;
        }

        span.start_glyph_index = unbroken.chars[span.start.char_index].glyphs.start;
        span.end_glyph_index = span.start_glyph_index;
        span.letter_spacing = unbroken.letter_spacing;
        span.word_spacing = unbroken.word_spacing;

        loop {
            let char_index = span.end.char_index;
            let attrs = para.char_attributes[unbroken.char_index_in_para + char_index];

            if attrs.is_mandatory_break() && span.end != span.start {
                *last_emergency_break = *span;
                *last_break = *span;
                return false;
            }
            if unbroken.is_cluster_start(char_index) {
                if attrs.is_line_break() {
                    *last_emergency_break = *span;
                    *last_break = *span;
                } else if attrs.is_char_break() {
                    *last_emergency_break = *span;
                }
            }

            let width = char_width(unbroken, char_index, attrs);
            span.width += width;
            let glyph_end = unbroken.chars[char_index].glyphs.end;
            span.end_glyph_index = glyph_end.max(span.end_glyph_index);
            if attrs.is_white() {
                span.whitespace_count += 1;
                span.each_whitespace_width = width;
            }
            span.ends_with_whitespace = attrs.is_white();

            span.end.increment(spans);

            // Trailing letter spacing does not count against the line.
            let test_width = span.width - unbroken.letter_spacing;
            if test_width > maximum_width && !attrs.is_white() {
                return false;
            }
            if span.end.span != span.start.span {
                return true;
            }
        }
    }

    /// Fills one scan run with chunks of text starting at `start`.
    ///
    /// Returns `false` if a span needs a taller line than `line_height` and
    /// the current scan line cannot grow. `line_height` has been enlarged in
    /// that case and the line must be redone.
    pub(super) fn build_chunks_in_scan_run(
        &self,
        para: &ParagraphInfo,
        start: UnbrokenSpanPosition,
        scan_run: &ScanRun,
        chunks: &mut Vec<ChunkInfo>,
        line_height: &mut FontMetrics,
    ) -> bool {
        let spans = &para.unbroken_spans;
        let first_chunk = chunks.len();
        let mut new_chunk = ChunkInfo {
            broken_spans: SmallVec::new(),
            scanrun_width: scan_run.width(),
            text_width: 0.0,
            x: scan_run.x_start,
            whitespace_count: 0,
            trimmed_width: 0.0,
        };
        let mut last_break = BrokenSpan::empty_at(start);
        let mut last_emergency_break = BrokenSpan::empty_at(start);
        let mut new_span = BrokenSpan::empty_at(start);
        // A forced break ends the line only after it holds some text.
        let start_char = start.char_index_in_para(para);

        while !new_span.end.is_end(spans) {
            new_span.start = new_span.end;
            let unbroken = &spans[new_span.start.span];

            // An explicit x or y starts a new chunk.
            if !self.flowed
                && new_span.start.is_span_start()
                && (unbroken.x.is_some() || unbroken.y.is_some())
            {
                if new_span.start.span != start.span {
                    let next_x = new_chunk.x + new_chunk.text_width;
                    chunks.push(core::mem::replace(
                        &mut new_chunk,
                        ChunkInfo {
                            broken_spans: SmallVec::new(),
                            scanrun_width: scan_run.width(),
                            text_width: 0.0,
                            x: next_x,
                            whitespace_count: 0,
                            trimmed_width: 0.0,
                        },
                    ));
                }
                if let Some(x) = unbroken.x {
                    new_chunk.x = x;
                }
            }

            let span_height = unbroken.effective_line_height();
            if span_height.ascent > line_height.ascent + HEIGHT_EPSILON
                || span_height.descent > line_height.descent + HEIGHT_EPSILON
            {
                line_height.max(&span_height);
                if !self.scanline_maker.can_extend_current_scanline() {
                    return false;
                }
            }

            let fitted = self.measure_unbroken_span(
                para,
                &mut new_span,
                &mut last_break,
                &mut last_emergency_break,
                new_chunk.scanrun_width - new_chunk.text_width,
            );
            new_chunk.text_width += new_span.width;
            new_chunk.whitespace_count += new_span.whitespace_count;
            new_chunk.broken_spans.push(new_span);
            if !fitted {
                break;
            }
            if new_span.end.is_end(spans)
                || (new_span.end.char_index_in_para(para) > start_char
                    && is_mandatory_break_at(para, new_span.end))
            {
                last_break = new_span;
                break;
            }
        }
        chunks.push(new_chunk);

        let overflowed = chunks
            .last()
            .and_then(|chunk| chunk.broken_spans.last())
            .is_some_and(|back| back.end != last_break.end);
        if overflowed {
            if last_break.end == start {
                if last_emergency_break.end != start {
                    last_break = last_emergency_break;
                } else {
                    log::warn!(
                        "no break opportunity fits the available width, forcing one cluster"
                    );
                    last_break = self.force_first_cluster(para, start);
                }
            }
            back_out_to(chunks, first_chunk, &last_break);
        }

        trim_trailing_whitespace(chunks, first_chunk, spans);
        debug_assert!(
            broken_spans_are_contiguous(&chunks[first_chunk..]),
            "broken spans are not contiguous"
        );
        true
    }

    /// A broken span holding exactly the first cluster at or after `start`.
    fn force_first_cluster(&self, para: &ParagraphInfo, start: UnbrokenSpanPosition) -> BrokenSpan {
        let spans = &para.unbroken_spans;
        let mut position = start;
        while !position.is_end(spans) && spans[position.span].is_style_only() {
            position.span += 1;
            position.char_index = 0;
        }
        let mut span = BrokenSpan::empty_at(position);
        let Some(unbroken) = spans.get(position.span) else {
            return span;
        };
        if position.is_span_start() {
            if let Some(dx) = unbroken.dx {
                span.width += dx;
            }
        }
        span.start_glyph_index = unbroken.chars[position.char_index].glyphs.start;
        span.end_glyph_index = span.start_glyph_index;
        span.letter_spacing = unbroken.letter_spacing;
        span.word_spacing = unbroken.word_spacing;
        loop {
            let char_index = span.end.char_index;
            let attrs = para.char_attributes[unbroken.char_index_in_para + char_index];
            let width = char_width(unbroken, char_index, attrs);
            span.width += width;
            let glyph_end = unbroken.chars[char_index].glyphs.end;
            span.end_glyph_index = glyph_end.max(span.end_glyph_index);
            if attrs.is_white() {
                span.whitespace_count += 1;
                span.each_whitespace_width = width;
            }
            span.ends_with_whitespace = attrs.is_white();
            span.end.increment(spans);
            if span.end.span != position.span {
                return span;
            }
            let next = span.end.char_index;
            let next_attrs = para.char_attributes[unbroken.char_index_in_para + next];
            if unbroken.is_cluster_start(next) && next_attrs.is_char_break() {
                return span;
            }
        }
    }
}

/// Removes everything after `last_break` from the chunks added since
/// `first_chunk`.
fn back_out_to(chunks: &mut Vec<ChunkInfo>, first_chunk: usize, last_break: &BrokenSpan) {
    while chunks.len() > first_chunk {
        let Some(chunk) = chunks.last_mut() else {
            break;
        };
        let Some(back) = chunk.broken_spans.last() else {
            chunks.pop();
            continue;
        };
        if back.start.span == last_break.start.span {
            break;
        }
        chunk.text_width -= back.width;
        chunk.whitespace_count -= back.whitespace_count;
        chunk.broken_spans.pop();
    }
    if chunks.len() <= first_chunk {
        return;
    }
    let Some(chunk) = chunks.last_mut() else {
        return;
    };
    if let Some(back) = chunk.broken_spans.pop() {
        chunk.text_width -= back.width;
        chunk.whitespace_count -= back.whitespace_count;
    }
    if last_break.start == last_break.end {
        if chunk.broken_spans.is_empty() {
            chunks.pop();
        }
    } else {
        chunk.broken_spans.push(*last_break);
        chunk.text_width += last_break.width;
        chunk.whitespace_count += last_break.whitespace_count;
    }
}

fn broken_spans_are_contiguous(chunks: &[ChunkInfo]) -> bool {
    let mut spans = chunks.iter().flat_map(|chunk| chunk.broken_spans.iter());
    let Some(mut previous) = spans.next() else {
        return true;
    };
    spans.all(|span| {
        let contiguous = previous.end == span.start;
        previous = span;
        contiguous
    })
}

/// Trailing white space and trailing letter spacing do not take part in
/// alignment.
fn trim_trailing_whitespace(
    chunks: &mut [ChunkInfo],
    first_chunk: usize,
    spans: &[UnbrokenSpan],
) {
    let Some(chunk) = chunks.get_mut(first_chunk..).and_then(<[_]>::last_mut) else {
        return;
    };
    let Some(last) = chunk
        .broken_spans
        .iter()
        .rev()
        .find(|span| !spans[span.start.span].is_style_only())
        .copied()
    else {
        return;
    };
    let mut trimmed = 0.0;
    if last.ends_with_whitespace && chunk.whitespace_count > 0 {
        trimmed += last.each_whitespace_width;
        chunk.whitespace_count -= 1;
    }
    if last.end != last.start {
        trimmed += last.letter_spacing;
    }
    chunk.text_width -= trimmed;
    chunk.trimmed_width = trimmed;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_broken_span_covers_nothing() {
        let position = UnbrokenSpanPosition {
            span: 2,
            char_index: 3,
        };
        let span = BrokenSpan::empty_at(position);
        assert_eq!(span.start, span.end);
        assert_eq!(span.width, 0.0);
        assert_eq!(span.char_range(&[]), 3..3);
    }
}
