// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Turning the chunks of a line into output records.

use super::alignment::chunk_left_with_alignment;
use super::calculator::{is_mandatory_break_at, Calculator};
use super::data::{Character, Chunk, Glyph, Line, Span};
use super::measure::{char_width, BrokenSpan, ChunkInfo};
use super::LigatureCursorPolicy;
use crate::bidi::reorder_visual;
use crate::itemize::ParagraphInfo;
use crate::shape::{FontMetrics, GlyphOrientation, Shaper};
use crate::spans::UnbrokenSpanPosition;

/// Glyphs and characters of one span, left to right.
#[derive(Default)]
struct VisualRun {
    glyphs: Vec<Glyph>,
    chars: Vec<usize>,
}

impl<S: Shaper + ?Sized> Calculator<'_, S> {
    /// Appends a finished line to the output.
    ///
    /// `explicit_y_span` is the span whose `y` attribute positioned the
    /// line; any other `y` on the line moves text off the baseline instead.
    pub(super) fn output_line(
        &mut self,
        para: &ParagraphInfo,
        paragraph_index: usize,
        chunks: &[ChunkInfo],
        line_height: &FontMetrics,
        height_retries: u32,
        explicit_y_span: Option<usize>,
    ) {
        let spans = &para.unbroken_spans;
        let baseline = self.scanline_maker.baseline_y(line_height);
        let line_index = self.out.lines.len();
        let chunk_start = self.out.chunks.len();
        let char_start = self.out.characters.len();

        // Only the chunk that reaches the paragraph end or a forced break
        // escapes justification.
        let ends_paragraph = |end: UnbrokenSpanPosition| {
            end.is_end(spans) || is_mandatory_break_at(para, end)
        };
        let line_ends_paragraph = chunks
            .iter()
            .rev()
            .find_map(|chunk| chunk.broken_spans.last())
            .is_none_or(|span| ends_paragraph(span.end));

        let mut placed_chunks: Vec<(f64, VisualRun)> = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let last_in_paragraph = chunk
                .broken_spans
                .last()
                .map_or(line_ends_paragraph, |span| ends_paragraph(span.end));
            let mut placement = chunk_left_with_alignment(
                chunk,
                para.alignment,
                para.direction,
                last_in_paragraph,
            );
            let chunk_index = self.out.chunks.len();
            let span_start = self.out.spans.len();

            let text_spans: Vec<&BrokenSpan> = chunk
                .broken_spans
                .iter()
                .filter(|span| !spans[span.start.span].is_style_only())
                .collect();
            // The chunk's trailing white space is not widened by justification.
            let trailing_whitespace = text_spans
                .last()
                .is_some_and(|span| span.ends_with_whitespace);
            let widened = |index: usize, span: &BrokenSpan| {
                let trimmed = trailing_whitespace && index + 1 == text_spans.len();
                span.whitespace_count - usize::from(trimmed)
            };

            let levels: Vec<u8> = text_spans
                .iter()
                .map(|span| spans[span.start.span].bidi_level)
                .collect();
            let order = reorder_visual(&levels);
            // Trimmed space at the end of right-to-left text is drawn on the
            // left, so it hangs outside the aligned box there.
            let hangs_left = text_spans
                .last()
                .is_some_and(|span| spans[span.start.span].is_rtl())
                && order.first() == Some(&(text_spans.len() - 1));
            if hangs_left {
                placement.left -= chunk.trimmed_width;
            }
            let mut lefts = vec![0.0; text_spans.len()];
            let mut x = placement.left;
            for &index in &order {
                let span = text_spans[index];
                lefts[index] = x;
                x += span.width + widened(index, span) as f64 * placement.add_to_each_whitespace;
            }

            let mut runs: Vec<VisualRun> = Vec::with_capacity(text_spans.len());
            for (index, span) in text_spans.iter().enumerate() {
                let widen_trailing = !(trailing_whitespace && index + 1 == text_spans.len());
                runs.push(self.output_span(
                    para,
                    span,
                    SpanPlacement {
                        left: lefts[index],
                        add_to_each_whitespace: placement.add_to_each_whitespace,
                        widen_trailing,
                        baseline,
                        chunk_index,
                        line_index,
                        explicit_y_span,
                    },
                ));
            }
            let mut visual = VisualRun::default();
            for index in order {
                let run = core::mem::take(&mut runs[index]);
                visual.glyphs.extend(run.glyphs);
                visual.chars.extend(run.chars);
            }

            self.out.chunks.push(Chunk {
                line: line_index,
                left: placement.left,
                text_width: chunk.text_width,
                available_width: chunk.scanrun_width,
                spans: span_start..self.out.spans.len(),
            });
            placed_chunks.push((placement.left, visual));
        }

        // Chunks of a right-to-left paragraph are in logical order.
        placed_chunks.sort_by(|a, b| a.0.total_cmp(&b.0));
        let glyph_start = self.out.glyphs.len();
        let visual_start = self.out.visual_chars.len();
        for (_, run) in placed_chunks {
            for glyph in run.glyphs {
                let glyph_index = self.out.glyphs.len();
                for character in &mut self.out.characters[glyph.cluster.clone()] {
                    character.glyph.get_or_insert(glyph_index);
                }
                self.out.glyphs.push(glyph);
            }
            self.out.visual_chars.extend(run.chars);
        }

        log::debug!(
            "line {line_index}: baseline {baseline:.3}, {} chunks, hidden {}",
            chunks.len(),
            self.hidden
        );
        if height_retries > 0 {
            log::trace!("line {line_index} settled after {height_retries} height retries");
        }
        self.out.lines.push(Line {
            paragraph: paragraph_index,
            baseline,
            ascent: line_height.ascent,
            descent: line_height.descent,
            hidden: self.hidden,
            shape_index: self.current_shape.filter(|_| !self.hidden),
            chunks: chunk_start..self.out.chunks.len(),
            char_range: char_start..self.out.characters.len(),
            glyph_range: glyph_start..self.out.glyphs.len(),
            visual_range: visual_start..self.out.visual_chars.len(),
            height_retries,
        });
    }

    fn output_span(
        &mut self,
        para: &ParagraphInfo,
        broken: &BrokenSpan,
        placement: SpanPlacement,
    ) -> VisualRun {
        let unbroken = &para.unbroken_spans[broken.start.span];
        let span_index = self.out.spans.len();
        let char_range = broken.char_range(&para.unbroken_spans);
        let char_base = self.out.characters.len();
        let global = |local: usize| char_base + local - char_range.start;
        let attrs_at = |local: usize| para.char_attributes[unbroken.char_index_in_para + local];

        let mut dx = 0.0;
        if broken.start.is_span_start() {
            if let Some(y) = unbroken.y {
                if !self.flowed && placement.explicit_y_span != Some(broken.start.span) {
                    self.y_offset = y - placement.baseline;
                }
            }
            if let Some(dy) = unbroken.dy {
                self.y_offset += dy;
            }
            dx = unbroken.dx.unwrap_or(0.0);
        }
        let block = placement.baseline - unbroken.baseline_shift + self.y_offset;
        let rtl = unbroken.is_rtl();
        let mut rotation = unbroken.rotate.unwrap_or(0.0);
        if unbroken.orientation == GlyphOrientation::Sideways {
            rotation += 90.0;
        }

        let last_char = char_range.end.saturating_sub(1);
        let widths: Vec<f64> = char_range
            .clone()
            .map(|index| {
                let attrs = attrs_at(index);
                let mut width = char_width(unbroken, index, attrs);
                if attrs.is_white() && (placement.widen_trailing || index != last_char) {
                    width += placement.add_to_each_whitespace;
                }
                width
            })
            .collect();
        let content_width: f64 = widths.iter().sum();
        let origin = placement.left + dx;
        let mut cursor = if rtl { origin + content_width } else { origin };

        let mut clusters: Vec<VisualRun> = Vec::new();
        let mut index = char_range.start;
        while index < char_range.end {
            let cluster = unbroken.cluster_chars(index);
            let cluster_end = cluster.end.min(char_range.end);
            let cluster_widths = index - char_range.start..cluster_end - char_range.start;
            let cluster_width: f64 = widths[cluster_widths].iter().sum();
            let cluster_left = if rtl { cursor - cluster_width } else { cursor };

            let shaped = &unbroken.glyphs[unbroken.chars[index].glyphs.clone()];
            let glyph_advance: f64 = shaped.iter().map(|glyph| glyph.advance).sum();
            // Spacing sits after the glyphs in the writing direction.
            let mut pen = if rtl {
                cluster_left + cluster_width - glyph_advance
            } else {
                cluster_left
            };
            let mut run = VisualRun::default();
            for glyph in shaped {
                let inline = pen + glyph.x_offset;
                let glyph_block = block + glyph.y_offset;
                run.glyphs.push(Glyph {
                    glyph_id: glyph.glyph_id,
                    position: self.axes.to_document(inline, glyph_block),
                    inline,
                    block: glyph_block,
                    advance: glyph.advance,
                    rotation,
                    character: global(index),
                    cluster: global(index)..global(cluster_end),
                    span: span_index,
                    orientation: unbroken.orientation,
                    hidden: self.hidden,
                });
                pen += glyph.advance;
            }

            let is_stop = |local: usize| local == index || attrs_at(local).is_cursor_position();
            let stops = (index..cluster_end)
                .filter(|&local| is_stop(local))
                .count()
                .max(1);
            let step = cluster_width / stops as f64;
            let mut stop = 0;
            for local in index..cluster_end {
                let starts_stop = is_stop(local);
                if local > index && starts_stop {
                    stop += 1;
                }
                let (offset, advance) = match self.options.ligature_cursor {
                    LigatureCursorPolicy::Subdivide => {
                        (stop as f64 * step, if starts_stop { step } else { 0.0 })
                    }
                    LigatureCursorPolicy::Collapse => {
                        (0.0, if local == index { cluster_width } else { 0.0 })
                    }
                };
                let span_char = &unbroken.chars[local];
                self.out.characters.push(Character {
                    ch: span_char.ch,
                    span: span_index,
                    line: placement.line_index,
                    glyph: None,
                    inline: if rtl {
                        cluster_left + cluster_width - offset
                    } else {
                        cluster_left + offset
                    },
                    block,
                    advance,
                    rtl,
                    attributes: attrs_at(local),
                    input_index: unbroken.input_index,
                    source_byte: unbroken.source_byte(local),
                });
                run.chars.push(global(local));
            }
            if rtl {
                run.chars.reverse();
            }
            clusters.push(run);

            cursor = if rtl {
                cluster_left
            } else {
                cluster_left + cluster_width
            };
            index = cluster_end;
        }

        let source = self.input[unbroken.input_index]
            .as_text()
            .map(|run| run.source)
            .unwrap_or_default();
        self.out.spans.push(Span {
            chunk: placement.chunk_index,
            input_index: unbroken.input_index,
            source,
            font_size: unbroken.font_size,
            line_height: unbroken.line_height,
            baseline_shift: unbroken.baseline_shift,
            block_offset: self.y_offset,
            bidi_level: unbroken.bidi_level,
            orientation: unbroken.orientation,
            x_start: placement.left,
            x_end: origin + content_width,
            char_range: char_base..self.out.characters.len(),
        });

        if rtl {
            clusters.reverse();
        }
        let mut visual = VisualRun::default();
        for run in clusters {
            visual.glyphs.extend(run.glyphs);
            visual.chars.extend(run.chars);
        }
        visual
    }
}

#[derive(Copy, Clone)]
struct SpanPlacement {
    left: f64,
    add_to_each_whitespace: f64,
    widen_trailing: bool,
    baseline: f64,
    chunk_index: usize,
    line_index: usize,
    explicit_y_span: Option<usize>,
}
