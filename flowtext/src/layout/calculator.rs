// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The line-breaking driver.

use core::ops::Range;

use super::data::{LayoutData, Paragraph};
use super::measure::ChunkInfo;
use super::{LayoutOptions, WrapMode};
use crate::flow::{Axes, InfiniteScanlineMaker, ScanlineMaker, ShapeScanlineMaker, WrapShape};
use crate::input::{ControlCode, InputItem};
use crate::itemize::ParagraphInfo;
use crate::shape::{FontMetrics, Shaper};
use crate::spans::UnbrokenSpanPosition;
use crate::style::{ResolvedAlignment, TextStyle};

/// Upper bound on how often one line is re-flowed after its height grew.
///
/// Each retry strictly increases the line box, so this is only reached with
/// pathological metrics.
const MAX_HEIGHT_RETRIES: u32 = 64;

/// State of one layout calculation.
pub(super) struct Calculator<'a, S: ?Sized> {
    pub(super) input: &'a [InputItem],
    pub(super) wrap_shapes: &'a [WrapShape],
    pub(super) exclusions: &'a [WrapShape],
    pub(super) options: &'a LayoutOptions,
    pub(super) shaper: &'a mut S,
    pub(super) root_style: TextStyle,
    pub(super) axes: Axes,
    /// Text is wrapped into a region; `x` and `y` attributes are ignored.
    pub(super) flowed: bool,
    pub(super) scanline_maker: Box<dyn ScanlineMaker>,
    pub(super) current_shape: Option<usize>,
    pub(super) hidden: bool,
    /// Set when the wrap shapes are exhausted and hidden lines are not
    /// wanted.
    pub(super) stopped: bool,
    /// Block offset accumulated from `dy` and non-initial `y` attributes.
    pub(super) y_offset: f64,
    pub(super) out: LayoutData,
}

impl<'a, S: Shaper + ?Sized> Calculator<'a, S> {
    pub(super) fn new(
        input: &'a [InputItem],
        wrap_shapes: &'a [WrapShape],
        exclusions: &'a [WrapShape],
        options: &'a LayoutOptions,
        shaper: &'a mut S,
    ) -> Self {
        let first_run = input.iter().find_map(InputItem::as_text);
        let root_style = first_run.map(|run| run.style.clone()).unwrap_or_default();
        let axes = Axes::new(root_style.writing_mode);
        let origin = first_run
            .map(|run| axes.reorient(run.positions.for_char(0)))
            .unwrap_or_default();
        let (x, baseline) = (origin.x.unwrap_or(0.0), origin.y.unwrap_or(0.0));
        let anchor = root_style.alignment.resolve(root_style.direction);

        let (scanline_maker, flowed, current_shape): (Box<dyn ScanlineMaker>, bool, Option<usize>) =
            match options.wrap_mode {
                WrapMode::ShapeInside if !wrap_shapes.is_empty() => (
                    Box::new(ShapeScanlineMaker::new(&wrap_shapes[0], exclusions, axes)),
                    true,
                    Some(0),
                ),
                WrapMode::InlineSize(size) => (
                    Box::new(InfiniteScanlineMaker::new(x, baseline, Some(size), anchor)),
                    true,
                    None,
                ),
                WrapMode::ShapeInside | WrapMode::None => {
                    if options.wrap_mode == WrapMode::ShapeInside {
                        log::debug!(
                            "shape-inside requested without wrap shapes, text is not flowed"
                        );
                    }
                    (
                        Box::new(InfiniteScanlineMaker::new(x, baseline, None, anchor)),
                        false,
                        None,
                    )
                }
            };

        Self {
            input,
            wrap_shapes,
            exclusions,
            options,
            shaper,
            out: LayoutData {
                writing_mode: root_style.writing_mode,
                ..LayoutData::default()
            },
            root_style,
            axes,
            flowed,
            scanline_maker,
            current_shape,
            hidden: false,
            stopped: false,
            y_offset: 0.0,
        }
    }

    /// Lays out every paragraph of the input.
    pub(super) fn calculate(mut self) -> LayoutData {
        if self.input.is_empty() {
            return self.out;
        }
        let mut start = 0;
        loop {
            let end = self.input[start..]
                .iter()
                .position(|item| matches!(item, InputItem::Control(_)))
                .map_or(self.input.len(), |offset| start + offset);
            if !self.stopped {
                self.layout_paragraph(start..end);
            }
            match self.input.get(end) {
                Some(InputItem::Control(ControlCode::ShapeBreak)) => self.shape_break(),
                Some(_) => {}
                None => break,
            }
            start = end + 1;
        }
        self.out
    }

    fn shape_break(&mut self) {
        if self.current_shape.is_none() || self.hidden || self.stopped {
            return;
        }
        if !self.go_to_next_wrap_shape() {
            self.enter_hidden_mode();
        }
    }

    /// Switches to the next wrap shape. Returns `false` if there is none.
    pub(super) fn go_to_next_wrap_shape(&mut self) -> bool {
        if self.hidden {
            return false;
        }
        let Some(next) = self.current_shape.map(|index| index + 1) else {
            return false;
        };
        let Some(shape) = self.wrap_shapes.get(next) else {
            return false;
        };
        log::debug!("continuing in wrap shape {next}");
        self.scanline_maker = Box::new(ShapeScanlineMaker::new(shape, self.exclusions, self.axes));
        self.current_shape = Some(next);
        true
    }

    /// Called when the wrap shapes are exhausted. Returns `true` if layout
    /// continues on hidden lines.
    fn enter_hidden_mode(&mut self) -> bool {
        self.out.input_truncated = true;
        if self.hidden {
            return true;
        }
        if !self.options.emit_hidden_lines {
            log::debug!("wrap shapes exhausted, dropping remaining text");
            self.stopped = true;
            return false;
        }
        log::debug!("wrap shapes exhausted, laying out remaining text on hidden lines");
        let bounds = self
            .current_shape
            .and_then(|index| self.wrap_shapes.get(index))
            .map(|shape| shape.to_axes(self.axes).bounds());
        let x = bounds.map_or(0.0, |bounds| bounds.x0);
        let width = bounds.map(|bounds| bounds.width());
        let baseline = self.scanline_maker.y_coordinate();
        self.scanline_maker = Box::new(InfiniteScanlineMaker::new(
            x,
            baseline,
            width,
            ResolvedAlignment::Left,
        ));
        self.hidden = true;
        true
    }

    /// Effective metrics of the paragraph's first run. Every line of the
    /// paragraph is at least this tall.
    fn strut(&mut self, para: &ParagraphInfo) -> FontMetrics {
        let input = self.input;
        let style = para
            .input_items
            .first()
            .and_then(|info| input[info.input_index].as_text())
            .map_or_else(|| self.root_style.clone(), |run| run.style.clone());
        let scale = 1.0 / self.shaper.units_per_pixel();
        let mut strut = match self.shaper.select_font(&style, ' ') {
            Some(font) => self.shaper.metrics(font, style.font_size).scaled(scale),
            None => FontMetrics::default(),
        };
        strut.compute_effective(style.line_height_multiplier());
        strut
    }

    fn layout_paragraph(&mut self, range: Range<usize>) {
        let mut para = ParagraphInfo::new(self.input, range, &self.root_style);
        para.itemize(self.input, self.root_style.writing_mode, &mut *self.shaper);
        para.build_spans(self.input, self.axes, &mut *self.shaper);
        let strut = self.strut(&para);

        let paragraph_index = self.out.paragraphs.len();
        let (line_start, char_start) = (self.out.lines.len(), self.out.characters.len());
        self.out.paragraphs.push(Paragraph {
            direction: para.direction,
            alignment: para.alignment,
            lines: line_start..line_start,
            char_range: char_start..char_start,
        });
        log::debug!(
            "paragraph {paragraph_index}: {} chars, {} unbroken spans",
            para.char_count(),
            para.unbroken_spans.len()
        );

        let mut position = UnbrokenSpanPosition::default();
        while !self.stopped {
            let line_start_position = position;
            let explicit_y_span = if self.flowed {
                None
            } else {
                self.apply_line_start_y(&para, position)
            };
            let mut chunks = Vec::new();
            let mut line_height = strut;
            let Some(retries) = self.find_chunks_for_line(
                &para,
                &mut position,
                &mut chunks,
                &mut line_height,
                &strut,
            ) else {
                if self.enter_hidden_mode() {
                    continue;
                }
                break;
            };
            debug_assert!(position >= line_start_position, "line loop moved backwards");
            self.output_line(
                &para,
                paragraph_index,
                &chunks,
                &line_height,
                retries,
                explicit_y_span,
            );
            self.scanline_maker.set_line_height(&line_height);
            self.scanline_maker.completed_line();
            if position.is_end(&para.unbroken_spans) {
                break;
            }
            if position == line_start_position {
                log::warn!(
                    "line made no progress, dropping the rest of paragraph {paragraph_index}"
                );
                break;
            }
        }

        let paragraph = &mut self.out.paragraphs[paragraph_index];
        paragraph.lines.end = self.out.lines.len();
        paragraph.char_range.end = self.out.characters.len();
    }

    /// Moves the line to an explicit `y` carried by the first text at
    /// `position`. Returns the index of the span it came from.
    fn apply_line_start_y(
        &mut self,
        para: &ParagraphInfo,
        position: UnbrokenSpanPosition,
    ) -> Option<usize> {
        if !position.is_span_start() {
            return None;
        }
        let (offset, span) = para
            .unbroken_spans
            .get(position.span..)?
            .iter()
            .enumerate()
            .find(|(_, span)| !span.is_style_only())?;
        let y = span.y?;
        self.scanline_maker.set_new_y_coordinate(y);
        self.y_offset = 0.0;
        Some(position.span + offset)
    }

    /// Finds the chunks of the line starting at `start`, advancing `start`
    /// past them. Returns the number of times the line was re-flowed because
    /// it grew taller, or `None` if the flow region is exhausted.
    fn find_chunks_for_line(
        &mut self,
        para: &ParagraphInfo,
        start: &mut UnbrokenSpanPosition,
        chunks: &mut Vec<ChunkInfo>,
        line_height: &mut FontMetrics,
        strut: &FontMetrics,
    ) -> Option<u32> {
        *line_height = *strut;
        let mut retries = 0;
        loop {
            let mut scan_runs = loop {
                match self.scanline_maker.make_scanline(line_height) {
                    None => {
                        if !self.go_to_next_wrap_shape() {
                            return None;
                        }
                    }
                    Some(runs) if runs.is_empty() => self.scanline_maker.skip_band(),
                    Some(runs) => break runs,
                }
            };
            if para.direction.is_rtl() {
                scan_runs.reverse();
            }

            chunks.clear();
            let mut position = *start;
            let start_char = start.char_index_in_para(para);
            let mut grew = false;
            for scan_run in &scan_runs {
                if !self.build_chunks_in_scan_run(para, position, scan_run, chunks, line_height) {
                    grew = true;
                    break;
                }
                if let Some(last) = chunks.last().and_then(|chunk| chunk.broken_spans.last()) {
                    position = last.end;
                }
                if position.is_end(&para.unbroken_spans)
                    || (position.char_index_in_para(para) > start_char
                        && is_mandatory_break_at(para, position))
                {
                    break;
                }
            }
            if grew && retries < MAX_HEIGHT_RETRIES {
                retries += 1;
                log::trace!(
                    "line grew to {:.3}, retrying (attempt {retries})",
                    line_height.em_size()
                );
                continue;
            }
            if grew {
                log::warn!("line height did not settle after {retries} retries");
            }
            *start = position;
            return Some(retries);
        }
    }
}

/// Returns `true` if a line must end before the character at `position`.
pub(super) fn is_mandatory_break_at(para: &ParagraphInfo, position: UnbrokenSpanPosition) -> bool {
    if position.is_end(&para.unbroken_spans) {
        return false;
    }
    para.char_attributes
        .get(position.char_index_in_para(para))
        .is_some_and(|attrs| attrs.is_mandatory_break())
}
