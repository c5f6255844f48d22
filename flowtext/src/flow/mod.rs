// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Flow regions: where on each line text may be placed.
//!
//! The calculator works in a rotated frame where the inline axis is `x` and
//! lines progress along `y`. [`Axes`] maps between that frame and document
//! coordinates for the vertical writing modes.

mod shape;

pub use shape::WrapShape;
pub(crate) use shape::ShapeScanlineMaker;

use peniko::kurbo::Point;

use crate::input::CharPosition;
use crate::shape::FontMetrics;
use crate::style::{ResolvedAlignment, WritingMode};

/// Mapping between the inline/block frame and document coordinates.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) struct Axes {
    writing_mode: WritingMode,
}

impl Axes {
    pub(crate) fn new(writing_mode: WritingMode) -> Self {
        Self { writing_mode }
    }

    pub(crate) fn to_document(self, inline: f64, block: f64) -> Point {
        match self.writing_mode {
            WritingMode::HorizontalTb => Point::new(inline, block),
            WritingMode::VerticalRl => Point::new(-block, inline),
            WritingMode::VerticalLr => Point::new(block, inline),
        }
    }

    /// Inverse of [`to_document`](Self::to_document).
    pub(crate) fn to_inline_block(self, point: Point) -> (f64, f64) {
        match self.writing_mode {
            WritingMode::HorizontalTb => (point.x, point.y),
            WritingMode::VerticalRl => (point.y, -point.x),
            WritingMode::VerticalLr => (point.y, point.x),
        }
    }

    /// Re-orients positional attributes so that `x`/`dx` lie on the inline
    /// axis and `y`/`dy` on the block axis.
    pub(crate) fn reorient(self, position: CharPosition) -> CharPosition {
        match self.writing_mode {
            WritingMode::HorizontalTb => position,
            WritingMode::VerticalRl => CharPosition {
                x: position.y,
                y: position.x.map(|x| -x),
                dx: position.dy,
                dy: position.dx.map(|dx| -dx),
                rotate: position.rotate,
            },
            WritingMode::VerticalLr => CharPosition {
                x: position.y,
                y: position.x,
                dx: position.dy,
                dy: position.dx,
                rotate: position.rotate,
            },
        }
    }
}

/// A horizontal interval of one line available for text.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(crate) struct ScanRun {
    /// Top of the line box.
    pub(crate) y: f64,
    pub(crate) x_start: f64,
    pub(crate) x_end: f64,
}

impl ScanRun {
    pub(crate) fn width(&self) -> f64 {
        self.x_end - self.x_start
    }
}

/// Supplies the scan runs of successive lines.
///
/// Asking again for the current line with a different height re-derives the
/// runs; only [`completed_line`](Self::completed_line) and
/// [`skip_band`](Self::skip_band) move to the next line.
pub(crate) trait ScanlineMaker {
    /// Returns the scan runs of the current line for a line box of
    /// `line_height`, ordered left to right. `None` means the region is
    /// exhausted. An empty list means there is no room at this position.
    fn make_scanline(&mut self, line_height: &FontMetrics) -> Option<Vec<ScanRun>>;

    /// Moves past the current line, using the height last set with
    /// [`set_line_height`](Self::set_line_height).
    fn completed_line(&mut self);

    /// Moves past a band in which no scan run was available.
    fn skip_band(&mut self);

    /// The block coordinate of the current line position.
    fn y_coordinate(&self) -> f64;

    /// Moves the current line so that its baseline is at `y`. Ignored by
    /// flowed regions.
    fn set_new_y_coordinate(&mut self, y: f64);

    /// Whether a line can grow taller without re-deriving its scan runs.
    fn can_extend_current_scanline(&self) -> bool;

    /// Sets the height of the line just laid out.
    fn set_line_height(&mut self, line_height: &FontMetrics);

    /// Baseline of the current line for its final line box.
    fn baseline_y(&self, line_height: &FontMetrics) -> f64;
}

/// Scan-line maker for text that is not flowed into a shape.
///
/// Every line gets a single run starting at the text origin. The run is
/// unbounded unless an `inline-size` is set, in which case it is placed
/// around the origin according to the text anchor.
#[derive(Clone, Debug)]
pub(crate) struct InfiniteScanlineMaker {
    x: f64,
    baseline: f64,
    inline_size: Option<f64>,
    anchor: ResolvedAlignment,
    current_line_height: FontMetrics,
}

impl InfiniteScanlineMaker {
    pub(crate) fn new(
        x: f64,
        baseline: f64,
        inline_size: Option<f64>,
        anchor: ResolvedAlignment,
    ) -> Self {
        Self {
            x,
            baseline,
            inline_size: inline_size.filter(|size| size.is_finite() && *size > 0.0),
            anchor,
            current_line_height: FontMetrics::default(),
        }
    }
}

impl ScanlineMaker for InfiniteScanlineMaker {
    fn make_scanline(&mut self, line_height: &FontMetrics) -> Option<Vec<ScanRun>> {
        let (x_start, x_end) = match self.inline_size {
            None => (self.x, f64::INFINITY),
            Some(size) => match self.anchor {
                ResolvedAlignment::Left | ResolvedAlignment::Full => (self.x, self.x + size),
                ResolvedAlignment::Right => (self.x - size, self.x),
                ResolvedAlignment::Center => (self.x - size * 0.5, self.x + size * 0.5),
            },
        };
        self.current_line_height = *line_height;
        Some(vec![ScanRun {
            y: self.baseline - line_height.ascent,
            x_start,
            x_end,
        }])
    }

    fn completed_line(&mut self) {
        self.baseline += self.current_line_height.em_size();
    }

    fn skip_band(&mut self) {
        self.completed_line();
    }

    fn y_coordinate(&self) -> f64 {
        self.baseline
    }

    fn set_new_y_coordinate(&mut self, y: f64) {
        self.baseline = y;
    }

    fn can_extend_current_scanline(&self) -> bool {
        true
    }

    fn set_line_height(&mut self, line_height: &FontMetrics) {
        self.current_line_height = *line_height;
    }

    fn baseline_y(&self, _line_height: &FontMetrics) -> f64 {
        self.baseline
    }
}
