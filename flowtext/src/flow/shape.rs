// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use peniko::kurbo::{Point, Rect};

use super::{Axes, ScanRun, ScanlineMaker};
use crate::shape::FontMetrics;
use crate::Error;

/// Scan runs narrower than this are dropped.
const MIN_RUN_WIDTH: f64 = 1e-6;

/// Distance moved down when a band has no room and no line height is known.
const MIN_SKIP: f64 = 1.0;

type Interval = (f64, f64);

/// A region text can be flowed into, or flowed around.
#[derive(Clone, Debug, PartialEq)]
pub enum WrapShape {
    /// An axis-aligned rectangle.
    Rect(Rect),
    /// A closed polygon, filled with the even-odd rule.
    Polygon(Vec<Point>),
}

impl WrapShape {
    /// Creates a rectangular shape.
    pub fn rect(rect: Rect) -> Result<Self, Error> {
        if !rect.is_finite() {
            return Err(Error::NonFiniteGeometry);
        }
        Ok(Self::Rect(rect.abs()))
    }

    /// Creates a polygonal shape. The polygon is implicitly closed.
    pub fn polygon(points: impl IntoIterator<Item = Point>) -> Result<Self, Error> {
        let points: Vec<Point> = points.into_iter().collect();
        if points.len() < 3 {
            return Err(Error::DegeneratePolygon {
                points: points.len(),
            });
        }
        if !points.iter().all(|point| point.is_finite()) {
            return Err(Error::NonFiniteGeometry);
        }
        Ok(Self::Polygon(points))
    }

    /// The bounding box of the shape.
    pub fn bounds(&self) -> Rect {
        match self {
            Self::Rect(rect) => *rect,
            Self::Polygon(points) => points
                .iter()
                .skip(1)
                .fold(Rect::from_points(points[0], points[0]), |rect, point| {
                    rect.union_pt(*point)
                }),
        }
    }

    /// The shape in the inline/block frame.
    pub(crate) fn to_axes(&self, axes: Axes) -> Self {
        let map = |point: Point| {
            let (inline, block) = axes.to_inline_block(point);
            Point::new(inline, block)
        };
        match self {
            Self::Rect(rect) => {
                let corner = Point::new(rect.x1, rect.y1);
                Self::Rect(Rect::from_points(map(rect.origin()), map(corner)))
            }
            Self::Polygon(points) => Self::Polygon(points.iter().map(|p| map(*p)).collect()),
        }
    }

    /// Intervals of the horizontal line at `y` lying inside the shape.
    fn cross_section(&self, y: f64) -> Vec<Interval> {
        match self {
            Self::Rect(rect) => {
                if y >= rect.y0 && y <= rect.y1 {
                    vec![(rect.x0, rect.x1)]
                } else {
                    Vec::new()
                }
            }
            Self::Polygon(points) => {
                let mut crossings: Vec<f64> = Vec::new();
                for (i, &p) in points.iter().enumerate() {
                    let q = points[(i + 1) % points.len()];
                    let (low, high) = if p.y <= q.y { (p, q) } else { (q, p) };
                    if y >= low.y && y < high.y {
                        let t = (y - low.y) / (high.y - low.y);
                        crossings.push(low.x + t * (high.x - low.x));
                    }
                }
                crossings.sort_by(f64::total_cmp);
                crossings
                    .chunks_exact(2)
                    .map(|pair| (pair[0], pair[1]))
                    .collect()
            }
        }
    }

    /// Block positions at which the cross section must be sampled to cover
    /// the band `[y0, y1]`.
    fn samples(&self, y0: f64, y1: f64) -> Vec<f64> {
        let epsilon = ((y1 - y0) * 1e-6).max(1e-9);
        if y1 - y0 <= 2.0 * epsilon {
            return vec![(y0 + y1) * 0.5];
        }
        let mut samples = vec![y0 + epsilon, y1 - epsilon];
        if let Self::Polygon(points) = self {
            for point in points {
                if point.y > y0 + epsilon && point.y < y1 - epsilon {
                    samples.push(point.y - epsilon);
                    samples.push(point.y + epsilon);
                }
            }
        }
        samples
    }

    /// Intervals that lie inside the shape over the whole band `[y0, y1]`.
    pub(crate) fn band_inside(&self, y0: f64, y1: f64) -> Vec<Interval> {
        if let Self::Rect(rect) = self {
            let tolerance = 1e-9 * (1.0 + rect.height().abs());
            if y0 < rect.y0 - tolerance || y1 > rect.y1 + tolerance {
                return Vec::new();
            }
            return vec![(rect.x0, rect.x1)];
        }
        self.samples(y0, y1)
            .into_iter()
            .map(|y| self.cross_section(y))
            .reduce(|a, b| intersect(&a, &b))
            .unwrap_or_default()
    }

    /// Intervals touched by the shape anywhere in the band `[y0, y1]`.
    pub(crate) fn band_touched(&self, y0: f64, y1: f64) -> Vec<Interval> {
        if let Self::Rect(rect) = self {
            if y1 <= rect.y0 || y0 >= rect.y1 {
                return Vec::new();
            }
            return vec![(rect.x0, rect.x1)];
        }
        let all = self
            .samples(y0, y1)
            .into_iter()
            .flat_map(|y| self.cross_section(y))
            .collect();
        union(all)
    }
}

fn intersect(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let mut result = Vec::new();
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        let start = a[i].0.max(b[j].0);
        let end = a[i].1.min(b[j].1);
        if start < end {
            result.push((start, end));
        }
        if a[i].1 < b[j].1 {
            i += 1;
        } else {
            j += 1;
        }
    }
    result
}

fn union(mut intervals: Vec<Interval>) -> Vec<Interval> {
    intervals.sort_by(|a, b| a.0.total_cmp(&b.0));
    let mut result: Vec<Interval> = Vec::with_capacity(intervals.len());
    for interval in intervals {
        match result.last_mut() {
            Some(last) if interval.0 <= last.1 => last.1 = last.1.max(interval.1),
            _ => result.push(interval),
        }
    }
    result
}

fn subtract(from: &[Interval], holes: &[Interval]) -> Vec<Interval> {
    let mut result = Vec::new();
    for &(start, end) in from {
        let mut cursor = start;
        for &(hole_start, hole_end) in holes {
            if hole_end <= cursor || hole_start >= end {
                continue;
            }
            if hole_start > cursor {
                result.push((cursor, hole_start));
            }
            cursor = cursor.max(hole_end);
        }
        if cursor < end {
            result.push((cursor, end));
        }
    }
    result
}

/// Scan-line maker for text flowed into a [`WrapShape`], optionally around
/// exclusion shapes.
#[derive(Clone, Debug)]
pub(crate) struct ShapeScanlineMaker {
    shape: WrapShape,
    exclusions: Vec<WrapShape>,
    y: f64,
    bottom: f64,
    current_line_height: FontMetrics,
    last_requested_height: f64,
}

impl ShapeScanlineMaker {
    pub(crate) fn new(shape: &WrapShape, exclusions: &[WrapShape], axes: Axes) -> Self {
        let shape = shape.to_axes(axes);
        let exclusions = exclusions.iter().map(|shape| shape.to_axes(axes)).collect();
        let bounds = shape.bounds();
        Self {
            shape,
            exclusions,
            y: bounds.y0,
            bottom: bounds.y1,
            current_line_height: FontMetrics::default(),
            last_requested_height: 0.0,
        }
    }
}

impl ScanlineMaker for ShapeScanlineMaker {
    fn make_scanline(&mut self, line_height: &FontMetrics) -> Option<Vec<ScanRun>> {
        if self.y >= self.bottom {
            return None;
        }
        let height = line_height.em_size().max(0.0);
        self.last_requested_height = height;
        self.current_line_height = *line_height;
        let (y0, y1) = (self.y, self.y + height);
        let mut intervals = self.shape.band_inside(y0, y1);
        if !self.exclusions.is_empty() {
            let holes = union(
                self.exclusions
                    .iter()
                    .flat_map(|shape| shape.band_touched(y0, y1))
                    .collect(),
            );
            intervals = subtract(&intervals, &holes);
        }
        Some(
            intervals
                .into_iter()
                .filter(|(start, end)| end - start > MIN_RUN_WIDTH)
                .map(|(x_start, x_end)| ScanRun {
                    y: y0,
                    x_start,
                    x_end,
                })
                .collect(),
        )
    }

    fn completed_line(&mut self) {
        let height = self.current_line_height.em_size();
        self.y += if height > 0.0 { height } else { MIN_SKIP };
    }

    fn skip_band(&mut self) {
        self.y += self.last_requested_height.max(MIN_SKIP);
    }

    fn y_coordinate(&self) -> f64 {
        self.y
    }

    fn set_new_y_coordinate(&mut self, _y: f64) {}

    fn can_extend_current_scanline(&self) -> bool {
        false
    }

    fn set_line_height(&mut self, line_height: &FontMetrics) {
        self.current_line_height = *line_height;
    }

    fn baseline_y(&self, line_height: &FontMetrics) -> f64 {
        self.y + line_height.ascent
    }
}
