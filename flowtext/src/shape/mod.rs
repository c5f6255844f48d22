// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The shaping capability consumed by the layout calculator.

mod cache;
mod fixed;

pub use cache::ShapeCache;
pub use fixed::FixedAdvanceShaper;

use icu_locale_core::LanguageIdentifier;
use icu_properties::props::Script;

use crate::style::TextStyle;

/// Handle to a font resolved by a [`Shaper`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FontId(pub u32);

/// Vertical metrics of a font at a given size.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct FontMetrics {
    /// Distance from the baseline to the top of the line box.
    pub ascent: f64,
    /// Distance from the baseline to the bottom of the line box.
    pub descent: f64,
    /// The font size these metrics were computed for.
    pub em: f64,
}

impl FontMetrics {
    /// Height of the box, ascent plus descent.
    pub fn em_size(&self) -> f64 {
        self.ascent + self.descent
    }

    /// Resets every metric to zero.
    pub fn set_zero(&mut self) {
        *self = Self::default();
    }

    /// Takes the larger ascent and the larger descent of `self` and `other`.
    pub fn max(&mut self, other: &Self) {
        self.ascent = self.ascent.max(other.ascent);
        self.descent = self.descent.max(other.descent);
        self.em = self.em.max(other.em);
    }

    /// Applies a CSS line height, expressed as a multiple of the em size, by
    /// distributing the half-leading to both sides of the baseline.
    pub fn compute_effective(&mut self, line_height_multiplier: f64) {
        let half_leading = 0.5 * (line_height_multiplier - 1.0) * self.em_size();
        self.ascent += half_leading;
        self.descent += half_leading;
    }

    pub(crate) fn scaled(self, factor: f64) -> Self {
        Self {
            ascent: self.ascent * factor,
            descent: self.descent * factor,
            em: self.em * factor,
        }
    }
}

/// How a glyph is set relative to the inline axis.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum GlyphOrientation {
    /// Horizontal text.
    #[default]
    Horizontal,
    /// Vertical text, glyph kept upright.
    Upright,
    /// Vertical text, glyph rotated clockwise by 90 degrees.
    Sideways,
}

impl GlyphOrientation {
    /// Returns `true` for the two vertical orientations.
    pub fn is_vertical(self) -> bool {
        self != Self::Horizontal
    }
}

/// A run of text to shape with a single font.
#[derive(Copy, Clone, Debug)]
pub struct ShapeRequest<'a> {
    /// The text.
    pub text: &'a str,
    /// The font selected for the whole run.
    pub font: FontId,
    /// Font size in document units.
    pub font_size: f64,
    /// The run's script.
    pub script: Script,
    /// The run's bidi embedding level. Odd levels are right-to-left.
    pub bidi_level: u8,
    /// The run's language.
    pub language: &'a LanguageIdentifier,
    /// Extra space after each character. Applied by the layout, not the
    /// shaper, but optional ligatures must be disabled when it is non-zero.
    pub letter_spacing: f64,
    /// Extra space after each white space character. Applied by the layout.
    pub word_spacing: f64,
    /// Whether common ligatures are enabled.
    pub ligatures: bool,
    /// Orientation of the glyphs.
    pub orientation: GlyphOrientation,
}

impl ShapeRequest<'_> {
    /// Returns `true` if the run is right-to-left.
    pub fn is_rtl(&self) -> bool {
        self.bidi_level & 1 == 1
    }
}

/// One glyph produced by a [`Shaper`].
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ShapedGlyph {
    /// Glyph identifier within the font.
    pub glyph_id: u32,
    /// Byte offset, within the shaped text, of the first character of the
    /// cluster this glyph belongs to.
    pub cluster: u32,
    /// Advance along the inline axis.
    pub advance: f64,
    /// Offset along the inline axis.
    pub x_offset: f64,
    /// Offset along the block axis, positive away from the block start.
    pub y_offset: f64,
}

/// Font resolution and glyph shaping.
///
/// All lengths are in shaper units; the layout divides them by
/// [`units_per_pixel`](Self::units_per_pixel).
pub trait Shaper {
    /// Selects the font used to render `ch` in `style`, applying fallback.
    /// Returns `None` if no font is available.
    fn select_font(&mut self, style: &TextStyle, ch: char) -> Option<FontId>;

    /// Returns the vertical metrics of `font` at `font_size`.
    fn metrics(&mut self, font: FontId, font_size: f64) -> FontMetrics;

    /// Shapes a run of text.
    ///
    /// Glyphs are returned in logical order. The glyphs of one cluster are
    /// contiguous and carry the byte offset of the cluster's first character.
    fn shape(&mut self, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph>;

    /// Number of shaper units per document unit.
    fn units_per_pixel(&self) -> f64 {
        1.0
    }
}

impl<S: Shaper + ?Sized> Shaper for &mut S {
    fn select_font(&mut self, style: &TextStyle, ch: char) -> Option<FontId> {
        (**self).select_font(style, ch)
    }

    fn metrics(&mut self, font: FontId, font_size: f64) -> FontMetrics {
        (**self).metrics(font, font_size)
    }

    fn shape(&mut self, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph> {
        (**self).shape(request)
    }

    fn units_per_pixel(&self) -> f64 {
        (**self).units_per_pixel()
    }
}
