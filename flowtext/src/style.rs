// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Resolved text styles.

use icu_locale_core::LanguageIdentifier;

use crate::Error;

/// The `line-height` used when the property is `normal`.
pub const LINE_HEIGHT_NORMAL: f64 = 1.25;

/// Inline base direction of a run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Left-to-right.
    #[default]
    Ltr,
    /// Right-to-left.
    Rtl,
}

impl Direction {
    /// Returns `true` for right-to-left.
    pub fn is_rtl(self) -> bool {
        self == Self::Rtl
    }
}

/// The SVG `writing-mode` property.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum WritingMode {
    /// Lines are horizontal and stack downwards.
    #[default]
    HorizontalTb,
    /// Lines are vertical and stack right to left.
    VerticalRl,
    /// Lines are vertical and stack left to right.
    VerticalLr,
}

impl WritingMode {
    /// Returns `true` when the inline axis is vertical.
    pub fn is_vertical(self) -> bool {
        !matches!(self, Self::HorizontalTb)
    }
}

/// The CSS `text-orientation` property, used in vertical writing modes.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum TextOrientation {
    /// East Asian characters are upright, everything else is sideways.
    #[default]
    Mixed,
    /// Every character is upright.
    Upright,
    /// Every character is rotated clockwise.
    Sideways,
}

/// Alignment of text within its line, derived from `text-align` for flowed
/// text and from `text-anchor` otherwise.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Alignment {
    /// Aligned to the start edge for the paragraph direction.
    #[default]
    Start,
    /// Aligned to the end edge for the paragraph direction.
    End,
    /// Centered.
    Center,
    /// Stretched to fill the line by widening inter-word space.
    Justify,
    /// Aligned to the left edge regardless of direction.
    Left,
    /// Aligned to the right edge regardless of direction.
    Right,
}

/// Physical alignment after the paragraph direction is taken into account.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum ResolvedAlignment {
    Left,
    Right,
    Center,
    Full,
}

impl Alignment {
    pub(crate) fn resolve(self, direction: Direction) -> ResolvedAlignment {
        match (self, direction.is_rtl()) {
            (Self::Left, _) | (Self::Start, false) | (Self::End, true) => ResolvedAlignment::Left,
            (Self::Right, _) | (Self::Start, true) | (Self::End, false) => {
                ResolvedAlignment::Right
            }
            (Self::Center, _) => ResolvedAlignment::Center,
            (Self::Justify, _) => ResolvedAlignment::Full,
        }
    }
}

/// The CSS `line-height` property.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum LineHeight {
    /// `normal`, equivalent to a multiplier of [`LINE_HEIGHT_NORMAL`].
    #[default]
    Normal,
    /// A unitless multiplier of the font size.
    Multiplier(f64),
    /// An absolute length in document units.
    Absolute(f64),
}

/// The SVG `baseline-shift` property.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum BaselineShift {
    /// No shift.
    #[default]
    Baseline,
    /// Subscript position.
    Sub,
    /// Superscript position.
    Super,
    /// Percentage of the line height. Positive values shift up.
    Percent(f64),
    /// Length in document units. Positive values shift up.
    Length(f64),
}

/// A fully resolved style for one [`StyledTextRun`](crate::StyledTextRun).
#[derive(Clone, Debug, PartialEq)]
pub struct TextStyle {
    /// Family name handed to the [`Shaper`](crate::Shaper) for font selection.
    pub font_family: String,
    /// Font size in document units.
    pub font_size: f64,
    /// Font weight, 100 to 900.
    pub font_weight: u16,
    /// Italic or oblique style.
    pub italic: bool,
    /// Whether common ligatures are enabled (`font-variant-ligatures`).
    pub ligatures: bool,
    /// Content language. `None` inherits the unknown language `und`.
    pub language: Option<LanguageIdentifier>,
    /// The CSS `direction` property.
    pub direction: Direction,
    /// `unicode-bidi: bidi-override`.
    pub bidi_override: bool,
    /// The SVG `writing-mode` property.
    pub writing_mode: WritingMode,
    /// The CSS `text-orientation` property.
    pub text_orientation: TextOrientation,
    /// The SVG `baseline-shift` property.
    pub baseline_shift: BaselineShift,
    /// Extra space after every character.
    pub letter_spacing: f64,
    /// Extra space after every white space character.
    pub word_spacing: f64,
    /// The CSS `line-height` property.
    pub line_height: LineHeight,
    /// Paragraph alignment. Only the style of a paragraph's first run counts.
    pub alignment: Alignment,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            font_family: String::from("sans-serif"),
            font_size: 16.0,
            font_weight: 400,
            italic: false,
            ligatures: true,
            language: None,
            direction: Direction::Ltr,
            bidi_override: false,
            writing_mode: WritingMode::HorizontalTb,
            text_orientation: TextOrientation::Mixed,
            baseline_shift: BaselineShift::Baseline,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            line_height: LineHeight::Normal,
            alignment: Alignment::Start,
        }
    }
}

impl TextStyle {
    /// Sets the font size.
    pub fn with_font_size(mut self, font_size: f64) -> Self {
        self.font_size = font_size;
        self
    }

    /// Sets the font family.
    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = family.into();
        self
    }

    /// Parses and sets the content language from a BCP 47 tag.
    pub fn with_language(mut self, tag: &str) -> Result<Self, Error> {
        let language = tag
            .parse::<LanguageIdentifier>()
            .map_err(|source| Error::InvalidLanguage {
                tag: tag.to_owned(),
                source,
            })?;
        self.language = Some(language);
        Ok(self)
    }

    /// Sets the direction.
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    /// Sets the writing mode.
    pub fn with_writing_mode(mut self, writing_mode: WritingMode) -> Self {
        self.writing_mode = writing_mode;
        self
    }

    /// Sets the alignment.
    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = alignment;
        self
    }

    /// Sets the line height.
    pub fn with_line_height(mut self, line_height: LineHeight) -> Self {
        self.line_height = line_height;
        self
    }

    /// Sets letter spacing.
    pub fn with_letter_spacing(mut self, letter_spacing: f64) -> Self {
        self.letter_spacing = letter_spacing;
        self
    }

    /// Sets word spacing.
    pub fn with_word_spacing(mut self, word_spacing: f64) -> Self {
        self.word_spacing = word_spacing;
        self
    }

    /// Sets the baseline shift.
    pub fn with_baseline_shift(mut self, baseline_shift: BaselineShift) -> Self {
        self.baseline_shift = baseline_shift;
        self
    }

    /// The line height as a multiple of the font size.
    pub fn line_height_multiplier(&self) -> f64 {
        match self.line_height {
            LineHeight::Normal => LINE_HEIGHT_NORMAL,
            LineHeight::Multiplier(multiplier) => multiplier,
            LineHeight::Absolute(length) => {
                if self.font_size > 0.0 {
                    length / self.font_size
                } else {
                    LINE_HEIGHT_NORMAL
                }
            }
        }
    }

    /// The baseline shift in document units. Positive values shift away from
    /// the block start, i.e. up in horizontal text.
    pub fn resolved_baseline_shift(&self) -> f64 {
        match self.baseline_shift {
            BaselineShift::Baseline => 0.0,
            BaselineShift::Sub => -0.2 * self.font_size,
            BaselineShift::Super => 0.4 * self.font_size,
            BaselineShift::Percent(percent) => {
                percent / 100.0 * self.font_size * self.line_height_multiplier()
            }
            BaselineShift::Length(length) => length,
        }
    }

    /// Returns `true` if `other` would shape identically to `self`, ignoring
    /// language and the properties that only affect positioning.
    pub(crate) fn shapes_like(&self, other: &Self) -> bool {
        self.font_family == other.font_family
            && self.font_size.to_bits() == other.font_size.to_bits()
            && self.font_weight == other.font_weight
            && self.italic == other.italic
            && self.ligatures == other.ligatures
            && self.letter_spacing.to_bits() == other.letter_spacing.to_bits()
            && self.word_spacing.to_bits() == other.word_spacing.to_bits()
            && self.text_orientation == other.text_orientation
    }
}
