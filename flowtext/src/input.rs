// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Input stream of a layout.

use crate::style::TextStyle;
use crate::Error;

/// Opaque identity of the document object a run of text came from.
///
/// The layout only compares and returns these, so callers can map characters
/// back to their objects.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(pub u64);

/// Per-character positional attributes of a run (`x`, `y`, `dx`, `dy`,
/// `rotate`).
///
/// Each list supplies one value per character, starting with the first
/// character of the run. Characters past the end of a list receive no
/// explicit value.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PositionAttrs {
    /// Absolute x coordinates.
    pub x: Vec<f64>,
    /// Absolute y coordinates.
    pub y: Vec<f64>,
    /// Relative x offsets.
    pub dx: Vec<f64>,
    /// Relative y offsets.
    pub dy: Vec<f64>,
    /// Glyph rotations in degrees.
    pub rotate: Vec<f64>,
}

impl PositionAttrs {
    /// Attributes placing the run's first character at `(x, y)`.
    pub fn at(x: f64, y: f64) -> Self {
        Self {
            x: vec![x],
            y: vec![y],
            ..Self::default()
        }
    }

    /// Returns `true` if no list has any values.
    pub fn is_empty(&self) -> bool {
        self.x.is_empty()
            && self.y.is_empty()
            && self.dx.is_empty()
            && self.dy.is_empty()
            && self.rotate.is_empty()
    }

    pub(crate) fn for_char(&self, index: usize) -> CharPosition {
        CharPosition {
            x: self.x.get(index).copied(),
            y: self.y.get(index).copied(),
            dx: self.dx.get(index).copied(),
            dy: self.dy.get(index).copied(),
            rotate: self.rotate.get(index).copied(),
        }
    }
}

/// The positional attributes that apply to one character.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) struct CharPosition {
    pub(crate) x: Option<f64>,
    pub(crate) y: Option<f64>,
    pub(crate) dx: Option<f64>,
    pub(crate) dy: Option<f64>,
    pub(crate) rotate: Option<f64>,
}

impl CharPosition {
    pub(crate) fn is_set(&self) -> bool {
        self.x.is_some()
            || self.y.is_some()
            || self.dx.is_some()
            || self.dy.is_some()
            || self.rotate.is_some()
    }
}

/// A contiguous run of text with a single resolved style.
#[derive(Clone, Debug, PartialEq)]
pub struct StyledTextRun {
    /// The object this run belongs to.
    pub source: SourceId,
    /// The text.
    pub text: String,
    /// The resolved style.
    pub style: TextStyle,
    /// Per-character positional attributes.
    pub positions: PositionAttrs,
}

/// Non-text entries of the input stream.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ControlCode {
    /// Ends the current paragraph.
    ParagraphBreak,
    /// Ends the current paragraph and continues in the next wrap shape.
    ShapeBreak,
}

/// One entry of a layout's input stream.
#[derive(Clone, Debug, PartialEq)]
pub enum InputItem {
    /// Styled text.
    Text(StyledTextRun),
    /// A control code.
    Control(ControlCode),
}

impl InputItem {
    pub(crate) fn as_text(&self) -> Option<&StyledTextRun> {
        match self {
            Self::Text(run) => Some(run),
            Self::Control(_) => None,
        }
    }
}

/// Parses an SVG list of numbers, such as the value of an `x` or `dx`
/// attribute.
///
/// Entries are separated by white space and/or commas. Unitless numbers and
/// numbers with a `px` suffix are accepted.
///
/// ```
/// assert_eq!(flowtext::parse_length_list("1, 2.5px 3").unwrap(), vec![1.0, 2.5, 3.0]);
/// ```
pub fn parse_length_list(source: &str) -> Result<Vec<f64>, Error> {
    source
        .split(|c: char| c == ',' || c.is_ascii_whitespace())
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let number = entry.strip_suffix("px").unwrap_or(entry);
            number
                .parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| Error::InvalidNumber(entry.to_owned()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_lists() {
        assert_eq!(parse_length_list("").unwrap(), Vec::<f64>::new());
        assert_eq!(
            parse_length_list(" 10 ,20px\t-3e1").unwrap(),
            vec![10.0, 20.0, -30.0]
        );
        assert_eq!(
            parse_length_list("1 2em"),
            Err(Error::InvalidNumber("2em".into()))
        );
        assert!(parse_length_list("NaN").is_err());
    }

    #[test]
    fn lists_run_out_silently() {
        let attrs = PositionAttrs {
            dx: vec![1.0, 2.0],
            ..PositionAttrs::default()
        };
        assert_eq!(attrs.for_char(1).dx, Some(2.0));
        assert!(!attrs.for_char(2).is_set());
    }
}
