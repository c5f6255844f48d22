// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph and line layout for SVG-style text.
//!
//! A [`Layout`] is built from a sequence of [`StyledTextRun`]s separated by
//! [`ControlCode`]s. Calling [`Layout::calculate`] with a [`Shaper`] itemizes
//! every paragraph, breaks it into unbroken spans, greedily wraps the spans
//! into lines and chunks against the configured flow region, and produces flat
//! glyph and character tables that can be rendered, hit-tested and navigated
//! with a [`LayoutIterator`].
//!
//! ```
//! use flowtext::{FixedAdvanceShaper, Layout, TextStyle};
//!
//! let mut shaper = FixedAdvanceShaper::new();
//! let mut layout = Layout::new();
//! layout.append_text("Hello world", TextStyle::default(), Default::default());
//! assert!(layout.calculate(&mut shaper));
//! assert_eq!(layout.characters().len(), 11);
//! ```

mod analysis;
mod bidi;
mod error;
mod input;
mod itemize;
mod spans;
mod util;

pub mod flow;
pub mod layout;
pub mod shape;
pub mod style;

pub use peniko::kurbo;

pub use analysis::CharAttributes;
pub use error::Error;
pub use flow::WrapShape;
pub use input::{parse_length_list, ControlCode, InputItem, PositionAttrs, SourceId, StyledTextRun};
pub use layout::{
    Layout, LayoutIterator, LayoutOptions, LigatureCursorPolicy, TextPosition, WrapMode,
};
pub use shape::{FixedAdvanceShaper, FontId, FontMetrics, ShapeCache, Shaper};
pub use style::TextStyle;

#[cfg(test)]
mod tests;
