// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use thiserror::Error;

/// Errors returned by the fallible construction APIs.
///
/// Layout itself never fails: anomalies found while calculating are recovered
/// locally and logged.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum Error {
    /// A language tag could not be parsed.
    #[error("invalid language tag `{tag}`: {source}")]
    InvalidLanguage {
        /// The offending tag.
        tag: String,
        /// The underlying parse error.
        #[source]
        source: icu_locale_core::ParseError,
    },
    /// A wrap polygon had fewer than three points.
    #[error("wrap polygon needs at least 3 points, got {points}")]
    DegeneratePolygon {
        /// Number of points supplied.
        points: usize,
    },
    /// A wrap shape contained a NaN or infinite coordinate.
    #[error("wrap shape contains a non-finite coordinate")]
    NonFiniteGeometry,
    /// An entry of a length list was not a number.
    #[error("invalid number `{0}` in length list")]
    InvalidNumber(String),
}
