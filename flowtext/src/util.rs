// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Misc helpers.

/// Tolerance used when comparing line box heights.
///
/// Heights computed from the same metrics along different paths may differ in
/// the last bits.
pub(crate) const HEIGHT_EPSILON: f64 = f32::EPSILON as f64;

/// Returns true for characters that force a line break after them.
pub(crate) fn is_mandatory_linebreak(ch: char) -> bool {
    matches!(
        ch,
        '\n' | '\u{000B}' | '\u{000C}' | '\r' | '\u{0085}' | '\u{2028}' | '\u{2029}'
    )
}
