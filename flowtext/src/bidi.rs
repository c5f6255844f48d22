// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Bidi level resolution and visual reordering.

use unicode_bidi::{BidiInfo, Level};

use crate::style::Direction;

/// Resolves the embedding level of every character of `text`.
///
/// `overrides` yields, for each character, the direction forced by a
/// `bidi-override` run, if any.
pub(crate) fn resolve_levels(
    text: &str,
    base: Direction,
    overrides: impl Iterator<Item = Option<Direction>>,
) -> Vec<u8> {
    let base_level = base_level(base);
    if text.is_empty() {
        return Vec::new();
    }
    let para_level = if base.is_rtl() {
        Level::rtl()
    } else {
        Level::ltr()
    };
    let info = BidiInfo::new(text, Some(para_level));
    text.char_indices()
        .zip(overrides)
        .map(|((offset, _), forced)| match forced {
            Some(direction) => override_level(base_level, direction),
            None => info.levels[offset].number(),
        })
        .collect()
}

pub(crate) fn base_level(direction: Direction) -> u8 {
    u8::from(direction.is_rtl())
}

/// The lowest level of `direction` at or above `base`.
fn override_level(base: u8, direction: Direction) -> u8 {
    let rtl = u8::from(direction.is_rtl());
    if base & 1 == rtl { base } else { base + 1 }
}

/// Computes the visual order of a sequence of runs given their levels.
///
/// Returns the logical indices of the runs in left-to-right visual order.
/// Runs are reversed from the highest level down to the lowest odd level.
pub(crate) fn reorder_visual(levels: &[u8]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..levels.len()).collect();
    let Some(&max_level) = levels.iter().max() else {
        return order;
    };
    let lowest_odd = levels
        .iter()
        .copied()
        .filter(|level| level & 1 == 1)
        .min()
        .unwrap_or(max_level + 1);
    let mut level = max_level;
    while level >= lowest_odd && level > 0 {
        let mut i = 0;
        while i < order.len() {
            if levels[order[i]] >= level {
                let start = i;
                while i < order.len() && levels[order[i]] >= level {
                    i += 1;
                }
                order[start..i].reverse();
            } else {
                i += 1;
            }
        }
        level -= 1;
    }
    order
}
