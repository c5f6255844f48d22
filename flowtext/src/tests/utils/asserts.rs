// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Helpers to assert truths about calculated layouts.

use crate::kurbo::Point;
use crate::Layout;

/// Assert that two lengths are equal up to rounding.
pub(crate) fn assert_close(actual: f64, expected: f64, case: &str) {
    assert!(
        (actual - expected).abs() < 1e-6,
        "{case} mismatch: {actual} != {expected}"
    );
}

/// The text of every line, in logical order.
pub(crate) fn line_texts(layout: &Layout) -> Vec<String> {
    layout
        .lines()
        .iter()
        .map(|line| {
            layout.characters()[line.char_range.clone()]
                .iter()
                .map(|character| character.ch)
                .collect()
        })
        .collect()
}

/// Every cursor position from the start to the end of the text, with its
/// anchor point.
pub(crate) fn cursor_anchors(layout: &Layout) -> Vec<(usize, Point)> {
    let mut iter = layout.begin();
    let mut anchors = vec![(iter.char_index(), layout.character_anchor_point(&iter))];
    while iter.next_cursor_position() {
        anchors.push((iter.char_index(), layout.character_anchor_point(&iter)));
    }
    if anchors.last().map(|(index, _)| *index) != Some(iter.char_index()) {
        anchors.push((iter.char_index(), layout.character_anchor_point(&iter)));
    }
    anchors
}

/// Assert the structural invariants every calculated layout must satisfy.
pub(crate) fn assert_layout_invariants(layout: &Layout, case: &str) {
    let characters = layout.characters();
    let glyphs = layout.glyphs();

    let mut next_char = 0;
    let mut next_glyph = 0;
    for (index, line) in layout.lines().iter().enumerate() {
        assert_eq!(
            line.char_range.start, next_char,
            "{case} line {index} char_range mismatch"
        );
        assert_eq!(
            line.glyph_range.start, next_glyph,
            "{case} line {index} glyph_range mismatch"
        );
        next_char = line.char_range.end;
        next_glyph = line.glyph_range.end;

        let mut visual = layout.line_visual_order(index).to_vec();
        visual.sort_unstable();
        assert_eq!(
            visual,
            line.char_range.clone().collect::<Vec<_>>(),
            "{case} line {index} visual order mismatch"
        );
        for character in &characters[line.char_range.clone()] {
            assert_eq!(character.line, index, "{case} character line mismatch");
        }
        for glyph in &glyphs[line.glyph_range.clone()] {
            assert_eq!(glyph.hidden, line.hidden, "{case} glyph hidden mismatch");
        }
    }
    assert_eq!(
        next_char,
        characters.len(),
        "{case} character coverage mismatch"
    );
    assert_eq!(next_glyph, glyphs.len(), "{case} glyph coverage mismatch");

    let mut next_line = 0;
    for (index, paragraph) in layout.paragraphs().iter().enumerate() {
        assert_eq!(
            paragraph.lines.start, next_line,
            "{case} paragraph {index} lines mismatch"
        );
        next_line = paragraph.lines.end;
    }
    assert_eq!(
        next_line,
        layout.lines().len(),
        "{case} line coverage mismatch"
    );

    for (index, character) in characters.iter().enumerate() {
        let Some(glyph) = character.glyph else {
            panic!("{case} character {index} has no glyph");
        };
        assert!(
            glyphs[glyph].cluster.contains(&index),
            "{case} character {index} glyph mismatch"
        );
    }
    for glyph in glyphs {
        assert!(
            glyph.cluster.contains(&glyph.character),
            "{case} glyph cluster mismatch"
        );
    }
}
