// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::kurbo::Point;
use crate::{test_name, LayoutOptions, LigatureCursorPolicy};

use super::utils::{cursor_anchors, TestEnv};

fn anchor_xs(anchors: &[(usize, Point)]) -> Vec<f64> {
    anchors.iter().map(|(_, point)| point.x).collect()
}

#[test]
fn ligatures_are_subdivided() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("affib");
    assert_eq!(layout.glyphs().len(), 3);
    let anchors = cursor_anchors(&layout);
    assert_eq!(anchor_xs(&anchors), vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0]);
    assert_eq!(layout.char_to_glyph(1), Some(1));
    assert_eq!(layout.char_to_glyph(2), Some(1));
    assert_eq!(layout.char_to_glyph(3), Some(1));
    assert_eq!(layout.glyphs()[1].cluster, 1..4);
}

#[test]
fn ligatures_inside_and_at_the_start_of_words() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("office");
    assert_eq!(layout.glyphs().len(), 4);
    assert_eq!(layout.glyphs()[1].cluster, 1..4);
    let anchors = cursor_anchors(&layout);
    let indices: Vec<usize> = anchors.iter().map(|(index, _)| *index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3, 4, 5, 6]);
    assert_eq!(
        anchor_xs(&anchors),
        vec![0.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0]
    );

    let layout = env.layout("flow");
    assert_eq!(layout.glyphs().len(), 3);
    assert_eq!(layout.char_to_glyph(1), Some(0));
    let anchors = cursor_anchors(&layout);
    assert_eq!(anchor_xs(&anchors), vec![0.0, 5.0, 10.0, 15.0, 20.0]);
    let mut iter = layout.iterator_at_char(1);
    assert!(iter.cursor_right());
    assert_eq!(iter.char_index(), 2);
}

#[test]
fn ligatures_can_collapse_to_one_stop() {
    let options = LayoutOptions {
        ligature_cursor: LigatureCursorPolicy::Collapse,
        ..LayoutOptions::default()
    };
    let mut env = TestEnv::new(test_name!()).with_options(options);
    let layout = env.layout("affib");
    let xs: Vec<f64> = layout
        .characters()
        .iter()
        .map(|character| character.inline)
        .collect();
    assert_eq!(xs, vec![0.0, 5.0, 5.0, 5.0, 20.0]);
    assert_eq!(layout.characters()[1].advance, 15.0);
    assert_eq!(layout.characters()[2].advance, 0.0);
}

#[test]
fn marks_are_skipped_by_the_cursor() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("ao\u{328}a");
    let anchors = cursor_anchors(&layout);
    let indices: Vec<usize> = anchors.iter().map(|(index, _)| *index).collect();
    assert_eq!(indices, vec![0, 1, 3, 4]);
    assert_eq!(anchor_xs(&anchors), vec![0.0, 5.0, 10.0, 15.0]);

    let mut iter = layout.end();
    assert!(iter.prev_cursor_position());
    assert!(iter.prev_cursor_position());
    assert_eq!(iter.char_index(), 1);
}

#[test]
fn word_and_line_navigation() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("ab cd\nef");
    assert_eq!(layout.lines().len(), 2);

    let mut iter = layout.begin();
    assert!(iter.next_start_of_word());
    assert_eq!(iter.char_index(), 3);
    assert!(iter.next_start_of_word());
    assert_eq!(iter.char_index(), 6);
    assert!(!iter.next_start_of_word());
    assert!(iter.is_end());
    assert!(iter.prev_start_of_word());
    assert_eq!(iter.char_index(), 6);

    let mut iter = layout.iterator_at_char(1);
    assert!(iter.this_end_of_line());
    assert_eq!(iter.char_index(), 5);
    assert!(iter.this_start_of_line());
    assert_eq!(iter.char_index(), 0);
    assert!(iter.next_start_of_line());
    assert_eq!(iter.char_index(), 6);
    assert!(iter.this_end_of_line());
    assert!(iter.is_end());
    assert!(!iter.next_start_of_line());
    assert!(iter.prev_start_of_line());
    assert_eq!(iter.char_index(), 0);
}

#[test]
fn vertical_movement_keeps_the_column() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("abcd\nab\nabcd");
    let mut iter = layout.iterator_at_char(3);
    assert!(iter.cursor_down());
    assert_eq!(iter.char_index(), 7);
    assert!(iter.cursor_down());
    assert_eq!(iter.char_index(), 11);
    assert!(!iter.cursor_down());
    assert!(iter.cursor_up());
    assert_eq!(iter.char_index(), 7);
    assert!(iter.cursor_up());
    assert_eq!(iter.char_index(), 3);
    assert!(!iter.cursor_up());
}

#[test]
fn horizontal_movement() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("abc");
    let mut iter = layout.begin();
    assert!(iter.cursor_right());
    assert_eq!(iter.char_index(), 1);
    assert!(iter.cursor_left());
    assert!(iter.is_start());
    assert!(!iter.cursor_left());

    let mut iter = layout.end();
    assert!(!iter.cursor_right());
    assert!(iter.cursor_left());
    assert_eq!(iter.char_index(), 2);
}

#[test]
fn nearest_cursor_position() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("abc def");
    let nearest = |x, y| layout.nearest_cursor_position_to(Point::new(x, y));
    assert_eq!(nearest(11.0, 0.0).char_index(), 2);
    assert_eq!(nearest(-50.0, 3.0).char_index(), 0);
    assert!(nearest(500.0, 0.0).is_end());

    let layout = env.layout("ab\ncd");
    let nearest = |x, y| layout.nearest_cursor_position_to(Point::new(x, y));
    assert_eq!(nearest(6.0, 13.0).char_index(), 4);
    assert_eq!(nearest(6.0, -30.0).char_index(), 1);
}

#[test]
fn stored_positions_expire() {
    let mut env = TestEnv::new(test_name!());
    let mut layout = env.layout("abc");
    let position = layout.iterator_at_char(2).position();
    assert_eq!(position.char_index(), 2);
    assert_eq!(
        layout.iterator_at(position).map(|iter| iter.char_index()),
        Some(2)
    );

    env.calculate(&mut layout);
    assert!(layout.iterator_at(position).is_none());
    let fresh = layout.begin().position();
    assert!(fresh.generation() > position.generation());
}

#[test]
fn anchors_advance_along_a_line() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("hello, wide world");
    let xs = anchor_xs(&cursor_anchors(&layout));
    assert!(xs.windows(2).all(|pair| pair[0] < pair[1]), "{xs:?}");
    assert_eq!(xs.last().copied(), Some(85.0));
}
