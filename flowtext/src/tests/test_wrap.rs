// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use crate::{test_name, WrapMode};

use super::utils::{assert_close, assert_layout_invariants, line_texts, TestEnv};

#[test]
fn wraps_at_word_boundaries() {
    let mut env = TestEnv::new(test_name!()).with_wrap_mode(WrapMode::InlineSize(30.0));
    let layout = env.layout("aaa bbb ccc");
    assert_eq!(line_texts(&layout), vec!["aaa ", "bbb ", "ccc"]);
    let baselines: Vec<f64> = layout.lines().iter().map(|line| line.baseline).collect();
    assert_eq!(baselines, vec![0.0, 12.5, 25.0]);
    assert_layout_invariants(&layout, &env.case("word_boundaries"));
}

#[test]
fn trailing_whitespace_may_overhang() {
    let mut env = TestEnv::new(test_name!()).with_wrap_mode(WrapMode::InlineSize(15.0));
    let layout = env.layout("aaa bbb");
    assert_eq!(line_texts(&layout), vec!["aaa ", "bbb"]);
    assert_close(
        layout.chunks()[0].text_width,
        15.0,
        &env.case("trimmed width"),
    );
}

#[test]
fn long_words_break_between_graphemes() {
    let mut env = TestEnv::new(test_name!()).with_wrap_mode(WrapMode::InlineSize(20.0));
    let layout = env.layout("abcdefgh");
    assert_eq!(line_texts(&layout), vec!["abcd", "efgh"]);
    assert_layout_invariants(&layout, &env.case("emergency"));
}

#[test]
fn emergency_breaks_keep_marks_with_their_base() {
    let mut env = TestEnv::new(test_name!()).with_wrap_mode(WrapMode::InlineSize(10.0));
    let layout = env.layout("ao\u{328}ab");
    assert_eq!(line_texts(&layout), vec!["ao\u{328}", "ab"]);
}

#[test]
fn tiny_widths_still_make_progress() {
    let mut env = TestEnv::new(test_name!()).with_wrap_mode(WrapMode::InlineSize(1.0));
    let layout = env.layout("abc");
    assert_eq!(line_texts(&layout), vec!["a", "b", "c"]);

    // A ligature is never split.
    let layout = env.layout("affi");
    assert_eq!(line_texts(&layout), vec!["a", "ffi"]);
    assert_layout_invariants(&layout, &env.case("ligature"));
}

#[test]
fn mandatory_breaks_end_wrapped_lines() {
    let mut env = TestEnv::new(test_name!()).with_wrap_mode(WrapMode::InlineSize(100.0));
    let layout = env.layout("ab\ncd ef");
    assert_eq!(line_texts(&layout), vec!["ab\n", "cd ef"]);
}

#[test]
fn unwrapped_text_ignores_width() {
    let mut env = TestEnv::new(test_name!());
    let layout = env.layout("a very long line that would wrap anywhere else");
    assert_eq!(layout.lines().len(), 1);
    assert!(layout.chunks()[0].available_width.is_infinite());
}
