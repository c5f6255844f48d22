// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use icu_properties::props::Script;

use crate::itemize::ParagraphInfo;
use crate::shape::GlyphOrientation;
use crate::style::{TextOrientation, WritingMode};
use crate::{FixedAdvanceShaper, InputItem, PositionAttrs, SourceId, StyledTextRun, TextStyle};

fn run(text: &str, style: TextStyle) -> InputItem {
    InputItem::Text(StyledTextRun {
        source: SourceId(0),
        text: text.into(),
        style,
        positions: PositionAttrs::default(),
    })
}

fn itemize(
    input: &[InputItem],
    writing_mode: WritingMode,
    shaper: &mut FixedAdvanceShaper,
) -> ParagraphInfo {
    let mut para = ParagraphInfo::new(input, 0..input.len(), &TextStyle::default());
    para.itemize(input, writing_mode, shaper);
    para
}

fn item_starts(para: &ParagraphInfo) -> Vec<usize> {
    para.items
        .iter()
        .map(|item| item.char_range.start)
        .collect()
}

#[test]
fn language_changes_start_items() {
    let input: Vec<InputItem> = [
        ("Hello", "en"),
        ("monde", "fr"),
        ("Hallo", "de"),
        (" mundo", "es"),
        ("ciao", "it"),
    ]
    .into_iter()
    .map(|(text, tag)| run(text, TextStyle::default().with_language(tag).unwrap()))
    .collect();
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::HorizontalTb, &mut shaper);
    assert_eq!(item_starts(&para), vec![0, 5, 10, 15, 21]);
    assert_eq!(para.items[3].text_range, 15..21);
    assert!(para.items.iter().all(|item| item.script == Script::Latin));
}

#[test]
fn untagged_runs_around_tagged_ones() {
    let tagged = |tag: &str| TextStyle::default().with_language(tag).unwrap();
    let input = [
        run("text1", TextStyle::default()),
        run("text2", tagged("en")),
        run("text3", TextStyle::default()),
        run("\u{6F22}\u{5B57}", tagged("zh-Hant-HK")),
        run("text5", TextStyle::default()),
    ];
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::HorizontalTb, &mut shaper);
    let ranges: Vec<_> = para
        .items
        .iter()
        .map(|item| item.char_range.clone())
        .collect();
    assert_eq!(ranges, vec![0..5, 5..10, 10..15, 15..17, 17..22]);
    assert_eq!(para.items[3].script, Script::Han);
    assert_eq!(para.items[3].language.to_string(), "zh-Hant-HK");
    assert_eq!(para.items[0].language, para.items[2].language);
}

#[test]
fn script_changes_start_items() {
    let input = [run("abc\u{6F22}\u{5B57}", TextStyle::default())];
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::HorizontalTb, &mut shaper);
    assert_eq!(item_starts(&para), vec![0, 3]);
    assert_eq!(para.items[1].script, Script::Han);
}

#[test]
fn common_characters_join_their_neighbors() {
    let input = [run("1\u{6F22} \u{5B57}", TextStyle::default())];
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::HorizontalTb, &mut shaper);
    assert_eq!(para.items.len(), 1);
    assert_eq!(para.items[0].script, Script::Han);
}

#[test]
fn bidi_levels_start_items() {
    let input = [run("ab \u{5D0}\u{5D1}", TextStyle::default())];
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::HorizontalTb, &mut shaper);
    let levels: Vec<u8> = para.items.iter().map(|item| item.bidi_level).collect();
    assert_eq!(item_starts(&para), vec![0, 3]);
    assert_eq!(levels, vec![0, 1]);
}

#[test]
fn vertical_mixed_orientation_follows_script() {
    let input = [run("a\u{6F22}", TextStyle::default())];
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::VerticalRl, &mut shaper);
    let orientations: Vec<GlyphOrientation> =
        para.items.iter().map(|item| item.orientation).collect();
    assert_eq!(
        orientations,
        vec![GlyphOrientation::Sideways, GlyphOrientation::Upright]
    );

    let mut upright = TextStyle::default();
    upright.text_orientation = TextOrientation::Upright;
    let input = [run("a\u{6F22}", upright)];
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::VerticalRl, &mut shaper);
    assert!(para.items.iter().all(|item| item.orientation == GlyphOrientation::Upright));
}

#[test]
fn missing_font_gives_one_unknown_item() {
    let style = TextStyle::default().with_font_family("Nowhere");
    let input = [run("abc \u{5D0}", style)];
    let mut shaper = FixedAdvanceShaper::new().with_missing_family("Nowhere");
    let para = itemize(&input, WritingMode::HorizontalTb, &mut shaper);
    assert_eq!(para.items.len(), 1);
    assert_eq!(para.items[0].script, Script::Unknown);
    assert_eq!(para.items[0].char_range, 0..5);
}

#[test]
fn items_cover_the_paragraph() {
    let large = TextStyle::default().with_font_size(20.0);
    let input = [
        run("ab \u{5D0}", TextStyle::default()),
        run("\u{5D1} \u{6F22}c", large),
    ];
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::HorizontalTb, &mut shaper);
    let mut next = 0;
    for item in &para.items {
        assert_eq!(item.char_range.start, next);
        next = item.char_range.end;
    }
    assert_eq!(next, para.char_count());
    assert_eq!(para.item_at(0), Some(0));
    assert_eq!(para.item_at(para.char_count()), None);
}

#[test]
fn every_run_gets_a_descriptor() {
    let input = [
        run("ab", TextStyle::default()),
        run("", TextStyle::default()),
        run("\u{6F22}c", TextStyle::default()),
    ];
    let mut shaper = FixedAdvanceShaper::new();
    let para = itemize(&input, WritingMode::HorizontalTb, &mut shaper);
    let descriptors: Vec<_> = para
        .input_items
        .iter()
        .map(|info| (info.input_index, info.text_range.clone(), info.char_start))
        .collect();
    assert_eq!(descriptors, vec![(0, 0..2, 0), (1, 2..2, 2), (2, 2..6, 2)]);
}
