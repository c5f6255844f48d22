// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Paragraph construction and itemization.

use core::ops::Range;

use icu_locale_core::LanguageIdentifier;
use icu_properties::props::Script;
use icu_properties::CodePointMapData;

use crate::analysis::{analyze_text, CharAttributes};
use crate::bidi::{base_level, resolve_levels};
use crate::input::{InputItem, StyledTextRun};
use crate::shape::{FontId, GlyphOrientation, Shaper};
use crate::spans::UnbrokenSpan;
use crate::style::{Alignment, Direction, TextOrientation, TextStyle, WritingMode};

/// One input run of a paragraph. Runs never open a nested flow; a
/// [`ControlCode::ShapeBreak`](crate::ControlCode::ShapeBreak) moves on to the
/// next region instead.
#[derive(Clone, Debug)]
pub(crate) struct InputItemInfo {
    /// Index of the run in the layout's input stream.
    pub(crate) input_index: usize,
    /// Byte range of the run's text within the paragraph text.
    pub(crate) text_range: Range<usize>,
    /// Index of the run's first character within the paragraph.
    pub(crate) char_start: usize,
}

/// A maximal run of text sharing one script, direction, font, language and
/// glyph orientation.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Item {
    pub(crate) text_range: Range<usize>,
    pub(crate) char_range: Range<usize>,
    pub(crate) script: Script,
    pub(crate) bidi_level: u8,
    pub(crate) font: FontId,
    pub(crate) language: LanguageIdentifier,
    pub(crate) orientation: GlyphOrientation,
}

/// Working state for one paragraph. Dropped once its lines are output.
#[derive(Debug)]
pub(crate) struct ParagraphInfo {
    pub(crate) text: String,
    pub(crate) direction: Direction,
    pub(crate) alignment: Alignment,
    pub(crate) input_items: Vec<InputItemInfo>,
    pub(crate) items: Vec<Item>,
    pub(crate) char_attributes: Vec<CharAttributes>,
    pub(crate) unbroken_spans: Vec<UnbrokenSpan>,
}

impl ParagraphInfo {
    /// Collects the text runs of `input[range]` into a new paragraph.
    ///
    /// The paragraph's direction and alignment come from its first text run,
    /// or from `fallback` if there is none.
    pub(crate) fn new(input: &[InputItem], range: Range<usize>, fallback: &TextStyle) -> Self {
        let mut text = String::new();
        let mut input_items = Vec::new();
        let mut char_start = 0;
        let mut first_style = None;
        for input_index in range {
            let Some(run) = input[input_index].as_text() else {
                continue;
            };
            first_style.get_or_insert(&run.style);
            let start = text.len();
            text.push_str(&run.text);
            input_items.push(InputItemInfo {
                input_index,
                text_range: start..text.len(),
                char_start,
            });
            char_start += run.text.chars().count();
        }
        let style = first_style.unwrap_or(fallback);
        Self {
            text,
            direction: style.direction,
            alignment: style.alignment,
            input_items,
            items: Vec::new(),
            char_attributes: Vec::new(),
            unbroken_spans: Vec::new(),
        }
    }

    pub(crate) fn char_count(&self) -> usize {
        self.char_attributes.len()
    }

    /// Splits the paragraph into items and computes character attributes.
    pub(crate) fn itemize<S: Shaper + ?Sized>(
        &mut self,
        input: &[InputItem],
        writing_mode: WritingMode,
        shaper: &mut S,
    ) {
        self.char_attributes = analyze_text(&self.text);
        self.items.clear();
        if self.text.is_empty() {
            return;
        }

        let runs: Vec<&StyledTextRun> = self
            .input_items
            .iter()
            .filter_map(|info| input[info.input_index].as_text())
            .collect();
        // Input run owning each character.
        let owners: Vec<usize> = self
            .input_items
            .iter()
            .enumerate()
            .flat_map(|(index, info)| {
                let count = self.text[info.text_range.clone()].chars().count();
                core::iter::repeat(index).take(count)
            })
            .collect();

        let levels = resolve_levels(
            &self.text,
            self.direction,
            owners.iter().map(|&owner| {
                let style = &runs[owner].style;
                style.bidi_override.then_some(style.direction)
            }),
        );

        let fonts: Vec<Option<FontId>> = self
            .text
            .chars()
            .zip(&owners)
            .map(|(ch, &owner)| shaper.select_font(&runs[owner].style, ch))
            .collect();
        let Some(first_font) = fonts.iter().flatten().next().copied() else {
            log::warn!(
                "no font available for paragraph {:?}, using a single unknown-script item",
                self.text
            );
            self.items.push(Item {
                text_range: 0..self.text.len(),
                char_range: 0..self.char_count(),
                script: Script::Unknown,
                bidi_level: base_level(self.direction),
                font: FontId::default(),
                language: LanguageIdentifier::UNKNOWN,
                orientation: GlyphOrientation::Horizontal,
            });
            return;
        };

        let script_map = CodePointMapData::<Script>::new();
        let first_script = self
            .text
            .chars()
            .map(|ch| script_map.get(ch))
            .find(|&script| is_real_script(script))
            .unwrap_or(Script::Common);

        let mut items: Vec<Item> = Vec::new();
        let mut item_owner = 0;
        let chars = self.text.char_indices().zip(&owners).enumerate();
        for (char_index, ((offset, ch), &owner)) in chars {
            let style = &runs[owner].style;
            let current = items.last();
            let script = match script_map.get(ch) {
                script if is_real_script(script) => script,
                _ => current.map_or(first_script, |item| item.script),
            };
            let font = fonts[char_index]
                .or(current.map(|item| item.font))
                .unwrap_or(first_font);
            let language = style
                .language
                .clone()
                .unwrap_or(LanguageIdentifier::UNKNOWN);
            let orientation = resolve_orientation(writing_mode, style.text_orientation, script);
            let level = levels[char_index];

            let continues = current.is_some_and(|item| {
                item.script == script
                    && item.bidi_level == level
                    && item.font == font
                    && item.language == language
                    && item.orientation == orientation
                    && runs[item_owner].style.shapes_like(style)
            });
            let end = offset + ch.len_utf8();
            if continues {
                if let Some(item) = items.last_mut() {
                    item.text_range.end = end;
                    item.char_range.end = char_index + 1;
                }
            } else {
                item_owner = owner;
                items.push(Item {
                    text_range: offset..end,
                    char_range: char_index..char_index + 1,
                    script,
                    bidi_level: level,
                    font,
                    language,
                    orientation,
                });
            }
        }
        log::trace!("itemized paragraph into {} items", items.len());
        self.items = items;
    }

    /// Index of the item containing the character at `char_index`.
    pub(crate) fn item_at(&self, char_index: usize) -> Option<usize> {
        self.items
            .binary_search_by(|item| {
                if item.char_range.end <= char_index {
                    core::cmp::Ordering::Less
                } else if item.char_range.start > char_index {
                    core::cmp::Ordering::Greater
                } else {
                    core::cmp::Ordering::Equal
                }
            })
            .ok()
    }
}

fn is_real_script(script: Script) -> bool {
    !matches!(script, Script::Common | Script::Inherited | Script::Unknown)
}

fn is_upright_script(script: Script) -> bool {
    matches!(
        script,
        Script::Han
            | Script::Hiragana
            | Script::Katakana
            | Script::Hangul
            | Script::Bopomofo
            | Script::Yi
    )
}

fn resolve_orientation(
    writing_mode: WritingMode,
    text_orientation: TextOrientation,
    script: Script,
) -> GlyphOrientation {
    if !writing_mode.is_vertical() {
        return GlyphOrientation::Horizontal;
    }
    match text_orientation {
        TextOrientation::Upright => GlyphOrientation::Upright,
        TextOrientation::Sideways => GlyphOrientation::Sideways,
        TextOrientation::Mixed if is_upright_script(script) => GlyphOrientation::Upright,
        TextOrientation::Mixed => GlyphOrientation::Sideways,
    }
}
