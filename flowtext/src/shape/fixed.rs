// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use icu_properties::props::{GeneralCategory, Script};
use icu_properties::CodePointMapData;

use super::{FontId, FontMetrics, GlyphOrientation, ShapeRequest, ShapedGlyph, Shaper};
use crate::style::TextStyle;

/// A deterministic [`Shaper`] with fixed advances.
///
/// Narrow characters advance half an em, East Asian wide characters and
/// upright vertical glyphs advance a full em, and marks and control characters
/// have no advance. Marks join the cluster of the preceding character. An
/// optional ligature table replaces character sequences by single glyphs.
///
/// This is useful for headless measurement, where real font data is not
/// available, and for tests.
#[derive(Clone, Debug)]
pub struct FixedAdvanceShaper {
    families: Vec<String>,
    missing_families: Vec<String>,
    ligatures: Vec<(String, u32)>,
    narrow_advance: f64,
    ascent: f64,
    descent: f64,
    units_per_pixel: f64,
}

impl Default for FixedAdvanceShaper {
    fn default() -> Self {
        Self::new()
    }
}

impl FixedAdvanceShaper {
    /// Glyph identifiers at or above this value denote ligatures.
    pub const LIGATURE_GLYPH_BASE: u32 = 0x11_0000;

    /// Creates a shaper without ligatures.
    pub fn new() -> Self {
        Self {
            families: Vec::new(),
            missing_families: Vec::new(),
            ligatures: Vec::new(),
            narrow_advance: 0.5,
            ascent: 0.8,
            descent: 0.2,
            units_per_pixel: 1.0,
        }
    }

    /// Adds the common Latin `f` ligatures (`ffi`, `ffl`, `ff`, `fi`, `fl`).
    pub fn with_common_ligatures(self) -> Self {
        ["ffi", "ffl", "ff", "fi", "fl"]
            .into_iter()
            .fold(self, |shaper, sequence| shaper.with_ligature(sequence))
    }

    /// Adds a ligature replacing `sequence` by a single glyph.
    pub fn with_ligature(mut self, sequence: &str) -> Self {
        if sequence.chars().count() < 2 {
            return self;
        }
        let id = u32::try_from(self.ligatures.len())
            .ok()
            .and_then(|count| Self::LIGATURE_GLYPH_BASE.checked_add(count));
        if let Some(id) = id {
            self.ligatures.push((sequence.to_owned(), id));
        }
        self
    }

    /// Sets the advance of narrow characters, in ems.
    pub fn with_narrow_advance(mut self, advance: f64) -> Self {
        self.narrow_advance = advance;
        self
    }

    /// Sets the ascent and descent, in ems.
    pub fn with_vertical_metrics(mut self, ascent: f64, descent: f64) -> Self {
        self.ascent = ascent;
        self.descent = descent;
        self
    }

    /// Reports every length multiplied by `units_per_pixel`.
    pub fn with_units_per_pixel(mut self, units_per_pixel: f64) -> Self {
        self.units_per_pixel = units_per_pixel;
        self
    }

    /// Makes font selection fail for `family`.
    pub fn with_missing_family(mut self, family: &str) -> Self {
        self.missing_families.push(family.to_owned());
        self
    }

    fn match_ligature(&self, text: &str) -> Option<(usize, u32)> {
        self.ligatures
            .iter()
            .filter(|(sequence, _)| text.starts_with(sequence.as_str()))
            .max_by_key(|(sequence, _)| sequence.len())
            .map(|(sequence, id)| (sequence.len(), *id))
    }

    fn advance(&self, ch: char, orientation: GlyphOrientation) -> f64 {
        let category = CodePointMapData::<GeneralCategory>::new().get(ch);
        if matches!(
            category,
            GeneralCategory::NonspacingMark
                | GeneralCategory::EnclosingMark
                | GeneralCategory::Control
                | GeneralCategory::Format
        ) {
            return 0.0;
        }
        if orientation == GlyphOrientation::Upright || is_wide(ch) {
            1.0
        } else {
            self.narrow_advance
        }
    }
}

fn is_mark(ch: char) -> bool {
    matches!(
        CodePointMapData::<GeneralCategory>::new().get(ch),
        GeneralCategory::NonspacingMark | GeneralCategory::EnclosingMark
    )
}

fn is_wide(ch: char) -> bool {
    let script = CodePointMapData::<Script>::new().get(ch);
    matches!(
        script,
        Script::Han | Script::Hiragana | Script::Katakana | Script::Hangul | Script::Bopomofo
    ) || ('\u{FF01}'..='\u{FF60}').contains(&ch)
        || ('\u{3000}'..='\u{303F}').contains(&ch)
}

impl Shaper for FixedAdvanceShaper {
    fn select_font(&mut self, style: &TextStyle, _ch: char) -> Option<FontId> {
        if self.missing_families.contains(&style.font_family) {
            return None;
        }
        let index = match self
            .families
            .iter()
            .position(|family| *family == style.font_family)
        {
            Some(index) => index,
            None => {
                self.families.push(style.font_family.clone());
                self.families.len() - 1
            }
        };
        u32::try_from(index).ok().map(FontId)
    }

    fn metrics(&mut self, _font: FontId, font_size: f64) -> FontMetrics {
        let em = font_size * self.units_per_pixel;
        FontMetrics {
            ascent: self.ascent * em,
            descent: self.descent * em,
            em,
        }
    }

    fn shape(&mut self, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph> {
        let em = request.font_size * self.units_per_pixel;
        let allow_ligatures = request.ligatures && request.letter_spacing == 0.0;
        let text = request.text;
        let mut glyphs: Vec<ShapedGlyph> = Vec::with_capacity(text.len());
        let mut offset = 0;
        while let Some(ch) = text[offset..].chars().next() {
            let Ok(cluster_offset) = u32::try_from(offset) else {
                break;
            };
            if allow_ligatures {
                if let Some((len, glyph_id)) = self.match_ligature(&text[offset..]) {
                    let advance = text[offset..offset + len]
                        .chars()
                        .map(|c| self.advance(c, request.orientation))
                        .sum::<f64>();
                    glyphs.push(ShapedGlyph {
                        glyph_id,
                        cluster: cluster_offset,
                        advance: advance * em,
                        ..ShapedGlyph::default()
                    });
                    offset += len;
                    continue;
                }
            }
            let cluster = match glyphs.last() {
                Some(previous) if is_mark(ch) => previous.cluster,
                _ => cluster_offset,
            };
            glyphs.push(ShapedGlyph {
                glyph_id: ch as u32,
                cluster,
                advance: self.advance(ch, request.orientation) * em,
                ..ShapedGlyph::default()
            });
            offset += ch.len_utf8();
        }
        glyphs
    }

    fn units_per_pixel(&self) -> f64 {
        self.units_per_pixel
    }
}

#[cfg(test)]
mod tests {
    use icu_locale_core::LanguageIdentifier;

    use super::*;

    fn request<'a>(text: &'a str, language: &'a LanguageIdentifier) -> ShapeRequest<'a> {
        ShapeRequest {
            text,
            font: FontId(0),
            font_size: 10.0,
            script: Script::Latin,
            bidi_level: 0,
            language,
            letter_spacing: 0.0,
            word_spacing: 0.0,
            ligatures: true,
            orientation: GlyphOrientation::Horizontal,
        }
    }

    #[test]
    fn longest_ligature_wins() {
        let language = LanguageIdentifier::UNKNOWN;
        let mut shaper = FixedAdvanceShaper::new().with_common_ligatures();
        let glyphs = shaper.shape(&request("affib", &language));
        assert_eq!(glyphs.len(), 3);
        assert_eq!(
            glyphs.iter().map(|g| g.cluster).collect::<Vec<_>>(),
            vec![0, 1, 4]
        );
        assert_eq!(glyphs[1].advance, 15.0);
    }

    #[test]
    fn letter_spacing_disables_ligatures() {
        let language = LanguageIdentifier::UNKNOWN;
        let mut shaper = FixedAdvanceShaper::new().with_common_ligatures();
        let mut req = request("affib", &language);
        req.letter_spacing = 1.0;
        assert_eq!(shaper.shape(&req).len(), 5);
    }

    #[test]
    fn marks_join_previous_cluster() {
        let language = LanguageIdentifier::UNKNOWN;
        let mut shaper = FixedAdvanceShaper::new();
        let glyphs = shaper.shape(&request("ao\u{328}a", &language));
        assert_eq!(
            glyphs.iter().map(|g| g.cluster).collect::<Vec<_>>(),
            vec![0, 1, 1, 4]
        );
        assert_eq!(glyphs[2].advance, 0.0);
    }

    #[test]
    fn ligatures_get_ids_in_order() {
        let language = LanguageIdentifier::UNKNOWN;
        let mut shaper = FixedAdvanceShaper::new()
            .with_ligature("ab")
            .with_ligature("x")
            .with_ligature("cd");
        let ids: Vec<u32> = shaper
            .shape(&request("abcd", &language))
            .iter()
            .map(|g| g.glyph_id)
            .collect();
        let base = FixedAdvanceShaper::LIGATURE_GLYPH_BASE;
        assert_eq!(ids, vec![base, base + 1]);
    }

    #[test]
    fn families_get_distinct_fonts() {
        let mut shaper = FixedAdvanceShaper::new();
        let serif = TextStyle::default().with_font_family("serif");
        let sans = TextStyle::default().with_font_family("sans-serif");
        assert_eq!(shaper.select_font(&serif, 'a'), Some(FontId(0)));
        assert_eq!(shaper.select_font(&sans, 'a'), Some(FontId(1)));
        assert_eq!(shaper.select_font(&serif, 'b'), Some(FontId(0)));
    }

    #[test]
    fn missing_family_has_no_font() {
        let mut shaper = FixedAdvanceShaper::new().with_missing_family("nothing");
        let style = TextStyle::default().with_font_family("nothing");
        assert_eq!(shaper.select_font(&style, 'a'), None);
        assert_eq!(
            shaper.select_font(&TextStyle::default(), 'a'),
            Some(FontId(0))
        );
    }
}
