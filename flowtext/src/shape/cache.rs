// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use core::hash::{Hash, Hasher};

use hashbrown::{Equivalent, HashMap};
use icu_locale_core::LanguageIdentifier;
use icu_properties::props::Script;

use super::{FontId, FontMetrics, GlyphOrientation, ShapeRequest, ShapedGlyph, Shaper};
use crate::style::TextStyle;

/// Owned form of a [`ShapeRequest`].
#[derive(Clone, Debug, PartialEq, Eq)]
struct ShapeKey {
    text: Box<str>,
    font: FontId,
    font_size: u64,
    script: Script,
    bidi_level: u8,
    language: LanguageIdentifier,
    letter_spacing: u64,
    word_spacing: u64,
    ligatures: bool,
    orientation: GlyphOrientation,
}

impl Hash for ShapeKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        hash_request_fields(
            state,
            &self.text,
            self.font,
            self.font_size,
            self.script,
            self.bidi_level,
            &self.language,
            self.letter_spacing,
            self.word_spacing,
            self.ligatures,
            self.orientation,
        );
    }
}

/// Borrowed lookup key, so that cache hits do not allocate.
struct ShapeLookup<'a, 'r>(&'r ShapeRequest<'a>);

impl Hash for ShapeLookup<'_, '_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        let request = self.0;
        hash_request_fields(
            state,
            request.text,
            request.font,
            request.font_size.to_bits(),
            request.script,
            request.bidi_level,
            request.language,
            request.letter_spacing.to_bits(),
            request.word_spacing.to_bits(),
            request.ligatures,
            request.orientation,
        );
    }
}

impl Equivalent<ShapeKey> for ShapeLookup<'_, '_> {
    fn equivalent(&self, key: &ShapeKey) -> bool {
        let request = self.0;
        *key.text == *request.text
            && key.font == request.font
            && key.font_size == request.font_size.to_bits()
            && key.script == request.script
            && key.bidi_level == request.bidi_level
            && key.language == *request.language
            && key.letter_spacing == request.letter_spacing.to_bits()
            && key.word_spacing == request.word_spacing.to_bits()
            && key.ligatures == request.ligatures
            && key.orientation == request.orientation
    }
}

impl From<&ShapeLookup<'_, '_>> for ShapeKey {
    fn from(lookup: &ShapeLookup<'_, '_>) -> Self {
        let request = lookup.0;
        Self {
            text: request.text.into(),
            font: request.font,
            font_size: request.font_size.to_bits(),
            script: request.script,
            bidi_level: request.bidi_level,
            language: request.language.clone(),
            letter_spacing: request.letter_spacing.to_bits(),
            word_spacing: request.word_spacing.to_bits(),
            ligatures: request.ligatures,
            orientation: request.orientation,
        }
    }
}

fn hash_request_fields<H: Hasher>(
    state: &mut H,
    text: &str,
    font: FontId,
    font_size: u64,
    script: Script,
    bidi_level: u8,
    language: &LanguageIdentifier,
    letter_spacing: u64,
    word_spacing: u64,
    ligatures: bool,
    orientation: GlyphOrientation,
) {
    text.hash(state);
    font.hash(state);
    font_size.hash(state);
    script.hash(state);
    bidi_level.hash(state);
    language.hash(state);
    letter_spacing.hash(state);
    word_spacing.hash(state);
    ligatures.hash(state);
    orientation.hash(state);
}

struct Entry {
    epoch: u64,
    glyphs: Vec<ShapedGlyph>,
}

/// A [`Shaper`] that memoizes the results of another one.
///
/// Shaped runs are kept in a bounded least-recently-used cache keyed by every
/// field of the [`ShapeRequest`]. Font selection and metrics are forwarded
/// unchanged.
pub struct ShapeCache<S> {
    inner: S,
    entries: HashMap<ShapeKey, Entry>,
    epoch: u64,
    max_entries: usize,
    hits: u64,
    misses: u64,
}

impl<S> core::fmt::Debug for ShapeCache<S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ShapeCache")
            .field("entries", &self.entries.len())
            .field("epoch", &self.epoch)
            .field("max_entries", &self.max_entries)
            .field("hits", &self.hits)
            .field("misses", &self.misses)
            .finish_non_exhaustive()
    }
}

impl<S: Shaper> ShapeCache<S> {
    /// Wraps `inner`, keeping at most `max_entries` shaped runs.
    pub fn new(inner: S, max_entries: usize) -> Self {
        Self {
            inner,
            entries: HashMap::new(),
            epoch: 0,
            max_entries: max_entries.max(1),
            hits: 0,
            misses: 0,
        }
    }

    /// Number of requests answered from the cache.
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Number of requests forwarded to the wrapped shaper.
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Returns the wrapped shaper.
    pub fn into_inner(self) -> S {
        self.inner
    }

    fn evict_oldest(&mut self) {
        let oldest = self
            .entries
            .iter()
            .min_by_key(|(_, entry)| entry.epoch)
            .map(|(key, _)| key.clone());
        if let Some(key) = oldest {
            self.entries.remove(&key);
        }
    }
}

impl<S: Shaper> Shaper for ShapeCache<S> {
    fn select_font(&mut self, style: &TextStyle, ch: char) -> Option<FontId> {
        self.inner.select_font(style, ch)
    }

    fn metrics(&mut self, font: FontId, font_size: f64) -> FontMetrics {
        self.inner.metrics(font, font_size)
    }

    fn shape(&mut self, request: &ShapeRequest<'_>) -> Vec<ShapedGlyph> {
        self.epoch += 1;
        let lookup = ShapeLookup(request);
        if let Some(entry) = self.entries.get_mut(&lookup) {
            entry.epoch = self.epoch;
            self.hits += 1;
            return entry.glyphs.clone();
        }
        self.misses += 1;
        let glyphs = self.inner.shape(request);
        if self.entries.len() >= self.max_entries {
            self.evict_oldest();
        }
        self.entries.insert(
            ShapeKey::from(&lookup),
            Entry {
                epoch: self.epoch,
                glyphs: glyphs.clone(),
            },
        );
        glyphs
    }

    fn units_per_pixel(&self) -> f64 {
        self.inner.units_per_pixel()
    }
}
