// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Cursor positions and navigation over a calculated layout.

use peniko::kurbo::Point;

use super::data::Character;
use super::Layout;
use crate::input::SourceId;

/// Inline distances closer than this are the same cursor stop.
const STOP_EPSILON: f64 = 1e-9;

/// A stored position in a layout.
///
/// Positions carry the generation of the layout they were taken from and are
/// rejected by [`Layout::iterator_at`] once the layout has been recalculated.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct TextPosition {
    char_index: usize,
    generation: u64,
}

impl TextPosition {
    /// Index of the character the position is before.
    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// The layout generation the position belongs to.
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// A cursor over the characters of a [`Layout`].
///
/// The iterator sits before a character, or at the end of the text. Movement
/// methods return `false` when they cannot move, or, for forward movement,
/// when they reach the end of the text.
#[derive(Copy, Clone)]
pub struct LayoutIterator<'a> {
    layout: &'a Layout,
    char_index: usize,
    /// Inline coordinate kept across vertical movement.
    x_coordinate: Option<f64>,
}

impl core::fmt::Debug for LayoutIterator<'_> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("LayoutIterator")
            .field("char_index", &self.char_index)
            .field("x_coordinate", &self.x_coordinate)
            .finish_non_exhaustive()
    }
}

impl<'a> LayoutIterator<'a> {
    fn new(layout: &'a Layout, char_index: usize) -> Self {
        Self {
            layout,
            char_index: char_index.min(layout.data.characters.len()),
            x_coordinate: None,
        }
    }

    fn characters(&self) -> &'a [Character] {
        &self.layout.data.characters
    }

    fn move_to(&mut self, char_index: usize) {
        self.char_index = char_index;
        self.x_coordinate = None;
    }

    /// Index of the character the iterator is before.
    pub fn char_index(&self) -> usize {
        self.char_index
    }

    /// A storable form of this position.
    pub fn position(&self) -> TextPosition {
        TextPosition {
            char_index: self.char_index,
            generation: self.layout.generation,
        }
    }

    /// Returns `true` at the start of the text.
    pub fn is_start(&self) -> bool {
        self.char_index == 0
    }

    /// Returns `true` at the end of the text.
    pub fn is_end(&self) -> bool {
        self.char_index >= self.characters().len()
    }

    /// The character after the iterator.
    pub fn character(&self) -> Option<&'a Character> {
        self.characters().get(self.char_index)
    }

    /// The glyph of the character after the iterator.
    pub fn glyph(&self) -> Option<usize> {
        self.character()?.glyph
    }

    /// The line the iterator is on. The end of the text is on the last line.
    pub fn line(&self) -> Option<usize> {
        match self.character() {
            Some(character) => Some(character.line),
            None => self.layout.data.lines.len().checked_sub(1),
        }
    }

    /// Moves to the next character.
    pub fn next_character(&mut self) -> bool {
        if self.is_end() {
            return false;
        }
        self.move_to(self.char_index + 1);
        !self.is_end()
    }

    /// Moves to the previous character.
    pub fn prev_character(&mut self) -> bool {
        if self.is_start() {
            return false;
        }
        self.move_to(self.char_index - 1);
        true
    }

    /// Moves to the next position a text cursor may occupy.
    pub fn next_cursor_position(&mut self) -> bool {
        let characters = self.characters();
        while !self.is_end() {
            self.move_to(self.char_index + 1);
            match characters.get(self.char_index) {
                None => return false,
                Some(character) if character.attributes.is_cursor_position() => return true,
                Some(_) => {}
            }
        }
        false
    }

    /// Moves to the previous position a text cursor may occupy.
    pub fn prev_cursor_position(&mut self) -> bool {
        let characters = self.characters();
        while !self.is_start() {
            self.move_to(self.char_index - 1);
            if characters[self.char_index].attributes.is_cursor_position() {
                return true;
            }
        }
        false
    }

    /// Moves to the start of the next word.
    pub fn next_start_of_word(&mut self) -> bool {
        let characters = self.characters();
        while !self.is_end() {
            self.move_to(self.char_index + 1);
            match characters.get(self.char_index) {
                None => return false,
                Some(character) if character.attributes.is_word_start() => return true,
                Some(_) => {}
            }
        }
        false
    }

    /// Moves to the start of the current word, or of the previous word if
    /// already at a word start.
    pub fn prev_start_of_word(&mut self) -> bool {
        let characters = self.characters();
        while !self.is_start() {
            self.move_to(self.char_index - 1);
            if characters[self.char_index].attributes.is_word_start() {
                return true;
            }
        }
        false
    }

    /// Moves to the first character of the current line.
    pub fn this_start_of_line(&mut self) -> bool {
        let Some(line) = self.line() else {
            return false;
        };
        self.move_to(self.layout.data.lines[line].char_range.start);
        true
    }

    /// Moves to the end of the current line.
    ///
    /// On every line but the last, the end is before the trailing white space
    /// or line break the line was broken after.
    pub fn this_end_of_line(&mut self) -> bool {
        let Some(line) = self.line() else {
            return false;
        };
        let lines = &self.layout.data.lines;
        let range = lines[line].char_range.clone();
        let end = if line + 1 == lines.len() {
            self.characters().len()
        } else if range
            .clone()
            .last()
            .is_some_and(|last| self.characters()[last].attributes.is_white())
        {
            range.end - 1
        } else {
            range.end
        };
        self.move_to(end);
        true
    }

    /// Moves to the first character of the next line.
    pub fn next_start_of_line(&mut self) -> bool {
        let Some(line) = self.line() else {
            return false;
        };
        match self.layout.data.lines.get(line + 1) {
            Some(next) => {
                self.move_to(next.char_range.start);
                true
            }
            None => {
                self.move_to(self.characters().len());
                false
            }
        }
    }

    /// Moves to the first character of the previous line.
    pub fn prev_start_of_line(&mut self) -> bool {
        let Some(line) = self.line() else {
            return false;
        };
        match line.checked_sub(1) {
            Some(previous) => {
                self.move_to(self.layout.data.lines[previous].char_range.start);
                true
            }
            None => {
                self.move_to(0);
                false
            }
        }
    }

    /// Moves one cursor stop to the left on screen.
    pub fn cursor_left(&mut self) -> bool {
        self.cursor_horizontal(-1.0)
    }

    /// Moves one cursor stop to the right on screen.
    pub fn cursor_right(&mut self) -> bool {
        self.cursor_horizontal(1.0)
    }

    fn cursor_horizontal(&mut self, direction: f64) -> bool {
        let Some(line) = self.line() else {
            return false;
        };
        let current = self.layout.cursor_inline(self.char_index);
        let target = self
            .layout
            .cursor_stops(line)
            .into_iter()
            .filter(|&(index, inline)| {
                index != self.char_index && (inline - current) * direction > STOP_EPSILON
            })
            .min_by(|a, b| (a.1 - current).abs().total_cmp(&(b.1 - current).abs()));
        if let Some((index, _)) = target {
            self.move_to(index);
            return true;
        }
        // Off the edge of the line: continue in logical order.
        let paragraph = self.layout.data.lines[line].paragraph;
        let rtl = self.layout.data.paragraphs[paragraph].direction.is_rtl();
        if (direction > 0.0) != rtl {
            self.next_cursor_position()
        } else {
            self.prev_cursor_position()
        }
    }

    /// Moves to the nearest cursor stop on the line above, keeping the
    /// inline coordinate across repeated vertical moves.
    pub fn cursor_up(&mut self) -> bool {
        self.cursor_vertical(false)
    }

    /// Moves to the nearest cursor stop on the line below, keeping the
    /// inline coordinate across repeated vertical moves.
    pub fn cursor_down(&mut self) -> bool {
        self.cursor_vertical(true)
    }

    fn cursor_vertical(&mut self, down: bool) -> bool {
        let Some(line) = self.line() else {
            return false;
        };
        let target = if down {
            line + 1
        } else {
            let Some(previous) = line.checked_sub(1) else {
                return false;
            };
            previous
        };
        if target >= self.layout.data.lines.len() {
            return false;
        }
        let x = self
            .x_coordinate
            .unwrap_or_else(|| self.layout.cursor_inline(self.char_index));
        self.char_index = self.layout.nearest_on_line(target, x);
        self.x_coordinate = Some(x);
        true
    }
}

impl Layout {
    /// An iterator at the first character.
    pub fn begin(&self) -> LayoutIterator<'_> {
        LayoutIterator::new(self, 0)
    }

    /// An iterator at the end of the text.
    pub fn end(&self) -> LayoutIterator<'_> {
        LayoutIterator::new(self, self.data.characters.len())
    }

    /// An iterator before the character at `char_index`, clamped to the end.
    pub fn iterator_at_char(&self, char_index: usize) -> LayoutIterator<'_> {
        LayoutIterator::new(self, char_index)
    }

    /// Restores a stored position. Returns `None` if the position belongs to
    /// another generation of this layout or is out of range.
    pub fn iterator_at(&self, position: TextPosition) -> Option<LayoutIterator<'_>> {
        if position.generation != self.generation
            || position.char_index > self.data.characters.len()
        {
            return None;
        }
        Some(LayoutIterator::new(self, position.char_index))
    }

    /// The point a cursor at `iterator` is drawn at, on the baseline.
    pub fn character_anchor_point(&self, iterator: &LayoutIterator<'_>) -> Point {
        let characters = &self.data.characters;
        if let Some(character) = characters.get(iterator.char_index) {
            return self.to_document(character.inline, character.block);
        }
        if let Some(last) = characters.last() {
            return self.to_document(last.inline_end(), last.block);
        }
        match (self.data.lines.first(), self.data.chunks.first()) {
            (Some(line), Some(chunk)) => self.to_document(chunk.left, line.baseline),
            _ => Point::ZERO,
        }
    }

    /// The cursor position closest to `point`, preferring visible lines.
    pub fn nearest_cursor_position_to(&self, point: Point) -> LayoutIterator<'_> {
        let (inline, block) = self.axes().to_inline_block(point);
        let distance = |line: &super::Line| {
            let top = line.baseline - line.ascent;
            let bottom = line.baseline + line.descent;
            if block < top {
                top - block
            } else if block > bottom {
                block - bottom
            } else {
                0.0
            }
        };
        let lines = &self.data.lines;
        let nearest = |visible_only: bool| {
            lines
                .iter()
                .enumerate()
                .filter(|(_, line)| !visible_only || !line.hidden)
                .min_by(|a, b| distance(a.1).total_cmp(&distance(b.1)))
                .map(|(index, _)| index)
        };
        let Some(line) = nearest(true).or_else(|| nearest(false)) else {
            return self.begin();
        };
        LayoutIterator::new(self, self.nearest_on_line(line, inline))
    }

    /// The source object of the character after `iterator`, with the byte
    /// offset of the character within that object's run.
    pub fn source_of_character(&self, iterator: &LayoutIterator<'_>) -> Option<(SourceId, usize)> {
        let character = self.data.characters.get(iterator.char_index)?;
        let span = self.data.spans.get(character.span)?;
        Some((span.source, character.source_byte))
    }

    /// Returns `true` if the character after `iterator` is on a hidden line.
    pub fn is_hidden(&self, iterator: &LayoutIterator<'_>) -> bool {
        iterator
            .character()
            .and_then(|character| self.data.lines.get(character.line))
            .is_some_and(|line| line.hidden)
    }

    /// Inline coordinate of the cursor before `char_index`.
    fn cursor_inline(&self, char_index: usize) -> f64 {
        let characters = &self.data.characters;
        match characters.get(char_index) {
            Some(character) => character.inline,
            None => characters.last().map_or(0.0, Character::inline_end),
        }
    }

    /// Cursor stops of a line with their inline coordinates.
    fn cursor_stops(&self, line_index: usize) -> Vec<(usize, f64)> {
        let characters = &self.data.characters;
        let line = &self.data.lines[line_index];
        let range = line.char_range.clone();
        let mut stops: Vec<(usize, f64)> = range
            .clone()
            .filter(|&index| characters[index].attributes.is_cursor_position())
            .map(|index| (index, characters[index].inline))
            .collect();
        let Some(last) = range.clone().last().map(|index| &characters[index]) else {
            let left = self
                .data
                .chunks
                .get(line.chunks.start)
                .map_or(0.0, |chunk| chunk.left);
            return vec![(range.start, left)];
        };
        let is_last_line = line_index + 1 == self.data.lines.len();
        if is_last_line || !last.attributes.is_white() {
            stops.push((range.end, last.inline_end()));
        }
        stops
    }

    fn nearest_on_line(&self, line_index: usize, inline: f64) -> usize {
        self.cursor_stops(line_index)
            .into_iter()
            .min_by(|a, b| (a.1 - inline).abs().total_cmp(&(b.1 - inline).abs()))
            .map_or(
                self.data.lines[line_index].char_range.start,
                |(index, _)| index,
            )
    }
}
