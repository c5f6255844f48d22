// Copyright 2026 the Flowtext Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use super::measure::ChunkInfo;
use crate::style::{Alignment, Direction, ResolvedAlignment};

/// Where a chunk starts once aligned, and the extra width given to each of
/// its white space characters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub(super) struct ChunkPlacement {
    pub(super) left: f64,
    pub(super) add_to_each_whitespace: f64,
}

/// Aligns a chunk within its scan run.
///
/// A chunk with an unbounded scan run is anchored at its `x` instead: left
/// alignment starts there, right alignment ends there and centered text is
/// centered on it. `last_in_paragraph` suppresses justification, which then
/// falls back to start alignment.
pub(super) fn chunk_left_with_alignment(
    chunk: &ChunkInfo,
    alignment: Alignment,
    direction: Direction,
    last_in_paragraph: bool,
) -> ChunkPlacement {
    let placed = |left| ChunkPlacement {
        left,
        add_to_each_whitespace: 0.0,
    };
    let alignment = alignment.resolve(direction);

    if !chunk.scanrun_width.is_finite() {
        return match alignment {
            ResolvedAlignment::Left | ResolvedAlignment::Full => placed(chunk.x),
            ResolvedAlignment::Right => placed(chunk.x - chunk.text_width),
            ResolvedAlignment::Center => placed(chunk.x - chunk.text_width * 0.5),
        };
    }

    let free_space = chunk.scanrun_width - chunk.text_width;
    match alignment {
        ResolvedAlignment::Left => placed(chunk.x),
        ResolvedAlignment::Right => placed(chunk.x + free_space),
        ResolvedAlignment::Center => placed(chunk.x + free_space * 0.5),
        ResolvedAlignment::Full => {
            if last_in_paragraph || chunk.whitespace_count == 0 || free_space <= 0.0 {
                if direction.is_rtl() {
                    return placed(chunk.x + free_space);
                }
                return placed(chunk.x);
            }
            ChunkPlacement {
                left: chunk.x,
                add_to_each_whitespace: free_space / chunk.whitespace_count as f64,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk(x: f64, scanrun_width: f64, text_width: f64, whitespace_count: usize) -> ChunkInfo {
        ChunkInfo {
            broken_spans: smallvec::SmallVec::new(),
            scanrun_width,
            text_width,
            x,
            whitespace_count,
            trimmed_width: 0.0,
        }
    }

    #[test]
    fn bounded_runs_distribute_free_space() {
        let c = chunk(10.0, 100.0, 40.0, 2);
        let place = |alignment| chunk_left_with_alignment(&c, alignment, Direction::Ltr, false);
        assert_eq!(place(Alignment::Start).left, 10.0);
        assert_eq!(place(Alignment::End).left, 70.0);
        assert_eq!(place(Alignment::Center).left, 40.0);
        let justified = place(Alignment::Justify);
        assert_eq!(justified.left, 10.0);
        assert_eq!(justified.add_to_each_whitespace, 30.0);
    }

    #[test]
    fn unbounded_runs_are_anchored() {
        let c = chunk(50.0, f64::INFINITY, 20.0, 0);
        let place = |alignment| chunk_left_with_alignment(&c, alignment, Direction::Ltr, false);
        assert_eq!(place(Alignment::Start).left, 50.0);
        assert_eq!(place(Alignment::End).left, 30.0);
        assert_eq!(place(Alignment::Center).left, 40.0);
        let rtl = chunk_left_with_alignment(&c, Alignment::Start, Direction::Rtl, false);
        assert_eq!(rtl.left, 30.0);
    }

    #[test]
    fn last_line_is_not_justified() {
        let c = chunk(0.0, 100.0, 40.0, 3);
        let ltr = chunk_left_with_alignment(&c, Alignment::Justify, Direction::Ltr, true);
        assert_eq!((ltr.left, ltr.add_to_each_whitespace), (0.0, 0.0));
        let rtl = chunk_left_with_alignment(&c, Alignment::Justify, Direction::Rtl, true);
        assert_eq!(rtl.left, 60.0);
    }
}
