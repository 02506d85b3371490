//! Chapter ordering and collision resolution.
//!
//! Each chapter claims the slot `ceil(number)`. When that slot is taken the
//! chapter probes upward one slot at a time until it finds a free one, so
//! `"Series 12.5"` and `"Series 13"` end up on slots 13 and 14 in whichever
//! order they are seen. Ties are therefore decided by input order, and the
//! input must be sorted by file name for a run to be reproducible.
//!
//! Probing can place a chapter ahead of one with a smaller number when the
//! listing order disagrees with numeric order (e.g. `"S 2"` seen before
//! `"S 1.5"` gives slots 2 and 3). That is accepted behavior.

use std::collections::BTreeMap;

use log::debug;

use crate::types::{ParsedChapter, SequencedChapter};

/// Assigns unique slots and contiguous 1-based display indices.
///
/// `chapters` must already be in lexicographic file-name order. The returned
/// chapters are ordered by slot; `display_index` runs `1..=len`.
pub fn sequence_chapters(chapters: Vec<ParsedChapter>) -> Vec<SequencedChapter> {
    let mut slots: BTreeMap<i64, ParsedChapter> = BTreeMap::new();

    for chapter in chapters {
        let candidate = chapter.number.candidate_slot();
        let mut slot = candidate;
        while slots.contains_key(&slot) {
            slot += 1;
        }
        if slot != candidate {
            debug!(
                "'{}' (chapter {}) bumped from slot {} to {}",
                chapter.file.name, chapter.number, candidate, slot
            );
        }
        slots.insert(slot, chapter);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(i, (slot, chapter))| SequencedChapter {
            file: chapter.file,
            number: chapter.number,
            slot,
            display_index: i + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChapterNumber;
    use std::path::Path;

    fn parsed(names: &[&str]) -> Vec<ParsedChapter> {
        names
            .iter()
            .map(|n| ParsedChapter::from_path(Path::new(n)).unwrap())
            .collect()
    }

    fn layout(sequenced: &[SequencedChapter]) -> Vec<(&str, i64, usize)> {
        sequenced
            .iter()
            .map(|c| (c.file.name.as_str(), c.slot, c.display_index))
            .collect()
    }

    #[test]
    fn test_simple_sequence() {
        let out = sequence_chapters(parsed(&["S 1.cbz", "S 2.cbz", "S 3.cbz"]));
        assert_eq!(
            layout(&out),
            vec![("S 1.cbz", 1, 1), ("S 2.cbz", 2, 2), ("S 3.cbz", 3, 3)]
        );
    }

    #[test]
    fn test_display_index_is_contiguous_for_sparse_numbers() {
        let out = sequence_chapters(parsed(&["S 10.cbz", "S 40.cbz", "S 7.cbz"]));
        assert_eq!(
            layout(&out),
            vec![("S 7.cbz", 7, 1), ("S 10.cbz", 10, 2), ("S 40.cbz", 40, 3)]
        );
    }

    #[test]
    fn test_fractional_chapter_collides_upward() {
        // Lexicographic listing: "S 12.5" < "S 13"
        let out = sequence_chapters(parsed(&["S 12.5.cbz", "S 13.cbz", "S 14.cbz"]));
        assert_eq!(
            layout(&out),
            vec![("S 12.5.cbz", 13, 1), ("S 13.cbz", 14, 2), ("S 14.cbz", 15, 3)]
        );
    }

    #[test]
    fn test_equal_ceilings_later_name_gets_greater_slot() {
        let out = sequence_chapters(parsed(&["S 4.2.cbz", "S 4.7.cbz", "S 5.cbz"]));
        let slot_of = |name: &str| out.iter().find(|c| c.file.name == name).unwrap().slot;
        assert!(slot_of("S 4.7.cbz") > slot_of("S 4.2.cbz"));
        assert!(slot_of("S 5.cbz") > slot_of("S 4.7.cbz"));
    }

    #[test]
    fn test_reversed_listing_is_kept_as_is() {
        // "S 2" is listed first, so it keeps slot 2 and "S 1.5" probes to 3.
        let out = sequence_chapters(parsed(&["S 2.cbz", "S 1.5.cbz"]));
        assert_eq!(layout(&out), vec![("S 2.cbz", 2, 1), ("S 1.5.cbz", 3, 2)]);
    }

    #[test]
    fn test_slots_are_unique_and_increasing() {
        let names = [
            "S 1.cbz", "S 1.1.cbz", "S 1.2.cbz", "S 2.cbz", "S 2.cbz", "S 0.5.cbz", "S 3.cbz",
        ];
        let out = sequence_chapters(parsed(&names));
        assert_eq!(out.len(), names.len());
        for pair in out.windows(2) {
            assert!(pair[0].slot < pair[1].slot);
            assert_eq!(pair[0].display_index + 1, pair[1].display_index);
        }
        assert_eq!(out.first().unwrap().display_index, 1);
    }

    #[test]
    fn test_largest_numbers_sequence_without_overflow() {
        let out = sequence_chapters(parsed(&[
            "S 1000000000.cbz",
            "S 999999999.5.cbz",
            "S 1000000000.cbz",
        ]));
        let slots: Vec<i64> = out.iter().map(|c| c.slot).collect();
        assert_eq!(slots, vec![1_000_000_000, 1_000_000_001, 1_000_000_002]);
        assert!(ChapterNumber::new(1e20).is_none());
    }

    #[test]
    fn test_empty_input() {
        assert!(sequence_chapters(Vec::new()).is_empty());
    }
}
