//! Prefix-overlap diffing between the displayed text and the desired text
//!
//! Only the longest common prefix is kept. The rest of the current text is deleted
//! one codepoint at a time, then the rest of the target text is typed one codepoint
//! at a time.

use std::iter::Chain;

use crate::codepoints::codepoint_len;
use crate::steps::{deleter_from, writer_from, Deleter, Writer};

/// Summary of the edit needed to turn one text into another
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextDiff {
    /// Number of leading codepoints both texts share
    pub overlap: usize,

    /// Codepoints removed from the end of the current text
    pub chars_to_delete: usize,

    /// Codepoints typed after the shared prefix
    pub chars_to_write: usize,
}

impl TextDiff {
    /// Total number of animation steps (one per deleted or written codepoint)
    pub fn step_count(&self) -> usize {
        self.chars_to_delete + self.chars_to_write
    }
}

/// Length in codepoints of the longest common prefix of `start` and `end`
///
/// Walks both texts in lockstep with an end-of-text sentinel on each side, so the
/// scan stops at the first mismatch or when the shorter text runs out.
///
/// # Examples
///
/// ```
/// use typist::text_diff::get_overlap;
///
/// assert_eq!(get_overlap("some text", "some other text"), 5);
/// assert_eq!(get_overlap("emoji 🡁", "emoji 🡁 blowfish"), 7);
/// ```
pub fn get_overlap(start: &str, end: &str) -> usize {
    let mut a = start.chars();
    let mut b = end.chars();
    let mut index = 0;

    loop {
        match (a.next(), b.next()) {
            (Some(c1), Some(c2)) if c1 == c2 => index += 1,
            _ => return index,
        }
    }
}

/// Same result as [`get_overlap`], with a fast path when `end` is a prefix of `start`
pub fn get_overlap_fast(start: &str, end: &str) -> usize {
    if start.starts_with(end) {
        return codepoint_len(end);
    }
    get_overlap(start, end)
}

/// Compute the prefix-only edit from `old_text` to `new_text`
pub fn compute_text_diff(old_text: &str, new_text: &str) -> TextDiff {
    let overlap = get_overlap(old_text, new_text);

    TextDiff {
        overlap,
        chars_to_delete: codepoint_len(old_text) - overlap,
        chars_to_write: codepoint_len(new_text) - overlap,
    }
}

/// Steps that delete `current` back to the shared prefix and then write `target`
pub type EditSteps<'a> = Chain<Deleter<'a>, Writer<'a>>;

/// Full step sequence to animate `current` into `target`
///
/// Produces exactly `len(current) - overlap` deletions followed by
/// `len(target) - overlap` insertions.
pub fn edit_steps<'a>(current: &'a str, target: &'a str) -> EditSteps<'a> {
    let overlap = get_overlap(current, target);
    deleter_from(current, overlap).chain(writer_from(target, overlap))
}
