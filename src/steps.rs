//! Lazy step generators for writing and deleting text one codepoint at a time
//!
//! A step is the complete content of the surface at one point of the animation.
//! [`Writer`] grows a prefix of the text, [`Deleter`] shrinks one. Both borrow the
//! text and yield sub-slices of it, so no step is allocated until a caller needs
//! an owned copy.

use crate::codepoints::{byte_offset, codepoint_len};

/// Yields `text[0:start+1]`, `text[0:start+2]`, ..., `text[0:end]`
#[derive(Debug, Clone)]
pub struct Writer<'a> {
    text: &'a str,
    /// Byte offset of the end of the last yielded prefix
    offset: usize,
    remaining: usize,
}

/// Yields `text[0:end-1]`, `text[0:end-2]`, ..., `text[0:start]`
#[derive(Debug, Clone)]
pub struct Deleter<'a> {
    text: &'a str,
    offset: usize,
    remaining: usize,
}

/// Resolve a codepoint range into (byte offset of `from`, step count)
///
/// Anything outside `start <= end <= len` produces zero steps.
fn resolve(text: &str, start: usize, end: usize, from: usize) -> (usize, usize) {
    if start >= end || end > codepoint_len(text) {
        return (0, 0);
    }
    match byte_offset(text, from) {
        Some(offset) => (offset, end - start),
        None => (0, 0),
    }
}

impl<'a> Writer<'a> {
    pub fn new(text: &'a str, start: usize, end: usize) -> Self {
        let (offset, remaining) = resolve(text, start, end, start);
        Writer { text, offset, remaining }
    }
}

impl<'a> Deleter<'a> {
    pub fn new(text: &'a str, start: usize, end: usize) -> Self {
        let (offset, remaining) = resolve(text, start, end, end);
        Deleter { text, offset, remaining }
    }
}

impl<'a> Iterator for Writer<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.remaining == 0 {
            return None;
        }
        let ch = self.text[self.offset..].chars().next()?;
        self.offset += ch.len_utf8();
        self.remaining -= 1;
        Some(&self.text[..self.offset])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<'a> Iterator for Deleter<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<&'a str> {
        if self.remaining == 0 {
            return None;
        }
        let ch = self.text[..self.offset].chars().next_back()?;
        self.offset -= ch.len_utf8();
        self.remaining -= 1;
        Some(&self.text[..self.offset])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl ExactSizeIterator for Writer<'_> {}
impl ExactSizeIterator for Deleter<'_> {}

/// Write the whole text from empty
pub fn writer(text: &str) -> Writer<'_> {
    Writer::new(text, 0, codepoint_len(text))
}

/// Write the text starting after the first `start` codepoints
pub fn writer_from(text: &str, start: usize) -> Writer<'_> {
    Writer::new(text, start, codepoint_len(text))
}

/// Write `text[0:start+1]` through `text[0:end]`; nothing when `start >= end` or `end` is past the text
pub fn writer_range(text: &str, start: usize, end: usize) -> Writer<'_> {
    Writer::new(text, start, end)
}

/// Delete the whole text down to empty
pub fn deleter(text: &str) -> Deleter<'_> {
    Deleter::new(text, 0, codepoint_len(text))
}

/// Delete the text down to its first `start` codepoints
pub fn deleter_from(text: &str, start: usize) -> Deleter<'_> {
    Deleter::new(text, start, codepoint_len(text))
}

/// Delete from `text[0:end-1]` down to `text[0:start]`; nothing when `start >= end` or `end` is past the text
pub fn deleter_range(text: &str, start: usize, end: usize) -> Deleter<'_> {
    Deleter::new(text, start, end)
}
