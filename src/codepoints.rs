//! Codepoint-aware length and slicing helpers
//!
//! All indices in this crate count Unicode scalar values (`char`s), not UTF-8 bytes,
//! so an emoji is one element and a slice never lands inside a character.

/// Number of codepoints in `text`
pub fn codepoint_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index at which codepoint `n` starts
///
/// Returns `Some(text.len())` when `n` equals the codepoint length and `None` when
/// `n` is past the end.
pub fn byte_offset(text: &str, n: usize) -> Option<usize> {
    text.char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .nth(n)
}

/// The first `n` codepoints of `text`, or `None` if `text` is shorter than `n`
pub fn prefix(text: &str, n: usize) -> Option<&str> {
    byte_offset(text, n).map(|end| &text[..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_len_counts_emoji_once() {
        assert_eq!(codepoint_len("📚"), 1);
        assert_eq!(codepoint_len("emoji 🡁"), 7);
        assert_eq!(codepoint_len(""), 0);
    }

    #[test]
    fn test_byte_offset_bounds() {
        assert_eq!(byte_offset("café", 0), Some(0));
        assert_eq!(byte_offset("café", 3), Some(3));
        assert_eq!(byte_offset("café", 4), Some(5)); // é is 2 bytes
        assert_eq!(byte_offset("café", 5), None);
        assert_eq!(byte_offset("", 0), Some(0));
    }

    #[test]
    fn test_prefix_never_splits_characters() {
        assert_eq!(prefix("a🍕b", 2), Some("a🍕"));
        assert_eq!(prefix("a🍕b", 1), Some("a"));
        assert_eq!(prefix("a🍕b", 4), None);
    }
}
