// Properties of the overlap calculation and the step generators, checked across
// a spread of ASCII, accented and emoji texts

use typist::codepoints::codepoint_len;
use typist::steps::{deleter, deleter_from, deleter_range, writer, writer_from, writer_range};
use typist::text_diff::{compute_text_diff, edit_steps, get_overlap, get_overlap_fast};

const SAMPLES: &[&str] = &[
    "",
    "a",
    "text",
    "some text",
    "some other text",
    "other text",
    "some",
    "café",
    "cafe",
    "emoji 🡁",
    "emoji 🡁 blowfish",
    "🍕",
    "📚🍕",
    "👋 hello",
];

#[test]
fn test_overlap_never_exceeds_shorter_text() {
    for a in SAMPLES {
        for b in SAMPLES {
            let overlap = get_overlap(a, b);
            assert!(overlap <= codepoint_len(a).min(codepoint_len(b)), "{:?} {:?}", a, b);
        }
    }
}

#[test]
fn test_overlap_with_self_is_full_length() {
    for a in SAMPLES {
        assert_eq!(get_overlap(a, a), codepoint_len(a));
    }
}

#[test]
fn test_overlap_prefix_is_shared() {
    for a in SAMPLES {
        for b in SAMPLES {
            let overlap = get_overlap(a, b);
            let prefix_a: String = a.chars().take(overlap).collect();
            let prefix_b: String = b.chars().take(overlap).collect();
            assert_eq!(prefix_a, prefix_b);

            // The next codepoint differs, or one text has ended
            let next_a = a.chars().nth(overlap);
            let next_b = b.chars().nth(overlap);
            assert!(next_a.is_none() || next_b.is_none() || next_a != next_b);
        }
    }
}

#[test]
fn test_overlap_depends_only_on_common_prefix() {
    for a in SAMPLES {
        for b in SAMPLES {
            assert_eq!(get_overlap(a, b), get_overlap(b, a));
        }
    }
}

#[test]
fn test_fast_path_matches_scan_everywhere() {
    for a in SAMPLES {
        for b in SAMPLES {
            assert_eq!(get_overlap_fast(a, b), get_overlap(a, b), "{:?} {:?}", a, b);
        }
    }
}

#[test]
fn test_disjoint_texts_have_no_overlap() {
    assert_eq!(get_overlap("some text", "other text"), 0);
    assert_eq!(get_overlap("🍕", "📚"), 0);
}

#[test]
fn test_concrete_overlaps() {
    assert_eq!(get_overlap("some text", "some other text"), 5);
    assert_eq!(get_overlap("some text", "other text"), 0);
    assert_eq!(get_overlap("some text", "some text"), 9);
    assert_eq!(get_overlap("some text", "some"), 4);
    assert_eq!(get_overlap("emoji 🡁", "emoji 🡁 blowfish"), 7);
}

#[test]
fn test_writer_and_deleter_lengths() {
    for text in SAMPLES {
        let len = codepoint_len(text);
        assert_eq!(writer(text).count(), len);
        assert_eq!(deleter(text).count(), len);
        if len > 0 {
            assert_eq!(writer(text).last(), Some(*text));
            assert_eq!(deleter(text).last(), Some(""));
            let without_last: String = text.chars().take(len - 1).collect();
            assert_eq!(deleter(text).next(), Some(without_last.as_str()));
        }
    }
}

#[test]
fn test_empty_ranges_for_every_valid_index() {
    for text in SAMPLES {
        for k in 0..=codepoint_len(text) {
            assert_eq!(writer_range(text, k, k).count(), 0);
            assert_eq!(deleter_range(text, k, k).count(), 0);
        }
    }
}

#[test]
fn test_delete_then_write_same_text_ends_on_text() {
    for text in SAMPLES {
        for overlap in 0..=codepoint_len(text) {
            let steps: Vec<&str> = deleter_from(text, overlap)
                .chain(writer_from(text, overlap))
                .collect();
            assert_eq!(steps.len(), 2 * (codepoint_len(text) - overlap));
            if let Some(last) = steps.last() {
                assert_eq!(last, text);
            }
        }
    }
}

#[test]
fn test_edit_steps_are_minimal_and_land_on_target() {
    for current in SAMPLES {
        for target in SAMPLES {
            let diff = compute_text_diff(current, target);
            let steps: Vec<&str> = edit_steps(current, target).collect();
            assert_eq!(steps.len(), diff.chars_to_delete + diff.chars_to_write);
            assert_eq!(steps.last().copied().unwrap_or(*current), *target);

            // Every step changes the length by exactly one codepoint
            let mut previous = codepoint_len(current);
            for step in &steps {
                let len = codepoint_len(step);
                assert_eq!(previous.abs_diff(len), 1, "{:?} -> {:?}", current, target);
                previous = len;
            }
        }
    }
}
