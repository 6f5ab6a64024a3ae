//! Jump-index computation.
//!
//! Consecutive entries sharing an uppercased first character form a bucket.
//! At most [`MAX_BUCKETS`] buckets are gathered; when more than
//! [`MAX_SECTIONS`] remain, the largest ones are kept (bucket 0 is always
//! kept) and then put back in listing order.

use crate::types::{Entry, Section};

/// Hard cap on gathered buckets; keys past it are dropped.
pub const MAX_BUCKETS: usize = 100;
/// Maximum number of emitted sections.
pub const MAX_SECTIONS: usize = 28;
/// Bucket key for digits, punctuation and the unknown placeholder.
pub const OTHER_SECTION: char = '#';

#[derive(Debug, Clone, Copy)]
struct Bucket {
    letter: char,
    start_index: usize,
    count: usize,
}

/// Computes the jump index of an already sorted listing.
///
/// Returns `None` for an empty listing.
pub fn compute_sections(entries: &[Entry], unknown_label: &str) -> Option<Vec<Section>> {
    let first = entries.first()?;

    let mut buckets: Vec<Bucket> = Vec::with_capacity(MAX_SECTIONS);
    let mut current = Bucket {
        letter: section_key(first, unknown_label),
        start_index: 0,
        count: 1,
    };
    for (index, entry) in entries.iter().enumerate().skip(1) {
        let letter = section_key(entry, unknown_label);
        if letter == current.letter {
            current.count += 1;
            continue;
        }
        buckets.push(current);
        if buckets.len() == MAX_BUCKETS {
            break;
        }
        current = Bucket {
            letter,
            start_index: index,
            count: 1,
        };
    }
    if buckets.len() < MAX_BUCKETS {
        buckets.push(current);
    }

    if buckets.len() > MAX_SECTIONS {
        // Stable sorts keep equal-sized buckets in listing order.
        buckets[1..].sort_by(|a, b| b.count.cmp(&a.count));
        buckets.truncate(MAX_SECTIONS);
        buckets[1..].sort_by_key(|bucket| bucket.start_index);
    }

    Some(
        buckets
            .into_iter()
            .map(|bucket| Section {
                letter: bucket.letter,
                start_index: bucket.start_index,
            })
            .collect(),
    )
}

fn section_key(entry: &Entry, unknown_label: &str) -> char {
    if entry.display_name == unknown_label {
        return OTHER_SECTION;
    }
    let first = entry
        .display_name
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or(OTHER_SECTION);
    if first < '@' {
        OTHER_SECTION
    } else {
        first
    }
}
