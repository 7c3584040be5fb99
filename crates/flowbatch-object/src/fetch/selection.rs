//! Positional selection over a bucket listing.

use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A `(start, count)` window over an ordered listing.
///
/// `start` is treated as a one-based position: the window covers the raw
/// bounds `[start - 1, start - 1 + count)`. Neither value is validated.
/// Bounds are resolved with sequence-slice rules, so a `start` of `0`
/// produces a raw lower bound of `-1` which resolves to the *last* element
/// rather than the first; [`wraps_from_end`](Self::wraps_from_end) reports
/// that case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectionRange {
    /// One-based position of the first selected object.
    pub start: i64,
    /// Number of objects to select.
    pub count: i64,
}

impl SelectionRange {
    /// Creates a new selection window.
    pub const fn new(start: i64, count: i64) -> Self {
        Self { start, count }
    }

    /// Returns the unresolved `(lower, upper)` bounds.
    pub const fn raw_bounds(&self) -> (i64, i64) {
        let lower = self.start.saturating_sub(1);
        (lower, lower.saturating_add(self.count))
    }

    /// Returns `true` when the raw lower bound is negative and therefore
    /// counts back from the end of the listing.
    pub const fn wraps_from_end(&self) -> bool {
        self.raw_bounds().0 < 0
    }

    /// Resolves the window against a listing of `len` items.
    ///
    /// Negative bounds are offset by `len`, then both bounds are clamped to
    /// `[0, len]`. An upper bound at or below the lower bound yields an
    /// empty range.
    pub fn slice_bounds(&self, len: usize) -> Range<usize> {
        let (lower, upper) = self.raw_bounds();
        let lower = resolve_bound(lower, len);
        let upper = resolve_bound(upper, len);
        lower..upper.max(lower)
    }

    /// Returns the selected sub-slice of `items`.
    pub fn select<'a, T>(&self, items: &'a [T]) -> &'a [T] {
        &items[self.slice_bounds(items.len())]
    }
}

fn resolve_bound(bound: i64, len: usize) -> usize {
    let len_i = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if bound < 0 {
        bound.saturating_add(len_i).max(0)
    } else {
        bound.min(len_i)
    };
    // Clamped to [0, len] above.
    resolved as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: [&str; 10] = ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"];

    #[test]
    fn first_position_selects_from_the_head() {
        let range = SelectionRange::new(1, 5);
        assert_eq!(range.select(&LISTING), ["a", "b", "c", "d", "e"]);
        assert!(!range.wraps_from_end());
    }

    #[test]
    fn window_starts_at_start_minus_one() {
        let range = SelectionRange::new(4, 3);
        assert_eq!(range.slice_bounds(LISTING.len()), 3..6);
        assert_eq!(range.select(&LISTING), ["d", "e", "f"]);
    }

    #[test]
    fn count_past_the_end_is_truncated() {
        let range = SelectionRange::new(8, 10);
        assert_eq!(range.select(&LISTING), ["h", "i", "j"]);
    }

    #[test]
    fn start_past_the_end_is_empty() {
        let range = SelectionRange::new(42, 3);
        assert!(range.select(&LISTING).is_empty());
    }

    #[test]
    fn zero_start_wraps_to_the_last_element() {
        let range = SelectionRange::new(0, 5);
        assert!(range.wraps_from_end());
        assert_eq!(range.raw_bounds(), (-1, 4));

        // [-1, 4) over three items resolves to [2, 3).
        assert_eq!(range.select(&["x", "y", "z"]), ["z"]);
        // Over ten items the upper bound sits below the wrapped start.
        assert!(range.select(&LISTING).is_empty());
    }

    #[test]
    fn zero_start_with_count_one_is_empty() {
        let range = SelectionRange::new(0, 1);
        assert!(range.select(&LISTING).is_empty());
    }

    #[test]
    fn zero_or_negative_count_is_empty() {
        assert!(SelectionRange::new(3, 0).select(&LISTING).is_empty());
        assert!(SelectionRange::new(3, -2).select(&LISTING).is_empty());
    }

    #[test]
    fn negative_start_counts_back_from_the_end() {
        // raw [-3, 0): upper bound resolves below the lower one.
        assert!(SelectionRange::new(-2, 3).select(&LISTING).is_empty());
        // raw [-3, 7) over ten items resolves to [7, 7).
        assert!(SelectionRange::new(-2, 10).select(&LISTING).is_empty());
        // raw [-3, 10) resolves to [7, 10).
        assert_eq!(SelectionRange::new(-2, 13).select(&LISTING), ["h", "i", "j"]);
    }

    #[test]
    fn empty_listing_selects_nothing() {
        let empty: [&str; 0] = [];
        assert!(SelectionRange::new(1, 5).select(&empty).is_empty());
        assert!(SelectionRange::new(0, 5).select(&empty).is_empty());
    }
}
