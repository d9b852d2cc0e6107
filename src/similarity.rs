//! Lower bound derived from transaction overlap with previously solved
//! covers, rather than from the current cover's own structure.
//!
//! Two snapshots are kept at a time: the cover that produced the highest
//! error seen so far, and the cover with the largest support seen so far.
//! Either can yield a useful bound on a sibling cover that shares most of
//! its transactions.

use crate::cover::{Cover, CoverSnapshot};

#[derive(Default)]
pub struct SimilarityLowerBound {
    highest_error: Option<(CoverSnapshot, f64)>,
    largest_support: Option<(CoverSnapshot, usize)>,
}

impl SimilarityLowerBound {
    pub fn new() -> Self {
        Self::default()
    }

    /// Consider `cover`'s current top-of-stack mask as a replacement
    /// snapshot after a child recursion solved with the given `error`.
    pub fn update(&mut self, cover: &mut dyn Cover, error: f64) {
        let replace_error = self
            .highest_error
            .as_ref()
            .is_none_or(|(_, best)| error > *best);
        if replace_error {
            self.highest_error = Some((cover.top_bitset_array(), error));
        }

        let support = cover.get_support();
        let replace_support = self
            .largest_support
            .as_ref()
            .is_none_or(|(_, best)| support > *best);
        if replace_support {
            self.largest_support = Some((cover.top_bitset_array(), support));
        }
    }

    /// Worst-case error if this branch can do no better than keep the
    /// majority class among the transactions not already covered by a
    /// remembered snapshot.
    pub fn bound(&self, cover: &dyn Cover) -> f64 {
        let from_highest_error = self
            .highest_error
            .as_ref()
            .map_or(0.0, |(snapshot, _)| Self::bound_against(cover, snapshot));
        let from_largest_support = self
            .largest_support
            .as_ref()
            .map_or(0.0, |(snapshot, _)| Self::bound_against(cover, snapshot));
        from_highest_error.max(from_largest_support)
    }

    fn bound_against(cover: &dyn Cover, snapshot: &CoverSnapshot) -> f64 {
        // `diff[c]` is the per-class support of transactions that were in
        // the snapshot but have since left the current cover; `remain[c]`
        // is what's left of class c from the snapshot's perspective.
        let diff = cover.minus_me(snapshot);
        let remain: Vec<i64> = snapshot
            .support_per_class
            .iter()
            .zip(&diff)
            .map(|(s, d)| *s as i64 - *d as i64)
            .collect();
        let total: i64 = remain.iter().sum();
        let max_class = remain.iter().copied().max().unwrap_or(0);
        (total - max_class).max(0) as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::BitsetCover;

    fn xor_dataset() -> BitsetCover {
        let rows = vec![
            vec![false, false],
            vec![false, true],
            vec![true, false],
            vec![true, true],
        ];
        let labels = vec![0, 1, 1, 0];
        BitsetCover::new(&rows, &labels, 2)
    }

    #[test]
    fn bound_is_zero_with_no_snapshots() {
        let cover = xor_dataset();
        let bound = SimilarityLowerBound::new();
        assert_eq!(bound.bound(&cover), 0.0);
    }

    #[test]
    fn bound_tightens_after_a_solved_sibling() {
        let mut cover = xor_dataset();
        let mut bound = SimilarityLowerBound::new();

        cover.intersect(0, 0); // a = 0 branch solved with error 0
        bound.update(&mut cover, 0.0);
        cover.backtrack();

        cover.intersect(0, 1); // a = 1, the sibling branch
        let lb = bound.bound(&cover);
        cover.backtrack();

        assert!(lb >= 0.0);
    }
}
