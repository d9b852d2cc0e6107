//! Exhaustive depth-≤2 optimizer, handed off to by the main search once
//! only two levels remain. Runs in O(a²) cover intersections by
//! precomputing every pairwise `attr_i=1 ∧ attr_j=1` support up front,
//! then enumerating candidate roots against the precomputed table instead
//! of re-touching the cover.

use crate::cache::{Caching, QueryData};
use crate::cover::Cover;
use crate::globals::{float_eq, item, support_diff};
use crate::query::Query;
use std::collections::BTreeSet;
use std::time::{Duration, Instant};

pub struct DepthTwoSolver {
    pub call_count: usize,
    pub time_spent: Duration,
}

impl Default for DepthTwoSolver {
    fn default() -> Self {
        Self {
            call_count: 0,
            time_spent: Duration::ZERO,
        }
    }
}

struct SideSplit {
    attribute: usize,
    left_error: f64,
    left_class: usize,
    left_support: Vec<usize>,
    right_error: f64,
    right_class: usize,
    right_support: Vec<usize>,
}

struct SideResult {
    /// Best error achievable for this side: the split total if one beats
    /// the leaf, `leaf_error` otherwise.
    error: f64,
    /// This side's own error if it is made a leaf, independent of whether
    /// a split ended up winning.
    leaf_error: f64,
    class: usize,
    split: Option<SideSplit>,
}

fn subtract(a: &[usize], b: &[usize]) -> Vec<usize> {
    support_diff(a, b)
}

impl DepthTwoSolver {
    /// Builds `sups[i][j]` (i ≤ j) = per-class supports of
    /// `cover ∩ attr_i=1 ∩ attr_j=1`, one pass per candidate.
    fn pair_table(cover: &mut dyn Cover, candidates: &[usize]) -> Vec<Vec<Vec<usize>>> {
        let a = candidates.len();
        let mut sups = vec![vec![Vec::new(); a]; a];
        for i in 0..a {
            cover.intersect(candidates[i], 1);
            sups[i][i] = cover.get_support_per_class().to_vec();
            for j in (i + 1)..a {
                let (support, _) = cover.temporary_intersect(candidates[j], 1);
                sups[i][j] = support;
            }
            cover.backtrack();
        }
        sups
    }

    fn pair(sups: &[Vec<Vec<usize>>], i: usize, j: usize) -> &[usize] {
        let (lo, hi) = if i <= j { (i, j) } else { (j, i) };
        &sups[lo][hi]
    }

    fn best_side(
        side_total: &[usize],
        is_right_branch: bool,
        r_idx: usize,
        candidates: &[usize],
        sups: &[Vec<Vec<usize>>],
        min_support: usize,
        lb: f64,
        best_root_error: f64,
        query: &dyn Query,
    ) -> SideResult {
        let side_support: usize = side_total.iter().sum();
        let (leaf_error, leaf_class) = query.compute_error(side_total);

        if side_support < 2 * min_support || float_eq(leaf_error, lb) {
            return SideResult {
                error: leaf_error,
                leaf_error,
                class: leaf_class,
                split: None,
            };
        }

        let mut best_error = leaf_error;
        let mut best_class = leaf_class;
        let mut best_split = None;

        for (s_idx, &s) in candidates.iter().enumerate() {
            if s_idx == r_idx {
                continue;
            }
            let rs11 = Self::pair(sups, r_idx, s_idx);
            let (s1_support, s0_support) = if is_right_branch {
                let s1 = rs11.to_vec();
                let s0 = subtract(side_total, &s1);
                (s1, s0)
            } else {
                let s1 = subtract(&sups[s_idx][s_idx], rs11);
                let s0 = subtract(side_total, &s1);
                (s1, s0)
            };

            if s0_support.iter().sum::<usize>() < min_support
                || s1_support.iter().sum::<usize>() < min_support
            {
                continue;
            }

            let (s0_error, s0_class) = query.compute_error(&s0_support);
            if s0_error >= best_error {
                continue;
            }
            let (s1_error, s1_class) = query.compute_error(&s1_support);
            let total = s0_error + s1_error;
            if total >= best_error || total >= best_root_error {
                continue;
            }

            best_error = total;
            best_class = leaf_class;
            best_split = Some(SideSplit {
                attribute: s,
                left_error: s0_error,
                left_class: s0_class,
                left_support: s0_support,
                right_error: s1_error,
                right_class: s1_class,
                right_support: s1_support,
            });
        }

        SideResult {
            error: best_error,
            leaf_error,
            class: best_class,
            split: best_split,
        }
    }

    fn materialize_side(
        cache: &mut dyn Caching,
        itemset: &BTreeSet<usize>,
        side_item: usize,
        result: SideResult,
    ) -> usize {
        let mut side_itemset = itemset.clone();
        side_itemset.insert(side_item);
        let (side_index, _) = cache.insert(&side_itemset);

        match result.split {
            None => {
                let data = cache.get_mut(side_index).unwrap();
                *data = QueryData::new(data.item);
                data.leaf_error = result.leaf_error;
                data.settle_as_leaf();
                data.test = result.class;
                data.size = 1;
            }
            Some(split) => {
                let mut left_itemset = side_itemset.clone();
                left_itemset.insert(item(split.attribute, 0));
                let (left_index, _) = cache.insert(&left_itemset);
                let left = cache.get_mut(left_index).unwrap();
                left.leaf_error = split.left_error;
                left.settle_as_leaf();
                left.test = split.left_class;
                left.size = 1;

                let mut right_itemset = side_itemset.clone();
                right_itemset.insert(item(split.attribute, 1));
                let (right_index, _) = cache.insert(&right_itemset);
                let right = cache.get_mut(right_index).unwrap();
                right.leaf_error = split.right_error;
                right.settle_as_leaf();
                right.size = 1;
                right.test = split.right_class;

                let _ = split.left_support;
                let _ = split.right_support;

                let data = cache.get_mut(side_index).unwrap();
                data.test = split.attribute;
                data.error = split.left_error + split.right_error;
                data.leaf_error = result.leaf_error;
                data.size = 3;
                data.is_leaf = false;
                data.left = Some(left_index);
                data.right = Some(right_index);
            }
        }
        side_index
    }

    /// Solves the subproblem rooted at `node` (already `cache.insert`ed for
    /// `itemset`) and writes the result into its `QueryData`.
    pub fn solve(
        &mut self,
        cover: &mut dyn Cover,
        cache: &mut dyn Caching,
        query: &dyn Query,
        itemset: &BTreeSet<usize>,
        node: usize,
        candidates: &[usize],
        min_support: usize,
        ub: f64,
        lb: f64,
    ) -> f64 {
        let started = Instant::now();
        self.call_count += 1;

        let root_support = cover.get_support_per_class().to_vec();
        let (leaf_error, leaf_class) = query.compute_error(&root_support);
        let sups = Self::pair_table(cover, candidates);

        let mut best_error = leaf_error;
        let mut best: Option<(usize, SideResult, SideResult)> = None;

        if !float_eq(leaf_error, lb) {
            for (r_idx, &r) in candidates.iter().enumerate() {
                let right_support = sups[r_idx][r_idx].clone();
                let left_support = subtract(&root_support, &right_support);
                if left_support.iter().sum::<usize>() < min_support
                    || right_support.iter().sum::<usize>() < min_support
                {
                    continue;
                }

                let left = Self::best_side(
                    &left_support,
                    false,
                    r_idx,
                    candidates,
                    &sups,
                    min_support,
                    lb,
                    best_error,
                    query,
                );
                if left.error >= best_error {
                    continue;
                }
                let right = Self::best_side(
                    &right_support,
                    true,
                    r_idx,
                    candidates,
                    &sups,
                    min_support,
                    lb,
                    best_error,
                    query,
                );

                let total = left.error + right.error;
                if total < best_error {
                    best_error = total;
                    best = Some((r, left, right));
                }
            }
        }

        self.time_spent += started.elapsed();

        if best_error >= ub {
            let data = cache.get_mut(node).unwrap();
            data.error = f64::INFINITY;
            data.leaf_error = leaf_error;
            data.lower_bound = data.lower_bound.max(ub);
            data.size = 1;
            data.is_leaf = false;
            data.left = None;
            data.right = None;
            return f64::INFINITY;
        }

        match best {
            Some((root, left, right)) => {
                let left_index = Self::materialize_side(cache, itemset, item(root, 0), left);
                let right_index = Self::materialize_side(cache, itemset, item(root, 1), right);

                let left_size = cache.get(left_index).unwrap().size;
                let right_size = cache.get(right_index).unwrap().size;
                let data = cache.get_mut(node).unwrap();
                data.test = root;
                data.error = best_error;
                data.leaf_error = leaf_error;
                data.size = 1 + left_size + right_size;
                data.is_leaf = false;
                data.left = Some(left_index);
                data.right = Some(right_index);
            }
            None => {
                let data = cache.get_mut(node).unwrap();
                data.leaf_error = leaf_error;
                data.settle_as_leaf();
                data.test = leaf_class;
                data.size = 1;
            }
        }
        best_error
    }
}
