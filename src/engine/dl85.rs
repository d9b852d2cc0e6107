//! The branch-and-bound driver: walks the itemset lattice, consulting the
//! trie for memoized results and delegating to the depth-2 solver once two
//! levels remain.

use super::config::{SearchConfig, SearchStatistics};
use super::depth_two::DepthTwoSolver;
use crate::cache::{Caching, QueryData};
use crate::cover::Cover;
use crate::globals::{float_eq, get_tree_root_error, item};
use crate::heuristics::Heuristic;
use crate::query::{FitError, Query};
use crate::similarity::SimilarityLowerBound;
use crate::tree::{NodeInfos, Tree, TreeNode};
use std::collections::BTreeSet;
use std::time::Instant;

pub struct Dl85<C, Q, H: ?Sized> {
    config: SearchConfig,
    pub statistics: SearchStatistics,
    cache: Box<C>,
    query: Box<Q>,
    heuristic: Box<H>,
    depth_two: DepthTwoSolver,
    pub tree: Tree,
    started: Instant,
    time_limit_reached: bool,
}

impl<C, Q, H> Dl85<C, Q, H>
where
    C: Caching,
    Q: Query,
    H: Heuristic + ?Sized,
{
    pub fn new(config: SearchConfig, cache: Box<C>, query: Box<Q>, heuristic: Box<H>) -> Self {
        Self {
            config,
            statistics: SearchStatistics::default(),
            cache,
            query,
            heuristic,
            depth_two: DepthTwoSolver::default(),
            tree: Tree::new(),
            started: Instant::now(),
            time_limit_reached: false,
        }
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    /// Runs the search to completion and builds `self.tree`.
    pub fn fit(&mut self, cover: &mut dyn Cover) -> Result<(), FitError> {
        if self.config.min_support == 0 {
            return Err(FitError::InvalidMinSupport(0));
        }
        if cover.get_support() == 0 {
            return Err(FitError::InsufficientData);
        }
        if cover.num_attributes() == 0 {
            return Err(FitError::EmptyCandidates);
        }

        self.statistics = SearchStatistics {
            num_attributes: cover.num_attributes(),
            num_transactions: cover.get_support(),
            ..SearchStatistics::default()
        };
        self.time_limit_reached = false;
        self.started = Instant::now();

        let root_index = self.cache.init();
        self.init_leaf_data(cover, root_index);

        let mut candidates: Vec<usize> = if self.config.min_support <= 1 {
            (0..cover.num_attributes()).collect()
        } else {
            (0..cover.num_attributes())
                .filter(|&a| {
                    cover.temporary_intersect_support(a, 0) >= self.config.min_support
                        && cover.temporary_intersect_support(a, 1) >= self.config.min_support
                })
                .collect()
        };
        self.heuristic.sort(cover, &mut candidates);

        let mut itemset = BTreeSet::new();
        let ub = self.config.max_error;
        self.recurse(
            cover,
            &mut itemset,
            &candidates,
            usize::MAX,
            root_index,
            0,
            ub,
            0.0,
            true,
        );

        self.statistics.cache_size = self.cache.size();
        self.statistics.duration = self.started.elapsed();
        self.statistics.time_limit_reached = self.time_limit_reached;

        self.tree = self.build_solution_tree(root_index);
        self.statistics.tree_error = get_tree_root_error(&self.tree);
        Ok(())
    }

    fn init_leaf_data(&mut self, cover: &mut dyn Cover, node: usize) {
        let support = cover.get_support();
        let (leaf_error, class) = self.query.compute_error(cover.get_support_per_class());
        if let Some(data) = self.cache.get_mut(node) {
            data.leaf_error = leaf_error;
            data.test = class;
            data.size = support.max(1);
        }
    }

    /// Filters candidates to those with both branches above minsup, dropping
    /// the attribute that was just branched on, then applies the heuristic
    /// (unless one-shot sorting already happened on a previous visit).
    fn successors(&self, cover: &mut dyn Cover, candidates: &[usize], last_added: usize) -> Vec<usize> {
        let support = cover.get_support();
        let mut kept: Vec<usize> = candidates
            .iter()
            .copied()
            .filter(|&a| a != last_added)
            .filter(|&a| {
                let left = cover.temporary_intersect_support(a, 0);
                let right = support
                    .checked_sub(left)
                    .unwrap_or_else(|| panic!("negative support: {support} - {left}"));
                left >= self.config.min_support && right >= self.config.min_support
            })
            .collect();
        if !self.config.one_time_sort {
            self.heuristic.sort(cover, &mut kept);
        }
        kept
    }

    #[allow(clippy::too_many_arguments)]
    fn recurse(
        &mut self,
        cover: &mut dyn Cover,
        itemset: &mut BTreeSet<usize>,
        candidates: &[usize],
        last_added: usize,
        node: usize,
        depth: usize,
        ub: f64,
        lb_in: f64,
        is_new: bool,
    ) -> f64 {
        self.statistics.call_count += 1;
        log::trace!("recurse: depth={depth} node={node} ub={ub} lb_in={lb_in}");

        if !self.time_limit_reached && self.started.elapsed() >= self.config.max_time {
            log::debug!("time limit reached after {} calls", self.statistics.call_count);
            self.time_limit_reached = true;
        }

        let mut data = *self.cache.get(node).unwrap();
        data.lower_bound = data.lower_bound.max(lb_in);

        if self.time_limit_reached {
            data.settle_as_leaf();
            self.write_back(node, data);
            return data.error;
        }

        if data.error.is_finite() {
            log::trace!("node {node} already solved, error={}", data.error);
            self.write_back(node, data);
            return data.error;
        }
        if ub <= data.lower_bound {
            self.write_back(node, data);
            return f64::INFINITY;
        }
        if float_eq(data.leaf_error, data.lower_bound) {
            data.settle_as_leaf();
            self.write_back(node, data);
            return data.error;
        }
        let support = cover.get_support();
        if depth == self.config.max_depth || support < 2 * self.config.min_support {
            data.settle_as_leaf();
            self.write_back(node, data);
            return data.error;
        }

        if self.config.max_depth - depth == 2 && support >= 2 * self.config.min_support {
            log::trace!("handing off node {node} to the depth-2 solver");
            self.write_back(node, data);
            return self.depth_two.solve(
                cover,
                self.cache.as_mut(),
                self.query.as_ref(),
                itemset,
                node,
                candidates,
                self.config.min_support,
                ub,
                data.lower_bound,
            );
        }

        let node_candidates = if is_new {
            self.successors(cover, candidates, last_added)
        } else {
            self.cache.existing_successors(node)
        };

        if node_candidates.is_empty() {
            data.settle_as_leaf();
            self.write_back(node, data);
            return data.error;
        }

        // The leaf is always a feasible fallback: seed it as the current
        // incumbent so only strictly improving splits get committed below.
        let mut child_ub = ub.min(data.leaf_error);
        data.error = if data.leaf_error < ub { data.leaf_error } else { f64::INFINITY };
        self.write_back(node, data);

        let mut split_committed = false;
        let mut min_lower_bound = f64::INFINITY;
        let mut similarity = SimilarityLowerBound::new();

        for &a in &node_candidates {
            cover.intersect(a, 0);
            let lb0 = similarity.bound(cover);
            cover.backtrack();
            cover.intersect(a, 1);
            let lb1 = similarity.bound(cover);
            cover.backtrack();

            let (first_polarity, first_lb, second_lb) = if lb0 > lb1 {
                (0usize, lb0, lb1)
            } else {
                (1usize, lb1, lb0)
            };
            let second_polarity = 1 - first_polarity;

            let first_error = self.explore_branch(
                cover,
                itemset,
                &node_candidates,
                a,
                first_polarity,
                depth,
                child_ub,
                first_lb,
                &mut similarity,
            );

            let can_improve = first_error.is_finite() && first_error < child_ub;
            let second_error = if can_improve {
                self.explore_branch(
                    cover,
                    itemset,
                    &node_candidates,
                    a,
                    second_polarity,
                    depth,
                    child_ub - first_error,
                    second_lb,
                    &mut similarity,
                )
            } else {
                f64::INFINITY
            };

            let feature_error = first_error + second_error;
            let mut data = *self.cache.get(node).unwrap();

            if feature_error < child_ub && feature_error < data.error {
                itemset.insert(item(a, first_polarity));
                let first_index = self.cache.find(itemset).unwrap();
                itemset.remove(&item(a, first_polarity));

                let (left_index, right_index) = if first_polarity == 0 {
                    itemset.insert(item(a, 1));
                    let second_index = self.cache.find(itemset).unwrap();
                    itemset.remove(&item(a, 1));
                    (first_index, second_index)
                } else {
                    itemset.insert(item(a, 0));
                    let second_index = self.cache.find(itemset).unwrap();
                    itemset.remove(&item(a, 0));
                    (second_index, first_index)
                };

                data.test = a;
                data.error = feature_error;
                data.is_leaf = false;
                data.left = Some(left_index);
                data.right = Some(right_index);
                child_ub = feature_error;
                split_committed = true;
                self.write_back(node, data);

                if float_eq(data.lower_bound, child_ub) {
                    break;
                }
            } else {
                min_lower_bound = min_lower_bound.min(feature_error);
            }

            if !can_improve {
                let first_term = if first_error.is_finite() {
                    first_error
                } else {
                    first_lb
                };
                min_lower_bound = min_lower_bound.min(first_term + second_lb);
            }

            if self.config.stop_after_error && depth == 0 && ub.is_finite() && data.error < ub {
                break;
            }
        }

        let mut data = *self.cache.get(node).unwrap();
        if data.error.is_infinite() {
            data.lower_bound = data.lower_bound.max(ub.max(min_lower_bound));
        } else if !split_committed {
            data.settle_as_leaf();
        }
        self.write_back(node, data);
        data.error
    }

    #[allow(clippy::too_many_arguments)]
    fn explore_branch(
        &mut self,
        cover: &mut dyn Cover,
        itemset: &mut BTreeSet<usize>,
        candidates: &[usize],
        split_attribute: usize,
        split_polarity: usize,
        depth: usize,
        ub: f64,
        lb: f64,
        similarity: &mut SimilarityLowerBound,
    ) -> f64 {
        let split_item = item(split_attribute, split_polarity);
        itemset.insert(split_item);
        let (child_node, is_new) = self.cache.insert(itemset);

        cover.intersect(split_attribute, split_polarity);
        if is_new {
            self.init_leaf_data(cover, child_node);
        }
        if let Some(data) = self.cache.get_mut(child_node) {
            data.lower_bound = data.lower_bound.max(lb);
        }

        let error = self.recurse(
            cover,
            itemset,
            candidates,
            split_attribute,
            child_node,
            depth + 1,
            ub,
            lb,
            is_new,
        );

        if error.is_finite() {
            similarity.update(cover, error);
        }
        cover.backtrack();
        itemset.remove(&split_item);
        error
    }

    fn write_back(&mut self, node: usize, data: QueryData) {
        if let Some(slot) = self.cache.get_mut(node) {
            *slot = data;
        }
    }

    fn build_solution_tree(&self, root: usize) -> Tree {
        let mut tree = Tree::new();
        let root_data = match self.cache.get(root) {
            Some(data) => *data,
            None => return tree,
        };
        let root_tree_index = tree.add_root(TreeNode::new(Self::node_infos(&root_data)));
        self.extend_solution_tree(&mut tree, root_tree_index, root);
        tree
    }

    fn extend_solution_tree(&self, tree: &mut Tree, parent: usize, cache_node: usize) {
        let Some(data) = self.cache.get(cache_node) else {
            return;
        };
        if data.is_leaf {
            return;
        }
        if let Some(left) = data.left {
            let left_data = *self.cache.get(left).unwrap();
            let index = tree.add_left_node(parent, TreeNode::new(Self::node_infos(&left_data)));
            self.extend_solution_tree(tree, index, left);
        }
        if let Some(right) = data.right {
            let right_data = *self.cache.get(right).unwrap();
            let index = tree.add_right_node(parent, TreeNode::new(Self::node_infos(&right_data)));
            self.extend_solution_tree(tree, index, right);
        }
    }

    fn node_infos(data: &QueryData) -> NodeInfos {
        if data.is_leaf {
            NodeInfos {
                test: None,
                error: data.error,
                out: Some(data.test),
            }
        } else {
            NodeInfos {
                test: Some(data.test),
                error: data.error,
                out: None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::Trie;
    use crate::cover::BitsetCover;
    use crate::heuristics::NoHeuristic;
    use crate::query::ClassificationQuery;
    use std::time::Duration;

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

    fn engine(max_depth: usize, max_error: f64) -> Dl85<Trie, ClassificationQuery, NoHeuristic> {
        let config = SearchConfig {
            max_depth,
            min_support: 1,
            max_error,
            max_time: Duration::from_secs(60),
            ..SearchConfig::default()
        };
        Dl85::new(
            config,
            Box::new(Trie::new()),
            Box::new(ClassificationQuery),
            Box::new(NoHeuristic),
        )
    }

    #[test]
    fn xor_at_depth_two_is_solved_exactly() {
        let mut cover = xor_dataset();
        let mut learner = engine(2, f64::INFINITY);
        learner.fit(&mut cover).unwrap();
        assert_eq!(learner.statistics.tree_error, 0.0);
    }

    #[test]
    fn xor_at_depth_one_cannot_beat_error_two() {
        let mut cover = xor_dataset();
        let mut learner = engine(1, f64::INFINITY);
        learner.fit(&mut cover).unwrap();
        assert_eq!(learner.statistics.tree_error, 2.0);
    }

    #[test]
    fn zero_max_error_is_infeasible() {
        let mut cover = xor_dataset();
        let mut learner = engine(2, 0.0);
        learner.fit(&mut cover).unwrap();
        assert!(learner.statistics.tree_error.is_infinite());
    }

    #[test]
    fn immediate_timeout_falls_back_to_the_majority_leaf() {
        let mut cover = xor_dataset();
        let config = SearchConfig {
            max_depth: 2,
            min_support: 1,
            max_error: f64::INFINITY,
            max_time: Duration::ZERO,
            ..SearchConfig::default()
        };
        let mut learner = Dl85::new(
            config,
            Box::new(Trie::new()),
            Box::new(ClassificationQuery),
            Box::new(NoHeuristic),
        );
        learner.fit(&mut cover).unwrap();
        assert_eq!(learner.statistics.tree_error, 2.0);
        assert!(learner.statistics.time_limit_reached);
    }
}
