//! Candidate ordering for the successor generator. A heuristic only
//! reorders its input; filtering by minsup happens earlier.

use crate::cover::Cover;
use crate::globals::information_gain;

pub trait Heuristic {
    fn sort(&self, cover: &mut dyn Cover, candidates: &mut Vec<usize>);
}

#[derive(Default)]
pub struct NoHeuristic;

impl Heuristic for NoHeuristic {
    fn sort(&self, _cover: &mut dyn Cover, _candidates: &mut Vec<usize>) {}
}

/// Highest information gain first: the split most likely to separate
/// classes is explored before the others.
#[derive(Default)]
pub struct InformationGain;

impl Heuristic for InformationGain {
    fn sort(&self, cover: &mut dyn Cover, candidates: &mut Vec<usize>) {
        let root_classes_support = cover.get_support_per_class().to_vec();
        let parent_entropy = crate::globals::compute_entropy(&root_classes_support);

        let mut scored: Vec<(usize, f64)> = candidates
            .iter()
            .map(|&attribute| {
                let gain =
                    information_gain(attribute, cover, &root_classes_support, parent_entropy);
                (attribute, gain)
            })
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap());
        *candidates = scored.into_iter().map(|(a, _)| a).collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cover::BitsetCover;

    fn xor_plus_noise() -> BitsetCover {
        // a,b as in the XOR scenario, c constant (useless split).
        let rows = vec![
            vec![false, false, false],
            vec![false, true, false],
            vec![true, false, false],
            vec![true, true, false],
        ];
        let labels = vec![0, 1, 1, 0];
        BitsetCover::new(&rows, &labels, 2)
    }

    #[test]
    fn no_heuristic_leaves_order_untouched() {
        let mut cover = xor_plus_noise();
        let mut candidates = vec![2, 0, 1];
        NoHeuristic.sort(&mut cover, &mut candidates);
        assert_eq!(candidates, vec![2, 0, 1]);
    }

    #[test]
    fn information_gain_ranks_useful_splits_first() {
        let mut cover = xor_plus_noise();
        let mut candidates = vec![2, 0, 1];
        InformationGain.sort(&mut cover, &mut candidates);
        assert_ne!(candidates[0], 2, "constant attribute carries zero gain");
    }
}
