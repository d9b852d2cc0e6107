//! Item/attribute encoding and small numeric helpers shared across the engine.

use crate::cover::Cover;
use crate::tree::Tree;

/// No attribute has been branched on yet.
pub const NO_ATTRIBUTE: usize = usize::MAX;

/// The epsilon used by every float comparison in the engine. Never compare
/// `f64` errors/bounds with `==` directly, go through [`float_eq`] instead.
pub const EPSILON: f64 = 1e-5;

pub fn attribute(item: usize) -> usize {
    item / 2
}

/// 0 = negated, 1 = present.
pub fn polarity(item: usize) -> usize {
    item % 2
}

pub fn item(attribute: usize, polarity: usize) -> usize {
    attribute * 2 + polarity
}

pub fn float_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

/// Per-class `total − part`. Panics if any class's `part` exceeds its
/// `total`, which can only happen if a cover computation is wrong.
pub fn support_diff(total: &[usize], part: &[usize]) -> Vec<usize> {
    total
        .iter()
        .zip(part)
        .map(|(t, p)| t.checked_sub(*p).unwrap_or_else(|| panic!("negative support: {t} - {p}")))
        .collect()
}

pub fn compute_entropy(classes_support: &[usize]) -> f64 {
    let support = classes_support.iter().sum::<usize>();
    let mut entropy = 0f64;
    for class_support in classes_support {
        let p = match support {
            0 => 0f64,
            _ => *class_support as f64 / support as f64,
        };
        let log_val = if p > 0. { p.log2() } else { 0. };
        entropy += -p * log_val;
    }
    entropy
}

/// Classical decrease in class entropy for a binary split on `attribute`.
pub fn information_gain(
    attribute: usize,
    cover: &mut dyn Cover,
    root_classes_support: &[usize],
    parent_entropy: f64,
) -> f64 {
    let left_classes_support = cover.temporary_intersect(attribute, 0).0;
    let right_classes_support = support_diff(root_classes_support, &left_classes_support);

    let total_size = root_classes_support.iter().sum::<usize>();
    let left_size = left_classes_support.iter().sum::<usize>();
    let right_size = right_classes_support.iter().sum::<usize>();

    let left_weight = match total_size {
        0 => 0f64,
        _ => left_size as f64 / total_size as f64,
    };
    let right_weight = match total_size {
        0 => 0f64,
        _ => right_size as f64 / total_size as f64,
    };

    let left_entropy = compute_entropy(&left_classes_support);
    let right_entropy = compute_entropy(&right_classes_support);

    parent_entropy - (left_weight * left_entropy + right_weight * right_entropy)
}

pub fn get_tree_root_error(tree: &Tree) -> f64 {
    tree.get_node(tree.get_root_index())
        .map_or(f64::INFINITY, |node| node.value.error)
}
