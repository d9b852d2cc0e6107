//! The error/label collaborator: how the engine scores a cover and how it
//! reads off a leaf's predicted class. `ClassificationQuery` below is the
//! one implementation this crate ships; the engine only depends on [`Query`].

use std::fmt;

/// Configuration-time failure, raised before the search ever starts.
#[derive(Debug, Clone, PartialEq)]
pub enum FitError {
    InvalidDepth(usize),
    InvalidMinSupport(usize),
    EmptyCandidates,
    ContinuousDataRejected,
    InsufficientData,
}

impl fmt::Display for FitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FitError::InvalidDepth(depth) => write!(f, "invalid max depth: {depth}"),
            FitError::InvalidMinSupport(support) => {
                write!(f, "invalid minimum support: {support}")
            }
            FitError::EmptyCandidates => write!(f, "no candidate attributes to branch on"),
            FitError::ContinuousDataRejected => {
                write!(f, "continuous features are not supported")
            }
            FitError::InsufficientData => write!(f, "dataset has no transactions"),
        }
    }
}

impl std::error::Error for FitError {}

/// Scores a cover and picks a leaf label. Separated from the search engine
/// so the branch-and-bound core never depends on what "error" means.
pub trait Query {
    /// `(error, predicted_class)` for a cover given its per-class supports,
    /// majority class breaking ties by lowest class index.
    fn compute_error(&self, classes_support: &[usize]) -> (f64, usize);

    /// Error only, when the predicted class is not needed.
    fn compute_only_error(&self, classes_support: &[usize]) -> f64 {
        self.compute_error(classes_support).0
    }
}

/// Misclassification-count error: a leaf predicts its majority class, its
/// error is the count of transactions outside that class.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClassificationQuery;

impl Query for ClassificationQuery {
    fn compute_error(&self, classes_support: &[usize]) -> (f64, usize) {
        let mut max_class = 0;
        let mut max_support = 0;
        let mut total = 0;
        for (class, support) in classes_support.iter().enumerate() {
            total += support;
            if *support >= max_support {
                max_support = *support;
                max_class = class;
            }
        }
        ((total - max_support) as f64, max_class)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn majority_class_breaks_ties_on_lowest_index() {
        let query = ClassificationQuery;
        let (error, class) = query.compute_error(&[3, 3]);
        assert_eq!(class, 0);
        assert_eq!(error, 3.0);
    }

    #[test]
    fn pure_node_has_zero_error() {
        let query = ClassificationQuery;
        let (error, class) = query.compute_error(&[0, 5, 0]);
        assert_eq!(class, 1);
        assert_eq!(error, 0.0);
    }
}
