use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SearchConfig {
    pub max_depth: usize,
    pub min_support: usize,
    pub max_error: f64,
    pub max_time: Duration,
    /// Sort successors by heuristic once, then reuse trie-edge order on
    /// revisits instead of re-sorting every time.
    pub one_time_sort: bool,
    pub heuristic: SearchHeuristic,
    /// Break out of the root frame's branching loop as soon as an error
    /// strictly below `max_error` has been found.
    pub stop_after_error: bool,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            max_depth: 1,
            min_support: 1,
            max_error: f64::INFINITY,
            max_time: Duration::MAX,
            one_time_sort: false,
            heuristic: SearchHeuristic::None_,
            stop_after_error: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
pub struct SearchStatistics {
    pub cache_size: usize,
    pub call_count: usize,
    pub depth_two_call_count: usize,
    pub depth_two_time: Duration,
    pub tree_error: f64,
    pub duration: Duration,
    pub num_attributes: usize,
    pub num_transactions: usize,
    pub time_limit_reached: bool,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, ValueEnum, PartialEq, Eq)]
pub enum SearchHeuristic {
    InformationGain,
    None_,
}
