//! Branch-and-bound search engine: the trie-memoized lattice walk
//! ([`dl85`]), its depth-2 specialization ([`depth_two`]), and the knobs
//! that parametrize a run ([`config`]).

pub mod config;
pub mod depth_two;
pub mod dl85;

pub use config::{SearchConfig, SearchHeuristic, SearchStatistics};
pub use dl85::Dl85;

use crate::cache::Caching;
use crate::heuristics::Heuristic;
use crate::query::Query;
use std::time::Duration;

/// Fluent assembly of a [`Dl85`] instance from its three collaborators
/// (cache, error function, successor-ordering heuristic) plus the scalar
/// search knobs in [`SearchConfig`].
pub struct Dl85Builder<C, Q, H: ?Sized>
where
    C: Caching,
    Q: Query,
    H: Heuristic,
{
    config: SearchConfig,
    cache: Option<Box<C>>,
    query: Option<Box<Q>>,
    heuristic: Option<Box<H>>,
}

impl<C, Q, H> Default for Dl85Builder<C, Q, H>
where
    C: Caching,
    Q: Query,
    H: Heuristic + ?Sized,
{
    fn default() -> Self {
        Self {
            config: SearchConfig::default(),
            cache: None,
            query: None,
            heuristic: None,
        }
    }
}

impl<C, Q, H> Dl85Builder<C, Q, H>
where
    C: Caching,
    Q: Query,
    H: Heuristic + ?Sized,
{
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_depth(mut self, value: usize) -> Self {
        self.config.max_depth = value;
        self
    }

    pub fn min_support(mut self, value: usize) -> Self {
        self.config.min_support = value;
        self
    }

    pub fn max_error(mut self, value: f64) -> Self {
        self.config.max_error = value;
        self
    }

    pub fn max_time(mut self, value: Duration) -> Self {
        self.config.max_time = value;
        self
    }

    pub fn one_time_sort(mut self, value: bool) -> Self {
        self.config.one_time_sort = value;
        self
    }

    pub fn search_heuristic(mut self, value: SearchHeuristic) -> Self {
        self.config.heuristic = value;
        self
    }

    pub fn stop_after_error(mut self, value: bool) -> Self {
        self.config.stop_after_error = value;
        self
    }

    pub fn cache(mut self, value: Box<C>) -> Self {
        self.cache = Some(value);
        self
    }

    pub fn query(mut self, value: Box<Q>) -> Self {
        self.query = Some(value);
        self
    }

    pub fn heuristic(mut self, value: Box<H>) -> Self {
        self.heuristic = Some(value);
        self
    }

    pub fn build(self) -> Result<Dl85<C, Q, H>, String> {
        let cache = self.cache.ok_or("cache collaborator is required")?;
        let query = self.query.ok_or("query collaborator is required")?;
        let heuristic = self.heuristic.ok_or("heuristic collaborator is required")?;
        Ok(Dl85::new(self.config, cache, query, heuristic))
    }
}
