//! Pass-scoped visitation bookkeeping for half-facet traversals.
//!
//! Graph walks over the sibling graph mark half-facets as they go so that
//! each one is handled exactly once. The marks live in a [`VisitSet`] owned
//! by the traversal instead of on the elements themselves, so no mark can
//! outlive the pass that set it.

use std::collections::HashSet;

use super::index::HalfFacetId;

/// Set of half-facets visited by one traversal.
#[derive(Debug, Default, Clone)]
pub struct VisitSet {
    visited: HashSet<HalfFacetId>,
}

impl VisitSet {
    /// Create an empty visit set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty visit set sized for `num_half_facets` marks.
    pub fn with_capacity(num_half_facets: usize) -> Self {
        Self {
            visited: HashSet::with_capacity(num_half_facets),
        }
    }

    /// Mark `hf` as visited.
    ///
    /// Returns `true` if it had not been visited before.
    #[inline]
    pub fn visit(&mut self, hf: HalfFacetId) -> bool {
        self.visited.insert(hf)
    }

    /// Check if `hf` has been visited.
    #[inline]
    pub fn is_visited(&self, hf: HalfFacetId) -> bool {
        self.visited.contains(&hf)
    }

    /// Number of visited half-facets.
    #[inline]
    pub fn len(&self) -> usize {
        self.visited.len()
    }

    /// Check if nothing has been visited.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.visited.is_empty()
    }

    /// Reset every half-facet to unvisited.
    pub fn clear(&mut self) {
        self.visited.clear();
    }
}
