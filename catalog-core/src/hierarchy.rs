//! Ancestor closure over the content hierarchy (episode → season → series).

use std::collections::HashSet;

use tracing::{debug, warn};

use crate::database::ports::CatalogStore;
use crate::error::Result;
use crate::query::SearchQueryCompiler;
use crate::types::ContentRow;

/// Upper bound on parent lookups for one search. A cyclic parent graph
/// stops here instead of walking forever.
pub const MAX_PARENT_ROUNDS: usize = 100;

/// Rows collected by [`HierarchyResolver::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchyClosure {
    /// Ancestors first; each round's rows precede everything fetched
    /// before them. Not deduplicated.
    pub rows: Vec<ContentRow>,
    /// Parent lookups performed.
    pub rounds: usize,
    /// The walk stopped at [`MAX_PARENT_ROUNDS`] while the last batch still
    /// referenced parents.
    pub truncated: bool,
}

#[derive(Debug, Clone, Default)]
pub struct HierarchyResolver {
    compiler: SearchQueryCompiler,
}

impl HierarchyResolver {
    pub fn new(compiler: SearchQueryCompiler) -> Self {
        Self { compiler }
    }

    /// Fetch parents of `leaf_rows`, then parents of those, until a batch
    /// references no parent or the round ceiling is hit. One store call per
    /// round; store errors abort the walk.
    pub async fn resolve(
        &self,
        store: &dyn CatalogStore,
        leaf_rows: Vec<ContentRow>,
    ) -> Result<HierarchyClosure> {
        let mut accumulated = leaf_rows.clone();
        let mut frontier = leaf_rows;

        for round in 1..=MAX_PARENT_ROUNDS {
            let ids = parent_ids(&frontier);
            if ids.is_empty() {
                return Ok(HierarchyClosure {
                    rows: accumulated,
                    rounds: round - 1,
                    truncated: false,
                });
            }

            debug!(round, parents = ids.len(), "fetching parent rows");
            frontier = store
                .fetch_rows(&self.compiler.parents_query(ids))
                .await?;
            accumulated.splice(0..0, frontier.iter().cloned());
        }

        let truncated = !parent_ids(&frontier).is_empty();
        if truncated {
            warn!(
                rounds = MAX_PARENT_ROUNDS,
                rows = accumulated.len(),
                "parent walk hit the round ceiling; hierarchy may be cyclic"
            );
        }

        Ok(HierarchyClosure {
            rows: accumulated,
            rounds: MAX_PARENT_ROUNDS,
            truncated,
        })
    }
}

/// Distinct parent ids of `rows`, in first-seen order.
pub fn parent_ids(rows: &[ContentRow]) -> Vec<String> {
    let mut seen = HashSet::new();
    rows.iter()
        .filter_map(ContentRow::parent)
        .filter(|id| seen.insert(*id))
        .map(str::to_owned)
        .collect()
}
