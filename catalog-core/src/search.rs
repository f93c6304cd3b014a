use std::fmt;
use std::sync::Arc;

use tracing::{info, instrument};

use crate::criteria::SearchCriteria;
use crate::database::ports::CatalogStore;
use crate::enrich::{RowEnricher, SeriesTitleEnricher};
use crate::error::Result;
use crate::hierarchy::HierarchyResolver;
use crate::query::{PredicateState, SearchQueryCompiler, TableNames};
use crate::types::ContentRow;

/// Catalog search entry point.
///
/// Holds no per-request state, so one instance can serve concurrent
/// searches.
#[derive(Clone)]
pub struct CatalogSearch {
    store: Arc<dyn CatalogStore>,
    compiler: SearchQueryCompiler,
    resolver: HierarchyResolver,
    enricher: Arc<dyn RowEnricher>,
}

impl fmt::Debug for CatalogSearch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogSearch")
            .field("tables", self.compiler.tables())
            .finish_non_exhaustive()
    }
}

impl CatalogSearch {
    pub fn new(store: Arc<dyn CatalogStore>, tables: TableNames) -> Self {
        let compiler = SearchQueryCompiler::new(tables);
        Self {
            store,
            resolver: HierarchyResolver::new(compiler.clone()),
            compiler,
            enricher: Arc::new(SeriesTitleEnricher),
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn RowEnricher>) -> Self {
        self.enricher = enricher;
        self
    }

    /// Run the filtered leaf search, collect every ancestor of the matches
    /// and enrich the result.
    #[instrument(skip_all)]
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
    ) -> Result<Vec<ContentRow>> {
        let state = PredicateState::from_criteria(criteria);

        let leaves = self
            .compiler
            .fetch_leaf_rows(self.store.as_ref(), &state)
            .await?;
        let leaf_count = leaves.len();

        let closure = self.resolver.resolve(self.store.as_ref(), leaves).await?;

        info!(
            leaf_rows = leaf_count,
            rows = closure.rows.len(),
            rounds = closure.rounds,
            truncated = closure.truncated,
            "catalog search completed"
        );

        Ok(self.enricher.enrich(closure.rows))
    }
}
