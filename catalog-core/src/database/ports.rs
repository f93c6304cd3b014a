use async_trait::async_trait;

use crate::error::Result;
use crate::query::CompiledQuery;
use crate::types::ContentRow;

/// Executes compiled catalog queries.
///
/// Query text uses `:name` placeholders resolved from
/// [`CompiledQuery::params`]; list values bind as membership lists. Each
/// call is a single attempt.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn fetch_rows(&self, query: &CompiledQuery) -> Result<Vec<ContentRow>>;
}
