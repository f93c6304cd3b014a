use tracing::debug;

use crate::database::ports::CatalogStore;
use crate::error::Result;
use crate::query::params::{CompiledQuery, ParamValue, Params};
use crate::query::predicate::PredicateState;
use crate::query::tables::TableNames;
use crate::types::ContentRow;

/// Fixed page size of a search. There is no caller-controlled pagination.
pub const SEARCH_PAGE_SIZE: usize = 48;

/// Builds the catalog queries: the filtered leaf search and the by-id
/// parent lookups used while walking the hierarchy.
#[derive(Debug, Clone, Default)]
pub struct SearchQueryCompiler {
    tables: TableNames,
}

impl SearchQueryCompiler {
    pub fn new(tables: TableNames) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &TableNames {
        &self.tables
    }

    /// Filtered search over content left-joined with its asset, capped at
    /// [`SEARCH_PAGE_SIZE`] rows.
    pub fn leaf_query(&self, state: &PredicateState) -> CompiledQuery {
        let predicate = state.compile(&self.tables);

        let mut sql = self.select_from();
        if !predicate.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&predicate.expression());
        }
        sql.push_str(&format!(" LIMIT {SEARCH_PAGE_SIZE}"));

        CompiledQuery::new(sql, predicate.into_params())
    }

    /// Rows whose content id is one of `ids`, ordered by asset kind
    /// descending.
    pub fn parents_query(&self, ids: Vec<String>) -> CompiledQuery {
        let content = self.tables.media_content();
        let asset = self.tables.asset();

        let sql = format!(
            "{} WHERE {content}.id IN (:ids) ORDER BY {asset}.data->>'kind' DESC",
            self.select_from()
        );

        let mut params = Params::new();
        params.insert("ids", ParamValue::TextList(ids));
        CompiledQuery::new(sql, params)
    }

    /// Run the leaf search. Exactly one store call; errors pass through.
    pub async fn fetch_leaf_rows(
        &self,
        store: &dyn CatalogStore,
        state: &PredicateState,
    ) -> Result<Vec<ContentRow>> {
        let query = self.leaf_query(state);
        let rows = store.fetch_rows(&query).await?;
        debug!(rows = rows.len(), "leaf search returned");
        Ok(rows)
    }

    fn select_from(&self) -> String {
        let c = self.tables.media_content();
        let a = self.tables.asset();

        let fields = [
            format!("{c}.id AS id"),
            format!("{c}.parent_id AS parent_id"),
            format!("{c}.data->>'kind' AS kind"),
            format!("COALESCE({c}.data->'titles', '{{}}'::jsonb) AS titles"),
            format!("COALESCE({c}.data->'genres', '[]'::jsonb) AS genres"),
            format!(
                "CASE WHEN jsonb_typeof({c}.data->'productionDate') = 'object' \
                 THEN make_date(\
                 ({c}.data->'productionDate'->>'year')::int, \
                 ({c}.data->'productionDate'->>'month')::int, \
                 ({c}.data->'productionDate'->>'day')::int) \
                 END AS production_date"
            ),
            format!(
                "COALESCE({c}.data->>'adultContent' = 'true', false) AS adult_content"
            ),
            format!("{a}.id AS asset_id"),
            format!("{a}.data->>'kind' AS asset_kind"),
            format!("{a}.channel_id AS channel_id"),
            format!("{a}.linear_start AS linear_start"),
            format!("{a}.linear_end AS linear_end"),
            format!("{a}.buy_start AS buy_start"),
            format!("{a}.buy_end AS buy_end"),
            format!("{a}.catchup_start AS catchup_start"),
            format!("{a}.catchup_end AS catchup_end"),
            format!("{a}.rent_start AS rent_start"),
            format!("{a}.rent_end AS rent_end"),
            format!("{a}.subscription_start AS subscription_start"),
            format!("{a}.subscription_end AS subscription_end"),
            format!(
                "COALESCE({a}.data->'restrictions'->>'allowCatchup' = 'true', false) \
                 AS allow_catchup"
            ),
        ];

        format!(
            "SELECT {} FROM {c} LEFT OUTER JOIN {a} ON {c}.id = {a}.content_id",
            fields.join(", ")
        )
    }
}
