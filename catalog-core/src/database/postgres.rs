use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use sqlx::{
    PgPool, Postgres, QueryBuilder,
    postgres::PgPoolOptions,
};
use tracing::{debug, info};

use crate::database::ports::CatalogStore;
use crate::error::{CatalogError, Result};
use crate::query::{CompiledQuery, ParamValue};
use crate::types::ContentRow;

/// Connection pool sizing for [`PostgresCatalogStore::connect`].
#[derive(Debug, Clone, Copy)]
pub struct PoolSettings {
    pub max_connections: u32,
    pub min_connections: u32,
    pub acquire_timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        Self {
            max_connections: 10,
            min_connections: 1,
            acquire_timeout: Duration::from_secs(30),
        }
    }
}

#[derive(Clone)]
pub struct PostgresCatalogStore {
    pool: PgPool,
    query_timeout: Option<Duration>,
}

impl fmt::Debug for PostgresCatalogStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PostgresCatalogStore")
            .field("pool_size", &self.pool.size())
            .field("idle_connections", &self.pool.num_idle())
            .field("query_timeout", &self.query_timeout)
            .finish()
    }
}

impl PostgresCatalogStore {
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            query_timeout: None,
        }
    }

    pub async fn connect(
        connection_string: &str,
        settings: PoolSettings,
    ) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(settings.max_connections)
            .min_connections(settings.min_connections)
            .acquire_timeout(settings.acquire_timeout)
            .test_before_acquire(true)
            .connect(connection_string)
            .await?;

        info!(
            max_connections = settings.max_connections,
            min_connections = settings.min_connections,
            "catalog database pool initialized"
        );

        Ok(Self::new(pool))
    }

    /// Bound every store call by `timeout`. `None` waits indefinitely.
    pub fn with_query_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.query_timeout = timeout;
        self
    }
}

#[async_trait]
impl CatalogStore for PostgresCatalogStore {
    async fn fetch_rows(&self, query: &CompiledQuery) -> Result<Vec<ContentRow>> {
        let mut sql_builder = bind_named(query)?;
        debug!(sql = sql_builder.sql(), "executing catalog query");

        let fetch = sql_builder
            .build_query_as::<ContentRow>()
            .fetch_all(&self.pool);

        let rows = match self.query_timeout {
            Some(limit) => tokio::time::timeout(limit, fetch)
                .await
                .map_err(|_| CatalogError::Timeout(limit))??,
            None => fetch.await?,
        };

        Ok(rows)
    }
}

/// Translate `:name` placeholders into positional binds.
///
/// Text inside single-quoted literals and `::type` casts is copied as is.
/// List values expand to a comma-separated bind list (`NULL` when empty).
pub(crate) fn bind_named(
    query: &CompiledQuery,
) -> Result<QueryBuilder<'static, Postgres>> {
    let sql = query.sql.as_str();
    let mut sql_builder = QueryBuilder::<Postgres>::new("");
    let mut pending = String::new();
    let mut in_literal = false;
    let mut chars = sql.char_indices().peekable();

    while let Some((index, ch)) = chars.next() {
        if ch == '\'' {
            in_literal = !in_literal;
            pending.push(ch);
            continue;
        }
        if in_literal || ch != ':' {
            pending.push(ch);
            continue;
        }

        match chars.peek().copied() {
            Some((_, ':')) => {
                chars.next();
                pending.push_str("::");
            }
            Some((_, next)) if next.is_ascii_alphabetic() || next == '_' => {
                let start = index + 1;
                let mut end = start;
                while let Some(&(pos, c)) = chars.peek() {
                    if c.is_ascii_alphanumeric() || c == '_' {
                        end = pos + c.len_utf8();
                        chars.next();
                    } else {
                        break;
                    }
                }

                let name = &sql[start..end];
                let value = query.params.get(name).ok_or_else(|| {
                    CatalogError::UnboundParameter(name.to_string())
                })?;

                sql_builder.push(&pending);
                pending.clear();
                push_value(&mut sql_builder, value);
            }
            _ => pending.push(ch),
        }
    }

    sql_builder.push(pending);
    Ok(sql_builder)
}

fn push_value(sql_builder: &mut QueryBuilder<'static, Postgres>, value: &ParamValue) {
    match value {
        ParamValue::Null => {
            sql_builder.push_bind(None::<String>);
        }
        ParamValue::Text(text) => {
            sql_builder.push_bind(text.clone());
        }
        ParamValue::TextList(items) if items.is_empty() => {
            sql_builder.push("NULL");
        }
        ParamValue::TextList(items) => {
            let mut separated = sql_builder.separated(", ");
            for item in items {
                separated.push_bind(item.clone());
            }
        }
        ParamValue::Date(date) => {
            sql_builder.push_bind(*date);
        }
        ParamValue::Timestamp(ts) => {
            sql_builder.push_bind(*ts);
        }
    }
}
