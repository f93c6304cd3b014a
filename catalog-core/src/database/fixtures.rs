//! In-memory catalog used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::database::ports::CatalogStore;
use crate::error::Result;
use crate::query::{CompiledQuery, ParamValue};
use crate::types::ContentRow;

/// Serves a fixed leaf result and answers parent lookups from a row graph.
#[derive(Debug, Default)]
pub(crate) struct GraphStore {
    leaves: Vec<ContentRow>,
    rows: HashMap<String, ContentRow>,
    calls: Mutex<Vec<CompiledQuery>>,
}

impl GraphStore {
    pub(crate) fn new(leaves: Vec<ContentRow>) -> Self {
        Self {
            leaves,
            ..Default::default()
        }
    }

    pub(crate) fn with_row(mut self, row: ContentRow) -> Self {
        self.rows.insert(row.id.clone(), row);
        self
    }

    pub(crate) fn calls(&self) -> Vec<CompiledQuery> {
        self.calls.lock().expect("calls lock").clone()
    }
}

#[async_trait]
impl CatalogStore for GraphStore {
    async fn fetch_rows(&self, query: &CompiledQuery) -> Result<Vec<ContentRow>> {
        self.calls.lock().expect("calls lock").push(query.clone());

        match query.param("ids") {
            Some(ParamValue::TextList(ids)) => Ok(ids
                .iter()
                .filter_map(|id| self.rows.get(id).cloned())
                .collect()),
            _ => Ok(self.leaves.clone()),
        }
    }
}
