use std::{fmt, sync::Arc};

use catalog_core::CatalogSearch;

#[derive(Clone)]
pub struct AppState {
    pub search: Arc<CatalogSearch>,
}

impl AppState {
    pub fn new(search: CatalogSearch) -> Self {
        Self {
            search: Arc::new(search),
        }
    }
}

impl fmt::Debug for AppState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppState")
            .field("search", &self.search)
            .finish()
    }
}
