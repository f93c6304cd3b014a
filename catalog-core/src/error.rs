use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Catalog query timed out after {0:?}")]
    Timeout(Duration),

    #[error("Invalid SQL identifier: {0}")]
    InvalidIdentifier(String),

    #[error("Unbound query parameter: {0}")]
    UnboundParameter(String),
}

pub type Result<T> = std::result::Result<T, CatalogError>;
