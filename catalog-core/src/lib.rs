//! # Catalog Core
//!
//! Search over a media catalog whose content forms a parent/child hierarchy
//! (series → season → episode).
//!
//! ## Overview
//!
//! A search takes a set of optional criteria (title, kinds, genres,
//! production dates, channels, availability window) and:
//!
//! 1. validates them into a [`PredicateState`](query::PredicateState),
//!    dropping anything absent, empty or unparseable;
//! 2. compiles that state into one parameterized query and runs it once;
//! 3. walks up the hierarchy from the matched rows, one parent lookup per
//!    level, until no row references a parent (or the round ceiling hits);
//! 4. enriches the collected rows (season rows receive their series' titles).
//!
//! ## Architecture
//!
//! - [`criteria`]: caller-facing request type
//! - [`dates`]: date and timestamp normalization
//! - [`query`]: predicate state, clause compilation and query building
//! - [`hierarchy`]: ancestor closure
//! - [`enrich`]: post-processing of the final rows
//! - [`database`]: store port and the PostgreSQL implementation
//! - [`search`]: the [`CatalogSearch`] entry point
//!
//! ## Examples
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use catalog_core::{
//!     CatalogSearch, SearchCriteria,
//!     database::{PoolSettings, PostgresCatalogStore},
//!     query::TableNames,
//! };
//!
//! async fn run() -> catalog_core::Result<()> {
//!     let store = PostgresCatalogStore::connect(
//!         "postgres://localhost/catalog",
//!         PoolSettings::default(),
//!     )
//!     .await?;
//!     let search = CatalogSearch::new(Arc::new(store), TableNames::default());
//!
//!     let criteria: SearchCriteria = serde_json::from_str(
//!         r#"{ "title": "news", "kinds": ["episode"] }"#,
//!     )
//!     .expect("valid json");
//!     let rows = search.search(&criteria).await?;
//!     println!("{} rows", rows.len());
//!     Ok(())
//! }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod criteria;
pub mod database;
pub mod dates;
pub mod enrich;
pub mod error;
pub mod hierarchy;
pub mod query;
pub mod search;
pub mod types;

pub use criteria::{DateRange, SearchCriteria};
pub use error::{CatalogError, Result};
pub use search::CatalogSearch;
pub use types::ContentRow;
