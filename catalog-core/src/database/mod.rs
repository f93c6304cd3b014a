pub mod ports;
pub mod postgres;

#[cfg(test)]
pub(crate) mod fixtures;

pub use ports::CatalogStore;
pub use postgres::{PoolSettings, PostgresCatalogStore};
