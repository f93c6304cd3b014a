pub mod params;
pub mod predicate;
pub mod search;
pub mod tables;

pub use params::{CompiledQuery, ParamValue, Params};
pub use predicate::{ClauseKind, Predicate, PredicateState};
pub use search::{SEARCH_PAGE_SIZE, SearchQueryCompiler};
pub use tables::TableNames;
