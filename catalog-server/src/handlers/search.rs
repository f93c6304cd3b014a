use axum::{Json, extract::State};
use catalog_core::{ContentRow, SearchCriteria};
use tracing::debug;

use crate::infra::{app_state::AppState, errors::AppResult};

/// Search the catalog.
///
/// The body is a [`SearchCriteria`] object; every field is optional and a
/// malformed field is ignored rather than rejected. Responds with the matched
/// rows preceded by their ancestors.
pub async fn search_handler(
    State(state): State<AppState>,
    Json(criteria): Json<SearchCriteria>,
) -> AppResult<Json<Vec<ContentRow>>> {
    debug!(?criteria, "search request");
    let rows = state.search.search(&criteria).await?;
    Ok(Json(rows))
}
