//! Grid protocol handler.

use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
};
use docgrid_engine::{DocumentStore, GridRequest, GridResponse};
use tracing::debug;

use super::validate_collection;
use crate::error::RestResult;
use crate::state::AppState;

/// Handler for grid requests.
///
/// # HTTP Request
///
/// `POST [base]/grid/{collection}`
///
/// The body is the grid protocol request: `draw`, `start`, `length`,
/// `search`, `order` and `columns`. Numeric members may be sent as strings.
///
/// # Response
///
/// - `200 OK` - `{draw, recordsTotal, recordsFiltered, data}`, plus
///   `queryStats` when diagnostics are on
/// - `400 Bad Request` - Body is not a grid request
/// - `500`/`503` - The store failed
pub async fn grid_handler<S>(
    State(state): State<AppState<S>>,
    Path(collection): Path<String>,
    payload: Result<Json<GridRequest>, JsonRejection>,
) -> RestResult<Json<GridResponse>>
where
    S: DocumentStore + 'static,
{
    validate_collection(&collection)?;
    let Json(request) = payload?;

    debug!(
        collection = %collection,
        draw = request.draw(),
        columns = request.columns.len(),
        "Processing grid request"
    );

    let response = state
        .engine()
        .handle_grid(state.store(), &collection, &request, None)
        .await?;

    Ok(Json(response))
}
