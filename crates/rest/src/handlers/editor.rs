//! Editor protocol handler.

use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
};
use docgrid_engine::DocumentStore;
use docgrid_engine::serde_helpers::split_ids;
use docgrid_engine::types::{EditPayload, EditRequest, EditResponse};
use serde::Deserialize;
use tracing::{debug, info};

use super::validate_collection;
use crate::error::RestResult;
use crate::state::AppState;

/// Query parameters accepted by the editor endpoint.
#[derive(Debug, Default, Deserialize)]
pub struct EditQuery {
    /// Comma-separated target ids, used when the body carries none.
    #[serde(default)]
    pub id: Option<String>,
}

/// Handler for editor requests.
///
/// # HTTP Request
///
/// `POST [base]/editor/{collection}?id=a,b`
///
/// The body is `{action, data, ids}`. Target ids come from the body's
/// `ids`, then from the `id` query parameter, then from the keys of `data`.
///
/// # Response
///
/// - `200 OK` - `{data, error?, outcomes}`; individual targets may fail
///   without failing the request
/// - `400 Bad Request` - Missing action, unknown action, no target ids,
///   or a malformed body
pub async fn editor_handler<S>(
    State(state): State<AppState<S>>,
    Path(collection): Path<String>,
    query: Result<Query<EditQuery>, QueryRejection>,
    payload: Result<Json<EditPayload>, JsonRejection>,
) -> RestResult<Json<EditResponse>>
where
    S: DocumentStore + 'static,
{
    validate_collection(&collection)?;
    let Query(query) = query?;
    let Json(payload) = payload?;

    let extra_ids = query.id.as_deref().map(split_ids);
    let request = EditRequest::from_payload(payload, extra_ids)?;
    debug!(
        collection = %collection,
        action = %request.action,
        targets = request.target_ids.len(),
        "Processing editor request"
    );

    let response = state
        .engine()
        .handle_edit(state.store(), &collection, &request)
        .await;

    let applied = response.outcomes.iter().filter(|o| o.is_applied()).count();
    info!(
        collection = %collection,
        action = %request.action,
        applied,
        failed = response.outcomes.len() - applied,
        "Editor request completed"
    );

    Ok(Json(response))
}
