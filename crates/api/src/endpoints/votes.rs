//! Vote endpoints.

use axum::{Router, extract::State, routing::post};
use roompoll_common::AppResult;
use roompoll_core::{CastVotesInput, CastVotesOutput};
use serde::Deserialize;

use crate::{
    extractors::{AdminInput, AppJson},
    middleware::AppState,
    response::ApiResponse,
};

/// Has-voted request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasVotedRequest {
    pub poll_id: String,
    pub voter_code: String,
}

/// Delete-vote request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteVoteRequest {
    pub vote_id: String,
}

/// Cast a ballot.
async fn cast(
    State(state): State<AppState>,
    AppJson(input): AppJson<CastVotesInput>,
) -> AppResult<ApiResponse<CastVotesOutput>> {
    let output = state.vote_service.cast_votes(input).await?;

    Ok(ApiResponse::ok(output))
}

/// Whether a voter code has voted on a poll.
async fn has_voted(
    State(state): State<AppState>,
    AppJson(req): AppJson<HasVotedRequest>,
) -> AppResult<ApiResponse<bool>> {
    let voted = state
        .vote_service
        .has_voted(&req.poll_id, &req.voter_code)
        .await?;

    Ok(ApiResponse::ok(voted))
}

/// Delete a single vote.
async fn delete(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<DeleteVoteRequest>>,
) -> AppResult<ApiResponse<()>> {
    state
        .vote_service
        .delete_vote(&req.admin_code, &req.input.vote_id)
        .await?;

    Ok(ApiResponse::ok(()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/cast", post(cast))
        .route("/has-voted", post(has_voted))
        .route("/delete", post(delete))
}
