//! Poll endpoints.

use std::collections::BTreeMap;

use axum::{Router, extract::State, routing::post};
use roompoll_common::AppResult;
use roompoll_core::{
    CreatePollInput, PollWithVoterCount, QuestionResult, ResultsView, UpdatePollInput, VoteRow,
    VotesTable,
};
use roompoll_db::entities::{choice, poll, question};
use roompoll_db::repositories::PollStructure;
use serde::{Deserialize, Serialize};

use crate::{
    extractors::{AdminInput, AppJson},
    middleware::AppState,
    response::ApiResponse,
};

// ==================== Request/Response Types ====================

/// Poll response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollResponse {
    pub id: String,
    pub room_id: String,
    pub title: String,
    pub description: Option<String>,
    pub is_active: bool,
    pub is_visible: bool,
    pub results_visible: bool,
    pub sort_date: Option<String>,
    pub created_at: String,
}

impl From<poll::Model> for PollResponse {
    fn from(p: poll::Model) -> Self {
        Self {
            id: p.id,
            room_id: p.room_id,
            title: p.title,
            description: p.description,
            is_active: p.is_active,
            is_visible: p.is_visible,
            results_visible: p.results_visible,
            sort_date: p.sort_date.map(|dt| dt.to_rfc3339()),
            created_at: p.created_at.to_rfc3339(),
        }
    }
}

/// Poll with the number of distinct voters (admin listing).
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollSummaryResponse {
    #[serde(flatten)]
    pub poll: PollResponse,
    pub voter_count: usize,
}

impl From<PollWithVoterCount> for PollSummaryResponse {
    fn from(p: PollWithVoterCount) -> Self {
        Self {
            poll: p.poll.into(),
            voter_count: p.voter_count,
        }
    }
}

/// Choice response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceResponse {
    pub id: String,
    pub text: String,
    pub order: i32,
}

impl From<choice::Model> for ChoiceResponse {
    fn from(c: choice::Model) -> Self {
        Self {
            id: c.id,
            text: c.text,
            order: c.order,
        }
    }
}

/// Question response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: String,
    pub text: String,
    pub order: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub choices: Option<Vec<ChoiceResponse>>,
}

impl From<question::Model> for QuestionResponse {
    fn from(q: question::Model) -> Self {
        Self {
            id: q.id,
            text: q.text,
            order: q.order,
            choices: None,
        }
    }
}

/// Poll with its questions and choices.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollDetailResponse {
    #[serde(flatten)]
    pub poll: PollResponse,
    pub questions: Vec<QuestionResponse>,
}

impl From<PollStructure> for PollDetailResponse {
    fn from(s: PollStructure) -> Self {
        Self {
            poll: s.poll.into(),
            questions: s
                .questions
                .into_iter()
                .map(|(q, choices)| QuestionResponse {
                    choices: Some(choices.into_iter().map(Into::into).collect()),
                    ..q.into()
                })
                .collect(),
        }
    }
}

/// Choice with its tally.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceResultResponse {
    pub id: String,
    pub text: String,
    pub order: i32,
    pub vote_count: u64,
    pub percentage: u32,
}

/// Question with per-choice tallies.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResultResponse {
    pub id: String,
    pub text: String,
    pub order: i32,
    pub choices: Vec<ChoiceResultResponse>,
    pub total_votes: u64,
}

impl From<QuestionResult> for QuestionResultResponse {
    fn from(r: QuestionResult) -> Self {
        Self {
            id: r.question.id,
            text: r.question.text,
            order: r.question.order,
            choices: r
                .choices
                .into_iter()
                .map(|c| ChoiceResultResponse {
                    id: c.choice.id,
                    text: c.choice.text,
                    order: c.choice.order,
                    vote_count: c.vote_count,
                    percentage: c.percentage,
                })
                .collect(),
            total_votes: r.total_votes,
        }
    }
}

/// Results view.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsResponse {
    #[serde(flatten)]
    pub poll: PollResponse,
    pub questions: Vec<QuestionResultResponse>,
    pub is_admin: bool,
    pub can_view_results: bool,
}

impl From<ResultsView> for ResultsResponse {
    fn from(v: ResultsView) -> Self {
        Self {
            poll: v.poll.into(),
            questions: v.questions.into_iter().map(Into::into).collect(),
            is_admin: v.is_admin,
            can_view_results: v.can_view_results,
        }
    }
}

/// One voter's answer to one question.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteCellResponse {
    pub vote_id: String,
    pub choice_id: String,
    pub choice_text: String,
}

/// One row of the votes table.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRowResponse {
    pub voter_code: Option<String>,
    pub first_seen: String,
    pub last_seen: String,
    pub answers: BTreeMap<String, VoteCellResponse>,
}

impl From<VoteRow> for VoteRowResponse {
    fn from(row: VoteRow) -> Self {
        Self {
            voter_code: row.voter_code,
            first_seen: row.first_seen.to_rfc3339(),
            last_seen: row.last_seen.to_rfc3339(),
            answers: row
                .answers
                .into_iter()
                .map(|(question_id, cell)| {
                    (
                        question_id,
                        VoteCellResponse {
                            vote_id: cell.vote_id,
                            choice_id: cell.choice_id,
                            choice_text: cell.choice_text,
                        },
                    )
                })
                .collect(),
        }
    }
}

/// Votes pivoted per voter.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VotesTableResponse {
    pub questions: Vec<QuestionResponse>,
    pub rows: Vec<VoteRowResponse>,
}

impl From<VotesTable> for VotesTableResponse {
    fn from(t: VotesTable) -> Self {
        Self {
            questions: t.questions.into_iter().map(Into::into).collect(),
            rows: t.rows.into_iter().map(Into::into).collect(),
        }
    }
}

/// Poll id response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PollIdResponse {
    pub poll_id: String,
}

/// Move-to-top response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SortDateResponse {
    pub sort_date: String,
}

/// Request naming a poll.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PollIdRequest {
    pub poll_id: String,
}

/// Request setting a poll flag.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetFlagRequest {
    pub poll_id: String,
    pub value: bool,
}

/// Request naming a room.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoomCodeRequest {
    pub room_code: String,
}

/// Results request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultsRequest {
    pub poll_id: String,
    #[serde(default)]
    pub admin_code: Option<String>,
}

// ==================== Handlers ====================

/// Create a poll.
async fn create(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<CreatePollInput>>,
) -> AppResult<ApiResponse<PollIdResponse>> {
    let poll = state
        .poll_service
        .create(&req.admin_code, req.input)
        .await?;

    Ok(ApiResponse::ok(PollIdResponse { poll_id: poll.id }))
}

/// Edit a poll in place.
async fn update(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<UpdatePollInput>>,
) -> AppResult<ApiResponse<PollIdResponse>> {
    let poll_id = state
        .poll_service
        .update(&req.admin_code, req.input)
        .await?;

    Ok(ApiResponse::ok(PollIdResponse { poll_id }))
}

/// Open or close voting.
async fn set_active(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<SetFlagRequest>>,
) -> AppResult<ApiResponse<bool>> {
    let value = state
        .poll_service
        .set_active(&req.admin_code, &req.input.poll_id, req.input.value)
        .await?;

    Ok(ApiResponse::ok(value))
}

/// Show or hide a poll.
async fn set_visible(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<SetFlagRequest>>,
) -> AppResult<ApiResponse<bool>> {
    let value = state
        .poll_service
        .set_visible(&req.admin_code, &req.input.poll_id, req.input.value)
        .await?;

    Ok(ApiResponse::ok(value))
}

/// Publish or hide results.
async fn set_results_visible(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<SetFlagRequest>>,
) -> AppResult<ApiResponse<bool>> {
    let value = state
        .poll_service
        .set_results_visible(&req.admin_code, &req.input.poll_id, req.input.value)
        .await?;

    Ok(ApiResponse::ok(value))
}

/// Move a poll to the top of its room.
async fn move_to_top(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<PollIdRequest>>,
) -> AppResult<ApiResponse<SortDateResponse>> {
    let sort_date = state
        .poll_service
        .move_to_top(&req.admin_code, &req.input.poll_id)
        .await?;

    Ok(ApiResponse::ok(SortDateResponse {
        sort_date: sort_date.to_rfc3339(),
    }))
}

/// List visible polls of a room.
async fn list(
    State(state): State<AppState>,
    AppJson(req): AppJson<RoomCodeRequest>,
) -> AppResult<ApiResponse<Vec<PollResponse>>> {
    let polls = state.poll_service.list(&req.room_code).await?;

    Ok(ApiResponse::ok(polls.into_iter().map(Into::into).collect()))
}

/// List every poll of a room with voter counts.
async fn list_all(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<RoomCodeRequest>>,
) -> AppResult<ApiResponse<Vec<PollSummaryResponse>>> {
    let polls = state
        .poll_service
        .list_all(&req.admin_code, &req.input.room_code)
        .await?;

    Ok(ApiResponse::ok(polls.into_iter().map(Into::into).collect()))
}

/// Show a poll with its questions; `null` when it does not exist.
async fn show(
    State(state): State<AppState>,
    AppJson(req): AppJson<PollIdRequest>,
) -> AppResult<ApiResponse<Option<PollDetailResponse>>> {
    let poll = state.poll_service.get(&req.poll_id).await?;

    Ok(ApiResponse::ok(poll.map(Into::into)))
}

/// Aggregated results.
async fn results(
    State(state): State<AppState>,
    AppJson(req): AppJson<ResultsRequest>,
) -> AppResult<ApiResponse<ResultsResponse>> {
    let view = state
        .results_service
        .get_results(&req.poll_id, req.admin_code.as_deref())
        .await?;

    Ok(ApiResponse::ok(view.into()))
}

/// Votes pivoted per voter.
async fn votes_table(
    State(state): State<AppState>,
    AppJson(req): AppJson<AdminInput<PollIdRequest>>,
) -> AppResult<ApiResponse<VotesTableResponse>> {
    let table = state
        .results_service
        .votes_table(&req.admin_code, &req.input.poll_id)
        .await?;

    Ok(ApiResponse::ok(table.into()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/create", post(create))
        .route("/update", post(update))
        .route("/set-active", post(set_active))
        .route("/set-visible", post(set_visible))
        .route("/set-results-visible", post(set_results_visible))
        .route("/move-to-top", post(move_to_top))
        .route("/list", post(list))
        .route("/list-all", post(list_all))
        .route("/show", post(show))
        .route("/results", post(results))
        .route("/votes-table", post(votes_table))
}
