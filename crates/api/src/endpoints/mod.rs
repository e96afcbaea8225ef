//! API endpoints.

mod auth;
mod health;
mod polls;
mod rooms;
mod votes;

use axum::Router;

use crate::middleware::AppState;

pub use auth::AuthResponse;
pub use health::HealthResponse;
pub use polls::{
    ChoiceResponse, ChoiceResultResponse, PollDetailResponse, PollResponse, PollSummaryResponse,
    QuestionResponse, QuestionResultResponse, ResultsResponse, VoteCellResponse, VoteRowResponse,
    VotesTableResponse,
};
pub use rooms::{CreateRoomResponse, RoomResponse};

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(auth::router())
        .merge(health::router())
        .nest("/rooms", rooms::router())
        .nest("/polls", polls::router())
        .nest("/votes", votes::router())
}
