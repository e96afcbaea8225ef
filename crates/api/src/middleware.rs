//! Application state and HTTP middleware.

#![allow(missing_docs)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use roompoll_core::{AuthService, PollService, ResultsService, RoomService, VoteService};
use roompoll_db::repositories::{
    AdminUserRepository, PollRepository, RoomRepository, VoteRepository,
};
use sea_orm::DatabaseConnection;
use tower_http::{
    cors::{Any, CorsLayer},
    limit::RequestBodyLimitLayer,
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

/// Largest accepted request body.
const MAX_BODY_BYTES: usize = 256 * 1024;

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Application state.
#[derive(Clone)]
pub struct AppState {
    pub auth_service: AuthService,
    pub room_service: RoomService,
    pub poll_service: PollService,
    pub vote_service: VoteService,
    pub results_service: ResultsService,
}

impl AppState {
    /// Wire repositories and services over one connection pool.
    #[must_use]
    pub fn new(db: Arc<DatabaseConnection>) -> Self {
        let admin_repo = AdminUserRepository::new(Arc::clone(&db));
        let room_repo = RoomRepository::new(Arc::clone(&db));
        let poll_repo = PollRepository::new(Arc::clone(&db));
        let vote_repo = VoteRepository::new(db);

        let auth_service = AuthService::new(admin_repo.clone(), room_repo.clone());
        let room_service = RoomService::new(room_repo.clone(), admin_repo, auth_service.clone());
        let poll_service = PollService::new(
            poll_repo.clone(),
            vote_repo.clone(),
            room_repo,
            auth_service.clone(),
        );
        let vote_service =
            VoteService::new(vote_repo.clone(), poll_repo.clone(), auth_service.clone());
        let results_service = ResultsService::new(poll_repo, vote_repo, auth_service.clone());

        Self {
            auth_service,
            room_service,
            poll_service,
            vote_service,
            results_service,
        }
    }
}

/// Wrap a router in the tracing, CORS, timeout and body-size layers.
pub fn apply_layers(router: Router) -> Router {
    router
        .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
        .layer(TimeoutLayer::new(REQUEST_TIMEOUT))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
}
