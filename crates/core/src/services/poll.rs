//! Poll service.

use std::collections::HashMap;

use chrono::Utc;
use roompoll_common::{AppResult, IdGenerator};
use roompoll_db::entities::poll;
use roompoll_db::reconcile::{ChoiceDraft, QuestionDraft};
use roompoll_db::repositories::{PollRepository, PollStructure, RoomRepository, VoteRepository};
use sea_orm::Set;
use sea_orm::prelude::DateTimeWithTimeZone;
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::{Validate, ValidationError};

use super::auth::AuthService;
use super::results::count_voters;

/// Input for creating a poll.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreatePollInput {
    pub room_code: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    #[validate(length(min = 1), nested)]
    pub questions: Vec<CreateQuestionInput>,
}

/// A question of a new poll.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionInput {
    #[validate(length(min = 1, max = 1024))]
    pub text: String,
    #[validate(length(min = 2), custom(function = "validate_choice_texts"))]
    pub choices: Vec<String>,
}

/// Input for editing a poll in place.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePollInput {
    pub poll_id: String,
    #[validate(length(min = 1, max = 256))]
    pub title: String,
    #[validate(length(max = 4096))]
    pub description: Option<String>,
    #[validate(length(min = 1), nested)]
    pub questions: Vec<QuestionInput>,
}

/// A question of an edited poll. `id` refers to a stored question.
///
/// There is no minimum choice count here; dropping a choice is decided by
/// the vote guard during reconciliation.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct QuestionInput {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 1024))]
    pub text: String,
    #[validate(nested)]
    pub choices: Vec<ChoiceInput>,
}

/// A choice of an edited question. `id` refers to a stored choice.
#[derive(Debug, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ChoiceInput {
    #[serde(default)]
    pub id: Option<String>,
    #[validate(length(min = 1, max = 256))]
    pub text: String,
}

fn validate_choice_texts(choices: &[String]) -> Result<(), ValidationError> {
    if choices.iter().any(|c| c.is_empty() || c.chars().count() > 256) {
        return Err(ValidationError::new("choice_text_length")
            .with_message("Each choice must be between 1 and 256 characters".into()));
    }
    Ok(())
}

/// A poll annotated with how many distinct voters took part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollWithVoterCount {
    pub poll: poll::Model,
    pub voter_count: usize,
}

/// Service for managing polls.
#[derive(Clone)]
pub struct PollService {
    poll_repo: PollRepository,
    vote_repo: VoteRepository,
    room_repo: RoomRepository,
    auth: AuthService,
    id_gen: IdGenerator,
}

impl PollService {
    /// Create a new poll service.
    #[must_use]
    pub const fn new(
        poll_repo: PollRepository,
        vote_repo: VoteRepository,
        room_repo: RoomRepository,
        auth: AuthService,
    ) -> Self {
        Self {
            poll_repo,
            vote_repo,
            room_repo,
            auth,
            id_gen: IdGenerator::new(),
        }
    }

    /// Get a poll with its questions and choices.
    pub async fn get(&self, poll_id: &str) -> AppResult<Option<PollStructure>> {
        self.poll_repo.find_structure(poll_id).await
    }

    /// Create a poll in a room.
    ///
    /// New polls are active and listed, with results hidden.
    pub async fn create(&self, admin_code: &str, input: CreatePollInput) -> AppResult<poll::Model> {
        self.auth.require_admin(admin_code).await?;
        input.validate()?;

        let room = self.room_repo.get_by_code(&input.room_code).await?;

        let now = Utc::now();
        let model = poll::Model {
            id: self.id_gen.generate(),
            room_id: room.id,
            title: input.title,
            description: input.description,
            is_active: true,
            is_visible: true,
            results_visible: false,
            sort_date: Some(now.into()),
            created_at: now.into(),
        };

        let drafts = input
            .questions
            .into_iter()
            .map(|q| QuestionDraft::new(q.text, q.choices))
            .collect();

        self.poll_repo
            .create_with_structure(model, drafts, &self.id_gen)
            .await
    }

    /// Edit a poll's title, description and structure in place.
    pub async fn update(&self, admin_code: &str, input: UpdatePollInput) -> AppResult<String> {
        self.auth.require_admin(admin_code).await?;
        input.validate()?;

        let poll = self.poll_repo.get_by_id(&input.poll_id).await?;

        let drafts = input
            .questions
            .into_iter()
            .map(|q| QuestionDraft {
                id: q.id,
                text: q.text,
                choices: q
                    .choices
                    .into_iter()
                    .map(|c| ChoiceDraft {
                        id: c.id,
                        text: c.text,
                    })
                    .collect(),
            })
            .collect();

        self.poll_repo
            .reconcile(
                &poll.id,
                &input.title,
                input.description.as_deref(),
                drafts,
                &self.id_gen,
            )
            .await?;

        Ok(poll.id)
    }

    /// Open or close voting.
    pub async fn set_active(&self, admin_code: &str, poll_id: &str, value: bool) -> AppResult<bool> {
        self.auth.require_admin(admin_code).await?;
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let mut active: poll::ActiveModel = poll.into();
        active.is_active = Set(value);
        self.poll_repo.update(active).await?;

        Ok(value)
    }

    /// Show or hide the poll in participant listings.
    pub async fn set_visible(&self, admin_code: &str, poll_id: &str, value: bool) -> AppResult<bool> {
        self.auth.require_admin(admin_code).await?;
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let mut active: poll::ActiveModel = poll.into();
        active.is_visible = Set(value);
        self.poll_repo.update(active).await?;

        Ok(value)
    }

    /// Publish or hide aggregated results for participants.
    pub async fn set_results_visible(
        &self,
        admin_code: &str,
        poll_id: &str,
        value: bool,
    ) -> AppResult<bool> {
        self.auth.require_admin(admin_code).await?;
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let mut active: poll::ActiveModel = poll.into();
        active.results_visible = Set(value);
        self.poll_repo.update(active).await?;

        Ok(value)
    }

    /// Bump the poll to the head of its room's listing.
    pub async fn move_to_top(
        &self,
        admin_code: &str,
        poll_id: &str,
    ) -> AppResult<DateTimeWithTimeZone> {
        self.auth.require_admin(admin_code).await?;
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let sort_date: DateTimeWithTimeZone = Utc::now().into();
        let mut active: poll::ActiveModel = poll.into();
        active.sort_date = Set(Some(sort_date));
        let poll = self.poll_repo.update(active).await?;

        info!(poll_id = %poll.id, "Moved poll to top");
        Ok(sort_date)
    }

    /// Visible polls of a room, newest first.
    pub async fn list(&self, room_code: &str) -> AppResult<Vec<poll::Model>> {
        let room = self.room_repo.get_by_code(room_code).await?;
        self.poll_repo.find_visible_by_room(&room.id).await
    }

    /// Every poll of a room, hidden ones included, with voter counts.
    pub async fn list_all(
        &self,
        admin_code: &str,
        room_code: &str,
    ) -> AppResult<Vec<PollWithVoterCount>> {
        self.auth.require_admin(admin_code).await?;
        let room = self.room_repo.get_by_code(room_code).await?;

        let polls = self.poll_repo.find_by_room(&room.id).await?;
        let poll_ids: Vec<String> = polls.iter().map(|p| p.id.clone()).collect();
        let votes = self.vote_repo.find_by_polls(&poll_ids).await?;

        let mut by_poll: HashMap<&str, Vec<_>> = HashMap::new();
        for vote in &votes {
            by_poll.entry(vote.poll_id.as_str()).or_default().push(vote);
        }

        Ok(polls
            .into_iter()
            .map(|poll| {
                let voter_count = by_poll
                    .get(poll.id.as_str())
                    .map_or(0, |votes| count_voters(votes.iter().copied()));
                PollWithVoterCount { poll, voter_count }
            })
            .collect())
    }
}
