//! Vote ledger service.

use chrono::Utc;
use roompoll_common::{AppError, AppResult, IdGenerator, VOTER_CODE_LENGTH, generate_code};
use roompoll_db::entities::vote;
use roompoll_db::repositories::{PollRepository, VoteRepository};
use serde::{Deserialize, Serialize};
use tracing::info;
use validator::Validate;

use super::auth::AuthService;

/// One answer of a ballot.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerInput {
    pub question_id: String,
    pub choice_id: String,
}

/// Input for casting a ballot.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CastVotesInput {
    pub poll_id: String,
    /// Voter code to group the answers under. A fresh one is issued when
    /// absent or empty.
    #[serde(default)]
    #[validate(length(max = 64))]
    pub voter_code: Option<String>,
    #[validate(length(min = 1))]
    pub answers: Vec<AnswerInput>,
}

/// Result of casting a ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CastVotesOutput {
    pub voter_code: String,
}

/// Service for recording and removing votes.
#[derive(Clone)]
pub struct VoteService {
    vote_repo: VoteRepository,
    poll_repo: PollRepository,
    auth: AuthService,
    id_gen: IdGenerator,
}

impl VoteService {
    /// Create a new vote service.
    #[must_use]
    pub const fn new(vote_repo: VoteRepository, poll_repo: PollRepository, auth: AuthService) -> Self {
        Self {
            vote_repo,
            poll_repo,
            auth,
            id_gen: IdGenerator::new(),
        }
    }

    /// Record a ballot, one vote row per answer.
    ///
    /// Every answer must name a question of the poll and a choice of that
    /// question; the check runs in the insert transaction. Repeated ballots
    /// under the same voter code are accepted.
    pub async fn cast_votes(&self, input: CastVotesInput) -> AppResult<CastVotesOutput> {
        input.validate()?;

        let poll = self.poll_repo.get_by_id(&input.poll_id).await?;
        if !poll.is_active {
            return Err(AppError::PollNotActive);
        }

        let voter_code = input
            .voter_code
            .filter(|code| !code.is_empty())
            .unwrap_or_else(|| generate_code(VOTER_CODE_LENGTH));

        let now = Utc::now();
        let votes = input
            .answers
            .into_iter()
            .map(|answer| vote::Model {
                id: self.id_gen.generate(),
                poll_id: poll.id.clone(),
                question_id: answer.question_id,
                choice_id: answer.choice_id,
                voter_code: Some(voter_code.clone()),
                created_at: now.into(),
            })
            .collect::<Vec<_>>();

        let votes = self.vote_repo.create_ballot(&poll.id, votes).await?;

        info!(poll_id = %poll.id, answers = votes.len(), "Recorded ballot");
        Ok(CastVotesOutput { voter_code })
    }

    /// Remove a single vote row.
    pub async fn delete_vote(&self, admin_code: &str, vote_id: &str) -> AppResult<()> {
        let admin = self.auth.require_admin(admin_code).await?;

        if !self.vote_repo.delete(vote_id).await? {
            return Err(AppError::VoteNotFound);
        }

        info!(vote_id = %vote_id, admin_id = %admin.id, "Deleted vote");
        Ok(())
    }

    /// Whether a voter code has voted on a poll.
    pub async fn has_voted(&self, poll_id: &str, voter_code: &str) -> AppResult<bool> {
        self.vote_repo.has_voted(poll_id, voter_code).await
    }
}
