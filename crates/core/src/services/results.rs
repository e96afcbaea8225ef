//! Results aggregation.
//!
//! Tallies and the per-voter vote table are computed in memory from the
//! vote rows of a single poll.

use std::collections::{BTreeMap, HashMap, HashSet};

use roompoll_common::{AppError, AppResult};
use roompoll_db::entities::{choice, poll, question, vote};
use roompoll_db::repositories::{PollRepository, PollStructure, VoteRepository};
use sea_orm::prelude::DateTimeWithTimeZone;

use super::auth::AuthService;

/// Vote count of one choice.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChoiceResult {
    pub choice: choice::Model,
    pub vote_count: u64,
    /// Share of the question's votes, rounded half up to a whole percent.
    pub percentage: u32,
}

/// Vote counts of one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionResult {
    pub question: question::Model,
    pub choices: Vec<ChoiceResult>,
    pub total_votes: u64,
}

/// Aggregated results of a poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultsView {
    pub poll: poll::Model,
    pub questions: Vec<QuestionResult>,
    pub is_admin: bool,
    pub can_view_results: bool,
}

/// The latest answer of a voter to one question.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteCell {
    pub vote_id: String,
    pub choice_id: String,
    pub choice_text: String,
}

/// All answers of one voter code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRow {
    pub voter_code: Option<String>,
    pub first_seen: DateTimeWithTimeZone,
    pub last_seen: DateTimeWithTimeZone,
    /// Keyed by question id.
    pub answers: BTreeMap<String, VoteCell>,
}

/// Votes pivoted to one row per voter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotesTable {
    pub questions: Vec<question::Model>,
    pub rows: Vec<VoteRow>,
}

/// `count / total` as a whole percentage, rounded half up. Zero when there
/// are no votes.
#[must_use]
pub const fn percentage(count: u64, total: u64) -> u32 {
    if total == 0 {
        return 0;
    }
    ((count * 200 + total) / (total * 2)) as u32
}

/// Count distinct voter codes. Votes without a code count as one voter.
pub fn count_voters<'a>(votes: impl IntoIterator<Item = &'a vote::Model>) -> usize {
    votes
        .into_iter()
        .map(|v| v.voter_code.as_deref())
        .collect::<HashSet<_>>()
        .len()
}

/// Count votes per choice for every question of a poll.
///
/// Votes naming a choice outside the poll are ignored.
#[must_use]
pub fn tally(structure: &PollStructure, votes: &[vote::Model]) -> Vec<QuestionResult> {
    let mut counts: HashMap<&str, u64> = HashMap::new();
    for v in votes {
        *counts.entry(v.choice_id.as_str()).or_default() += 1;
    }

    structure
        .questions
        .iter()
        .map(|(question, choices)| {
            let per_choice: Vec<(choice::Model, u64)> = choices
                .iter()
                .map(|c| (c.clone(), counts.get(c.id.as_str()).copied().unwrap_or(0)))
                .collect();
            let total_votes = per_choice.iter().map(|(_, n)| n).sum();

            QuestionResult {
                question: question.clone(),
                choices: per_choice
                    .into_iter()
                    .map(|(choice, vote_count)| ChoiceResult {
                        choice,
                        vote_count,
                        percentage: percentage(vote_count, total_votes),
                    })
                    .collect(),
                total_votes,
            }
        })
        .collect()
}

/// Pivot votes into one row per voter code.
///
/// Votes are applied oldest first, so a voter's most recent answer to a
/// question is the one kept. Votes without a code share a single row. Rows
/// are ordered by first appearance, then by voter code.
#[must_use]
pub fn pivot_votes(structure: &PollStructure, votes: &[vote::Model]) -> Vec<VoteRow> {
    let choice_texts: HashMap<&str, &str> = structure
        .questions
        .iter()
        .flat_map(|(_, choices)| choices.iter())
        .map(|c| (c.id.as_str(), c.text.as_str()))
        .collect();

    let mut ordered: Vec<&vote::Model> = votes.iter().collect();
    ordered.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));

    let mut rows: HashMap<Option<&str>, VoteRow> = HashMap::new();
    for v in ordered {
        let row = rows
            .entry(v.voter_code.as_deref())
            .or_insert_with(|| VoteRow {
                voter_code: v.voter_code.clone(),
                first_seen: v.created_at,
                last_seen: v.created_at,
                answers: BTreeMap::new(),
            });

        row.last_seen = v.created_at;
        row.answers.insert(
            v.question_id.clone(),
            VoteCell {
                vote_id: v.id.clone(),
                choice_id: v.choice_id.clone(),
                choice_text: choice_texts
                    .get(v.choice_id.as_str())
                    .map(|t| (*t).to_string())
                    .unwrap_or_default(),
            },
        );
    }

    let mut rows: Vec<VoteRow> = rows.into_values().collect();
    rows.sort_by(|a, b| {
        a.first_seen
            .cmp(&b.first_seen)
            .then_with(|| a.voter_code.cmp(&b.voter_code))
    });
    rows
}

/// Service producing results views and vote tables.
#[derive(Clone)]
pub struct ResultsService {
    poll_repo: PollRepository,
    vote_repo: VoteRepository,
    auth: AuthService,
}

impl ResultsService {
    /// Create a new results service.
    #[must_use]
    pub const fn new(poll_repo: PollRepository, vote_repo: VoteRepository, auth: AuthService) -> Self {
        Self {
            poll_repo,
            vote_repo,
            auth,
        }
    }

    /// Aggregated results of a poll.
    ///
    /// Non-admins only see results the admin has published. An unknown admin
    /// code is treated like no admin code.
    pub async fn get_results(
        &self,
        poll_id: &str,
        admin_code: Option<&str>,
    ) -> AppResult<ResultsView> {
        let poll = self.poll_repo.get_by_id(poll_id).await?;

        let is_admin = match admin_code {
            Some(code) => self.auth.resolve_admin(code).await?.is_some(),
            None => false,
        };
        if !is_admin && !poll.results_visible {
            return Err(AppError::ResultsNotVisible);
        }

        let structure = self.poll_repo.load_structure(poll).await?;
        let votes = self.vote_repo.find_by_poll(&structure.poll.id).await?;
        let questions = tally(&structure, &votes);

        let can_view_results = is_admin || structure.poll.results_visible;
        Ok(ResultsView {
            poll: structure.poll,
            questions,
            is_admin,
            can_view_results,
        })
    }

    /// Every ballot of a poll, one row per voter.
    pub async fn votes_table(&self, admin_code: &str, poll_id: &str) -> AppResult<VotesTable> {
        self.auth.require_admin(admin_code).await?;

        let structure = self
            .poll_repo
            .find_structure(poll_id)
            .await?
            .ok_or(AppError::PollNotFound)?;
        let votes = self.vote_repo.find_by_poll(poll_id).await?;

        let rows = pivot_votes(&structure, &votes);
        let questions = structure.questions.into_iter().map(|(q, _)| q).collect();

        Ok(VotesTable { questions, rows })
    }
}
