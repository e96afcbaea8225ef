//! Vote ledger repository.

use std::collections::HashSet;
use std::sync::Arc;

use roompoll_common::{AppError, AppResult};
use sea_orm::{
    ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter, QueryOrder,
    TransactionTrait,
};

use crate::entities::{Choice, Question, Vote, choice, question, vote};

/// Repository for vote rows.
#[derive(Clone)]
pub struct VoteRepository {
    db: Arc<DatabaseConnection>,
}

impl VoteRepository {
    /// Create a new vote repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// All votes of a poll, oldest first.
    pub async fn find_by_poll(&self, poll_id: &str) -> AppResult<Vec<vote::Model>> {
        Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .order_by_asc(vote::Column::CreatedAt)
            .order_by_asc(vote::Column::Id)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// All votes of several polls.
    pub async fn find_by_polls(&self, poll_ids: &[String]) -> AppResult<Vec<vote::Model>> {
        if poll_ids.is_empty() {
            return Ok(vec![]);
        }

        Vote::find()
            .filter(vote::Column::PollId.is_in(poll_ids.iter().cloned()))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check whether a voter code has any vote on a poll.
    pub async fn has_voted(&self, poll_id: &str, voter_code: &str) -> AppResult<bool> {
        let count = Vote::find()
            .filter(vote::Column::PollId.eq(poll_id))
            .filter(vote::Column::VoterCode.eq(voter_code))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Insert a ballot, one row per answer, atomically.
    ///
    /// Each answer is checked against the poll's current questions and
    /// choices inside the same transaction as the inserts.
    pub async fn create_ballot(
        &self,
        poll_id: &str,
        votes: Vec<vote::Model>,
    ) -> AppResult<Vec<vote::Model>> {
        let txn = self.db.begin().await?;

        let question_ids: Vec<String> = Question::find()
            .filter(question::Column::PollId.eq(poll_id))
            .all(&txn)
            .await?
            .into_iter()
            .map(|q| q.id)
            .collect();
        let choices: HashSet<(String, String)> = if question_ids.is_empty() {
            HashSet::new()
        } else {
            Choice::find()
                .filter(choice::Column::QuestionId.is_in(question_ids.iter().cloned()))
                .all(&txn)
                .await?
                .into_iter()
                .map(|c| (c.question_id, c.id))
                .collect()
        };

        for v in &votes {
            if !question_ids.contains(&v.question_id) {
                return Err(AppError::Validation(format!(
                    "Question {} is not part of this poll",
                    v.question_id
                )));
            }
            if !choices.contains(&(v.question_id.clone(), v.choice_id.clone())) {
                return Err(AppError::Validation(format!(
                    "Choice {} is not part of question {}",
                    v.choice_id, v.question_id
                )));
            }
            Vote::insert(vote::ActiveModel::from(v.clone()))
                .exec_without_returning(&txn)
                .await?;
        }

        txn.commit().await?;
        Ok(votes)
    }

    /// Hard-delete one vote. Returns whether a row was removed.
    pub async fn delete(&self, id: &str) -> AppResult<bool> {
        let result = Vote::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(result.rows_affected > 0)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_vote(id: &str, voter_code: Option<&str>) -> vote::Model {
        vote::Model {
            id: id.to_string(),
            poll_id: "p1".to_string(),
            question_id: "q1".to_string(),
            choice_id: "c1".to_string(),
            voter_code: voter_code.map(str::to_string),
            created_at: Utc::now().into(),
        }
    }

    #[tokio::test]
    async fn test_find_by_poll() {
        let votes = vec![
            create_test_vote("v1", Some("VOTER0000001")),
            create_test_vote("v2", None),
        ];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([votes.clone()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo.find_by_poll("p1").await.unwrap();

        assert_eq!(result, votes);
    }

    #[tokio::test]
    async fn test_find_by_polls_empty_skips_query() {
        let db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let repo = VoteRepository::new(db);
        assert!(repo.find_by_polls(&[]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_has_voted() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .append_query_results([vec![btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(0))
                }]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        assert!(repo.has_voted("p1", "VOTER0000001").await.unwrap());
        assert!(!repo.has_voted("p1", "SOMEONEELSE1").await.unwrap());
    }

    fn create_test_question() -> question::Model {
        question::Model {
            id: "q1".to_string(),
            poll_id: "p1".to_string(),
            text: "Approve?".to_string(),
            order: 0,
        }
    }

    fn create_test_choice(id: &str) -> choice::Model {
        choice::Model {
            id: id.to_string(),
            question_id: "q1".to_string(),
            text: id.to_uppercase(),
            order: 0,
        }
    }

    #[tokio::test]
    async fn test_create_ballot() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_question()]])
                .append_query_results([vec![create_test_choice("c1"), create_test_choice("c2")]])
                .append_exec_results([
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    },
                ])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let votes = vec![
            create_test_vote("v1", Some("VOTER0000001")),
            create_test_vote("v2", Some("VOTER0000001")),
        ];
        let created = repo.create_ballot("p1", votes).await.unwrap();

        assert_eq!(created.len(), 2);
    }

    #[tokio::test]
    async fn test_create_ballot_rejects_removed_choice() {
        // c1 was removed by an edit after the caller loaded the poll.
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[create_test_question()]])
                .append_query_results([vec![create_test_choice("c2")]])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo
            .create_ballot("p1", vec![create_test_vote("v1", None)])
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_create_ballot_rejects_foreign_question() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<question::Model>::new()])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        let result = repo
            .create_ballot("p1", vec![create_test_vote("v1", None)])
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_missing_row() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 0,
                }])
                .into_connection(),
        );

        let repo = VoteRepository::new(db);
        assert!(!repo.delete("missing").await.unwrap());
    }
}
