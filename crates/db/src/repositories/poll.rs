//! Poll repository.
//!
//! Owns polls together with their questions and choices. Structural writes
//! (creation and reconciling edits) run inside one transaction each.

use std::sync::Arc;

use roompoll_common::{AppError, AppResult, IdGenerator};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    EntityTrait, IsolationLevel, PaginatorTrait, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};
use tracing::info;

use crate::entities::{Choice, Poll, Question, Vote, choice, poll, question, vote};
use crate::reconcile::{PollEditPlan, QuestionDraft, RowAction, plan_poll_edit};

/// A poll with its questions and choices, each sorted by `order`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollStructure {
    pub poll: poll::Model,
    pub questions: Vec<(question::Model, Vec<choice::Model>)>,
}

/// Poll repository for database operations.
#[derive(Clone)]
pub struct PollRepository {
    db: Arc<DatabaseConnection>,
}

impl PollRepository {
    /// Create a new poll repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a poll by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<poll::Model>> {
        Poll::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a poll by ID, returning `PollNotFound` if absent.
    pub async fn get_by_id(&self, id: &str) -> AppResult<poll::Model> {
        self.find_by_id(id).await?.ok_or(AppError::PollNotFound)
    }

    /// All polls of a room, in display order.
    pub async fn find_by_room(&self, room_id: &str) -> AppResult<Vec<poll::Model>> {
        let polls = Poll::find()
            .filter(poll::Column::RoomId.eq(room_id))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(sort_for_display(polls))
    }

    /// Polls of a room that are listed for participants, in display order.
    pub async fn find_visible_by_room(&self, room_id: &str) -> AppResult<Vec<poll::Model>> {
        let polls = Poll::find()
            .filter(poll::Column::RoomId.eq(room_id))
            .filter(poll::Column::IsVisible.eq(true))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(sort_for_display(polls))
    }

    /// Update poll columns.
    pub async fn update(&self, model: poll::ActiveModel) -> AppResult<poll::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Questions of a poll by ascending order.
    pub async fn find_questions(&self, poll_id: &str) -> AppResult<Vec<question::Model>> {
        load_questions(self.db.as_ref(), poll_id).await
    }

    /// Choices of the given questions by ascending order.
    pub async fn find_choices(&self, question_ids: &[String]) -> AppResult<Vec<choice::Model>> {
        load_choices(self.db.as_ref(), question_ids).await
    }

    /// Load a poll with its questions and choices.
    pub async fn find_structure(&self, poll_id: &str) -> AppResult<Option<PollStructure>> {
        match self.find_by_id(poll_id).await? {
            Some(poll) => Ok(Some(self.load_structure(poll).await?)),
            None => Ok(None),
        }
    }

    /// Attach questions and choices to an already loaded poll.
    pub async fn load_structure(&self, poll: poll::Model) -> AppResult<PollStructure> {
        let questions = self.find_questions(&poll.id).await?;
        let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let mut choices = self.find_choices(&question_ids).await?;

        let questions = questions
            .into_iter()
            .map(|q| {
                let (own, rest): (Vec<_>, Vec<_>) =
                    choices.drain(..).partition(|c| c.question_id == q.id);
                choices = rest;
                (q, own)
            })
            .collect();

        Ok(PollStructure { poll, questions })
    }

    /// Insert a poll with its questions and choices, atomically.
    pub async fn create_with_structure(
        &self,
        poll: poll::Model,
        drafts: Vec<QuestionDraft>,
        id_gen: &IdGenerator,
    ) -> AppResult<poll::Model> {
        let plan = plan_poll_edit(&[], &[], drafts, id_gen);

        let txn = self.db.begin().await?;

        Poll::insert(poll::ActiveModel::from(poll.clone()))
            .exec_without_returning(&txn)
            .await?;
        apply_plan(&txn, &poll.id, &plan).await?;

        txn.commit().await?;

        info!(poll_id = %poll.id, questions = plan.questions.len(), "Created poll");
        Ok(poll)
    }

    /// Edit a poll in place.
    ///
    /// Patches title and description, then merges `drafts` into the stored
    /// questions and choices. Rows that are dropped from the drafts are
    /// deleted unless a vote references them, in which case the whole edit
    /// is rolled back with `ChoiceHasVotes` or `QuestionHasVotes`. The edit
    /// runs at serializable isolation.
    pub async fn reconcile(
        &self,
        poll_id: &str,
        title: &str,
        description: Option<&str>,
        drafts: Vec<QuestionDraft>,
        id_gen: &IdGenerator,
    ) -> AppResult<()> {
        // Vote guards must see ballots committed while the edit runs.
        let txn = self
            .db
            .begin_with_config(Some(IsolationLevel::Serializable), None)
            .await?;

        Poll::update_many()
            .col_expr(poll::Column::Title, Expr::value(title))
            .col_expr(
                poll::Column::Description,
                Expr::value(description.map(str::to_string)),
            )
            .filter(poll::Column::Id.eq(poll_id))
            .exec(&txn)
            .await?;

        let questions = load_questions(&txn, poll_id).await?;
        let question_ids: Vec<String> = questions.iter().map(|q| q.id.clone()).collect();
        let choices = load_choices(&txn, &question_ids).await?;

        let plan = plan_poll_edit(&questions, &choices, drafts, id_gen);
        apply_plan(&txn, poll_id, &plan).await?;

        // Uncommitted transactions roll back on drop.
        txn.commit().await?;

        info!(
            poll_id = %poll_id,
            questions = plan.questions.len(),
            removed_questions = plan.removed_questions.len(),
            "Reconciled poll structure"
        );
        Ok(())
    }
}

/// Order polls by `sort_date ?? created_at` descending, newest id first on ties.
fn sort_for_display(mut polls: Vec<poll::Model>) -> Vec<poll::Model> {
    polls.sort_by(|a, b| {
        b.display_date()
            .cmp(&a.display_date())
            .then_with(|| b.id.cmp(&a.id))
    });
    polls
}

async fn load_questions<C: ConnectionTrait>(
    conn: &C,
    poll_id: &str,
) -> AppResult<Vec<question::Model>> {
    Question::find()
        .filter(question::Column::PollId.eq(poll_id))
        .order_by_asc(question::Column::Order)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

async fn load_choices<C: ConnectionTrait>(
    conn: &C,
    question_ids: &[String],
) -> AppResult<Vec<choice::Model>> {
    if question_ids.is_empty() {
        return Ok(vec![]);
    }

    Choice::find()
        .filter(choice::Column::QuestionId.is_in(question_ids.iter().cloned()))
        .order_by_asc(choice::Column::Order)
        .all(conn)
        .await
        .map_err(|e| AppError::Database(e.to_string()))
}

async fn apply_plan(txn: &DatabaseTransaction, poll_id: &str, plan: &PollEditPlan) -> AppResult<()> {
    for planned in &plan.questions {
        match planned.action {
            RowAction::Insert => {
                Question::insert(question::ActiveModel {
                    id: Set(planned.id.clone()),
                    poll_id: Set(poll_id.to_string()),
                    text: Set(planned.text.clone()),
                    order: Set(planned.order),
                })
                .exec_without_returning(txn)
                .await?;
            }
            RowAction::Patch => {
                Question::update_many()
                    .col_expr(question::Column::Text, Expr::value(planned.text.clone()))
                    .col_expr(question::Column::Order, Expr::value(planned.order))
                    .filter(question::Column::Id.eq(planned.id.as_str()))
                    .exec(txn)
                    .await?;
            }
        }

        for c in &planned.choices {
            match c.action {
                RowAction::Insert => {
                    Choice::insert(choice::ActiveModel {
                        id: Set(c.id.clone()),
                        question_id: Set(planned.id.clone()),
                        text: Set(c.text.clone()),
                        order: Set(c.order),
                    })
                    .exec_without_returning(txn)
                    .await?;
                }
                RowAction::Patch => {
                    Choice::update_many()
                        .col_expr(choice::Column::Text, Expr::value(c.text.clone()))
                        .col_expr(choice::Column::Order, Expr::value(c.order))
                        .filter(choice::Column::Id.eq(c.id.as_str()))
                        .exec(txn)
                        .await?;
                }
            }
        }

        for removed in &planned.removed_choices {
            let votes = Vote::find()
                .filter(vote::Column::ChoiceId.eq(removed.id.as_str()))
                .count(txn)
                .await?;
            if votes > 0 {
                return Err(AppError::ChoiceHasVotes(removed.text.clone()));
            }

            Choice::delete_by_id(removed.id.as_str()).exec(txn).await?;
        }
    }

    for removed in &plan.removed_questions {
        let votes = Vote::find()
            .filter(vote::Column::QuestionId.eq(removed.id.as_str()))
            .count(txn)
            .await?;
        if votes > 0 {
            return Err(AppError::QuestionHasVotes(removed.text.clone()));
        }

        Choice::delete_many()
            .filter(choice::Column::QuestionId.eq(removed.id.as_str()))
            .exec(txn)
            .await?;
        Question::delete_by_id(removed.id.as_str()).exec(txn).await?;
    }

    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::reconcile::ChoiceDraft;
    use chrono::{Duration, Utc};
    use maplit::btreemap;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn create_test_poll(id: &str, minutes_ago: i64, sort_minutes_ago: Option<i64>) -> poll::Model {
        let now = Utc::now();
        poll::Model {
            id: id.to_string(),
            room_id: "room1".to_string(),
            title: format!("Poll {id}"),
            description: None,
            is_active: true,
            is_visible: true,
            results_visible: false,
            sort_date: sort_minutes_ago.map(|m| (now - Duration::minutes(m)).into()),
            created_at: (now - Duration::minutes(minutes_ago)).into(),
        }
    }

    fn exec_ok() -> MockExecResult {
        MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }
    }

    fn count_result(n: i64) -> Vec<std::collections::BTreeMap<&'static str, sea_orm::Value>> {
        vec![btreemap! { "num_items" => sea_orm::Value::BigInt(Some(n)) }]
    }

    fn stored_question() -> question::Model {
        question::Model {
            id: "q1".to_string(),
            poll_id: "p1".to_string(),
            text: "Approve?".to_string(),
            order: 0,
        }
    }

    fn stored_choices() -> Vec<choice::Model> {
        vec![
            choice::Model {
                id: "c1".to_string(),
                question_id: "q1".to_string(),
                text: "Yes".to_string(),
                order: 0,
            },
            choice::Model {
                id: "c2".to_string(),
                question_id: "q1".to_string(),
                text: "No".to_string(),
                order: 1,
            },
        ]
    }

    #[test]
    fn test_sort_for_display_prefers_sort_date() {
        // p1 is the oldest but was moved to top a minute ago.
        let polls = vec![
            create_test_poll("p1", 60, Some(1)),
            create_test_poll("p2", 10, None),
            create_test_poll("p3", 30, Some(30)),
        ];

        let sorted = sort_for_display(polls);
        let ids: Vec<&str> = sorted.iter().map(|p| p.id.as_str()).collect();

        assert_eq!(ids, ["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn test_get_by_id_not_found() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<poll::Model>::new()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let result = repo.get_by_id("missing").await;

        assert!(matches!(result, Err(AppError::PollNotFound)));
    }

    #[tokio::test]
    async fn test_find_visible_by_room() {
        let polls = vec![create_test_poll("p1", 20, None), create_test_poll("p2", 5, None)];

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([polls])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let result = repo.find_visible_by_room("room1").await.unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].id, "p2");
    }

    #[tokio::test]
    async fn test_find_structure_groups_choices() {
        let poll = create_test_poll("p1", 5, None);

        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[poll]])
                .append_query_results([[stored_question()]])
                .append_query_results([stored_choices()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let structure = repo.find_structure("p1").await.unwrap().unwrap();

        assert_eq!(structure.questions.len(), 1);
        let (q, choices) = &structure.questions[0];
        assert_eq!(q.text, "Approve?");
        assert_eq!(choices.len(), 2);
        assert_eq!(choices[1].text, "No");
    }

    #[tokio::test]
    async fn test_find_structure_missing_poll() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<poll::Model>::new()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        assert!(repo.find_structure("missing").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_with_structure() {
        // poll + 1 question + 2 choices
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([exec_ok(), exec_ok(), exec_ok(), exec_ok()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let poll = create_test_poll("p1", 0, Some(0));
        let created = repo
            .create_with_structure(
                poll,
                vec![QuestionDraft::new("Approve?", ["Yes", "No"])],
                &IdGenerator::new(),
            )
            .await
            .unwrap();

        assert_eq!(created.id, "p1");
    }

    #[tokio::test]
    async fn test_reconcile_unchanged_structure() {
        // poll patch, question patch, two choice patches
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored_question()]])
                .append_query_results([stored_choices()])
                .append_exec_results([exec_ok(), exec_ok(), exec_ok(), exec_ok()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let drafts = vec![QuestionDraft {
            id: Some("q1".to_string()),
            text: "Approve?".to_string(),
            choices: vec![
                ChoiceDraft {
                    id: Some("c1".to_string()),
                    text: "Yes".to_string(),
                },
                ChoiceDraft {
                    id: Some("c2".to_string()),
                    text: "No".to_string(),
                },
            ],
        }];

        repo.reconcile("p1", "Board vote", None, drafts, &IdGenerator::new())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_reconcile_rejects_removing_voted_choice() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored_question()]])
                .append_query_results([stored_choices()])
                .append_query_results([count_result(1)])
                .append_exec_results([exec_ok(), exec_ok(), exec_ok(), exec_ok()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let drafts = vec![QuestionDraft {
            id: Some("q1".to_string()),
            text: "Approve?".to_string(),
            choices: vec![
                ChoiceDraft {
                    id: Some("c1".to_string()),
                    text: "Yes".to_string(),
                },
                ChoiceDraft {
                    id: None,
                    text: "Abstain".to_string(),
                },
            ],
        }];

        let result = repo
            .reconcile("p1", "Board vote", None, drafts, &IdGenerator::new())
            .await;

        assert!(matches!(result, Err(AppError::ChoiceHasVotes(text)) if text == "No"));
    }

    #[tokio::test]
    async fn test_reconcile_rejects_removing_voted_question() {
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored_question()]])
                .append_query_results([stored_choices()])
                .append_query_results([count_result(2)])
                .append_exec_results([exec_ok(), exec_ok(), exec_ok(), exec_ok(), exec_ok()])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let drafts = vec![QuestionDraft::new("Replacement?", ["A", "B"])];

        let result = repo
            .reconcile("p1", "Board vote", None, drafts, &IdGenerator::new())
            .await;

        assert!(matches!(result, Err(AppError::QuestionHasVotes(text)) if text == "Approve?"));
    }

    #[tokio::test]
    async fn test_reconcile_deletes_unvoted_question() {
        // poll patch, new question + 2 choices, then delete choices + question
        let db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[stored_question()]])
                .append_query_results([stored_choices()])
                .append_query_results([count_result(0)])
                .append_exec_results([
                    exec_ok(),
                    exec_ok(),
                    exec_ok(),
                    exec_ok(),
                    MockExecResult {
                        last_insert_id: 0,
                        rows_affected: 2,
                    },
                    exec_ok(),
                ])
                .into_connection(),
        );

        let repo = PollRepository::new(db);
        let drafts = vec![QuestionDraft::new("Replacement?", ["A", "B"])];

        repo.reconcile("p1", "Board vote", Some("Second round"), drafts, &IdGenerator::new())
            .await
            .unwrap();
    }
}
