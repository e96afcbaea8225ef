//! Database integration tests.
//!
//! These tests require a running `PostgreSQL` instance.
//! Run with: `cargo test --test db_integration -- --ignored`
//!
//! Environment variables:
//!   `TEST_DB_HOST` (default: localhost)
//!   `TEST_DB_PORT` (default: 5433)
//!   `TEST_DB_USER` (default: `roompoll_test`)
//!   `TEST_DB_PASSWORD` (default: `roompoll_test`)
//!   `TEST_DB_NAME` (default: `roompoll_test`)

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::sync::Arc;

use chrono::Utc;
use roompoll_common::{AppError, IdGenerator};
use roompoll_db::entities::{admin_user, poll, room, vote};
use roompoll_db::reconcile::{ChoiceDraft, QuestionDraft};
use roompoll_db::repositories::{
    AdminUserRepository, PollRepository, RoomRepository, VoteRepository,
};
use roompoll_db::test_utils::{TestDatabase, TestDbConfig};
use sea_orm::{EntityTrait, Set};

async fn seeded_poll(db: &TestDatabase) -> (Arc<sea_orm::DatabaseConnection>, poll::Model) {
    let conn = db.shared();
    let id_gen = IdGenerator::new();

    let admin = AdminUserRepository::new(conn.clone())
        .create(admin_user::ActiveModel {
            id: Set(id_gen.generate()),
            admin_code: Set(roompoll_common::generate_code(16)),
            room_code: Set(None),
            created_at: Set(Utc::now().into()),
        })
        .await
        .unwrap();

    let room = RoomRepository::new(conn.clone())
        .create_with_admin(
            room::Model {
                id: id_gen.generate(),
                code: roompoll_common::generate_code(6),
                name: "Integration".to_string(),
                created_at: Utc::now().into(),
            },
            &admin.id,
        )
        .await
        .unwrap();

    let now = Utc::now();
    let poll = PollRepository::new(conn.clone())
        .create_with_structure(
            poll::Model {
                id: id_gen.generate(),
                room_id: room.id,
                title: "Board vote".to_string(),
                description: None,
                is_active: true,
                is_visible: true,
                results_visible: false,
                sort_date: Some(now.into()),
                created_at: now.into(),
            },
            vec![QuestionDraft::new("Approve?", ["Yes", "No"])],
            &id_gen,
        )
        .await
        .unwrap();

    (conn, poll)
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_connection() {
    let config = TestDbConfig::default();
    let result = TestDatabase::with_config(config).await;
    assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_database_cleanup() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    let result = db.cleanup().await;
    assert!(result.is_ok(), "Cleanup failed: {:?}", result.err());
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_voted_choice_survives_rejected_edit() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    let (conn, poll) = seeded_poll(&db).await;

    let polls = PollRepository::new(conn.clone());
    let structure = polls.find_structure(&poll.id).await.unwrap().unwrap();
    let (question, choices) = &structure.questions[0];
    let no = choices.iter().find(|c| c.text == "No").unwrap();

    VoteRepository::new(conn.clone())
        .create_ballot(&poll.id, vec![vote::Model {
            id: IdGenerator::new().generate(),
            poll_id: poll.id.clone(),
            question_id: question.id.clone(),
            choice_id: no.id.clone(),
            voter_code: Some("VOTER0000001".to_string()),
            created_at: Utc::now().into(),
        }])
        .await
        .unwrap();

    let drafts = vec![QuestionDraft {
        id: Some(question.id.clone()),
        text: "Approve the minutes?".to_string(),
        choices: vec![ChoiceDraft {
            id: Some(choices[0].id.clone()),
            text: "Yes".to_string(),
        }],
    }];
    let result = polls
        .reconcile(&poll.id, "Renamed", None, drafts, &IdGenerator::new())
        .await;
    assert!(matches!(result, Err(AppError::ChoiceHasVotes(text)) if text == "No"));

    // Rolled back: title and question text unchanged.
    let after = polls.find_structure(&poll.id).await.unwrap().unwrap();
    assert_eq!(after.poll.title, "Board vote");
    assert_eq!(after.questions[0].0.text, "Approve?");
    assert_eq!(after.questions[0].1.len(), 2);
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_edit_reorders_and_inserts() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    let (conn, poll) = seeded_poll(&db).await;

    let polls = PollRepository::new(conn);
    let structure = polls.find_structure(&poll.id).await.unwrap().unwrap();
    let (question, choices) = &structure.questions[0];

    let drafts = vec![
        QuestionDraft::new("Budget?", ["High", "Low"]),
        QuestionDraft {
            id: Some(question.id.clone()),
            text: question.text.clone(),
            choices: choices
                .iter()
                .rev()
                .map(|c| ChoiceDraft {
                    id: Some(c.id.clone()),
                    text: c.text.clone(),
                })
                .collect(),
        },
    ];
    polls
        .reconcile(&poll.id, "Board vote", Some("Round two"), drafts, &IdGenerator::new())
        .await
        .unwrap();

    let after = polls.find_structure(&poll.id).await.unwrap().unwrap();
    assert_eq!(after.poll.description.as_deref(), Some("Round two"));
    assert_eq!(after.questions[0].0.text, "Budget?");
    assert_eq!(after.questions[1].0.id, question.id);
    assert_eq!(after.questions[1].1[0].text, "No");
}

#[tokio::test]
#[ignore = "requires running PostgreSQL instance"]
async fn test_vote_cannot_reference_missing_choice() {
    let db = TestDatabase::new().await.expect("Failed to connect");
    db.cleanup().await.unwrap();
    let (_conn, poll) = seeded_poll(&db).await;

    let structure = PollRepository::new(db.shared())
        .find_structure(&poll.id)
        .await
        .unwrap()
        .unwrap();
    let question = &structure.questions[0].0;

    // Bypasses the repository check to exercise the schema constraint.
    let orphan = vote::ActiveModel {
        id: Set(IdGenerator::new().generate()),
        poll_id: Set(poll.id.clone()),
        question_id: Set(question.id.clone()),
        choice_id: Set("missing-choice".to_string()),
        voter_code: Set(None),
        created_at: Set(Utc::now().into()),
    };
    let result = vote::Entity::insert(orphan)
        .exec_without_returning(db.connection())
        .await;

    assert!(result.is_err());
}

#[test]
fn test_config_from_env() {
    let config = TestDbConfig::default();
    assert!(!config.host.is_empty());
    assert!(config.port > 0);
    assert!(!config.username.is_empty());
}
