//! Business logic services.

#![allow(missing_docs)]

pub mod auth;
pub mod poll;
pub mod results;
pub mod room;
pub mod vote;

pub use auth::{AuthService, Identity};
pub use poll::{
    ChoiceInput, CreatePollInput, CreateQuestionInput, PollService, PollWithVoterCount,
    QuestionInput, UpdatePollInput,
};
pub use results::{
    ChoiceResult, QuestionResult, ResultsService, ResultsView, VoteCell, VoteRow, VotesTable,
};
pub use room::{CreateRoomInput, RoomService};
pub use vote::{AnswerInput, CastVotesInput, CastVotesOutput, VoteService};
