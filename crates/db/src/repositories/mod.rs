//! Database repositories.

mod admin_user;
mod poll;
mod room;
mod vote;

pub use admin_user::AdminUserRepository;
pub use poll::{PollRepository, PollStructure};
pub use room::RoomRepository;
pub use vote::VoteRepository;
