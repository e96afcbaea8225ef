//! Database entities.

pub mod admin_user;
pub mod choice;
pub mod poll;
pub mod question;
pub mod room;
pub mod room_admin;
pub mod vote;

pub use admin_user::Entity as AdminUser;
pub use choice::Entity as Choice;
pub use poll::Entity as Poll;
pub use question::Entity as Question;
pub use room::Entity as Room;
pub use room_admin::Entity as RoomAdmin;
pub use vote::Entity as Vote;
