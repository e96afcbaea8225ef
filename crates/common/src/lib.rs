//! Common utilities and shared types for roompoll.
//!
//! This crate provides foundational components used across all roompoll crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **ID Generation**: ULID-based entity identifiers via [`IdGenerator`]
//! - **Codes**: Room, admin and voter codes via [`generate_code`]
//!
//! # Example
//!
//! ```no_run
//! use roompoll_common::{Config, IdGenerator, AppResult, generate_code};
//!
//! fn example() -> AppResult<()> {
//!     let config = Config::load()?;
//!     let id_gen = IdGenerator::new();
//!     println!("Generated ID: {}", id_gen.generate());
//!     println!("Room code: {}", generate_code(6));
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod id;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::{
    ADMIN_CODE_LENGTH, CODE_ALPHABET, IdGenerator, ROOM_CODE_LENGTH, VOTER_CODE_LENGTH,
    generate_code,
};
