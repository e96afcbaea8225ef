//! Core business logic for roompoll.

pub mod services;

pub use services::*;
