//! Domain layer for the session security service
//!
//! Contains the identifiers, session records and counters that the rest of
//! the workspace manipulates. This layer has no I/O and defines the
//! ubiquitous language: users, sessions, token markers and attempt records.

pub mod entities;
pub mod errors;
pub mod value_objects;

pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
