//! Application layer - Use cases and orchestration
//!
//! Contains the session and token use cases (validation, session lifecycle,
//! token refresh, login and password change) and the port definitions the
//! infrastructure adapters implement.

pub mod error;
pub mod ports;
pub mod services;

pub use error::ApplicationError;
pub use ports::*;
pub use services::*;
