//! Application services - Session and token use cases

mod session_manager;
mod token_manager;
mod token_validator;

pub use session_manager::SessionManager;
pub use token_manager::TokenManager;
pub use token_validator::TokenValidator;
