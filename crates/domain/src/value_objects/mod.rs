//! Value Objects - Immutable, identity-less domain primitives

mod email_address;
mod session_id;
mod token_marker;
mod user_id;

pub use email_address::EmailAddress;
pub use session_id::{MAX_SESSION_ID_LEN, SessionId};
pub use token_marker::TokenMarker;
pub use user_id::{MAX_USER_ID_LEN, UserId};
