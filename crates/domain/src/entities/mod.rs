//! Domain entities - Records with identity and lifecycle

mod attempt_record;
mod decoded_token;
mod session;
mod user_account;

pub use attempt_record::{AttemptDecision, AttemptRecord};
pub use decoded_token::DecodedToken;
pub use session::Session;
pub use user_account::UserAccount;
