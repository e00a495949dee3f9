//! Background tasks for the HTTP presentation layer

mod rate_limit_cleanup;

pub use rate_limit_cleanup::spawn_rate_limit_cleanup_task;
