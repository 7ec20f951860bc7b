//! Document moderation: status changes and deletes with best-effort side effects.

mod engine;
mod error;

pub use engine::ModerationEngine;
pub use error::ModerationError;
