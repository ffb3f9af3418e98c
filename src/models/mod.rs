//! Domain models for the quiz engine.
//!
//! Friends and casts are fetched once and never mutated afterwards; questions
//! are built from them once per quiz.

pub mod friend;
pub mod post;
pub mod question;

// Re-export all models for convenient access
pub use friend::Friend;
pub use post::{Post, RawPost};
pub use question::{AnswerRecord, Question, OPTIONS_PER_QUESTION};
