//! Castquiz Backend Library
//!
//! Quiz engine for the "who cast this?" game: load the owner's friends,
//! build questions from five friends' recent casts, drive a play-through
//! and summarize it for sharing.

pub mod config;
pub mod error;
pub mod game;
pub mod models;
pub mod random;
pub mod services;
pub mod social;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{AppError, AppResult};

use game::GameSession;
use services::{FriendDirectory, QuizGenerator};
use social::{NeynarClient, SocialGraph};
use std::sync::Arc;

/// Application state shared by every session
pub struct AppState<S> {
    pub social: Arc<S>,
    pub directory: Arc<FriendDirectory<S>>,
    pub quiz_generator: Arc<QuizGenerator<S>>,
}

impl<S: SocialGraph> AppState<S> {
    /// Wire the loader and generator around one social graph client
    pub fn new(config: &AppConfig, social: S) -> Self {
        let social = Arc::new(social);

        Self {
            directory: Arc::new(FriendDirectory::new(
                social.clone(),
                &config.directory,
                &config.social,
            )),
            quiz_generator: Arc::new(QuizGenerator::new(
                social.clone(),
                config.quiz.clone(),
                &config.social,
            )),
            social,
        }
    }

    /// Start a fresh game session
    pub fn new_session(&self) -> GameSession<S> {
        GameSession::new(self.quiz_generator.clone())
    }
}

impl AppState<NeynarClient> {
    /// Build state backed by the Neynar API
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let client = NeynarClient::new(&config.social)?;
        Ok(Self::new(config, client))
    }
}
