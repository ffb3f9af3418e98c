//! Game lifecycle: selecting friends, answering, finished.

pub mod session;
pub mod state;

pub use session::{GameSession, Transition};
pub use state::{GameState, Phase};
