pub mod directory;
pub mod quiz_generator;
pub mod results;

pub use directory::{DirectorySnapshot, FriendDirectory};
pub use quiz_generator::{QuizGenerator, SELECTION_SIZE};
pub use results::{summarize, FriendStats, GameSummary, DETAILED_TEXT_LIMIT, SHARE_TEXT_LIMIT};
