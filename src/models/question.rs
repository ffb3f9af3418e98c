use super::{Friend, Post};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Every question offers the correct author plus four distractors
pub const OPTIONS_PER_QUESTION: usize = 5;

/// Post id -> id of the friend the player picked
pub type AnswerRecord = HashMap<String, u64>;

/// "Who cast this?" question
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub post: Post,
    pub correct_friend: Friend,
    pub options: Vec<Friend>,
}

impl Question {
    pub fn new(post: Post, correct_friend: Friend, options: Vec<Friend>) -> Self {
        Self {
            post,
            correct_friend,
            options,
        }
    }

    /// Whether `friend_id` is the author of this question's cast
    pub fn is_correct(&self, friend_id: u64) -> bool {
        self.correct_friend.id == friend_id
    }

    /// Five options, the correct friend exactly once, no repeated ids
    pub fn is_well_formed(&self) -> bool {
        let ids: HashSet<u64> = self.options.iter().map(|f| f.id).collect();
        let correct_count = self
            .options
            .iter()
            .filter(|f| f.id == self.correct_friend.id)
            .count();

        self.options.len() == OPTIONS_PER_QUESTION
            && ids.len() == self.options.len()
            && correct_count == 1
            && self.post.author_id == self.correct_friend.id
    }
}
