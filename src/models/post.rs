use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A cast as returned by the social graph, before the author is attached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawPost {
    pub id: String,
    pub text: String,
    pub timestamp: DateTime<Utc>,
}

/// A cast tagged with the friend who wrote it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: String,
    pub text: String,
    pub author_id: u64,
    pub timestamp: DateTime<Utc>,
}

impl Post {
    /// Tag a raw cast with its author
    pub fn from_raw(raw: RawPost, author_id: u64) -> Self {
        Self {
            id: raw.id,
            text: raw.text,
            author_id,
            timestamp: raw.timestamp,
        }
    }

    /// Length of the text in characters
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }

    /// A cast can be asked about when `min < length < max`
    pub fn is_eligible(&self, min_chars: usize, max_chars: usize) -> bool {
        let len = self.char_len();
        len > min_chars && len < max_chars
    }
}
