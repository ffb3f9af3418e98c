use serde::{Deserialize, Serialize};

/// A contact from the owner's social graph, a candidate author in the quiz
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub id: u64,
    pub username: String,
    pub display_name: String,
    pub avatar_url: String,
}

impl Friend {
    pub fn new(
        id: u64,
        username: impl Into<String>,
        display_name: impl Into<String>,
        avatar_url: impl Into<String>,
    ) -> Self {
        Self {
            id,
            username: username.into(),
            display_name: display_name.into(),
            avatar_url: avatar_url.into(),
        }
    }

    /// Case-insensitive match against username or display name.
    ///
    /// `needle` must already be lowercased.
    pub fn matches(&self, needle: &str) -> bool {
        self.username.to_lowercase().contains(needle)
            || self.display_name.to_lowercase().contains(needle)
    }

    /// `@username` handle used in share text
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}
