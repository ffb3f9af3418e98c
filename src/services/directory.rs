use crate::config::{DirectoryConfig, SocialConfig};
use crate::error::{AppError, AppResult};
use crate::models::Friend;
use crate::social::{FriendPage, SocialError, SocialGraph};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{debug, error, info, warn};

/// Friends fetched for one owner, de-duplicated, in first-seen order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirectorySnapshot {
    pub owner_id: u64,
    pub friends: Vec<Friend>,
}

impl DirectorySnapshot {
    /// Filter the snapshot case-insensitively on username and display name.
    ///
    /// A blank query returns every friend. Nothing is re-fetched.
    pub fn filter(&self, query: &str) -> Vec<Friend> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return self.friends.clone();
        }

        self.friends
            .iter()
            .filter(|friend| friend.matches(&needle))
            .cloned()
            .collect()
    }

    /// Look a friend up by exact username, ignoring case and a leading `@`
    pub fn find_by_username(&self, username: &str) -> Option<&Friend> {
        let wanted = username.trim().trim_start_matches('@');
        self.friends
            .iter()
            .find(|friend| friend.username.eq_ignore_ascii_case(wanted))
    }

    pub fn len(&self) -> usize {
        self.friends.len()
    }

    pub fn is_empty(&self) -> bool {
        self.friends.is_empty()
    }
}

/// Loads the owner's friends from the social graph, page by page
pub struct FriendDirectory<S> {
    social: Arc<S>,
    target_count: usize,
    page_size: usize,
    fetch_timeout: Duration,
}

impl<S: SocialGraph> FriendDirectory<S> {
    /// Create a new directory loader
    pub fn new(social: Arc<S>, config: &DirectoryConfig, social_config: &SocialConfig) -> Self {
        Self {
            social,
            target_count: config.target_count,
            page_size: config.page_size,
            fetch_timeout: social_config.request_timeout(),
        }
    }

    /// Set the per-page timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    /// Load friends for `owner_id`, optionally narrowed by `query`
    pub async fn load_friends(&self, owner_id: u64, query: Option<&str>) -> AppResult<Vec<Friend>> {
        let snapshot = self.load_snapshot(owner_id).await?;
        Ok(match query {
            Some(query) => snapshot.filter(query),
            None => snapshot.friends,
        })
    }

    /// Fetch pages until the target count is reached or the graph runs out.
    ///
    /// Any failed page aborts the whole load; no partial snapshot is returned.
    pub async fn load_snapshot(&self, owner_id: u64) -> AppResult<DirectorySnapshot> {
        info!("Loading friend directory for owner {}", owner_id);

        let mut friends: Vec<Friend> = Vec::new();
        let mut seen_ids: HashSet<u64> = HashSet::new();
        let mut seen_cursors: HashSet<String> = HashSet::new();
        let mut cursor: Option<String> = None;
        let mut pages = 0usize;

        loop {
            let page = self
                .fetch_page(owner_id, cursor.as_deref())
                .await
                .map_err(|e| {
                    error!(
                        "Friend directory load for owner {} failed after {} pages: {}",
                        owner_id, pages, e
                    );
                    e
                })?;
            pages += 1;

            for friend in page.friends {
                if friends.len() >= self.target_count {
                    break;
                }
                // First occurrence wins
                if seen_ids.insert(friend.id) {
                    friends.push(friend);
                }
            }

            if friends.len() >= self.target_count {
                debug!("Reached target of {} friends", self.target_count);
                break;
            }

            match page.next_cursor {
                Some(next) => {
                    if !seen_cursors.insert(next.clone()) {
                        warn!("Social graph repeated cursor {}, stopping pagination", next);
                        break;
                    }
                    cursor = Some(next);
                }
                None => break,
            }
        }

        info!(
            "Loaded {} friends for owner {} in {} pages",
            friends.len(),
            owner_id,
            pages
        );

        Ok(DirectorySnapshot { owner_id, friends })
    }

    async fn fetch_page(
        &self,
        owner_id: u64,
        cursor: Option<&str>,
    ) -> AppResult<FriendPage> {
        let request = self.social.list_friends(owner_id, cursor, self.page_size);

        match time::timeout(self.fetch_timeout, request).await {
            Ok(Ok(page)) => Ok(page),
            Ok(Err(SocialError::Config(msg))) => Err(AppError::Config(msg)),
            Ok(Err(e)) => Err(AppError::DirectoryUnavailable(e.to_string())),
            Err(_) => Err(AppError::DirectoryUnavailable(format!(
                "friend page request timed out after {:?}",
                self.fetch_timeout
            ))),
        }
    }
}
