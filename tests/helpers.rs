#![allow(dead_code)]

use castquiz_backend::config::AppConfig;
use castquiz_backend::game::GameSession;
use castquiz_backend::models::{Friend, RawPost};
use castquiz_backend::social::{FriendPage, SocialError, SocialGraph, SocialResult};
use castquiz_backend::AppState;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// In-memory social graph with scriptable failures
#[derive(Default)]
pub struct FakeSocialGraph {
    /// Friend pages keyed by the cursor that requests them (`None` = first page)
    pages: HashMap<Option<String>, FriendPage>,
    failing_cursors: HashSet<Option<String>>,
    posts: HashMap<u64, Vec<RawPost>>,
    failing_friends: HashSet<u64>,
    hanging_friends: HashSet<u64>,
    misconfigured: bool,
    post_delay: Option<Duration>,
    pub friend_calls: AtomicUsize,
    pub post_calls: AtomicUsize,
}

impl FakeSocialGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, cursor: Option<&str>, friends: Vec<Friend>, next: Option<&str>) -> Self {
        self.pages.insert(
            cursor.map(str::to_string),
            FriendPage {
                friends,
                next_cursor: next.map(str::to_string),
            },
        );
        self
    }

    pub fn failing_page(mut self, cursor: Option<&str>) -> Self {
        self.failing_cursors.insert(cursor.map(str::to_string));
        self
    }

    pub fn with_posts(mut self, friend_id: u64, posts: Vec<RawPost>) -> Self {
        self.posts.insert(friend_id, posts);
        self
    }

    pub fn failing_posts(mut self, friend_id: u64) -> Self {
        self.failing_friends.insert(friend_id);
        self
    }

    pub fn hanging_posts(mut self, friend_id: u64) -> Self {
        self.hanging_friends.insert(friend_id);
        self
    }

    pub fn misconfigured(mut self) -> Self {
        self.misconfigured = true;
        self
    }

    pub fn with_post_delay(mut self, delay: Duration) -> Self {
        self.post_delay = Some(delay);
        self
    }

    pub fn post_calls(&self) -> usize {
        self.post_calls.load(Ordering::SeqCst)
    }

    pub fn friend_calls(&self) -> usize {
        self.friend_calls.load(Ordering::SeqCst)
    }
}

impl SocialGraph for FakeSocialGraph {
    async fn list_friends(
        &self,
        _owner_id: u64,
        cursor: Option<&str>,
        _limit: usize,
    ) -> SocialResult<FriendPage> {
        self.friend_calls.fetch_add(1, Ordering::SeqCst);
        if self.misconfigured {
            return Err(SocialError::Config("no api key".to_string()));
        }

        let key = cursor.map(str::to_string);
        if self.failing_cursors.contains(&key) {
            return Err(SocialError::Status {
                status: 503,
                body: "upstream unavailable".to_string(),
            });
        }
        Ok(self.pages.get(&key).cloned().unwrap_or_default())
    }

    async fn list_posts(&self, friend_id: u64, limit: usize) -> SocialResult<Vec<RawPost>> {
        self.post_calls.fetch_add(1, Ordering::SeqCst);
        if self.misconfigured {
            return Err(SocialError::Config("no api key".to_string()));
        }
        if let Some(delay) = self.post_delay {
            tokio::time::sleep(delay).await;
        }
        if self.hanging_friends.contains(&friend_id) {
            tokio::time::sleep(Duration::from_secs(3600)).await;
        }
        if self.failing_friends.contains(&friend_id) {
            return Err(SocialError::Network("connection reset".to_string()));
        }

        let posts = self.posts.get(&friend_id).cloned().unwrap_or_default();
        Ok(posts.into_iter().take(limit).collect())
    }
}

pub fn friend(id: u64) -> Friend {
    Friend::new(
        id,
        format!("friend{id}"),
        format!("Friend Number {id}"),
        format!("https://img.example/{id}.png"),
    )
}

pub fn five_friends() -> Vec<Friend> {
    (1..=5).map(friend).collect()
}

pub fn timestamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
}

pub fn cast(id: &str, text: &str) -> RawPost {
    RawPost {
        id: id.to_string(),
        text: text.to_string(),
        timestamp: timestamp(),
    }
}

/// `count` eligible casts for `friend_id`
pub fn eligible_casts(friend_id: u64, count: usize) -> Vec<RawPost> {
    (0..count)
        .map(|i| {
            cast(
                &format!("0x{friend_id:02}{i:02}"),
                &format!("cast {i} by friend {friend_id}, long enough to quiz on"),
            )
        })
        .collect()
}

/// Graph where each of the five friends has `per_friend` eligible casts
pub fn rich_graph(per_friend: usize) -> FakeSocialGraph {
    (1..=5).fold(FakeSocialGraph::new(), |graph, id| {
        graph.with_posts(id, eligible_casts(id, per_friend))
    })
}

pub fn test_config(question_count: usize) -> AppConfig {
    let mut config = AppConfig::default();
    config.quiz.question_count = question_count;
    config
}

pub fn app_state(graph: FakeSocialGraph, question_count: usize) -> AppState<FakeSocialGraph> {
    AppState::new(&test_config(question_count), graph)
}

/// Session with the five standard friends already selected
pub fn selected_session(app: &AppState<FakeSocialGraph>, seed: u64) -> GameSession<FakeSocialGraph> {
    let session = GameSession::with_seed(app.quiz_generator.clone(), seed);
    for f in five_friends() {
        assert!(session.toggle_friend(&f).is_applied());
    }
    session
}

/// Answer every remaining question with the correct author
pub fn answer_all_correctly(session: &GameSession<FakeSocialGraph>) {
    while let Some(question) = session.snapshot().current_question().cloned() {
        assert!(session.submit_answer(&question.correct_friend).is_applied());
    }
}
