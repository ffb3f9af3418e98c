use crate::config::{QuizConfig, SocialConfig};
use crate::error::{AppError, AppResult};
use crate::models::{Friend, Post, Question, OPTIONS_PER_QUESTION};
use crate::random::{sample_without_replacement, shuffle};
use crate::social::{SocialError, SocialGraph};
use futures::future::join_all;
use rand::Rng;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time;
use tracing::{info, warn};

/// A quiz is always played with exactly this many friends
pub const SELECTION_SIZE: usize = 5;

/// Builds "who cast this?" questions from the selected friends' recent casts
pub struct QuizGenerator<S> {
    social: Arc<S>,
    config: QuizConfig,
    fetch_timeout: Duration,
}

impl<S: SocialGraph> QuizGenerator<S> {
    /// Create a new quiz generator
    pub fn new(social: Arc<S>, config: QuizConfig, social_config: &SocialConfig) -> Self {
        Self {
            social,
            config,
            fetch_timeout: social_config.request_timeout(),
        }
    }

    /// Set the per-friend fetch timeout
    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn config(&self) -> &QuizConfig {
        &self.config
    }

    /// Fetch casts for the five friends and build the configured number of questions
    pub async fn generate<R: Rng + ?Sized>(
        &self,
        friends: &[Friend],
        rng: &mut R,
    ) -> AppResult<Vec<Question>> {
        validate_selection(friends)?;
        let pool = self.fetch_eligible_posts(friends).await?;
        self.assemble(&pool, friends, rng)
    }

    /// Fan out one post fetch per friend and keep the eligible casts.
    ///
    /// A friend whose fetch fails or times out contributes nothing; the others
    /// are unaffected. A configuration error still aborts, since no fetch can
    /// succeed without credentials.
    pub async fn fetch_eligible_posts(&self, friends: &[Friend]) -> AppResult<Vec<Post>> {
        let fetches = friends.iter().map(|friend| async move {
            let request = self
                .social
                .list_posts(friend.id, self.config.posts_per_friend);
            let result = match time::timeout(self.fetch_timeout, request).await {
                Ok(result) => result,
                Err(_) => Err(SocialError::Timeout),
            };
            (friend, result)
        });

        let mut pool = Vec::new();
        for (friend, result) in join_all(fetches).await {
            match result {
                Ok(raw_posts) => {
                    let fetched = raw_posts.len();
                    let before = pool.len();
                    pool.extend(
                        raw_posts
                            .into_iter()
                            .map(|raw| Post::from_raw(raw, friend.id))
                            .filter(|post| self.is_eligible(post)),
                    );
                    info!(
                        "Fetched {} casts for @{}, {} eligible",
                        fetched,
                        friend.username,
                        pool.len() - before
                    );
                }
                Err(SocialError::Config(msg)) => return Err(AppError::Config(msg)),
                Err(e) => {
                    warn!("Skipping casts for @{}: {}", friend.username, e);
                }
            }
        }

        Ok(pool)
    }

    /// Sample questions from an already fetched pool of casts.
    ///
    /// Casts by authors outside `friends` and ineligible casts are ignored.
    pub fn assemble<R: Rng + ?Sized>(
        &self,
        pool: &[Post],
        friends: &[Friend],
        rng: &mut R,
    ) -> AppResult<Vec<Question>> {
        validate_selection(friends)?;

        // Casts are distinct by id, even when two share the same text
        let mut seen_ids = HashSet::new();
        let eligible: Vec<&Post> = pool
            .iter()
            .filter(|post| self.is_eligible(post))
            .filter(|post| friends.iter().any(|f| f.id == post.author_id))
            .filter(|post| seen_ids.insert(post.id.as_str()))
            .collect();

        let required = self.config.question_count;
        if eligible.len() < required {
            warn!(
                "Only {} eligible casts for a {} question quiz",
                eligible.len(),
                required
            );
            return Err(AppError::InsufficientContent {
                eligible: eligible.len(),
                required,
            });
        }

        let picked = sample_without_replacement(&eligible, required, &mut *rng);

        let mut questions = Vec::with_capacity(picked.len());
        for post in picked {
            let correct = friends
                .iter()
                .find(|f| f.id == post.author_id)
                .ok_or_else(|| AppError::Message(format!("No author for cast {}", post.id)))?;

            let others: Vec<Friend> = friends
                .iter()
                .filter(|f| f.id != correct.id)
                .cloned()
                .collect();

            let mut options = sample_without_replacement(&others, OPTIONS_PER_QUESTION - 1, &mut *rng);
            options.push(correct.clone());
            shuffle(&mut options, &mut *rng);

            let question = Question::new(post.clone(), correct.clone(), options);
            debug_assert!(question.is_well_formed());
            questions.push(question);
        }

        info!("Generated {} questions from {} eligible casts", questions.len(), eligible.len());
        Ok(questions)
    }

    fn is_eligible(&self, post: &Post) -> bool {
        post.is_eligible(self.config.min_post_chars, self.config.max_post_chars)
    }
}

/// Exactly five friends with distinct ids
pub fn validate_selection(friends: &[Friend]) -> AppResult<()> {
    if friends.len() != SELECTION_SIZE {
        return Err(AppError::Validation(format!(
            "A quiz needs exactly {} friends, got {}",
            SELECTION_SIZE,
            friends.len()
        )));
    }

    let ids: HashSet<u64> = friends.iter().map(|f| f.id).collect();
    if ids.len() != friends.len() {
        return Err(AppError::Validation("Selected friends must be distinct".to_string()));
    }

    Ok(())
}
