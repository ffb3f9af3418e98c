use super::state::{GameState, Phase};
use crate::error::AppResult;
use crate::models::Friend;
use crate::services::results::{summarize, GameSummary};
use crate::services::QuizGenerator;
use crate::social::SocialGraph;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::watch;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Outcome of a state machine action
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    /// The state was replaced
    Applied,
    /// The action did not apply to the current state; nothing changed
    Ignored,
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        *self == Transition::Applied
    }
}

/// Clears the loading flag when generation ends, however it ends
struct LoadingGuard<'a>(&'a AtomicBool);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Single owner of one player's game state.
///
/// Every change swaps in a whole new `GameState` under the watch channel's
/// lock, so observers only ever see complete snapshots.
pub struct GameSession<S> {
    id: Uuid,
    generator: Arc<QuizGenerator<S>>,
    state: watch::Sender<Arc<GameState>>,
    loading: AtomicBool,
    /// Bumped by `reset` so a quiz generated for an older game is dropped
    epoch: AtomicU64,
    rng: Mutex<StdRng>,
}

impl<S: SocialGraph> GameSession<S> {
    /// Create a new session seeded from OS entropy
    pub fn new(generator: Arc<QuizGenerator<S>>) -> Self {
        Self::with_rng(generator, StdRng::from_entropy())
    }

    /// Create a new session with reproducible randomness
    pub fn with_seed(generator: Arc<QuizGenerator<S>>, seed: u64) -> Self {
        Self::with_rng(generator, StdRng::seed_from_u64(seed))
    }

    fn with_rng(generator: Arc<QuizGenerator<S>>, rng: StdRng) -> Self {
        let (state, _) = watch::channel(Arc::new(GameState::new()));
        let id = Uuid::new_v4();
        info!("Session {} created", id);

        Self {
            id,
            generator,
            state,
            loading: AtomicBool::new(false),
            epoch: AtomicU64::new(0),
            rng: Mutex::new(rng),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Current state
    pub fn snapshot(&self) -> Arc<GameState> {
        self.state.borrow().clone()
    }

    /// Watch for state replacements
    pub fn subscribe(&self) -> watch::Receiver<Arc<GameState>> {
        self.state.subscribe()
    }

    /// Whether a quiz is being generated right now
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Swap in the result of `transition` if it yields a new state
    fn apply<F>(&self, action: &str, transition: F) -> Transition
    where
        F: FnOnce(&GameState) -> Option<GameState>,
    {
        let applied = self.state.send_if_modified(|state| match transition(state) {
            Some(next) => {
                *state = Arc::new(next);
                true
            }
            None => false,
        });

        if applied {
            Transition::Applied
        } else {
            debug!(
                "Session {}: ignored {} in phase {}",
                self.id,
                action,
                self.state.borrow().phase
            );
            Transition::Ignored
        }
    }

    /// Select or deselect a friend; ignored outside selection or while loading
    pub fn toggle_friend(&self, friend: &Friend) -> Transition {
        if self.is_loading() {
            debug!("Session {}: selection is frozen while loading", self.id);
            return Transition::Ignored;
        }
        self.apply("toggle_friend", |state| state.toggle_friend(friend))
    }

    /// Generate questions for the five selected friends and start playing.
    ///
    /// Returns `Ignored` when the selection is not full, the game already
    /// started, or another generation is in flight. On error the state is
    /// left exactly as it was.
    pub async fn start_quiz(&self) -> AppResult<Transition> {
        if self
            .loading
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Session {}: quiz generation already in flight", self.id);
            return Ok(Transition::Ignored);
        }
        let _guard = LoadingGuard(&self.loading);

        let (friends, epoch) = {
            let state = self.state.borrow();
            if !state.can_start() {
                debug!(
                    "Session {}: cannot start with {} friends in phase {}",
                    self.id,
                    state.selected_friends.len(),
                    state.phase
                );
                return Ok(Transition::Ignored);
            }
            (state.selected_friends.clone(), self.epoch.load(Ordering::Acquire))
        };

        info!("Session {}: generating quiz", self.id);
        let pool = self.generator.fetch_eligible_posts(&friends).await;

        let questions = pool.and_then(|pool| {
            let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
            self.generator.assemble(&pool, &friends, &mut *rng)
        });

        let questions = match questions {
            Ok(questions) => questions,
            Err(e) => {
                warn!("Session {}: quiz generation failed: {}", self.id, e);
                return Err(e);
            }
        };

        let count = questions.len();
        let transition = self.apply("start_quiz", |state| {
            if self.epoch.load(Ordering::Acquire) != epoch || state.selected_friends != friends {
                return None;
            }
            state.begin_quiz(questions)
        });

        if transition.is_applied() {
            info!("Session {}: quiz started with {} questions", self.id, count);
        }
        Ok(transition)
    }

    /// Answer the current question
    pub fn submit_answer(&self, friend: &Friend) -> Transition {
        let transition = self.apply("submit_answer", |state| state.submit_answer(friend.id));

        if transition.is_applied() {
            let state = self.snapshot();
            if state.phase == Phase::Finished {
                info!(
                    "Session {}: finished with {}/{}",
                    self.id,
                    state.score,
                    state.questions.len()
                );
            }
        }
        transition
    }

    /// Start over from the fresh initial state; valid in every phase
    pub fn reset(&self) {
        self.state.send_modify(|state| {
            self.epoch.fetch_add(1, Ordering::AcqRel);
            *state = Arc::new(GameState::new());
        });
        info!("Session {}: reset", self.id);
    }

    /// Summary of the finished game
    pub fn summary(&self) -> AppResult<GameSummary> {
        summarize(&self.snapshot())
    }
}
