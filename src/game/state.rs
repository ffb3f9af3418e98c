use crate::models::{AnswerRecord, Friend, Question};
use crate::services::SELECTION_SIZE;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle stage of a game
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    Selecting,
    Playing,
    Finished,
}

impl Phase {
    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Selecting => "selecting",
            Phase::Playing => "playing",
            Phase::Finished => "finished",
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of one play-through.
///
/// Transitions never edit a state in place: each returns the next state, or
/// `None` when the transition does not apply to the current phase.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    /// Insertion order is kept for display
    pub selected_friends: Vec<Friend>,
    pub questions: Vec<Question>,
    pub current_index: usize,
    pub score: u32,
    pub phase: Phase,
    pub answers: AnswerRecord,
}

impl GameState {
    /// Fresh state: nothing selected, no questions, selecting
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, friend_id: u64) -> bool {
        self.selected_friends.iter().any(|f| f.id == friend_id)
    }

    /// Selection is full and the game has not started
    pub fn can_start(&self) -> bool {
        self.phase == Phase::Selecting && self.selected_friends.len() == SELECTION_SIZE
    }

    /// Question being asked, if playing
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase {
            Phase::Playing => self.questions.get(self.current_index),
            _ => None,
        }
    }

    /// Add or remove `friend` from the selection.
    ///
    /// Adding to a full selection is a no-op rather than an error.
    pub fn toggle_friend(&self, friend: &Friend) -> Option<Self> {
        if self.phase != Phase::Selecting {
            return None;
        }

        let mut next = self.clone();
        if self.is_selected(friend.id) {
            next.selected_friends.retain(|f| f.id != friend.id);
        } else if self.selected_friends.len() < SELECTION_SIZE {
            next.selected_friends.push(friend.clone());
        } else {
            return None;
        }
        Some(next)
    }

    /// Enter `Playing` with freshly generated questions
    pub fn begin_quiz(&self, questions: Vec<Question>) -> Option<Self> {
        if !self.can_start() || questions.is_empty() {
            return None;
        }

        Some(Self {
            selected_friends: self.selected_friends.clone(),
            questions,
            current_index: 0,
            score: 0,
            phase: Phase::Playing,
            answers: AnswerRecord::new(),
        })
    }

    /// Answer the current question with `friend_id` and advance.
    ///
    /// A question that already has an answer is never written again.
    pub fn submit_answer(&self, friend_id: u64) -> Option<Self> {
        let question = self.current_question()?;
        if self.answers.contains_key(&question.post.id) {
            return None;
        }

        let mut next = self.clone();
        next.answers.insert(question.post.id.clone(), friend_id);
        if question.is_correct(friend_id) {
            next.score += 1;
        }
        next.current_index += 1;
        if next.current_index >= next.questions.len() {
            next.phase = Phase::Finished;
        }
        Some(next)
    }

    /// Number of answered questions the player got right, counted from scratch
    pub fn recount_score(&self) -> u32 {
        self.questions
            .iter()
            .take(self.current_index)
            .filter(|q| {
                self.answers
                    .get(&q.post.id)
                    .is_some_and(|chosen| q.is_correct(*chosen))
            })
            .count() as u32
    }

    /// Check the structural invariants of the state
    pub fn is_consistent(&self) -> bool {
        let finished = self.phase == Phase::Finished;
        let exhausted = !self.questions.is_empty() && self.current_index >= self.questions.len();

        self.score == self.recount_score()
            && self.selected_friends.len() <= SELECTION_SIZE
            && self.answers.len() == self.current_index
            && (self.phase == Phase::Selecting || finished == exhausted)
    }
}
