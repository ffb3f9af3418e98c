//! Scoring summary and share text for a finished game.
//!
//! Everything here is a pure function of the `GameState`: the same finished
//! game always renders the same text.

use crate::error::{AppError, AppResult};
use crate::game::{GameState, Phase};
use crate::models::Friend;
use serde::Serialize;
use std::fmt::Write;

/// Upper bound on the concise share text (one cast)
pub const SHARE_TEXT_LIMIT: usize = 320;

/// Upper bound on the detailed breakdown
pub const DETAILED_TEXT_LIMIT: usize = 1024;

/// Characters of the cast quoted per question in the detailed text
const SNIPPET_CHARS: usize = 40;

/// How well the player recognised one friend
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendStats {
    pub friend: Friend,
    pub total_for_friend: usize,
    pub correct_for_friend: usize,
    /// Percentage, `None` when the friend authored no question
    pub accuracy: Option<u32>,
}

/// Final numbers for a finished game
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GameSummary {
    pub overall_score: u32,
    pub total_questions: usize,
    pub overall_percentage: u32,
    pub per_friend_stats: Vec<FriendStats>,
    pub concise_text: String,
    pub detailed_text: String,
}

/// Summarize a finished game
pub fn summarize(state: &GameState) -> AppResult<GameSummary> {
    if state.phase != Phase::Finished {
        return Err(AppError::Validation(format!(
            "Cannot summarize a game in phase {}",
            state.phase
        )));
    }

    let total_questions = state.questions.len();
    let overall_percentage = percentage(state.score as usize, total_questions);

    let per_friend_stats = state
        .selected_friends
        .iter()
        .map(|friend| friend_stats(state, friend))
        .collect();

    Ok(GameSummary {
        overall_score: state.score,
        total_questions,
        overall_percentage,
        per_friend_stats,
        concise_text: concise_text(state, overall_percentage),
        detailed_text: detailed_text(state, overall_percentage),
    })
}

/// `round(100 * correct / total)`, rounding halves up; 0 when `total == 0`
pub fn percentage(correct: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    ((200 * correct + total) / (2 * total)) as u32
}

fn friend_stats(state: &GameState, friend: &Friend) -> FriendStats {
    let authored = state
        .questions
        .iter()
        .filter(|q| q.correct_friend.id == friend.id);

    let mut total_for_friend = 0;
    let mut correct_for_friend = 0;
    for question in authored {
        total_for_friend += 1;
        if state.answers.get(&question.post.id) == Some(&friend.id) {
            correct_for_friend += 1;
        }
    }

    let accuracy = (total_for_friend > 0).then(|| percentage(correct_for_friend, total_for_friend));

    FriendStats {
        friend: friend.clone(),
        total_for_friend,
        correct_for_friend,
        accuracy,
    }
}

fn friend_handles(state: &GameState) -> String {
    state
        .selected_friends
        .iter()
        .map(Friend::handle)
        .collect::<Vec<_>>()
        .join(" ")
}

/// One-cast share text
fn concise_text(state: &GameState, overall_percentage: u32) -> String {
    let headline = format!(
        "I scored {}/{} ({}%) guessing who cast what!",
        state.score,
        state.questions.len(),
        overall_percentage
    );

    let with_friends = format!("{} Featuring {}", headline, friend_handles(state));
    if with_friends.chars().count() <= SHARE_TEXT_LIMIT {
        with_friends
    } else {
        truncate_chars(&headline, SHARE_TEXT_LIMIT)
    }
}

/// Score, friends and a line per question
fn detailed_text(state: &GameState, overall_percentage: u32) -> String {
    let mut text = String::new();
    // Writing into a String cannot fail
    let _ = writeln!(
        text,
        "Who cast that? {}/{} ({}%)",
        state.score,
        state.questions.len(),
        overall_percentage
    );
    let _ = writeln!(text, "Friends: {}", friend_handles(state));

    for (index, question) in state.questions.iter().enumerate() {
        let guess = state.answers.get(&question.post.id).copied();
        let snippet = truncate_chars(&question.post.text.replace('\n', " "), SNIPPET_CHARS);

        let line = match guess {
            Some(id) if question.is_correct(id) => {
                format!("{}. ✅ {} \"{}\"", index + 1, question.correct_friend.handle(), snippet)
            }
            Some(id) => {
                let guessed = question
                    .options
                    .iter()
                    .find(|f| f.id == id)
                    .map(Friend::handle)
                    .unwrap_or_else(|| format!("#{}", id));
                format!(
                    "{}. ❌ {} (guessed {}) \"{}\"",
                    index + 1,
                    question.correct_friend.handle(),
                    guessed,
                    snippet
                )
            }
            None => format!(
                "{}. ⏭ {} \"{}\"",
                index + 1,
                question.correct_friend.handle(),
                snippet
            ),
        };
        let _ = writeln!(text, "{}", line);
    }

    truncate_chars(text.trim_end(), DETAILED_TEXT_LIMIT)
}

/// Cut `text` to at most `limit` characters, marking the cut with `…`
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    if limit == 0 {
        return String::new();
    }

    let mut cut: String = text.chars().take(limit - 1).collect();
    cut.push('…');
    cut
}
