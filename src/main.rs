//! Castquiz terminal driver
//!
//! Loads configuration, fetches the owner's friends, lets the player pick
//! five of them and plays one round of "who cast this?" on stdin/stdout.

use anyhow::{bail, Context};
use castquiz_backend::game::{GameSession, Transition};
use castquiz_backend::services::{DirectorySnapshot, SELECTION_SIZE};
use castquiz_backend::social::SocialGraph;
use castquiz_backend::{AppConfig, AppError, AppState};
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tracing::{error, info, warn};

/// Matches shown per friend search
const SEARCH_RESULTS: usize = 10;

type Input = Lines<BufReader<Stdin>>;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables first
    dotenv::dotenv().ok();

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        eprintln!("Configuration error: {}", e);
        AppError::Config(e)
    })?;

    init_tracing(&config);

    info!("Castquiz starting");
    info!("Environment: {}", config.environment);
    info!("Social graph API: {}", config.social.base_url);
    info!(
        "Quiz: {} questions, {} casts per friend",
        config.quiz.question_count, config.quiz.posts_per_friend
    );

    let owner_fid = config
        .owner_fid
        .ok_or_else(|| AppError::Config("QUIZ_OWNER_FID is required".to_string()))?;

    let app = AppState::from_config(&config)?;

    let snapshot = app
        .directory
        .load_snapshot(owner_fid)
        .await
        .context("Could not load your friends")?;

    if snapshot.len() < SELECTION_SIZE {
        bail!(
            "You need at least {} friends to play, found {}",
            SELECTION_SIZE,
            snapshot.len()
        );
    }

    let session = app.new_session();
    let mut input = BufReader::new(tokio::io::stdin()).lines();

    preselect(&session, &snapshot, &config.preselected_friends);
    if !select_friends(&session, &snapshot, &mut input).await? {
        return Ok(());
    }

    if !start(&session, &mut input).await? {
        return Ok(());
    }

    if !play(&session, &mut input).await? {
        return Ok(());
    }

    let summary = session.summary()?;
    println!();
    println!("{}", summary.detailed_text);
    println!();
    for stats in &summary.per_friend_stats {
        match stats.accuracy {
            Some(accuracy) => println!(
                "  {:<20} {}/{} ({}%)",
                stats.friend.handle(),
                stats.correct_for_friend,
                stats.total_for_friend,
                accuracy
            ),
            None => println!("  {:<20} no questions", stats.friend.handle()),
        }
    }
    println!();
    println!("Share: {}", summary.concise_text);

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("castquiz_backend={},reqwest=warn", config.log_level).into());

    if config.json_logs() {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}

async fn prompt(input: &mut Input, message: &str) -> anyhow::Result<Option<String>> {
    print!("{} ", message);
    std::io::stdout().flush().context("stdout closed")?;
    let line = input.next_line().await.context("Failed to read stdin")?;
    Ok(line.map(|l| l.trim().to_string()))
}

fn preselect<S: SocialGraph>(session: &GameSession<S>, snapshot: &DirectorySnapshot, names: &[String]) {
    for name in names {
        match snapshot.find_by_username(name) {
            Some(friend) => {
                if session.toggle_friend(friend) == Transition::Ignored {
                    warn!("Could not preselect @{}", friend.username);
                }
            }
            None => warn!("@{} is not among your friends", name),
        }
    }
}

/// Returns false when stdin closed before the selection was complete
async fn select_friends<S: SocialGraph>(
    session: &GameSession<S>,
    snapshot: &DirectorySnapshot,
    input: &mut Input,
) -> anyhow::Result<bool> {
    while !session.snapshot().can_start() {
        let state = session.snapshot();
        let selected: Vec<String> = state.selected_friends.iter().map(|f| f.handle()).collect();
        println!(
            "Selected {}/{}: {}",
            selected.len(),
            SELECTION_SIZE,
            selected.join(" ")
        );

        let Some(query) = prompt(input, "Search friends:").await? else {
            return Ok(false);
        };

        let matches = snapshot.filter(&query);
        if matches.is_empty() {
            println!("No friends match \"{}\"", query);
            continue;
        }

        for (i, friend) in matches.iter().take(SEARCH_RESULTS).enumerate() {
            let mark = if state.is_selected(friend.id) { "*" } else { " " };
            println!("{} {:>2}. {} ({})", mark, i + 1, friend.display_name, friend.handle());
        }

        let Some(choice) = prompt(input, "Toggle #:").await? else {
            return Ok(false);
        };
        match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= matches.len().min(SEARCH_RESULTS) => {
                let _ = session.toggle_friend(&matches[n - 1]);
            }
            _ => println!("Pick a number from the list"),
        }
    }
    Ok(true)
}

/// Generate the quiz, offering a retry on recoverable failures
async fn start<S: SocialGraph>(session: &GameSession<S>, input: &mut Input) -> anyhow::Result<bool> {
    loop {
        println!("Fetching casts...");
        match session.start_quiz().await {
            Ok(Transition::Applied) => return Ok(true),
            Ok(Transition::Ignored) => bail!("Quiz could not be started"),
            Err(e) if e.is_retryable() => {
                println!("{}", e);
                match prompt(input, "Try again? [y/N]").await? {
                    Some(answer) if answer.eq_ignore_ascii_case("y") => continue,
                    _ => return Ok(false),
                }
            }
            Err(e) => {
                error!("Quiz generation failed: {}", e);
                return Err(e.into());
            }
        }
    }
}

/// Returns false when stdin closed mid-game
async fn play<S: SocialGraph>(session: &GameSession<S>, input: &mut Input) -> anyhow::Result<bool> {
    loop {
        let state = session.snapshot();
        let Some(question) = state.current_question() else {
            return Ok(true);
        };

        println!();
        println!(
            "Question {}/{}: who cast this?",
            state.current_index + 1,
            state.questions.len()
        );
        println!("  \"{}\"", question.post.text);
        for (i, friend) in question.options.iter().enumerate() {
            println!("  {}. {} ({})", i + 1, friend.display_name, friend.handle());
        }

        let Some(choice) = prompt(input, "Your guess:").await? else {
            return Ok(false);
        };
        let picked = match choice.parse::<usize>() {
            Ok(n) if n >= 1 && n <= question.options.len() => &question.options[n - 1],
            _ => {
                println!("Pick 1-{}", question.options.len());
                continue;
            }
        };

        let _ = session.submit_answer(picked);
        if question.is_correct(picked.id) {
            println!("Correct!");
        } else {
            println!("Nope, it was {}", question.correct_friend.handle());
        }
    }
}
