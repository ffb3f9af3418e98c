use std::env;
use std::time::Duration;

/// Social graph API configuration
#[derive(Debug, Clone)]
pub struct SocialConfig {
    pub api_key: String,
    pub base_url: String,
    pub request_timeout_secs: u64,
}

/// Friend directory paging configuration
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    pub target_count: usize,
    pub page_size: usize,
}

/// Quiz generation configuration
#[derive(Debug, Clone)]
pub struct QuizConfig {
    pub question_count: usize,
    pub posts_per_friend: usize,
    /// Exclusive lower bound on cast length, in characters
    pub min_post_chars: usize,
    /// Exclusive upper bound on cast length, in characters
    pub max_post_chars: usize,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub social: SocialConfig,
    pub directory: DirectoryConfig,
    pub quiz: QuizConfig,
    pub owner_fid: Option<u64>,
    pub preselected_friends: Vec<String>,
    pub log_level: String,
    pub log_format: String,
    pub environment: String,
}

fn parse_env<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|s| s.trim().parse::<T>().ok())
}

impl SocialConfig {
    /// Create social config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let api_key = env::var("NEYNAR_API_KEY")
            .map_err(|_| "NEYNAR_API_KEY environment variable is required")?;

        if api_key.trim().is_empty() {
            return Err("NEYNAR_API_KEY must not be empty".to_string());
        }

        let base_url = env::var("NEYNAR_API_URL")
            .unwrap_or_else(|_| "https://api.neynar.com".to_string())
            .trim_end_matches('/')
            .to_string();

        let request_timeout_secs = parse_env::<u64>("SOCIAL_REQUEST_TIMEOUT_SECS").unwrap_or(10);

        if request_timeout_secs == 0 {
            return Err("SOCIAL_REQUEST_TIMEOUT_SECS must be greater than 0".to_string());
        }

        Ok(Self {
            api_key: api_key.trim().to_string(),
            base_url,
            request_timeout_secs,
        })
    }

    /// Get the per-request timeout as Duration
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for SocialConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://api.neynar.com".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl DirectoryConfig {
    /// Create directory config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let target_count = parse_env::<usize>("DIRECTORY_TARGET_COUNT").unwrap_or(500);
        let page_size = parse_env::<usize>("DIRECTORY_PAGE_SIZE").unwrap_or(100);

        if target_count == 0 {
            return Err("DIRECTORY_TARGET_COUNT must be greater than 0".to_string());
        }

        if page_size == 0 {
            return Err("DIRECTORY_PAGE_SIZE must be greater than 0".to_string());
        }

        Ok(Self {
            target_count,
            page_size,
        })
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            target_count: 500,
            page_size: 100,
        }
    }
}

impl QuizConfig {
    /// Create quiz config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let defaults = Self::default();

        let config = Self {
            question_count: parse_env("QUIZ_QUESTION_COUNT").unwrap_or(defaults.question_count),
            posts_per_friend: parse_env("QUIZ_POSTS_PER_FRIEND")
                .unwrap_or(defaults.posts_per_friend),
            min_post_chars: parse_env("QUIZ_MIN_POST_CHARS").unwrap_or(defaults.min_post_chars),
            max_post_chars: parse_env("QUIZ_MAX_POST_CHARS").unwrap_or(defaults.max_post_chars),
        };

        config.validate()?;
        Ok(config)
    }

    /// Check the quiz knobs are usable
    pub fn validate(&self) -> Result<(), String> {
        if self.question_count == 0 || self.question_count > 50 {
            return Err(format!(
                "QUIZ_QUESTION_COUNT must be between 1 and 50, got {}",
                self.question_count
            ));
        }

        if self.posts_per_friend == 0 {
            return Err("QUIZ_POSTS_PER_FRIEND must be greater than 0".to_string());
        }

        // Both bounds are exclusive, so there must be room for at least one length
        if self.min_post_chars + 1 >= self.max_post_chars {
            return Err(format!(
                "QUIZ_MIN_POST_CHARS ({}) must be below QUIZ_MAX_POST_CHARS ({}) by at least 2",
                self.min_post_chars, self.max_post_chars
            ));
        }

        Ok(())
    }
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            question_count: 5,
            posts_per_friend: 10,
            min_post_chars: 20,
            max_post_chars: 200,
        }
    }
}

impl AppConfig {
    /// Create application config from environment variables
    pub fn from_env() -> Result<Self, String> {
        let social = SocialConfig::from_env()?;
        let directory = DirectoryConfig::from_env()?;
        let quiz = QuizConfig::from_env()?;

        let owner_fid = match env::var("QUIZ_OWNER_FID") {
            Ok(raw) => Some(
                raw.trim()
                    .parse::<u64>()
                    .map_err(|_| format!("Invalid QUIZ_OWNER_FID: {}", raw))?,
            ),
            Err(_) => None,
        };

        let preselected_friends = env::var("QUIZ_FRIENDS")
            .map(|raw| parse_username_list(&raw))
            .unwrap_or_default();

        let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = env::var("LOG_FORMAT").unwrap_or_else(|_| "text".to_string());
        let environment = env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string());

        // Validate log level
        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&log_level.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_LEVEL: {}. Must be one of: {:?}",
                log_level, valid_log_levels
            ));
        }

        let valid_log_formats = ["text", "json"];
        if !valid_log_formats.contains(&log_format.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid LOG_FORMAT: {}. Must be one of: {:?}",
                log_format, valid_log_formats
            ));
        }

        // Validate environment
        let valid_environments = ["development", "staging", "production"];
        if !valid_environments.contains(&environment.to_lowercase().as_str()) {
            return Err(format!(
                "Invalid ENVIRONMENT: {}. Must be one of: {:?}",
                environment, valid_environments
            ));
        }

        Ok(Self {
            social,
            directory,
            quiz,
            owner_fid,
            preselected_friends,
            log_level: log_level.to_lowercase(),
            log_format: log_format.to_lowercase(),
            environment: environment.to_lowercase(),
        })
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Check if running in development
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    /// Whether log lines should be emitted as JSON
    pub fn json_logs(&self) -> bool {
        self.log_format == "json"
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            social: SocialConfig::default(),
            directory: DirectoryConfig::default(),
            quiz: QuizConfig::default(),
            owner_fid: None,
            preselected_friends: Vec::new(),
            log_level: "info".to_string(),
            log_format: "text".to_string(),
            environment: "development".to_string(),
        }
    }
}

/// Split a comma separated list of usernames, dropping blanks and leading `@`
pub fn parse_username_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|name| name.trim().trim_start_matches('@').to_lowercase())
        .filter(|name| !name.is_empty())
        .collect()
}
