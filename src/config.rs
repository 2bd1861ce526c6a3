//! Application-level configuration loading, including the gameplay rule set.

use std::{env, fs, io::ErrorKind, path::PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

/// Default location on disk where the server looks for the JSON configuration.
const DEFAULT_CONFIG_PATH: &str = "config/app.json";
/// Environment variable that overrides [`DEFAULT_CONFIG_PATH`].
const CONFIG_PATH_ENV: &str = "QUIZ_RUSH_CONFIG_PATH";
/// Environment variable that overrides the question bank path from the config file.
const QUESTIONS_PATH_ENV: &str = "QUIZ_RUSH_QUESTIONS_PATH";
/// Default location of the bundled question bank.
const DEFAULT_QUESTIONS_PATH: &str = "config/questions.json";

/// Rule constants governing a run. Mode-specific behaviour (Practice lives,
/// TimeAttack countdown) is decided by the run state machine; the numbers
/// live here so no variant is hard-coded.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct GameRules {
    /// Number of questions drawn into one round.
    pub round_size: usize,
    /// Lives a run starts with (and is revived to after exhaustion).
    pub max_lives: u8,
    /// Countdown per question in TimeAttack mode, in seconds.
    pub time_per_question_secs: u32,
    /// Score reward for a correct answer.
    pub points_per_correct: u32,
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            round_size: 25,
            max_lives: 3,
            time_per_question_secs: 15,
            points_per_correct: 10,
        }
    }
}

#[derive(Debug, Clone)]
/// Immutable runtime configuration shared across the application.
pub struct AppConfig {
    rules: GameRules,
    question_bank_path: PathBuf,
}

impl AppConfig {
    /// Load the application configuration from disk, falling back to baked-in defaults.
    pub fn load() -> Self {
        let path = resolve_config_path();
        match fs::read_to_string(&path) {
            Ok(contents) => match serde_json::from_str::<RawConfig>(&contents) {
                Ok(raw) => {
                    let config: Self = raw.into();
                    info!(
                        path = %path.display(),
                        round_size = config.rules.round_size,
                        max_lives = config.rules.max_lives,
                        "loaded game rules from config"
                    );
                    config
                }
                Err(err) => {
                    warn!(
                        path = %path.display(),
                        error = %err,
                        "failed to parse config; falling back to defaults"
                    );
                    Self::default()
                }
            },
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!(
                    path = %path.display(),
                    "config file not found; using built-in defaults"
                );
                Self::default()
            }
            Err(err) => {
                warn!(
                    path = %path.display(),
                    error = %err,
                    "failed to read config; falling back to defaults"
                );
                Self::default()
            }
        }
    }

    /// Rule constants applied to every run.
    pub fn rules(&self) -> GameRules {
        self.rules
    }

    /// Location of the question bank JSON file, after env overrides.
    pub fn question_bank_path(&self) -> PathBuf {
        env::var_os(QUESTIONS_PATH_ENV)
            .map(PathBuf::from)
            .filter(|path| !path.as_os_str().is_empty())
            .unwrap_or_else(|| self.question_bank_path.clone())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            rules: GameRules::default(),
            question_bank_path: PathBuf::from(DEFAULT_QUESTIONS_PATH),
        }
    }
}

#[derive(Debug, Deserialize)]
/// JSON representation of the configuration file located at [`DEFAULT_CONFIG_PATH`].
struct RawConfig {
    #[serde(default)]
    round_size: Option<usize>,
    #[serde(default)]
    max_lives: Option<u8>,
    #[serde(default)]
    time_per_question_secs: Option<u32>,
    #[serde(default)]
    points_per_correct: Option<u32>,
    #[serde(default)]
    question_bank: Option<PathBuf>,
}

impl From<RawConfig> for AppConfig {
    fn from(value: RawConfig) -> Self {
        let defaults = GameRules::default();
        Self {
            rules: GameRules {
                round_size: value.round_size.unwrap_or(defaults.round_size).max(1),
                max_lives: value.max_lives.unwrap_or(defaults.max_lives).max(1),
                time_per_question_secs: value
                    .time_per_question_secs
                    .unwrap_or(defaults.time_per_question_secs)
                    .max(1),
                points_per_correct: value
                    .points_per_correct
                    .unwrap_or(defaults.points_per_correct),
            },
            question_bank_path: value
                .question_bank
                .unwrap_or_else(|| PathBuf::from(DEFAULT_QUESTIONS_PATH)),
        }
    }
}

/// Resolve the configuration path taking the environment override into account.
fn resolve_config_path() -> PathBuf {
    env::var_os(CONFIG_PATH_ENV)
        .map(PathBuf::from)
        .filter(|path| !path.as_os_str().is_empty())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_PATH))
}
