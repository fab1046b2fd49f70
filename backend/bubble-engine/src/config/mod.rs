use serde::Deserialize;
use std::env;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} has invalid value {value:?}")]
    InvalidValue { var: &'static str, value: String },
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub catalog_path: String,
    pub log_format: LogFormat,
    pub session: SessionConfig,
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

/// Feed sizing, report cadence and the diversity policy
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SessionConfig {
    pub feed_size: usize,
    pub rounds_to_analysis: u32,
    pub rounds_to_summary: u32,
    pub base_diversity_ratio: f64,
    pub diversity_decay_per_round: f64,
    pub min_diversity_ratio: f64,
    pub unrestricted_diversity_ratio: f64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            feed_size: 10,
            rounds_to_analysis: 3,
            rounds_to_summary: 7,
            base_diversity_ratio: 0.36,
            diversity_decay_per_round: 0.06,
            min_diversity_ratio: 0.08,
            unrestricted_diversity_ratio: 0.7,
        }
    }
}

impl SessionConfig {
    /// Restricted mode shrinks the ratio each round down to a floor;
    /// unrestricted mode keeps it fixed and high.
    pub fn diversity_ratio(&self, round: u32, unrestricted: bool) -> f64 {
        if unrestricted {
            return self.unrestricted_diversity_ratio;
        }
        let elapsed = round.saturating_sub(1) as f64;
        (self.base_diversity_ratio - elapsed * self.diversity_decay_per_round)
            .max(self.min_diversity_ratio)
    }
}

/// Scripted viewer used by the binary
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SimulationConfig {
    pub rounds: u32,
    pub favorite_topic: Option<String>,
    pub seed: Option<u64>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenv::dotenv().ok();

        let defaults = SessionConfig::default();

        Ok(Config {
            catalog_path: env::var("CATALOG_PATH").unwrap_or_else(|_| "data/posts.json".to_string()),
            log_format: match env::var("LOG_FORMAT") {
                Ok(raw) => match raw.to_ascii_lowercase().as_str() {
                    "json" => LogFormat::Json,
                    "text" | "" => LogFormat::Text,
                    _ => {
                        return Err(ConfigError::InvalidValue {
                            var: "LOG_FORMAT",
                            value: raw,
                        })
                    }
                },
                Err(_) => LogFormat::Text,
            },
            session: SessionConfig {
                feed_size: parse_var("FEED_SIZE", defaults.feed_size)?,
                rounds_to_analysis: parse_var("ROUNDS_TO_ANALYSIS", defaults.rounds_to_analysis)?,
                rounds_to_summary: parse_var("ROUNDS_TO_SUMMARY", defaults.rounds_to_summary)?,
                base_diversity_ratio: parse_ratio("BASE_DIVERSITY_RATIO", defaults.base_diversity_ratio)?,
                diversity_decay_per_round: parse_ratio(
                    "DIVERSITY_DECAY_PER_ROUND",
                    defaults.diversity_decay_per_round,
                )?,
                min_diversity_ratio: parse_ratio("MIN_DIVERSITY_RATIO", defaults.min_diversity_ratio)?,
                unrestricted_diversity_ratio: parse_ratio(
                    "UNRESTRICTED_DIVERSITY_RATIO",
                    defaults.unrestricted_diversity_ratio,
                )?,
            },
            simulation: SimulationConfig {
                rounds: parse_var("SIMULATION_ROUNDS", 8)?,
                favorite_topic: env::var("SIMULATION_FAVORITE_TOPIC")
                    .ok()
                    .filter(|topic| !topic.trim().is_empty()),
                seed: match env::var("SIMULATION_SEED") {
                    Ok(raw) => Some(parse_value("SIMULATION_SEED", raw)?),
                    Err(_) => None,
                },
            },
        })
    }
}

fn parse_var<T: FromStr>(var: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => parse_value(var, raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(var: &'static str, raw: String) -> Result<T, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue { var, value: raw })
}

fn parse_ratio(var: &'static str, default: f64) -> Result<f64, ConfigError> {
    let value: f64 = parse_var(var, default)?;
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(ConfigError::InvalidValue {
            var,
            value: value.to_string(),
        })
    }
}
