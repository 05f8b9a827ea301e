use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::AppError;

const DEFAULT_POLLING_INTERVAL_SECS: u64 = 180;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 10;
const DEFAULT_NOTIFY_MIN_INTERVAL_MS: u64 = 1_000;
const DEFAULT_OPENDOTA_BASE_URL: &str = "https://api.opendota.com/api";
const DEFAULT_CONSTANTS_BASE_URL: &str =
    "https://raw.githubusercontent.com/odota/dotaconstants/master/build";
const DEFAULT_LLM_ENDPOINT: &str = "https://api.groq.com/openai";
const DEFAULT_LLM_MODEL: &str = "meta-llama/llama-4-scout-17b-16e-instruct";

/// Which notification text generator the watcher runs with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GeneratorKind {
    Templated,
    Narrative,
}

impl FromStr for GeneratorKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "templated" | "random" => Ok(Self::Templated),
            "narrative" | "llm" => Ok(Self::Narrative),
            other => Err(AppError::Config(format!(
                "GENERATOR must be `templated` or `narrative`, got `{other}`"
            ))),
        }
    }
}

/// Settings for the text generation backend, only present when the narrative
/// generator is selected.
#[derive(Debug, Clone)]
pub struct LlmConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
}

/// Everything needed to talk to OpenDota and the local storage, shared by the
/// watcher and the single-shot archive tool.
#[derive(Debug, Clone)]
pub struct StatsConfig {
    pub opendota_base_url: String,
    pub http_timeout: Duration,
    pub roster_path: PathBuf,
    pub archive_dir: PathBuf,
}

impl StatsConfig {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Self {
            opendota_base_url: env::var("OPENDOTA_BASE_URL")
                .unwrap_or_else(|_| DEFAULT_OPENDOTA_BASE_URL.into()),
            http_timeout: Duration::from_secs(
                parse_var("HTTP_TIMEOUT_SECS").unwrap_or(DEFAULT_HTTP_TIMEOUT_SECS),
            ),
            roster_path: env::var("ROSTER_PATH")
                .unwrap_or_else(|_| "targets.csv".into())
                .into(),
            archive_dir: env::var("ARCHIVE_DIR")
                .unwrap_or_else(|_| "Match History".into())
                .into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub channel_id: u64,
    pub generator: GeneratorKind,
    pub llm: Option<LlmConfig>,
    pub stats: StatsConfig,
    pub seen_store_path: PathBuf,
    pub constants_base_url: String,
    pub polling_interval_secs: u64,
    pub notify_min_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        let discord_token = env::var("DISCORD_TOKEN")
            .map_err(|_| AppError::Config("DISCORD_TOKEN must be set".into()))?;

        let channel_id = env::var("DISCORD_CHANNEL_ID")
            .map_err(|_| AppError::Config("DISCORD_CHANNEL_ID must be set".into()))?
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|id| *id != 0)
            .ok_or_else(|| AppError::Config("DISCORD_CHANNEL_ID is not a valid channel id".into()))?;

        let generator = match env::var("GENERATOR") {
            Ok(v) => v.parse()?,
            Err(_) => GeneratorKind::Templated,
        };

        let llm = match generator {
            GeneratorKind::Templated => None,
            GeneratorKind::Narrative => Some(LlmConfig {
                api_key: env::var("LLM_API_KEY").map_err(|_| {
                    AppError::Config("LLM_API_KEY must be set for the narrative generator".into())
                })?,
                endpoint: env::var("LLM_ENDPOINT").unwrap_or_else(|_| DEFAULT_LLM_ENDPOINT.into()),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| DEFAULT_LLM_MODEL.into()),
            }),
        };

        let seen_store_path = env::var("SEEN_STORE_PATH")
            .unwrap_or_else(|_| "last_matches.json".into())
            .into();

        let constants_base_url =
            env::var("CONSTANTS_BASE_URL").unwrap_or_else(|_| DEFAULT_CONSTANTS_BASE_URL.into());

        let polling_interval_secs = parse_var("POLLING_INTERVAL_SECS")
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_POLLING_INTERVAL_SECS);

        let notify_min_interval = Duration::from_millis(
            parse_var("NOTIFY_MIN_INTERVAL_MS").unwrap_or(DEFAULT_NOTIFY_MIN_INTERVAL_MS),
        );

        Ok(Self {
            discord_token,
            channel_id,
            generator,
            llm,
            stats: StatsConfig::from_env(),
            seen_store_path,
            constants_base_url,
            polling_interval_secs,
            notify_min_interval,
        })
    }
}

fn parse_var<T: FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_kind_parses_aliases() {
        assert_eq!(
            "Templated".parse::<GeneratorKind>().unwrap(),
            GeneratorKind::Templated
        );
        assert_eq!(
            " llm ".parse::<GeneratorKind>().unwrap(),
            GeneratorKind::Narrative
        );
        assert!(matches!(
            "markov".parse::<GeneratorKind>(),
            Err(AppError::Config(_))
        ));
    }
}
