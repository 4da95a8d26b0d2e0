use serde::Deserialize;
use std::{
    env,
    path::{Path, PathBuf},
    time::Duration,
};
use thiserror::Error;

const DEFAULT_CONFIG_FILE_NAME: &str = "pr-notifier.yaml";
const DEFAULT_NTFY_SERVER: &str = "https://ntfy.sh";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 60;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

const GITHUB_TOKEN_VAR: &str = "GITHUB_TOKEN";
const NTFY_TOPIC_VAR: &str = "NTFY_TOPIC";
const NTFY_SERVER_VAR: &str = "NTFY_SERVER";
const POLL_INTERVAL_VAR: &str = "POLL_INTERVAL";
const GITHUB_ENTERPRISE_URL_VAR: &str = "GITHUB_ENTERPRISE_URL";
const REPO_URL_VAR: &str = "REPO_URL";
const REQUEST_TIMEOUT_VAR: &str = "REQUEST_TIMEOUT";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GITHUB_TOKEN not found. Please set it in your environment or the config file")]
    MissingToken,
    #[error("NTFY_TOPIC not found. Please set it in your environment or the config file")]
    MissingTopic,
    #[error("No URL provided via command line, environment (REPO_URL) or the config file")]
    MissingUrl,
    #[error("Invalid value for {name}: {value}")]
    InvalidNumber { name: String, value: String },
    #[error("Poll interval must be greater than zero")]
    InvalidPollInterval,
    #[error("Request timeout must be greater than zero")]
    InvalidRequestTimeout,
    #[error("Failed to read config file {path}")]
    ReadFile {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    #[error("Failed to parse config file {path}")]
    ParseFile {
        path: PathBuf,
        #[source]
        cause: serde_yaml::Error,
    },
}

/// Settings taken from the command line; they win over every other source.
#[derive(Debug, Default)]
pub struct Overrides {
    pub url: Option<String>,
    pub poll_interval: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub github_token: String,
    pub ntfy_topic: String,
    pub ntfy_server: String,
    pub poll_interval: Duration,
    pub github_enterprise_url: Option<String>,
    pub url: String,
    pub request_timeout: Duration,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialConfig {
    github_token: Option<String>,
    ntfy_topic: Option<String>,
    ntfy_server: Option<String>,
    poll_interval: Option<u64>,
    github_enterprise_url: Option<String>,
    repo_url: Option<String>,
    request_timeout: Option<u64>,
}

impl Config {
    /// Merges the config file, the environment and the command line, in
    /// increasing order of precedence.
    pub async fn load(path: Option<&Path>, overrides: Overrides) -> Result<Config, ConfigError> {
        let file = PartialConfig::read(path).await?;
        let env = PartialConfig::from_lookup(|key| env::var(key).ok())?;

        Config::resolve(file.merge(env), overrides)
    }

    fn resolve(partial: PartialConfig, overrides: Overrides) -> Result<Config, ConfigError> {
        let github_token = non_empty(partial.github_token).ok_or(ConfigError::MissingToken)?;
        let ntfy_topic = non_empty(partial.ntfy_topic).ok_or(ConfigError::MissingTopic)?;
        let url = non_empty(overrides.url)
            .or(non_empty(partial.repo_url))
            .ok_or(ConfigError::MissingUrl)?;

        let poll_interval = overrides
            .poll_interval
            .or(partial.poll_interval)
            .unwrap_or(DEFAULT_POLL_INTERVAL_SECS);
        if poll_interval == 0 {
            return Err(ConfigError::InvalidPollInterval);
        }

        let request_timeout = partial
            .request_timeout
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        if request_timeout == 0 {
            return Err(ConfigError::InvalidRequestTimeout);
        }

        Ok(Config {
            github_token,
            ntfy_topic,
            ntfy_server: non_empty(partial.ntfy_server)
                .unwrap_or_else(|| DEFAULT_NTFY_SERVER.to_owned()),
            poll_interval: Duration::from_secs(poll_interval),
            github_enterprise_url: non_empty(partial.github_enterprise_url),
            url,
            request_timeout: Duration::from_secs(request_timeout),
        })
    }
}

impl PartialConfig {
    async fn read(path: Option<&Path>) -> Result<PartialConfig, ConfigError> {
        let (path, required) = match path {
            Some(path) => (path.to_path_buf(), true),
            None => (PathBuf::from(DEFAULT_CONFIG_FILE_NAME), false),
        };

        let config_string = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(e) if !required && e.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config file at {}, skipping", path.display());
                return Ok(PartialConfig::default());
            }
            Err(cause) => return Err(ConfigError::ReadFile { path, cause }),
        };

        if config_string.trim().is_empty() {
            return Ok(PartialConfig::default());
        }

        serde_yaml::from_str::<PartialConfig>(&config_string)
            .map_err(|cause| ConfigError::ParseFile { path, cause })
    }

    fn from_lookup<F>(lookup: F) -> Result<PartialConfig, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| non_empty(lookup(key));
        let number = |key: &str| -> Result<Option<u64>, ConfigError> {
            var(key)
                .map(|value| {
                    value
                        .trim()
                        .parse::<u64>()
                        .map_err(|_| ConfigError::InvalidNumber {
                            name: key.to_owned(),
                            value,
                        })
                })
                .transpose()
        };

        Ok(PartialConfig {
            github_token: var(GITHUB_TOKEN_VAR),
            ntfy_topic: var(NTFY_TOPIC_VAR),
            ntfy_server: var(NTFY_SERVER_VAR),
            poll_interval: number(POLL_INTERVAL_VAR)?,
            github_enterprise_url: var(GITHUB_ENTERPRISE_URL_VAR),
            repo_url: var(REPO_URL_VAR),
            request_timeout: number(REQUEST_TIMEOUT_VAR)?,
        })
    }

    fn merge(self, over: PartialConfig) -> PartialConfig {
        PartialConfig {
            github_token: over.github_token.or(self.github_token),
            ntfy_topic: over.ntfy_topic.or(self.ntfy_topic),
            ntfy_server: over.ntfy_server.or(self.ntfy_server),
            poll_interval: over.poll_interval.or(self.poll_interval),
            github_enterprise_url: over.github_enterprise_url.or(self.github_enterprise_url),
            repo_url: over.repo_url.or(self.repo_url),
            request_timeout: over.request_timeout.or(self.request_timeout),
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}
