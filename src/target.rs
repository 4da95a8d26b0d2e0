use reqwest::Url;
use std::fmt::Display;
use thiserror::Error;

const PUBLIC_HOST: &str = "github.com";
const PUBLIC_API_URL: &str = "https://api.github.com";
const ENTERPRISE_API_PATH: &str = "api/v3";
const PULL_SEGMENT: &str = "pull";
const GIT_SUFFIX: &str = ".git";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum TargetError {
    #[error("Invalid URL: {url}")]
    InvalidUrl { url: String },
    #[error("Invalid GitHub repository URL: {url}")]
    InvalidRepositoryUrl { url: String },
    #[error("Invalid GitHub pull request URL: {url}")]
    InvalidPullRequestUrl { url: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryRef {
    pub owner: String,
    pub repo: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequestRef {
    pub owner: String,
    pub repo: String,
    pub number: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Target {
    Repository(RepositoryRef),
    PullRequest(PullRequestRef),
}

impl Display for RepositoryRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.repo)
    }
}

impl Display for PullRequestRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{} #{}", self.owner, self.repo, self.number)
    }
}

impl Target {
    /// A URL whose third path segment is `pull` addresses a single pull
    /// request, anything else a whole repository.
    pub fn parse(url: &str) -> Result<Target, TargetError> {
        let parsed = parse_url(url)?;
        let segments = path_segments(&parsed);

        if segments.get(2) == Some(&PULL_SEGMENT) {
            parse_pull_request(url, &segments).map(Target::PullRequest)
        } else {
            parse_repository(url, &segments).map(Target::Repository)
        }
    }
}

fn parse_url(url: &str) -> Result<Url, TargetError> {
    Url::parse(url.trim()).map_err(|_| TargetError::InvalidUrl {
        url: url.to_owned(),
    })
}

fn path_segments(url: &Url) -> Vec<&str> {
    url.path()
        .split('/')
        .filter(|segment| !segment.is_empty())
        .collect()
}

fn parse_repository(url: &str, segments: &[&str]) -> Result<RepositoryRef, TargetError> {
    let invalid = || TargetError::InvalidRepositoryUrl {
        url: url.to_owned(),
    };

    match segments {
        [owner, repo, ..] => {
            let repo = repo.strip_suffix(GIT_SUFFIX).unwrap_or(*repo);
            if repo.is_empty() {
                return Err(invalid());
            }

            Ok(RepositoryRef {
                owner: owner.to_string(),
                repo: repo.to_owned(),
            })
        }
        _ => Err(invalid()),
    }
}

fn parse_pull_request(url: &str, segments: &[&str]) -> Result<PullRequestRef, TargetError> {
    let invalid = || TargetError::InvalidPullRequestUrl {
        url: url.to_owned(),
    };

    match segments {
        [owner, repo, PULL_SEGMENT, number, ..] => {
            let number = number
                .parse::<u64>()
                .ok()
                .filter(|number| *number > 0)
                .ok_or_else(invalid)?;

            Ok(PullRequestRef {
                owner: owner.to_string(),
                repo: repo.to_string(),
                number,
            })
        }
        _ => Err(invalid()),
    }
}

/// Resolves the REST endpoint: a configured enterprise base wins, then any
/// non-public host in the target URL, then the public API.
pub fn api_base_url(url: &str, enterprise_url: Option<&str>) -> Result<String, TargetError> {
    if let Some(enterprise) = enterprise_url {
        return Ok(format!(
            "{}/{}",
            enterprise.trim_end_matches('/'),
            ENTERPRISE_API_PATH
        ));
    }

    let parsed = parse_url(url)?;

    match parsed.host_str() {
        Some(host) if host != PUBLIC_HOST => {
            let authority = match parsed.port() {
                Some(port) => format!("{}:{}", host, port),
                None => host.to_owned(),
            };

            Ok(format!(
                "{}://{}/{}",
                parsed.scheme(),
                authority,
                ENTERPRISE_API_PATH
            ))
        }
        _ => Ok(PUBLIC_API_URL.to_owned()),
    }
}
