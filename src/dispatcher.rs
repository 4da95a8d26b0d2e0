use crate::{
    checks::CheckRunEvaluator,
    config::Config,
    github::GithubClient,
    http::{self, HttpClient},
    notify::Notifier,
    target::{self, Target, TargetError},
    tracker::{RepositoryTracker, SingleTracker},
};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Target(#[from] TargetError),
    #[error(transparent)]
    Http(#[from] http::Error),
}

/// Everything resolved before a tracker loop starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    pub target: Target,
    pub api_base_url: String,
}

impl Plan {
    pub fn new(config: &Config) -> Result<Plan, DispatchError> {
        let target = Target::parse(&config.url)?;
        let api_base_url =
            target::api_base_url(&config.url, config.github_enterprise_url.as_deref())?;

        Ok(Plan {
            target,
            api_base_url,
        })
    }
}

/// Picks the tracker for the configured URL and runs it until it finishes or
/// `cancel` fires. Fails before polling if the URL is unusable.
pub async fn run(config: &Config, cancel: &CancellationToken) -> Result<(), DispatchError> {
    let plan = Plan::new(config)?;
    log::info!("✅ API Endpoint set to: {}", plan.api_base_url);

    let http = HttpClient::new(config.request_timeout)?;
    let github = GithubClient::new(http.clone(), plan.api_base_url, &config.github_token);
    let notifier = Notifier::new(http, &config.ntfy_server, &config.ntfy_topic);

    match plan.target {
        Target::PullRequest(pr) => {
            let evaluator =
                CheckRunEvaluator::new(github.clone(), notifier, &pr.owner, &pr.repo);
            let state = SingleTracker::new(github, evaluator, pr, config.poll_interval)
                .run(cancel)
                .await;
            log::debug!("Single PR tracker finished in state {:?}", state);
        }
        Target::Repository(repo) => {
            let evaluator =
                CheckRunEvaluator::new(github.clone(), notifier, &repo.owner, &repo.repo);
            RepositoryTracker::new(github, evaluator, repo, config.poll_interval)
                .run(cancel)
                .await;
        }
    }

    Ok(())
}
