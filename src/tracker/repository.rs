use super::{log_stopped, pause};
use crate::{
    checks::CheckRunEvaluator,
    github::{response::PullRequest, GithubClient},
    http::Error,
    target::RepositoryRef,
};
use itertools::Itertools;
use std::{
    collections::{BTreeMap, HashSet},
    fmt::Display,
    time::Duration,
};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackedPullRequest {
    pub number: u64,
    pub head_sha: String,
    pub title: String,
    pub notified: bool,
}

impl From<&PullRequest> for TrackedPullRequest {
    fn from(pr: &PullRequest) -> Self {
        TrackedPullRequest {
            number: pr.number,
            head_sha: pr.head_sha().to_owned(),
            title: pr.title.to_owned(),
            notified: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Added(u64),
    CommitChanged(u64),
    Removed(u64),
}

impl Display for Change {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Change::Added(number) => write!(f, "+#{}", number),
            Change::CommitChanged(number) => write!(f, "~#{}", number),
            Change::Removed(number) => write!(f, "-#{}", number),
        }
    }
}

pub struct RepositoryTracker {
    github: GithubClient,
    evaluator: CheckRunEvaluator,
    target: RepositoryRef,
    poll_interval: Duration,
    tracked: BTreeMap<u64, TrackedPullRequest>,
}

impl RepositoryTracker {
    pub fn new(
        github: GithubClient,
        evaluator: CheckRunEvaluator,
        target: RepositoryRef,
        poll_interval: Duration,
    ) -> Self {
        RepositoryTracker {
            github,
            evaluator,
            target,
            poll_interval,
            tracked: BTreeMap::new(),
        }
    }

    #[cfg(test)]
    pub fn tracked(&self) -> &BTreeMap<u64, TrackedPullRequest> {
        &self.tracked
    }

    /// Polls every open pull request until `cancel` fires. There is no
    /// terminal state in repository mode.
    pub async fn run(mut self, cancel: &CancellationToken) {
        log::info!(
            "🚀 Starting to monitor all PRs in repository: {}",
            self.target
        );

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => break,
                result = self.poll_once() => result,
            };

            if let Err(e) = result {
                log::error!("❌ An API error occurred: {}. Retrying...", e);
            }

            if !pause(cancel, self.poll_interval).await {
                break;
            }
        }

        log_stopped();
    }

    pub async fn poll_once(&mut self) -> Result<(), Error> {
        let open = self
            .github
            .repo(&self.target.owner, &self.target.repo)
            .pull_requests()
            .open()
            .await?;

        let changes = self.reconcile(&open);
        if !changes.is_empty() {
            log::debug!("Tracked PRs changed: {}", changes.iter().join(" "));
        }

        if self.tracked.is_empty() {
            log::info!("No open PRs to monitor. Waiting...");
            return Ok(());
        }

        log::info!(
            "🔍 Checking status for {} open PR(s): {:?}",
            self.tracked.len(),
            self.tracked.keys().collect_vec()
        );

        let pending = self
            .tracked
            .values()
            .filter(|pr| !pr.notified)
            .cloned()
            .collect_vec();

        for pr in pending {
            let evaluation = self
                .evaluator
                .evaluate(pr.number, &pr.title, &pr.head_sha)
                .await?;

            if evaluation.notified {
                if let Some(entry) = self.tracked.get_mut(&pr.number) {
                    entry.notified = true;
                }
            }
        }

        Ok(())
    }

    /// Brings the tracked set in line with the currently open pull requests.
    pub fn reconcile(&mut self, open: &[PullRequest]) -> Vec<Change> {
        let mut changes = Vec::new();

        for pr in open {
            match self.tracked.get_mut(&pr.number) {
                None => {
                    log::info!(
                        "👀 New PR detected: #{} '{}'. Now monitoring.",
                        pr.number,
                        pr.title
                    );
                    self.tracked.insert(pr.number, TrackedPullRequest::from(pr));
                    changes.push(Change::Added(pr.number));
                }
                Some(entry) if entry.head_sha != pr.head_sha() => {
                    log::info!(
                        "🔄 New commit on PR #{} '{}'. Resetting status.",
                        pr.number,
                        pr.title
                    );
                    *entry = TrackedPullRequest::from(pr);
                    changes.push(Change::CommitChanged(pr.number));
                }
                Some(entry) => entry.title = pr.title.to_owned(),
            }
        }

        let open_numbers: HashSet<u64> = open.iter().map(|pr| pr.number).collect();
        let closed = self
            .tracked
            .keys()
            .filter(|number| !open_numbers.contains(*number))
            .copied()
            .collect_vec();

        for number in closed {
            log::info!(
                "🚮 PR #{} is closed or merged. Removing from monitoring.",
                number
            );
            self.tracked.remove(&number);
            changes.push(Change::Removed(number));
        }

        changes
    }
}
