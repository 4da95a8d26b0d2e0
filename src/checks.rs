use crate::{
    github::{response::CheckRuns, GithubClient},
    http::Error,
    notify::{Notification, Notifier, Tag},
};
use itertools::Itertools;
use std::fmt::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckStatus {
    Pending,
    InProgress,
    Success,
    Failure,
}

impl Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let value = match self {
            CheckStatus::Pending => "pending",
            CheckStatus::InProgress => "in_progress",
            CheckStatus::Success => "Success",
            CheckStatus::Failure => "Failure",
        };

        write!(f, "{}", value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluation {
    pub status: CheckStatus,
    pub notified: bool,
}

impl Evaluation {
    fn unfinished(status: CheckStatus) -> Self {
        Evaluation {
            status,
            notified: false,
        }
    }
}

/// Snapshot of a commit's check runs, derived on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckRunOutcome {
    pub total_count: u64,
    pub completed_count: u64,
    pub failed_runs: Vec<String>,
}

impl From<&CheckRuns> for CheckRunOutcome {
    fn from(runs: &CheckRuns) -> Self {
        let completed = runs
            .check_runs
            .iter()
            .filter(|run| run.is_completed())
            .collect_vec();

        let failed_runs = completed
            .iter()
            .filter(|run| run.is_failure())
            .map(|run| run.name.to_owned())
            .collect_vec();

        CheckRunOutcome {
            total_count: runs.total_count,
            completed_count: completed.len() as u64,
            failed_runs,
        }
    }
}

impl CheckRunOutcome {
    pub fn status(&self) -> CheckStatus {
        if self.total_count == 0 {
            CheckStatus::Pending
        } else if self.completed_count < self.total_count {
            CheckStatus::InProgress
        } else if self.failed_runs.is_empty() {
            CheckStatus::Success
        } else {
            CheckStatus::Failure
        }
    }

    pub fn message(&self) -> String {
        if self.failed_runs.is_empty() {
            format!("All {} checks passed!", self.total_count)
        } else {
            let names = self
                .failed_runs
                .iter()
                .map(|name| format!("\"{}\"", name))
                .join(", ");

            format!("Checks failed: {}", names)
        }
    }

    pub fn notification(&self, number: u64, title: &str) -> Notification {
        let status = self.status();
        let tag = match status {
            CheckStatus::Failure => Tag::Failure,
            _ => Tag::Success,
        };

        Notification::new(
            format!("PR #{} {} Check: {}", number, title, status),
            self.message(),
            tag,
        )
    }
}

/// Classifies a commit's check runs and notifies once they have all completed.
///
/// Callers decide whether a commit has already been reported; every call that
/// sees all runs completed makes exactly one send attempt.
#[derive(Clone, Debug)]
pub struct CheckRunEvaluator {
    github: GithubClient,
    notifier: Notifier,
    owner: String,
    repo: String,
}

impl CheckRunEvaluator {
    pub fn new(
        github: GithubClient,
        notifier: Notifier,
        owner: impl Into<String>,
        repo: impl Into<String>,
    ) -> Self {
        CheckRunEvaluator {
            github,
            notifier,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub async fn evaluate(&self, number: u64, title: &str, sha: &str) -> Result<Evaluation, Error> {
        let runs = self
            .github
            .repo(&self.owner, &self.repo)
            .commit(sha)
            .check_runs()
            .await?;

        let outcome = CheckRunOutcome::from(&runs);
        let status = outcome.status();

        match status {
            CheckStatus::Pending | CheckStatus::InProgress => {
                log::debug!(
                    "PR #{} commit {}: {} ({}/{} checks completed)",
                    number,
                    short_sha(sha),
                    status,
                    outcome.completed_count,
                    outcome.total_count
                );

                Ok(Evaluation::unfinished(status))
            }
            CheckStatus::Success | CheckStatus::Failure => {
                log::info!(
                    "🎉 PR #{} '{}' finished with conclusion: {}",
                    number,
                    title,
                    status
                );

                let notification = outcome.notification(number, title);

                // at-most-once: a failed send still counts as notified
                match self.notifier.send(&notification).await {
                    Ok(()) => log::info!(
                        "✅ Notification sent successfully for: {}",
                        notification.title
                    ),
                    Err(e) => log::error!("❌ Error sending notification: {}", e),
                }

                Ok(Evaluation {
                    status,
                    notified: true,
                })
            }
        }
    }
}

pub fn short_sha(sha: &str) -> &str {
    sha.get(..7).unwrap_or(sha)
}
