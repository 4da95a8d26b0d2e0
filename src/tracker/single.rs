use super::{log_stopped, pause};
use crate::{
    checks::{short_sha, CheckRunEvaluator},
    github::GithubClient,
    http::Error,
    target::PullRequestRef,
};
use std::{collections::HashSet, time::Duration};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Watching,
    Closed,
    NotFound,
}

impl TrackerState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TrackerState::Watching)
    }
}

/// Notifications are keyed by commit, so a force-push back to an already
/// reported sha stays quiet.
#[derive(Debug, Default)]
pub struct CommitWatch {
    pub current_sha: Option<String>,
    pub notified_shas: HashSet<String>,
}

pub struct SingleTracker {
    github: GithubClient,
    evaluator: CheckRunEvaluator,
    target: PullRequestRef,
    poll_interval: Duration,
    watch: CommitWatch,
}

impl SingleTracker {
    pub fn new(
        github: GithubClient,
        evaluator: CheckRunEvaluator,
        target: PullRequestRef,
        poll_interval: Duration,
    ) -> Self {
        SingleTracker {
            github,
            evaluator,
            target,
            poll_interval,
            watch: CommitWatch::default(),
        }
    }

    #[cfg(test)]
    pub fn watch(&self) -> &CommitWatch {
        &self.watch
    }

    /// Polls until the pull request closes, disappears, or `cancel` fires.
    /// Returns `Watching` when stopped by cancellation.
    pub async fn run(mut self, cancel: &CancellationToken) -> TrackerState {
        log::info!("🚀 Starting to monitor single PR: {}", self.target);

        loop {
            let result = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log_stopped();
                    return TrackerState::Watching;
                }
                result = self.poll_once() => result,
            };

            match result {
                Ok(state) if state.is_terminal() => return state,
                Ok(_) => {}
                Err(e) => log::error!("❌ An API error occurred: {}. Retrying...", e),
            }

            if !pause(cancel, self.poll_interval).await {
                log_stopped();
                return TrackerState::Watching;
            }
        }
    }

    pub async fn poll_once(&mut self) -> Result<TrackerState, Error> {
        let number = self.target.number;

        let pr = match self
            .github
            .repo(&self.target.owner, &self.target.repo)
            .pull_request(number)
            .get()
            .await
        {
            Ok(pr) => pr,
            Err(e) if e.is_not_found() => {
                log::warn!(
                    "❌ PR #{} not found. It might have been deleted. Stopping.",
                    number
                );
                return Ok(TrackerState::NotFound);
            }
            Err(e) => return Err(e),
        };

        if !pr.is_open() {
            log::info!("🚮 PR #{} is closed or merged. Stopping.", number);
            return Ok(TrackerState::Closed);
        }

        let sha = pr.head_sha();

        if self.watch.current_sha.as_deref() != Some(sha) {
            self.watch.current_sha = Some(sha.to_owned());
            log::info!(
                "🔗 Now monitoring commit SHA: {} for PR '{}'",
                short_sha(sha),
                pr.title
            );
        }

        if self.watch.notified_shas.contains(sha) {
            log::info!(
                "✅ Status for commit {} already sent. Waiting for new commits...",
                short_sha(sha)
            );
            return Ok(TrackerState::Watching);
        }

        log::info!("🔍 Checking status for commit {}...", short_sha(sha));
        let evaluation = self.evaluator.evaluate(pr.number, &pr.title, sha).await?;

        if evaluation.notified {
            self.watch.notified_shas.insert(sha.to_owned());
        }

        Ok(TrackerState::Watching)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{http::HttpClient, notify::Notifier};
    use anyhow::Result;
    use mockito::{Mock, Server, ServerGuard};
    use std::io::Write;

    const PR_PATH: &str = "/repos/octo/repo/pulls/42";
    const SUCCESS_RUNS: &str = r#"{"total_count": 2, "check_runs": [
        {"name": "build", "status": "completed", "conclusion": "success"},
        {"name": "test", "status": "completed", "conclusion": "success"}
    ]}"#;

    fn tracker(server: &ServerGuard) -> Result<SingleTracker> {
        let http = HttpClient::new(Duration::from_secs(5))?;
        let github = GithubClient::new(http.clone(), server.url(), "test_token");
        let notifier = Notifier::new(http, &server.url(), "builds");
        let evaluator = CheckRunEvaluator::new(github.clone(), notifier, "octo", "repo");
        let target = PullRequestRef {
            owner: "octo".to_owned(),
            repo: "repo".to_owned(),
            number: 42,
        };

        Ok(SingleTracker::new(
            github,
            evaluator,
            target,
            Duration::from_millis(10),
        ))
    }

    fn pull_request(state: &str, sha: &str) -> String {
        format!(
            r#"{{"number": 42, "title": "Fix bug", "state": "{}", "head": {{"sha": "{}"}}}}"#,
            state, sha
        )
    }

    async fn pr_mock(server: &mut ServerGuard, state: &str, sha: &str) -> Mock {
        server
            .mock("GET", PR_PATH)
            .with_body(pull_request(state, sha))
            .create_async()
            .await
    }

    async fn check_runs_mock(server: &mut ServerGuard, sha: &str, hits: usize) -> Mock {
        server
            .mock(
                "GET",
                format!("/repos/octo/repo/commits/{}/check-runs", sha).as_str(),
            )
            .with_body(SUCCESS_RUNS)
            .expect(hits)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn should_notify_completed_commit_only_once() -> Result<()> {
        let mut server = Server::new_async().await;
        let _pr = pr_mock(&mut server, "open", "abc1234").await;
        let checks = check_runs_mock(&mut server, "abc1234", 1).await;
        let notify = server
            .mock("POST", "/builds")
            .match_header("title", "PR #42 Fix bug Check: Success")
            .expect(1)
            .create_async()
            .await;

        let mut tracker = tracker(&server)?;

        assert_eq!(tracker.poll_once().await?, TrackerState::Watching);
        assert_eq!(tracker.poll_once().await?, TrackerState::Watching);

        checks.assert_async().await;
        notify.assert_async().await;
        assert_eq!(tracker.watch().current_sha.as_deref(), Some("abc1234"));
        assert!(tracker.watch().notified_shas.contains("abc1234"));

        Ok(())
    }

    #[tokio::test]
    async fn should_keep_polling_until_checks_start() -> Result<()> {
        let mut server = Server::new_async().await;
        let _pr = pr_mock(&mut server, "open", "abc1234").await;
        let checks = server
            .mock("GET", "/repos/octo/repo/commits/abc1234/check-runs")
            .with_body(r#"{"total_count": 0, "check_runs": []}"#)
            .expect(2)
            .create_async()
            .await;
        let notify = server.mock("POST", "/builds").expect(0).create_async().await;

        let mut tracker = tracker(&server)?;
        tracker.poll_once().await?;
        tracker.poll_once().await?;

        checks.assert_async().await;
        notify.assert_async().await;
        assert!(tracker.watch().notified_shas.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn should_evaluate_new_commit_after_notification() -> Result<()> {
        let mut server = Server::new_async().await;
        let first = pr_mock(&mut server, "open", "aaaaaaa").await;
        let first_checks = check_runs_mock(&mut server, "aaaaaaa", 1).await;
        let second_checks = check_runs_mock(&mut server, "bbbbbbb", 1).await;
        let notify = server.mock("POST", "/builds").expect(2).create_async().await;

        let mut tracker = tracker(&server)?;
        tracker.poll_once().await?;

        first.remove_async().await;
        let _second = pr_mock(&mut server, "open", "bbbbbbb").await;
        tracker.poll_once().await?;

        first_checks.assert_async().await;
        second_checks.assert_async().await;
        notify.assert_async().await;
        assert_eq!(tracker.watch().current_sha.as_deref(), Some("bbbbbbb"));
        assert_eq!(tracker.watch().notified_shas.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn should_stop_when_pull_request_is_closed() -> Result<()> {
        let mut server = Server::new_async().await;
        let _pr = pr_mock(&mut server, "closed", "abc1234").await;
        let checks = check_runs_mock(&mut server, "abc1234", 0).await;

        let tracker = tracker(&server)?;
        let state = tracker.run(&CancellationToken::new()).await;

        checks.assert_async().await;
        assert_eq!(state, TrackerState::Closed);

        Ok(())
    }

    #[tokio::test]
    async fn should_stop_when_pull_request_is_deleted() -> Result<()> {
        let mut server = Server::new_async().await;
        let pr = server
            .mock("GET", PR_PATH)
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .expect(1)
            .create_async()
            .await;

        let tracker = tracker(&server)?;
        let state = tracker.run(&CancellationToken::new()).await;

        pr.assert_async().await;
        assert_eq!(state, TrackerState::NotFound);

        Ok(())
    }

    #[tokio::test]
    async fn should_treat_server_errors_as_transient() -> Result<()> {
        let mut server = Server::new_async().await;
        let _pr = server
            .mock("GET", PR_PATH)
            .with_status(500)
            .create_async()
            .await;

        let mut tracker = tracker(&server)?;
        let result = tracker.poll_once().await;

        assert!(result.is_err());
        assert!(tracker.watch().current_sha.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn should_keep_running_after_server_errors_until_cancelled() -> Result<()> {
        let mut server = Server::new_async().await;
        let pr = server
            .mock("GET", PR_PATH)
            .with_status(500)
            .expect_at_least(2)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            stopper.cancel();
        });

        let state = tracker(&server)?.run(&cancel).await;

        pr.assert_async().await;
        assert_eq!(state, TrackerState::Watching);

        Ok(())
    }

    #[tokio::test]
    async fn should_not_notify_when_cancelled_mid_cycle() -> Result<()> {
        let mut server = Server::new_async().await;
        let _pr = pr_mock(&mut server, "open", "abc1234").await;
        let _checks = server
            .mock("GET", "/repos/octo/repo/commits/abc1234/check-runs")
            .with_chunked_body(|w: &mut dyn Write| {
                std::thread::sleep(Duration::from_millis(1000));
                w.write_all(SUCCESS_RUNS.as_bytes())
            })
            .create_async()
            .await;
        let notify = server.mock("POST", "/builds").expect(0).create_async().await;

        let cancel = CancellationToken::new();
        let stopper = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(200)).await;
            stopper.cancel();
        });

        let state = tracker(&server)?.run(&cancel).await;

        notify.assert_async().await;
        assert_eq!(state, TrackerState::Watching);

        Ok(())
    }

    #[tokio::test]
    async fn should_exit_without_polling_when_cancelled() -> Result<()> {
        let mut server = Server::new_async().await;
        let pr = server
            .mock("GET", PR_PATH)
            .expect(0)
            .create_async()
            .await;

        let cancel = CancellationToken::new();
        cancel.cancel();

        let state = tracker(&server)?.run(&cancel).await;

        pr.assert_async().await;
        assert_eq!(state, TrackerState::Watching);

        Ok(())
    }
}
