use crate::{
    github::{github_client::GithubClient, response::PullRequest},
    http::Error,
};

pub struct PullRequestsHandler<'a> {
    client: &'a GithubClient,
    owner: String,
    repo: String,
}

impl<'a> PullRequestsHandler<'a> {
    pub fn new(client: &'a GithubClient, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        PullRequestsHandler {
            client,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    /// First page of open pull requests.
    pub async fn open(&self) -> Result<Vec<PullRequest>, Error> {
        self.client
            .get_open_pull_requests(&self.owner, &self.repo)
            .await
    }
}
