use crate::{
    github::{github_client::GithubClient, response::PullRequest},
    http::Error,
};

pub struct PullRequestHandler<'a> {
    client: &'a GithubClient,
    owner: String,
    repo: String,
    number: u64,
}

impl<'a> PullRequestHandler<'a> {
    pub fn new(
        client: &'a GithubClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
        number: u64,
    ) -> Self {
        PullRequestHandler {
            client,
            owner: owner.into(),
            repo: repo.into(),
            number,
        }
    }

    pub async fn get(&self) -> Result<PullRequest, Error> {
        self.client
            .get_pull_request(&self.owner, &self.repo, self.number)
            .await
    }
}
