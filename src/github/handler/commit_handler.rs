use crate::{
    github::{github_client::GithubClient, response::CheckRuns},
    http::Error,
};

pub struct CommitHandler<'a> {
    client: &'a GithubClient,
    owner: String,
    repo: String,
    sha: String,
}

impl<'a> CommitHandler<'a> {
    pub fn new(
        client: &'a GithubClient,
        owner: impl Into<String>,
        repo: impl Into<String>,
        sha: impl Into<String>,
    ) -> Self {
        CommitHandler {
            client,
            owner: owner.into(),
            repo: repo.into(),
            sha: sha.into(),
        }
    }

    pub async fn check_runs(&self) -> Result<CheckRuns, Error> {
        self.client
            .get_check_runs(&self.owner, &self.repo, &self.sha)
            .await
    }
}
