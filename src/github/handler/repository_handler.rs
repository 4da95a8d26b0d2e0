use super::{
    commit_handler::CommitHandler, pull_request_handler::PullRequestHandler,
    pull_requests_handler::PullRequestsHandler,
};
use crate::github::github_client::GithubClient;

pub struct RepositoryHandler<'a> {
    client: &'a GithubClient,
    owner: String,
    repo: String,
}

impl<'a> RepositoryHandler<'a> {
    pub fn new(client: &'a GithubClient, owner: impl Into<String>, repo: impl Into<String>) -> Self {
        RepositoryHandler {
            client,
            owner: owner.into(),
            repo: repo.into(),
        }
    }

    pub fn pull_requests(&self) -> PullRequestsHandler<'a> {
        PullRequestsHandler::new(self.client, &self.owner, &self.repo)
    }

    pub fn pull_request(&self, number: u64) -> PullRequestHandler<'a> {
        PullRequestHandler::new(self.client, &self.owner, &self.repo, number)
    }

    pub fn commit(&self, sha: impl Into<String>) -> CommitHandler<'a> {
        CommitHandler::new(self.client, &self.owner, &self.repo, sha)
    }
}
