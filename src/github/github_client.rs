use super::{
    handler::repository_handler::RepositoryHandler,
    response::{CheckRuns, PullRequest},
};
use crate::http::{response, Error, Headers, HttpClient, ResponseHandler};

#[derive(Clone, Debug)]
pub struct GithubClient {
    http: HttpClient,
    base_url: String,
    token: String,
}

impl GithubClient {
    pub fn new(http: HttpClient, base_url: impl Into<String>, token: impl Into<String>) -> Self {
        let base_url: String = base_url.into();

        GithubClient {
            http,
            base_url: base_url.trim_end_matches('/').to_owned(),
            token: token.into(),
        }
    }

    #[cfg(test)]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn repo(&self, owner: impl Into<String>, name: impl Into<String>) -> RepositoryHandler<'_> {
        RepositoryHandler::new(self, owner, name)
    }

    pub(super) async fn get_open_pull_requests(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Vec<PullRequest>, Error> {
        let uri = format!("{}/repos/{}/{}/pulls", self.base_url, owner, repo);

        let body = self.get(&uri).await?;

        response::parse::<Vec<PullRequest>>(&body)
    }

    pub(super) async fn get_pull_request(
        &self,
        owner: &str,
        repo: &str,
        number: u64,
    ) -> Result<PullRequest, Error> {
        let uri = format!(
            "{}/repos/{}/{}/pulls/{}",
            self.base_url, owner, repo, number
        );

        let body = self.get(&uri).await?;

        response::parse::<PullRequest>(&body)
    }

    pub(super) async fn get_check_runs(
        &self,
        owner: &str,
        repo: &str,
        sha: &str,
    ) -> Result<CheckRuns, Error> {
        let uri = format!(
            "{}/repos/{}/{}/commits/{}/check-runs",
            self.base_url, owner, repo, sha
        );

        let body = self.get(&uri).await?;

        response::parse::<CheckRuns>(&body)
    }

    async fn get(&self, uri: &str) -> Result<String, Error> {
        log::debug!("GET {}", uri);

        self.http
            .get(uri)
            .default_headers(&self.token)
            .send()
            .await
            .handle()
            .await
    }
}
