pub mod github_client;
pub mod handler;
pub mod response;

pub use github_client::GithubClient;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{Error, HttpClient};
    use anyhow::Result;
    use mockito::Server;
    use std::time::Duration;

    fn client(url: &str) -> Result<GithubClient> {
        let http = HttpClient::new(Duration::from_secs(5))?;

        Ok(GithubClient::new(http, url, "test_token"))
    }

    #[tokio::test]
    async fn should_list_open_pull_requests() -> Result<()> {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/octo/repo/pulls")
            .match_header("authorization", "Bearer test_token")
            .with_header("content-type", "application/json")
            .with_body(
                r#"[
                    {"number": 1, "title": "First", "state": "open", "head": {"sha": "aaa"}},
                    {"number": 2, "title": "Second", "state": "open", "head": {"sha": "bbb"}}
                ]"#,
            )
            .create_async()
            .await;

        let client = client(&server.url())?;
        let prs = client.repo("octo", "repo").pull_requests().open().await?;

        mock.assert_async().await;
        assert_eq!(prs.len(), 2);
        assert_eq!(prs[0].number, 1);
        assert_eq!(prs[1].head_sha(), "bbb");

        Ok(())
    }

    #[tokio::test]
    async fn should_get_single_pull_request() -> Result<()> {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/octo/repo/pulls/42")
            .with_body(r#"{"number": 42, "title": "Fix bug", "state": "open", "head": {"sha": "abc1234"}}"#)
            .create_async()
            .await;

        let client = client(&server.url())?;
        let pr = client.repo("octo", "repo").pull_request(42).get().await?;

        mock.assert_async().await;
        assert_eq!(pr.title, "Fix bug");
        assert_eq!(pr.head_sha(), "abc1234");

        Ok(())
    }

    #[tokio::test]
    async fn should_report_deleted_pull_request_as_not_found() -> Result<()> {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/octo/repo/pulls/7")
            .with_status(404)
            .with_body(r#"{"message": "Not Found"}"#)
            .create_async()
            .await;

        let client = client(&server.url())?;
        let result = client.repo("octo", "repo").pull_request(7).get().await;

        mock.assert_async().await;
        assert!(matches!(result, Err(Error::NotFound { .. })));

        Ok(())
    }

    #[tokio::test]
    async fn should_get_check_runs_for_commit() -> Result<()> {
        let mut server = Server::new_async().await;

        let mock = server
            .mock("GET", "/repos/octo/repo/commits/abc1234/check-runs")
            .with_body(
                r#"{"total_count": 1, "check_runs": [
                    {"name": "lint", "status": "completed", "conclusion": "failure"}
                ]}"#,
            )
            .create_async()
            .await;

        let client = client(&server.url())?;
        let runs = client
            .repo("octo", "repo")
            .commit("abc1234")
            .check_runs()
            .await?;

        mock.assert_async().await;
        assert_eq!(runs.total_count, 1);
        assert_eq!(runs.check_runs[0].name, "lint");

        Ok(())
    }

    #[test]
    fn should_trim_trailing_slash_from_base_url() -> Result<()> {
        let client = client("https://ghe.example.com/api/v3/")?;

        assert_eq!(client.base_url(), "https://ghe.example.com/api/v3");

        Ok(())
    }
}
