use serde::Deserialize;

const OPEN_STATE: &str = "open";

#[derive(Debug, Clone, Deserialize)]
pub struct PullRequest {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub head: Head,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Head {
    pub sha: String,
}

impl PullRequest {
    pub fn is_open(&self) -> bool {
        self.state == OPEN_STATE
    }

    pub fn head_sha(&self) -> &str {
        &self.head.sha
    }
}
