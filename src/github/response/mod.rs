mod check_runs_response;
mod pull_request_response;

pub use check_runs_response::{CheckRun, CheckRuns};
pub use pull_request_response::{Head, PullRequest};
