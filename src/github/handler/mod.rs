pub mod commit_handler;
pub mod pull_request_handler;
pub mod pull_requests_handler;
pub mod repository_handler;
