use crate::http::{Error, HttpClient, ResponseHandler};
use reqwest::header::HeaderValue;
use std::fmt::Display;

const PRIORITY: &str = "high";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Success,
    Failure,
}

impl Tag {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tag::Success => "tada",
            Tag::Failure => "x",
        }
    }
}

impl Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub title: String,
    pub message: String,
    pub tag: Tag,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, tag: Tag) -> Self {
        Notification {
            title: title.into(),
            message: message.into(),
            tag,
        }
    }
}

/// Publishes messages to an ntfy topic. One attempt per message, no retries.
#[derive(Clone, Debug)]
pub struct Notifier {
    http: HttpClient,
    endpoint: String,
}

impl Notifier {
    pub fn new(http: HttpClient, server: &str, topic: &str) -> Self {
        let endpoint = format!("{}/{}", server.trim_end_matches('/'), topic);

        Notifier { http, endpoint }
    }

    #[cfg(test)]
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub async fn send(&self, notification: &Notification) -> Result<(), Error> {
        // raw bytes so that non-ASCII pull request titles survive
        let title = HeaderValue::from_bytes(notification.title.as_bytes()).map_err(|_| {
            Error::InvalidHeaderError {
                name: "Title".to_owned(),
            }
        })?;

        self.http
            .post(&self.endpoint)
            .header("Title", title)
            .header("Priority", PRIORITY)
            .header("Tags", notification.tag.as_str())
            .body(notification.message.to_owned())
            .send()
            .await
            .handle()
            .await?;

        Ok(())
    }
}
