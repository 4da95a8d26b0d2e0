use super::Error;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;

pub trait ResponseHandler {
    async fn handle(self) -> Result<String, Error>;
}

impl ResponseHandler for Result<reqwest::Response, reqwest::Error> {
    async fn handle(self) -> Result<String, Error> {
        let response = self.map_err(|cause| Error::SendRequestError { cause })?;

        let status = response.status();
        let url = response.url().to_string();

        let text = response
            .text()
            .await
            .map_err(|cause| Error::ReadResponseTextError { cause })?;

        if status == StatusCode::NOT_FOUND {
            return Err(Error::NotFound { url });
        }

        if !status.is_success() {
            return Err(Error::GenericResponseError {
                url,
                status: status.as_u16(),
                message: text,
            });
        }

        Ok(text)
    }
}

pub fn parse<T>(body: &str) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    serde_json::from_str::<T>(body).map_err(|cause| Error::ParseResponseError { cause })
}
