//! Thin REST client for the channel-scoped API, the calls chat commands
//! translate into

use reqwest::StatusCode;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("transport: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("api returned {status}: {message}")]
    Api { status: StatusCode, message: String },
}

pub struct Client {
    http: reqwest::Client,
    base_url: String,
}

impl Client {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let mut base_url = base_url.into();
        while base_url.ends_with('/') {
            base_url.pop();
        }

        Self { http, base_url }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /crossword`: names of every active channel
    pub async fn active_channels(&self) -> Result<Vec<String>, ClientError> {
        let url = format!("{}/crossword", self.base_url);
        let response = checked(self.http.get(url).send().await?).await?;

        Ok(response.json().await?)
    }

    /// `PUT /crossword/{channel}`: select a dated puzzle from an upstream
    pub async fn select_dated(
        &self,
        channel: &str,
        source_field: &str,
        date: &str,
    ) -> Result<(), ClientError> {
        let url = format!("{}/crossword/{channel}", self.base_url);
        let body = serde_json::json!({ source_field: date });

        checked(self.http.put(url).json(&body).send().await?).await?;
        Ok(())
    }

    /// `PUT /crossword/{channel}/status`: toggle solving/paused
    pub async fn toggle_status(&self, channel: &str) -> Result<(), ClientError> {
        let url = format!("{}/crossword/{channel}/status", self.base_url);

        checked(self.http.put(url).send().await?).await?;
        Ok(())
    }

    /// `PUT /crossword/{channel}/answer/{clue}`: apply an answer
    pub async fn apply_answer(
        &self,
        channel: &str,
        clue: &str,
        answer: &str,
    ) -> Result<(), ClientError> {
        let url = format!("{}/crossword/{channel}/answer/{clue}", self.base_url);

        checked(self.http.put(url).json(&answer).send().await?).await?;
        Ok(())
    }

    /// `GET /crossword/{channel}/show/{clue}`: highlight a clue for everyone
    pub async fn show_clue(&self, channel: &str, clue: &str) -> Result<(), ClientError> {
        let url = format!("{}/crossword/{channel}/show/{clue}", self.base_url);

        checked(self.http.get(url).send().await?).await?;
        Ok(())
    }

    /// `PUT /crossword/{channel}/setting/{name}`: update one setting
    pub async fn update_setting(
        &self,
        channel: &str,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), ClientError> {
        let url = format!("{}/crossword/{channel}/setting/{name}", self.base_url);

        checked(self.http.put(url).json(&value).send().await?).await?;
        Ok(())
    }
}

/// Turn non-2xx responses into [`ClientError::Api`] with the body text
async fn checked(response: reqwest::Response) -> Result<reqwest::Response, ClientError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = response.text().await.unwrap_or_default();
    Err(ClientError::Api { status, message })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_urls_lose_trailing_slashes() {
        let client = Client::new(reqwest::Client::new(), "http://localhost:5000///");
        assert_eq!(client.base_url(), "http://localhost:5000");
    }
}
