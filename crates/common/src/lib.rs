use thiserror::Error;

pub mod types;
pub mod utils;
pub mod env;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("network error: {0}")]
    Network(String),
    #[error("parse error: {0}")]
    Parse(String),
}

pub mod intake {
    use super::*;

    /// Submit a user payload to a running intake service and return the
    /// response body. Non-2xx responses are reported as network errors with
    /// the status and body attached.
    pub async fn submit_user(
        base_url: &str,
        user: &serde_json::Value,
    ) -> Result<serde_json::Value, CoreError> {
        let url = format!("{base_url}/receive_user");
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()
            .map_err(|e| CoreError::Network(e.to_string()))?;
        let resp = client
            .post(&url)
            .json(user)
            .send()
            .await
            .map_err(|e| CoreError::Network(e.to_string()))?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(CoreError::Network(format!(
                "unexpected status {status}: {body}"
            )));
        }
        resp.json::<serde_json::Value>()
            .await
            .map_err(|e| CoreError::Parse(e.to_string()))
    }
}
