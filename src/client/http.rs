use reqwest::blocking::{Client, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;

use super::backend::{ClientError, GameBackend};
use crate::snapshot::{ActionIndex, ActionReply, Snapshot};

#[derive(Debug, Serialize)]
struct ActionRequest {
    index: ActionIndex,
}

// Thin blocking reqwest client for the game server endpoints. The cookie
// store keeps the server-side session id between calls.
pub struct HttpBackend {
    http: Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ClientError> {
        let http = Client::builder()
            .timeout(timeout)
            .cookie_store(true)
            .build()
            .map_err(ClientError::Transport)?;
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Ok(Self { http, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn post_empty(&self, path: &str) -> Result<ActionReply, ClientError> {
        let res = self
            .http
            .post(self.url(path))
            .send()
            .map_err(ClientError::Transport)?;
        decode(res)
    }
}

fn decode<T: DeserializeOwned>(res: Response) -> Result<T, ClientError> {
    let status = res.status();
    if !status.is_success() {
        return Err(ClientError::Upstream { status });
    }
    let body = res.bytes().map_err(ClientError::Transport)?;
    Ok(serde_json::from_slice(&body)?)
}

impl GameBackend for HttpBackend {
    fn fetch_state(&self) -> Result<Snapshot, ClientError> {
        let res = self
            .http
            .get(self.url("/getState"))
            .send()
            .map_err(ClientError::Transport)?;
        decode(res)
    }

    fn button_action(&self, index: ActionIndex) -> Result<ActionReply, ClientError> {
        let res = self
            .http
            .post(self.url("/buttonAction"))
            .json(&ActionRequest { index })
            .send()
            .map_err(ClientError::Transport)?;
        decode(res)
    }

    fn start_over(&self) -> Result<ActionReply, ClientError> {
        self.post_empty("/startOver")
    }

    fn exit_game(&self) -> Result<ActionReply, ClientError> {
        self.post_empty("/exitGame")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trailing_slash_is_trimmed() {
        let backend = HttpBackend::new("http://127.0.0.1:5000/", Duration::from_secs(1)).unwrap();
        assert_eq!(backend.base_url(), "http://127.0.0.1:5000");
        assert_eq!(backend.url("/getState"), "http://127.0.0.1:5000/getState");
    }

    #[test]
    fn action_request_body_is_a_bare_index() {
        let body = serde_json::to_string(&ActionRequest {
            index: ActionIndex::ALL[2],
        })
        .unwrap();
        assert_eq!(body, r#"{"index":2}"#);
    }
}
