//! Integration test utilities and helpers
//!
//! This module provides common test infrastructure for tgsign integration
//! tests: a mock signing server and on-disk fixtures.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path the mock signing service listens on
pub const PATH_SIGN: &str = "/sign";

/// Mock signing server builder for integration tests
pub struct MockSignServer {
    server: MockServer,
}

impl MockSignServer {
    /// Create a new mock signing server
    pub async fn start() -> Self {
        let server = MockServer::start().await;
        Self { server }
    }

    /// Full signing endpoint URL
    pub fn sign_url(&self) -> url::Url {
        url::Url::parse(&format!("{}{}", self.server.uri(), PATH_SIGN)).expect("valid mock URL")
    }

    /// Mock a successful signing response
    pub async fn mock_sign_success(&self, certificate: &str) {
        self.mock_sign_json(200, json!([{ "public_cert": certificate }]))
            .await;
    }

    /// Mock a signing error payload
    pub async fn mock_sign_error(&self, message: &str, code: i64) {
        self.mock_sign_json(200, json!([{ "error": message, "code": code }]))
            .await;
    }

    /// Mock an arbitrary JSON answer
    pub async fn mock_sign_json(&self, status: u16, body: serde_json::Value) {
        Mock::given(method("POST"))
            .and(path(PATH_SIGN))
            .respond_with(ResponseTemplate::new(status).set_body_json(body))
            .mount(&self.server)
            .await;
    }

    /// Mock a raw text answer
    pub async fn mock_sign_raw(&self, status: u16, body: &str) {
        Mock::given(method("POST"))
            .and(path(PATH_SIGN))
            .respond_with(
                ResponseTemplate::new(status)
                    .set_body_string(body)
                    .insert_header("Content-Type", "text/plain"),
            )
            .mount(&self.server)
            .await;
    }

    /// Decoded form bodies of every request received so far
    pub async fn received_forms(&self) -> Vec<HashMap<String, String>> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .map(|request| {
                url::form_urlencoded::parse(&request.body)
                    .into_owned()
                    .collect()
            })
            .collect()
    }

    /// Content-Type headers of every request received so far
    pub async fn received_content_types(&self) -> Vec<String> {
        self.server
            .received_requests()
            .await
            .unwrap_or_default()
            .iter()
            .filter_map(|request| {
                request
                    .headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string)
            })
            .collect()
    }
}

/// Test fixture helpers
pub mod fixtures {
    use super::*;

    /// API secret used by every fixture config
    pub const SECRET: &str = "s3cr3t-never-logged";

    /// A plausible OpenSSH public key line
    pub const PUBLIC_KEY: &str =
        "ssh-ed25519 AAAAC3NzaC1lZDI1NTE5AAAAIGb1lR1vX2kQ4t3j8J0a0m9X6yqf8rWc5nQm alice@host";

    /// Write `content` as `id_ed25519.pub` in `dir`
    pub fn write_key(dir: &Path, content: &str) -> PathBuf {
        let key = dir.join("id_ed25519.pub");
        std::fs::write(&key, content).expect("write key");
        key
    }

    /// Write a `[tgsign]` config pointing at `key` in `dir`
    pub fn write_config(dir: &Path, key: &Path, username: Option<&str>) -> PathBuf {
        let mut content = format!(
            "[tgsign]\napi_id = ops-team\napi_secret = {SECRET}\npublic_key_file = {}\n",
            key.display()
        );
        if let Some(username) = username {
            content.push_str(&format!("username = {username}\n"));
        }

        let config = dir.join(".tgsign.conf");
        std::fs::write(&config, content).expect("write config");
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_server_starts() {
        let mock_server = MockSignServer::start().await;
        assert_eq!(mock_server.sign_url().scheme(), "http");
        assert_eq!(mock_server.sign_url().path(), PATH_SIGN);
        assert!(mock_server.received_forms().await.is_empty());
    }
}
