// SPDX-License-Identifier: Apache-2.0
// Copyright 2025 U.S. Federal Government (in countries where recognized)
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Integration tests for the signing client

use crate::integration::{MockSignServer, fixtures};
use serde_json::json;
use std::sync::Arc;
use tgsign::logging::{LogLevel, MemoryLogger};
use tgsign::{SignRequest, SignResult, SigningClient, TgSignError};

fn client(mock: &MockSignServer, logger: &Arc<MemoryLogger>) -> SigningClient {
    SigningClient::with_url(mock.sign_url(), logger.clone()).expect("Client creation failed")
}

fn request() -> SignRequest {
    SignRequest::new("ops-team", fixtures::SECRET, fixtures::PUBLIC_KEY)
}

#[tokio::test]
async fn test_successful_signing() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_success("X").await;
    let logger = Arc::new(MemoryLogger::new());

    let result = client(&mock, &logger).sign(&request()).await;

    assert!(result.is_ok(), "sign failed: {:?}", result.err());
    assert_eq!(
        result.unwrap(),
        SignResult::Success {
            certificate: "X".to_string()
        }
    );
}

#[tokio::test]
async fn test_request_is_form_encoded() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_success("X").await;
    let logger = Arc::new(MemoryLogger::new());

    client(&mock, &logger).sign(&request()).await.unwrap();

    let content_types = mock.received_content_types().await;
    assert_eq!(content_types, vec!["application/x-www-form-urlencoded"]);

    let forms = mock.received_forms().await;
    assert_eq!(forms.len(), 1, "exactly one request, no retries");
    let form = &forms[0];
    assert_eq!(form["api_id"], "ops-team");
    assert_eq!(form["api_secret"], fixtures::SECRET);
    assert_eq!(form["public_key"], fixtures::PUBLIC_KEY);
    assert!(!form.contains_key("username"));
}

#[tokio::test]
async fn test_username_sent_when_present() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_success("X").await;
    let logger = Arc::new(MemoryLogger::new());

    let request = request().with_username(Some("alice"));
    client(&mock, &logger).sign(&request).await.unwrap();

    let forms = mock.received_forms().await;
    assert_eq!(forms[0].get("username").map(String::as_str), Some("alice"));
}

#[tokio::test]
async fn test_empty_username_not_sent() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_success("X").await;
    let logger = Arc::new(MemoryLogger::new());

    let request = request().with_username(Some(""));
    client(&mock, &logger).sign(&request).await.unwrap();

    let forms = mock.received_forms().await;
    assert!(!forms[0].contains_key("username"));
}

#[tokio::test]
async fn test_error_payload() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_error("Invalid API credentials", 401).await;
    let logger = Arc::new(MemoryLogger::new());

    let request = request().with_username(Some("alice"));
    let result = client(&mock, &logger).sign(&request).await.unwrap();

    assert_eq!(
        result,
        SignResult::Error {
            code: Some(401),
            message: "Invalid API credentials".to_string()
        }
    );
    assert!(result.certificate().is_none());

    // Error is logged with identifiers but without the secret
    let entries = logger.entries();
    let error = entries
        .iter()
        .find(|e| e.level == LogLevel::Error)
        .expect("error logged");
    assert!(error.message.contains("ops-team"));
    assert!(error.message.contains("alice"));
    assert!(error.message.contains("Invalid API credentials"));
    assert!(!logger.contains(fixtures::SECRET));
}

#[tokio::test]
async fn test_sign_certificate_rejection() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_error("Key type not allowed", 400).await;
    let logger = Arc::new(MemoryLogger::new());

    let err = client(&mock, &logger)
        .sign_certificate(&request())
        .await
        .unwrap_err();

    match err {
        TgSignError::SignRejected { code, message } => {
            assert_eq!(code, Some(400));
            assert_eq!(message, "Key type not allowed");
        }
        other => panic!("Expected SignRejected, got {other:?}"),
    }
}

#[tokio::test]
async fn test_error_wins_when_both_keys_present() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_json(200, json!([{ "error": "revoked", "public_cert": "X" }]))
        .await;
    let logger = Arc::new(MemoryLogger::new());

    let result = client(&mock, &logger).sign(&request()).await.unwrap();

    assert!(result.is_error());
}

#[tokio::test]
async fn test_response_not_an_array() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_json(200, json!({ "public_cert": "X" })).await;
    let logger = Arc::new(MemoryLogger::new());

    let err = client(&mock, &logger).sign(&request()).await.unwrap_err();

    assert!(matches!(err, TgSignError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn test_response_missing_certificate() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_json(200, json!([{ "status": "ok" }])).await;
    let logger = Arc::new(MemoryLogger::new());

    let err = client(&mock, &logger).sign(&request()).await.unwrap_err();

    assert!(matches!(err, TgSignError::UnexpectedResponse(_)));
    assert!(err.to_string().contains("neither"));
}

#[tokio::test]
async fn test_error_payload_with_error_status() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_json(403, json!([{ "error": "Forbidden", "code": 403 }]))
        .await;
    let logger = Arc::new(MemoryLogger::new());

    let result = client(&mock, &logger).sign(&request()).await.unwrap();

    assert!(result.is_error());
}

#[tokio::test]
async fn test_server_error_without_json() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_raw(502, "Bad Gateway").await;
    let logger = Arc::new(MemoryLogger::new());

    let err = client(&mock, &logger).sign(&request()).await.unwrap_err();

    match err {
        TgSignError::ServerError { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Bad Gateway");
        }
        other => panic!("Expected ServerError, got {other:?}"),
    }
}

#[tokio::test]
async fn test_success_status_without_json() {
    let mock = MockSignServer::start().await;
    mock.mock_sign_raw(200, "<html>maintenance</html>").await;
    let logger = Arc::new(MemoryLogger::new());

    let err = client(&mock, &logger).sign(&request()).await.unwrap_err();

    assert!(matches!(err, TgSignError::UnexpectedResponse(_)));
}

#[tokio::test]
async fn test_connection_refused_is_http_error() {
    // Reserve a port, then close it so nothing is listening there
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    let url = url::Url::parse(&format!("http://127.0.0.1:{port}/sign")).unwrap();

    let logger = Arc::new(MemoryLogger::new());
    let client = SigningClient::with_url(url, logger).unwrap();
    let err = client.sign(&request()).await.unwrap_err();

    assert!(matches!(err, TgSignError::Http(_)));
    assert_eq!(err.exit_code(), tgsign::error::exit_codes::SIGNING);
}
