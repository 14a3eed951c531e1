//! # Messaging Collaborator Client
//!
//! Fire-and-forget HTTP client for the downstream email-delivery service.
//! Dispatch happens after the durable state change has already committed —
//! a transient messaging outage must never roll back a signup, password
//! reset, or verification resend.
//!
//! Failures are logged at `warn!` and swallowed; callers get `Ok(())` even
//! when the send failed, since the caller has nothing useful to do with a
//! dispatch failure other than "the user can request resend".

use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::warn;

use shared::config::MessagingConfig;

/// Client for the downstream email-delivery collaborator.
#[derive(Clone)]
pub struct MessagingClient {
    http: Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
struct SendEmailRequest<'a> {
    to: &'a str,
    template: &'a str,
    data: serde_json::Value,
}

impl MessagingClient {
    /// Builds a client from configuration, applying the configured
    /// per-request timeout to every outbound call.
    pub fn new(config: &MessagingConfig) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_millis(config.timeout_ms))
            .build()
            .expect("failed to build messaging HTTP client");

        Self {
            http,
            base_url: config.base_url.clone(),
        }
    }

    /// Sends a contact-verification email carrying the verification link
    /// token (§4.5.3 step 5).
    pub async fn send_confirmation_email(&self, to: &str, token: &str) {
        self.dispatch(
            "confirmation",
            to,
            serde_json::json!({ "token": token }),
        )
        .await;
    }

    /// Sends a password-reset email carrying the reset link token
    /// (§4.6.1).
    pub async fn send_reset_email(&self, to: &str, token: &str) {
        self.dispatch(
            "password-reset",
            to,
            serde_json::json!({ "token": token }),
        )
        .await;
    }

    async fn dispatch(&self, template: &str, to: &str, data: serde_json::Value) {
        let body = SendEmailRequest { to, template, data };

        let result = self
            .http
            .post(format!("{}/v1/send", self.base_url))
            .json(&body)
            .send()
            .await;

        match result {
            Ok(response) if response.status().is_success() => {}
            Ok(response) => {
                warn!(
                    status = %response.status(),
                    %template,
                    "messaging collaborator returned a non-success status"
                );
            }
            Err(error) => {
                warn!(%error, %template, "messaging collaborator dispatch failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config(base_url: String) -> MessagingConfig {
        MessagingConfig {
            base_url,
            timeout_ms: 2_000,
        }
    }

    #[tokio::test]
    async fn test_send_confirmation_email_hits_expected_endpoint() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let client = MessagingClient::new(&config(server.uri()));
        client.send_confirmation_email("user@example.com", "tok-123").await;
    }

    #[tokio::test]
    async fn test_dispatch_swallows_non_success_status() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/send"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let client = MessagingClient::new(&config(server.uri()));
        // Must not panic or propagate an error.
        client.send_reset_email("user@example.com", "tok-456").await;
    }

    #[tokio::test]
    async fn test_dispatch_swallows_unreachable_server() {
        let client = MessagingClient::new(&config("http://127.0.0.1:1".to_string()));
        client.send_confirmation_email("user@example.com", "tok-789").await;
    }
}
