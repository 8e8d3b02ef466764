//! Contact-message delivery to the form-submission endpoint

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client};
use serde_json::Value;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use crate::state::ContactFields;

/// Delay the simulated endpoint waits before answering
pub const SIMULATED_DELIVERY_DELAY: Duration = Duration::from_millis(1200);

/// Message used when the endpoint rejects a message without saying why
pub const DEFAULT_REJECTION_MESSAGE: &str = "Failed to send";

/// Failure delivering a contact message
#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("Could not reach the form service. Please try again later.")]
    Transport(#[source] reqwest::Error),
    #[error("{message}")]
    Rejected { status: u16, message: String },
    #[error("The form service sent an unexpected response.")]
    MalformedResponse,
    #[error("{0}")]
    Simulated(String),
}

/// Destination for contact messages
#[async_trait]
pub trait SubmissionEndpoint: Send + Sync {
    async fn deliver(&self, fields: &ContactFields) -> Result<(), SubmissionError>;

    /// Whether this endpoint actually leaves the process
    fn is_simulated(&self) -> bool {
        false
    }
}

/// HTTP form endpoint accepting a JSON body (Formspree-compatible)
#[derive(Debug, Clone)]
pub struct HttpFormEndpoint {
    client: Client,
    url: String,
}

impl HttpFormEndpoint {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, SubmissionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(SubmissionError::Transport)?;
        Ok(Self::with_client(client, url))
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl SubmissionEndpoint for HttpFormEndpoint {
    async fn deliver(&self, fields: &ContactFields) -> Result<(), SubmissionError> {
        debug!("Posting contact message to {}", self.url);

        let response = self
            .client
            .post(&self.url)
            .header(header::ACCEPT, "application/json")
            .json(fields)
            .send()
            .await
            .map_err(SubmissionError::Transport)?;

        let status = response.status();
        let body = response.bytes().await.map_err(SubmissionError::Transport)?;
        let data: Option<Value> = serde_json::from_slice(&body).ok();

        if !status.is_success() {
            let message = data
                .as_ref()
                .and_then(|d| d.get("error"))
                .and_then(Value::as_str)
                .filter(|m| !m.trim().is_empty())
                .unwrap_or(DEFAULT_REJECTION_MESSAGE)
                .to_string();
            warn!("Form endpoint rejected message with {}: {}", status, message);
            return Err(SubmissionError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        if data.is_none() {
            warn!("Form endpoint answered {} with a non-JSON body", status);
            return Err(SubmissionError::MalformedResponse);
        }

        info!("Contact message accepted by form endpoint ({})", status);
        Ok(())
    }
}

/// Stand-in used when no endpoint is configured
#[derive(Debug, Clone)]
pub struct SimulatedEndpoint {
    delay: Duration,
    failure: Option<String>,
}

impl SimulatedEndpoint {
    /// Succeed after the standard delay
    pub fn new() -> Self {
        Self {
            delay: SIMULATED_DELIVERY_DELAY,
            failure: None,
        }
    }

    /// Fail after the standard delay with the given message
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            delay: SIMULATED_DELIVERY_DELAY,
            failure: Some(message.into()),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

impl Default for SimulatedEndpoint {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SubmissionEndpoint for SimulatedEndpoint {
    async fn deliver(&self, _fields: &ContactFields) -> Result<(), SubmissionError> {
        sleep(self.delay).await;
        match &self.failure {
            Some(message) => Err(SubmissionError::Simulated(message.clone())),
            None => {
                debug!("Simulated delivery succeeded");
                Ok(())
            }
        }
    }

    fn is_simulated(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::StatusCode, routing::post, Json, Router};
    use serde_json::json;
    use tokio::net::TcpListener;

    fn sample() -> ContactFields {
        ContactFields {
            name: "Ada".into(),
            email: "ada@example.com".into(),
            subject: String::new(),
            message: "Hello there, nice site!".into(),
        }
    }

    async fn spawn_endpoint(router: Router) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let _ = axum::serve(listener, router).await;
        });
        format!("http://{}/f/test", addr)
    }

    #[tokio::test]
    async fn accepted_json_response_is_success() {
        let router = Router::new().route(
            "/f/test",
            post(|Json(body): Json<Value>| async move {
                assert_eq!(body["email"], "ada@example.com");
                Json(json!({ "ok": true }))
            }),
        );
        let url = spawn_endpoint(router).await;
        let endpoint = HttpFormEndpoint::new(url, Duration::from_secs(5)).expect("client");

        endpoint.deliver(&sample()).await.expect("delivered");
    }

    #[tokio::test]
    async fn rejection_surfaces_endpoint_error_text() {
        let router = Router::new().route(
            "/f/test",
            post(|| async {
                (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    Json(json!({ "error": "Form not found" })),
                )
            }),
        );
        let url = spawn_endpoint(router).await;
        let endpoint = HttpFormEndpoint::new(url, Duration::from_secs(5)).expect("client");

        let err = endpoint.deliver(&sample()).await.expect_err("should fail");
        assert!(matches!(err, SubmissionError::Rejected { status: 422, .. }));
        assert_eq!(err.to_string(), "Form not found");
    }

    #[tokio::test]
    async fn rejection_without_body_uses_default_text() {
        let router = Router::new().route("/f/test", post(|| async { StatusCode::BAD_GATEWAY }));
        let url = spawn_endpoint(router).await;
        let endpoint = HttpFormEndpoint::new(url, Duration::from_secs(5)).expect("client");

        let err = endpoint.deliver(&sample()).await.expect_err("should fail");
        assert_eq!(err.to_string(), DEFAULT_REJECTION_MESSAGE);
    }

    #[tokio::test]
    async fn success_with_non_json_body_is_malformed() {
        let router = Router::new().route("/f/test", post(|| async { "thanks!" }));
        let url = spawn_endpoint(router).await;
        let endpoint = HttpFormEndpoint::new(url, Duration::from_secs(5)).expect("client");

        let err = endpoint.deliver(&sample()).await.expect_err("should fail");
        assert!(matches!(err, SubmissionError::MalformedResponse));
    }

    #[tokio::test(start_paused = true)]
    async fn simulated_failure_reports_configured_message() {
        let endpoint = SimulatedEndpoint::failing("offline");
        let err = endpoint.deliver(&sample()).await.expect_err("should fail");
        assert_eq!(err.to_string(), "offline");
        assert!(endpoint.is_simulated());
    }
}
