//! Webhook gateway: posts the lead JSON to an externally owned workflow URL

use crate::gateway::{SubmissionError, SubmissionGateway};
use crate::http::HttpClient;
use crate::models::SubmissionPayload;
use async_trait::async_trait;

/// Delivers leads with one JSON POST per attempt
pub struct WebhookGateway {
    client: HttpClient,
    endpoint: reqwest::Url,
}

impl WebhookGateway {
    /// `endpoint` is posted to as-is, query string included
    pub fn new(client: HttpClient, endpoint: reqwest::Url) -> Self {
        Self { client, endpoint }
    }
}

#[async_trait]
impl SubmissionGateway for WebhookGateway {
    fn name(&self) -> &str {
        "webhook"
    }

    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionError> {
        // The query string may carry a signature, so only the host is logged
        tracing::info!(
            "Posting lead to {}",
            self.endpoint.host_str().unwrap_or("<no host>")
        );

        let resp = self
            .client
            .post_json(self.endpoint.as_str(), payload)
            .await
            .map_err(|e| {
                let message = transport_message(e);
                tracing::error!("Form submission error: {}", message);
                SubmissionError::Network(message)
            })?;

        let status = resp.status();
        if status.is_success() {
            tracing::info!("   -> Accepted ({})", status);
            return Ok(());
        }

        let body = resp.text().await.unwrap_or_default();
        tracing::error!(
            "Form submission failed: {}, body: '{}'",
            status,
            body.chars().take(200).collect::<String>()
        );
        Err(SubmissionError::Http {
            status: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or_default().to_string(),
        })
    }
}

/// Error text with its cause chain. The URL is stripped because its query
/// string carries the workflow signature.
fn transport_message(e: reqwest::Error) -> String {
    format!("{:#}", anyhow::Error::from(e.without_url()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpConfig;
    use crate::models::LeadFormState;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn payload() -> SubmissionPayload {
        let mut state = LeadFormState::new();
        state.name = "Jane Doe".into();
        state.email = "jane@example.com".into();
        state.phone = "5551234567".into();
        state.agreed_to_terms = true;
        state.to_payload()
    }

    fn gateway(url: &str) -> WebhookGateway {
        let client = HttpClient::new(&HttpConfig::default()).unwrap();
        WebhookGateway::new(client, reqwest::Url::parse(url).unwrap())
    }

    #[tokio::test]
    async fn test_posts_json_and_accepts_2xx() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/lead"))
            .and(header("content-type", "application/json"))
            .and(body_json(serde_json::to_value(payload()).unwrap()))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&format!("{}/lead", server.uri()));
        assert_eq!(gw.submit(&payload()).await, Ok(()));
    }

    #[tokio::test]
    async fn test_non_2xx_is_http_error_without_retry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(1)
            .mount(&server)
            .await;

        let gw = gateway(&server.uri());
        assert_eq!(
            gw.submit(&payload()).await,
            Err(SubmissionError::Http {
                status: 500,
                status_text: "Internal Server Error".into(),
            })
        );
    }

    #[tokio::test]
    async fn test_nonstandard_status_has_no_reason() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(599))
            .mount(&server)
            .await;

        let err = gateway(&server.uri()).submit(&payload()).await.unwrap_err();
        assert_eq!(
            err,
            SubmissionError::Http {
                status: 599,
                status_text: String::new(),
            }
        );
        assert_eq!(err.to_string(), "Server Error: 599");
    }

    #[tokio::test]
    async fn test_network_error_hides_signature_and_names_cause() {
        let gw = gateway("http://127.0.0.1:1/lead?sig=SECRET");
        let msg = match gw.submit(&payload()).await {
            Err(SubmissionError::Network(msg)) => msg,
            other => panic!("expected network error, got {:?}", other),
        };

        assert!(!msg.contains("SECRET"), "{}", msg);
        assert!(msg.to_lowercase().contains("connection refused"), "{}", msg);
    }

    #[tokio::test]
    async fn test_connection_refused_is_network_error() {
        // Nothing listens on port 1
        let gw = gateway("http://127.0.0.1:1/lead");
        match gw.submit(&payload()).await {
            Err(SubmissionError::Network(msg)) => assert!(!msg.is_empty()),
            other => panic!("expected network error, got {:?}", other),
        }
    }
}
