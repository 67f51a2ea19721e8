//! Submission gateway abstraction
//!
//! A gateway delivers one lead payload to wherever leads are collected and
//! classifies the outcome. The surface owns every state transition; a
//! gateway only performs the call.

pub mod webhook;

pub use webhook::WebhookGateway;

use crate::models::SubmissionPayload;
use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// The endpoint answered outside the 2xx range
    #[error("Server Error: {status}{}", reason_suffix(.status_text))]
    Http {
        /// Numeric HTTP status
        status: u16,
        /// Canonical reason phrase, empty for non-standard codes
        status_text: String,
    },

    /// The request never completed (DNS, connect, timeout, ...)
    #[error("Network Error: {0}")]
    Network(String),
}

fn reason_suffix(status_text: &str) -> String {
    if status_text.is_empty() {
        String::new()
    } else {
        format!(" {}", status_text)
    }
}

/// Delivers a lead payload
#[async_trait]
pub trait SubmissionGateway: Send + Sync {
    /// Human-readable name used in logs
    fn name(&self) -> &str;

    /// Perform exactly one delivery attempt
    async fn submit(&self, payload: &SubmissionPayload) -> Result<(), SubmissionError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_distinguish_cause() {
        let http = SubmissionError::Http {
            status: 500,
            status_text: "Internal Server Error".into(),
        };
        let net = SubmissionError::Network("connection refused".into());

        assert_eq!(http.to_string(), "Server Error: 500 Internal Server Error");
        assert_eq!(net.to_string(), "Network Error: connection refused");

        let unknown = SubmissionError::Http {
            status: 599,
            status_text: String::new(),
        };
        assert_eq!(unknown.to_string(), "Server Error: 599");
    }
}
