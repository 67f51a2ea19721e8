//! HTTP client for outbound webhook calls

use crate::config::HttpConfig;
use anyhow::{Context, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE, USER_AGENT};
use reqwest::{Client, Response};
use std::time::Duration;

#[derive(Clone)]
pub struct HttpClient {
    inner: Client,
}

impl HttpClient {
    pub fn new(cfg: &HttpConfig) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            USER_AGENT,
            HeaderValue::from_str(&cfg.user_agent).context("Invalid user agent")?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/json, text/plain, */*"),
        );

        let mut builder = Client::builder().default_headers(headers);

        // Without these the transport defaults apply (no request timeout)
        if let Some(secs) = cfg.timeout {
            builder = builder.timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = cfg.connect_timeout {
            builder = builder.connect_timeout(Duration::from_secs(secs));
        }

        let client = builder.build().context("Failed to build HTTP client")?;
        Ok(Self { inner: client })
    }

    /// Single POST with a JSON body. No retries: a failed submission is
    /// retried by the user resubmitting the form.
    pub async fn post_json<T: serde::Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> reqwest::Result<Response> {
        self.inner
            .post(url)
            .header(CONTENT_TYPE, "application/json")
            .json(body)
            .send()
            .await
    }
}
