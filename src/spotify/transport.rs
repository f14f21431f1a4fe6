use async_trait::async_trait;
use reqwest::{Client, StatusCode, header::RETRY_AFTER};

use crate::Res;

/// A response reduced to what the pipeline inspects.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    /// Parsed `Retry-After` header in seconds, if present and numeric.
    pub retry_after: Option<u64>,
    pub body: String,
}

impl RawResponse {
    pub fn new(status: StatusCode, body: impl Into<String>) -> Self {
        Self {
            status,
            retry_after: None,
            body: body.into(),
        }
    }

    pub fn with_retry_after(mut self, seconds: u64) -> Self {
        self.retry_after = Some(seconds);
        self
    }
}

/// The HTTP seam between the pipeline and the network.
///
/// Network failures are the only errors an implementation returns; every HTTP status,
/// including 4xx and 5xx, comes back as a [`RawResponse`].
#[async_trait]
pub trait Transport: Send + Sync {
    async fn get(&self, url: &str, bearer: &str) -> Res<RawResponse>;

    async fn post_form(
        &self,
        url: &str,
        authorization: &str,
        form: &[(&str, &str)],
    ) -> Res<RawResponse>;
}

#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: Client::new(),
        }
    }

    async fn into_raw(response: reqwest::Response) -> Res<RawResponse> {
        let status = response.status();
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.trim().parse::<u64>().ok());
        let body = response.text().await?;

        Ok(RawResponse {
            status,
            retry_after,
            body,
        })
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn get(&self, url: &str, bearer: &str) -> Res<RawResponse> {
        let response = self.client.get(url).bearer_auth(bearer).send().await?;
        Self::into_raw(response).await
    }

    async fn post_form(
        &self,
        url: &str,
        authorization: &str,
        form: &[(&str, &str)],
    ) -> Res<RawResponse> {
        let response = self
            .client
            .post(url)
            .header(reqwest::header::AUTHORIZATION, authorization)
            .form(form)
            .send()
            .await?;
        Self::into_raw(response).await
    }
}
