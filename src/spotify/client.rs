use std::{sync::Arc, time::Duration};

use reqwest::StatusCode;
use serde_json::Value;
use tokio::{
    sync::Mutex,
    time::{Instant, sleep},
};

use crate::{
    Res,
    config::Settings,
    debug, info,
    spotify::{
        auth::CredentialProvider,
        endpoints::Endpoint,
        transport::{RawResponse, Transport},
    },
    warning,
};

/// Seconds to wait on a 429 that carries no usable `Retry-After` header.
pub const DEFAULT_RETRY_AFTER_SECS: u64 = 1;

/// Global pacing: successive calls start at least `min_interval` apart.
#[derive(Debug)]
pub struct Pacer {
    min_interval: Duration,
    last_call: Mutex<Option<Instant>>,
}

impl Pacer {
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_call: Mutex::new(None),
        }
    }

    pub async fn wait(&self) {
        let mut last = self.last_call.lock().await;
        if let Some(last_time) = *last {
            let elapsed = last_time.elapsed();
            if elapsed < self.min_interval {
                sleep(self.min_interval - elapsed).await;
            }
        }
        *last = Some(Instant::now());
    }
}

/// How a single attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum CallOutcome {
    Success(Value),
    RateLimited(u64),
    AuthExpired,
    Rejected(StatusCode),
    Exhausted,
}

impl CallOutcome {
    /// Classifies one response. A 200 whose body is not JSON counts as rejected.
    pub fn classify(response: &RawResponse) -> Self {
        match response.status {
            StatusCode::OK => match serde_json::from_str::<Value>(&response.body) {
                Ok(body) => CallOutcome::Success(body),
                Err(_) => CallOutcome::Rejected(response.status),
            },
            StatusCode::TOO_MANY_REQUESTS => CallOutcome::RateLimited(
                response.retry_after.unwrap_or(DEFAULT_RETRY_AFTER_SECS),
            ),
            StatusCode::UNAUTHORIZED => CallOutcome::AuthExpired,
            status => CallOutcome::Rejected(status),
        }
    }
}

/// Issues paced, authenticated GET requests and absorbs recoverable failures.
///
/// | status | action |
/// |---|---|
/// | 200 | body returned |
/// | 429 | sleep `Retry-After` seconds (default 1), retry |
/// | 401 | refresh the credential, retry |
/// | 403, 404, other | warning, no data |
///
/// Retries for 429 and 401 share one budget of `max_retries`; once it is spent the call
/// gives up with no data.
pub struct EndpointCaller {
    transport: Arc<dyn Transport>,
    credentials: Arc<dyn CredentialProvider>,
    api_url: String,
    pacer: Pacer,
    max_retries: u32,
}

impl EndpointCaller {
    pub fn new(
        settings: &Settings,
        transport: Arc<dyn Transport>,
        credentials: Arc<dyn CredentialProvider>,
    ) -> Self {
        Self {
            transport,
            credentials,
            api_url: settings.api_url.clone(),
            pacer: Pacer::new(settings.pacing),
            max_retries: settings.max_retries,
        }
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn credentials(&self) -> &Arc<dyn CredentialProvider> {
        &self.credentials
    }

    /// Calls `endpoint` for a payload of one or more comma-joined ids.
    ///
    /// Returns `Ok(None)` when the request was rejected or retries ran out. Only network
    /// failures and failed credential refreshes are errors.
    pub async fn call(&self, endpoint: Endpoint, ids: &str) -> Res<Option<Value>> {
        let url = endpoint.url(&self.api_url, ids);
        self.call_url(endpoint, ids, &url).await
    }

    /// Like [`call`](Self::call) but against a complete URL, e.g. a `next` page link.
    pub async fn call_url(&self, endpoint: Endpoint, ids: &str, url: &str) -> Res<Option<Value>> {
        let mut attempt: u32 = 0;

        loop {
            let outcome = if attempt > self.max_retries {
                CallOutcome::Exhausted
            } else {
                self.pacer.wait().await;
                let credential = self.credentials.current().await?;
                debug!("GET {} (attempt {})", url, attempt);
                let response = self.transport.get(url, &credential.access_token).await?;
                CallOutcome::classify(&response)
            };

            match outcome {
                CallOutcome::Success(body) => return Ok(Some(body)),
                CallOutcome::RateLimited(retry_after) => {
                    info!(
                        "Rate limit exceeded. Retrying after {} seconds.",
                        retry_after
                    );
                    sleep(Duration::from_secs(retry_after)).await;
                }
                CallOutcome::AuthExpired => {
                    debug!("Access token rejected by {}, refreshing", endpoint);
                    self.credentials.refresh().await?;
                }
                CallOutcome::Rejected(status) => {
                    Self::report_rejection(endpoint, ids, status);
                    return Ok(None);
                }
                CallOutcome::Exhausted => {
                    warning!(
                        "Maximum API call attempt limit reached for {} with id {}.",
                        endpoint,
                        ids
                    );
                    return Ok(None);
                }
            }

            attempt += 1;
        }
    }

    fn report_rejection(endpoint: Endpoint, ids: &str, status: StatusCode) {
        match status {
            StatusCode::FORBIDDEN => warning!(
                "Access forbidden attempting to fetch from endpoint {} for id {}. Check permissions and scope of access token.",
                endpoint,
                ids
            ),
            StatusCode::NOT_FOUND => warning!(
                "Entity not found accessing {} for id {}. Recheck URL and ID.",
                endpoint,
                ids
            ),
            StatusCode::OK => warning!(
                "Unreadable response body from {} for id {}.",
                endpoint,
                ids
            ),
            other => warning!(
                "Failed to access {} for id {} due to unhandled response: {}",
                endpoint,
                ids,
                other
            ),
        }
    }
}
