use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};

use crate::{
    IngestError, Res, debug,
    spotify::transport::Transport,
    types::{Credential, TokenResponse},
};

/// Shared access to the one bearer credential of a run.
///
/// Any caller may force a refresh; the refreshed credential is what every later
/// `current()` call sees.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Returns a usable credential, acquiring one first if needed.
    async fn current(&self) -> Res<Credential>;

    /// Discards the current credential and performs a fresh exchange.
    async fn refresh(&self) -> Res<Credential>;
}

/// Requests a new access token using the client-credentials grant.
///
/// Sends `grant_type=client_credentials` to the token endpoint, authenticated with HTTP
/// Basic `client_id:client_secret`. The returned credential expires `expires_in` seconds
/// from now.
///
/// # Errors
///
/// - [`IngestError::Http`] when the request cannot be sent
/// - [`IngestError::TokenExchange`] for any non-2xx answer
/// - [`IngestError::Json`] when the answer is not a token payload
///
/// None of these are retried: without a credential no further API call is possible.
pub async fn request_access_token(
    transport: &dyn Transport,
    token_url: &str,
    client_id: &str,
    client_secret: &str,
) -> Res<Credential> {
    let credentials = STANDARD.encode(format!("{client_id}:{client_secret}"));
    let authorization = format!("Basic {credentials}");

    debug!("Requesting access token from {}", token_url);
    let response = transport
        .post_form(
            token_url,
            &authorization,
            &[("grant_type", "client_credentials")],
        )
        .await?;

    if !response.status.is_success() {
        return Err(IngestError::TokenExchange {
            status: response.status,
            body: response.body,
        });
    }

    let token: TokenResponse = serde_json::from_str(&response.body)?;
    Ok(Credential::new(token.access_token, token.expires_in))
}
