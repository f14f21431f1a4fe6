use std::sync::Arc;

use crate::{
    Res,
    config::Settings,
    management::TokenManager,
    spotify::transport::ReqwestTransport,
    success,
    types::Credential,
};

/// Obtains a credential (reusing the stored one while it is fresh) and reports its expiry.
pub async fn auth(settings: &Settings) -> Res<Credential> {
    let token_mgr = TokenManager::new(settings, Arc::new(ReqwestTransport::new()));
    let credential = token_mgr.get_credential().await?;

    success!(
        "Access token valid until {} (stored at {}).",
        credential.expires_at.to_rfc3339(),
        token_mgr.token_path().display()
    );
    Ok(credential)
}
