use std::{path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{
    Res,
    config::Settings,
    debug,
    spotify::{
        auth::{CredentialProvider, request_access_token},
        transport::Transport,
    },
    types::Credential,
    warning,
};

/// The credential held for the current run.
///
/// A credential issued with a lifetime shorter than the safety margin is stale from the
/// start. It is kept until it actually expires instead of triggering an exchange per call.
struct CachedCredential {
    credential: Credential,
    short_lived: bool,
}

impl CachedCredential {
    fn new(credential: Credential) -> Self {
        let short_lived = credential.is_stale();
        if short_lived {
            warning!(
                "Access token expires at {}, inside the refresh safety margin. Using it until it expires.",
                credential.expires_at.to_rfc3339()
            );
        }
        Self {
            credential,
            short_lived,
        }
    }

    fn is_usable(&self) -> bool {
        if self.short_lived {
            !self.credential.is_expired()
        } else {
            !self.credential.is_stale()
        }
    }
}

/// Owns the bearer credential: persists it, reuses it while fresh, replaces it when stale.
pub struct TokenManager {
    transport: Arc<dyn Transport>,
    token_path: PathBuf,
    token_url: String,
    client_id: String,
    client_secret: String,
    credential: Mutex<Option<CachedCredential>>,
}

impl TokenManager {
    pub fn new(settings: &Settings, transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            token_path: settings.token_path(),
            token_url: settings.token_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            credential: Mutex::new(None),
        }
    }

    /// Reads the persisted credential. An absent or unreadable store yields `None`.
    pub async fn load(&self) -> Option<Credential> {
        let content = async_fs::read_to_string(&self.token_path).await.ok()?;
        match serde_json::from_str::<Credential>(&content) {
            Ok(credential) => Some(credential),
            Err(e) => {
                warning!(
                    "Ignoring unreadable token store {}: {}",
                    self.token_path.display(),
                    e
                );
                None
            }
        }
    }

    /// Overwrites the credential store with `credential`.
    pub async fn persist(&self, credential: &Credential) -> Res<()> {
        if let Some(parent) = self.token_path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(credential)?;
        async_fs::write(&self.token_path, json).await?;
        Ok(())
    }

    /// Returns the persisted credential when it is still fresh, otherwise exchanges and
    /// persists a new one.
    pub async fn get_credential(&self) -> Res<Credential> {
        if let Some(credential) = self.load().await {
            if !credential.is_stale() {
                debug!("Reusing stored access token expiring at {}", credential.expires_at);
                return Ok(credential);
            }
        }

        self.exchange().await
    }

    async fn exchange(&self) -> Res<Credential> {
        let credential = request_access_token(
            self.transport.as_ref(),
            &self.token_url,
            &self.client_id,
            &self.client_secret,
        )
        .await?;
        self.persist(&credential).await?;
        Ok(credential)
    }

    pub fn token_path(&self) -> &PathBuf {
        &self.token_path
    }
}

#[async_trait]
impl CredentialProvider for TokenManager {
    async fn current(&self) -> Res<Credential> {
        let mut slot = self.credential.lock().await;
        match slot.as_ref() {
            Some(cached) if cached.is_usable() => Ok(cached.credential.clone()),
            _ => {
                let credential = self.get_credential().await?;
                *slot = Some(CachedCredential::new(credential.clone()));
                Ok(credential)
            }
        }
    }

    async fn refresh(&self) -> Res<Credential> {
        let mut slot = self.credential.lock().await;
        let credential = self.exchange().await?;
        *slot = Some(CachedCredential::new(credential.clone()));
        Ok(credential)
    }
}
