use std::{sync::Arc, time::Duration};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::{
    config::Settings,
    error::{CoreError, UpstreamError},
    management::CredentialStore,
    types::{Credential, TokenResponse},
};

/// Exchanges a refresh token for a new access token.
#[async_trait]
pub trait RefreshExchange: Send + Sync {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenResponse, UpstreamError>;
}

/// Lifecycle state of the session credential.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialState {
    Valid,
    Expired,
    RefreshFailed,
}

/// Owns the refresh side of the session credential.
///
/// Expiry is detected lazily by comparing the wall clock with `expires_at`
/// on every call; there is no background timer. At most one refresh exchange
/// is in flight per manager: callers that find the credential stale while a
/// refresh is running wait for it and reuse its result. A refreshed
/// credential is written to the store only after the exchange completed, so
/// an abandoned refresh leaves the stored credential untouched.
pub struct CredentialManager {
    store: Arc<dyn CredentialStore>,
    exchange: Arc<dyn RefreshExchange>,
    leeway: Duration,
    timeout: Duration,
    // Held for the whole exchange. `true` once a refresh failed and the
    // credential was cleared.
    gate: Mutex<bool>,
}

impl CredentialManager {
    /// # Arguments
    ///
    /// * `settings` - Supplies the refresh leeway and the exchange timeout
    /// * `store` - Where the session credential lives
    /// * `exchange` - Token endpoint used for refreshes
    pub fn new(
        settings: &Settings,
        store: Arc<dyn CredentialStore>,
        exchange: Arc<dyn RefreshExchange>,
    ) -> Self {
        CredentialManager {
            store,
            exchange,
            leeway: settings.refresh_leeway,
            timeout: settings.request_timeout,
            gate: Mutex::new(false),
        }
    }

    /// Returns a credential that is valid right now, refreshing it if needed.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotAuthenticated`] when no credential is stored.
    /// - [`CoreError::CredentialRefreshFailed`] when the refresh exchange
    ///   failed. If the upstream rejected it (or was unreachable) the stored
    ///   credential has been cleared and the user must log in again; if it
    ///   only timed out, the stored credential is left as it was. Neither
    ///   case is retried here.
    /// - [`CoreError::Storage`] when the store cannot be read or written.
    pub async fn ensure_valid(&self) -> Result<Credential, CoreError> {
        let current = self
            .store
            .get()
            .await?
            .ok_or(CoreError::NotAuthenticated)?;
        if current.is_valid_at(Utc::now(), self.leeway) {
            return Ok(current);
        }

        debug!(expires_at = %current.expires_at, "Credential expired");
        let leeway = self.leeway;
        self.refresh_if(|c| !c.is_valid_at(Utc::now(), leeway)).await
    }

    /// Refreshes after the upstream rejected `rejected`, unless another caller
    /// already replaced it.
    pub async fn force_refresh(&self, rejected: &Credential) -> Result<Credential, CoreError> {
        self.refresh_if(|c| c.access_token == rejected.access_token).await
    }

    /// Current state without attempting a refresh. `None` when signed out.
    pub async fn state(&self) -> Result<Option<CredentialState>, CoreError> {
        let refresh_failed = *self.gate.lock().await;
        let state = match self.store.get().await? {
            Some(c) if c.is_valid_at(Utc::now(), self.leeway) => Some(CredentialState::Valid),
            Some(_) => Some(CredentialState::Expired),
            None if refresh_failed => Some(CredentialState::RefreshFailed),
            None => None,
        };
        Ok(state)
    }

    /// Stores a freshly acquired credential (after login).
    pub async fn sign_in(&self, credential: &Credential) -> Result<(), CoreError> {
        let mut refresh_failed = self.gate.lock().await;
        self.store.set(credential).await?;
        *refresh_failed = false;
        info!("Credential stored");
        Ok(())
    }

    /// Deletes the stored credential.
    pub async fn logout(&self) -> Result<(), CoreError> {
        let mut refresh_failed = self.gate.lock().await;
        self.store.clear().await?;
        *refresh_failed = false;
        info!("Logged out");
        Ok(())
    }

    async fn refresh_if<F>(&self, stale: F) -> Result<Credential, CoreError>
    where
        F: Fn(&Credential) -> bool,
    {
        let mut refresh_failed = self.gate.lock().await;

        // Re-read under the gate: a refresh may have finished while we waited.
        let current = match self.store.get().await? {
            Some(c) => c,
            None if *refresh_failed => {
                return Err(CoreError::CredentialRefreshFailed(
                    "session was invalidated by an earlier refresh failure".to_string(),
                ));
            }
            None => return Err(CoreError::NotAuthenticated),
        };
        *refresh_failed = false;

        if !stale(&current) {
            debug!("Credential already refreshed by another caller");
            return Ok(current);
        }

        let refresh = self.exchange.refresh(&current.refresh_token);
        let exchanged = match tokio::time::timeout(self.timeout, refresh).await {
            Ok(result) => result.and_then(|response| current.refreshed(response, Utc::now())),
            Err(_) => {
                // Nothing was rejected; the stored credential stays usable.
                warn!(timeout = ?self.timeout, "Credential refresh timed out");
                return Err(CoreError::CredentialRefreshFailed(format!(
                    "refresh timed out after {:?}",
                    self.timeout
                )));
            }
        };

        match exchanged {
            Ok(updated) => {
                self.store.set(&updated).await?;
                info!(expires_at = %updated.expires_at, "Credential refreshed");
                Ok(updated)
            }
            Err(reason) => {
                warn!(error = %reason, "Credential refresh failed, clearing session");
                *refresh_failed = true;
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "Failed to clear credential store");
                }
                Err(CoreError::CredentialRefreshFailed(reason.to_string()))
            }
        }
    }
}
