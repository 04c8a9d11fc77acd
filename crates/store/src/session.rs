//! Auth session manager.
//!
//! Mirrors the login state into an observable [`Session`] and keeps the
//! token in durable storage. A token restored at startup is trusted until a
//! request made with it fails; it is not checked against the server here.

use crate::storage::TokenStorage;
use crate::store::{Readable, Store};
use hrdesk_client::{ApiClient, AuthApi};
use hrdesk_core::error::{HrdeskError, HrdeskResult};
use hrdesk_core::{Credentials, Session};
use std::sync::Arc;

pub struct AuthSession {
    /// Unauthenticated base client; bearer clients are derived from it.
    client: ApiClient,
    storage: Arc<dyn TokenStorage>,
    state: Store<Session>,
}

impl AuthSession {
    /// Seeds the session from whatever token `storage` holds.
    pub fn new(client: ApiClient, storage: Arc<dyn TokenStorage>) -> Self {
        let token = match storage.load() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!(error = %e, "could not read stored session token; starting logged out");
                None
            }
        };
        tracing::debug!(restored = token.is_some(), "session initialised");

        Self {
            client,
            storage,
            state: Store::new(Session { token, user: None }),
        }
    }

    pub fn state(&self) -> Readable<Session> {
        self.state.readable()
    }

    pub fn token(&self) -> Option<String> {
        self.state.get().token
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.get().is_authenticated()
    }

    /// Client that sends the current token, if any.
    pub fn client(&self) -> ApiClient {
        self.client.with_bearer_token(self.token())
    }

    /// Logs in and, only if everything succeeds, persists the token and then
    /// publishes the new session. On any error neither storage nor state is
    /// touched.
    pub async fn login(&self, email: &str, password: &str) -> HrdeskResult<()> {
        let credentials = Credentials {
            email: email.to_string(),
            password: password.to_string(),
        };
        let resp = AuthApi::new(self.client.clone()).login(&credentials).await?;

        let token = resp
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| HrdeskError::Decode("login response did not include a token".into()))?;

        self.storage.save(&token)?;
        self.state.set(Session {
            token: Some(token),
            user: resp.user,
        });

        tracing::info!(email, "logged in");
        Ok(())
    }

    /// Clears the session. Never fails; a storage error is only logged.
    pub fn logout(&self) {
        self.state.set(Session::default());
        if let Err(e) = self.storage.clear() {
            tracing::warn!(error = %e, "could not remove stored session token");
        }
        tracing::info!("logged out");
    }
}
