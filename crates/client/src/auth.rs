//! Typed call for `/auth/login`.

use crate::api::{ApiClient, RequestOptions};
use hrdesk_core::error::HrdeskResult;
use hrdesk_core::{Credentials, LoginResponse};

const LOGIN: &str = "/auth/login";

#[derive(Debug, Clone)]
pub struct AuthApi {
    client: ApiClient,
}

impl AuthApi {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Exchanges credentials for a token. Interpreting the response is the
    /// caller's job; a `204` decodes as an empty response.
    pub async fn login(&self, credentials: &Credentials) -> HrdeskResult<LoginResponse> {
        tracing::debug!(email = %credentials.email, "login");
        let resp: Option<LoginResponse> = self
            .client
            .request(LOGIN, RequestOptions::post().json(credentials)?)
            .await?;
        Ok(resp.unwrap_or_default())
    }
}
