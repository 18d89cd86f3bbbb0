//! PostgREST-backed profile repository.

use std::sync::Arc;

use async_trait::async_trait;
use nm_core::auth::UserId;
use nm_core::backend::{BackendError, BackendErrorBody};
use nm_core::http::{HttpRequest, HttpResponse};
use nm_core::ports::{HttpTransportPort, IdentityProviderPort, ProfileRepositoryPort};
use nm_core::profile::{OnboardingRow, ProfileRecord};
use reqwest::Url;
use tracing::{debug, warn};

const PROFILES_PATH: &str = "/rest/v1/profiles";

/// Profile rows in the `profiles` table, addressed through PostgREST.
///
/// Requests are authorized with the current access token when a session
/// exists and with the anon key otherwise.
pub struct PostgrestProfileRepository {
    base_url: String,
    anon_key: String,
    http: Arc<dyn HttpTransportPort>,
    identity: Arc<dyn IdentityProviderPort>,
}

impl PostgrestProfileRepository {
    pub fn new(
        base_url: impl Into<String>,
        anon_key: impl Into<String>,
        http: Arc<dyn HttpTransportPort>,
        identity: Arc<dyn IdentityProviderPort>,
    ) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            http,
            identity,
        }
    }

    fn profiles_url(&self, params: &[(&str, String)]) -> Result<String, BackendError> {
        let url = Url::parse_with_params(&format!("{}{}", self.base_url, PROFILES_PATH), params)
            .map_err(|e| BackendError::Configuration(format!("invalid backend url: {e}")))?;
        Ok(url.to_string())
    }

    async fn bearer(&self) -> String {
        match self.identity.get_session().await {
            Ok(Some(session)) => session.access_token,
            Ok(None) => self.anon_key.clone(),
            Err(err) => {
                warn!(error = %err, "session unavailable, using anon key");
                self.anon_key.clone()
            }
        }
    }

    async fn authorize(&self, request: HttpRequest) -> HttpRequest {
        let bearer = self.bearer().await;
        request
            .header("apikey", self.anon_key.clone())
            .header("Authorization", format!("Bearer {bearer}"))
    }

    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, BackendError> {
        let response = self.http.send(request).await?;
        if response.is_success() {
            return Ok(response);
        }

        let body: BackendErrorBody = response.json().unwrap_or_default();
        Err(BackendError::from_body(response.status, body))
    }
}

#[async_trait]
impl ProfileRepositoryPort for PostgrestProfileRepository {
    async fn fetch_onboarding(&self, user_id: &UserId) -> Result<Option<bool>, BackendError> {
        let url = self.profiles_url(&[
            ("select", "is_onboarded".to_string()),
            ("id", format!("eq.{user_id}")),
        ])?;
        let request = self.authorize(HttpRequest::get(url)).await;

        let response = self.send(&request).await?;
        let rows: Vec<OnboardingRow> = response
            .json()
            .map_err(|e| BackendError::Decode(e.to_string()))?;

        match rows.as_slice() {
            [] => Ok(None),
            [row] => Ok(Some(row.is_onboarded)),
            _ => Err(BackendError::Response {
                code: "PGRST116".to_string(),
                message: "JSON object requested, multiple (or no) rows returned".to_string(),
                status: Some(406),
                details: Some(format!("The result contains {} rows", rows.len())),
                hint: None,
            }),
        }
    }

    async fn create_default_profile(&self, user_id: &UserId) -> Result<(), BackendError> {
        let url = self.profiles_url(&[("on_conflict", "id".to_string())])?;
        let request = HttpRequest::post(url)
            .header("Prefer", "resolution=ignore-duplicates,return=minimal")
            .json(&[ProfileRecord::default_for(user_id.clone())])
            .map_err(|e| BackendError::Decode(e.to_string()))?;
        let request = self.authorize(request).await;

        self.send(&request).await?;
        debug!(user_id = %user_id, "default profile ensured");
        Ok(())
    }
}
