use async_trait::async_trait;

use crate::http::{HttpRequest, HttpResponse, TransportError};

/// Sends one HTTP request. No retries, no status interpretation.
#[async_trait]
pub trait HttpTransportPort: Send + Sync {
    /// Any received response is `Ok`, whatever its status.
    async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}
