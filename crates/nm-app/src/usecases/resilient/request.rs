use std::sync::Arc;

use nm_core::failure::{classify_status, classify_transport};
use nm_core::http::{HttpRequest, HttpResponse};
use nm_core::ports::HttpTransportPort;
use nm_core::{ClassifiedError, FailureKind, RequestOptions};
use tracing::{debug, info_span, warn, Instrument};

use crate::context::AppContext;

/// Generic timed, retried network call.
///
/// Fails fast with `OFFLINE` whenever the device is offline at the start of
/// an attempt; no attempt is made and no retry is scheduled.
pub struct ResilientRequest {
    context: Arc<AppContext>,
    transport: Arc<dyn HttpTransportPort>,
    defaults: RequestOptions,
}

impl ResilientRequest {
    pub fn new(
        context: Arc<AppContext>,
        transport: Arc<dyn HttpTransportPort>,
        defaults: RequestOptions,
    ) -> Self {
        Self {
            context,
            transport,
            defaults,
        }
    }

    /// Options used by [`send`](Self::send), normally the `[request]` config section.
    pub fn defaults(&self) -> RequestOptions {
        self.defaults
    }

    /// Send `request` with the configured default options.
    pub async fn send(&self, request: &HttpRequest) -> Result<HttpResponse, ClassifiedError> {
        self.execute(request, self.defaults).await
    }

    /// Send `request`, retrying retryable failures up to `options.retries`
    /// times with a doubling delay.
    pub async fn execute(
        &self,
        request: &HttpRequest,
        options: RequestOptions,
    ) -> Result<HttpResponse, ClassifiedError> {
        let span = info_span!(
            "usecase.resilient_request.execute",
            method = %request.method,
            url = %request.url,
        );
        async {
            let mut retries_left = options.retries;
            let mut delay = options.retry_delay;
            let mut attempt: u32 = 0;

            loop {
                if !self.context.is_online() {
                    warn!(attempt, "device offline, request not attempted");
                    return Err(ClassifiedError::offline());
                }

                let failure = match tokio::time::timeout(
                    options.timeout,
                    self.transport.send(request),
                )
                .await
                {
                    Ok(Ok(response)) => match classify_status(response.status) {
                        None => {
                            debug!(attempt, status = response.status, "request succeeded");
                            return Ok(response);
                        }
                        Some(kind) => ClassifiedError::new(
                            kind,
                            format!("request failed with status {}", response.status),
                        )
                        .with_status(response.status),
                    },
                    Ok(Err(err)) => ClassifiedError::new(classify_transport(&err), err.to_string()),
                    Err(_) => ClassifiedError::new(
                        FailureKind::Timeout,
                        format!("no response within {} ms", options.timeout.as_millis()),
                    ),
                };

                if !failure.is_retryable() {
                    warn!(attempt, kind = %failure.kind, error = %failure.message, "request failed");
                    return Err(failure);
                }

                // A transport failure observed while the monitor already
                // reports offline converges on OFFLINE.
                if !self.context.is_online() {
                    warn!(attempt, kind = %failure.kind, "request failed while offline");
                    return Err(ClassifiedError::offline());
                }

                if retries_left == 0 {
                    warn!(
                        attempt,
                        kind = %failure.kind,
                        error = %failure.message,
                        "request failed, retries exhausted"
                    );
                    return Err(failure);
                }

                warn!(
                    attempt,
                    retries_left,
                    delay_ms = delay.as_millis() as u64,
                    kind = %failure.kind,
                    "request failed, retrying"
                );
                tokio::time::sleep(delay).await;
                retries_left -= 1;
                delay = delay.saturating_mul(2);
                attempt += 1;
            }
        }
        .instrument(span)
        .await
    }
}
