use std::future::Future;
use std::sync::Arc;

use nm_core::failure::classify_backend_error;
use nm_core::{BackendError, ClassifiedError, FailureKind, QueryOptions};
use tracing::{debug, info_span, warn, Instrument};

use crate::context::AppContext;

/// Retry wrapper around a result-returning backend operation.
///
/// Never panics or short-circuits on connectivity: being offline counts as a
/// failed attempt like any other retryable error. Schema errors are returned
/// immediately.
pub struct ResilientQuery {
    context: Arc<AppContext>,
}

impl ResilientQuery {
    pub fn new(context: Arc<AppContext>) -> Self {
        Self { context }
    }

    /// Run `operation` up to `options.retries + 1` times, sleeping
    /// `retry_delay * 2^attempt` between attempts.
    pub async fn execute<T, F, Fut>(
        &self,
        label: &str,
        options: QueryOptions,
        mut operation: F,
    ) -> Result<T, ClassifiedError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, BackendError>>,
    {
        let span = info_span!("usecase.resilient_query.execute", query = label);
        async {
            let mut attempt: u32 = 0;

            loop {
                let failure = if self.context.is_online() {
                    match operation().await {
                        Ok(data) => {
                            debug!(attempt, "query succeeded");
                            return Ok(data);
                        }
                        Err(err) => classify_backend_error(&err),
                    }
                } else {
                    ClassifiedError::offline()
                };

                if failure.kind == FailureKind::SchemaError {
                    warn!(
                        attempt,
                        code = failure.code.as_deref().unwrap_or(""),
                        error = %failure.message,
                        "query failed with schema error, not retrying"
                    );
                    return Err(failure);
                }

                if attempt >= options.retries {
                    warn!(
                        attempt,
                        kind = %failure.kind,
                        error = %failure.message,
                        "query failed, retries exhausted"
                    );
                    return Err(failure);
                }

                let delay = options.delay_for(attempt);
                warn!(
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    kind = %failure.kind,
                    "query failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
        }
        .instrument(span)
        .await
    }
}
