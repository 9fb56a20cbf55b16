//! Bounded store calls
//!
//! Every store round-trip goes through [`bounded`] so a stalled backend
//! surfaces as a retryable `Unavailable` instead of hanging the request.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use crate::shared::error::{PlatformError, Result};

pub const DEFAULT_STORE_TIMEOUT: Duration = Duration::from_millis(5000);

pub async fn bounded<T, F>(limit: Duration, operation: &'static str, fut: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match tokio::time::timeout(limit, fut).await {
        Ok(result) => result,
        Err(_) => {
            let timeout_ms = limit.as_millis() as u64;
            warn!(operation, timeout_ms, "Store call timed out");
            Err(PlatformError::unavailable(format!(
                "{} did not complete within {}ms",
                operation, timeout_ms
            )))
        }
    }
}
