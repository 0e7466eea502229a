//! Timeout utilities for page operations
//!
//! Wraps a whole multi-step browser operation in a single
//! `tokio::time::timeout` so no step can hang past the overall bound.

use std::future::Future;
use std::time::Duration;

use crate::browser::{BrowserError, BrowserResult};

/// Run `operation` under `timeout`.
///
/// # Returns
/// * `Ok(T)` - Operation completed successfully in time
/// * `Err(BrowserError::Timeout)` - The bound expired; the operation was dropped
/// * `Err(_)` - The operation failed on its own
pub async fn with_page_timeout<F, T>(
    operation: F,
    timeout: Duration,
    operation_name: &str,
) -> BrowserResult<T>
where
    F: Future<Output = BrowserResult<T>>,
{
    match tokio::time::timeout(timeout, operation).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::timeout(operation_name, timeout)),
    }
}
