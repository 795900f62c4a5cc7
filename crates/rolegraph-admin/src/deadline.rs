//! Per-call deadlines.
//!
//! The mock store never times out on its own. A deployment backed by a real
//! service sets a deadline so a hung call surfaces as `Timeout` instead of
//! blocking the console. Store writes commit synchronously once their turn
//! comes, so dropping a call at the deadline never leaves a partial merge.

use rolegraph_model::{AccessError, AccessResult};
use std::future::Future;
use std::time::Duration;

/// Run `operation`, failing with [`AccessError::Timeout`] if it does not
/// finish within `timeout`.
///
/// # Example
///
/// ```rust,no_run
/// use rolegraph_admin::deadline::with_deadline;
/// use std::time::Duration;
///
/// async fn example() {
///     let result = with_deadline(Some(Duration::from_secs(1)), async { Ok(42) }).await;
///     assert_eq!(result, Ok(42));
/// }
/// ```
pub async fn with_deadline<T, F>(timeout: Option<Duration>, operation: F) -> AccessResult<T>
where
    F: Future<Output = AccessResult<T>>,
{
    match timeout {
        Some(limit) => match tokio::time::timeout(limit, operation).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(timeout_ms = limit.as_millis() as u64, "Operation timed out");
                Err(AccessError::Timeout)
            }
        },
        None => operation.await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_deadline_elapses() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AccessError>(())
        };
        let result = with_deadline(Some(Duration::from_secs(1)), slow).await;
        assert_eq!(result, Err(AccessError::Timeout));
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_deadline_waits() {
        let slow = async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok::<_, AccessError>(7)
        };
        assert_eq!(with_deadline(None, slow).await, Ok(7));
    }

    #[tokio::test]
    async fn test_errors_pass_through() {
        let failing = async { Err::<(), _>(AccessError::RoleNotFound("Nobody".to_string())) };
        let result = with_deadline(Some(Duration::from_secs(1)), failing).await;
        assert_eq!(result, Err(AccessError::RoleNotFound("Nobody".to_string())));
    }
}
