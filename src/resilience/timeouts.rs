//! Timeout enforcement.
//!
//! # Responsibilities
//! - Wrap provider calls with a deadline
//! - Cancel operations cleanly on timeout
//!
//! # Design Decisions
//! - Uses Tokio's timeout facilities
//! - Timeout errors are distinct from other errors
//! - The deadline covers connect, send and body read together

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// The wrapped operation did not finish in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("operation timed out after {0:?}")]
pub struct DeadlineExceeded(pub Duration);

/// Run `fut` with a deadline. The future is dropped when the deadline passes.
pub async fn with_deadline<F, T>(deadline: Duration, fut: F) -> Result<T, DeadlineExceeded>
where
    F: Future<Output = T>,
{
    tokio::time::timeout(deadline, fut)
        .await
        .map_err(|_| DeadlineExceeded(deadline))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_completes_within_deadline() {
        let result = with_deadline(Duration::from_secs(1), async { 7 }).await;
        assert_eq!(result, Ok(7));
    }

    #[tokio::test]
    async fn test_times_out() {
        let result = with_deadline(Duration::from_millis(20), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
        })
        .await;
        assert_eq!(result, Err(DeadlineExceeded(Duration::from_millis(20))));
    }
}
