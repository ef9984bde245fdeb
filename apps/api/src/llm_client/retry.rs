//! The one retrying-call primitive every completion goes through.
//!
//! Rate-limit responses are retried after a fixed delay; every other failure, and retry
//! exhaustion, degrades to an empty string. Callers never see an error.

use std::future::Future;
use std::time::Duration;

use tracing::{error, warn};

use super::LlmError;

#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Retries after the first attempt; total attempts are `max_retries + 1`.
    pub max_retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 5,
            delay: Duration::from_secs(5),
        }
    }
}

/// Runs `attempt` until it succeeds, fails with a non rate-limit error, or retries run out.
///
/// Returns the trimmed completion text, or `""` when no result could be obtained.
pub async fn complete_with_retry<F, Fut>(policy: RetryPolicy, mut attempt: F) -> String
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<String, LlmError>>,
{
    let mut retries = 0;

    loop {
        match attempt().await {
            Ok(text) => return text.trim().to_string(),
            Err(LlmError::RateLimited) if retries < policy.max_retries => {
                retries += 1;
                warn!(
                    "Completion endpoint rate limited, retry {}/{} in {}ms",
                    retries,
                    policy.max_retries,
                    policy.delay.as_millis()
                );
                tokio::time::sleep(policy.delay).await;
            }
            Err(LlmError::RateLimited) => {
                error!(
                    "Completion endpoint still rate limited after {} retries, returning empty result",
                    policy.max_retries
                );
                return String::new();
            }
            Err(e) => {
                error!("Completion call failed, returning empty result: {e}");
                return String::new();
            }
        }
    }
}
