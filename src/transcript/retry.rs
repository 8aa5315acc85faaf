use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;

use crate::TranscriptError;

/// Failure of a single attempt
#[derive(Debug)]
pub enum AttemptError {
    /// Upstream or network failure, worth another attempt
    Transient(anyhow::Error),

    /// Retrying cannot change the outcome
    Permanent(TranscriptError),
}

impl From<TranscriptError> for AttemptError {
    fn from(err: TranscriptError) -> Self {
        AttemptError::Permanent(err)
    }
}

/// Failure after the retry policy gave up
#[derive(Debug)]
pub enum RetryError {
    Exhausted { attempts: u32, last: anyhow::Error },
    Permanent(TranscriptError),
}

/// Bounded retry with a fixed delay between attempts
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            delay: Duration::from_secs(2),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// Run `op` until it succeeds, fails permanently, or runs out of attempts.
    /// `op` receives the 1-based attempt number.
    pub async fn run<T, F, Fut>(&self, what: &str, mut op: F) -> Result<T, RetryError>
    where
        F: FnMut(u32) -> Fut,
        Fut: Future<Output = Result<T, AttemptError>>,
    {
        let max_attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            match op(attempt).await {
                Ok(value) => return Ok(value),
                Err(AttemptError::Permanent(err)) => return Err(RetryError::Permanent(err)),
                Err(AttemptError::Transient(err)) => {
                    tracing::warn!("{} attempt {}/{} failed: {:#}", what, attempt, max_attempts, err);
                    if attempt >= max_attempts {
                        return Err(RetryError::Exhausted { attempts: attempt, last: err });
                    }
                }
            }

            sleep(self.delay).await;
            attempt += 1;
        }
    }
}
