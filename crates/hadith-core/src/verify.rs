//! Bounded-retry wrapper around a [`HadithBackend`].

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info, warn};

use crate::ai::{GeneratedAnswer, HadithBackend};
use crate::error::VerifyError;
use crate::state::GroundingLink;
use crate::strings;

/// Attempt budget and backoff schedule
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
    /// Upper bound for a single wait. `None` leaves the doubling uncapped.
    pub max_delay: Option<Duration>,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: None,
        }
    }
}

impl RetryPolicy {
    /// Wait before retrying after failed attempt `attempt` (0-based):
    /// base, 2×base, 4×base, ...
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.checked_pow(attempt).unwrap_or(u32::MAX);
        let delay = self.base_delay.saturating_mul(factor);
        match self.max_delay {
            Some(cap) => delay.min(cap),
            None => delay,
        }
    }
}

/// Suspends the retry loop between attempts
#[async_trait]
pub trait Sleeper: Send + Sync {
    async fn sleep(&self, duration: Duration);
}

pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// A verified reply ready to be written into the conversation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verification {
    pub text: String,
    pub urls: Vec<GroundingLink>,
}

impl From<GeneratedAnswer> for Verification {
    fn from(answer: GeneratedAnswer) -> Self {
        let text = if answer.text.trim().is_empty() {
            strings::NO_PRECISE_RESULT.to_string()
        } else {
            answer.text
        };

        Self {
            text,
            urls: normalize_references(answer.references),
        }
    }
}

/// Drop references without a uri, default missing titles and keep the first
/// occurrence of each uri.
fn normalize_references(references: Vec<GroundingLink>) -> Vec<GroundingLink> {
    let mut seen = HashSet::new();
    references
        .into_iter()
        .filter(|link| !link.uri.is_empty())
        .filter(|link| seen.insert(link.uri.clone()))
        .map(|link| GroundingLink {
            title: if link.title.is_empty() {
                strings::DEFAULT_SOURCE_TITLE.to_string()
            } else {
                link.title
            },
            uri: link.uri,
        })
        .collect()
}

pub struct VerificationClient<B> {
    backend: B,
    policy: RetryPolicy,
    sleeper: Arc<dyn Sleeper>,
}

impl<B: HadithBackend> VerificationClient<B> {
    pub fn new(backend: B, policy: RetryPolicy) -> Self {
        Self {
            backend,
            policy,
            sleeper: Arc::new(TokioSleeper),
        }
    }

    pub fn with_sleeper(mut self, sleeper: Arc<dyn Sleeper>) -> Self {
        self.sleeper = sleeper;
        self
    }

    pub async fn verify(&self, prompt: &str) -> Result<Verification, VerifyError> {
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;
        let mut last_error = None;

        while attempt < max_attempts {
            let start = Instant::now();

            match self.backend.generate(prompt).await {
                Ok(answer) => {
                    let verification = Verification::from(answer);
                    info!(
                        attempt = attempt + 1,
                        latency_ms = start.elapsed().as_millis(),
                        references = verification.urls.len(),
                        "Verification succeeded"
                    );
                    return Ok(verification);
                }
                Err(e) if e.retry_class().is_retryable() => {
                    warn!(
                        attempt = attempt + 1,
                        max_attempts,
                        class = ?e.retry_class(),
                        error = %e,
                        "Retryable backend failure"
                    );

                    if attempt + 1 < max_attempts {
                        let delay = self.policy.delay_for(attempt);
                        info!(delay_ms = delay.as_millis(), "Backing off before retry");
                        self.sleeper.sleep(delay).await;
                    }

                    last_error = Some(e);
                    attempt += 1;
                }
                Err(e) => {
                    error!(attempt = attempt + 1, error = %e, "Backend failure, not retrying");
                    return Err(VerifyError::Backend(e));
                }
            }
        }

        match last_error {
            Some(last) => {
                error!(attempts = attempt, error = %last, "Retry budget exhausted");
                Err(VerifyError::RetryBudgetExhausted {
                    attempts: attempt,
                    last,
                })
            }
            None => Err(VerifyError::Interrupted {
                message: "retry policy allows no attempts".to_string(),
            }),
        }
    }
}
