//! Conversation log and the submit/complete/reset state machine.
//!
//! A submission cycle is `Idle -> Submitting -> Idle`. Entering `Submitting`
//! appends the user message and a loading placeholder together; completing
//! rewrites that placeholder in place. The log is written to storage after
//! every transition.

use tracing::{debug, info, warn};

use crate::ai::HadithBackend;
use crate::error::{RetryClass, SubmitError, VerifyError};
use crate::state::{ChatMessage, MessageId, MessageStatus};
use crate::storage::{Storage, HISTORY_KEY};
use crate::strings;
use crate::verify::{Verification, VerificationClient};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Submitting { placeholder: MessageId },
}

/// Handle for an in-flight verification, returned by
/// [`ChatSession::begin_submission`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingVerification {
    pub placeholder: MessageId,
    pub prompt: String,
}

/// The localized message written into a failed placeholder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureNotice {
    QuotaExhausted,
    ModelUnavailable,
    Connectivity,
}

impl FailureNotice {
    /// An exhausted budget is reported by the kind of its last failure, so a
    /// model that stays missing reads as model-unavailable rather than as a
    /// quota problem.
    pub fn for_error(error: &VerifyError) -> Self {
        match error {
            VerifyError::RetryBudgetExhausted { last, .. } => match last.retry_class() {
                RetryClass::RateLimited => FailureNotice::QuotaExhausted,
                RetryClass::NotFound => FailureNotice::ModelUnavailable,
                RetryClass::Fatal => FailureNotice::Connectivity,
            },
            VerifyError::Backend(_) | VerifyError::Interrupted { .. } => FailureNotice::Connectivity,
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            FailureNotice::QuotaExhausted => strings::ERROR_QUOTA,
            FailureNotice::ModelUnavailable => strings::ERROR_MODEL_UNAVAILABLE,
            FailureNotice::Connectivity => strings::ERROR_CONNECTIVITY,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Success,
    Failed(FailureNotice),
}

pub struct ChatSession {
    messages: Vec<ChatMessage>,
    state: SessionState,
    storage: Box<dyn Storage>,
}

impl ChatSession {
    /// Restore the persisted log, or start from the greeting when there is
    /// none or it cannot be read.
    pub fn load(mut storage: Box<dyn Storage>) -> Self {
        let messages = match storage.get(HISTORY_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<ChatMessage>>(&raw) {
                Ok(messages) if !messages.is_empty() => messages,
                Ok(_) => vec![ChatMessage::greeting()],
                Err(e) => {
                    warn!(error = %e, "Stored conversation is unreadable, starting fresh");
                    if let Err(e) = storage.remove(HISTORY_KEY) {
                        warn!(error = %e, "Failed to drop unreadable conversation");
                    }
                    vec![ChatMessage::greeting()]
                }
            },
            Ok(None) => vec![ChatMessage::greeting()],
            Err(e) => {
                warn!(error = %e, "Failed to read stored conversation");
                vec![ChatMessage::greeting()]
            }
        };

        let mut session = Self {
            messages,
            state: SessionState::Idle,
            storage,
        };

        // A placeholder left loading by a previous run will never complete
        let mut orphaned = 0;
        for message in session.messages.iter_mut().filter(|m| m.is_loading()) {
            message.content = FailureNotice::Connectivity.message().to_string();
            message.status = Some(MessageStatus::Error);
            orphaned += 1;
        }
        if orphaned > 0 {
            info!(orphaned, "Marked interrupted verifications as failed");
            session.persist();
        }

        debug!(messages = session.messages.len(), "Conversation loaded");
        session
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_busy(&self) -> bool {
        matches!(self.state, SessionState::Submitting { .. })
    }

    /// True while the log holds nothing but the opening greeting
    pub fn is_fresh(&self) -> bool {
        self.messages.len() == 1 && self.messages[0].content == strings::GREETING
    }

    pub fn begin_submission(&mut self, input: &str) -> Result<PendingVerification, SubmitError> {
        let prompt = input.trim();
        if prompt.is_empty() {
            return Err(SubmitError::EmptyInput);
        }
        if self.is_busy() {
            return Err(SubmitError::InFlight);
        }

        let user = ChatMessage::user(prompt);
        let placeholder = ChatMessage::placeholder();
        let placeholder_id = placeholder.id;

        self.messages.extend([user, placeholder]);
        self.state = SessionState::Submitting {
            placeholder: placeholder_id,
        };
        self.persist();

        info!(placeholder = %placeholder_id, "Submission started");

        Ok(PendingVerification {
            placeholder: placeholder_id,
            prompt: prompt.to_string(),
        })
    }

    /// Write the outcome into the placeholder and return to `Idle`.
    pub fn complete(
        &mut self,
        pending: &PendingVerification,
        outcome: Result<Verification, VerifyError>,
    ) -> Resolution {
        let resolution = match &outcome {
            Ok(_) => Resolution::Success,
            Err(e) => Resolution::Failed(FailureNotice::for_error(e)),
        };

        match self.messages.iter_mut().find(|m| m.id == pending.placeholder) {
            Some(message) => match outcome {
                Ok(verification) => {
                    message.content = verification.text;
                    message.status = Some(MessageStatus::Success);
                    message.grounding_urls = Some(verification.urls);
                }
                Err(e) => {
                    warn!(error = %e, "Verification failed");
                    let notice = FailureNotice::for_error(&e);
                    message.content = notice.message().to_string();
                    message.status = Some(MessageStatus::Error);
                }
            },
            None => warn!(placeholder = %pending.placeholder, "Placeholder no longer in log"),
        }

        self.state = SessionState::Idle;
        self.persist();

        info!(?resolution, "Submission finished");
        resolution
    }

    /// Run a whole submission cycle against `verifier`.
    pub async fn submit<B: HadithBackend>(
        &mut self,
        verifier: &VerificationClient<B>,
        input: &str,
    ) -> Result<Resolution, SubmitError> {
        let pending = self.begin_submission(input)?;
        let outcome = verifier.verify(&pending.prompt).await;
        Ok(self.complete(&pending, outcome))
    }

    /// Clear the log back to the greeting. Does nothing unless `confirmed`;
    /// refused while a verification is in flight. Returns whether the log
    /// was cleared.
    pub fn reset(&mut self, confirmed: bool) -> Result<bool, SubmitError> {
        if !confirmed {
            return Ok(false);
        }
        if self.is_busy() {
            return Err(SubmitError::InFlight);
        }

        let discarded = self.messages.len();
        self.messages = vec![ChatMessage::greeting()];
        self.persist();

        info!(discarded, "Conversation reset");
        Ok(true)
    }

    /// Write-through of the whole log. Failures are logged, never fatal.
    fn persist(&mut self) {
        let serialized = match serde_json::to_string(&self.messages) {
            Ok(s) => s,
            Err(e) => {
                warn!(error = %e, "Failed to serialize conversation");
                return;
            }
        };

        if let Err(e) = self.storage.set(HISTORY_KEY, &serialized) {
            warn!(error = %e, "Failed to persist conversation");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::GeneratedAnswer;
    use crate::error::{BackendError, BackendResult};
    use crate::state::{ChatRole, GroundingLink};
    use crate::storage::MemoryStorage;
    use crate::verify::{RetryPolicy, Sleeper};
    use async_trait::async_trait;
    use std::sync::Arc;
    use std::time::Duration;

    const EXAMPLE: &str = "من صام رمضان إيماناً واحتساباً";

    struct FixedBackend(fn() -> BackendResult<GeneratedAnswer>);

    #[async_trait]
    impl HadithBackend for FixedBackend {
        async fn generate(&self, _prompt: &str) -> BackendResult<GeneratedAnswer> {
            (self.0)()
        }
    }

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    fn verifier(f: fn() -> BackendResult<GeneratedAnswer>) -> VerificationClient<FixedBackend> {
        VerificationClient::new(FixedBackend(f), RetryPolicy::default()).with_sleeper(Arc::new(NoSleep))
    }

    fn authentic() -> BackendResult<GeneratedAnswer> {
        Ok(GeneratedAnswer {
            text: "[TEXT]: من صام رمضان إيماناً واحتساباً غفر له ما تقدم من ذنبه\n[STATUS]: صحيح".to_string(),
            references: vec![GroundingLink {
                uri: "https://sunnah.com/bukhari:38".to_string(),
                title: "Sunnah.com".to_string(),
            }],
        })
    }

    fn quota() -> BackendResult<GeneratedAnswer> {
        Err(BackendError::RateLimited {
            message: "quota".to_string(),
        })
    }

    fn server_error() -> BackendResult<GeneratedAnswer> {
        Err(BackendError::Api {
            status: 500,
            message: "internal".to_string(),
        })
    }

    fn stored(handle: &MemoryStorage) -> Vec<ChatMessage> {
        let raw = handle.get(HISTORY_KEY).unwrap().unwrap();
        serde_json::from_str(&raw).unwrap()
    }

    #[test]
    fn test_fresh_session_has_greeting() {
        let session = ChatSession::load(Box::new(MemoryStorage::new()));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].role, ChatRole::Assistant);
        assert!(session.is_fresh());
        assert_eq!(session.state(), SessionState::Idle);
    }

    #[test]
    fn test_begin_appends_pair() {
        let handle = MemoryStorage::new();
        let mut session = ChatSession::load(Box::new(handle.clone()));
        session.reset(true).unwrap();
        let before = session.messages().len();

        let pending = session.begin_submission(&format!("  {}\n", EXAMPLE)).unwrap();
        assert_eq!(pending.prompt, EXAMPLE);

        let messages = session.messages();
        assert_eq!(messages.len(), before + 2);
        assert_eq!(messages[before].role, ChatRole::User);
        assert_eq!(messages[before].content, EXAMPLE);
        assert_eq!(messages[before + 1].role, ChatRole::Assistant);
        assert!(messages[before + 1].is_loading());
        assert_eq!(messages[before + 1].id, pending.placeholder);
        assert_eq!(
            session.state(),
            SessionState::Submitting {
                placeholder: pending.placeholder
            }
        );

        // Written through before the call starts
        assert_eq!(stored(&handle).len(), before + 2);
    }

    #[test]
    fn test_rejects_empty_and_reentrant_submissions() {
        let mut session = ChatSession::load(Box::new(MemoryStorage::new()));
        assert_eq!(session.begin_submission("   "), Err(SubmitError::EmptyInput));

        session.begin_submission(EXAMPLE).unwrap();
        let len = session.messages().len();
        assert_eq!(session.begin_submission("آخر"), Err(SubmitError::InFlight));
        assert_eq!(session.messages().len(), len);
        assert_eq!(session.messages().iter().filter(|m| m.is_loading()).count(), 1);
    }

    #[tokio::test]
    async fn test_successful_submit_updates_placeholder_in_place() {
        let handle = MemoryStorage::new();
        let mut session = ChatSession::load(Box::new(handle.clone()));
        let before = session.messages().len();

        let resolution = session.submit(&verifier(authentic), EXAMPLE).await.unwrap();
        assert_eq!(resolution, Resolution::Success);

        let messages = session.messages();
        assert_eq!(messages.len(), before + 2);
        assert_eq!(messages[before].content, EXAMPLE);
        let reply = &messages[before + 1];
        assert_eq!(reply.status, Some(MessageStatus::Success));
        assert!(reply.content.contains("[STATUS]: صحيح"));
        assert_eq!(reply.links().len(), 1);
        assert_eq!(session.state(), SessionState::Idle);

        assert_eq!(stored(&handle), messages.to_vec());
    }

    #[tokio::test]
    async fn test_quota_exhaustion_writes_quota_notice() {
        let mut session = ChatSession::load(Box::new(MemoryStorage::new()));
        let resolution = session.submit(&verifier(quota), EXAMPLE).await.unwrap();

        assert_eq!(resolution, Resolution::Failed(FailureNotice::QuotaExhausted));
        let reply = session.messages().last().unwrap();
        assert_eq!(reply.status, Some(MessageStatus::Error));
        assert_eq!(reply.content, strings::ERROR_QUOTA);
        assert!(!session.is_busy());
    }

    #[tokio::test]
    async fn test_fatal_error_writes_generic_notice_and_accepts_next_submit() {
        let mut session = ChatSession::load(Box::new(MemoryStorage::new()));
        let resolution = session.submit(&verifier(server_error), EXAMPLE).await.unwrap();
        assert_eq!(resolution, Resolution::Failed(FailureNotice::Connectivity));
        assert_eq!(session.messages().last().unwrap().content, strings::ERROR_CONNECTIVITY);

        let resolution = session.submit(&verifier(authentic), EXAMPLE).await.unwrap();
        assert_eq!(resolution, Resolution::Success);
    }

    #[test]
    fn test_failure_notice_mapping() {
        let exhausted = |last| VerifyError::RetryBudgetExhausted { attempts: 3, last };
        assert_eq!(
            FailureNotice::for_error(&exhausted(BackendError::NotFound {
                message: String::new()
            })),
            FailureNotice::ModelUnavailable
        );
        assert_eq!(
            FailureNotice::for_error(&exhausted(BackendError::RateLimited {
                message: String::new()
            })),
            FailureNotice::QuotaExhausted
        );
        assert_eq!(
            FailureNotice::for_error(&VerifyError::Interrupted {
                message: "panic".to_string()
            }),
            FailureNotice::Connectivity
        );
    }

    #[test]
    fn test_reset_requires_confirmation() {
        let handle = MemoryStorage::new();
        let mut session = ChatSession::load(Box::new(handle.clone()));
        let pending = session.begin_submission(EXAMPLE).unwrap();
        session.complete(
            &pending,
            Ok(Verification {
                text: "نتيجة".to_string(),
                urls: Vec::new(),
            }),
        );

        assert_eq!(session.reset(false), Ok(false));
        assert_eq!(session.messages().len(), 3);

        assert_eq!(session.reset(true), Ok(true));
        assert_eq!(session.messages().len(), 1);
        assert_eq!(session.messages()[0].content, strings::GREETING);
        assert_eq!(session.messages()[0].role, ChatRole::Assistant);
        assert_eq!(stored(&handle).len(), 1);
    }

    #[test]
    fn test_reset_refused_while_in_flight() {
        let mut session = ChatSession::load(Box::new(MemoryStorage::new()));
        session.begin_submission(EXAMPLE).unwrap();
        assert_eq!(session.reset(true), Err(SubmitError::InFlight));
        assert_eq!(session.messages().len(), 3);
    }

    #[test]
    fn test_reload_restores_log_and_fails_orphaned_placeholder() {
        let handle = MemoryStorage::new();
        let mut session = ChatSession::load(Box::new(handle.clone()));
        session.begin_submission(EXAMPLE).unwrap();
        let original = session.messages().to_vec();
        drop(session);

        let session = ChatSession::load(Box::new(handle.clone()));
        let messages = session.messages();
        assert_eq!(messages.len(), original.len());
        assert_eq!(messages[1], original[1]);
        assert_eq!(messages[1].timestamp, original[1].timestamp);

        let reply = &messages[2];
        assert_eq!(reply.id, original[2].id);
        assert_eq!(reply.status, Some(MessageStatus::Error));
        assert_eq!(reply.content, strings::ERROR_CONNECTIVITY);
        assert_eq!(session.state(), SessionState::Idle);
        assert!(stored(&handle).iter().all(|m| !m.is_loading()));
    }

    #[test]
    fn test_corrupt_history_starts_fresh() {
        let mut handle = MemoryStorage::new();
        handle.set(HISTORY_KEY, "{not json").unwrap();
        let session = ChatSession::load(Box::new(handle.clone()));
        assert!(session.is_fresh());
        // The unreadable entry is dropped rather than left for the next load
        assert_eq!(handle.get(HISTORY_KEY).unwrap(), None);
    }
}
