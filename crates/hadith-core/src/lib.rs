pub mod ai;
pub mod config;
pub mod error;
pub mod prompts;
pub mod session;
pub mod state;
pub mod storage;
pub mod strings;
pub mod verdict;
pub mod verify;
pub mod view;

// Re-export main types for convenience
pub use ai::{GeminiClient, GeneratedAnswer, HadithBackend};
pub use config::Config;
pub use error::{BackendError, ConfigError, RetryClass, StorageError, SubmitError, VerifyError};
pub use session::{ChatSession, FailureNotice, PendingVerification, Resolution, SessionState};
pub use state::{ChatMessage, ChatRole, GroundingLink, MessageId, MessageStatus};
pub use storage::{MemoryStorage, SqliteStorage, Storage};
pub use verdict::{Authenticity, HadithTarget, ParsedContent, VerdictSections};
pub use verify::{RetryPolicy, Verification, VerificationClient};
pub use view::{MessageBody, MessageView, Side, Tone};
