//! Seam to the external text-generation service

use crate::Error;
use crate::prompt::QueryRequest;
use async_trait::async_trait;

#[cfg(feature = "openai")]
mod openai;

#[cfg(feature = "openai")]
pub use openai::{DEFAULT_BASE_URL, DEFAULT_MODEL, OpenAiClient};

/// A chat-completion backend able to turn a [`QueryRequest`] into query text.
///
/// The credential is passed per call so the session stays its only owner.
/// Implementations must not retry on their own.
#[async_trait]
pub trait QueryGenerator: Send + Sync {
    /// Confirm the credential is accepted by the service.
    ///
    /// Failures are reported as [`Error::InvalidCredential`].
    async fn verify_credential(&self, credential: &str) -> Result<(), Error>;

    /// Return the raw reply text for `request`, before sanitizing.
    ///
    /// Failures are reported as [`Error::GenerationFailed`].
    async fn generate(&self, credential: &str, request: &QueryRequest) -> Result<String, Error>;
}
