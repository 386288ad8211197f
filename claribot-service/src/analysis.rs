//! Financial analysis of extracted document text.

pub mod prompts;
pub mod response;
pub mod retry;

use futures::future::BoxFuture;

use crate::error::BackendError;

pub use prompts::{Language, build_prompt};
pub use response::parse_analysis;

/// A generative model that answers a prompt with free-form text.
pub trait AnalysisBackend: Send + Sync {
    fn generate<'a>(&'a self, prompt: &'a str) -> BoxFuture<'a, Result<String, BackendError>>;
}
