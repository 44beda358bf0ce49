//! Mock provider implementation for tests and offline runs.

use super::{FinishReason, ProviderError, ProviderResponse, TextProvider};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Reply used by [`MockTextProvider::offline`].
const OFFLINE_REPLY: &str = r#"{"issues":[],"recommendation":"Mock provider: no analysis performed.","guidance":[]}"#;

/// Mock text provider returning a scripted reply or error.
///
/// Records how often it was called and the last prompt it saw.
pub struct MockTextProvider {
    reply: Result<String, ProviderError>,
    finish_reason: FinishReason,
    calls: AtomicUsize,
    last_prompt: Mutex<Option<String>>,
}

impl MockTextProvider {
    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self::with_reply(Ok(text.into()))
    }

    /// Always fail with `error`.
    pub fn failing(error: ProviderError) -> Self {
        Self::with_reply(Err(error))
    }

    /// Answer with `text` reported as cut off at the token limit.
    pub fn truncated(text: impl Into<String>) -> Self {
        Self {
            finish_reason: FinishReason::Length,
            ..Self::replying(text)
        }
    }

    /// Canned well-formed reply, used when `GENAI_PROVIDER=mock`.
    pub fn offline() -> Self {
        Self::replying(OFFLINE_REPLY)
    }

    fn with_reply(reply: Result<String, ProviderError>) -> Self {
        Self {
            reply,
            finish_reason: FinishReason::Complete,
            calls: AtomicUsize::new(0),
            last_prompt: Mutex::new(None),
        }
    }

    /// Number of `generate` calls so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_prompt(&self) -> Option<String> {
        self.last_prompt
            .lock()
            .map(|p| p.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl TextProvider for MockTextProvider {
    async fn generate(
        &self,
        prompt: &str,
        _model: &str,
    ) -> Result<ProviderResponse, ProviderError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_prompt.lock() {
            *last = Some(prompt.to_string());
        }

        let text = self.reply.clone()?;

        Ok(ProviderResponse {
            input_tokens: prompt.len() as i32 / 4,
            output_tokens: text.len() as i32 / 4,
            text,
            finish_reason: self.finish_reason,
        })
    }

    /// Healthy unless scripted to fail.
    async fn health_check(&self) -> Result<(), ProviderError> {
        self.reply.as_ref().map(|_| ()).map_err(Clone::clone)
    }
}
