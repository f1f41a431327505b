//! Sentence generation subsystem
//!
//! Turns the accumulated sign words into one natural Korean sentence using a
//! chat completions model, with an on-disk cache of previous results.

pub mod cache;
pub mod client;
pub mod prompts;

pub use cache::{CacheStats, SentenceCache};
pub use client::ChatClient;

use crate::config::SentenceConfig;
use parking_lot::Mutex;

/// Error types for sentence generation
#[derive(Debug, thiserror::Error)]
pub enum SentenceError {
    #[error("No words to build a sentence from")]
    EmptyInput,

    #[error("API key not set (environment variable {0})")]
    MissingApiKey(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timeout after {0} seconds")]
    Timeout(u64),

    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Failed to parse response: {0}")]
    ParseError(String),

    #[error("Model returned an empty sentence")]
    EmptyResponse,
}

/// Generates sentences from sign words, consulting the cache first
pub struct SentenceGenerator {
    client: ChatClient,
    cache: Option<Mutex<SentenceCache>>,
}

impl SentenceGenerator {
    /// Create a generator; `cache` is ignored when caching is disabled
    pub fn new(client: ChatClient, cache: SentenceCache, config: &SentenceConfig) -> Self {
        Self {
            client,
            cache: config.use_cache.then(|| Mutex::new(cache)),
        }
    }

    /// Create a generator without a cache
    pub fn without_cache(client: ChatClient) -> Self {
        Self {
            client,
            cache: None,
        }
    }

    /// Cache statistics, if caching is enabled
    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(|cache| cache.lock().stats())
    }

    /// Clear the cache, if caching is enabled
    pub fn clear_cache(&self) -> Result<(), String> {
        match &self.cache {
            Some(cache) => cache.lock().clear(),
            None => Ok(()),
        }
    }

    /// Generate a sentence for the given words
    pub async fn generate(
        &self,
        words: &[String],
        context: Option<&str>,
    ) -> Result<String, SentenceError> {
        if words.is_empty() {
            return Err(SentenceError::EmptyInput);
        }

        let cached = self
            .cache
            .as_ref()
            .and_then(|cache| cache.lock().get(words, context));
        if let Some(sentence) = cached {
            return Ok(sentence);
        }

        tracing::info!("Generating sentence for {} words", words.len());

        let prompt = prompts::build_prompt(words, context);
        let reply = self
            .client
            .complete(prompts::SYSTEM_PROMPT, &prompt)
            .await
            .map_err(|e| {
                tracing::error!("Sentence generation failed: {}", e);
                e
            })?;

        let sentence = prompts::post_process(&reply);
        if sentence.is_empty() {
            return Err(SentenceError::EmptyResponse);
        }

        if let Some(cache) = &self.cache {
            if let Err(e) = cache.lock().insert(words, context, &sentence) {
                tracing::warn!("Failed to save sentence cache: {}", e);
            }
        }

        tracing::info!("Sentence generated: {}", sentence);
        Ok(sentence)
    }
}
