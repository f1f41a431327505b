//! Sign-to-speech and speech-to-text orchestration

use crate::config::SpeechConfig;
use crate::sentence::SentenceGenerator;
use crate::speech::{Speaker, Transcriber, Voice};
use anyhow::{Context, Result};

/// Outcome of translating a batch of sign words
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub sentence: String,
    /// False if the sentence was generated but could not be spoken
    pub spoken: bool,
}

/// Turns sign words into a spoken sentence, and speech into text
pub struct SignTranslator<S: Speaker> {
    generator: SentenceGenerator,
    speaker: S,
    voice: Voice,
    language_code: String,
}

impl<S: Speaker> SignTranslator<S> {
    pub fn new(generator: SentenceGenerator, speaker: S, config: &SpeechConfig) -> Self {
        Self {
            generator,
            speaker,
            voice: Voice::from(config),
            language_code: config.language_code.clone(),
        }
    }

    pub fn generator(&self) -> &SentenceGenerator {
        &self.generator
    }

    /// Generate a sentence from the words and speak it
    ///
    /// A speech failure is logged; the sentence is still returned.
    pub async fn translate(&self, words: &[String], context: Option<&str>) -> Result<Translation> {
        let sentence = self
            .generator
            .generate(words, context)
            .await
            .context("Failed to generate sentence")?;

        let spoken = match self.speaker.speak(&sentence, &self.voice) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("Failed to speak sentence: {:#}", e);
                false
            }
        };

        Ok(Translation { sentence, spoken })
    }

    /// Transcribe recorded speech
    ///
    /// Returns `None` when nothing was recognised.
    pub fn listen<T: Transcriber>(&self, transcriber: &T, audio: &[u8]) -> Result<Option<String>> {
        let text = transcriber
            .transcribe(audio, &self.language_code)
            .context("Failed to transcribe speech")?;

        let text = text.trim();
        if text.is_empty() {
            tracing::info!("No speech recognised");
            return Ok(None);
        }

        tracing::info!("Speech recognised ({} characters)", text.chars().count());
        Ok(Some(text.to_string()))
    }
}
