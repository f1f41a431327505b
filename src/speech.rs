//! Speech collaborators
//!
//! Text-to-speech and speech-to-text are provided by cloud services outside
//! this crate. These traits are the seams the translator talks to.

use crate::config::SpeechConfig;

/// Voice parameters for synthesis
#[derive(Debug, Clone, PartialEq)]
pub struct Voice {
    pub name: String,
    pub speaking_rate: f32,
    pub pitch: f32,
}

impl From<&SpeechConfig> for Voice {
    fn from(config: &SpeechConfig) -> Self {
        Self {
            name: config.voice.clone(),
            speaking_rate: config.speaking_rate,
            pitch: config.pitch,
        }
    }
}

/// Speaks text aloud
pub trait Speaker {
    fn speak(&self, text: &str, voice: &Voice) -> anyhow::Result<()>;
}

/// Converts recorded audio to text
pub trait Transcriber {
    /// Returns the recognised text, which may be empty
    fn transcribe(&self, audio: &[u8], language_code: &str) -> anyhow::Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_voice_from_config() {
        let voice = Voice::from(&SpeechConfig::default());
        assert_eq!(voice.name, "ko-KR-Wavenet-A");
        assert_eq!(voice.speaking_rate, 1.0);
        assert_eq!(voice.pitch, 0.0);
    }
}
