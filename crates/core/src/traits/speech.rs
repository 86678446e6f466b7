//! Speech processing traits

use async_trait::async_trait;
use thiserror::Error;

use crate::{AudioFormat, Language};

/// Failure modes reported by speech collaborators.
///
/// None of these abort a request: the agent swaps in a placeholder
/// transcript or drops the audio handle.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeechError {
    /// Audio was received but no speech could be recognized
    #[error("Speech not recognized")]
    Unrecognized,

    /// Remote service failed or timed out
    #[error("Speech service error: {0}")]
    Service(String),

    /// Audio payload could not be handled
    #[error("Audio processing error: {0}")]
    Audio(String),
}

/// Speech-to-Text interface
///
/// # Example
///
/// ```ignore
/// let stt: Arc<dyn SpeechToText> = Arc::new(HttpTranscriber::new(config)?);
/// let text = stt.transcribe(&bytes, AudioFormat::Wav, Language::Vietnamese).await?;
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync + 'static {
    /// Transcribe a complete audio clip
    async fn transcribe(
        &self,
        audio: &[u8],
        format: AudioFormat,
        language: Language,
    ) -> Result<String, SpeechError>;

    /// Name used in logs and health output
    fn name(&self) -> &str;
}

/// Text-to-Speech interface
///
/// Returns an opaque handle (usually a URL under `/static/audio/`) that the
/// client fetches separately.
#[async_trait]
pub trait TextToSpeech: Send + Sync + 'static {
    /// Synthesize text; `speed` is a multiplier around 1.0
    async fn synthesize(
        &self,
        text: &str,
        language: Language,
        speed: Option<f32>,
    ) -> Result<String, SpeechError>;

    /// Name used in logs and health output
    fn name(&self) -> &str;
}
