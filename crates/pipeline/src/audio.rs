//! Upload validation
//!
//! Runs before any transcription: the container must be one we accept and
//! the payload must be non-empty and within the size cap.

use figuro_voice_core::{AudioFormat, Error, Result};

/// Pick the container from an explicit format string, falling back to the
/// file name's extension
pub fn resolve_format(format: Option<&str>, filename: Option<&str>) -> Result<AudioFormat> {
    match (format.map(str::trim).filter(|f| !f.is_empty()), filename) {
        (Some(format), _) => format.parse(),
        (None, Some(filename)) => AudioFormat::from_filename(filename),
        (None, None) => Err(Error::InvalidInput(
            "audio format or filename is required".to_string(),
        )),
    }
}

/// Check size bounds of an upload
pub fn validate_audio(bytes: &[u8], max_bytes: usize) -> Result<()> {
    if bytes.is_empty() {
        return Err(Error::InvalidInput("audio payload is empty".to_string()));
    }
    if bytes.len() > max_bytes {
        return Err(Error::AudioTooLarge {
            size: bytes.len(),
            max: max_bytes,
        });
    }
    Ok(())
}
