use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{error, info};

/// Speech engine errors
#[derive(Debug, Error)]
pub enum TranscribeError {
    #[error("failed to read audio: {0}")]
    Io(#[from] std::io::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("API error {status}: {body}")]
    Api { status: u16, body: String },
}

#[async_trait]
pub trait SpeechEngine: Send + Sync {
    async fn transcribe(&self, path: &Path) -> Result<String, TranscribeError>;
}

/// Canned transcripts keyed by a word in the audio file name. First match wins.
const FALLBACK_PHRASES: &[(&str, &str)] = &[
    ("mountain", "I want some mountains"),
    ("hill", "Make rolling hills"),
    ("valley", "Create valleys with a river"),
    ("flat", "I want a flat plain"),
    ("rough", "Make rough rocky terrain"),
    ("smooth", "Create smooth gentle hills"),
];

pub const DEFAULT_PHRASE: &str = "Create hilly terrain";

/// Transcript derived from the file stem, for running without a speech engine.
pub fn synthetic_transcript(path: &Path) -> &'static str {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let phrase = FALLBACK_PHRASES
        .iter()
        .find(|(keyword, _)| stem.contains(keyword))
        .map_or(DEFAULT_PHRASE, |&(_, phrase)| phrase);
    info!(phrase, "using fallback transcription");
    phrase
}

/// Wraps the optional speech engine. Never fails: engine errors and a missing
/// engine both produce the synthetic transcript.
pub struct Transcriber {
    engine: Option<Arc<dyn SpeechEngine>>,
}

impl Transcriber {
    pub fn new(engine: Option<Arc<dyn SpeechEngine>>) -> Self {
        Self { engine }
    }

    pub async fn transcribe(&self, path: &Path) -> String {
        let Some(engine) = &self.engine else {
            return synthetic_transcript(path).to_string();
        };
        info!(path = %path.display(), "transcribing audio file");
        match engine.transcribe(path).await {
            Ok(text) => {
                let text = text.trim().to_string();
                info!(text = %text, "transcription successful");
                text
            }
            Err(e) => {
                error!(error = %e, "transcription failed");
                synthetic_transcript(path).to_string()
            }
        }
    }
}
