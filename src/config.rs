use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use thiserror::Error;
use tracing::{info, warn};

use crate::Capabilities;
use crate::model::LanguageModel;
use crate::openai::OpenAiClient;
use crate::transcribe::SpeechEngine;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_SPEECH_MODEL: &str = "whisper-1";
/// Credential file looked up next to the executable.
pub const KEY_FILE_NAME: &str = "openai_key.txt";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// Runtime settings for the remote collaborators.
#[derive(Clone)]
pub struct Config {
    pub api_key: Option<String>,
    pub api_base: String,
    pub model: String,
    pub speech_model: String,
    pub timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            speech_model: DEFAULT_SPEECH_MODEL.to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .field("speech_model", &self.speech_model)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl Config {
    /// Builds the collaborators once. No credential is not an error: every
    /// request then runs on the fallback paths.
    pub fn capabilities(&self) -> Result<Capabilities, ConfigError> {
        let Some(api_key) = &self.api_key else {
            warn!("no OpenAI API key found, using fallback mode");
            return Ok(Capabilities::none());
        };
        let client = Arc::new(OpenAiClient::new(self, api_key.clone())?);
        info!(model = %self.model, speech_model = %self.speech_model, "OpenAI client initialized");
        let speech: Arc<dyn SpeechEngine> = client.clone();
        let model: Arc<dyn LanguageModel> = client;
        Ok(Capabilities {
            speech: Some(speech),
            model: Some(model),
        })
    }
}

/// `openai_key.txt` beside the running executable.
pub fn default_key_file() -> Option<PathBuf> {
    let exe = std::env::current_exe().ok()?;
    Some(exe.parent()?.join(KEY_FILE_NAME))
}

fn non_empty(s: &str) -> Option<String> {
    let s = s.trim();
    (!s.is_empty()).then(|| s.to_string())
}

/// Environment value first, then the credential file.
pub fn resolve_api_key(env_value: Option<&str>, key_file: Option<&Path>) -> Option<String> {
    if let Some(key) = env_value.and_then(non_empty) {
        return Some(key);
    }
    let path = key_file?;
    match std::fs::read_to_string(path) {
        Ok(contents) => {
            let key = non_empty(&contents);
            if key.is_some() {
                info!(path = %path.display(), "loaded OpenAI API key from file");
            }
            key
        }
        Err(_) => None,
    }
}

/// Flags shared by the CLI and the server.
#[derive(Args, Debug, Clone)]
pub struct ConfigArgs {
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, hide = true)]
    pub api_key: Option<String>,

    /// Credential file used when OPENAI_API_KEY is unset
    #[arg(long)]
    pub key_file: Option<PathBuf>,

    #[arg(long, env = "OPENAI_API_BASE", default_value = DEFAULT_API_BASE)]
    pub api_base: String,

    /// Chat model used to interpret the transcript
    #[arg(long, env = "VOICETERRAIN_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,

    #[arg(long, env = "VOICETERRAIN_SPEECH_MODEL", default_value = DEFAULT_SPEECH_MODEL)]
    pub speech_model: String,

    /// HTTP timeout for each remote call
    #[arg(long, default_value_t = 60)]
    pub timeout_secs: u64,
}

impl ConfigArgs {
    pub fn into_config(self) -> Config {
        let key_file = self.key_file.or_else(default_key_file);
        Config {
            api_key: resolve_api_key(self.api_key.as_deref(), key_file.as_deref()),
            api_base: self.api_base.trim().trim_end_matches('/').to_string(),
            model: self.model,
            speech_model: self.speech_model,
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_value_wins_over_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(KEY_FILE_NAME);
        std::fs::write(&file, "file-key\n").unwrap();
        assert_eq!(resolve_api_key(Some("env-key"), Some(&file)).as_deref(), Some("env-key"));
    }

    #[test]
    fn blank_env_falls_through_to_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join(KEY_FILE_NAME);
        std::fs::write(&file, "  file-key \n").unwrap();
        assert_eq!(resolve_api_key(Some(""), Some(&file)).as_deref(), Some("file-key"));
        assert_eq!(resolve_api_key(None, Some(&file)).as_deref(), Some("file-key"));
    }

    #[test]
    fn nothing_configured() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join(KEY_FILE_NAME);
        assert_eq!(resolve_api_key(None, Some(&missing)), None);
        assert_eq!(resolve_api_key(None, None), None);

        let empty = dir.path().join("empty.txt");
        std::fs::write(&empty, "\n").unwrap();
        assert_eq!(resolve_api_key(None, Some(&empty)), None);
    }

    #[test]
    fn no_key_means_no_capabilities() {
        let caps = Config::default().capabilities().unwrap();
        assert!(caps.speech.is_none());
        assert!(caps.model.is_none());
    }

    #[test]
    fn key_enables_both_collaborators() {
        let config = Config {
            api_key: Some("sk-test".into()),
            ..Config::default()
        };
        let caps = config.capabilities().unwrap();
        assert!(caps.speech.is_some());
        assert!(caps.model.is_some());
        assert!(!format!("{config:?}").contains("sk-test"));
    }
}
