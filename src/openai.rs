//! OpenAI HTTP client
//!
//! Chat completions back the semantic analyzer, audio transcriptions back the
//! speech engine. One client serves both, built once at startup.

use std::path::Path;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use serde_json::json;

use crate::config::{Config, ConfigError};
use crate::model::{CompletionRequest, LanguageModel, ModelError};
use crate::transcribe::{SpeechEngine, TranscribeError};

const USER_AGENT: &str = concat!("voiceterrain/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranscriptionResponse {
    text: String,
}

impl ChatResponse {
    fn into_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message.content
    }
}

pub struct OpenAiClient {
    http_client: reqwest::Client,
    api_base: String,
    api_key: String,
    model: String,
    speech_model: String,
}

impl OpenAiClient {
    pub fn new(config: &Config, api_key: String) -> Result<Self, ConfigError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http_client,
            api_base: config.api_base.clone(),
            api_key,
            model: config.model.clone(),
            speech_model: config.speech_model.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.api_base, path)
    }
}

/// Reads the error body for a non-2xx response.
async fn error_body(response: reqwest::Response) -> (u16, String) {
    let status = response.status().as_u16();
    (status, response.text().await.unwrap_or_default())
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String, ModelError> {
        let body = json!({
            "model": self.model,
            "messages": [
                {"role": "system", "content": request.system_message},
                {"role": "user", "content": request.prompt},
            ],
            "max_tokens": request.max_tokens,
            "temperature": request.temperature,
        });

        tracing::debug!(model = %self.model, "requesting chat completion");

        let response = self
            .http_client
            .post(self.endpoint("chat/completions"))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = error_body(response).await;
            return Err(ModelError::Api { status, body });
        }

        let parsed: ChatResponse = response.json().await?;
        parsed
            .into_content()
            .filter(|c| !c.trim().is_empty())
            .ok_or(ModelError::EmptyResponse)
    }
}

#[async_trait]
impl SpeechEngine for OpenAiClient {
    async fn transcribe(&self, path: &Path) -> Result<String, TranscribeError> {
        let audio = tokio::fs::read(path).await?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "audio".to_string());

        tracing::debug!(
            bytes = audio.len(),
            file_name = %file_name,
            "uploading audio for transcription"
        );

        let form = Form::new()
            .text("model", self.speech_model.clone())
            .part("file", Part::bytes(audio).file_name(file_name));

        let response = self
            .http_client
            .post(self.endpoint("audio/transcriptions"))
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let (status, body) = error_body(response).await;
            return Err(TranscribeError::Api { status, body });
        }

        let parsed: TranscriptionResponse = response.json().await?;
        Ok(parsed.text)
    }
}
