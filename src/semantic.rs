use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{info, warn};

use crate::heuristic::HeuristicAnalyzer;
use crate::model::{CompletionRequest, LanguageModel, ModelError};
use crate::params::{ParameterRecord, validate};

pub const SYSTEM_MESSAGE: &str =
    "You are a terrain parameter generator. Respond only with valid JSON.";
pub const MAX_TOKENS: u32 = 200;
pub const TEMPERATURE: f32 = 0.3;

const TERRAIN_CONTEXT: &str = r#"You are a terrain generation assistant for a VR application. Your task is to convert natural language descriptions of terrain into specific parameter values for procedural generation.

Available terrain types:
- FLAT (0): Minimal variation, plains
- HILLS (1): Rolling hills, moderate elevation changes
- MOUNTAINS (2): High peaks, dramatic elevation
- VALLEYS (3): Low areas, depressions
- PLATEAU (4): Flat-topped elevated areas
- CUSTOM (5): Mixed features

Parameters to output:
- seed: Random integer (0-10000)
- frequency: Controls feature size (0.01-1.0, lower = larger features)
- amplitude: Height variation (0.5-20.0)
- octaves: Detail layers (1-6)
- lacunarity: Frequency multiplier per octave (1.5-3.0)
- persistence: Amplitude multiplier per octave (0.1-0.8)
- terrain_type: Integer 0-5 corresponding to types above
- erosion: Water erosion effect (0.0-1.0)
- plateau: Plateau threshold (0.0-15.0)

Examples:
"I want rolling hills" -> {"terrain_type": 1, "amplitude": 8.0, "frequency": 0.1}
"Make some mountains with rivers" -> {"terrain_type": 2, "amplitude": 15.0, "erosion": 0.3}
"Flat area with small bumps" -> {"terrain_type": 0, "amplitude": 2.0, "octaves": 2}"#;

pub fn build_prompt(text: &str) -> String {
    format!(
        "{TERRAIN_CONTEXT}\n\nUser request: \"{text}\"\n\n\
         Respond with ONLY a JSON object containing the terrain parameters. No explanation."
    )
}

pub fn completion_request(text: &str) -> CompletionRequest {
    CompletionRequest {
        prompt: build_prompt(text),
        system_message: SYSTEM_MESSAGE.to_string(),
        max_tokens: MAX_TOKENS,
        temperature: TEMPERATURE,
    }
}

/// Why the remote path produced no mapping.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("no language model configured")]
    Unavailable,

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error("response is not JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("response is JSON {0}, expected an object")]
    NotAnObject(&'static str),
}

fn kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Model-backed analysis with the keyword heuristic behind it.
///
/// Exactly one remote attempt per call. Any failure (no model, transport,
/// non-JSON, non-object) discards the reply and runs the heuristic instead.
pub struct SemanticAnalyzer {
    model: Option<Arc<dyn LanguageModel>>,
    fallback: HeuristicAnalyzer,
}

impl SemanticAnalyzer {
    pub fn new(model: Option<Arc<dyn LanguageModel>>) -> Self {
        Self {
            model,
            fallback: HeuristicAnalyzer,
        }
    }

    pub async fn analyze(&self, text: &str) -> ParameterRecord {
        match self.remote_parameters(text).await {
            Ok(raw) => validate(&raw),
            Err(RemoteError::Unavailable) => self.fallback.analyze(text),
            Err(e) => {
                warn!(error = %e, "remote analysis failed");
                self.fallback.analyze(text)
            }
        }
    }

    pub async fn remote_parameters(&self, text: &str) -> Result<Map<String, Value>, RemoteError> {
        let model = self.model.as_ref().ok_or(RemoteError::Unavailable)?;
        info!(text, "analyzing terrain request");

        let reply = model.complete(&completion_request(text)).await?;
        let reply = reply.trim();
        info!(reply, "model response");

        match serde_json::from_str::<Value>(reply)? {
            Value::Object(map) => Ok(map),
            other => Err(RemoteError::NotAnObject(kind(&other))),
        }
    }
}
