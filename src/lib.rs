pub mod config;
pub mod heuristic;
pub mod keywords;
pub mod model;
pub mod openai;
pub mod params;
pub mod result;
pub mod semantic;
pub mod transcribe;

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use model::LanguageModel;
use semantic::SemanticAnalyzer;
use transcribe::{SpeechEngine, Transcriber};

pub use params::{ParameterRecord, TerrainType};
pub use result::RequestResult;

pub struct Timing {
    pub name: &'static str,
    pub ms: f64,
}

fn push_total(timings: &mut Vec<Timing>, start: Instant) {
    timings.push(Timing {
        name: "TOTAL",
        ms: start.elapsed().as_secs_f64() * 1000.0,
    });
}

/// Remote collaborators available to the pipeline. `None` routes every
/// request through the matching fallback.
#[derive(Clone, Default)]
pub struct Capabilities {
    pub speech: Option<Arc<dyn SpeechEngine>>,
    pub model: Option<Arc<dyn LanguageModel>>,
}

impl Capabilities {
    pub fn none() -> Self {
        Self::default()
    }
}

/// Audio file → transcript → terrain parameters. Holds no per-request state.
pub struct Processor {
    transcriber: Transcriber,
    analyzer: SemanticAnalyzer,
}

impl Processor {
    pub fn new(capabilities: Capabilities) -> Self {
        Self {
            transcriber: Transcriber::new(capabilities.speech),
            analyzer: SemanticAnalyzer::new(capabilities.model),
        }
    }

    pub async fn process(&self, path: &Path) -> RequestResult {
        self.process_timed(path).await.0
    }

    pub async fn process_timed(&self, path: &Path) -> (RequestResult, Vec<Timing>) {
        let mut timings = Vec::new();
        let total_start = Instant::now();

        // 1. Input check
        if !path.exists() {
            push_total(&mut timings, total_start);
            return (
                RequestResult::failure(format!("Audio file not found: {}", path.display())),
                timings,
            );
        }

        // 2. Speech → text (falls back to the file name)
        let t = Instant::now();
        let text = self.transcriber.transcribe(path).await;
        timings.push(Timing {
            name: "transcribe",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });
        if text.is_empty() {
            push_total(&mut timings, total_start);
            return (RequestResult::failure("Failed to transcribe audio"), timings);
        }

        // 3. Text → parameters (model, else keyword heuristic)
        let t = Instant::now();
        let parameters = self.analyzer.analyze(&text).await;
        timings.push(Timing {
            name: "analyze",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });

        // 4. Diagnostic keywords, independent of the analysis path
        let t = Instant::now();
        let keywords = keywords::extract_keywords(&text);
        timings.push(Timing {
            name: "keywords",
            ms: t.elapsed().as_secs_f64() * 1000.0,
        });

        push_total(&mut timings, total_start);
        for t in &timings {
            debug!(stage = t.name, ms = t.ms, "stage timing");
        }

        info!(%text, ?parameters, ?keywords, "voice processing complete");
        (RequestResult::success(text, parameters, keywords), timings)
    }
}

/// Logs to stderr; stdout is reserved for the JSON result.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
