use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tempfile::TempDir;

use voiceterrain::model::{CompletionRequest, LanguageModel, ModelError};
use voiceterrain::transcribe::{SpeechEngine, TranscribeError};
use voiceterrain::{Capabilities, ParameterRecord, Processor, RequestResult, TerrainType};

struct Speech(&'static str);

#[async_trait]
impl SpeechEngine for Speech {
    async fn transcribe(&self, _path: &Path) -> Result<String, TranscribeError> {
        Ok(self.0.to_string())
    }
}

struct Model(&'static str);

#[async_trait]
impl LanguageModel for Model {
    async fn complete(&self, _request: &CompletionRequest) -> Result<String, ModelError> {
        Ok(self.0.to_string())
    }
}

fn audio_file(name: &str) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join(name);
    std::fs::write(&path, b"RIFF\0\0\0\0WAVE").unwrap();
    (dir, path)
}

fn as_json(result: &RequestResult) -> Value {
    serde_json::from_str(&result.to_json_pretty()).unwrap()
}

#[tokio::test]
async fn missing_file_short_circuits() {
    let processor = Processor::new(Capabilities::none());
    let result = processor.process(Path::new("/nonexistent/path.wav")).await;
    assert_eq!(
        as_json(&result),
        json!({"error": "Audio file not found: /nonexistent/path.wav"})
    );
}

#[tokio::test]
async fn offline_run_uses_filename_and_heuristic() {
    let (_dir, path) = audio_file("mountain_test.wav");
    let processor = Processor::new(Capabilities::none());

    let (result, timings) = processor.process_timed(&path).await;
    let RequestResult::Success { text, parameters, keywords, success } = result else {
        panic!("expected success");
    };
    assert!(success);
    assert_eq!(text, "I want some mountains");
    assert_eq!(keywords, vec!["mountain", "mountains"]);
    assert_eq!(parameters.terrain_type, TerrainType::Mountains);
    assert_eq!(parameters.amplitude, 15.0);
    assert_eq!(parameters.frequency, 0.05);
    assert!(parameters.seed < 10000);

    let names: Vec<&str> = timings.iter().map(|t| t.name).collect();
    assert_eq!(names, ["transcribe", "analyze", "keywords", "TOTAL"]);
}

#[tokio::test]
async fn model_reply_is_validated() {
    let (_dir, path) = audio_file("clip.wav");
    let processor = Processor::new(Capabilities {
        speech: Some(Arc::new(Speech(" Big jagged mountains near a river "))),
        model: Some(Arc::new(Model(r#"{"terrain_type": 2, "amplitude": 99, "octaves": "many"}"#))),
    });

    let v = as_json(&processor.process(&path).await);
    assert_eq!(v["success"], json!(true));
    assert_eq!(v["text"], json!("Big jagged mountains near a river"));
    assert_eq!(
        v["keywords"],
        json!(["mountain", "mountains", "river", "jagged", "big"])
    );

    let parameters: ParameterRecord = serde_json::from_value(v["parameters"].clone()).unwrap();
    assert_eq!(
        parameters,
        ParameterRecord {
            terrain_type: TerrainType::Mountains,
            amplitude: 20.0,
            octaves: 1,
            ..ParameterRecord::default()
        }
    );
}

#[tokio::test]
async fn garbage_model_reply_matches_offline_analysis() {
    let (_dir, path) = audio_file("valley.wav");
    let remote = Processor::new(Capabilities {
        speech: None,
        model: Some(Arc::new(Model("I'm sorry, I can't do that."))),
    });
    let offline = Processor::new(Capabilities::none());

    let mut a = as_json(&remote.process(&path).await);
    let mut b = as_json(&offline.process(&path).await);
    a["parameters"]["seed"] = json!(0);
    b["parameters"]["seed"] = json!(0);
    assert_eq!(a, b);
    assert_eq!(a["text"], json!("Create valleys with a river"));
    assert_eq!(a["parameters"]["erosion"], json!(0.3));
}

#[tokio::test]
async fn empty_transcript_is_an_error() {
    let (_dir, path) = audio_file("silence.wav");
    let processor = Processor::new(Capabilities {
        speech: Some(Arc::new(Speech("  \n"))),
        model: None,
    });
    let result = processor.process(&path).await;
    assert!(!result.is_success());
    assert_eq!(as_json(&result), json!({"error": "Failed to transcribe audio"}));
}

#[tokio::test]
async fn every_output_is_in_range() {
    let (_dir, path) = audio_file("huge_rough_plateau.wav");
    for reply in ["{}", "[]", "{\"seed\": -1, \"plateau\": 1e9, \"persistence\": \"high\"}"] {
        let processor = Processor::new(Capabilities {
            speech: Some(Arc::new(Speech("huge massive mountains"))),
            model: Some(Arc::new(Model(reply))),
        });
        let v = as_json(&processor.process(&path).await);
        let p = &v["parameters"];
        assert!(p["amplitude"].as_f64().unwrap() <= 20.0, "{reply}");
        assert!(p["plateau"].as_f64().unwrap() <= 15.0, "{reply}");
        assert!(p["persistence"].as_f64().unwrap() >= 0.1, "{reply}");
        assert!(p["seed"].as_u64().unwrap() <= 10000, "{reply}");
        assert_eq!(p.as_object().unwrap().len(), 9);
    }
}

#[tokio::test]
async fn early_exits_still_report_total_time() {
    let processor = Processor::new(Capabilities::none());
    let (_, timings) = processor.process_timed(Path::new("/nonexistent/path.wav")).await;
    let names: Vec<&str> = timings.iter().map(|t| t.name).collect();
    assert_eq!(names, ["TOTAL"]);

    let (_dir, path) = audio_file("silence.wav");
    let processor = Processor::new(Capabilities {
        speech: Some(Arc::new(Speech(""))),
        model: None,
    });
    let (result, timings) = processor.process_timed(&path).await;
    assert!(!result.is_success());
    let names: Vec<&str> = timings.iter().map(|t| t.name).collect();
    assert_eq!(names, ["transcribe", "TOTAL"]);
}
