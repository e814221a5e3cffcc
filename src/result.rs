use serde::Serialize;

use crate::params::ParameterRecord;

/// The single JSON document produced per request.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RequestResult {
    Success {
        text: String,
        parameters: ParameterRecord,
        keywords: Vec<String>,
        success: bool,
    },
    Failure {
        error: String,
    },
}

impl RequestResult {
    pub fn success(text: String, parameters: ParameterRecord, keywords: Vec<String>) -> Self {
        RequestResult::Success {
            text,
            parameters,
            keywords,
            success: true,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        RequestResult::Failure {
            error: error.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, RequestResult::Success { .. })
    }

    /// Pretty-printed JSON. Falls back to a hand-built error object if
    /// serialisation itself fails.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|e| {
            serde_json::json!({ "error": e.to_string() }).to_string()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    #[test]
    fn failure_has_only_error_key() {
        let json = RequestResult::failure("nope").to_json_pretty();
        let v: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(v, json!({"error": "nope"}));
    }

    #[test]
    fn success_shape() {
        let r = RequestResult::success(
            "I want rolling hills".into(),
            ParameterRecord::default(),
            vec!["hill".into(), "hills".into()],
        );
        assert!(r.is_success());
        let v: Value = serde_json::from_str(&r.to_json_pretty()).unwrap();
        let keys: Vec<&str> = v.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 4);
        assert_eq!(v["success"], json!(true));
        assert_eq!(v["keywords"], json!(["hill", "hills"]));
        assert_eq!(v["parameters"]["octaves"], json!(3));
        assert_eq!(v["parameters"]["amplitude"], json!(5.0));
    }
}
