//! Job specification and result documents

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

/// Pipeline specification produced by the pipeline designer
///
/// Opaque to the client; it is forwarded to the controller unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobSpec(pub JsonValue);

impl JobSpec {
    pub fn new(value: JsonValue) -> Self {
        Self(value)
    }

    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }
}

/// Session credential issued by the controller
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionToken(pub String);

impl SessionToken {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Worker endpoint assigned by the controller
///
/// The worker lives on the controller's host, so only the port varies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerEndpoint {
    pub port: u16,
}

impl std::fmt::Display for WorkerEndpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "worker:{}", self.port)
    }
}

/// Score of one trained model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelScore {
    pub model_id: JsonValue,
    pub score: f64,
}

/// Result document returned by the worker
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResultDocument(pub JsonValue);

impl ResultDocument {
    pub fn as_json(&self) -> &JsonValue {
        &self.0
    }

    /// Decodes the per-model performance table
    ///
    /// The worker serializes its table to a JSON string before returning
    /// it, so the document is either an array of records or a string
    /// holding one. Returns `None` for any other shape.
    pub fn model_scores(&self) -> Option<Vec<ModelScore>> {
        match &self.0 {
            JsonValue::String(encoded) => serde_json::from_str(encoded).ok(),
            value @ JsonValue::Array(_) => serde_json::from_value(value.clone()).ok(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_model_scores_from_array() {
        let doc = ResultDocument(json!([
            { "model_id": "rf-1", "score": 0.91 },
            { "model_id": 2, "score": 0.5 }
        ]));
        let scores = doc.model_scores().unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[0].model_id, json!("rf-1"));
        assert_eq!(scores[1].score, 0.5);
    }

    #[test]
    fn test_model_scores_from_double_encoded_string() {
        let doc = ResultDocument(json!("[{\"model_id\":\"lr\",\"score\":0.75}]"));
        let scores = doc.model_scores().unwrap();
        assert_eq!(scores[0].model_id, json!("lr"));
        assert_eq!(scores[0].score, 0.75);
    }

    #[test]
    fn test_model_scores_other_shapes() {
        assert!(ResultDocument(json!({ "accuracy": 0.91 })).model_scores().is_none());
        assert!(ResultDocument(json!("not json")).model_scores().is_none());
    }
}
