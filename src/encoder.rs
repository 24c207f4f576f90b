//! Assessment encoding
//!
//! Wraps per-turn engine output into a versioned payload with producer and
//! session provenance, ready to hand to a host UI or store.

use crate::error::EngineError;
use crate::types::{
    AssessmentPayload, AssessmentProducer, AssessmentSession, TurnAssessment,
};
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current assessment payload version
pub const ASSESSMENT_VERSION: &str = "1.0.0";

/// Encoder for producing versioned assessment payloads
pub struct AssessmentEncoder {
    instance_id: String,
}

impl Default for AssessmentEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl AssessmentEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    /// Wrap a turn assessment into a payload
    pub fn encode(
        &self,
        session_id: &str,
        turn_count: usize,
        assessment: TurnAssessment,
    ) -> AssessmentPayload {
        AssessmentPayload {
            assessment_version: ASSESSMENT_VERSION.to_string(),
            producer: AssessmentProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            session: AssessmentSession {
                session_id: session_id.to_string(),
                turn_count,
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            cues: assessment.cues,
            description: assessment.description,
            metrics: assessment.metrics,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json(
        &self,
        session_id: &str,
        turn_count: usize,
        assessment: TurnAssessment,
    ) -> Result<String, EngineError> {
        let payload = self.encode(session_id, turn_count, assessment);
        serde_json::to_string_pretty(&payload).map_err(EngineError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::describe::Describer;
    use crate::scoring::ScoringEngine;
    use crate::types::Transcript;

    fn empty_assessment() -> TurnAssessment {
        TurnAssessment {
            cues: Vec::new(),
            description: Describer::describe(&[], "Okay."),
            metrics: ScoringEngine::score_all_metrics(&Transcript::new()).unwrap(),
        }
    }

    #[test]
    fn test_payload_shape() {
        let encoder = AssessmentEncoder::with_instance_id("fixed-instance".to_string());
        let json = encoder
            .encode_to_json("session-1", 4, empty_assessment())
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["assessment_version"], ASSESSMENT_VERSION);
        assert_eq!(value["producer"]["name"], PRODUCER_NAME);
        assert_eq!(value["producer"]["instance_id"], "fixed-instance");
        assert_eq!(value["session"]["session_id"], "session-1");
        assert_eq!(value["session"]["turn_count"], 4);
        assert_eq!(value["metrics"].as_array().unwrap().len(), 8);
    }

    #[test]
    fn test_not_applicable_metrics_serialize_as_null() {
        let encoder = AssessmentEncoder::new();
        let json = encoder
            .encode_to_json("session-1", 0, empty_assessment())
            .unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        for metric in value["metrics"].as_array().unwrap() {
            assert!(metric["overall_score"].is_null());
            assert_eq!(metric["not_applicable"], true);
        }
    }
}
