//! Session ownership
//!
//! The engine's only stateful object is `ConversationContext`, and its
//! contract requires exactly one writer. `Session` is that writer: it owns
//! the transcript and context, serializes turns, and hides direct context
//! mutation behind `advance_rep_turn` / `advance_counterpart_turn`.
//!
//! Cue/state misalignment is recoverable: the offending cue is logged and
//! dropped rather than surfaced or crashed on.

use crate::detector::CueDetector;
use crate::encoder::AssessmentEncoder;
use crate::error::EngineError;
use crate::evaluator::RepResponseEvaluator;
use crate::metrics::METRICS_SPEC_VERSION;
use crate::scoring::ScoringEngine;
use crate::state::{validate_cue_state_alignment, ConversationalState, StateManager};
use crate::types::{
    AssessmentPayload, ConversationContext, MetricFeedback, MetricResult, RepMetricCue, Speaker,
    Transcript, Turn, TurnAssessment,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// End-of-session score snapshot: a flat `{metric_id: score}` map.
///
/// This is the only engine output intended to outlive a session. Hosts stash
/// it under an application-chosen key and re-load it later for display;
/// `None` scores stay `None` and must never be rendered as a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    /// Metric catalog version the scores were computed against
    pub spec_version: String,
    /// Overall score per metric id, `null` where not applicable
    pub scores: BTreeMap<String, Option<f64>>,
    /// When the snapshot was taken (RFC3339)
    pub computed_at_utc: String,
}

impl ScoreSnapshot {
    /// Build a snapshot from the latest metric results
    pub fn from_results(results: &[MetricResult]) -> Self {
        let scores = results
            .iter()
            .map(|r| (r.id.as_str().to_string(), r.overall_score))
            .collect();

        Self {
            spec_version: METRICS_SPEC_VERSION.to_string(),
            scores,
            computed_at_utc: Utc::now().to_rfc3339(),
        }
    }

    /// Serialize to JSON for the host's key-value store
    pub fn to_json(&self) -> Result<String, EngineError> {
        serde_json::to_string(self).map_err(EngineError::JsonError)
    }

    /// Load a snapshot back from JSON
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(EngineError::JsonError)
    }
}

/// A single conversation session: transcript, context, and latest scores.
///
/// One session, one writer: callers must serialize turns. The engine itself
/// performs no locking.
pub struct Session {
    session_id: String,
    transcript: Transcript,
    context: ConversationContext,
    state: Option<ConversationalState>,
    last_rep_cues: Vec<RepMetricCue>,
    latest_results: Vec<MetricResult>,
    encoder: AssessmentEncoder,
}

impl Session {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            transcript: Transcript::new(),
            context: ConversationContext::new(),
            state: None,
            last_rep_cues: Vec::new(),
            latest_results: Vec::new(),
            encoder: AssessmentEncoder::new(),
        }
    }

    /// Set the conversational state from scenario metadata.
    pub fn set_state_label(&mut self, label: &str) -> Result<(), EngineError> {
        self.state = Some(ConversationalState::from_label(label)?);
        Ok(())
    }

    /// Clear the conversational state (alignment checks stop running).
    pub fn clear_state(&mut self) {
        self.state = None;
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn context(&self) -> &ConversationContext {
        &self.context
    }

    /// Metric results from the most recent re-scoring
    pub fn latest_results(&self) -> &[MetricResult] {
        &self.latest_results
    }

    /// Append a representative turn and return per-metric realtime feedback.
    ///
    /// The full transcript (including this turn) is re-scored from scratch.
    pub fn advance_rep_turn(&mut self, text: &str) -> Result<Vec<MetricFeedback>, EngineError> {
        let previous_counterpart = self
            .transcript
            .last_text_for(Speaker::Counterpart)
            .map(str::to_string);

        self.transcript.push(Turn::new(Speaker::Rep, text)?);
        self.last_rep_cues =
            CueDetector::detect_rep_metrics(text, previous_counterpart.as_deref())?;

        self.latest_results = ScoringEngine::score_all_metrics(&self.transcript)?;
        Ok(RepResponseEvaluator::compose(
            &self.last_rep_cues,
            &self.latest_results,
        ))
    }

    /// Append a counterpart turn and return the full turn assessment:
    /// selected cues, prose description, and re-scored metrics.
    pub fn advance_counterpart_turn(
        &mut self,
        text: &str,
        mood: Option<&str>,
    ) -> Result<TurnAssessment, EngineError> {
        let last_rep_message = self
            .transcript
            .last_text_for(Speaker::Rep)
            .map(str::to_string);

        self.transcript.push(Turn::new(Speaker::Counterpart, text)?);

        let raw = CueDetector::detect(text, mood)?;
        let mut selected = StateManager::select(
            &raw,
            &self.context,
            &self.last_rep_cues,
            last_rep_message.as_deref(),
            mood,
            Some(self.session_id.as_str()),
        );

        if let Some(state) = self.state {
            let report = validate_cue_state_alignment(&selected, state);
            if !report.valid {
                for mismatch in &report.mismatches {
                    tracing::warn!(
                        cue_id = %mismatch.cue_id,
                        category = ?mismatch.category,
                        state = ?state,
                        "dropping cue outside allowed categories for state"
                    );
                }
                let dropped: Vec<String> =
                    report.mismatches.iter().map(|m| m.cue_id.clone()).collect();
                selected.retain(|cue| !dropped.iter().any(|id| id == cue.id));
            }
        }

        let description = crate::describe::Describer::describe(&selected, text);
        self.context = StateManager::update_context(&self.context, &selected, &self.last_rep_cues);
        self.latest_results = ScoringEngine::score_all_metrics(&self.transcript)?;

        Ok(TurnAssessment {
            cues: selected,
            description,
            metrics: self.latest_results.clone(),
        })
    }

    /// Encode a turn assessment into a versioned payload for the host
    pub fn encode(&self, assessment: TurnAssessment) -> AssessmentPayload {
        self.encoder
            .encode(&self.session_id, self.transcript.len(), assessment)
    }

    /// Take the end-of-session score snapshot
    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot::from_results(&self.latest_results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MetricId;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_session_threads_context_through_turns() {
        let mut session = Session::new("demo");

        session
            .advance_rep_turn("Thanks for making time - what outcomes matter most to your team?")
            .unwrap();
        let assessment = session
            .advance_counterpart_turn("I only have two minutes, what's this about?", None)
            .unwrap();

        assert!(!assessment.cues.is_empty());
        assert_eq!(session.context().turn_number, 1);
        assert_eq!(assessment.metrics.len(), 8);
    }

    #[test]
    fn test_state_misalignment_drops_cue_instead_of_failing() {
        let mut session = Session::new("demo");
        session.set_state_label("resistant").unwrap();

        session.advance_rep_turn("What would success look like?").unwrap();
        // Curiosity (interest) is not allowed in a resistant state
        let assessment = session
            .advance_counterpart_turn("Tell me more, how does it actually work?", None)
            .unwrap();

        assert!(assessment
            .cues
            .iter()
            .all(|c| c.category != crate::types::CueCategory::Interest));
    }

    #[test]
    fn test_unknown_state_label_is_rejected() {
        let mut session = Session::new("demo");
        assert!(session.set_state_label("melancholic").is_err());
        assert!(session.set_state_label("engaged").is_ok());
    }

    #[test]
    fn test_rep_feedback_marks_detection() {
        let mut session = Session::new("demo");
        session
            .advance_counterpart_turn("My concern is we'd be switching mid-year.", None)
            .unwrap();
        let feedback = session
            .advance_rep_turn("I understand your concern - what's driving that?")
            .unwrap();

        let objection = feedback
            .iter()
            .find(|f| f.metric_id == MetricId::ObjectionNavigation)
            .unwrap();
        assert!(objection.detected);
    }

    #[test]
    fn test_snapshot_round_trip_preserves_nulls() {
        let mut session = Session::new("demo");
        session.advance_rep_turn("Thanks for making time today.").unwrap();

        let snapshot = session.snapshot();
        // No questions asked: question_quality stays null through the cache
        assert_eq!(snapshot.scores["question_quality"], None);

        let json = snapshot.to_json().unwrap();
        let restored = ScoreSnapshot::from_json(&json).unwrap();
        assert_eq!(snapshot, restored);
        assert_eq!(restored.scores.len(), 8);
    }

    #[test]
    fn test_snapshot_before_any_turn_is_empty() {
        let session = Session::new("demo");
        let snapshot = session.snapshot();
        assert!(snapshot.scores.is_empty());
    }
}
