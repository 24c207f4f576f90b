//! Core types for the Repsense engine
//!
//! This module defines the data structures that flow through the engine:
//! transcript turns, behavioral cues, conversation context, metric results,
//! and the versioned assessment payload handed back to hosts.

use crate::error::EngineError;
use serde::{Deserialize, Serialize};

/// Which side of the conversation a turn belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Speaker {
    Rep,
    Counterpart,
}

impl Speaker {
    pub fn as_str(&self) -> &'static str {
        match self {
            Speaker::Rep => "rep",
            Speaker::Counterpart => "counterpart",
        }
    }
}

/// A single conversation turn. Immutable once appended to a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke
    pub speaker: Speaker,
    /// What they said
    pub text: String,
}

impl Turn {
    /// Create a turn, rejecting blank text up front
    pub fn new(speaker: Speaker, text: impl Into<String>) -> Result<Self, EngineError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }
        Ok(Self { speaker, text })
    }
}

/// An ordered, append-only sequence of turns.
///
/// Insertion order is the conversation order and is semantically meaningful.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript {
    turns: Vec<Turn>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a turn. The transcript never reorders or removes turns.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    /// All representative turns, in conversation order
    pub fn rep_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns.iter().filter(|t| t.speaker == Speaker::Rep)
    }

    /// All counterpart turns, in conversation order
    pub fn counterpart_turns(&self) -> impl Iterator<Item = &Turn> {
        self.turns
            .iter()
            .filter(|t| t.speaker == Speaker::Counterpart)
    }

    /// Text of the most recent turn for the given speaker
    pub fn last_text_for(&self, speaker: Speaker) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.speaker == speaker)
            .map(|t| t.text.as_str())
    }

    /// Check every turn for blank text, reporting the first offender
    pub fn validate(&self) -> Result<(), EngineError> {
        for (index, turn) in self.turns.iter().enumerate() {
            if turn.text.trim().is_empty() {
                return Err(EngineError::MalformedTurn {
                    index,
                    reason: "empty text".to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Cue signal strength
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
}

/// Counterpart-side cue category.
///
/// This is a closed set of exactly four values; all state filtering logic
/// reasons over it. Adding a variant requires updating the state mapping
/// table in `state`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CueCategory {
    Engagement,
    Resistance,
    Interest,
    Stress,
}

impl CueCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CueCategory::Engagement => "engagement",
            CueCategory::Resistance => "resistance",
            CueCategory::Interest => "interest",
            CueCategory::Stress => "stress",
        }
    }
}

/// An observable behavioral cue detected from a single counterpart message.
///
/// All fields reference the static taxonomy, so cues are cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BehavioralCue {
    pub id: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub severity: Severity,
    pub category: CueCategory,
}

/// Representative-side metric cue category (closed set, one per metric)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepMetricCategory {
    Question,
    Listening,
    Value,
    Engagement,
    Objection,
    Control,
    Commitment,
    Adaptability,
}

/// A representative-side cue: evidence that a competency showed up this turn
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RepMetricCue {
    pub id: &'static str,
    pub label: &'static str,
    pub category: RepMetricCategory,
}

/// Coarse representative performance classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepPerformance {
    Poor,
    Fair,
    Good,
    Excellent,
}

/// Counterpart mood trend across turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MoodTrend {
    Improving,
    Stable,
    Declining,
}

/// Running conversational context, created once per session and mutated
/// additively after each counterpart turn. Exactly one owner writes it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    /// Number of counterpart turns processed so far
    pub turn_number: u32,
    /// Recently surfaced cue ids, oldest first, capped
    pub previous_cues: Vec<String>,
    /// Latest representative performance classification
    pub rep_performance: RepPerformance,
    /// Latest counterpart mood trend
    pub hcp_mood: MoodTrend,
}

impl ConversationContext {
    pub fn new() -> Self {
        Self {
            turn_number: 0,
            previous_cues: Vec::new(),
            rep_performance: RepPerformance::Fair,
            hcp_mood: MoodTrend::Stable,
        }
    }
}

impl Default for ConversationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// The eight fixed behavioral metrics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MetricId {
    QuestionQuality,
    ActiveListening,
    ValueCommunication,
    EngagementBuilding,
    ObjectionNavigation,
    ConversationControl,
    CommitmentGaining,
    Adaptability,
}

impl MetricId {
    /// All metrics in canonical (output) order
    pub const ALL: [MetricId; 8] = [
        MetricId::QuestionQuality,
        MetricId::ActiveListening,
        MetricId::ValueCommunication,
        MetricId::EngagementBuilding,
        MetricId::ObjectionNavigation,
        MetricId::ConversationControl,
        MetricId::CommitmentGaining,
        MetricId::Adaptability,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MetricId::QuestionQuality => "question_quality",
            MetricId::ActiveListening => "active_listening",
            MetricId::ValueCommunication => "value_communication",
            MetricId::EngagementBuilding => "engagement_building",
            MetricId::ObjectionNavigation => "objection_navigation",
            MetricId::ConversationControl => "conversation_control",
            MetricId::CommitmentGaining => "commitment_gaining",
            MetricId::Adaptability => "adaptability",
        }
    }
}

/// How a metric combines its component scores
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregation {
    Average,
    WeightedAverage,
}

/// Result for a single metric component.
///
/// Invariant: `score.is_none()` exactly when `applicable` is false. A
/// component is either scored or explicitly inapplicable, never both or
/// neither.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentResult {
    pub name: &'static str,
    /// 1..=5 when scored
    pub score: Option<u8>,
    pub applicable: bool,
    pub weight: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

/// Result for one metric over a full transcript.
///
/// `overall_score` is `None` iff every component was inapplicable, in which
/// case `not_applicable` is true. A metric is never coerced to a numeric
/// score without evidence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricResult {
    pub id: MetricId,
    pub components: Vec<ComponentResult>,
    pub overall_score: Option<f64>,
    pub not_applicable: bool,
}

/// Prose rendering of a selected cue set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BehavioralDescription {
    pub body_language: Vec<String>,
    pub vocal_tone: Vec<String>,
    pub physical_cues: Vec<String>,
    pub overall_description: String,
}

/// Per-metric realtime feedback combining single-turn detection with the
/// authoritative whole-transcript score
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricFeedback {
    pub metric_id: MetricId,
    pub score: Option<f64>,
    pub detected: bool,
    pub rationale: String,
}

/// Everything the engine produces for one counterpart turn
#[derive(Debug, Clone, Serialize)]
pub struct TurnAssessment {
    pub cues: Vec<BehavioralCue>,
    pub description: BehavioralDescription,
    pub metrics: Vec<MetricResult>,
}

/// Producer metadata attached to every assessment payload
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Session provenance attached to every assessment payload
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentSession {
    pub session_id: String,
    pub turn_count: usize,
}

/// Versioned envelope handed to hosts after each counterpart turn
#[derive(Debug, Clone, Serialize)]
pub struct AssessmentPayload {
    pub assessment_version: String,
    pub producer: AssessmentProducer,
    pub session: AssessmentSession,
    pub computed_at_utc: String,
    pub cues: Vec<BehavioralCue>,
    pub description: BehavioralDescription,
    pub metrics: Vec<MetricResult>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speaker_serialization() {
        let json = serde_json::to_string(&Speaker::Counterpart).unwrap();
        assert_eq!(json, "\"counterpart\"");

        let parsed: Speaker = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Speaker::Counterpart);
    }

    #[test]
    fn test_turn_rejects_blank_text() {
        assert!(Turn::new(Speaker::Rep, "   ").is_err());
        assert!(Turn::new(Speaker::Rep, "hello").is_ok());
    }

    #[test]
    fn test_transcript_deserialization() {
        let json = r#"[
            {"speaker": "rep", "text": "Good morning, thanks for making time."},
            {"speaker": "counterpart", "text": "I only have a few minutes."}
        ]"#;

        let transcript: Transcript = serde_json::from_str(json).unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript.rep_turns().count(), 1);
        assert_eq!(transcript.counterpart_turns().count(), 1);
        assert!(transcript.validate().is_ok());
    }

    #[test]
    fn test_transcript_validate_flags_blank_turn() {
        let json = r#"[{"speaker": "rep", "text": "  "}]"#;
        let transcript: Transcript = serde_json::from_str(json).unwrap();

        match transcript.validate() {
            Err(EngineError::MalformedTurn { index, .. }) => assert_eq!(index, 0),
            other => panic!("expected MalformedTurn, got {other:?}"),
        }
    }

    #[test]
    fn test_last_text_for() {
        let mut transcript = Transcript::new();
        transcript.push(Turn::new(Speaker::Rep, "first rep").unwrap());
        transcript.push(Turn::new(Speaker::Counterpart, "first hcp").unwrap());
        transcript.push(Turn::new(Speaker::Rep, "second rep").unwrap());

        assert_eq!(transcript.last_text_for(Speaker::Rep), Some("second rep"));
        assert_eq!(
            transcript.last_text_for(Speaker::Counterpart),
            Some("first hcp")
        );
    }

    #[test]
    fn test_metric_id_order_is_stable() {
        assert_eq!(MetricId::ALL.len(), 8);
        assert_eq!(MetricId::ALL[0].as_str(), "question_quality");
        assert_eq!(MetricId::ALL[7].as_str(), "adaptability");
    }

    #[test]
    fn test_context_starts_at_turn_zero() {
        let context = ConversationContext::new();
        assert_eq!(context.turn_number, 0);
        assert!(context.previous_cues.is_empty());
        assert_eq!(context.rep_performance, RepPerformance::Fair);
        assert_eq!(context.hcp_mood, MoodTrend::Stable);
    }
}
