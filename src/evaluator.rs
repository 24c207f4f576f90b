//! Rep response evaluation
//!
//! Composition layer for realtime feedback: combines single-turn rep-metric
//! detection (immediate) with whole-transcript scoring (authoritative) into a
//! per-metric view the host can render after each representative turn.

use crate::detector::CueDetector;
use crate::error::EngineError;
use crate::scoring::ScoringEngine;
use crate::types::{
    MetricFeedback, MetricId, MetricResult, RepMetricCategory, RepMetricCue, Transcript,
};

/// Map a rep cue category to the metric it evidences
fn metric_for_category(category: RepMetricCategory) -> MetricId {
    match category {
        RepMetricCategory::Question => MetricId::QuestionQuality,
        RepMetricCategory::Listening => MetricId::ActiveListening,
        RepMetricCategory::Value => MetricId::ValueCommunication,
        RepMetricCategory::Engagement => MetricId::EngagementBuilding,
        RepMetricCategory::Objection => MetricId::ObjectionNavigation,
        RepMetricCategory::Control => MetricId::ConversationControl,
        RepMetricCategory::Commitment => MetricId::CommitmentGaining,
        RepMetricCategory::Adaptability => MetricId::Adaptability,
    }
}

/// Score-banded canned rationale, used when no component rationale exists
fn banded_rationale(score: f64) -> String {
    let band = if score >= 4.5 {
        "Excellent - consistently demonstrated across the conversation."
    } else if score >= 3.5 {
        "Strong - showing up reliably, with room to sharpen."
    } else if score >= 2.5 {
        "Developing - present in places but not yet consistent."
    } else if score >= 1.5 {
        "Emerging - only occasional evidence so far."
    } else {
        "Needs focus - little evidence in this conversation yet."
    };
    band.to_string()
}

/// Rep response evaluator
pub struct RepResponseEvaluator;

impl RepResponseEvaluator {
    /// Pure composition: merge this turn's detected cues with the
    /// authoritative metric results into per-metric feedback.
    ///
    /// The rationale falls back through: first applicable component rationale
    /// → score-banded sentence → "not demonstrated".
    pub fn compose(detected: &[RepMetricCue], results: &[MetricResult]) -> Vec<MetricFeedback> {
        let detected_metrics: Vec<MetricId> = detected
            .iter()
            .map(|cue| metric_for_category(cue.category))
            .collect();

        MetricId::ALL
            .iter()
            .map(|id| {
                let result = results.iter().find(|r| r.id == *id);
                let score = result.and_then(|r| r.overall_score);
                let detected = detected_metrics.contains(id);

                let component_rationale = result.and_then(|r| {
                    r.components
                        .iter()
                        .find(|c| c.applicable)
                        .and_then(|c| c.rationale.clone())
                });

                let rationale = match (component_rationale, score) {
                    (Some(text), _) => text,
                    (None, Some(score)) => banded_rationale(score),
                    (None, None) => "Not demonstrated in this conversation.".to_string(),
                };

                MetricFeedback {
                    metric_id: *id,
                    score,
                    detected,
                    rationale,
                }
            })
            .collect()
    }

    /// Convenience wrapper: detect this turn's cues, re-score the transcript,
    /// and compose the feedback in one call.
    pub fn evaluate_turn(
        rep_message: &str,
        previous_counterpart: Option<&str>,
        transcript: &Transcript,
    ) -> Result<Vec<MetricFeedback>, EngineError> {
        let detected = CueDetector::detect_rep_metrics(rep_message, previous_counterpart)?;
        let results = ScoringEngine::score_all_metrics(transcript)?;
        Ok(Self::compose(&detected, &results))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Speaker, Turn};

    fn transcript(turns: &[(Speaker, &str)]) -> Transcript {
        let mut t = Transcript::new();
        for (speaker, text) in turns {
            t.push(Turn::new(*speaker, *text).unwrap());
        }
        t
    }

    #[test]
    fn test_feedback_covers_all_metrics() {
        let feedback = RepResponseEvaluator::compose(&[], &[]);
        assert_eq!(feedback.len(), 8);
        for (item, id) in feedback.iter().zip(MetricId::ALL) {
            assert_eq!(item.metric_id, id);
        }
    }

    #[test]
    fn test_undetected_unscored_metric_reads_not_demonstrated() {
        let feedback = RepResponseEvaluator::compose(&[], &[]);
        for item in &feedback {
            assert!(!item.detected);
            assert_eq!(item.score, None);
            assert_eq!(item.rationale, "Not demonstrated in this conversation.");
        }
    }

    #[test]
    fn test_detected_reflects_this_turn_only() {
        let prev = "My concern is we'd be switching mid-year.";
        let message = "I understand your concern - what's driving that?";
        let t = transcript(&[
            (Speaker::Counterpart, prev),
            (Speaker::Rep, message),
        ]);

        let feedback =
            RepResponseEvaluator::evaluate_turn(message, Some(prev), &t).unwrap();

        let objection = feedback
            .iter()
            .find(|f| f.metric_id == MetricId::ObjectionNavigation)
            .unwrap();
        assert!(objection.detected);
        assert!(objection.score.is_some());

        let commitment = feedback
            .iter()
            .find(|f| f.metric_id == MetricId::CommitmentGaining)
            .unwrap();
        assert!(!commitment.detected);
    }

    #[test]
    fn test_component_rationale_wins_over_band() {
        let t = transcript(&[
            (Speaker::Counterpart, "My concern is the rollout."),
            (Speaker::Rep, "I understand your concern."),
        ]);
        let results = crate::scoring::ScoringEngine::score_all_metrics(&t).unwrap();
        let feedback = RepResponseEvaluator::compose(&[], &results);

        let objection = feedback
            .iter()
            .find(|f| f.metric_id == MetricId::ObjectionNavigation)
            .unwrap();
        assert!(objection.rationale.contains("objection"));
    }

    #[test]
    fn test_banded_rationale_thresholds() {
        assert!(banded_rationale(4.6).starts_with("Excellent"));
        assert!(banded_rationale(4.0).starts_with("Strong"));
        assert!(banded_rationale(3.0).starts_with("Developing"));
        assert!(banded_rationale(2.0).starts_with("Emerging"));
        assert!(banded_rationale(1.0).starts_with("Needs focus"));
    }
}
