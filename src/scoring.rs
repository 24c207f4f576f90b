//! Transcript scoring
//!
//! Evaluates every metric component's heuristic against a full transcript,
//! maps evidence to bucketed 1-5 scores, and aggregates per metric. Scoring
//! is a pure function of the transcript: the same input always produces the
//! same results, which is what allows whole-transcript re-scoring after
//! every turn.
//!
//! The load-bearing invariant is null-propagation: a component with no
//! applicable evidence scores `None`, and a metric whose components are all
//! inapplicable is `not_applicable` rather than numerically defaulted.

use crate::detector::contains_objection_language;
use crate::error::EngineError;
use crate::metrics::{metric_specs, ComponentSpec, EvidenceGate, Heuristic, MetricSpec};
use crate::taxonomy::{ACKNOWLEDGMENT_PHRASES, BREVITY_PHRASES, OPEN_QUESTION_PHRASES, TIME_PRESSURE_PHRASES};
use crate::types::{
    Aggregation, ComponentResult, MetricResult, Speaker, Transcript,
};

/// Scoring engine over full transcripts
pub struct ScoringEngine;

impl ScoringEngine {
    /// Score all eight metrics against the transcript.
    ///
    /// Always returns exactly eight results in canonical order. An empty or
    /// one-sided transcript is not an error: evidence-free components resolve
    /// to inapplicable.
    pub fn score_all_metrics(transcript: &Transcript) -> Result<Vec<MetricResult>, EngineError> {
        transcript.validate()?;
        let evidence = Evidence::gather(transcript);

        Ok(metric_specs()
            .iter()
            .map(|spec| score_metric(spec, &evidence))
            .collect())
    }
}

/// Pre-extracted transcript evidence shared by all heuristics
struct Evidence {
    /// Lowercased representative turns, in order
    rep_turns: Vec<String>,
    /// Lowercased representative turns containing a question mark
    question_turns: Vec<String>,
    /// Lowercased rep responses that directly follow a counterpart objection
    objection_responses: Vec<String>,
    /// Lowercased rep responses that directly follow counterpart time pressure
    pressure_responses: Vec<String>,
}

impl Evidence {
    fn gather(transcript: &Transcript) -> Self {
        let rep_turns: Vec<String> = transcript
            .rep_turns()
            .map(|t| t.text.to_lowercase())
            .collect();

        let question_turns: Vec<String> = rep_turns
            .iter()
            .filter(|t| t.contains('?'))
            .cloned()
            .collect();

        let mut objection_responses = Vec::new();
        let mut pressure_responses = Vec::new();
        let turns = transcript.turns();
        for window in turns.windows(2) {
            let [current, next] = window else { continue };
            if current.speaker != Speaker::Counterpart || next.speaker != Speaker::Rep {
                continue;
            }
            let counterpart_lower = current.text.to_lowercase();
            let response_lower = next.text.to_lowercase();
            if contains_objection_language(&counterpart_lower) {
                objection_responses.push(response_lower.clone());
            }
            if TIME_PRESSURE_PHRASES.iter().any(|p| counterpart_lower.contains(p)) {
                pressure_responses.push(response_lower);
            }
        }

        Self {
            rep_turns,
            question_turns,
            objection_responses,
            pressure_responses,
        }
    }

    fn gate_open(&self, gate: EvidenceGate) -> bool {
        match gate {
            EvidenceGate::Questions => !self.question_turns.is_empty(),
            EvidenceGate::Objections => !self.objection_responses.is_empty(),
            EvidenceGate::TimePressure => !self.pressure_responses.is_empty(),
        }
    }
}

fn score_metric(spec: &MetricSpec, evidence: &Evidence) -> MetricResult {
    let components: Vec<ComponentResult> = spec
        .components
        .iter()
        .map(|component| score_component(component, evidence))
        .collect();

    let applicable: Vec<&ComponentResult> = components.iter().filter(|c| c.applicable).collect();

    let overall_score = if applicable.is_empty() {
        None
    } else {
        Some(match spec.aggregation {
            Aggregation::Average => {
                let sum: f64 = applicable.iter().map(|c| c.score.unwrap_or(0) as f64).sum();
                sum / applicable.len() as f64
            }
            Aggregation::WeightedAverage => {
                let weight_sum: f64 = applicable.iter().map(|c| c.weight).sum();
                let weighted: f64 = applicable
                    .iter()
                    .map(|c| c.weight * c.score.unwrap_or(0) as f64)
                    .sum();
                weighted / weight_sum
            }
        })
    };

    MetricResult {
        id: spec.id,
        not_applicable: overall_score.is_none(),
        components,
        overall_score,
    }
}

fn score_component(component: &ComponentSpec, evidence: &Evidence) -> ComponentResult {
    let (score, rationale) = match component.heuristic {
        Heuristic::PhraseCount { phrases, ladder, gate } => {
            let gated_out = gate.map(|g| !evidence.gate_open(g)).unwrap_or(false);
            if evidence.rep_turns.is_empty() || gated_out {
                (None, None)
            } else {
                let count: u32 = evidence
                    .rep_turns
                    .iter()
                    .map(|turn| phrases.iter().filter(|p| turn.contains(*p)).count() as u32)
                    .sum();
                (
                    Some(ladder_score(count, ladder)),
                    Some(format!(
                        "{count} match(es) across {} rep turn(s)",
                        evidence.rep_turns.len()
                    )),
                )
            }
        }
        Heuristic::TurnRatio { phrases, thresholds } => {
            if evidence.rep_turns.is_empty() {
                (None, None)
            } else {
                let matched = evidence
                    .rep_turns
                    .iter()
                    .filter(|turn| phrases.iter().any(|p| turn.contains(p)))
                    .count();
                let ratio = matched as f64 / evidence.rep_turns.len() as f64;
                (
                    Some(ratio_score(ratio, thresholds)),
                    Some(format!(
                        "{matched} of {} rep turn(s) qualified",
                        evidence.rep_turns.len()
                    )),
                )
            }
        }
        Heuristic::OpenQuestionRatio { thresholds } => {
            if evidence.question_turns.is_empty() {
                (None, None)
            } else {
                let open = evidence
                    .question_turns
                    .iter()
                    .filter(|turn| OPEN_QUESTION_PHRASES.iter().any(|p| turn.contains(p)))
                    .count();
                let ratio = open as f64 / evidence.question_turns.len() as f64;
                (
                    Some(ratio_score(ratio, thresholds)),
                    Some(format!(
                        "{open} of {} question(s) were open-ended",
                        evidence.question_turns.len()
                    )),
                )
            }
        }
        Heuristic::ObjectionResponseRatio { thresholds } => {
            if evidence.objection_responses.is_empty() {
                (None, None)
            } else {
                let acknowledged = evidence
                    .objection_responses
                    .iter()
                    .filter(|r| ACKNOWLEDGMENT_PHRASES.iter().any(|p| r.contains(p)))
                    .count();
                let ratio = acknowledged as f64 / evidence.objection_responses.len() as f64;
                (
                    Some(ratio_score(ratio, thresholds)),
                    Some(format!(
                        "{acknowledged} of {} objection(s) acknowledged",
                        evidence.objection_responses.len()
                    )),
                )
            }
        }
        Heuristic::PressureResponseRatio { thresholds, max_words } => {
            if evidence.pressure_responses.is_empty() {
                (None, None)
            } else {
                let adapted = evidence
                    .pressure_responses
                    .iter()
                    .filter(|r| {
                        r.split_whitespace().count() < max_words
                            || BREVITY_PHRASES.iter().any(|p| r.contains(p))
                    })
                    .count();
                let ratio = adapted as f64 / evidence.pressure_responses.len() as f64;
                (
                    Some(ratio_score(ratio, thresholds)),
                    Some(format!(
                        "{adapted} of {} pressured moment(s) met with brevity",
                        evidence.pressure_responses.len()
                    )),
                )
            }
        }
    };

    ComponentResult {
        name: component.name,
        applicable: score.is_some(),
        score,
        weight: component.weight,
        rationale,
    }
}

/// Map a match count through a descending count ladder
fn ladder_score(count: u32, ladder: &[(u32, u8)]) -> u8 {
    ladder
        .iter()
        .find(|(threshold, _)| count >= *threshold)
        .map(|(_, score)| *score)
        .unwrap_or(1)
}

/// Map a ratio through a descending threshold ladder
fn ratio_score(ratio: f64, thresholds: &[(f64, u8)]) -> u8 {
    thresholds
        .iter()
        .find(|(threshold, _)| ratio >= *threshold)
        .map(|(_, score)| *score)
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{MetricId, Turn};
    use pretty_assertions::assert_eq;

    fn transcript(turns: &[(Speaker, &str)]) -> Transcript {
        let mut t = Transcript::new();
        for (speaker, text) in turns {
            t.push(Turn::new(*speaker, *text).unwrap());
        }
        t
    }

    fn result_for(results: &[MetricResult], id: MetricId) -> &MetricResult {
        results.iter().find(|r| r.id == id).unwrap()
    }

    #[test]
    fn test_always_eight_results_in_order() {
        let results = ScoringEngine::score_all_metrics(&Transcript::new()).unwrap();
        assert_eq!(results.len(), 8);
        for (result, id) in results.iter().zip(MetricId::ALL) {
            assert_eq!(result.id, id);
        }
    }

    #[test]
    fn test_empty_transcript_is_fully_not_applicable() {
        let results = ScoringEngine::score_all_metrics(&Transcript::new()).unwrap();
        for result in &results {
            assert!(result.not_applicable, "{:?}", result.id);
            assert_eq!(result.overall_score, None);
            for component in &result.components {
                assert!(!component.applicable);
                assert_eq!(component.score, None);
            }
        }
    }

    #[test]
    fn test_zero_questions_leaves_question_quality_null() {
        let t = transcript(&[
            (Speaker::Rep, "Thanks for making time today."),
            (Speaker::Counterpart, "Sure, go ahead."),
            (Speaker::Rep, "Our data shows a real benefit for your team."),
        ]);

        let results = ScoringEngine::score_all_metrics(&t).unwrap();
        let question_quality = result_for(&results, MetricId::QuestionQuality);

        assert!(question_quality.not_applicable);
        assert_eq!(question_quality.overall_score, None);
        for component in &question_quality.components {
            assert!(!component.applicable);
        }
    }

    #[test]
    fn test_scoring_is_idempotent() {
        let t = transcript(&[
            (Speaker::Rep, "What outcomes matter most to your team?"),
            (Speaker::Counterpart, "My concern is the switching cost."),
            (Speaker::Rep, "I understand your concern - what's driving that?"),
            (Speaker::Counterpart, "Mostly retraining time."),
            (Speaker::Rep, "Would you be open to a follow up next week?"),
        ]);

        let first = ScoringEngine::score_all_metrics(&t).unwrap();
        let second = ScoringEngine::score_all_metrics(&t).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_component_score_and_applicable_are_consistent() {
        let t = transcript(&[
            (Speaker::Rep, "What outcomes matter most to your team?"),
            (Speaker::Counterpart, "My concern is the switching cost."),
            (Speaker::Rep, "I understand your concern."),
        ]);

        let results = ScoringEngine::score_all_metrics(&t).unwrap();
        for result in &results {
            for component in &result.components {
                assert_eq!(component.score.is_some(), component.applicable);
                if let Some(score) = component.score {
                    assert!((1..=5).contains(&score));
                }
            }
        }
    }

    #[test]
    fn test_objection_navigation_scores_when_objection_is_acknowledged() {
        let t = transcript(&[
            (Speaker::Counterpart, "My concern is we'd be switching mid-year."),
            (Speaker::Rep, "I understand your concern - what if we phased it?"),
        ]);

        let results = ScoringEngine::score_all_metrics(&t).unwrap();
        let objection = result_for(&results, MetricId::ObjectionNavigation);

        assert!(!objection.not_applicable);
        let acknowledgment = objection
            .components
            .iter()
            .find(|c| c.name == "acknowledgment_after_objection")
            .unwrap();
        // 1 of 1 objections acknowledged: top bucket
        assert_eq!(acknowledgment.score, Some(5));
    }

    #[test]
    fn test_objection_navigation_null_without_objections() {
        let t = transcript(&[
            (Speaker::Counterpart, "Tell me about the product."),
            (Speaker::Rep, "I understand it can help your team."),
        ]);

        let results = ScoringEngine::score_all_metrics(&t).unwrap();
        let objection = result_for(&results, MetricId::ObjectionNavigation);
        assert!(objection.not_applicable);
        assert_eq!(objection.overall_score, None);
    }

    #[test]
    fn test_adaptability_rewards_brevity_under_pressure() {
        let t = transcript(&[
            (Speaker::Counterpart, "I only have two minutes."),
            (Speaker::Rep, "Briefly: it cuts admin time in half."),
        ]);

        let results = ScoringEngine::score_all_metrics(&t).unwrap();
        let adaptability = result_for(&results, MetricId::Adaptability);

        assert!(!adaptability.not_applicable);
        let brevity = adaptability
            .components
            .iter()
            .find(|c| c.name == "brevity_under_pressure")
            .unwrap();
        assert_eq!(brevity.score, Some(5));
    }

    #[test]
    fn test_open_question_ratio_buckets() {
        // Two questions, both open-ended: ratio 1.0, top bucket
        let t = transcript(&[
            (Speaker::Rep, "What outcomes matter most to you?"),
            (Speaker::Counterpart, "Efficiency, mostly."),
            (Speaker::Rep, "How does the current process handle that?"),
        ]);

        let results = ScoringEngine::score_all_metrics(&t).unwrap();
        let question_quality = result_for(&results, MetricId::QuestionQuality);
        let open_ratio = question_quality
            .components
            .iter()
            .find(|c| c.name == "open_question_ratio")
            .unwrap();
        assert_eq!(open_ratio.score, Some(5));
    }

    #[test]
    fn test_weighted_average_uses_applicable_components_only() {
        // Objections present so both objection_navigation components apply
        let t = transcript(&[
            (Speaker::Counterpart, "My concern is the rollout timeline."),
            (Speaker::Rep, "I understand your concern. What if we phased the rollout?"),
        ]);

        let results = ScoringEngine::score_all_metrics(&t).unwrap();
        let objection = result_for(&results, MetricId::ObjectionNavigation);

        let ack = &objection.components[0];
        let resolution = &objection.components[1];
        assert!(ack.applicable && resolution.applicable);

        let expected = (0.6 * ack.score.unwrap() as f64 + 0.4 * resolution.score.unwrap() as f64)
            / (0.6 + 0.4);
        assert!((objection.overall_score.unwrap() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_ladder_score_boundaries() {
        use crate::metrics::COUNT_LADDER_DEFAULT;
        assert_eq!(ladder_score(0, COUNT_LADDER_DEFAULT), 1);
        assert_eq!(ladder_score(1, COUNT_LADDER_DEFAULT), 3);
        assert_eq!(ladder_score(2, COUNT_LADDER_DEFAULT), 5);
        assert_eq!(ladder_score(9, COUNT_LADDER_DEFAULT), 5);
    }

    #[test]
    fn test_ratio_score_boundaries() {
        use crate::metrics::RATIO_THRESHOLDS_DEFAULT;
        assert_eq!(ratio_score(0.0, RATIO_THRESHOLDS_DEFAULT), 1);
        assert_eq!(ratio_score(0.15, RATIO_THRESHOLDS_DEFAULT), 2);
        assert_eq!(ratio_score(0.30, RATIO_THRESHOLDS_DEFAULT), 3);
        assert_eq!(ratio_score(0.45, RATIO_THRESHOLDS_DEFAULT), 4);
        assert_eq!(ratio_score(0.60, RATIO_THRESHOLDS_DEFAULT), 5);
        assert_eq!(ratio_score(1.0, RATIO_THRESHOLDS_DEFAULT), 5);
    }

    #[test]
    fn test_blank_turn_fails_fast() {
        let json = r#"[{"speaker": "rep", "text": " "}]"#;
        let t: Transcript = serde_json::from_str(json).unwrap();
        assert!(ScoringEngine::score_all_metrics(&t).is_err());
    }
}
