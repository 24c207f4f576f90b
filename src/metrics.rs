//! Metrics specification
//!
//! Static, versioned catalog of the eight behavioral metrics. Each metric
//! decomposes into weighted components whose scoring heuristics are plain
//! data interpreted by the scoring engine. Entries are data, not behavior.

use crate::types::{Aggregation, MetricId};

/// Version of the metric catalog, embedded in score snapshots
pub const METRICS_SPEC_VERSION: &str = "1.0.0";

/// Evidence a gated component needs before it can be scored at all.
///
/// A gated component with no such evidence in the transcript is inapplicable,
/// never defaulted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EvidenceGate {
    /// At least one representative question asked
    Questions,
    /// At least one counterpart objection with a following rep turn
    Objections,
    /// At least one counterpart time-pressure turn with a following rep turn
    TimePressure,
}

/// Executable scoring heuristic for one component
#[derive(Debug, Clone, Copy)]
pub enum Heuristic {
    /// Total trigger-phrase matches across all representative turns, mapped
    /// through a count ladder (each phrase counts once per turn)
    PhraseCount {
        phrases: &'static [&'static str],
        ladder: &'static [(u32, u8)],
        gate: Option<EvidenceGate>,
    },
    /// Matching representative turns over all representative turns, mapped
    /// through a ratio ladder
    TurnRatio {
        phrases: &'static [&'static str],
        thresholds: &'static [(f64, u8)],
    },
    /// Open-ended question turns over all question turns
    OpenQuestionRatio { thresholds: &'static [(f64, u8)] },
    /// Acknowledged objections over objections raised
    ObjectionResponseRatio { thresholds: &'static [(f64, u8)] },
    /// Brief responses over time-pressure turns; a response counts when it is
    /// under `max_words` words or carries explicit brevity language
    PressureResponseRatio {
        thresholds: &'static [(f64, u8)],
        max_words: usize,
    },
}

/// A weighted sub-criterion of a metric
#[derive(Debug, Clone, Copy)]
pub struct ComponentSpec {
    pub name: &'static str,
    pub weight: f64,
    pub heuristic: Heuristic,
}

/// One of the eight fixed metrics
#[derive(Debug, Clone, Copy)]
pub struct MetricSpec {
    pub id: MetricId,
    pub label: &'static str,
    pub aggregation: Aggregation,
    pub components: &'static [ComponentSpec],
}

/// 0 matches → 1, 1 match → 3, 2+ → 5
pub const COUNT_LADDER_DEFAULT: &[(u32, u8)] = &[(2, 5), (1, 3), (0, 1)];

/// Finer five-step count ladder
pub const COUNT_LADDER_GRADED: &[(u32, u8)] = &[(4, 5), (3, 4), (2, 3), (1, 2), (0, 1)];

/// ≥0.60 → 5, ≥0.45 → 4, ≥0.30 → 3, ≥0.15 → 2, else 1
pub const RATIO_THRESHOLDS_DEFAULT: &[(f64, u8)] = &[(0.60, 5), (0.45, 4), (0.30, 3), (0.15, 2), (0.0, 1)];

const METRIC_SPECS: &[MetricSpec] = &[
    MetricSpec {
        id: MetricId::QuestionQuality,
        label: "Question Quality",
        aggregation: Aggregation::WeightedAverage,
        components: &[
            ComponentSpec {
                name: "open_question_ratio",
                weight: 0.6,
                heuristic: Heuristic::OpenQuestionRatio {
                    thresholds: RATIO_THRESHOLDS_DEFAULT,
                },
            },
            ComponentSpec {
                name: "probing_followups",
                weight: 0.4,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["you mentioned", "you said", "driving", "behind that", "tell me more"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: Some(EvidenceGate::Questions),
                },
            },
        ],
    },
    MetricSpec {
        id: MetricId::ActiveListening,
        label: "Active Listening",
        aggregation: Aggregation::Average,
        components: &[
            ComponentSpec {
                name: "acknowledgment_rate",
                weight: 0.34,
                heuristic: Heuristic::TurnRatio {
                    phrases: &["i understand", "i hear you", "sounds like", "fair point", "i see"],
                    thresholds: RATIO_THRESHOLDS_DEFAULT,
                },
            },
            ComponentSpec {
                name: "paraphrasing",
                weight: 0.33,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["so what you're saying", "let me make sure", "if i understand", "in other words"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: None,
                },
            },
            ComponentSpec {
                name: "referencing_back",
                weight: 0.33,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["you said", "earlier you", "as you noted", "you mentioned"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: None,
                },
            },
        ],
    },
    MetricSpec {
        id: MetricId::ValueCommunication,
        label: "Value Communication",
        aggregation: Aggregation::WeightedAverage,
        components: &[
            ComponentSpec {
                name: "benefit_language_rate",
                weight: 0.5,
                heuristic: Heuristic::TurnRatio {
                    phrases: &["benefit", "help you", "improve", "save", "outcome", "value"],
                    thresholds: RATIO_THRESHOLDS_DEFAULT,
                },
            },
            ComponentSpec {
                name: "outcome_specificity",
                weight: 0.3,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["percent", "%", "results", "data", "evidence", "study"],
                    ladder: COUNT_LADDER_GRADED,
                    gate: None,
                },
            },
            ComponentSpec {
                name: "tailoring",
                weight: 0.2,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["for your", "in your practice", "your patients", "your team", "your workflow"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: None,
                },
            },
        ],
    },
    MetricSpec {
        id: MetricId::EngagementBuilding,
        label: "Engagement Building",
        aggregation: Aggregation::Average,
        components: &[
            ComponentSpec {
                name: "courtesy_rate",
                weight: 0.5,
                heuristic: Heuristic::TurnRatio {
                    phrases: &["thanks", "thank you", "appreciate", "good to", "glad"],
                    thresholds: RATIO_THRESHOLDS_DEFAULT,
                },
            },
            ComponentSpec {
                name: "collaborative_language",
                weight: 0.5,
                heuristic: Heuristic::TurnRatio {
                    phrases: &["we could", "together", "let's", "our next"],
                    thresholds: RATIO_THRESHOLDS_DEFAULT,
                },
            },
        ],
    },
    MetricSpec {
        id: MetricId::ObjectionNavigation,
        label: "Objection Navigation",
        aggregation: Aggregation::WeightedAverage,
        components: &[
            ComponentSpec {
                name: "acknowledgment_after_objection",
                weight: 0.6,
                heuristic: Heuristic::ObjectionResponseRatio {
                    thresholds: RATIO_THRESHOLDS_DEFAULT,
                },
            },
            ComponentSpec {
                name: "resolution_language",
                weight: 0.4,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["what if we", "would it help", "let me address", "another option", "we could adjust"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: Some(EvidenceGate::Objections),
                },
            },
        ],
    },
    MetricSpec {
        id: MetricId::ConversationControl,
        label: "Conversation Control",
        aggregation: Aggregation::Average,
        components: &[
            ComponentSpec {
                name: "agenda_setting",
                weight: 0.34,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["today i'd like", "let's start", "shall we", "i'd like to cover"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: None,
                },
            },
            ComponentSpec {
                name: "redirection",
                weight: 0.33,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["coming back to", "let's return", "moving on", "back on track"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: None,
                },
            },
            ComponentSpec {
                name: "summarizing",
                weight: 0.33,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["to summarize", "to recap", "in summary", "so far we've"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: None,
                },
            },
        ],
    },
    MetricSpec {
        id: MetricId::CommitmentGaining,
        label: "Commitment Gaining",
        aggregation: Aggregation::WeightedAverage,
        components: &[
            ComponentSpec {
                name: "direct_asks",
                weight: 0.6,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["would you be open", "can we schedule", "next step", "follow up", "can we agree"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: None,
                },
            },
            ComponentSpec {
                name: "specificity",
                weight: 0.4,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["monday", "tuesday", "tomorrow", "next week", "calendar", "on the books"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: None,
                },
            },
        ],
    },
    MetricSpec {
        id: MetricId::Adaptability,
        label: "Adaptability",
        aggregation: Aggregation::Average,
        components: &[
            ComponentSpec {
                name: "brevity_under_pressure",
                weight: 0.5,
                heuristic: Heuristic::PressureResponseRatio {
                    thresholds: RATIO_THRESHOLDS_DEFAULT,
                    max_words: 30,
                },
            },
            ComponentSpec {
                name: "pivot_language",
                weight: 0.5,
                heuristic: Heuristic::PhraseCount {
                    phrases: &["in that case", "given your time", "the short answer", "briefly", "let me be quick"],
                    ladder: COUNT_LADDER_DEFAULT,
                    gate: Some(EvidenceGate::TimePressure),
                },
            },
        ],
    },
];

/// The full metric catalog, in canonical output order
pub fn metric_specs() -> &'static [MetricSpec] {
    METRIC_SPECS
}

/// Look up a metric spec by id
pub fn find_metric(id: MetricId) -> &'static MetricSpec {
    METRIC_SPECS
        .iter()
        .find(|spec| spec.id == id)
        .expect("metric catalog covers every MetricId")
}
