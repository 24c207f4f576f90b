//! Repsense - Deterministic signal detection and scoring engine for
//! sales-conversation transcripts
//!
//! Repsense analyzes a turn-by-turn conversation between a sales
//! representative and a simulated counterpart and produces two linked
//! outputs: observable behavioral cues detected per message, and 1-5 scores
//! (or "not applicable") across eight fixed competencies.
//!
//! Everything is a pure, synchronous function of its inputs: lexical trigger
//! matching, context-aware cue selection, and whole-transcript re-scoring
//! after every turn. The only randomness is cosmetic template rotation in the
//! prose generator; the cue-selection fallback uses a reproducible string
//! hash instead.
//!
//! ## Modules
//!
//! - **taxonomy / detector**: static cue catalogs and per-message detection
//! - **state**: context-aware cue selection and the alignment validator
//! - **describe**: prose rendering of selected cues
//! - **metrics / scoring**: the eight-metric catalog and transcript scoring
//! - **evaluator / session / encoder**: composition layers for hosts

pub mod describe;
pub mod detector;
pub mod encoder;
pub mod error;
pub mod evaluator;
pub mod metrics;
pub mod scoring;
pub mod session;
pub mod state;
pub mod taxonomy;
pub mod types;

pub use describe::Describer;
pub use detector::CueDetector;
pub use encoder::{AssessmentEncoder, ASSESSMENT_VERSION};
pub use error::EngineError;
pub use evaluator::RepResponseEvaluator;
pub use metrics::{metric_specs, METRICS_SPEC_VERSION};
pub use scoring::ScoringEngine;
pub use session::{ScoreSnapshot, Session};
pub use state::{validate_cue_state_alignment, AlignmentReport, ConversationalState, StateManager};
pub use types::{
    BehavioralCue, BehavioralDescription, ConversationContext, MetricFeedback, MetricId,
    MetricResult, RepMetricCue, Speaker, Transcript, Turn, TurnAssessment,
};

/// Engine version embedded in all assessment payloads
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for assessment payloads
pub const PRODUCER_NAME: &str = "repsense";
