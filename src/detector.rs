//! Cue detection
//!
//! Scans a single message against the static taxonomy: lowercase substring
//! trigger matching, word-count gates, the unconditional question rule, and
//! one-way mood-based category exclusion.

use crate::error::EngineError;
use crate::taxonomy::{
    self, ACKNOWLEDGMENT_PHRASES, BREVITY_PHRASES, COUNTERPART_CUES, NEGATIVE_MOOD_KEYWORDS,
    OBJECTION_PHRASES, POSITIVE_MOOD_KEYWORDS, REP_METRIC_CUES, TIME_PRESSURE_PHRASES,
};
use crate::types::{BehavioralCue, CueCategory, RepMetricCategory, RepMetricCue};

/// Maximum rep-metric cues reported for a single turn
pub const MAX_REP_CUES_PER_TURN: usize = 3;

/// Resolved polarity of a host-supplied mood label
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoodPolarity {
    Negative,
    Positive,
    Neutral,
}

/// Classify a mood label against the fixed keyword lists.
///
/// A label matching both lists is ambiguous and treated as neutral; the
/// override is one-way only.
pub fn mood_polarity(mood: &str) -> MoodPolarity {
    let lower = mood.to_lowercase();
    let negative = NEGATIVE_MOOD_KEYWORDS.iter().any(|k| lower.contains(k));
    let positive = POSITIVE_MOOD_KEYWORDS.iter().any(|k| lower.contains(k));

    match (negative, positive) {
        (true, false) => MoodPolarity::Negative,
        (false, true) => MoodPolarity::Positive,
        _ => MoodPolarity::Neutral,
    }
}

/// Drop cues whose category contradicts an unambiguous mood.
///
/// A stressed mood cannot simultaneously register as deep interest, and vice
/// versa. Neutral or ambiguous moods filter nothing.
pub fn apply_mood_filter(cues: &mut Vec<BehavioralCue>, mood: Option<&str>) {
    let Some(mood) = mood else { return };
    match mood_polarity(mood) {
        MoodPolarity::Negative => cues.retain(|c| c.category != CueCategory::Interest),
        MoodPolarity::Positive => cues.retain(|c| c.category != CueCategory::Stress),
        MoodPolarity::Neutral => {}
    }
}

/// Cue detector over single messages
pub struct CueDetector;

impl CueDetector {
    /// Detect counterpart cues in one message.
    ///
    /// Returns a deduplicated set keyed by cue id, in taxonomy order, with
    /// the question-rule `curiosity` appended when it applies.
    pub fn detect(
        message: &str,
        mood: Option<&str>,
    ) -> Result<Vec<BehavioralCue>, EngineError> {
        if message.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }

        let lower = message.to_lowercase();
        let word_count = lower.split_whitespace().count();

        let mut cues: Vec<BehavioralCue> = Vec::new();
        for spec in COUNTERPART_CUES {
            if let Some(max_words) = spec.max_words {
                if word_count >= max_words {
                    continue;
                }
            }
            if spec.triggers.iter().any(|t| lower.contains(t)) {
                cues.push(spec.cue);
            }
        }

        // A substantive question registers curiosity regardless of triggers
        if lower.contains('?') && word_count > 5 {
            if let Some(spec) = taxonomy::find_cue("curiosity") {
                if !cues.iter().any(|c| c.id == spec.cue.id) {
                    cues.push(spec.cue);
                }
            }
        }

        apply_mood_filter(&mut cues, mood);
        Ok(cues)
    }

    /// Detect representative metric cues in one message, capped to
    /// [`MAX_REP_CUES_PER_TURN`].
    ///
    /// Two rules are contextual and need the previous counterpart turn:
    /// objection navigation (objection language answered by acknowledgment)
    /// and adaptability (time pressure answered by brevity).
    pub fn detect_rep_metrics(
        message: &str,
        previous_counterpart: Option<&str>,
    ) -> Result<Vec<RepMetricCue>, EngineError> {
        if message.trim().is_empty() {
            return Err(EngineError::EmptyMessage);
        }

        let lower = message.to_lowercase();
        let prev_lower = previous_counterpart.map(|p| p.to_lowercase());

        let mut cues: Vec<RepMetricCue> = Vec::new();
        for spec in REP_METRIC_CUES {
            let matched = match spec.cue.category {
                RepMetricCategory::Question => {
                    lower.contains('?') && spec.triggers.iter().any(|t| lower.contains(t))
                }
                RepMetricCategory::Objection => {
                    let objection_raised = prev_lower
                        .as_deref()
                        .map(contains_objection_language)
                        .unwrap_or(false);
                    objection_raised
                        && ACKNOWLEDGMENT_PHRASES.iter().any(|t| lower.contains(t))
                }
                RepMetricCategory::Adaptability => {
                    let pressured = prev_lower
                        .as_deref()
                        .map(|p| TIME_PRESSURE_PHRASES.iter().any(|t| p.contains(t)))
                        .unwrap_or(false);
                    pressured && BREVITY_PHRASES.iter().any(|t| lower.contains(t))
                }
                _ => spec.triggers.iter().any(|t| lower.contains(t)),
            };

            if matched {
                cues.push(spec.cue);
                if cues.len() == MAX_REP_CUES_PER_TURN {
                    break;
                }
            }
        }

        Ok(cues)
    }
}

/// Whether a counterpart message carries concern/objection language
pub fn contains_objection_language(text: &str) -> bool {
    OBJECTION_PHRASES.iter().any(|t| text.contains(t))
}
