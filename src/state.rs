//! Conversation state management
//!
//! Narrows raw detected cues to a bounded, context-aware selection: recency
//! de-duplication, mood-based filtering, severity enhancement, and a
//! deterministic hash-seeded fallback when nothing was raw-detected. Also
//! owns the state-to-category table and the cue/state alignment validator.

use crate::detector::apply_mood_filter;
use crate::error::EngineError;
use crate::taxonomy::COUNTERPART_CUES;
use crate::types::{
    BehavioralCue, ConversationContext, CueCategory, MoodTrend, RepMetricCue, RepPerformance,
    Severity,
};
use serde::Serialize;
use std::collections::HashSet;

/// How many recent cue ids suppress re-selection
pub const RECENCY_WINDOW: usize = 6;

/// Cap on retained cue history in the context
pub const HISTORY_CAP: usize = 12;

/// Maximum cues surfaced per turn
pub const MAX_SELECTED_CUES: usize = 2;

/// Coarse conversational state supplied by scenario metadata.
///
/// Used only to constrain which cue categories may be surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConversationalState {
    TimePressured,
    Busy,
    Resistant,
    Defensive,
    BoundarySetting,
    Irritated,
    Disengaged,
    Disengaging,
    Engaged,
    Neutral,
}

impl ConversationalState {
    /// Parse a host-supplied label. Accepts hyphen, underscore, and space
    /// separators.
    pub fn from_label(label: &str) -> Result<Self, EngineError> {
        let normalized = label.trim().to_lowercase().replace(['-', ' '], "_");
        match normalized.as_str() {
            "time_pressured" => Ok(ConversationalState::TimePressured),
            "busy" => Ok(ConversationalState::Busy),
            "resistant" => Ok(ConversationalState::Resistant),
            "defensive" => Ok(ConversationalState::Defensive),
            "boundary_setting" => Ok(ConversationalState::BoundarySetting),
            "irritated" => Ok(ConversationalState::Irritated),
            "disengaged" => Ok(ConversationalState::Disengaged),
            "disengaging" => Ok(ConversationalState::Disengaging),
            "engaged" => Ok(ConversationalState::Engaged),
            "neutral" => Ok(ConversationalState::Neutral),
            _ => Err(EngineError::InvalidStateLabel(label.to_string())),
        }
    }

    /// Fixed state-to-allowed-category table
    pub fn allowed_categories(&self) -> &'static [CueCategory] {
        match self {
            ConversationalState::TimePressured | ConversationalState::Busy => {
                &[CueCategory::Stress, CueCategory::Engagement]
            }
            ConversationalState::Resistant
            | ConversationalState::Defensive
            | ConversationalState::BoundarySetting
            | ConversationalState::Irritated => &[CueCategory::Resistance, CueCategory::Stress],
            ConversationalState::Disengaged | ConversationalState::Disengaging => {
                &[CueCategory::Engagement, CueCategory::Resistance]
            }
            ConversationalState::Engaged => &[CueCategory::Interest],
            ConversationalState::Neutral => &[CueCategory::Engagement],
        }
    }
}

/// One cue whose category is outside the allowed set for a state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentMismatch {
    pub cue_id: String,
    pub category: CueCategory,
    pub allowed: Vec<CueCategory>,
}

/// Result of checking a proposed cue set against a conversational state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlignmentReport {
    pub valid: bool,
    pub mismatches: Vec<AlignmentMismatch>,
}

/// Check that every cue's category is allowed for the current state.
///
/// This is the engine's primary internal consistency check. Callers should
/// treat a failed report as a recoverable warning, not a crash: conversational
/// state classification is approximate.
pub fn validate_cue_state_alignment(
    cues: &[BehavioralCue],
    state: ConversationalState,
) -> AlignmentReport {
    let allowed = state.allowed_categories();
    let mismatches: Vec<AlignmentMismatch> = cues
        .iter()
        .filter(|cue| !allowed.contains(&cue.category))
        .map(|cue| AlignmentMismatch {
            cue_id: cue.id.to_string(),
            category: cue.category,
            allowed: allowed.to_vec(),
        })
        .collect();

    AlignmentReport {
        valid: mismatches.is_empty(),
        mismatches,
    }
}

/// Portable non-cryptographic string hash (31-based, wrapping).
///
/// Stands in for a seeded PRNG: the same seed always yields the same value,
/// across platforms and implementations.
pub fn seeded_hash(seed: &str) -> u32 {
    let mut hash: i32 = 0;
    for byte in seed.bytes() {
        hash = hash.wrapping_mul(31).wrapping_add(byte as i32);
    }
    hash.unsigned_abs()
}

/// Hostile phrases on the representative side
const HOSTILE_PHRASES: &[&str] = &[
    "shut up",
    "that's stupid",
    "don't waste my time",
    "this is pointless",
    "i don't care",
    "forget it",
];

/// General negative-sentiment words, matched as whole tokens
const NEGATIVE_SENTIMENT_WORDS: &[&str] = &[
    "terrible", "awful", "bad", "wrong", "hate", "useless", "annoying", "worst", "stupid",
];

/// Detect representative negativity in a single message.
///
/// Fixed phrase lists plus three heuristics: a "why don't" pattern, an
/// all-caps ratio over 0.5, or repeated exclamation/question marks.
pub fn detect_rep_negativity(message: &str) -> bool {
    let lower = message.to_lowercase();

    if HOSTILE_PHRASES.iter().any(|p| lower.contains(p)) {
        return true;
    }

    let has_negative_word = lower
        .split(|c: char| !c.is_alphanumeric())
        .any(|token| NEGATIVE_SENTIMENT_WORDS.contains(&token));
    if has_negative_word {
        return true;
    }

    if lower.contains("why don't") || lower.contains("why dont") {
        return true;
    }

    let letters: Vec<char> = message.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() >= 4 {
        let upper = letters.iter().filter(|c| c.is_uppercase()).count();
        if (upper as f64) / (letters.len() as f64) > 0.5 {
            return true;
        }
    }

    message.matches('!').count() >= 2 || message.matches('?').count() >= 2
}

/// Classify representative performance from the count of metric cues this
/// turn. Deliberately a coarse, explainable rule.
pub fn classify_performance(rep_cue_count: usize) -> RepPerformance {
    match rep_cue_count {
        0..=2 => RepPerformance::Poor,
        3 => RepPerformance::Fair,
        4 => RepPerformance::Good,
        _ => RepPerformance::Excellent,
    }
}

/// Derive the counterpart mood trend from representative performance
pub fn derive_mood_trend(performance: RepPerformance, current: MoodTrend) -> MoodTrend {
    match performance {
        RepPerformance::Good | RepPerformance::Excellent => MoodTrend::Improving,
        RepPerformance::Poor => MoodTrend::Declining,
        RepPerformance::Fair => current,
    }
}

/// Conversation state manager: cue selection and context advancement
pub struct StateManager;

impl StateManager {
    /// Select a bounded cue set for the current turn.
    ///
    /// Applies mood filtering, representative-negativity filtering, recency
    /// de-duplication, severity enhancement, and the deterministic fallback.
    /// Returns at most [`MAX_SELECTED_CUES`] cues.
    pub fn select(
        raw_cues: &[BehavioralCue],
        context: &ConversationContext,
        rep_cues: &[RepMetricCue],
        last_rep_message: Option<&str>,
        mood: Option<&str>,
        session_id: Option<&str>,
    ) -> Vec<BehavioralCue> {
        let performance = classify_performance(rep_cues.len());
        let rep_negative = last_rep_message.map(detect_rep_negativity).unwrap_or(false);
        let trend = derive_mood_trend(performance, context.hcp_mood);

        let recent: HashSet<&str> = context
            .previous_cues
            .iter()
            .rev()
            .take(RECENCY_WINDOW)
            .map(String::as_str)
            .collect();

        // Candidate pool: full taxonomy minus mood exclusions, negativity
        // exclusions, and recently surfaced cues
        let mut pool: Vec<BehavioralCue> = COUNTERPART_CUES.iter().map(|s| s.cue).collect();
        apply_mood_filter(&mut pool, mood);
        if rep_negative {
            pool.retain(|c| c.category != CueCategory::Interest);
        }
        pool.retain(|c| !recent.contains(c.id));

        let session = session_id.unwrap_or("session");

        if raw_cues.is_empty() {
            // Nothing observable happened. Only a struggling or hostile rep
            // justifies surfacing pressure cues anyway.
            if performance == RepPerformance::Poor || rep_negative {
                let weighted = weighted_pool(&pool);
                return pick_deterministic(&weighted, session, context.turn_number, MAX_SELECTED_CUES);
            }
            return Vec::new();
        }

        // De-dup the raw cues and drop any shown within the recency window
        let mut selected: Vec<BehavioralCue> = Vec::new();
        for cue in raw_cues {
            if recent.contains(cue.id) {
                continue;
            }
            if !selected.iter().any(|c| c.id == cue.id) {
                selected.push(*cue);
            }
        }

        if selected.is_empty() {
            return pick_deterministic(&pool, session, context.turn_number, MAX_SELECTED_CUES);
        }

        enhance_for_mood(&mut selected, &pool, trend);
        selected.truncate(MAX_SELECTED_CUES);
        selected
    }

    /// Advance the context after a counterpart turn.
    ///
    /// Additive only: turn number increments, selected cue ids append to the
    /// capped history, and the performance/mood classifications refresh.
    pub fn update_context(
        context: &ConversationContext,
        selected_cues: &[BehavioralCue],
        rep_cues: &[RepMetricCue],
    ) -> ConversationContext {
        let mut next = context.clone();
        next.turn_number += 1;

        for cue in selected_cues {
            next.previous_cues.push(cue.id.to_string());
        }
        while next.previous_cues.len() > HISTORY_CAP {
            next.previous_cues.remove(0);
        }

        next.rep_performance = classify_performance(rep_cues.len());
        next.hcp_mood = derive_mood_trend(next.rep_performance, context.hcp_mood);
        next
    }
}

/// Duplicate resistance/stress entries so the deterministic fallback favors
/// them when the rep is struggling
fn weighted_pool(pool: &[BehavioralCue]) -> Vec<BehavioralCue> {
    let mut weighted = Vec::with_capacity(pool.len() * 2);
    for cue in pool {
        weighted.push(*cue);
        if matches!(cue.category, CueCategory::Resistance | CueCategory::Stress) {
            weighted.push(*cue);
        }
    }
    weighted
}

/// Deterministically pick up to `count` distinct cues from the pool.
///
/// Each pick hashes `"{session}:{turn}:{ordinal}"` into an index and consumes
/// without replacement, so repeated calls with the same inputs yield the same
/// cues in the same order.
fn pick_deterministic(
    pool: &[BehavioralCue],
    session_id: &str,
    turn_number: u32,
    count: usize,
) -> Vec<BehavioralCue> {
    let mut remaining: Vec<BehavioralCue> = pool.to_vec();
    let mut picked: Vec<BehavioralCue> = Vec::new();
    let mut ordinal = 0usize;

    while picked.len() < count && !remaining.is_empty() {
        let seed = format!("{session_id}:{turn_number}:{ordinal}");
        let index = (seeded_hash(&seed) as usize) % remaining.len();
        let cue = remaining[index];
        remaining.retain(|c| c.id != cue.id);
        picked.push(cue);
        ordinal += 1;
    }

    picked
}

/// Swap cue severities to match the mood trend: an improving mood softens
/// high-severity picks, a declining mood sharpens low-severity ones. Swaps
/// stay within the cue's category and only use cues still in the pool.
fn enhance_for_mood(selected: &mut [BehavioralCue], pool: &[BehavioralCue], trend: MoodTrend) {
    for slot in selected.iter_mut() {
        let replacement = match trend {
            MoodTrend::Improving if slot.severity == Severity::High => pool
                .iter()
                .find(|c| c.category == slot.category && c.severity != Severity::High && c.id != slot.id),
            MoodTrend::Declining if slot.severity == Severity::Low => pool
                .iter()
                .find(|c| c.category == slot.category && c.severity == Severity::High && c.id != slot.id),
            _ => None,
        };
        if let Some(replacement) = replacement {
            *slot = *replacement;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::taxonomy::find_cue;
    use pretty_assertions::assert_eq;

    fn cue(id: &str) -> BehavioralCue {
        find_cue(id).unwrap().cue
    }

    #[test]
    fn test_performance_classification_thresholds() {
        assert_eq!(classify_performance(0), RepPerformance::Poor);
        assert_eq!(classify_performance(2), RepPerformance::Poor);
        assert_eq!(classify_performance(3), RepPerformance::Fair);
        assert_eq!(classify_performance(4), RepPerformance::Good);
        assert_eq!(classify_performance(5), RepPerformance::Excellent);
        assert_eq!(classify_performance(7), RepPerformance::Excellent);
    }

    #[test]
    fn test_negativity_heuristics() {
        assert!(detect_rep_negativity("Why don't you just listen?"));
        assert!(detect_rep_negativity("THIS IS THE BEST DEAL EVER"));
        assert!(detect_rep_negativity("Really!! Come on!!"));
        assert!(detect_rep_negativity("That approach is terrible."));
        assert!(detect_rep_negativity("What? Where? When?"));

        assert!(!detect_rep_negativity("I hear you, let's look at the data."));
        // "no" inside "know" must not trip the word list
        assert!(!detect_rep_negativity("I know this matters to your team."));
    }

    #[test]
    fn test_mood_trend_derivation() {
        assert_eq!(
            derive_mood_trend(RepPerformance::Excellent, MoodTrend::Stable),
            MoodTrend::Improving
        );
        assert_eq!(
            derive_mood_trend(RepPerformance::Poor, MoodTrend::Improving),
            MoodTrend::Declining
        );
        assert_eq!(
            derive_mood_trend(RepPerformance::Fair, MoodTrend::Declining),
            MoodTrend::Declining
        );
    }

    #[test]
    fn test_seeded_hash_is_stable() {
        let a = seeded_hash("abc:3:0");
        let b = seeded_hash("abc:3:0");
        assert_eq!(a, b);
        assert_ne!(seeded_hash("abc:3:0"), seeded_hash("abc:3:1"));
    }

    #[test]
    fn test_deterministic_fallback_is_repeatable() {
        let context = ConversationContext {
            turn_number: 3,
            ..ConversationContext::new()
        };

        // No raw cues, poor performance: forced deterministic pick
        let first = StateManager::select(&[], &context, &[], None, None, Some("abc"));
        let second = StateManager::select(&[], &context, &[], None, None, Some("abc"));

        assert_eq!(first.len(), 2);
        assert_eq!(first, second);

        // A different turn number changes the seed and, in general, the picks
        let other_turn = ConversationContext {
            turn_number: 4,
            ..ConversationContext::new()
        };
        let third = StateManager::select(&[], &other_turn, &[], None, None, Some("abc"));
        assert_eq!(third.len(), 2);
    }

    #[test]
    fn test_silence_when_nothing_detected_and_rep_is_fine() {
        let context = ConversationContext::new();
        let rep_cues = [
            crate::taxonomy::find_rep_cue("question-quality").unwrap().cue,
            crate::taxonomy::find_rep_cue("active-listening").unwrap().cue,
            crate::taxonomy::find_rep_cue("value-communication").unwrap().cue,
        ];

        let selected = StateManager::select(&[], &context, &rep_cues, None, None, None);
        assert!(selected.is_empty());
    }

    #[test]
    fn test_recency_deduplication() {
        let mut context = ConversationContext::new();
        context.previous_cues = vec!["time-pressure".to_string()];

        let raw = [cue("time-pressure"), cue("skepticism")];
        let rep_cues = [
            crate::taxonomy::find_rep_cue("question-quality").unwrap().cue,
            crate::taxonomy::find_rep_cue("active-listening").unwrap().cue,
            crate::taxonomy::find_rep_cue("value-communication").unwrap().cue,
        ];

        let selected = StateManager::select(&raw, &context, &rep_cues, None, None, None);
        assert!(selected.iter().all(|c| c.id != "time-pressure"));
        assert!(selected.iter().any(|c| c.id == "skepticism"));
    }

    #[test]
    fn test_all_recent_raw_cues_force_fallback() {
        let mut context = ConversationContext::new();
        context.previous_cues = vec!["time-pressure".to_string(), "skepticism".to_string()];
        context.turn_number = 2;

        let raw = [cue("time-pressure"), cue("skepticism")];
        let rep_cues = [
            crate::taxonomy::find_rep_cue("question-quality").unwrap().cue,
            crate::taxonomy::find_rep_cue("active-listening").unwrap().cue,
            crate::taxonomy::find_rep_cue("value-communication").unwrap().cue,
        ];

        let selected = StateManager::select(&raw, &context, &rep_cues, None, None, Some("s1"));
        assert!(!selected.is_empty());
        assert!(selected.iter().all(|c| c.id != "time-pressure" && c.id != "skepticism"));
    }

    #[test]
    fn test_improving_mood_softens_high_severity() {
        let context = ConversationContext {
            hcp_mood: MoodTrend::Stable,
            ..ConversationContext::new()
        };
        // Four rep cues: performance Good, trend Improving
        let rep_cues = [
            crate::taxonomy::find_rep_cue("question-quality").unwrap().cue,
            crate::taxonomy::find_rep_cue("active-listening").unwrap().cue,
            crate::taxonomy::find_rep_cue("value-communication").unwrap().cue,
            crate::taxonomy::find_rep_cue("commitment-gaining").unwrap().cue,
        ];

        let raw = [cue("frustration")]; // high severity, stress
        let selected = StateManager::select(&raw, &context, &rep_cues, None, None, None);

        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].category, CueCategory::Stress);
        assert_ne!(selected[0].severity, Severity::High);
    }

    #[test]
    fn test_declining_mood_sharpens_low_severity() {
        let context = ConversationContext::new();
        // Zero rep cues: performance Poor, trend Declining
        let raw = [cue("receptiveness")]; // low severity, interest

        let selected = StateManager::select(&raw, &context, &[], None, None, None);
        assert_eq!(selected.len(), 1);
        assert_eq!(selected[0].category, CueCategory::Interest);
        assert_eq!(selected[0].severity, Severity::High);
    }

    #[test]
    fn test_rep_negativity_drops_interest_from_pool() {
        let context = ConversationContext::new();
        let raw = [cue("curiosity"), cue("time-pressure")];

        let selected = StateManager::select(
            &raw,
            &context,
            &[],
            Some("Why don't you just read the brochure?"),
            None,
            Some("s2"),
        );

        // Raw interest cue survives (raw cues are filtered by recency only),
        // but any fallback path or enhancement draws from the filtered pool.
        assert!(selected.len() <= MAX_SELECTED_CUES);
    }

    #[test]
    fn test_selection_cap() {
        let context = ConversationContext::new();
        let rep_cues = [
            crate::taxonomy::find_rep_cue("question-quality").unwrap().cue,
            crate::taxonomy::find_rep_cue("active-listening").unwrap().cue,
            crate::taxonomy::find_rep_cue("value-communication").unwrap().cue,
        ];
        let raw = [cue("time-pressure"), cue("skepticism"), cue("overwhelm")];

        let selected = StateManager::select(&raw, &context, &rep_cues, None, None, None);
        assert_eq!(selected.len(), MAX_SELECTED_CUES);
    }

    #[test]
    fn test_update_context_appends_and_caps() {
        let mut context = ConversationContext::new();
        let rep_cues = [
            crate::taxonomy::find_rep_cue("question-quality").unwrap().cue,
            crate::taxonomy::find_rep_cue("active-listening").unwrap().cue,
            crate::taxonomy::find_rep_cue("value-communication").unwrap().cue,
            crate::taxonomy::find_rep_cue("commitment-gaining").unwrap().cue,
        ];

        for _ in 0..10 {
            let selected = [cue("time-pressure"), cue("skepticism")];
            context = StateManager::update_context(&context, &selected, &rep_cues);
        }

        assert_eq!(context.turn_number, 10);
        assert!(context.previous_cues.len() <= HISTORY_CAP);
        assert_eq!(context.rep_performance, RepPerformance::Good);
        assert_eq!(context.hcp_mood, MoodTrend::Improving);
    }

    #[test]
    fn test_state_label_parsing() {
        assert_eq!(
            ConversationalState::from_label("time-pressured").unwrap(),
            ConversationalState::TimePressured
        );
        assert_eq!(
            ConversationalState::from_label("Boundary Setting").unwrap(),
            ConversationalState::BoundarySetting
        );
        assert!(ConversationalState::from_label("euphoric").is_err());
    }

    #[test]
    fn test_state_category_table() {
        assert_eq!(
            ConversationalState::TimePressured.allowed_categories(),
            &[CueCategory::Stress, CueCategory::Engagement]
        );
        assert_eq!(
            ConversationalState::Engaged.allowed_categories(),
            &[CueCategory::Interest]
        );
    }

    #[test]
    fn test_alignment_validator() {
        let aligned = validate_cue_state_alignment(
            &[cue("time-pressure"), cue("low-engagement")],
            ConversationalState::TimePressured,
        );
        assert!(aligned.valid);
        assert!(aligned.mismatches.is_empty());

        let misaligned = validate_cue_state_alignment(
            &[cue("curiosity"), cue("time-pressure")],
            ConversationalState::Resistant,
        );
        assert!(!misaligned.valid);
        assert_eq!(misaligned.mismatches.len(), 1);
        assert_eq!(misaligned.mismatches[0].cue_id, "curiosity");
        assert_eq!(misaligned.mismatches[0].category, CueCategory::Interest);
    }
}
