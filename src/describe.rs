//! Behavioral description generation
//!
//! Turns a selected cue set (or its absence) into prose: body-language,
//! vocal-tone, and physical-cue fragments plus a single overall description
//! chosen by precedence. Template rotation for the positive case is the one
//! place true randomness is allowed; it only affects cosmetic variety.

use crate::types::{BehavioralCue, BehavioralDescription, CueCategory, Severity};
use rand::Rng;

/// Prose fragments for one cue id, split across the three channels
struct FragmentSet {
    id: &'static str,
    body_language: &'static [&'static str],
    vocal_tone: &'static [&'static str],
    physical_cues: &'static [&'static str],
}

const FRAGMENTS: &[FragmentSet] = &[
    FragmentSet {
        id: "time-pressure",
        body_language: &["Keeps shifting weight toward the door."],
        vocal_tone: &["Speaks in quick, compressed sentences."],
        physical_cues: &["Checks their watch mid-sentence."],
    },
    FragmentSet {
        id: "impatience",
        body_language: &["Drums fingers on the desk."],
        vocal_tone: &["Cuts in before sentences finish."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "overwhelm",
        body_language: &["Leans back and rubs their forehead."],
        vocal_tone: &["Voice trails off mid-thought."],
        physical_cues: &["Pushes the printed materials slightly away."],
    },
    FragmentSet {
        id: "frustration",
        body_language: &["Jaw visibly tightens."],
        vocal_tone: &["Tone sharpens, with clipped word endings."],
        physical_cues: &["Exhales audibly before responding."],
    },
    FragmentSet {
        id: "anxiety",
        body_language: &["Shoulders rise and stay tense."],
        vocal_tone: &["Voice wavers on key words."],
        physical_cues: &["Fidgets with a pen while listening."],
    },
    FragmentSet {
        id: "skepticism",
        body_language: &["One eyebrow stays raised."],
        vocal_tone: &["Draws out questioning syllables."],
        physical_cues: &["Tilts head slightly while weighing claims."],
    },
    FragmentSet {
        id: "objection",
        body_language: &["Leans forward to press the point."],
        vocal_tone: &["Firm, deliberate emphasis on the concern."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "defensiveness",
        body_language: &["Arms fold across the chest."],
        vocal_tone: &["Flat, closed-off delivery."],
        physical_cues: &["Angles the chair slightly away."],
    },
    FragmentSet {
        id: "boundary-setting",
        body_language: &["Palms come up in a gentle stop gesture."],
        vocal_tone: &["Polite but final phrasing."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "prior-commitment",
        body_language: &["Settles back with settled confidence."],
        vocal_tone: &["Matter-of-fact, already-decided cadence."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "cost-concern",
        body_language: &["Winces slightly at the numbers."],
        vocal_tone: &["Hesitates before any figure is repeated."],
        physical_cues: &["Taps the budget line on the page."],
    },
    FragmentSet {
        id: "brush-off",
        body_language: &["Gives a noncommittal shrug."],
        vocal_tone: &["Vague, trailing phrasing."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "curiosity",
        body_language: &["Leans in as the question forms."],
        vocal_tone: &["Rising, genuinely interested inflection."],
        physical_cues: &["Eyes track the material closely."],
    },
    FragmentSet {
        id: "information-seeking",
        body_language: &["Reaches for a pen to take notes."],
        vocal_tone: &["Precise, probing questions."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "enthusiasm",
        body_language: &["Posture opens up noticeably."],
        vocal_tone: &["Energy lifts, words come faster."],
        physical_cues: &["Nods along emphatically."],
    },
    FragmentSet {
        id: "receptiveness",
        body_language: &["Nods steadily while listening."],
        vocal_tone: &["Warm, encouraging acknowledgments."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "buying-signal",
        body_language: &["Sits up and pulls the paperwork closer."],
        vocal_tone: &["Concrete, logistics-focused questions."],
        physical_cues: &["Reaches for their calendar."],
    },
    FragmentSet {
        id: "comparison-shopping",
        body_language: &["Weighs alternatives with a side-to-side glance."],
        vocal_tone: &["Evaluative, measured comparisons."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "low-engagement",
        body_language: &["Gaze drifts toward the window."],
        vocal_tone: &["Flat, minimal replies."],
        physical_cues: &["Attention flicks to their phone."],
    },
    FragmentSet {
        id: "processing",
        body_language: &["Pauses, eyes moving as they think."],
        vocal_tone: &["Slower, considering cadence."],
        physical_cues: &[],
    },
    FragmentSet {
        id: "distraction",
        body_language: &["Attention visibly pulled elsewhere."],
        vocal_tone: &["Asks for things to be repeated."],
        physical_cues: &["Glances repeatedly at the door."],
    },
    FragmentSet {
        id: "disengagement",
        body_language: &["Starts gathering their things."],
        vocal_tone: &["Wrapping-up phrases creep in."],
        physical_cues: &["Pushes the chair back slightly."],
    },
];

const QUESTION_TEMPLATES: &[&str] = &[
    "Leans in attentively while asking, maintaining steady eye contact.",
    "Poses the question with genuine interest, posture open and engaged.",
    "Asks directly and waits, giving the answer room to land.",
];

const ACKNOWLEDGMENT_TEMPLATES: &[&str] = &[
    "Nods in acknowledgment, following the thread comfortably.",
    "Signals understanding with a relaxed, receptive posture.",
    "Takes the point on board with an easy, affirming nod.",
];

const ENTHUSIASM_TEMPLATES: &[&str] = &[
    "Responds with visible energy, clearly engaged by the direction.",
    "Brightens noticeably, leaning into the conversation.",
    "Shows open enthusiasm, matching the pace of the discussion.",
];

const REFLECTIVE_TEMPLATES: &[&str] = &[
    "Pauses thoughtfully, turning the idea over before responding.",
    "Considers the point carefully, gaze steady and focused.",
    "Takes a reflective beat, weighing the implications.",
];

const GENERIC_TEMPLATES: &[&str] = &[
    "Maintains a calm, attentive presence throughout the exchange.",
    "Stays comfortably engaged, with relaxed and open body language.",
    "Follows along steadily, giving no sign of tension or resistance.",
];

const STRESS_COMPOSITE: &str =
    "Visible tension throughout: clipped speech, a tight jaw, and repeated glances toward the clock.";

const RESISTANCE_COMPOSITE: &str =
    "Firmly closed off: crossed arms, flat delivery, and a deliberate step back from the discussion.";

const LOW_ENGAGEMENT_COMPOSITE: &str =
    "Minimal engagement: wandering gaze, one-word replies, and attention drifting to other tasks.";

const MIXED_SIGNALS: &str =
    "Mixed signals: moments of genuine interest cut against visible tension and guarded posture.";

/// Message content families used to pick a positive template
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MessageTone {
    Question,
    Acknowledgment,
    Enthusiasm,
    Reflective,
    Generic,
}

const ACKNOWLEDGMENT_WORDS: &[&str] = &["i see", "makes sense", "thank you", "thanks", "got it", "understood"];
const ENTHUSIASM_WORDS: &[&str] = &["great", "excellent", "love", "exciting", "perfect", "fantastic"];
const REFLECTIVE_WORDS: &[&str] = &["let me think", "considering", "interesting point", "hadn't thought", "good question"];

fn classify_message_tone(message: &str) -> MessageTone {
    let lower = message.to_lowercase();
    if lower.contains('?') {
        return MessageTone::Question;
    }
    if ACKNOWLEDGMENT_WORDS.iter().any(|w| lower.contains(w)) {
        return MessageTone::Acknowledgment;
    }
    if ENTHUSIASM_WORDS.iter().any(|w| lower.contains(w)) {
        return MessageTone::Enthusiasm;
    }
    if REFLECTIVE_WORDS.iter().any(|w| lower.contains(w)) {
        return MessageTone::Reflective;
    }
    MessageTone::Generic
}

fn templates_for(tone: MessageTone) -> &'static [&'static str] {
    match tone {
        MessageTone::Question => QUESTION_TEMPLATES,
        MessageTone::Acknowledgment => ACKNOWLEDGMENT_TEMPLATES,
        MessageTone::Enthusiasm => ENTHUSIASM_TEMPLATES,
        MessageTone::Reflective => REFLECTIVE_TEMPLATES,
        MessageTone::Generic => GENERIC_TEMPLATES,
    }
}

/// Behavioral description generator
pub struct Describer;

impl Describer {
    /// Render a selected cue set into channel fragments plus one overall
    /// description chosen by precedence.
    pub fn describe(cues: &[BehavioralCue], message_text: &str) -> BehavioralDescription {
        let mut body_language: Vec<String> = Vec::new();
        let mut vocal_tone: Vec<String> = Vec::new();
        let mut physical_cues: Vec<String> = Vec::new();

        for cue in cues {
            if let Some(set) = FRAGMENTS.iter().find(|f| f.id == cue.id) {
                push_unique(&mut body_language, set.body_language);
                push_unique(&mut vocal_tone, set.vocal_tone);
                push_unique(&mut physical_cues, set.physical_cues);
            }
        }

        BehavioralDescription {
            body_language,
            vocal_tone,
            physical_cues,
            overall_description: overall_description(cues, message_text),
        }
    }
}

fn push_unique(target: &mut Vec<String>, fragments: &[&str]) {
    for fragment in fragments {
        if !target.iter().any(|existing| existing == fragment) {
            target.push((*fragment).to_string());
        }
    }
}

/// Overall description precedence: positive template, severity composite,
/// low-engagement composite, mixed signals, then the first cue's own text.
fn overall_description(cues: &[BehavioralCue], message_text: &str) -> String {
    if cues.is_empty() {
        let templates = templates_for(classify_message_tone(message_text));
        let index = rand::thread_rng().gen_range(0..templates.len());
        return templates[index].to_string();
    }

    let high: Vec<&BehavioralCue> = cues.iter().filter(|c| c.severity == Severity::High).collect();
    if high.len() >= 2 {
        let stress = high.iter().filter(|c| c.category == CueCategory::Stress).count();
        let resistance = high
            .iter()
            .filter(|c| c.category == CueCategory::Resistance)
            .count();
        return if resistance > stress {
            RESISTANCE_COMPOSITE.to_string()
        } else {
            STRESS_COMPOSITE.to_string()
        };
    }

    if cues.iter().all(|c| c.category == CueCategory::Engagement) {
        return LOW_ENGAGEMENT_COMPOSITE.to_string();
    }

    let mut categories: Vec<CueCategory> = cues.iter().map(|c| c.category).collect();
    categories.sort_by_key(|c| c.as_str());
    categories.dedup();
    if categories.len() >= 3 {
        return MIXED_SIGNALS.to_string();
    }

    cues[0].description.to_string()
}
