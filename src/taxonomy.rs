//! Static cue taxonomy
//!
//! Load-time-immutable catalogs: counterpart behavioral cues, representative
//! metric cues, and the mood keyword lists. Every entry is data, not behavior;
//! the detector and state manager interpret it.

use crate::types::{BehavioralCue, CueCategory, RepMetricCategory, RepMetricCue, Severity};

/// A counterpart cue plus its trigger phrases and optional length gate
#[derive(Debug, Clone, Copy)]
pub struct CueSpec {
    pub cue: BehavioralCue,
    /// Lowercase substrings that fire this cue
    pub triggers: &'static [&'static str],
    /// When set, the cue only fires if the message has fewer than this many
    /// words. Short generic phrases ("okay", "sure") are only a signal when
    /// the surrounding message is otherwise empty.
    pub max_words: Option<usize>,
}

/// A representative metric cue plus its trigger phrases
#[derive(Debug, Clone, Copy)]
pub struct RepCueSpec {
    pub cue: RepMetricCue,
    pub triggers: &'static [&'static str],
    /// Contextual cues also require evidence in the previous counterpart turn
    pub contextual: bool,
}

macro_rules! cue {
    ($id:literal, $label:literal, $desc:literal, $sev:ident, $cat:ident) => {
        BehavioralCue {
            id: $id,
            label: $label,
            description: $desc,
            severity: Severity::$sev,
            category: CueCategory::$cat,
        }
    };
}

/// Counterpart cue catalog.
///
/// Order is the detection order and must stay stable: deterministic selection
/// depends on pool ordering.
pub const COUNTERPART_CUES: &[CueSpec] = &[
    // --- stress ---
    CueSpec {
        cue: cue!(
            "time-pressure",
            "Time pressure",
            "Signals that time is scarce and the conversation is on a clock.",
            High,
            Stress
        ),
        triggers: TIME_PRESSURE_PHRASES,
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "impatience",
            "Impatience",
            "Pushes the conversation to move faster.",
            Medium,
            Stress
        ),
        triggers: &["get to the point", "hurry up", "come on", "can we speed", "move this along"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "overwhelm",
            "Overwhelm",
            "Indicates the volume or complexity of information is too much.",
            High,
            Stress
        ),
        triggers: &["too much", "overwhelmed", "a lot to take in", "lost me", "slow down"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "frustration",
            "Frustration",
            "Expresses irritation with the conversation or situation.",
            High,
            Stress
        ),
        triggers: &["frustrat", "annoying", "ridiculous", "sick of", "tired of this"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "anxiety",
            "Anxiety",
            "Voices unease or worry about consequences.",
            Medium,
            Stress
        ),
        triggers: &["worried", "nervous", "anxious", "what if it goes wrong", "risky"],
        max_words: None,
    },
    // --- resistance ---
    CueSpec {
        cue: cue!(
            "skepticism",
            "Skepticism",
            "Questions the credibility of the claims being made.",
            Medium,
            Resistance
        ),
        triggers: &["doubt", "not convinced", "skeptical", "hard to believe", "prove it", "sounds too good"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "objection",
            "Objection",
            "Raises a concrete concern that blocks progress.",
            High,
            Resistance
        ),
        triggers: OBJECTION_PHRASES,
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "defensiveness",
            "Defensiveness",
            "Rejects the premise that anything needs to change.",
            High,
            Resistance
        ),
        triggers: &["we're fine", "don't need", "not interested", "works fine as is", "no thanks"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "boundary-setting",
            "Boundary setting",
            "Redirects the conversation to another time or channel.",
            Medium,
            Resistance
        ),
        triggers: &["not now", "another time", "send me an email", "talk to my", "book through"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "prior-commitment",
            "Prior commitment",
            "Points to an existing solution or supplier already in place.",
            Medium,
            Resistance
        ),
        triggers: &["already use", "we have a", "current supplier", "under contract", "happy with what we"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "cost-concern",
            "Cost concern",
            "Flags price or budget as the sticking point.",
            Medium,
            Resistance
        ),
        triggers: &["expensive", "can't afford", "budget", "cost", "price", "cheaper"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "brush-off",
            "Brush-off",
            "Defers vaguely without committing to anything.",
            Low,
            Resistance
        ),
        triggers: &["maybe later", "we'll see", "i'll think about it", "let me get back"],
        max_words: None,
    },
    // --- interest ---
    CueSpec {
        cue: cue!(
            "curiosity",
            "Curiosity",
            "Asks for more detail about how something works.",
            Low,
            Interest
        ),
        triggers: &["how does", "tell me more", "interesting", "what about", "curious"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "information-seeking",
            "Information seeking",
            "Requests evidence, data, or specifics before moving forward.",
            Medium,
            Interest
        ),
        triggers: &["any data", "the evidence", "studies", "what results", "specifics", "details on"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "enthusiasm",
            "Enthusiasm",
            "Responds with visible energy and positivity.",
            Medium,
            Interest
        ),
        triggers: &["that's great", "excellent", "love that", "exciting", "fantastic"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "receptiveness",
            "Receptiveness",
            "Accepts points as they are made and invites more.",
            Low,
            Interest
        ),
        triggers: &["makes sense", "fair point", "go on", "i see what you mean", "that helps"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "buying-signal",
            "Buying signal",
            "Asks about next steps, pricing, or how to get started.",
            High,
            Interest
        ),
        triggers: &["next step", "pricing", "how do we start", "trial", "samples", "get started"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "comparison-shopping",
            "Comparison shopping",
            "Weighs the offer against alternatives.",
            Medium,
            Interest
        ),
        triggers: &["compared to", "versus", "alternative", "other options", "competitor"],
        max_words: None,
    },
    // --- engagement ---
    CueSpec {
        cue: cue!(
            "low-engagement",
            "Low engagement",
            "Replies with minimal, noncommittal acknowledgments.",
            Medium,
            Engagement
        ),
        triggers: &["okay", "sure", "fine", "uh huh", "right", "yep"],
        max_words: Some(5),
    },
    CueSpec {
        cue: cue!(
            "processing",
            "Processing",
            "Pauses to absorb what was just said.",
            Low,
            Engagement
        ),
        triggers: &["hmm", "let me think", "i see", "hold on", "give me a second"],
        max_words: Some(10),
    },
    CueSpec {
        cue: cue!(
            "distraction",
            "Distraction",
            "Attention has drifted away from the conversation.",
            Medium,
            Engagement
        ),
        triggers: &["sorry, what", "where were we", "say that again", "one second", "missed that"],
        max_words: None,
    },
    CueSpec {
        cue: cue!(
            "disengagement",
            "Disengagement",
            "Moves to wind the conversation down.",
            High,
            Engagement
        ),
        triggers: &["are we done", "is that all", "wrap up", "anyway", "got to go"],
        max_words: None,
    },
];

/// Representative metric cue catalog, one entry per competency.
pub const REP_METRIC_CUES: &[RepCueSpec] = &[
    RepCueSpec {
        cue: RepMetricCue {
            id: "question-quality",
            label: "Question quality",
            category: RepMetricCategory::Question,
        },
        triggers: OPEN_QUESTION_PHRASES,
        contextual: false,
    },
    RepCueSpec {
        cue: RepMetricCue {
            id: "active-listening",
            label: "Active listening",
            category: RepMetricCategory::Listening,
        },
        triggers: ACKNOWLEDGMENT_PHRASES,
        contextual: false,
    },
    RepCueSpec {
        cue: RepMetricCue {
            id: "value-communication",
            label: "Value communication",
            category: RepMetricCategory::Value,
        },
        triggers: &["benefit", "value", "improve", "outcome", "help you", "save you"],
        contextual: false,
    },
    RepCueSpec {
        cue: RepMetricCue {
            id: "engagement-building",
            label: "Engagement building",
            category: RepMetricCategory::Engagement,
        },
        triggers: &["thanks for", "appreciate", "good to speak", "glad we", "great talking"],
        contextual: false,
    },
    RepCueSpec {
        cue: RepMetricCue {
            id: "objection-navigation",
            label: "Objection navigation",
            category: RepMetricCategory::Objection,
        },
        triggers: ACKNOWLEDGMENT_PHRASES,
        contextual: true,
    },
    RepCueSpec {
        cue: RepMetricCue {
            id: "conversation-control",
            label: "Conversation control",
            category: RepMetricCategory::Control,
        },
        triggers: &["let's", "shall we", "moving on", "to summarize", "first, ", "coming back to"],
        contextual: false,
    },
    RepCueSpec {
        cue: RepMetricCue {
            id: "commitment-gaining",
            label: "Commitment gaining",
            category: RepMetricCategory::Commitment,
        },
        triggers: &["would you be open", "can we agree", "follow up", "schedule", "next step", "commit"],
        contextual: false,
    },
    RepCueSpec {
        cue: RepMetricCue {
            id: "adaptability",
            label: "Adaptability",
            category: RepMetricCategory::Adaptability,
        },
        triggers: BREVITY_PHRASES,
        contextual: true,
    },
];

/// Phrases signalling the counterpart is short on time.
/// Shared by the detector, the adaptability rule, and the scoring engine.
pub const TIME_PRESSURE_PHRASES: &[&str] = &[
    "only have",
    "two minutes",
    "short on time",
    "have to run",
    "in a hurry",
    "make it quick",
    "pressed for time",
    "running late",
];

/// Phrases signalling a concrete objection or concern.
pub const OBJECTION_PHRASES: &[&str] = &[
    "problem is",
    "issue is",
    "my concern",
    "concern is",
    "worried that",
    "the trouble with",
    "won't work for us",
];

/// Acknowledgment phrases on the representative side.
pub const ACKNOWLEDGMENT_PHRASES: &[&str] = &[
    "i understand",
    "i hear you",
    "sounds like",
    "it sounds like",
    "valid point",
    "i appreciate your concern",
    "you mentioned",
    "if i understand",
];

/// Brevity phrases on the representative side.
pub const BREVITY_PHRASES: &[&str] = &[
    "briefly",
    "in short",
    "quick version",
    "thirty seconds",
    "30 seconds",
    "to the point",
    "the short answer",
];

/// Open-ended question starters on the representative side.
pub const OPEN_QUESTION_PHRASES: &[&str] = &[
    "what",
    "how",
    "why",
    "tell me",
    "walk me through",
    "describe",
    "help me understand",
];

/// Mood keywords that read as unambiguously negative.
pub const NEGATIVE_MOOD_KEYWORDS: &[&str] = &[
    "frustrated",
    "stressed",
    "rushed",
    "impatient",
    "annoyed",
    "irritated",
    "angry",
    "busy",
    "distracted",
];

/// Mood keywords that read as unambiguously positive.
pub const POSITIVE_MOOD_KEYWORDS: &[&str] = &[
    "happy",
    "pleased",
    "curious",
    "interested",
    "relaxed",
    "engaged",
    "optimistic",
    "friendly",
    "receptive",
];

/// Look up a counterpart cue spec by id
pub fn find_cue(id: &str) -> Option<&'static CueSpec> {
    COUNTERPART_CUES.iter().find(|spec| spec.cue.id == id)
}

/// Look up a representative cue spec by id
pub fn find_rep_cue(id: &str) -> Option<&'static RepCueSpec> {
    REP_METRIC_CUES.iter().find(|spec| spec.cue.id == id)
}
