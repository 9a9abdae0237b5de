// SPDX-FileCopyrightText: 2026 Tandem Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule-based prompt scoring.
//!
//! Two running totals, one per backend, are built up by ordered rules. The
//! higher total wins and ties go to the fast backend. No network, no model
//! call, no state: the same text always yields the same decision.

use serde::Serialize;
use tandem_core::BackendKind;

/// Interrogative openers that mark a plain question.
const WH_OPENERS: &[&str] = &[
    "who", "what", "what's", "whats", "why", "when", "where", "which", "whose", "how",
];

/// Yes/no question openers.
const YES_NO_OPENERS: &[&str] = &[
    "is", "are", "was", "were", "does", "did", "can", "could", "should", "will", "would",
];

/// Phrases asking for a definition or explanation.
const EXPLAIN_PHRASES: &[&str] = &[
    "define", "definition of", "meaning of", "what is", "what are", "what does",
    "explain", "describe", "tell me about",
];

/// Verbs asking for work to be carried out rather than answered.
const EXECUTION_VERBS: &[&str] = &[
    "create", "build", "make", "generate", "write", "draft", "calculate", "compute",
    "research", "summarize", "summarise", "analyze", "analyse", "compile", "design",
    "develop", "prepare", "plan", "schedule", "automate", "scrape", "extract",
    "organize", "organise", "produce", "book",
];

/// Phrases referring to the requester's own data.
const MY_DATA_PHRASES: &[&str] = &[
    "my data", "my files", "my documents", "my docs", "my email", "my emails", "my inbox",
    "my calendar", "my spreadsheet", "my drive", "my account", "my contacts", "my notes",
    "my sales", "our data", "our files", "our sales",
];

/// Business deliverables that usually take real work to produce.
const BUSINESS_DOCUMENTS: &[&str] = &[
    "report", "reports", "presentation", "spreadsheet", "financial model", "business plan",
    "proposal", "invoice", "budget", "forecast", "dashboard", "slide deck", "slides",
    "pitch deck", "memo", "contract", "market analysis", "itinerary",
];

/// Adverbs and phrases signalling depth of effort.
const COMPLEXITY_ADVERBS: &[&str] = &[
    "comprehensive", "comprehensively", "detailed", "thorough", "thoroughly", "in depth",
    "step by step", "end to end", "extensively", "multi step",
];

/// Greetings and closings.
const GREETINGS: &[&str] = &[
    "hi", "hello", "hey", "yo", "hiya", "howdy", "greetings", "sup", "thanks", "thank you",
    "thx", "ty", "cheers", "bye", "goodbye", "see you", "good morning", "good afternoon",
    "good evening", "good night", "ok", "okay",
];

/// Modal and subject words of the "how can you <verb>" override.
const OVERRIDE_MODALS: &[&str] = &["can", "could", "do"];
const OVERRIDE_SUBJECTS: &[&str] = &["you", "i", "we"];

/// Tunable rule weights.
#[derive(Debug, Clone, PartialEq)]
pub struct RouterWeights {
    /// Added to the fast score by each matching question rule.
    pub question: f64,
    /// Added to the agentic score when any execution verb appears.
    pub execution_verb: f64,
    /// Added to the agentic score when the prompt refers to the user's data.
    pub my_data: f64,
    /// Added to the agentic score when a business document is mentioned.
    pub business_document: f64,
    /// Added to the agentic score when a complexity adverb appears.
    pub complexity_adverb: f64,
    /// Word count past which the length increment applies.
    pub long_prompt_words: usize,
    /// Added to the agentic score per word past `long_prompt_words`.
    pub per_extra_word: f64,
    /// Added to the agentic score when the override pattern matches.
    pub override_bonus: f64,
    /// Maximum word count for the greeting rule.
    pub greeting_max_words: usize,
    /// Added to the fast score for short greetings and closings.
    pub greeting_bonus: f64,
}

impl Default for RouterWeights {
    fn default() -> Self {
        Self {
            question: 2.0,
            execution_verb: 5.0,
            my_data: 3.0,
            business_document: 3.0,
            complexity_adverb: 2.0,
            long_prompt_words: 30,
            per_extra_word: 0.1,
            override_bonus: 10.0,
            greeting_max_words: 4,
            // Larger than every agentic category combined, so a short
            // greeting never routes to the slow backend.
            greeting_bonus: 15.0,
        }
    }
}

/// Per-backend score totals.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct ScorePair {
    pub fast: f64,
    pub agentic: f64,
}

/// The classifier's verdict for one prompt.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingDecision {
    /// Backend chosen for the prompt.
    pub backend: BackendKind,
    /// Absolute score difference. A relative signal strength, not a probability.
    pub confidence: f64,
    /// Final totals for both backends.
    pub scores: ScorePair,
    /// Names of the rules that fired, in evaluation order.
    pub rules: Vec<&'static str>,
}

/// Scores prompts against the rule set.
#[derive(Debug, Clone, Default)]
pub struct PromptClassifier {
    weights: RouterWeights,
}

impl PromptClassifier {
    /// Create a classifier with default weights.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a classifier with custom weights.
    pub fn with_weights(weights: RouterWeights) -> Self {
        Self { weights }
    }

    pub fn weights(&self) -> &RouterWeights {
        &self.weights
    }

    /// Classify a prompt.
    pub fn classify(&self, text: &str) -> RoutingDecision {
        let w = &self.weights;
        let prompt = Normalized::new(text);
        let mut scores = ScorePair::default();
        let mut rules = Vec::new();

        // Question openers (stack).
        if prompt.first_is_any(WH_OPENERS) {
            scores.fast += w.question;
            rules.push("wh_question");
        }
        if prompt.first_is_any(YES_NO_OPENERS) {
            scores.fast += w.question;
            rules.push("yes_no_question");
        }
        if EXPLAIN_PHRASES.iter().any(|p| prompt.starts_with_phrase(p)) {
            scores.fast += w.question;
            rules.push("explain_request");
        }

        // Agentic categories (each at most once).
        if prompt.tokens.iter().any(|t| is_execution_verb(t)) {
            scores.agentic += w.execution_verb;
            rules.push("execution_verb");
        }
        if prompt.contains_any_phrase(MY_DATA_PHRASES) {
            scores.agentic += w.my_data;
            rules.push("my_data");
        }
        if prompt.contains_any_phrase(BUSINESS_DOCUMENTS) {
            scores.agentic += w.business_document;
            rules.push("business_document");
        }
        if prompt.contains_any_phrase(COMPLEXITY_ADVERBS) {
            scores.agentic += w.complexity_adverb;
            rules.push("complexity_adverb");
        }

        let words = prompt.word_count;
        if words > w.long_prompt_words {
            scores.agentic += (words - w.long_prompt_words) as f64 * w.per_extra_word;
            rules.push("long_prompt");
        }

        if words > 0 && words <= w.greeting_max_words && prompt.contains_any_phrase(GREETINGS) {
            scores.fast += w.greeting_bonus;
            rules.push("greeting");
        }

        // Evaluated last so it always has the final say.
        if prompt.has_how_can_you_pattern() {
            scores.fast = 0.0;
            scores.agentic += w.override_bonus;
            rules.push("how_can_you_override");
        }

        let backend = if scores.agentic > scores.fast {
            BackendKind::Agentic
        } else {
            BackendKind::Fast
        };

        RoutingDecision {
            backend,
            confidence: (scores.fast - scores.agentic).abs(),
            scores,
            rules,
        }
    }
}

/// Lowercased prompt split into word tokens.
struct Normalized {
    tokens: Vec<String>,
    /// Tokens joined by single spaces, padded at both ends for phrase matching.
    padded: String,
    word_count: usize,
}

impl Normalized {
    fn new(text: &str) -> Self {
        let lower = text.to_lowercase();
        let tokens: Vec<String> = lower
            .split(|c: char| !(c.is_alphanumeric() || c == '\''))
            .map(|t| t.trim_matches('\''))
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();
        let padded = format!(" {} ", tokens.join(" "));
        Self {
            word_count: text.split_whitespace().count(),
            tokens,
            padded,
        }
    }

    fn first_is_any(&self, set: &[&str]) -> bool {
        self.tokens
            .first()
            .is_some_and(|first| set.contains(&first.as_str()))
    }

    fn starts_with_phrase(&self, phrase: &str) -> bool {
        self.padded.starts_with(&format!(" {phrase} "))
    }

    fn contains_any_phrase(&self, phrases: &[&str]) -> bool {
        phrases
            .iter()
            .any(|p| self.padded.contains(&format!(" {p} ")))
    }

    /// Matches "how <can|could|do> <you|i|we> <execution verb>" anywhere.
    fn has_how_can_you_pattern(&self) -> bool {
        self.tokens.windows(4).any(|w| {
            w[0] == "how"
                && OVERRIDE_MODALS.contains(&w[1].as_str())
                && OVERRIDE_SUBJECTS.contains(&w[2].as_str())
                && is_execution_verb(&w[3])
        })
    }
}

/// Whether `token` is an execution verb or a simple inflection of one.
fn is_execution_verb(token: &str) -> bool {
    EXECUTION_VERBS.iter().any(|verb| {
        if token == *verb {
            return true;
        }
        let stem = verb.strip_suffix('e').unwrap_or(verb);
        match token.strip_prefix(stem) {
            Some(rest) => matches!(rest, "s" | "es" | "d" | "ed" | "ing"),
            None => false,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(text: &str) -> RoutingDecision {
        PromptClassifier::new().classify(text)
    }

    #[test]
    fn greeting_routes_fast_with_positive_confidence() {
        let d = classify("hi");
        assert_eq!(d.backend, BackendKind::Fast);
        assert!(d.confidence > 0.0);
        assert!(d.rules.contains(&"greeting"));
    }

    #[test]
    fn financial_model_request_routes_agentic() {
        let d = classify("Build me a 5-year financial model with sensitivity analysis");
        assert_eq!(d.backend, BackendKind::Agentic);
        assert!(d.rules.contains(&"execution_verb"));
        assert!(d.rules.contains(&"business_document"));
    }

    #[test]
    fn plain_question_routes_fast() {
        let d = classify("What is the capital of France?");
        assert_eq!(d.backend, BackendKind::Fast);
        assert!(d.rules.contains(&"wh_question"));
        assert!(d.rules.contains(&"explain_request"));
        assert_eq!(d.scores.fast, 4.0);
    }

    #[test]
    fn how_can_you_override_beats_question_signal() {
        let d = classify("How can you create a dashboard from my sales data?");
        assert_eq!(d.backend, BackendKind::Agentic);
        assert_eq!(d.scores.fast, 0.0);
        assert!(d.rules.contains(&"how_can_you_override"));
    }

    #[test]
    fn how_to_question_without_verb_stays_fast() {
        let d = classify("How do you pronounce quinoa?");
        assert_eq!(d.backend, BackendKind::Fast);
        assert!(!d.rules.contains(&"how_can_you_override"));
    }

    #[test]
    fn execution_verb_counts_once() {
        let once = classify("create a list");
        let twice = classify("create a list and build a plan and generate ideas");
        assert_eq!(once.scores.agentic, 5.0);
        // "plan" is also a verb; the category still only counts once.
        assert_eq!(twice.scores.agentic, 5.0);
    }

    #[test]
    fn independent_categories_stack() {
        let d = classify("Analyze my data and write a comprehensive report");
        assert_eq!(d.scores.agentic, 5.0 + 3.0 + 3.0 + 2.0);
    }

    #[test]
    fn inflected_verbs_match() {
        assert!(is_execution_verb("creating"));
        assert!(is_execution_verb("summarized"));
        assert!(is_execution_verb("builds"));
        assert!(!is_execution_verb("builder"));
        assert!(!is_execution_verb("planet"));
    }

    #[test]
    fn long_prompt_adds_per_word_increment() {
        let text = vec!["word"; 40].join(" ");
        let d = classify(&text);
        assert!((d.scores.agentic - 1.0).abs() < 1e-9);
        assert!(d.rules.contains(&"long_prompt"));
    }

    #[test]
    fn ties_go_fast() {
        let d = classify("lorem ipsum dolor");
        assert_eq!(d.scores, ScorePair::default());
        assert_eq!(d.backend, BackendKind::Fast);
        assert_eq!(d.confidence, 0.0);
    }

    #[test]
    fn empty_input_is_handled() {
        let d = classify("");
        assert_eq!(d.backend, BackendKind::Fast);
        assert!(d.rules.is_empty());
        let d = classify("   \n\t ");
        assert_eq!(d.backend, BackendKind::Fast);
    }

    #[test]
    fn short_greeting_with_verb_still_fast() {
        let d = classify("thanks, build report");
        assert_eq!(d.backend, BackendKind::Fast);
    }

    #[test]
    fn greeting_rule_ignores_long_messages() {
        let d = classify("hello there, I was wondering about something today");
        assert!(!d.rules.contains(&"greeting"));
    }

    #[test]
    fn custom_weights_apply() {
        let c = PromptClassifier::with_weights(RouterWeights {
            execution_verb: 1.0,
            ..RouterWeights::default()
        });
        assert_eq!(c.classify("create it").scores.agentic, 1.0);
    }
}
