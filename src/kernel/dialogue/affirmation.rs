use regex::Regex;
use std::sync::OnceLock;

const AFFIRMATIVE_PHRASES: &[&str] = &[
    "yes",
    "yeah",
    "yep",
    "sure",
    "go ahead",
    "do it",
    "please do",
    "absolutely",
    "correct",
];

fn negative_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^(no|nah|cancel|stop|never|resume)").expect("negative pattern must compile"))
}

/// Case-insensitive, substring-tolerant: "Yes please" counts, "nope" does not.
pub fn is_affirmative(text: &str) -> bool {
    let normalized = text.trim().to_lowercase();
    AFFIRMATIVE_PHRASES
        .iter()
        .any(|phrase| normalized == *phrase || normalized.contains(phrase))
}

/// Anchored at the start of the utterance.
pub fn is_negative(text: &str) -> bool {
    negative_regex().is_match(&text.trim().to_lowercase())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    Yes,
    No,
    Unclear,
}

/// Reads a reply to a yes/no question.
///
/// The negative check runs first: "no, that's not correct" contains
/// "correct" but is a refusal.
pub fn read_answer(text: &str) -> Answer {
    if is_negative(text) {
        Answer::No
    } else if is_affirmative(text) {
        Answer::Yes
    } else {
        Answer::Unclear
    }
}
