use super::catalog::{catalog, CatalogEntry};
use super::types::{Intent, IntentKind};
use crate::kernel::state::MemoryDelta;
use tracing::debug;

pub const MIN_CONFIDENCE: f32 = 0.1;
pub const MAX_CONFIDENCE: f32 = 0.95;
pub const DEFAULT_THRESHOLD: f32 = 0.3;

const LONG_INPUT_CHARS: usize = 50;
const SHORT_SPAN_CHARS: usize = 20;
const LENGTH_PENALTY: f32 = 0.3;

/// Pattern-catalog classifier. Pure: it never touches dialogue memory.
#[derive(Debug, Clone)]
pub struct IntentClassifier {
    threshold: f32,
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl IntentClassifier {
    pub fn new(threshold: f32) -> Self {
        Self { threshold }
    }

    pub fn classify(&self, text: &str) -> Intent {
        let input = text.trim();
        if input.is_empty() {
            return Intent::unknown(text);
        }

        let lower = input.to_lowercase();
        let input_len = input.chars().count();
        let mut best: Option<(f32, Intent)> = None;

        for entry in catalog() {
            for pattern in &entry.patterns {
                let Some(caps) = pattern.captures(input) else {
                    continue;
                };
                let span_len = caps.get(0).map(|m| m.as_str().chars().count()).unwrap_or(0);
                let score = score(entry, &lower, input_len, span_len);

                // Strict comparison keeps the first of equal scores.
                if best.as_ref().map_or(true, |(top, _)| score > *top) {
                    let data = (entry.extract)(&caps);
                    best = Some((score, Intent::new(entry.kind, score, data, text)));
                }
            }
        }

        match best {
            Some((score, intent)) if score >= self.threshold => {
                debug!(kind = %intent.kind, confidence = score, "classified");
                intent
            }
            _ => {
                debug!("no pattern reached threshold");
                Intent::unknown(text)
            }
        }
    }
}

fn score(entry: &CatalogEntry, lower: &str, input_len: usize, span_len: usize) -> f32 {
    let coverage = if input_len == 0 { 0.0 } else { span_len as f32 / input_len as f32 };

    let keyword_boost = if entry.keywords.is_empty() {
        0.0
    } else {
        let hits = entry.keywords.iter().filter(|k| lower.contains(*k)).count();
        hits as f32 / entry.keywords.len() as f32
    };

    let length_penalty = if input_len > LONG_INPUT_CHARS && span_len < SHORT_SPAN_CHARS {
        LENGTH_PENALTY
    } else {
        0.0
    };

    (coverage * 0.6 + keyword_boost * 0.4 - length_penalty).clamp(MIN_CONFIDENCE, MAX_CONFIDENCE)
}

/// Bookkeeping stage: turns a fresh classification into memory deltas.
///
/// Kept apart from `classify` so classification stays side-effect free.
pub fn apply_classification(intent: &Intent) -> Vec<MemoryDelta> {
    let mut deltas = Vec::new();
    if intent.kind == IntentKind::Unknown {
        deltas.push(MemoryDelta::ClassificationFailed);
        return deltas;
    }
    deltas.push(MemoryDelta::IntentObserved(intent.kind));
    if let Some(project) = intent.slot("projectName") {
        deltas.push(MemoryDelta::ActiveProject(project.to_string()));
    }
    deltas
}
