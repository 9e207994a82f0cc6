//! Phrase pools so repeated turns don't sound robotic.
//!
//! Every function is pure apart from the caller's RNG.

use rand::seq::SliceRandom;
use rand::Rng;

pub const DIDNT_CATCH: &str = "I didn't catch that.";
pub const TROUBLE_HEARING: &str = "I had trouble hearing you — let's try again.";
pub const START_OVER: &str = "Sorry, I lost track of what we were doing. Let's start over.";
pub const NAVIGATION_UNAVAILABLE: &str = "Navigation not available in this context";
pub const MEMORY_CLEARED: &str = "Okay, I've cleared our conversation. What would you like to do?";

const TASK_CREATED: &[&str] = &[
    "Task created.",
    "Done, the task is on the board.",
    "Got it, I've added that task.",
];

const PROJECT_CREATED: &[&str] = &[
    "Project created.",
    "Your new project is ready.",
    "Done, the project is set up.",
];

const ACKNOWLEDGEMENT: &[&str] = &["Got it.", "Okay.", "Sure thing.", "On it.", "Done."];

pub const ENCOURAGEMENT: &[&str] = &[
    "You're on a roll!",
    "Nice momentum today.",
    "Great progress, keep it up!",
];

const FALLBACK_HELP: &[&str] = &[
    "You can say things like \"create a project called Apollo\", \"add a task to fix the login bug\", or \"go to dashboard\".",
    "Try \"create task\", \"remember this: update the docs\", \"show my projects\", or \"what did I just do\".",
];

const CLARIFY: &[&str] = &[
    "Sorry, I didn't understand that. Could you rephrase?",
    "I'm not sure what you mean. Can you say it another way?",
];

const CANCELLED: &[&str] = &["Okay, cancelled.", "No problem, I won't do that.", "Alright, scrapped."];

const TITLE_PROMPTS: &[&str] = &["What's the title?", "What should we call it?"];
const ASSIGNEE_PROMPTS: &[&str] = &["Who should I assign it to?", "Who's taking this one?"];

fn pick<R: Rng + ?Sized>(pool: &[&'static str], rng: &mut R) -> &'static str {
    pool.choose(rng).copied().unwrap_or("")
}

pub fn task_created<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(TASK_CREATED, rng)
}

pub fn project_created<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(PROJECT_CREATED, rng)
}

pub fn acknowledgement<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(ACKNOWLEDGEMENT, rng)
}

pub fn encouragement<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(ENCOURAGEMENT, rng)
}

pub fn fallback_help<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(FALLBACK_HELP, rng)
}

pub fn clarify<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(CLARIFY, rng)
}

pub fn cancelled<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    pick(CANCELLED, rng)
}

/// Prompt for a slot. `title` and `assignee` get friendlier wording.
pub fn missing_field<R: Rng + ?Sized>(field: &str, rng: &mut R) -> String {
    match field {
        "title" => pick(TITLE_PROMPTS, rng).to_string(),
        "assignee" => pick(ASSIGNEE_PROMPTS, rng).to_string(),
        other => format!("What should the {} be?", humanize(other)),
    }
}

/// "projectCode" -> "project code".
pub fn humanize(field: &str) -> String {
    let mut out = String::with_capacity(field.len() + 4);
    for ch in field.chars() {
        if ch.is_uppercase() {
            out.push(' ');
            out.extend(ch.to_lowercase());
        } else if ch == '_' {
            out.push(' ');
        } else {
            out.push(ch);
        }
    }
    out
}
