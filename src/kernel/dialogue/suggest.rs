use crate::kernel::intent::{Intent, IntentKind, SlotMap};
use rand::seq::SliceRandom;
use rand::Rng;

/// A follow-up offer and the intent a "yes" would replay.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    pub phrase: String,
    pub replay: Intent,
}

struct Candidate {
    phrase: &'static str,
    kind: IntentKind,
    list: Option<&'static str>,
}

const AFTER_PROJECT: &[Candidate] = &[
    Candidate { phrase: "Would you like to add a task to it?", kind: IntentKind::CreateTask, list: None },
    Candidate { phrase: "Want to write a test case for this project?", kind: IntentKind::CreateTestCase, list: None },
    Candidate { phrase: "Should I take you to the project?", kind: IntentKind::ConfirmRedirect, list: None },
];

const AFTER_TASK: &[Candidate] = &[
    Candidate { phrase: "Would you like to add another task?", kind: IntentKind::CreateTask, list: None },
    Candidate { phrase: "Want me to show your tasks?", kind: IntentKind::ShowList, list: Some("tasks") },
];

const AFTER_TEST_CASE: &[Candidate] = &[
    Candidate { phrase: "Would you like to add another test case?", kind: IntentKind::CreateTestCase, list: None },
    Candidate { phrase: "Should I list the test cases?", kind: IntentKind::ShowList, list: Some("testCases") },
    Candidate { phrase: "Want to add a task for this as well?", kind: IntentKind::CreateTask, list: None },
];

/// Picks a follow-up for a just-completed intent. Only creations have any.
pub fn suggest<R: Rng + ?Sized>(kind: IntentKind, rng: &mut R) -> Option<Suggestion> {
    let pool = match kind {
        IntentKind::CreateProject => AFTER_PROJECT,
        IntentKind::CreateTask => AFTER_TASK,
        IntentKind::CreateTestCase => AFTER_TEST_CASE,
        _ => return None,
    };

    let candidate = pool.choose(rng)?;
    let mut data = SlotMap::new();
    if let Some(list) = candidate.list {
        data.insert("listType".to_string(), list.to_string());
    }
    Some(Suggestion {
        phrase: candidate.phrase.to_string(),
        replay: Intent::new(candidate.kind, 1.0, data, candidate.phrase),
    })
}
