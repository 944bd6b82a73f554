//! Drives the typing engine the way a UI would: one buffer change per
//! keystroke, with caret geometry measured from a monospace line.

use typerace_engine::{
    CaretGeometry, InputOutcome, RejectReason, TypingEngine, WordStatus,
};
use typerace_protocol::ClientMessage;

/// A single monospace line `columns` characters wide. The caret sits after
/// everything typed on the line so far.
struct MonospaceLine {
    columns: usize,
    typed_on_line: usize,
}

impl CaretGeometry for MonospaceLine {
    fn caret_x(&self) -> f32 {
        self.typed_on_line as f32
    }

    fn container_width(&self) -> f32 {
        self.columns as f32
    }

    fn char_width(&self) -> f32 {
        1.0
    }
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|w| w.to_string()).collect()
}

#[test]
fn test_submits_are_emitted_in_word_order() {
    let mut engine = TypingEngine::new(words(&["one", "two", "three"]));
    let line = MonospaceLine { columns: 80, typed_on_line: 0 };
    let mut sent = Vec::new();

    let mut buf = String::new();
    for c in "one twx three".chars() {
        buf.push(c);
        let outcome = engine.handle_input(&buf, &line);
        if let Some(msg) = outcome.submit_message() {
            sent.push(msg);
            buf.clear();
        }
    }

    assert_eq!(
        sent,
        vec![
            ClientMessage::Submit { word_index: 0 },
            ClientMessage::Submit { word_index: 1 },
            ClientMessage::Submit { word_index: 2 },
        ]
    );
    let statuses: Vec<_> = engine.typed_words().iter().map(|t| t.status).collect();
    assert_eq!(
        statuses,
        vec![WordStatus::Correct, WordStatus::Incorrect, WordStatus::Correct]
    );
}

#[test]
fn test_overflow_stops_at_line_edge_but_word_can_still_complete() {
    let mut engine = TypingEngine::new(words(&["abc", "def"]));

    // The caret has room for exactly one more character.
    let near_edge = MonospaceLine { columns: 10, typed_on_line: 8 };
    assert_eq!(engine.handle_input("abc", &near_edge), InputOutcome::Updated);

    let at_edge = MonospaceLine { columns: 10, typed_on_line: 9 };
    assert_eq!(
        engine.handle_input("abcq", &at_edge),
        InputOutcome::Rejected(RejectReason::WrapGuard)
    );
    assert!(matches!(
        engine.handle_input("abc ", &at_edge),
        InputOutcome::Submitted { word_index: 0, status: WordStatus::Correct }
    ));
}
