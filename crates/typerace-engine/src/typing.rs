//! The per-keystroke typing state machine.
//!
//! The UI hands over the whole input buffer after every change (not
//! individual key events). The engine compares it against the active word
//! and decides one of three things:
//!
//! ```text
//!            ┌──────────── Rejected (wrap guard / mistake limit) ──┐
//!  value ──→ ┤                                                      ├─→ state unchanged
//!            ├──────────── Updated ──→ input = value                │
//!            └──────────── Submitted ──→ status set, index += 1, input cleared
//! ```
//!
//! Per-word status is resolved exactly once, on submission. Entries before
//! the active word never change again.

use serde::{Deserialize, Serialize};
use typerace_protocol::ClientMessage;

use crate::CaretGeometry;

/// Once this many characters of the buffer are wrong, further typing is
/// refused until the player backspaces.
pub const MISTAKE_LIMIT: usize = 10;

// ---------------------------------------------------------------------------
// Status types
// ---------------------------------------------------------------------------

/// Resolution state of one word in the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WordStatus {
    Pending,
    Correct,
    Incorrect,
}

/// Render state of one letter. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LetterStatus {
    Pending,
    Correct,
    Incorrect,
}

/// A word of the stream with its resolution state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypedWord {
    pub text: String,
    pub status: WordStatus,
}

impl TypedWord {
    fn pending(text: &str) -> Self {
        Self {
            text: text.to_owned(),
            status: WordStatus::Pending,
        }
    }
}

/// Why an input change was refused. Not an error: the UI just doesn't
/// advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// One more character would wrap the caret onto the next line.
    WrapGuard,
    /// The buffer already holds [`MISTAKE_LIMIT`] wrong characters.
    MistakeLimit,
    /// Every word has been submitted (or the stream is empty).
    NoActiveWord,
}

/// Result of feeding one input change to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputOutcome {
    /// The buffer was accepted as the new input.
    Updated,
    /// The active word was submitted and the engine advanced.
    Submitted { word_index: usize, status: WordStatus },
    /// The change was refused; state is untouched.
    Rejected(RejectReason),
}

impl InputOutcome {
    /// The outbound `Submit` this outcome calls for, if any.
    pub fn submit_message(&self) -> Option<ClientMessage> {
        match *self {
            Self::Submitted { word_index, .. } => u32::try_from(word_index)
                .ok()
                .map(|word_index| ClientMessage::Submit { word_index }),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// TypingEngine
// ---------------------------------------------------------------------------

/// Typing progress through one race's word stream.
#[derive(Debug, Clone, Default)]
pub struct TypingEngine {
    words: Vec<String>,
    current: usize,
    input: String,
    typed: Vec<TypedWord>,
}

impl TypingEngine {
    /// Starts a race over `words`, every word pending.
    pub fn new(words: Vec<String>) -> Self {
        let typed = words.iter().map(|w| TypedWord::pending(w)).collect();
        Self {
            words,
            current: 0,
            input: String::new(),
            typed,
        }
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    pub fn typed_words(&self) -> &[TypedWord] {
        &self.typed
    }

    pub fn current_word_index(&self) -> usize {
        self.current
    }

    pub fn input(&self) -> &str {
        &self.input
    }

    /// The word currently being typed.
    pub fn expected(&self) -> Option<&str> {
        self.words.get(self.current).map(String::as_str)
    }

    /// `true` once every word of a non-empty stream has been submitted.
    pub fn is_complete(&self) -> bool {
        !self.words.is_empty() && self.current >= self.words.len()
    }

    /// Applies one change of the input buffer.
    pub fn handle_input(
        &mut self,
        value: &str,
        geometry: &impl CaretGeometry,
    ) -> InputOutcome {
        let Some(expected) = self.words.get(self.current) else {
            return InputOutcome::Rejected(RejectReason::NoActiveWord);
        };

        let value_len = value.chars().count();
        let is_backspace = value_len <= self.input.chars().count();
        let is_within_word = value_len <= expected.chars().count();
        let is_completing_space = value.strip_suffix(' ') == Some(expected.as_str());

        if !(is_backspace || is_within_word || is_completing_space)
            && geometry.would_wrap()
        {
            tracing::trace!(word = self.current, "input rejected by wrap guard");
            return InputOutcome::Rejected(RejectReason::WrapGuard);
        }

        if count_mistakes(value, expected) >= MISTAKE_LIMIT {
            tracing::trace!(word = self.current, "input rejected at mistake limit");
            return InputOutcome::Rejected(RejectReason::MistakeLimit);
        }

        let trimmed = value.trim();
        let is_last = self.current + 1 == self.words.len();
        let submitted = (value.ends_with(' ') && !trimmed.is_empty())
            || (is_last && value == expected.as_str());

        if !submitted {
            self.input = value.to_owned();
            return InputOutcome::Updated;
        }

        let status = if trimmed == expected.as_str() {
            WordStatus::Correct
        } else {
            WordStatus::Incorrect
        };
        let word_index = self.current;
        self.typed[word_index].status = status;
        self.current += 1;
        self.input.clear();
        InputOutcome::Submitted { word_index, status }
    }

    /// Replaces the stream from `start` onward with `tail`.
    ///
    /// A `start` past the end appends. Entries before `start` are kept
    /// untouched; everything from `start` on is pending again, taken from
    /// `tail`. The active word index is left alone.
    pub fn splice_words(&mut self, start: usize, tail: Vec<String>) {
        let start = start.min(self.words.len());
        self.words.truncate(start);
        self.typed.truncate(start);
        self.typed.extend(tail.iter().map(|w| TypedWord::pending(w)));
        self.words.extend(tail);
        self.current = self.current.min(self.words.len());
    }

    /// Swaps in a new authoritative word list and reconciles per-word
    /// state against it.
    ///
    /// Resolved entries keep their position; pending ones are regenerated
    /// from `words`.
    pub fn set_words(&mut self, words: Vec<String>) {
        self.typed = words
            .iter()
            .enumerate()
            .map(|(i, w)| match self.typed.get(i) {
                Some(t) if t.status != WordStatus::Pending => t.clone(),
                _ => TypedWord::pending(w),
            })
            .collect();
        self.words = words;
        self.current = self.current.min(self.words.len());
    }

    /// Per-letter render state for the word at `index`.
    ///
    /// The active word is compared against the live input; other words
    /// take their word-level status for every letter.
    pub fn letters(&self, index: usize) -> Vec<LetterStatus> {
        let Some(word) = self.typed.get(index) else {
            return Vec::new();
        };

        if index == self.current {
            return letter_statuses(&self.input, &word.text);
        }

        let status = match word.status {
            WordStatus::Pending => LetterStatus::Pending,
            WordStatus::Correct => LetterStatus::Correct,
            WordStatus::Incorrect => LetterStatus::Incorrect,
        };
        vec![status; word.text.chars().count()]
    }

    /// Characters typed past the end of the active word.
    pub fn overflow(&self) -> &str {
        let Some(expected) = self.expected() else {
            return "";
        };
        let len = expected.chars().count();
        match self.input.char_indices().nth(len) {
            Some((byte, _)) => &self.input[byte..],
            None => "",
        }
    }
}

/// Counts wrong characters in `value` against `expected`.
///
/// After the first mismatch every following character counts as wrong,
/// matching or not. Characters past the end of `expected` are wrong.
pub fn count_mistakes(value: &str, expected: &str) -> usize {
    let mut expected = expected.chars();
    let mut incorrect = 0;
    for c in value.chars() {
        let want = expected.next();
        if incorrect > 0 || want != Some(c) {
            incorrect += 1;
        }
    }
    incorrect
}

/// Letter states for `expected` given the typed `input`.
pub fn letter_statuses(input: &str, expected: &str) -> Vec<LetterStatus> {
    let mut typed = input.chars();
    expected
        .chars()
        .map(|want| match typed.next() {
            Some(got) if got == want => LetterStatus::Correct,
            Some(_) => LetterStatus::Incorrect,
            None => LetterStatus::Pending,
        })
        .collect()
}

// =========================================================================
// Tests
// =========================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MeasuredLine, Unbounded};

    fn engine(words: &[&str]) -> TypingEngine {
        TypingEngine::new(words.iter().map(|w| w.to_string()).collect())
    }

    fn statuses(e: &TypingEngine) -> Vec<WordStatus> {
        e.typed_words().iter().map(|t| t.status).collect()
    }

    /// Feeds `text` one character at a time, like a UI would.
    fn type_str(e: &mut TypingEngine, text: &str) -> InputOutcome {
        let mut buf = e.input().to_owned();
        let mut last = InputOutcome::Updated;
        for c in text.chars() {
            buf.push(c);
            last = e.handle_input(&buf, &Unbounded);
            if matches!(last, InputOutcome::Submitted { .. }) {
                buf.clear();
            }
        }
        last
    }

    // =====================================================================
    // Mistake limit
    // =====================================================================

    #[test]
    fn test_count_mistakes_no_recovery_after_first_error() {
        assert_eq!(count_mistakes("hello", "hello"), 0);
        assert_eq!(count_mistakes("hxllo", "hello"), 4);
        assert_eq!(count_mistakes("hello!!", "hello"), 2);
        assert_eq!(count_mistakes("", "hello"), 0);
    }

    #[test]
    fn test_nine_wrong_chars_accepted() {
        let mut e = engine(&["hello", "world"]);
        let out = e.handle_input("xxxxxxxxx", &Unbounded);
        assert_eq!(out, InputOutcome::Updated);
        assert_eq!(e.input(), "xxxxxxxxx");
    }

    #[test]
    fn test_tenth_wrong_char_rejected() {
        let mut e = engine(&["hello", "world"]);
        e.handle_input("xxxxxxxxx", &Unbounded);
        let out = e.handle_input("xxxxxxxxxx", &Unbounded);
        assert_eq!(out, InputOutcome::Rejected(RejectReason::MistakeLimit));
        assert_eq!(e.input(), "xxxxxxxxx");
    }

    #[test]
    fn test_backspace_allowed_at_mistake_limit() {
        let mut e = engine(&["hello", "world"]);
        e.handle_input("xxxxxxxxx", &Unbounded);
        assert_eq!(e.handle_input("xxxxxxxx", &Unbounded), InputOutcome::Updated);
    }

    // =====================================================================
    // Submission
    // =====================================================================

    #[test]
    fn test_correct_word_with_space_submits_correct() {
        let mut e = engine(&["cat", "dog"]);
        let out = e.handle_input("cat ", &Unbounded);
        assert_eq!(
            out,
            InputOutcome::Submitted { word_index: 0, status: WordStatus::Correct }
        );
        assert_eq!(e.current_word_index(), 1);
        assert_eq!(e.input(), "");
        assert_eq!(out.submit_message(), Some(ClientMessage::Submit { word_index: 0 }));
    }

    #[test]
    fn test_wrong_word_with_space_submits_incorrect() {
        let mut e = engine(&["cat", "dog"]);
        let out = e.handle_input("cot ", &Unbounded);
        assert_eq!(
            out,
            InputOutcome::Submitted { word_index: 0, status: WordStatus::Incorrect }
        );
        assert_eq!(statuses(&e), vec![WordStatus::Incorrect, WordStatus::Pending]);
    }

    #[test]
    fn test_last_word_submits_without_space() {
        let mut e = engine(&["cat"]);
        let out = e.handle_input("cat", &Unbounded);
        assert_eq!(
            out,
            InputOutcome::Submitted { word_index: 0, status: WordStatus::Correct }
        );
        assert!(e.is_complete());
    }

    #[test]
    fn test_non_last_word_needs_space() {
        let mut e = engine(&["cat", "dog"]);
        assert_eq!(e.handle_input("cat", &Unbounded), InputOutcome::Updated);
        assert_eq!(e.current_word_index(), 0);
    }

    #[test]
    fn test_blank_space_does_not_submit() {
        let mut e = engine(&["cat", "dog"]);
        assert_eq!(e.handle_input(" ", &Unbounded), InputOutcome::Updated);
        assert_eq!(e.current_word_index(), 0);
    }

    #[test]
    fn test_full_race_typed_char_by_char() {
        let mut e = engine(&["the", "quick", "fox"]);
        type_str(&mut e, "the quick ");
        let last = type_str(&mut e, "fox");
        assert_eq!(
            last,
            InputOutcome::Submitted { word_index: 2, status: WordStatus::Correct }
        );
        assert_eq!(statuses(&e), vec![WordStatus::Correct; 3]);
        assert_eq!(
            e.handle_input("x", &Unbounded),
            InputOutcome::Rejected(RejectReason::NoActiveWord)
        );
    }

    #[test]
    fn test_empty_stream_rejects_input() {
        let mut e = TypingEngine::default();
        assert_eq!(
            e.handle_input("a", &Unbounded),
            InputOutcome::Rejected(RejectReason::NoActiveWord)
        );
        assert!(!e.is_complete());
    }

    // =====================================================================
    // Wrap guard
    // =====================================================================

    fn at_edge() -> MeasuredLine {
        MeasuredLine { caret_x: 95.0, container_width: 100.0, char_width: 10.0 }
    }

    #[test]
    fn test_wrap_guard_rejects_overflow_at_edge() {
        let mut e = engine(&["cat", "dog"]);
        e.handle_input("cat", &Unbounded);
        let out = e.handle_input("catt", &at_edge());
        assert_eq!(out, InputOutcome::Rejected(RejectReason::WrapGuard));
        assert_eq!(e.input(), "cat");
    }

    #[test]
    fn test_wrap_guard_allows_completing_space_at_edge() {
        let mut e = engine(&["cat", "dog"]);
        e.handle_input("cat", &Unbounded);
        assert!(matches!(
            e.handle_input("cat ", &at_edge()),
            InputOutcome::Submitted { .. }
        ));
    }

    #[test]
    fn test_wrap_guard_allows_typing_within_word_at_edge() {
        let mut e = engine(&["cat", "dog"]);
        assert_eq!(e.handle_input("ca", &at_edge()), InputOutcome::Updated);
    }

    #[test]
    fn test_wrap_guard_allows_backspace_at_edge() {
        let mut e = engine(&["cat", "dog"]);
        e.handle_input("catxx", &Unbounded);
        assert_eq!(e.handle_input("catx", &at_edge()), InputOutcome::Updated);
    }

    // =====================================================================
    // Word list changes
    // =====================================================================

    #[test]
    fn test_splice_keeps_resolved_and_regenerates_tail() {
        let mut e = engine(&["a", "b", "c", "d"]);
        type_str(&mut e, "a b ");
        assert_eq!(
            statuses(&e),
            vec![
                WordStatus::Correct,
                WordStatus::Correct,
                WordStatus::Pending,
                WordStatus::Pending
            ]
        );

        e.splice_words(2, vec!["x".into(), "y".into(), "z".into()]);

        assert_eq!(e.words(), ["a", "b", "x", "y", "z"]);
        assert_eq!(
            statuses(&e),
            vec![
                WordStatus::Correct,
                WordStatus::Correct,
                WordStatus::Pending,
                WordStatus::Pending,
                WordStatus::Pending
            ]
        );
        assert_eq!(e.expected(), Some("x"));
    }

    #[test]
    fn test_splice_over_resolved_words_regenerates_them() {
        let mut e = engine(&["cat", "dog", "emu"]);
        type_str(&mut e, "cat dog ");

        e.splice_words(1, vec!["yak".into(), "gnu".into()]);

        assert_eq!(e.words(), ["cat", "yak", "gnu"]);
        let texts: Vec<&str> = e.typed_words().iter().map(|t| t.text.as_str()).collect();
        assert_eq!(texts, ["cat", "yak", "gnu"]);
        assert_eq!(
            statuses(&e),
            vec![WordStatus::Correct, WordStatus::Pending, WordStatus::Pending]
        );
        assert_eq!(e.current_word_index(), 2);
    }

    #[test]
    fn test_splice_at_current_word_keeps_prefix() {
        let mut e = engine(&["a", "b", "c"]);
        type_str(&mut e, "a ");

        e.splice_words(1, vec!["x".into()]);

        assert_eq!(e.words(), ["a", "x"]);
        assert_eq!(statuses(&e), vec![WordStatus::Correct, WordStatus::Pending]);
        assert_eq!(e.expected(), Some("x"));
    }

    #[test]
    fn test_splice_past_end_appends() {
        let mut e = engine(&["a"]);
        e.splice_words(10, vec!["b".into()]);
        assert_eq!(e.words(), ["a", "b"]);
    }

    #[test]
    fn test_growth_extends_pending_entries() {
        let mut e = engine(&["a", "b"]);
        type_str(&mut e, "a ");
        e.set_words(vec!["a".into(), "b".into(), "c".into()]);
        assert_eq!(
            statuses(&e),
            vec![WordStatus::Correct, WordStatus::Pending, WordStatus::Pending]
        );
        assert_eq!(e.typed_words()[2].text, "c");
    }

    #[test]
    fn test_shrink_clamps_current_index() {
        let mut e = engine(&["a", "b", "c"]);
        type_str(&mut e, "a b ");
        e.set_words(vec!["a".into()]);
        assert_eq!(e.current_word_index(), 1);
        assert!(e.is_complete());
    }

    // =====================================================================
    // Letters
    // =====================================================================

    #[test]
    fn test_active_word_letters_follow_input() {
        let mut e = engine(&["cat", "dog"]);
        e.handle_input("cx", &Unbounded);
        assert_eq!(
            e.letters(0),
            vec![LetterStatus::Correct, LetterStatus::Incorrect, LetterStatus::Pending]
        );
        assert_eq!(e.letters(1), vec![LetterStatus::Pending; 3]);
    }

    #[test]
    fn test_resolved_word_letters_take_word_status() {
        let mut e = engine(&["cat", "dog"]);
        e.handle_input("cot ", &Unbounded);
        assert_eq!(e.letters(0), vec![LetterStatus::Incorrect; 3]);
    }

    #[test]
    fn test_overflow_does_not_change_letter_status() {
        let mut e = engine(&["cat", "dog"]);
        e.handle_input("catss", &Unbounded);
        assert_eq!(e.letters(0), vec![LetterStatus::Correct; 3]);
        assert_eq!(e.overflow(), "ss");
    }

    #[test]
    fn test_letters_out_of_range_is_empty() {
        assert!(engine(&["a"]).letters(5).is_empty());
    }

    #[test]
    fn test_word_status_serializes_lowercase() {
        let json = serde_json::to_string(&WordStatus::Incorrect).unwrap();
        assert_eq!(json, "\"incorrect\"");
    }
}
