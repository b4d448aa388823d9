// Motion-input recognition over a bounded input history

use super::buffer::InputHistory;
use super::game_input::GameInput;

/// An ordered input sequence with buffering tolerance and cancel inputs.
///
/// Patterns are authored facing right and matched against a
/// facing-normalized history. They are immutable and shared by every
/// character.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotionPattern {
    /// Numpad name of the motion (e.g. "236A")
    pub name: &'static str,
    /// Expected inputs, oldest first. `GameInput::NONE` means "return to neutral".
    pub sequence: &'static [GameInput],
    /// Number of non-matching ticks tolerated between two elements
    pub buffer: usize,
    /// Inputs that abort the whole pattern when seen before the next element matches
    pub cancels: &'static [GameInput],
}

impl MotionPattern {
    pub const fn new(
        name: &'static str,
        sequence: &'static [GameInput],
        buffer: usize,
        cancels: &'static [GameInput],
    ) -> Self {
        Self {
            name,
            sequence,
            buffer,
            cancels,
        }
    }

    /// Check whether this pattern completes on the most recent tick of `history`
    pub fn detect(&self, history: &InputHistory) -> bool {
        detect(history, self)
    }

    /// Completes on the most recent tick but did not already complete on the
    /// tick before it (holding the final input does not fire again)
    pub fn detect_fresh(&self, history: &InputHistory) -> bool {
        let len = history.len();
        detect_ending_at(history, self, len) && !detect_ending_at(history, self, len.saturating_sub(1))
    }

    fn is_cancel(&self, entry: GameInput) -> bool {
        self.cancels.contains(&entry)
    }
}

/// Check whether `entry` satisfies one expected pattern element.
///
/// Exact equality always matches. A non-empty element also matches any entry
/// containing all of its bits (holding 3 satisfies an expected 6). The
/// neutral element matches any entry with no direction held.
pub fn element_matches(entry: GameInput, expected: GameInput) -> bool {
    if entry == expected {
        return true;
    }
    if expected.is_empty() {
        entry.is_directionless()
    } else {
        entry.contains(expected)
    }
}

/// Scan `history` newest to oldest for `pattern`.
///
/// The final element must match the newest entry. Each earlier element is
/// searched for behind the previous match; non-matching entries spend the
/// pattern's buffer, and a cancel input fails the whole pattern.
pub fn detect(history: &InputHistory, pattern: &MotionPattern) -> bool {
    detect_ending_at(history, pattern, history.len())
}

/// [`detect`] over the first `end` entries only
fn detect_ending_at(history: &InputHistory, pattern: &MotionPattern, end: usize) -> bool {
    let end = end.min(history.len());
    if pattern.sequence.is_empty() || pattern.sequence.len() > end {
        return false;
    }

    let mut cursor = end;
    for (step, &expected) in pattern.sequence.iter().rev().enumerate() {
        let mut budget = if step == 0 { 0 } else { pattern.buffer };
        let mut matched = false;

        while cursor > 0 {
            cursor -= 1;
            let Some(entry) = history.get(cursor) else {
                return false;
            };

            if element_matches(entry, expected) {
                matched = true;
                break;
            }
            if pattern.is_cancel(entry) {
                return false;
            }
            if budget == 0 {
                return false;
            }
            budget -= 1;
        }

        if !matched {
            return false;
        }
    }

    true
}
