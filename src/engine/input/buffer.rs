// Bounded input history used for motion-input recognition

use super::game_input::GameInput;
use std::collections::VecDeque;

/// Maximum number of ticks of input kept in a history
pub const MAX_HISTORY_SIZE: usize = 30;

/// Ordered record of the most recent inputs, oldest first.
///
/// Every tick is recorded, including neutral ones: the gaps between presses
/// are what the motion detector measures against a pattern's buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputHistory {
    entries: VecDeque<GameInput>,
    capacity: usize,
}

impl InputHistory {
    /// Create a history with the default capacity
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY_SIZE)
    }

    /// Create a history holding at most `capacity` ticks
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Build a history from inputs listed oldest first
    pub fn from_inputs(inputs: &[GameInput]) -> Self {
        let mut history = Self::new();
        for &input in inputs {
            history.push(input);
        }
        history
    }

    /// Record one tick of input, dropping the oldest entry on overflow
    pub fn push(&mut self, input: GameInput) {
        self.entries.push_back(input);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
    }

    /// Entry at `index`, counted from the oldest
    pub fn get(&self, index: usize) -> Option<GameInput> {
        self.entries.get(index).copied()
    }

    /// Most recent input
    pub fn latest(&self) -> Option<GameInput> {
        self.entries.back().copied()
    }

    /// Input recorded the tick before the most recent one
    pub fn previous(&self) -> Option<GameInput> {
        self.entries.len().checked_sub(2).and_then(|i| self.get(i))
    }

    /// Iterate oldest to newest
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = GameInput> + '_ {
        self.entries.iter().copied()
    }

    /// Clear all recorded inputs
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Get the number of recorded ticks
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the history is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for InputHistory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_history_creation() {
        let history = InputHistory::new();
        assert!(history.is_empty());
        assert_eq!(history.len(), 0);
        assert_eq!(history.capacity(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_history_keeps_insertion_order() {
        let history = InputHistory::from_inputs(&[GameInput::DOWN, GameInput::RIGHT, GameInput::A]);
        let recorded: Vec<_> = history.iter().collect();
        assert_eq!(recorded, vec![GameInput::DOWN, GameInput::RIGHT, GameInput::A]);
        assert_eq!(history.latest(), Some(GameInput::A));
        assert_eq!(history.previous(), Some(GameInput::RIGHT));
    }

    #[test]
    fn test_history_records_repeats() {
        let mut history = InputHistory::new();
        history.push(GameInput::NONE);
        history.push(GameInput::NONE);
        assert_eq!(history.len(), 2, "Neutral ticks are part of the timing record");
    }

    #[test]
    fn test_history_drops_oldest_on_overflow() {
        let mut history = InputHistory::with_capacity(3);
        history.push(GameInput::UP);
        history.push(GameInput::DOWN);
        history.push(GameInput::LEFT);
        history.push(GameInput::RIGHT);

        assert_eq!(history.len(), 3);
        assert_eq!(history.get(0), Some(GameInput::DOWN));
        assert_eq!(history.latest(), Some(GameInput::RIGHT));
    }

    #[test]
    fn test_history_max_size() {
        let mut history = InputHistory::new();
        for i in 0..MAX_HISTORY_SIZE + 10 {
            history.push(if i % 2 == 0 { GameInput::A } else { GameInput::NONE });
        }
        assert_eq!(history.len(), MAX_HISTORY_SIZE);
    }

    #[test]
    fn test_previous_needs_two_entries() {
        let history = InputHistory::from_inputs(&[GameInput::A]);
        assert_eq!(history.previous(), None);
    }

    #[test]
    fn test_history_clear() {
        let mut history = InputHistory::from_inputs(&[GameInput::A, GameInput::B]);
        history.clear();
        assert!(history.is_empty());
    }
}
