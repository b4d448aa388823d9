// Motion command library shared by every character

use crate::engine::input::{GameInput, InputHistory, MotionPattern};

use super::state::State;

/// Broad category of a move, used by cancel windows
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MoveCategory {
    Movement,
    Special,
    Super,
}

/// A motion pattern bound to the state transition it triggers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveCommand {
    pub pattern: MotionPattern,
    pub category: MoveCategory,
    /// Flags cleared before `adds` is applied
    pub clears: State,
    pub adds: State,
}

const DIRECTIONAL_CANCELS_FORWARD: &[GameInput] = &[GameInput::LEFT, GameInput::DOWN, GameInput::UP];
const DIRECTIONAL_CANCELS_BACK: &[GameInput] = &[GameInput::RIGHT, GameInput::DOWN, GameInput::UP];

/// Every motion command, in evaluation priority order. The first match wins,
/// so longer motions that end like shorter ones must come first.
pub const COMMAND_LIST: &[MoveCommand] = &[
    MoveCommand {
        pattern: MotionPattern::new(
            "236236A",
            &[
                GameInput::DOWN,
                GameInput::DOWN_RIGHT,
                GameInput::RIGHT,
                GameInput::DOWN,
                GameInput::DOWN_RIGHT,
                GameInput::RIGHT,
                GameInput::A,
            ],
            20,
            &[],
        ),
        category: MoveCategory::Super,
        clears: State::MOVEMENT,
        adds: State::SUPER.union(State::BUTTON_A),
    },
    MoveCommand {
        pattern: MotionPattern::new(
            "623A",
            &[
                GameInput::RIGHT,
                GameInput::DOWN,
                GameInput::DOWN_RIGHT,
                GameInput::A,
            ],
            10,
            &[],
        ),
        category: MoveCategory::Special,
        clears: State::MOVEMENT,
        adds: State::SPECIAL.union(State::BUTTON_A).union(State::HIGH),
    },
    MoveCommand {
        pattern: MotionPattern::new(
            "236A",
            &[
                GameInput::DOWN,
                GameInput::DOWN_RIGHT,
                GameInput::RIGHT,
                GameInput::A,
            ],
            10,
            &[],
        ),
        category: MoveCategory::Special,
        clears: State::MOVEMENT,
        adds: State::SPECIAL.union(State::BUTTON_A),
    },
    MoveCommand {
        pattern: MotionPattern::new(
            "214B",
            &[
                GameInput::DOWN,
                GameInput::DOWN_LEFT,
                GameInput::LEFT,
                GameInput::B,
            ],
            10,
            &[],
        ),
        category: MoveCategory::Special,
        clears: State::MOVEMENT,
        adds: State::SPECIAL.union(State::BUTTON_B),
    },
    MoveCommand {
        pattern: MotionPattern::new(
            "66",
            &[GameInput::RIGHT, GameInput::NONE, GameInput::RIGHT],
            10,
            DIRECTIONAL_CANCELS_FORWARD,
        ),
        category: MoveCategory::Movement,
        clears: State::MOVEMENT,
        adds: State::DASH.union(State::FORWARD),
    },
    MoveCommand {
        pattern: MotionPattern::new(
            "44",
            &[GameInput::LEFT, GameInput::NONE, GameInput::LEFT],
            10,
            DIRECTIONAL_CANCELS_BACK,
        ),
        category: MoveCategory::Movement,
        clears: State::MOVEMENT,
        adds: State::DASH.union(State::BACKWARD),
    },
];

/// First command in `commands` whose pattern completes on the latest tick.
/// Movement commands are ground-only and are skipped while `airborne`.
pub fn first_match(
    history: &InputHistory,
    commands: &'static [MoveCommand],
    airborne: bool,
) -> Option<&'static MoveCommand> {
    commands.iter().find(|command| {
        !(airborne && command.category == MoveCategory::Movement) && command.pattern.detect_fresh(history)
    })
}

/// Look up a command by its numpad name
pub fn command(name: &str) -> Option<&'static MoveCommand> {
    COMMAND_LIST.iter().find(|command| command.pattern.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn history(tokens: &[&str]) -> InputHistory {
        let inputs: Vec<GameInput> = tokens.iter().map(|t| t.parse().unwrap()).collect();
        InputHistory::from_inputs(&inputs)
    }

    #[test]
    fn test_super_outranks_fireball() {
        let h = history(&["2", "3", "6", "2", "3", "6", "A"]);
        let found = first_match(&h, COMMAND_LIST, false).unwrap();
        assert_eq!(found.pattern.name, "236236A");
        assert!(command("236A").unwrap().pattern.detect(&h));
    }

    #[test]
    fn test_dragon_punch_outranks_fireball() {
        let h = history(&["6", "2", "3", "6", "A"]);
        assert_eq!(first_match(&h, COMMAND_LIST, false).unwrap().pattern.name, "623A");
    }

    #[test]
    fn test_fireball() {
        let h = history(&["2", "3", "6", "A"]);
        let found = first_match(&h, COMMAND_LIST, false).unwrap();
        assert_eq!(found.pattern.name, "236A");
        assert_eq!(found.category, MoveCategory::Special);
        assert!(found.adds.contains(State::SPECIAL));
    }

    #[test]
    fn test_backdash() {
        let h = history(&["4", "5", "4"]);
        assert_eq!(first_match(&h, COMMAND_LIST, false).unwrap().pattern.name, "44");
    }

    #[test]
    fn test_no_match_is_normal() {
        let h = history(&["5", "5", "6"]);
        assert!(first_match(&h, COMMAND_LIST, false).is_none());
    }

    #[test]
    fn test_movement_commands_are_ground_only() {
        let h = history(&["6", "5", "6"]);
        assert!(first_match(&h, COMMAND_LIST, true).is_none());

        let h = history(&["2", "3", "6", "A"]);
        assert_eq!(first_match(&h, COMMAND_LIST, true).unwrap().pattern.name, "236A");
    }

    #[test]
    fn test_held_final_input_does_not_refire() {
        let h = history(&["4", "5", "4", "4"]);
        assert!(first_match(&h, COMMAND_LIST, false).is_none());
    }

    #[test]
    fn test_priority_is_declaration_order() {
        let names: Vec<_> = COMMAND_LIST.iter().map(|c| c.pattern.name).collect();
        assert_eq!(names, vec!["236236A", "623A", "236A", "214B", "66", "44"]);
    }
}
