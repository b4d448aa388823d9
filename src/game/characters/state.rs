// Character state flags and the state machine that owns them

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::engine::input::{GameInput, InputHistory};

use super::moves::{self, MoveCommand};

bitflags! {
    /// Independent character state flags.
    ///
    /// Flags compose freely: a crouching light attack is
    /// `GROUNDED | CROUCHING | ATTACK | BUTTON_A`. Declaration order is the
    /// canonical order used when listing flag names.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct State: u64 {
        // Position category
        const GROUNDED    = 1 << 0;
        const CROUCHING   = 1 << 1;
        const AIRBORNE    = 1 << 2;
        const DOWNED      = 1 << 3;

        // Movement
        const WALK        = 1 << 4;
        const DASH        = 1 << 5;
        const JUMP        = 1 << 6;
        const FALLING     = 1 << 7;
        const FORWARD     = 1 << 8;
        const BACKWARD    = 1 << 9;
        const NEUTRAL     = 1 << 10;

        // Reactions
        const RECOVERY    = 1 << 11;
        const HITSTUN     = 1 << 12;

        // Attack heights
        const HIGH        = 1 << 13;
        const BODY        = 1 << 14;
        const LOW         = 1 << 15;
        const SWEEP       = 1 << 16;

        const BLOCK       = 1 << 17;

        // Throws
        const GRABBING    = 1 << 18;
        const GRABBED     = 1 << 19;
        const GRAB_TECH   = 1 << 20;

        // Round flow
        const WIN         = 1 << 21;
        const LOSE        = 1 << 22;
        const ROUND_START = 1 << 23;

        // Action categories
        const ATTACK      = 1 << 24;
        const SPECIAL     = 1 << 25;
        const SUPER       = 1 << 26;

        // Buttons
        const BUTTON_A    = 1 << 27;
        const BUTTON_B    = 1 << 28;
        const BUTTON_C    = 1 << 29;

        // Modifiers
        const EX          = 1 << 30;
        const COUNTER     = 1 << 31;
    }
}

impl State {
    /// Any attack category
    pub const ATTACKING: Self = Self::ATTACK.union(Self::SPECIAL).union(Self::SUPER);

    /// Flags during which per-tick input interpretation is suppressed
    pub const UNACTABLE: Self = Self::HITSTUN
        .union(Self::GRABBED)
        .union(Self::WIN)
        .union(Self::LOSE)
        .union(Self::ROUND_START)
        .union(Self::DOWNED)
        .union(Self::RECOVERY)
        .union(Self::GRABBING)
        .union(Self::GRAB_TECH)
        .union(Self::ATTACKING);

    /// Flags cleared by a bare neutral input
    pub const MOVEMENT: Self = Self::WALK
        .union(Self::DASH)
        .union(Self::FORWARD)
        .union(Self::BACKWARD)
        .union(Self::CROUCHING)
        .union(Self::NEUTRAL);

    pub const BUTTONS: Self = Self::BUTTON_A.union(Self::BUTTON_B).union(Self::BUTTON_C);

    pub const HEIGHTS: Self = Self::HIGH.union(Self::BODY).union(Self::LOW).union(Self::SWEEP);

    /// Flags that last exactly as long as their animation
    pub const ONE_SHOT: Self = Self::ATTACKING
        .union(Self::BUTTONS)
        .union(Self::HEIGHTS)
        .union(Self::GRABBING)
        .union(Self::GRAB_TECH)
        .union(Self::RECOVERY)
        .union(Self::EX)
        .union(Self::COUNTER);
}

/// Animation chosen for a state, with its looping behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationSelection {
    pub name: &'static str,
    pub looping: bool,
}

const fn select(required: State, name: &'static str, looping: bool) -> (State, AnimationSelection) {
    (required, AnimationSelection { name, looping })
}

/// State → animation table, most specific entry first.
/// The first entry whose flags are all set wins.
const ANIMATION_TABLE: &[(State, AnimationSelection)] = &[
    select(State::ROUND_START, "round_start", false),
    select(State::WIN, "win", false),
    select(State::LOSE, "lose", false),
    select(State::GRABBED, "grabbed", true),
    select(State::GRAB_TECH, "grab_tech", false),
    select(State::GRABBING, "grab", false),
    select(State::HITSTUN.union(State::AIRBORNE), "hit_air", true),
    select(State::HITSTUN, "hit", true),
    select(State::DOWNED, "downed", true),
    select(State::RECOVERY, "recovery", false),
    select(State::BLOCK.union(State::CROUCHING), "block_low", true),
    select(State::BLOCK, "block", true),
    select(State::SUPER, "super", false),
    select(State::SPECIAL.union(State::BUTTON_A), "special_a", false),
    select(State::SPECIAL.union(State::BUTTON_B), "special_b", false),
    select(State::SPECIAL.union(State::BUTTON_C), "special_c", false),
    select(State::SPECIAL, "special", false),
    select(State::ATTACK.union(State::AIRBORNE).union(State::BUTTON_A), "jump_a", false),
    select(State::ATTACK.union(State::AIRBORNE).union(State::BUTTON_B), "jump_b", false),
    select(State::ATTACK.union(State::AIRBORNE).union(State::BUTTON_C), "jump_c", false),
    select(State::ATTACK.union(State::CROUCHING).union(State::BUTTON_A), "crouch_a", false),
    select(State::ATTACK.union(State::CROUCHING).union(State::BUTTON_B), "crouch_b", false),
    select(State::ATTACK.union(State::CROUCHING).union(State::BUTTON_C), "crouch_c", false),
    select(State::ATTACK.union(State::BUTTON_A), "stand_a", false),
    select(State::ATTACK.union(State::BUTTON_B), "stand_b", false),
    select(State::ATTACK.union(State::BUTTON_C), "stand_c", false),
    select(State::DASH.union(State::BACKWARD), "backdash", false),
    select(State::DASH, "dash", true),
    select(State::AIRBORNE.union(State::FALLING), "fall", true),
    select(State::AIRBORNE.union(State::JUMP).union(State::FORWARD), "jump_forward", false),
    select(State::AIRBORNE.union(State::JUMP).union(State::BACKWARD), "jump_backward", false),
    select(State::AIRBORNE.union(State::JUMP), "jump", false),
    select(State::AIRBORNE, "fall", true),
    select(State::CROUCHING, "crouch", true),
    select(State::WALK.union(State::FORWARD), "walk_forward", true),
    select(State::WALK.union(State::BACKWARD), "walk_backward", true),
];

/// Fallback animation when no table entry applies or the character lacks one
pub const IDLE_ANIMATION: AnimationSelection = AnimationSelection {
    name: "idle",
    looping: true,
};

impl State {
    /// Animation implied by this state (idle when nothing more specific applies)
    pub fn animation(self) -> AnimationSelection {
        ANIMATION_TABLE
            .iter()
            .find(|(required, _)| self.contains(*required))
            .map(|(_, selection)| *selection)
            .unwrap_or(IDLE_ANIMATION)
    }

    /// Looping behavior the table assigns to an animation name
    pub fn animation_loops(name: &str) -> bool {
        if name == IDLE_ANIMATION.name {
            return true;
        }
        ANIMATION_TABLE
            .iter()
            .find(|(_, selection)| selection.name == name)
            .map(|(_, selection)| selection.looping)
            .unwrap_or(false)
    }
}

/// What the state machine did with this tick's input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpretation {
    /// An unactable state suppressed interpretation
    Suppressed,
    /// A motion command matched and its transition was applied
    Command(&'static MoveCommand),
    /// Grounded normal attack or air attack started
    Attack,
    /// Grounded grab started
    Grab,
    /// Left the ground; `direction` is +1 forward, -1 backward, 0 neutral
    Jump { direction: i8 },
    Crouch,
    /// Walking (or running when already dashing); `direction` as for jumps
    Walk { direction: i8, running: bool },
    Neutral,
    /// Airborne with no new button: nothing to interpret
    Drift,
}

/// Holds a character's state mask and its input history
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateMachine {
    current: State,
    previous: State,
    history: InputHistory,
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}

impl StateMachine {
    /// Start standing idle
    pub fn new() -> Self {
        Self::with_state(State::GROUNDED | State::NEUTRAL)
    }

    pub fn with_state(state: State) -> Self {
        Self {
            current: state,
            previous: state,
            history: InputHistory::new(),
        }
    }

    /// Get the current state
    pub fn state(&self) -> State {
        self.current
    }

    /// Mask as it was before the most recent mutation
    pub fn previous_state(&self) -> State {
        self.previous
    }

    pub fn history(&self) -> &InputHistory {
        &self.history
    }

    /// OR flags into the state
    pub fn add_state(&mut self, flags: State) {
        self.previous = self.current;
        self.current |= flags;
    }

    /// Replace the state outright
    pub fn set_state(&mut self, flags: State) {
        self.previous = self.current;
        self.current = flags;
    }

    /// Clear flags, keeping the character in exactly one position category:
    /// clearing airborne forces grounded on and vice versa.
    pub fn remove_state(&mut self, flags: State) {
        self.previous = self.current;
        self.current.remove(flags);
        if flags.contains(State::AIRBORNE) {
            self.current.insert(State::GROUNDED);
        }
        if flags.contains(State::GROUNDED) {
            self.current.insert(State::AIRBORNE);
        }
    }

    /// Clear `clear` then add `add` as one mutation
    pub fn transition(&mut self, clear: State, add: State) {
        let before = self.current;
        self.remove_state(clear);
        self.current |= add;
        if add.contains(State::AIRBORNE) && !add.contains(State::GROUNDED) {
            self.current.remove(State::GROUNDED);
        }
        if add.contains(State::GROUNDED) && !add.contains(State::AIRBORNE) {
            self.current.remove(State::AIRBORNE);
        }
        self.previous = before;
    }

    /// True when every given flag is set
    pub fn has_state(&self, flags: State) -> bool {
        self.current.contains(flags)
    }

    /// True when at least one given flag is set
    pub fn has_any_state(&self, flags: State) -> bool {
        self.current.intersects(flags)
    }

    pub fn is_attacking(&self) -> bool {
        self.has_any_state(State::ATTACKING)
    }

    /// True when every given flag is set now but was not before the last mutation
    pub fn became(&self, flags: State) -> bool {
        self.current.contains(flags) && !self.previous.contains(flags)
    }

    /// Check if input interpretation is currently suppressed
    pub fn is_unactable(&self) -> bool {
        self.has_any_state(State::UNACTABLE)
    }

    /// Record one tick of facing-normalized input
    pub fn record_input(&mut self, input: GameInput) {
        self.history.push(input);
    }

    /// Interpret the most recent input against `commands` (priority order),
    /// falling back to plain directional rules.
    pub fn interpret(&mut self, commands: &'static [MoveCommand]) -> Interpretation {
        if self.is_unactable() {
            return Interpretation::Suppressed;
        }

        // A winning command whose flags are already in effect is not
        // re-issued; plain rules take over.
        let airborne = self.has_state(State::AIRBORNE);
        if let Some(command) = moves::first_match(&self.history, commands, airborne) {
            if !self.has_state(command.adds) {
                self.transition(command.clears, command.adds);
                return Interpretation::Command(command);
            }
        }

        let input = self.history.latest().unwrap_or(GameInput::NONE);
        let pressed = self.newly_pressed(input);

        if airborne {
            if let Some(button) = attack_button(pressed) {
                self.add_state(State::ATTACK | button);
                return Interpretation::Attack;
            }
            return Interpretation::Drift;
        }

        if pressed.contains(GameInput::D) {
            self.transition(State::MOVEMENT, State::GRABBING);
            return Interpretation::Grab;
        }
        if let Some(button) = attack_button(pressed) {
            // Crouching survives so down+button becomes a crouching attack
            let crouch = if input.contains(GameInput::DOWN) {
                State::CROUCHING
            } else {
                State::empty()
            };
            self.transition(State::MOVEMENT, State::ATTACK | button | crouch);
            return Interpretation::Attack;
        }

        let direction = horizontal_direction(input);

        if input.contains(GameInput::UP) {
            let heading = match direction {
                1 => State::FORWARD,
                -1 => State::BACKWARD,
                _ => State::empty(),
            };
            self.transition(State::MOVEMENT, State::AIRBORNE | State::JUMP | heading);
            return Interpretation::Jump { direction };
        }

        if input.contains(GameInput::DOWN) {
            self.transition(State::MOVEMENT, State::CROUCHING);
            return Interpretation::Crouch;
        }

        match direction {
            0 => {
                self.transition(State::MOVEMENT, State::NEUTRAL);
                Interpretation::Neutral
            }
            _ => {
                let heading = if direction > 0 {
                    State::FORWARD
                } else {
                    State::BACKWARD
                };
                // Only a forward dash turns into a run; backdashes end in a walk
                let running = direction > 0 && self.has_state(State::DASH | State::FORWARD);
                let gait = if running { State::DASH } else { State::WALK };
                self.transition(State::MOVEMENT, gait | heading);
                Interpretation::Walk { direction, running }
            }
        }
    }

    /// Buttons held this tick that were not held the tick before
    fn newly_pressed(&self, input: GameInput) -> GameInput {
        let before = self.history.previous().unwrap_or(GameInput::NONE);
        input.buttons() - before.buttons()
    }
}

/// Strongest attack button in `pressed`, as a state flag
fn attack_button(pressed: GameInput) -> Option<State> {
    if pressed.contains(GameInput::C) {
        Some(State::BUTTON_C)
    } else if pressed.contains(GameInput::B) {
        Some(State::BUTTON_B)
    } else if pressed.contains(GameInput::A) {
        Some(State::BUTTON_A)
    } else {
        None
    }
}

/// +1 forward, -1 backward, 0 neither (input is facing-normalized)
fn horizontal_direction(input: GameInput) -> i8 {
    if input.contains(GameInput::RIGHT) {
        1
    } else if input.contains(GameInput::LEFT) {
        -1
    } else {
        0
    }
}
