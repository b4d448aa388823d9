// Per-tick input primitive: 4 directions + 4 buttons packed into one byte

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

bitflags! {
    /// One tick of player input.
    ///
    /// Directions are absolute when produced by an input source and
    /// facing-relative (right = forward) once recorded in a history.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
    #[serde(transparent)]
    pub struct GameInput: u8 {
        const UP    = 1 << 0;
        const DOWN  = 1 << 1;
        const LEFT  = 1 << 2;
        const RIGHT = 1 << 3;
        const A     = 1 << 4;
        const B     = 1 << 5;
        const C     = 1 << 6;
        const D     = 1 << 7;
    }
}

/// Errors produced when parsing numpad notation
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputParseError {
    #[error("empty input token")]
    Empty,

    #[error("invalid direction digit '{0}' (expected 1-9)")]
    InvalidDirection(char),

    #[error("invalid button '{0}' (expected A, B, C or D)")]
    InvalidButton(char),
}

impl GameInput {
    /// No direction and no button held
    pub const NONE: Self = Self::empty();
    pub const DIRECTIONS: Self = Self::UP.union(Self::DOWN).union(Self::LEFT).union(Self::RIGHT);
    pub const HORIZONTAL: Self = Self::LEFT.union(Self::RIGHT);
    pub const BUTTONS: Self = Self::A.union(Self::B).union(Self::C).union(Self::D);

    pub const DOWN_LEFT: Self = Self::DOWN.union(Self::LEFT);
    pub const DOWN_RIGHT: Self = Self::DOWN.union(Self::RIGHT);
    pub const UP_LEFT: Self = Self::UP.union(Self::LEFT);
    pub const UP_RIGHT: Self = Self::UP.union(Self::RIGHT);

    /// Build an input from a raw device mask, applying SOCD resolution.
    ///
    /// Left+Right collapses to neither, Up+Down collapses to neither.
    pub fn from_raw(raw: u8) -> Self {
        let mut input = Self::from_bits_retain(raw);
        if input.contains(Self::HORIZONTAL) {
            input.remove(Self::HORIZONTAL);
        }
        if input.contains(Self::UP | Self::DOWN) {
            input.remove(Self::UP | Self::DOWN);
        }
        input
    }

    /// Direction bits only
    pub fn directions(self) -> Self {
        self & Self::DIRECTIONS
    }

    /// Button bits only
    pub fn buttons(self) -> Self {
        self & Self::BUTTONS
    }

    /// True when no direction is held (buttons may be)
    pub fn is_directionless(self) -> bool {
        self.directions().is_empty()
    }

    /// True when a horizontal direction is held
    pub fn has_horizontal(self) -> bool {
        self.intersects(Self::HORIZONTAL)
    }

    /// Swap left and right, keeping every other bit
    pub fn mirrored(self) -> Self {
        let mut out = self - Self::HORIZONTAL;
        if self.contains(Self::LEFT) {
            out |= Self::RIGHT;
        }
        if self.contains(Self::RIGHT) {
            out |= Self::LEFT;
        }
        out
    }

    /// Numpad digit for the held direction (5 = neutral)
    pub fn numpad_digit(self) -> char {
        let dirs = self.directions();
        match dirs {
            d if d == Self::DOWN_LEFT => '1',
            d if d == Self::DOWN => '2',
            d if d == Self::DOWN_RIGHT => '3',
            d if d == Self::LEFT => '4',
            d if d == Self::RIGHT => '6',
            d if d == Self::UP_LEFT => '7',
            d if d == Self::UP => '8',
            d if d == Self::UP_RIGHT => '9',
            _ => '5',
        }
    }

    fn from_numpad(digit: char) -> Result<Self, InputParseError> {
        Ok(match digit {
            '1' => Self::DOWN_LEFT,
            '2' => Self::DOWN,
            '3' => Self::DOWN_RIGHT,
            '4' => Self::LEFT,
            '5' => Self::NONE,
            '6' => Self::RIGHT,
            '7' => Self::UP_LEFT,
            '8' => Self::UP,
            '9' => Self::UP_RIGHT,
            other => return Err(InputParseError::InvalidDirection(other)),
        })
    }
}

impl FromStr for GameInput {
    type Err = InputParseError;

    /// Parse numpad notation such as `5`, `6`, `3A` or `2BC`.
    /// A token made only of buttons implies neutral direction.
    fn from_str(token: &str) -> Result<Self, Self::Err> {
        let token = token.trim();
        let mut chars = token.chars().peekable();
        let first = chars.peek().copied().ok_or(InputParseError::Empty)?;

        let mut input = if first.is_ascii_digit() {
            chars.next();
            Self::from_numpad(first)?
        } else {
            Self::NONE
        };

        for c in chars {
            input |= match c.to_ascii_uppercase() {
                'A' => Self::A,
                'B' => Self::B,
                'C' => Self::C,
                'D' => Self::D,
                other => return Err(InputParseError::InvalidButton(other)),
            };
        }

        Ok(input)
    }
}

impl fmt::Display for GameInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.numpad_digit())?;
        for (name, _) in self.buttons().iter_names() {
            f.write_str(name)?;
        }
        Ok(())
    }
}
