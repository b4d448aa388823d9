// Canonical names for state masks, for debug and UI output

use super::state::State;

/// Named composite states, matched on the exact bit combination
pub const COMPOSITES: &[(&str, State)] = &[
    ("idle", State::GROUNDED.union(State::NEUTRAL)),
    ("crouch", State::GROUNDED.union(State::CROUCHING)),
    ("walk_forward", State::GROUNDED.union(State::WALK).union(State::FORWARD)),
    ("walk_backward", State::GROUNDED.union(State::WALK).union(State::BACKWARD)),
    ("dash", State::GROUNDED.union(State::DASH).union(State::FORWARD)),
    ("backdash", State::GROUNDED.union(State::DASH).union(State::BACKWARD)),
    ("jump", State::AIRBORNE.union(State::JUMP)),
    ("jump_forward", State::AIRBORNE.union(State::JUMP).union(State::FORWARD)),
    ("jump_backward", State::AIRBORNE.union(State::JUMP).union(State::BACKWARD)),
    ("fall", State::AIRBORNE.union(State::FALLING)),
    ("jump_fall", State::AIRBORNE.union(State::JUMP).union(State::FALLING)),
    ("stand_a", State::GROUNDED.union(State::ATTACK).union(State::BUTTON_A)),
    ("stand_b", State::GROUNDED.union(State::ATTACK).union(State::BUTTON_B)),
    ("stand_c", State::GROUNDED.union(State::ATTACK).union(State::BUTTON_C)),
    ("crouch_a", State::GROUNDED.union(State::CROUCHING).union(State::ATTACK).union(State::BUTTON_A)),
    ("crouch_b", State::GROUNDED.union(State::CROUCHING).union(State::ATTACK).union(State::BUTTON_B)),
    ("crouch_c", State::GROUNDED.union(State::CROUCHING).union(State::ATTACK).union(State::BUTTON_C)),
    ("hitstun", State::GROUNDED.union(State::HITSTUN)),
    ("air_hitstun", State::AIRBORNE.union(State::HITSTUN)),
    ("knockdown", State::GROUNDED.union(State::DOWNED)),
    ("grab", State::GROUNDED.union(State::GRABBING)),
];

/// Canonical name for a mask.
///
/// Exact composites use their registered name. Anything else lists the set
/// flags in declaration order, joined with `|`.
pub fn state_name(state: State) -> String {
    if let Some((name, _)) = COMPOSITES.iter().find(|(_, mask)| *mask == state) {
        return (*name).to_string();
    }
    if state.is_empty() {
        return "none".to_string();
    }
    state
        .iter_names()
        .map(|(name, _)| name.to_ascii_lowercase())
        .collect::<Vec<_>>()
        .join("|")
}

/// Mask registered under a composite name
pub fn composite(name: &str) -> Option<State> {
    COMPOSITES
        .iter()
        .find(|(registered, _)| *registered == name)
        .map(|(_, mask)| *mask)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_names() {
        assert_eq!(state_name(State::GROUNDED | State::NEUTRAL), "idle");
        assert_eq!(state_name(State::AIRBORNE | State::FALLING), "fall");
    }

    #[test]
    fn test_fallback_lists_flags_in_declaration_order() {
        let mask = State::BUTTON_A | State::GROUNDED | State::HITSTUN;
        assert_eq!(state_name(mask), "grounded|hitstun|button_a");
        assert_eq!(state_name(mask), state_name(mask));
    }

    #[test]
    fn test_empty_mask() {
        assert_eq!(state_name(State::empty()), "none");
    }

    #[test]
    fn test_composite_lookup() {
        assert_eq!(composite("idle"), Some(State::GROUNDED | State::NEUTRAL));
        assert_eq!(composite("nope"), None);
    }

    #[test]
    fn test_composite_names_unique() {
        let mut names: Vec<_> = COMPOSITES.iter().map(|(name, _)| *name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), COMPOSITES.len());
    }
}
