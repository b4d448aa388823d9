// Per-character simulation step
//
// One call to `CharacterSim::step` advances a character exactly one tick:
// record input, interpret it, pick an animation, run the frame timeline,
// apply frame velocity, integrate and resolve against the stage.

use glam::Vec2;
use log::{debug, trace, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::engine::input::GameInput;
use crate::engine::physics::{Integration, KinematicBody, Overridden, Stage};
use crate::game::characters::animation::{AnimationPlayer, FrameBoxes, FrameData, Sprite, TimelineStep};
use crate::game::characters::moves::{MoveCategory, COMMAND_LIST};
use crate::game::characters::registry::state_name;
use crate::game::characters::state::{Interpretation, State, StateMachine, IDLE_ANIMATION};
use crate::game::characters::{Character, CharacterStats};

/// Direction a character faces on screen
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Facing {
    #[default]
    Right,
    Left,
}

impl Facing {
    /// +1 facing right, -1 facing left
    pub fn sign(self) -> f32 {
        match self {
            Facing::Right => 1.0,
            Facing::Left => -1.0,
        }
    }

    /// Rewrite raw input so forward reads as right
    pub fn normalize(self, input: GameInput) -> GameInput {
        match self {
            Facing::Right => input,
            Facing::Left => input.mirrored(),
        }
    }
}

/// Something observable that happened during a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "camelCase")]
pub enum SimEvent {
    /// A motion command fired
    MotionInput { name: &'static str },
    /// Playback switched to a new animation (or restarted one)
    AnimationChanged { name: String },
    /// A one-shot animation ran out
    AnimationFinished { name: String },
    /// A frame asked for a sound cue
    Sound { id: u32 },
    Landed,
    WallContact,
}

/// Result of one tick
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    pub tick: u64,
    pub interpretation: Interpretation,
    pub events: Vec<SimEvent>,
}

/// Serializable view of a character after a tick
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    pub tick: u64,
    pub state: State,
    pub state_name: String,
    pub position: Vec2,
    pub velocity: Vec2,
    pub facing: Facing,
    pub animation: Option<String>,
    pub frame: usize,
    pub ticks_remaining: u32,
}

/// What a renderer needs to draw a character this tick
#[derive(Debug, Clone, PartialEq)]
pub struct RenderView<'a> {
    pub sprite: &'a Sprite,
    /// Boxes in character space, already mirrored for facing
    pub boxes: FrameBoxes,
    pub position: Vec2,
    pub facing: Facing,
}

/// A character being simulated
#[derive(Debug, Clone)]
pub struct CharacterSim {
    character: Arc<Character>,
    stats: CharacterStats,
    stage: Stage,
    state: StateMachine,
    player: AnimationPlayer,
    body: KinematicBody,
    facing: Facing,
    tick: u64,
    /// Animation the state table last selected; `None` forces a reselect
    selected: Option<&'static str>,
    /// Ticks left in hitstun or downed
    stun_ticks: u32,
    /// The hit that caused the current hitstun knocks down
    pending_knockdown: bool,
}

impl CharacterSim {
    /// Standing idle on the ground at `x`
    pub fn new(character: Arc<Character>, stage: Stage, x: f32) -> Self {
        let stats = character.stats();
        Self::with_stats(character, stats, stage, x)
    }

    pub fn with_stats(character: Arc<Character>, stats: CharacterStats, stage: Stage, x: f32) -> Self {
        Self {
            character,
            stats,
            stage,
            state: StateMachine::new(),
            player: AnimationPlayer::new(),
            body: KinematicBody::at(x, stage.ground),
            facing: Facing::Right,
            tick: 0,
            selected: None,
            stun_ticks: 0,
            pending_knockdown: false,
        }
    }

    /// Advance one tick with this tick's raw (unmirrored) input
    pub fn step(&mut self, input: GameInput) -> TickReport {
        self.tick += 1;
        let mut events = Vec::new();

        let input = self.facing.normalize(input);
        self.state.record_input(input);
        self.tick_stun();

        let interpretation = self.state.interpret(COMMAND_LIST);
        self.apply_interpretation(interpretation, &mut events);

        // A retargeted timeline starts on its first frame this tick
        if !self.select_animation(&mut events) {
            self.advance_timeline(&mut events);
        }

        let overridden = self.apply_frame_velocity();
        let holding = input.has_horizontal() && interpretation != Interpretation::Suppressed;
        self.integrate(holding, overridden);
        self.resolve_stage(&mut events);

        trace!(
            "tick {} [{}] pos=({:.2}, {:.2}) vel=({:.2}, {:.2})",
            self.tick,
            state_name(self.state.state()),
            self.body.position.x,
            self.body.position.y,
            self.body.velocity.x,
            self.body.velocity.y
        );

        TickReport {
            tick: self.tick,
            interpretation,
            events,
        }
    }

    fn apply_interpretation(&mut self, interpretation: Interpretation, events: &mut Vec<SimEvent>) {
        let sign = self.facing.sign();
        match interpretation {
            Interpretation::Command(command) => {
                debug!("{}: {}", self.character.name, command.pattern.name);
                events.push(SimEvent::MotionInput {
                    name: command.pattern.name,
                });
                if command.adds.contains(State::DASH | State::FORWARD) {
                    self.body.velocity.x = self.stats.dash_speed * sign;
                } else if command.adds.contains(State::DASH | State::BACKWARD) {
                    self.body.velocity.x = -self.stats.backdash_speed * sign;
                }
            }
            Interpretation::Walk { direction, running } => {
                let speed = match (running, direction > 0) {
                    (true, _) => self.stats.dash_speed,
                    (false, true) => self.stats.walk_speed,
                    (false, false) => self.stats.walk_back_speed,
                };
                self.body.velocity.x = speed * f32::from(direction) * sign;
            }
            Interpretation::Jump { direction } => {
                self.body.velocity.y = self.stats.jump_velocity();
                self.body.velocity.x = self.stats.jump_forward_speed * f32::from(direction) * sign;
            }
            _ => {}
        }
    }

    /// Point playback at the animation the state implies.
    /// Returns true when playback was reset this tick.
    fn select_animation(&mut self, events: &mut Vec<SimEvent>) -> bool {
        let character = Arc::clone(&self.character);
        let animations = &character.animations;

        let mut selection = self.state.state().animation();
        if animations.id(selection.name).is_none() && self.state.has_any_state(State::ONE_SHOT) {
            warn!(
                "{}: no '{}' animation, ending action",
                character.name, selection.name
            );
            self.end_action();
            selection = self.state.state().animation();
        }

        let (name, looping) = if animations.id(selection.name).is_some() {
            (selection.name, selection.looping)
        } else {
            (IDLE_ANIMATION.name, IDLE_ANIMATION.looping)
        };
        let Some(id) = animations.id(name) else {
            self.player.stop();
            self.selected = None;
            return false;
        };

        let changed = self.selected != Some(name);
        // A switch target that ran out hands control back to the state
        let stale = self.player.is_finished() && self.player.current() != Some(id);
        if !changed && !stale {
            return false;
        }
        self.selected = Some(name);

        if self.player.current() == Some(id) && !self.player.is_finished() {
            return false;
        }
        self.player.play_from_start(animations, id, looping);
        events.push(SimEvent::AnimationChanged {
            name: name.to_string(),
        });
        self.enter_frame(events);
        true
    }

    fn advance_timeline(&mut self, events: &mut Vec<SimEvent>) {
        let character = Arc::clone(&self.character);
        let animations = &character.animations;

        let step = self.player.advance(animations);
        let Some(elapsed) = step.elapsed() else {
            return;
        };
        let Some(animation) = self.player.animation(animations) else {
            return;
        };

        // The frame that just ran out may hand off to another animation
        if let Some(target) = animation
            .frame(elapsed)
            .and_then(|frame| frame.animation_switch.as_deref())
        {
            match animations.id(target) {
                Some(id) => {
                    debug!("{}: {} -> {}", character.name, animation.name, target);
                    self.player
                        .play_from_start(animations, id, State::animation_loops(target));
                    events.push(SimEvent::AnimationChanged {
                        name: target.to_string(),
                    });
                    self.enter_frame(events);
                }
                None => warn!("{}: unknown switch target '{}'", character.name, target),
            }
            return;
        }

        match step {
            TimelineStep::Advanced { .. } => self.enter_frame(events),
            TimelineStep::Finished { .. } => {
                events.push(SimEvent::AnimationFinished {
                    name: animation.name.clone(),
                });
                if self.state.has_any_state(State::ONE_SHOT) {
                    self.end_action();
                }
            }
            _ => {}
        }
    }

    /// Effects that fire once when a frame becomes active
    fn enter_frame(&mut self, events: &mut Vec<SimEvent>) {
        let character = Arc::clone(&self.character);
        let Some(frame) = self.player.active_frame(&character.animations) else {
            return;
        };
        if !frame.state.is_empty() {
            self.state.transition(State::empty(), frame.state);
        }
        if frame.ignore_gravity > 0 {
            self.body.ignore_gravity_for(frame.ignore_gravity);
        }
        for id in [frame.sound_id, frame.unique_sound_id].into_iter().flatten() {
            events.push(SimEvent::Sound { id });
        }
    }

    /// Clear one-shot flags once their animation is over
    fn end_action(&mut self) {
        let mut add = State::empty();
        if self.state.has_state(State::GROUNDED) {
            add |= State::NEUTRAL;
        }
        self.state.transition(State::ONE_SHOT, add);
        self.selected = None;
    }

    fn apply_frame_velocity(&mut self) -> Overridden {
        let (x, y) = match self.player.active_frame(&self.character.animations) {
            Some(frame) => (
                frame.change_x_speed.map(|speed| speed * self.facing.sign()),
                frame.change_y_speed,
            ),
            None => (None, None),
        };
        self.body.override_velocity(x, y)
    }

    fn integrate(&mut self, holding: bool, overridden: Overridden) {
        let airborne = self.state.has_state(State::AIRBORNE);
        self.body.integrate(Integration {
            gravity: self.stats.gravity,
            friction: self.stats.friction,
            airborne,
            apply_friction: !holding && !overridden.x,
        });
        if airborne && self.body.velocity.y <= 0.0 && !self.state.has_state(State::FALLING) {
            self.state.add_state(State::FALLING);
        }
    }

    fn resolve_stage(&mut self, events: &mut Vec<SimEvent>) {
        let contact = self.stage.resolve(&mut self.body);
        if contact.hit_wall {
            events.push(SimEvent::WallContact);
        }

        if contact.on_ground && self.state.has_state(State::AIRBORNE) {
            // Dash and walk flags carried through the jump end with it
            let mut clear = State::AIRBORNE | State::JUMP | State::FALLING | State::MOVEMENT;
            // Air normals end on landing; specials and supers play out
            if self.state.has_state(State::ATTACK) && !self.state.has_any_state(State::SPECIAL | State::SUPER) {
                clear |= State::ATTACK | State::BUTTONS | State::HEIGHTS;
                self.selected = None;
            }
            self.state.transition(clear, State::GROUNDED | State::NEUTRAL);
            events.push(SimEvent::Landed);
            debug!("{}: landed at x={:.2}", self.character.name, self.body.position.x);

            if self.pending_knockdown && !self.state.has_state(State::HITSTUN) {
                self.knock_down();
            }
        } else if !contact.on_ground && self.state.has_state(State::GROUNDED) {
            self.state.remove_state(State::GROUNDED);
        }
    }

    /// Count down hitstun and downed time. Each step with ticks remaining
    /// consumes one and stays suppressed; the step after the last one
    /// releases the stun.
    fn tick_stun(&mut self) {
        if self.stun_ticks > 0 {
            self.stun_ticks -= 1;
            return;
        }

        if self.state.has_state(State::HITSTUN) {
            if self.pending_knockdown && self.state.has_state(State::GROUNDED) {
                self.knock_down();
                // this step is the first downed one
                self.stun_ticks = self.stun_ticks.saturating_sub(1);
                return;
            }
            let add = if self.state.has_state(State::GROUNDED) {
                State::NEUTRAL
            } else {
                State::empty()
            };
            self.state.transition(State::HITSTUN, add);
        } else if self.state.has_state(State::DOWNED) {
            self.state.transition(State::DOWNED, State::NEUTRAL);
        }
    }

    fn knock_down(&mut self) {
        self.state
            .transition(State::HITSTUN | State::MOVEMENT, State::DOWNED);
        self.stun_ticks = self.stats.knockdown_ticks.max(1);
        self.pending_knockdown = false;
        debug!("{}: knocked down", self.character.name);
    }

    /// Apply an incoming hit described by the attacker's active frame.
    /// Knockback pushes away from the direction this character faces.
    pub fn receive_hit(&mut self, frame: &FrameData) {
        self.state
            .transition(State::MOVEMENT | State::ONE_SHOT, State::HITSTUN);
        self.stun_ticks = frame.hitstun.max(1);
        self.pending_knockdown = frame.can_hard_knockdown;
        self.selected = None;

        self.body.velocity.x = -frame.knockback * self.facing.sign();
        if frame.knockup > 0.0 {
            self.body.velocity.y = frame.knockup;
            if self.state.has_state(State::GROUNDED) {
                self.state.remove_state(State::GROUNDED);
            }
        }
        debug!(
            "{}: hit for {} ticks of hitstun",
            self.character.name, self.stun_ticks
        );
    }

    /// True when the active frame's cancel window admits `category`
    pub fn can_cancel_into(&self, category: MoveCategory) -> bool {
        self.player
            .active_frame(&self.character.animations)
            .is_some_and(|frame| frame.cancel_type.permits(category))
    }

    /// Turn to face `facing`. Input recorded earlier stays normalized to the
    /// facing it was recorded under.
    pub fn set_facing(&mut self, facing: Facing) {
        self.facing = facing;
    }

    pub fn facing(&self) -> Facing {
        self.facing
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn stats(&self) -> &CharacterStats {
        &self.stats
    }

    pub fn state_machine(&self) -> &StateMachine {
        &self.state
    }

    /// Replace the whole state, e.g. for round flow (win, lose, round
    /// start). The animation is reselected on the next step.
    pub fn set_state(&mut self, state: State) {
        self.state.set_state(state);
        self.selected = None;
    }

    pub fn body(&self) -> &KinematicBody {
        &self.body
    }

    pub fn player(&self) -> &AnimationPlayer {
        &self.player
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn snapshot(&self) -> Snapshot {
        let animation = self
            .player
            .animation(&self.character.animations)
            .map(|animation| animation.name.clone());
        Snapshot {
            tick: self.tick,
            state: self.state.state(),
            state_name: state_name(self.state.state()),
            position: self.body.position,
            velocity: self.body.velocity,
            facing: self.facing,
            animation,
            frame: self.player.current_frame(),
            ticks_remaining: self.player.ticks_remaining(),
        }
    }

    /// Sprite and boxes for the active frame, if anything is playing
    pub fn render_view(&self) -> Option<RenderView<'_>> {
        let animations = &self.character.animations;
        let sprite = self.player.active_sprite(animations)?;
        let frame = self.player.active_frame(animations)?;
        let boxes = match self.facing {
            Facing::Right => frame.boxes.clone(),
            Facing::Left => frame.boxes.mirrored(),
        };
        Some(RenderView {
            sprite,
            boxes,
            position: self.body.position,
            facing: self.facing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::math::Rect;
    use crate::game::characters::animation::{Animation, CancelType};
    use approx::assert_relative_eq;

    fn idle_loop() -> Animation {
        Animation::from_durations("idle", &[10])
    }

    fn character(friction: f32, animations: Vec<Animation>) -> Arc<Character> {
        Arc::new(Character::new("test", "Test", friction, 90.0, animations).unwrap())
    }

    fn sim(character: Arc<Character>) -> CharacterSim {
        CharacterSim::new(character, Stage::default(), 0.0)
    }

    fn run(sim: &mut CharacterSim, inputs: &[&str]) -> Vec<TickReport> {
        inputs
            .iter()
            .map(|token| sim.step(token.parse().unwrap()))
            .collect()
    }

    #[test]
    fn test_frame_velocity_override_then_friction() {
        let idle = Animation::new(
            "idle",
            vec![
                FrameData::new(1, 0).with_velocity(Some(5.0), None),
                FrameData::new(20, 0),
            ],
        );
        let mut sim = sim(character(2.0, vec![idle]));

        sim.step(GameInput::NONE);
        assert_eq!(sim.body().velocity.x, 5.0);
        assert_eq!(sim.body().position.x, 5.0);

        let mut speeds = Vec::new();
        for _ in 0..4 {
            sim.step(GameInput::NONE);
            speeds.push(sim.body().velocity.x);
        }
        assert_eq!(speeds, vec![3.0, 1.0, 0.0, 0.0]);
        assert_eq!(sim.body().position.x, 14.0);
    }

    #[test]
    fn test_zero_override_stops_axis() {
        let idle = Animation::new(
            "idle",
            vec![FrameData::new(5, 0).with_velocity(Some(0.0), None)],
        );
        let mut sim = sim(character(0.0, vec![idle]));
        sim.body.velocity.x = 9.0;
        sim.step(GameInput::NONE);
        assert_eq!(sim.body().velocity.x, 0.0);
        assert_eq!(sim.body().position.x, 0.0);
    }

    #[test]
    fn test_override_mirrors_with_facing() {
        let idle = Animation::new(
            "idle",
            vec![FrameData::new(5, 0).with_velocity(Some(4.0), None)],
        );
        let mut sim = sim(character(0.5, vec![idle]));
        sim.set_facing(Facing::Left);
        sim.step(GameInput::NONE);
        assert_eq!(sim.body().velocity.x, -4.0);
    }

    #[test]
    fn test_replay_is_deterministic() {
        let character = character(
            0.5,
            vec![
                idle_loop(),
                Animation::from_durations("walk_forward", &[4, 4]),
                Animation::from_durations("dash", &[3, 3]),
                Animation::from_durations("jump", &[5, 5]),
                Animation::from_durations("fall", &[4]),
                Animation::from_durations("stand_a", &[3, 2, 6]),
            ],
        );
        let script = [
            "6", "6", "5", "6", "6", "6", "5", "5", "A", "5", "5", "5", "5", "5", "9", "9",
            "5", "5", "5", "5", "2", "3", "6A", "5", "4", "4", "5", "4", "5", "8",
        ];

        let mut first = sim(Arc::clone(&character));
        let mut second = first.clone();
        let a: Vec<Snapshot> = script
            .iter()
            .map(|t| {
                first.step(t.parse().unwrap());
                first.snapshot()
            })
            .collect();
        let b: Vec<Snapshot> = script
            .iter()
            .map(|t| {
                second.step(t.parse().unwrap());
                second.snapshot()
            })
            .collect();
        assert_eq!(a.len(), 30);
        assert_eq!(a, b);
    }

    #[test]
    fn test_walk_holds_speed_without_friction() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        run(&mut sim, &["6", "6", "6"]);
        assert_eq!(sim.body().velocity.x, BASE_WALK);
        assert_relative_eq!(sim.body().position.x, 3.0 * BASE_WALK);
        assert!(sim.state_machine().has_state(State::WALK | State::FORWARD));
    }

    const BASE_WALK: f32 = 3.0;

    #[test]
    fn test_dash_reports_motion_input() {
        let mut sim = sim(character(0.5, vec![idle_loop(), Animation::from_durations("dash", &[2])]));
        let reports = run(&mut sim, &["6", "5", "6"]);
        assert!(reports[2]
            .events
            .contains(&SimEvent::MotionInput { name: "66" }));
        assert!(reports[2].events.contains(&SimEvent::AnimationChanged {
            name: "dash".to_string()
        }));
        assert_eq!(sim.body().velocity.x, sim.stats().dash_speed);
    }

    #[test]
    fn test_jump_lands_back_on_ground() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        let first = sim.step("8".parse().unwrap());
        assert_eq!(first.interpretation, Interpretation::Jump { direction: 0 });
        assert!(sim.state_machine().has_state(State::AIRBORNE | State::JUMP));
        assert!(sim.body().position.y > 0.0);

        let mut landed = false;
        for _ in 0..200 {
            let report = sim.step(GameInput::NONE);
            if report.events.contains(&SimEvent::Landed) {
                landed = true;
                break;
            }
            assert!(sim.body().position.y >= 0.0);
        }
        assert!(landed);
        assert_eq!(sim.body().position.y, 0.0);
        assert_eq!(sim.state_machine().state(), State::GROUNDED | State::NEUTRAL);
    }

    #[test]
    fn test_falling_flag_after_apex() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        sim.step("8".parse().unwrap());
        assert!(!sim.state_machine().has_state(State::FALLING));
        while sim.body().velocity.y > 0.0 {
            sim.step(GameInput::NONE);
        }
        assert!(sim.state_machine().has_state(State::FALLING));
    }

    #[test]
    fn test_attack_plays_and_clears() {
        let mut sim = sim(character(
            0.5,
            vec![idle_loop(), Animation::from_durations("stand_a", &[3, 2])],
        ));
        let reports = run(&mut sim, &["A"]);
        assert_eq!(reports[0].interpretation, Interpretation::Attack);
        assert_eq!(sim.snapshot().animation.as_deref(), Some("stand_a"));
        assert!(sim.state_machine().has_state(State::ATTACK | State::BUTTON_A));

        // Held button is not a new press; the last frame runs out on tick six
        let reports = run(&mut sim, &["A", "A", "A", "A", "A"]);
        assert!(reports[4].events.contains(&SimEvent::AnimationFinished {
            name: "stand_a".to_string()
        }));
        assert!(!sim.state_machine().is_attacking());
        assert!(sim.state_machine().has_state(State::GROUNDED | State::NEUTRAL));

        sim.step(GameInput::NONE);
        assert_eq!(sim.snapshot().animation.as_deref(), Some("idle"));
    }

    #[test]
    fn test_missing_one_shot_animation_ends_action() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        sim.step(GameInput::B);
        assert!(!sim.state_machine().is_attacking());
        assert_eq!(sim.snapshot().animation.as_deref(), Some("idle"));
    }

    #[test]
    fn test_switch_frame_hands_off() {
        let stand_a = Animation::new(
            "stand_a",
            vec![FrameData::new(2, 0), FrameData::new(2, 0).with_switch("follow")],
        );
        let follow = Animation::from_durations("follow", &[3]);
        let mut sim = sim(character(0.5, vec![idle_loop(), stand_a, follow]));

        let reports = run(&mut sim, &["A", "5", "5", "5", "5"]);
        assert!(reports[4].events.contains(&SimEvent::AnimationChanged {
            name: "follow".to_string()
        }));
        assert_eq!(sim.snapshot().animation.as_deref(), Some("follow"));
        assert_eq!(sim.player().ticks_remaining(), 3);
    }

    #[test]
    fn test_frame_entry_effects() {
        let idle = Animation::new(
            "idle",
            vec![FrameData {
                sound_id: Some(7),
                ..FrameData::new(4, 0)
            }],
        );
        let mut sim = sim(character(0.5, vec![idle]));
        let report = sim.step(GameInput::NONE);
        assert!(report.events.contains(&SimEvent::Sound { id: 7 }));
    }

    #[test]
    fn test_hitstun_expires() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        sim.step(GameInput::NONE);
        let hit = FrameData {
            hitstun: 3,
            knockback: 2.0,
            ..FrameData::new(1, 0)
        };
        sim.receive_hit(&hit);
        assert!(sim.state_machine().is_unactable());
        assert_eq!(sim.body().velocity.x, -2.0);

        // Input is ignored for exactly three steps
        let reports = run(&mut sim, &["6", "6", "6", "6"]);
        for report in &reports[..3] {
            assert_eq!(report.interpretation, Interpretation::Suppressed);
        }
        assert_eq!(
            reports[3].interpretation,
            Interpretation::Walk { direction: 1, running: false }
        );
        assert!(!sim.state_machine().has_state(State::HITSTUN));
    }

    #[test]
    fn test_single_tick_hitstun() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        let hit = FrameData {
            hitstun: 1,
            ..FrameData::new(1, 0)
        };
        sim.receive_hit(&hit);

        let reports = run(&mut sim, &["6", "6"]);
        assert_eq!(reports[0].interpretation, Interpretation::Suppressed);
        assert_ne!(reports[1].interpretation, Interpretation::Suppressed);
        assert!(sim.state_machine().has_state(State::WALK | State::FORWARD));
    }

    #[test]
    fn test_hard_knockdown() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        let hit = FrameData {
            hitstun: 1,
            can_hard_knockdown: true,
            ..FrameData::new(1, 0)
        };
        sim.receive_hit(&hit);
        let report = sim.step(GameInput::NONE);
        assert_eq!(report.interpretation, Interpretation::Suppressed);
        assert!(sim.state_machine().has_state(State::HITSTUN));

        // Downed for exactly knockdown_ticks steps once hitstun runs out
        let mut downed = 0;
        loop {
            let report = sim.step(GameInput::NONE);
            if report.interpretation != Interpretation::Suppressed {
                break;
            }
            assert!(sim.state_machine().has_state(State::DOWNED));
            downed += 1;
        }
        assert_eq!(downed, sim.stats().knockdown_ticks);
        assert!(!sim.state_machine().has_state(State::DOWNED));
        assert!(sim.state_machine().has_state(State::GROUNDED | State::NEUTRAL));
    }

    #[test]
    fn test_knockdown_on_landing_lasts_knockdown_ticks() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        let launcher = FrameData {
            hitstun: 2,
            knockup: 6.0,
            can_hard_knockdown: true,
            ..FrameData::new(1, 0)
        };
        sim.receive_hit(&launcher);
        assert!(sim.state_machine().has_state(State::AIRBORNE));

        let mut landed = false;
        for _ in 0..200 {
            if sim.step(GameInput::NONE).events.contains(&SimEvent::Landed) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert!(sim.state_machine().has_state(State::DOWNED));

        let mut downed = 0;
        while sim.step(GameInput::NONE).interpretation == Interpretation::Suppressed {
            downed += 1;
        }
        assert_eq!(downed, sim.stats().knockdown_ticks);
        assert!(sim.state_machine().has_state(State::GROUNDED | State::NEUTRAL));
    }

    #[test]
    fn test_holding_back_after_backdash_walks_back() {
        let mut sim = sim(character(
            0.5,
            vec![idle_loop(), Animation::from_durations("backdash", &[3])],
        ));
        let reports = run(&mut sim, &["4", "5", "4"]);
        assert!(reports[2]
            .events
            .contains(&SimEvent::MotionInput { name: "44" }));
        assert_eq!(sim.body().velocity.x, -sim.stats().backdash_speed);

        // Holding back never re-fires the backdash or slides at backdash speed
        let reports = run(&mut sim, &["4"; 20]);
        for report in &reports {
            assert_eq!(
                report.interpretation,
                Interpretation::Walk { direction: -1, running: false }
            );
        }
        assert!(sim.state_machine().has_state(State::WALK | State::BACKWARD));
        assert!(!sim.state_machine().has_state(State::DASH));
        assert_eq!(sim.body().velocity.x, -sim.stats().walk_back_speed);
    }

    #[test]
    fn test_no_dash_while_airborne_and_landing_clears_movement() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        let reports = run(&mut sim, &["9", "6", "5", "6"]);
        assert!(reports
            .iter()
            .all(|r| !r.events.contains(&SimEvent::MotionInput { name: "66" })));
        assert_eq!(reports[3].interpretation, Interpretation::Drift);
        assert!(!sim.state_machine().has_state(State::DASH));

        let mut landed = false;
        for _ in 0..200 {
            if sim.step(GameInput::NONE).events.contains(&SimEvent::Landed) {
                landed = true;
                break;
            }
        }
        assert!(landed);
        assert_eq!(sim.state_machine().state(), State::GROUNDED | State::NEUTRAL);
    }

    #[test]
    fn test_set_state_reselects_animation() {
        let mut sim = sim(character(
            0.5,
            vec![idle_loop(), Animation::from_durations("win", &[5])],
        ));
        sim.step(GameInput::NONE);
        sim.set_state(State::GROUNDED | State::WIN);
        assert_eq!(sim.state_machine().state(), State::GROUNDED | State::WIN);

        let report = sim.step("6".parse().unwrap());
        assert_eq!(report.interpretation, Interpretation::Suppressed);
        assert_eq!(sim.snapshot().animation.as_deref(), Some("win"));
    }

    #[test]
    fn test_cancel_window() {
        let stand_a = Animation::new(
            "stand_a",
            vec![FrameData {
                cancel_type: CancelType::Special,
                ..FrameData::new(5, 0)
            }],
        );
        let mut sim = sim(character(0.5, vec![idle_loop(), stand_a]));
        assert!(!sim.can_cancel_into(MoveCategory::Special));
        sim.step(GameInput::A);
        assert!(sim.can_cancel_into(MoveCategory::Special));
        assert!(sim.can_cancel_into(MoveCategory::Super));
        assert!(!sim.can_cancel_into(MoveCategory::Movement));
    }

    #[test]
    fn test_left_facing_walk_mirrors() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        sim.set_facing(Facing::Left);
        sim.step(GameInput::LEFT);
        assert!(sim.state_machine().has_state(State::WALK | State::FORWARD));
        assert_eq!(sim.body().velocity.x, -BASE_WALK);
    }

    #[test]
    fn test_wall_contact() {
        let mut sim = CharacterSim::new(character(0.5, vec![idle_loop()]), Stage::new(-5.0, 5.0, 0.0), 4.0);
        let report = sim.step(GameInput::RIGHT);
        assert!(report.events.contains(&SimEvent::WallContact));
        assert_eq!(sim.body().position.x, 5.0);
    }

    #[test]
    fn test_render_view_mirrors_boxes() {
        let idle = Animation::new(
            "idle",
            vec![FrameData {
                boxes: FrameBoxes {
                    hurt: vec![Rect::new(10.0, 0.0, 20.0, 50.0)],
                    ..FrameBoxes::default()
                },
                ..FrameData::new(5, 0)
            }],
        );
        let mut sim = sim(character(0.5, vec![idle]));
        assert!(sim.render_view().is_none());

        sim.set_facing(Facing::Left);
        sim.step(GameInput::NONE);
        let view = sim.render_view().unwrap();
        assert_eq!(view.boxes.hurt[0], Rect::new(-30.0, 0.0, 20.0, 50.0));
        assert_eq!(view.facing, Facing::Left);
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut sim = sim(character(0.5, vec![idle_loop()]));
        sim.step(GameInput::NONE);
        let json = serde_json::to_value(sim.snapshot()).unwrap();
        assert_eq!(json["stateName"], "idle");
        assert_eq!(json["animation"], "idle");
        assert_eq!(json["facing"], "right");
    }
}
