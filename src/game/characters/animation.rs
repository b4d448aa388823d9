// Frame-data driven animation: authored frames and the per-character player

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::core::math::Rect;

use super::moves::MoveCategory;
use super::state::State;

/// One image region an animation frame can show
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sprite {
    /// Relative to the document on disk, absolute once loaded
    pub image_path: PathBuf,
    /// Region of the image to draw
    pub rect: Rect,
}

/// Which broader actions may interrupt the current frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CancelType {
    #[default]
    None,
    /// Special and super moves may interrupt
    Special,
    /// Only super moves may interrupt
    Super,
    /// Anything, including movement, may interrupt
    Any,
}

impl CancelType {
    /// Check if a move of `category` may interrupt a frame with this cancel type
    pub fn permits(self, category: MoveCategory) -> bool {
        match self {
            Self::None => false,
            Self::Special => category >= MoveCategory::Special,
            Self::Super => category == MoveCategory::Super,
            Self::Any => true,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum MoveType {
    #[default]
    None,
    Normal,
    Special,
    Super,
    Throw,
}

/// How an attack must be blocked
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum HitType {
    #[default]
    None,
    High,
    Mid,
    Low,
    Unblockable,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnimPhase {
    #[default]
    None,
    Startup,
    Active,
    Recovery,
}

/// Box geometry of one frame, per category
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FrameBoxes {
    #[serde(default)]
    pub collision: Vec<Rect>,
    #[serde(default)]
    pub hit: Vec<Rect>,
    #[serde(default)]
    pub hurt: Vec<Rect>,
}

impl FrameBoxes {
    /// Boxes mirrored for a character facing left
    pub fn mirrored(&self) -> Self {
        let flip = |rects: &[Rect]| -> Vec<Rect> { rects.iter().map(Rect::mirrored).collect() };
        Self {
            collision: flip(&self.collision),
            hit: flip(&self.hit),
            hurt: flip(&self.hurt),
        }
    }
}

/// Authored record of one animation frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameData {
    /// Ticks this frame stays on screen (at least 1)
    pub duration: u32,
    /// Index into the owning animation's sprite list
    pub sprite_index: usize,
    /// Animation to switch to once this frame elapses
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub animation_switch: Option<String>,
    /// Flags added to the character when the frame is entered
    #[serde(default)]
    pub state: State,
    #[serde(default)]
    pub cancel_type: CancelType,
    #[serde(default)]
    pub damage: u32,
    #[serde(default)]
    pub hitstun: u32,
    #[serde(default)]
    pub blockstun: u32,
    #[serde(default)]
    pub pushback: f32,
    #[serde(default)]
    pub knockback: f32,
    #[serde(default)]
    pub knockup: f32,
    #[serde(default)]
    pub priority: i32,
    /// Facing-relative X velocity while the frame is active
    #[serde(
        default,
        deserialize_with = "zero_is_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub change_x_speed: Option<f32>,
    #[serde(
        default,
        deserialize_with = "zero_is_absent",
        skip_serializing_if = "Option::is_none"
    )]
    pub change_y_speed: Option<f32>,
    /// Ticks of suspended gravity starting when the frame is entered
    #[serde(default)]
    pub ignore_gravity: u32,
    #[serde(default)]
    pub can_hard_knockdown: bool,
    #[serde(default)]
    pub can_wall_bounce: bool,
    #[serde(default)]
    pub can_ground_bounce: bool,
    #[serde(default, rename = "canOTG")]
    pub can_otg: bool,
    #[serde(default, rename = "soundID", skip_serializing_if = "Option::is_none")]
    pub sound_id: Option<u32>,
    #[serde(default, rename = "uniqueSoundID", skip_serializing_if = "Option::is_none")]
    pub unique_sound_id: Option<u32>,
    #[serde(default)]
    pub move_type: MoveType,
    #[serde(default)]
    pub hit_type: HitType,
    #[serde(default)]
    pub anim_phase: AnimPhase,
    #[serde(default)]
    pub is_invincible: bool,
    #[serde(default)]
    pub has_armor: bool,
    #[serde(default)]
    pub boxes: FrameBoxes,
}

/// Documents write `0` for "no override"; keep that out of the runtime value
fn zero_is_absent<'de, D>(deserializer: D) -> Result<Option<f32>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<f32>::deserialize(deserializer)?;
    Ok(value.filter(|v| *v != 0.0))
}

impl FrameData {
    /// A frame with no combat attributes
    pub fn new(duration: u32, sprite_index: usize) -> Self {
        Self {
            duration,
            sprite_index,
            animation_switch: None,
            state: State::empty(),
            cancel_type: CancelType::None,
            damage: 0,
            hitstun: 0,
            blockstun: 0,
            pushback: 0.0,
            knockback: 0.0,
            knockup: 0.0,
            priority: 0,
            change_x_speed: None,
            change_y_speed: None,
            ignore_gravity: 0,
            can_hard_knockdown: false,
            can_wall_bounce: false,
            can_ground_bounce: false,
            can_otg: false,
            sound_id: None,
            unique_sound_id: None,
            move_type: MoveType::None,
            hit_type: HitType::None,
            anim_phase: AnimPhase::None,
            is_invincible: false,
            has_armor: false,
            boxes: FrameBoxes::default(),
        }
    }

    /// Set the velocity overrides
    pub fn with_velocity(mut self, x: Option<f32>, y: Option<f32>) -> Self {
        self.change_x_speed = x;
        self.change_y_speed = y;
        self
    }

    /// Request a switch to `target` once this frame elapses
    pub fn with_switch(mut self, target: &str) -> Self {
        self.animation_switch = Some(target.to_string());
        self
    }

    pub fn with_state(mut self, state: State) -> Self {
        self.state = state;
        self
    }
}

/// A named sequence of frames. Frames refer to sprites by index into
/// `sprites`, which the animation owns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    /// Filled from the document key
    #[serde(skip)]
    pub name: String,
    #[serde(default)]
    pub sprites: Vec<Sprite>,
    #[serde(default)]
    pub frame_data: Vec<FrameData>,
}

impl Animation {
    /// Create an animation from frames, with one placeholder sprite per referenced index
    pub fn new(name: &str, frame_data: Vec<FrameData>) -> Self {
        let sprite_count = frame_data
            .iter()
            .map(|frame| frame.sprite_index + 1)
            .max()
            .unwrap_or(0);
        Self {
            name: name.to_string(),
            sprites: (0..sprite_count)
                .map(|i| Sprite {
                    image_path: PathBuf::from(format!("{name}_{i}.png")),
                    rect: Rect::default(),
                })
                .collect(),
            frame_data,
        }
    }

    /// Create an animation with plain frames of the given durations
    pub fn from_durations(name: &str, durations: &[u32]) -> Self {
        let frames = durations
            .iter()
            .enumerate()
            .map(|(i, &duration)| FrameData::new(duration, i))
            .collect();
        Self::new(name, frames)
    }

    pub fn frame_count(&self) -> usize {
        self.frame_data.len()
    }

    /// Total ticks of one playthrough
    pub fn total_duration(&self) -> u32 {
        self.frame_data.iter().map(|frame| frame.duration).sum()
    }

    pub fn frame(&self, index: usize) -> Option<&FrameData> {
        self.frame_data.get(index)
    }

    /// Sprite shown by the given frame
    pub fn sprite_for(&self, frame: &FrameData) -> Option<&Sprite> {
        self.sprites.get(frame.sprite_index)
    }
}

/// Index of an animation inside an [`AnimationSet`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnimationId(usize);

/// Arena of a character's animations with lookup by name
#[derive(Debug, Clone, Default)]
pub struct AnimationSet {
    animations: Vec<Animation>,
    by_name: HashMap<String, AnimationId>,
}

impl AnimationSet {
    /// Build a set; animations are ordered by name so ids are stable across loads
    pub fn new(mut animations: Vec<Animation>) -> Self {
        animations.sort_by(|a, b| a.name.cmp(&b.name));
        let by_name = animations
            .iter()
            .enumerate()
            .map(|(i, animation)| (animation.name.clone(), AnimationId(i)))
            .collect();
        Self {
            animations,
            by_name,
        }
    }

    pub fn id(&self, name: &str) -> Option<AnimationId> {
        self.by_name.get(name).copied()
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.get(id.0)
    }

    pub fn by_name(&self, name: &str) -> Option<&Animation> {
        self.id(name).and_then(|id| self.get(id))
    }

    /// Iterate in name order
    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.animations.iter()
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }
}

/// What one tick of playback did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimelineStep {
    /// No animation, or an animation without frames
    Idle,
    /// The current frame still has ticks remaining
    Holding,
    /// Finished earlier; nothing changed
    Stalled,
    /// Frame `elapsed` ran out and frame `entered` became active
    Advanced { elapsed: usize, entered: usize },
    /// The last frame of a non-looping animation ran out
    Finished { elapsed: usize },
}

impl TimelineStep {
    /// Index of the frame whose duration ran out this tick
    pub fn elapsed(self) -> Option<usize> {
        match self {
            Self::Advanced { elapsed, .. } | Self::Finished { elapsed } => Some(elapsed),
            _ => None,
        }
    }
}

/// Manages animation playback for a character
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AnimationPlayer {
    /// Currently playing animation
    current: Option<AnimationId>,
    /// Current frame index
    frame: usize,
    /// Ticks left on the current frame
    ticks_remaining: u32,
    /// Whether the animation wraps around
    looping: bool,
    /// Sticky once a non-looping animation ran out
    finished: bool,
}

impl AnimationPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Play an animation. Retargeting to the animation already playing is a
    /// no-op; returns true when playback was reset.
    pub fn play(&mut self, set: &AnimationSet, id: AnimationId, looping: bool) -> bool {
        if self.current == Some(id) {
            return false;
        }
        self.play_from_start(set, id, looping);
        true
    }

    /// Play an animation from the beginning, even if it's the same
    pub fn play_from_start(&mut self, set: &AnimationSet, id: AnimationId, looping: bool) {
        self.current = Some(id);
        self.frame = 0;
        self.ticks_remaining = set
            .get(id)
            .and_then(|animation| animation.frame(0))
            .map(|frame| frame.duration)
            .unwrap_or(0);
        self.looping = looping;
        self.finished = false;
    }

    /// Stop and clear the current animation
    pub fn stop(&mut self) {
        *self = Self::default();
    }

    /// Advance playback by one tick
    pub fn advance(&mut self, set: &AnimationSet) -> TimelineStep {
        let Some(animation) = self.current.and_then(|id| set.get(id)) else {
            return TimelineStep::Idle;
        };
        let frame_count = animation.frame_count();
        if frame_count == 0 {
            return TimelineStep::Idle;
        }
        if self.finished {
            return TimelineStep::Stalled;
        }

        self.ticks_remaining = self.ticks_remaining.saturating_sub(1);
        if self.ticks_remaining > 0 {
            return TimelineStep::Holding;
        }

        let elapsed = self.frame;
        let next = elapsed + 1;
        let entered = if next < frame_count {
            next
        } else if self.looping {
            0
        } else {
            // Stay on last frame
            self.frame = frame_count - 1;
            self.finished = true;
            return TimelineStep::Finished { elapsed };
        };

        self.frame = entered;
        self.ticks_remaining = animation.frame_data[entered].duration;
        TimelineStep::Advanced { elapsed, entered }
    }

    pub fn current(&self) -> Option<AnimationId> {
        self.current
    }

    /// Get the current animation
    pub fn animation<'a>(&self, set: &'a AnimationSet) -> Option<&'a Animation> {
        self.current.and_then(|id| set.get(id))
    }

    /// Get the current frame index
    pub fn current_frame(&self) -> usize {
        self.frame
    }

    pub fn ticks_remaining(&self) -> u32 {
        self.ticks_remaining
    }

    pub fn is_looping(&self) -> bool {
        self.looping
    }

    /// Non-looping, on the last frame, with no ticks remaining
    pub fn is_finished(&self) -> bool {
        self.current.is_some() && self.finished && !self.looping && self.ticks_remaining == 0
    }

    /// The active frame's record, or `None` when nothing is playing or the
    /// animation has no frames
    pub fn active_frame<'a>(&self, set: &'a AnimationSet) -> Option<&'a FrameData> {
        self.animation(set).and_then(|animation| animation.frame(self.frame))
    }

    /// Sprite of the active frame
    pub fn active_sprite<'a>(&self, set: &'a AnimationSet) -> Option<&'a Sprite> {
        let animation = self.animation(set)?;
        let frame = animation.frame(self.frame)?;
        animation.sprite_for(frame)
    }
}
