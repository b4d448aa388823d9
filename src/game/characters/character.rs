// Character documents and the roster of simulated fighters

use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::engine::assets::{AssetError, AssetLoader};
use crate::engine::input::GameInput;
use crate::engine::physics::Stage;
use crate::game::simulation::{CharacterSim, Facing, TickReport};

use super::animation::{Animation, AnimationSet};
use super::stats::CharacterStats;

/// Errors raised while loading or validating a character document
#[derive(Debug, thiserror::Error)]
pub enum CharacterError {
    #[error(transparent)]
    Asset(#[from] AssetError),

    #[error("Invalid character document: {0}")]
    Syntax(#[from] serde_json::Error),

    #[error("Animation '{animation}' frame {frame}: duration must be at least 1 tick")]
    ZeroDuration { animation: String, frame: usize },

    #[error(
        "Animation '{animation}' frame {frame}: sprite index {index} out of range ({count} sprites)"
    )]
    SpriteIndexOutOfRange {
        animation: String,
        frame: usize,
        index: usize,
        count: usize,
    },

    #[error("Animation '{animation}' frame {frame}: switch target '{target}' does not exist")]
    UnknownSwitchTarget {
        animation: String,
        frame: usize,
        target: String,
    },

    #[error("Friction must be a finite, non-negative number (got {0})")]
    InvalidFriction(f32),
}

/// On-disk form of a character
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDocument {
    pub id: String,
    pub name: String,
    pub friction: f32,
    pub jump_height: f32,
    #[serde(default)]
    pub animations: BTreeMap<String, Animation>,
}

/// A validated character: tuning plus its animation arena.
///
/// Read-only during simulation and shared between fighters through `Arc`.
#[derive(Debug, Clone)]
pub struct Character {
    pub id: String,
    /// Character name (for display)
    pub name: String,
    pub friction: f32,
    pub jump_height: f32,
    pub animations: AnimationSet,
}

impl Character {
    /// Build and validate a character from in-memory animations
    pub fn new(
        id: &str,
        name: &str,
        friction: f32,
        jump_height: f32,
        animations: Vec<Animation>,
    ) -> Result<Self, CharacterError> {
        if !friction.is_finite() || friction < 0.0 {
            return Err(CharacterError::InvalidFriction(friction));
        }
        let animations = AnimationSet::new(animations);
        validate(&animations)?;
        Ok(Self {
            id: id.to_string(),
            name: name.to_string(),
            friction,
            jump_height,
            animations,
        })
    }

    /// Load a character document; sprite paths become absolute
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, CharacterError> {
        let (loader, path) = open_document(path.as_ref());
        let document: CharacterDocument = loader.read_json(&path)?;
        let character = Self::from_document(document, &loader)?;
        info!(
            "Loaded character '{}' ({} animations) from {}",
            character.name,
            character.animations.len(),
            path.display()
        );
        Ok(character)
    }

    /// Parse a document held in memory, resolving paths against `loader`
    pub fn parse(text: &str, loader: &AssetLoader) -> Result<Self, CharacterError> {
        let document: CharacterDocument = serde_json::from_str(text)?;
        Self::from_document(document, loader)
    }

    /// Validate a document and resolve its sprite paths
    pub fn from_document(
        document: CharacterDocument,
        loader: &AssetLoader,
    ) -> Result<Self, CharacterError> {
        let animations = document
            .animations
            .into_iter()
            .map(|(name, mut animation)| {
                animation.name = name;
                for sprite in &mut animation.sprites {
                    sprite.image_path = loader.to_absolute(&sprite.image_path);
                }
                animation
            })
            .collect();
        Self::new(
            &document.id,
            &document.name,
            document.friction,
            document.jump_height,
            animations,
        )
    }

    /// On-disk form with sprite paths relative to `loader`'s base
    pub fn to_document(&self, loader: &AssetLoader) -> CharacterDocument {
        let animations = self
            .animations
            .iter()
            .map(|animation| {
                let mut animation = animation.clone();
                for sprite in &mut animation.sprites {
                    sprite.image_path = loader.to_relative(&sprite.image_path);
                }
                (animation.name.clone(), animation)
            })
            .collect();
        CharacterDocument {
            id: self.id.clone(),
            name: self.name.clone(),
            friction: self.friction,
            jump_height: self.jump_height,
            animations,
        }
    }

    /// Save as a document; sprite paths become relative to the file
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), CharacterError> {
        let (loader, path) = open_document(path.as_ref());
        loader.write_json(&path, &self.to_document(&loader))?;
        info!("Saved character '{}' to {}", self.name, path.display());
        Ok(())
    }

    /// Movement tuning with this character's overrides
    pub fn stats(&self) -> CharacterStats {
        CharacterStats::with_overrides(self.friction, self.jump_height)
    }
}

/// Loader rooted at the document's directory, plus the document's absolute path
fn open_document(path: &Path) -> (AssetLoader, PathBuf) {
    let loader = AssetLoader::for_document(path);
    let path = match path.file_name() {
        Some(file) => loader.base_path().join(file),
        None => loader.to_absolute(path),
    };
    (loader, path)
}

/// Reject content errors that would otherwise corrupt frame data silently
fn validate(animations: &AnimationSet) -> Result<(), CharacterError> {
    for animation in animations.iter() {
        for (frame_index, frame) in animation.frame_data.iter().enumerate() {
            if frame.duration == 0 {
                return Err(CharacterError::ZeroDuration {
                    animation: animation.name.clone(),
                    frame: frame_index,
                });
            }
            if frame.sprite_index >= animation.sprites.len() {
                return Err(CharacterError::SpriteIndexOutOfRange {
                    animation: animation.name.clone(),
                    frame: frame_index,
                    index: frame.sprite_index,
                    count: animation.sprites.len(),
                });
            }
            if let Some(target) = &frame.animation_switch {
                if animations.id(target).is_none() {
                    return Err(CharacterError::UnknownSwitchTarget {
                        animation: animation.name.clone(),
                        frame: frame_index,
                        target: target.clone(),
                    });
                }
            }
        }
    }
    Ok(())
}

/// Unique identifier for a fighter in a roster
pub type FighterId = u32;

/// One simulated character in a roster
#[derive(Debug, Clone)]
pub struct Fighter {
    pub id: FighterId,
    /// Player index feeding this fighter (None for externally driven fighters)
    pub player_index: Option<usize>,
    pub sim: CharacterSim,
}

/// Owns every fighter in a match and ticks them in id order.
///
/// Fighters never see each other during a tick; anything cross-character
/// runs after [`CharacterManager::tick`] returns.
#[derive(Debug, Default)]
pub struct CharacterManager {
    fighters: Vec<Fighter>,
    next_id: FighterId,
    stage: Stage,
}

impl CharacterManager {
    pub fn new(stage: Stage) -> Self {
        Self {
            fighters: Vec::new(),
            next_id: 0,
            stage,
        }
    }

    /// Spawn a fighter standing at `x`
    pub fn spawn(
        &mut self,
        character: Arc<Character>,
        player_index: Option<usize>,
        x: f32,
        facing: Facing,
    ) -> FighterId {
        let id = self.next_id;
        self.next_id += 1;

        let mut sim = CharacterSim::new(character, self.stage, x);
        sim.set_facing(facing);
        debug!("Spawned fighter {} for player {:?}", id, player_index);
        self.fighters.push(Fighter {
            id,
            player_index,
            sim,
        });

        id
    }

    /// Get a fighter by ID
    pub fn get(&self, id: FighterId) -> Option<&Fighter> {
        self.fighters.iter().find(|f| f.id == id)
    }

    /// Get a mutable fighter by ID
    pub fn get_mut(&mut self, id: FighterId) -> Option<&mut Fighter> {
        self.fighters.iter_mut().find(|f| f.id == id)
    }

    /// Get a fighter by player index
    pub fn get_by_player(&self, player_index: usize) -> Option<&Fighter> {
        self.fighters
            .iter()
            .find(|f| f.player_index == Some(player_index))
    }

    /// Get all fighters
    pub fn all(&self) -> &[Fighter] {
        &self.fighters
    }

    /// Advance every fighter one tick. `inputs[i]` feeds player index `i`;
    /// fighters without an input receive neutral.
    pub fn tick(&mut self, inputs: &[GameInput]) -> Vec<(FighterId, TickReport)> {
        self.fighters
            .iter_mut()
            .map(|fighter| {
                let input = fighter
                    .player_index
                    .and_then(|i| inputs.get(i).copied())
                    .unwrap_or(GameInput::NONE);
                (fighter.id, fighter.sim.step(input))
            })
            .collect()
    }

    /// Remove a fighter by ID
    pub fn remove(&mut self, id: FighterId) -> Option<Fighter> {
        let pos = self.fighters.iter().position(|f| f.id == id)?;
        Some(self.fighters.remove(pos))
    }

    /// Get the number of fighters
    pub fn count(&self) -> usize {
        self.fighters.len()
    }

    /// Check if a player index is already taken
    pub fn is_player_taken(&self, player_index: usize) -> bool {
        self.fighters
            .iter()
            .any(|f| f.player_index == Some(player_index))
    }
}
