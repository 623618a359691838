use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::error::{self, PetError};

/// One sprite animation a species can play.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnimationDesc {
    pub id: String,
    /// Frames per loop.
    #[serde(default = "default_frame_count")]
    pub frame_count: u32,
}

fn default_frame_count() -> u32 {
    4
}

/// Static per-species descriptor. Shared read-only between all pets of
/// the species.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Species {
    pub id: String,
    pub animations: Vec<AnimationDesc>,
    /// Base walking speed in pixels/second.
    #[serde(default = "default_speed")]
    pub speed: f32,
    /// Sprite scale relative to the base sprite size.
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default)]
    pub z_index: i32,
}

fn default_speed() -> f32 {
    30.0
}

fn default_scale() -> f32 {
    1.0
}

/// Base sprite edge length in pixels before scale and the pet size setting.
pub const BASE_SPRITE_SIZE: f32 = 50.0;

impl Species {
    pub fn has_animation(&self, id: &str) -> bool {
        self.animations.iter().any(|a| a.id == id)
    }

    pub fn animation(&self, id: &str) -> Option<&AnimationDesc> {
        self.animations.iter().find(|a| a.id == id)
    }

    pub fn animation_ids(&self) -> impl Iterator<Item = &str> {
        self.animations.iter().map(|a| a.id.as_str())
    }

    /// Sprite edge length for a given pet size setting.
    pub fn sprite_size(&self, pet_size: f32) -> f32 {
        BASE_SPRITE_SIZE * self.scale * pet_size
    }

    fn with_animations(id: &str, speed: f32, scale: f32, z_index: i32, anims: &[(&str, u32)]) -> Self {
        Self {
            id: id.to_string(),
            animations: anims
                .iter()
                .map(|&(id, frame_count)| AnimationDesc {
                    id: id.to_string(),
                    frame_count,
                })
                .collect(),
            speed,
            scale,
            z_index,
        }
    }
}

/// All known species, keyed by id.
#[derive(Debug, Clone, Default)]
pub struct SpeciesTable {
    species: HashMap<String, Arc<Species>>,
}

impl SpeciesTable {
    /// Built-in species.
    pub fn builtin() -> Self {
        let mut table = Self::default();
        table.insert(Species::with_animations(
            "cat",
            30.0,
            1.0,
            0,
            &[
                ("walk", 4),
                ("fall", 2),
                ("drag", 2),
                ("idle", 4),
                ("front", 2),
                ("eat", 6),
                ("sleep", 4),
            ],
        ));
        table.insert(Species::with_animations(
            "ape",
            25.0,
            1.2,
            1,
            &[
                ("walk", 6),
                ("fall", 2),
                ("drag", 2),
                ("front", 4),
                ("eat", 8),
            ],
        ));
        table.insert(Species::with_animations(
            "sloth",
            8.0,
            0.9,
            0,
            &[("walk", 6), ("fall", 2), ("drag", 2), ("sleep", 6), ("idle", 4)],
        ));
        table
    }

    pub fn from_json_str(json: &str) -> error::Result<Self> {
        let list: Vec<Species> = serde_json::from_str(json)?;
        let mut table = Self::default();
        for species in list {
            table.insert(species);
        }
        Ok(table)
    }

    pub fn load(path: &Path) -> error::Result<Self> {
        let table = Self::from_json_str(&error::read_to_string(path)?)?;
        log::info!("Loaded {} species from {}", table.len(), path.display());
        Ok(table)
    }

    pub fn insert(&mut self, species: Species) {
        self.species.insert(species.id.clone(), Arc::new(species));
    }

    pub fn get(&self, id: &str) -> error::Result<Arc<Species>> {
        self.species
            .get(id)
            .cloned()
            .ok_or_else(|| PetError::UnknownSpecies(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.species.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }
}
