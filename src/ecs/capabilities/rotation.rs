use hecs::Entity;

use super::{Capability, CapabilityKind};
use crate::collision::Collision;
use crate::ecs::capabilities::{self, Sprite, WallWalker};
use crate::ecs::entity;
use crate::world::PetWorld;

/// Below this |direction.x| the facing is left as is.
const MIN_HORIZONTAL: f32 = 1e-3;

/// Upright sprite facing its heading. Steps aside while wall-walking,
/// which owns the sprite transform then.
#[derive(Debug, Clone)]
pub struct Rotation {
    enabled: bool,
    token: u64,
}

impl Rotation {
    pub fn new() -> Self {
        Self {
            enabled: true,
            token: 0,
        }
    }
}

impl Default for Rotation {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for Rotation {
    const KIND: CapabilityKind = CapabilityKind::Rotation;

    fn token(&self) -> u64 {
        self.token
    }

    fn set_token(&mut self, token: u64) {
        self.token = token;
    }

    fn is_enabled(&self) -> bool {
        self.enabled
    }

    fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    fn update(world: &mut PetWorld, entity: Entity, _collisions: &[Collision], _dt: f32) {
        if capabilities::is_enabled::<WallWalker>(world, entity) {
            return;
        }
        let Some(dir) = entity::direction(world, entity) else {
            return;
        };
        capabilities::with::<Sprite, _>(world, entity, |s| {
            s.rotation = 0.0;
            s.flip_v = false;
            if dir.x.abs() > MIN_HORIZONTAL {
                s.flip_h = dir.x < 0.0;
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cat_world, spawn_cat_at};
    use glam::Vec2;

    #[test]
    fn faces_heading() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        entity::set_direction(&world, pet, Vec2::NEG_X);
        Rotation::update(&mut world, pet, &[], 0.016);
        assert_eq!(capabilities::with::<Sprite, _>(&world, pet, |s| s.flip_h), Some(true));

        // Straight down keeps the last facing.
        entity::set_direction(&world, pet, Vec2::Y);
        Rotation::update(&mut world, pet, &[], 0.016);
        assert_eq!(capabilities::with::<Sprite, _>(&world, pet, |s| s.flip_h), Some(true));
    }
}
