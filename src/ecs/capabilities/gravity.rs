use glam::Vec2;
use hecs::Entity;

use super::{Capability, CapabilityKind};
use crate::collision::{Collision, Side, CONTACT_MARGIN};
use crate::ecs::capabilities::{self, WallWalker};
use crate::ecs::components::PetState;
use crate::ecs::entity;
use crate::geometry::Rect;
use crate::world::PetWorld;

/// How far (px) a surface below may sit from the pet's feet and still
/// count as ground.
pub const GROUND_TOLERANCE: f32 = CONTACT_MARGIN;

/// Global downward gravity. Inactive while wall-walking, which brings its
/// own wall-relative gravity.
#[derive(Debug, Clone)]
pub struct Gravity {
    enabled: bool,
    token: u64,
}

impl Gravity {
    pub fn new(enabled: bool) -> Self {
        Self { enabled, token: 0 }
    }
}

impl Capability for Gravity {
    const KIND: CapabilityKind = CapabilityKind::Gravity;

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

    fn update(world: &mut PetWorld, entity: Entity, collisions: &[Collision], _dt: f32) {
        if capabilities::is_enabled::<WallWalker>(world, entity) {
            return;
        }
        let Some(state) = entity::state(world, entity) else {
            return;
        };
        if !matches!(state, PetState::Move | PetState::FreeFall) {
            return;
        }
        let Some(frame) = entity::frame(world, entity) else {
            return;
        };

        match find_ground(&frame, collisions) {
            Some(ground_y) => {
                entity::set_origin(world, entity, Vec2::new(frame.min_x(), ground_y - frame.height()));
                if state == PetState::FreeFall {
                    let dir = entity::random_horizontal(&mut world.rng);
                    entity::set_direction(world, entity, dir);
                    entity::set_state(world, entity, PetState::Move);
                }
            }
            None => {
                entity::set_direction(world, entity, Vec2::Y);
                if state == PetState::Move {
                    entity::set_state(world, entity, PetState::FreeFall);
                }
            }
        }
    }
}

/// Top edge of the highest static surface under the pet's feet, if any.
/// A surface whose top lies inside the frame (the pet sank into it) still
/// counts.
pub fn find_ground(frame: &Rect, collisions: &[Collision]) -> Option<f32> {
    collisions
        .iter()
        .filter(|c| c.is_static && !c.is_ephemeral && c.sides.contains(Side::Bottom))
        .map(|c| c.other_frame.min_y())
        .filter(|&top| top >= frame.min_y() && top - frame.max_y() <= GROUND_TOLERANCE)
        .min_by(|a, b| a.total_cmp(b))
}
