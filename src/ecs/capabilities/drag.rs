use glam::Vec2;
use hecs::Entity;

use super::{Capability, CapabilityKind, Gravity, WallWalker};
use crate::ecs::capabilities;
use crate::ecs::components::PetState;
use crate::ecs::entity;
use crate::world::PetWorld;

/// Lets the user pick the pet up and drop it.
#[derive(Debug, Clone)]
pub struct Draggable {
    enabled: bool,
    token: u64,
    /// Pointer position relative to the frame origin at pick-up.
    pub grab_offset: Vec2,
}

impl Draggable {
    pub fn new() -> Self {
        Self {
            enabled: true,
            token: 0,
            grab_offset: Vec2::ZERO,
        }
    }
}

impl Default for Draggable {
    fn default() -> Self {
        Self::new()
    }
}

/// Pick the pet up at `point`. Interrupts whatever it was doing.
pub fn drag_begin(world: &mut PetWorld, entity: Entity, point: Vec2) -> bool {
    if !capabilities::is_enabled::<Draggable>(world, entity) {
        return false;
    }
    let Some(frame) = entity::frame(world, entity) else {
        return false;
    };
    capabilities::with::<Draggable, _>(world, entity, |d| d.grab_offset = point - frame.origin);
    entity::set_state(world, entity, PetState::Drag)
}

/// Move a dragged pet by `delta`, keeping it inside the world.
pub fn drag_delta(world: &mut PetWorld, entity: Entity, delta: Vec2) {
    if entity::state(world, entity) != Some(PetState::Drag) || !delta.is_finite() {
        return;
    }
    let Some(frame) = entity::frame(world, entity) else {
        return;
    };
    let bounds = world.bounds();
    entity::set_frame(world, entity, frame.translated(delta).clamped_within(&bounds));
}

/// Drop the pet. It falls if anything pulls on it, otherwise walks on.
pub fn drag_end(world: &mut PetWorld, entity: Entity) -> bool {
    if entity::state(world, entity) != Some(PetState::Drag) {
        return false;
    }
    let falls = capabilities::is_enabled::<Gravity>(world, entity)
        || capabilities::is_enabled::<WallWalker>(world, entity);
    if !falls {
        let dir = entity::random_horizontal(&mut world.rng);
        entity::set_direction(world, entity, dir);
    }
    let next = if falls { PetState::FreeFall } else { PetState::Move };
    entity::set_state(world, entity, next)
}

impl Capability for Draggable {
    const KIND: CapabilityKind = CapabilityKind::Drag;

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
}
