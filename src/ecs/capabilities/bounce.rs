use glam::Vec2;
use hecs::Entity;

use super::{Capability, CapabilityKind};
use crate::collision::{Collision, Side};
use crate::ecs::capabilities::{self, MouseChaser};
use crate::ecs::components::PetState;
use crate::ecs::entity;
use crate::world::PetWorld;

/// Pixels two overlapping chasers are pushed apart per tick.
const CHASER_NUDGE: f32 = 1.0;
/// Below this |direction.x| there is nothing to reflect.
const MIN_HORIZONTAL: f32 = 1e-4;

/// Which collisions the bounce reacts to.
pub struct BounceFilter(Box<dyn Fn(&Collision) -> bool + Send + Sync>);

impl BounceFilter {
    /// Static, non-ephemeral obstacles only.
    pub fn static_only() -> Self {
        Self(Box::new(|c| c.is_static && !c.is_ephemeral))
    }

    /// Static obstacles and other (non-ephemeral) pets.
    pub fn static_and_pets() -> Self {
        Self(Box::new(|c| !c.is_ephemeral))
    }

    pub fn custom(f: impl Fn(&Collision) -> bool + Send + Sync + 'static) -> Self {
        Self(Box::new(f))
    }

    pub fn for_settings(bounce_off_pets: bool) -> Self {
        if bounce_off_pets {
            Self::static_and_pets()
        } else {
            Self::static_only()
        }
    }

    pub fn accepts(&self, c: &Collision) -> bool {
        (self.0)(c)
    }
}

impl std::fmt::Debug for BounceFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("BounceFilter(..)")
    }
}

/// Reflects the horizontal heading when the leading side hits something.
#[derive(Debug)]
pub struct LateralBounce {
    enabled: bool,
    token: u64,
    filter: BounceFilter,
}

impl LateralBounce {
    pub fn new(filter: BounceFilter) -> Self {
        Self {
            enabled: true,
            token: 0,
            filter,
        }
    }

    pub fn set_filter(&mut self, filter: BounceFilter) {
        self.filter = filter;
    }
}

impl Capability for LateralBounce {
    const KIND: CapabilityKind = CapabilityKind::Bounce;

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
        if entity::state(world, entity) != Some(PetState::Move) {
            return;
        }
        let Some(dir) = entity::direction(world, entity) else {
            return;
        };
        if dir.x.abs() < MIN_HORIZONTAL {
            return;
        }
        let leading = if dir.x > 0.0 { Side::Right } else { Side::Left };

        let hit = {
            let Ok(bounce) = world.ecs.get::<&LateralBounce>(entity) else {
                return;
            };
            collisions
                .iter()
                .find(|c| c.other != entity && c.sides.contains(leading) && bounce.filter.accepts(c))
                .copied()
        };
        let Some(hit) = hit else {
            return;
        };

        if capabilities::is_enabled::<MouseChaser>(world, entity) {
            // Chasers push apart instead of turning around.
            let away = if leading == Side::Right { -CHASER_NUDGE } else { CHASER_NUDGE };
            if let Some(frame) = entity::frame(world, entity) {
                entity::set_frame(world, entity, frame.translated(Vec2::new(away, 0.0)));
            }
            return;
        }

        log::trace!("{entity:?} bounced off {:?}", hit.other);
        entity::set_direction(world, entity, Vec2::new(-dir.x, dir.y));
    }
}
