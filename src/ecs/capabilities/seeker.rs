use glam::Vec2;
use hecs::Entity;

use super::{sprite, Capability, CapabilityKind, Movement};
use crate::collision::Collision;
use crate::ecs::capabilities;
use crate::ecs::entity;
use crate::geometry::unit_or_none;
use crate::world::PetWorld;

/// Within this distance (px) the target counts as caught.
pub const MIN_DISTANCE: f32 = 20.0;
/// Once caught, the target must get this far away before the chase resumes.
pub const ESCAPE_DISTANCE: f32 = 60.0;

/// What a seeker chases.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// The mouse pointer.
    Pointer,
    Point(Vec2),
    /// Another entity's center.
    Entity(Entity),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekState {
    Following,
    Captured,
    Escaped,
}

/// Steers the pet toward a target; idles once it is caught.
#[derive(Debug, Clone)]
pub struct Seeker {
    enabled: bool,
    token: u64,
    pub target: SeekTarget,
    pub state: SeekState,
    pub min_distance: f32,
    pub escape_distance: f32,
}

impl Seeker {
    pub fn new(target: SeekTarget) -> Self {
        Self {
            enabled: true,
            token: 0,
            target,
            state: SeekState::Following,
            min_distance: MIN_DISTANCE,
            escape_distance: ESCAPE_DISTANCE,
        }
    }
}

fn target_position(world: &PetWorld, target: SeekTarget) -> Option<Vec2> {
    match target {
        SeekTarget::Pointer => Some(world.pointer()),
        SeekTarget::Point(p) => Some(p),
        SeekTarget::Entity(other) => entity::frame(world, other).map(|f| f.center()),
    }
}

/// Next seek state for the given distance to the target.
pub fn next_state(current: SeekState, distance: f32, min_distance: f32, escape_distance: f32) -> SeekState {
    match current {
        SeekState::Following | SeekState::Escaped if distance <= min_distance => SeekState::Captured,
        SeekState::Captured if distance > escape_distance => SeekState::Escaped,
        SeekState::Escaped => SeekState::Following,
        other => other,
    }
}

fn on_captured(world: &PetWorld, entity: Entity) {
    sprite::set_pose(world, entity, Some("idle"));
    capabilities::set_enabled::<Movement>(world, entity, false);
}

fn on_released(world: &PetWorld, entity: Entity) {
    sprite::set_pose(world, entity, None);
    capabilities::set_enabled::<Movement>(world, entity, true);
}

impl Capability for Seeker {
    const KIND: CapabilityKind = CapabilityKind::Seeker;

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

    fn on_kill(world: &mut PetWorld, entity: Entity) {
        on_released(world, entity);
    }

    fn update(world: &mut PetWorld, entity: Entity, _collisions: &[Collision], _dt: f32) {
        let Some((target, current, min_d, escape_d)) =
            capabilities::with::<Seeker, _>(world, entity, |s| (s.target, s.state, s.min_distance, s.escape_distance))
        else {
            return;
        };
        let (Some(goal), Some(frame)) = (target_position(world, target), entity::frame(world, entity)) else {
            return;
        };
        let delta = goal - frame.center();
        let next = next_state(current, delta.length(), min_d, escape_d);

        if next != current {
            capabilities::with::<Seeker, _>(world, entity, |s| s.state = next);
            log::trace!("{entity:?} seek {current:?} -> {next:?}");
            match next {
                SeekState::Captured => on_captured(world, entity),
                SeekState::Escaped => on_released(world, entity),
                SeekState::Following => {}
            }
        }
        if next != SeekState::Captured {
            if let Some(dir) = unit_or_none(delta) {
                entity::set_direction(world, entity, dir);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cat_world, spawn_cat_at};
    use approx::assert_relative_eq;

    #[test]
    fn capture_and_escape_hysteresis() {
        use SeekState::*;
        assert_eq!(next_state(Following, 100.0, 20.0, 60.0), Following);
        assert_eq!(next_state(Following, 15.0, 20.0, 60.0), Captured);
        assert_eq!(next_state(Captured, 40.0, 20.0, 60.0), Captured);
        assert_eq!(next_state(Captured, 61.0, 20.0, 60.0), Escaped);
        assert_eq!(next_state(Escaped, 61.0, 20.0, 60.0), Following);
        assert_eq!(next_state(Escaped, 10.0, 20.0, 60.0), Captured);
    }

    #[test]
    fn steers_toward_point_then_idles() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        let center = entity::frame(&world, pet).unwrap().center();
        assert!(capabilities::install(
            &mut world,
            pet,
            Seeker::new(SeekTarget::Point(center + Vec2::new(0.0, 200.0)))
        ));

        Seeker::update(&mut world, pet, &[], 0.016);
        let dir = entity::direction(&world, pet).unwrap();
        assert_relative_eq!(dir.x, 0.0);
        assert_relative_eq!(dir.y, 1.0);

        capabilities::with::<Seeker, _>(&world, pet, |s| s.target = SeekTarget::Point(center));
        Seeker::update(&mut world, pet, &[], 0.016);
        assert!(!capabilities::is_enabled::<Movement>(&world, pet));
        assert_eq!(
            capabilities::with::<super::super::Sprite, _>(&world, pet, |s| s.pose.clone()),
            Some(Some("idle".to_string()))
        );

        assert!(capabilities::kill::<Seeker>(&mut world, pet));
        assert!(capabilities::is_enabled::<Movement>(&world, pet));
    }
}
