use glam::Vec2;
use hecs::Entity;

use super::seeker::{SeekTarget, Seeker};
use super::{movement, scheduler, Capability, CapabilityKind, Gravity, Movement, WallWalker};
use crate::collision::Collision;
use crate::ecs::capabilities;
use crate::ecs::components::{Frame, Lifecycle, PetState};
use crate::ecs::entity;
use crate::world::PetWorld;

/// Walking speed boost while chasing.
pub const SPEED_MULTIPLIER: f32 = 1.5;
/// Chasers whose centers are closer than this push each other apart.
pub const SEPARATION_DISTANCE: f32 = 40.0;

/// Mouse-chase mode: a pointer seeker plus the mode switches around it.
/// Excludes wall-walking; gravity and the behavior scheduler are held off
/// while it runs.
#[derive(Debug, Clone)]
pub struct MouseChaser {
    enabled: bool,
    token: u64,
}

impl MouseChaser {
    pub fn new() -> Self {
        Self {
            enabled: true,
            token: 0,
        }
    }
}

impl Default for MouseChaser {
    fn default() -> Self {
        Self::new()
    }
}

pub fn enable(world: &mut PetWorld, entity: Entity) -> bool {
    let ok = capabilities::install(world, entity, MouseChaser::new());
    if ok {
        log::info!("{} chasing the pointer", entity::id(world, entity).unwrap_or_default());
    }
    ok
}

pub fn disable(world: &mut PetWorld, entity: Entity) -> bool {
    let killed = capabilities::kill::<MouseChaser>(world, entity);
    if killed {
        log::info!("{} stopped chasing", entity::id(world, entity).unwrap_or_default());
    }
    killed
}

/// Offset that moves `center` out of the separation radius of `others`,
/// taking half of each overlap (the other chaser takes the rest).
pub fn separation_offset(center: Vec2, others: &[Vec2]) -> Vec2 {
    let mut push = Vec2::ZERO;
    for &other in others {
        let delta = center - other;
        let dist = delta.length();
        if dist >= SEPARATION_DISTANCE {
            continue;
        }
        let away = if dist > 1e-4 { delta / dist } else { Vec2::X };
        push += away * (SEPARATION_DISTANCE - dist) * 0.5;
    }
    push
}

impl Capability for MouseChaser {
    const KIND: CapabilityKind = CapabilityKind::MouseChaser;

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

    fn on_install(world: &mut PetWorld, entity: Entity) {
        capabilities::kill::<Seeker>(world, entity);
        capabilities::kill::<WallWalker>(world, entity);
        capabilities::set_enabled::<Gravity>(world, entity, false);
        scheduler::pause(world, entity);
        capabilities::install(world, entity, Seeker::new(SeekTarget::Pointer));
        if entity::state(world, entity) == Some(PetState::FreeFall) {
            entity::set_state(world, entity, PetState::Move);
        }
        movement::reset_speed(world, entity, false);
    }

    fn on_kill(world: &mut PetWorld, entity: Entity) {
        // Off first, so the speed reset below drops the boost.
        capabilities::set_enabled::<MouseChaser>(world, entity, false);
        capabilities::kill::<Seeker>(world, entity);
        let gravity_on = world.settings.gravity_enabled && !capabilities::has::<WallWalker>(world, entity);
        capabilities::set_enabled::<Gravity>(world, entity, gravity_on);
        scheduler::resume(world, entity);
        capabilities::set_enabled::<Movement>(world, entity, true);
        let dir = entity::random_horizontal(&mut world.rng);
        entity::set_direction(world, entity, dir);
        movement::reset_speed(world, entity, false);
    }

    fn update(world: &mut PetWorld, entity: Entity, _collisions: &[Collision], _dt: f32) {
        let Some(frame) = entity::frame(world, entity) else {
            return;
        };
        let others: Vec<Vec2> = world
            .ecs
            .query::<(&Frame, &Lifecycle, &MouseChaser)>()
            .iter()
            .filter(|(e, (_, life, chaser))| *e != entity && life.alive && chaser.enabled)
            .map(|(_, (f, _, _))| f.0.center())
            .collect();
        let push = separation_offset(frame.center(), &others);
        if push != Vec2::ZERO {
            entity::set_frame(world, entity, frame.translated(push));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cat_world, spawn_cat_at};
    use approx::assert_relative_eq;

    #[test]
    fn separation_takes_half_the_overlap() {
        let push = separation_offset(Vec2::ZERO, &[Vec2::new(30.0, 0.0)]);
        assert_relative_eq!(push.x, -5.0);
        assert_relative_eq!(push.y, 0.0);
        assert_eq!(separation_offset(Vec2::ZERO, &[Vec2::new(50.0, 0.0)]), Vec2::ZERO);
    }

    #[test]
    fn chase_excludes_wall_walking() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        assert!(super::super::wall_walker::enable(&mut world, pet, true));

        assert!(enable(&mut world, pet));
        assert!(!capabilities::has::<WallWalker>(&world, pet));
        assert!(capabilities::has::<Seeker>(&world, pet));
        assert!(!capabilities::is_enabled::<Gravity>(&world, pet));

        assert!(super::super::wall_walker::enable(&mut world, pet, true));
        assert!(!capabilities::has::<MouseChaser>(&world, pet));
        assert!(!capabilities::has::<Seeker>(&world, pet));
    }

    #[test]
    fn chase_boosts_speed_and_restores_on_exit() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        let base = movement::base_speed(&world, pet);
        assert!(enable(&mut world, pet));
        assert_relative_eq!(movement::base_speed(&world, pet), base * SPEED_MULTIPLIER);

        assert!(disable(&mut world, pet));
        assert_relative_eq!(movement::base_speed(&world, pet), base);
        assert!(capabilities::is_enabled::<Gravity>(&world, pet));
        assert!(capabilities::is_enabled::<super::super::BehaviorScheduler>(&world, pet));
    }
}
