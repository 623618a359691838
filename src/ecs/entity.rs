//! Pet entity accessors and the validated state machine.

use std::sync::Arc;

use glam::Vec2;
use hecs::Entity;

use crate::collision::Collision;
use crate::ecs::capabilities;
use crate::ecs::components::{
    Direction, Frame, Lifecycle, PetId, PetState, PrevFrame, Speed, SpeciesRef,
};
use crate::geometry::Rect;
use crate::species::Species;
use crate::world::PetWorld;

pub fn is_alive(world: &PetWorld, entity: Entity) -> bool {
    world
        .ecs
        .get::<&Lifecycle>(entity)
        .map(|l| l.alive)
        .unwrap_or(false)
}

pub fn id(world: &PetWorld, entity: Entity) -> Option<String> {
    world.ecs.get::<&PetId>(entity).ok().map(|id| id.0.clone())
}

pub fn species(world: &PetWorld, entity: Entity) -> Option<Arc<Species>> {
    world.ecs.get::<&SpeciesRef>(entity).ok().map(|s| s.0.clone())
}

pub fn state(world: &PetWorld, entity: Entity) -> Option<PetState> {
    world.ecs.get::<&PetState>(entity).ok().map(|s| (*s).clone())
}

pub fn frame(world: &PetWorld, entity: Entity) -> Option<Rect> {
    world.ecs.get::<&Frame>(entity).ok().map(|f| f.0)
}

pub fn set_frame(world: &PetWorld, entity: Entity, rect: Rect) {
    if let Ok(mut frame) = world.ecs.get::<&mut Frame>(entity) {
        frame.0 = rect;
    }
}

pub fn set_origin(world: &PetWorld, entity: Entity, origin: Vec2) {
    if let Ok(mut frame) = world.ecs.get::<&mut Frame>(entity) {
        frame.0.origin = origin;
    }
}

pub fn direction(world: &PetWorld, entity: Entity) -> Option<Vec2> {
    world.ecs.get::<&Direction>(entity).ok().map(|d| d.0)
}

pub fn set_direction(world: &PetWorld, entity: Entity, dir: Vec2) {
    if !dir.is_finite() {
        log::debug!("non-finite direction for {entity:?} ignored");
        return;
    }
    if let Ok(mut d) = world.ecs.get::<&mut Direction>(entity) {
        d.0 = dir;
    }
}

pub fn speed(world: &PetWorld, entity: Entity) -> Option<f32> {
    world.ecs.get::<&Speed>(entity).ok().map(|s| s.get())
}

/// Negative and non-finite speeds are clamped to zero.
pub fn set_speed(world: &PetWorld, entity: Entity, v: f32) {
    if let Ok(mut s) = world.ecs.get::<&mut Speed>(entity) {
        *s = Speed::new(v);
    }
}

/// Random left/right heading.
pub fn random_horizontal(rng: &mut fastrand::Rng) -> Vec2 {
    if rng.bool() {
        Vec2::X
    } else {
        Vec2::NEG_X
    }
}

/// Change the pet's state.
///
/// `Action` is rejected (returns false, nothing changes) when the species
/// lacks the animation. Setting the current state again is a successful
/// no-op. Subscribed capabilities are notified synchronously.
pub fn set_state(world: &mut PetWorld, entity: Entity, new: PetState) -> bool {
    if !is_alive(world, entity) {
        log::debug!("set_state on dead entity {entity:?} ignored");
        return false;
    }
    if let PetState::Action { animation, .. } = &new {
        let supported = species(world, entity)
            .map(|s| s.has_animation(animation))
            .unwrap_or(false);
        if !supported {
            log::debug!(
                "{}: animation `{animation}` not supported, state unchanged",
                id(world, entity).unwrap_or_default()
            );
            return false;
        }
    }

    let old = {
        let Ok(mut current) = world.ecs.get::<&mut PetState>(entity) else {
            return false;
        };
        if *current == new {
            return true;
        }
        std::mem::replace(&mut *current, new.clone())
    };
    log::debug!(
        "{}: {} -> {}",
        id(world, entity).unwrap_or_default(),
        old.label(),
        new.label()
    );
    capabilities::notify_state_changed(world, entity, &old, &new);
    true
}

/// Count down one finished loop of the current action. Returns the loops
/// left, or `None` when not in an action.
pub fn consume_action_loop(world: &PetWorld, entity: Entity) -> Option<u32> {
    let mut state = world.ecs.get::<&mut PetState>(entity).ok()?;
    match &mut *state {
        PetState::Action {
            loops_remaining, ..
        } => {
            *loops_remaining = loops_remaining.saturating_sub(1);
            Some(*loops_remaining)
        }
        _ => None,
    }
}

/// One simulation step for a single pet.
pub fn update(world: &mut PetWorld, entity: Entity, collisions: &[Collision], dt: f32) {
    if !is_alive(world, entity) {
        return;
    }
    if let Ok((frame, prev)) = world.ecs.query_one_mut::<(&Frame, &mut PrevFrame)>(entity) {
        prev.0 = frame.0;
    }
    capabilities::update_all(world, entity, collisions, dt);
}

/// Tear the pet down: capabilities, pending timers, then the entity.
/// Safe to call twice.
pub fn kill(world: &mut PetWorld, entity: Entity) {
    if !world.ecs.contains(entity) {
        return;
    }
    if let Ok(mut lifecycle) = world.ecs.get::<&mut Lifecycle>(entity) {
        lifecycle.alive = false;
    }
    let name = id(world, entity);
    capabilities::kill_all(world, entity);
    world.tasks.cancel_entity(entity);
    let _ = world.ecs.despawn(entity);
    if let Some(name) = name {
        log::info!("{name} removed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cat_world, spawn_cat_at};

    #[test]
    fn unsupported_action_is_rejected() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        let before = state(&world, pet);
        assert!(!set_state(&mut world, pet, PetState::action("fly", 3)));
        assert_eq!(state(&world, pet), before);
    }

    #[test]
    fn supported_action_is_accepted() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        assert!(set_state(&mut world, pet, PetState::action("eat", 2)));
        assert_eq!(state(&world, pet).and_then(|s| s.action_id().map(String::from)), Some("eat".into()));
    }

    #[test]
    fn speed_never_negative() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        set_speed(&world, pet, -10.0);
        assert_eq!(speed(&world, pet), Some(0.0));
    }

    #[test]
    fn killed_pet_ignores_everything() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        kill(&mut world, pet);
        assert!(!is_alive(&world, pet));
        assert!(!set_state(&mut world, pet, PetState::Drag));
        assert_eq!(world.tasks.pending_for(pet), 0);
        kill(&mut world, pet);
    }
}
