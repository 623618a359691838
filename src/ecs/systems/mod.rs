pub mod lifetime;
pub mod timers;

use crate::collision::CollisionFeed;
use crate::ecs::entity;
use crate::world::PetWorld;

/// Longest step the simulation takes at once (seconds). Larger ticks are
/// split so fast or falling pets cannot skip past a surface.
pub const MAX_STEP: f32 = 1.0 / 30.0;

/// Run one simulation tick, split into equal sub-steps of at most
/// [`MAX_STEP`]. `feed` replaces the built-in collision detector when the
/// host supplies its own; it is used for every sub-step.
pub fn tick(world: &mut PetWorld, dt: f32, feed: Option<CollisionFeed>) {
    if !(dt.is_finite() && dt > 0.0) {
        log::warn!("tick with dt {dt} ignored");
        return;
    }

    let steps = (dt / MAX_STEP).ceil().max(1.0) as u32;
    let step = dt / steps as f32;
    if steps > 1 {
        log::trace!("tick of {dt}s split into {steps} steps");
    }
    for _ in 0..steps {
        substep(world, step, feed.as_ref());
    }

    world.tick_count += 1;
}

fn substep(world: &mut PetWorld, dt: f32, feed: Option<&CollisionFeed>) {
    // 1. Advance the clock and run timers that came due
    world.tasks.advance(f64::from(dt));
    timers::fire_due(world);

    // 2. Collision feed
    let built;
    let feed = match feed {
        Some(feed) => feed,
        None => {
            built = world.detector.detect(&world.ecs);
            &built
        }
    };

    // 3. Per-pet capability updates, in spawn order
    for pet in world.pets() {
        let collisions = feed.get(&pet).map(Vec::as_slice).unwrap_or(&[]);
        entity::update(world, pet, collisions, dt);
    }

    // 4. Expire ephemeral effects
    lifetime::expire(world, dt);
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use crate::ecs::components::PetState;
    use crate::ecs::entity;
    use crate::test_support::{cat_world, spawn_cat_at};

    #[test]
    fn long_ticks_still_land_on_the_floor() {
        let mut world = cat_world();
        let bounds = world.bounds();
        let pets: Vec<_> = (0..8)
            .map(|i| spawn_cat_at(&mut world, Vec2::new(40.0 + 90.0 * i as f32, 20.0 + 60.0 * i as f32)))
            .collect();

        for _ in 0..40 {
            world.tick(0.5);
        }
        assert_eq!(world.tick_count(), 40);
        for pet in pets {
            let frame = entity::frame(&world, pet).unwrap();
            assert_eq!(frame.max_y(), bounds.max_y(), "{frame:?}");
            assert!(frame.min_x() >= bounds.min_x() && frame.max_x() <= bounds.max_x());
            assert_ne!(entity::state(&world, pet), Some(PetState::FreeFall));
        }
    }

    #[test]
    fn one_second_tick_keeps_walkers_on_screen() {
        let mut world = cat_world();
        let bounds = world.bounds();
        let pet = spawn_cat_at(&mut world, Vec2::new(10.0, bounds.max_y() - 50.0));
        entity::set_direction(&world, pet, Vec2::NEG_X);
        for _ in 0..30 {
            world.tick(1.0);
            let frame = entity::frame(&world, pet).unwrap();
            assert!(frame.min_x() >= bounds.min_x() && frame.max_x() <= bounds.max_x(), "{frame:?}");
        }
    }
}
