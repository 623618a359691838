use std::collections::HashMap;
use std::sync::Arc;

use glam::Vec2;

use crate::ecs::capabilities::{
    self, scheduler, BehaviorScheduler, BounceFilter, Draggable, Gravity, LateralBounce, Movement,
    RightClickHandler, Rotation, Sprite,
};
use crate::ecs::components::*;
use crate::ecs::entity;
use crate::error;
use crate::geometry::Rect;
use crate::species::Species;
use crate::world::PetWorld;

/// Hands out pet ids (`cat-1`, `cat-2`, `ape-1`, ...), counting per species.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    counters: HashMap<String, u32>,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn next(&mut self, species_id: &str) -> String {
        let n = self.counters.entry(species_id.to_string()).or_insert(0);
        *n += 1;
        format!("{species_id}-{n}")
    }
}

/// Spawn one pet at `origin` with the default capability set, walking.
pub fn spawn(world: &mut PetWorld, species: Arc<Species>, origin: Vec2) -> hecs::Entity {
    let id = world.ids.next(&species.id);
    let size = species.sprite_size(world.settings.pet_size);
    let frame = Rect::new(origin.x, origin.y, size, size);
    let dir = entity::random_horizontal(&mut world.rng);

    let pet = world.ecs.spawn((
        PetId(id.clone()),
        Frame(frame),
        PrevFrame(frame),
        Direction(dir),
        Speed::new(0.0),
        PetState::Move,
        SpeciesRef(species.clone()),
        Lifecycle::PET,
        StateSubscribers::default(),
    ));

    let settings = world.settings;
    capabilities::install(world, pet, Draggable::new());
    capabilities::install(world, pet, Movement::new());
    capabilities::install(world, pet, Gravity::new(settings.gravity_enabled));
    capabilities::install(
        world,
        pet,
        LateralBounce::new(BounceFilter::for_settings(settings.bounce_off_pets)),
    );
    capabilities::install(world, pet, Rotation::new());
    capabilities::install(world, pet, Sprite::new());
    capabilities::install(
        world,
        pet,
        BehaviorScheduler::new(&id, scheduler::default_behaviors(&species)),
    );
    capabilities::install(world, pet, RightClickHandler::new());

    log::info!("Spawned {id} at ({:.0}, {:.0})", origin.x, origin.y);
    pet
}

/// Spawn a batch of pets of one species at random spots in the world.
pub fn spawn_scattered(world: &mut PetWorld, species_id: &str, count: usize) -> error::Result<Vec<hecs::Entity>> {
    let species = world.species.get(species_id)?;
    let size = species.sprite_size(world.settings.pet_size);
    let bounds = world.bounds();
    let span = Vec2::new(
        (bounds.width() - size).max(0.0),
        (bounds.height() - size).max(0.0),
    );

    let mut spawned = Vec::with_capacity(count);
    for _ in 0..count {
        let pos = bounds.origin + Vec2::new(world.rng.f32() * span.x, world.rng.f32() * span.y);
        spawned.push(spawn(world, species.clone(), pos));
    }
    Ok(spawned)
}
