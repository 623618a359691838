//! Desktop pet simulation core.
//!
//! A [`world::PetWorld`] holds the pets of one display. Each pet is a
//! `hecs` entity whose abilities (movement, gravity, wall-walking, mouse
//! chasing, random behaviors...) are capability components; the world
//! ticks them in a fixed order and exposes render snapshots.

pub mod collision;
pub mod config;
pub mod coordinator;
pub mod ecs;
pub mod error;
pub mod geometry;
pub mod input;
pub mod logging;
pub mod pet;
pub mod rng;
pub mod schedule;
pub mod spatial;
pub mod species;
pub mod world;

pub use config::{Settings, SettingsChange};
pub use coordinator::Coordinator;
pub use error::{PetError, Result};
pub use geometry::Rect;
pub use input::InputEvent;
pub use world::{PetSnapshot, PetWorld};

#[cfg(test)]
pub(crate) mod test_support {
    use glam::Vec2;

    use crate::config::Settings;
    use crate::geometry::Rect;
    use crate::species::SpeciesTable;
    use crate::world::PetWorld;

    /// 800x600 world with the built-in species and default settings.
    pub fn cat_world() -> PetWorld {
        PetWorld::new(
            Rect::new(0.0, 0.0, 800.0, 600.0),
            Settings::default(),
            SpeciesTable::builtin(),
            42,
        )
    }

    /// Spawn a cat with its frame origin at `origin`.
    pub fn spawn_cat_at(world: &mut PetWorld, origin: Vec2) -> hecs::Entity {
        world.spawn_pet("cat", origin).expect("cat is built in")
    }
}
