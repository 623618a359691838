use std::collections::BTreeMap;

use glam::Vec2;

use crate::config::{Settings, SettingsChange};
use crate::error::{PetError, Result};
use crate::geometry::Rect;
use crate::species::SpeciesTable;
use crate::world::{PetSnapshot, PetWorld};

/// Host display id.
pub type DisplayId = u32;

struct Display {
    world: PetWorld,
    visible: bool,
}

/// One [`PetWorld`] per display, sharing settings and species.
pub struct Coordinator {
    displays: BTreeMap<DisplayId, Display>,
    settings: Settings,
    species: SpeciesTable,
    seed: u64,
}

impl Coordinator {
    pub fn new(settings: Settings, species: SpeciesTable, seed: u64) -> Self {
        Self {
            displays: BTreeMap::new(),
            settings,
            species,
            seed,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Add a display, or update its bounds if it already exists.
    pub fn add_display(&mut self, id: DisplayId, bounds: Rect) {
        if let Some(display) = self.displays.get_mut(&id) {
            display.world.set_bounds(bounds);
            return;
        }
        let seed = self.seed.wrapping_add(u64::from(id));
        let world = PetWorld::new(bounds, self.settings, self.species.clone(), seed);
        self.displays.insert(id, Display { world, visible: true });
        log::info!("Display {id} added ({:.0}x{:.0})", bounds.width(), bounds.height());
    }

    /// Drop a display along with its pets.
    pub fn remove_display(&mut self, id: DisplayId) -> bool {
        match self.displays.remove(&id) {
            Some(mut display) => {
                display.world.kill_all();
                log::info!("Display {id} removed");
                true
            }
            None => false,
        }
    }

    pub fn display_ids(&self) -> Vec<DisplayId> {
        self.displays.keys().copied().collect()
    }

    pub fn world(&self, id: DisplayId) -> Option<&PetWorld> {
        self.displays.get(&id).map(|d| &d.world)
    }

    pub fn world_mut(&mut self, id: DisplayId) -> Option<&mut PetWorld> {
        self.displays.get_mut(&id).map(|d| &mut d.world)
    }

    pub fn spawn(&mut self, display: DisplayId, species_id: &str, origin: Vec2) -> Result<hecs::Entity> {
        let world = self
            .world_mut(display)
            .ok_or(PetError::UnknownDisplay(display))?;
        world.spawn_pet(species_id, origin)
    }

    pub fn show_all(&mut self) {
        for display in self.displays.values_mut() {
            display.visible = true;
        }
    }

    /// Hidden displays neither tick nor produce snapshots.
    pub fn hide_all(&mut self) {
        for display in self.displays.values_mut() {
            display.visible = false;
        }
    }

    pub fn is_visible(&self, id: DisplayId) -> bool {
        self.displays.get(&id).is_some_and(|d| d.visible)
    }

    /// Remove every pet on every display.
    pub fn remove_all(&mut self) {
        for display in self.displays.values_mut() {
            display.world.kill_all();
        }
    }

    pub fn pet_count(&self) -> usize {
        self.displays.values().map(|d| d.world.pet_count()).sum()
    }

    pub fn apply_setting(&mut self, change: SettingsChange) {
        self.settings.apply(change);
        for display in self.displays.values_mut() {
            display.world.apply_setting(change);
        }
    }

    pub fn tick_all(&mut self, dt: f32) {
        for display in self.displays.values_mut().filter(|d| d.visible) {
            display.world.tick(dt);
        }
    }

    pub fn snapshots(&self, id: DisplayId) -> Vec<PetSnapshot> {
        match self.displays.get(&id) {
            Some(d) if d.visible => d.world.snapshots(),
            _ => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn coordinator() -> Coordinator {
        let mut c = Coordinator::new(Settings::default(), SpeciesTable::builtin(), 1);
        c.add_display(1, Rect::new(0.0, 0.0, 800.0, 600.0));
        c.add_display(2, Rect::new(800.0, 0.0, 1024.0, 768.0));
        c
    }

    #[test]
    fn spawn_targets_display() {
        let mut c = coordinator();
        c.spawn(2, "cat", Vec2::new(900.0, 100.0)).unwrap();
        assert_eq!(c.world(1).unwrap().pet_count(), 0);
        assert_eq!(c.world(2).unwrap().pet_count(), 1);
        assert!(matches!(
            c.spawn(9, "cat", Vec2::ZERO),
            Err(PetError::UnknownDisplay(9))
        ));
    }

    #[test]
    fn hidden_displays_freeze() {
        let mut c = coordinator();
        c.spawn(1, "cat", Vec2::new(100.0, 100.0)).unwrap();
        c.hide_all();
        c.tick_all(1.0 / 60.0);
        assert_eq!(c.world(1).unwrap().tick_count(), 0);
        assert!(c.snapshots(1).is_empty());

        c.show_all();
        c.tick_all(1.0 / 60.0);
        assert_eq!(c.world(1).unwrap().tick_count(), 1);
        assert_eq!(c.snapshots(1).len(), 1);
    }

    #[test]
    fn settings_fan_out() {
        let mut c = coordinator();
        c.apply_setting(SettingsChange::SpeedMultiplier(2.0));
        assert_eq!(c.settings().speed_multiplier, 2.0);
        assert_eq!(c.world(2).unwrap().settings.speed_multiplier, 2.0);
    }

    #[test]
    fn remove_all_and_remove_display() {
        let mut c = coordinator();
        c.spawn(1, "cat", Vec2::new(100.0, 100.0)).unwrap();
        c.spawn(2, "ape", Vec2::new(900.0, 100.0)).unwrap();
        assert_eq!(c.pet_count(), 2);
        c.remove_all();
        assert_eq!(c.pet_count(), 0);
        assert!(c.remove_display(2));
        assert!(!c.remove_display(2));
        assert_eq!(c.display_ids(), vec![1]);
    }
}
