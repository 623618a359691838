use glam::Vec2;
use hecs::Entity;

use super::{scheduler, Capability, CapabilityKind, MouseChaser, WallWalker};
use crate::ecs::capabilities;
use crate::ecs::components::PetState;
use crate::ecs::entity;
use crate::world::PetWorld;

/// What a context menu for a pet needs to show.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextMenu {
    pub pet: Entity,
    pub pet_id: String,
    pub species_id: String,
    /// Animations the user may play on demand.
    pub animations: Vec<String>,
    pub wall_walking: bool,
    pub corner_traversal: bool,
    pub mouse_chase: bool,
    pub sleeping: bool,
    /// Where the click landed.
    pub point: Vec2,
}

/// Opens the per-pet context menu.
#[derive(Debug, Clone)]
pub struct RightClickHandler {
    enabled: bool,
    token: u64,
}

impl RightClickHandler {
    pub fn new() -> Self {
        Self {
            enabled: true,
            token: 0,
        }
    }
}

impl Default for RightClickHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// Menu contents for `entity`, or `None` if it does not take right clicks.
pub fn right_click(world: &PetWorld, entity: Entity, point: Vec2) -> Option<ContextMenu> {
    if !capabilities::is_enabled::<RightClickHandler>(world, entity) {
        return None;
    }
    let species = entity::species(world, entity)?;
    let corner_traversal =
        capabilities::with::<WallWalker, _>(world, entity, |w| w.corner_traversal).unwrap_or(false);
    Some(ContextMenu {
        pet: entity,
        pet_id: entity::id(world, entity)?,
        species_id: species.id.clone(),
        animations: species
            .animation_ids()
            .filter(|id| !matches!(*id, "walk" | "fall" | "drag"))
            .map(str::to_string)
            .collect(),
        wall_walking: capabilities::is_enabled::<WallWalker>(world, entity),
        corner_traversal,
        mouse_chase: capabilities::is_enabled::<MouseChaser>(world, entity),
        sleeping: scheduler::is_sleep_mode(world, entity),
        point,
    })
}

/// Play an animation picked from the menu. Unknown ids are ignored.
pub fn play_animation(world: &mut PetWorld, entity: Entity, animation: &str, loops: u32) -> bool {
    if entity::state(world, entity) == Some(PetState::Drag) {
        return false;
    }
    entity::set_state(world, entity, PetState::action(animation, loops.max(1)))
}

impl Capability for RightClickHandler {
    const KIND: CapabilityKind = CapabilityKind::RightClick;

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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cat_world, spawn_cat_at};

    #[test]
    fn menu_lists_playable_animations_and_toggles() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        let menu = right_click(&world, pet, Vec2::new(110.0, 110.0)).unwrap();
        assert_eq!(menu.species_id, "cat");
        assert!(menu.animations.iter().any(|a| a == "eat"));
        assert!(!menu.animations.iter().any(|a| a == "walk"));
        assert!(!menu.wall_walking && !menu.mouse_chase && !menu.sleeping);

        capabilities::set_enabled::<RightClickHandler>(&world, pet, false);
        assert!(right_click(&world, pet, Vec2::ZERO).is_none());
    }

    #[test]
    fn play_animation_is_validated() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        assert!(!play_animation(&mut world, pet, "dance", 2));
        assert_eq!(entity::state(&world, pet), Some(PetState::Move));
        assert!(play_animation(&mut world, pet, "eat", 2));
        assert_eq!(entity::state(&world, pet), Some(PetState::action("eat", 2)));
    }
}
