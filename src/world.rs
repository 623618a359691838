//! One simulated display: its pets, bounds, settings and timers.

use glam::Vec2;
use hecs::Entity;

use crate::collision::{CollisionDetector, CollisionFeed};
use crate::config::{Settings, SettingsChange};
use crate::ecs::capabilities::{
    self, drag, mouse_chaser, movement, right_click, scheduler, wall_walker, BehaviorScheduler,
    BounceFilter, Gravity, LateralBounce, MouseChaser, Sprite, WallWalker,
};
use crate::ecs::components::{
    EffectSprite, Frame, Lifecycle, Lifetime, PetId, PetState, PrevFrame, SpeciesRef,
};
use crate::ecs::{entity, systems};
use crate::error;
use crate::geometry::Rect;
use crate::input::InputEvent;
use crate::pet::{self, IdGenerator};
use crate::schedule::TaskQueue;
use crate::species::SpeciesTable;

/// Thickness of the static obstacles just outside each edge.
pub const HOTSPOT_THICKNESS: f32 = 50.0;

/// Everything a renderer needs to draw one pet.
#[derive(Debug, Clone, PartialEq)]
pub struct PetSnapshot {
    pub entity: Entity,
    pub id: String,
    pub species_id: String,
    pub frame: Rect,
    /// Frame at the start of the last tick, for interpolation.
    pub prev_frame: Rect,
    pub state: String,
    pub animation: String,
    pub frame_index: u32,
    pub loops_remaining: Option<u32>,
    pub rotation: f32,
    pub flip_h: bool,
    pub flip_v: bool,
    pub z_index: i32,
}

/// A live ephemeral effect.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectSnapshot {
    pub entity: Entity,
    pub frame: Rect,
    pub animation: String,
    pub remaining: f32,
}

pub struct PetWorld {
    pub ecs: hecs::World,
    bounds: Rect,
    pub settings: Settings,
    pub tasks: TaskQueue,
    pub rng: fastrand::Rng,
    pointer: Vec2,
    dragging: Option<Entity>,
    pub(crate) ids: IdGenerator,
    pub(crate) species: SpeciesTable,
    pub(crate) detector: CollisionDetector,
    hotspots: Vec<Entity>,
    pub(crate) tick_count: u64,
}

impl PetWorld {
    pub fn new(bounds: Rect, settings: Settings, species: SpeciesTable, seed: u64) -> Self {
        let mut world = Self {
            ecs: hecs::World::new(),
            bounds,
            settings,
            tasks: TaskQueue::new(),
            rng: fastrand::Rng::with_seed(seed),
            pointer: bounds.center(),
            dragging: None,
            ids: IdGenerator::new(),
            species,
            detector: CollisionDetector::new(),
            hotspots: Vec::with_capacity(4),
            tick_count: 0,
        };
        world.rebuild_hotspots();
        world
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Resize the world. Pets left outside are pulled back in.
    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
        self.rebuild_hotspots();
        for pet in self.pets() {
            if let Some(frame) = entity::frame(self, pet) {
                entity::set_frame(self, pet, frame.clamped_within(&bounds));
            }
        }
        log::info!("World bounds now {:.0}x{:.0}", bounds.width(), bounds.height());
    }

    fn rebuild_hotspots(&mut self) {
        for e in self.hotspots.drain(..) {
            let _ = self.ecs.despawn(e);
        }
        let b = self.bounds;
        let t = HOTSPOT_THICKNESS;
        let rects = [
            Rect::new(b.min_x() - t, b.max_y(), b.width() + 2.0 * t, t),
            Rect::new(b.min_x() - t, b.min_y() - t, b.width() + 2.0 * t, t),
            Rect::new(b.min_x() - t, b.min_y() - t, t, b.height() + 2.0 * t),
            Rect::new(b.max_x(), b.min_y() - t, t, b.height() + 2.0 * t),
        ];
        for rect in rects {
            let e = self.ecs.spawn((Frame(rect), Lifecycle::OBSTACLE));
            self.hotspots.push(e);
        }
    }

    pub fn pointer(&self) -> Vec2 {
        self.pointer
    }

    pub fn species_table(&self) -> &SpeciesTable {
        &self.species
    }

    /// Simulation time in seconds.
    pub fn time(&self) -> f64 {
        self.tasks.now()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    // -----------------------------------------------------------------------
    // Entities
    // -----------------------------------------------------------------------

    pub fn spawn_pet(&mut self, species_id: &str, origin: Vec2) -> error::Result<Entity> {
        let species = self.species.get(species_id)?;
        Ok(pet::spawn(self, species, origin))
    }

    /// Static obstacle pets can stand on and bounce off.
    pub fn spawn_obstacle(&mut self, frame: Rect) -> Entity {
        self.ecs.spawn((Frame(frame), Lifecycle::OBSTACLE))
    }

    /// Short-lived visual effect (e.g. a heart). Ignored by contact,
    /// bounce and hit tests.
    pub fn spawn_effect(&mut self, frame: Rect, animation: &str, lifetime: f32) -> Entity {
        self.ecs.spawn((
            Frame(frame),
            Lifecycle::EFFECT,
            Lifetime(lifetime.max(0.0)),
            EffectSprite(animation.to_string()),
        ))
    }

    pub fn kill(&mut self, pet: Entity) {
        if self.dragging == Some(pet) {
            self.dragging = None;
        }
        if self.ecs.get::<&PetId>(pet).is_ok() {
            entity::kill(self, pet);
        } else {
            let _ = self.ecs.despawn(pet);
        }
    }

    pub fn kill_all(&mut self) {
        for pet in self.pets() {
            self.kill(pet);
        }
    }

    /// Live pets in spawn order.
    pub fn pets(&self) -> Vec<Entity> {
        let mut pets: Vec<Entity> = self
            .ecs
            .query::<(&PetId, &Lifecycle)>()
            .iter()
            .filter(|(_, (_, life))| life.alive)
            .map(|(e, _)| e)
            .collect();
        pets.sort_by_key(|e| e.id());
        pets
    }

    pub fn pet_count(&self) -> usize {
        self.pets().len()
    }

    /// Topmost pet under `point` (highest z-index, then latest spawned).
    pub fn pet_at(&self, point: Vec2) -> Option<Entity> {
        self.ecs
            .query::<(&Frame, &Lifecycle, &SpeciesRef)>()
            .iter()
            .filter(|(_, (frame, life, _))| life.alive && !life.ephemeral && frame.0.contains(point))
            .max_by_key(|(e, (_, _, species))| (species.0.z_index, e.id()))
            .map(|(e, _)| e)
    }

    // -----------------------------------------------------------------------
    // Tick
    // -----------------------------------------------------------------------

    /// Advance the simulation by `dt` seconds using the built-in collision
    /// detector.
    pub fn tick(&mut self, dt: f32) {
        systems::tick(self, dt, None);
    }

    /// Advance using a collision feed computed by the host.
    pub fn tick_with_feed(&mut self, dt: f32, feed: CollisionFeed) {
        systems::tick(self, dt, Some(feed));
    }

    // -----------------------------------------------------------------------
    // Settings
    // -----------------------------------------------------------------------

    /// Apply a live settings change and push it to every pet.
    pub fn apply_setting(&mut self, change: SettingsChange) {
        self.settings.apply(change);
        log::info!("Setting changed: {change:?}");

        for pet in self.pets() {
            match change {
                SettingsChange::GravityEnabled(on) => {
                    let held = capabilities::has::<WallWalker>(self, pet)
                        || capabilities::has::<MouseChaser>(self, pet)
                        || scheduler::is_sleep_mode(self, pet);
                    capabilities::set_enabled::<Gravity>(self, pet, on && !held);
                    if !on && !held && entity::state(self, pet) == Some(PetState::FreeFall) {
                        entity::set_state(self, pet, PetState::Move);
                    }
                }
                SettingsChange::SpeedMultiplier(_) => {
                    if entity::state(self, pet) == Some(PetState::Move) {
                        movement::reset_speed(self, pet, false);
                    }
                }
                SettingsChange::AnimationFrequency(_) => {
                    let idle = capabilities::with::<BehaviorScheduler, _>(self, pet, |s| {
                        s.active_behavior().is_none()
                    })
                    .unwrap_or(false);
                    if idle {
                        scheduler::reschedule(self, pet);
                    }
                }
                SettingsChange::BounceOffPets(on) => {
                    capabilities::with::<LateralBounce, _>(self, pet, |b| {
                        b.set_filter(BounceFilter::for_settings(on))
                    });
                }
                SettingsChange::PetSize(_) => {
                    let Some(species) = entity::species(self, pet) else {
                        continue;
                    };
                    let side = species.sprite_size(self.settings.pet_size);
                    if let Some(frame) = entity::frame(self, pet) {
                        entity::set_frame(self, pet, frame.resized_about_center(Vec2::splat(side)));
                    }
                    if entity::state(self, pet) == Some(PetState::Move) {
                        movement::reset_speed(self, pet, false);
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    /// Route one input event. A right click on a pet returns its menu.
    pub fn handle_input(&mut self, event: InputEvent) -> Option<right_click::ContextMenu> {
        match event {
            InputEvent::PointerMoved(p) => {
                if p.is_finite() {
                    self.pointer = p;
                }
            }
            InputEvent::DragBegin(p) => {
                if let Some(pet) = self.pet_at(p) {
                    if drag::drag_begin(self, pet, p) {
                        self.dragging = Some(pet);
                    }
                }
            }
            InputEvent::DragDelta(delta) => {
                if let Some(pet) = self.dragging {
                    drag::drag_delta(self, pet, delta);
                }
            }
            InputEvent::DragEnd => {
                if let Some(pet) = self.dragging.take() {
                    drag::drag_end(self, pet);
                }
            }
            InputEvent::RightClick(p) => {
                return self.pet_at(p).and_then(|pet| right_click::right_click(self, pet, p));
            }
            InputEvent::DoubleClick(p) => {
                if let Some(pet) = self.pet_at(p) {
                    scheduler::request_behavior(self, pet);
                }
            }
            InputEvent::ToggleWallWalking(pet) => {
                if capabilities::has::<WallWalker>(self, pet) {
                    wall_walker::disable(self, pet);
                } else {
                    wall_walker::enable(self, pet, true);
                }
            }
            InputEvent::ToggleCornerTraversal(pet) => {
                if let Some(on) = capabilities::with::<WallWalker, _>(self, pet, |w| w.corner_traversal) {
                    wall_walker::set_corner_traversal(self, pet, !on);
                } else {
                    log::warn!("corner traversal toggled on {pet:?} without wall-walking");
                }
            }
            InputEvent::ToggleMouseChase(pet) => {
                if capabilities::has::<MouseChaser>(self, pet) {
                    mouse_chaser::disable(self, pet);
                } else {
                    mouse_chaser::enable(self, pet);
                }
            }
            InputEvent::ToggleSleepMode(pet) => {
                let on = scheduler::is_sleep_mode(self, pet);
                scheduler::set_sleep_mode(self, pet, !on);
            }
            InputEvent::PlayAnimation {
                pet,
                animation,
                loops,
            } => {
                right_click::play_animation(self, pet, &animation, loops);
            }
        }
        None
    }

    // -----------------------------------------------------------------------
    // Output
    // -----------------------------------------------------------------------

    /// Render state of every live pet, back to front.
    pub fn snapshots(&self) -> Vec<PetSnapshot> {
        let mut out: Vec<PetSnapshot> = self
            .ecs
            .query::<(&PetId, &Frame, &PrevFrame, &PetState, &SpeciesRef, &Lifecycle, &Sprite)>()
            .iter()
            .filter(|(_, (.., life, _))| life.alive)
            .map(|(e, (id, frame, prev, state, species, _, sprite))| PetSnapshot {
                entity: e,
                id: id.0.clone(),
                species_id: species.0.id.clone(),
                frame: frame.0,
                prev_frame: prev.0,
                state: state.label().to_string(),
                animation: sprite.animation.clone(),
                frame_index: sprite.frame_index,
                loops_remaining: match state {
                    PetState::Action {
                        loops_remaining, ..
                    } => Some(*loops_remaining),
                    _ => None,
                },
                rotation: sprite.rotation,
                flip_h: sprite.flip_h,
                flip_v: sprite.flip_v,
                z_index: species.0.z_index,
            })
            .collect();
        out.sort_by_key(|s| (s.z_index, s.entity.id()));
        out
    }

    pub fn effects(&self) -> Vec<EffectSnapshot> {
        self.ecs
            .query::<(&Frame, &Lifetime, &EffectSprite)>()
            .iter()
            .map(|(e, (frame, life, sprite))| EffectSnapshot {
                entity: e,
                frame: frame.0,
                animation: sprite.0.clone(),
                remaining: life.0,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cat_world, spawn_cat_at};

    #[test]
    fn hotspots_sit_outside_bounds() {
        let world = cat_world();
        let feed = CollisionDetector::new().detect(&world.ecs);
        assert!(feed.is_empty());
        assert_eq!(world.hotspots.len(), 4);
        for &h in &world.hotspots {
            let frame = world.ecs.get::<&Frame>(h).unwrap().0;
            assert!(!frame.intersects(&world.bounds()));
        }
    }

    #[test]
    fn topmost_pet_wins_hit_test() {
        let mut world = cat_world();
        let cat = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        let ape = world.spawn_pet("ape", Vec2::new(110.0, 110.0)).unwrap();
        let later_cat = spawn_cat_at(&mut world, Vec2::new(105.0, 105.0));
        assert_eq!(world.pet_at(Vec2::new(120.0, 120.0)), Some(ape));
        assert_eq!(world.pet_at(Vec2::new(102.0, 102.0)), Some(cat));
        assert_eq!(world.pet_at(Vec2::new(152.0, 107.0)), Some(later_cat));
        assert_eq!(world.pet_at(Vec2::new(700.0, 500.0)), None);
    }

    #[test]
    fn effects_expire() {
        let mut world = cat_world();
        world.spawn_effect(Rect::new(10.0, 10.0, 20.0, 20.0), "heart", 0.5);
        assert_eq!(world.effects().len(), 1);
        for _ in 0..40 {
            world.tick(1.0 / 60.0);
        }
        assert!(world.effects().is_empty());
    }

    #[test]
    fn drag_through_input_events() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        world.handle_input(InputEvent::DragBegin(Vec2::new(110.0, 110.0)));
        assert_eq!(entity::state(&world, pet), Some(PetState::Drag));
        world.handle_input(InputEvent::DragDelta(Vec2::new(10.0, 0.0)));
        world.handle_input(InputEvent::DragEnd);
        assert_eq!(entity::state(&world, pet), Some(PetState::FreeFall));
        assert_eq!(entity::frame(&world, pet).unwrap().min_x(), 110.0);
    }

    #[test]
    fn right_click_returns_menu() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        let menu = world.handle_input(InputEvent::RightClick(Vec2::new(110.0, 110.0)));
        assert_eq!(menu.map(|m| m.pet), Some(pet));
        assert!(world.handle_input(InputEvent::RightClick(Vec2::new(700.0, 10.0))).is_none());
    }

    #[test]
    fn gravity_setting_reaches_pets() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        world.tick(1.0 / 60.0);
        assert_eq!(entity::state(&world, pet), Some(PetState::FreeFall));
        world.apply_setting(SettingsChange::GravityEnabled(false));
        assert!(!capabilities::is_enabled::<Gravity>(&world, pet));
        assert_eq!(entity::state(&world, pet), Some(PetState::Move));
    }

    #[test]
    fn snapshots_follow_state() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        entity::set_state(&mut world, pet, PetState::action("eat", 3));
        let snap = world.snapshots();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].id, "cat-1");
        assert_eq!(snap[0].animation, "eat");
        assert_eq!(snap[0].loops_remaining, Some(3));
    }

    #[test]
    fn killing_a_pet_cancels_its_timers() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        assert!(world.tasks.pending_for(pet) > 0);
        world.kill(pet);
        assert_eq!(world.tasks.pending_for(pet), 0);
        assert_eq!(world.pet_count(), 0);
        for _ in 0..10 {
            world.tick(1.0 / 60.0);
        }
    }
}
