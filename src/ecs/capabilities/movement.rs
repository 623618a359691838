use hecs::Entity;

use super::{Capability, CapabilityKind};
use crate::collision::Collision;
use crate::ecs::capabilities::{self, mouse_chaser, wall_walker, MouseChaser};
use crate::ecs::components::PetState;
use crate::ecs::entity;
use crate::schedule::Task;
use crate::world::PetWorld;

/// Random speed spread applied on every return to `Move` (±10%).
const SPEED_JITTER: f32 = 0.1;
/// Chance a return to `Move` starts a speed burst.
const BURST_CHANCE: f32 = 0.075;
/// Speed multiplier during a burst.
const BURST_MULTIPLIER: f32 = 2.0;
/// Burst length in seconds.
const BURST_SECONDS: f64 = 3.0;
/// Fall speed relative to the pet's base speed.
const FALL_SPEED_FACTOR: f32 = 4.0;
/// Floor on the fall speed (px/s) so slow species still drop.
const MIN_FALL_SPEED: f32 = 80.0;

/// Linear locomotion: `origin += direction * speed * dt` while moving or
/// falling.
#[derive(Debug, Clone)]
pub struct Movement {
    enabled: bool,
    token: u64,
    /// Deadline of the running speed burst.
    burst_until: Option<f64>,
}

impl Movement {
    pub fn new() -> Self {
        Self {
            enabled: true,
            token: 0,
            burst_until: None,
        }
    }

    pub fn is_bursting(&self) -> bool {
        self.burst_until.is_some()
    }
}

impl Default for Movement {
    fn default() -> Self {
        Self::new()
    }
}

impl Capability for Movement {
    const KIND: CapabilityKind = CapabilityKind::Movement;
    const OBSERVES_STATE: bool = true;

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
        reset_speed(world, entity, false);
    }

    fn update(world: &mut PetWorld, entity: Entity, _collisions: &[Collision], dt: f32) {
        let moving = matches!(
            entity::state(world, entity),
            Some(PetState::Move | PetState::FreeFall)
        );
        if !moving || wall_walker::is_transitioning(world, entity) {
            return;
        }
        let (Some(dir), Some(speed)) = (entity::direction(world, entity), entity::speed(world, entity)) else {
            return;
        };
        let step = dir * speed * dt;
        if !step.is_finite() {
            return;
        }
        if let Some(frame) = entity::frame(world, entity) {
            let bounds = world.bounds();
            entity::set_frame(world, entity, frame.translated(step).clamped_within(&bounds));
        }
    }

    fn on_state_changed(world: &mut PetWorld, entity: Entity, _old: &PetState, new: &PetState) {
        match new {
            PetState::Move => reset_speed(world, entity, true),
            PetState::FreeFall => {
                let fall = (base_speed(world, entity) * FALL_SPEED_FACTOR).max(MIN_FALL_SPEED);
                entity::set_speed(world, entity, fall);
            }
            PetState::Drag | PetState::Action { .. } => {}
        }
    }
}

/// Walking speed before jitter: species speed, pet size, the global
/// multiplier and the mouse-chase boost.
pub fn base_speed(world: &PetWorld, entity: Entity) -> f32 {
    let Some(species) = entity::species(world, entity) else {
        return 0.0;
    };
    let mut speed = species.speed * world.settings.pet_size * world.settings.speed_multiplier;
    if capabilities::is_enabled::<MouseChaser>(world, entity) {
        speed *= mouse_chaser::SPEED_MULTIPLIER;
    }
    speed.max(0.0)
}

/// Re-apply walking speed with ±10% jitter; optionally roll for a
/// temporary 2× burst.
pub fn reset_speed(world: &mut PetWorld, entity: Entity, allow_burst: bool) {
    let base = base_speed(world, entity);
    let jitter = 1.0 + (world.rng.f32() * 2.0 - 1.0) * SPEED_JITTER;
    let burst = allow_burst && world.rng.f32() < BURST_CHANCE;
    let speed = if burst {
        base * jitter * BURST_MULTIPLIER
    } else {
        base * jitter
    };
    entity::set_speed(world, entity, speed);

    let now = world.tasks.now();
    let token = capabilities::with::<Movement, _>(world, entity, |m| {
        m.burst_until = burst.then_some(now + BURST_SECONDS);
        m.token
    });
    if let (true, Some(token)) = (burst, token) {
        log::trace!("{entity:?} speed burst");
        world
            .tasks
            .schedule(BURST_SECONDS, entity, token, Task::SpeedBurstEnd);
    }
}

/// Timer callback: a speed burst ran out.
pub fn on_burst_end(world: &mut PetWorld, entity: Entity, token: u64) {
    if !capabilities::is_current::<Movement>(world, entity, token) {
        return;
    }
    let now = world.tasks.now();
    let expired = capabilities::with::<Movement, _>(world, entity, |m| match m.burst_until {
        Some(until) if now + 1e-6 >= until => {
            m.burst_until = None;
            true
        }
        _ => false,
    })
    .unwrap_or(false);
    if expired && entity::state(world, entity) == Some(PetState::Move) {
        reset_speed(world, entity, false);
    }
}
