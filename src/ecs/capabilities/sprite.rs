use hecs::Entity;

use super::{Capability, CapabilityKind};
use crate::collision::Collision;
use crate::ecs::components::PetState;
use crate::ecs::entity;
use crate::world::PetWorld;

/// Sprite playback rate (frames/second).
pub const ANIMATION_FPS: f32 = 10.0;

/// Animation provider: picks the sprite animation for the current state,
/// advances its frames and counts down action loops. Also holds the sprite
/// transform written by the rotation and wall-walking capabilities.
#[derive(Debug, Clone)]
pub struct Sprite {
    enabled: bool,
    token: u64,
    pub animation: String,
    pub frame_index: u32,
    elapsed: f32,
    /// Radians, applied around the sprite center.
    pub rotation: f32,
    pub flip_h: bool,
    pub flip_v: bool,
    /// Overrides the walking animation (e.g. `idle` while a seeker has
    /// captured its target).
    pub pose: Option<String>,
}

impl Sprite {
    pub fn new() -> Self {
        Self {
            enabled: true,
            token: 0,
            animation: "walk".to_string(),
            frame_index: 0,
            elapsed: 0.0,
            rotation: 0.0,
            flip_h: false,
            flip_v: false,
            pose: None,
        }
    }
}

impl Default for Sprite {
    fn default() -> Self {
        Self::new()
    }
}

/// Animation id shown for a state.
pub fn animation_for(state: &PetState, pose: Option<&str>) -> String {
    match state {
        PetState::Move => pose.unwrap_or("walk").to_string(),
        PetState::FreeFall => "fall".to_string(),
        PetState::Drag => "drag".to_string(),
        PetState::Action { animation, .. } => animation.clone(),
    }
}

/// Set or clear the walking pose override.
pub fn set_pose(world: &PetWorld, entity: Entity, pose: Option<&str>) {
    let supported = match pose {
        Some(id) => entity::species(world, entity)
            .map(|s| s.has_animation(id))
            .unwrap_or(false),
        None => true,
    };
    if !supported {
        return;
    }
    super::with::<Sprite, _>(world, entity, |s| s.pose = pose.map(str::to_string));
}

impl Capability for Sprite {
    const KIND: CapabilityKind = CapabilityKind::Sprite;
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
        if let Some(state) = entity::state(world, entity) {
            super::with::<Sprite, _>(world, entity, |s| {
                s.animation = animation_for(&state, s.pose.as_deref());
            });
        }
    }

    fn update(world: &mut PetWorld, entity: Entity, _collisions: &[Collision], dt: f32) {
        let Some(state) = entity::state(world, entity) else {
            return;
        };
        let frame_count = |anim: &str| {
            entity::species(world, entity)
                .and_then(|s| s.animation(anim).map(|a| a.frame_count))
                .unwrap_or(1)
                .max(1)
        };

        let (animation, wraps) = {
            let Ok(mut sprite) = world.ecs.get::<&mut Sprite>(entity) else {
                return;
            };
            let wanted = animation_for(&state, sprite.pose.as_deref());
            if wanted != sprite.animation {
                sprite.animation = wanted;
                sprite.frame_index = 0;
                sprite.elapsed = 0.0;
            }
            sprite.elapsed += dt;
            let mut ticks = 0u32;
            let step = 1.0 / ANIMATION_FPS;
            while sprite.elapsed >= step {
                sprite.elapsed -= step;
                ticks += 1;
            }
            (sprite.animation.clone(), ticks)
        };
        if wraps == 0 {
            return;
        }

        let frames = frame_count(&animation);
        let mut finished = false;
        let mut loops_done = 0;
        if let Ok(mut sprite) = world.ecs.get::<&mut Sprite>(entity) {
            for _ in 0..wraps {
                sprite.frame_index += 1;
                if sprite.frame_index >= frames {
                    sprite.frame_index = 0;
                    loops_done += 1;
                }
            }
        }
        if state.is_action() {
            for _ in 0..loops_done {
                if entity::consume_action_loop(world, entity) == Some(0) {
                    finished = true;
                    break;
                }
            }
        }
        if finished {
            log::debug!("{entity:?} finished `{animation}`");
            entity::set_state(world, entity, PetState::Move);
        }
    }

    fn on_state_changed(world: &mut PetWorld, entity: Entity, _old: &PetState, new: &PetState) {
        super::with::<Sprite, _>(world, entity, |s| {
            s.animation = animation_for(new, s.pose.as_deref());
            s.frame_index = 0;
            s.elapsed = 0.0;
        });
    }
}
