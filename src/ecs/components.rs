use std::sync::Arc;

use glam::Vec2;

use crate::ecs::capabilities::CapabilityKind;
use crate::geometry::Rect;
use crate::species::Species;

/// Unique pet id, e.g. `cat-3`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PetId(pub String);

/// Position and size in world pixels.
#[derive(Debug, Clone, Copy)]
pub struct Frame(pub Rect);

/// Previous tick's frame, for render interpolation.
#[derive(Debug, Clone, Copy)]
pub struct PrevFrame(pub Rect);

/// Heading. Unit length whenever the pet is moving.
#[derive(Debug, Clone, Copy)]
pub struct Direction(pub Vec2);

/// Speed in pixels/second. Never negative.
#[derive(Debug, Clone, Copy)]
pub struct Speed(f32);

impl Speed {
    pub fn new(v: f32) -> Self {
        Self(if v.is_finite() { v.max(0.0) } else { 0.0 })
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

/// Current pet state. Exactly one at a time; change it through
/// [`crate::ecs::entity::set_state`] so subscribers get notified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PetState {
    Move,
    FreeFall,
    Drag,
    Action {
        animation: String,
        loops_remaining: u32,
    },
}

impl PetState {
    pub fn action(animation: impl Into<String>, loops: u32) -> Self {
        PetState::Action {
            animation: animation.into(),
            loops_remaining: loops,
        }
    }

    pub fn is_action(&self) -> bool {
        matches!(self, PetState::Action { .. })
    }

    pub fn action_id(&self) -> Option<&str> {
        match self {
            PetState::Action { animation, .. } => Some(animation),
            _ => None,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PetState::Move => "move",
            PetState::FreeFall => "freeFall",
            PetState::Drag => "drag",
            PetState::Action { animation, .. } => animation,
        }
    }
}

/// Shared read-only species descriptor.
#[derive(Debug, Clone)]
pub struct SpeciesRef(pub Arc<Species>);

/// Lifecycle flags.
#[derive(Debug, Clone, Copy)]
pub struct Lifecycle {
    pub alive: bool,
    /// Transient visual effect; skipped by contact, bounce and hit tests.
    pub ephemeral: bool,
    /// Immovable obstacle (boundary hotspots, platforms).
    pub is_static: bool,
}

impl Lifecycle {
    pub const PET: Lifecycle = Lifecycle {
        alive: true,
        ephemeral: false,
        is_static: false,
    };
    pub const OBSTACLE: Lifecycle = Lifecycle {
        alive: true,
        ephemeral: false,
        is_static: true,
    };
    pub const EFFECT: Lifecycle = Lifecycle {
        alive: true,
        ephemeral: true,
        is_static: false,
    };
}

/// Seconds left before an ephemeral entity is removed.
#[derive(Debug, Clone, Copy)]
pub struct Lifetime(pub f32);

/// Capabilities that want synchronous state-change callbacks, in
/// registration order.
#[derive(Debug, Clone, Default)]
pub struct StateSubscribers(pub Vec<CapabilityKind>);

/// Animation shown by an ephemeral effect entity.
#[derive(Debug, Clone)]
pub struct EffectSprite(pub String);
