//! Capabilities: behavior units attached to a pet as `hecs` components.
//!
//! Each capability type implements [`Capability`]. Hooks are associated
//! functions taking the world and the subject entity rather than `&mut self`,
//! so a hook can freely touch other components (and other capabilities) of
//! the same pet. Hooks must not hold a component borrow across calls that
//! may re-enter, such as [`crate::ecs::entity::set_state`].

pub mod bounce;
pub mod drag;
pub mod gravity;
pub mod mouse_chaser;
pub mod movement;
pub mod right_click;
pub mod rotation;
pub mod scheduler;
pub mod seeker;
pub mod sprite;
pub mod wall_walker;

use hecs::Entity;

use crate::collision::Collision;
use crate::ecs::components::{PetState, StateSubscribers};
use crate::ecs::entity;
use crate::world::PetWorld;

pub use bounce::{BounceFilter, LateralBounce};
pub use drag::Draggable;
pub use gravity::Gravity;
pub use mouse_chaser::MouseChaser;
pub use movement::Movement;
pub use right_click::RightClickHandler;
pub use rotation::Rotation;
pub use scheduler::BehaviorScheduler;
pub use seeker::Seeker;
pub use sprite::Sprite;
pub use wall_walker::WallWalker;

/// Closed set of capability variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CapabilityKind {
    Drag,
    Seeker,
    MouseChaser,
    WallWalker,
    Gravity,
    Bounce,
    Movement,
    Rotation,
    Sprite,
    Scheduler,
    RightClick,
}

impl CapabilityKind {
    /// Per-tick update order.
    pub const UPDATE_ORDER: [CapabilityKind; 11] = [
        Self::Drag,
        Self::Seeker,
        Self::MouseChaser,
        Self::WallWalker,
        Self::Gravity,
        Self::Bounce,
        Self::Movement,
        Self::Rotation,
        Self::Sprite,
        Self::Scheduler,
        Self::RightClick,
    ];
}

/// Common contract for every capability.
pub trait Capability: hecs::Component + Sized {
    const KIND: CapabilityKind;
    /// Register for synchronous state-change callbacks on install.
    const OBSERVES_STATE: bool = false;

    fn token(&self) -> u64;
    fn set_token(&mut self, token: u64);
    fn is_enabled(&self) -> bool;
    fn set_enabled(&mut self, enabled: bool);

    /// Runs right after the component is inserted.
    fn on_install(_world: &mut PetWorld, _entity: Entity) {}

    /// Runs right before the component is removed.
    fn on_kill(_world: &mut PetWorld, _entity: Entity) {}

    /// Per-tick hook. Only called while installed and enabled.
    fn update(_world: &mut PetWorld, _entity: Entity, _collisions: &[Collision], _dt: f32) {}

    fn on_state_changed(_world: &mut PetWorld, _entity: Entity, _old: &PetState, _new: &PetState) {}
}

pub fn has<C: Capability>(world: &PetWorld, entity: Entity) -> bool {
    world.ecs.get::<&C>(entity).is_ok()
}

pub fn is_enabled<C: Capability>(world: &PetWorld, entity: Entity) -> bool {
    world
        .ecs
        .get::<&C>(entity)
        .map(|c| c.is_enabled())
        .unwrap_or(false)
}

/// Enable or disable an installed capability. No-op when missing.
pub fn set_enabled<C: Capability>(world: &PetWorld, entity: Entity, enabled: bool) {
    if let Ok(mut cap) = world.ecs.get::<&mut C>(entity) {
        cap.set_enabled(enabled);
    }
}

pub fn token_of<C: Capability>(world: &PetWorld, entity: Entity) -> Option<u64> {
    world.ecs.get::<&C>(entity).ok().map(|c| c.token())
}

/// True when a deferred callback issued under `token` may still act:
/// the pet is alive and the same capability instance is installed.
pub fn is_current<C: Capability>(world: &PetWorld, entity: Entity, token: u64) -> bool {
    entity::is_alive(world, entity) && token_of::<C>(world, entity) == Some(token)
}

/// Run `f` against the installed capability. The borrow ends before
/// this returns.
pub fn with<C: Capability, R>(world: &PetWorld, entity: Entity, f: impl FnOnce(&mut C) -> R) -> Option<R> {
    let mut cap = world.ecs.get::<&mut C>(entity).ok()?;
    Some(f(&mut cap))
}

/// Install `cap` on `entity`, replacing (killing) an existing instance of
/// the same type. Returns false if the pet is dead or missing.
pub fn install<C: Capability>(world: &mut PetWorld, entity: Entity, mut cap: C) -> bool {
    if !entity::is_alive(world, entity) {
        log::debug!("install {:?} on dead entity {entity:?} ignored", C::KIND);
        return false;
    }
    if has::<C>(world, entity) {
        kill::<C>(world, entity);
    }
    cap.set_token(world.tasks.issue_token());
    if world.ecs.insert_one(entity, cap).is_err() {
        return false;
    }
    if C::OBSERVES_STATE {
        if let Ok(mut subs) = world.ecs.get::<&mut StateSubscribers>(entity) {
            if !subs.0.contains(&C::KIND) {
                subs.0.push(C::KIND);
            }
        }
    }
    log::trace!("installed {:?} on {entity:?}", C::KIND);
    C::on_install(world, entity);
    true
}

/// Kill an installed capability: run its teardown, cancel its timers and
/// detach it. Returns false if it was not installed.
pub fn kill<C: Capability>(world: &mut PetWorld, entity: Entity) -> bool {
    if !has::<C>(world, entity) {
        return false;
    }
    C::on_kill(world, entity);
    if let Ok(mut subs) = world.ecs.get::<&mut StateSubscribers>(entity) {
        subs.0.retain(|k| *k != C::KIND);
    }
    match world.ecs.remove_one::<C>(entity) {
        Ok(cap) => {
            world.tasks.cancel_token(cap.token());
            log::trace!("killed {:?} on {entity:?}", C::KIND);
            true
        }
        Err(_) => false,
    }
}

/// Kill every capability on the pet.
pub fn kill_all(world: &mut PetWorld, entity: Entity) {
    for kind in CapabilityKind::UPDATE_ORDER {
        match kind {
            CapabilityKind::Drag => kill::<Draggable>(world, entity),
            CapabilityKind::Seeker => kill::<Seeker>(world, entity),
            CapabilityKind::MouseChaser => kill::<MouseChaser>(world, entity),
            CapabilityKind::WallWalker => kill::<WallWalker>(world, entity),
            CapabilityKind::Gravity => kill::<Gravity>(world, entity),
            CapabilityKind::Bounce => kill::<LateralBounce>(world, entity),
            CapabilityKind::Movement => kill::<Movement>(world, entity),
            CapabilityKind::Rotation => kill::<Rotation>(world, entity),
            CapabilityKind::Sprite => kill::<Sprite>(world, entity),
            CapabilityKind::Scheduler => kill::<BehaviorScheduler>(world, entity),
            CapabilityKind::RightClick => kill::<RightClickHandler>(world, entity),
        };
    }
}

fn run<C: Capability>(world: &mut PetWorld, entity: Entity, collisions: &[Collision], dt: f32) {
    // Earlier capabilities may have killed this one or the pet.
    if entity::is_alive(world, entity) && is_enabled::<C>(world, entity) {
        C::update(world, entity, collisions, dt);
    }
}

/// Dispatch one tick to every installed capability in fixed order.
pub fn update_all(world: &mut PetWorld, entity: Entity, collisions: &[Collision], dt: f32) {
    for kind in CapabilityKind::UPDATE_ORDER {
        match kind {
            CapabilityKind::Drag => run::<Draggable>(world, entity, collisions, dt),
            CapabilityKind::Seeker => run::<Seeker>(world, entity, collisions, dt),
            CapabilityKind::MouseChaser => run::<MouseChaser>(world, entity, collisions, dt),
            CapabilityKind::WallWalker => run::<WallWalker>(world, entity, collisions, dt),
            CapabilityKind::Gravity => run::<Gravity>(world, entity, collisions, dt),
            CapabilityKind::Bounce => run::<LateralBounce>(world, entity, collisions, dt),
            CapabilityKind::Movement => run::<Movement>(world, entity, collisions, dt),
            CapabilityKind::Rotation => run::<Rotation>(world, entity, collisions, dt),
            CapabilityKind::Sprite => run::<Sprite>(world, entity, collisions, dt),
            CapabilityKind::Scheduler => run::<BehaviorScheduler>(world, entity, collisions, dt),
            CapabilityKind::RightClick => run::<RightClickHandler>(world, entity, collisions, dt),
        }
    }
}

/// Synchronously notify subscribed capabilities of a state change, in
/// subscription order.
pub fn notify_state_changed(world: &mut PetWorld, entity: Entity, old: &PetState, new: &PetState) {
    let kinds = match world.ecs.get::<&StateSubscribers>(entity) {
        Ok(subs) => subs.0.clone(),
        Err(_) => return,
    };
    for kind in kinds {
        // A previous subscriber may have moved the pet on again; callbacks
        // only see transitions that are still current.
        if entity::state(world, entity).as_ref() != Some(new) {
            break;
        }
        match kind {
            CapabilityKind::Movement => Movement::on_state_changed(world, entity, old, new),
            CapabilityKind::Scheduler => BehaviorScheduler::on_state_changed(world, entity, old, new),
            CapabilityKind::Sprite => Sprite::on_state_changed(world, entity, old, new),
            CapabilityKind::WallWalker => WallWalker::on_state_changed(world, entity, old, new),
            CapabilityKind::Drag
            | CapabilityKind::Gravity
            | CapabilityKind::Seeker
            | CapabilityKind::MouseChaser
            | CapabilityKind::Bounce
            | CapabilityKind::Rotation
            | CapabilityKind::RightClick => {}
        }
    }
}
