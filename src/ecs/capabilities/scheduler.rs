//! Random idle behaviors: every so often a walking pet stops to sleep, eat,
//! idle or look at the viewer, then walks on.

use glam::Vec2;
use hecs::Entity;

use super::{movement, Capability, CapabilityKind, Gravity, MouseChaser, Movement, WallWalker};
use crate::ecs::capabilities;
use crate::ecs::components::PetState;
use crate::ecs::entity;
use crate::rng::PetRng;
use crate::schedule::Task;
use crate::species::Species;
use crate::world::PetWorld;

// ---------------------------------------------------------------------------
// Tuning
// ---------------------------------------------------------------------------

/// Mean delay between behavior attempts (seconds).
pub const BASE_INTERVAL: f64 = 30.0;
/// Uniform spread around [`BASE_INTERVAL`].
pub const INTERVAL_JITTER: f64 = 10.0;
/// Lower clamp on the animation frequency multiplier.
pub const MIN_FREQUENCY: f32 = 0.25;
/// A pet walks at least this long between two behaviors (seconds).
pub const MIN_MOVEMENT_TIME: f64 = 8.0;
/// Chance a due attempt is skipped in favor of walking on.
pub const SKIP_PROBABILITY: f32 = 0.6;
/// No new behavior this soon after the previous one ended (seconds).
pub const COOLDOWN: f64 = 10.0;
/// After this long without a behavior the skip roll is bypassed.
pub const FORCED_AFTER: f64 = 120.0;
/// Retry delay when the pet is not in a state to start a behavior.
pub const INELIGIBLE_RETRY: f64 = 2.0;
/// Max vertical drift (px) between checks for the pet to count as settled.
pub const STABILITY_THRESHOLD: f32 = 1.0;
/// Weight factor for repeating the previous behavior.
pub const REPEAT_PENALTY: f32 = 0.25;
/// Loop cap for `sleep` triggered by the scheduler.
pub const SLEEP_LOOP_CAP: u32 = 20;
/// Sleep mode re-asserts the sleep animation this often (seconds).
pub const SLEEP_REASSERT_INTERVAL: f64 = 5.0;
/// Loops requested by sleep mode.
pub const SLEEP_MODE_LOOPS: u32 = 1000;
/// Chance the pet turns around after a behavior.
pub const FLIP_ON_FINISH: f32 = 0.3;

const FPS: f32 = super::sprite::ANIMATION_FPS;

/// One entry of the behavior table.
#[derive(Debug, Clone, PartialEq)]
pub struct Behavior {
    pub id: String,
    pub weight: f32,
    /// Seconds.
    pub min_duration: f32,
    pub max_duration: f32,
}

impl Behavior {
    pub fn new(id: &str, weight: f32, min_duration: f32, max_duration: f32) -> Self {
        Self {
            id: id.to_string(),
            weight,
            min_duration,
            max_duration,
        }
    }
}

/// Default behaviors, restricted to what the species can animate.
pub fn default_behaviors(species: &Species) -> Vec<Behavior> {
    [
        Behavior::new("sleep", 0.2, 8.0, 20.0),
        Behavior::new("eat", 0.3, 3.0, 6.0),
        Behavior::new("idle", 0.3, 2.0, 5.0),
        Behavior::new("front", 0.2, 1.5, 3.0),
    ]
    .into_iter()
    .filter(|b| species.has_animation(&b.id))
    .collect()
}

/// Loops needed to fill `duration` seconds of an animation with
/// `frame_count` frames. At least one; `sleep` is capped.
pub fn loops_for(id: &str, duration: f32, frame_count: u32) -> u32 {
    let frames = frame_count.max(1) as f32;
    let loops = ((duration.max(0.0) * FPS) / frames).ceil().max(1.0) as u32;
    if id == "sleep" {
        loops.min(SLEEP_LOOP_CAP)
    } else {
        loops
    }
}

#[derive(Debug, Clone, PartialEq)]
struct ActiveBehavior {
    id: String,
    saved_direction: Vec2,
    ends_at: f64,
}

#[derive(Debug, Clone)]
pub struct BehaviorScheduler {
    enabled: bool,
    token: u64,
    rng: PetRng,
    behaviors: Vec<Behavior>,
    active: Option<ActiveBehavior>,
    /// End of the previous behavior (install time before the first one).
    last_behavior_at: f64,
    /// End of the previous behavior, for the cooldown.
    last_finished_at: Option<f64>,
    last_action_id: Option<String>,
    last_checked_y: Option<f32>,
    sleep_mode: bool,
    /// Deadline of the live `BehaviorDue` timer; older ones are stale.
    pending_due: Option<f64>,
    /// Deadline of the live `SleepReassert` timer.
    sleep_due: Option<f64>,
}

impl BehaviorScheduler {
    /// Scheduler with its RNG seeded from the pet id.
    pub fn new(pet_id: &str, behaviors: Vec<Behavior>) -> Self {
        Self::with_rng(PetRng::for_pet(pet_id), behaviors)
    }

    pub fn with_rng(rng: PetRng, behaviors: Vec<Behavior>) -> Self {
        Self {
            enabled: true,
            token: 0,
            rng,
            behaviors,
            active: None,
            last_behavior_at: 0.0,
            last_finished_at: None,
            last_action_id: None,
            last_checked_y: None,
            sleep_mode: false,
            pending_due: None,
            sleep_due: None,
        }
    }

    pub fn behaviors(&self) -> &[Behavior] {
        &self.behaviors
    }

    pub fn is_sleep_mode(&self) -> bool {
        self.sleep_mode
    }

    /// Id of the behavior currently playing.
    pub fn active_behavior(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.id.as_str())
    }

    /// Weighted draw over the behavior table. The previous behavior's
    /// weight is scaled by [`REPEAT_PENALTY`]. `None` when nothing has a
    /// positive weight.
    pub fn select_behavior(&mut self) -> Option<Behavior> {
        let weights: Vec<f32> = self
            .behaviors
            .iter()
            .map(|b| {
                let w = if b.weight.is_finite() { b.weight.max(0.0) } else { 0.0 };
                if self.last_action_id.as_deref() == Some(b.id.as_str()) {
                    w * REPEAT_PENALTY
                } else {
                    w
                }
            })
            .collect();
        let total: f32 = weights.iter().sum();
        if total <= 0.0 {
            return None;
        }
        let mut pick = self.rng.next_f32() * total;
        let mut last_positive = None;
        for (behavior, &w) in self.behaviors.iter().zip(&weights) {
            if w <= 0.0 {
                continue;
            }
            if pick < w {
                return Some(behavior.clone());
            }
            pick -= w;
            last_positive = Some(behavior);
        }
        last_positive.cloned()
    }

    /// Delay until the next attempt: jittered base interval scaled by the
    /// frequency multiplier, but never sooner than the minimum walk time.
    fn next_delay(&mut self, frequency: f32, now: f64) -> f64 {
        let jitter = (self.rng.next_f64() * 2.0 - 1.0) * INTERVAL_JITTER;
        let freq = f64::from(frequency.max(MIN_FREQUENCY));
        let delay = (BASE_INTERVAL + jitter) / freq;
        let walk_floor = self.last_behavior_at + MIN_MOVEMENT_TIME - now;
        delay.max(walk_floor).max(0.0)
    }
}

// ---------------------------------------------------------------------------
// Timers
// ---------------------------------------------------------------------------

fn schedule_in(world: &mut PetWorld, entity: Entity, delay: f64) {
    let now = world.tasks.now();
    let Some(token) = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        s.pending_due = Some(now + delay);
        s.token
    }) else {
        return;
    };
    world.tasks.schedule(delay, entity, token, Task::BehaviorDue);
}

/// Plan the next behavior attempt, replacing any pending one.
pub fn reschedule(world: &mut PetWorld, entity: Entity) {
    let now = world.tasks.now();
    let frequency = world.settings.animation_frequency;
    let delay = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        (s.enabled && !s.sleep_mode).then(|| s.next_delay(frequency, now))
    })
    .flatten();
    if let Some(delay) = delay {
        log::trace!("{entity:?} next behavior in {delay:.1}s");
        schedule_in(world, entity, delay);
    }
}

fn deadline_reached(now: f64, due: Option<f64>) -> bool {
    due.is_some_and(|d| now + 1e-6 >= d)
}

/// Timer callback: the behavior delay ran out.
pub fn on_behavior_due(world: &mut PetWorld, entity: Entity, token: u64) {
    if !capabilities::is_current::<BehaviorScheduler>(world, entity, token) {
        return;
    }
    let now = world.tasks.now();
    let live = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        if !deadline_reached(now, s.pending_due) {
            return false;
        }
        s.pending_due = None;
        s.enabled && !s.sleep_mode
    })
    .unwrap_or(false);
    if live {
        attempt(world, entity, true);
    }
}

/// Timer callback: the running behavior's time is up.
pub fn on_behavior_finished(world: &mut PetWorld, entity: Entity, token: u64) {
    if !capabilities::is_current::<BehaviorScheduler>(world, entity, token) {
        return;
    }
    let now = world.tasks.now();
    let due = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        s.active.as_ref().is_some_and(|a| now + 1e-6 >= a.ends_at)
    })
    .unwrap_or(false);
    if due {
        finish_behavior(world, entity, true);
    }
}

/// Timer callback: sleep mode puts the pet back to sleep.
pub fn on_sleep_reassert(world: &mut PetWorld, entity: Entity, token: u64) {
    if !capabilities::is_current::<BehaviorScheduler>(world, entity, token) {
        return;
    }
    let now = world.tasks.now();
    let (live, enabled) = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        if !s.sleep_mode || !deadline_reached(now, s.sleep_due) {
            return (false, false);
        }
        s.sleep_due = Some(now + SLEEP_REASSERT_INTERVAL);
        (true, s.enabled)
    })
    .unwrap_or((false, false));
    if !live {
        return;
    }
    world
        .tasks
        .schedule(SLEEP_REASSERT_INTERVAL, entity, token, Task::SleepReassert);
    if enabled && entity::state(world, entity) != Some(PetState::Drag) {
        assert_sleep(world, entity);
    }
}

// ---------------------------------------------------------------------------
// Operations
// ---------------------------------------------------------------------------

/// Attempt a behavior now, as if the timer had fired (including the skip
/// roll).
pub fn try_start_behavior(world: &mut PetWorld, entity: Entity) -> bool {
    attempt(world, entity, true)
}

/// Attempt a behavior right away. Skips the random skip roll, but every
/// other check still applies.
pub fn request_behavior(world: &mut PetWorld, entity: Entity) -> bool {
    let usable = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| s.enabled && !s.sleep_mode)
        .unwrap_or(false);
    usable && attempt(world, entity, false)
}

/// Not dragged or falling, not wall-walking or chasing: just walking.
fn is_eligible(world: &PetWorld, entity: Entity) -> bool {
    entity::state(world, entity) == Some(PetState::Move)
        && !capabilities::is_enabled::<WallWalker>(world, entity)
        && !capabilities::is_enabled::<MouseChaser>(world, entity)
}

enum Verdict {
    Skip,
    Retry,
    Go(Behavior),
    Nothing,
}

fn attempt(world: &mut PetWorld, entity: Entity, allow_skip: bool) -> bool {
    let now = world.tasks.now();
    let eligible = is_eligible(world, entity);
    let y = entity::frame(world, entity).map(|f| f.min_y());

    let Some(verdict) = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        if s.active.is_some() {
            return Verdict::Nothing;
        }
        let forced = now - s.last_behavior_at >= FORCED_AFTER;
        if allow_skip && !forced && s.rng.chance(SKIP_PROBABILITY) {
            return Verdict::Skip;
        }
        if s.last_finished_at.is_some_and(|t| now - t < COOLDOWN) || !eligible {
            return Verdict::Retry;
        }
        let previous_y = std::mem::replace(&mut s.last_checked_y, y);
        if let (Some(prev), Some(cur)) = (previous_y, y) {
            if (cur - prev).abs() > STABILITY_THRESHOLD {
                return Verdict::Retry;
            }
        }
        match s.select_behavior() {
            Some(b) => Verdict::Go(b),
            None => Verdict::Skip,
        }
    }) else {
        return false;
    };

    match verdict {
        Verdict::Nothing => false,
        Verdict::Skip => {
            reschedule(world, entity);
            false
        }
        Verdict::Retry => {
            schedule_in(world, entity, INELIGIBLE_RETRY);
            false
        }
        Verdict::Go(behavior) => perform_behavior(world, entity, &behavior),
    }
}

/// Play `behavior`: stop, switch to its action for a random duration, and
/// arrange to walk on afterwards.
pub fn perform_behavior(world: &mut PetWorld, entity: Entity, behavior: &Behavior) -> bool {
    let Some(species) = entity::species(world, entity) else {
        return false;
    };
    let Some(anim) = species.animation(&behavior.id) else {
        log::debug!("{entity:?} cannot perform `{}`", behavior.id);
        reschedule(world, entity);
        return false;
    };
    let frame_count = anim.frame_count;
    let Some(duration) = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        let (lo, hi) = (behavior.min_duration, behavior.max_duration.max(behavior.min_duration));
        s.rng.range_f32(lo, hi)
    }) else {
        return false;
    };
    let loops = loops_for(&behavior.id, duration, frame_count);
    let saved_direction = entity::direction(world, entity).unwrap_or(Vec2::X);

    capabilities::set_enabled::<Movement>(world, entity, false);
    if !entity::set_state(world, entity, PetState::action(behavior.id.as_str(), loops)) {
        capabilities::set_enabled::<Movement>(world, entity, true);
        reschedule(world, entity);
        return false;
    }

    let now = world.tasks.now();
    let token = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        s.pending_due = None;
        s.active = Some(ActiveBehavior {
            id: behavior.id.clone(),
            saved_direction,
            ends_at: now + f64::from(duration),
        });
        s.token
    });
    if let Some(token) = token {
        world
            .tasks
            .schedule(f64::from(duration), entity, token, Task::BehaviorFinished);
    }
    log::debug!(
        "{} {} for {duration:.1}s ({loops} loops)",
        entity::id(world, entity).unwrap_or_default(),
        behavior.id
    );
    true
}

/// Wrap up the running behavior: walk on (maybe turned around), reset the
/// speed and plan the next one. With `restore_state` false the current
/// state is left alone (something else already moved the pet on).
pub fn finish_behavior(world: &mut PetWorld, entity: Entity, restore_state: bool) {
    let now = world.tasks.now();
    let Some((active, flip)) = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        let active = s.active.take()?;
        s.last_behavior_at = now;
        s.last_finished_at = Some(now);
        s.last_action_id = Some(active.id.clone());
        let flip = s.rng.chance(FLIP_ON_FINISH);
        Some((active, flip))
    })
    .flatten() else {
        return;
    };

    capabilities::set_enabled::<Movement>(world, entity, true);
    let dir = if flip {
        Vec2::new(-active.saved_direction.x, active.saved_direction.y)
    } else {
        active.saved_direction
    };
    entity::set_direction(world, entity, dir);
    if restore_state && entity::state(world, entity).is_some_and(|s| s.is_action()) {
        entity::set_state(world, entity, PetState::Move);
    }
    movement::reset_speed(world, entity, true);
    log::debug!("{} done with {}", entity::id(world, entity).unwrap_or_default(), active.id);
    reschedule(world, entity);
}

fn assert_sleep(world: &mut PetWorld, entity: Entity) -> bool {
    capabilities::set_enabled::<Movement>(world, entity, false);
    capabilities::set_enabled::<Gravity>(world, entity, false);
    entity::set_state(world, entity, PetState::action("sleep", SLEEP_MODE_LOOPS))
}

/// Sleep mode: hold the pet asleep until switched off. Fails (returns
/// false) for species without a `sleep` animation.
pub fn set_sleep_mode(world: &mut PetWorld, entity: Entity, on: bool) -> bool {
    let supported = entity::species(world, entity)
        .map(|s| s.has_animation("sleep"))
        .unwrap_or(false);
    let Some(was_on) = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| s.sleep_mode) else {
        return false;
    };
    if on == was_on {
        return true;
    }
    let name = entity::id(world, entity).unwrap_or_default();

    if on {
        if !supported {
            log::debug!("{name} has no sleep animation");
            return false;
        }
        let now = world.tasks.now();
        let Some(token) = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
            s.sleep_mode = true;
            s.pending_due = None;
            s.active = None;
            s.sleep_due = Some(now + SLEEP_REASSERT_INTERVAL);
            s.token
        }) else {
            return false;
        };
        if entity::state(world, entity) != Some(PetState::Drag) {
            assert_sleep(world, entity);
        }
        world
            .tasks
            .schedule(SLEEP_REASSERT_INTERVAL, entity, token, Task::SleepReassert);
        log::info!("{name} sleep mode on");
    } else {
        let now = world.tasks.now();
        capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
            s.sleep_mode = false;
            s.sleep_due = None;
            s.last_behavior_at = now;
        });
        capabilities::set_enabled::<Movement>(world, entity, true);
        let gravity_on = world.settings.gravity_enabled
            && !capabilities::has::<WallWalker>(world, entity)
            && !capabilities::has::<MouseChaser>(world, entity);
        capabilities::set_enabled::<Gravity>(world, entity, gravity_on);
        if entity::state(world, entity).is_some_and(|s| s.is_action()) {
            entity::set_state(world, entity, PetState::Move);
        }
        movement::reset_speed(world, entity, false);
        reschedule(world, entity);
        log::info!("{name} sleep mode off");
    }
    true
}

pub fn is_sleep_mode(world: &PetWorld, entity: Entity) -> bool {
    capabilities::with::<BehaviorScheduler, _>(world, entity, |s| s.sleep_mode).unwrap_or(false)
}

/// Hold scheduling (mouse chase). A running behavior ends right away.
pub fn pause(world: &mut PetWorld, entity: Entity) {
    capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        s.enabled = false;
        s.pending_due = None;
    });
    finish_behavior(world, entity, true);
}

/// Undo [`pause`].
pub fn resume(world: &mut PetWorld, entity: Entity) {
    let now = world.tasks.now();
    let resumed = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
        let was = s.enabled;
        s.enabled = true;
        s.last_behavior_at = now;
        !was
    })
    .unwrap_or(false);
    if resumed {
        reschedule(world, entity);
    }
}

impl Capability for BehaviorScheduler {
    const KIND: CapabilityKind = CapabilityKind::Scheduler;
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
        let now = world.tasks.now();
        capabilities::with::<BehaviorScheduler, _>(world, entity, |s| s.last_behavior_at = now);
        reschedule(world, entity);
    }

    fn on_kill(world: &mut PetWorld, entity: Entity) {
        let busy = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| s.active.is_some() || s.sleep_mode)
            .unwrap_or(false);
        if busy {
            capabilities::set_enabled::<Movement>(world, entity, true);
        }
    }

    fn on_state_changed(world: &mut PetWorld, entity: Entity, _old: &PetState, new: &PetState) {
        let interrupted = capabilities::with::<BehaviorScheduler, _>(world, entity, |s| {
            s.active
                .as_ref()
                .is_some_and(|a| new.action_id() != Some(a.id.as_str()))
        })
        .unwrap_or(false);
        if interrupted {
            finish_behavior(world, entity, false);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{cat_world, spawn_cat_at};

    fn scheduler(behaviors: Vec<Behavior>) -> BehaviorScheduler {
        BehaviorScheduler::with_rng(PetRng::new(7), behaviors)
    }

    #[test]
    fn only_weighted_behavior_is_selected() {
        let mut s = scheduler(vec![
            Behavior::new("sleep", 1.0, 1.0, 2.0),
            Behavior::new("eat", 0.0, 1.0, 2.0),
        ]);
        for _ in 0..100 {
            assert_eq!(s.select_behavior().map(|b| b.id), Some("sleep".to_string()));
        }
    }

    #[test]
    fn nothing_to_select_without_weight() {
        let mut s = scheduler(vec![Behavior::new("eat", 0.0, 1.0, 2.0)]);
        assert_eq!(s.select_behavior(), None);
        assert_eq!(scheduler(Vec::new()).select_behavior(), None);
    }

    #[test]
    fn repeats_are_penalized() {
        let mut s = scheduler(vec![
            Behavior::new("eat", 1.0, 1.0, 2.0),
            Behavior::new("idle", 1.0, 1.0, 2.0),
        ]);
        s.last_action_id = Some("eat".to_string());
        let eats = (0..2000)
            .filter(|_| s.select_behavior().is_some_and(|b| b.id == "eat"))
            .count();
        // Expected share is 0.25 / 1.25 = 20%.
        assert!((300..500).contains(&eats), "eat picked {eats} times");
    }

    #[test]
    fn loop_count_follows_duration_and_cap() {
        assert_eq!(loops_for("eat", 3.0, 6), 5);
        assert_eq!(loops_for("eat", 0.0, 6), 1);
        assert_eq!(loops_for("sleep", 20.0, 4), 20);
        assert_eq!(loops_for("sleep", 4.0, 4), 10);
    }

    #[test]
    fn defaults_follow_species() {
        let table = crate::species::SpeciesTable::builtin();
        let cat = table.get("cat").unwrap();
        let ape = table.get("ape").unwrap();
        assert_eq!(default_behaviors(&cat).len(), 4);
        assert!(default_behaviors(&ape).iter().all(|b| b.id != "sleep" && b.id != "idle"));
    }

    #[test]
    fn same_seed_same_sequence() {
        let table = vec![
            Behavior::new("sleep", 0.2, 8.0, 20.0),
            Behavior::new("eat", 0.3, 3.0, 6.0),
            Behavior::new("idle", 0.3, 2.0, 5.0),
        ];
        let mut a = BehaviorScheduler::new("cat-1", table.clone());
        let mut b = BehaviorScheduler::new("cat-1", table);
        for _ in 0..20 {
            assert_eq!(a.select_behavior(), b.select_behavior());
        }
    }

    #[test]
    fn request_runs_a_behavior_and_it_finishes() {
        let mut world = cat_world();
        let floor = world.bounds().max_y();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, floor - 50.0));
        world.tick(1.0 / 60.0);
        assert_eq!(entity::state(&world, pet), Some(PetState::Move));

        assert!(request_behavior(&mut world, pet));
        assert!(entity::state(&world, pet).unwrap().is_action());
        assert!(!capabilities::is_enabled::<Movement>(&world, pet));
        let before = entity::frame(&world, pet).unwrap();

        // Longest default behavior is 20 s.
        for _ in 0..(21 * 60) {
            world.tick(1.0 / 60.0);
            if entity::state(&world, pet) == Some(PetState::Move) {
                break;
            }
        }
        assert_eq!(entity::state(&world, pet), Some(PetState::Move));
        assert!(capabilities::is_enabled::<Movement>(&world, pet));
        assert!(capabilities::with::<BehaviorScheduler, _>(&world, pet, |s| s.active.is_none()).unwrap());
        assert_eq!(entity::frame(&world, pet).unwrap().min_y(), before.min_y());

        // Cooldown: an immediate second request is refused.
        assert!(!request_behavior(&mut world, pet));
    }

    #[test]
    fn ineligible_while_dragged() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, 100.0));
        entity::set_state(&mut world, pet, PetState::Drag);
        assert!(!request_behavior(&mut world, pet));
        assert_eq!(entity::state(&world, pet), Some(PetState::Drag));
    }

    #[test]
    fn timed_attempts_never_start_while_dragged() {
        let mut world = cat_world();
        let floor = world.bounds().max_y();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, floor - 50.0));
        entity::set_state(&mut world, pet, PetState::Drag);
        // Past the forced threshold the skip roll no longer hides the check.
        world.tasks.advance(FORCED_AFTER + 1.0);

        for _ in 0..50 {
            assert!(!try_start_behavior(&mut world, pet));
            assert_eq!(entity::state(&world, pet), Some(PetState::Drag));
        }
        assert!(capabilities::with::<BehaviorScheduler, _>(&world, pet, |s| s.active.is_none()).unwrap());
    }

    #[test]
    fn sleep_mode_holds_and_releases() {
        let mut world = cat_world();
        let floor = world.bounds().max_y();
        let pet = spawn_cat_at(&mut world, Vec2::new(100.0, floor - 50.0));
        assert!(set_sleep_mode(&mut world, pet, true));
        assert_eq!(
            entity::state(&world, pet),
            Some(PetState::action("sleep", SLEEP_MODE_LOOPS))
        );
        assert!(!capabilities::is_enabled::<Gravity>(&world, pet));

        // Woken by something else, put back to sleep by the reassert timer.
        entity::set_state(&mut world, pet, PetState::Move);
        for _ in 0..(6 * 60) {
            world.tick(1.0 / 60.0);
        }
        assert_eq!(entity::state(&world, pet).unwrap().action_id(), Some("sleep"));

        assert!(set_sleep_mode(&mut world, pet, false));
        assert_eq!(entity::state(&world, pet), Some(PetState::Move));
        assert!(capabilities::is_enabled::<Gravity>(&world, pet));
        assert!(capabilities::is_enabled::<Movement>(&world, pet));
    }

    #[test]
    fn sleep_mode_needs_sleep_animation() {
        let mut world = cat_world();
        let ape = world.spawn_pet("ape", Vec2::new(100.0, 100.0)).unwrap();
        assert!(!set_sleep_mode(&mut world, ape, true));
        assert!(!is_sleep_mode(&world, ape));
    }
}
