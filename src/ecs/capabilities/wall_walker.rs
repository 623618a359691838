//! Wall-walking: pets crawl across the floor, walls and ceiling like a fly,
//! either rounding corners smoothly or turning around at them.

use std::f32::consts::{FRAC_PI_2, PI, TAU};

use glam::Vec2;
use hecs::Entity;

use super::{Capability, CapabilityKind};
use crate::collision::{Collision, CONTACT_MARGIN};
use crate::ecs::capabilities::{self, Gravity, LateralBounce, MouseChaser, Sprite};
use crate::ecs::components::PetState;
use crate::ecs::entity;
use crate::geometry::Rect;
use crate::world::PetWorld;

/// Corner transition progress per second (a full turn takes 0.4 s).
pub const TRANSITION_SPEED: f32 = 2.5;
/// Distance to the perpendicular boundary that triggers a corner turn.
pub const CORNER_DETECTION_DISTANCE: f32 = 20.0;
/// Max gap between the pet's edge and a surface that still counts as contact.
pub const CONTACT_TOLERANCE: f32 = CONTACT_MARGIN;
/// How long contact may be lost before the pet lets go and falls (seconds).
pub const CONTACT_MEMORY: f32 = 0.1;

/// One of the four boundary-relative orientations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wall {
    Floor,
    LeftWall,
    RightWall,
    Ceiling,
}

impl Wall {
    /// Pull toward this wall.
    pub const fn gravity(self) -> Vec2 {
        match self {
            Wall::Floor => Vec2::new(0.0, 1.0),
            Wall::Ceiling => Vec2::new(0.0, -1.0),
            Wall::LeftWall => Vec2::new(-1.0, 0.0),
            Wall::RightWall => Vec2::new(1.0, 0.0),
        }
    }

    /// Sprite rotation that puts the feet on this wall.
    pub const fn rotation(self) -> f32 {
        match self {
            Wall::Floor => 0.0,
            Wall::Ceiling => PI,
            Wall::LeftWall => FRAC_PI_2,
            Wall::RightWall => -FRAC_PI_2,
        }
    }

    /// Floor and ceiling walk along x, the side walls along y.
    pub const fn is_horizontal(self) -> bool {
        matches!(self, Wall::Floor | Wall::Ceiling)
    }

    /// Horizontal flip for a walking pet. The rotated sprite's forward
    /// axis differs per wall, so each wall flips on a different sign.
    pub fn flip_h(self, dir: Vec2) -> Option<bool> {
        let (component, flip_when_negative) = match self {
            Wall::Floor => (dir.x, true),
            Wall::Ceiling => (dir.x, false),
            Wall::LeftWall => (dir.y, true),
            Wall::RightWall => (dir.y, false),
        };
        if component.abs() < 1e-3 {
            return None;
        }
        Some((component < 0.0) == flip_when_negative)
    }

    /// A heading along this wall with the given sign.
    pub fn walk_direction(self, positive: bool) -> Vec2 {
        let s = if positive { 1.0 } else { -1.0 };
        if self.is_horizontal() {
            Vec2::new(s, 0.0)
        } else {
            Vec2::new(0.0, s)
        }
    }
}

/// Wall nearest to `center`. Ties go to the first of left, right, ceiling,
/// floor.
pub fn determine_nearest_wall(center: Vec2, bounds: &Rect) -> Wall {
    let candidates = [
        (Wall::LeftWall, center.x - bounds.min_x()),
        (Wall::RightWall, bounds.max_x() - center.x),
        (Wall::Ceiling, center.y - bounds.min_y()),
        (Wall::Floor, bounds.max_y() - center.y),
    ];
    let mut best = candidates[0];
    for c in &candidates[1..] {
        if c.1 < best.1 {
            best = *c;
        }
    }
    best.0
}

/// The wall the pet is about to run into while walking on `current`, if
/// it is within `distance` of that boundary and heading toward it.
pub fn detect_corner(frame: &Rect, dir: Vec2, current: Wall, bounds: &Rect, distance: f32) -> Option<Wall> {
    if current.is_horizontal() {
        if dir.x > 0.0 && bounds.max_x() - frame.max_x() <= distance {
            return Some(Wall::RightWall);
        }
        if dir.x < 0.0 && frame.min_x() - bounds.min_x() <= distance {
            return Some(Wall::LeftWall);
        }
    } else {
        if dir.y > 0.0 && bounds.max_y() - frame.max_y() <= distance {
            return Some(Wall::Floor);
        }
        if dir.y < 0.0 && frame.min_y() - bounds.min_y() <= distance {
            return Some(Wall::Ceiling);
        }
    }
    None
}

/// Where a pet walking on `from` ends up after rounding the corner onto
/// `to`: pressed into the corner, feet on the new wall.
pub fn corner_end_position(from: Wall, to: Wall, frame: &Rect, bounds: &Rect) -> Vec2 {
    let (w, h) = (frame.width(), frame.height());
    let near_min_x = bounds.min_x();
    let near_max_x = bounds.max_x() - w;
    let near_min_y = bounds.min_y();
    let near_max_y = bounds.max_y() - h;
    let x = match (to, from) {
        (Wall::LeftWall, _) => near_min_x,
        (Wall::RightWall, _) => near_max_x,
        (_, Wall::LeftWall) => near_min_x,
        (_, Wall::RightWall) => near_max_x,
        _ => frame.min_x(),
    };
    let y = match (to, from) {
        (Wall::Ceiling, _) => near_min_y,
        (Wall::Floor, _) => near_max_y,
        (_, Wall::Ceiling) => near_min_y,
        (_, Wall::Floor) => near_max_y,
        _ => frame.min_y(),
    };
    Vec2::new(x, y)
}

/// `to` expressed within half a turn of `from`, so rotation takes the
/// short way around.
fn shortest_arc_target(from: f32, to: f32) -> f32 {
    let mut delta = (to - from) % TAU;
    if delta > PI {
        delta -= TAU;
    } else if delta < -PI {
        delta += TAU;
    }
    from + delta
}

fn ease_in_out_sine(t: f32) -> f32 {
    0.5 - 0.5 * (PI * t).cos()
}

/// A corner turn in progress.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CornerTransition {
    pub from: Wall,
    pub to: Wall,
    pub start: Vec2,
    pub end: Vec2,
    start_angle: f32,
    end_angle: f32,
    /// 0..=1.
    pub progress: f32,
}

#[derive(Debug, Clone)]
pub struct WallWalker {
    enabled: bool,
    token: u64,
    pub current_wall: Wall,
    /// Falling toward `current_wall`.
    pub falling: bool,
    pub corner_traversal: bool,
    pub transition: Option<CornerTransition>,
    since_contact: f32,
}

impl WallWalker {
    pub fn new(corner_traversal: bool) -> Self {
        Self {
            enabled: true,
            token: 0,
            current_wall: Wall::Floor,
            falling: false,
            corner_traversal,
            transition: None,
            since_contact: 0.0,
        }
    }
}

/// True while a corner turn is animating; plain movement pauses then.
pub fn is_transitioning(world: &PetWorld, entity: Entity) -> bool {
    world
        .ecs
        .get::<&WallWalker>(entity)
        .map(|w| w.enabled && w.transition.is_some())
        .unwrap_or(false)
}

/// Turn wall-walking on. Mouse chasing is killed first.
pub fn enable(world: &mut PetWorld, entity: Entity, corner_traversal: bool) -> bool {
    capabilities::kill::<MouseChaser>(world, entity);
    let ok = capabilities::install(world, entity, WallWalker::new(corner_traversal));
    if ok {
        log::info!("{} wall-walking on", entity::id(world, entity).unwrap_or_default());
    }
    ok
}

/// Turn wall-walking off, restoring standard gravity and movement.
pub fn disable(world: &mut PetWorld, entity: Entity) -> bool {
    let killed = capabilities::kill::<WallWalker>(world, entity);
    if killed {
        log::info!("{} wall-walking off", entity::id(world, entity).unwrap_or_default());
    }
    killed
}

pub fn set_corner_traversal(world: &PetWorld, entity: Entity, on: bool) {
    capabilities::with::<WallWalker, _>(world, entity, |w| w.corner_traversal = on);
}

/// Let go of the current surface and fall toward the nearest wall.
pub fn begin_fall_to_nearest_wall(world: &mut PetWorld, entity: Entity) {
    let Some(frame) = entity::frame(world, entity) else {
        return;
    };
    let wall = determine_nearest_wall(frame.center(), &world.bounds());
    capabilities::with::<WallWalker, _>(world, entity, |w| {
        w.current_wall = wall;
        w.falling = true;
        w.transition = None;
        w.since_contact = 0.0;
    });
    entity::set_direction(world, entity, wall.gravity());
    if entity::state(world, entity) != Some(PetState::Drag) {
        entity::set_state(world, entity, PetState::FreeFall);
    }
    log::debug!("{entity:?} falling toward {wall:?}");
}

/// Surface edge (in world coordinates) touched on `wall`, if any: the
/// static collision whose facing edge is at most [`CONTACT_TOLERANCE`] away
/// from the pet's matching edge, or already inside the frame. With several
/// candidates the one reaching furthest toward the pet wins.
pub fn find_contact(frame: &Rect, wall: Wall, collisions: &[Collision]) -> Option<f32> {
    let edges = collisions
        .iter()
        .filter(|c| c.is_static && !c.is_ephemeral)
        .filter_map(|c| {
            let o = &c.other_frame;
            // gap: distance from the pet's facing edge out to the surface,
            // negative once the surface is inside the frame.
            let (edge, gap, depth) = match wall {
                Wall::Floor => (o.min_y(), o.min_y() - frame.max_y(), o.min_y() - frame.min_y()),
                Wall::Ceiling => (o.max_y(), frame.min_y() - o.max_y(), frame.max_y() - o.max_y()),
                Wall::LeftWall => (o.max_x(), frame.min_x() - o.max_x(), frame.max_x() - o.max_x()),
                Wall::RightWall => (o.min_x(), o.min_x() - frame.max_x(), o.min_x() - frame.min_x()),
            };
            (gap <= CONTACT_TOLERANCE && depth >= 0.0).then_some(edge)
        });
    match wall {
        Wall::Floor | Wall::RightWall => edges.min_by(|a, b| a.total_cmp(b)),
        Wall::Ceiling | Wall::LeftWall => edges.max_by(|a, b| a.total_cmp(b)),
    }
}

/// Origin that puts the pet's facing edge exactly on `edge`.
fn snapped_origin(frame: &Rect, wall: Wall, edge: f32) -> Vec2 {
    match wall {
        Wall::Floor => Vec2::new(frame.min_x(), edge - frame.height()),
        Wall::Ceiling => Vec2::new(frame.min_x(), edge),
        Wall::LeftWall => Vec2::new(edge, frame.min_y()),
        Wall::RightWall => Vec2::new(edge - frame.width(), frame.min_y()),
    }
}

fn orient_sprite(world: &PetWorld, entity: Entity, wall: Wall, dir: Vec2, rotation: Option<f32>) {
    capabilities::with::<Sprite, _>(world, entity, |s| {
        s.rotation = rotation.unwrap_or(wall.rotation());
        s.flip_v = false;
        if let Some(flip) = wall.flip_h(dir) {
            s.flip_h = flip;
        }
    });
}

impl Capability for WallWalker {
    const KIND: CapabilityKind = CapabilityKind::WallWalker;
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
        capabilities::set_enabled::<Gravity>(world, entity, false);
        capabilities::set_enabled::<LateralBounce>(world, entity, false);
        begin_fall_to_nearest_wall(world, entity);
    }

    fn on_kill(world: &mut PetWorld, entity: Entity) {
        let gravity_on = world.settings.gravity_enabled;
        capabilities::set_enabled::<Gravity>(world, entity, gravity_on);
        capabilities::set_enabled::<LateralBounce>(world, entity, true);
        capabilities::with::<WallWalker, _>(world, entity, |w| {
            w.enabled = false;
            w.transition = None;
        });
        capabilities::with::<Sprite, _>(world, entity, |s| {
            s.rotation = 0.0;
            s.flip_v = false;
        });
        let dir = entity::random_horizontal(&mut world.rng);
        entity::set_direction(world, entity, dir);
        if !gravity_on && entity::state(world, entity) == Some(PetState::FreeFall) {
            entity::set_state(world, entity, PetState::Move);
        }
    }

    fn update(world: &mut PetWorld, entity: Entity, collisions: &[Collision], dt: f32) {
        let Some(state) = entity::state(world, entity) else {
            return;
        };
        if state == PetState::Drag {
            return;
        }
        let (Some(frame), Some(dir)) = (entity::frame(world, entity), entity::direction(world, entity)) else {
            return;
        };
        let Some(walker) = capabilities::with::<WallWalker, _>(world, entity, |w| w.clone()) else {
            return;
        };
        let bounds = world.bounds();

        // 1. Corner turn in progress.
        if let Some(mut t) = walker.transition {
            t.progress = (t.progress + dt * TRANSITION_SPEED).min(1.0);
            if t.progress >= 1.0 {
                let new_dir = -t.from.gravity();
                entity::set_origin(world, entity, t.end);
                entity::set_direction(world, entity, new_dir);
                capabilities::with::<WallWalker, _>(world, entity, |w| {
                    w.current_wall = t.to;
                    w.transition = None;
                    w.since_contact = 0.0;
                });
                orient_sprite(world, entity, t.to, new_dir, None);
                log::trace!("{entity:?} rounded corner onto {:?}", t.to);
            } else {
                let eased = ease_in_out_sine(t.progress);
                entity::set_origin(world, entity, t.start.lerp(t.end, eased));
                let angle = t.start_angle + (t.end_angle - t.start_angle) * t.progress;
                capabilities::with::<WallWalker, _>(world, entity, |w| w.transition = Some(t));
                orient_sprite(world, entity, t.from, dir, Some(angle));
            }
            return;
        }

        let mut wall = walker.current_wall;
        let mut falling = walker.falling;
        let mut dir = dir;
        let walking = state == PetState::Move && !falling;

        // 2. Start a corner turn.
        if walker.corner_traversal && walking {
            if let Some(to) = detect_corner(&frame, dir, wall, &bounds, CORNER_DETECTION_DISTANCE) {
                let start_angle = wall.rotation();
                let t = CornerTransition {
                    from: wall,
                    to,
                    start: frame.origin,
                    end: corner_end_position(wall, to, &frame, &bounds),
                    start_angle,
                    end_angle: shortest_arc_target(start_angle, to.rotation()),
                    progress: 0.0,
                };
                capabilities::with::<WallWalker, _>(world, entity, |w| w.transition = Some(t));
                orient_sprite(world, entity, wall, dir, Some(start_angle));
                log::trace!("{entity:?} corner {wall:?} -> {to:?}");
                return;
            }
        }

        // 3. No corner turns: walk back at the boundary.
        let mut handled = false;
        if !walker.corner_traversal && walking && detect_corner(&frame, dir, wall, &bounds, 0.0).is_some() {
            dir = if wall.is_horizontal() {
                Vec2::new(-dir.x, dir.y)
            } else {
                Vec2::new(dir.x, -dir.y)
            };
            entity::set_direction(world, entity, dir);
            entity::set_frame(world, entity, frame.clamped_within(&bounds));
            handled = true;
        }

        // 4./5. Contact with the current wall, or lose it and fall.
        if !handled {
            if let Some(frame) = entity::frame(world, entity) {
                match find_contact(&frame, wall, collisions) {
                    Some(edge) => {
                        entity::set_origin(world, entity, snapped_origin(&frame, wall, edge));
                        capabilities::with::<WallWalker, _>(world, entity, |w| {
                            w.since_contact = 0.0;
                            w.falling = false;
                        });
                        if falling || state == PetState::FreeFall {
                            falling = false;
                            dir = wall.walk_direction(world.rng.bool());
                            entity::set_direction(world, entity, dir);
                            entity::set_state(world, entity, PetState::Move);
                        }
                    }
                    None => {
                        let lost_for = capabilities::with::<WallWalker, _>(world, entity, |w| {
                            w.since_contact += dt;
                            w.since_contact
                        })
                        .unwrap_or(0.0);
                        if lost_for > CONTACT_MEMORY && !falling && state == PetState::Move {
                            begin_fall_to_nearest_wall(world, entity);
                            falling = true;
                            if let Some(w) = capabilities::with::<WallWalker, _>(world, entity, |w| w.current_wall) {
                                wall = w;
                            }
                        }
                    }
                }
            }
        }

        // 6. Falling follows the wall's gravity.
        if falling {
            dir = wall.gravity();
            entity::set_direction(world, entity, dir);
        }

        // 7. Sprite transform.
        orient_sprite(world, entity, wall, dir, None);
    }

    fn on_state_changed(world: &mut PetWorld, entity: Entity, old: &PetState, new: &PetState) {
        match (old, new) {
            (_, PetState::Drag) => {
                capabilities::with::<WallWalker, _>(world, entity, |w| {
                    w.transition = None;
                    w.falling = false;
                });
            }
            (PetState::Drag, PetState::FreeFall) => begin_fall_to_nearest_wall(world, entity),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::Sides;
    use crate::test_support::{cat_world, spawn_cat_at};
    use approx::assert_relative_eq;

    fn static_hit(other: Entity, other_frame: Rect) -> Collision {
        Collision {
            other,
            other_frame,
            intersection: other_frame,
            is_static: true,
            is_ephemeral: false,
            is_overlapping: false,
            sides: Sides::default(),
        }
    }

    #[test]
    fn nearest_wall_tie_breaks_left_first() {
        let bounds = Rect::new(0.0, 0.0, 100.0, 100.0);
        for _ in 0..10 {
            assert_eq!(determine_nearest_wall(Vec2::new(50.0, 50.0), &bounds), Wall::LeftWall);
        }
        assert_eq!(determine_nearest_wall(Vec2::new(50.0, 95.0), &bounds), Wall::Floor);
        assert_eq!(determine_nearest_wall(Vec2::new(50.0, 5.0), &bounds), Wall::Ceiling);
        assert_eq!(determine_nearest_wall(Vec2::new(97.0, 50.0), &bounds), Wall::RightWall);
    }

    #[test]
    fn detects_right_wall_corner() {
        let bounds = Rect::new(0.0, 0.0, 400.0, 300.0);
        let frame = Rect::new(390.0, 140.0, 10.0, 10.0);
        assert_eq!(
            detect_corner(&frame, Vec2::X, Wall::Floor, &bounds, 20.0),
            Some(Wall::RightWall)
        );
        // Heading away: no corner.
        assert_eq!(detect_corner(&frame, Vec2::NEG_X, Wall::Floor, &bounds, 20.0), None);
    }

    #[test]
    fn flip_table_differs_between_axes() {
        assert_eq!(Wall::Floor.flip_h(Vec2::NEG_X), Some(true));
        assert_eq!(Wall::Ceiling.flip_h(Vec2::NEG_X), Some(false));
        assert_eq!(Wall::LeftWall.flip_h(Vec2::NEG_Y), Some(true));
        assert_eq!(Wall::RightWall.flip_h(Vec2::NEG_Y), Some(false));
        assert_eq!(Wall::Floor.flip_h(Vec2::Y), None);
    }

    #[test]
    fn floor_contact_snaps_exactly() {
        let mut world = cat_world();
        let pet = spawn_cat_at(&mut world, Vec2::new(200.0, 300.0));
        assert!(enable(&mut world, pet, true));
        capabilities::with::<WallWalker, _>(&world, pet, |w| {
            w.current_wall = Wall::Floor;
            w.falling = false;
        });
        entity::set_state(&mut world, pet, PetState::Move);
        entity::set_direction(&world, pet, Vec2::X);

        let frame = entity::frame(&world, pet).unwrap();
        let ledge_top = frame.max_y() + 3.0;
        let ledge = Rect::new(150.0, ledge_top, 200.0, 20.0);
        let other = world.spawn_obstacle(ledge);

        WallWalker::update(&mut world, pet, &[static_hit(other, ledge)], 1.0 / 60.0);
        let after = entity::frame(&world, pet).unwrap();
        assert_eq!(after.max_y(), ledge_top);
    }

    #[test]
    fn corner_transition_lands_on_end_position() {
        let mut world = cat_world();
        let bounds = world.bounds();
        let probe = spawn_cat_at(&mut world, Vec2::ZERO);
        let size = entity::frame(&world, probe).unwrap().size;
        let start = Vec2::new(bounds.max_x() - size.x - 10.0, bounds.max_y() - size.y);
        let pet = spawn_cat_at(&mut world, start);
        assert!(enable(&mut world, pet, true));
        capabilities::with::<WallWalker, _>(&world, pet, |w| {
            w.current_wall = Wall::Floor;
            w.falling = false;
        });
        entity::set_state(&mut world, pet, PetState::Move);
        entity::set_direction(&world, pet, Vec2::X);

        WallWalker::update(&mut world, pet, &[], 1.0 / 60.0);
        let t = capabilities::with::<WallWalker, _>(&world, pet, |w| w.transition)
            .flatten()
            .unwrap();
        assert_eq!(t.to, Wall::RightWall);

        let mut guard = 0;
        while is_transitioning(&world, pet) {
            WallWalker::update(&mut world, pet, &[], 1.0 / 60.0);
            guard += 1;
            assert!(guard < 1000);
        }
        let frame = entity::frame(&world, pet).unwrap();
        assert_eq!(frame.origin, t.end);
        assert_eq!(
            capabilities::with::<WallWalker, _>(&world, pet, |w| w.current_wall),
            Some(Wall::RightWall)
        );
        assert_eq!(entity::direction(&world, pet), Some(Vec2::NEG_Y));
        assert_relative_eq!(t.end.x, bounds.max_x() - size.x);
    }

    #[test]
    fn bounces_at_boundary_without_corner_traversal() {
        let mut world = cat_world();
        let bounds = world.bounds();
        let pet = spawn_cat_at(&mut world, Vec2::new(bounds.max_x() - 50.0, bounds.max_y() - 50.0));
        assert!(enable(&mut world, pet, false));
        capabilities::with::<WallWalker, _>(&world, pet, |w| {
            w.current_wall = Wall::Floor;
            w.falling = false;
        });
        entity::set_state(&mut world, pet, PetState::Move);
        entity::set_direction(&world, pet, Vec2::X);

        WallWalker::update(&mut world, pet, &[], 1.0 / 60.0);
        assert_eq!(entity::direction(&world, pet), Some(Vec2::NEG_X));
    }

    #[test]
    fn contact_survives_sinking_into_the_surface() {
        let frame = Rect::new(100.0, 100.0, 50.0, 50.0);
        let floor = Rect::new(0.0, 130.0, 400.0, 50.0);
        let hit = static_hit(Entity::DANGLING, floor);
        assert_eq!(find_contact(&frame, Wall::Floor, &[hit]), Some(130.0));
        // Entirely past the surface: no contact.
        let sunk = Rect::new(100.0, 190.0, 50.0, 50.0);
        assert_eq!(find_contact(&sunk, Wall::Floor, &[hit]), None);

        let wall = Rect::new(-50.0, 0.0, 60.0, 400.0);
        let hit = static_hit(Entity::DANGLING, wall);
        assert_eq!(find_contact(&frame, Wall::LeftWall, &[hit]), None);
        let touching = Rect::new(12.0, 100.0, 50.0, 50.0);
        assert_eq!(find_contact(&touching, Wall::LeftWall, &[hit]), Some(10.0));
    }

    #[test]
    fn turning_back_never_leaves_the_bounds() {
        let mut world = cat_world();
        let bounds = world.bounds();
        let pet = spawn_cat_at(&mut world, Vec2::new(400.0, 300.0));
        assert!(enable(&mut world, pet, false));
        for _ in 0..3600 {
            world.tick(1.0 / 60.0);
            let frame = entity::frame(&world, pet).unwrap();
            assert!(
                frame.min_x() >= bounds.min_x()
                    && frame.min_y() >= bounds.min_y()
                    && frame.max_x() <= bounds.max_x()
                    && frame.max_y() <= bounds.max_y(),
                "{frame:?}"
            );
        }
    }

    #[test]
    fn enabling_disables_gravity_and_falls_to_nearest_wall() {
        let mut world = cat_world();
        let bounds = world.bounds();
        let pet = spawn_cat_at(&mut world, Vec2::new(5.0, bounds.center().y));
        assert!(enable(&mut world, pet, true));
        assert!(!capabilities::is_enabled::<Gravity>(&world, pet));
        assert_eq!(entity::state(&world, pet), Some(PetState::FreeFall));
        assert_eq!(
            capabilities::with::<WallWalker, _>(&world, pet, |w| w.current_wall),
            Some(Wall::LeftWall)
        );

        assert!(disable(&mut world, pet));
        assert!(capabilities::is_enabled::<Gravity>(&world, pet));
        assert!(capabilities::is_enabled::<LateralBounce>(&world, pet));
    }
}
