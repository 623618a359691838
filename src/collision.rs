use std::collections::HashMap;

use crate::ecs::components::{Frame, Lifecycle};
use crate::geometry::Rect;
use crate::spatial::SpatialHash;

/// Which side of the subject a contact is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
    Top,
    Bottom,
}

/// Contact sides of the subject. Usually a single side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Sides {
    pub left: bool,
    pub right: bool,
    pub top: bool,
    pub bottom: bool,
}

impl Sides {
    pub fn only(side: Side) -> Self {
        let mut s = Self::default();
        match side {
            Side::Left => s.left = true,
            Side::Right => s.right = true,
            Side::Top => s.top = true,
            Side::Bottom => s.bottom = true,
        }
        s
    }

    pub fn contains(&self, side: Side) -> bool {
        match side {
            Side::Left => self.left,
            Side::Right => self.right,
            Side::Top => self.top,
            Side::Bottom => self.bottom,
        }
    }

    /// Classify a contact by its penetration axis: a tall, narrow
    /// intersection is a side hit, a wide, flat one is top/bottom.
    pub fn classify(subject: &Rect, other: &Rect, intersection: &Rect) -> Self {
        let sc = subject.center();
        let oc = other.center();
        if intersection.height() >= intersection.width() {
            Self::only(if oc.x >= sc.x { Side::Right } else { Side::Left })
        } else {
            Self::only(if oc.y >= sc.y { Side::Bottom } else { Side::Top })
        }
    }
}

/// One overlap between a subject and another body this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Collision {
    pub other: hecs::Entity,
    /// The other body's frame, for edge math.
    pub other_frame: Rect,
    pub intersection: Rect,
    pub is_static: bool,
    pub is_ephemeral: bool,
    /// False for bodies that only touch or sit within the contact margin.
    pub is_overlapping: bool,
    pub sides: Sides,
}

/// Per-tick collision sets keyed by subject.
pub type CollisionFeed = HashMap<hecs::Entity, Vec<Collision>>;

/// Bodies closer than this count as touching. Ground and wall contact
/// tolerances are defined in terms of it.
pub const CONTACT_MARGIN: f32 = 5.0;
/// Spatial hash cell size, about one pet sprite.
const CELL_SIZE: f32 = 64.0;
/// Spatial hash table size (prime-ish for good distribution).
const TABLE_SIZE: usize = 1021;

/// Snapshot of a body for the broad phase. Stored alongside the spatial
/// hash to avoid ECS lookups in the hot path.
struct Body {
    entity: hecs::Entity,
    frame: Rect,
    lifecycle: Lifecycle,
}

/// Default AABB collision producer. Hosts with their own physics can
/// build a [`CollisionFeed`] themselves instead.
pub struct CollisionDetector {
    grid: SpatialHash,
    bodies: Vec<Body>,
    candidates: Vec<u32>,
}

impl CollisionDetector {
    pub fn new() -> Self {
        Self {
            grid: SpatialHash::new(CELL_SIZE, TABLE_SIZE),
            bodies: Vec::with_capacity(64),
            candidates: Vec::with_capacity(32),
        }
    }

    /// Rebuild the grid and compute collisions for every live, movable,
    /// non-ephemeral body.
    pub fn detect(&mut self, world: &hecs::World) -> CollisionFeed {
        self.grid.clear();
        self.bodies.clear();
        for (entity, (frame, lifecycle)) in world.query::<(&Frame, &Lifecycle)>().iter() {
            if !lifecycle.alive {
                continue;
            }
            let idx = self.bodies.len() as u32;
            self.bodies.push(Body {
                entity,
                frame: frame.0,
                lifecycle: *lifecycle,
            });
            self.grid.insert(&frame.0, idx);
        }

        let mut feed = CollisionFeed::with_capacity(self.bodies.len());
        for (my_idx, me) in self.bodies.iter().enumerate() {
            if me.lifecycle.is_static || me.lifecycle.ephemeral {
                continue;
            }
            let reach = me.frame.expanded(CONTACT_MARGIN);
            self.grid.query(&reach, &mut self.candidates);

            let mut hits = Vec::new();
            for &ci in &self.candidates {
                let ci = ci as usize;
                if ci == my_idx {
                    continue;
                }
                let them = &self.bodies[ci];
                let Some(intersection) = reach.intersection(&them.frame) else {
                    continue;
                };
                hits.push(Collision {
                    other: them.entity,
                    other_frame: them.frame,
                    intersection,
                    is_static: them.lifecycle.is_static,
                    is_ephemeral: them.lifecycle.ephemeral,
                    is_overlapping: me.frame.intersects(&them.frame),
                    sides: Sides::classify(&me.frame, &them.frame, &intersection),
                });
            }
            feed.insert(me.entity, hits);
        }
        log::trace!("collision feed built for {} bodies", self.bodies.len());
        feed
    }
}

impl Default for CollisionDetector {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pet_on_floor_reports_bottom_contact() {
        let mut world = hecs::World::new();
        let pet = world.spawn((Frame(Rect::new(10.0, 50.0, 20.0, 20.0)), Lifecycle::PET));
        let floor = world.spawn((Frame(Rect::new(0.0, 70.0, 200.0, 50.0)), Lifecycle::OBSTACLE));

        let feed = CollisionDetector::new().detect(&world);
        let hits = &feed[&pet];
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].other, floor);
        assert!(hits[0].is_static);
        assert!(!hits[0].is_overlapping);
        assert!(hits[0].sides.contains(Side::Bottom));
        // Static bodies are never subjects.
        assert!(!feed.contains_key(&floor));
    }

    #[test]
    fn side_contact_is_classified_horizontally() {
        let subject = Rect::new(0.0, 0.0, 20.0, 20.0);
        let wall = Rect::new(19.0, -100.0, 50.0, 300.0);
        let hit = subject.intersection(&wall).unwrap();
        assert_eq!(Sides::classify(&subject, &wall, &hit), Sides::only(Side::Right));
    }

    #[test]
    fn far_bodies_do_not_collide() {
        let mut world = hecs::World::new();
        let a = world.spawn((Frame(Rect::new(0.0, 0.0, 10.0, 10.0)), Lifecycle::PET));
        world.spawn((Frame(Rect::new(500.0, 500.0, 10.0, 10.0)), Lifecycle::PET));
        let feed = CollisionDetector::new().detect(&world);
        assert!(feed[&a].is_empty());
    }
}
