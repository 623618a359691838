use glam::Vec2;

/// Axis-aligned rectangle in world pixels (y grows down).
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Vec2::ZERO,
        size: Vec2::ZERO,
    };

    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w.max(0.0), h.max(0.0)),
        }
    }

    pub fn from_min_max(min: Vec2, max: Vec2) -> Self {
        Self {
            origin: min,
            size: (max - min).max(Vec2::ZERO),
        }
    }

    pub fn min_x(&self) -> f32 {
        self.origin.x
    }

    pub fn min_y(&self) -> f32 {
        self.origin.y
    }

    pub fn max_x(&self) -> f32 {
        self.origin.x + self.size.x
    }

    pub fn max_y(&self) -> f32 {
        self.origin.y + self.size.y
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.origin + self.size * 0.5
    }

    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.min_x() && p.x <= self.max_x() && p.y >= self.min_y() && p.y <= self.max_y()
    }

    /// Grow on every side by `margin`.
    pub fn expanded(&self, margin: f32) -> Rect {
        Rect::from_min_max(
            self.origin - Vec2::splat(margin),
            self.origin + self.size + Vec2::splat(margin),
        )
    }

    /// Overlapping region, or `None` when the rects are apart. Touching
    /// edges yield a zero-area rect.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let min = self.origin.max(other.origin);
        let max = Vec2::new(self.max_x().min(other.max_x()), self.max_y().min(other.max_y()));
        if max.x < min.x || max.y < min.y {
            return None;
        }
        Some(Rect::from_min_max(min, max))
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.min_x() < other.max_x()
            && other.min_x() < self.max_x()
            && self.min_y() < other.max_y()
            && other.min_y() < self.max_y()
    }

    pub fn translated(&self, delta: Vec2) -> Rect {
        Rect {
            origin: self.origin + delta,
            size: self.size,
        }
    }

    /// Moved (not resized) so it lies inside `bounds`. A rect larger than
    /// `bounds` is pinned to its top-left corner.
    pub fn clamped_within(&self, bounds: &Rect) -> Rect {
        let max = (Vec2::new(bounds.max_x(), bounds.max_y()) - self.size).max(bounds.origin);
        Rect {
            origin: self.origin.clamp(bounds.origin, max),
            size: self.size,
        }
    }

    /// Same center, new size.
    pub fn resized_about_center(&self, size: Vec2) -> Rect {
        let center = self.center();
        Rect {
            origin: center - size * 0.5,
            size,
        }
    }
}

/// Normalize, or `None` for (near) zero-length vectors.
pub fn unit_or_none(v: Vec2) -> Option<Vec2> {
    let len_sq = v.length_squared();
    if len_sq < 1e-8 || !len_sq.is_finite() {
        None
    } else {
        Some(v / len_sq.sqrt())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intersection_of_overlapping_rects() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(5.0, 5.0, 10.0, 10.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(5.0, 5.0, 5.0, 5.0)));
        assert!(a.intersects(&b));
    }

    #[test]
    fn touching_rects_meet_but_do_not_overlap() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        let b = Rect::new(0.0, 10.0, 10.0, 10.0);
        let hit = a.intersection(&b).unwrap();
        assert_eq!(hit.height(), 0.0);
        assert!(!a.intersects(&b));
        assert_eq!(a.intersection(&Rect::new(20.0, 20.0, 1.0, 1.0)), None);
    }

    #[test]
    fn degenerate_vectors_have_no_unit() {
        assert_eq!(unit_or_none(Vec2::ZERO), None);
        assert_eq!(unit_or_none(Vec2::new(3.0, 4.0)), Some(Vec2::new(0.6, 0.8)));
    }
}
