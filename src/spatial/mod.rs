use crate::geometry::Rect;

/// Spatial hash grid for broad-phase overlap queries.
///
/// Cell size should be about the size of a pet sprite. Rects are inserted
/// into every cell they cover, so large obstacles cost more than pets.
/// Uses multiplicative hash for even distribution.
pub struct SpatialHash {
    inv_cell_size: f32,
    table_size: usize,
    /// Each bucket holds body indices. Pre-allocated, cleared each frame.
    buckets: Vec<Vec<u32>>,
}

/// Cap on cells touched per rect so a huge or corrupt rect cannot stall
/// the tick.
const MAX_CELLS_PER_AXIS: i32 = 256;

impl SpatialHash {
    pub fn new(cell_size: f32, table_size: usize) -> Self {
        let table_size = table_size.max(1);
        let mut buckets = Vec::with_capacity(table_size);
        for _ in 0..table_size {
            // Pre-allocate each bucket to avoid allocs during rebuild.
            buckets.push(Vec::with_capacity(8));
        }
        Self {
            inv_cell_size: 1.0 / cell_size.max(1.0),
            table_size,
            buckets,
        }
    }

    /// Clear all buckets. Call at start of each rebuild.
    pub fn clear(&mut self) {
        for bucket in &mut self.buckets {
            bucket.clear(); // Keeps allocation.
        }
    }

    /// Insert a body covering `rect`.
    pub fn insert(&mut self, rect: &Rect, index: u32) {
        let (x0, y0, x1, y1) = self.cell_span(rect);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                let hash = self.hash_cell(cx, cy);
                self.buckets[hash].push(index);
            }
        }
    }

    /// Collect candidate indices whose cells overlap `rect`. May contain
    /// duplicates and false positives; `out` is sorted and deduplicated.
    pub fn query(&self, rect: &Rect, out: &mut Vec<u32>) {
        out.clear();
        let (x0, y0, x1, y1) = self.cell_span(rect);
        for cy in y0..=y1 {
            for cx in x0..=x1 {
                out.extend_from_slice(&self.buckets[self.hash_cell(cx, cy)]);
            }
        }
        out.sort_unstable();
        out.dedup();
    }

    fn cell_span(&self, rect: &Rect) -> (i32, i32, i32, i32) {
        let x0 = (rect.min_x() * self.inv_cell_size).floor() as i32;
        let y0 = (rect.min_y() * self.inv_cell_size).floor() as i32;
        let x1 = (rect.max_x() * self.inv_cell_size).floor() as i32;
        let y1 = (rect.max_y() * self.inv_cell_size).floor() as i32;
        (
            x0,
            y0,
            x1.clamp(x0, x0.saturating_add(MAX_CELLS_PER_AXIS)),
            y1.clamp(y0, y0.saturating_add(MAX_CELLS_PER_AXIS)),
        )
    }

    fn hash_cell(&self, cx: i32, cy: i32) -> usize {
        // Multiplicative spatial hash.
        let h = (cx as u32).wrapping_mul(73856093) ^ (cy as u32).wrapping_mul(19349663);
        (h as usize) % self.table_size
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_query() {
        let mut grid = SpatialHash::new(64.0, 256);
        grid.insert(&Rect::new(100.0, 100.0, 20.0, 20.0), 0);
        grid.insert(&Rect::new(110.0, 105.0, 20.0, 20.0), 1);
        grid.insert(&Rect::new(900.0, 900.0, 20.0, 20.0), 2);

        let mut found = Vec::new();
        grid.query(&Rect::new(105.0, 102.0, 10.0, 10.0), &mut found);

        assert!(found.contains(&0));
        assert!(found.contains(&1));
    }

    #[test]
    fn wide_rects_are_found_from_any_cell() {
        let mut grid = SpatialHash::new(64.0, 256);
        grid.insert(&Rect::new(0.0, 500.0, 1000.0, 50.0), 9);

        let mut found = Vec::new();
        grid.query(&Rect::new(800.0, 480.0, 30.0, 30.0), &mut found);
        assert_eq!(found, vec![9]);
    }

    #[test]
    fn clear_and_reuse() {
        let mut grid = SpatialHash::new(64.0, 256);
        grid.insert(&Rect::new(50.0, 50.0, 1.0, 1.0), 42);
        grid.clear();

        let mut found = Vec::new();
        grid.query(&Rect::new(50.0, 50.0, 1.0, 1.0), &mut found);
        assert!(found.is_empty());
    }
}
