use crate::map::geometry::Bounds;
use glam::DVec2;
use std::collections::HashMap;

/// Bounding-box grid over country shapes. Each shape is registered in every
/// cell its bbox overlaps, so a point query never misses a shape; false
/// positives are removed by the caller's polygon test.
pub struct FeatureGrid {
    cells: HashMap<(i32, i32), Vec<usize>>,
    cell_size: f64,
}

impl FeatureGrid {
    pub fn new(cell_size: f64) -> Self {
        Self {
            cells: HashMap::new(),
            cell_size,
        }
    }

    #[inline(always)]
    fn to_cell(&self, p: DVec2) -> (i32, i32) {
        (
            (p.x / self.cell_size).floor() as i32,
            (p.y / self.cell_size).floor() as i32,
        )
    }

    pub fn build<'a>(bounds: impl Iterator<Item = &'a Bounds>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, b) in bounds.enumerate() {
            let (min_x, min_y) = grid.to_cell(b.min);
            let (max_x, max_y) = grid.to_cell(b.max);
            for y in min_y..=max_y {
                for x in min_x..=max_x {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Shapes whose bbox cell covers `p`
    pub fn candidates(&self, p: DVec2) -> &[usize] {
        self.cells
            .get(&self.to_cell(p))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
