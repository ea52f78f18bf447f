use crate::extent::Extent;

const GRID_COLS: usize = 64;
const GRID_ROWS: usize = 64;

/// A flat 2D grid over feature extents for fast hit-testing and view culling.
/// Rebuilt only when the feature set changes.
#[derive(Debug, Clone)]
pub struct SpatialGrid {
    cells: Vec<Vec<usize>>,
    extents: Vec<Extent>,
    bounds: Option<Extent>,
    cell_w: f64,
    cell_h: f64,
}

impl SpatialGrid {
    pub fn build(extents: Vec<Extent>) -> Self {
        let Some(bounds) = Extent::union_all(extents.iter().copied()) else {
            return Self {
                cells: Vec::new(),
                extents,
                bounds: None,
                cell_w: 1.0,
                cell_h: 1.0,
            };
        };

        // Pad so that features on the outer edge land inside the grid
        let bounds = Extent::new(
            bounds.min_x - 1.0,
            bounds.min_y - 1.0,
            bounds.max_x + 1.0,
            bounds.max_y + 1.0,
        );
        let cell_w = bounds.width() / GRID_COLS as f64;
        let cell_h = bounds.height() / GRID_ROWS as f64;

        let mut grid = Self {
            cells: vec![Vec::new(); GRID_COLS * GRID_ROWS],
            extents,
            bounds: Some(bounds),
            cell_w,
            cell_h,
        };

        for idx in 0..grid.extents.len() {
            let (c0, r0, c1, r1) = grid.cell_range(&grid.extents[idx]);
            for row in r0..=r1 {
                for col in c0..=c1 {
                    grid.cells[row * GRID_COLS + col].push(idx);
                }
            }
        }
        grid
    }

    /// Combined extent of every indexed feature (padded by one unit).
    #[cfg(test)]
    fn bounds(&self) -> Option<Extent> {
        self.bounds
    }

    fn cell_range(&self, extent: &Extent) -> (usize, usize, usize, usize) {
        let Some(b) = self.bounds else {
            return (0, 0, 0, 0);
        };
        let col = |x: f64| {
            ((x - b.min_x) / self.cell_w)
                .floor()
                .clamp(0.0, (GRID_COLS - 1) as f64) as usize
        };
        let row = |y: f64| {
            ((y - b.min_y) / self.cell_h)
                .floor()
                .clamp(0.0, (GRID_ROWS - 1) as f64) as usize
        };
        (
            col(extent.min_x),
            row(extent.min_y),
            col(extent.max_x),
            row(extent.max_y),
        )
    }

    /// Indices whose extent contains the point. Callers refine with exact geometry.
    pub fn candidates_at(&self, x: f64, y: f64) -> Vec<usize> {
        let Some(b) = self.bounds else {
            return Vec::new();
        };
        if !b.contains(x, y) {
            return Vec::new();
        }
        let (col, row, _, _) = self.cell_range(&Extent::new(x, y, x, y));
        self.cells[row * GRID_COLS + col]
            .iter()
            .copied()
            .filter(|&idx| self.extents[idx].contains(x, y))
            .collect()
    }

    /// Indices whose extent intersects `view`, in ascending order.
    pub fn query(&self, view: &Extent) -> Vec<usize> {
        let Some(b) = self.bounds else {
            return Vec::new();
        };
        if !b.intersects(view) {
            return Vec::new();
        }
        let (c0, r0, c1, r1) = self.cell_range(view);
        let mut seen = vec![false; self.extents.len()];
        let mut out = Vec::new();
        for row in r0..=r1 {
            for col in c0..=c1 {
                for &idx in &self.cells[row * GRID_COLS + col] {
                    if !seen[idx] && self.extents[idx].intersects(view) {
                        seen[idx] = true;
                        out.push(idx);
                    }
                }
            }
        }
        out.sort_unstable();
        out
    }
}
