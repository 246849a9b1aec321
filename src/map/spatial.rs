use std::collections::HashMap;

use glam::DVec2;

use crate::map::polygon::BoundingBox;

/// Spatial index for feature bounding boxes using conservative approximation.
/// Each feature's bbox is indexed into every cell it overlaps, guaranteeing
/// no false negatives while allowing false positives (eliminated by the
/// bbox and ray-cast checks downstream).
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
    fn to_cell(&self, lon: f64, lat: f64) -> (i32, i32) {
        let x = (lon / self.cell_size).floor() as i32;
        let y = (lat / self.cell_size).floor() as i32;
        (x, y)
    }

    /// Build from feature bounding boxes; indices follow iteration order
    pub fn build<'a>(bboxes: impl Iterator<Item = &'a BoundingBox>, cell_size: f64) -> Self {
        let mut grid = Self::new(cell_size);
        for (idx, bbox) in bboxes.enumerate() {
            if bbox.is_empty() {
                continue;
            }
            let min_cell = grid.to_cell(bbox.min.x, bbox.min.y);
            let max_cell = grid.to_cell(bbox.max.x, bbox.max.y);
            for y in min_cell.1..=max_cell.1 {
                for x in min_cell.0..=max_cell.0 {
                    grid.cells.entry((x, y)).or_default().push(idx);
                }
            }
        }
        grid
    }

    /// Feature indices whose bbox may contain `p`
    pub fn query_point(&self, p: DVec2) -> &[usize] {
        self.cells
            .get(&self.to_cell(p.x, p.y))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Append feature indices for the given bounds into results vec.
    /// May contain duplicates; caller should dedup after all queries.
    pub fn query_into(&self, bounds: &BoundingBox, results: &mut Vec<usize>) {
        let min_cell = self.to_cell(bounds.min.x, bounds.min.y);
        let max_cell = self.to_cell(bounds.max.x, bounds.max.y);
        for y in min_cell.1..=max_cell.1 {
            for x in min_cell.0..=max_cell.0 {
                if let Some(indices) = self.cells.get(&(x, y)) {
                    results.extend_from_slice(indices);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_point_query_is_conservative() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 25.0, 25.0),
            BoundingBox::new(100.0, -10.0, 110.0, 0.0),
            BoundingBox::empty(),
        ];
        let grid = FeatureGrid::build(boxes.iter(), 10.0);

        assert_eq!(grid.query_point(DVec2::new(24.0, 24.0)), &[0]);
        assert_eq!(grid.query_point(DVec2::new(105.0, -5.0)), &[1]);
        assert!(grid.query_point(DVec2::new(-50.0, 40.0)).is_empty());
    }

    #[test]
    fn test_bounds_query() {
        let boxes = [
            BoundingBox::new(0.0, 0.0, 5.0, 5.0),
            BoundingBox::new(50.0, 50.0, 55.0, 55.0),
        ];
        let grid = FeatureGrid::build(boxes.iter(), 10.0);
        let mut hits = Vec::new();
        grid.query_into(&BoundingBox::new(-20.0, -20.0, 20.0, 20.0), &mut hits);
        hits.dedup();
        assert_eq!(hits, vec![0]);
    }
}
