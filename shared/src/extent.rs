use geo::{BoundingRect, Geometry};

/// Axis-aligned bounding box in projected map coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Extent {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl Extent {
    pub const fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    pub fn of_geometry(geometry: &Geometry<f64>) -> Option<Self> {
        let rect = geometry.bounding_rect()?;
        Some(Self::new(rect.min().x, rect.min().y, rect.max().x, rect.max().y))
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.min_x && x <= self.max_x && y >= self.min_y && y <= self.max_y
    }

    pub fn intersects(&self, other: &Extent) -> bool {
        self.min_x <= other.max_x
            && self.max_x >= other.min_x
            && self.min_y <= other.max_y
            && self.max_y >= other.min_y
    }

    pub fn union(&self, other: &Extent) -> Extent {
        Extent::new(
            self.min_x.min(other.min_x),
            self.min_y.min(other.min_y),
            self.max_x.max(other.max_x),
            self.max_y.max(other.max_y),
        )
    }

    /// Union of all extents, or `None` for an empty iterator.
    pub fn union_all(extents: impl IntoIterator<Item = Extent>) -> Option<Extent> {
        extents.into_iter().reduce(|acc, e| acc.union(&e))
    }
}

#[cfg(test)]
mod tests {
    use super::Extent;
    use geo::{Geometry, polygon};

    #[test]
    fn union_all_empty_is_none() {
        assert_eq!(Extent::union_all(Vec::new()), None);
    }

    #[test]
    fn union_all_covers_every_input() {
        let merged = Extent::union_all([
            Extent::new(0.0, 0.0, 1.0, 1.0),
            Extent::new(-2.0, 0.5, 0.5, 3.0),
        ])
        .unwrap();
        assert_eq!(merged, Extent::new(-2.0, 0.0, 1.0, 3.0));
        assert_eq!(merged.center(), (-0.5, 1.5));
    }

    #[test]
    fn geometry_extent_matches_polygon_corners() {
        let poly: Geometry<f64> = polygon![
            (x: 1.0, y: 2.0),
            (x: 5.0, y: 2.0),
            (x: 5.0, y: 7.0),
            (x: 1.0, y: 7.0),
        ]
        .into();
        assert_eq!(
            Extent::of_geometry(&poly),
            Some(Extent::new(1.0, 2.0, 5.0, 7.0))
        );
    }

    #[test]
    fn intersects_touching_edges() {
        let a = Extent::new(0.0, 0.0, 1.0, 1.0);
        assert!(a.intersects(&Extent::new(1.0, 0.0, 2.0, 1.0)));
        assert!(!a.intersects(&Extent::new(1.5, 0.0, 2.0, 1.0)));
    }
}
