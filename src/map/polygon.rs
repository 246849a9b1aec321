use glam::DVec2;

/// Earth radius in km
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A closed ring of (lon, lat) points. The closing edge back to the first
/// point is implicit.
pub type Ring = Vec<DVec2>;

/// Outer ring first, holes after it
#[derive(Clone, Debug, PartialEq)]
pub struct Polygon {
    pub rings: Vec<Ring>,
}

impl Polygon {
    pub fn new(rings: Vec<Ring>) -> Self {
        Self { rings }
    }

    /// The outer ring, if any
    #[inline]
    pub fn outer(&self) -> Option<&Ring> {
        self.rings.first()
    }

    fn translated(&self, dlon: f64) -> Self {
        let shift = DVec2::new(dlon, 0.0);
        Self {
            rings: self
                .rings
                .iter()
                .map(|ring| ring.iter().map(|&p| p + shift).collect())
                .collect(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Polygon(Polygon),
    MultiPolygon(Vec<Polygon>),
}

impl Geometry {
    /// All polygons, a single `Polygon` viewed as a one-element slice
    pub fn polygons(&self) -> &[Polygon] {
        match self {
            Geometry::Polygon(p) => std::slice::from_ref(p),
            Geometry::MultiPolygon(ps) => ps,
        }
    }

    /// Deep copy with every longitude shifted by `dlon` degrees
    pub fn translated(&self, dlon: f64) -> Self {
        match self {
            Geometry::Polygon(p) => Geometry::Polygon(p.translated(dlon)),
            Geometry::MultiPolygon(ps) => {
                Geometry::MultiPolygon(ps.iter().map(|p| p.translated(dlon)).collect())
            }
        }
    }

    /// Every coordinate of every ring
    pub fn points(&self) -> impl Iterator<Item = DVec2> + '_ {
        self.polygons()
            .iter()
            .flat_map(|p| p.rings.iter())
            .flat_map(|ring| ring.iter().copied())
    }
}

/// Axis-aligned box in (lon, lat) degrees. Bounds are inclusive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub min: DVec2,
    pub max: DVec2,
}

impl BoundingBox {
    /// An inverted box that any `extend` will replace
    pub fn empty() -> Self {
        Self {
            min: DVec2::splat(f64::INFINITY),
            max: DVec2::splat(f64::NEG_INFINITY),
        }
    }

    pub fn new(min_lon: f64, min_lat: f64, max_lon: f64, max_lat: f64) -> Self {
        Self {
            min: DVec2::new(min_lon, min_lat),
            max: DVec2::new(max_lon, max_lat),
        }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y
    }

    #[inline]
    pub fn extend(&mut self, p: DVec2) {
        self.min = self.min.min(p);
        self.max = self.max.max(p);
    }

    #[inline(always)]
    pub fn contains(&self, p: DVec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    pub fn intersects(&self, other: &BoundingBox) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    pub fn center(&self) -> DVec2 {
        (self.min + self.max) * 0.5
    }

    pub fn translated(&self, dlon: f64) -> Self {
        let shift = DVec2::new(dlon, 0.0);
        Self {
            min: self.min + shift,
            max: self.max + shift,
        }
    }
}

/// Min/max walk over every coordinate of the geometry
pub fn bounding_box(geometry: &Geometry) -> BoundingBox {
    geometry.points().fold(BoundingBox::empty(), |mut bbox, p| {
        bbox.extend(p);
        bbox
    })
}

/// Even-odd ray casting: cast a ray from `p` towards +x and count the ring
/// edges that straddle `p.y`. Rings with fewer than 3 points contain nothing.
pub fn point_in_ring(p: DVec2, ring: &[DVec2]) -> bool {
    if ring.len() < 3 {
        return false;
    }

    let mut inside = false;
    let mut j = ring.len() - 1;
    for i in 0..ring.len() {
        let a = ring[i];
        let b = ring[j];
        if (a.y > p.y) != (b.y > p.y) && p.x < (b.x - a.x) * (p.y - a.y) / (b.y - a.y) + a.x {
            inside = !inside;
        }
        j = i;
    }
    inside
}

/// Outer rings only; holes are not subtracted
pub fn point_in_geometry(p: DVec2, geometry: &Geometry) -> bool {
    geometry
        .polygons()
        .iter()
        .filter_map(Polygon::outer)
        .any(|ring| point_in_ring(p, ring))
}

/// Great-circle distance in kilometers
pub fn haversine_km(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let a = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    EARTH_RADIUS_KM * c
}

/// A country outline keyed by its 3-letter identifier, with a cached bbox
#[derive(Clone, Debug, PartialEq)]
pub struct Feature {
    pub id: String,
    pub geometry: Geometry,
    pub bbox: BoundingBox,
}

impl Feature {
    pub fn new(id: impl Into<String>, geometry: Geometry) -> Self {
        let bbox = bounding_box(&geometry);
        Self {
            id: id.into(),
            geometry,
            bbox,
        }
    }
}

#[cfg(test)]
pub(crate) fn square(x0: f64, y0: f64, size: f64) -> Ring {
    vec![
        DVec2::new(x0, y0),
        DVec2::new(x0 + size, y0),
        DVec2::new(x0 + size, y0 + size),
        DVec2::new(x0, y0 + size),
    ]
}
