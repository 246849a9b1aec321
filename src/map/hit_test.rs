use glam::DVec2;

use crate::data::{Country, Dataset};
use crate::geo::wrap_lon;
use crate::map::buffer::{OffsetFeature, WorldBuffer};
use crate::map::polygon::{haversine_km, point_in_geometry};

/// Country resolved from a pointer position
#[derive(Clone, Copy, Debug)]
pub struct Hit<'a> {
    pub country: &'a Country,
    /// False when the nearest-centroid fallback answered
    pub direct: bool,
}

/// Outline under `p` across all buffer slots; first hit wins
pub fn feature_at(buffer: &WorldBuffer, p: DVec2) -> Option<&OffsetFeature> {
    buffer.slots().iter().find_map(|layer| {
        if !layer.bounds.contains(p) {
            return None;
        }
        layer
            .grid
            .query_point(p)
            .iter()
            .map(|&idx| &layer.features[idx])
            .find(|f| f.bbox.contains(p) && point_in_geometry(p, &f.geometry))
    })
}

/// Country whose centroid is closest to (lon, lat) by great-circle distance
pub fn nearest_country(countries: &[Country], lon: f64, lat: f64) -> Option<&Country> {
    let lon = wrap_lon(lon);
    countries
        .iter()
        .filter_map(|c| {
            c.centroid
                .map(|centroid| (c, haversine_km(lon, lat, centroid.lon, centroid.lat)))
        })
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Resolve a click to a country: polygon containment first, then the
/// nearest centroid. Only returns `None` when no country has a centroid.
pub fn resolve_click<'a>(
    buffer: &WorldBuffer,
    dataset: &'a Dataset,
    lon: f64,
    lat: f64,
) -> Option<Hit<'a>> {
    let p = DVec2::new(lon, lat);
    if let Some(country) = feature_at(buffer, p).and_then(|f| dataset.country_by_id(&f.original_id)) {
        return Some(Hit {
            country,
            direct: true,
        });
    }
    nearest_country(dataset.all_countries(), lon, lat).map(|country| Hit {
        country,
        direct: false,
    })
}

/// Country id under the pointer for hover feedback. Direct hits only:
/// the ocean never highlights anything.
pub fn hover_target<'a>(buffer: &'a WorldBuffer, lon: f64, lat: f64) -> Option<&'a str> {
    feature_at(buffer, DVec2::new(lon, lat)).map(|f| f.original_id.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_world;
    use crate::map::buffer::BufferConfig;

    fn setup() -> (Dataset, WorldBuffer) {
        let dataset = builtin_world();
        let buffer = WorldBuffer::new(dataset.features(), BufferConfig::default());
        (dataset, buffer)
    }

    #[test]
    fn test_direct_hit() {
        let (dataset, buffer) = setup();
        let hit = resolve_click(&buffer, &dataset, 2.35, 48.85).unwrap();
        assert_eq!(hit.country.id, "FRA");
        assert!(hit.direct);
    }

    #[test]
    fn test_hit_in_offset_copy() {
        let (dataset, buffer) = setup();
        let hit = resolve_click(&buffer, &dataset, 2.35 + 360.0, 48.85).unwrap();
        assert_eq!(hit.country.id, "FRA");
        assert!(hit.direct);
        let hit = resolve_click(&buffer, &dataset, 139.7 - 720.0, 40.0).unwrap();
        assert_eq!(hit.country.id, "JPN");
    }

    #[test]
    fn test_ocean_click_falls_back() {
        let (dataset, buffer) = setup();
        // Bay of Biscay-ish, between the Spain and France boxes
        let hit = resolve_click(&buffer, &dataset, -6.0, 44.5).unwrap();
        assert!(!hit.direct);
        assert!(["FRA", "ESP"].contains(&hit.country.id.as_str()));

        // Middle of the Pacific, one world to the east
        let hit = resolve_click(&buffer, &dataset, -150.0 + 360.0, -20.0).unwrap();
        assert!(!hit.direct);
    }

    #[test]
    fn test_every_centroid_resolves_to_its_country() {
        let (dataset, buffer) = setup();
        for country in dataset.all_countries() {
            let c = country.centroid.unwrap();
            let hit = resolve_click(&buffer, &dataset, c.lon, c.lat).unwrap();
            assert_eq!(hit.country.id, country.id);
        }
    }

    #[test]
    fn test_no_centroids_means_no_answer() {
        let (_, buffer) = setup();
        let empty = Dataset::new(Vec::new(), Vec::new());
        assert!(resolve_click(&buffer, &empty, -150.0, -20.0).is_none());
    }

    #[test]
    fn test_hover_ignores_ocean() {
        let (_, buffer) = setup();
        assert_eq!(hover_target(&buffer, 2.0, 47.0), Some("FRA"));
        assert_eq!(hover_target(&buffer, -150.0, -20.0), None);
    }
}
