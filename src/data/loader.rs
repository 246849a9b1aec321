use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

use geojson::{GeoJson, Value};
use glam::DVec2;
use serde::Deserialize;
use tracing::{debug, info, warn};

use crate::data::country::{Centroid, Country};
use crate::data::dataset::Dataset;
use crate::error::GeoDataError;
use crate::geo::is_valid_lon_lat;
use crate::map::{Feature, Geometry, Polygon, Ring};

/// Country metadata file inside the data directory
pub const COUNTRIES_FILE: &str = "countries.json";
/// Country outline file inside the data directory
pub const OUTLINES_FILE: &str = "countries.geojson";

/// Properties tried, in order, when a feature carries no usable `id`
const ID_PROPERTIES: [&str; 4] = ["iso_a3", "ISO_A3", "iso3", "ADM0_A3"];
/// Name properties matched against country names when no code is usable
const NAME_PROPERTIES: [&str; 4] = ["name", "NAME", "ADMIN", "name_long"];

/// A capital is a plain string in hand-written data and a list in
/// REST Countries dumps
#[derive(Deserialize)]
#[serde(untagged)]
enum CapitalField {
    One(String),
    Many(Vec<String>),
}

#[derive(Deserialize)]
struct RawCountry {
    cca3: String,
    name: String,
    #[serde(default)]
    capital: Option<CapitalField>,
    #[serde(default)]
    population: u64,
    #[serde(default)]
    region: String,
    #[serde(default)]
    flag: String,
    /// [lat, lon]
    #[serde(default)]
    latlng: Option<Vec<f64>>,
}

impl From<RawCountry> for Country {
    fn from(raw: RawCountry) -> Self {
        let capital = match raw.capital {
            Some(CapitalField::One(c)) => c,
            Some(CapitalField::Many(cs)) => cs.into_iter().next().unwrap_or_default(),
            None => String::new(),
        };
        let centroid = raw
            .latlng
            .filter(|ll| ll.len() >= 2 && is_valid_lon_lat(ll[1], ll[0]))
            .map(|ll| Centroid {
                lat: ll[0],
                lon: ll[1],
            });
        Country {
            id: raw.cca3.trim().to_uppercase(),
            name: raw.name,
            capital,
            population: raw.population,
            region: raw.region,
            flag: raw.flag,
            centroid,
        }
    }
}

/// Load metadata and outlines from `data_dir` and merge them on country id
pub fn load_dataset(data_dir: &Path) -> Result<Dataset, GeoDataError> {
    let countries = load_countries(&data_dir.join(COUNTRIES_FILE))?;
    let names = ids_by_name(&countries);
    let features = load_features(&data_dir.join(OUTLINES_FILE), &names)?;
    let dataset = merge(countries, features);
    if dataset.is_empty() {
        return Err(GeoDataError::Empty);
    }
    info!(
        countries = dataset.len(),
        outlines = dataset.features().len(),
        dir = %data_dir.display(),
        "geographic data loaded"
    );
    Ok(dataset)
}

/// Load country metadata (array of records)
fn load_countries(path: &Path) -> Result<Vec<Country>, GeoDataError> {
    let mut bytes = fs::read(path).map_err(|source| GeoDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: Vec<RawCountry> =
        simd_json::serde::from_slice(&mut bytes).map_err(|e| GeoDataError::Metadata {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    Ok(raw.into_iter().map(Country::from).collect())
}

/// Load country outlines GeoJSON
fn load_features(path: &Path, names: &HashMap<String, String>) -> Result<Vec<Feature>, GeoDataError> {
    let content = fs::read_to_string(path).map_err(|source| GeoDataError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let geojson: GeoJson = content.parse().map_err(|e: geojson::Error| GeoDataError::GeoJson {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    Ok(features_from_geojson(&geojson, names))
}

/// Lower-cased country name to id
fn ids_by_name(countries: &[Country]) -> HashMap<String, String> {
    countries
        .iter()
        .map(|c| (c.name.trim().to_lowercase(), c.id.clone()))
        .collect()
}

/// Keep only countries that have an outline and outlines that have a country
pub fn merge(countries: Vec<Country>, features: Vec<Feature>) -> Dataset {
    let known: HashSet<&str> = countries.iter().map(|c| c.id.as_str()).collect();
    let total = features.len();
    let features: Vec<Feature> = features
        .into_iter()
        .filter(|f| known.contains(f.id.as_str()))
        .collect();
    let outlined: HashSet<String> = features.iter().map(|f| f.id.clone()).collect();
    if features.len() < total {
        debug!(dropped = total - features.len(), "outlines without country metadata");
    }

    let countries: Vec<Country> = countries
        .into_iter()
        .filter(|c| outlined.contains(&c.id))
        .collect();
    Dataset::new(countries, features)
}

/// Convert polygonal features, dropping anything that fails validation.
/// Features without a usable code are matched on name through `names`.
pub fn features_from_geojson(geojson: &GeoJson, names: &HashMap<String, String>) -> Vec<Feature> {
    let mut out = Vec::new();
    let mut dropped = 0usize;

    let features: Vec<&geojson::Feature> = match geojson {
        GeoJson::FeatureCollection(fc) => fc.features.iter().collect(),
        GeoJson::Feature(f) => vec![f],
        GeoJson::Geometry(_) => Vec::new(),
    };

    for (index, feature) in features.into_iter().enumerate() {
        let Some(id) = feature_id(feature).or_else(|| id_from_name(feature, names)) else {
            warn!(index, "feature has no country id, skipping");
            dropped += 1;
            continue;
        };
        match feature.geometry.as_ref().and_then(convert_geometry) {
            Some(geometry) => out.push(Feature::new(id, geometry)),
            None => {
                warn!(index, id = %id, "feature has no valid polygon, skipping");
                dropped += 1;
            }
        }
    }

    if dropped > 0 {
        warn!(dropped, kept = out.len(), "invalid features dropped");
    }
    out
}

fn feature_id(feature: &geojson::Feature) -> Option<String> {
    let from_id = match &feature.id {
        Some(geojson::feature::Id::String(s)) => Some(s.clone()),
        _ => None,
    };
    from_id
        .into_iter()
        .chain(
            ID_PROPERTIES
                .iter()
                .filter_map(|key| feature.property(key))
                .filter_map(|v| v.as_str())
                .map(str::to_string),
        )
        .map(|id| id.trim().to_uppercase())
        // Natural Earth marks disputed codes with -99
        .find(|id| id.len() == 3 && id.chars().all(|c| c.is_ascii_alphabetic()))
}

fn id_from_name(feature: &geojson::Feature, names: &HashMap<String, String>) -> Option<String> {
    NAME_PROPERTIES
        .iter()
        .filter_map(|key| feature.property(key))
        .filter_map(|v| v.as_str())
        .find_map(|name| names.get(&name.trim().to_lowercase()))
        .cloned()
}

fn convert_geometry(geometry: &geojson::Geometry) -> Option<Geometry> {
    match &geometry.value {
        Value::Polygon(rings) => convert_polygon(rings).map(Geometry::Polygon),
        Value::MultiPolygon(polygons) => {
            let polygons: Vec<Polygon> = polygons.iter().filter_map(|p| convert_polygon(p)).collect();
            match polygons.len() {
                0 => None,
                1 => polygons.into_iter().next().map(Geometry::Polygon),
                _ => Some(Geometry::MultiPolygon(polygons)),
            }
        }
        _ => None,
    }
}

/// A polygon survives only if its outer ring does; bad holes are skipped
fn convert_polygon(rings: &[Vec<Vec<f64>>]) -> Option<Polygon> {
    let (outer, holes) = rings.split_first()?;
    let outer = validate_ring(outer)?;
    let mut kept = vec![outer];
    kept.extend(holes.iter().filter_map(|r| validate_ring(r)));
    Some(Polygon::new(kept))
}

/// Ring with at least 3 in-range, finite (lon, lat) positions
pub fn validate_ring(coords: &[Vec<f64>]) -> Option<Ring> {
    let ring: Option<Ring> = coords
        .iter()
        .map(|c| match c.as_slice() {
            [lon, lat, ..] if is_valid_lon_lat(*lon, *lat) => Some(DVec2::new(*lon, *lat)),
            _ => None,
        })
        .collect();
    ring.filter(|r| r.len() >= 3)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OUTLINES: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {"type": "Feature", "id": "AAA", "properties": {},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[10,0],[10,10],[0,10],[0,0]]]}},
            {"type": "Feature", "properties": {"iso_a3": "-99", "ADM0_A3": "bbb", "name": "BBB Land"},
             "geometry": {"type": "MultiPolygon", "coordinates": [
                [[[20,0],[30,0],[30,10],[20,0]]],
                [[[40,0],[41,0]]]
             ]}},
            {"type": "Feature", "properties": {"iso_a3": "CCC"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[200,0],[10,10],[0,0]]]}},
            {"type": "Feature", "properties": {"name": "nowhere"},
             "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}},
            {"type": "Feature", "properties": {"iso_a3": "DDD"},
             "geometry": {"type": "Point", "coordinates": [1, 1]}}
        ]
    }"#;

    #[test]
    fn test_invalid_features_are_dropped() {
        let geojson: GeoJson = OUTLINES.parse().unwrap();
        let features = features_from_geojson(&geojson, &HashMap::new());
        let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
        assert_eq!(ids, vec!["AAA", "BBB"]);
        // The broken island is skipped, leaving a single polygon
        assert!(matches!(features[1].geometry, Geometry::Polygon(_)));
    }

    #[test]
    fn test_features_fall_back_to_country_name() {
        let geojson: GeoJson = OUTLINES.parse().unwrap();
        let names = HashMap::from([
            ("nowhere".to_string(), "NWH".to_string()),
            ("bbb land".to_string(), "ZZZ".to_string()),
        ]);
        let features = features_from_geojson(&geojson, &names);
        let ids: Vec<&str> = features.iter().map(|f| f.id.as_str()).collect();
        // A usable code still wins over the name
        assert_eq!(ids, vec!["AAA", "BBB", "NWH"]);
    }

    #[test]
    fn test_name_lookup_ignores_case() {
        let country = Country {
            id: "ATL".to_string(),
            name: " Atlantis ".to_string(),
            capital: String::new(),
            population: 0,
            region: String::new(),
            flag: String::new(),
            centroid: None,
        };
        let names = ids_by_name(&[country]);
        let geojson: GeoJson = r#"{"type": "Feature", "properties": {"ADMIN": "ATLANTIS"},
            "geometry": {"type": "Polygon", "coordinates": [[[0,0],[1,0],[1,1],[0,0]]]}}"#
            .parse()
            .unwrap();
        let features = features_from_geojson(&geojson, &names);
        assert_eq!(features.len(), 1);
        assert_eq!(features[0].id, "ATL");
    }

    #[test]
    fn test_validate_ring() {
        let ok = vec![vec![0.0, 0.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        assert_eq!(validate_ring(&ok).map(|r| r.len()), Some(3));
        let short = vec![vec![0.0, 0.0], vec![1.0, 0.0]];
        assert!(validate_ring(&short).is_none());
        let nan = vec![vec![0.0, f64::NAN], vec![1.0, 0.0], vec![1.0, 1.0]];
        assert!(validate_ring(&nan).is_none());
        let arity = vec![vec![0.0], vec![1.0, 0.0], vec![1.0, 1.0]];
        assert!(validate_ring(&arity).is_none());
    }

    #[test]
    fn test_bad_hole_keeps_outer_ring() {
        let rings = vec![
            vec![vec![0.0, 0.0], vec![5.0, 0.0], vec![5.0, 5.0]],
            vec![vec![1.0, 1.0], vec![400.0, 1.0], vec![2.0, 2.0]],
        ];
        let polygon = convert_polygon(&rings).unwrap();
        assert_eq!(polygon.rings.len(), 1);
    }

    #[test]
    fn test_raw_country_conversion() {
        let mut json = br#"[
            {"cca3": "fra", "name": "France", "capital": ["Paris"], "population": 67000000,
             "region": "Europe", "flag": "F", "latlng": [46.0, 2.0]},
            {"cca3": "ATA", "name": "Antarctica", "latlng": [-95.0, 0.0]}
        ]"#
        .to_vec();
        let raw: Vec<RawCountry> = simd_json::serde::from_slice(&mut json).unwrap();
        let countries: Vec<Country> = raw.into_iter().map(Country::from).collect();

        assert_eq!(countries[0].id, "FRA");
        assert_eq!(countries[0].capital, "Paris");
        assert_eq!(countries[0].centroid, Some(Centroid { lat: 46.0, lon: 2.0 }));
        assert_eq!(countries[1].capital, "");
        assert_eq!(countries[1].centroid, None);
    }

    #[test]
    fn test_merge_requires_both_halves() {
        let geojson: GeoJson = OUTLINES.parse().unwrap();
        let features = features_from_geojson(&geojson, &HashMap::new());
        let countries = vec![
            Country {
                id: "AAA".to_string(),
                name: "A".to_string(),
                capital: "a".to_string(),
                population: 1_000_000,
                region: String::new(),
                flag: String::new(),
                centroid: None,
            },
            Country {
                id: "ZZZ".to_string(),
                name: "Z".to_string(),
                capital: "z".to_string(),
                population: 1_000_000,
                region: String::new(),
                flag: String::new(),
                centroid: None,
            },
        ];
        let dataset = merge(countries, features);
        assert_eq!(dataset.len(), 1);
        assert_eq!(dataset.features().len(), 1);
        assert!(dataset.country_by_id("AAA").is_some());
    }
}
