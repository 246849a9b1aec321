use glam::DVec2;

use crate::data::country::Country;
use crate::data::dataset::Dataset;
use crate::map::{Feature, Geometry, Polygon, Ring};

/// (id, name, capital, population, region, flag, outline boxes as
/// [min_lon, min_lat, max_lon, max_lat]). Boxes never overlap, so every
/// outline center falls inside its own country.
type Entry = (&'static str, &'static str, &'static str, u64, &'static str, &'static str, &'static [[f64; 4]]);

const WORLD: &[Entry] = &[
    ("FRA", "France", "Paris", 68_000_000, "Europe", "🇫🇷", &[[-4.0, 43.0, 7.0, 50.0]]),
    ("ESP", "Spain", "Madrid", 47_400_000, "Europe", "🇪🇸", &[[-9.0, 36.0, 3.0, 42.9]]),
    ("DEU", "Germany", "Berlin", 83_200_000, "Europe", "🇩🇪", &[[7.01, 47.5, 15.0, 54.8]]),
    ("ITA", "Italy", "Rome", 59_000_000, "Europe", "🇮🇹", &[[7.5, 37.0, 18.0, 46.9]]),
    ("GBR", "United Kingdom", "London", 67_300_000, "Europe", "🇬🇧", &[[-8.0, 50.5, 1.7, 58.6]]),
    ("POL", "Poland", "Warsaw", 37_800_000, "Europe", "🇵🇱", &[[15.1, 49.0, 24.0, 54.8]]),
    ("SWE", "Sweden", "Stockholm", 10_400_000, "Europe", "🇸🇪", &[[11.0, 55.5, 24.0, 69.0]]),
    ("UKR", "Ukraine", "Kyiv", 38_000_000, "Europe", "🇺🇦", &[[24.1, 44.5, 40.0, 52.0]]),
    ("TUR", "Turkey", "Ankara", 85_300_000, "Asia", "🇹🇷", &[[26.0, 36.0, 44.8, 42.0]]),
    ("RUS", "Russia", "Moscow", 144_000_000, "Europe", "🇷🇺", &[[40.1, 50.0, 180.0, 77.0]]),
    ("KAZ", "Kazakhstan", "Astana", 19_400_000, "Asia", "🇰🇿", &[[46.0, 40.6, 87.0, 49.9]]),
    ("CHN", "China", "Beijing", 1_412_000_000, "Asia", "🇨🇳", &[[87.1, 20.0, 122.5, 49.9]]),
    ("KOR", "South Korea", "Seoul", 51_700_000, "Asia", "🇰🇷", &[[126.0, 34.0, 129.5, 38.5]]),
    (
        "JPN", "Japan", "Tokyo", 125_000_000, "Asia", "🇯🇵",
        &[[130.0, 31.0, 136.0, 35.5], [136.1, 35.6, 146.0, 45.0]],
    ),
    ("IND", "India", "New Delhi", 1_417_000_000, "Asia", "🇮🇳", &[[68.0, 8.0, 87.0, 35.0]]),
    ("IRN", "Iran", "Tehran", 88_500_000, "Asia", "🇮🇷", &[[44.9, 25.0, 63.0, 39.7]]),
    ("SAU", "Saudi Arabia", "Riyadh", 36_400_000, "Asia", "🇸🇦", &[[36.0, 16.0, 55.0, 24.9]]),
    ("EGY", "Egypt", "Cairo", 110_000_000, "Africa", "🇪🇬", &[[25.0, 22.0, 35.0, 31.6]]),
    (
        "IDN", "Indonesia", "Jakarta", 275_000_000, "Asia", "🇮🇩",
        &[[95.0, -6.0, 119.0, 5.9], [119.1, -11.0, 141.0, -1.0]],
    ),
    ("AUS", "Australia", "Canberra", 26_000_000, "Oceania", "🇦🇺", &[[113.0, -39.0, 154.0, -11.1]]),
    (
        "NZL", "New Zealand", "Wellington", 5_100_000, "Oceania", "🇳🇿",
        &[[166.0, -47.0, 174.0, -40.6], [172.5, -40.5, 178.5, -34.0]],
    ),
    ("NGA", "Nigeria", "Abuja", 218_500_000, "Africa", "🇳🇬", &[[2.7, 5.4, 14.6, 13.8]]),
    ("ZAF", "South Africa", "Pretoria", 60_000_000, "Africa", "🇿🇦", &[[16.5, -34.8, 32.9, -22.2]]),
    ("ETH", "Ethiopia", "Addis Ababa", 123_000_000, "Africa", "🇪🇹", &[[33.0, 3.5, 47.9, 14.8]]),
    ("DZA", "Algeria", "Algiers", 44_900_000, "Africa", "🇩🇿", &[[-8.0, 19.0, 11.9, 35.9]]),
    ("COD", "DR Congo", "Kinshasa", 99_000_000, "Africa", "🇨🇩", &[[12.2, -13.4, 31.3, 4.2]]),
    ("KEN", "Kenya", "Nairobi", 54_000_000, "Africa", "🇰🇪", &[[34.0, -4.7, 41.9, 3.4]]),
    ("SYC", "Seychelles", "Victoria", 98_000, "Africa", "🇸🇨", &[[55.2, -4.8, 55.9, -4.2]]),
    ("USA", "United States", "Washington, D.C.", 333_000_000, "Americas", "🇺🇸", &[[-125.0, 25.0, -67.0, 49.0]]),
    ("CAN", "Canada", "Ottawa", 38_900_000, "Americas", "🇨🇦", &[[-141.0, 49.1, -53.0, 70.0]]),
    ("MEX", "Mexico", "Mexico City", 128_000_000, "Americas", "🇲🇽", &[[-117.0, 14.5, -87.0, 24.9]]),
    ("COL", "Colombia", "Bogotá", 51_900_000, "Americas", "🇨🇴", &[[-79.0, 5.3, -67.0, 12.4]]),
    ("PER", "Peru", "Lima", 34_000_000, "Americas", "🇵🇪", &[[-81.0, -18.0, -74.1, -0.1]]),
    ("BRA", "Brazil", "Brasília", 215_300_000, "Americas", "🇧🇷", &[[-74.0, -33.7, -35.0, 5.2]]),
    ("CHL", "Chile", "Santiago", 19_600_000, "Americas", "🇨🇱", &[[-76.0, -55.0, -74.05, -18.1]]),
    ("ARG", "Argentina", "Buenos Aires", 46_000_000, "Americas", "🇦🇷", &[[-73.5, -55.0, -53.7, -33.8]]),
];

fn outline(&[min_lon, min_lat, max_lon, max_lat]: &[f64; 4]) -> Polygon {
    let ring: Ring = vec![
        DVec2::new(min_lon, min_lat),
        DVec2::new(max_lon, min_lat),
        DVec2::new(max_lon, max_lat),
        DVec2::new(min_lon, max_lat),
    ];
    Polygon::new(vec![ring])
}

/// Coarse world used when no data directory is available
pub fn builtin_world() -> Dataset {
    let mut countries = Vec::with_capacity(WORLD.len());
    let mut features = Vec::with_capacity(WORLD.len());

    for &(id, name, capital, population, region, flag, boxes) in WORLD {
        countries.push(Country {
            id: id.to_string(),
            name: name.to_string(),
            capital: capital.to_string(),
            population,
            region: region.to_string(),
            flag: flag.to_string(),
            centroid: None,
        });
        let geometry = match boxes {
            [single] => Geometry::Polygon(outline(single)),
            many => Geometry::MultiPolygon(many.iter().map(outline).collect()),
        };
        features.push(Feature::new(id, geometry));
    }

    Dataset::new(countries, features)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_country_has_outline_and_centroid() {
        let world = builtin_world();
        assert_eq!(world.len(), WORLD.len());
        assert_eq!(world.features().len(), WORLD.len());
        assert!(world.all_countries().iter().all(|c| c.centroid.is_some()));
    }

    #[test]
    fn test_outlines_do_not_overlap() {
        let world = builtin_world();
        let features = world.features();
        for (i, a) in features.iter().enumerate() {
            for b in features.iter().skip(i + 1) {
                for pa in a.geometry.polygons() {
                    for pb in b.geometry.polygons() {
                        let ba = crate::map::polygon::bounding_box(&Geometry::Polygon(pa.clone()));
                        let bb = crate::map::polygon::bounding_box(&Geometry::Polygon(pb.clone()));
                        assert!(!ba.intersects(&bb), "{} overlaps {}", a.id, b.id);
                    }
                }
            }
        }
    }
}
