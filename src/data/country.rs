use serde::{Deserialize, Serialize};

/// Representative point of a country, used by the nearest-country fallback
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Centroid {
    pub lat: f64,
    pub lon: f64,
}

/// Country metadata. Immutable once loaded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Country {
    /// Stable 3-letter code (ISO 3166-1 alpha-3)
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub capital: String,
    #[serde(default)]
    pub population: u64,
    #[serde(default)]
    pub region: String,
    /// Flag reference; an emoji in the bundled data
    #[serde(default)]
    pub flag: String,
    #[serde(default)]
    pub centroid: Option<Centroid>,
}

/// Population buckets, smallest first
pub const POPULATION_RANGES: [&str; 6] = [
    "Under 1M",
    "1M - 10M",
    "10M - 50M",
    "50M - 100M",
    "100M - 500M",
    "Over 500M",
];

pub fn population_range(population: u64) -> &'static str {
    match population {
        p if p < 1_000_000 => POPULATION_RANGES[0],
        p if p < 10_000_000 => POPULATION_RANGES[1],
        p if p < 50_000_000 => POPULATION_RANGES[2],
        p if p < 100_000_000 => POPULATION_RANGES[3],
        p if p < 500_000_000 => POPULATION_RANGES[4],
        _ => POPULATION_RANGES[5],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_population_buckets() {
        assert_eq!(population_range(0), "Under 1M");
        assert_eq!(population_range(999_999), "Under 1M");
        assert_eq!(population_range(1_000_000), "1M - 10M");
        assert_eq!(population_range(49_999_999), "10M - 50M");
        assert_eq!(population_range(67_000_000), "50M - 100M");
        assert_eq!(population_range(125_000_000), "100M - 500M");
        assert_eq!(population_range(1_400_000_000), "Over 500M");
    }
}
