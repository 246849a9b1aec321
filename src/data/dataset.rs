use std::collections::HashMap;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::country::{Centroid, Country};
use crate::map::Feature;

/// Countries at or below this population are left out of quizzes...
pub const MIN_POPULATION: u64 = 100_000;

/// ...unless they are recognized independent micro-states
pub const MICROSTATE_ALLOW_LIST: [&str; 13] = [
    "VAT", "NRU", "TUV", "PLW", "SMR", "LIE", "MCO", "KNA", "MHL", "DMA", "AND", "ATG", "SYC",
];

/// Loaded countries and their outlines, shared read-only
#[derive(Debug)]
pub struct Dataset {
    countries: Vec<Country>,
    index: HashMap<String, usize>,
    features: Arc<[Feature]>,
}

impl Dataset {
    /// Duplicate country ids keep the first record. Countries without a
    /// centroid get the middle of their outline's bounding box.
    pub fn new(countries: Vec<Country>, features: Vec<Feature>) -> Self {
        let outline_centers: HashMap<&str, Centroid> = features
            .iter()
            .filter(|f| !f.bbox.is_empty())
            .map(|f| {
                let c = f.bbox.center();
                (f.id.as_str(), Centroid { lat: c.y, lon: c.x })
            })
            .collect();

        let mut index = HashMap::with_capacity(countries.len());
        let mut unique = Vec::with_capacity(countries.len());
        for mut country in countries {
            if index.contains_key(&country.id) {
                continue;
            }
            if country.centroid.is_none() {
                country.centroid = outline_centers.get(country.id.as_str()).copied();
            }
            index.insert(country.id.clone(), unique.len());
            unique.push(country);
        }

        Self {
            countries: unique,
            index,
            features: features.into(),
        }
    }

    pub fn country_by_id(&self, id: &str) -> Option<&Country> {
        self.index.get(id).map(|&idx| &self.countries[idx])
    }

    /// Exact name match
    pub fn country_by_name(&self, name: &str) -> Option<&Country> {
        self.countries.iter().find(|c| c.name == name)
    }

    pub fn all_countries(&self) -> &[Country] {
        &self.countries
    }

    pub fn features(&self) -> Arc<[Feature]> {
        Arc::clone(&self.features)
    }

    pub fn len(&self) -> usize {
        self.countries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.countries.is_empty()
    }

    /// Up to `count` distinct countries in random order, skipping
    /// `exclude` and anything below the population floor that is not on
    /// the micro-state allow-list.
    pub fn random_countries<R: Rng + ?Sized>(
        &self,
        count: usize,
        exclude: &[&str],
        rng: &mut R,
    ) -> Vec<&Country> {
        let mut available: Vec<&Country> = self
            .countries
            .iter()
            .filter(|c| !exclude.contains(&c.id.as_str()))
            .filter(|c| c.population > MIN_POPULATION || MICROSTATE_ALLOW_LIST.contains(&c.id.as_str()))
            .collect();
        available.shuffle(rng);
        available.truncate(count);
        available
    }
}
