use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::{population_range, Country, Dataset, POPULATION_RANGES};
use crate::quiz::kind::QuestionKind;

/// Placeholder value the data uses for a missing capital
const UNKNOWN: &str = "Unknown";

/// One question of a session. The answer fields are filled in once, when
/// the answer is resolved.
#[derive(Clone, Debug)]
pub struct Question {
    pub index: usize,
    pub kind: QuestionKind,
    pub country: Country,
    pub prompt: String,
    /// Country id for location, capital name, country name for flag, or a
    /// population range label
    pub answer: String,
    /// Empty for location questions
    pub options: Vec<String>,
    pub answered: bool,
    pub correct: bool,
    pub time_spent: u32,
    pub user_answer: Option<String>,
    pub score_earned: u32,
}

impl Question {
    pub fn build<R: Rng + ?Sized>(
        index: usize,
        kind: QuestionKind,
        country: &Country,
        dataset: &Dataset,
        option_count: usize,
        rng: &mut R,
    ) -> Self {
        let answer = match kind {
            QuestionKind::Location => country.id.clone(),
            QuestionKind::Capital => country.capital.clone(),
            QuestionKind::Flag => country.name.clone(),
            QuestionKind::Population => population_range(country.population).to_string(),
        };

        let options = match kind {
            QuestionKind::Location => Vec::new(),
            QuestionKind::Capital => {
                let pool = dataset.all_countries().iter().map(|c| c.capital.as_str());
                generate_options(&answer, pool, option_count, rng)
            }
            QuestionKind::Flag => {
                let pool = dataset.all_countries().iter().map(|c| c.name.as_str());
                generate_options(&answer, pool, option_count, rng)
            }
            QuestionKind::Population => POPULATION_RANGES.iter().map(|r| r.to_string()).collect(),
        };

        Self {
            index,
            kind,
            country: country.clone(),
            prompt: kind.prompt(country),
            answer,
            options,
            answered: false,
            correct: false,
            time_spent: 0,
            user_answer: None,
            score_earned: 0,
        }
    }

    pub fn is_correct(&self, answer: Option<&str>) -> bool {
        answer == Some(self.answer.as_str())
    }
}

/// The correct value plus up to `count - 1` distinct decoys drawn from
/// `pool`, shuffled. Blank and "Unknown" values never become decoys.
pub fn generate_options<'a, R: Rng + ?Sized>(
    correct: &str,
    pool: impl Iterator<Item = &'a str>,
    count: usize,
    rng: &mut R,
) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut decoys: Vec<&str> = pool
        .filter(|v| !v.trim().is_empty() && *v != UNKNOWN && *v != correct)
        .filter(|v| seen.insert(*v))
        .collect();
    decoys.shuffle(rng);
    decoys.truncate(count.saturating_sub(1));

    let mut options: Vec<String> = decoys.into_iter().map(str::to_string).collect();
    options.push(correct.to_string());
    options.shuffle(rng);
    options
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::builtin_world;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_options_contain_answer_once() {
        let mut rng = StdRng::seed_from_u64(7);
        let pool = ["Paris", "Berlin", "Madrid", "Rome", "Paris", "", "Unknown", "Oslo", "Kyiv", "Lima", "Cairo"];
        for _ in 0..20 {
            let options = generate_options("Paris", pool.iter().copied(), 8, &mut rng);
            assert_eq!(options.len(), 8);
            assert_eq!(options.iter().filter(|o| *o == "Paris").count(), 1);
            assert!(!options.iter().any(|o| o.is_empty() || o == "Unknown"));
            let unique: HashSet<_> = options.iter().collect();
            assert_eq!(unique.len(), options.len());
        }
    }

    #[test]
    fn test_small_pool_gives_fewer_options() {
        let mut rng = StdRng::seed_from_u64(1);
        let options = generate_options("A", ["A", "B", "C"].into_iter(), 8, &mut rng);
        assert_eq!(options.len(), 3);
    }

    #[test]
    fn test_build_per_kind() {
        let world = builtin_world();
        let fra = world.country_by_id("FRA").unwrap();
        let mut rng = StdRng::seed_from_u64(3);

        let q = Question::build(0, QuestionKind::Location, fra, &world, 8, &mut rng);
        assert_eq!(q.answer, "FRA");
        assert!(q.options.is_empty());
        assert!(q.is_correct(Some("FRA")));
        assert!(!q.is_correct(None));

        let q = Question::build(1, QuestionKind::Capital, fra, &world, 8, &mut rng);
        assert_eq!(q.answer, "Paris");
        assert_eq!(q.options.len(), 8);
        assert!(q.options.contains(&"Paris".to_string()));

        let q = Question::build(2, QuestionKind::Flag, fra, &world, 8, &mut rng);
        assert_eq!(q.answer, "France");
        assert!(q.options.contains(&"France".to_string()));

        let q = Question::build(3, QuestionKind::Population, fra, &world, 8, &mut rng);
        assert_eq!(q.answer, "50M - 100M");
        assert_eq!(q.options.len(), POPULATION_RANGES.len());
    }
}
