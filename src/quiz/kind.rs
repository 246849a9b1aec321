use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::Country;

/// The four question flavours. They share one state machine and differ in
/// timer length, answer value and option set.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Click the country on the map
    Location,
    /// Pick the capital city
    Capital,
    /// Pick the country a flag belongs to
    Flag,
    /// Pick the population bucket
    Population,
}

impl QuestionKind {
    pub const ALL: [QuestionKind; 4] = [
        QuestionKind::Location,
        QuestionKind::Capital,
        QuestionKind::Flag,
        QuestionKind::Population,
    ];

    /// Countdown length in time units (seconds)
    pub fn duration(self) -> u32 {
        match self {
            QuestionKind::Location => 30,
            _ => 10,
        }
    }

    /// Multiple choice, as opposed to answering on the map
    pub fn has_options(self) -> bool {
        !matches!(self, QuestionKind::Location)
    }

    /// Whether feedback paints countries on the map
    pub fn marks_map(self) -> bool {
        matches!(self, QuestionKind::Location | QuestionKind::Flag)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            QuestionKind::Location => "location",
            QuestionKind::Capital => "capital",
            QuestionKind::Flag => "flag",
            QuestionKind::Population => "population",
        }
    }

    pub fn prompt(self, country: &Country) -> String {
        match self {
            QuestionKind::Location => format!("Where is {}?", country.name),
            QuestionKind::Capital => format!("What is the capital of {}?", country.name),
            QuestionKind::Flag => "Which country does this flag belong to?".to_string(),
            QuestionKind::Population => {
                format!("What is the population range of {}?", country.name)
            }
        }
    }

    pub fn instructions(self) -> &'static str {
        match self {
            QuestionKind::Location => "Click on the country on the map",
            QuestionKind::Capital => "Select the correct capital city",
            QuestionKind::Flag => "Select the correct country",
            QuestionKind::Population => "Select the correct population range",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
