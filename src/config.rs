use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::map::BufferConfig;
use crate::quiz::{QuestionKind, QuizConfig, MAX_QUESTIONS};

/// How often the buffer may check whether it needs recentering
pub const RECENTER_THROTTLE: Duration = Duration::from_millis(200);
/// How often the hovered country may be recomputed
pub const HOVER_THROTTLE: Duration = Duration::from_millis(100);

/// Terminal geography quiz on a wrapping Braille world map
#[derive(Parser, Debug, Clone)]
#[command(name = "tui-geoquiz", version, about)]
pub struct Config {
    /// Directory holding countries.json and countries.geojson
    #[arg(long, env = "GEOQUIZ_DATA_DIR", default_value = "data")]
    pub data_dir: PathBuf,

    /// JSON file for accumulated game stats
    #[arg(long, env = "GEOQUIZ_STATS_PATH", default_value = "geoquiz_stats.json")]
    pub stats_path: PathBuf,

    /// Log file (the terminal belongs to the UI)
    #[arg(long, env = "GEOQUIZ_LOG_FILE", default_value = "geoquiz.log")]
    pub log_file: PathBuf,

    /// Questions per game
    #[arg(
        long,
        env = "GEOQUIZ_QUESTIONS",
        default_value_t = 10,
        value_parser = clap::value_parser!(u16).range(1..=MAX_QUESTIONS as i64)
    )]
    pub questions: u16,

    /// Skip the menu and start a game of this kind
    #[arg(long, env = "GEOQUIZ_KIND", value_enum)]
    pub kind: Option<QuestionKind>,

    /// Seed for question selection and option order
    #[arg(long, env = "GEOQUIZ_SEED")]
    pub seed: Option<u64>,
}

impl Config {
    pub fn quiz(&self) -> QuizConfig {
        QuizConfig::default()
    }

    pub fn buffer(&self) -> BufferConfig {
        BufferConfig::default()
    }

    pub fn question_count(&self) -> usize {
        usize::from(self.questions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::try_parse_from(["tui-geoquiz"]).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.question_count(), 10);
        assert!(config.kind.is_none());
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_flags() {
        let config = Config::try_parse_from([
            "tui-geoquiz",
            "--questions",
            "3",
            "--kind",
            "flag",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(config.question_count(), 3);
        assert_eq!(config.kind, Some(QuestionKind::Flag));
        assert_eq!(config.seed, Some(9));
    }

    #[test]
    fn test_question_range() {
        assert!(Config::try_parse_from(["tui-geoquiz", "--questions", "0"]).is_err());
        assert!(Config::try_parse_from(["tui-geoquiz", "--questions", "51"]).is_err());
    }

    #[test]
    fn test_core_defaults() {
        let config = Config::try_parse_from(["tui-geoquiz"]).unwrap();
        assert_eq!(config.quiz().feedback_delay, Duration::from_millis(750));
        assert_eq!(config.buffer().recenter_threshold_deg, 120.0);
    }
}
