//! Geography quiz core: a Web Mercator Braille world map that wraps
//! endlessly east and west, hit-testing of pointer clicks against country
//! outlines, and the quiz session state machine that consumes them.

pub mod braille;
pub mod config;
pub mod data;
pub mod error;
pub mod geo;
pub mod map;
pub mod quiz;
pub mod stats;
pub mod telemetry;
pub mod throttle;

pub use config::Config;
pub use error::{GeoDataError, QuizError};
