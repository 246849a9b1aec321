use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::quiz::QuestionKind;

/// Events the core reports. Recording never fails at the call site.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TelemetryEvent {
    GameStarted {
        game_type: QuestionKind,
    },
    QuestionAnswered {
        game_type: QuestionKind,
        country_id: String,
        country_name: String,
        correct: bool,
        time_spent: u32,
        score_earned: u32,
        streak: u32,
        user_answer: Option<String>,
        correct_answer: String,
    },
    GameCompleted {
        game_type: QuestionKind,
        final_score: u32,
        questions_correct: usize,
        total_questions: usize,
        accuracy: f64,
        game_duration_ms: u64,
        best_streak: u32,
        average_time_per_question_ms: u64,
    },
    GameAbandoned {
        game_type: QuestionKind,
        questions_answered: usize,
        total_questions: usize,
    },
    ErrorOccurred {
        message: String,
        context: String,
    },
    MapClick {
        country_id: Option<String>,
        lon: f64,
        lat: f64,
        direct_hit: bool,
    },
}

impl TelemetryEvent {
    pub fn name(&self) -> &'static str {
        match self {
            TelemetryEvent::GameStarted { .. } => "game_started",
            TelemetryEvent::QuestionAnswered { .. } => "question_answered",
            TelemetryEvent::GameCompleted { .. } => "game_completed",
            TelemetryEvent::GameAbandoned { .. } => "game_abandoned",
            TelemetryEvent::ErrorOccurred { .. } => "error_occurred",
            TelemetryEvent::MapClick { .. } => "map_click",
        }
    }
}

pub trait TelemetrySink: Send + Sync {
    fn record(&self, event: TelemetryEvent);
}

/// Writes every event as one JSON line through `tracing`
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl TelemetrySink for LogSink {
    fn record(&self, event: TelemetryEvent) {
        match serde_json::to_string(&event) {
            Ok(json) => info!(target: "telemetry", event = event.name(), "{json}"),
            Err(e) => warn!(event = event.name(), error = %e, "failed to serialize telemetry event"),
        }
    }
}

/// Keeps events in memory
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TelemetryEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TelemetryEvent> {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    /// How many events with this name were recorded
    pub fn count(&self, name: &str) -> usize {
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|e| e.name() == name)
            .count()
    }
}

impl TelemetrySink for MemorySink {
    fn record(&self, event: TelemetryEvent) {
        self.events.lock().unwrap_or_else(PoisonError::into_inner).push(event);
    }
}
