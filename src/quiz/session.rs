use std::time::{Duration, Instant};

use serde::Serialize;

use crate::quiz::kind::QuestionKind;
use crate::quiz::question::Question;

/// Lifecycle of a session.
///
/// ```text
/// Idle -> Loading -> Active <-> FeedbackPending -> Complete
///                      |              |
///                      +--> Abandoned <+
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Idle,
    Loading,
    Active,
    FeedbackPending,
    Complete,
    Abandoned,
}

impl Phase {
    /// A question is on screen (answering or showing feedback)
    pub fn in_progress(self) -> bool {
        matches!(self, Phase::Active | Phase::FeedbackPending)
    }
}

/// What the player is shown between submitting and moving on
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Feedback {
    pub is_correct: bool,
    pub user_answer: Option<String>,
    pub correct_answer: String,
    /// Country the player picked, for kinds that mark the map
    pub user_country_id: Option<String>,
    pub correct_country_id: Option<String>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AnswerRecord {
    pub question_index: usize,
    pub answer: Option<String>,
    pub correct: bool,
    pub time_spent: u32,
    pub score_earned: u32,
}

/// Submitted answer waiting for the feedback window to close
#[derive(Clone, Debug)]
pub(crate) struct PendingAnswer {
    pub answer: Option<String>,
    pub time_spent: u32,
    pub is_correct: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct SessionSummary {
    pub score: u32,
    pub correct: usize,
    pub total: usize,
    /// Percentage, 0-100
    pub accuracy: f64,
    pub best_streak: u32,
    #[serde(with = "duration_ms")]
    pub duration: Duration,
    #[serde(with = "duration_ms")]
    pub average_time: Duration,
}

mod duration_ms {
    use std::time::Duration;

    use serde::Serializer;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }
}

/// State of one quiz. Only the engine mutates it.
#[derive(Clone, Debug)]
pub struct GameSession {
    pub(crate) game_id: String,
    pub(crate) kind: Option<QuestionKind>,
    pub(crate) phase: Phase,
    pub(crate) questions: Vec<Question>,
    pub(crate) current: usize,
    pub(crate) score: u32,
    pub(crate) streak: u32,
    pub(crate) best_streak: u32,
    pub(crate) time_left: u32,
    pub(crate) answers: Vec<AnswerRecord>,
    pub(crate) feedback: Option<Feedback>,
    pub(crate) pending: Option<PendingAnswer>,
    pub(crate) started_at: Option<Instant>,
    pub(crate) finished_at: Option<Instant>,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::idle()
    }
}

impl GameSession {
    pub fn idle() -> Self {
        Self {
            game_id: String::new(),
            kind: None,
            phase: Phase::Idle,
            questions: Vec::new(),
            current: 0,
            score: 0,
            streak: 0,
            best_streak: 0,
            time_left: 0,
            answers: Vec::new(),
            feedback: None,
            pending: None,
            started_at: None,
            finished_at: None,
        }
    }

    pub(crate) fn start(game_id: String, kind: QuestionKind, questions: Vec<Question>, now: Instant) -> Self {
        Self {
            game_id,
            kind: Some(kind),
            phase: Phase::Active,
            questions,
            time_left: kind.duration(),
            started_at: Some(now),
            ..Self::idle()
        }
    }

    pub fn game_id(&self) -> &str {
        &self.game_id
    }

    pub fn kind(&self) -> Option<QuestionKind> {
        self.kind
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_complete(&self) -> bool {
        self.phase == Phase::Complete
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.phase.in_progress() {
            self.questions.get(self.current)
        } else {
            None
        }
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// (1-based current position, total)
    pub fn position(&self) -> (usize, usize) {
        let total = self.questions.len();
        ((self.current + 1).min(total), total)
    }

    /// Share of questions already resolved, 0-100
    pub fn progress(&self) -> f64 {
        if self.questions.is_empty() {
            return 0.0;
        }
        self.current.min(self.questions.len()) as f64 / self.questions.len() as f64 * 100.0
    }

    pub fn feedback(&self) -> Option<&Feedback> {
        self.feedback.as_ref()
    }

    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn streak(&self) -> u32 {
        self.streak
    }

    pub fn best_streak(&self) -> u32 {
        self.best_streak
    }

    pub fn time_left(&self) -> u32 {
        self.time_left
    }

    /// Whole units spent on the current question so far
    pub fn time_spent(&self) -> u32 {
        self.kind
            .map(|k| k.duration().saturating_sub(self.time_left))
            .unwrap_or(0)
    }

    pub fn correct_count(&self) -> usize {
        self.answers.iter().filter(|a| a.correct).count()
    }

    /// Results; `None` until the session has started
    pub fn summary(&self, now: Instant) -> Option<SessionSummary> {
        let started = self.started_at?;
        let total = self.questions.len();
        let correct = self.correct_count();
        let duration = self.finished_at.unwrap_or(now).saturating_duration_since(started);
        let accuracy = if total == 0 {
            0.0
        } else {
            correct as f64 / total as f64 * 100.0
        };
        Some(SessionSummary {
            score: self.score,
            correct,
            total,
            accuracy,
            best_streak: self.best_streak,
            duration,
            average_time: if total == 0 { Duration::ZERO } else { duration / total as u32 },
        })
    }
}
