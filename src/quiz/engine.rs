use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{debug, info, warn};

use crate::data::{Dataset, GeoDataProvider};
use crate::error::QuizError;
use crate::quiz::kind::QuestionKind;
use crate::quiz::question::Question;
use crate::quiz::scoring::score_for;
use crate::quiz::session::{AnswerRecord, Feedback, GameSession, PendingAnswer, Phase};
use crate::quiz::timer::{TimerKind, TimerQueue};
use crate::stats::{GameStats, StatsStore, StoredStats};
use crate::telemetry::{TelemetryEvent, TelemetrySink};

/// Largest session the engine accepts
pub const MAX_QUESTIONS: usize = 50;

#[derive(Debug, Clone)]
pub struct QuizConfig {
    /// How long feedback stays up before the next question
    pub feedback_delay: Duration,
    /// One countdown unit
    pub tick_interval: Duration,
    /// Options shown for capital and flag questions
    pub option_count: usize,
    pub max_questions: usize,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            feedback_delay: Duration::from_millis(750),
            tick_interval: Duration::from_secs(1),
            option_count: 8,
            max_questions: MAX_QUESTIONS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QuizEvent {
    Start { kind: QuestionKind, count: usize },
    Submit { answer: Option<String>, time_spent: u32 },
    Tick { generation: u64 },
    Resolve { generation: u64 },
    Abandon,
    Reset,
}

/// Drives one quiz session at a time.
///
/// Every change goes through [`QuizEngine::dispatch`]. Deferred work (the
/// countdown and the end of the feedback window) sits in a [`TimerQueue`]
/// that the host drains with [`QuizEngine::advance`]. Timers carry the
/// generation they were scheduled under; starting, abandoning or resetting
/// bumps the generation so leftovers from an old session are ignored.
pub struct QuizEngine {
    provider: Arc<dyn GeoDataProvider>,
    telemetry: Arc<dyn TelemetrySink>,
    stats: Arc<dyn StatsStore>,
    config: QuizConfig,
    rng: StdRng,
    dataset: Option<Arc<Dataset>>,
    session: GameSession,
    timers: TimerQueue,
    generation: u64,
    last_error: Option<String>,
    stored_stats: Option<StoredStats>,
}

impl QuizEngine {
    pub fn new(
        provider: Arc<dyn GeoDataProvider>,
        telemetry: Arc<dyn TelemetrySink>,
        stats: Arc<dyn StatsStore>,
        config: QuizConfig,
    ) -> Self {
        Self::with_rng(provider, telemetry, stats, config, StdRng::from_os_rng())
    }

    pub fn with_rng(
        provider: Arc<dyn GeoDataProvider>,
        telemetry: Arc<dyn TelemetrySink>,
        stats: Arc<dyn StatsStore>,
        config: QuizConfig,
        rng: StdRng,
    ) -> Self {
        Self {
            provider,
            telemetry,
            stats,
            config,
            rng,
            dataset: None,
            session: GameSession::idle(),
            timers: TimerQueue::new(),
            generation: 0,
            last_error: None,
            stored_stats: None,
        }
    }

    pub fn seeded(
        provider: Arc<dyn GeoDataProvider>,
        telemetry: Arc<dyn TelemetrySink>,
        stats: Arc<dyn StatsStore>,
        config: QuizConfig,
        seed: u64,
    ) -> Self {
        Self::with_rng(provider, telemetry, stats, config, StdRng::seed_from_u64(seed))
    }

    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn phase(&self) -> Phase {
        self.session.phase
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Dataset of the last successful start
    pub fn dataset(&self) -> Option<&Arc<Dataset>> {
        self.dataset.as_ref()
    }

    /// Why the last start failed, if it did
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Aggregate returned by the stats store when the last game completed
    pub fn stored_stats(&self) -> Option<&StoredStats> {
        self.stored_stats.as_ref()
    }

    /// Apply one event. Events that are not valid in the current phase are
    /// ignored.
    pub fn dispatch(&mut self, event: QuizEvent, now: Instant) -> Phase {
        match event {
            QuizEvent::Start { kind, count } => {
                if let Err(e) = self.start(kind, count, now) {
                    debug!(error = %e, "start rejected");
                }
            }
            QuizEvent::Submit { answer, time_spent } => {
                self.submit_answer(answer, time_spent, now);
            }
            QuizEvent::Tick { generation } => self.on_tick(generation, now),
            QuizEvent::Resolve { generation } => self.on_resolve(generation, now),
            QuizEvent::Abandon => {
                self.abandon();
            }
            QuizEvent::Reset => self.reset(),
        }
        self.session.phase
    }

    /// Begin a new session of `count` questions, replacing any current one
    pub fn start(&mut self, kind: QuestionKind, count: usize, now: Instant) -> Result<(), QuizError> {
        if count == 0 || count > self.config.max_questions {
            return Err(QuizError::InvalidQuestionCount {
                got: count,
                max: self.config.max_questions,
            });
        }

        self.generation += 1;
        self.timers.cancel_all();
        self.last_error = None;
        self.stored_stats = None;
        self.session = GameSession::idle();
        self.session.phase = Phase::Loading;

        let dataset = match self.provider.initialize() {
            Ok(dataset) => dataset,
            Err(e) => return Err(self.fail_start(QuizError::DataUnavailable(e))),
        };

        let questions: Vec<Question> = dataset
            .random_countries(count, &[], &mut self.rng)
            .into_iter()
            .enumerate()
            .map(|(i, country)| {
                Question::build(i, kind, country, &dataset, self.config.option_count, &mut self.rng)
            })
            .collect();
        if questions.is_empty() {
            return Err(self.fail_start(QuizError::NoCountries));
        }

        let game_id = format!("{}_{}", kind, Utc::now().timestamp_millis());
        info!(%game_id, questions = questions.len(), "game started");
        self.session = GameSession::start(game_id, kind, questions, now);
        self.dataset = Some(dataset);
        self.schedule_tick(now);
        self.telemetry.record(TelemetryEvent::GameStarted { game_type: kind });
        Ok(())
    }

    fn fail_start(&mut self, err: QuizError) -> QuizError {
        warn!(error = %err, "could not start game");
        self.telemetry.record(TelemetryEvent::ErrorOccurred {
            message: err.to_string(),
            context: "question_generation".to_string(),
        });
        self.session = GameSession::idle();
        self.last_error = Some(err.to_string());
        err
    }

    /// Answer the current question. Returns false (and changes nothing)
    /// unless a question is waiting for an answer.
    pub fn submit_answer(&mut self, answer: Option<String>, time_spent: u32, now: Instant) -> bool {
        if self.session.phase != Phase::Active {
            return false;
        }
        let Some(question) = self.session.questions.get(self.session.current) else {
            return false;
        };

        let is_correct = question.is_correct(answer.as_deref());
        let feedback = self.feedback_for(question, answer.as_deref(), is_correct);
        debug!(
            question = question.index,
            answer = answer.as_deref().unwrap_or("<timeout>"),
            is_correct,
            time_spent,
            "answer submitted"
        );

        self.session.feedback = Some(feedback);
        self.session.pending = Some(PendingAnswer {
            answer,
            time_spent,
            is_correct,
        });
        self.session.phase = Phase::FeedbackPending;
        self.timers.cancel(TimerKind::Tick);
        self.timers
            .schedule(now + self.config.feedback_delay, TimerKind::Resolve, self.generation);
        true
    }

    fn feedback_for(&self, question: &Question, answer: Option<&str>, is_correct: bool) -> Feedback {
        let (user_country_id, correct_country_id) = match question.kind {
            QuestionKind::Location => (answer.map(str::to_string), Some(question.answer.clone())),
            QuestionKind::Flag => {
                let picked = answer
                    .and_then(|name| self.dataset.as_ref()?.country_by_name(name))
                    .map(|c| c.id.clone());
                (picked, Some(question.country.id.clone()))
            }
            QuestionKind::Capital | QuestionKind::Population => (None, None),
        };
        Feedback {
            is_correct,
            user_answer: answer.map(str::to_string),
            correct_answer: question.answer.clone(),
            user_country_id,
            correct_country_id,
        }
    }

    /// Leave the current session. Valid only while a question is on screen.
    pub fn abandon(&mut self) -> bool {
        if !self.session.phase.in_progress() {
            return false;
        }
        if let Some(kind) = self.session.kind {
            self.telemetry.record(TelemetryEvent::GameAbandoned {
                game_type: kind,
                questions_answered: self.session.answers.len(),
                total_questions: self.session.questions.len(),
            });
        }
        info!(game_id = %self.session.game_id, answered = self.session.answers.len(), "game abandoned");

        self.generation += 1;
        self.timers.cancel_all();
        self.session.phase = Phase::Abandoned;
        self.session.pending = None;
        self.session.feedback = None;
        true
    }

    /// Back to idle from any phase
    pub fn reset(&mut self) {
        self.generation += 1;
        self.timers.cancel_all();
        self.session = GameSession::idle();
        self.last_error = None;
    }

    /// Fire every timer due at or before `now`, earliest first
    pub fn advance(&mut self, now: Instant) -> Phase {
        while let Some(timer) = self.timers.pop_due(now) {
            let event = match timer.kind {
                TimerKind::Tick => QuizEvent::Tick {
                    generation: timer.generation,
                },
                TimerKind::Resolve => QuizEvent::Resolve {
                    generation: timer.generation,
                },
            };
            self.dispatch(event, timer.due);
        }
        self.session.phase
    }

    fn schedule_tick(&mut self, now: Instant) {
        self.timers
            .schedule(now + self.config.tick_interval, TimerKind::Tick, self.generation);
    }

    fn on_tick(&mut self, generation: u64, now: Instant) {
        if generation != self.generation || self.session.phase != Phase::Active {
            return;
        }
        self.session.time_left = self.session.time_left.saturating_sub(1);
        if self.session.time_left > 0 {
            self.schedule_tick(now);
            return;
        }
        let spent = self.session.kind.map(QuestionKind::duration).unwrap_or(0);
        debug!(question = self.session.current, "question timed out");
        self.submit_answer(None, spent, now);
    }

    fn on_resolve(&mut self, generation: u64, now: Instant) {
        if generation != self.generation || self.session.phase != Phase::FeedbackPending {
            return;
        }
        let Some(pending) = self.session.pending.take() else {
            return;
        };
        let Some(kind) = self.session.kind else {
            return;
        };

        let earned = score_for(kind, pending.is_correct, pending.time_spent);
        let session = &mut self.session;
        if pending.is_correct {
            session.streak += 1;
            session.best_streak = session.best_streak.max(session.streak);
        } else {
            session.streak = 0;
        }
        session.score += earned;

        let index = session.current;
        let Some(question) = session.questions.get_mut(index) else {
            return;
        };
        question.answered = true;
        question.correct = pending.is_correct;
        question.time_spent = pending.time_spent;
        question.user_answer = pending.answer.clone();
        question.score_earned = earned;

        self.telemetry.record(TelemetryEvent::QuestionAnswered {
            game_type: kind,
            country_id: question.country.id.clone(),
            country_name: question.country.name.clone(),
            correct: pending.is_correct,
            time_spent: pending.time_spent,
            score_earned: earned,
            streak: session.streak,
            user_answer: pending.answer.clone(),
            correct_answer: question.answer.clone(),
        });
        session.answers.push(AnswerRecord {
            question_index: index,
            answer: pending.answer,
            correct: pending.is_correct,
            time_spent: pending.time_spent,
            score_earned: earned,
        });
        session.feedback = None;
        session.current += 1;

        if session.current >= session.questions.len() {
            self.complete(kind, now);
        } else {
            session.phase = Phase::Active;
            session.time_left = kind.duration();
            self.schedule_tick(now);
        }
    }

    fn complete(&mut self, kind: QuestionKind, now: Instant) {
        self.timers.cancel_all();
        self.session.phase = Phase::Complete;
        self.session.time_left = 0;
        self.session.finished_at = Some(now);

        let Some(summary) = self.session.summary(now) else {
            return;
        };
        let duration_ms = summary.duration.as_millis() as u64;
        info!(
            game_id = %self.session.game_id,
            score = summary.score,
            correct = summary.correct,
            total = summary.total,
            "game completed"
        );

        self.telemetry.record(TelemetryEvent::GameCompleted {
            game_type: kind,
            final_score: summary.score,
            questions_correct: summary.correct,
            total_questions: summary.total,
            accuracy: summary.accuracy,
            game_duration_ms: duration_ms,
            best_streak: summary.best_streak,
            average_time_per_question_ms: summary.average_time.as_millis() as u64,
        });

        let stats = GameStats {
            score: summary.score,
            questions: summary.total,
            correct: summary.correct,
            accuracy: summary.accuracy,
            best_streak: summary.best_streak,
            game_type: kind,
            game_id: self.session.game_id.clone(),
            duration_ms,
        };
        match self.stats.save(&stats) {
            Ok(stored) => self.stored_stats = Some(stored),
            Err(e) => warn!(error = %e, "failed to save game stats"),
        }
    }
}
