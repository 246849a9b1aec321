mod engine;
mod kind;
mod question;
mod scoring;
mod session;
mod timer;

pub use engine::{QuizConfig, QuizEngine, QuizEvent, MAX_QUESTIONS};
pub use kind::QuestionKind;
pub use question::{generate_options, Question};
pub use scoring::score_for;
pub use session::{AnswerRecord, Feedback, GameSession, Phase, SessionSummary};
pub use timer::{Timer, TimerKind, TimerQueue};
