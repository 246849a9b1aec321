use crate::quiz::kind::QuestionKind;

/// Points for one answer. Faster correct answers score more, in fixed
/// steps: 5-unit cliffs on the 30-unit location timer (500 floor), 2-unit
/// cliffs on the 10-unit timers (nothing at or past the limit).
pub fn score_for(kind: QuestionKind, correct: bool, time_spent: u32) -> u32 {
    if !correct {
        return 0;
    }
    match kind {
        QuestionKind::Location => match time_spent {
            0..=5 => 1000,
            6..=10 => 900,
            11..=15 => 800,
            16..=20 => 700,
            21..=25 => 600,
            _ => 500,
        },
        _ => match time_spent {
            0..=2 => 1000,
            3..=4 => 900,
            5..=6 => 800,
            7..=8 => 700,
            9 => 600,
            _ => 0,
        },
    }
}
