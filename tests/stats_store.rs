use std::fs;

use tui_geoquiz::quiz::QuestionKind;
use tui_geoquiz::stats::{GameStats, JsonFileStatsStore, StatsStore};

fn game(score: u32) -> GameStats {
    GameStats {
        score,
        questions: 10,
        correct: 7,
        accuracy: 70.0,
        best_streak: 4,
        game_type: QuestionKind::Capital,
        game_id: format!("capital_{score}"),
        duration_ms: 42_000,
    }
}

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempfile::tempdir().unwrap();
    let store = JsonFileStatsStore::new(dir.path().join("stats.json"));
    let stored = store.read().unwrap();
    assert_eq!(stored.total_games, 0);
    assert!(stored.game_history.is_empty());
}

#[test]
fn saves_accumulate_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("stats.json");
    let store = JsonFileStatsStore::new(&path);

    store.save(&game(4000)).unwrap();
    let stored = store.save(&game(6000)).unwrap();
    assert_eq!(stored.total_games, 2);
    assert_eq!(stored.average_score(), 5000);

    // A fresh handle sees the same data
    let reread = JsonFileStatsStore::new(&path).read().unwrap();
    assert_eq!(reread, stored);
    assert_eq!(reread.best_score, 6000);
    assert_eq!(reread.best_streak, 4);

    let raw = fs::read_to_string(&path).unwrap();
    assert!(raw.contains("\"totalGames\": 2"));
}

#[test]
fn corrupt_file_is_replaced_on_save() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("stats.json");
    fs::write(&path, "{ not json").unwrap();
    let store = JsonFileStatsStore::new(&path);

    assert!(store.read().is_err());
    let stored = store.save(&game(100)).unwrap();
    assert_eq!(stored.total_games, 1);
    assert_eq!(store.read().unwrap().total_games, 1);
}
