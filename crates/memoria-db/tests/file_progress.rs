use chrono::{TimeZone, Utc};
use memoria_db::{JsonFileStore, PersistenceGateway, ProgressStore, UnlockOutcome};
use memoria_types::{AchievementId, Difficulty};
use tempfile::tempdir;

#[test]
fn progress_survives_a_new_store_instance() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("save.json");
    let at = Utc.with_ymd_and_hms(2026, 5, 5, 10, 0, 0).unwrap();

    {
        let mut store = ProgressStore::new(JsonFileStore::new(&path));
        store.increment_games_played().unwrap();
        store.update_high_score(7).unwrap();
        store.set_last_played_difficulty(Difficulty::Expert).unwrap();
        store
            .unlock_at(AchievementId::LevelComplete(Difficulty::Expert), at)
            .unwrap();
    }

    let mut store = ProgressStore::new(JsonFileStore::new(&path));
    assert_eq!(store.games_played(), 1);
    assert_eq!(store.high_score(), 7);
    assert_eq!(store.last_played_difficulty(), Difficulty::Expert);

    let achievements = store.achievements();
    let expert = achievements
        .iter()
        .find(|a| a.id == AchievementId::LevelComplete(Difficulty::Expert))
        .unwrap();
    assert!(expert.unlocked);
    assert_eq!(expert.unlocked_at, Some(at));
    assert_eq!(achievements.iter().filter(|a| a.unlocked).count(), 1);
}

#[test]
fn corrupt_save_falls_back_and_is_rewritten() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("save.json");
    std::fs::write(&path, "not json at all").unwrap();

    let mut store = ProgressStore::new(JsonFileStore::new(&path));
    assert_eq!(store.high_score(), 0);
    assert_eq!(store.last_played_difficulty(), Difficulty::Easy);

    assert_eq!(store.increment_games_played().unwrap(), 1);
    assert!(store.gateway_mut().load().unwrap().is_some());
}

#[test]
fn save_missing_achievements_is_completed_from_catalog() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("save.json");
    std::fs::write(
        &path,
        r#"{
            "high_score": 3,
            "total_games_played": 2,
            "last_played_difficulty": 6,
            "achievements": [
                {
                    "id": "first_sequence",
                    "name": "First Success",
                    "description": "Complete your first sequence",
                    "requirement": 1,
                    "unlocked": true,
                    "unlocked_at": "2026-01-01T00:00:00Z"
                }
            ]
        }"#,
    )
    .unwrap();

    let mut store = ProgressStore::new(JsonFileStore::new(&path));
    let achievements = store.achievements();
    assert_eq!(achievements.len(), 7);
    assert!(achievements[0].unlocked);
    assert_eq!(store.last_played_difficulty(), Difficulty::Medium);

    assert_eq!(
        store.unlock(AchievementId::FirstSequence).unwrap(),
        UnlockOutcome::AlreadyUnlocked
    );
}
