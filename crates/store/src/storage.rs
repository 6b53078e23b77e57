//! Storage facade - typed records over a [`KeyValueStore`]
//!
//! Policy:
//! - Loads never fail. A missing record yields its default; a malformed record or
//!   a backend error is logged at `warn` and also yields the default.
//! - Saves never fail. Errors are logged at `warn` and swallowed; the boolean
//!   result only tells the caller whether the write landed.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use tetris_engine_core::{RunSummary, SessionSnapshot};
use tetris_engine_types::AchievementId;

use crate::error::Result;
use crate::kv::KeyValueStore;
use crate::records::{
    AchievementsRecord, Settings, Stats, ACHIEVEMENTS_KEY, SAVED_GAME_KEY, SETTINGS_KEY,
    STATS_KEY,
};

#[derive(Debug, Clone)]
pub struct Storage<S> {
    store: S,
}

impl<S: KeyValueStore> Storage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    async fn read<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key).await? {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    async fn load_or_default<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        match self.read(key).await {
            Ok(value) => value.unwrap_or_default(),
            Err(err) => {
                warn!(key, error = %err, "failed to load record, using defaults");
                T::default()
            }
        }
    }

    async fn write<T: Serialize>(&self, key: &str, value: &T) -> bool {
        let result = match serde_json::to_string(value) {
            Ok(text) => self.store.set(key, text).await,
            Err(err) => Err(err.into()),
        };
        match result {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "failed to save record");
                false
            }
        }
    }

    async fn delete(&self, key: &str) -> bool {
        match self.store.remove(key).await {
            Ok(()) => true,
            Err(err) => {
                warn!(key, error = %err, "failed to remove record");
                false
            }
        }
    }

    pub async fn load_settings(&self) -> Settings {
        self.load_or_default(SETTINGS_KEY).await
    }

    pub async fn save_settings(&self, settings: &Settings) -> bool {
        self.write(SETTINGS_KEY, settings).await
    }

    pub async fn load_stats(&self) -> Stats {
        self.load_or_default(STATS_KEY).await
    }

    pub async fn save_stats(&self, stats: &Stats) -> bool {
        self.write(STATS_KEY, stats).await
    }

    /// Fold a finished run into the persisted stats and return the new aggregates
    pub async fn record_run(&self, run: &RunSummary, at: DateTime<Utc>) -> Stats {
        let mut stats = self.load_stats().await;
        stats.record(run, at);
        self.save_stats(&stats).await;
        debug!(
            score = run.score,
            games = stats.total_games_played,
            "run recorded"
        );
        stats
    }

    pub async fn load_achievements(&self) -> AchievementsRecord {
        self.load_or_default(ACHIEVEMENTS_KEY).await
    }

    pub async fn save_achievements(&self, record: &AchievementsRecord) -> bool {
        self.write(ACHIEVEMENTS_KEY, record).await
    }

    /// Record unlocks for `ids`, keeping any earlier timestamps.
    ///
    /// Returns the ids that were not unlocked before. Nothing is written when
    /// every id was already unlocked.
    pub async fn unlock_achievements(
        &self,
        ids: &[AchievementId],
        at: DateTime<Utc>,
    ) -> Vec<AchievementId> {
        let mut record = self.load_achievements().await;
        let fresh: Vec<AchievementId> = ids
            .iter()
            .copied()
            .filter(|&id| record.unlock(id, at))
            .collect();
        if !fresh.is_empty() {
            self.save_achievements(&record).await;
        }
        fresh
    }

    pub async fn save_game(&self, snapshot: &SessionSnapshot) -> bool {
        self.write(SAVED_GAME_KEY, snapshot).await
    }

    /// The saved game, if one exists and decodes
    pub async fn load_saved_game(&self) -> Option<SessionSnapshot> {
        match self.read(SAVED_GAME_KEY).await {
            Ok(snapshot) => snapshot,
            Err(err) => {
                warn!(error = %err, "discarding unreadable saved game");
                None
            }
        }
    }

    pub async fn clear_saved_game(&self) -> bool {
        self.delete(SAVED_GAME_KEY).await
    }

    pub async fn reset_stats(&self) -> bool {
        self.save_stats(&Stats::default()).await
    }

    pub async fn reset_achievements(&self) -> bool {
        self.save_achievements(&AchievementsRecord::default()).await
    }

    /// Reset stats and achievements. Settings are kept.
    pub async fn reset_all(&self) -> bool {
        let stats = self.reset_stats().await;
        let achievements = self.reset_achievements().await;
        stats && achievements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::StoreError;
    use crate::kv::MemoryStore;
    use chrono::TimeZone;
    use tetris_engine_core::Session;
    use tetris_engine_types::{ColorPalette, Difficulty};

    /// Reads pass through; every write fails.
    struct ReadOnlyStore(MemoryStore);

    impl KeyValueStore for ReadOnlyStore {
        async fn get(&self, key: &str) -> Result<Option<String>> {
            self.0.get(key).await
        }

        async fn set(&self, _key: &str, _value: String) -> Result<()> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }

        async fn remove(&self, _key: &str) -> Result<()> {
            Err(StoreError::Unavailable("read-only".to_string()))
        }
    }

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(secs, 0).unwrap()
    }

    fn summary(score: u32) -> RunSummary {
        RunSummary {
            score,
            level: 3,
            rows_cleared: 25,
            best_combo: 4,
            tetris_count: 1,
            difficulty: Difficulty::Medium,
            play_time_ms: 90_000,
            game_over: true,
        }
    }

    #[tokio::test]
    async fn test_missing_records_load_defaults() {
        let storage = Storage::new(MemoryStore::new());
        assert_eq!(storage.load_settings().await, Settings::default());
        assert_eq!(storage.load_stats().await, Stats::default());
        assert_eq!(
            storage.load_achievements().await,
            AchievementsRecord::default()
        );
        assert!(storage.load_saved_game().await.is_none());
    }

    #[tokio::test]
    async fn test_malformed_record_falls_back() {
        let store = MemoryStore::new();
        store
            .set(STATS_KEY, "{not json".to_string())
            .await
            .unwrap();
        store
            .set(SETTINGS_KEY, r#"{"difficulty":"insane"}"#.to_string())
            .await
            .unwrap();

        let storage = Storage::new(store);
        assert_eq!(storage.load_stats().await, Stats::default());
        assert_eq!(storage.load_settings().await, Settings::default());
    }

    #[tokio::test]
    async fn test_record_run_persists() {
        let storage = Storage::new(MemoryStore::new());
        storage.record_run(&summary(1_200), at(1)).await;
        storage.record_run(&summary(400), at(2)).await;

        let stats = storage.load_stats().await;
        assert_eq!(stats.total_games_played, 2);
        assert_eq!(stats.total_score, 1_600);
        assert_eq!(stats.best_combo, 4);
        assert_eq!(stats.best_runs[0].score, 1_200);
        assert_eq!(stats.best_runs[1].timestamp, at(2));
    }

    #[tokio::test]
    async fn test_unlock_reports_only_new_ids() {
        let storage = Storage::new(MemoryStore::new());
        let first = storage
            .unlock_achievements(&[AchievementId::BlockPlacer], at(5))
            .await;
        assert_eq!(first, vec![AchievementId::BlockPlacer]);

        let second = storage
            .unlock_achievements(&[AchievementId::BlockPlacer, AchievementId::Secret], at(9))
            .await;
        assert_eq!(second, vec![AchievementId::Secret]);

        let record = storage.load_achievements().await;
        assert_eq!(record.unlocked_at(AchievementId::BlockPlacer), Some(at(5)));
    }

    #[tokio::test]
    async fn test_write_failures_are_swallowed() {
        let storage = Storage::new(ReadOnlyStore(MemoryStore::new()));
        assert!(!storage.save_settings(&Settings::default()).await);

        let stats = storage.record_run(&summary(10), at(0)).await;
        assert_eq!(stats.total_games_played, 1);
        assert!(!storage.clear_saved_game().await);
    }

    #[tokio::test]
    async fn test_saved_game_lifecycle() {
        let storage = Storage::new(MemoryStore::new());
        let mut session = Session::new(Difficulty::Hard, ColorPalette::Palette2, 42);
        session.start(0);
        session.hard_drop(100);

        assert!(storage.save_game(&session.snapshot()).await);
        assert_eq!(
            storage.load_saved_game().await,
            Some(session.snapshot())
        );

        assert!(storage.clear_saved_game().await);
        assert!(storage.load_saved_game().await.is_none());
    }

    #[test]
    fn test_reset_all_keeps_settings() {
        tokio_test::block_on(async {
            let storage = Storage::new(MemoryStore::new());
            let settings = Settings {
                difficulty: Difficulty::Hard,
                ..Settings::default()
            };
            storage.save_settings(&settings).await;
            storage.record_run(&summary(500), at(0)).await;
            storage
                .unlock_achievements(&[AchievementId::BoardMaster], at(0))
                .await;

            assert!(storage.reset_all().await);
            assert_eq!(storage.load_stats().await, Stats::default());
            assert!(storage.load_achievements().await.unlocked.is_empty());
            assert_eq!(storage.load_settings().await, settings);
        });
    }
}
