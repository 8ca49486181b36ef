use std::sync::Arc;
use std::time::Duration;

use tracing::{info, warn};

use crate::engine::Engine;
use crate::observability::WAL_COMPACTIONS_TOTAL;

const CHECK_INTERVAL: Duration = Duration::from_secs(30);

/// Background task that rewrites a shop's WAL once enough appends pile up.
pub async fn run_compactor(engine: Arc<Engine>, threshold: u64) {
    let mut interval = tokio::time::interval(CHECK_INTERVAL);
    loop {
        interval.tick().await;
        maybe_compact(&engine, threshold).await;
    }
}

/// Returns true when a compaction ran and succeeded.
pub async fn maybe_compact(engine: &Engine, threshold: u64) -> bool {
    let appends = engine.wal_appends_since_compact().await;
    if appends < threshold {
        return false;
    }
    match engine.compact_wal().await {
        Ok(()) => {
            metrics::counter!(WAL_COMPACTIONS_TOTAL, "status" => "ok").increment(1);
            info!(appends, "compacted WAL");
            true
        }
        Err(e) => {
            metrics::counter!(WAL_COMPACTIONS_TOTAL, "status" => "error").increment(1);
            warn!("WAL compaction failed: {e}");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use std::path::PathBuf;
    use ulid::Ulid;

    fn test_wal_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("salond_test_compactor");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let _ = std::fs::remove_file(&path);
        path
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[tokio::test]
    async fn below_threshold_is_left_alone() {
        let engine = Engine::new(test_wal_path("below.wal"), utc()).unwrap();
        engine.create_barber(Ulid::new(), "Sam".into(), None).await.unwrap();
        assert!(!maybe_compact(&engine, 100).await);
        assert!(engine.wal_appends_since_compact().await > 0);
    }

    #[tokio::test]
    async fn compacts_and_resets_counter() {
        let path = test_wal_path("above.wal");
        let engine = Engine::new(path.clone(), utc()).unwrap();
        let id = Ulid::new();
        engine.create_barber(id, "Sam".into(), None).await.unwrap();
        for i in 0..10 {
            engine
                .update_barber(id, Some(format!("Sam {i}")), None, None)
                .await
                .unwrap();
        }

        assert!(maybe_compact(&engine, 5).await);
        assert_eq!(engine.wal_appends_since_compact().await, 0);

        drop(engine);
        let reloaded = Engine::new(path, utc()).unwrap();
        let barbers = reloaded.list_barbers().await;
        assert_eq!(barbers.len(), 1);
        assert_eq!(barbers[0].name, "Sam 9");
    }
}
