//! Background housekeeping
//!
//! Synthesized clips pile up in the static audio directory. A background
//! interval removes files older than the retention window. Failures are
//! logged and the next tick tries again.
//!
//! A second interval evicts idle conversation sessions so anonymous
//! traffic does not grow the session map without bound.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime};

use tokio::task::JoinHandle;

use figuro_voice_agent::VoiceAgent;
use figuro_voice_config::{HousekeepingConfig, SessionConfig};

/// Start the idle-session sweep; `None` when the idle timeout is 0
pub fn spawn_session_sweeper(
    agent: Arc<VoiceAgent>,
    config: &SessionConfig,
) -> Option<JoinHandle<()>> {
    if config.idle_timeout_secs == 0 {
        tracing::info!("Idle session eviction disabled");
        return None;
    }

    let every = Duration::from_secs(config.sweep_interval_secs.max(1));
    tracing::info!(
        idle_timeout_secs = config.idle_timeout_secs,
        interval_secs = every.as_secs(),
        max_sessions = config.max_sessions,
        "Session sweeper enabled"
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let evicted = agent.sessions().evict_idle();
            if evicted > 0 {
                tracing::info!(
                    evicted,
                    remaining = agent.sessions().session_count(),
                    "Evicted idle sessions"
                );
            }
        }
    }))
}

/// Start the cleanup loop; `None` when housekeeping is disabled
pub fn spawn_audio_cleanup(config: &HousekeepingConfig) -> Option<JoinHandle<()>> {
    if !config.enabled {
        tracing::info!("Audio housekeeping disabled");
        return None;
    }

    let dir = PathBuf::from(&config.audio_dir);
    let retention = Duration::from_secs(config.retention_secs);
    let every = Duration::from_secs(config.interval_secs.max(1));

    tracing::info!(
        dir = %dir.display(),
        retention_secs = config.retention_secs,
        interval_secs = every.as_secs(),
        "Audio housekeeping enabled"
    );

    Some(tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            let removed = sweep_audio_dir(&dir, retention).await;
            if removed > 0 {
                tracing::info!(removed, "Removed expired audio files");
            }
        }
    }))
}

/// Delete regular files in `dir` whose modification time is at least
/// `retention` ago. Returns how many were removed.
pub async fn sweep_audio_dir(dir: &Path, retention: Duration) -> usize {
    let mut entries = match tokio::fs::read_dir(dir).await {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %dir.display(), error = %e, "Audio directory not readable");
            return 0;
        }
    };

    let now = SystemTime::now();
    let mut removed = 0;

    loop {
        let entry = match entries.next_entry().await {
            Ok(Some(entry)) => entry,
            Ok(None) => break,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read audio directory entry");
                break;
            }
        };

        let path = entry.path();
        let metadata = match entry.metadata().await {
            Ok(m) if m.is_file() => m,
            Ok(_) => continue,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to stat file");
                continue;
            }
        };

        let expired = metadata
            .modified()
            .ok()
            .and_then(|modified| now.duration_since(modified).ok())
            .map_or(false, |age| age >= retention);
        if !expired {
            continue;
        }

        match tokio::fs::remove_file(&path).await {
            Ok(()) => removed += 1,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Failed to delete audio file");
            }
        }
    }
    removed
}
