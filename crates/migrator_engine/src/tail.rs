//! Log tailing beside a long-running backend action.
//!
//! The action and the tail timer are two flows joined on the caller's task.
//! They share a [`CancellationToken`] that the action cancels as soon as it
//! resolves, whether it succeeded or failed. The tail checks the token before
//! each write and never writes once it is set, so whatever the caller shows
//! for the action's result afterwards is the last thing on the display.

use std::future::Future;
use std::time::Duration;

use engine_logging::{migrator_debug, migrator_warn};
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::{ApiError, MigrationApi};

/// `interval_at` rejects a zero period.
const MIN_TAIL_PERIOD: Duration = Duration::from_millis(1);

/// Where log snapshots and final results are shown.
pub trait DisplaySurface: Send + Sync {
    fn write(&self, text: &str);
}

/// Runs `primary` while tailing the log onto `surface`.
///
/// Returns once both the action and the tail have stopped; the tail has made
/// its last write by then. The final overwrite is left to the caller.
pub async fn tail_while<F>(
    api: &dyn MigrationApi,
    surface: &dyn DisplaySurface,
    interval: Duration,
    primary: F,
) -> Result<String, ApiError>
where
    F: Future<Output = Result<String, ApiError>>,
{
    let token = CancellationToken::new();
    let action = {
        let token = token.clone();
        async move {
            let result = primary.await;
            token.cancel();
            result
        }
    };
    let tail = tail_log(api, surface, interval, token);

    let (result, writes) = tokio::join!(action, tail);
    migrator_debug!("log tail stopped after {} writes", writes);
    result
}

async fn tail_log(
    api: &dyn MigrationApi,
    surface: &dyn DisplaySurface,
    period: Duration,
    token: CancellationToken,
) -> usize {
    let period = period.max(MIN_TAIL_PERIOD);
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut writes = 0usize;

    loop {
        tokio::select! {
            biased;
            _ = token.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let snapshot = tokio::select! {
            biased;
            _ = token.cancelled() => break,
            snapshot = api.fetch_log() => snapshot,
        };
        if token.is_cancelled() {
            break;
        }

        match snapshot {
            Ok(text) => {
                surface.write(&text);
                writes += 1;
            }
            Err(err) => migrator_warn!("log snapshot failed: {}", err),
        }
    }

    writes
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use migrator_core::{ConfigDraft, EntityKind, ListingOptions, StatusPayload};

    use super::*;

    struct LogOnlyApi {
        fetches: AtomicUsize,
        fetch_delay: Duration,
    }

    impl LogOnlyApi {
        fn new(fetch_delay: Duration) -> Self {
            Self {
                fetches: AtomicUsize::new(0),
                fetch_delay,
            }
        }
    }

    #[async_trait::async_trait]
    impl MigrationApi for LogOnlyApi {
        async fn fetch_staged(&self, _kind: EntityKind) -> Result<Vec<String>, ApiError> {
            unimplemented!()
        }
        async fn post_stage(&self, _kind: EntityKind, _body: &str) -> Result<String, ApiError> {
            unimplemented!()
        }
        async fn trigger_migration(&self) -> Result<String, ApiError> {
            unimplemented!()
        }
        async fn trigger_listing(&self, _options: &ListingOptions) -> Result<String, ApiError> {
            unimplemented!()
        }
        async fn fetch_log(&self) -> Result<String, ApiError> {
            let n = self.fetches.fetch_add(1, Ordering::SeqCst) + 1;
            tokio::time::sleep(self.fetch_delay).await;
            Ok(format!("log {n}"))
        }
        async fn update_config(&self, _draft: &ConfigDraft) -> Result<String, ApiError> {
            unimplemented!()
        }
        async fn fetch_settings(&self) -> Result<ConfigDraft, ApiError> {
            unimplemented!()
        }
        async fn fetch_job_counts(&self, _status: &str) -> Result<StatusPayload, ApiError> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct RecordingSurface {
        writes: Mutex<Vec<String>>,
    }

    impl RecordingSurface {
        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    impl DisplaySurface for RecordingSurface {
        fn write(&self, text: &str) {
            self.writes.lock().unwrap().push(text.to_string());
        }
    }

    const TICK: Duration = Duration::from_millis(1000);

    #[tokio::test(start_paused = true)]
    async fn tail_writes_once_per_tick_until_success() {
        let api = LogOnlyApi::new(Duration::ZERO);
        let surface = RecordingSurface::default();

        let result = tail_while(&api, &surface, TICK, async {
            tokio::time::sleep(Duration::from_millis(3500)).await;
            Ok("staged 2 projects".to_string())
        })
        .await;

        assert_eq!(result, Ok("staged 2 projects".to_string()));
        assert_eq!(surface.writes(), vec!["log 1", "log 2", "log 3"]);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_also_cancels_the_tail() {
        let api = LogOnlyApi::new(Duration::ZERO);
        let surface = RecordingSurface::default();

        let result = tail_while(&api, &surface, TICK, async {
            tokio::time::sleep(Duration::from_millis(2500)).await;
            Err(ApiError::Network("connection reset".to_string()))
        })
        .await;
        assert_eq!(
            result,
            Err(ApiError::Network("connection reset".to_string()))
        );

        // Give a leaked timer the chance to misbehave.
        tokio::time::sleep(TICK * 5).await;

        assert_eq!(surface.writes(), vec!["log 1", "log 2"]);
        assert_eq!(api.fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn in_flight_snapshot_is_dropped_on_completion() {
        let api = LogOnlyApi::new(Duration::from_millis(800));
        let surface = RecordingSurface::default();

        let result = tail_while(&api, &surface, Duration::from_millis(100), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            Ok("done".to_string())
        })
        .await;

        assert_eq!(result, Ok("done".to_string()));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 1);
        assert!(surface.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_action_never_fetches_log() {
        let api = LogOnlyApi::new(Duration::ZERO);
        let surface = RecordingSurface::default();

        let result = tail_while(&api, &surface, TICK, async { Ok("fast".to_string()) }).await;

        assert_eq!(result, Ok("fast".to_string()));
        assert_eq!(api.fetches.load(Ordering::SeqCst), 0);
        assert!(surface.writes().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn zero_interval_is_raised_to_the_minimum_period() {
        let api = LogOnlyApi::new(Duration::ZERO);
        let surface = RecordingSurface::default();

        let result = tail_while(&api, &surface, Duration::ZERO, async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok("done".to_string())
        })
        .await;

        assert_eq!(result, Ok("done".to_string()));
        let writes = surface.writes();
        assert!(!writes.is_empty());
        assert!(writes.iter().all(|text| text.starts_with("log ")));
    }
}
