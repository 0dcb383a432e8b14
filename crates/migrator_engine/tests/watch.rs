use std::sync::Mutex;
use std::time::Duration;

use migrator_core::{
    ConfigDraft, EntityKind, JobCatalogs, JobPhase, ListingOptions, StatusPayload,
};
use migrator_engine::{watch_jobs, ApiError, MigrationApi};

/// Serves a fixed sequence of job-count payloads, then errors.
struct ScriptedJobs {
    payloads: Mutex<Vec<serde_json::Value>>,
    probes: Mutex<usize>,
}

impl ScriptedJobs {
    fn new(mut payloads: Vec<serde_json::Value>) -> Self {
        payloads.reverse();
        Self {
            payloads: Mutex::new(payloads),
            probes: Mutex::new(0),
        }
    }

    fn probes(&self) -> usize {
        *self.probes.lock().unwrap()
    }
}

#[async_trait::async_trait]
impl MigrationApi for ScriptedJobs {
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
        unimplemented!()
    }
    async fn update_config(&self, _draft: &ConfigDraft) -> Result<String, ApiError> {
        unimplemented!()
    }
    async fn fetch_settings(&self) -> Result<ConfigDraft, ApiError> {
        unimplemented!()
    }
    async fn fetch_job_counts(&self, _status: &str) -> Result<StatusPayload, ApiError> {
        *self.probes.lock().unwrap() += 1;
        match self.payloads.lock().unwrap().pop() {
            Some(serde_json::Value::Object(map)) => Ok(map),
            _ => Err(ApiError::Network("script exhausted".to_string())),
        }
    }
}

#[tokio::test(start_paused = true)]
async fn watch_reports_phases_until_idle() {
    let api = ScriptedJobs::new(vec![
        serde_json::json!({"traverse-groups": 1, "post-migration-task": 1}),
        serde_json::json!({"watch-import-status": 2}),
        serde_json::json!({"some-other-task": 5}),
    ]);
    let mut phases = Vec::new();

    let idle = watch_jobs(
        &api,
        &JobCatalogs::default(),
        "STARTED",
        Duration::from_secs(2),
        |phase| phases.push(phase.clone()),
    )
    .await
    .unwrap();

    assert!(idle.contains_key("some-other-task"));
    assert_eq!(api.probes(), 3);
    assert_eq!(
        phases,
        vec![
            JobPhase::Listing("traverse-groups".to_string()),
            JobPhase::Migration("watch-import-status".to_string()),
        ]
    );
}

#[tokio::test(start_paused = true)]
async fn watch_stops_on_probe_failure() {
    let api = ScriptedJobs::new(vec![serde_json::json!({"retrieve-user": 1})]);

    let result = watch_jobs(
        &api,
        &JobCatalogs::default(),
        "STARTED",
        Duration::from_secs(2),
        |_| {},
    )
    .await;

    assert_eq!(
        result,
        Err(ApiError::Network("script exhausted".to_string()))
    );
    assert_eq!(api.probes(), 2);
}
