use std::time::Duration;

use migrator_core::JobCatalogs;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000/";

/// Field that identifies a row of the staged-groups listing.
///
/// Backends disagree: some key staged groups by `id`, others by `path`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupKeyField {
    #[default]
    Id,
    Path,
}

impl GroupKeyField {
    pub fn as_str(self) -> &'static str {
        match self {
            GroupKeyField::Id => "id",
            GroupKeyField::Path => "path",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ClientSettings {
    pub base_url: String,
    pub connect_timeout: Duration,
    /// `None` lets a hung request stall its own flow indefinitely.
    pub request_timeout: Option<Duration>,
    pub log_interval: Duration,
    pub job_poll_interval: Duration,
    pub staged_group_key: GroupKeyField,
    pub catalogs: JobCatalogs,
}

impl Default for ClientSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: None,
            log_interval: Duration::from_millis(1000),
            job_poll_interval: Duration::from_millis(2000),
            staged_group_key: GroupKeyField::Id,
            catalogs: JobCatalogs::default(),
        }
    }
}
