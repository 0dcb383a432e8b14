//! Matching of background-job status payloads against known job names.
//!
//! A status payload is a JSON object keyed by job name. Only key presence is
//! inspected. Catalogs are ordered data: the first listed name that appears in
//! the payload wins, whatever order the payload itself uses.

use serde::{Deserialize, Serialize};

/// Backend job-status payload: job name to opaque status value.
pub type StatusPayload = serde_json::Map<String, serde_json::Value>;

pub const DEFAULT_LISTING_JOBS: &[&str] = &[
    "congregate.cli.list_source.list_data",
    "traverse-groups",
    "retrieve-projects",
    "retrieve-user",
];

pub const DEFAULT_MIGRATION_JOBS: &[&str] = &[
    "watch-import-status",
    "watch-import-entity-status",
    "post-migration-task",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobCategory {
    Listing,
    Migration,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCatalogEntry {
    pub name: String,
    pub category: JobCategory,
}

/// Returns the first catalog name present as a key of `payload`.
pub fn classify<'a, S>(payload: &StatusPayload, catalog: &'a [S]) -> Option<&'a str>
where
    S: AsRef<str>,
{
    catalog
        .iter()
        .map(AsRef::as_ref)
        .find(|name| payload.contains_key(*name))
}

/// Ordered list of job names belonging to one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCatalog {
    category: JobCategory,
    names: Vec<String>,
}

impl JobCatalog {
    pub fn new<I, S>(category: JobCategory, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category,
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn default_listing() -> Self {
        Self::new(JobCategory::Listing, DEFAULT_LISTING_JOBS.iter().copied())
    }

    pub fn default_migration() -> Self {
        Self::new(JobCategory::Migration, DEFAULT_MIGRATION_JOBS.iter().copied())
    }

    pub fn category(&self) -> JobCategory {
        self.category
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn entries(&self) -> impl Iterator<Item = JobCatalogEntry> + '_ {
        self.names.iter().map(|name| JobCatalogEntry {
            name: name.clone(),
            category: self.category,
        })
    }

    pub fn classify(&self, payload: &StatusPayload) -> Option<&str> {
        classify(payload, &self.names)
    }
}

/// Phase a payload belongs to, with the job name that decided it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPhase {
    Listing(String),
    Migration(String),
}

impl JobPhase {
    pub fn job_name(&self) -> &str {
        match self {
            JobPhase::Listing(name) | JobPhase::Migration(name) => name,
        }
    }
}

/// The listing and migration catalogs used together by status watchers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobCatalogs {
    pub listing: JobCatalog,
    pub migration: JobCatalog,
}

impl Default for JobCatalogs {
    fn default() -> Self {
        Self {
            listing: JobCatalog::default_listing(),
            migration: JobCatalog::default_migration(),
        }
    }
}

impl JobCatalogs {
    /// Checks the listing catalog first, then the migration catalog.
    pub fn phase_of(&self, payload: &StatusPayload) -> Option<JobPhase> {
        if let Some(name) = self.listing.classify(payload) {
            return Some(JobPhase::Listing(name.to_string()));
        }
        self.migration
            .classify(payload)
            .map(|name| JobPhase::Migration(name.to_string()))
    }
}
