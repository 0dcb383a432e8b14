use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// The three kinds of source-system entity an operator can stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Project,
    Group,
    User,
}

impl EntityKind {
    pub const ALL: [EntityKind; 3] = [EntityKind::Project, EntityKind::Group, EntityKind::User];

    pub fn plural(self) -> &'static str {
        match self {
            EntityKind::Project => "projects",
            EntityKind::Group => "groups",
            EntityKind::User => "users",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            EntityKind::Project => "project",
            EntityKind::Group => "group",
            EntityKind::User => "user",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity kind '{0}' (expected projects, groups or users)")]
pub struct ParseEntityKindError(pub String);

impl FromStr for EntityKind {
    type Err = ParseEntityKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "project" | "projects" => Ok(EntityKind::Project),
            "group" | "groups" => Ok(EntityKind::Group),
            "user" | "users" => Ok(EntityKind::User),
            other => Err(ParseEntityKindError(other.to_string())),
        }
    }
}
