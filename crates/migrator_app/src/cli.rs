use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use migrator_core::{ActivityDirection, ActivityUnit, EntityKind, ListingOptions};

#[derive(Debug, Parser)]
#[command(name = "migrator", version, about = "Stage source-system entities and drive migrations")]
pub struct Cli {
    /// RON config file (defaults to ./migrator.ron when present).
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL; overrides the config file.
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Log at debug level.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show what is staged on the backend.
    Status,
    /// Add entities to the staged set and submit it.
    Stage {
        kind: EntityKind,
        ids: Vec<String>,
    },
    /// Trigger the migration of everything staged.
    Migrate,
    /// List source-system data.
    List(ListArgs),
    /// Show or change backend configuration.
    Config {
        #[command(subcommand)]
        action: ConfigCommand,
    },
    /// Select rows of an exported listing by last activity.
    Filter(FilterArgs),
    /// Wait until no listing or migration job is running.
    Watch {
        #[arg(long, default_value = "STARTED")]
        status: String,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    Show,
    /// Set KEY=VALUE pairs; other keys keep their current values.
    Set { pairs: Vec<String> },
}

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long)]
    pub partial: bool,
    #[arg(long)]
    pub skip_users: bool,
    #[arg(long)]
    pub skip_groups: bool,
    #[arg(long)]
    pub skip_group_members: bool,
    #[arg(long)]
    pub skip_projects: bool,
    #[arg(long)]
    pub skip_project_members: bool,
    #[arg(long)]
    pub skip_ci: bool,
}

impl From<&ListArgs> for ListingOptions {
    fn from(args: &ListArgs) -> Self {
        ListingOptions {
            partial: args.partial,
            skip_users: args.skip_users,
            skip_groups: args.skip_groups,
            skip_group_members: args.skip_group_members,
            skip_projects: args.skip_projects,
            skip_project_members: args.skip_project_members,
            skip_ci: args.skip_ci,
        }
    }
}

#[derive(Debug, Args)]
pub struct FilterArgs {
    pub kind: EntityKind,
    #[arg(long)]
    pub amount: u32,
    #[arg(long, value_enum, default_value_t = UnitArg::Days)]
    pub unit: UnitArg,
    #[arg(long, value_enum)]
    pub direction: DirectionArg,
    /// JSON array of rows: `{"row_id", "last_activity_at", "namespace_label"}`.
    #[arg(long)]
    pub rows: PathBuf,
    /// Submit the resulting selection.
    #[arg(long)]
    pub stage: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum UnitArg {
    Days,
    Months,
}

impl From<UnitArg> for ActivityUnit {
    fn from(unit: UnitArg) -> Self {
        match unit {
            UnitArg::Days => ActivityUnit::Days,
            UnitArg::Months => ActivityUnit::Months,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum DirectionArg {
    Older,
    Newer,
}

impl From<DirectionArg> for ActivityDirection {
    fn from(direction: DirectionArg) -> Self {
        match direction {
            DirectionArg::Older => ActivityDirection::OlderThan,
            DirectionArg::Newer => ActivityDirection::NewerThan,
        }
    }
}

/// Splits `KEY=VALUE`; the value may itself contain `=`.
pub fn parse_pair(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected KEY=VALUE, got '{raw}'")),
    }
}
