mod cli;
mod config;
mod logging;
mod render;
mod session;

use std::fs;
use std::future::Future;
use std::path::Path;

use anyhow::{bail, Context, Result};
use clap::Parser;
use engine_logging::{migrator_error, migrator_info};
use log::LevelFilter;
use migrator_core::{ActivityFilterCriteria, ConfigDraft, EntityRow, JobPhase, Msg};
use migrator_engine::{watch_jobs, ClientSettings, EngineHandle, MigrationApi, ReqwestApi};

use crate::cli::{Cli, Command, ConfigCommand, FilterArgs};
use crate::logging::LogDestination;
use crate::session::Session;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut app_config = config::load_config(cli.config.as_deref())?;
    if let Some(base_url) = &cli.base_url {
        app_config.base_url = base_url.clone();
    }

    let level = if cli.verbose {
        LevelFilter::Debug
    } else {
        LevelFilter::Info
    };
    let destination = match &app_config.log_file {
        Some(path) => LogDestination::Both(path.clone()),
        None => LogDestination::Terminal,
    };
    logging::initialize(destination, level);
    migrator_info!("Using backend {}", app_config.base_url);

    let settings = app_config.to_settings();
    let result = run(cli.command, &settings);
    if let Err(err) = &result {
        migrator_error!("{:#}", err);
    }
    result
}

fn run(command: Command, settings: &ClientSettings) -> Result<()> {
    match command {
        Command::Status => {
            let session = open_session(settings)?;
            print_lines(render::render_summary(&session.view()));
            Ok(())
        }
        Command::Stage { kind, ids } => {
            let mut session = open_session(settings)?;
            session.select(kind, &ids);
            finish_action(session.run_action(Msg::StageClicked(kind))?)?;
            print_lines(render::render_summary(&session.view()));
            Ok(())
        }
        Command::Migrate => {
            let mut session = open_session(settings)?;
            finish_action(session.run_action(Msg::MigrateClicked)?)
        }
        Command::List(args) => {
            let mut session = open_session(settings)?;
            finish_action(session.run_action(Msg::ListClicked((&args).into()))?)
        }
        Command::Config { action } => run_config(action, settings),
        Command::Filter(args) => run_filter(args, settings),
        Command::Watch { status } => {
            let api = ReqwestApi::new(settings)?;
            let mut last: Option<JobPhase> = None;
            let idle = block_on(watch_jobs(
                &api,
                &settings.catalogs,
                &status,
                settings.job_poll_interval,
                |phase| {
                    if last.as_ref() != Some(phase) {
                        println!("{}", describe_phase(phase));
                        last = Some(phase.clone());
                    }
                },
            ))??;
            println!("no listing or migration jobs {} ({} entries)", status, idle.len());
            Ok(())
        }
    }
}

fn open_session(settings: &ClientSettings) -> Result<Session> {
    let engine = EngineHandle::new(settings)?;
    let mut session = Session::new(engine);
    session.hydrate()?;
    Ok(session)
}

fn finish_action(outcome: std::result::Result<String, String>) -> Result<()> {
    match outcome {
        Ok(_) => Ok(()),
        Err(message) => bail!(message),
    }
}

fn run_config(action: ConfigCommand, settings: &ClientSettings) -> Result<()> {
    let api = ReqwestApi::new(settings)?;
    let current = block_on(api.fetch_settings())??;
    match action {
        ConfigCommand::Show => {
            for (key, value) in current.entries() {
                println!("{key} = {value}");
            }
            Ok(())
        }
        ConfigCommand::Set { pairs } => {
            let draft = overlay_pairs(current, &pairs)?;
            let mut session = Session::new(EngineHandle::new(settings)?);
            match session.submit_config(Msg::ConfigSubmitted(draft))? {
                Ok(_) => Ok(()),
                Err(message) => bail!(message),
            }
        }
    }
}

/// The backend replaces its whole config, so new pairs go on top of the current one.
fn overlay_pairs(mut draft: ConfigDraft, pairs: &[String]) -> Result<ConfigDraft> {
    if pairs.is_empty() {
        bail!("nothing to set; pass KEY=VALUE pairs");
    }
    for raw in pairs {
        let (key, value) = cli::parse_pair(raw).map_err(anyhow::Error::msg)?;
        draft.insert(key, value);
    }
    Ok(draft)
}

fn run_filter(args: FilterArgs, settings: &ClientSettings) -> Result<()> {
    let rows = read_rows(&args.rows)?;
    let criteria = ActivityFilterCriteria {
        amount: args.amount,
        unit: args.unit.into(),
        direction: args.direction.into(),
    };

    let mut session = open_session(settings)?;
    session.send(Msg::ActivityFilterApplied {
        kind: args.kind,
        criteria,
        rows,
        now: chrono::Utc::now(),
    });
    print_lines(render::render_rows(&session.view(), args.kind));

    if args.stage {
        finish_action(session.run_action(Msg::StageClicked(args.kind))?)?;
    }
    Ok(())
}

fn read_rows(path: &Path) -> Result<Vec<EntityRow>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading rows from {path:?}"))?;
    let mut rows: Vec<EntityRow> =
        serde_json::from_str(&text).with_context(|| format!("parsing rows in {path:?}"))?;
    for row in &mut rows {
        if row.displayed_activity.is_empty() {
            row.displayed_activity = row.last_activity_at.to_rfc3339();
        }
    }
    Ok(rows)
}

fn describe_phase(phase: &JobPhase) -> String {
    match phase {
        JobPhase::Listing(job) => format!("listing in progress ({job})"),
        JobPhase::Migration(job) => format!("migration in progress ({job})"),
    }
}

fn print_lines(lines: Vec<String>) {
    for line in lines {
        println!("{line}");
    }
}

fn block_on<F: Future>(future: F) -> Result<F::Output> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("starting async runtime")?;
    Ok(runtime.block_on(future))
}
