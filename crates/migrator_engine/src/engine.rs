use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use engine_logging::{migrator_error, migrator_info};
use migrator_core::{ActionKind, Effect};
use tokio::sync::mpsc as async_mpsc;
use tokio::task::JoinSet;

use crate::hydrate::fetch_kind;
use crate::tail::{tail_while, DisplaySurface};
use crate::{ApiError, ClientSettings, EngineEvent, MigrationApi, ReqwestApi};

enum EngineCommand {
    Run(Effect),
}

/// Executes core effects on a worker thread and reports back through events.
///
/// The worker drives a current-thread runtime: every effect becomes its own
/// task, and tasks only interleave at await points.
pub struct EngineHandle {
    cmd_tx: async_mpsc::UnboundedSender<EngineCommand>,
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineHandle {
    pub fn new(settings: &ClientSettings) -> Result<Self, ApiError> {
        let api: Arc<dyn MigrationApi> = Arc::new(ReqwestApi::new(settings)?);
        Ok(Self::with_api(api, settings.log_interval))
    }

    pub fn with_api(api: Arc<dyn MigrationApi>, log_interval: Duration) -> Self {
        let (cmd_tx, mut cmd_rx) = async_mpsc::unbounded_channel();
        let (event_tx, event_rx) = mpsc::channel();

        thread::spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(err) => {
                    migrator_error!("could not start engine runtime: {}", err);
                    return;
                }
            };

            runtime.block_on(async move {
                let mut tasks = JoinSet::new();
                loop {
                    tokio::select! {
                        command = cmd_rx.recv() => {
                            let Some(command) = command else { break };
                            let api = api.clone();
                            let event_tx = event_tx.clone();
                            tasks.spawn(async move {
                                handle_command(api.as_ref(), command, log_interval, event_tx)
                                    .await;
                            });
                        }
                        Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                            reap(joined);
                        }
                    }
                }
                while let Some(joined) = tasks.join_next().await {
                    reap(joined);
                }
                migrator_info!("engine stopped");
            });
        });

        Self { cmd_tx, event_rx }
    }

    pub fn dispatch(&self, effect: Effect) {
        let _ = self.cmd_tx.send(EngineCommand::Run(effect));
    }

    pub fn dispatch_all(&self, effects: Vec<Effect>) {
        for effect in effects {
            self.dispatch(effect);
        }
    }

    pub fn try_recv(&self) -> Option<EngineEvent> {
        self.event_rx.try_recv().ok()
    }

    /// Blocks until the next event; `None` once the worker has gone away.
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }
}

fn reap(joined: Result<(), tokio::task::JoinError>) {
    if let Err(err) = joined {
        migrator_error!("engine task failed: {}", err);
    }
}

struct ChannelDisplay {
    tx: mpsc::Sender<EngineEvent>,
}

impl DisplaySurface for ChannelDisplay {
    fn write(&self, text: &str) {
        let _ = self.tx.send(EngineEvent::LogUpdated(text.to_string()));
    }
}

async fn handle_command(
    api: &dyn MigrationApi,
    command: EngineCommand,
    log_interval: Duration,
    event_tx: mpsc::Sender<EngineEvent>,
) {
    let EngineCommand::Run(effect) = command;
    match effect {
        Effect::Hydrate { kind } => {
            let event = match fetch_kind(api, kind).await {
                Ok(ids) => EngineEvent::Hydrated { kind, ids },
                Err(error) => EngineEvent::HydrationFailed { kind, error },
            };
            let _ = event_tx.send(event);
        }
        Effect::PostStage { kind, body } => {
            let primary = api.post_stage(kind, &body);
            run_action(api, ActionKind::Stage(kind), primary, log_interval, event_tx).await;
        }
        Effect::TriggerMigration => {
            let primary = api.trigger_migration();
            run_action(api, ActionKind::Migrate, primary, log_interval, event_tx).await;
        }
        Effect::TriggerListing(options) => {
            let primary = api.trigger_listing(&options);
            run_action(api, ActionKind::List, primary, log_interval, event_tx).await;
        }
        Effect::UpdateConfig(draft) => {
            let result = api.update_config(&draft).await;
            let _ = event_tx.send(EngineEvent::ConfigUpdated(result));
        }
    }
}

async fn run_action<F>(
    api: &dyn MigrationApi,
    action: ActionKind,
    primary: F,
    log_interval: Duration,
    event_tx: mpsc::Sender<EngineEvent>,
) where
    F: std::future::Future<Output = Result<String, ApiError>>,
{
    let display = ChannelDisplay {
        tx: event_tx.clone(),
    };
    let result = tail_while(api, &display, log_interval, primary).await;
    migrator_info!("{:?} finished ok={}", action, result.is_ok());
    let _ = event_tx.send(EngineEvent::ActionFinished { action, result });
}
