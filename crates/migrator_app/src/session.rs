use anyhow::{anyhow, Result};
use engine_logging::{migrator_debug, migrator_warn};
use migrator_core::{update, AppState, EntityKind, Msg, StagingView};
use migrator_engine::{EngineEvent, EngineHandle};

use crate::render;

/// One operator session: owns the state, feeds engine events through `update`
/// and prints the log display whenever it changes.
pub struct Session {
    state: AppState,
    engine: EngineHandle,
    last_log: Option<String>,
}

impl Session {
    pub fn new(engine: EngineHandle) -> Self {
        Self {
            state: AppState::new(),
            engine,
            last_log: None,
        }
    }

    pub fn view(&self) -> StagingView {
        self.state.view()
    }

    /// Applies `msg`, dispatches its effects and redraws if needed.
    /// Returns how many effects were dispatched.
    pub fn send(&mut self, msg: Msg) -> usize {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        let was_dirty = state.consume_dirty();
        self.state = state;

        let count = effects.len();
        self.engine.dispatch_all(effects);
        if was_dirty {
            self.redraw_log();
        }
        count
    }

    fn redraw_log(&mut self) {
        let line = render::render_log(&self.state.view());
        if line.is_some() && line != self.last_log {
            if let Some(text) = &line {
                println!("{text}");
            }
            self.last_log = line;
        }
    }

    fn next_event(&self) -> Result<EngineEvent> {
        self.engine
            .recv()
            .ok_or_else(|| anyhow!("engine stopped unexpectedly"))
    }

    /// Starts the session and waits for all three hydration queries.
    pub fn hydrate(&mut self) -> Result<()> {
        let mut pending = self.send(Msg::SessionStarted);
        while pending > 0 {
            let event = self.next_event()?;
            if matches!(
                event,
                EngineEvent::Hydrated { .. } | EngineEvent::HydrationFailed { .. }
            ) {
                pending -= 1;
            }
            self.send(event.into_msg());
        }
        for (kind, error) in &self.state.view().hydration_errors {
            migrator_warn!("staged {} could not be loaded: {}", kind.plural(), error);
        }
        Ok(())
    }

    pub fn select(&mut self, kind: EntityKind, ids: &[String]) {
        self.send(Msg::SelectAll {
            kind,
            ids: ids.to_vec(),
        });
    }

    /// Sends a long-running action message and pumps events until it finishes.
    ///
    /// The returned text is whatever the backend answered, or the error text.
    pub fn run_action(&mut self, msg: Msg) -> Result<std::result::Result<String, String>> {
        if self.send(msg) == 0 {
            return Err(anyhow!("action was not started (already in progress)"));
        }
        loop {
            let event = self.next_event()?;
            if let EngineEvent::ActionFinished { action, result } = &event {
                migrator_debug!("{:?} finished", action);
                let outcome = result.clone().map_err(|err| err.to_string());
                self.send(event.into_msg());
                return Ok(outcome);
            }
            self.send(event.into_msg());
        }
    }

    /// Submits a config draft and waits for the backend's answer.
    pub fn submit_config(&mut self, msg: Msg) -> Result<std::result::Result<String, String>> {
        self.send(msg);
        loop {
            let event = self.next_event()?;
            if let EngineEvent::ConfigUpdated(result) = &event {
                let outcome = result.clone().map_err(|err| err.inline_message());
                self.send(event.into_msg());
                return Ok(outcome);
            }
            self.send(event.into_msg());
        }
    }
}
