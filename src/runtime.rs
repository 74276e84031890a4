//! The single sequential context the controller lives in.
//!
//! Terminal input, WebSocket clients and the tick task never touch the
//! controller directly. They send `Request`s down one channel and the
//! runtime applies them in arrival order.

use serde::Serialize;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, info, warn};

use crate::error::TimerError;
use crate::pomodoro::controller::SessionController;
use crate::pomodoro::events::Snapshot;
use crate::pomodoro::pomodoro::Mode;
use crate::pomodoro::scheduler::{TickId, TickScheduler};
use crate::settings::{Settings, SettingsStore, Theme};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Start,
    Pause,
    Toggle,
    Reset,
    UpdateConfig { mode: Mode, minutes: i64 },
    Status,
    Theme,
    ToggleTheme,
}

/// What every command answers with.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Reply {
    pub snapshot: Snapshot,
    pub theme: Theme,
}

pub type ReplySender = oneshot::Sender<Result<Reply, TimerError>>;

#[derive(Debug)]
pub enum Request {
    Command {
        command: Command,
        reply: Option<ReplySender>,
    },
    Tick(TickId),
    Shutdown,
}

pub type RequestSender = mpsc::UnboundedSender<Request>;
pub type RequestReceiver = mpsc::UnboundedReceiver<Request>;

pub fn request_channel() -> (RequestSender, RequestReceiver) {
    mpsc::unbounded_channel()
}

/// Send `command` and wait for the runtime to apply it.
pub async fn send_command(tx: &RequestSender, command: Command) -> Result<Reply, TimerError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send(Request::Command {
        command,
        reply: Some(reply_tx),
    })
    .map_err(|_| TimerError::RuntimeClosed)?;
    reply_rx.await.map_err(|_| TimerError::RuntimeClosed)?
}

/// `send_command` for threads outside the async runtime.
pub fn send_command_blocking(tx: &RequestSender, command: Command) -> Result<Reply, TimerError> {
    let (reply_tx, reply_rx) = oneshot::channel();
    tx.send(Request::Command {
        command,
        reply: Some(reply_tx),
    })
    .map_err(|_| TimerError::RuntimeClosed)?;
    reply_rx.blocking_recv().map_err(|_| TimerError::RuntimeClosed)?
}

pub struct Runtime<S: TickScheduler, St: SettingsStore> {
    controller: SessionController<S>,
    settings: Settings,
    store: St,
}

impl<S: TickScheduler, St: SettingsStore> Runtime<S, St> {
    pub fn new(controller: SessionController<S>, store: St) -> Self {
        let settings = store.load();
        debug!(theme = settings.theme.as_str(), "settings loaded");
        Self {
            controller,
            settings,
            store,
        }
    }

    pub fn controller(&self) -> &SessionController<S> {
        &self.controller
    }

    pub fn theme(&self) -> Theme {
        self.settings.theme
    }

    pub fn apply(&mut self, command: Command) -> Result<Reply, TimerError> {
        match command {
            Command::Start => self.controller.start(),
            Command::Pause => self.controller.pause(),
            Command::Toggle => self.controller.toggle(),
            Command::Reset => self.controller.reset(),
            Command::UpdateConfig { mode, minutes } => {
                self.controller.update_config(mode, minutes)?
            }
            Command::Status | Command::Theme => {}
            Command::ToggleTheme => self.toggle_theme(),
        }
        Ok(self.reply())
    }

    /// Returns false once the runtime should stop.
    pub fn handle(&mut self, request: Request) -> bool {
        match request {
            Request::Tick(id) => {
                self.controller.tick_from(id);
            }
            Request::Command { command, reply } => {
                let result = self.apply(command.clone());
                if let Err(e) = &result {
                    warn!(?command, error = %e, "command rejected");
                }
                if let Some(reply) = reply {
                    // The requester may have gone away; nothing to do then.
                    let _ = reply.send(result);
                }
            }
            Request::Shutdown => {
                info!("shutting down timer runtime");
                return false;
            }
        }
        true
    }

    /// Apply requests until shutdown or until every sender is gone. Returns
    /// the final state.
    pub async fn run(mut self, mut rx: RequestReceiver) -> Snapshot {
        while let Some(request) = rx.recv().await {
            if !self.handle(request) {
                break;
            }
        }
        self.controller.pause();
        self.controller.snapshot()
    }

    fn toggle_theme(&mut self) {
        self.settings.theme = self.settings.theme.toggled();
        info!(theme = self.settings.theme.as_str(), "theme changed");
        if let Err(e) = self.store.save(&self.settings) {
            warn!(error = %e, "failed to persist theme preference");
        }
    }

    fn reply(&self) -> Reply {
        Reply {
            snapshot: self.controller.snapshot(),
            theme: self.settings.theme,
        }
    }
}
