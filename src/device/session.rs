//! Public session handle for one opened joystick device

use crate::device::read_loop::ReadLoop;
use crate::dispatch::Handler;
use crate::events::{EventKey, InputEvent};
use crate::protocol::mode::InputMode;
use crate::protocol::scale::{ConfigError, MaxAxisPosition};
use std::path::Path;
use tokio::fs::File;
use tokio::io::AsyncRead;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

/// Lifecycle of a device session.
///
/// `Uninitialized → Initializing → Active → Closed`, where the
/// `Initializing` step is skipped when the input mode is preset. `Closed`
/// is terminal; there is no reconnection, a new session must be created.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Initializing,
    Active,
    Closed,
}

/// Raised when the device cannot be opened.
#[derive(Debug, thiserror::Error)]
#[error("failed opening device '{path}'")]
pub struct DeviceOpenError {
    pub path: String,
    #[source]
    pub source: std::io::Error,
}

/// Errors raised by operations on a live session.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// The input mode was already resolved, by detection or explicitly.
    #[error("cannot change input mode, it is already resolved")]
    ModeAlreadyResolved,

    /// The read loop has terminated.
    #[error("session is closed")]
    Closed,
}

pub(crate) enum Command {
    Subscribe(EventKey, Handler),
    SetMaxAxisPosition(MaxAxisPosition),
    SetInputMode(InputMode, oneshot::Sender<Result<(), SessionError>>),
}

/// Handle to an open device and its read loop task.
///
/// Dropping the handle cancels the loop; [`Session::close`] additionally
/// waits for it to stop, guaranteeing that no handler runs afterwards.
pub struct Session {
    commands: mpsc::UnboundedSender<Command>,
    shutdown: CancellationToken,
    state: watch::Receiver<SessionState>,
    task: Option<JoinHandle<()>>,
}

impl Session {
    /// Opens the device read-only and starts the read loop.
    ///
    /// With `mode` set, the identification preamble is skipped and the
    /// session goes active immediately; otherwise the first 18 frames
    /// are consumed to resolve the mode.
    ///
    /// # Errors
    ///
    /// [`DeviceOpenError`] when the device cannot be opened. Later
    /// failures (detection, read errors) close the session instead and
    /// are observable through [`Session::state_changes`].
    pub async fn open(
        device: impl AsRef<Path>,
        mode: Option<InputMode>,
    ) -> Result<Self, DeviceOpenError> {
        let path = device.as_ref();
        let file = File::open(path).await.map_err(|source| DeviceOpenError {
            path: path.display().to_string(),
            source,
        })?;

        info!(device = %path.display(), "device opened");
        Ok(Self::from_reader(file, mode))
    }

    /// Starts a session over any byte source producing device frames.
    ///
    /// This is the seam `open` goes through and what tests and replay
    /// tooling drive directly.
    pub fn from_reader<R>(reader: R, mode: Option<InputMode>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let (command_tx, command_rx) = mpsc::unbounded_channel();
        let shutdown = CancellationToken::new();
        let (state_tx, state_rx) = watch::channel(SessionState::Uninitialized);

        let read_loop = ReadLoop::new(reader, mode, command_rx, shutdown.clone(), state_tx);
        let task = tokio::spawn(read_loop.run());
        debug!(preset_mode = ?mode, "read loop spawned");

        Self {
            commands: command_tx,
            shutdown,
            state: state_rx,
            task: Some(task),
        }
    }

    /// Registers a handler for one event key.
    ///
    /// Handlers run synchronously in the read loop, in registration
    /// order, before the next device read is issued.
    ///
    /// # Errors
    ///
    /// [`SessionError::Closed`] when the read loop has terminated.
    pub fn subscribe<F>(&self, key: EventKey, handler: F) -> Result<(), SessionError>
    where
        F: FnMut(&InputEvent) + Send + 'static,
    {
        self.commands
            .send(Command::Subscribe(key, Box::new(handler)))
            .map_err(|_| SessionError::Closed)
    }

    /// Reconfigures the maximum scaled axis position.
    ///
    /// The new maximum applies to frames decoded after the update;
    /// in-flight events keep the value they were scaled with.
    ///
    /// # Errors
    ///
    /// [`ConfigError`] for values outside `1..=65535`; the previous
    /// maximum stays in effect.
    pub fn set_max_axis_position(&self, value: i64) -> Result<(), ConfigError> {
        let max_axis = MaxAxisPosition::new(value)?;
        if self
            .commands
            .send(Command::SetMaxAxisPosition(max_axis))
            .is_err()
        {
            // a closed session decodes no further frames anyway
            debug!("maximum axis position update ignored, session is closed");
        }
        Ok(())
    }

    /// Resolves the input mode explicitly instead of by detection.
    ///
    /// # Errors
    ///
    /// [`SessionError::ModeAlreadyResolved`] once the mode is set, and
    /// [`SessionError::Closed`] when the read loop has terminated.
    pub async fn set_input_mode(&self, mode: InputMode) -> Result<(), SessionError> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.commands
            .send(Command::SetInputMode(mode, reply_tx))
            .map_err(|_| SessionError::Closed)?;
        reply_rx.await.map_err(|_| SessionError::Closed)?
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Watch receiver over lifecycle transitions.
    pub fn state_changes(&self) -> watch::Receiver<SessionState> {
        self.state.clone()
    }

    /// Stops the read loop, clears all subscriptions and releases the
    /// device handle. Idempotent; when it returns, no further event is
    /// dispatched.
    pub async fn close(&mut self) {
        let Some(task) = self.task.take() else {
            return;
        };

        info!("closing session");
        self.shutdown.cancel();
        if let Err(err) = task.await {
            error!(error = %err, "read loop task failed during close");
        }
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        // cooperative: a read in flight will not rearm after this
        self.shutdown.cancel();
    }
}
