//! The continuous read/decode/dispatch loop
//!
//! One read of 8 bytes is in flight at any time; the next read is issued
//! only after the previous frame has been decoded and dispatched, so
//! emitted events keep strict arrival order. The loop suspends only at
//! the read boundary and terminates when the session is closed, when the
//! device errors, or when the disconnect sentinel shows up.

use crate::device::session::{Command, SessionError, SessionState};
use crate::dispatch::Dispatcher;
use crate::protocol::decoder::decode;
use crate::protocol::frame::Frame;
use crate::protocol::mode::{InputMode, ModeDetector};
use crate::protocol::scale::MaxAxisPosition;
use std::io;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, trace, warn};

pub(crate) struct ReadLoop<R> {
    reader: R,
    mode: Option<InputMode>,
    max_axis: MaxAxisPosition,
    dispatcher: Dispatcher,
    commands: mpsc::UnboundedReceiver<Command>,
    shutdown: CancellationToken,
    state_tx: watch::Sender<SessionState>,
}

impl<R: AsyncRead + Unpin> ReadLoop<R> {
    pub(crate) fn new(
        reader: R,
        mode: Option<InputMode>,
        commands: mpsc::UnboundedReceiver<Command>,
        shutdown: CancellationToken,
        state_tx: watch::Sender<SessionState>,
    ) -> Self {
        Self {
            reader,
            mode,
            max_axis: MaxAxisPosition::default(),
            dispatcher: Dispatcher::new(),
            commands,
            shutdown,
            state_tx,
        }
    }

    pub(crate) async fn run(mut self) {
        if self.mode.is_none() {
            self.state_tx.send_replace(SessionState::Initializing);
            debug!("input mode unresolved, reading identification preamble");

            match self.detect_mode().await {
                Some(mode) => {
                    self.mode = Some(mode);
                    info!(mode = %mode, "input mode resolved");
                }
                None => {
                    self.finish();
                    return;
                }
            }
        }

        self.state_tx.send_replace(SessionState::Active);
        debug!("read loop active");
        self.dispatch_loop().await;
        self.finish();
    }

    /// Consumes the identification preamble. Returns `None` when the
    /// session should close instead of going active (cancellation,
    /// detection failure, device error).
    async fn detect_mode(&mut self) -> Option<InputMode> {
        let mut detector = ModeDetector::new();

        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    debug!("close requested during mode detection");
                    return None;
                }
                command = self.commands.recv() => match command {
                    Some(command) => {
                        self.apply_command(command);
                        // an explicit mode skips the rest of the preamble
                        if let Some(mode) = self.mode {
                            return Some(mode);
                        }
                    }
                    None => {
                        debug!("all session handles dropped during mode detection");
                        return None;
                    }
                },
                result = read_frame(&mut self.reader) => match result {
                    Ok(Some(frame)) => match detector.push(&frame) {
                        Ok(Some(mode)) => return Some(mode),
                        Ok(None) => {}
                        Err(err) => {
                            error!(error = %err, "input mode detection failed");
                            return None;
                        }
                    },
                    Ok(None) => {}
                    Err(err) => {
                        error!(error = %err, "device read failed during mode detection");
                        return None;
                    }
                },
            }
        }
    }

    async fn dispatch_loop(&mut self) {
        loop {
            tokio::select! {
                biased;

                _ = self.shutdown.cancelled() => {
                    debug!("close requested, stopping read loop");
                    return;
                }
                command = self.commands.recv() => match command {
                    Some(command) => self.apply_command(command),
                    None => {
                        debug!("all session handles dropped, stopping read loop");
                        return;
                    }
                },
                result = read_frame(&mut self.reader) => match result {
                    Ok(Some(frame)) => {
                        if frame.is_disconnect_sentinel() {
                            info!("disconnect sentinel observed, closing session");
                            return;
                        }
                        if let Some(event) = decode(&frame, self.max_axis) {
                            trace!(?event, "dispatching event");
                            self.dispatcher.publish(&event);
                        }
                    }
                    Ok(None) => {}
                    Err(err) => {
                        error!(error = %err, "device read failed, closing session");
                        return;
                    }
                },
            }
        }
    }

    fn apply_command(&mut self, command: Command) {
        match command {
            Command::Subscribe(key, handler) => {
                self.dispatcher.subscribe(key, handler);
            }
            Command::SetMaxAxisPosition(max_axis) => {
                debug!(max_axis = max_axis.get(), "updating maximum axis position");
                self.max_axis = max_axis;
            }
            Command::SetInputMode(mode, reply) => {
                let result = if self.mode.is_some() {
                    Err(SessionError::ModeAlreadyResolved)
                } else {
                    info!(mode = %mode, "input mode set explicitly");
                    self.mode = Some(mode);
                    Ok(())
                };
                let _ = reply.send(result);
            }
        }
    }

    fn finish(&mut self) {
        self.dispatcher.clear();
        self.state_tx.send_replace(SessionState::Closed);
        debug!("session closed");
    }
}

/// Issues one device read. A zero-length read is a no-op frame and the
/// caller rearms immediately; a short read drops the partial frame.
async fn read_frame<R: AsyncRead + Unpin>(reader: &mut R) -> io::Result<Option<Frame>> {
    let mut buf = [0u8; Frame::LEN];
    match reader.read(&mut buf).await? {
        0 => Ok(None),
        Frame::LEN => Ok(Some(Frame::from_bytes(buf))),
        short => {
            warn!(bytes = short, "short device read, dropping partial frame");
            Ok(None)
        }
    }
}
