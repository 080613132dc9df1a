//! joyport - async reader for Linux joystick character devices
//!
//! Opens a kernel joystick device (`/dev/input/jsN`), resolves the
//! controller's wire variant from its identification preamble, then
//! decodes the fixed 8-byte report frames into typed button and stick
//! events delivered to subscribed handlers.
//!
//! ```no_run
//! use joyport::{ButtonAction, ButtonId, EventKey};
//!
//! # async fn run() -> Result<(), joyport::DeviceOpenError> {
//! let mut session = joyport::create("/dev/input/js0", None).await?;
//! session
//!     .subscribe(
//!         EventKey::Button {
//!             button: ButtonId::A,
//!             action: ButtonAction::Press,
//!         },
//!         |event| println!("{event:?}"),
//!     )
//!     .ok();
//! // ...
//! session.close().await;
//! # Ok(())
//! # }
//! ```
//!
//! The crate is read-only and report-only: force feedback and other
//! write paths are out of scope.

pub mod device;
pub mod dispatch;
pub mod events;
pub mod protocol;

pub use device::session::{DeviceOpenError, Session, SessionError, SessionState};
pub use dispatch::Dispatcher;
pub use events::{
    Axis, ButtonAction, ButtonId, Direction, EventKey, InputEvent, ParseEventKeyError, Stick,
};
pub use protocol::mode::{InputMode, ModeDetectionError};
pub use protocol::scale::{ConfigError, MaxAxisPosition};

use std::path::Path;

/// Opens a device and starts its read loop.
///
/// Passing a mode skips the 18-frame identification preamble.
///
/// # Errors
///
/// [`DeviceOpenError`] when the device cannot be opened.
pub async fn create(
    device: impl AsRef<Path>,
    mode: Option<InputMode>,
) -> Result<Session, DeviceOpenError> {
    Session::open(device, mode).await
}
