//! Input-mode detection from the identification preamble
//!
//! Before regular reports begin, the device replays one frame per button
//! and axis it supports. The `(type, number)` bytes of those frames,
//! rendered as hex and concatenated in arrival order, form a signature
//! that identifies the wire variant.

use crate::protocol::frame::Frame;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Number of identification frames the device emits before regular
/// reports start.
pub const IDENT_FRAME_COUNT: usize = 18;

/// 11 buttons (0x81 0x00..=0x0a) followed by 7 axes (0x82 0x00..=0x06).
const IDENT_XINPUT: &str =
    "8100810181028103810481058106810781088109810a8200820182028203820482058206";

/// 12 buttons (0x81 0x00..=0x0b) followed by 6 axes (0x82 0x00..=0x05).
const IDENT_DINPUT: &str =
    "8100810181028103810481058106810781088109810a810b820082018202820382048205";

/// Wire-format variant of the connected controller.
///
/// Both variants lay regular report frames out identically; the variant
/// only changes the identification preamble.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputMode {
    XInput,
    DirectInput,
}

impl fmt::Display for InputMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputMode::XInput => f.write_str("xinput"),
            InputMode::DirectInput => f.write_str("direct input"),
        }
    }
}

/// Errors raised while resolving the input mode.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModeDetectionError {
    /// The 18-frame signature matched neither known variant. Fatal for
    /// the session; the caller must not retry on the same detector.
    #[error("unable to detect input mode from identification signature '{0}'")]
    UnknownSignature(String),

    /// More frames were pushed than the preamble contains; the feeding
    /// loop violated its contract.
    #[error("read {0} identification frames, expected exactly 18")]
    Overread(usize),
}

/// Accumulates the identification preamble and resolves the [`InputMode`].
///
/// Runs once per session, before the read loop starts dispatching.
#[derive(Debug, Default)]
pub struct ModeDetector {
    signature: String,
    frames_seen: usize,
}

impl ModeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Frames accumulated so far.
    pub fn frames_seen(&self) -> usize {
        self.frames_seen
    }

    /// Feeds one identification frame.
    ///
    /// Returns `Ok(None)` while the preamble is incomplete and
    /// `Ok(Some(mode))` on the 18th frame.
    ///
    /// # Errors
    ///
    /// [`ModeDetectionError::UnknownSignature`] if the completed
    /// signature matches no known variant, and
    /// [`ModeDetectionError::Overread`] on any push past the 18th frame.
    pub fn push(&mut self, frame: &Frame) -> Result<Option<InputMode>, ModeDetectionError> {
        if self.frames_seen >= IDENT_FRAME_COUNT {
            return Err(ModeDetectionError::Overread(self.frames_seen + 1));
        }

        let [event_type, number] = frame.signature();
        self.signature
            .push_str(&format!("{event_type:02x}{number:02x}"));
        self.frames_seen += 1;
        debug!(
            frames_seen = self.frames_seen,
            "accumulated identification frame"
        );

        if self.frames_seen < IDENT_FRAME_COUNT {
            return Ok(None);
        }

        match self.signature.as_str() {
            IDENT_XINPUT => Ok(Some(InputMode::XInput)),
            IDENT_DINPUT => Ok(Some(InputMode::DirectInput)),
            other => Err(ModeDetectionError::UnknownSignature(other.to_string())),
        }
    }
}
