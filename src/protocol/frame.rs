//! Raw 8-byte device records

/// Frame observed after initialization when the controller switches its
/// input mode. There is no protocol confirmation for this pattern; it is
/// a best-effort disconnect heuristic inherited from observed hardware
/// behavior.
pub const DISCONNECT_SENTINEL: [u8; 8] = [0x00, 0x00, 0x00, 0x00, 0x0c, 0x17, 0x00, 0x00];

/// One fixed-length record read from the device.
///
/// Frames are ephemeral: the read loop decodes and discards them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame([u8; 8]);

impl Frame {
    /// Length of every device record.
    pub const LEN: usize = 8;

    pub const fn from_bytes(bytes: [u8; 8]) -> Self {
        Self(bytes)
    }

    /// Low byte of the report value (byte 4).
    pub fn value_low(&self) -> u8 {
        self.0[4]
    }

    /// High byte of the report value (byte 5).
    pub fn value_high(&self) -> u8 {
        self.0[5]
    }

    /// Report type (byte 6): 0x01 button, 0x02 axis.
    pub fn event_type(&self) -> u8 {
        self.0[6]
    }

    /// Button index or axis code (byte 7).
    pub fn number(&self) -> u8 {
        self.0[7]
    }

    /// Unsigned 16-bit axis magnitude, high byte first.
    pub fn magnitude(&self) -> u16 {
        u16::from(self.value_high()) << 8 | u16::from(self.value_low())
    }

    /// The `(type, number)` pair used by mode detection; each preamble
    /// frame contributes these two bytes to the identification signature.
    pub fn signature(&self) -> [u8; 2] {
        [self.event_type(), self.number()]
    }

    pub fn is_disconnect_sentinel(&self) -> bool {
        self.0 == DISCONNECT_SENTINEL
    }
}
