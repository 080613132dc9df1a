//! Wire protocol for the joystick character device
//!
//! The device emits fixed 8-byte records:
//!
//! ```text
//! [4 bytes: timestamp, ignored][valueLow][valueHigh][type][number]
//! ```
//!
//! 1. [`frame`] - raw record and byte accessors
//! 2. [`mode`] - wire-variant detection from the 18-frame preamble
//! 3. [`decoder`] - frame classification into button/axis events
//! 4. [`scale`] - axis magnitude scaling into the configured range

pub mod decoder;
pub mod frame;
pub mod mode;
pub mod scale;
