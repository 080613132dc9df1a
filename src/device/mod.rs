//! Device session and read loop
//!
//! ```text
//! /dev/input/jsN ──► ReadLoop ──► decode ──► Dispatcher ──► handlers
//!                    (task)
//! ```
//!
//! The [`session::Session`] handle spawns one tokio task that owns the
//! open device, the resolved input mode, the axis maximum and the
//! dispatcher. All mutation happens inside that task; the handle talks
//! to it over a command channel and observes its lifecycle over a watch
//! channel.

pub mod read_loop;
pub mod session;
