//! Event vocabulary for decoded joystick input
//!
//! The device reports twelve buttons and three two-axis sticks. Every
//! decoded frame becomes an [`InputEvent`]; subscriptions are keyed by
//! [`EventKey`], which also round-trips the textual key grammar
//! (`button:<name>:<press|release>`, `stick:<n>:<axis>:<direction>`).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The twelve buttons the device reports, in wire index order (0..=11).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonId {
    X,
    A,
    B,
    Y,
    LeftBumper,
    RightBumper,
    LeftTrigger,
    RightTrigger,
    Back,
    Start,
    LeftStick,
    RightStick,
}

impl ButtonId {
    /// Wire index order is significant: the frame's `number` byte indexes
    /// this table directly.
    pub const TABLE: [ButtonId; 12] = [
        ButtonId::X,
        ButtonId::A,
        ButtonId::B,
        ButtonId::Y,
        ButtonId::LeftBumper,
        ButtonId::RightBumper,
        ButtonId::LeftTrigger,
        ButtonId::RightTrigger,
        ButtonId::Back,
        ButtonId::Start,
        ButtonId::LeftStick,
        ButtonId::RightStick,
    ];

    /// Looks up the button for a wire `number` byte.
    pub fn from_wire(number: u8) -> Option<Self> {
        Self::TABLE.get(usize::from(number)).copied()
    }

    /// Short name used by the event key grammar.
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonId::X => "x",
            ButtonId::A => "a",
            ButtonId::B => "b",
            ButtonId::Y => "y",
            ButtonId::LeftBumper => "lb",
            ButtonId::RightBumper => "rb",
            ButtonId::LeftTrigger => "lt",
            ButtonId::RightTrigger => "rt",
            ButtonId::Back => "back",
            ButtonId::Start => "start",
            ButtonId::LeftStick => "ls",
            ButtonId::RightStick => "rs",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        Self::TABLE.iter().copied().find(|b| b.as_str() == name)
    }
}

impl fmt::Display for ButtonId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stick identifier as reported to subscribers (1, 2 or 3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stick {
    One,
    Two,
    Three,
}

impl Stick {
    pub fn number(self) -> u8 {
        match self {
            Stick::One => 1,
            Stick::Two => 2,
            Stick::Three => 3,
        }
    }

    fn from_number(number: &str) -> Option<Self> {
        match number {
            "1" => Some(Stick::One),
            "2" => Some(Stick::Two),
            "3" => Some(Stick::Three),
            _ => None,
        }
    }
}

impl fmt::Display for Stick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Axis orientation of a stick movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Axis {
    Horizontal,
    Vertical,
}

impl Axis {
    pub fn as_str(self) -> &'static str {
        match self {
            Axis::Horizontal => "horizontal",
            Axis::Vertical => "vertical",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deflection direction of an axis event. `Zero` marks the return to
/// the rest position and always carries position 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
    Zero,
}

impl Direction {
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
            Direction::Zero => "zero",
        }
    }

    fn from_name(name: &str) -> Option<Self> {
        match name {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            "zero" => Some(Direction::Zero),
            _ => None,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Button transition of an [`EventKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ButtonAction {
    Press,
    Release,
}

impl ButtonAction {
    pub fn as_str(self) -> &'static str {
        match self {
            ButtonAction::Press => "press",
            ButtonAction::Release => "release",
        }
    }
}

impl fmt::Display for ButtonAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoded input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    Button {
        button: ButtonId,
        pressed: bool,
    },
    Axis {
        stick: Stick,
        axis: Axis,
        direction: Direction,
        /// Scaled deflection; 0 for `Direction::Zero`.
        position: u16,
    },
}

impl InputEvent {
    /// Subscription key this event is delivered under.
    pub fn key(&self) -> EventKey {
        match *self {
            InputEvent::Button { button, pressed } => EventKey::Button {
                button,
                action: if pressed {
                    ButtonAction::Press
                } else {
                    ButtonAction::Release
                },
            },
            InputEvent::Axis {
                stick,
                axis,
                direction,
                ..
            } => EventKey::Stick {
                stick,
                axis,
                direction,
            },
        }
    }
}

/// Typed subscription key.
///
/// The discriminated form keeps subscriptions exhaustiveness-checked;
/// the original string grammar is still available through `Display` and
/// `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventKey {
    Button {
        button: ButtonId,
        action: ButtonAction,
    },
    Stick {
        stick: Stick,
        axis: Axis,
        direction: Direction,
    },
}

impl fmt::Display for EventKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventKey::Button { button, action } => write!(f, "button:{button}:{action}"),
            EventKey::Stick {
                stick,
                axis,
                direction,
            } => write!(f, "stick:{stick}:{axis}:{direction}"),
        }
    }
}

/// Error returned when an event key string does not match the grammar.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid event key '{0}'")]
pub struct ParseEventKeyError(String);

impl FromStr for EventKey {
    type Err = ParseEventKeyError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseEventKeyError(s.to_string());
        let mut parts = s.split(':');

        let key = match parts.next() {
            Some("button") => {
                let button = parts
                    .next()
                    .and_then(ButtonId::from_name)
                    .ok_or_else(invalid)?;
                let action = match parts.next() {
                    Some("press") => ButtonAction::Press,
                    Some("release") => ButtonAction::Release,
                    _ => return Err(invalid()),
                };
                EventKey::Button { button, action }
            }
            Some("stick") => {
                let stick = parts
                    .next()
                    .and_then(Stick::from_number)
                    .ok_or_else(invalid)?;
                let axis = match parts.next() {
                    Some("horizontal") => Axis::Horizontal,
                    Some("vertical") => Axis::Vertical,
                    _ => return Err(invalid()),
                };
                let direction = parts
                    .next()
                    .and_then(Direction::from_name)
                    .ok_or_else(invalid)?;
                EventKey::Stick {
                    stick,
                    axis,
                    direction,
                }
            }
            _ => return Err(invalid()),
        };

        if parts.next().is_some() {
            return Err(invalid());
        }
        Ok(key)
    }
}
