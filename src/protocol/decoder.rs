//! Frame classification into button and axis events
//!
//! Decoding is deliberately permissive: frames with unrecognized type or
//! number bytes produce no event and no error. Both wire variants share
//! the report layout, so the resolved input mode plays no part here; the
//! read loop simply withholds frames until the mode is resolved.

use crate::events::{Axis, ButtonId, Direction, InputEvent, Stick};
use crate::protocol::frame::Frame;
use crate::protocol::scale::{scale_position, MaxAxisPosition};
use tracing::{trace, warn};

const TYPE_BUTTON: u8 = 0x01;
const TYPE_AXIS: u8 = 0x02;

/// Decodes one frame into zero or one event.
pub fn decode(frame: &Frame, max_axis: MaxAxisPosition) -> Option<InputEvent> {
    match frame.event_type() {
        TYPE_BUTTON => decode_button(frame),
        TYPE_AXIS => decode_axis(frame, max_axis),
        other => {
            trace!(event_type = other, "dropping frame with unknown type");
            None
        }
    }
}

fn decode_button(frame: &Frame) -> Option<InputEvent> {
    let Some(button) = ButtonId::from_wire(frame.number()) else {
        // a conformant device never reports an index past the table
        warn!(number = frame.number(), "button index out of range");
        return None;
    };

    match frame.value_low() {
        0x01 => Some(InputEvent::Button {
            button,
            pressed: true,
        }),
        0x00 => Some(InputEvent::Button {
            button,
            pressed: false,
        }),
        other => {
            trace!(value = other, "dropping button frame with unknown value");
            None
        }
    }
}

/// Fixed mapping from the wire axis code to the reported stick and axis.
fn stick_axis_for_code(code: u8) -> Option<(Stick, Axis)> {
    match code {
        0x00 => Some((Stick::Two, Axis::Horizontal)),
        0x01 => Some((Stick::Two, Axis::Vertical)),
        0x02 => Some((Stick::Three, Axis::Horizontal)),
        0x03 => Some((Stick::Three, Axis::Vertical)),
        0x04 => Some((Stick::One, Axis::Horizontal)),
        0x05 => Some((Stick::One, Axis::Vertical)),
        _ => None,
    }
}

fn decode_axis(frame: &Frame, max_axis: MaxAxisPosition) -> Option<InputEvent> {
    let Some((stick, axis)) = stick_axis_for_code(frame.number()) else {
        trace!(code = frame.number(), "dropping axis frame with unknown code");
        return None;
    };

    let magnitude = frame.magnitude();
    let (direction, position) = match magnitude {
        0 => (Direction::Zero, 0),
        1..=32767 => {
            let direction = match axis {
                Axis::Horizontal => Direction::Right,
                Axis::Vertical => Direction::Down,
            };
            (direction, scale_position(magnitude, max_axis))
        }
        _ => {
            let direction = match axis {
                Axis::Horizontal => Direction::Left,
                Axis::Vertical => Direction::Up,
            };
            // mirror the negative deflection back into 1..=32768
            let reduced = (65536 - u32::from(magnitude)) as u16;
            (direction, scale_position(reduced, max_axis))
        }
    };

    Some(InputEvent::Axis {
        stick,
        axis,
        direction,
        position,
    })
}
