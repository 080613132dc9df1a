//! End-to-end tests driving the read loop over in-memory byte streams.

use joyport::protocol::frame::DISCONNECT_SENTINEL;
use joyport::{
    Axis, ButtonAction, ButtonId, ConfigError, Direction, EventKey, InputEvent, InputMode,
    Session, SessionError, SessionState, Stick,
};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::sync::mpsc;
use tokio::time::{sleep, timeout};

fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

fn frame(value_low: u8, value_high: u8, event_type: u8, number: u8) -> [u8; 8] {
    [0, 0, 0, 0, value_low, value_high, event_type, number]
}

/// The xinput identification preamble: 11 button frames, 7 axis frames.
fn xinput_preamble() -> Vec<u8> {
    let buttons = (0x00..=0x0au8).map(|n| (0x81, n));
    let axes = (0x00..=0x06u8).map(|n| (0x82, n));
    buttons
        .chain(axes)
        .flat_map(|(t, n)| frame(0, 0, t, n))
        .collect()
}

fn x_press_key() -> EventKey {
    EventKey::Button {
        button: ButtonId::X,
        action: ButtonAction::Press,
    }
}

fn stick1_up_key() -> EventKey {
    EventKey::Stick {
        stick: Stick::One,
        axis: Axis::Vertical,
        direction: Direction::Up,
    }
}

fn collector(
    session: &Session,
    key: EventKey,
) -> mpsc::UnboundedReceiver<InputEvent> {
    let (tx, rx) = mpsc::unbounded_channel();
    session
        .subscribe(key, move |event| {
            tx.send(*event).expect("test channel closed");
        })
        .expect("session closed during subscribe");
    rx
}

async fn recv_event(rx: &mut mpsc::UnboundedReceiver<InputEvent>) -> InputEvent {
    timeout(Duration::from_secs(5), rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("event channel closed")
}

async fn wait_for_state(session: &Session, wanted: SessionState) {
    let mut states = session.state_changes();
    timeout(Duration::from_secs(5), states.wait_for(|state| *state == wanted))
        .await
        .expect("timed out waiting for state")
        .expect("state channel closed");
}

#[tokio::test]
async fn detects_mode_and_dispatches_in_arrival_order() {
    init_tracing();
    let (mut device, reader) = tokio::io::duplex(1024);
    let mut session = Session::from_reader(reader, None);

    // subscriptions registered during detection take effect once active
    let mut presses = collector(&session, x_press_key());
    let mut ups = collector(&session, stick1_up_key());

    device.write_all(&xinput_preamble()).await.unwrap();
    wait_for_state(&session, SessionState::Active).await;

    device
        .write_all(&frame(0x01, 0x00, 0x01, 0x00))
        .await
        .unwrap();
    device
        .write_all(&frame(0xaa, 0xaa, 0x02, 0x05))
        .await
        .unwrap();

    assert_eq!(
        recv_event(&mut presses).await,
        InputEvent::Button {
            button: ButtonId::X,
            pressed: true,
        }
    );
    assert_eq!(
        recv_event(&mut ups).await,
        InputEvent::Axis {
            stick: Stick::One,
            axis: Axis::Vertical,
            direction: Direction::Up,
            position: 21846,
        }
    );

    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);
}

#[tokio::test]
async fn preset_mode_skips_the_identification_preamble() {
    init_tracing();
    let (mut device, reader) = tokio::io::duplex(256);
    let mut session = Session::from_reader(reader, Some(InputMode::XInput));

    wait_for_state(&session, SessionState::Active).await;
    let mut presses = collector(&session, x_press_key());

    device
        .write_all(&frame(0x01, 0x00, 0x01, 0x00))
        .await
        .unwrap();
    assert_eq!(
        recv_event(&mut presses).await,
        InputEvent::Button {
            button: ButtonId::X,
            pressed: true,
        }
    );

    session.close().await;
}

#[tokio::test]
async fn explicit_mode_during_detection_goes_active_without_preamble() {
    init_tracing();
    let (_device, reader) = tokio::io::duplex(256);
    let mut session = Session::from_reader(reader, None);

    session
        .set_input_mode(InputMode::DirectInput)
        .await
        .expect("mode should be settable before resolution");
    wait_for_state(&session, SessionState::Active).await;

    session.close().await;
}

#[tokio::test]
async fn mode_cannot_change_once_resolved() {
    init_tracing();
    let (mut device, reader) = tokio::io::duplex(1024);
    let mut session = Session::from_reader(reader, None);

    device.write_all(&xinput_preamble()).await.unwrap();
    wait_for_state(&session, SessionState::Active).await;

    assert_eq!(
        session.set_input_mode(InputMode::DirectInput).await,
        Err(SessionError::ModeAlreadyResolved)
    );

    session.close().await;
}

#[tokio::test]
async fn unknown_signature_closes_without_going_active() {
    init_tracing();
    let (mut device, reader) = tokio::io::duplex(1024);
    let session = Session::from_reader(reader, None);
    let mut presses = collector(&session, x_press_key());

    let garbage: Vec<u8> = (0..18u8).flat_map(|n| frame(0, 0, 0x7f, n)).collect();
    device.write_all(&garbage).await.unwrap();
    // a valid report after the bad preamble must never be dispatched
    let _ = device.write_all(&frame(0x01, 0x00, 0x01, 0x00)).await;

    wait_for_state(&session, SessionState::Closed).await;
    sleep(Duration::from_millis(50)).await;
    assert!(presses.try_recv().is_err(), "session dispatched after failed detection");
}

#[tokio::test]
async fn seventeen_preamble_frames_do_not_resolve() {
    init_tracing();
    let (mut device, reader) = tokio::io::duplex(1024);
    let mut session = Session::from_reader(reader, None);

    let preamble = xinput_preamble();
    device.write_all(&preamble[..17 * 8]).await.unwrap();
    sleep(Duration::from_millis(100)).await;
    assert_eq!(session.state(), SessionState::Initializing);

    // the 18th frame completes the signature
    device.write_all(&preamble[17 * 8..]).await.unwrap();
    wait_for_state(&session, SessionState::Active).await;

    session.close().await;
}

#[tokio::test]
async fn disconnect_sentinel_closes_as_best_effort_heuristic() {
    init_tracing();
    let (mut device, reader) = tokio::io::duplex(1024);
    let session = Session::from_reader(reader, None);
    let mut presses = collector(&session, x_press_key());

    device.write_all(&xinput_preamble()).await.unwrap();
    wait_for_state(&session, SessionState::Active).await;

    // the sentinel is an observed mode-change pattern, not a documented
    // protocol teardown; the loop treats it as an implicit disconnect
    device.write_all(&DISCONNECT_SENTINEL).await.unwrap();
    wait_for_state(&session, SessionState::Closed).await;

    let _ = device.write_all(&frame(0x01, 0x00, 0x01, 0x00)).await;
    sleep(Duration::from_millis(50)).await;
    assert!(presses.try_recv().is_err(), "session dispatched after sentinel");
}

#[tokio::test]
async fn read_errors_close_the_session() {
    init_tracing();
    let reader = tokio_test::io::Builder::new()
        .read(&xinput_preamble())
        .read_error(std::io::Error::other("device vanished"))
        .build();
    let session = Session::from_reader(reader, None);

    wait_for_state(&session, SessionState::Closed).await;
}

#[tokio::test]
async fn close_is_idempotent_and_silences_dispatch() {
    init_tracing();
    let (mut device, reader) = tokio::io::duplex(1024);
    let mut session = Session::from_reader(reader, None);
    let mut presses = collector(&session, x_press_key());

    device.write_all(&xinput_preamble()).await.unwrap();
    wait_for_state(&session, SessionState::Active).await;

    device
        .write_all(&frame(0x01, 0x00, 0x01, 0x00))
        .await
        .unwrap();
    recv_event(&mut presses).await;

    session.close().await;
    session.close().await;
    assert_eq!(session.state(), SessionState::Closed);

    // the loop has stopped reading; this frame goes nowhere
    let _ = device.write_all(&frame(0x01, 0x00, 0x01, 0x00)).await;
    sleep(Duration::from_millis(50)).await;
    assert!(presses.try_recv().is_err(), "event dispatched after close");

    assert_eq!(
        session.subscribe(x_press_key(), |_| {}),
        Err(SessionError::Closed)
    );
    assert_eq!(
        session.set_input_mode(InputMode::XInput).await,
        Err(SessionError::Closed)
    );
}

#[tokio::test]
async fn max_axis_position_applies_to_subsequent_frames_only() {
    init_tracing();
    let (mut device, reader) = tokio::io::duplex(1024);
    let mut session = Session::from_reader(reader, None);
    let mut ups = collector(&session, stick1_up_key());

    device.write_all(&xinput_preamble()).await.unwrap();
    wait_for_state(&session, SessionState::Active).await;

    let deflection = frame(0xaa, 0xaa, 0x02, 0x05);
    device.write_all(&deflection).await.unwrap();
    assert!(matches!(
        recv_event(&mut ups).await,
        InputEvent::Axis { position: 21846, .. }
    ));

    session.set_max_axis_position(100).unwrap();
    device.write_all(&deflection).await.unwrap();
    assert!(matches!(
        recv_event(&mut ups).await,
        InputEvent::Axis { position: 67, .. }
    ));

    // rejected values leave the configured maximum untouched
    assert_eq!(
        session.set_max_axis_position(100000),
        Err(ConfigError::TooHigh(100000))
    );
    assert_eq!(
        session.set_max_axis_position(-100),
        Err(ConfigError::TooLow(-100))
    );
    device.write_all(&deflection).await.unwrap();
    assert!(matches!(
        recv_event(&mut ups).await,
        InputEvent::Axis { position: 67, .. }
    ));

    session.close().await;
}
