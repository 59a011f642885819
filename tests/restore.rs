mod common;

use std::time::Duration;

use tokio_util::sync::CancellationToken;

use clipstack_lib::clipboard::{ClipboardPoller, ContentType, ImageFormat, PollOutcome};
use clipstack_lib::commands::{handle_command, Reply};
use clipstack_lib::error::EngineError;

use common::{encoded_image, engine, settings};

const PNG_MAGIC: &[u8] = b"\x89PNG\r\n\x1a\n";

fn seeded(texts: &[&str]) -> (std::sync::Arc<common::FakeBackend>, clipstack_lib::engine::Engine, ClipboardPoller) {
    let (backend, engine) = engine(10);
    let poller = ClipboardPoller::from_settings(engine.clone(), &settings(10));
    for text in texts {
        backend.copy_text(text);
        poller.poll_once();
    }
    (backend, engine, poller)
}

#[test]
fn promote_moves_entry_to_head_and_restores_it() {
    let (backend, engine, _) = seeded(&["A", "B", "C"]);
    assert_eq!(engine.snapshot().texts(), [Some("C"), Some("B"), Some("A")]);

    let snapshot = engine.request_promote(2).expect("valid index");

    assert_eq!(snapshot.texts(), [Some("A"), Some("C"), Some("B")]);
    assert_eq!(backend.text().as_deref(), Some("A"));
    assert_eq!(engine.last_seen().last_text(), Some("A"));
}

#[test]
fn own_write_is_not_recaptured() {
    let (_backend, engine, poller) = seeded(&["A", "B", "C"]);
    engine.request_promote(2).expect("valid index");
    assert!(engine.is_guard_active());

    assert_eq!(poller.poll_once(), PollOutcome::GuardActive);
    assert_eq!(engine.snapshot().len(), 3);

    engine.release_guard();
    assert_eq!(poller.poll_once(), PollOutcome::Unchanged);
    assert_eq!(engine.snapshot().texts(), [Some("A"), Some("C"), Some("B")]);
}

#[test]
fn failed_write_releases_guard_and_keeps_order_change() {
    let (backend, engine, poller) = seeded(&["A", "B"]);
    backend.fail_writes(true);

    let snapshot = engine.request_promote(1).expect("index is valid");

    assert_eq!(snapshot.texts(), [Some("A"), Some("B")]);
    assert!(!engine.is_guard_active());
    assert_eq!(backend.text().as_deref(), Some("B"));
    assert_eq!(backend.text_writes(), 0);
    assert_eq!(poller.poll_once(), PollOutcome::Unchanged);
}

#[test]
fn invalid_index_changes_nothing() {
    let (backend, engine, _) = seeded(&["A", "B"]);
    let before = engine.snapshot().version();

    assert!(matches!(
        engine.request_promote(5),
        Err(EngineError::IndexOutOfRange { index: 5, len: 2 })
    ));

    assert_eq!(engine.snapshot().version(), before);
    assert!(!engine.is_guard_active());
    assert_eq!(backend.text_writes(), 0);
}

#[test]
fn image_restore_writes_png() {
    let (backend, engine) = engine(5);
    let poller = ClipboardPoller::from_settings(engine.clone(), &settings(5));

    let jpeg = encoded_image(image::ImageFormat::Jpeg, 4);
    backend.copy_image(ImageFormat::Jpeg, jpeg.clone());
    assert_eq!(poller.poll_once(), PollOutcome::Captured);
    backend.copy_text("later");
    assert_eq!(poller.poll_once(), PollOutcome::Captured);

    let snapshot = engine.request_promote(1).expect("valid index");
    let head = snapshot.get(0).expect("head");
    assert_eq!(head.content_type(), ContentType::Image);
    assert_eq!(head.payload(), jpeg.as_slice());

    let writes = backend.image_writes();
    assert_eq!(writes.len(), 1);
    let (format, png) = &writes[0];
    assert_eq!(*format, ImageFormat::Png);
    assert!(png.starts_with(PNG_MAGIC));
    assert_eq!(engine.last_seen().last_image(), Some(png.as_slice()));

    engine.release_guard();
    assert_eq!(poller.poll_once(), PollOutcome::Unchanged);
    assert_eq!(engine.snapshot().len(), 2);
}

#[test]
fn promote_command_replies_with_new_order() {
    let (backend, engine, _) = seeded(&["x", "y"]);
    let reply = handle_command(&engine, "promote 1");
    let result = match reply {
        Reply::Result(result) => result,
        Reply::Quit => panic!("unexpected quit"),
    };
    assert!(result.success);
    let data = result.data.expect("views");
    assert_eq!(data[0]["preview"], "x");
    assert_eq!(backend.text().as_deref(), Some("x"));
}

#[tokio::test]
async fn run_loop_clears_guard_after_grace() {
    let (backend, engine, poller) = seeded(&["A", "B"]);
    engine.request_promote(1).expect("valid index");
    assert!(engine.is_guard_active());

    let token = CancellationToken::new();
    let task = tokio::spawn(poller.run(token.clone()));

    for _ in 0..200 {
        if !engine.is_guard_active() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(!engine.is_guard_active());

    backend.copy_text("C");
    let mut rx = engine.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.len() == 3))
        .await
        .expect("capture within timeout")
        .expect("engine alive");

    token.cancel();
    task.await.expect("poller task");
    assert_eq!(engine.snapshot().texts(), [Some("C"), Some("A"), Some("B")]);
}

#[tokio::test]
async fn detection_resumes_right_after_grace_without_waiting_a_period() {
    let (backend, engine, _) = seeded(&["A", "B"]);
    let poller = ClipboardPoller::new(engine.clone(), Duration::from_secs(30), Duration::from_millis(20));

    engine.request_promote(1).expect("valid index");
    backend.copy_text("C");

    let token = CancellationToken::new();
    let task = tokio::spawn(poller.run(token.clone()));

    // The guarded iteration skips detection; the next one follows the grace
    // sleep directly instead of the 30 s period.
    let mut rx = engine.subscribe();
    tokio::time::timeout(Duration::from_secs(5), rx.wait_for(|s| s.len() == 3))
        .await
        .expect("capture soon after the grace interval")
        .expect("engine alive");
    assert!(!engine.is_guard_active());

    token.cancel();
    task.await.expect("poller task");
    assert_eq!(engine.snapshot().texts(), [Some("C"), Some("A"), Some("B")]);
}
