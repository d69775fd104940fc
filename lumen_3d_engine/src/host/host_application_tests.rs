use super::*;
use std::sync::Arc;
use std::thread;

#[test]
fn test_signals_start_clear() {
    let signals = HostSignals::new();
    assert!(!signals.is_shutdown_requested());
    assert_eq!(signals.take_resize(), None);
}

#[test]
fn test_latest_resize_wins_and_is_taken_once() {
    let signals = HostSignals::new();
    signals.notify_resize(800, 600);
    signals.notify_resize(1024, 768);
    assert_eq!(signals.take_resize(), Some((1024, 768)));
    assert_eq!(signals.take_resize(), None);
}

#[test]
fn test_shutdown_visible_across_threads() {
    let signals = Arc::new(HostSignals::new());
    let writer = Arc::clone(&signals);
    thread::spawn(move || {
        writer.notify_resize(640, 480);
        writer.request_shutdown();
    })
    .join()
    .unwrap();

    assert!(signals.is_shutdown_requested());
    assert_eq!(signals.take_resize(), Some((640, 480)));
}

#[test]
fn test_default_hooks_are_no_ops() {
    struct DrawOnly(u32);
    impl HostApplication for DrawOnly {
        fn on_draw(&mut self, _elapsed_seconds: f32) -> Result<()> {
            self.0 += 1;
            Ok(())
        }
    }

    let mut app = DrawOnly(0);
    app.on_create().unwrap();
    app.on_resize(1, 1);
    app.on_draw(0.0).unwrap();
    app.on_destroy();
    assert_eq!(app.0, 1);
}
