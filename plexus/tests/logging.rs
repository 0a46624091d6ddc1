//! Structured logging emitted while booting and resolving.

#![cfg(feature = "tracing")]

use parking_lot::Mutex;
use plexus::{
    Runtime,
    testing::{CallLog, RecordingLoader, RecordingProvider},
};
use std::{io, sync::Arc};
use tracing_subscriber::{filter::LevelFilter, util::SubscriberInitExt};

#[derive(Clone, Default)]
struct Captured(Arc<Mutex<Vec<u8>>>);

impl Captured {
    fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

impl io::Write for Captured {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

/// Run `f` with a subscriber that records everything at `level` and above.
fn captured(level: LevelFilter, f: impl FnOnce()) -> String {
    let out = Captured::default();
    let writer = out.clone();
    let subscriber = tracing_subscriber::fmt()
        .with_writer(move || writer.clone())
        .with_ansi(false)
        .with_max_level(level)
        .finish();

    let guard = subscriber.set_default();
    f();
    drop(guard);
    out.text()
}

#[test]
fn test_boot_and_resolve_are_logged() {
    let text = captured(LevelFilter::DEBUG, || {
        let log = CallLog::new();
        let runtime = Runtime::builder()
            .provider(Arc::new(
                RecordingProvider::new("disk", log.clone()).with_capability("storage", 1),
            ))
            .unit(Arc::new(RecordingLoader::new("metrics", log)))
            .boot()
            .unwrap();
        runtime.resolve("storage").unwrap();
        assert!(runtime.resolve("network").is_none());
    });

    assert!(text.contains("loader phase complete"));
    assert!(text.contains("general phase complete"));
    assert!(text.contains("capability resolved"));
    assert!(text.contains("no provider for capability"));
}

#[test]
fn test_hook_failure_is_logged_as_error() {
    let text = captured(LevelFilter::ERROR, || {
        let result = Runtime::builder()
            .unit(Arc::new(RecordingLoader::failing("bad", CallLog::new())))
            .boot();
        assert!(result.is_err());
    });

    assert!(text.contains("ERROR"));
    assert!(text.contains("bootstrap hook failed"));
    assert!(!text.contains("general phase complete"));
}
