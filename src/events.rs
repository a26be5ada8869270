use std::io;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::thread::JoinHandle;
use std::time::Duration;

use crossterm::event::{self, Event, KeyEvent, KeyEventKind};
use tokio::sync::mpsc;

const POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Reads terminal key presses on a dedicated thread so the UI loop can
/// await input and server outcomes side by side.
pub struct InputReader {
    running: Arc<AtomicBool>,
    handle: Option<JoinHandle<()>>,
}

impl InputReader {
    pub fn start() -> (Self, mpsc::UnboundedReceiver<KeyEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let running = Arc::new(AtomicBool::new(true));
        let thread_running = Arc::clone(&running);
        let handle = std::thread::spawn(move || {
            forward_keys(
                || event::poll(POLL_INTERVAL),
                event::read,
                &thread_running,
                &tx,
            )
        });
        (
            Self {
                running,
                handle: Some(handle),
            },
            rx,
        )
    }

    pub fn stop(mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Pumps key presses into `tx` until `running` clears, the receiver goes away,
/// or the terminal reports an error.
fn forward_keys(
    mut poll: impl FnMut() -> io::Result<bool>,
    mut read: impl FnMut() -> io::Result<Event>,
    running: &AtomicBool,
    tx: &mpsc::UnboundedSender<KeyEvent>,
) {
    while running.load(Ordering::SeqCst) {
        match poll() {
            Ok(true) => {}
            Ok(false) => continue,
            Err(err) => {
                tracing::warn!(target: "taskboard.input", error = %err, "terminal poll failed");
                break;
            }
        }
        match read() {
            // Release/repeat events would double every keystroke on Windows.
            Ok(Event::Key(key)) if key.kind == KeyEventKind::Press => {
                tracing::trace!(target: "taskboard.input", ?key, "key pressed");
                if tx.send(key).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(err) => {
                tracing::warn!(target: "taskboard.input", error = %err, "terminal read failed");
                break;
            }
        }
    }
}
