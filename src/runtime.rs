use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event as CtEvent, KeyEvent, MouseEvent};

/// Unified event type consumed by the app runner
#[derive(Clone, Debug)]
pub enum GameEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize,
    Tick,
}

/// Source of terminal events (keyboard, mouse, resize)
pub trait GameEventSource: Send + 'static {
    /// Block for up to `timeout` waiting for an event.
    /// Returns Ok(event) if an event arrives before the timeout, or Err(Timeout) if it expires.
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError>;
}

/// How long the reader thread waits on the terminal before rechecking its stop flag
const READ_POLL: Duration = Duration::from_millis(25);

/// Terminal events read by a background thread.
///
/// The thread stops when the source is dropped, so nothing keeps reading
/// stdin once the game has given the terminal back.
pub struct CrosstermEventSource {
    rx: Receiver<GameEvent>,
    running: Arc<AtomicBool>,
    reader: Option<JoinHandle<()>>,
}

impl CrosstermEventSource {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let reader = std::thread::spawn(move || {
            while flag.load(Ordering::Relaxed) {
                match event::poll(READ_POLL) {
                    Ok(true) => {}
                    Ok(false) => continue,
                    Err(_) => break,
                }
                let evt = match event::read() {
                    Ok(CtEvent::Key(key)) => GameEvent::Key(key),
                    Ok(CtEvent::Mouse(mouse)) => GameEvent::Mouse(mouse),
                    Ok(CtEvent::Resize(_, _)) => GameEvent::Resize,
                    Ok(_) => continue,
                    Err(_) => break,
                };
                if tx.send(evt).is_err() {
                    break;
                }
            }
        });

        Self {
            rx,
            running,
            reader: Some(reader),
        }
    }

    /// Stop the reader thread and wait for it to exit
    pub fn shutdown(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(reader) = self.reader.take() {
            if reader.join().is_err() {
                log::warn!("terminal reader thread panicked");
            }
        }
    }

    pub fn is_running(&self) -> bool {
        self.reader.is_some()
    }
}

impl Default for CrosstermEventSource {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CrosstermEventSource {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl GameEventSource for CrosstermEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Configurable ticker interface
pub trait Ticker: Send + Sync + 'static {
    fn interval(&self) -> Duration;
}

/// Fixed interval ticker
#[derive(Clone, Copy, Debug)]
pub struct FixedTicker {
    interval: Duration,
}

impl FixedTicker {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }
}

impl Ticker for FixedTicker {
    fn interval(&self) -> Duration {
        self.interval
    }
}

/// Scripted events for headless runs; feed it through the returned sender
pub struct TestEventSource {
    rx: Receiver<GameEvent>,
}

impl TestEventSource {
    pub fn channel() -> (Sender<GameEvent>, Self) {
        let (tx, rx) = mpsc::channel();
        (tx, Self { rx })
    }
}

impl GameEventSource for TestEventSource {
    fn recv_timeout(&self, timeout: Duration) -> Result<GameEvent, RecvTimeoutError> {
        self.rx.recv_timeout(timeout)
    }
}

/// Runner that advances the application one event/tick at a time
pub struct Runner<E: GameEventSource, T: Ticker> {
    event_source: E,
    ticker: T,
    last_step: Instant,
}

impl<E: GameEventSource, T: Ticker> Runner<E, T> {
    pub fn new(event_source: E, ticker: T) -> Self {
        Self {
            event_source,
            ticker,
            last_step: Instant::now(),
        }
    }

    /// Next event, or Tick once the tick interval passes without one
    pub fn step(&self) -> GameEvent {
        match self.event_source.recv_timeout(self.ticker.interval()) {
            Ok(ev) => ev,
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => GameEvent::Tick,
        }
    }

    /// Wall-clock time since the previous call (or since construction)
    pub fn elapsed(&mut self) -> Duration {
        let now = Instant::now();
        let dt = now.duration_since(self.last_step);
        self.last_step = now;
        dt
    }
}
