//! Operator control: the maintenance flag and the console that toggles it.

use std::io::BufRead;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use tokio::sync::mpsc;
use tracing::{info, warn};

/// Process-wide maintenance flag. Cloning shares the same flag.
///
/// Connections read it once before framing; eventual visibility is all that
/// is needed, so relaxed ordering is enough.
#[derive(Debug, Clone, Default)]
pub struct Maintenance {
    paused: Arc<AtomicBool>,
}

impl Maintenance {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_paused(&self) -> bool {
        self.paused.load(Ordering::Relaxed)
    }

    pub fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    /// Flips the flag and returns the new state.
    pub fn toggle(&self) -> bool {
        !self.paused.fetch_xor(true, Ordering::Relaxed)
    }
}

/// A console command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    TogglePause,
    Quit,
}

impl Command {
    /// Recognises a console line; only its first character matters.
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().chars().next()? {
            'p' | 'P' => Some(Command::TogglePause),
            'q' | 'Q' => Some(Command::Quit),
            _ => None,
        }
    }
}

/// Forwards stdin lines from a dedicated thread.
///
/// Blocking reads stay off the runtime, so a console waiting for input never
/// holds up shutdown.
pub fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();

    thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Console input failed");
                    break;
                }
            }
        }
    });

    rx
}

/// Applies console commands until `q` or the line source closes.
///
/// Returns `true` when the operator asked to quit, `false` when the input
/// simply ran dry.
pub async fn run_console(mut lines: mpsc::UnboundedReceiver<String>, maintenance: Maintenance) -> bool {
    while let Some(line) = lines.recv().await {
        match Command::parse(&line) {
            Some(Command::TogglePause) => {
                if maintenance.toggle() {
                    info!("Server paused for maintenance");
                } else {
                    info!("Server resuming from maintenance pause");
                }
            }
            Some(Command::Quit) => {
                info!("Quit requested from console");
                return true;
            }
            None => {}
        }
    }
    false
}
