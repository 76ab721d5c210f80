//! Spinner shown on stderr while requests are in flight

use std::io::{self, Write};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

const SPINNER_UPDATE_INTERVAL_MS: u64 = 100;
const SPINNER_FRAMES: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub struct ProgressSpinner {
    message: String,
    enabled: bool,
    running: Arc<AtomicBool>,
    handle: Option<thread::JoinHandle<()>>,
}

impl ProgressSpinner {
    /// The spinner only draws when stderr is a terminal and `enabled` is set.
    pub fn new(message: &str, enabled: bool) -> Self {
        Self {
            message: message.to_string(),
            enabled: enabled && atty::is(atty::Stream::Stderr),
            running: Arc::new(AtomicBool::new(false)),
            handle: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn start(&mut self) {
        if !self.enabled || self.handle.is_some() {
            return;
        }
        self.running.store(true, Ordering::Relaxed);
        let running = Arc::clone(&self.running);
        let message = self.message.clone();

        self.handle = Some(thread::spawn(move || {
            let mut stderr = io::stderr();
            for frame in SPINNER_FRAMES.iter().cycle() {
                if !running.load(Ordering::Relaxed) {
                    break;
                }
                let _ = write!(stderr, "\r{} {}", frame, message);
                let _ = stderr.flush();
                thread::sleep(Duration::from_millis(SPINNER_UPDATE_INTERVAL_MS));
            }
            let width = message.chars().count() + 2;
            let _ = write!(stderr, "\r{:<width$}\r", "", width = width);
            let _ = stderr.flush();
        }));
    }

    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for ProgressSpinner {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_disabled_spinner_never_starts() {
        let mut spinner = ProgressSpinner::new("Fetching accounts...", false);
        assert!(!spinner.is_enabled());
        spinner.start();
        assert!(spinner.handle.is_none());
        spinner.stop();
    }

    #[test]
    fn test_stop_without_start_is_harmless() {
        let mut spinner = ProgressSpinner::new("Fetching...", true);
        spinner.stop();
        spinner.stop();
    }
}
