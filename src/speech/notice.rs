//! User-visible notices (warnings the user should see, not just the log)

use log::warn;
use std::io::{self, Write};
use std::sync::{Arc, Mutex};

/// Destination for one-line advisories shown to the user
///
/// Cloning shares the same underlying writer.
#[derive(Clone)]
pub struct Notifier {
    out: Arc<Mutex<Box<dyn Write + Send>>>,
}

impl Notifier {
    /// Notices go to stderr
    pub fn stderr() -> Self {
        Self::new(io::stderr())
    }

    /// Notices go to the given writer
    pub fn new<W: Write + Send + 'static>(writer: W) -> Self {
        Self {
            out: Arc::new(Mutex::new(Box::new(writer))),
        }
    }

    /// Show a notice to the user
    ///
    /// Failing to write a notice is never fatal.
    pub fn notify(&self, message: &str) {
        warn!("{}", message);
        match self.out.lock() {
            Ok(mut out) => {
                let _ = writeln!(out, "{}", message);
                let _ = out.flush();
            }
            Err(_) => warn!("Notice writer poisoned, dropping notice"),
        }
    }
}

impl Default for Notifier {
    fn default() -> Self {
        Self::stderr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Default)]
    struct Capture(Arc<Mutex<Vec<u8>>>);

    impl Write for Capture {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_notify_writes_line() {
        let capture = Capture::default();
        let notifier = Notifier::new(capture.clone());
        notifier.notify("first");
        notifier.clone().notify("second");

        let text = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text, "first\nsecond\n");
    }
}
