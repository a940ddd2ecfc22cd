//! Fallback backend used when no speech engine is usable

use crate::speech::{Notifier, Voice};
use crate::Result;
use log::debug;

/// Shown once, on the first speak attempt
pub const UNSUPPORTED_WARNING: &str = "Speech not supported! Please install a text-to-speech \
engine (SAPI on Windows, Speech Dispatcher or espeak on Linux) or enable cloud speech";

/// Backend that never speaks
pub struct Unsupported {
    notifier: Notifier,
    warned: bool,
}

impl Unsupported {
    pub fn new(notifier: Notifier) -> Self {
        Self {
            notifier,
            warned: false,
        }
    }

    /// Whether the one-time warning has been shown
    pub fn warned(&self) -> bool {
        self.warned
    }
}

impl Voice for Unsupported {
    fn name(&self) -> &'static str {
        "unsupported"
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        if self.warned {
            debug!("Dropping speech, no engine: {}", text);
            return Ok(());
        }

        self.notifier.notify(UNSUPPORTED_WARNING);
        self.warned = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoiceError;
    use std::io::{self, Write};
    use std::sync::{Arc, Mutex};

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
    fn test_warns_only_once() {
        let capture = Capture::default();
        let mut voice = Unsupported::new(Notifier::new(capture.clone()));
        assert!(!voice.warned());

        voice.speak("hello").unwrap();
        voice.speak("hello again").unwrap();
        voice.speak("and again").unwrap();

        let text = String::from_utf8(capture.0.lock().unwrap().clone()).unwrap();
        assert_eq!(text.matches("Speech not supported!").count(), 1);
        assert!(voice.warned());
    }

    #[test]
    fn test_rate_change_unsupported() {
        let mut voice = Unsupported::new(Notifier::new(io::sink()));
        assert!(matches!(
            voice.adjust_rate(10),
            Err(VoiceError::UnsupportedOperation(_))
        ));
    }
}
