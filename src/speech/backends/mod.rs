//! Speech backends
//!
//! Each provider gets its own variant; `Backend` dispatches to them and
//! applies the text filtering every provider needs.

// Network synthesis with local playback
pub mod cloud;

// OS speech command (macOS `say`)
pub mod command;

// Local engine library, recreated per utterance
pub mod engine;

// Fallback when nothing can speak
pub mod unsupported;

use crate::speech::filter::{is_blank, strip_ansi};
use crate::speech::Voice;
use crate::Result;
use log::debug;
use std::fmt;

pub use cloud::CloudTts;
pub use command::NativeCommand;
pub use engine::{EnginePlatform, LocalEngine};
pub use unsupported::Unsupported;

/// Discriminant of a `Backend`, for logs and assertions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    CloudTts,
    NativeCommand,
    LocalEngineWindows,
    LocalEngineLinux,
    Unsupported,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::CloudTts => "cloud TTS",
            BackendKind::NativeCommand => "native command",
            BackendKind::LocalEngineWindows => "local engine (Windows)",
            BackendKind::LocalEngineLinux => "local engine (Linux)",
            BackendKind::Unsupported => "unsupported",
        };
        f.write_str(name)
    }
}

/// The speech strategy selected for a session
pub enum Backend {
    CloudTts(CloudTts),
    NativeCommand(NativeCommand),
    LocalEngine(LocalEngine),
    Unsupported(Unsupported),
}

impl Backend {
    pub fn kind(&self) -> BackendKind {
        match self {
            Backend::CloudTts(_) => BackendKind::CloudTts,
            Backend::NativeCommand(_) => BackendKind::NativeCommand,
            Backend::LocalEngine(engine) => match engine.platform() {
                EnginePlatform::Windows => BackendKind::LocalEngineWindows,
                EnginePlatform::Linux => BackendKind::LocalEngineLinux,
            },
            Backend::Unsupported(_) => BackendKind::Unsupported,
        }
    }

    fn voice(&mut self) -> &mut dyn Voice {
        match self {
            Backend::CloudTts(v) => v,
            Backend::NativeCommand(v) => v,
            Backend::LocalEngine(v) => v,
            Backend::Unsupported(v) => v,
        }
    }

    /// Speak text after stripping escape sequences
    ///
    /// Blank text never reaches the provider; some native engines hang or
    /// crash on empty input.
    pub fn speak(&mut self, text: &str) -> Result<()> {
        let text = strip_ansi(text);
        if is_blank(&text) {
            debug!("Skipping blank utterance");
            return Ok(());
        }
        self.voice().speak(&text)
    }

    pub fn adjust_rate(&mut self, delta: i32) -> Result<()> {
        self.voice().adjust_rate(delta)
    }

    pub fn release(&mut self) -> Result<()> {
        self.voice().release()
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Backend").field(&self.kind()).finish()
    }
}
