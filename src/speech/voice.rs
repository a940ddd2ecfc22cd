//! Common interface implemented by every speech backend

use crate::{Result, VoiceError};
use log::debug;

/// Speech backend capability interface
///
/// Text handed to `speak` has already been filtered: escape sequences are
/// gone and it is never blank.
pub trait Voice {
    /// Short human-readable backend name for logs and notices
    fn name(&self) -> &'static str;

    /// Speak text, blocking until playback completes
    fn speak(&mut self, text: &str) -> Result<()>;

    /// Change the speech rate by `delta`
    ///
    /// Backends without rate control report `UnsupportedOperation`.
    fn adjust_rate(&mut self, delta: i32) -> Result<()> {
        debug!("Rate change of {} ignored by {} backend", delta, self.name());
        Err(VoiceError::UnsupportedOperation(format!(
            "speech rate change is not supported by the {} backend",
            self.name()
        )))
    }

    /// Tear down any persistent engine state
    fn release(&mut self) -> Result<()> {
        Ok(())
    }
}
