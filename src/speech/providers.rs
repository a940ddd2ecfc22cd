//! External speech providers
//!
//! The engines themselves live outside this crate. These traits describe the
//! fixed contract each one offers so backends can be driven by the real
//! system providers or by test doubles.

use crate::Result;
use std::path::Path;
use std::sync::Arc;

/// Network text-to-speech service
pub trait CloudSynthesizer: Send + Sync {
    /// Whether the client could be set up on this machine
    fn is_available(&self) -> bool;

    /// Synthesize `text` in `language`, returning encoded (MP3) audio
    fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>>;
}

/// Local audio playback
pub trait AudioPlayer: Send + Sync {
    /// Whether an output device can be opened
    fn is_available(&self) -> bool;

    /// Play an audio file, blocking until playback completes
    fn play_file(&self, path: &Path) -> Result<()>;
}

/// One live instance of the local speech engine
///
/// Instances are short-lived: the owning backend creates one per utterance
/// and drops it afterwards.
pub trait SpeechEngine {
    /// Set the speaking rate in words per minute
    fn set_rate(&mut self, words_per_minute: i32) -> Result<()>;

    /// Select an installed voice by index
    fn select_voice(&mut self, index: usize) -> Result<()>;

    /// Speak and block until the utterance has finished
    fn speak_and_wait(&mut self, text: &str) -> Result<()>;
}

/// Creates local speech engine instances
pub trait EngineFactory: Send + Sync {
    /// Whether an engine can be created at all
    fn is_available(&self) -> bool {
        self.create().is_ok()
    }

    fn create(&self) -> Result<Box<dyn SpeechEngine>>;
}

/// Runs OS speech commands
pub trait CommandRunner: Send + Sync {
    /// Whether `program` can be found on this machine
    fn is_available(&self, program: &str) -> bool;

    /// Run `program` with `args`, writing `input` to its stdin, and wait for it
    fn run(&self, program: &str, args: &[&str], input: &str) -> Result<()>;
}

/// Cloud synthesis is only useful together with playback
#[derive(Clone)]
pub struct CloudProviders {
    pub synthesizer: Arc<dyn CloudSynthesizer>,
    pub player: Arc<dyn AudioPlayer>,
}

/// Every provider a voice controller may select from
#[derive(Clone)]
pub struct Providers {
    /// `None` when cloud support is not compiled in
    pub cloud: Option<CloudProviders>,
    pub engine: Arc<dyn EngineFactory>,
    pub command: Arc<dyn CommandRunner>,
}

impl Providers {
    /// The real providers of this machine
    pub fn system() -> Self {
        use super::backends::{command::SystemCommandRunner, engine::TtsEngineFactory};

        Self {
            cloud: system_cloud(),
            engine: Arc::new(TtsEngineFactory),
            command: Arc::new(SystemCommandRunner),
        }
    }
}

#[cfg(feature = "cloud")]
fn system_cloud() -> Option<CloudProviders> {
    use super::backends::cloud::{GoogleTranslateTts, RodioPlayer};

    Some(CloudProviders {
        synthesizer: Arc::new(GoogleTranslateTts::new()),
        player: Arc::new(RodioPlayer),
    })
}

#[cfg(not(feature = "cloud"))]
fn system_cloud() -> Option<CloudProviders> {
    log::debug!("Cloud speech not compiled in (enable the `cloud` feature)");
    None
}
