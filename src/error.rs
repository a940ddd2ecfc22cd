//! Error types for the assistant voice

use std::io;
use thiserror::Error;

/// Main error type for the assistant voice
#[derive(Error, Debug)]
pub enum VoiceError {
    /// An optional speech provider could not be loaded
    #[error("Speech provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The local speech engine failed to initialize
    #[error("Speech engine construction failed: {0}")]
    EngineConstruction(String),

    /// A speak call failed mid-flight (network, native call, playback)
    #[error("Speech synthesis error: {0}")]
    Synthesis(String),

    /// The active backend cannot perform the requested operation
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    #[error("Voice controller has not been started")]
    NotStarted,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for voice operations
pub type Result<T> = std::result::Result<T, VoiceError>;

impl From<String> for VoiceError {
    fn from(s: String) -> Self {
        VoiceError::Other(s)
    }
}

impl From<&str> for VoiceError {
    fn from(s: &str) -> Self {
        VoiceError::Other(s.to_string())
    }
}
