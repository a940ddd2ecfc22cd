//! Assistant voice
//!
//! Platform-adaptive text-to-speech for a command-line assistant. Picks one
//! of several speech engines for the running machine (cloud synthesis, the
//! macOS `say` command, the local SAPI / Speech Dispatcher engine) and hides
//! their different lifecycles behind a single speak / change-rate contract.

pub mod config;
pub mod error;
pub mod platform;
pub mod speech;

pub use error::{Result, VoiceError};
pub use speech::VoiceController;

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const APP_NAME: &str = "assistant-voice";
