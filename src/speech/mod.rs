//! Speech backend selection and control

pub mod backends;
pub mod controller;
pub mod filter;
pub mod notice;
pub mod probe;
pub mod providers;
pub mod rate;
pub mod select;
pub mod voice;

pub use backends::{Backend, BackendKind};
pub use controller::{ControllerState, VoiceController};
pub use notice::Notifier;
pub use probe::{probe, CapabilitySet, Provider};
pub use providers::{
    AudioPlayer, CloudProviders, CloudSynthesizer, CommandRunner, EngineFactory, Providers,
    SpeechEngine,
};
pub use rate::{SpeechRate, DEFAULT_RATE, MAX_RATE, MIN_RATE};
pub use select::{BackendSettings, Selector};
pub use voice::Voice;
