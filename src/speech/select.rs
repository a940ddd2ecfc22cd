//! Backend selection
//!
//! Maps the user's preference, the probed capabilities and the OS onto
//! exactly one backend:
//!
//! 1. Cloud TTS, when preferred and available
//! 2. macOS: the native `say` command
//! 3. Windows: the local engine with an alternate voice
//! 4. Linux and others: the local engine
//!
//! A local engine that cannot be constructed falls back to `Unsupported`.
//! Selection never fails.

use super::backends::{Backend, CloudTts, LocalEngine, NativeCommand, Unsupported};
use super::probe::{CapabilitySet, Provider};
use super::providers::Providers;
use super::{Notifier, SpeechRate};
use crate::platform::OsKind;
use log::{info, warn};
use std::path::PathBuf;

/// Voice index of the alternate (typically female) Windows voice
pub const DEFAULT_WINDOWS_VOICE_INDEX: usize = 1;

/// Backend settings that come from user configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendSettings {
    /// Installed voice used by the Windows engine, `None` for the OS default
    pub voice_index: Option<usize>,
    /// Language requested from the cloud synthesizer
    pub language: String,
    /// Where cloud audio artifacts are written while playing
    pub artifact_dir: PathBuf,
}

impl Default for BackendSettings {
    fn default() -> Self {
        Self {
            voice_index: Some(DEFAULT_WINDOWS_VOICE_INDEX),
            language: "en".to_string(),
            artifact_dir: std::env::temp_dir(),
        }
    }
}

/// Builds backends from a fixed set of providers
#[derive(Clone)]
pub struct Selector {
    providers: Providers,
    settings: BackendSettings,
    notifier: Notifier,
}

impl Selector {
    pub fn new(providers: Providers, settings: BackendSettings, notifier: Notifier) -> Self {
        Self {
            providers,
            settings,
            notifier,
        }
    }

    pub fn providers(&self) -> &Providers {
        &self.providers
    }

    pub fn settings(&self) -> &BackendSettings {
        &self.settings
    }

    pub fn notifier(&self) -> &Notifier {
        &self.notifier
    }

    /// Pick the backend for this session
    pub fn select(
        &self,
        prefer_cloud: bool,
        capabilities: &CapabilitySet,
        os: OsKind,
        rate: SpeechRate,
    ) -> Backend {
        if prefer_cloud && capabilities.contains(Provider::CloudTts) {
            if let Some(cloud) = &self.providers.cloud {
                info!("Selected cloud TTS backend");
                return Backend::CloudTts(CloudTts::new(
                    cloud.synthesizer.clone(),
                    cloud.player.clone(),
                    self.settings.language.clone(),
                    self.settings.artifact_dir.clone(),
                ));
            }
            warn!("Cloud TTS reported available but no cloud provider is configured");
        }

        let engine = match os {
            OsKind::MacOs => {
                info!("Selected native command backend for {}", os);
                return Backend::NativeCommand(NativeCommand::new(self.providers.command.clone()));
            }
            OsKind::Windows => LocalEngine::windows(
                self.providers.engine.clone(),
                rate,
                self.settings.voice_index,
            ),
            OsKind::Linux | OsKind::Other => {
                LocalEngine::linux(self.providers.engine.clone(), rate)
            }
        };

        match engine {
            Ok(engine) => {
                info!("Selected local engine backend for {}", os);
                Backend::LocalEngine(engine)
            }
            Err(e) => {
                info!("Local engine unavailable on {}: {}", os, e);
                Backend::Unsupported(Unsupported::new(self.notifier.clone()))
            }
        }
    }
}
