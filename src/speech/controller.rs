//! Voice controller
//!
//! Session-level owner of the speech rate and the active backend. Callers
//! construct one controller per session, `start()` it, speak, and `stop()`
//! it when done.
//!
//! Only one started controller per process should use a local engine
//! backend; the native engine state behind it is process-global.

use super::backends::{Backend, BackendKind};
use super::probe::{self, CapabilitySet};
use super::providers::Providers;
use super::select::{BackendSettings, Selector};
use super::{Notifier, SpeechRate};
use crate::config::Config;
use crate::platform::OsKind;
use crate::{Result, VoiceError};
use log::{debug, error, info, warn};

/// Lifecycle of a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Uninitialized,
    Started,
    Stopped,
}

/// Uniform speak / change-rate interface over whichever backend was selected
pub struct VoiceController {
    rate: SpeechRate,
    prefer_cloud: Option<bool>,
    os: OsKind,
    selector: Selector,
    capabilities: Option<CapabilitySet>,
    backend: Option<Backend>,
    state: ControllerState,
    rate_notice_shown: bool,
}

impl VoiceController {
    /// Controller using the real system providers
    ///
    /// `rate` defaults to 120 and is clamped to `[50, 500]`.
    pub fn new(rate: Option<i32>) -> Self {
        Self::with_selector(
            rate,
            Selector::new(
                Providers::system(),
                BackendSettings::default(),
                Notifier::stderr(),
            ),
        )
    }

    /// Controller seeded from persisted preferences
    pub fn from_config(config: &Config) -> Self {
        let selector = Selector::new(Providers::system(), config.settings(), Notifier::stderr());
        Self::with_selector(config.speech_rate(), selector)
            .with_prefer_cloud(config.prefer_cloud_tts())
    }

    /// Controller selecting from an explicit provider set
    pub fn with_selector(rate: Option<i32>, selector: Selector) -> Self {
        Self {
            rate: rate.map(SpeechRate::new).unwrap_or_default(),
            prefer_cloud: None,
            os: OsKind::current(),
            selector,
            capabilities: None,
            backend: None,
            state: ControllerState::Uninitialized,
            rate_notice_shown: false,
        }
    }

    /// Override the starting speech rate (clamped)
    pub fn with_rate(mut self, rate: i32) -> Self {
        self.rate = SpeechRate::new(rate);
        self
    }

    /// Set the cloud preference (`None` means unset)
    pub fn with_prefer_cloud(mut self, prefer_cloud: Option<bool>) -> Self {
        self.prefer_cloud = prefer_cloud;
        self
    }

    /// Select as if running on `os`
    pub fn with_os(mut self, os: OsKind) -> Self {
        self.os = os;
        self
    }

    /// Use a known capability set instead of probing
    pub fn with_capabilities(mut self, capabilities: CapabilitySet) -> Self {
        self.capabilities = Some(capabilities);
        self
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn rate(&self) -> SpeechRate {
        self.rate
    }

    pub fn prefer_cloud(&self) -> Option<bool> {
        self.prefer_cloud
    }

    /// Kind of the active backend, if started
    pub fn backend_kind(&self) -> Option<BackendKind> {
        self.backend.as_ref().map(Backend::kind)
    }

    /// Probed capabilities, once the first `start()` has run
    pub fn capabilities(&self) -> Option<&CapabilitySet> {
        self.capabilities.as_ref()
    }

    /// Select and activate a backend
    ///
    /// Capabilities are probed on the first start only. Calling `start()`
    /// while already started replaces the backend without releasing it;
    /// call `stop()` first.
    pub fn start(&mut self) {
        if self.backend.is_some() {
            warn!("start() while started: replacing backend without releasing it");
        }

        let selector = &self.selector;
        let capabilities = self
            .capabilities
            .get_or_insert_with(|| probe::probe(selector.providers()));

        let backend = self.selector.select(
            self.prefer_cloud.unwrap_or(false),
            capabilities,
            self.os,
            self.rate,
        );
        info!("Voice started with {} backend at rate {}", backend.kind(), self.rate);

        self.backend = Some(backend);
        self.state = ControllerState::Started;
    }

    /// Release and clear the active backend
    pub fn stop(&mut self) -> Result<()> {
        let Some(mut backend) = self.backend.take() else {
            debug!("stop() with no active backend");
            return Ok(());
        };

        self.state = ControllerState::Stopped;
        info!("Stopping {} backend", backend.kind());
        backend.release()
    }

    /// Speak text through the active backend, blocking until done
    pub fn speak(&mut self, text: &str) -> Result<()> {
        let backend = self.backend.as_mut().ok_or(VoiceError::NotStarted)?;
        if text.is_empty() {
            return Ok(());
        }
        backend.speak(text)
    }

    /// Change the speech rate by `delta`, clamped to `[50, 500]`
    ///
    /// Backends without rate control get a one-time advisory instead.
    pub fn change_rate(&mut self, delta: i32) -> Result<()> {
        let backend = self.backend.as_mut().ok_or(VoiceError::NotStarted)?;
        self.rate = self.rate.adjusted(delta);
        debug!("Speech rate now {}", self.rate);

        match backend.adjust_rate(delta) {
            Ok(()) => Ok(()),
            Err(VoiceError::UnsupportedOperation(reason)) => {
                debug!("Rate change not applied: {}", reason);
                if !self.rate_notice_shown {
                    self.selector
                        .notifier()
                        .notify("Speech rate change not supported by the current voice");
                    self.rate_notice_shown = true;
                }
                Ok(())
            }
            Err(e) => Err(e),
        }
    }
}

impl Drop for VoiceController {
    fn drop(&mut self) {
        if let Some(mut backend) = self.backend.take() {
            debug!("Releasing {} backend on drop", backend.kind());
            if let Err(e) = backend.release() {
                error!("Failed to release backend: {}", e);
            }
        }
    }
}
