//! Capability probe
//!
//! Detects once, at startup, which optional speech providers are usable on
//! this machine. Failed probes are recorded as "unavailable" and never
//! surfaced as errors.

use super::backends::command::NativeCommand;
use super::providers::Providers;
use log::{debug, info};
use std::collections::HashSet;
use std::fmt;

/// An optional speech provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    /// Network synthesis with local playback
    CloudTts,
    /// In-process speech engine library (SAPI, Speech Dispatcher, ...)
    LocalEngine,
    /// OS speech command (`say` on macOS)
    OsNative,
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Provider::CloudTts => "cloud TTS",
            Provider::LocalEngine => "local engine",
            Provider::OsNative => "OS native command",
        };
        f.write_str(name)
    }
}

/// Providers known to be usable right now
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapabilitySet {
    providers: HashSet<Provider>,
}

impl CapabilitySet {
    /// A set with no optional providers
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with(mut self, provider: Provider) -> Self {
        self.providers.insert(provider);
        self
    }

    pub fn contains(&self, provider: Provider) -> bool {
        self.providers.contains(&provider)
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }
}

impl FromIterator<Provider> for CapabilitySet {
    fn from_iter<I: IntoIterator<Item = Provider>>(iter: I) -> Self {
        Self {
            providers: iter.into_iter().collect(),
        }
    }
}

/// Probe every provider in `providers`
pub fn probe(providers: &Providers) -> CapabilitySet {
    let mut found = CapabilitySet::empty();

    let checks = [
        (
            Provider::CloudTts,
            providers.cloud.as_ref().map_or(false, |cloud| {
                cloud.synthesizer.is_available() && cloud.player.is_available()
            }),
        ),
        (Provider::LocalEngine, providers.engine.is_available()),
        (
            Provider::OsNative,
            providers.command.is_available(NativeCommand::PROGRAM),
        ),
    ];

    for (provider, available) in checks {
        if available {
            debug!("Provider available: {}", provider);
            found = found.with(provider);
        } else {
            debug!("Provider unavailable: {}", provider);
        }
    }

    info!("Capability probe found {} provider(s)", found.len());
    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_set() {
        let set = CapabilitySet::empty();
        assert!(set.is_empty());
        assert!(!set.contains(Provider::CloudTts));
    }

    #[test]
    fn test_with_and_collect() {
        let set = CapabilitySet::empty().with(Provider::CloudTts);
        assert!(set.contains(Provider::CloudTts));
        assert!(!set.contains(Provider::LocalEngine));

        let set: CapabilitySet = [Provider::LocalEngine, Provider::OsNative, Provider::LocalEngine]
            .into_iter()
            .collect();
        assert_eq!(set.len(), 2);
    }
}
