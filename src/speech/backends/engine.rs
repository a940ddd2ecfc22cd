//! Local speech engine backend (SAPI on Windows, Speech Dispatcher on Linux)
//!
//! The native engines are unstable when an instance is reused across
//! utterances, so every `speak` creates a fresh engine, configures it,
//! speaks, and drops it again. Do not keep a long-lived engine here.
//!
//! Engine state is process-global on these platforms: only one controller
//! per process should use this backend at a time.

use crate::speech::{EngineFactory, SpeechEngine, SpeechRate, Voice};
use crate::speech::{MAX_RATE, MIN_RATE};
use crate::{Result, VoiceError};
use log::{debug, error, warn};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tts::Tts;

/// Which flavor of the local engine this is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnginePlatform {
    Windows,
    Linux,
}

/// Backend that drives the local speech engine, one instance per utterance
pub struct LocalEngine {
    factory: Arc<dyn EngineFactory>,
    platform: EnginePlatform,
    rate: SpeechRate,
    voice_index: Option<usize>,
}

impl LocalEngine {
    /// Windows engine; `voice_index` selects an alternate installed voice
    pub fn windows(
        factory: Arc<dyn EngineFactory>,
        rate: SpeechRate,
        voice_index: Option<usize>,
    ) -> Result<Self> {
        Self::new(factory, EnginePlatform::Windows, rate, voice_index)
    }

    /// Linux engine, using the system default voice
    pub fn linux(factory: Arc<dyn EngineFactory>, rate: SpeechRate) -> Result<Self> {
        Self::new(factory, EnginePlatform::Linux, rate, None)
    }

    /// Verifies an engine can be created; the test instance is dropped
    fn new(
        factory: Arc<dyn EngineFactory>,
        platform: EnginePlatform,
        rate: SpeechRate,
        voice_index: Option<usize>,
    ) -> Result<Self> {
        debug!("Creating {:?} local engine backend at rate {}", platform, rate);

        let probe = factory.create().map_err(|e| match e {
            VoiceError::EngineConstruction(_) => e,
            other => VoiceError::EngineConstruction(other.to_string()),
        })?;
        drop(probe);

        Ok(Self {
            factory,
            platform,
            rate,
            voice_index,
        })
    }

    pub fn platform(&self) -> EnginePlatform {
        self.platform
    }

    pub fn rate(&self) -> SpeechRate {
        self.rate
    }

    pub fn voice_index(&self) -> Option<usize> {
        self.voice_index
    }
}

impl Voice for LocalEngine {
    fn name(&self) -> &'static str {
        match self.platform {
            EnginePlatform::Windows => "Windows local engine",
            EnginePlatform::Linux => "Linux local engine",
        }
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        debug!("Speaking at rate {}: {}", self.rate, text);

        let mut engine = self.factory.create()?;
        engine.set_rate(self.rate.get())?;
        if let Some(index) = self.voice_index {
            engine.select_voice(index)?;
        }
        engine.speak_and_wait(text)?;
        drop(engine);

        Ok(())
    }

    fn adjust_rate(&mut self, delta: i32) -> Result<()> {
        self.rate = self.rate.adjusted(delta);
        debug!("Local engine rate now {}", self.rate);
        Ok(())
    }

    fn release(&mut self) -> Result<()> {
        // Nothing persistent to tear down, engines never outlive a speak call
        debug!("Releasing {} backend", self.name());
        Ok(())
    }
}

/// Words per minute that map onto the engine's normal rate
const NORMAL_WPM: i32 = 200;

/// Map words per minute onto an engine's normalized rate range
///
/// `[MIN_RATE, NORMAL_WPM]` maps linearly onto `[min, normal]` and
/// `[NORMAL_WPM, MAX_RATE]` onto `[normal, max]`.
pub fn engine_rate(words_per_minute: i32, min: f32, normal: f32, max: f32) -> f32 {
    let wpm = words_per_minute.clamp(MIN_RATE, MAX_RATE) as f32;
    let normal_wpm = NORMAL_WPM as f32;

    if wpm <= normal_wpm {
        let span = normal_wpm - MIN_RATE as f32;
        min + (normal - min) * (wpm - MIN_RATE as f32) / span
    } else {
        let span = MAX_RATE as f32 - normal_wpm;
        normal + (max - normal) * (wpm - normal_wpm) / span
    }
}

/// How often to check whether the engine is still speaking
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long to wait for an utterance to start before giving up on waiting
///
/// A cold Speech Dispatcher can take a couple of seconds to begin the first
/// utterance. An engine that never reports speaking inside this window is
/// assumed to have finished, and playback may then still be running when
/// `speak_and_wait` returns.
const START_GRACE: Duration = Duration::from_secs(5);

/// Poll `is_speaking` until an utterance has started and finished
///
/// Gives up waiting for the start after `grace`; once speech has been seen
/// it waits for the end however long that takes.
fn wait_for_utterance<F>(mut is_speaking: F, grace: Duration, poll: Duration) -> Result<()>
where
    F: FnMut() -> Result<bool>,
{
    let started = Instant::now();
    let mut heard = false;
    loop {
        if is_speaking()? {
            heard = true;
        } else if heard || started.elapsed() >= grace {
            return Ok(());
        }
        thread::sleep(poll);
    }
}

/// Engine factory backed by the `tts` crate
pub struct TtsEngineFactory;

impl EngineFactory for TtsEngineFactory {
    fn create(&self) -> Result<Box<dyn SpeechEngine>> {
        let tts = Tts::default().map_err(|e| {
            VoiceError::EngineConstruction(format!("Failed to initialize TTS: {}", e))
        })?;
        Ok(Box::new(TtsEngine { tts }))
    }
}

/// One `tts` crate instance
struct TtsEngine {
    tts: Tts,
}

impl SpeechEngine for TtsEngine {
    fn set_rate(&mut self, words_per_minute: i32) -> Result<()> {
        if !self.tts.supported_features().rate {
            warn!("Rate control not supported on this platform");
            return Ok(());
        }

        let rate = engine_rate(
            words_per_minute,
            self.tts.min_rate(),
            self.tts.normal_rate(),
            self.tts.max_rate(),
        );
        debug!("Setting engine rate to {} ({} wpm)", rate, words_per_minute);
        self.tts
            .set_rate(rate)
            .map_err(|e| VoiceError::Synthesis(format!("Failed to set rate: {}", e)))?;

        Ok(())
    }

    fn select_voice(&mut self, index: usize) -> Result<()> {
        if !self.tts.supported_features().voice {
            warn!("Voice selection not supported on this platform");
            return Ok(());
        }

        let voices = self
            .tts
            .voices()
            .map_err(|e| VoiceError::Synthesis(format!("Failed to get voices: {}", e)))?;

        match voices.get(index) {
            Some(voice) => {
                debug!("Selecting voice {}: {}", index, voice.name());
                self.tts
                    .set_voice(voice)
                    .map_err(|e| VoiceError::Synthesis(format!("Failed to set voice: {}", e)))?;
            }
            None => warn!(
                "Voice index {} out of range (have {} voices), using default voice",
                index,
                voices.len()
            ),
        }

        Ok(())
    }

    fn speak_and_wait(&mut self, text: &str) -> Result<()> {
        self.tts.speak(text, false).map_err(|e| {
            error!("Failed to speak: {}", e);
            VoiceError::Synthesis(format!("Speak failed: {}", e))
        })?;

        if !self.tts.supported_features().is_speaking {
            debug!("Engine cannot report speaking state, not waiting");
            return Ok(());
        }

        let tts = &self.tts;
        wait_for_utterance(
            || {
                tts.is_speaking().map_err(|e| {
                    VoiceError::Synthesis(format!("Speech state unavailable: {}", e))
                })
            },
            START_GRACE,
            POLL_INTERVAL,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct Log {
        created: AtomicUsize,
        dropped: AtomicUsize,
        events: Mutex<Vec<String>>,
    }

    struct FakeEngine(Arc<Log>);

    impl SpeechEngine for FakeEngine {
        fn set_rate(&mut self, words_per_minute: i32) -> Result<()> {
            self.0.events.lock().unwrap().push(format!("rate {}", words_per_minute));
            Ok(())
        }

        fn select_voice(&mut self, index: usize) -> Result<()> {
            self.0.events.lock().unwrap().push(format!("voice {}", index));
            Ok(())
        }

        fn speak_and_wait(&mut self, text: &str) -> Result<()> {
            self.0.events.lock().unwrap().push(format!("say {}", text));
            Ok(())
        }
    }

    impl Drop for FakeEngine {
        fn drop(&mut self) {
            self.0.dropped.fetch_add(1, Ordering::SeqCst);
        }
    }

    struct FakeFactory(Arc<Log>);

    impl EngineFactory for FakeFactory {
        fn create(&self) -> Result<Box<dyn SpeechEngine>> {
            self.0.created.fetch_add(1, Ordering::SeqCst);
            Ok(Box::new(FakeEngine(self.0.clone())))
        }
    }

    struct BrokenFactory;

    impl EngineFactory for BrokenFactory {
        fn create(&self) -> Result<Box<dyn SpeechEngine>> {
            Err(VoiceError::Other("no speech subsystem".to_string()))
        }
    }

    #[test]
    fn test_fresh_engine_per_utterance() {
        let log = Arc::new(Log::default());
        let mut voice =
            LocalEngine::linux(Arc::new(FakeFactory(log.clone())), SpeechRate::new(150)).unwrap();
        // construction check creates and drops one instance
        assert_eq!(log.created.load(Ordering::SeqCst), 1);
        assert_eq!(log.dropped.load(Ordering::SeqCst), 1);

        voice.speak("one").unwrap();
        voice.speak("two").unwrap();

        assert_eq!(log.created.load(Ordering::SeqCst), 3);
        assert_eq!(log.dropped.load(Ordering::SeqCst), 3);
        assert_eq!(
            *log.events.lock().unwrap(),
            vec!["rate 150", "say one", "rate 150", "say two"]
        );
    }

    #[test]
    fn test_windows_selects_alternate_voice() {
        let log = Arc::new(Log::default());
        let mut voice = LocalEngine::windows(
            Arc::new(FakeFactory(log.clone())),
            SpeechRate::default(),
            Some(1),
        )
        .unwrap();
        assert_eq!(voice.platform(), EnginePlatform::Windows);

        voice.speak("hi").unwrap();
        assert_eq!(
            *log.events.lock().unwrap(),
            vec!["rate 120", "voice 1", "say hi"]
        );
    }

    #[test]
    fn test_rate_applies_to_next_engine() {
        let log = Arc::new(Log::default());
        let mut voice =
            LocalEngine::linux(Arc::new(FakeFactory(log.clone())), SpeechRate::new(120)).unwrap();

        voice.adjust_rate(450).unwrap();
        assert_eq!(voice.rate().get(), 500);
        voice.adjust_rate(-1000).unwrap();
        assert_eq!(voice.rate().get(), 50);

        voice.speak("slow").unwrap();
        assert_eq!(*log.events.lock().unwrap(), vec!["rate 50", "say slow"]);
    }

    #[test]
    fn test_construction_failure() {
        let result = LocalEngine::linux(Arc::new(BrokenFactory), SpeechRate::default());
        assert!(matches!(result, Err(VoiceError::EngineConstruction(_))));
    }

    #[test]
    fn test_waits_for_late_start_and_end() {
        // Silent for 40 polls, then speaking for 10
        let mut polls = 0;
        wait_for_utterance(
            || {
                polls += 1;
                Ok((41..=50).contains(&polls))
            },
            Duration::from_secs(5),
            Duration::from_millis(1),
        )
        .unwrap();
        assert_eq!(polls, 51);
    }

    #[test]
    fn test_stops_waiting_after_grace() {
        let mut polls = 0;
        wait_for_utterance(
            || {
                polls += 1;
                Ok(false)
            },
            Duration::from_millis(20),
            Duration::from_millis(1),
        )
        .unwrap();
        assert!(polls >= 2);
    }

    #[test]
    fn test_wait_reports_engine_errors() {
        let result = wait_for_utterance(
            || Err(VoiceError::Synthesis("lost connection".to_string())),
            Duration::from_secs(5),
            Duration::from_millis(1),
        );
        assert!(matches!(result, Err(VoiceError::Synthesis(_))));
    }

    #[test]
    fn test_engine_rate_mapping() {
        assert_eq!(engine_rate(50, 0.5, 1.0, 3.0), 0.5);
        assert_eq!(engine_rate(200, 0.5, 1.0, 3.0), 1.0);
        assert_eq!(engine_rate(500, 0.5, 1.0, 3.0), 3.0);
        assert_eq!(engine_rate(350, 0.5, 1.0, 3.0), 2.0);
        // out-of-range input is clamped first
        assert_eq!(engine_rate(10, 0.5, 1.0, 3.0), 0.5);
        assert_eq!(engine_rate(9000, -10.0, 0.0, 10.0), 10.0);
    }
}
