//! Cloud text-to-speech backend
//!
//! Synthesizes over the network, writes the audio to a temporary artifact,
//! plays it back and removes the artifact. The artifact is removed on every
//! exit path, including failed playback.

use crate::speech::{AudioPlayer, CloudSynthesizer, Voice};
use crate::Result;
use log::debug;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Backend that speaks through a cloud synthesizer
pub struct CloudTts {
    synthesizer: Arc<dyn CloudSynthesizer>,
    player: Arc<dyn AudioPlayer>,
    language: String,
    artifact_dir: PathBuf,
}

impl CloudTts {
    pub fn new(
        synthesizer: Arc<dyn CloudSynthesizer>,
        player: Arc<dyn AudioPlayer>,
        language: impl Into<String>,
        artifact_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            synthesizer,
            player,
            language: language.into(),
            artifact_dir: artifact_dir.into(),
        }
    }

    pub fn artifact_dir(&self) -> &Path {
        &self.artifact_dir
    }
}

impl Voice for CloudTts {
    fn name(&self) -> &'static str {
        "cloud"
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        debug!("Synthesizing {} chars in '{}'", text.len(), self.language);
        let audio = self.synthesizer.synthesize(text, &self.language)?;

        let mut artifact = tempfile::Builder::new()
            .prefix("voice")
            .suffix(".mp3")
            .tempfile_in(&self.artifact_dir)?;
        artifact.write_all(&audio)?;
        artifact.flush()?;
        debug!("Audio artifact written to {:?}", artifact.path());

        self.player.play_file(artifact.path())?;

        artifact.close()?;
        Ok(())
    }
}

/// Longest text the translate endpoint accepts in one request
pub const MAX_REQUEST_CHARS: usize = 100;

/// Split text into request-sized chunks, preferring word boundaries
///
/// Words longer than `max_chars` are split mid-word.
pub fn split_for_requests(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for word in text.split_whitespace() {
        let mut word: Vec<char> = word.chars().collect();

        while word.len() > max_chars {
            if current_len > 0 {
                chunks.push(std::mem::take(&mut current));
                current_len = 0;
            }
            let rest = word.split_off(max_chars);
            chunks.push(word.into_iter().collect());
            word = rest;
        }

        let needed = if current_len == 0 {
            word.len()
        } else {
            current_len + 1 + word.len()
        };
        if needed > max_chars {
            chunks.push(std::mem::take(&mut current));
            current_len = 0;
        }
        if current_len > 0 {
            current.push(' ');
            current_len += 1;
        }
        current_len += word.len();
        current.extend(word);
    }

    if current_len > 0 {
        chunks.push(current);
    }
    chunks
}

#[cfg(feature = "cloud")]
pub use self::google::{GoogleTranslateTts, RodioPlayer};

#[cfg(feature = "cloud")]
mod google {
    use super::{split_for_requests, MAX_REQUEST_CHARS};
    use crate::speech::{AudioPlayer, CloudSynthesizer};
    use crate::{Result, VoiceError};
    use log::{debug, error};
    use reqwest::blocking::Client;
    use std::fs::File;
    use std::io::BufReader;
    use std::path::Path;

    const ENDPOINT: &str = "https://translate.google.com/translate_tts";
    const USER_AGENT: &str = concat!("assistant-voice/", env!("CARGO_PKG_VERSION"));

    /// Google Translate speech endpoint over blocking HTTP
    pub struct GoogleTranslateTts {
        client: Option<Client>,
    }

    impl GoogleTranslateTts {
        pub fn new() -> Self {
            let client = match Client::builder().user_agent(USER_AGENT).build() {
                Ok(client) => Some(client),
                Err(e) => {
                    error!("Failed to create HTTP client: {}", e);
                    None
                }
            };
            Self { client }
        }
    }

    impl Default for GoogleTranslateTts {
        fn default() -> Self {
            Self::new()
        }
    }

    impl CloudSynthesizer for GoogleTranslateTts {
        fn is_available(&self) -> bool {
            self.client.is_some()
        }

        fn synthesize(&self, text: &str, language: &str) -> Result<Vec<u8>> {
            let client = self.client.as_ref().ok_or_else(|| {
                VoiceError::ProviderUnavailable("HTTP client unavailable".to_string())
            })?;

            let chunks = split_for_requests(text, MAX_REQUEST_CHARS);
            let total = chunks.len().to_string();
            let mut audio = Vec::new();

            for (idx, chunk) in chunks.iter().enumerate() {
                debug!("Requesting chunk {}/{}", idx + 1, chunks.len());
                let idx = idx.to_string();
                let textlen = chunk.chars().count().to_string();
                let response = client
                    .get(ENDPOINT)
                    .query(&[
                        ("ie", "UTF-8"),
                        ("client", "tw-ob"),
                        ("tl", language),
                        ("q", chunk.as_str()),
                        ("total", total.as_str()),
                        ("idx", idx.as_str()),
                        ("textlen", textlen.as_str()),
                    ])
                    .send()
                    .and_then(|r| r.error_for_status())
                    .map_err(|e| VoiceError::Synthesis(format!("Cloud TTS request failed: {}", e)))?;
                let bytes = response
                    .bytes()
                    .map_err(|e| VoiceError::Synthesis(format!("Cloud TTS read failed: {}", e)))?;
                audio.extend_from_slice(&bytes);
            }

            Ok(audio)
        }
    }

    /// Plays audio files on the default output device
    pub struct RodioPlayer;

    /// Default output stream that stays silent on stderr when dropped
    fn open_quiet_stream() -> std::result::Result<rodio::OutputStream, rodio::StreamError> {
        let mut stream = rodio::OutputStreamBuilder::open_default_stream()?;
        stream.log_on_drop(false);
        Ok(stream)
    }

    impl AudioPlayer for RodioPlayer {
        fn is_available(&self) -> bool {
            open_quiet_stream().is_ok()
        }

        fn play_file(&self, path: &Path) -> Result<()> {
            let stream = open_quiet_stream()
                .map_err(|e| VoiceError::Synthesis(format!("Failed to open audio output: {}", e)))?;
            let sink = rodio::Sink::connect_new(stream.mixer());

            let file = File::open(path)?;
            let source = rodio::Decoder::new(BufReader::new(file))
                .map_err(|e| VoiceError::Synthesis(format!("Failed to decode audio: {}", e)))?;

            sink.append(source);
            sink.sleep_until_end();
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::VoiceError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct FakeSynth;

    impl CloudSynthesizer for FakeSynth {
        fn is_available(&self) -> bool {
            true
        }

        fn synthesize(&self, text: &str, _language: &str) -> Result<Vec<u8>> {
            Ok(text.as_bytes().to_vec())
        }
    }

    #[derive(Default)]
    struct FakePlayer {
        played: Mutex<Vec<Vec<u8>>>,
        fail: bool,
    }

    impl AudioPlayer for FakePlayer {
        fn is_available(&self) -> bool {
            true
        }

        fn play_file(&self, path: &Path) -> Result<()> {
            assert!(path.exists(), "artifact must exist during playback");
            let name = path.file_name().unwrap().to_string_lossy().into_owned();
            assert!(name.starts_with("voice") && name.ends_with(".mp3"));
            self.played.lock().unwrap().push(std::fs::read(path)?);
            if self.fail {
                return Err(VoiceError::Synthesis("device vanished".to_string()));
            }
            Ok(())
        }
    }

    fn dir_entries(dir: &Path) -> usize {
        std::fs::read_dir(dir).unwrap().count()
    }

    #[test]
    fn test_artifact_removed_after_playback() {
        let dir = tempfile::tempdir().unwrap();
        let player = Arc::new(FakePlayer::default());
        let mut voice = CloudTts::new(Arc::new(FakeSynth), player.clone(), "en", dir.path());

        voice.speak("Hello").unwrap();

        assert_eq!(*player.played.lock().unwrap(), vec![b"Hello".to_vec()]);
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[test]
    fn test_artifact_removed_when_playback_fails() {
        let dir = tempfile::tempdir().unwrap();
        let player = Arc::new(FakePlayer {
            fail: true,
            ..Default::default()
        });
        let mut voice = CloudTts::new(Arc::new(FakeSynth), player, "en", dir.path());

        assert!(voice.speak("Hello").is_err());
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[test]
    fn test_synthesis_failure_surfaces() {
        struct Offline(AtomicUsize);

        impl CloudSynthesizer for Offline {
            fn is_available(&self) -> bool {
                true
            }

            fn synthesize(&self, _text: &str, _language: &str) -> Result<Vec<u8>> {
                self.0.fetch_add(1, Ordering::SeqCst);
                Err(VoiceError::Synthesis("network down".to_string()))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let synth = Arc::new(Offline(AtomicUsize::new(0)));
        let mut voice = CloudTts::new(
            synth.clone(),
            Arc::new(FakePlayer::default()),
            "en",
            dir.path(),
        );

        assert!(matches!(voice.speak("Hello"), Err(VoiceError::Synthesis(_))));
        // no retries
        assert_eq!(synth.0.load(Ordering::SeqCst), 1);
        assert_eq!(dir_entries(dir.path()), 0);
    }

    #[test]
    fn test_split_short_text() {
        assert_eq!(split_for_requests("hello world", 100), vec!["hello world"]);
        assert!(split_for_requests("   ", 100).is_empty());
    }

    #[test]
    fn test_split_on_word_boundaries() {
        let chunks = split_for_requests("aaa bbb ccc ddd", 7);
        assert_eq!(chunks, vec!["aaa bbb", "ccc ddd"]);

        let chunks = split_for_requests("aaa bbbb cc", 7);
        assert_eq!(chunks, vec!["aaa", "bbbb cc"]);
    }

    #[test]
    fn test_split_long_word() {
        let chunks = split_for_requests("hi abcdefghij", 4);
        assert_eq!(chunks, vec!["hi", "abcd", "efgh", "ij"]);
        for chunk in split_for_requests(&"x".repeat(250), MAX_REQUEST_CHARS) {
            assert!(chunk.chars().count() <= MAX_REQUEST_CHARS);
        }
    }
}
