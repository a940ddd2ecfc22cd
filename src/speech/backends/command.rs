//! OS-native speech command backend (macOS `say`)
//!
//! Each utterance runs the command once and waits for it to exit. Text is
//! written to the command's stdin instead of being placed on a command
//! line, so no shell is involved and nothing needs quoting.

use crate::speech::{CommandRunner, Voice};
use crate::{Result, VoiceError};
use log::{debug, error};
use std::io::{self, Write};
use std::process::{Command, Stdio};
use std::sync::Arc;

/// Speaks through an OS speech command
pub struct NativeCommand {
    runner: Arc<dyn CommandRunner>,
}

impl NativeCommand {
    /// The speech command
    pub const PROGRAM: &'static str = "say";

    /// `-f -` makes `say` read the text from stdin
    const ARGS: [&'static str; 2] = ["-f", "-"];

    pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
        Self { runner }
    }
}

impl Voice for NativeCommand {
    fn name(&self) -> &'static str {
        "native command"
    }

    fn speak(&mut self, text: &str) -> Result<()> {
        debug!("Speaking via {}: {}", Self::PROGRAM, text);
        self.runner.run(Self::PROGRAM, &Self::ARGS, text)
    }
}

/// Runs real processes
pub struct SystemCommandRunner;

impl CommandRunner for SystemCommandRunner {
    fn is_available(&self, program: &str) -> bool {
        which::which(program).is_ok()
    }

    fn run(&self, program: &str, args: &[&str], input: &str) -> Result<()> {
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                error!("Failed to spawn {}: {}", program, e);
                VoiceError::Synthesis(format!("Failed to start {}: {}", program, e))
            })?;

        if let Some(mut stdin) = child.stdin.take() {
            match stdin.write_all(input.as_bytes()) {
                Ok(()) => {}
                // The command stopped reading; its exit status tells the rest
                Err(e) if e.kind() == io::ErrorKind::BrokenPipe => {
                    debug!("{} closed stdin early", program);
                }
                Err(e) => {
                    drop(stdin);
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(VoiceError::Synthesis(format!("Failed to send text: {}", e)));
                }
            }
            // stdin is closed here so the command sees end of input
        }

        let output = child
            .wait_with_output()
            .map_err(|e| VoiceError::Synthesis(format!("{} did not finish: {}", program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VoiceError::Synthesis(format!(
                "{} exited with {}: {}",
                program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingRunner {
        calls: Mutex<Vec<(String, Vec<String>, String)>>,
    }

    impl CommandRunner for RecordingRunner {
        fn is_available(&self, _program: &str) -> bool {
            true
        }

        fn run(&self, program: &str, args: &[&str], input: &str) -> Result<()> {
            self.calls.lock().unwrap().push((
                program.to_string(),
                args.iter().map(|a| a.to_string()).collect(),
                input.to_string(),
            ));
            Ok(())
        }
    }

    #[test]
    fn test_text_goes_through_stdin() {
        let runner = Arc::new(RecordingRunner::default());
        let mut voice = NativeCommand::new(runner.clone());

        voice.speak("It's -v 'quoted' $(rm -rf)").unwrap();

        let calls = runner.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        let (program, args, input) = &calls[0];
        assert_eq!(program, "say");
        assert_eq!(args, &["-f", "-"]);
        assert_eq!(input, "It's -v 'quoted' $(rm -rf)");
    }

    #[cfg(unix)]
    #[test]
    fn test_system_runner_reports_failure() {
        let runner = SystemCommandRunner;
        assert!(runner.is_available("sh"));
        assert!(runner.run("sh", &["-c", "cat > /dev/null"], "hello").is_ok());
        assert!(matches!(
            runner.run("sh", &["-c", "exit 3"], ""),
            Err(VoiceError::Synthesis(_))
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_command_exiting_before_reading_input() {
        let runner = SystemCommandRunner;
        let long_text = "x".repeat(1 << 20);

        // Exit status decides the result, not the broken pipe
        assert!(runner.run("sh", &["-c", "exit 0"], &long_text).is_ok());
        match runner.run("sh", &["-c", "echo refused >&2; exit 4"], &long_text) {
            Err(VoiceError::Synthesis(msg)) => assert!(msg.contains("refused"), "{}", msg),
            other => panic!("expected synthesis error, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_program() {
        let runner = SystemCommandRunner;
        assert!(!runner.is_available("definitely-not-a-speech-command-xyz"));
        assert!(runner
            .run("definitely-not-a-speech-command-xyz", &[], "hi")
            .is_err());
    }
}
