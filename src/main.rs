//! Assistant voice entry point
//!
//! Speaks the text given on the command line, or every line read from
//! stdin. Lines starting with `:` are commands:
//! `:faster`, `:slower`, `:rate <delta>`, `:quit`.

use assistant_voice::config::Config;
use assistant_voice::{Result, VoiceController, VoiceError};
use log::{debug, error, info};
use std::io::{self, BufRead};
use std::process;

/// Rate step for `:faster` / `:slower`
const RATE_STEP: i32 = 25;

/// Parsed command line
struct Options {
    debug: bool,
    rate: Option<i32>,
    prefer_cloud: Option<bool>,
    text: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Options> {
    let mut options = Options {
        debug: false,
        rate: None,
        prefer_cloud: None,
        text: Vec::new(),
    };

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--debug" | "-d" => options.debug = true,
            "--cloud" => options.prefer_cloud = Some(true),
            "--no-cloud" => options.prefer_cloud = Some(false),
            "--rate" | "-r" => {
                let value = args
                    .next()
                    .ok_or_else(|| VoiceError::Config("--rate needs a value".to_string()))?;
                let rate = value
                    .parse()
                    .map_err(|_| VoiceError::Config(format!("Invalid rate: {}", value)))?;
                options.rate = Some(rate);
            }
            _ => options.text.push(arg),
        }
    }

    Ok(options)
}

fn init_logging(debug_mode: bool) {
    if debug_mode {
        // Debug mode: write to assistant-voice.log
        use std::fs::OpenOptions;
        match OpenOptions::new()
            .create(true)
            .append(true)
            .open("assistant-voice.log")
        {
            Ok(log_file) => {
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .target(env_logger::Target::Pipe(Box::new(log_file)))
                    .init();
            }
            Err(e) => {
                eprintln!("Warning: Failed to open assistant-voice.log: {}", e);
                eprintln!("Logging debug output to stderr instead");
                env_logger::Builder::new()
                    .filter_level(log::LevelFilter::Debug)
                    .init();
            }
        }
    } else {
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Error)
            .parse_default_env()
            .init();
    }
}

fn main() {
    let options = match parse_args(std::env::args().skip(1)) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {}", e);
            eprintln!("Usage: assistant-voice [--debug] [--rate N] [--cloud|--no-cloud] [TEXT...]");
            process::exit(2);
        }
    };

    init_logging(options.debug);
    info!("{} version {} starting", assistant_voice::APP_NAME, assistant_voice::VERSION);

    if let Err(e) = run(options) {
        error!("Fatal error: {}", e);
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(options: Options) -> Result<()> {
    let mut config = Config::load()?;
    info!("Configuration loaded from {:?}", config.path());

    // Command line overrides stored preferences
    let mut voice = VoiceController::from_config(&config);
    if let Some(rate) = options.rate {
        voice = voice.with_rate(rate);
    }
    if options.prefer_cloud.is_some() {
        voice = voice.with_prefer_cloud(options.prefer_cloud);
    }

    voice.start();

    if !options.text.is_empty() {
        voice.speak(&options.text.join(" "))?;
    } else {
        for line in io::stdin().lock().lines() {
            let line = line?;
            match handle_line(&mut voice, line.trim()) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => error!("Failed to speak: {}", e),
            }
        }
    }

    let rate = voice.rate().get();
    voice.stop()?;

    if config.speech_rate() != Some(rate) {
        config.set_speech_rate(rate);
        config.save()?;
        debug!("Saved speech rate {}", rate);
    }

    Ok(())
}

/// Handle one input line; `Ok(false)` ends the session
fn handle_line(voice: &mut VoiceController, line: &str) -> Result<bool> {
    match line.split_once(' ').unwrap_or((line, "")) {
        (":quit", _) => return Ok(false),
        (":faster", _) => voice.change_rate(RATE_STEP)?,
        (":slower", _) => voice.change_rate(-RATE_STEP)?,
        (":rate", delta) => match delta.trim().parse() {
            Ok(delta) => voice.change_rate(delta)?,
            Err(_) => eprintln!("Usage: :rate <delta>"),
        },
        _ => voice.speak(line)?,
    }
    Ok(true)
}
