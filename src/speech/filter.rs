//! Text filtering applied before any text reaches a speech provider

use once_cell::sync::Lazy;
use regex::Regex;

/// CSI sequences introduced by either `ESC [` or the single-byte C1 `CSI`
static ANSI_ESCAPE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:\x{9B}|\x1B\[)[0-?]*[ -/]*[@-~]").expect("ANSI escape pattern is valid")
});

/// Remove terminal color and formatting escape sequences so they aren't spoken
pub fn strip_ansi(text: &str) -> String {
    ANSI_ESCAPE.replace_all(text, "").into_owned()
}

/// True when there is nothing worth handing to a speech engine
pub fn is_blank(text: &str) -> bool {
    text.trim().is_empty()
}
