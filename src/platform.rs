//! Platform detection utilities

use std::fmt;

/// Operating system family, as far as speech backend selection cares
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsKind {
    MacOs,
    Windows,
    Linux,
    Other,
}

impl OsKind {
    /// Detect the operating system this binary was built for
    pub fn current() -> Self {
        match std::env::consts::OS {
            "macos" => OsKind::MacOs,
            "windows" => OsKind::Windows,
            "linux" => OsKind::Linux,
            _ => OsKind::Other,
        }
    }
}

impl fmt::Display for OsKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OsKind::MacOs => "macOS",
            OsKind::Windows => "Windows",
            OsKind::Linux => "Linux",
            OsKind::Other => "other",
        };
        f.write_str(name)
    }
}
