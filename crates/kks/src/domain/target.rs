//! Parsing the file argument of `kks edit` into an edit target.

use std::path::{Component, Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;

static POSITION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+(\d+)(?::(\d+))?$").expect("position pattern compiles"));

/// A file to open plus an optional cursor position.
///
/// `line` and `column` are 1-based; 0 means unset. A column is only ever set together with a
/// line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileTarget {
    path: String,
    line: u32,
    column: u32,
}

impl FileTarget {
    pub fn new(path: impl Into<String>, line: u32, column: u32) -> Self {
        let column = if line == 0 { 0 } else { column };
        Self {
            path: path.into(),
            line,
            column,
        }
    }

    /// Build a target from positional tokens.
    ///
    /// Tokens of the form `+<line>[:<col>]` set the position. The first other token is the path,
    /// even when it starts with `+`; later malformed positions and extra paths are dropped.
    pub fn parse<I, S>(tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut path: Option<String> = None;
        let mut position = (0, 0);

        for token in tokens {
            let token = token.as_ref();
            if let Some(parsed) = parse_position(token) {
                position = parsed;
            } else if path.is_none() {
                path = Some(normalize(token));
            } else if token.starts_with('+') {
                tracing::debug!(token, "ignoring malformed position");
            } else {
                tracing::warn!(token, "ignoring extra file argument");
            }
        }

        Self::new(path.unwrap_or_default(), position.0, position.1)
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn line(&self) -> u32 {
        self.line
    }

    pub fn column(&self) -> u32 {
        self.column
    }

    /// Whether a file was named at all.
    pub fn has_path(&self) -> bool {
        !self.path.is_empty()
    }

    /// The `+line[:col]` argument understood by `kak`, if a line is set.
    pub fn position_arg(&self) -> Option<String> {
        match (self.line, self.column) {
            (0, _) => None,
            (line, 0) => Some(format!("+{line}")),
            (line, column) => Some(format!("+{line}:{column}")),
        }
    }
}

fn parse_position(token: &str) -> Option<(u32, u32)> {
    let captures = POSITION.captures(token)?;
    let line = captures.get(1)?.as_str().parse().ok()?;
    let column = match captures.get(2) {
        Some(col) => col.as_str().parse().ok()?,
        None => 0,
    };
    Some((line, column))
}

fn normalize(raw: &str) -> String {
    let normalized: PathBuf = Path::new(raw)
        .components()
        .filter(|component| !matches!(component, Component::CurDir))
        .collect();
    if normalized.as_os_str().is_empty() {
        raw.to_owned()
    } else {
        normalized.to_string_lossy().into_owned()
    }
}
