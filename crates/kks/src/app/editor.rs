//! The seam between the edit flow and a real Kakoune installation.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;

use crate::app::launch::LaunchMode;
use crate::domain::model::{Context, Session};
use crate::domain::target::FileTarget;
use crate::infra::config::Config;
use crate::infra::kak::KakBinary;

/// Operations the edit flow needs from the editor.
pub trait Editor {
    /// Whether a live session with this name is currently listed.
    fn session_exists(&self, session: &Session) -> Result<bool>;

    /// Start a headless session, returning the name it was actually given.
    fn start_session(&self, session: &Session) -> Result<String>;

    /// Replace this process with the editor. Returns only on failure in real implementations.
    fn launch(&self, mode: LaunchMode<'_>, target: &FileTarget) -> Result<()>;

    /// Deliver `command` to a running session.
    fn send(&self, ctx: &Context, command: &str, err_out: Option<&Path>) -> Result<()>;
}

/// A Kakoune installation reached through its binary.
#[derive(Debug, Clone)]
pub struct Kak {
    pub(crate) binary: KakBinary,
    pub(crate) start_timeout: Duration,
}

impl Kak {
    pub fn new(binary: KakBinary, start_timeout: Duration) -> Self {
        Self {
            binary,
            start_timeout,
        }
    }

    /// Locate the configured binary on `PATH`.
    pub fn from_config(config: &Config) -> Result<Self> {
        let binary = KakBinary::locate(&config.kak.binary)?;
        Ok(Self::new(binary, config.kak.start_timeout()))
    }

    pub fn binary(&self) -> &KakBinary {
        &self.binary
    }
}

impl Editor for Kak {
    fn session_exists(&self, session: &Session) -> Result<bool> {
        Ok(self.exists(session)?)
    }

    fn start_session(&self, session: &Session) -> Result<String> {
        Ok(self.start(session)?)
    }

    fn launch(&self, mode: LaunchMode<'_>, target: &FileTarget) -> Result<()> {
        Err(self.run(mode, target).into())
    }

    fn send(&self, ctx: &Context, command: &str, err_out: Option<&Path>) -> Result<()> {
        Ok(self.dispatch(ctx, command, err_out)?)
    }
}
