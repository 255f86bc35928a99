//! Replacing the current process with a Kakoune client.

use crate::app::editor::Kak;
use crate::domain::errors::KakError;
use crate::domain::model::Session;
use crate::domain::target::FileTarget;

/// How the new editor process relates to existing sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchMode<'a> {
    /// A standalone editor with its own, unnamed session.
    Fresh,
    /// A new client attached to `session` (`kak -c`).
    Connect(&'a Session),
}

/// Arguments passed to `kak`, excluding the program itself.
pub fn launch_args(mode: LaunchMode<'_>, target: &FileTarget) -> Vec<String> {
    let mut args = Vec::new();

    if let LaunchMode::Connect(session) = mode {
        args.push("-c".to_owned());
        args.push(session.name.clone());
    }

    if target.has_path() {
        args.push(target.path().to_owned());
        if let Some(position) = target.position_arg() {
            args.push(position);
        }
    }

    args
}

impl Kak {
    /// Exec into `kak`. Returns only the error that prevented the exec.
    pub fn run(&self, mode: LaunchMode<'_>, target: &FileTarget) -> KakError {
        self.binary.exec(&launch_args(mode, target))
    }

    /// Attach a new client to `session`.
    pub fn connect(&self, session: &Session, target: &FileTarget) -> KakError {
        self.run(LaunchMode::Connect(session), target)
    }
}
