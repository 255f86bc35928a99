//! Session registry backed by `kak -l` and `kak -d`.

use std::process::{Child, ExitStatus};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::app::editor::Kak;
use crate::domain::errors::KakError;
use crate::domain::model::{Session, sanitize_session_name};

const DEAD_SUFFIX: &str = " (dead)";
const POLL_INTERVAL: Duration = Duration::from_millis(10);

/// One line of `kak -l`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    pub name: String,
    /// The socket exists but no server answers on it.
    pub dead: bool,
}

/// Parse the output of `kak -l`.
pub fn parse_listing(stdout: &str) -> Vec<SessionInfo> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| match line.strip_suffix(DEAD_SUFFIX) {
            Some(name) => SessionInfo {
                name: name.trim_end().to_owned(),
                dead: true,
            },
            None => SessionInfo {
                name: line.to_owned(),
                dead: false,
            },
        })
        .collect()
}

impl Kak {
    /// All sessions currently known to Kakoune, dead ones included.
    pub fn sessions(&self) -> Result<Vec<SessionInfo>, KakError> {
        let stdout = self.binary.output(&["-l"])?;
        Ok(parse_listing(&stdout))
    }

    /// Whether a live session named `session` is listed. Never cached.
    pub fn exists(&self, session: &Session) -> Result<bool, KakError> {
        let found = self
            .sessions()?
            .iter()
            .any(|info| !info.dead && info.name == session.name);
        tracing::debug!(%session, found, "session lookup");
        Ok(found)
    }

    /// Start a headless session and wait until it is listed.
    ///
    /// The requested name is sanitized first; the name actually used is returned. An empty
    /// request gets a name derived from this process id.
    pub fn start(&self, session: &Session) -> Result<String, KakError> {
        let name = if session.is_set() {
            sanitize_session_name(&session.name)
        } else {
            format!("kks-{}", std::process::id())
        };

        let mut child = self.binary.spawn_detached(&["-s", name.as_str(), "-d"])?;
        let started = Instant::now();
        let target = Session::new(name.clone());

        loop {
            if self.exists(&target)? {
                reap(&mut child);
                return Ok(name);
            }

            if let Ok(Some(status)) = child.try_wait()
                && !status.success()
            {
                return Err(KakError::Exit {
                    action: format!("-s {name} -d"),
                    status,
                    output: String::new(),
                });
            }

            if started.elapsed() >= self.start_timeout {
                return Err(KakError::StartTimeout {
                    session: name,
                    waited: self.start_timeout,
                });
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

/// Collect the spawned server's exit status if it has already finished, so it does not linger
/// as a zombie under the process we exec into.
fn reap(child: &mut Child) -> Option<ExitStatus> {
    match child.try_wait() {
        Ok(status) => status,
        Err(err) => {
            tracing::debug!(error = %err, "failed to reap session server");
            None
        }
    }
}
