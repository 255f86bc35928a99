//! Process primitives for the `kak` binary: query, spawn, exec, and pipe mode.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Output, Stdio};
use std::thread;

use crate::domain::errors::KakError;

/// A resolved `kak` executable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KakBinary {
    path: PathBuf,
}

impl KakBinary {
    /// Resolve `binary` through `PATH`; a name containing a separator is checked as a path.
    pub fn locate(binary: &str) -> Result<Self, KakError> {
        let path = which::which(binary).map_err(|err| {
            tracing::debug!(binary, error = %err, "kak lookup failed");
            KakError::NotFound {
                binary: binary.to_owned(),
            }
        })?;
        Ok(Self { path })
    }

    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run `kak` with `args`, returning stdout. A non-zero exit becomes [`KakError::Exit`].
    pub fn output(&self, args: &[&str]) -> Result<String, KakError> {
        let action = args.join(" ");
        tracing::debug!(binary = %self.path.display(), %action, "running kak");

        let output = Command::new(&self.path)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| KakError::Spawn {
                action: action.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(exit_error(action, &output));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Start `kak` in its own process group with all standard streams detached.
    pub fn spawn_detached(&self, args: &[&str]) -> Result<Child, KakError> {
        let action = args.join(" ");
        tracing::debug!(binary = %self.path.display(), %action, "spawning detached kak");

        let mut command = Command::new(&self.path);
        command
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            command.process_group(0);
        }

        command
            .spawn()
            .map_err(|source| KakError::Spawn { action, source })
    }

    /// Replace the current process with `kak args...`.
    ///
    /// Only returns when the replacement could not happen.
    #[cfg(unix)]
    pub fn exec(&self, args: &[String]) -> KakError {
        use std::os::unix::process::CommandExt;

        tracing::debug!(binary = %self.path.display(), ?args, "exec kak");
        let source = Command::new(&self.path).args(args).exec();
        KakError::Exec {
            binary: self.path.clone(),
            source,
        }
    }

    /// Run `kak args...` on the inherited terminal and exit with its status.
    ///
    /// Only returns when the editor could not be started.
    #[cfg(not(unix))]
    pub fn exec(&self, args: &[String]) -> KakError {
        tracing::debug!(binary = %self.path.display(), ?args, "running kak in place of exec");
        match Command::new(&self.path).args(args).status() {
            Ok(status) => std::process::exit(status.code().unwrap_or(1)),
            Err(source) => KakError::Exec {
                binary: self.path.clone(),
                source,
            },
        }
    }

    /// Feed `script` to `kak -p <session>`.
    ///
    /// The script is written from a background thread while this thread waits for the process.
    /// Write failures are only logged; the exit status decides the outcome.
    pub fn pipe(&self, session: &str, script: String) -> Result<(), KakError> {
        let action = format!("-p {session}");
        tracing::debug!(binary = %self.path.display(), %action, "piping script to kak");

        let mut child = Command::new(&self.path)
            .args(["-p", session])
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| KakError::Spawn {
                action: action.clone(),
                source,
            })?;

        let Some(mut stdin) = child.stdin.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(KakError::Spawn {
                action,
                source: std::io::Error::other("stdin of kak -p was not captured"),
            });
        };

        let writer = thread::spawn(move || {
            if let Err(err) = stdin.write_all(script.as_bytes()) {
                tracing::debug!(error = %err, "failed to write script to kak -p");
            }
        });

        let output = child.wait_with_output().map_err(|source| KakError::Spawn {
            action: action.clone(),
            source,
        })?;
        if writer.join().is_err() {
            tracing::debug!("script writer thread panicked");
        }

        if !output.status.success() {
            return Err(exit_error(action, &output));
        }
        Ok(())
    }
}

fn exit_error(action: String, output: &Output) -> KakError {
    let mut combined = String::from_utf8_lossy(&output.stdout).into_owned();
    combined.push_str(&String::from_utf8_lossy(&output.stderr));
    KakError::Exit {
        action,
        status: output.status,
        output: combined,
    }
}
