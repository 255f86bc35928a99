//! Errors raised while talking to the Kakoune binary.

use std::io;
use std::path::PathBuf;
use std::process::ExitStatus;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum KakError {
    #[error("`{binary}` not found in PATH")]
    NotFound { binary: String },

    #[error("failed to start `kak {action}`")]
    Spawn {
        action: String,
        #[source]
        source: io::Error,
    },

    #[error("`kak {action}` exited with {status}{}", format_output(.output))]
    Exit {
        action: String,
        status: ExitStatus,
        output: String,
    },

    #[error("failed to exec {}", .binary.display())]
    Exec {
        binary: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("session {session} did not come up within {waited:?}")]
    StartTimeout { session: String, waited: Duration },
}

fn format_output(output: &str) -> String {
    let output = output.trim();
    if output.is_empty() {
        String::new()
    } else {
        format!(": {output}")
    }
}
