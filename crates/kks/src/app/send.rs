//! Delivering commands to a running session through `kak -p`.
//!
//! Kakoune runs the piped script inside its own event loop, so nothing reports back to us.
//! The command is wrapped in `try`/`catch`: failures go to the debug buffer, optionally to an
//! error file (tagged with [`ERROR_PREFIX`]), and to the client as a markup message.

use std::fmt::Write as _;
use std::path::Path;

use crate::app::editor::Kak;
use crate::domain::errors::KakError;
use crate::domain::model::Context;

/// Marker written before each error echoed to an error file.
pub const ERROR_PREFIX: &str = "__kks_error__";

/// Build the script sent to `kak -p`.
///
/// A buffer scope wins over a client scope inside the `try` block; the error message in the
/// `catch` block is always routed to the client when one is known.
pub fn build_script(ctx: &Context, command: &str, err_out: Option<&Path>) -> String {
    let mut script = String::from("try %{ eval");

    match ctx.buffer.as_deref().filter(|buffer| !buffer.is_empty()) {
        Some(buffer) => {
            let _ = write!(script, " -buffer {buffer}");
        }
        None if ctx.client.is_set() => {
            let _ = write!(script, " -try-client {}", ctx.client);
        }
        None => {}
    }
    let _ = write!(script, " {command} }}");

    script.push_str(" catch %{");
    script.push_str(" echo -debug kks: %val{error}\n");
    if let Some(path) = err_out {
        let _ = writeln!(
            script,
            " echo -to-file {} {ERROR_PREFIX} %val{{error}}",
            quote_arg(&path.to_string_lossy())
        );
    }
    script.push_str(" eval");
    if ctx.client.is_set() {
        let _ = write!(script, " -try-client {}", ctx.client);
    }
    script.push_str(" %{ echo -markup {Error}kks: %val{error} } }");

    script
}

/// Extract the error text from a line written by the `catch` handler.
pub fn parse_error_line(line: &str) -> Option<&str> {
    line.strip_prefix(ERROR_PREFIX).map(str::trim)
}

fn quote_arg(arg: &str) -> String {
    if arg.chars().any(|ch| ch.is_whitespace() || ch == '\'' || ch == '%') {
        format!("'{}'", arg.replace('\'', "''"))
    } else {
        arg.to_owned()
    }
}

impl Kak {
    /// Send `command` to the session in `ctx`, scoped to its buffer or client.
    pub fn dispatch(
        &self,
        ctx: &Context,
        command: &str,
        err_out: Option<&Path>,
    ) -> Result<(), KakError> {
        let script = build_script(ctx, command, err_out);
        tracing::debug!(session = %ctx.session, %script, "dispatching command");
        self.binary.pipe(&ctx.session.name, script)
    }
}
