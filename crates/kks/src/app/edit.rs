//! The `edit` flow: pick a session, then connect, launch, or message a client.

use std::path::PathBuf;

use anyhow::Result;

use crate::app::editor::Editor;
use crate::app::launch::LaunchMode;
use crate::domain::model::{Context, Session};
use crate::domain::target::FileTarget;
use crate::infra::config::Config;
use crate::infra::git;

/// How a session is chosen when the caller is not already inside one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionPolicy {
    pub default_session: String,
    pub use_gitdir: bool,
    pub cwd: PathBuf,
}

impl SessionPolicy {
    pub fn from_config(config: &Config, cwd: PathBuf) -> Self {
        Self {
            default_session: config.session.default.clone(),
            use_gitdir: config.session.use_gitdir,
            cwd,
        }
    }
}

/// Open `target` according to the context the tool runs in.
///
/// Outside a session the target goes to an existing session when there is one, otherwise to a
/// brand-new editor. Inside a session it goes to a new client, or to the current client when
/// one is known.
pub fn edit<E>(editor: &E, ctx: &Context, target: &FileTarget, policy: &SessionPolicy) -> Result<()>
where
    E: Editor + ?Sized,
{
    if ctx.session.is_set() {
        connect_or_edit_in_client(editor, ctx, target)
    } else {
        find_or_run_session(editor, target, policy)
    }
}

fn find_or_run_session<E>(editor: &E, target: &FileTarget, policy: &SessionPolicy) -> Result<()>
where
    E: Editor + ?Sized,
{
    let session = resolve_session(editor, target, policy)?;

    if editor.session_exists(&session)? {
        editor.launch(LaunchMode::Connect(&session), target)
    } else {
        editor.launch(LaunchMode::Fresh, target)
    }
}

/// The git-derived session (started if missing) or the configured default.
fn resolve_session<E>(editor: &E, target: &FileTarget, policy: &SessionPolicy) -> Result<Session>
where
    E: Editor + ?Sized,
{
    if policy.use_gitdir {
        let derived = Session::new(git::session_name(target, &policy.cwd));
        if derived.is_set() {
            if editor.session_exists(&derived)? {
                return Ok(derived);
            }
            let name = editor.start_session(&derived)?;
            tracing::info!(session = %name, "started git directory session");
            eprintln!("new session for git directory started: {name}");
            return Ok(Session::new(name));
        }
        tracing::debug!(cwd = %policy.cwd.display(), "no git directory, using default session");
    }
    Ok(Session::new(policy.default_session.clone()))
}

fn connect_or_edit_in_client<E>(editor: &E, ctx: &Context, target: &FileTarget) -> Result<()>
where
    E: Editor + ?Sized,
{
    if ctx.client.is_set() {
        // The edit must land in the client, not in whatever buffer the caller runs under.
        let client_ctx = Context {
            buffer: None,
            ..ctx.clone()
        };
        editor.send(&client_ctx, &edit_command(target), None)
    } else {
        editor.launch(LaunchMode::Connect(&ctx.session), target)
    }
}

/// `edit -existing <path> [line] [col]` with spaces in the path escaped for `eval`.
pub fn edit_command(target: &FileTarget) -> String {
    let mut command = format!("edit -existing {}", target.path().replace(' ', "\\\\ "));
    if target.line() != 0 {
        command.push_str(&format!(" {}", target.line()));
    }
    if target.column() != 0 {
        command.push_str(&format!(" {}", target.column()));
    }
    command
}
