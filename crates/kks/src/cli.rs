//! Command-line surface.

use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context as _, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

use crate::app::edit::{SessionPolicy, edit};
use crate::app::editor::Kak;
use crate::app::send::parse_error_line;
use crate::domain::model::{Context, Session};
use crate::domain::target::FileTarget;
use crate::infra::config::Config;

#[derive(Debug, Parser)]
#[command(name = "kks", author, version, about = "Handy Kakoune companion", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Edit file. In session and client, if set.
    #[command(visible_alias = "e")]
    Edit {
        #[arg(short = 's', value_name = "SESSION")]
        session: Option<String>,
        #[arg(short = 'c', value_name = "CLIENT")]
        client: Option<String>,
        /// File to open, optionally followed by +<line>[:<col>]
        #[arg(value_name = "FILE", num_args = 0..)]
        args: Vec<String>,
    },
    /// Attach a new client to a session.
    #[command(visible_alias = "a")]
    Attach {
        #[arg(short = 's', value_name = "SESSION")]
        session: Option<String>,
        #[arg(value_name = "FILE", num_args = 0..)]
        args: Vec<String>,
    },
    /// Send a command to a session, in a client or buffer if set.
    #[command(visible_alias = "s")]
    Send {
        #[arg(short = 's', value_name = "SESSION")]
        session: Option<String>,
        #[arg(short = 'c', value_name = "CLIENT")]
        client: Option<String>,
        #[arg(short = 'b', value_name = "BUFFER")]
        buffer: Option<String>,
        /// Append errors raised by the command to this file
        #[arg(long, value_name = "FILE")]
        err_out: Option<PathBuf>,
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },
    /// List sessions.
    #[command(visible_alias = "l")]
    List {
        #[arg(long)]
        json: bool,
    },
    /// Print errors recorded by `send --err-out`.
    Errors {
        #[arg(value_name = "FILE")]
        file: PathBuf,
    },
    /// Generate shell completions.
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Completions { shell } => {
            let mut command = Cli::command();
            clap_complete::generate(shell, &mut command, "kks", &mut io::stdout());
            Ok(())
        }
        Commands::Errors { file } => print_errors(&file),
        Commands::Edit {
            session,
            client,
            args,
        } => {
            let config = Config::load()?;
            let kak = Kak::from_config(&config)?;
            let ctx = Context::from_env().with_overrides(session, client, None);
            let cwd = env::current_dir().context("unable to determine working directory")?;
            let policy = SessionPolicy::from_config(&config, cwd);
            edit(&kak, &ctx, &FileTarget::parse(&args), &policy)
        }
        Commands::Attach { session, args } => {
            let config = Config::load()?;
            let kak = Kak::from_config(&config)?;
            let ctx = Context::from_env().with_overrides(session, None, None);
            let session = if ctx.session.is_set() {
                ctx.session
            } else {
                Session::new(config.session.default.clone())
            };
            Err(kak.connect(&session, &FileTarget::parse(&args)).into())
        }
        Commands::Send {
            session,
            client,
            buffer,
            err_out,
            command,
        } => {
            let config = Config::load()?;
            let kak = Kak::from_config(&config)?;
            let ctx = Context::from_env().with_overrides(session, client, buffer);
            if !ctx.session.is_set() {
                bail!("no session: set KKS_SESSION or pass -s");
            }
            kak.dispatch(&ctx, &command.join(" "), err_out.as_deref())
                .with_context(|| format!("failed to send command to session {}", ctx.session))
        }
        Commands::List { json } => {
            let config = Config::load()?;
            let kak = Kak::from_config(&config)?;
            let sessions = kak.sessions()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&sessions)?);
            } else {
                for session in sessions {
                    if session.dead {
                        println!("{} (dead)", session.name);
                    } else {
                        println!("{}", session.name);
                    }
                }
            }
            Ok(())
        }
    }
}

fn print_errors(file: &Path) -> Result<()> {
    if !file.exists() {
        return Ok(());
    }
    let contents = fs::read_to_string(file)
        .with_context(|| format!("failed to read error file {}", file.display()))?;
    for error in contents.lines().filter_map(parse_error_line) {
        println!("{error}");
    }
    Ok(())
}
