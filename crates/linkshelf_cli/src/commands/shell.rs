//! Line-oriented shell driving a sync engine.

use super::{ShellError, ShellResult};
use linkshelf_protocol::{BookmarkStore, SessionProvider};
use linkshelf_sync_engine::{EngineError, SessionOutcome, SyncEngine};
use std::io::{BufRead, Write};
use tracing::debug;

const HELP: &str = "\
commands:
  list                  show bookmarks
  add <title> <url>     add a bookmark (url is the last word)
  delete <title>|<url>  delete by title or url, either side may be empty
  edit <n>              start editing bookmark n
  title <text>          change the working title
  url <text>            change the working url
  save                  save the edit
  cancel                discard the edit
  sync [--json]         merge pending changes from other sessions
  whoami                show the signed-in user
  signout               sign out and exit
  quit                  exit";

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show bookmarks.
    List,
    /// Add a bookmark.
    Add {
        /// Title text.
        title: String,
        /// Url text.
        url: String,
    },
    /// Delete by title or url.
    Delete {
        /// Title key.
        title: String,
        /// Url key.
        url: String,
    },
    /// Begin editing the n-th bookmark (1-based).
    Edit(usize),
    /// Set the working title.
    Title(String),
    /// Set the working url.
    Url(String),
    /// Save the edit.
    Save,
    /// Discard the edit.
    Cancel,
    /// Merge pending feed events, optionally printing each as JSON.
    Sync {
        /// Print merged events as JSON lines.
        json: bool,
    },
    /// Show the signed-in user.
    Whoami,
    /// Sign out.
    SignOut,
    /// Show usage.
    Help,
    /// Exit.
    Quit,
}

impl Command {
    /// Parses one input line. Blank lines yield `None`.
    pub fn parse(line: &str) -> ShellResult<Option<Command>> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        let command = match word {
            "list" | "ls" => Command::List,
            "add" => {
                let (title, url) = rest
                    .rsplit_once(char::is_whitespace)
                    .ok_or_else(|| ShellError::Usage("add <title> <url>".into()))?;
                Command::Add {
                    title: title.trim().to_string(),
                    url: url.to_string(),
                }
            }
            "delete" | "rm" => {
                let (title, url) = rest.split_once('|').unwrap_or((rest, ""));
                Command::Delete {
                    title: title.trim().to_string(),
                    url: url.trim().to_string(),
                }
            }
            "edit" => {
                let n = rest
                    .parse::<usize>()
                    .ok()
                    .filter(|n| *n > 0)
                    .ok_or_else(|| ShellError::Usage("edit <n>, n starts at 1".into()))?;
                Command::Edit(n)
            }
            "title" => Command::Title(rest.to_string()),
            "url" => Command::Url(rest.to_string()),
            "save" => Command::Save,
            "cancel" => Command::Cancel,
            "sync" => match rest {
                "" => Command::Sync { json: false },
                "--json" => Command::Sync { json: true },
                _ => return Err(ShellError::Usage("sync [--json]".into())),
            },
            "whoami" => Command::Whoami,
            "signout" => Command::SignOut,
            "help" | "?" => Command::Help,
            "quit" | "exit" => Command::Quit,
            other => return Err(ShellError::Usage(format!("unknown command: {other}"))),
        };
        Ok(Some(command))
    }
}

/// Whether the shell keeps reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Continue,
    Stop,
}

/// Reads commands from `input` until `quit`, a successful sign-out or EOF.
pub fn run<S, P, R, W>(engine: &mut SyncEngine<S, P>, input: R, out: &mut W) -> ShellResult<()>
where
    S: BookmarkStore,
    P: SessionProvider,
    R: BufRead,
    W: Write,
{
    for line in input.lines() {
        let line = line?;
        let command = match Command::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                writeln!(out, "{e}")?;
                continue;
            }
        };
        debug!(?command, "shell command");
        if execute(engine, command, out)? == Flow::Stop {
            break;
        }
    }
    Ok(())
}

fn execute<S, P, W>(engine: &mut SyncEngine<S, P>, command: Command, out: &mut W) -> ShellResult<Flow>
where
    S: BookmarkStore,
    P: SessionProvider,
    W: Write,
{
    match command {
        Command::List => {
            engine.process_events();
            print_list(engine, out)?;
        }
        Command::Add { title, url } => {
            engine.set_title_input(title);
            engine.set_url_input(url);
            let _ = engine.add_bookmark();
            print_notice(engine, out)?;
        }
        Command::Delete { title, url } => {
            engine.set_title_input(title);
            engine.set_url_input(url);
            let _ = engine.delete_bookmarks();
            print_notice(engine, out)?;
        }
        Command::Edit(n) => match engine.bookmarks().get(n - 1).map(|b| b.id) {
            Some(id) => {
                engine.begin_edit(id)?;
                if let Some(session) = engine.edit_state().session() {
                    writeln!(out, "editing #{n}: {} <{}>", session.title, session.url)?;
                }
            }
            None => writeln!(out, "no bookmark #{n}")?,
        },
        Command::Title(text) => report(out, engine.edit_title(text))?,
        Command::Url(text) => report(out, engine.edit_url(text))?,
        Command::Save => match engine.save_edit() {
            Ok(()) => print_notice(engine, out)?,
            Err(e) => {
                let bound = engine
                    .edit_state()
                    .session()
                    .and_then(|s| s.error.clone());
                writeln!(out, "{}", bound.unwrap_or_else(|| e.to_string()))?;
            }
        },
        Command::Cancel => match engine.cancel_edit() {
            Some(_) => writeln!(out, "edit cancelled")?,
            None => writeln!(out, "nothing to cancel")?,
        },
        Command::Sync { json } => {
            let merged = engine.merge_pending();
            if json {
                for (event, _) in &merged {
                    writeln!(out, "{}", event.to_json().map_err(ShellError::Encode)?)?;
                }
            }
            let changed = merged.iter().filter(|(_, changed)| *changed).count();
            writeln!(out, "{changed} change(s) merged")?;
        }
        Command::Whoami => match engine.welcome_name() {
            Some(name) => writeln!(out, "Welcome, {name}")?,
            None => writeln!(out, "not signed in")?,
        },
        Command::SignOut => match engine.sign_out() {
            SessionOutcome::SignedOut => {
                writeln!(out, "signed out")?;
                return Ok(Flow::Stop);
            }
            SessionOutcome::AuthError(e) => writeln!(out, "sign-out failed: {e}")?,
        },
        Command::Help => writeln!(out, "{HELP}")?,
        Command::Quit => return Ok(Flow::Stop),
    }
    Ok(Flow::Continue)
}

fn print_list<S, P, W>(engine: &SyncEngine<S, P>, out: &mut W) -> ShellResult<()>
where
    S: BookmarkStore,
    P: SessionProvider,
    W: Write,
{
    if engine.bookmarks().is_empty() {
        writeln!(out, "(no bookmarks)")?;
        return Ok(());
    }
    let editing = engine.edit_state().editing_id();
    for (i, bookmark) in engine.bookmarks().iter().enumerate() {
        let marker = if editing == Some(bookmark.id) { " [editing]" } else { "" };
        writeln!(out, "{:>3}. {} <{}>{marker}", i + 1, bookmark.title, bookmark.url)?;
    }
    Ok(())
}

fn print_notice<S, P, W>(engine: &SyncEngine<S, P>, out: &mut W) -> ShellResult<()>
where
    S: BookmarkStore,
    P: SessionProvider,
    W: Write,
{
    if let Some(notice) = engine.notice() {
        writeln!(out, "{}", notice.text)?;
    }
    Ok(())
}

fn report<W: Write>(out: &mut W, result: Result<(), EngineError>) -> ShellResult<()> {
    if let Err(e) = result {
        writeln!(out, "{e}")?;
    }
    Ok(())
}
