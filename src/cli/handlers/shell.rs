use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use super::{optional_arg, parse_due_date};
use crate::cli::output::{format_listing, format_tree};
use crate::ops::tree_ops::NewTask;
use crate::session::{Session, SessionError};

const HELP: &str = "\
commands:
  cd [PATH]               move to PATH (default: root)
  ls [PATH]               list children
  pwd                     print the current path
  tree [PATH]             print the subtree
  add TEXT [--due D] [--id ID]
                          add a task under the current one
  mv PATH NEW_PARENT      move a task
  rm PATH                 remove a task and its subtasks
  date PATH DATE|none     set or clear a due date
  id PATH ID|none         set or clear a unique id
  complete TEXT           show completion candidates
  save                    write the tasks file
  reload [FILE]           load FILE (default: the tasks file), dropping unsaved changes
  quit                    save (if changed) and leave
";

/// What the shell should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShellOutcome {
    Continue,
    Quit,
}

/// Read commands from `input` until `quit` or end of input, then save if
/// anything changed. Command errors are printed and the loop goes on; a
/// failed final save is returned.
pub fn run_shell<R: BufRead, W: Write>(
    session: &mut Session,
    input: R,
    mut out: W,
) -> Result<(), Box<dyn std::error::Error>> {
    prompt(session, &mut out)?;
    for line in input.lines() {
        let line = line?;
        match run_shell_line(session, &line, &mut out) {
            Ok(ShellOutcome::Quit) => break,
            Ok(ShellOutcome::Continue) => {}
            Err(e) => writeln!(out, "error: {}", e)?,
        }
        prompt(session, &mut out)?;
    }

    if session.is_dirty() {
        session.save()?;
        writeln!(out, "saved")?;
    }
    Ok(())
}

fn prompt<W: Write>(session: &Session, out: &mut W) -> io::Result<()> {
    write!(out, "{}> ", session.tree().full_path_str(session.current()))?;
    out.flush()
}

/// Run a single shell command line.
pub fn run_shell_line<W: Write>(
    session: &mut Session,
    line: &str,
    out: &mut W,
) -> Result<ShellOutcome, Box<dyn std::error::Error>> {
    let words = shlex::split(line).ok_or("unbalanced quotes")?;
    let Some((cmd, args)) = words.split_first() else {
        return Ok(ShellOutcome::Continue);
    };
    let arg = move |i: usize| args.get(i).map(String::as_str);

    match cmd.as_str() {
        "quit" | "exit" | "q" => return Ok(ShellOutcome::Quit),
        "help" | "?" => write!(out, "{}", HELP)?,
        "cd" => {
            session.navigate(arg(0).unwrap_or("/"))?;
        }
        "pwd" => writeln!(out, "{}", session.tree().full_path_str(session.current()))?,
        "ls" => {
            let node = session.resolve(arg(0).unwrap_or("."))?;
            write!(out, "{}", format_listing(session.tree(), node))?;
        }
        "tree" => {
            let node = session.resolve(arg(0).unwrap_or("."))?;
            write!(out, "{}", format_tree(session.tree(), node, None))?;
        }
        "add" => {
            let task = parse_add_args(args)?;
            let id = session.add(session.current(), task)?;
            writeln!(out, "{}", session.tree().full_path_str(id))?;
        }
        "mv" => {
            let (Some(path), Some(parent)) = (arg(0), arg(1)) else {
                return Err("usage: mv PATH NEW_PARENT".into());
            };
            let node = session.resolve(path)?;
            let new_parent = session.resolve(parent)?;
            session.change_parent(node, new_parent)?;
        }
        "rm" => {
            let path = arg(0).ok_or("usage: rm PATH")?;
            let node = session.resolve(path)?;
            let full_path = session.tree().full_path_str(node);
            session.detach(node)?;
            writeln!(out, "removed {}", full_path)?;
        }
        "date" => {
            let (Some(path), Some(date)) = (arg(0), arg(1)) else {
                return Err("usage: date PATH DATE|none".into());
            };
            let node = session.resolve(path)?;
            session.change_date(node, parse_due_date(date)?)?;
        }
        "id" => {
            let (Some(path), Some(id)) = (arg(0), arg(1)) else {
                return Err("usage: id PATH ID|none".into());
            };
            let node = session.resolve(path)?;
            session.set_unique_id(node, optional_arg(id))?;
        }
        "complete" => {
            let text = args.join(" ");
            let completion = session.complete(&text, text.chars().count());
            for candidate in completion.matching() {
                writeln!(out, "{}", candidate)?;
            }
        }
        "save" => {
            session.save()?;
            writeln!(out, "saved")?;
        }
        "reload" => {
            let path = match arg(0) {
                Some(file) => PathBuf::from(file),
                None => session.source().map(PathBuf::from).ok_or(SessionError::NoSource)?,
            };
            session.reload(&path)?;
            writeln!(out, "loaded {}", path.display())?;
        }
        other => return Err(format!("unknown command '{}' (try help)", other).into()),
    }
    Ok(ShellOutcome::Continue)
}

fn parse_add_args(args: &[String]) -> Result<NewTask, Box<dyn std::error::Error>> {
    let mut words = Vec::new();
    let mut task = NewTask::default();
    let mut iter = args.iter();
    while let Some(word) = iter.next() {
        match word.as_str() {
            "--due" => {
                let value = iter.next().ok_or("--due needs a date")?;
                task.due_date = parse_due_date(value)?;
            }
            "--id" => {
                let value = iter.next().ok_or("--id needs a value")?;
                task.unique_id = optional_arg(value);
            }
            _ => words.push(word.as_str()),
        }
    }
    if words.is_empty() {
        return Err("usage: add TEXT [--due DATE] [--id ID]".into());
    }
    task.content = words.join(" ").trim().to_string();
    Ok(task)
}
