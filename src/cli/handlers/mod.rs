mod init;
mod shell;

pub use init::cmd_init;
pub use shell::{ShellOutcome, run_shell, run_shell_line};

use std::path::PathBuf;

use chrono::{Days, Local, NaiveDate};

use crate::cli::commands::*;
use crate::cli::output::*;
use crate::io::config_io::{self, LoadedConfig};
use crate::io::recovery;
use crate::logging;
use crate::ops::tree_ops::NewTask;
use crate::parse::document::DATE_FORMAT;
use crate::session::Session;

type CmdResult = Result<(), Box<dyn std::error::Error>>;

/// Where the tasks file lives and how output should look.
pub struct Context {
    pub tasks_path: PathBuf,
    /// della.toml in effect, if one was found
    pub config_source: Option<PathBuf>,
    pub json: bool,
}

// ---------------------------------------------------------------------------
// Dispatch
// ---------------------------------------------------------------------------

pub fn dispatch(cli: Cli) -> CmdResult {
    let start = match &cli.dir {
        Some(dir) => std::fs::canonicalize(dir)
            .map_err(|e| format!("cannot resolve -C path '{}': {}", dir, e))?,
        None => std::env::current_dir()?,
    };
    let loaded = config_io::load_config(&start)?;
    logging::init(&loaded.config.log.level);

    let ctx = Context {
        tasks_path: tasks_path(&cli, &loaded)?,
        config_source: loaded.source.clone(),
        json: cli.json,
    };
    tracing::debug!(file = %ctx.tasks_path.display(), "using tasks file");

    match cli.command {
        Commands::Init(args) => cmd_init(&ctx, args),
        Commands::Show(args) => cmd_show(&ctx, args),
        Commands::Path(args) => cmd_path(&ctx, args),
        Commands::Add(args) => cmd_add(&ctx, args),
        Commands::Mv(args) => cmd_mv(&ctx, args),
        Commands::Rm(args) => cmd_rm(&ctx, args),
        Commands::Date(args) => cmd_date(&ctx, args),
        Commands::Id(args) => cmd_id(&ctx, args),
        Commands::Title(args) => cmd_title(&ctx, args),
        Commands::Complete(args) => cmd_complete(&ctx, args),
        Commands::Shell => cmd_shell(&ctx),
        Commands::Recovery => cmd_recovery(&ctx),
    }
}

fn tasks_path(cli: &Cli, loaded: &LoadedConfig) -> Result<PathBuf, std::io::Error> {
    match &cli.file {
        Some(file) => Ok(std::env::current_dir()?.join(file)),
        None => Ok(loaded.tasks_path()),
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parse a due date argument: `YYYY-MM-DD`, `today`, `tomorrow`, or
/// `none`/empty to clear.
pub fn parse_due_date(s: &str) -> Result<Option<NaiveDate>, String> {
    let s = s.trim();
    let today = Local::now().date_naive();
    match s.to_lowercase().as_str() {
        "" | "none" => Ok(None),
        "today" => Ok(Some(today)),
        "tomorrow" => Ok(today.checked_add_days(Days::new(1))),
        _ => NaiveDate::parse_from_str(s, DATE_FORMAT)
            .map(Some)
            .map_err(|_| format!("invalid date '{}': expected YYYY-MM-DD, today, tomorrow or none", s)),
    }
}

/// `none` clears an optional text field.
fn optional_arg(s: &str) -> Option<String> {
    match s.trim() {
        "" | "none" => None,
        v => Some(v.to_string()),
    }
}

fn load(ctx: &Context) -> Result<Session, Box<dyn std::error::Error>> {
    Ok(Session::load(&ctx.tasks_path)?)
}

// ---------------------------------------------------------------------------
// Read commands
// ---------------------------------------------------------------------------

fn cmd_show(ctx: &Context, args: ShowArgs) -> CmdResult {
    let session = load(ctx)?;
    let node = match &args.path {
        Some(path) => session.resolve(path)?,
        None => session.root(),
    };
    let tree = session.tree();
    if ctx.json {
        let json = task_to_json(tree, node, args.depth);
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        print!("{}", format_tree(tree, node, args.depth));
    }
    Ok(())
}

fn cmd_path(ctx: &Context, args: PathArgs) -> CmdResult {
    let session = load(ctx)?;
    let node = session.resolve(&args.path)?;
    println!("{}", session.tree().full_path_str(node));
    Ok(())
}

fn cmd_complete(ctx: &Context, args: CompleteArgs) -> CmdResult {
    let mut session = load(ctx)?;
    if let Some(base) = &args.base {
        session.navigate(base)?;
    }
    let cursor = args.cursor.unwrap_or_else(|| args.text.chars().count());
    let completion = session.complete(&args.text, cursor);

    let candidates: Vec<String> = if args.all {
        completion.suggestions().to_vec()
    } else {
        completion.matching().into_iter().map(str::to_string).collect()
    };

    if ctx.json {
        let fragment = match &completion {
            crate::complete::Completion::Candidates { fragment, .. } => fragment.clone(),
            crate::complete::Completion::Fallback => String::new(),
        };
        let json = CompletionJson {
            fallback: completion.is_fallback(),
            fragment,
            candidates,
        };
        println!("{}", serde_json::to_string_pretty(&json)?);
    } else {
        for candidate in candidates {
            println!("{}", candidate);
        }
    }
    Ok(())
}

fn cmd_recovery(ctx: &Context) -> CmdResult {
    match recovery::read_recovery_log(&recovery::log_dir_for(&ctx.tasks_path)) {
        Some(log) => print!("{}", log),
        None => println!("no recovery log"),
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Write commands
// ---------------------------------------------------------------------------

fn cmd_add(ctx: &Context, args: AddArgs) -> CmdResult {
    let mut session = load(ctx)?;
    let parent = session.resolve(&args.parent)?;
    let mut task = NewTask::new(args.content.trim());
    if let Some(due) = &args.due {
        task.due_date = parse_due_date(due)?;
    }
    task.unique_id = args.id.as_deref().and_then(optional_arg);

    let id = session.add(parent, task)?;
    session.save()?;
    println!("{}", session.tree().slug_path(id));
    Ok(())
}

fn cmd_mv(ctx: &Context, args: MvArgs) -> CmdResult {
    let mut session = load(ctx)?;
    let node = session.resolve(&args.path)?;
    let new_parent = session.resolve(&args.new_parent)?;
    session.change_parent(node, new_parent)?;
    session.save()?;
    println!("{}", session.tree().full_path_str(node));
    Ok(())
}

fn cmd_rm(ctx: &Context, args: RmArgs) -> CmdResult {
    let mut session = load(ctx)?;
    let node = session.resolve(&args.path)?;
    let full_path = session.tree().full_path_str(node);
    session.detach(node)?;
    session.save()?;
    println!("removed {}", full_path);
    Ok(())
}

fn cmd_date(ctx: &Context, args: DateArgs) -> CmdResult {
    let mut session = load(ctx)?;
    let node = session.resolve(&args.path)?;
    let date = parse_due_date(&args.date)?;
    session.change_date(node, date)?;
    session.save()?;
    Ok(())
}

fn cmd_id(ctx: &Context, args: IdArgs) -> CmdResult {
    let mut session = load(ctx)?;
    let node = session.resolve(&args.path)?;
    session.set_unique_id(node, optional_arg(&args.id))?;
    session.save()?;
    Ok(())
}

fn cmd_title(ctx: &Context, args: TitleArgs) -> CmdResult {
    let mut session = load(ctx)?;
    let node = session.resolve(&args.path)?;
    session.set_content(node, args.content.trim())?;
    session.save()?;
    Ok(())
}

fn cmd_shell(ctx: &Context) -> CmdResult {
    let mut session = load(ctx)?;
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    run_shell(&mut session, stdin.lock(), stdout.lock())?;
    Ok(())
}
