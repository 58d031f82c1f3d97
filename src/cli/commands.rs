use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(name = "della", about = concat!("della v", env!("CARGO_PKG_VERSION"), " - a task tree in a plain TOML file"), version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Tasks file (default: from della.toml, else ./tasks.toml)
    #[arg(short = 'f', long = "file", global = true)]
    pub file: Option<String>,

    /// Look for della.toml starting from this directory
    #[arg(short = 'C', long = "dir", global = true)]
    pub dir: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a new tasks file holding only a root task
    Init(InitArgs),
    /// Print the task tree (or a subtree)
    Show(ShowArgs),
    /// Print a task's full path
    Path(PathArgs),
    /// Add a task under a parent
    Add(AddArgs),
    /// Move a task under a new parent
    Mv(MvArgs),
    /// Remove a task and its subtasks
    Rm(RmArgs),
    /// Set or clear a due date
    Date(DateArgs),
    /// Set or clear a unique id
    Id(IdArgs),
    /// Change a task's text
    Title(TitleArgs),
    /// Print completion candidates for partial input
    Complete(CompleteArgs),
    /// Interactive line shell
    Shell,
    /// Print the recovery log
    Recovery,
}

// ---------------------------------------------------------------------------
// Args
// ---------------------------------------------------------------------------

#[derive(Args)]
pub struct InitArgs {
    /// Root task text
    pub content: String,
    /// Overwrite an existing tasks file
    #[arg(long)]
    pub force: bool,
}

#[derive(Args)]
pub struct ShowArgs {
    /// Slug path of the subtree root (default: whole tree)
    pub path: Option<String>,
    /// Levels of subtasks to show (default: all)
    #[arg(long)]
    pub depth: Option<usize>,
}

#[derive(Args)]
pub struct PathArgs {
    /// Slug path of the task
    pub path: String,
}

#[derive(Args)]
pub struct AddArgs {
    /// Slug path of the parent ("/" for the root)
    pub parent: String,
    /// Task text
    pub content: String,
    /// Due date (YYYY-MM-DD, today, tomorrow)
    #[arg(long)]
    pub due: Option<String>,
    /// Unique id (also used as the task's slug)
    #[arg(long)]
    pub id: Option<String>,
}

#[derive(Args)]
pub struct MvArgs {
    /// Slug path of the task to move
    pub path: String,
    /// Slug path of the new parent
    pub new_parent: String,
}

#[derive(Args)]
pub struct RmArgs {
    /// Slug path of the task to remove
    pub path: String,
}

#[derive(Args)]
pub struct DateArgs {
    /// Slug path of the task
    pub path: String,
    /// YYYY-MM-DD, today, tomorrow, or none
    pub date: String,
}

#[derive(Args)]
pub struct IdArgs {
    /// Slug path of the task
    pub path: String,
    /// New id, or none to clear
    pub id: String,
}

#[derive(Args)]
pub struct TitleArgs {
    /// Slug path of the task
    pub path: String,
    /// New task text
    pub content: String,
}

#[derive(Args)]
pub struct CompleteArgs {
    /// Input typed so far
    #[arg(default_value = "", allow_hyphen_values = true)]
    pub text: String,
    /// Cursor position in characters (default: end of text)
    #[arg(long)]
    pub cursor: Option<usize>,
    /// Slug path of the node to complete against (default: root)
    #[arg(long)]
    pub base: Option<String>,
    /// Print every child, not just those matching the partial segment
    #[arg(long)]
    pub all: bool,
}
