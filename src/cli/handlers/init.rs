use std::fs;
use std::path::Path;

use super::Context;
use crate::cli::commands::InitArgs;
use crate::io::tree_io;
use crate::model::config::CONFIG_FILE;
use crate::ops::tree_ops::{NewTask, new_tree};

const CONFIG_TEMPLATE: &str = r##"# della configuration
# Found by walking up from the working directory.

[tasks]
# Tasks file, relative to this directory
file = "{file}"

[log]
# tracing filter directive; DELLA_LOG overrides it
level = "warn"
"##;

/// Render della.toml pointing at `file`.
fn render_config(file: &str) -> String {
    CONFIG_TEMPLATE.replace("{file}", &file.replace('\\', "/"))
}

pub fn cmd_init(ctx: &Context, args: InitArgs) -> Result<(), Box<dyn std::error::Error>> {
    let path = &ctx.tasks_path;
    if path.exists() && !args.force {
        return Err(format!(
            "tasks file already exists: {} (use --force to overwrite)",
            path.display()
        )
        .into());
    }

    let tree = new_tree(NewTask::new(args.content.trim()))?;
    if let Some(dir) = path.parent()
        && !dir.as_os_str().is_empty()
    {
        fs::create_dir_all(dir)?;
    }
    tree_io::save_tree(&tree, path)?;
    println!("Initialized {}", path.display());

    if ctx.config_source.is_none() {
        write_config(path)?;
    }
    Ok(())
}

/// Write a della.toml next to `tasks_path` unless one is already there.
fn write_config(tasks_path: &Path) -> std::io::Result<()> {
    let dir = match tasks_path.parent() {
        Some(d) if !d.as_os_str().is_empty() => d,
        _ => Path::new("."),
    };
    let config_path = dir.join(CONFIG_FILE);
    if config_path.exists() {
        return Ok(());
    }
    let file = tasks_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("tasks.toml");
    fs::write(&config_path, render_config(file))?;
    println!("  config: {}", config_path.display());
    Ok(())
}
