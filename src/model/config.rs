use serde::{Deserialize, Serialize};

/// Name of the config file discovered by walking up from the working dir
pub const CONFIG_FILE: &str = "della.toml";

/// Configuration from della.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub tasks: TasksConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TasksConfig {
    /// Tasks file, relative to the directory holding della.toml
    #[serde(default = "default_tasks_file")]
    pub file: String,
}

impl Default for TasksConfig {
    fn default() -> Self {
        TasksConfig {
            file: default_tasks_file(),
        }
    }
}

fn default_tasks_file() -> String {
    "tasks.toml".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogConfig {
    /// A `tracing` filter directive such as `warn` or `della=debug`.
    /// `DELLA_LOG` overrides it.
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        LogConfig {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config.tasks.file, "tasks.toml");
        assert_eq!(config.log.level, "warn");
    }

    #[test]
    fn partial_sections_fill_defaults() {
        let config: Config = toml::from_str("[tasks]\nfile = \"todo/home.toml\"\n[log]\n").unwrap();
        assert_eq!(config.tasks.file, "todo/home.toml");
        assert_eq!(config.log.level, "warn");
    }
}
