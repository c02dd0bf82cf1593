use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use taskmaster_core::config::{ConfigOverrides, canonical_name};
use taskmaster_core::model::Filter;
use time::Date;
use time::macros::format_description;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Output JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Switch to dark display mode
    #[arg(long, global = true)]
    pub dark: bool,

    /// Override configuration values (format KEY=VALUE)
    #[arg(long = "config-override", value_name = "KEY=VALUE", global = true)]
    pub config_override: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a new task
    ///
    /// Example: taskmaster add "Buy milk"
    /// Example: taskmaster add "Pay bills" --due 2025-01-01
    Add {
        text: Option<String>,
        #[arg(long, value_name = "YYYY-MM-DD", value_parser = parse_due_date)]
        due: Option<String>,
    },
    /// Mark a task done, or reopen it
    ///
    /// Example: taskmaster toggle 1
    Toggle {
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// Edit a task's text
    ///
    /// Example: taskmaster edit 2 "Buy oat milk"
    /// Example (interactive): edit 2, then draft "Buy oat milk", then update
    Edit {
        #[arg(value_parser = parse_position)]
        position: usize,
        text: Option<String>,
    },
    /// Replace the draft of the task being edited
    ///
    /// Example: draft "Buy oat milk"
    Draft { text: String },
    /// Save the draft of the task being edited
    ///
    /// Example: update
    Update,
    /// Delete a task
    ///
    /// Example: taskmaster delete 1
    Delete {
        #[arg(value_parser = parse_position)]
        position: usize,
    },
    /// List tasks
    ///
    /// Example: taskmaster list
    /// Example: taskmaster list --filter active
    List {
        #[arg(long, value_enum)]
        filter: Option<FilterArg>,
    },
    /// Select which tasks list and export show
    ///
    /// Example: filter completed
    Filter {
        #[arg(value_enum)]
        filter: FilterArg,
    },
    /// Remove every completed task
    ///
    /// Example: taskmaster clear-completed
    ClearCompleted,
    /// Write the shown tasks to a paginated document
    ///
    /// Example: taskmaster export
    /// Example: taskmaster export --filter active --output active.txt
    Export {
        #[arg(long, short, value_name = "PATH")]
        output: Option<PathBuf>,
        #[arg(long, value_enum)]
        filter: Option<FilterArg>,
    },
    /// Toggle between light and dark display mode
    ///
    /// Example: theme
    Theme,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterArg {
    All,
    Active,
    Completed,
}

impl From<FilterArg> for Filter {
    fn from(value: FilterArg) -> Self {
        match value {
            FilterArg::All => Filter::All,
            FilterArg::Active => Filter::Active,
            FilterArg::Completed => Filter::Completed,
        }
    }
}

/// Parses a 1-based position into a list index.
pub fn parse_position(raw: &str) -> Result<usize, String> {
    let position: usize = raw
        .trim()
        .parse()
        .map_err(|_| format!("'{raw}' is not a task position"))?;
    if position == 0 {
        return Err("task positions start at 1".to_string());
    }
    Ok(position - 1)
}

/// Accepts `YYYY-MM-DD` (an empty value means no due date).
pub fn parse_due_date(raw: &str) -> Result<String, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(String::new());
    }

    let format = format_description!("[year]-[month]-[day]");
    let date = Date::parse(trimmed, &format)
        .map_err(|_| format!("'{trimmed}' is not a date in YYYY-MM-DD form"))?;
    date.format(&format)
        .map_err(|err| format!("failed to format due date: {err}"))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigOverrideTarget {
    Theme,
    DataDir,
    ExportPath,
    LogLevel,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedConfigOverride {
    pub target: ConfigOverrideTarget,
    pub value: String,
}

/// Parse a raw `KEY=VALUE` override string into a structured target.
pub fn parse_config_override(raw: &str) -> Result<ParsedConfigOverride, String> {
    let trimmed = raw.trim();
    let (key_raw, value_raw) = trimmed
        .split_once('=')
        .ok_or_else(|| "override must be in KEY=VALUE format".to_string())?;

    let value = value_raw.trim().to_string();
    let field =
        canonical_name(key_raw).ok_or_else(|| "override key cannot be empty".to_string())?;

    let target = match field.as_str() {
        "theme" | "display_mode" => ConfigOverrideTarget::Theme,
        "data_dir" => ConfigOverrideTarget::DataDir,
        "export_path" => ConfigOverrideTarget::ExportPath,
        "log_level" => ConfigOverrideTarget::LogLevel,
        other => return Err(format!("unknown config field '{other}'")),
    };

    if value.is_empty() {
        return Err(format!("override for '{field}' needs a value"));
    }

    Ok(ParsedConfigOverride { target, value })
}

/// Folds every `--config-override` into one set of overrides; later values win.
pub fn collect_config_overrides(raw: &[String]) -> Result<ConfigOverrides, String> {
    let mut overrides = ConfigOverrides::default();
    for entry in raw {
        let parsed = parse_config_override(entry)?;
        match parsed.target {
            ConfigOverrideTarget::Theme => overrides.theme = Some(parsed.value),
            ConfigOverrideTarget::DataDir => overrides.data_dir = Some(PathBuf::from(parsed.value)),
            ConfigOverrideTarget::ExportPath => {
                overrides.export_path = Some(PathBuf::from(parsed.value))
            }
            ConfigOverrideTarget::LogLevel => overrides.log_level = Some(parsed.value),
        }
    }
    Ok(overrides)
}
