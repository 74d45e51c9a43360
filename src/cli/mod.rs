//! Command-line interface for chat-tabs.
//!
//! Subcommands operate on the stored tab document directly, without
//! hydrating a registry, so `inspect` never deletes anything.

use crate::session::{FileStore, KeyValueStore, Rejection, validate_document};
use anyhow::{Context, Result};
use chat_tabs_config::TabsConfig;
use clap::{Parser, Subcommand};
use std::fmt::Write as _;
use std::path::PathBuf;

/// chat-tabs - inspect and manage persisted chat tabs
#[derive(Parser)]
#[command(name = "chat-tabs")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Set debug log level (overrides DEBUG_LEVEL and RUST_LOG)
    #[arg(long, global = true, value_enum, value_name = "LEVEL")]
    pub log_level: Option<LogLevelArg>,
}

/// Log level argument for CLI
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevelArg {
    /// Convert to `log::LevelFilter`
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevelArg::Off => log::LevelFilter::Off,
            LogLevelArg::Error => log::LevelFilter::Error,
            LogLevelArg::Warn => log::LevelFilter::Warn,
            LogLevelArg::Info => log::LevelFilter::Info,
            LogLevelArg::Debug => log::LevelFilter::Debug,
            LogLevelArg::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the stored tab document and whether it would load
    Inspect,

    /// Remove the stored tab document
    Clear,
}

/// Options resolved from the command line before logging starts
#[derive(Clone, Debug, Default)]
pub struct RuntimeOptions {
    /// Config file override
    pub config_path: Option<PathBuf>,
    /// Log level override from CLI
    pub log_level: Option<log::LevelFilter>,
}

/// Parse arguments into the command to run and its runtime options
pub fn parse() -> (Commands, RuntimeOptions) {
    let cli = Cli::parse();
    let options = RuntimeOptions {
        config_path: cli.config,
        log_level: cli.log_level.map(LogLevelArg::to_level_filter),
    };
    (cli.command, options)
}

/// Run a subcommand, printing its report to stdout
pub fn run(command: Commands, options: &RuntimeOptions) -> Result<()> {
    let config = match &options.config_path {
        Some(path) => TabsConfig::load_from(path)?,
        None => TabsConfig::load()?,
    };
    let storage = FileStore::new(config.resolved_storage_dir());

    match command {
        Commands::Inspect => {
            print!("{}", inspect(&storage, &config.storage_key)?);
        }
        Commands::Clear => {
            storage
                .remove(&config.storage_key)
                .with_context(|| format!("Failed to clear {:?}", config.storage_key))?;
            println!(
                "Cleared '{}' in {}",
                config.storage_key,
                storage.dir().display()
            );
        }
    }
    Ok(())
}

/// Human-readable report on the document stored under `key`
pub fn inspect(storage: &dyn KeyValueStore, key: &str) -> Result<String> {
    let stored = storage
        .get(key)
        .with_context(|| format!("Failed to read {:?}", key))?;

    let mut out = String::new();
    let Some(stored) = stored else {
        writeln!(out, "No tabs stored under '{key}'")?;
        return Ok(out);
    };

    match validate_document(&stored) {
        Ok(normalized) => {
            writeln!(out, "Key: {key}")?;
            writeln!(out, "Tabs: {}", normalized.tabs.len())?;
            for tab in &normalized.tabs {
                let marker = if normalized.active_tab_id.as_deref() == Some(tab.id.as_str()) {
                    '*'
                } else {
                    ' '
                };
                writeln!(
                    out,
                    "{marker} {} [{}] {:?} (owner {})",
                    tab.id,
                    tab.kind.as_tag(),
                    tab.title,
                    tab.owner_id
                )?;
            }
        }
        Err(Rejection::Corrupt(e)) => {
            writeln!(out, "Stored data is not valid JSON and would be discarded: {e}")?;
        }
        Err(Rejection::VersionMismatch { found }) => match found {
            Some(version) => writeln!(
                out,
                "Stored version {version} is not supported and would be discarded"
            )?,
            None => writeln!(out, "Stored data has no numeric version and would be discarded")?,
        },
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::MemoryStore;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "chat-tabs",
            "inspect",
            "--config",
            "/tmp/c.yaml",
            "--log-level",
            "debug",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Inspect));
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.yaml")));
        assert_eq!(
            cli.log_level.map(LogLevelArg::to_level_filter),
            Some(log::LevelFilter::Debug)
        );
    }

    #[test]
    fn test_inspect_lists_tabs_and_marks_active() {
        let storage = MemoryStore::new();
        storage
            .set(
                "k",
                r#"{"version":1,"tabs":[
                    {"id":"topic:t1","title":"First","type":"topic","assistantId":"A","topicId":"t1"},
                    {"id":"session:B:s","title":"Run","type":"session","assistantId":"B","sessionId":"s"}
                ],"activeTabId":"session:B:s"}"#,
            )
            .unwrap();

        let report = inspect(&storage, "k").unwrap();
        assert!(report.contains("Tabs: 2"));
        assert!(report.contains("  topic:t1 [topic] \"First\" (owner A)"));
        assert!(report.contains("* session:B:s [session] \"Run\" (owner B)"));
    }

    #[test]
    fn test_inspect_reports_rejections_without_removing() {
        let storage = MemoryStore::new();
        assert!(inspect(&storage, "k").unwrap().contains("No tabs stored"));

        storage.set("k", r#"{"version":3}"#).unwrap();
        assert!(inspect(&storage, "k").unwrap().contains("version 3"));

        storage.set("k", "garbage").unwrap();
        assert!(inspect(&storage, "k").unwrap().contains("not valid JSON"));
        assert!(storage.get("k").unwrap().is_some());
    }
}
