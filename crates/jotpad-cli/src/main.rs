//! Jotpad CLI
//!
//! Command-line interface for Jotpad - a small personal notepad.

use std::fs::File;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use jotpad_core::{AlwaysConfirm, Config, ConfirmDelete, FileStorage, Notepad};

mod commands;
mod editor;
mod output;

use commands::Pad;
use output::{Output, OutputFormat};

#[derive(Parser)]
#[command(name = "jotpad")]
#[command(about = "Jotpad - a small personal notepad")]
#[command(version)]
#[command(propagate_version = true)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    /// Quiet mode - minimal output
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Use a different config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List notes, newest first
    #[command(alias = "ls")]
    List {
        /// Only notes whose title or content contains this text
        #[arg(short, long)]
        search: Option<String>,
    },
    /// Show a note
    Show {
        /// Note ID (full ID or prefix)
        id: String,
    },
    /// Create a new note
    #[command(alias = "add")]
    New {
        /// Note title
        #[arg(short, long)]
        title: Option<String>,
        /// Note content (opens editor if not provided)
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Edit a note
    Edit {
        /// Note ID (full ID or prefix)
        id: String,
        /// New title
        #[arg(short, long)]
        title: Option<String>,
        /// New content
        #[arg(short, long)]
        content: Option<String>,
    },
    /// Delete a note
    #[command(alias = "rm")]
    Delete {
        /// Note ID (full ID or prefix)
        id: String,
        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },
    /// Write a note from stdin with autosave
    Compose {
        /// Note title
        #[arg(short, long)]
        title: Option<String>,
    },
    /// Add selected text as a new note (reads stdin if no text given)
    Capture {
        text: Option<String>,
    },
    /// Show or toggle the color theme
    Theme {
        #[command(subcommand)]
        command: Option<ThemeCommands>,
    },
    /// Show or set configuration
    Config {
        #[command(subcommand)]
        command: Option<ConfigCommands>,
    },
    /// Show storage location, note count and theme
    Status,
}

#[derive(Subcommand, Clone, Copy)]
enum ThemeCommands {
    /// Show the current theme
    Show,
    /// Switch between light and dark
    Toggle,
}

#[derive(Subcommand, Clone)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Set a configuration value
    Set {
        /// Configuration key (data_dir, autosave_delay_ms, seed_welcome, log_file)
        key: String,
        /// Configuration value
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let output = Output::new(OutputFormat::from_flags(cli.json, cli.quiet));
    let config_path = cli.config.as_ref();

    // Config commands work without opening storage
    if let Commands::Config { command } = &cli.command {
        return handle_config_command(command.clone(), config_path, &output);
    }

    let config =
        Config::load_with_cli_override(config_path).context("Failed to load configuration")?;
    init_logging(&config);

    let skip_prompt = matches!(cli.command, Commands::Delete { yes: true, .. });
    let mut pad = open_notepad(&config, output, skip_prompt).await;

    match cli.command {
        Commands::List { search } => commands::note::list(&mut pad, search, &output).await,
        Commands::Show { id } => commands::note::show(&pad, id, &output),
        Commands::New { title, content } => {
            commands::note::create(&mut pad, title, content, &output).await
        }
        Commands::Edit { id, title, content } => {
            commands::note::edit(&mut pad, id, title, content, &output).await
        }
        Commands::Delete { id, .. } => commands::note::delete(&mut pad, id, &output).await,
        Commands::Compose { title } => commands::note::compose(&mut pad, title, &output).await,
        Commands::Capture { text } => commands::capture::capture(&mut pad, text).await,
        Commands::Theme { command } => match command {
            Some(ThemeCommands::Show) | None => commands::theme::show(&pad, &output),
            Some(ThemeCommands::Toggle) => commands::theme::toggle(&mut pad, &output).await,
        },
        Commands::Status => commands::status::show(&pad, &config, &output),
        Commands::Config { .. } => unreachable!(), // Handled above
    }
}

/// Build and load the notepad for this invocation
async fn open_notepad(config: &Config, output: Output, skip_prompt: bool) -> Pad {
    let confirm: Arc<dyn ConfirmDelete> = if skip_prompt || !output.should_prompt() {
        Arc::new(AlwaysConfirm)
    } else {
        Arc::new(editor::confirm_delete)
    };

    let mut pad = Notepad::new(FileStorage::from_config(config), config.into())
        .with_notifier(Arc::new(output))
        .with_confirm(confirm);
    pad.load().await;
    pad
}

fn handle_config_command(
    command: Option<ConfigCommands>,
    config_path: Option<&PathBuf>,
    output: &Output,
) -> Result<()> {
    match command {
        Some(ConfigCommands::Show) | None => commands::config::show(config_path, output),
        Some(ConfigCommands::Set { key, value }) => {
            commands::config::set(key, value, config_path, output)
        }
    }
}

/// Initialize file-based logging
///
/// Only active when JOTPAD_LOG is set (e.g. JOTPAD_LOG=debug). Logs go to
/// the configured log file so they never mix with command output.
fn init_logging(config: &Config) {
    let Ok(log_level) = std::env::var("JOTPAD_LOG") else {
        return;
    };

    let log_path = config.log_path();

    let log_file = match File::create(&log_path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Warning: Could not create log file {:?}: {}", log_path, e);
            return;
        }
    };

    let env_filter = EnvFilter::new(format!(
        "jotpad_core={},jotpad_cli={}",
        log_level, log_level
    ));

    // Ignore error if already initialized
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(log_file)
        .try_init();

    info!("Logging initialized to {:?}", log_path);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_delete_with_yes() {
        let cli = Cli::try_parse_from(["jotpad", "rm", "abc", "--yes"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Delete { ref id, yes: true } if id == "abc"
        ));
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["jotpad", "ls", "--json", "-s", "milk"]).unwrap();
        assert!(cli.json);
        assert!(matches!(
            cli.command,
            Commands::List { search: Some(ref s) } if s == "milk"
        ));
    }

    #[test]
    fn test_parse_theme_defaults_to_show() {
        let cli = Cli::try_parse_from(["jotpad", "theme"]).unwrap();
        assert!(matches!(cli.command, Commands::Theme { command: None }));
    }
}
