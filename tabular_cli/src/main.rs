use anyhow::{Context, Result};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use std::path::PathBuf;

use tabular_cli::commands::{self, TasksArgs, TrackArgs};
use tabular_cli::terminal;
use tabular_core::config::ConfigLoader;
use tabular_core::logging::init_logging;
use tabular_core::progress::ProgressFacade;

#[derive(Parser)]
#[command(name = "tabular")]
#[command(author, version, about = "Tabular - progress reporting and trainer configuration tools", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    /// Configuration file to use instead of the default location
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List progress backends and their capabilities
    Backends,

    /// Iterate over a range with a progress backend
    Track {
        /// Backend name (defaults to the configured progress_bar)
        #[arg(short, long)]
        backend: Option<String>,

        /// Number of items to iterate
        #[arg(short = 'n', long, default_value_t = 100)]
        items: u64,

        /// Delay per item in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Description shown next to the bar
        #[arg(long, default_value = "Processing")]
        description: String,

        /// Backend options as a JSON object
        #[arg(long, value_name = "JSON")]
        options: Option<String>,

        /// Disable progress display
        #[arg(long)]
        no_progress: bool,
    },

    /// Advance manual tasks inside a scoped progress context
    Tasks {
        /// Backend name (defaults to the configured progress_bar)
        #[arg(short, long)]
        backend: Option<String>,

        /// Number of tasks
        #[arg(short, long, default_value_t = 3)]
        tasks: usize,

        /// Steps per task
        #[arg(short, long, default_value_t = 10)]
        steps: u64,

        /// Delay per step in milliseconds
        #[arg(long, default_value_t = 0)]
        delay_ms: u64,

        /// Backend options as a JSON object
        #[arg(long, value_name = "JSON")]
        options: Option<String>,
    },

    /// Inspect configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the resolved configuration
    Show,

    /// Show the configuration file path
    Path,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = cli.debug.then_some(log::LevelFilter::Debug);
    init_logging(level);
    if cli.debug {
        eprintln!("Debug logging enabled");
    }

    if !terminal::stdout_supports_color() {
        colored::control::set_override(false);
    }

    let loader = match &cli.config {
        Some(path) => ConfigLoader::with_path(path.clone()),
        None => ConfigLoader::new(),
    };

    let facade = ProgressFacade::global();

    match cli.command {
        Commands::Backends => commands::backends_command(facade),
        Commands::Track {
            backend,
            items,
            delay_ms,
            description,
            options,
            no_progress,
        } => {
            let config = loader.load().context("Failed to load configuration")?;
            commands::track_command(
                facade,
                &config,
                TrackArgs {
                    backend,
                    items,
                    delay_ms,
                    description,
                    no_progress,
                    options,
                },
            )?;
        }
        Commands::Tasks {
            backend,
            tasks,
            steps,
            delay_ms,
            options,
        } => {
            let config = loader.load().context("Failed to load configuration")?;
            commands::tasks_command(
                facade,
                &config,
                TasksArgs {
                    backend,
                    tasks,
                    steps,
                    delay_ms,
                    options,
                },
            )?;
        }
        Commands::Config { command } => match command {
            ConfigCommand::Show => {
                let config = loader.load().context("Failed to load configuration")?;
                commands::config_show_command(&config)?;
            }
            ConfigCommand::Path => commands::config_path_command(&loader),
        },
        Commands::Completions { shell } => generate_completions(shell),
    }

    Ok(())
}

fn generate_completions(shell: Shell) {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut std::io::stdout());
}
