//! Subcommand implementations

use anyhow::{Context, Result};
use colored::*;
use std::thread;
use std::time::Duration;
use tabular_core::config::{ConfigLoader, TrainerConfig};
use tabular_core::progress::{BackendKind, BackendOptions, ProgressFacade, TrackSpec};

use crate::terminal::TerminalProfile;

/// Arguments of the `track` command
#[derive(Debug, Clone)]
pub struct TrackArgs {
    pub backend: Option<String>,
    pub items: u64,
    pub delay_ms: u64,
    pub description: String,
    pub no_progress: bool,
    pub options: Option<String>,
}

/// Arguments of the `tasks` command
#[derive(Debug, Clone)]
pub struct TasksArgs {
    pub backend: Option<String>,
    pub tasks: usize,
    pub steps: u64,
    pub delay_ms: u64,
    pub options: Option<String>,
}

/// Backend to use: explicit request, then configuration
///
/// `--no-progress` and a disabled progress bar both select `none`.
pub fn backend_name(requested: Option<&str>, no_progress: bool, config: &TrainerConfig) -> String {
    if no_progress {
        return BackendKind::None.to_string();
    }
    if let Some(requested) = requested {
        return requested.to_string();
    }
    if !config.enable_progress_bar {
        return BackendKind::None.to_string();
    }
    config.progress_bar.clone()
}

/// Backend options from a JSON argument, falling back to configuration
pub fn backend_options(raw: Option<&str>, config: &TrainerConfig) -> Result<BackendOptions> {
    match raw {
        Some(raw) => {
            let value: serde_json::Value =
                serde_json::from_str(raw).context("--options must be a JSON object")?;
            anyhow::ensure!(value.is_object(), "--options must be a JSON object");
            Ok(BackendOptions::from(value))
        }
        None => Ok(BackendOptions::from(config.progress_options.clone())),
    }
}

fn pause(delay_ms: u64) {
    if delay_ms > 0 {
        thread::sleep(Duration::from_millis(delay_ms));
    }
}

/// List backend kinds with availability and capabilities
pub fn backends_command(facade: &ProgressFacade) {
    let registry = facade.registry();

    println!(
        "{:<8} {:<11} {:<10} {:<6} {}",
        "BACKEND".bold(),
        "AVAILABLE".bold(),
        "ITERATION".bold(),
        "TASKS".bold(),
        "CALLBACK".bold()
    );

    for kind in BackendKind::ALL {
        let available = registry.is_available(kind);
        let capabilities = registry.capabilities(kind).unwrap_or_default();
        let available_text = if available {
            format!("{:<11}", "yes").green()
        } else {
            format!("{:<11}", "no").red()
        };

        println!(
            "{:<8} {} {:<10} {:<6} {}",
            kind.as_str(),
            available_text,
            yes_no(capabilities.iteration || kind == BackendKind::None),
            yes_no(capabilities.tasks || kind == BackendKind::None),
            yes_no(capabilities.callback)
        );
    }

    println!();
    println!("{}", progress_note(&TerminalProfile::detect()));
}

/// Note on how progress will render on this terminal's stderr
pub fn progress_note(profile: &TerminalProfile) -> String {
    if profile.animated_progress() {
        format!(
            "stderr is an interactive terminal; animated bars will render (suggested: '{}')",
            profile.suggested_backend()
        )
    } else if profile.ci {
        format!(
            "{}",
            "running under CI; prefer the 'simple' backend".yellow()
        )
    } else {
        format!(
            "{}",
            "stderr cannot redraw progress bars; prefer the 'simple' backend".yellow()
        )
    }
}

fn yes_no(value: bool) -> &'static str {
    if value { "yes" } else { "no" }
}

/// Iterate `0..items` through the progress facade
pub fn track_command(facade: &ProgressFacade, config: &TrainerConfig, args: TrackArgs) -> Result<()> {
    let backend = backend_name(args.backend.as_deref(), args.no_progress, config);
    let options = backend_options(args.options.as_deref(), config)?;
    log::debug!("Tracking {} items with backend '{backend}'", args.items);

    let spec = TrackSpec::new()
        .description(args.description)
        .options(options);
    let tracked = facade
        .track(Some(&backend), 0..args.items, spec)
        .with_context(|| format!("Failed to start progress backend '{backend}'"))?;

    let mut processed = 0u64;
    let mut sum = 0u64;
    for item in tracked {
        pause(args.delay_ms);
        processed += 1;
        sum += item;
    }

    println!("Processed {processed} items (sum {sum})");
    Ok(())
}

/// Advance several manual tasks inside a scoped context
pub fn tasks_command(facade: &ProgressFacade, config: &TrainerConfig, args: TasksArgs) -> Result<()> {
    let backend = backend_name(args.backend.as_deref(), false, config);
    let options = backend_options(args.options.as_deref(), config)?;
    log::debug!(
        "Running {} tasks of {} steps with backend '{backend}'",
        args.tasks,
        args.steps
    );

    let completed = facade
        .with_scoped_context(Some(&backend), &options, |scope| {
            let ids: Vec<_> = (0..args.tasks)
                .map(|index| scope.add_task_with_total(&format!("Task {}", index + 1), args.steps))
                .collect();

            for _ in 0..args.steps {
                for id in &ids {
                    pause(args.delay_ms);
                    scope.update(*id, 1);
                }
            }
            ids.len()
        })
        .with_context(|| format!("Failed to open progress context for '{backend}'"))?;

    println!("Completed {completed} tasks");
    Ok(())
}

/// Print the resolved configuration as TOML
pub fn config_show_command(config: &TrainerConfig) -> Result<()> {
    let rendered = toml::to_string_pretty(config).context("Failed to render configuration")?;
    print!("{rendered}");
    Ok(())
}

/// Print the configuration file location
pub fn config_path_command(loader: &ConfigLoader) {
    let path = loader.config_path();
    if path.exists() {
        println!("{}", path.display());
    } else {
        println!("{} {}", path.display(), "(not created)".dimmed());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backend_name_precedence() {
        let config = TrainerConfig::builder().progress_bar("rich").build();

        assert_eq!(backend_name(None, false, &config), "rich");
        assert_eq!(backend_name(Some("tqdm"), false, &config), "tqdm");
        assert_eq!(backend_name(Some("tqdm"), true, &config), "none");
    }

    #[test]
    fn test_disabled_progress_bar_selects_none() {
        let config = TrainerConfig::builder()
            .progress_bar("rich")
            .enable_progress_bar(false)
            .build();

        assert_eq!(backend_name(None, false, &config), "none");
        assert_eq!(backend_name(Some("simple"), false, &config), "simple");
    }

    #[test]
    fn test_backend_options_from_json() {
        let config = TrainerConfig::default();
        let options = backend_options(Some(r#"{"every": 5}"#), &config).unwrap();
        assert_eq!(options.as_value(), &serde_json::json!({ "every": 5 }));

        assert!(backend_options(Some("[1, 2]"), &config).is_err());
        assert!(backend_options(Some("{not json"), &config).is_err());
    }

    #[test]
    fn test_backend_options_from_config() {
        let config = TrainerConfig::builder()
            .progress_option("hidden", serde_json::json!(true))
            .build();
        let options = backend_options(None, &config).unwrap();
        assert_eq!(options.as_value(), &serde_json::json!({ "hidden": true }));
    }

    #[test]
    fn test_progress_note_reflects_stderr() {
        colored::control::set_override(false);
        let interactive = TerminalProfile {
            stderr_tty: true,
            stdout_tty: false,
            ci: false,
            no_color: false,
            term: Some("xterm".to_string()),
        };
        assert!(progress_note(&interactive).contains("suggested: 'rich'"));

        let ci = TerminalProfile {
            ci: true,
            ..interactive.clone()
        };
        assert_eq!(
            progress_note(&ci),
            "running under CI; prefer the 'simple' backend"
        );

        let redirected = TerminalProfile {
            stderr_tty: false,
            stdout_tty: true,
            ..interactive
        };
        assert!(progress_note(&redirected).starts_with("stderr cannot redraw"));
    }

    #[test]
    fn test_track_and_tasks_with_noop_backend() {
        let facade = ProgressFacade::new();
        let config = TrainerConfig::default();

        track_command(
            &facade,
            &config,
            TrackArgs {
                backend: Some("none".to_string()),
                items: 4,
                delay_ms: 0,
                description: "Demo".to_string(),
                no_progress: false,
                options: None,
            },
        )
        .unwrap();

        tasks_command(
            &facade,
            &config,
            TasksArgs {
                backend: Some("none".to_string()),
                tasks: 2,
                steps: 3,
                delay_ms: 0,
                options: None,
            },
        )
        .unwrap();
    }
}
