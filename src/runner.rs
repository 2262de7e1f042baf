use std::path::{Path, PathBuf};

use anyhow::{Context, Result, anyhow, bail};
use camino::{Utf8Path, Utf8PathBuf};
use serde_json::json;

use crate::cli::{Cli, Command, ConfigCommand, OutputFormat};
use crate::config::{self, ScaffoldConfig, Section};
use crate::scaffold::{self, Console, Layout, Mode, Outcome, Report};

const PROJECT_CONFIG: &str = "scaffold.toml";
const DOT_DIR: &str = ".scaffold";
const DOT_CONFIG: &str = "config.toml";

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum ConfigPathSource {
    Explicit,
    Discovered,
    HomeDefault,
    BuiltIn,
}

impl ConfigPathSource {
    fn as_str(&self) -> &'static str {
        match self {
            ConfigPathSource::Explicit => "explicit",
            ConfigPathSource::Discovered => "discovered",
            ConfigPathSource::HomeDefault => "home-default",
            ConfigPathSource::BuiltIn => "built-in",
        }
    }
}

/// For `BuiltIn`, `path` is where a project config would be generated.
#[derive(Clone, Debug)]
struct ResolvedConfigPath {
    path: Utf8PathBuf,
    source: ConfigPathSource,
}

pub fn run(cli: Cli) -> Result<()> {
    let ctx = CliContext::from(&cli);
    ctx.apply_chdir()?;

    match cli.command.unwrap_or(Command::Build) {
        Command::Config { command } => handle_config_only(&ctx, command),
        other => {
            let state = AppState::new(ctx)?;
            handle_with_state(&state, other)
        }
    }
}

fn handle_with_state(state: &AppState, command: Command) -> Result<()> {
    match command {
        Command::Build => handle_build(state),
        Command::Status => handle_status(state),
        Command::List => handle_list(state),
        Command::Config { .. } => unreachable!("config commands handled earlier"),
    }
}

fn handle_build(state: &AppState) -> Result<()> {
    let layout = &state.layout;
    let mode = if state.ctx.dry_run {
        Mode::DryRun
    } else {
        Mode::Apply
    };
    tracing::info!(
        root = %layout.root(),
        config = %state.config_path,
        source = state.config_source.as_str(),
        "building scaffold"
    );

    match state.ctx.format {
        OutputFormat::Text => {
            println!("Building scaffold at {}", layout.root());
            if state.ctx.dry_run {
                println!("    (dry-run) nothing will be written");
            }
            let mut console = Console::default();
            scaffold::run(layout, mode, &mut console)?;
            let report = console.into_report();
            println!();
            if state.ctx.dry_run {
                println!(
                    "Dry run complete: {} to create, {} already present",
                    report.pending(),
                    report.existing()
                );
            } else {
                println!(
                    "Scaffold complete: {} created, {} already present",
                    report.created(),
                    report.existing()
                );
            }
        }
        OutputFormat::Json => {
            let mut report = Report::default();
            scaffold::run(layout, mode, &mut report)?;
            print_json(&json!({
                "root": layout.root(),
                "dry_run": state.ctx.dry_run,
                "created": report.created(),
                "existing": report.existing(),
                "pending": report.pending(),
                "events": report.events,
            }))?;
        }
    }
    Ok(())
}

fn handle_status(state: &AppState) -> Result<()> {
    let layout = &state.layout;
    let mut report = Report::default();
    scaffold::run(layout, Mode::DryRun, &mut report)?;
    let missing = report.pending();

    match state.ctx.format {
        OutputFormat::Text => {
            println!(
                "Scaffold at {} ({} config):",
                layout.root(),
                state.config_source.as_str()
            );
            for event in &report.events {
                let mark = if event.outcome == Outcome::WouldCreate {
                    "missing"
                } else {
                    "ok"
                };
                println!("  {:<8}{:<10}{}", mark, event.kind.as_str(), event.path);
            }
        }
        OutputFormat::Json => {
            print_json(&json!({
                "root": layout.root(),
                "present": report.existing(),
                "missing": missing,
                "entries": report.events,
            }))?;
        }
    }

    if missing > 0 {
        bail!(
            "{} of {} scaffold entries missing; run `scaffold build` to create them",
            missing,
            report.events.len()
        );
    }
    Ok(())
}

fn handle_list(state: &AppState) -> Result<()> {
    let layout = &state.layout;
    match state.ctx.format {
        OutputFormat::Text => {
            println!("Root: {}", layout.root());
            println!("Directories:");
            for dir in layout.directories() {
                println!("  - {}", dir);
            }
            println!("Files:");
            for file in layout.files() {
                println!("  - {}", file);
            }
        }
        OutputFormat::Json => print_json(&json!(layout))?,
    }
    Ok(())
}

fn handle_config_only(ctx: &CliContext, command: Option<ConfigCommand>) -> Result<()> {
    let resolved = ctx.resolve_config_path()?;
    let config_path = resolved.path;
    let builtin = resolved.source == ConfigPathSource::BuiltIn;
    match command {
        Some(ConfigCommand::Path) => {
            if builtin {
                println!(
                    "No config found; using built-in layout. A project config would live at {}.",
                    config_path
                );
            } else {
                println!("Config path: {} ({})", config_path, resolved.source.as_str());
            }
            Ok(())
        }
        None | Some(ConfigCommand::Show) => {
            if builtin {
                println!("No config found at {}; using built-in layout.", config_path);
                println!("Use `scaffold config generate` to write it out for editing.");
                println!("{}", config::format_summary(&config::builtin()?));
                return Ok(());
            }

            let config = config::load_from_path(&config_path)?;
            println!("Config path: {} ({})", config_path, resolved.source.as_str());
            println!("{}", config::format_summary(&config));
            Ok(())
        }
        Some(ConfigCommand::Check) => {
            let config = if builtin {
                config::builtin()?
            } else {
                config::load_from_path(&config_path)?
            };
            let cwd = current_dir()?;
            let layout = layout_from(&config, ctx.root.as_deref(), &cwd)?;
            println!("Config OK: {} ({})", config_path, resolved.source.as_str());
            println!("Resolved root: {}", layout.root());
            println!("{}", config::format_summary(&config));
            Ok(())
        }
        Some(ConfigCommand::Generate { path, force }) => {
            let target = match path {
                Some(path) => Utf8PathBuf::from_path_buf(path)
                    .map_err(|_| anyhow!("config generate path must be valid UTF-8"))?,
                None => config_path.clone(),
            };
            config::write_example_config(&target, force)?;
            if force {
                println!("Overwrote config at {}", target);
            } else {
                println!("Wrote example config to {}", target);
            }
            Ok(())
        }
        Some(ConfigCommand::AddDir { paths }) => {
            config_add(&config_path, builtin, Section::Directories, &paths)
        }
        Some(ConfigCommand::AddFile { paths }) => {
            config_add(&config_path, builtin, Section::Files, &paths)
        }
    }
}

fn config_add(
    config_path: &Utf8Path,
    builtin: bool,
    section: Section,
    paths: &[String],
) -> Result<()> {
    if builtin {
        bail!(
            "no config file to edit; run `scaffold config generate` to create {} first",
            config_path
        );
    }
    let added = config::add_entries(config_path, section, paths)?;
    println!(
        "Added {} of {} {} entries to {}",
        added,
        paths.len(),
        section.key(),
        config_path
    );
    Ok(())
}

fn print_json(value: &serde_json::Value) -> Result<()> {
    let rendered = serde_json::to_string_pretty(value).context("rendering JSON output")?;
    println!("{}", rendered);
    Ok(())
}

fn current_dir() -> Result<Utf8PathBuf> {
    let cwd = std::env::current_dir().context("determining current directory")?;
    Utf8PathBuf::from_path_buf(cwd).map_err(|_| anyhow!("current directory is not valid UTF-8"))
}

/// Nearest `.scaffold/config.toml` or `scaffold.toml`, walking up from `start`.
fn discover_config(start: &Utf8Path) -> Option<Utf8PathBuf> {
    let mut dir = start.to_path_buf();
    loop {
        let preferred = dir.join(DOT_DIR).join(DOT_CONFIG);
        if preferred.is_file() {
            return Some(preferred);
        }

        let plain = dir.join(PROJECT_CONFIG);
        if plain.is_file() {
            return Some(plain);
        }

        let parent = dir.parent()?.to_path_buf();
        dir = parent;
    }
}

/// A relative root is taken from the working directory, not the config file location.
fn resolve_root(
    root_override: Option<&Path>,
    configured: Option<&str>,
    cwd: &Utf8Path,
) -> Result<Utf8PathBuf> {
    let raw = match (root_override, configured) {
        (Some(path), _) => Utf8PathBuf::from_path_buf(path.to_path_buf())
            .map_err(|_| anyhow!("root path must be valid UTF-8"))?,
        (None, Some(root)) => Utf8PathBuf::from(root),
        (None, None) => {
            bail!("no scaffold root configured; set `root` in the config or pass --root")
        }
    };
    Ok(if raw.is_absolute() { raw } else { cwd.join(raw) })
}

fn layout_from(
    config: &ScaffoldConfig,
    root_override: Option<&Path>,
    cwd: &Utf8Path,
) -> Result<Layout> {
    let root = resolve_root(root_override, config.root.as_deref(), cwd)?;
    Layout::new(root, config.directories.clone(), config.files.clone())
}

#[derive(Clone, Debug)]
struct CliContext {
    chdir: Option<PathBuf>,
    file: Option<PathBuf>,
    root: Option<PathBuf>,
    dry_run: bool,
    format: OutputFormat,
}

impl CliContext {
    fn apply_chdir(&self) -> Result<()> {
        if let Some(path) = &self.chdir {
            std::env::set_current_dir(path)
                .with_context(|| format!("changing directory to {}", path.display()))?;
        }
        Ok(())
    }

    fn resolve_config_path(&self) -> Result<ResolvedConfigPath> {
        if let Some(path) = &self.file {
            let path = Utf8PathBuf::from_path_buf(path.clone())
                .map_err(|_| anyhow!("config path must be valid UTF-8"))?;
            return Ok(ResolvedConfigPath {
                path,
                source: ConfigPathSource::Explicit,
            });
        }

        let cwd = current_dir()?;
        if let Some(path) = discover_config(&cwd) {
            return Ok(ResolvedConfigPath {
                path,
                source: ConfigPathSource::Discovered,
            });
        }

        if let Some(home) = dirs::home_dir() {
            let mut path = home;
            path.push(DOT_DIR);
            path.push(DOT_CONFIG);
            if path.is_file() {
                let path = Utf8PathBuf::from_path_buf(path)
                    .map_err(|_| anyhow!("config path must be valid UTF-8"))?;
                return Ok(ResolvedConfigPath {
                    path,
                    source: ConfigPathSource::HomeDefault,
                });
            }
        }

        Ok(ResolvedConfigPath {
            path: cwd.join(PROJECT_CONFIG),
            source: ConfigPathSource::BuiltIn,
        })
    }
}

impl From<&Cli> for CliContext {
    fn from(cli: &Cli) -> Self {
        Self {
            chdir: cli.chdir.clone(),
            file: cli.file.clone(),
            root: cli.root.clone(),
            dry_run: cli.dry_run,
            format: cli.format,
        }
    }
}

struct AppState {
    ctx: CliContext,
    config_path: Utf8PathBuf,
    config_source: ConfigPathSource,
    layout: Layout,
}

impl AppState {
    fn new(ctx: CliContext) -> Result<Self> {
        let resolved = ctx.resolve_config_path()?;
        let config = match resolved.source {
            ConfigPathSource::BuiltIn => config::builtin()?,
            _ => config::load_from_path(&resolved.path)?,
        };
        let cwd = current_dir()?;
        let layout = layout_from(&config, ctx.root.as_deref(), &cwd)?;

        Ok(Self {
            ctx,
            config_path: resolved.path,
            config_source: resolved.source,
            layout,
        })
    }
}
