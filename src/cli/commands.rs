use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{parse_script, ApplicationError, IntelligenceService, IoResultExt, Script};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{self, Settings, MAX_PRECISION};
use crate::tree_traits::TreeDisplay;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run { input, output }) => _run(cli, input, output.as_deref()),
        Some(Commands::Check { input }) => _check(input),
        Some(Commands::Tree { input }) => _tree(cli, input),
        Some(Commands::Members { input }) => _members(cli, input),
        Some(Commands::Config { command }) => _config(cli, command),
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            generate(*shell, &mut cmd, "famtree", &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::Usage(
            "no command given, see `famtree --help`".to_string(),
        )),
    }
}

/// Layered settings with command line flags applied last.
fn resolve_settings(cli: &Cli, local_dir: Option<&Path>) -> CliResult<Settings> {
    let mut settings = Settings::load(local_dir)?;
    if let Some(precision) = cli.precision {
        if precision > MAX_PRECISION {
            return Err(CliError::InvalidArgs(format!(
                "--precision {} exceeds maximum of {}",
                precision, MAX_PRECISION
            )));
        }
        settings.precision = precision;
    }
    if let Some(division) = cli.division {
        settings.division = division.into();
    }
    debug!(?settings, "effective settings");
    Ok(settings)
}

fn load_script(input: &Path) -> CliResult<Script> {
    let content = fs::read_to_string(input).map_err(|source| CliError::Input {
        path: input.to_path_buf(),
        source,
    })?;
    Ok(parse_script(&content)?)
}

/// Runs the script with all output discarded and verifies the final tree.
fn run_silently(cli: &Cli, input: &Path) -> CliResult<IntelligenceService> {
    let settings = resolve_settings(cli, input.parent())?;
    let script = load_script(input)?;
    let mut service = IntelligenceService::new(settings);
    service.run_script(&script, &mut io::sink())?;
    service
        .tree()
        .check_invariants()
        .map_err(ApplicationError::from)?;
    Ok(service)
}

#[instrument(skip(cli))]
fn _run(cli: &Cli, input: &Path, output_path: Option<&Path>) -> CliResult<()> {
    let settings = resolve_settings(cli, input.parent())?;
    let script = load_script(input)?;
    let mut service = IntelligenceService::new(settings);

    match output_path {
        Some(path) => {
            let file = File::create(path).map_err(|source| CliError::Output {
                path: path.to_path_buf(),
                source,
            })?;
            let mut writer = BufWriter::new(file);
            let count = service.run_script(&script, &mut writer)?;
            writer.flush().with_path_context("flush output", path)?;
            output::success(&format!(
                "{} commands processed, results in {}",
                count,
                path.display()
            ));
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            service.run_script(&script, &mut handle)?;
        }
    }
    Ok(())
}

#[instrument]
fn _check(input: &Path) -> CliResult<()> {
    let script = load_script(input)?;
    if script.is_empty() {
        output::warning(&format!("{} contains no commands", input.display()));
        return Ok(());
    }
    let founder = script
        .founder
        .as_ref()
        .map(|m| format!(", founder {}", m))
        .unwrap_or_default();
    output::success(&format!(
        "{}: {} commands{}",
        input.display(),
        script.command_count(),
        founder
    ));
    Ok(())
}

#[instrument(skip(cli))]
fn _tree(cli: &Cli, input: &Path) -> CliResult<()> {
    let service = run_silently(cli, input)?;
    output::info(&service.tree().to_tree_string());
    Ok(())
}

#[instrument(skip(cli))]
fn _members(cli: &Cli, input: &Path) -> CliResult<()> {
    let service = run_silently(cli, input)?;
    let tree = service.tree();
    let precision = service.settings().precision;

    output::header(&format!("Members ({})", tree.len()));
    for (_, node) in tree.iter_inorder() {
        let member = &node.member;
        output::detail(&format!(
            "rank {:>2}  {} {:.*}",
            tree.depth(member.score),
            member.label,
            precision,
            member.score
        ));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn _config(cli: &Cli, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            let settings = resolve_settings(cli, Some(Path::new(".")))?;
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Template => output::info(&Settings::template()),
        ConfigCommands::Path => {
            match config::global_config_path() {
                Some(path) => output::action("global", &path.display()),
                None => output::warning("no global config directory on this platform"),
            }
            output::action(
                "local",
                &config::local_config_path(Path::new(".")).display(),
            );
        }
    }
    Ok(())
}
