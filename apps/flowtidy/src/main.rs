//! flowtidy - maintenance tools for exported workflow JSON
//!
//! This is the CLI application; every command is a thin wrapper around an
//! operation in the ops crate.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands, RepairCommands};
use crate::display::OutputRenderer;
use crate::error::CliError;
use crate::events::EventHandler;
use clap::Parser;
use flowtidy_config::Config;
use flowtidy_events::{EventEmitter, EventReceiver, FailureContext};
use flowtidy_ops::{
    DedupeRequest, ImportRequest, OperationResult, OpsContextBuilder, RepairRequest,
};
use flowtidy_types::{ColorChoice, OutputFormat};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    // Configuration decides where debug logs go, so it is loaded first
    let config = match load_config(&cli).await {
        Ok(config) => config,
        Err(e) => {
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    };

    let json_mode = json_mode || config.general.default_output == OutputFormat::Json;
    logging::init_tracing(json_mode, cli.global.debug, &config.log_dir());

    match run(cli, config, json_mode).await {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            error!("Application error: {}", e);
            if !json_mode {
                eprintln!("Error: {e}");
            }
            process::exit(1);
        }
    }
}

/// Load configuration with proper precedence: file (or defaults), then
/// environment, then CLI flags
async fn load_config(cli: &Cli) -> Result<Config, CliError> {
    let mut config = Config::load_or_default(cli.global.config.as_deref()).await?;
    config.merge_env()?;
    apply_cli_config(&mut config, &cli.global, &cli.command);
    config.validate()?;
    Ok(config)
}

/// Main application logic
///
/// Returns whether the command succeeded as a whole.
async fn run(cli: Cli, config: Config, json_mode: bool) -> Result<bool, CliError> {
    info!("Starting flowtidy v{}", env!("CARGO_PKG_VERSION"));

    let (event_sender, event_receiver) = flowtidy_events::channel();

    let ops_ctx = OpsContextBuilder::new()
        .with_config(config.clone())
        .with_event_sender(event_sender)
        .with_assume_yes(cli.global.yes)
        .build()?;

    let color = match (cli.global.color, config.general.default_output) {
        (None, OutputFormat::Plain) => ColorChoice::Never,
        _ => config.general.color,
    };
    let renderer = OutputRenderer::new(json_mode, color);

    let colors_enabled = match color {
        ColorChoice::Always => true,
        ColorChoice::Never => false,
        ColorChoice::Auto => console::Term::stderr().features().colors_supported(),
    };
    let mut event_handler = EventHandler::new(colors_enabled, cli.global.debug, json_mode);

    let result =
        execute_command_with_events(cli.command, ops_ctx, event_receiver, &mut event_handler)
            .await?;

    renderer.render_result(&result)?;

    let success = result.is_success();
    info!(success, "Command completed");
    Ok(success)
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    ops_ctx: flowtidy_ops::OpsCtx,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, ops_ctx));

    loop {
        select! {
            result = &mut command_future => {
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }
            event = event_receiver.recv() => {
                if let Some(event) = event {
                    event_handler.handle_event(event);
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    ctx: flowtidy_ops::OpsCtx,
) -> Result<OperationResult, CliError> {
    let operation = command.name();
    ctx.emit_operation_started(operation);

    let result = match command {
        Commands::Dedupe {
            dir,
            check: _,
            fix_files,
            fix_index,
            fix_all,
        } => {
            let request = DedupeRequest {
                dir,
                fix_files: fix_files || fix_all,
                fix_index: fix_index || fix_all,
            };
            flowtidy_ops::dedupe(&ctx, request)
                .await
                .map(OperationResult::Dedupe)
        }
        Commands::Repair(RepairCommands::Check { file }) => {
            flowtidy_ops::repair_check(&ctx, &file)
                .await
                .map(OperationResult::RepairCheck)
        }
        Commands::Repair(RepairCommands::Run {
            dir,
            mode,
            dry_run,
            limit,
        }) => {
            let request = RepairRequest {
                dir,
                mode: mode.unwrap_or(ctx.config.repair.default_mode),
                dry_run,
                limit,
            };
            flowtidy_ops::repair(&ctx, request)
                .await
                .map(OperationResult::Repair)
        }
        Commands::Import { dir, limit, .. } => {
            flowtidy_ops::import(&ctx, ImportRequest { dir, limit })
                .await
                .map(OperationResult::Import)
        }
        Commands::Site { root } => flowtidy_ops::patch_site(&ctx, root)
            .await
            .map(OperationResult::Site),
    };

    match &result {
        Ok(result) => ctx.emit_operation_completed(operation, result.is_success()),
        Err(e) => ctx.emit_operation_failed(operation, FailureContext::from_error(e)),
    }
    result.map_err(CliError::from)
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, command: &Commands) {
    if let Some(color) = global.color {
        config.general.color = color;
    }

    if let Commands::Import {
        no_recursive,
        health_policy,
        ..
    } = command
    {
        if *no_recursive {
            config.import.recursive = false;
        }
        if let Some(policy) = health_policy {
            config.import.health_policy = *policy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use flowtidy_types::HealthPolicy;

    #[test]
    fn import_flags_override_config() {
        let cli = Cli::try_parse_from([
            "flowtidy",
            "--color",
            "never",
            "import",
            "--no-recursive",
            "--health-policy",
            "require",
        ])
        .unwrap();
        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.global, &cli.command);

        assert_eq!(config.general.color, ColorChoice::Never);
        assert!(!config.import.recursive);
        assert_eq!(config.import.health_policy, HealthPolicy::Require);
    }

    #[test]
    fn other_commands_leave_import_settings() {
        let cli = Cli::try_parse_from(["flowtidy", "site"]).unwrap();
        let mut config = Config::default();
        apply_cli_config(&mut config, &cli.global, &cli.command);

        assert!(config.import.recursive);
        assert_eq!(config.import.health_policy, HealthPolicy::AssumeAvailable);
    }
}
