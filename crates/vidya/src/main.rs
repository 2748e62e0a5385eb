// SPDX-FileCopyrightText: 2026 Vidya Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `vidya` -- education backend CLI.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use vidya_config::VidyaConfig;

mod serve;

#[derive(Parser)]
#[command(
    name = "vidya",
    version,
    about = "Education backend: study progress tracking and AI tutor chat"
)]
struct Cli {
    /// Config file path; defaults to the XDG hierarchy plus VIDYA_* env vars.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Start the HTTP server (the default).
    Serve,
}

fn load_config(path: Option<&PathBuf>) -> Result<VidyaConfig, ()> {
    let result = match path {
        Some(path) => vidya_config::load_config_from_path(path)
            .map_err(|e| vec![vidya_config::ConfigError {
                key: path.display().to_string(),
                message: e.to_string(),
            }])
            .and_then(|config| {
                vidya_config::validate_config(&config).map(|()| config)
            }),
        None => vidya_config::load_and_validate(),
    };

    result.map_err(|errors| {
        eprintln!("error: invalid configuration");
        for error in errors {
            eprintln!("  {error}");
        }
    })
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let Ok(config) = load_config(cli.config.as_ref()) else {
        return ExitCode::FAILURE;
    };

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => match serve::run_serve(config).await {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("error: {e}");
                ExitCode::FAILURE
            }
        },
    }
}
