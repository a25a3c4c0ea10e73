#[cfg(not(feature = "cli"))]
compile_error!("The `qvd` binary requires the `cli` feature. Build with `--features cli`.");

use clap::Parser;
use std::fs::File;
use std::io::Write;
use std::process;

use qvd::cli;
use qvd::cli::app::{Cli, ColorMode, Commands};
use qvd::QvdError;

fn main() {
    let cli = Cli::parse();

    match cli.color {
        ColorMode::Always => colored::control::set_override(true),
        ColorMode::Never => colored::control::set_override(false),
        ColorMode::Auto => {} // colored auto-detects tty
    }

    let writer_result: Result<Box<dyn Write>, QvdError> = match &cli.output {
        Some(path) => File::create(path)
            .map(|f| Box::new(f) as Box<dyn Write>)
            .map_err(|e| QvdError::Io(format!("Cannot create {}: {}", path, e))),
        None => Ok(Box::new(std::io::stdout()) as Box<dyn Write>),
    };

    let mut writer = match writer_result {
        Ok(w) => w,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Info { file, json } => {
            cli::info::execute(&cli::info::InfoOptions { file, json }, &mut writer)
        }

        Commands::Head { file, rows, json } => {
            cli::head::execute(&cli::head::HeadOptions { file, rows, json }, &mut writer)
        }

        Commands::Export { file, format } => {
            cli::export::execute(&cli::export::ExportOptions { file, format }, &mut writer)
        }

        Commands::Dump {
            file,
            section,
            length,
        } => cli::dump::execute(
            &cli::dump::DumpOptions {
                file,
                section,
                length,
            },
            &mut writer,
        ),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}
