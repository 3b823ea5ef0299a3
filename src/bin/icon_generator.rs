//! Writes the application icon as a multi-size .ico file

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use island_generator::icon::{write_ico, ICON_SIZES};

#[derive(Parser, Debug)]
#[command(name = "icon_generator")]
#[command(about = "Render the island icon at 16, 32, 48 and 256 px into one .ico")]
struct Args {
    /// Output file
    #[arg(short, long, default_value = "resources/icon.ico")]
    output: PathBuf,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    if let Some(parent) = args.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        if let Err(e) = std::fs::create_dir_all(parent) {
            tracing::error!("Failed to create {}: {}", parent.display(), e);
            return ExitCode::FAILURE;
        }
    }

    match write_ico(&args.output, &ICON_SIZES) {
        Ok(()) => {
            println!("Icon written to {}", args.output.display());
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Failed to write icon: {}", e);
            ExitCode::FAILURE
        }
    }
}
