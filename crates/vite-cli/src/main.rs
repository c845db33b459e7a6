//! nx-vite - Main entry point

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod host;

const DEFAULT_LOG_FILTER: &str = "nx_vite=info,vite_generators=info,vite_config=warn,vite_devkit=warn";
const VERBOSE_LOG_FILTER: &str =
    "nx_vite=debug,vite_generators=debug,vite_config=debug,vite_devkit=debug";

#[derive(Parser)]
#[command(name = "nx-vite")]
#[command(version)]
#[command(about = "Set up Vite and Vitest in workspace projects", long_about = None)]
struct Cli {
    /// Workspace root (defaults to the current directory)
    #[arg(long, global = true)]
    cwd: Option<PathBuf>,

    /// Show the changes without writing them
    #[arg(long, global = true)]
    dry_run: bool,

    /// Log debug output (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add the Vite toolchain to the workspace package.json
    Init {
        /// UI framework plugin to install (react, none)
        #[arg(long)]
        ui_framework: Option<String>,
    },

    /// Configure Vitest for a project
    Vitest {
        /// Project to configure
        project: Option<String>,

        /// JSON file with generator options (flags take precedence)
        #[arg(long, value_name = "FILE")]
        options: Option<PathBuf>,

        /// UI framework plugin to configure (react, none)
        #[arg(long)]
        ui_framework: Option<String>,

        /// Also run tests written inside source files
        #[arg(long)]
        in_source_tests: bool,

        /// Do not write vite.config.ts
        #[arg(long)]
        skip_vite_config: bool,

        /// Name of the test target (detected by default)
        #[arg(long)]
        test_target: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        tracing_subscriber::EnvFilter::new(VERBOSE_LOG_FILTER)
    } else {
        tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into())
    };
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let host = host::HostArgs {
        cwd: cli.cwd,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Init { ui_framework } => {
            commands::init::execute(&host, commands::init::InitArgs { ui_framework })
        }
        Commands::Vitest {
            project,
            options,
            ui_framework,
            in_source_tests,
            skip_vite_config,
            test_target,
        } => commands::vitest::execute(
            &host,
            commands::vitest::VitestArgs {
                project,
                options,
                ui_framework,
                in_source_tests,
                skip_vite_config,
                test_target,
            },
        ),
    }
}
