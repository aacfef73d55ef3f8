use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, trace};

use project_janitor::config::ConfigLoader;
use project_janitor::env::HostEnv;
use project_janitor::logging::LOG_TARGET;
use project_janitor::{JanitorCommand, ProjectJanitor, RunReport, RunStatus};

/// Clean up every file in a project with your editor's own commands
#[derive(Parser)]
#[command(name = "janitor")]
#[command(about = "Project Janitor - run clean-up commands across a project", long_about = None)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Workspace root (default: current directory)
    #[arg(short = 'C', long, global = true)]
    workspace: Option<PathBuf>,

    /// Path to a settings file (TOML or JSON)
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// Answer every prompt with its first choice
    #[arg(short = 'y', long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the clean-up commands over every matching project file
    CleanProject,
    /// Run the clean-up commands over one file
    CleanDocument {
        /// File to clean up
        path: PathBuf,
    },
    /// Rename files that match the configured rename rules
    ValidateNames,
    /// Invoke a workflow by command id, e.g. janitor.cleanUpProject
    Run {
        /// Command id or method name
        id: String,
    },
    /// Move a file to a new location
    MoveFile {
        /// File to move
        path: PathBuf,
    },
    /// Copy a file under a new name
    DuplicateFile {
        /// File to copy
        path: PathBuf,
    },
    /// Delete a file after confirmation
    RemoveFile {
        /// File to delete
        path: PathBuf,
    },
    /// Create a file, or a folder when the name ends with '/'
    NewFile {
        /// Resolve the name against the workspace root
        #[arg(long = "root")]
        relative_to_root: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = match cli.verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    // The console channel already prints every logger line on stdout.
    let filter = format!("{log_level},{LOG_TARGET}=off");

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(cli.verbose >= 2)
        .with_writer(std::io::stderr)
        .init();

    debug!("Janitor started with verbosity level: {}", cli.verbose);
    trace!("Full CLI args: {:?}", std::env::args().collect::<Vec<_>>());

    match run(cli).await {
        Ok(report) => {
            debug!("Run ended in {:?}", report.final_state());
            if report.status == RunStatus::Failed {
                std::process::exit(1);
            }
        }
        Err(e) => {
            error!("Fatal error: {}", e);
            eprintln!("Error: {e:#}");
            std::process::exit(1);
        }
    }
}

async fn run(cli: Cli) -> anyhow::Result<RunReport> {
    let root = match cli.workspace {
        Some(root) => root,
        None => std::env::current_dir()?,
    };
    let root = root
        .canonicalize()
        .with_context(|| format!("Workspace {} not found", root.display()))?;

    let settings = ConfigLoader::load(cli.config.as_deref(), &root).await?;
    let host = HostEnv::headless(&root, cli.yes);
    let janitor = ProjectJanitor::new(host, Arc::new(settings));

    let report = match cli.command {
        Commands::CleanProject => janitor.clean_up_project().await,
        Commands::ValidateNames => janitor.validate_file_names().await,
        Commands::CleanDocument { path } => {
            let opened = janitor.open(&resolve(&root, &path)).await;
            if opened.status == RunStatus::Failed {
                return Ok(opened);
            }
            janitor.clean_up_active_document().await
        }
        Commands::Run { id } => {
            let command: JanitorCommand = id.parse()?;
            janitor.invoke(command).await
        }
        Commands::MoveFile { path } => janitor.move_file(Some(resolve(&root, &path))).await,
        Commands::DuplicateFile { path } => {
            janitor.duplicate_file(Some(resolve(&root, &path))).await
        }
        Commands::RemoveFile { path } => {
            let opened = janitor.open(&resolve(&root, &path)).await;
            if opened.status == RunStatus::Failed {
                return Ok(opened);
            }
            janitor.remove_file().await
        }
        Commands::NewFile { relative_to_root } => janitor.new_file(relative_to_root).await,
    };

    Ok(report)
}

fn resolve(root: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        root.join(path)
    }
}
