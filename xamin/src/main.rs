use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use xamin::commands::{self, App};
use xamin::settings::SettingsManager;

#[derive(Parser, Debug)]
#[command(name = "xamin", version)]
#[command(about = "Inspect and organise scientific data files")]
struct Args {
    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Settings file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Open files and list the activities available for each
    Open {
        #[arg(required = true, value_name = "LOCATOR")]
        locators: Vec<String>,
    },

    /// List the registered entry formats
    Formats,

    /// List the registered activities in dispatch order
    Activities,

    /// Create or inspect project files
    #[command(subcommand)]
    Project(ProjectCommand),
}

#[derive(Subcommand, Debug)]
enum ProjectCommand {
    /// Create a project listing the given files
    New {
        project: PathBuf,
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// List the entries of a project
    Show { project: PathBuf },
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(args.debug);

    match run(args).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("xamin: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<ExitCode> {
    let settings_manager = match &args.config {
        Some(path) => SettingsManager::with_path(path),
        None => SettingsManager::new()?,
    };
    settings_manager.load().await?;
    debug!("Using settings from {:?}", settings_manager.config_path());

    let app = App::new(settings_manager.get().await);

    match args.command {
        Command::Open { locators } => {
            let mut session = app.session();
            let outcomes = commands::open_all(&mut session, &locators).await;

            let mut failed = false;
            let mut reports = Vec::new();
            for (locator, outcome) in locators.iter().zip(outcomes) {
                match outcome {
                    Ok(report) => reports.push(report),
                    Err(error) => {
                        eprintln!("xamin: {}: {}", locator, error);
                        failed = true;
                    }
                }
            }

            if args.json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                for report in &reports {
                    println!("{}", report);
                }
            }

            info!("Opened {} of {} locators", reports.len(), locators.len());
            Ok(if failed { ExitCode::FAILURE } else { ExitCode::SUCCESS })
        }

        Command::Formats => {
            let formats = commands::list_formats(&app.registry);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&formats)?);
            } else {
                for format in &formats {
                    println!("{}", commands::render_format(format));
                }
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Activities => {
            let activities = commands::list_activities(&app.dispatcher);
            if args.json {
                println!("{}", serde_json::to_string_pretty(&activities)?);
            } else {
                for activity in &activities {
                    println!("{}", commands::render_activity(activity));
                }
                println!("{:<18} (fallback)", app.dispatcher.fallback().name());
            }
            Ok(ExitCode::SUCCESS)
        }

        Command::Project(ProjectCommand::New { project, files }) => {
            let report =
                commands::new_project(&app.registry, &app.settings.project, &project, &files)?;
            print_project(&report, args.json)?;
            Ok(ExitCode::SUCCESS)
        }

        Command::Project(ProjectCommand::Show { project }) => {
            let report = commands::show_project(&app.registry, &app.settings.project, &project)?;
            print_project(&report, args.json)?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn print_project(report: &commands::ProjectReport, json: bool) -> Result<()> {
    if json {
        let rendered =
            serde_json::to_string_pretty(report).context("Failed to serialize project report")?;
        println!("{}", rendered);
    } else {
        println!("{}", report);
    }
    Ok(())
}
