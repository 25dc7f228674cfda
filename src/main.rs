use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use vtrelease::cli::orchestration;
use vtrelease::cli::{BuildCommand, Cli, Command};
use vtrelease::ui;

fn init_logging(level: &str) {
    // RUST_LOG wins over --log-level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);
    debug!("vtrelease v{}", env!("CARGO_PKG_VERSION"));

    if let Err(e) = run(&cli) {
        ui::display_error(&e.to_string());
        std::process::exit(1);
    }

    Ok(())
}

fn run(cli: &Cli) -> Result<()> {
    let repo = orchestration::require_repo(cli.repo.as_deref())?;
    let config = orchestration::load_run_config(cli.config.as_deref(), &repo)?;

    match &cli.command {
        Command::Stage(args) => {
            ui::display_status(&format!("Staging release from {}", args.branch));
            let state = orchestration::run_stage(args, &repo, &config)?;
            ui::display_release_summary(&state);
            ui::display_success("Release staging complete");
        }
        Command::Build(BuildCommand::Image(args)) => {
            ui::display_status(&format!("Building image {} at {}", args.name, args.version));
            let entries = orchestration::run_image_build(args, &repo, &config)?;
            ui::display_built_images(&args.name, &entries);
            ui::display_success(&format!("Image {} built", args.name));
        }
    }

    Ok(())
}
