use boardgen::config::{self, GeneratorConfig};
use boardgen::{output, pipeline};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the `tracing` filter directives.
const LOG_ENV: &str = "BOARDGEN_LOG";

#[derive(Parser)]
#[command(name = "boardgen")]
#[command(about = "Build a JSON catalog of development boards from YAML files")]
#[command(long_about = "\
Build a JSON catalog of development boards from YAML files

Every board lives in its own YAML file. All files are validated, normalized
(memory sizes in bytes, thumbnails embedded as data URIs) and written as a
single dataset next to a copy of the page template.

Layout:

  boards/
  ├── _template.yaml          # Authoring example, never processed
  ├── esp32-devkit.yaml
  └── pico.yaml
  page_template/              # Copied verbatim into the output
  out/                        # Rebuilt from scratch on every run
  ├── board_data.json
  └── index.html
  .thumbnail-cache/           # Downloaded images, kept between runs

Any invalid file stops the build before anything is written.

Diagnostics go to stderr; set BOARDGEN_LOG=debug to see cache activity.
Run 'boardgen gen-config' to generate a documented boardgen.toml.")]
#[command(version)]
struct Cli {
    /// Config file (defaults to ./boardgen.toml when present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory of board YAML files
    #[arg(long, global = true)]
    boards: Option<PathBuf>,

    /// Page template directory copied into the output
    #[arg(long, global = true)]
    template: Option<PathBuf>,

    /// Output directory (deleted and recreated on build)
    #[arg(long, global = true)]
    output: Option<PathBuf>,

    /// Thumbnail source cache directory
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Validate, normalize and write the dataset and page (default)
    Build,
    /// Validate board files without writing anything
    Check,
    /// Print a stock boardgen.toml with all options documented
    GenConfig,
}

fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command.as_ref().unwrap_or(&Command::Build) {
        Command::Build => {
            let config = resolve_config(&cli)?;
            println!(
                "==> Building {} \u{2192} {}",
                config.paths.boards.display(),
                config.paths.output.display()
            );
            let summary = pipeline::run(&config, output::print_pipeline_event)?;
            output::print_build_summary(&summary);
            println!("==> Build complete: {}", config.paths.output.display());
        }
        Command::Check => {
            let config = resolve_config(&cli)?;
            println!("==> Checking {}", config.paths.boards.display());
            let summary = pipeline::check(&config, output::print_pipeline_event)?;
            output::print_check_summary(&summary);
            println!("==> Boards are valid");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the config file and apply command-line path overrides on top.
fn resolve_config(cli: &Cli) -> Result<GeneratorConfig, config::ConfigError> {
    let mut config = match &cli.config {
        Some(path) => config::load_config_file(path)?,
        None => config::load_config(Path::new("."))?,
    };

    let paths = &mut config.paths;
    if let Some(dir) = &cli.boards {
        paths.boards = dir.clone();
    }
    if let Some(dir) = &cli.template {
        paths.template = dir.clone();
    }
    if let Some(dir) = &cli.output {
        paths.output = dir.clone();
    }
    if let Some(dir) = &cli.cache {
        paths.cache = dir.clone();
    }
    Ok(config)
}

/// Route `tracing` diagnostics to stderr so stdout stays progress-only.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
