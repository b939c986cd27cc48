use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use linked_step_core::{AnimationConfig, GifSink, Renderer, TerminalPreview};
use tracing_subscriber::EnvFilter;

fn main() -> linked_step_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Render {
            config,
            output,
            width,
            height,
            delay,
        } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(output) = output {
                config.output.path = output;
            }
            if let Some(width) = width {
                config.width = width;
            }
            if let Some(height) = height {
                config.height = height;
            }
            if let Some(delay) = delay {
                config.frame_delay_ms = delay;
            }
            run_render(&config)
        }
        Commands::Preview { config, cols } => run_preview(&load_config(config.as_deref())?, cols),
    }
}

fn load_config(path: Option<&Path>) -> linked_step_core::Result<AnimationConfig> {
    match path {
        Some(path) => {
            tracing::debug!(?path, "loading configuration");
            AnimationConfig::load(path)
        }
        None => Ok(AnimationConfig::default()),
    }
}

fn run_render(config: &AnimationConfig) -> linked_step_core::Result<()> {
    tracing::info!(
        output = ?config.output.path,
        width = config.width,
        height = config.height,
        "rendering animation"
    );

    let mut renderer = Renderer::new(config)?;
    let mut sink = GifSink::from_config(config);
    renderer.run(&mut sink)?;
    Ok(())
}

fn run_preview(config: &AnimationConfig, cols: u32) -> linked_step_core::Result<()> {
    tracing::info!(cols, "starting terminal preview");

    let mut renderer = Renderer::new(config)?;
    let stdout = std::io::stdout().lock();
    let mut sink = TerminalPreview::new(stdout, cols, config.style.background);
    renderer.run(&mut sink)?;
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Linked percentile step animation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render one full cycle of the animation to a GIF file.
    Render {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Output path, overriding the configuration.
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        width: Option<u32>,
        #[arg(long)]
        height: Option<u32>,
        /// Frame delay in milliseconds.
        #[arg(long)]
        delay: Option<u64>,
    },
    /// Play one cycle as ASCII art in the terminal.
    Preview {
        /// JSON configuration file.
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Width of the preview in characters.
        #[arg(long, default_value_t = 72)]
        cols: u32,
    },
}
