//! Main entry point for the clickfx CLI

use clap::{Parser, Subcommand};
use clickfx::{ConfigOverrides, EffectChoice, HeadlessRender, Overlay, OverlayConfig, OverlayError};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "clickfx")]
#[command(about = "Click-triggered particle effects on a transparent overlay", long_about = None)]
#[command(version)]
struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    command: Commands,

    /// Settings file
    #[arg(short, long, global = true, default_value = "clickfx.json")]
    config: PathBuf,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Open the overlay window
    Run {
        #[command(flatten)]
        overrides: Overrides,

        /// Window width in logical pixels
        #[arg(long, default_value_t = 1280)]
        width: u32,

        /// Window height in logical pixels
        #[arg(long, default_value_t = 720)]
        height: u32,
    },

    /// Render one effect offscreen to PNG frames
    Render {
        #[command(flatten)]
        overrides: Overrides,

        /// Output directory
        #[arg(short, long, default_value = "frames")]
        out: PathBuf,

        /// Canvas width in logical pixels
        #[arg(long, default_value_t = 800)]
        width: u32,

        /// Canvas height in logical pixels
        #[arg(long, default_value_t = 600)]
        height: u32,

        /// Device pixel ratio
        #[arg(long, default_value_t = 1.0)]
        scale: f64,

        /// Frames to simulate
        #[arg(long, default_value_t = 60)]
        frames: u32,

        /// Keep every Nth frame
        #[arg(long, default_value_t = 10)]
        every: u32,

        /// Fixed RNG seed
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Write the default settings file
    InitConfig {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Settings overridden from the command line.
#[derive(clap::Args)]
struct Overrides {
    /// Effect name, or "shuffle"
    #[arg(short, long)]
    effect: Option<String>,

    /// Intensity, 0.25 to 3
    #[arg(short, long)]
    intensity: Option<f32>,
}

impl From<Overrides> for ConfigOverrides {
    fn from(overrides: Overrides) -> Self {
        ConfigOverrides {
            effect: overrides.effect.map(EffectChoice::from),
            intensity: overrides.intensity,
        }
    }
}

/// Log level picked by `-v`/`-q`; `None` keeps `RUST_LOG` or the default.
fn log_level(verbose: u8, quiet: bool) -> Option<log::LevelFilter> {
    match (verbose, quiet) {
        (0, false) => None,
        (0, true) => Some(log::LevelFilter::Error),
        (1, _) => Some(log::LevelFilter::Debug),
        _ => Some(log::LevelFilter::Trace),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logger
    let mut logger = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(level) = log_level(cli.verbose, cli.quiet) {
        logger.filter_level(level);
    }
    logger.init();

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn execute(cli: Cli) -> Result<(), OverlayError> {
    match cli.command {
        Commands::Run {
            overrides,
            width,
            height,
        } => {
            Overlay::new(OverlayConfig::load_or_default(&cli.config))
                .with_overrides(overrides.into())
                .with_config_path(&cli.config)
                .with_size(width, height)
                .run()
        }

        Commands::Render {
            overrides,
            out,
            width,
            height,
            scale,
            frames,
            every,
            seed,
        } => {
            let overrides = ConfigOverrides::from(overrides);
            let config = overrides.apply(OverlayConfig::load_or_default(&cli.config));
            let mut render = HeadlessRender::new(config)
                .with_size(width, height)
                .with_scale_factor(scale)
                .with_frames(frames, every);
            if let Some(seed) = seed {
                render = render.with_seed(seed);
            }
            let written = render.render_to(&out)?;
            println!("Wrote {} frames to {}", written.len(), out.display());
            Ok(())
        }

        Commands::InitConfig { force } => {
            if cli.config.exists() && !force {
                println!("{} already exists (use --force to overwrite)", cli.config.display());
                return Ok(());
            }
            OverlayConfig::default().save(&cli.config)?;
            println!("Wrote default settings to {}", cli.config.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clickfx::Effect;

    #[test]
    fn test_log_level_flags() {
        assert_eq!(log_level(0, false), None);
        assert_eq!(log_level(0, true), Some(log::LevelFilter::Error));
        assert_eq!(log_level(1, false), Some(log::LevelFilter::Debug));
        assert_eq!(log_level(3, true), Some(log::LevelFilter::Trace));
    }

    #[test]
    fn test_run_flags_become_overrides() {
        let cli = Cli::parse_from(["clickfx", "run", "-e", "fireworks", "-i", "2"]);
        let Commands::Run { overrides, .. } = cli.command else {
            panic!("expected run");
        };
        let overrides = ConfigOverrides::from(overrides);
        assert_eq!(overrides.effect, Some(EffectChoice::Fixed(Effect::Fireworks)));
        assert_eq!(overrides.intensity, Some(2.0));
    }
}
