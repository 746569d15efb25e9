#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Fear the Water experience.

use std::{cell::Cell, path::PathBuf, rc::Rc, time::Duration};

use anyhow::{Context, Result};
use clap::Parser;
use fear_the_water_core::{Event, EventBus, Topic};
use fear_the_water_rendering::{Color, Presentation, RecordingSurface, RenderingBackend};
use fear_the_water_rendering_macroquad::MacroquadBackend;
use fear_the_water_system_bootstrap::Bootstrap;
use fear_the_water_world::{query, Level};
use tracing::Level as LogLevel;

const HEADLESS_FRAME: Duration = Duration::from_nanos(16_666_667);

/// Plays a Fear the Water level.
#[derive(Debug, Parser)]
#[command(name = "fear-the-water", version)]
struct Cli {
    /// TOML game configuration. Missing keys take their defaults.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// JSON level document. The embedded level is used when omitted.
    #[arg(long, value_name = "PATH")]
    level: Option<PathBuf>,
    /// Seed for the decorative random number generator.
    #[arg(long, value_name = "SEED")]
    seed: Option<u64>,
    /// Multiplier from logical coordinates to window pixels.
    #[arg(long, value_name = "FACTOR")]
    scale: Option<f32>,
    /// Runs this many frames against an offscreen surface and prints a summary.
    #[arg(long, value_name = "FRAMES")]
    headless: Option<u32>,
    /// Logs frame timing once per second.
    #[arg(long)]
    show_fps: bool,
    /// Renders as fast as possible instead of waiting for the display.
    #[arg(long)]
    no_vsync: bool,
    /// Enables debug logging.
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Fear the Water command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut bootstrap = match &cli.config {
        Some(path) => Bootstrap::from_config_path(path)?,
        None => Bootstrap::default(),
    };
    if let Some(seed) = cli.seed {
        bootstrap.config_mut().rng_seed = seed;
    }
    if let Some(scale) = cli.scale {
        bootstrap.config_mut().scale = scale;
    }
    bootstrap
        .config()
        .validate()
        .context("invalid command-line overrides")?;

    println!("{}", bootstrap.welcome_banner());

    let level = match &cli.level {
        Some(path) => bootstrap.level_from_path(path)?,
        None => bootstrap.default_level()?,
    };

    match cli.headless {
        Some(frames) => {
            let summary = run_headless(level, frames);
            println!("{summary}");
            Ok(())
        }
        None => run_windowed(&bootstrap, level, &cli),
    }
}

fn init_logging(verbose: bool) {
    let max_level = if verbose {
        LogLevel::DEBUG
    } else {
        LogLevel::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(max_level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Debug, Default)]
struct HeadlessSummary {
    frames: u32,
    draw_commands: usize,
    peak_bubbles: usize,
    live_bubbles: usize,
    destroyed: usize,
}

impl std::fmt::Display for HeadlessSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "frames: {}", self.frames)?;
        writeln!(f, "draw commands: {}", self.draw_commands)?;
        writeln!(f, "peak bubbles: {}", self.peak_bubbles)?;
        writeln!(f, "live bubbles: {}", self.live_bubbles)?;
        write!(f, "entities destroyed: {}", self.destroyed)
    }
}

fn run_headless(mut level: Level, frames: u32) -> HeadlessSummary {
    let mut surface = RecordingSurface::new();
    let mut summary = HeadlessSummary {
        frames,
        ..HeadlessSummary::default()
    };

    for _ in 0..frames {
        level.update(HEADLESS_FRAME);
        level.render(&mut surface);
        summary.draw_commands += surface.take_commands().len();
        summary.peak_bubbles = summary.peak_bubbles.max(query::bubble_count(&level));
    }
    summary.live_bubbles = query::bubble_count(&level);

    let mut bus = EventBus::new();
    let destroyed = Rc::new(Cell::new(0_usize));
    let counter = Rc::clone(&destroyed);
    let _subscription = bus.subscribe(Topic::Destroy, move |_| counter.set(counter.get() + 1));
    level.destroy(&mut bus);
    summary.destroyed = destroyed.get();

    summary
}

fn run_windowed(bootstrap: &Bootstrap, mut level: Level, cli: &Cli) -> Result<()> {
    let config = bootstrap.config();
    let presentation = Presentation::titled(Color::BLACK, config.screen_size(), config.scale);
    let backend = MacroquadBackend::new()
        .with_vsync(!cli.no_vsync)
        .with_show_fps(cli.show_fps);

    let mut bus = EventBus::new();
    let _clicks = bus.subscribe(Topic::Click, |event| {
        if let Event::Clicked { entity, position } = event {
            tracing::info!(%entity, x = position.x, y = position.y, "entity clicked");
        }
    });

    backend
        .run(presentation, move |dt, input, surface| {
            level.update(dt);
            level.render(surface);

            if let Some(position) = input.pointer_press {
                match level.entity_at(position) {
                    Some(entity) => bus.emit(Event::Clicked { entity, position }),
                    None => tracing::debug!(x = position.x, y = position.y, "click hit nothing"),
                }
            }
        })
        .context("rendering backend failed")
}
