use std::fs::File;
use std::io::BufWriter;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};

use grid_raycaster::{Command, Engine, RenderConfig, TextureBank, TileMap};

/// Headless driver: walks the player through a level for a number of ticks
/// and writes the last frame to a PNG.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Map text file (digits = walls, s = start, g/h/t = sprites). Built-in demo if omitted.
    #[arg(long, value_name = "FILE")]
    map: Option<PathBuf>,
    /// Directory with floor.png, ceiling.png, wall-N.png and sprite PNGs. Procedural textures if omitted.
    #[arg(long, value_name = "DIR")]
    textures: Option<PathBuf>,
    #[arg(long, short = 'W', default_value_t = 320)]
    width: usize,
    #[arg(long, short = 'H', default_value_t = 200)]
    height: usize,
    /// Horizontal field of view in degrees
    #[arg(long, default_value_t = 80.0)]
    fov: f32,
    /// Distance at which everything fades to black
    #[arg(long, default_value_t = 4.5)]
    black_distance: f32,
    /// Number of ticks to run
    #[arg(long, default_value_t = 60)]
    frames: u32,
    /// Turn per tick in degrees, counter-clockwise positive
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    turn: f32,
    /// Forward movement per tick in map units
    #[arg(long, default_value_t = 0.0, allow_negative_numbers = true)]
    walk: f32,
    /// Where to write the final frame
    #[arg(long, short = 'o', default_value = "frame.png")]
    output: PathBuf,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = CliArgs::parse();

    let map = match &args.map {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("reading map {}", path.display()))?
            .parse::<TileMap>()
            .with_context(|| format!("parsing map {}", path.display()))?,
        None => TileMap::demo(),
    };

    let textures = match &args.textures {
        Some(dir) => TextureBank::load_dir(dir)
            .with_context(|| format!("loading textures from {}", dir.display()))?,
        None => TextureBank::procedural(),
    };

    let config = RenderConfig {
        width: args.width,
        height: args.height,
        field_of_view: args.fov.to_radians(),
        black_distance: args.black_distance,
    };

    let mut engine = Engine::new(config, map, textures).context("starting renderer")?;

    if args.frames == 0 {
        warn!("no frames requested; writing a blank image");
    }

    let epoch = Instant::now();
    for _ in 0..args.frames {
        if args.turn != 0.0 {
            engine.apply(Command::Rotate(args.turn.to_radians()))?;
        }
        if args.walk != 0.0 {
            engine.apply(Command::MoveForward(args.walk))?;
        }
        let walltime_ms = epoch.elapsed().as_secs_f64() * 1000.0;
        engine.tick(walltime_ms).context("rendering frame")?;
    }

    let elapsed = epoch.elapsed().as_secs_f32();
    if args.frames > 0 && elapsed > 0.0 {
        info!(
            "{} frames in {:.2} s ({:.1} FPS)",
            args.frames,
            elapsed,
            args.frames as f32 / elapsed
        );
    }

    let file = File::create(&args.output)
        .with_context(|| format!("creating {}", args.output.display()))?;
    engine
        .frame()
        .write_png(BufWriter::new(file))
        .with_context(|| format!("writing {}", args.output.display()))?;
    info!(
        "wrote {} (camera at {}, facing {:.1} degrees)",
        args.output.display(),
        engine.camera().pos,
        engine.camera().angle().to_degrees()
    );

    Ok(())
}
