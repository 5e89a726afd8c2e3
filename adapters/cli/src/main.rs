#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays tongue scripts against a field of ants.

mod script;

use std::{fs, path::PathBuf};

use anteater_core::{
    Command, EntityId, EntitySnapshot, EntityView, Event, HaltReason, Point, POINTS_PER_CAPTURE,
};
use anteater_tongue::{self as tongue, Config, Tongue};
use anyhow::{Context, Result};
use clap::Parser;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Ant half extent relative to the cell size.
const ANT_EXTENT_RATIO: f64 = 0.25;

#[derive(Debug, Parser)]
#[command(name = "anteater")]
#[command(about = "Drive the anteater tongue from a script and report captures", long_about = None)]
struct Args {
    /// TOML file overriding the default tongue configuration
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Script of tongue instructions; the rectangle demo runs when omitted
    #[arg(short, long)]
    script: Option<PathBuf>,

    /// Number of ants scattered across the grid
    #[arg(long, default_value_t = 12)]
    ants: u32,

    /// Seed for the ant scatter
    #[arg(long, default_value_t = 7)]
    seed: u64,

    /// Extra entity at pixel position X,Y (repeatable)
    #[arg(long = "entity", value_parser = parse_point)]
    entities: Vec<Point>,

    /// Log at debug level
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = load_config(args.config.as_ref())?;
    let instructions = match &args.script {
        Some(path) => {
            let source = fs::read_to_string(path)
                .with_context(|| format!("failed to read script {}", path.display()))?;
            script::parse(&source)
                .with_context(|| format!("failed to parse script {}", path.display()))?
        }
        None => script::parse(&script::demo(config.move_cooldown, config.capture_delay))
            .context("failed to parse the built-in demo script")?,
    };
    config.validate().context("invalid tongue configuration")?;
    let view = populate(&config, &args);
    tracing::info!(
        entities = view.len(),
        instructions = instructions.len(),
        "starting run"
    );

    let mut tongue = Tongue::new(config).context("invalid tongue configuration")?;
    let mut events = Vec::new();
    let mut captured = Vec::new();
    let mut score = 0_u32;
    let mut tick = 0_u64;
    for instruction in instructions {
        for _ in 0..instruction.repeat {
            if instruction.command == Command::Tick {
                tick += 1;
            }
            tongue::apply(&mut tongue, instruction.command, &view, &mut events);
            for event in events.drain(..) {
                if let Event::Captured(capture) = &event {
                    score = score.saturating_add(capture.score(POINTS_PER_CAPTURE));
                    captured.extend(capture.captured.iter().copied());
                }
                println!("[tick {tick:>5}] {}", describe(&event));
            }
        }
    }

    println!("final state: {:?}", tongue.state());
    println!("tongue length: {}", tongue.path().len());
    println!("captured: {}", format_ids(&captured));
    println!("score: {score}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let fallback = if verbose {
        "anteater=debug"
    } else {
        "anteater=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| fallback.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    toml::from_str(&text).with_context(|| format!("failed to parse config {}", path.display()))
}

fn parse_point(value: &str) -> Result<Point, String> {
    let (x, y) = value
        .split_once(',')
        .ok_or_else(|| format!("expected X,Y but got `{value}`"))?;
    let x = x
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("invalid x `{x}`: {error}"))?;
    let y = y
        .trim()
        .parse::<f64>()
        .map_err(|error| format!("invalid y `{y}`: {error}"))?;
    Ok(Point::new(x, y))
}

/// Explicit entities take the first ids; scattered ants follow.
fn populate(config: &Config, args: &Args) -> EntityView {
    let half_extent = config.cell_size * ANT_EXTENT_RATIO;
    let width = f64::from(config.columns) * config.cell_size;
    let height = f64::from(config.rows) * config.cell_size;
    let mut rng = ChaCha8Rng::seed_from_u64(args.seed);

    let placed = args.entities.iter().copied();
    let scattered = (0..args.ants).map(|_| {
        Point::new(
            rng.gen_range(half_extent..width - half_extent),
            rng.gen_range(half_extent..height - half_extent),
        )
    });
    let snapshots = placed
        .chain(scattered)
        .zip(1_u32..)
        .map(|(position, id)| EntitySnapshot {
            id: EntityId::new(id),
            position,
            half_extent,
        })
        .collect();
    EntityView::from_snapshots(snapshots)
}

fn describe(event: &Event) -> String {
    match event {
        Event::ExtendStarted => "extend started".to_owned(),
        Event::DirectionRejected { requested } => {
            format!("turn {requested:?} rejected (reversal)")
        }
        Event::HeadAdvanced { from, to } => format!(
            "head ({}, {}) -> ({}, {})",
            from.column(),
            from.row(),
            to.column(),
            to.row()
        ),
        Event::ExtensionHalted { reason } => match reason {
            HaltReason::OutOfBounds => "halted at the grid edge".to_owned(),
            HaltReason::MaxLengthReached => "halted at maximum length".to_owned(),
            HaltReason::Released => "extend released".to_owned(),
        },
        Event::LoopFormed {
            at_index,
            cell_count,
            trapped,
        } => format!(
            "loop formed at index {at_index} over {cell_count} cells, trapped {}",
            format_ids(trapped)
        ),
        Event::LoopReleased => "empty loop released".to_owned(),
        Event::Captured(capture) => format!(
            "captured {} with a {}-point outline (+{})",
            format_ids(&capture.captured),
            capture.polygon.len(),
            capture.score(POINTS_PER_CAPTURE)
        ),
        Event::HeadRetracted { removed } => {
            format!("retracted ({}, {})", removed.column(), removed.row())
        }
        Event::FullyRetracted => "fully retracted".to_owned(),
        Event::ResetPerformed => "reset".to_owned(),
    }
}

fn format_ids(ids: &[EntityId]) -> String {
    if ids.is_empty() {
        return "none".to_owned();
    }
    ids.iter()
        .map(|id| format!("#{}", id.get()))
        .collect::<Vec<_>>()
        .join(", ")
}
