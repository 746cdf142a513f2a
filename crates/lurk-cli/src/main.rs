//! lurk CLI.
//!
//! - `lurk path` - straightened route between two points
//! - `lurk cast` - visibility polygon from a viewpoint
//! - `lurk simulate` - run agents for a number of ticks and summarize their events

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::{fmt, EnvFilter};

use lurk_core::EntityId;
use lurk_geom::Vec2;
use lurk_sight::{CastRequest, FULL_CIRCLE};
use lurk_world::{LevelData, World, WorldConfig};

#[derive(Parser)]
#[command(name = "lurk")]
#[command(about = "2D perception and navigation playground", version)]
struct Cli {
    /// World config YAML (defaults apply when omitted)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Find a path across a level
    Path {
        /// Level YAML
        #[arg(long)]
        level: PathBuf,

        /// Start point as `x,y`
        #[arg(long, value_parser = parse_point)]
        from: Vec2,

        /// Goal point as `x,y`
        #[arg(long, value_parser = parse_point)]
        to: Vec2,
    },

    /// Cast a visibility polygon
    Cast {
        /// Level YAML
        #[arg(long)]
        level: PathBuf,

        /// Viewpoint as `x,y`
        #[arg(long, value_parser = parse_point)]
        at: Vec2,

        /// Look direction in radians
        #[arg(long, default_value_t = 0.0)]
        look: f64,

        /// Cone width in radians; omit for a full circle
        #[arg(long)]
        fov: Option<f64>,

        /// Half-size of the square viewport; omit to use the level bounds
        #[arg(long)]
        range: Option<f64>,
    },

    /// Run the level's agents
    Simulate {
        /// Level YAML
        #[arg(long)]
        level: PathBuf,

        /// Frames to run
        #[arg(long, default_value_t = 600)]
        ticks: u64,

        /// Ticks elapsed per frame
        #[arg(long, default_value_t = 1.0)]
        step: f64,
    },
}

#[derive(Serialize)]
struct PathReport {
    points: Vec<Vec2>,
    triangles: usize,
}

#[derive(Serialize)]
struct CastReport {
    visible: Vec<Vec2>,
    structures: Vec<u32>,
}

#[derive(Serialize)]
struct AgentReport {
    id: EntityId,
    position: Vec2,
    motion: String,
    action: String,
    suspicion: Option<f64>,
}

#[derive(Serialize)]
struct SimulateReport {
    ticks: u64,
    events: BTreeMap<&'static str, usize>,
    agents: Vec<AgentReport>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins when set.
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = WorldConfig::load_or_default(cli.config.as_deref())?;

    match cli.command {
        Commands::Path { level, from, to } => find_path(config, &level, from, to),
        Commands::Cast {
            level,
            at,
            look,
            fov,
            range,
        } => cast(config, &level, at, look, fov, range),
        Commands::Simulate { level, ticks, step } => simulate(config, &level, ticks, step),
    }
}

fn load_world(config: WorldConfig, level: &Path) -> Result<World> {
    let data = LevelData::load(level)?;
    let mut world = World::from_level(config, &data)?;
    world
        .rebuild_geometry()
        .with_context(|| format!("Failed to bake navmesh for {}", level.display()))?;
    Ok(world)
}

fn find_path(config: WorldConfig, level: &Path, from: Vec2, to: Vec2) -> Result<()> {
    let world = load_world(config, level)?;
    let path = world
        .navmesh()
        .find_path(from, to)
        .with_context(|| format!("No path from {from:?} to {to:?}"))?;
    tracing::info!(waypoints = path.points.len(), "Path found");
    print_json(&PathReport {
        points: path.points,
        triangles: path.regions.len(),
    })
}

fn cast(
    config: WorldConfig,
    level: &Path,
    at: Vec2,
    look: f64,
    fov: Option<f64>,
    range: Option<f64>,
) -> Result<()> {
    let world = load_world(config, level)?;
    let request = match range {
        Some(range) => CastRequest::around(at, range),
        None => CastRequest::new(at, world.bounds().clone()),
    }
    .looking(look, fov.unwrap_or(FULL_CIRCLE))
    .with_structure();

    let result = world.cast(&request);
    let Some(visible) = result.visible else {
        bail!("Nothing visible from {at:?}");
    };
    print_json(&CastReport {
        visible: visible.points().to_vec(),
        structures: result.structure_ids.iter().map(|id| id.0).collect(),
    })
}

fn simulate(config: WorldConfig, level: &Path, ticks: u64, step: f64) -> Result<()> {
    let mut world = load_world(config, level)?;
    let mut events: BTreeMap<&'static str, usize> = BTreeMap::new();
    for _ in 0..ticks {
        for event in world.frame(1.0, step) {
            *events.entry(event.kind()).or_default() += 1;
        }
    }
    tracing::info!(ticks, agents = world.agents().len(), "Simulation finished");

    let agents = world
        .agents()
        .iter()
        .map(|agent| AgentReport {
            id: agent.id(),
            position: agent.position(),
            motion: format!("{:?}", agent.motion_state()),
            action: format!("{:?}", agent.action_state()),
            suspicion: agent.guard_state().map(|g| g.suspicion()),
        })
        .collect();
    print_json(&SimulateReport {
        ticks,
        events,
        agents,
    })
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn parse_point(s: &str) -> Result<Vec2, String> {
    let (x, y) = s
        .split_once(',')
        .ok_or_else(|| format!("expected `x,y`, got `{s}`"))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x in `{s}`: {e}"))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y in `{s}`: {e}"))?;
    if !x.is_finite() || !y.is_finite() {
        return Err(format!("point `{s}` is not finite"));
    }
    Ok(Vec2::new(x, y))
}
