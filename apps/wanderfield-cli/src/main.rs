mod config;

use std::collections::HashMap;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use glam::Vec3;
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wanderfield_common::AgentId;
use wanderfield_input::InputScript;
use wanderfield_render::{DebugTextRenderer, RenderView, Renderer, SceneGraph};
use wanderfield_sim::World;
use wanderfield_stream::{Coverage, ObserverPath, StreamConfig, StreamingManager};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "wanderfield-cli", about = "Headless driver for the wanderfield tile streamer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Run the avatar and wandering agents over the streamed ground
    Simulate {
        /// Number of frames to simulate
        #[arg(short, long, default_value = "600")]
        frames: u64,
        /// Seconds per frame
        #[arg(long, default_value = "0.016666668")]
        dt: f32,
        /// Override the number of agents
        #[arg(short, long)]
        agents: Option<usize>,
        /// Override the RNG seed
        #[arg(short, long)]
        seed: Option<u64>,
        /// YAML config file with `stream` and `sim` sections
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Avatar input script, comma-separated `keys:frames` segments
        #[arg(long, default_value = "d:240,wd:120,w:240")]
        avatar: String,
        /// Walk every crossed cell instead of only the current neighbors
        #[arg(long)]
        path_coverage: bool,
        /// Replace the oldest agent with a new one every N frames
        #[arg(long)]
        churn_every: Option<u64>,
        /// Print a minimap every N frames
        #[arg(long)]
        map_every: Option<u64>,
        /// Print the final summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay the reference walk: origin, near the +x edge, then a long jump
    Scenario,
    /// Validate a config file and print it with defaults filled in
    CheckConfig {
        /// YAML config file
        path: PathBuf,
    },
}

/// End-of-run numbers for `simulate`.
#[derive(Debug, Serialize)]
struct SimulationSummary {
    frames: u64,
    observers: usize,
    live_tiles: usize,
    peak_live_tiles: usize,
    tiles_created_total: usize,
    tiles_evicted_total: usize,
    /// Tiles created plus evicted over the manager's recent-frame window.
    recent_churn: usize,
    scene_nodes: usize,
    scene_lines: usize,
    avg_frame_time_us: u128,
    max_frame_time_us: u128,
    avatar_position: [f32; 3],
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("wanderfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("stream: {}", wanderfield_stream::crate_info());
            println!("render: {}", wanderfield_render::crate_info());
            let config = StreamConfig::default();
            println!(
                "default grid: cell_size={} edge_threshold={} eviction_radius={} generation_radius={:.2}",
                config.cell_size,
                config.edge_threshold,
                config.eviction_radius,
                config.generation_radius()
            );
        }
        Commands::Simulate {
            frames,
            dt,
            agents,
            seed,
            config,
            avatar,
            path_coverage,
            churn_every,
            map_every,
            json,
        } => {
            let mut app = match config {
                Some(path) => AppConfig::load(&path)?,
                None => AppConfig::default(),
            };
            if let Some(agents) = agents {
                app.sim.agent_count = agents;
            }
            if let Some(seed) = seed {
                app.sim.seed = seed;
            }
            if path_coverage {
                app.stream.coverage = Coverage::Path;
            }
            anyhow::ensure!(dt.is_finite() && dt > 0.0, "dt must be positive, got {dt}");
            let script = InputScript::parse(&avatar).context("parsing --avatar script")?;

            let summary = simulate(&app, frames, dt, &script, churn_every, map_every)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                println!(
                    "Simulated {} frames with {} observers",
                    summary.frames, summary.observers
                );
                println!(
                    "Tiles: live={} peak={} created={} evicted={} recent_churn={}",
                    summary.live_tiles,
                    summary.peak_live_tiles,
                    summary.tiles_created_total,
                    summary.tiles_evicted_total,
                    summary.recent_churn
                );
                println!(
                    "Scene: nodes={} lines={}",
                    summary.scene_nodes, summary.scene_lines
                );
                println!(
                    "Frame time: avg={}us max={}us",
                    summary.avg_frame_time_us, summary.max_frame_time_us
                );
                let [x, y, z] = summary.avatar_position;
                println!("Avatar at ({x:.2}, {y:.2}, {z:.2})");
            }
        }
        Commands::Scenario => scenario()?,
        Commands::CheckConfig { path } => {
            let config = AppConfig::load(&path)?;
            println!("{}: OK", path.display());
            println!(
                "generation_radius={:.2} eviction_radius={:.2}",
                config.stream.generation_radius(),
                config.stream.eviction_radius
            );
            print!("{}", config.to_yaml()?);
        }
    }

    Ok(())
}

fn simulate(
    app: &AppConfig,
    frames: u64,
    dt: f32,
    script: &InputScript,
    churn_every: Option<u64>,
    map_every: Option<u64>,
) -> anyhow::Result<SimulationSummary> {
    let mut world = World::new(app.sim.clone()).context("building world")?;
    let scene = SceneGraph::new(app.stream.cell_size);
    let mut streaming =
        StreamingManager::new(app.stream, scene).context("building streaming manager")?;
    let renderer = DebugTextRenderer::new();

    tracing::info!(
        agents = world.agent_count(),
        seed = app.sim.seed,
        coverage = ?app.stream.coverage,
        "simulation start"
    );

    // Last known position per observer; the avatar is keyed by `None`.
    let mut previous: HashMap<Option<AgentId>, Vec3> = HashMap::new();
    let mut peak_live_tiles = 0;

    for frame in 0..frames {
        if let Some(n) = churn_every.filter(|n| *n > 0 && frame > 0 && frame % *n == 0) {
            let oldest = world.agents().next().map(|(id, _)| *id);
            if let Some(id) = oldest {
                world.despawn_agent(id);
            }
            world.spawn_agent();
            tracing::debug!(frame, every = n, "agent churn");
        }

        world.step(dt, &script.state_at(frame));

        let mut current: HashMap<Option<AgentId>, Vec3> = HashMap::new();
        current.insert(None, world.avatar().ground_position());
        for (id, agent) in world.agents() {
            current.insert(Some(*id), agent.transform.ground_position());
        }
        let paths: Vec<ObserverPath> = current
            .iter()
            .map(|(key, to)| match previous.get(key) {
                Some(from) => ObserverPath::new(*from, *to),
                None => ObserverPath::stationary(*to),
            })
            .collect();

        let report = streaming
            .tick_paths(&paths)
            .with_context(|| format!("streaming frame {frame}"))?;
        peak_live_tiles = peak_live_tiles.max(streaming.live_tiles());
        tracing::debug!(
            frame = report.frame,
            created = report.created.len(),
            evicted = report.evicted.len(),
            "frame streamed"
        );

        if let Some(n) = map_every.filter(|n| *n > 0 && (frame + 1) % *n == 0) {
            let view = RenderView {
                focus: world.avatar().position,
                ..RenderView::default()
            };
            println!("frame {} (every {n})", frame + 1);
            print!(
                "{}",
                renderer.render(streaming.factory(), &world.observer_positions(), &view)
            );
        }

        previous = current;
    }

    let stats = streaming.stats().clone();
    let history = streaming.history();
    let scene = streaming.factory();
    let avatar = world.avatar().position;
    Ok(SimulationSummary {
        frames,
        observers: 1 + world.agent_count(),
        live_tiles: streaming.live_tiles(),
        peak_live_tiles,
        tiles_created_total: stats.tiles_created_total,
        tiles_evicted_total: stats.tiles_evicted_total,
        recent_churn: history.churn(),
        scene_nodes: scene.node_count(),
        scene_lines: scene.line_count(),
        avg_frame_time_us: history.average_frame_time().as_micros(),
        max_frame_time_us: history.max_frame_time().as_micros(),
        avatar_position: [avatar.x, avatar.y, avatar.z],
    })
}

fn scenario() -> anyhow::Result<()> {
    let config = StreamConfig::default();
    println!(
        "Scenario: cell_size={} edge_threshold={} eviction_radius={}",
        config.cell_size, config.edge_threshold, config.eviction_radius
    );

    let mut streaming = StreamingManager::new(config, SceneGraph::new(config.cell_size))?;
    let renderer = DebugTextRenderer::new();
    let steps = [
        Vec3::new(0.0, 0.0, 0.0),
        Vec3::new(9.1, 0.0, 0.0),
        Vec3::new(200.0, 0.0, 0.0),
    ];

    for position in steps {
        let mut report = streaming.tick(&[position])?;
        report.created.sort();
        report.evicted.sort();
        let created: Vec<String> = report.created.iter().map(|c| c.to_string()).collect();
        let evicted: Vec<String> = report.evicted.iter().map(|c| c.to_string()).collect();
        println!(
            "\nframe {}: observer at ({:.1}, {:.1})",
            report.frame, position.x, position.z
        );
        println!("  created: [{}]", created.join(", "));
        println!("  evicted: [{}]", evicted.join(", "));
        println!("  live tiles: {}", streaming.live_tiles());
        let view = RenderView {
            focus: position,
            radius_tiles: 3,
        };
        print!(
            "{}",
            renderer.render(streaming.factory(), &[position], &view)
        );
    }

    Ok(())
}
