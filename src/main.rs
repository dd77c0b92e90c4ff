//! Arbor - headless demo
//!
//! Builds the demo platformer scene and runs it for a fixed number of frames,
//! logging the player's state once per simulated second.

use arbor::config::AppConfig;
use arbor::demo::{build_demo_scene, PlayerController};
use arbor::simulation::FrameLoop;
use arbor_core::{DrawQueue, GraphError, GraphManager, NodeKey};

fn main() {
    // Config comes first so it can choose the default log filter
    let (config, config_error) = match AppConfig::load() {
        Ok(config) => (config, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    // RUST_LOG still takes precedence over the configured level
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(&config.debug.log_level))
        .init();
    if let Some(e) = config_error {
        log::warn!("Failed to load config: {}. Using defaults.", e);
    }

    log::info!("Starting Arbor demo");
    if let Err(e) = run(&config) {
        log::error!("Simulation failed: {}", e);
        std::process::exit(1);
    }
}

fn run(config: &AppConfig) -> Result<(), GraphError> {
    let mut graph = GraphManager::with_config(config.physics.to_kinematic_config());
    let scene = build_demo_scene(&mut graph, &config.physics);

    let mut frame_loop = FrameLoop::new(&config.simulation);
    let mut queue = DrawQueue::new();
    let frame_time = frame_loop.fixed_timestep();
    let frames_per_second = (1.0 / frame_time).round().max(1.0) as u32;

    let mut physics_steps = 0;
    for frame in 1..=config.simulation.frames {
        let stats = frame_loop.advance(&mut graph, frame_time, &mut queue)?;
        physics_steps += stats.physics_steps;

        queue.sort_by_depth();
        for request in queue.drain() {
            if config.debug.log_draw_requests {
                log::debug!(
                    "Draw '{}' at {:?} (depth {})",
                    request.texture, request.transform.position, request.depth
                );
            }
        }

        if frame % frames_per_second == 0 {
            log_player(&graph, scene.player, frame / frames_per_second);
        }
    }

    log::info!(
        "Finished {} frames: {} physics steps, {} live nodes",
        config.simulation.frames,
        physics_steps,
        graph.len()
    );
    Ok(())
}

fn log_player(graph: &GraphManager, player: NodeKey, second: u32) {
    let (Some(position), Some(body)) = (graph.global_position(player), graph.kinematic_body(player)) else {
        log::warn!("Player is no longer in the graph");
        return;
    };
    let jumps = graph.behavior::<PlayerController>(player).map_or(0, |c| c.jumps);
    log::info!(
        "t={}s player at ({:.0}, {:.0}) floor={} wall={} ceiling={} jumps={}",
        second,
        position.x,
        position.y,
        body.is_on_floor(),
        body.is_on_wall(),
        body.is_on_ceiling(),
        jumps
    );
}
