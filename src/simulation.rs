//! Fixed-step frame loop
//!
//! Each frame:
//! - Clamp the frame time to prevent a spiral of death after stalls
//! - Run fixed physics steps for the accumulated time (capped per frame)
//! - Run one variable-rate logic pass
//! - Submit draw requests

use arbor_core::{DrawRequest, DrawSink, GraphError, GraphManager};

use crate::config::SimulationConfig;

/// What a single frame did
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Fixed physics steps run this frame
    pub physics_steps: u32,
    /// Draw requests submitted this frame
    pub draw_requests: usize,
}

/// Drives a graph with a fixed physics timestep
pub struct FrameLoop {
    fixed_timestep: f32,
    max_substeps: u32,
    max_frame_time: f32,
    accumulator: f32,
}

impl FrameLoop {
    /// Create a frame loop from configuration
    pub fn new(config: &SimulationConfig) -> Self {
        let defaults = SimulationConfig::default();
        let fixed_timestep = if config.fixed_timestep > 0.0 {
            config.fixed_timestep
        } else {
            log::warn!(
                "Invalid fixed timestep {}; using {}",
                config.fixed_timestep, defaults.fixed_timestep
            );
            defaults.fixed_timestep
        };
        Self {
            fixed_timestep,
            max_substeps: config.max_substeps.max(1),
            max_frame_time: config.max_frame_time.max(fixed_timestep),
            accumulator: 0.0,
        }
    }

    pub fn fixed_timestep(&self) -> f32 {
        self.fixed_timestep
    }

    /// Simulation time not yet consumed by a physics step
    pub fn accumulator(&self) -> f32 {
        self.accumulator
    }

    /// Advance the graph by one frame of `frame_time` seconds
    pub fn advance(
        &mut self,
        graph: &mut GraphManager,
        frame_time: f32,
        sink: &mut dyn DrawSink,
    ) -> Result<FrameStats, GraphError> {
        // Cap dt so a long stall doesn't queue up a burst of physics steps
        let dt = frame_time.clamp(0.0, self.max_frame_time);
        self.accumulator += dt;

        let mut physics_steps = 0;
        while self.accumulator >= self.fixed_timestep && physics_steps < self.max_substeps {
            graph.physics_update(self.fixed_timestep)?;
            self.accumulator -= self.fixed_timestep;
            physics_steps += 1;
        }
        if self.accumulator >= self.fixed_timestep {
            log::debug!(
                "Dropping {:.3}s of simulation time after {} substeps",
                self.accumulator - self.accumulator % self.fixed_timestep,
                physics_steps
            );
            self.accumulator %= self.fixed_timestep;
        }

        graph.update(dt)?;

        let mut counter = CountingSink { inner: sink, count: 0 };
        graph.submit_draw(&mut counter);

        Ok(FrameStats {
            physics_steps,
            draw_requests: counter.count,
        })
    }
}

/// Forwards requests while counting them
struct CountingSink<'a> {
    inner: &'a mut dyn DrawSink,
    count: usize,
}

impl DrawSink for CountingSink<'_> {
    fn submit(&mut self, request: DrawRequest) {
        self.count += 1;
        self.inner.submit(request);
    }
}
