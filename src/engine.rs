//! The fireworks engine: owns the particle world and the drawing surface and
//! advances both one step per frame callback while running.
//!
//! Each tick runs, in order: fade the surface, advance every particle, draw
//! them additively, drop the exhausted ones, maybe spawn a burst. Removals and
//! spawns are applied when the schedule flushes, so a fresh burst is first
//! moved on the following tick.

use crate::{
    advance::{advance_particles_system, prune_particles_system},
    burst::{create_burst, spawn_bursts_system},
    color::Color,
    config::ConfigError,
    frame::{FrameHandle, FrameScheduler},
    particle::Particle,
    render::{fade_surface_system, render_particles_system},
    simulation::{advance_time_system, init_simulation, SimulationConfig, SimulationData},
    surface::PixelCanvas,
};
use legion::*;
use log::{debug, info, warn};
use nalgebra::Vector2;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use std::ops::{Deref, DerefMut};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("drawing surface must be non-empty, got {width}x{height}")]
    EmptySurface { width: u32, height: u32 },
}

pub struct FireworksEngine {
    world: World,
    resources: Resources,
    schedule: Schedule,
    /// The callback we are waiting for; `Some` exactly while running.
    frame: Option<FrameHandle>,
}

fn build_schedule() -> Schedule {
    Schedule::builder()
        .add_system(fade_surface_system())
        .add_system(advance_particles_system())
        .add_thread_local(render_particles_system())
        .add_system(prune_particles_system())
        .add_system(spawn_bursts_system())
        .add_system(advance_time_system())
        .build()
}

impl FireworksEngine {
    pub fn new(
        config: SimulationConfig,
        width: u32,
        height: u32,
    ) -> Result<FireworksEngine, EngineError> {
        config.validate()?;
        if width == 0 || height == 0 {
            return Err(EngineError::EmptySurface { width, height });
        }
        let rng = match config.seed {
            Some(seed) => Pcg64::seed_from_u64(seed),
            None => Pcg64::from_entropy(),
        };

        let mut resources = Resources::default();
        resources.insert(PixelCanvas::new(width, height));
        resources.insert(rng);
        init_simulation(&mut resources, config);

        Ok(FireworksEngine {
            world: World::default(),
            resources: resources,
            schedule: build_schedule(),
            frame: None,
        })
    }

    /// Starts the loop by requesting the first frame. A no-op while running.
    pub fn start<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if self.frame.is_some() {
            debug!("Fireworks already running");
            return;
        }
        self.frame = Some(scheduler.request_frame());
        info!("Fireworks started");
    }

    /// Cancels the pending frame, then drops every particle and blanks the
    /// surface. Safe to call when stopped.
    pub fn stop<S: FrameScheduler>(&mut self, scheduler: &mut S) {
        if let Some(handle) = self.frame.take() {
            scheduler.cancel_frame(handle);
            info!("Fireworks stopped");
        }
        self.world.clear();
        self.canvas_mut().clear();
    }

    /// Frame callback. Ticks and requests the next frame if `handle` is the
    /// one this engine is waiting for; anything else is ignored.
    pub fn on_frame<S: FrameScheduler>(&mut self, handle: FrameHandle, scheduler: &mut S) -> bool {
        if self.frame != Some(handle) {
            warn!("Ignoring stale frame callback {:?}", handle);
            return false;
        }
        self.tick();
        self.frame = Some(scheduler.request_frame());
        true
    }

    fn tick(&mut self) {
        self.schedule.execute(&mut self.world, &mut self.resources);
    }

    /// Tracks the viewport. The surface is reallocated, which clears it.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.canvas_mut().resize(width, height);
        info!("Surface resized to {}x{}", width, height);
    }

    pub fn launch_burst(&mut self, origin: Vector2<f64>, color: Color) {
        let config = self.config();
        let burst = {
            let mut rng = self
                .resources
                .get_mut::<Pcg64>()
                .expect("rng is inserted at construction");
            create_burst(&mut *rng, origin, color, &config)
        };
        self.world.extend(burst);
    }

    pub fn is_running(&self) -> bool {
        self.frame.is_some()
    }

    pub fn particle_count(&self) -> usize {
        <&Particle>::query().iter(&self.world).count()
    }

    pub fn particles(&self) -> Vec<Particle> {
        <&Particle>::query().iter(&self.world).copied().collect()
    }

    /// Ticks executed since construction.
    pub fn frame_count(&self) -> u64 {
        self.resources
            .get::<SimulationData>()
            .expect("simulation data is inserted at construction")
            .frame
    }

    pub fn config(&self) -> SimulationConfig {
        *self
            .resources
            .get::<SimulationConfig>()
            .expect("simulation config is inserted at construction")
    }

    pub fn canvas(&self) -> impl Deref<Target = PixelCanvas> + '_ {
        self.resources
            .get::<PixelCanvas>()
            .expect("canvas is inserted at construction")
    }

    fn canvas_mut(&mut self) -> impl DerefMut<Target = PixelCanvas> + '_ {
        self.resources
            .get_mut::<PixelCanvas>()
            .expect("canvas is inserted at construction")
    }
}
