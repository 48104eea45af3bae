use crate::{
    color::Color, particle::Particle, simulation::SimulationConfig, surface::PixelCanvas,
};
use legion::systems::CommandBuffer;
use legion::*;
use log::debug;
use nalgebra::Vector2;
use rand::Rng;
use rand_pcg::Pcg64;

/// Somewhere across the full width and the upper half of the surface.
pub fn random_origin<R: Rng>(rng: &mut R, width: u32, height: u32) -> Vector2<f64> {
    let x = rng.gen::<f64>() * width as f64;
    let y = rng.gen::<f64>() * height as f64 / 2.;
    Vector2::new(x, y)
}

pub fn random_burst_color<R: Rng>(rng: &mut R) -> Color {
    Color::from_hsl(rng.gen::<f64>() * 360., 1., 0.5)
}

/// `config.burst_size` particles at `origin`, all sharing `color`.
pub fn create_burst<R: Rng>(
    rng: &mut R,
    origin: Vector2<f64>,
    color: Color,
    config: &SimulationConfig,
) -> Vec<(Particle,)> {
    let mut particles = Vec::<(Particle,)>::new();
    particles.reserve(config.burst_size);
    while particles.len() < config.burst_size {
        let velocity = Vector2::new(
            (rng.gen::<f64>() - 0.5) * config.burst_speed,
            (rng.gen::<f64>() - 0.5) * config.burst_speed,
        );
        particles.push((Particle::new(origin, velocity, color),));
    }
    particles
}

#[system]
pub fn spawn_bursts(
    commands: &mut CommandBuffer,
    #[resource] rng: &mut Pcg64,
    #[resource] config: &SimulationConfig,
    #[resource] canvas: &PixelCanvas,
) {
    if rng.gen::<f64>() >= config.spawn_probability {
        return;
    }
    let origin = random_origin(rng, canvas.width(), canvas.height());
    let color = random_burst_color(rng);
    debug!("Burst at ({:.1}, {:.1})", origin.x, origin.y);
    for particle in create_burst(rng, origin, color, config) {
        commands.push(particle);
    }
}
