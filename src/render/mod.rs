use crate::{
    color::Color,
    particle::Particle,
    simulation::SimulationConfig,
    surface::{CompositeOperation, PixelCanvas},
};
use legion::IntoQuery;
use legion::{system, world::SubWorld};
use serde::Deserialize;

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub title: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            width: 800,
            height: 600,
            vsync: true,
            title: "Fireworks".to_string(),
        }
    }
}

/// Erases a fraction of what is already drawn, then leaves the surface in
/// additive mode for the particle pass.
#[system]
pub fn fade_surface(
    #[resource] canvas: &mut PixelCanvas,
    #[resource] config: &SimulationConfig,
) {
    canvas.set_composite(CompositeOperation::DestinationOut);
    canvas.set_global_alpha(1.);
    canvas.set_fill(Color::rgba(0., 0., 0., config.fade_alpha as f32));
    let (width, height) = (canvas.width() as f64, canvas.height() as f64);
    canvas.fill_rect(0., 0., width, height);
    canvas.set_composite(CompositeOperation::Lighter);
}

#[system]
#[read_component(Particle)]
pub fn render_particles(
    world: &mut SubWorld,
    #[resource] canvas: &mut PixelCanvas,
    #[resource] config: &SimulationConfig,
) {
    for particle in <&Particle>::query().iter(world) {
        if particle.is_exhausted() {
            continue;
        }
        canvas.set_fill(particle.color);
        canvas.set_global_alpha(particle.alpha.min(1.));
        canvas.fill_circle(
            particle.position.x,
            particle.position.y,
            config.particle_radius,
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use legion::{Resources, Schedule, World};
    use nalgebra::Vector2;

    fn resources_with_canvas(width: u32, height: u32) -> Resources {
        let mut resources = Resources::default();
        resources.insert(PixelCanvas::new(width, height));
        resources.insert(SimulationConfig::default());
        resources
    }

    #[test]
    fn fade_leaves_additive_mode() {
        let mut world = World::default();
        let mut resources = resources_with_canvas(4, 4);
        let mut schedule = Schedule::builder()
            .add_system(fade_surface_system())
            .build();
        schedule.execute(&mut world, &mut resources);
        let canvas = resources.get::<PixelCanvas>().unwrap();
        assert_eq!(canvas.composite(), CompositeOperation::Lighter);
        assert!(canvas.is_blank());
    }

    #[test]
    fn particles_draw_with_their_alpha() {
        let mut world = World::default();
        let mut resources = resources_with_canvas(20, 20);
        let mut particle = Particle::new(
            Vector2::new(10., 10.),
            Vector2::zeros(),
            Color::rgb(1., 0., 0.),
        );
        particle.alpha = 0.5;
        let mut spent = particle;
        spent.position = Vector2::new(3., 3.);
        spent.alpha = -0.01;
        world.extend(vec![(particle,), (spent,)]);

        let mut schedule = Schedule::builder()
            .add_system(fade_surface_system())
            .add_thread_local(render_particles_system())
            .build();
        schedule.execute(&mut world, &mut resources);

        let canvas = resources.get::<PixelCanvas>().unwrap();
        let centre = canvas.pixel(10, 10).unwrap();
        assert!((centre.r - 0.5).abs() < 1e-6);
        assert!((centre.a - 0.5).abs() < 1e-6);
        assert_eq!(centre.g, 0.);
        assert!(canvas.pixel(3, 3).unwrap().is_transparent());
        assert!(canvas.pixel(15, 15).unwrap().is_transparent());
    }

    #[test]
    fn overlapping_particles_brighten() {
        let mut world = World::default();
        let mut resources = resources_with_canvas(8, 8);
        let particle = Particle::new(
            Vector2::new(4., 4.),
            Vector2::zeros(),
            Color::rgb(0.25, 0.25, 0.25),
        );
        world.extend(vec![(particle,), (particle,)]);
        let mut schedule = Schedule::builder()
            .add_system(fade_surface_system())
            .add_thread_local(render_particles_system())
            .build();
        schedule.execute(&mut world, &mut resources);
        let canvas = resources.get::<PixelCanvas>().unwrap();
        assert!((canvas.pixel(4, 4).unwrap().r - 0.5).abs() < 1e-6);
    }
}
