use legion::systems::CommandBuffer;
use legion::world::SubWorld;
use legion::*;

use crate::{particle::Particle, simulation::SimulationConfig};

#[system(par_for_each)]
pub fn advance_particles(particle: &mut Particle, #[resource] config: &SimulationConfig) {
    advance_single_particle(particle, config);
}

pub fn advance_single_particle(particle: &mut Particle, config: &SimulationConfig) {
    particle.position += particle.velocity;
    particle.velocity.y += config.gravity;
    particle.alpha -= config.decay;
}

// Removal is deferred to the command buffer flush, so iteration never skips.
#[system]
#[read_component(Particle)]
pub fn prune_particles(world: &mut SubWorld, commands: &mut CommandBuffer) {
    for (entity, particle) in <(Entity, &Particle)>::query().iter(world) {
        if particle.is_exhausted() {
            commands.remove(*entity);
        }
    }
}
