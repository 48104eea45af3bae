use crate::config::ConfigError;
use legion::*;
use log::debug;
use serde::Deserialize;
use std::time::{SystemTime, UNIX_EPOCH};

#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Added to the vertical velocity every frame.
    pub gravity: f64,
    /// Subtracted from alpha every frame.
    pub decay: f64,
    /// Chance per frame of a new burst.
    pub spawn_probability: f64,
    pub burst_size: usize,
    /// Each velocity component is drawn from `[-burst_speed / 2, burst_speed / 2)`.
    pub burst_speed: f64,
    pub particle_radius: f64,
    /// Alpha of the erase pass that leaves the fading trails.
    pub fade_alpha: f64,
    pub seed: Option<u64>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        SimulationConfig {
            gravity: 0.05,
            decay: 0.01,
            spawn_probability: 0.05,
            burst_size: 100,
            burst_speed: 10.,
            particle_radius: 2.,
            fade_alpha: 0.1,
            seed: None,
        }
    }
}

fn check(ok: bool, message: &str) -> Result<(), ConfigError> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid(message.to_string()))
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        check(self.gravity.is_finite(), "gravity must be finite")?;
        check(
            self.decay.is_finite() && self.decay > 0.,
            "decay must be positive",
        )?;
        check(
            (0. ..=1.).contains(&self.spawn_probability),
            "spawn_probability must be within [0, 1]",
        )?;
        check(self.burst_size > 0, "burst_size must be positive")?;
        check(
            self.burst_speed.is_finite() && self.burst_speed >= 0.,
            "burst_speed must be non-negative",
        )?;
        check(
            self.particle_radius.is_finite() && self.particle_radius > 0.,
            "particle_radius must be positive",
        )?;
        check(
            self.fade_alpha > 0. && self.fade_alpha <= 1.,
            "fade_alpha must be within (0, 1]",
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimulationData {
    /// Ticks executed since the engine was built.
    pub frame: u64,
    pub last_simulated: i64,
}

pub fn now_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as i64)
        .unwrap_or(0)
}

pub fn init_simulation(resources: &mut Resources, simulation_config: SimulationConfig) {
    resources.insert(SimulationData {
        frame: 0,
        last_simulated: now_millis(),
    });
    resources.insert(simulation_config);
}

#[system]
pub fn advance_time(#[resource] simulation_data: &mut SimulationData) {
    simulation_data.frame += 1;
    let current_time = now_millis();
    debug!(
        "Frame {} time: {}",
        simulation_data.frame,
        current_time - simulation_data.last_simulated
    );
    simulation_data.last_simulated = current_time;
}
