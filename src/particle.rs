use crate::color::Color;
use nalgebra::Vector2;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Particle {
    pub position: Vector2<f64>,
    pub velocity: Vector2<f64>,
    /// Opacity and remaining life. Starts at 1 and only decreases.
    pub alpha: f64,
    pub color: Color,
}

impl Particle {
    pub fn new(position: Vector2<f64>, velocity: Vector2<f64>, color: Color) -> Particle {
        Particle {
            position: position,
            velocity: velocity,
            alpha: 1.,
            color: color,
        }
    }

    pub fn is_exhausted(&self) -> bool {
        self.alpha <= 0.
    }
}
