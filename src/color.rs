/// Straight (not premultiplied) RGBA color with channels in [0, 1].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0., 0., 0.);
    pub const TRANSPARENT: Color = Color::rgba(0., 0., 0., 0.);

    pub const fn rgb(r: f32, g: f32, b: f32) -> Color {
        Color { r, g, b, a: 1. }
    }

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Color {
        Color { r, g, b, a }
    }

    /// `hue` in degrees (any value, wrapped), saturation and lightness in [0, 1].
    pub fn from_hsl(hue: f64, saturation: f64, lightness: f64) -> Color {
        let s = saturation.max(0.).min(1.);
        let l = lightness.max(0.).min(1.);
        let chroma = (1. - (2. * l - 1.).abs()) * s;
        let sector = hue.rem_euclid(360.) / 60.;
        let x = chroma * (1. - (sector % 2. - 1.).abs());
        let (r, g, b) = match sector as u32 {
            0 => (chroma, x, 0.),
            1 => (x, chroma, 0.),
            2 => (0., chroma, x),
            3 => (0., x, chroma),
            4 => (x, 0., chroma),
            _ => (chroma, 0., x),
        };
        let m = l - chroma / 2.;
        Color::rgb((r + m) as f32, (g + m) as f32, (b + m) as f32)
    }
}
