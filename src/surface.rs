//! Software raster surface with the handful of 2D-context operations the
//! fireworks need: rectangle and disc fills, global alpha, and three
//! compositing modes. Pixels are stored premultiplied.

use crate::color::Color;
use rayon::prelude::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CompositeOperation {
    /// Source drawn over destination.
    SourceOver,
    /// Destination alpha reduced by the source alpha; source color ignored.
    DestinationOut,
    /// Source added to destination, saturating at 1.
    Lighter,
}

/// Premultiplied RGBA.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Pixel {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Pixel {
    pub const TRANSPARENT: Pixel = Pixel {
        r: 0.,
        g: 0.,
        b: 0.,
        a: 0.,
    };

    pub fn is_transparent(&self) -> bool {
        self.r == 0. && self.g == 0. && self.b == 0. && self.a == 0.
    }
}

fn blend(op: CompositeOperation, dst: &mut Pixel, src: Pixel) {
    match op {
        CompositeOperation::SourceOver => {
            let keep = 1. - src.a;
            dst.r = src.r + dst.r * keep;
            dst.g = src.g + dst.g * keep;
            dst.b = src.b + dst.b * keep;
            dst.a = src.a + dst.a * keep;
        }
        CompositeOperation::DestinationOut => {
            let keep = 1. - src.a;
            dst.r *= keep;
            dst.g *= keep;
            dst.b *= keep;
            dst.a *= keep;
        }
        CompositeOperation::Lighter => {
            dst.r = (dst.r + src.r).min(1.);
            dst.g = (dst.g + src.g).min(1.);
            dst.b = (dst.b + src.b).min(1.);
            dst.a = (dst.a + src.a).min(1.);
        }
    }
}

/// First and one-past-last pixel index whose centre lies in `[start, start + len)`.
fn covered_span(start: f64, len: f64, limit: u32) -> (usize, usize) {
    let first = (start - 0.5).ceil().max(0.);
    let last = (start + len - 0.5).ceil().min(limit as f64);
    if last <= first {
        return (0, 0);
    }
    (first as usize, last as usize)
}

pub struct PixelCanvas {
    width: u32,
    height: u32,
    pixels: Vec<Pixel>,
    composite: CompositeOperation,
    fill: Color,
    global_alpha: f64,
}

impl PixelCanvas {
    pub fn new(width: u32, height: u32) -> PixelCanvas {
        PixelCanvas {
            width: width,
            height: height,
            pixels: vec![Pixel::TRANSPARENT; width as usize * height as usize],
            composite: CompositeOperation::SourceOver,
            fill: Color::BLACK,
            global_alpha: 1.,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Reallocates the pixel buffer. Like a raster canvas, this drops the
    /// current contents and resets the drawing state.
    pub fn resize(&mut self, width: u32, height: u32) {
        *self = PixelCanvas::new(width, height);
    }

    pub fn composite(&self) -> CompositeOperation {
        self.composite
    }

    pub fn set_composite(&mut self, composite: CompositeOperation) {
        self.composite = composite;
    }

    pub fn set_fill(&mut self, fill: Color) {
        self.fill = fill;
    }

    pub fn global_alpha(&self) -> f64 {
        self.global_alpha
    }

    /// Values outside [0, 1] are ignored, matching the 2D canvas contract.
    pub fn set_global_alpha(&mut self, alpha: f64) {
        if (0. ..=1.).contains(&alpha) {
            self.global_alpha = alpha;
        }
    }

    fn source(&self) -> Pixel {
        let a = (self.fill.a as f64 * self.global_alpha) as f32;
        Pixel {
            r: self.fill.r * a,
            g: self.fill.g * a,
            b: self.fill.b * a,
            a: a,
        }
    }

    pub fn fill_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        let (x0, x1) = covered_span(x, w, self.width);
        let (y0, y1) = covered_span(y, h, self.height);
        if x0 == x1 || y0 == y1 {
            return;
        }
        let src = self.source();
        let op = self.composite;
        self.pixels
            .par_chunks_mut(self.width as usize)
            .enumerate()
            .filter(|(row, _)| *row >= y0 && *row < y1)
            .for_each(|(_, row)| {
                for dst in &mut row[x0..x1] {
                    blend(op, dst, src);
                }
            });
    }

    /// Fills every pixel whose centre lies within `radius` of `(cx, cy)`.
    pub fn fill_circle(&mut self, cx: f64, cy: f64, radius: f64) {
        if radius <= 0. {
            return;
        }
        let (x0, x1) = covered_span(cx - radius, 2. * radius, self.width);
        let (y0, y1) = covered_span(cy - radius, 2. * radius, self.height);
        let src = self.source();
        let r2 = radius * radius;
        for py in y0..y1 {
            let dy = py as f64 + 0.5 - cy;
            for px in x0..x1 {
                let dx = px as f64 + 0.5 - cx;
                if dx * dx + dy * dy <= r2 {
                    let index = py * self.width as usize + px;
                    blend(self.composite, &mut self.pixels[index], src);
                }
            }
        }
    }

    pub fn clear_rect(&mut self, x: f64, y: f64, w: f64, h: f64) {
        let (x0, x1) = covered_span(x, w, self.width);
        let (y0, y1) = covered_span(y, h, self.height);
        for py in y0..y1 {
            let row = py * self.width as usize;
            for pixel in &mut self.pixels[row + x0..row + x1] {
                *pixel = Pixel::TRANSPARENT;
            }
        }
    }

    pub fn clear(&mut self) {
        for pixel in self.pixels.iter_mut() {
            *pixel = Pixel::TRANSPARENT;
        }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Pixel> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.pixels[(y * self.width + x) as usize])
    }

    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(Pixel::is_transparent)
    }

    /// Writes the surface composited over black as packed RGB24 rows.
    pub fn write_rgb24(&self, out: &mut [u8], pitch: usize) {
        let width = self.width as usize;
        if width == 0 {
            return;
        }
        out.par_chunks_mut(pitch)
            .zip(self.pixels.par_chunks(width))
            .for_each(|(dst_row, src_row)| {
                for (dst, src) in dst_row.chunks_exact_mut(3).zip(src_row) {
                    dst[0] = (src.r * 255.).round() as u8;
                    dst[1] = (src.g * 255.).round() as u8;
                    dst[2] = (src.b * 255.).round() as u8;
                }
            });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn new_canvas_is_blank() {
        let canvas = PixelCanvas::new(4, 3);
        assert!(canvas.is_blank());
        assert_eq!(canvas.pixel(3, 2), Some(Pixel::TRANSPARENT));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn destination_out_fades_existing_content() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.set_fill(Color::rgb(1., 0.5, 0.));
        canvas.fill_rect(0., 0., 2., 2.);

        canvas.set_composite(CompositeOperation::DestinationOut);
        canvas.set_fill(Color::rgba(0., 0., 0., 0.1));
        canvas.fill_rect(0., 0., 2., 2.);

        let p = canvas.pixel(1, 1).unwrap();
        assert!(approx(p.r, 0.9));
        assert!(approx(p.g, 0.45));
        assert!(approx(p.b, 0.));
        assert!(approx(p.a, 0.9));
    }

    #[test]
    fn repeated_fading_approaches_blank() {
        let mut canvas = PixelCanvas::new(1, 1);
        canvas.set_fill(Color::rgb(1., 1., 1.));
        canvas.fill_rect(0., 0., 1., 1.);
        canvas.set_composite(CompositeOperation::DestinationOut);
        canvas.set_fill(Color::rgba(0., 0., 0., 0.1));
        for _ in 0..200 {
            canvas.fill_rect(0., 0., 1., 1.);
        }
        assert!(canvas.pixel(0, 0).unwrap().a < 1e-6);
    }

    #[test]
    fn lighter_adds_and_saturates() {
        let mut canvas = PixelCanvas::new(1, 1);
        canvas.set_composite(CompositeOperation::Lighter);
        canvas.set_fill(Color::rgb(0.6, 0.2, 0.));
        canvas.set_global_alpha(0.5);
        canvas.fill_rect(0., 0., 1., 1.);
        let p = canvas.pixel(0, 0).unwrap();
        assert!(approx(p.r, 0.3) && approx(p.g, 0.1) && approx(p.a, 0.5));

        canvas.set_global_alpha(1.);
        canvas.fill_rect(0., 0., 1., 1.);
        canvas.fill_rect(0., 0., 1., 1.);
        let p = canvas.pixel(0, 0).unwrap();
        assert!(approx(p.r, 1.));
        assert!(approx(p.a, 1.));
    }

    #[test]
    fn global_alpha_out_of_range_is_ignored() {
        let mut canvas = PixelCanvas::new(1, 1);
        canvas.set_global_alpha(0.4);
        canvas.set_global_alpha(-0.2);
        canvas.set_global_alpha(f64::NAN);
        assert_eq!(canvas.global_alpha(), 0.4);
    }

    #[test]
    fn circle_covers_pixel_centres_within_radius() {
        let mut canvas = PixelCanvas::new(10, 10);
        canvas.set_fill(Color::rgb(1., 1., 1.));
        canvas.fill_circle(5., 5., 2.);
        assert!(!canvas.pixel(4, 4).unwrap().is_transparent());
        assert!(!canvas.pixel(5, 6).unwrap().is_transparent());
        assert!(canvas.pixel(2, 5).unwrap().is_transparent());
        assert!(canvas.pixel(7, 7).unwrap().is_transparent());
        assert!(canvas.pixel(0, 0).unwrap().is_transparent());
    }

    #[test]
    fn circle_outside_surface_is_clipped() {
        let mut canvas = PixelCanvas::new(4, 4);
        canvas.set_fill(Color::rgb(1., 1., 1.));
        canvas.fill_circle(-10., 2., 2.);
        canvas.fill_circle(2., 50., 2.);
        assert!(canvas.is_blank());
        canvas.fill_circle(0., 0., 2.);
        assert!(!canvas.pixel(0, 0).unwrap().is_transparent());
    }

    #[test]
    fn resize_clears_and_resets_state() {
        let mut canvas = PixelCanvas::new(3, 3);
        canvas.set_composite(CompositeOperation::Lighter);
        canvas.set_fill(Color::rgb(1., 0., 0.));
        canvas.fill_rect(0., 0., 3., 3.);
        canvas.resize(5, 2);
        assert_eq!((canvas.width(), canvas.height()), (5, 2));
        assert!(canvas.is_blank());
        assert_eq!(canvas.composite(), CompositeOperation::SourceOver);
    }

    #[test]
    fn zero_sized_surface_ignores_draws() {
        let mut canvas = PixelCanvas::new(0, 0);
        canvas.fill_rect(0., 0., 10., 10.);
        canvas.fill_circle(1., 1., 2.);
        canvas.clear_rect(0., 0., 10., 10.);
        assert!(canvas.is_blank());
    }

    #[test]
    fn clear_rect_only_touches_its_area() {
        let mut canvas = PixelCanvas::new(4, 1);
        canvas.set_fill(Color::rgb(1., 1., 1.));
        canvas.fill_rect(0., 0., 4., 1.);
        canvas.clear_rect(0., 0., 2., 1.);
        assert!(canvas.pixel(1, 0).unwrap().is_transparent());
        assert!(!canvas.pixel(2, 0).unwrap().is_transparent());
        canvas.clear();
        assert!(canvas.is_blank());
    }

    #[test]
    fn rgb24_export_respects_pitch() {
        let mut canvas = PixelCanvas::new(2, 2);
        canvas.set_fill(Color::rgb(1., 0., 0.));
        canvas.fill_rect(1., 1., 1., 1.);
        let pitch = 8;
        let mut out = vec![7u8; pitch * 2];
        canvas.write_rgb24(&mut out, pitch);
        assert_eq!(&out[0..6], &[0, 0, 0, 0, 0, 0]);
        assert_eq!(&out[6..8], &[7, 7]);
        assert_eq!(&out[pitch + 3..pitch + 6], &[255, 0, 0]);
    }
}
