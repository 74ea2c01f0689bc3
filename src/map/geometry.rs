use crate::braille::BrailleCanvas;
use glam::DVec2;

/// Pixels along a segment, Bresenham order, both endpoints included
pub struct Bresenham {
    x: i32,
    y: i32,
    x1: i32,
    y1: i32,
    dx: i32,
    dy: i32,
    sx: i32,
    sy: i32,
    err: i32,
    done: bool,
}

impl Bresenham {
    pub fn new(x0: i32, y0: i32, x1: i32, y1: i32) -> Self {
        let dx = (x1 - x0).abs();
        let dy = -(y1 - y0).abs();
        Self {
            x: x0,
            y: y0,
            x1,
            y1,
            dx,
            dy,
            sx: if x0 < x1 { 1 } else { -1 },
            sy: if y0 < y1 { 1 } else { -1 },
            err: dx + dy,
            done: false,
        }
    }
}

impl Iterator for Bresenham {
    type Item = (i32, i32);

    fn next(&mut self) -> Option<(i32, i32)> {
        if self.done {
            return None;
        }
        let current = (self.x, self.y);
        if self.x == self.x1 && self.y == self.y1 {
            self.done = true;
            return Some(current);
        }

        let e2 = 2 * self.err;
        if e2 >= self.dy {
            self.err += self.dy;
            self.x += self.sx;
        }
        if e2 <= self.dx {
            self.err += self.dx;
            self.y += self.sy;
        }
        Some(current)
    }
}

/// Draw a solid line
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    for (x, y) in Bresenham::new(x0, y0, x1, y1) {
        canvas.set_pixel(x, y);
    }
}

/// On/off run lengths for dashed strokes, in pixels
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Dash {
    pub on: u32,
    pub off: u32,
}

impl Dash {
    /// Route stroke: 5 on, 10 off
    pub const ROUTE: Dash = Dash { on: 5, off: 10 };
}

/// Draw a dashed line; `phase` carries the pattern position across segments
pub fn draw_dashed_line(
    canvas: &mut BrailleCanvas,
    (x0, y0): (i32, i32),
    (x1, y1): (i32, i32),
    dash: Dash,
    phase: &mut u32,
) {
    let period = (dash.on + dash.off).max(1);
    for (x, y) in Bresenham::new(x0, y0, x1, y1) {
        if *phase < dash.on {
            canvas.set_pixel(x, y);
        }
        *phase = (*phase + 1) % period;
    }
}

/// Clip segment `a`-`b` to the rectangle `[0, w] x [0, h]` (Liang-Barsky).
///
/// Returns the parameter range `(t0, t1)` of the part inside, if any.
pub fn clip_segment(a: DVec2, b: DVec2, w: f64, h: f64) -> Option<(f64, f64)> {
    let d = b - a;
    let (mut t0, mut t1) = (0.0, 1.0);

    for (p, q) in [(-d.x, a.x), (d.x, w - a.x), (-d.y, a.y), (d.y, h - a.y)] {
        if p == 0.0 {
            // parallel to this edge
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = f64::max(t0, r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = f64::min(t1, r);
        }
    }

    Some((t0, t1))
}

/// Visible part of a segment in canvas pixels, plus the pixels cut off each end
fn clip_to_canvas(canvas: &BrailleCanvas, a: DVec2, b: DVec2) -> Option<((i32, i32), (i32, i32), f64, f64)> {
    let w = (canvas.width() * 2) as f64 - 1.0;
    let h = (canvas.height() * 4) as f64 - 1.0;
    if w < 0.0 || h < 0.0 {
        return None;
    }

    let (t0, t1) = clip_segment(a, b, w, h)?;
    let d = b - a;
    let len = d.x.abs().max(d.y.abs());
    let p0 = (a + d * t0).round();
    let p1 = (a + d * t1).round();

    Some((
        (p0.x as i32, p0.y as i32),
        (p1.x as i32, p1.y as i32),
        (len * t0).round(),
        (len * (1.0 - t1)).round(),
    ))
}

/// Draw a solid line of any length, walking only its visible part
pub fn draw_clipped_line(canvas: &mut BrailleCanvas, a: DVec2, b: DVec2) {
    if let Some((p0, p1, _, _)) = clip_to_canvas(canvas, a, b) {
        draw_line(canvas, p0.0, p0.1, p1.0, p1.1);
    }
}

/// Draw a dashed line of any length, walking only its visible part.
///
/// `phase` advances over the hidden parts too, so dashes line up with
/// what an unclipped stroke would have drawn.
pub fn draw_clipped_dashed_line(
    canvas: &mut BrailleCanvas,
    a: DVec2,
    b: DVec2,
    dash: Dash,
    phase: &mut u32,
) {
    let period = (dash.on + dash.off).max(1);
    let advance = |phase: &mut u32, pixels: f64| {
        let step = (pixels.max(0.0) % period as f64) as u32;
        *phase = (*phase + step) % period;
    };

    match clip_to_canvas(canvas, a, b) {
        Some((p0, p1, before, after)) => {
            advance(phase, before);
            draw_dashed_line(canvas, p0, p1, dash, phase);
            advance(phase, after);
        }
        None => {
            let d = b - a;
            advance(phase, d.x.abs().max(d.y.abs()).round() + 1.0);
        }
    }
}

/// Draw a filled circle (for marker dots)
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    for dy in -radius..=radius {
        for dx in -radius..=radius {
            if dx * dx + dy * dy <= radius * radius {
                canvas.set_pixel(cx + dx, cy + dy);
            }
        }
    }
}
