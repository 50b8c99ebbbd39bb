//! Braille dot canvas.
//!
//! Drawing happens on a grid of 2x4 dots per terminal cell; blitting packs
//! each cell's dots into a U+2800-block glyph. Every dot carries an
//! intensity tier and a cell takes the strongest tier among its lit dots.

use crate::colors;
use crate::terminal::Terminal;
use std::f64::consts::TAU;

pub const DOTS_PER_CELL_X: usize = 2;
pub const DOTS_PER_CELL_Y: usize = 4;

/// Braille dot offsets within a cell, in bit order of the Unicode block.
const DOT_OFFSETS: [(usize, usize); 8] = [
    (0, 0),
    (1, 0),
    (2, 0),
    (0, 1),
    (1, 1),
    (2, 1),
    (3, 0),
    (3, 1),
];

pub struct BrailleCanvas {
    width: usize,
    height: usize,
    dots: Vec<Vec<u8>>,
}

impl BrailleCanvas {
    /// Canvas covering `cell_width` x `cell_height` terminal cells.
    pub fn new(cell_width: u16, cell_height: u16) -> Self {
        let width = cell_width as usize * DOTS_PER_CELL_X;
        let height = cell_height as usize * DOTS_PER_CELL_Y;
        BrailleCanvas {
            width,
            height,
            dots: vec![vec![0u8; width]; height],
        }
    }

    pub fn resize(&mut self, cell_width: u16, cell_height: u16) {
        *self = BrailleCanvas::new(cell_width, cell_height);
    }

    pub fn clear(&mut self) {
        for row in &mut self.dots {
            row.fill(0);
        }
    }

    /// Width in dots.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in dots.
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tier_at(&self, x: usize, y: usize) -> u8 {
        if x < self.width && y < self.height {
            self.dots[y][x]
        } else {
            0
        }
    }

    /// Light the nearest dot. Out-of-range and non-finite coordinates are
    /// dropped; overlapping writes keep the strongest tier.
    pub fn dot(&mut self, x: f64, y: f64, tier: u8) {
        if !x.is_finite() || !y.is_finite() {
            return;
        }
        self.plot(x.round() as i64, y.round() as i64, tier);
    }

    fn plot(&mut self, x: i64, y: i64, tier: u8) {
        if x < 0 || y < 0 || x >= self.width as i64 || y >= self.height as i64 {
            return;
        }
        let cell = &mut self.dots[y as usize][x as usize];
        *cell = (*cell).max(tier);
    }

    /// Straight dot run between two points (Bresenham).
    pub fn segment(&mut self, x0: f64, y0: f64, x1: f64, y1: f64, tier: u8) {
        if !(x0.is_finite() && y0.is_finite() && x1.is_finite() && y1.is_finite()) {
            return;
        }
        let mut bx0 = x0.round() as i64;
        let mut by0 = y0.round() as i64;
        let bx1 = x1.round() as i64;
        let by1 = y1.round() as i64;

        let dx = (bx1 - bx0).abs();
        let dy = -(by1 - by0).abs();
        let sx = if bx0 < bx1 { 1 } else { -1 };
        let sy = if by0 < by1 { 1 } else { -1 };
        let mut err = dx + dy;

        loop {
            self.plot(bx0, by0, tier);
            if bx0 == bx1 && by0 == by1 {
                break;
            }
            let e2 = 2 * err;
            if e2 >= dy {
                err += dy;
                bx0 += sx;
            }
            if e2 <= dx {
                err += dx;
                by0 += sy;
            }
        }
    }

    /// Draw connected segments through the points; a `None` lifts the pen
    /// and starts a new subpath.
    pub fn polyline<I>(&mut self, points: I, tier: u8)
    where
        I: IntoIterator<Item = Option<(f64, f64)>>,
    {
        let mut prev: Option<(f64, f64)> = None;
        for point in points {
            match (prev, point) {
                (Some((px, py)), Some((x, y))) => self.segment(px, py, x, y, tier),
                (None, Some((x, y))) => self.dot(x, y, tier),
                _ => {}
            }
            prev = point;
        }
    }

    /// Circle outline, sampled densely enough to leave no gaps.
    pub fn circle(&mut self, cx: f64, cy: f64, radius: f64, tier: u8) {
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) || radius <= 0.0 {
            return;
        }
        let steps = ((TAU * radius).ceil() as usize).max(8) * 2;
        for i in 0..steps {
            let a = TAU * i as f64 / steps as f64;
            self.dot(cx + radius * a.cos(), cy + radius * a.sin(), tier);
        }
    }

    /// Filled circle.
    pub fn disc(&mut self, cx: f64, cy: f64, radius: f64, tier: u8) {
        if !(cx.is_finite() && cy.is_finite() && radius.is_finite()) || radius <= 0.0 {
            return;
        }
        let r2 = radius * radius;
        let y_min = (cy - radius).floor() as i64;
        let y_max = (cy + radius).ceil() as i64;
        let x_min = (cx - radius).floor() as i64;
        let x_max = (cx + radius).ceil() as i64;
        for y in y_min..=y_max {
            for x in x_min..=x_max {
                let dx = x as f64 - cx;
                let dy = y as f64 - cy;
                if dx * dx + dy * dy <= r2 {
                    self.plot(x, y, tier);
                }
            }
        }
    }

    /// Pack one cell's dots into a braille glyph plus its strongest tier.
    pub fn cell_glyph(&self, cell_x: usize, cell_y: usize) -> Option<(char, u8)> {
        let mut pattern = 0u32;
        let mut tier = 0u8;
        for (bit, (dy, dx)) in DOT_OFFSETS.iter().enumerate() {
            let y = cell_y * DOTS_PER_CELL_Y + dy;
            let x = cell_x * DOTS_PER_CELL_X + dx;
            if y < self.height && x < self.width && self.dots[y][x] > 0 {
                pattern |= 1 << bit;
                tier = tier.max(self.dots[y][x]);
            }
        }
        if pattern == 0 {
            return None;
        }
        char::from_u32(0x2800 + pattern).map(|ch| (ch, tier))
    }

    /// Write every non-empty cell into the terminal buffer, colored by the
    /// active scheme.
    pub fn blit(&self, term: &mut Terminal, scheme: u8) {
        let (cols, rows) = term.size();
        for cell_y in 0..rows as usize {
            for cell_x in 0..cols as usize {
                if let Some((ch, tier)) = self.cell_glyph(cell_x, cell_y) {
                    let (color, bold) = colors::globe_color(scheme, tier);
                    term.set(cell_x as i32, cell_y as i32, ch, Some(color), bold);
                }
            }
        }
    }
}
