use crate::types::{Bounds, Rgb, Vec2};

/// Horizontal world pixels covered by one terminal cell.
pub const CELL_WIDTH_PX: f64 = 8.0;
/// Vertical world pixels covered by one terminal cell.
pub const CELL_HEIGHT_PX: f64 = 16.0;

/// Added to a body's colour at its highlight.
const HIGHLIGHT_BOOST: u8 = 100;
const BACKGROUND: Rgb = Rgb { r: 0, g: 0, b: 0 };

/// Sink for the circles the world produces each tick.
pub trait Renderer {
    /// A filled disc shaded from a highlight towards its base colour.
    fn draw_gradient_circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64);

    /// An outlined ring.
    fn draw_stroked_circle(&mut self, center: Vec2, radius: f64, stroke: Rgb, alpha: f64, width: f64);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub width: u16,
    pub height: u16,
}

impl Viewport {
    /// World rectangle shown by this many cells.
    pub fn world_bounds(self) -> Bounds {
        Bounds::new(
            f64::from(self.width) * CELL_WIDTH_PX,
            f64::from(self.height) * CELL_HEIGHT_PX,
        )
    }

    /// World position of the centre of a cell.
    pub fn cell_center(self, col: u16, row: u16) -> Vec2 {
        Vec2::new(
            (f64::from(col) + 0.5) * CELL_WIDTH_PX,
            (f64::from(row) + 0.5) * CELL_HEIGHT_PX,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RenderCell {
    pub ch: char,
    pub color: Rgb,
    depth: f64,
}

const EMPTY_CELL: RenderCell = RenderCell {
    ch: ' ',
    color: BACKGROUND,
    depth: f64::NEG_INFINITY,
};

/// Character grid the terminal front-end blits. Overlapping shapes resolve
/// by depth: larger bodies cover smaller ones, bodies cover rings.
#[derive(Debug)]
pub struct FrameBuffer {
    width: u16,
    height: u16,
    cells: Vec<RenderCell>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let mut buffer = Self {
            width,
            height,
            cells: Vec::new(),
        };
        buffer.resize(width, height);
        buffer
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        self.width = width;
        self.height = height;
        let len = (width as usize).saturating_mul(height as usize);
        if self.cells.len() != len {
            self.cells.resize(len, EMPTY_CELL);
        }
        self.clear();
    }

    pub fn clear(&mut self) {
        self.cells.fill(EMPTY_CELL);
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn viewport(&self) -> Viewport {
        Viewport {
            width: self.width,
            height: self.height,
        }
    }

    pub fn get(&self, x: u16, y: u16) -> RenderCell {
        debug_assert!(x < self.width && y < self.height, "get() out of bounds");
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        self.cells[idx]
    }

    fn set(&mut self, x: u16, y: u16, ch: char, depth: f64, color: Rgb) {
        if x >= self.width || y >= self.height {
            return;
        }
        let idx = (y as usize) * (self.width as usize) + (x as usize);
        let cell = &mut self.cells[idx];
        if depth >= cell.depth {
            cell.depth = depth;
            cell.ch = ch;
            cell.color = color;
        }
    }

    /// Cells whose centres lie within `reach` of `center`, with the distance
    /// to each.
    fn cells_near(&self, center: Vec2, reach: f64) -> Vec<(u16, u16, f64)> {
        if self.width == 0 || self.height == 0 {
            return Vec::new();
        }
        let col_span = |v: f64| (v / CELL_WIDTH_PX).floor();
        let row_span = |v: f64| (v / CELL_HEIGHT_PX).floor();
        let max_col = f64::from(self.width - 1);
        let max_row = f64::from(self.height - 1);
        let c0 = col_span(center.x - reach).clamp(0.0, max_col) as u16;
        let c1 = col_span(center.x + reach).clamp(0.0, max_col) as u16;
        let r0 = row_span(center.y - reach).clamp(0.0, max_row) as u16;
        let r1 = row_span(center.y + reach).clamp(0.0, max_row) as u16;

        let viewport = self.viewport();
        let mut out = Vec::new();
        for row in r0..=r1 {
            for col in c0..=c1 {
                let distance = viewport.cell_center(col, row).distance(center);
                if distance <= reach {
                    out.push((col, row, distance));
                }
            }
        }
        out
    }

    fn cell_of(&self, pos: Vec2) -> Option<(u16, u16)> {
        let col = (pos.x / CELL_WIDTH_PX).floor();
        let row = (pos.y / CELL_HEIGHT_PX).floor();
        if col < 0.0 || row < 0.0 || col >= f64::from(self.width) || row >= f64::from(self.height) {
            return None;
        }
        Some((col as u16, row as u16))
    }
}

impl Renderer for FrameBuffer {
    fn draw_gradient_circle(&mut self, center: Vec2, radius: f64, color: Rgb, alpha: f64) {
        if alpha <= 0.0 {
            return;
        }
        // Highlight sits up and to the left, fading out over 4/3 of a radius.
        let offset = radius * 0.33;
        let highlight = Vec2::new(center.x - offset, center.y - offset);
        let bright = color.lighten(HIGHLIGHT_BOOST);
        let mut cells = self.cells_near(center, radius);
        if cells.is_empty() {
            // Sub-cell bodies still occupy the cell they sit in.
            if let Some((col, row)) = self.cell_of(center) {
                cells.push((col, row, 0.0));
            }
        }
        for (col, row, _) in cells {
            let spot = self.viewport().cell_center(col, row);
            let t = ((spot.distance(highlight) - offset) / (radius * 1.33)).clamp(0.0, 1.0);
            let ch = if t < 0.33 {
                '█'
            } else if t < 0.66 {
                '▓'
            } else {
                '▒'
            };
            self.set(col, row, ch, radius, bright.blend(color, t));
        }
    }

    fn draw_stroked_circle(&mut self, center: Vec2, radius: f64, stroke: Rgb, alpha: f64, width: f64) {
        if alpha <= 0.0 {
            return;
        }
        let half = (width / 2.0).max(CELL_WIDTH_PX / 2.0);
        let ch = if alpha > 0.2 {
            'o'
        } else if alpha > 0.05 {
            '·'
        } else {
            '.'
        };
        let dimmed = BACKGROUND.blend(stroke, alpha.sqrt().min(1.0));
        for (col, row, distance) in self.cells_near(center, radius + half) {
            if (distance - radius).abs() <= half {
                // Rings always sit under bodies.
                self.set(col, row, ch, -1.0 / (1.0 + radius), dimmed);
            }
        }
    }
}
