//! The 1bpp shadow framebuffer the renderer draws into
//!
//! Pixels are packed MSB first, eight per byte, rows follow each other without
//! padding. Bit `7 - x % 8` of byte `y * WIDTH / 8 + x / 8` holds pixel `(x, y)`.
use bit_field::BitField;

use crate::color::Color;
use crate::il0398::{BUFFER_LEN, HEIGHT, WIDTH};

/// Rectangle with inclusive corners, as reported by a renderer flush
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Area {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl Area {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        Area { x1, y1, x2, y2 }
    }

    /// The whole panel
    pub const fn full() -> Self {
        Area::new(0, 0, WIDTH as i32 - 1, HEIGHT as i32 - 1)
    }

    /// Number of columns, 0 for an inverted area
    pub const fn width(&self) -> u32 {
        if self.x2 < self.x1 {
            0
        } else {
            (self.x2 - self.x1 + 1) as u32
        }
    }

    /// Number of rows, 0 for an inverted area
    pub const fn height(&self) -> u32 {
        if self.y2 < self.y1 {
            0
        } else {
            (self.y2 - self.y1 + 1) as u32
        }
    }
}

/// Full frame in the panel's native layout, initially white
#[derive(Clone)]
pub struct ShadowBuffer {
    buffer: [u8; BUFFER_LEN],
}

impl Default for ShadowBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl ShadowBuffer {
    pub const fn new() -> Self {
        ShadowBuffer {
            buffer: [0xFF; BUFFER_LEN],
        }
    }

    /// The packed frame, ready to be sent with a full refresh
    pub fn buffer(&self) -> &[u8] {
        &self.buffer
    }

    /// Sets every pixel to `color`
    pub fn fill(&mut self, color: Color) {
        self.buffer.fill(color.get_byte_value());
    }

    /// Sets a single pixel. Returns false for coordinates outside of the panel.
    pub fn set_pixel(&mut self, x: i32, y: i32, color: Color) -> bool {
        match index(x, y) {
            Some((idx, bit)) => {
                self.buffer[idx].set_bit(bit, color == Color::White);
                true
            }
            None => false,
        }
    }

    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        let (idx, bit) = index(x, y)?;
        Some(if self.buffer[idx].get_bit(bit) {
            Color::White
        } else {
            Color::Black
        })
    }

    /// Thresholds a block of RGB565 pixels into the frame
    ///
    /// `pixels` holds `area` row by row. Pixels outside of the panel are skipped,
    /// a short slice leaves the remainder of the area untouched.
    pub fn blit_rgb565(&mut self, area: Area, pixels: &[u16]) {
        let width = area.width() as usize;
        if width == 0 {
            return;
        }

        for (row, line) in pixels.chunks(width).take(area.height() as usize).enumerate() {
            let y = area.y1 + row as i32;
            for (col, raw) in line.iter().enumerate() {
                self.set_pixel(area.x1 + col as i32, y, Color::from_rgb565(*raw));
            }
        }
    }
}

/// Byte index and bit number of a pixel
fn index(x: i32, y: i32) -> Option<(usize, usize)> {
    if x < 0 || y < 0 || x >= WIDTH as i32 || y >= HEIGHT as i32 {
        return None;
    }
    let (x, y) = (x as usize, y as usize);
    Some((y * (WIDTH as usize / 8) + x / 8, 7 - x % 8))
}
