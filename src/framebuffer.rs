//! Output surfaces consuming coverage runs
use crate::{Rect, Rgb565, color::multiply_u8};
use std::io::Write;

/// Destination of rendered coverage
///
/// `stamp` composites `color` into `rect` (always a single row here), using
/// one coverage byte per pixel of the rect and a global alpha applied on top.
/// Callers guarantee the rect lies inside `width x height`.
pub trait Framebuffer {
    fn width(&self) -> usize;

    fn height(&self) -> usize;

    fn stamp(&mut self, color: Rgb565, coverage: &[u8], rect: Rect, alpha: u8);
}

/// Row-major RGB565 pixel buffer
#[derive(Clone)]
pub struct Rgb565Buffer {
    width: usize,
    height: usize,
    data: Vec<Rgb565>,
}

impl Rgb565Buffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![Rgb565::BLACK; width * height],
        }
    }

    /// Fill the whole buffer with `color`
    pub fn clear(&mut self, color: Rgb565) {
        self.data.fill(color);
    }

    pub fn pixel(&self, x: usize, y: usize) -> Option<Rgb565> {
        if x >= self.width || y >= self.height {
            return None;
        }
        Some(self.data[y * self.width + x])
    }

    pub fn data(&self) -> &[Rgb565] {
        &self.data
    }

    /// Raw pixels in native byte order
    pub fn as_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.data)
    }

    /// Write binary PPM (P6) image, channels expanded to 8 bits
    pub fn write_ppm(&self, mut out: impl Write) -> std::io::Result<()> {
        write!(out, "P6 {} {} 255 ", self.width, self.height)?;
        let mut row = Vec::with_capacity(self.width * 3);
        for line in self.data.chunks(self.width.max(1)) {
            row.clear();
            for color in line {
                row.extend_from_slice(&color.to_rgb());
            }
            out.write_all(&row)?;
        }
        Ok(())
    }
}

impl Framebuffer for Rgb565Buffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn stamp(&mut self, color: Rgb565, coverage: &[u8], rect: Rect, alpha: u8) {
        let x0 = (rect.x0.max(0) as usize).min(self.width);
        let x1 = (rect.x1.max(0) as usize).clamp(x0, self.width);
        for y in rect.y0.max(0) as usize..(rect.y1.max(0) as usize).min(self.height) {
            let offset = y * self.width;
            let row = &mut self.data[offset + x0..offset + x1];
            for (pixel, cover) in row.iter_mut().zip(coverage) {
                *pixel = pixel.blend(color, multiply_u8(*cover, alpha));
            }
        }
    }
}

impl std::fmt::Debug for Rgb565Buffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Rgb565Buffer")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish()
    }
}

/// Single recorded `stamp` call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stamp {
    pub color: Rgb565,
    pub coverage: Vec<u8>,
    pub rect: Rect,
    pub alpha: u8,
}

/// Framebuffer that remembers every call instead of drawing
#[derive(Debug, Clone, Default)]
pub struct RecordingFramebuffer {
    width: usize,
    height: usize,
    stamps: Vec<Stamp>,
}

impl RecordingFramebuffer {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            stamps: Vec::new(),
        }
    }

    pub fn stamps(&self) -> &[Stamp] {
        &self.stamps
    }

    pub fn clear(&mut self) {
        self.stamps.clear();
    }

    /// Combine recorded coverage into a `width x height` map (later stamps win)
    pub fn coverage_map(&self) -> Vec<u8> {
        let mut map = vec![0u8; self.width * self.height];
        for stamp in &self.stamps {
            let Rect { x0, y0, .. } = stamp.rect;
            let offset = y0 as usize * self.width + x0 as usize;
            map[offset..offset + stamp.coverage.len()].copy_from_slice(&stamp.coverage);
        }
        map
    }

    /// Sum of all recorded coverage in pixels (255 is one full pixel)
    pub fn total_coverage(&self) -> f64 {
        self.stamps
            .iter()
            .flat_map(|stamp| stamp.coverage.iter())
            .map(|c| *c as f64 / 255.0)
            .sum()
    }
}

impl Framebuffer for RecordingFramebuffer {
    fn width(&self) -> usize {
        self.width
    }

    fn height(&self) -> usize {
        self.height
    }

    fn stamp(&mut self, color: Rgb565, coverage: &[u8], rect: Rect, alpha: u8) {
        assert_eq!(
            coverage.len(),
            rect.width() as usize,
            "coverage does not match {:?}",
            rect
        );
        assert!(
            rect.x0 >= 0
                && rect.y0 >= 0
                && rect.x1 as usize <= self.width
                && rect.y1 as usize <= self.height,
            "{:?} outside of {}x{}",
            rect,
            self.width,
            self.height
        );
        self.stamps.push(Stamp {
            color,
            coverage: coverage.to_vec(),
            rect,
            alpha,
        });
    }
}
