//! Path construction and conversion of sorted cells into coverage spans
use crate::{
    BBox, Error, GammaLut, Outline, PI, Point, Renderer, Rgba, Scalar, ScanLine,
    fixed::{SUBPIXEL_SCALE, SUBPIXEL_SHIFT, to_fixed},
    gamma::DEFAULT_GAMMA,
    outline::DEFAULT_CELLS_PER_BLOCK,
};

/// Number of segments used to approximate an ellipse
pub const ELLIPSE_SEGMENTS: usize = 60;
const ELLIPSE_STEP: Scalar = 2.0 * PI / ELLIPSE_SEGMENTS as Scalar;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "lowercase")
)]
pub enum FillRule {
    /// Pixel is inside if winding number is not zero
    #[default]
    NonZero,
    /// Pixel is inside if winding number is odd
    EvenOdd,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(default)
)]
pub struct RasterizerConfig {
    /// Number of cells allocated at once by the outline storage
    pub cells_per_block: usize,
    /// Exponent of the coverage correction curve
    pub gamma: f64,
}

impl Default for RasterizerConfig {
    fn default() -> Self {
        Self {
            cells_per_block: DEFAULT_CELLS_PER_BLOCK,
            gamma: DEFAULT_GAMMA,
        }
    }
}

/// Anti-aliased scan line rasterizer
///
/// Intended to be created once and reused, storage allocated for one shape
/// is kept for the following ones. Path commands never fail, problems such
/// as coordinates that do not fit into the fixed point range are reported by
/// [`Rasterizer::render`] which then drops the whole shape.
///
/// ```
/// use cellrast::{FillRule, Rasterizer, RecordingFramebuffer, Renderer, Rgba};
///
/// let mut fb = RecordingFramebuffer::new(32, 32);
/// let mut rasterizer = Rasterizer::new();
/// rasterizer.ellipse((16.0, 16.0), (8.0, 8.0));
/// rasterizer.render(&mut Renderer::new(&mut fb), Rgba::rgb(255, 0, 0), FillRule::NonZero)?;
/// assert!(!fb.stamps().is_empty());
/// # Ok::<(), cellrast::Error>(())
/// ```
pub struct Rasterizer {
    outline: Outline,
    scanline: ScanLine,
    gamma: GammaLut,
}

impl Default for Rasterizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Rasterizer {
    pub fn new() -> Self {
        Self::with_config(&RasterizerConfig::default())
    }

    pub fn with_config(config: &RasterizerConfig) -> Self {
        Self {
            outline: Outline::new(config.cells_per_block),
            scanline: ScanLine::new(),
            gamma: GammaLut::new(config.gamma),
        }
    }

    /// Discard current path
    pub fn reset(&mut self) -> &mut Self {
        self.outline.reset();
        self
    }

    /// Start new sub-path, closing the previous one
    pub fn move_to(&mut self, point: impl Into<Point>) -> &mut Self {
        let Point([x, y]) = point.into();
        self.outline.move_to(fixed(x), fixed(y));
        self
    }

    /// Add line from the current point
    pub fn line_to(&mut self, point: impl Into<Point>) -> &mut Self {
        let Point([x, y]) = point.into();
        self.outline.line_to(fixed(x), fixed(y));
        self
    }

    /// Closed polygon through all points
    pub fn polygon<P, I>(&mut self, points: I) -> &mut Self
    where
        P: Into<Point>,
        I: IntoIterator<Item = P>,
    {
        let mut points = points.into_iter();
        if let Some(first) = points.next() {
            self.move_to(first);
            for point in points {
                self.line_to(point);
            }
        }
        self
    }

    /// Line of `width` thickness with flat ends
    pub fn thick_line(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        width: Scalar,
    ) -> &mut Self {
        let (p1, p2) = (p1.into(), p2.into());
        let Some(offset) = line_offset(p1, p2, width) else {
            return self;
        };
        self.move_to(p1 + offset)
            .line_to(p2 + offset)
            .line_to(p2 - offset)
            .line_to(p1 - offset)
    }

    /// Triangle with `width` wide base at `p1` and its tip at `p2`
    pub fn pointed_line(
        &mut self,
        p1: impl Into<Point>,
        p2: impl Into<Point>,
        width: Scalar,
    ) -> &mut Self {
        let (p1, p2) = (p1.into(), p2.into());
        let Some(offset) = line_offset(p1, p2, width) else {
            return self;
        };
        self.move_to(p1 + offset).line_to(p2).line_to(p1 - offset)
    }

    /// Filled ellipse, traversed clockwise (y axis pointing down)
    pub fn ellipse(&mut self, center: impl Into<Point>, radius: impl Into<Point>) -> &mut Self {
        let Point([rx, ry]) = radius.into();
        self.ellipse_path(center.into(), rx, ry, 1.0)
    }

    /// Ring between the ellipse and the same ellipse shrunk by `thickness`
    ///
    /// Inner ellipse is traversed in the opposite direction, so it cancels
    /// out the winding of the outer one under the non-zero fill rule. Inner
    /// radii are clamped at zero, a `thickness` larger than the radius gives
    /// a filled ellipse under both fill rules rather than a mirrored inner
    /// path that would punch a hole under [`FillRule::EvenOdd`].
    pub fn thick_ellipse(
        &mut self,
        center: impl Into<Point>,
        radius: impl Into<Point>,
        thickness: Scalar,
    ) -> &mut Self {
        let center = center.into();
        let Point([rx, ry]) = radius.into();
        self.ellipse_path(center, rx, ry, 1.0);
        self.ellipse_path(
            center,
            (rx - thickness).max(0.0),
            (ry - thickness).max(0.0),
            -1.0,
        )
    }

    fn ellipse_path(
        &mut self,
        center: Point,
        rx: Scalar,
        ry: Scalar,
        direction: Scalar,
    ) -> &mut Self {
        self.move_to(center + Point::new(rx, 0.0));
        for step in 1..ELLIPSE_SEGMENTS {
            let angle = direction * step as Scalar * ELLIPSE_STEP;
            self.line_to(center + Point::new(angle.cos() * rx, angle.sin() * ry));
        }
        self
    }

    /// Pixel bounding box of the current path
    pub fn bbox(&self) -> BBox {
        self.outline.bbox()
    }

    /// Number of cells produced by the current path so far
    pub fn num_cells(&self) -> usize {
        self.outline.num_cells()
    }

    /// Coverage of a pixel given its accumulated doubled area
    ///
    /// Full pixel corresponds to area of `256 << 9`, the result is clamped to
    /// `255`. With [`FillRule::EvenOdd`] coverage folds back to zero for every
    /// second overlap.
    pub fn calc_alpha(area: i32, fill_rule: FillRule) -> u8 {
        let mut coverage = (area >> (SUBPIXEL_SHIFT + 1)).abs();
        if fill_rule == FillRule::EvenOdd {
            coverage &= 0x1ff;
            if coverage > 0x100 {
                coverage = 0x200 - coverage;
            }
        }
        coverage.min(0xff) as u8
    }

    /// Close current path and composite it with `renderer`
    ///
    /// Rows are handed to the renderer in increasing order, each row once.
    /// If the path could not be built the error is returned and nothing is
    /// rendered. The path is kept until the next `move_to` or `reset`.
    pub fn render(
        &mut self,
        renderer: &mut Renderer<'_>,
        color: Rgba,
        fill_rule: FillRule,
    ) -> Result<(), Error> {
        let bbox = self.outline.bbox();
        let cells = self.outline.sorted_cells()?;
        if cells.is_empty() {
            return Ok(());
        }
        let _guard = tracing::debug_span!("[render]", cells = cells.len()).entered();
        tracing::trace!(?bbox, %color, "[rasterizer] render");

        let scanline = &mut self.scanline;
        let gamma = &self.gamma;
        scanline.reset(bbox.min_x, bbox.max_x)?;

        let mut add_span = |x: i32, y: i32, len: i32, alpha: u8| {
            if scanline.is_ready(y) {
                renderer.render(scanline, color);
                scanline.reset_spans();
            }
            scanline.add_span(x, y, len as usize, gamma.apply(alpha));
        };

        let mut coverage = 0;
        let mut cells = cells.iter().peekable();
        while let Some(cell) = cells.next() {
            let (mut x, y) = (cell.x(), cell.y());
            let mut area = cell.area;
            coverage += cell.coverage;
            while let Some(same) = cells.next_if(|next| next.packed == cell.packed) {
                area += same.area;
                coverage += same.coverage;
            }

            if area != 0 {
                let alpha = Self::calc_alpha((coverage << (SUBPIXEL_SHIFT + 1)) - area, fill_rule);
                if alpha != 0 {
                    add_span(x, y, 1, alpha);
                }
                x += 1;
            }

            // pixels up to the next cell share the accumulated coverage
            if let Some(next) = cells.peek() {
                if next.y() == y && next.x() > x {
                    let alpha = Self::calc_alpha(coverage << (SUBPIXEL_SHIFT + 1), fill_rule);
                    if alpha != 0 {
                        add_span(x, y, next.x() - x, alpha);
                    }
                }
            }
        }

        if scanline.num_spans() > 0 {
            renderer.render(scanline, color);
            scanline.reset_spans();
        }
        Ok(())
    }
}

/// Fixed point value, values out of range stay out of range so the outline
/// rejects them
fn fixed(value: Scalar) -> i32 {
    match to_fixed(value) {
        Some(fixed) => fixed,
        None if value.is_nan() => i32::MAX,
        None => (value * SUBPIXEL_SCALE as Scalar) as i32,
    }
}

/// Offset perpendicular to the line, half of the `width` long
fn line_offset(p1: Point, p2: Point, width: Scalar) -> Option<Point> {
    let direction = (p2 - p1).normalize()?;
    Some((width / 2.0) * direction.normal())
}
