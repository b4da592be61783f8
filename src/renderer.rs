use crate::{Framebuffer, Rect, Rgb565, Rgba, ScanLine};

/// Hands finished scan lines to a framebuffer
///
/// Spans are clipped against the framebuffer bounds, so the rasterizer may
/// produce shapes that are partially or completely off screen.
pub struct Renderer<'a> {
    framebuffer: &'a mut dyn Framebuffer,
}

impl<'a> Renderer<'a> {
    pub fn new(framebuffer: &'a mut dyn Framebuffer) -> Self {
        Self { framebuffer }
    }

    /// Composite all spans of the scan line with `color`
    ///
    /// Color alpha is passed as the global alpha of every stamp.
    pub fn render(&mut self, scanline: &ScanLine, color: Rgba) {
        let y = scanline.y();
        if y < 0 || y as usize >= self.framebuffer.height() {
            return;
        }
        let width = self.framebuffer.width().min(i32::MAX as usize) as i32;
        let packed = Rgb565::from(color);
        let alpha = color.alpha();

        for span in scanline.spans() {
            let x = scanline.base_x() + span.offset;
            let rect = Rect::new(
                x.max(0),
                y,
                x.saturating_add(span.coverage.len() as i32).min(width),
                y + 1,
            );
            if rect.is_empty() {
                continue;
            }
            let coverage = &span.coverage[(rect.x0 - x) as usize..(rect.x1 - x) as usize];
            self.framebuffer.stamp(packed, coverage, rect, alpha);
        }
    }
}
