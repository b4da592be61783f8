//! Small fixed point rasterizer for RGB565 framebuffers.
//!
//! Main features:
//!  - Anti-aliased polygon filling with non-zero and even-odd fill rules
//!  - Thick lines, pointed lines, ellipses and rings
//!  - No floating point and no unbounded allocation while rendering
//!
#![deny(warnings)]

mod arena;
mod cell;
mod color;
mod error;
mod fixed;
mod framebuffer;
mod gamma;
mod geometry;
mod outline;
mod rasterizer;
mod renderer;
mod scanline;
mod sort;
mod utils;

pub use arena::BlockArena;
pub use cell::{Cell, pack_coord, unpack_coord};
pub use color::{ColorError, Rgb565, Rgba, multiply_u8};
pub use error::Error;
pub use fixed::{SUBPIXEL_MASK, SUBPIXEL_SCALE, SUBPIXEL_SHIFT, to_fixed};
pub use framebuffer::{Framebuffer, RecordingFramebuffer, Rgb565Buffer, Stamp};
pub use gamma::{DEFAULT_GAMMA, GammaLut};
pub use geometry::{BBox, EPSILON, PI, Point, Rect, Scalar};
pub use outline::{DEFAULT_CELLS_PER_BLOCK, Outline, SortedCells, SortedCellsIter};
pub use rasterizer::{ELLIPSE_SEGMENTS, FillRule, Rasterizer, RasterizerConfig};
pub use renderer::Renderer;
pub use scanline::{ScanLine, Span, Spans};
pub use sort::{QSORT_THRESHOLD, STACK_DEPTH, sort_by_key};
