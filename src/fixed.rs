//! 24.8 fixed point coordinates used by the scan converter
use crate::Scalar;

/// Number of fractional bits in a fixed point coordinate
pub const SUBPIXEL_SHIFT: i32 = 8;
/// One pixel in fixed point units
pub const SUBPIXEL_SCALE: i32 = 1 << SUBPIXEL_SHIFT;
/// Mask extracting the fractional part of a fixed point coordinate
pub const SUBPIXEL_MASK: i32 = SUBPIXEL_SCALE - 1;

/// Smallest pixel column/row accepted by the packed cell coordinate
pub const MIN_PIXEL: i32 = -(i16::MAX as i32);
/// Largest pixel column/row accepted, leaves room for the exclusive `max + 1` bound
pub const MAX_PIXEL: i32 = i16::MAX as i32 - 1;

/// Integer pixel containing fixed point coordinate
#[inline]
pub fn pixel(v: i32) -> i32 {
    v >> SUBPIXEL_SHIFT
}

/// Fractional (sub-pixel) part of fixed point coordinate
#[inline]
pub fn fract(v: i32) -> i32 {
    v & SUBPIXEL_MASK
}

/// Whether fixed point coordinate lands on a pixel representable in a packed cell
#[inline]
pub fn in_range(v: i32) -> bool {
    (MIN_PIXEL..=MAX_PIXEL).contains(&pixel(v))
}

/// Convert floating point coordinate to fixed point, truncating toward zero
///
/// Returns `None` for non-finite values and values outside of the packed range.
pub fn to_fixed(v: Scalar) -> Option<i32> {
    if !v.is_finite() {
        return None;
    }
    let scaled = v * SUBPIXEL_SCALE as Scalar;
    let limit = ((MAX_PIXEL + 1) * SUBPIXEL_SCALE) as Scalar;
    if scaled >= limit || scaled < (MIN_PIXEL * SUBPIXEL_SCALE) as Scalar {
        return None;
    }
    Some(scaled as i32)
}
