use bytemuck::{Pod, Zeroable};
use std::fmt;

/// Pack pixel coordinate into a single sortable key
///
/// Keys compare in `(row, column)` order for columns in the `i16` range.
#[inline]
pub fn pack_coord(x: i32, y: i32) -> i32 {
    (y << 16).wrapping_add(x as i16 as i32)
}

/// Inverse of [`pack_coord`]
#[inline]
pub fn unpack_coord(packed: i32) -> (i32, i32) {
    let x = packed as i16 as i32;
    let y = packed.wrapping_sub(x) >> 16;
    (x, y)
}

/// Per-pixel accumulator of signed coverage and area
#[repr(C)]
#[derive(Clone, Copy, PartialEq, Eq, Default, Pod, Zeroable)]
pub struct Cell {
    /// `row << 16 | column`
    pub packed: i32,
    /// Signed vertical extent of the edges crossing this pixel (1/256 pixel units)
    pub coverage: i32,
    /// Doubled signed area of the edges crossing this pixel
    pub area: i32,
}

impl Cell {
    pub fn new(x: i32, y: i32) -> Self {
        Self {
            packed: pack_coord(x, y),
            coverage: 0,
            area: 0,
        }
    }

    #[inline]
    pub fn x(&self) -> i32 {
        unpack_coord(self.packed).0
    }

    #[inline]
    pub fn y(&self) -> i32 {
        unpack_coord(self.packed).1
    }

    #[inline]
    pub fn is_at(&self, x: i32, y: i32) -> bool {
        self.packed == pack_coord(x, y)
    }

    /// Cell without contribution is never stored
    #[inline]
    pub fn is_empty(&self) -> bool {
        (self.coverage | self.area) == 0
    }

    #[inline]
    pub fn add(&mut self, coverage: i32, area: i32) {
        self.coverage += coverage;
        self.area += area;
    }

    #[inline]
    pub fn set(&mut self, coverage: i32, area: i32) {
        self.coverage = coverage;
        self.area = area;
    }
}

impl fmt::Debug for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (x, y) = unpack_coord(self.packed);
        write!(
            f,
            "Cell({},{} coverage:{} area:{})",
            x, y, self.coverage, self.area
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_roundtrip_signs() {
        for &(x, y) in &[(0, 0), (5, 7), (-3, 2), (-3, -2), (32766, -32767), (-32767, 32766)] {
            assert_eq!(unpack_coord(pack_coord(x, y)), (x, y), "{},{}", x, y);
        }
    }

    #[test]
    fn test_pack_order() {
        let mut coords = vec![(3, 1), (-5, 1), (100, 0), (-100, 2), (0, -1), (7, 1)];
        coords.sort_by_key(|&(x, y)| pack_coord(x, y));
        assert_eq!(
            coords,
            vec![(0, -1), (100, 0), (-5, 1), (3, 1), (7, 1), (-100, 2)]
        );
    }

    #[test]
    fn test_cell_accumulate() {
        let mut cell = Cell::new(4, 9);
        assert!(cell.is_empty());
        assert!(cell.is_at(4, 9));
        cell.add(128, 512);
        cell.add(-128, 0);
        assert!(!cell.is_empty());
        assert_eq!((cell.x(), cell.y()), (4, 9));
        cell.set(0, 0);
        assert!(cell.is_empty());
    }
}
