//! Scan conversion of polygon edges into cells
//!
//! Every edge is split at pixel row and column boundaries, each piece adds its
//! signed vertical extent (coverage) and doubled trapezoid area to the cell of
//! the pixel it crosses. Consecutive contributions to the same pixel are
//! accumulated in `current` and only committed to storage when the edge moves
//! to another pixel.
use crate::{
    BBox, Error,
    arena::BlockArena,
    cell::Cell,
    fixed::{SUBPIXEL_MASK, SUBPIXEL_SCALE, SUBPIXEL_SHIFT, fract, in_range, pixel},
    sort::sort_by_key,
};

/// Default number of cells in a storage block
pub const DEFAULT_CELLS_PER_BLOCK: usize = 2048;

/// Edges with horizontal extent of this many pixels are split in half,
/// keeps the products of the row split inside `i32`
const DX_LIMIT: i32 = 16384 << SUBPIXEL_SHIFT;

/// Position of the working cell before the first `move_to`
const NO_CELL: i32 = i16::MAX as i32;

pub struct Outline {
    cells: BlockArena<Cell>,
    /// Indices into `cells` in `(row, column)` order, valid once `sorted` is set
    order: Vec<u32>,
    current: Cell,
    // current point
    x: i32,
    y: i32,
    // start of the current sub-path
    start_x: i32,
    start_y: i32,
    bbox: BBox,
    closed: bool,
    sorted: bool,
    error: Option<Error>,
}

impl Default for Outline {
    fn default() -> Self {
        Self::new(DEFAULT_CELLS_PER_BLOCK)
    }
}

impl Outline {
    pub fn new(cells_per_block: usize) -> Self {
        Self {
            cells: BlockArena::new(cells_per_block),
            order: Vec::new(),
            current: Cell::new(NO_CELL, NO_CELL),
            x: 0,
            y: 0,
            start_x: 0,
            start_y: 0,
            bbox: BBox::EMPTY,
            closed: true,
            sorted: false,
            error: None,
        }
    }

    /// Discard all cells, allocated storage is kept for the next path
    pub fn reset(&mut self) {
        self.cells.clear();
        self.current = Cell::new(NO_CELL, NO_CELL);
        self.bbox = BBox::EMPTY;
        self.closed = true;
        self.sorted = false;
        self.error = None;
    }

    /// Start new sub-path at fixed point coordinate
    ///
    /// If the previous path was already sorted it is discarded, if the previous
    /// sub-path was left open it is closed first.
    pub fn move_to(&mut self, x: i32, y: i32) {
        if self.sorted {
            self.reset();
        }
        if !self.closed {
            self.line_to(self.start_x, self.start_y);
            self.closed = true;
        }
        if self.error.is_some() {
            return;
        }
        if !in_range(x) || !in_range(y) {
            self.fail(Error::CoordinateOutOfRange { x, y });
            return;
        }
        self.set_current_cell(pixel(x), pixel(y));
        self.x = x;
        self.y = y;
        self.start_x = x;
        self.start_y = y;
    }

    /// Add edge from the current point to fixed point coordinate
    pub fn line_to(&mut self, x: i32, y: i32) {
        if self.sorted || self.error.is_some() || (x == self.x && y == self.y) {
            return;
        }
        if !in_range(x) || !in_range(y) {
            self.fail(Error::CoordinateOutOfRange { x, y });
            return;
        }
        self.bbox.add_x(pixel(self.x), pixel(self.x + SUBPIXEL_MASK));
        self.bbox.add_x(pixel(x), pixel(x + SUBPIXEL_MASK));
        self.render_line(self.x, self.y, x, y);
        self.x = x;
        self.y = y;
        self.closed = false;
    }

    /// Close the path and return its cells in `(row, column)` order
    ///
    /// Sorting happens only once, following calls return the same sequence
    /// until the outline is reset. Once sorted the outline does not accept new
    /// edges. If storage could not be allocated or a coordinate was out of
    /// range the whole path is dropped and the error is returned.
    pub fn sorted_cells(&mut self) -> Result<SortedCells<'_>, Error> {
        if !self.closed {
            self.line_to(self.start_x, self.start_y);
            self.closed = true;
        }
        if !self.sorted {
            self.add_current_cell();
            self.current = Cell::new(NO_CELL, NO_CELL);
            if self.error.is_none() {
                if let Err(error) = self.sort_cells() {
                    self.fail(error);
                }
            }
            self.sorted = true;
        }
        if let Some(error) = &self.error {
            return Err(error.clone());
        }
        Ok(SortedCells {
            cells: &self.cells,
            order: &self.order[..self.cells.len()],
        })
    }

    /// Pixel bounding box of all edges added so far
    pub fn bbox(&self) -> BBox {
        self.bbox
    }

    pub fn min_x(&self) -> i32 {
        self.bbox.min_x
    }

    pub fn min_y(&self) -> i32 {
        self.bbox.min_y
    }

    pub fn max_x(&self) -> i32 {
        self.bbox.max_x
    }

    pub fn max_y(&self) -> i32 {
        self.bbox.max_y
    }

    /// Number of committed cells
    pub fn num_cells(&self) -> usize {
        self.cells.len()
    }

    /// Whether the path has been sorted and no longer accepts edges
    pub fn is_sorted(&self) -> bool {
        self.sorted
    }

    /// Error latched while building the current path
    pub fn error(&self) -> Option<&Error> {
        self.error.as_ref()
    }

    /// Number of allocated storage blocks
    pub fn num_blocks(&self) -> usize {
        self.cells.num_blocks()
    }

    fn fail(&mut self, error: Error) {
        tracing::warn!("[outline] dropping path: {}", error);
        if self.error.is_none() {
            self.error = Some(error);
        }
    }

    fn add_current_cell(&mut self) {
        if self.current.is_empty() || self.error.is_some() {
            return;
        }
        if let Err(error) = self.cells.push(self.current) {
            self.fail(error);
        }
    }

    #[inline]
    fn set_current_cell(&mut self, x: i32, y: i32) {
        if !self.current.is_at(x, y) {
            self.add_current_cell();
            self.current = Cell::new(x, y);
        }
    }

    fn sort_cells(&mut self) -> Result<(), Error> {
        let count = self.cells.len();
        self.order.clear();
        if count == 0 {
            return Ok(());
        }
        self.order
            .try_reserve_exact(count)
            .map_err(|_| Error::OutOfMemory {
                what: "sorted cells",
                requested: count,
            })?;
        self.order.extend(0..count as u32);
        let cells = &self.cells;
        sort_by_key(&mut self.order, |&index| cells[index as usize].packed);
        tracing::trace!("[outline] sorted {} cells", count);
        Ok(())
    }

    /// Render part of an edge that stays within row `ey`
    ///
    /// `y1` and `y2` are sub-pixel offsets within the row (`0..=256`).
    fn render_hline(&mut self, ey: i32, x1: i32, y1: i32, x2: i32, y2: i32) {
        let ex1 = pixel(x1);
        let ex2 = pixel(x2);
        let fx1 = fract(x1);
        let fx2 = fract(x2);

        // horizontal, no coverage
        if y1 == y2 {
            self.set_current_cell(ex2, ey);
            return;
        }

        // single cell
        if ex1 == ex2 {
            let delta = y2 - y1;
            self.current.add(delta, (fx1 + fx2) * delta);
            return;
        }

        // run of adjacent cells in the same row
        let (p, first, incr, dx) = if x2 < x1 {
            (fx1 * (y2 - y1), 0, -1, x1 - x2)
        } else {
            ((SUBPIXEL_SCALE - fx1) * (y2 - y1), SUBPIXEL_SCALE, 1, x2 - x1)
        };
        let mut delta = p.div_euclid(dx);
        let mut modulo = p.rem_euclid(dx);
        self.current.add(delta, (fx1 + first) * delta);

        let mut ex1 = ex1 + incr;
        self.set_current_cell(ex1, ey);
        let mut y1 = y1 + delta;

        if ex1 != ex2 {
            let p = SUBPIXEL_SCALE * (y2 - y1 + delta);
            let lift = p.div_euclid(dx);
            let rem = p.rem_euclid(dx);
            modulo -= dx;
            while ex1 != ex2 {
                delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dx;
                    delta += 1;
                }
                self.current.add(delta, SUBPIXEL_SCALE * delta);
                y1 += delta;
                ex1 += incr;
                self.set_current_cell(ex1, ey);
            }
        }

        let delta = y2 - y1;
        self.current.add(delta, (fx2 + SUBPIXEL_SCALE - first) * delta);
    }

    fn render_line(&mut self, x1: i32, y1: i32, x2: i32, y2: i32) {
        let dx = x2 - x1;
        if dx >= DX_LIMIT || dx <= -DX_LIMIT {
            let cx = (x1 + x2) >> 1;
            let cy = (y1 + y2) >> 1;
            self.render_line(x1, y1, cx, cy);
            self.render_line(cx, cy, x2, y2);
            return;
        }

        let ey1 = pixel(y1);
        let ey2 = pixel(y2);
        let fy1 = fract(y1);
        let fy2 = fract(y2);
        self.bbox.add_y(pixel(y1), pixel(y1 + SUBPIXEL_MASK));
        self.bbox.add_y(pixel(y2), pixel(y2 + SUBPIXEL_MASK));

        // single row
        if ey1 == ey2 {
            self.render_hline(ey1, x1, fy1, x2, fy2);
            return;
        }

        let mut ey1 = ey1;
        let dy = y2 - y1;

        // vertical line, stays in one column so every row gets the same
        // coverage and area except the first and the last one
        if dx == 0 {
            let ex = pixel(x1);
            let two_fx = fract(x1) << 1;
            let (first, incr) = if dy < 0 {
                (0, -1)
            } else {
                (SUBPIXEL_SCALE, 1)
            };

            let delta = first - fy1;
            self.current.add(delta, two_fx * delta);
            ey1 += incr;
            self.set_current_cell(ex, ey1);

            let delta = first + first - SUBPIXEL_SCALE;
            let area = two_fx * delta;
            while ey1 != ey2 {
                self.current.set(delta, area);
                ey1 += incr;
                self.set_current_cell(ex, ey1);
            }

            let delta = fy2 - SUBPIXEL_SCALE + first;
            self.current.add(delta, two_fx * delta);
            return;
        }

        // several rows
        let (p, first, incr, dy) = if dy < 0 {
            (fy1 * dx, 0, -1, -dy)
        } else {
            ((SUBPIXEL_SCALE - fy1) * dx, SUBPIXEL_SCALE, 1, dy)
        };
        let delta = p.div_euclid(dy);
        let mut modulo = p.rem_euclid(dy);

        let mut x_from = x1 + delta;
        self.render_hline(ey1, x1, fy1, x_from, first);
        ey1 += incr;
        self.set_current_cell(pixel(x_from), ey1);

        if ey1 != ey2 {
            let p = SUBPIXEL_SCALE * dx;
            let lift = p.div_euclid(dy);
            let rem = p.rem_euclid(dy);
            modulo -= dy;
            while ey1 != ey2 {
                let mut delta = lift;
                modulo += rem;
                if modulo >= 0 {
                    modulo -= dy;
                    delta += 1;
                }
                let x_to = x_from + delta;
                self.render_hline(ey1, x_from, SUBPIXEL_SCALE - first, x_to, first);
                x_from = x_to;
                ey1 += incr;
                self.set_current_cell(pixel(x_from), ey1);
            }
        }
        self.render_hline(ey1, x_from, SUBPIXEL_SCALE - first, x2, fy2);
    }
}

/// Cells of a finished outline in `(row, column)` order
///
/// Cells sharing a coordinate are adjacent and must be summed by the consumer.
#[derive(Clone, Copy)]
pub struct SortedCells<'a> {
    cells: &'a BlockArena<Cell>,
    order: &'a [u32],
}

impl<'a> SortedCells<'a> {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&'a Cell> {
        let cells = self.cells;
        self.order.get(index).map(|&i| &cells[i as usize])
    }

    pub fn iter(&self) -> SortedCellsIter<'a> {
        SortedCellsIter {
            cells: self.cells,
            order: self.order.iter(),
        }
    }
}

impl<'a> IntoIterator for SortedCells<'a> {
    type Item = &'a Cell;
    type IntoIter = SortedCellsIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

pub struct SortedCellsIter<'a> {
    cells: &'a BlockArena<Cell>,
    order: std::slice::Iter<'a, u32>,
}

impl<'a> Iterator for SortedCellsIter<'a> {
    type Item = &'a Cell;

    fn next(&mut self) -> Option<Self::Item> {
        let cells = self.cells;
        self.order.next().map(|&index| &cells[index as usize])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl ExactSizeIterator for SortedCellsIter<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn px(v: i32) -> i32 {
        v << SUBPIXEL_SHIFT
    }

    fn cells(outline: &mut Outline) -> Vec<Cell> {
        outline
            .sorted_cells()
            .expect("outline failed")
            .iter()
            .copied()
            .collect()
    }

    /// Sum cells with equal coordinates
    fn merged(cells: &[Cell]) -> Vec<Cell> {
        let mut result: Vec<Cell> = Vec::new();
        for cell in cells {
            match result.last_mut() {
                Some(last) if last.packed == cell.packed => last.add(cell.coverage, cell.area),
                _ => result.push(*cell),
            }
        }
        result
    }

    #[test]
    fn test_degenerate_segment() {
        let mut outline = Outline::default();
        outline.move_to(px(5), px(5));
        outline.line_to(px(5), px(5));
        assert!(outline.sorted_cells().unwrap().is_empty());
        assert_eq!(outline.num_cells(), 0);
        assert!(outline.bbox().is_empty());
    }

    #[test]
    fn test_empty_outline() {
        let mut outline = Outline::default();
        assert!(outline.sorted_cells().unwrap().is_empty());
        assert!(outline.is_sorted());
    }

    #[test]
    fn test_half_pixel_triangle() {
        let mut outline = Outline::default();
        outline.move_to(0, 0);
        outline.line_to(px(1), 0);
        outline.line_to(px(1), px(1));
        let cells = cells(&mut outline);
        assert_eq!(
            cells,
            vec![
                Cell {
                    packed: 0,
                    coverage: -256,
                    area: -65536
                },
                Cell {
                    packed: 1,
                    coverage: 256,
                    area: 0
                },
            ]
        );
    }

    #[test]
    fn test_rectangle_cells() {
        let mut outline = Outline::default();
        outline.move_to(0, 0);
        outline.line_to(px(10), 0);
        outline.line_to(px(10), px(10));
        outline.line_to(0, px(10));
        let cells = merged(&cells(&mut outline));
        assert_eq!(
            outline.bbox(),
            BBox {
                min_x: 0,
                min_y: 0,
                max_x: 10,
                max_y: 10
            }
        );
        // one cell at each vertical edge per row, opposite coverage
        assert_eq!(cells.len(), 20);
        for row in 0..10 {
            let left = cells[row * 2];
            let right = cells[row * 2 + 1];
            assert_eq!((left.x(), left.y()), (0, row as i32));
            assert_eq!((right.x(), right.y()), (10, row as i32));
            assert_eq!(left.coverage, -right.coverage);
            assert_eq!(left.coverage.abs(), 256);
            assert_eq!(left.area, 0);
            assert_eq!(right.area, 0);
        }
    }

    #[test]
    fn test_sorted_order_and_idempotence() {
        let mut outline = Outline::new(16);
        outline.move_to(px(3) + 77, px(1) + 13);
        outline.line_to(px(40) + 5, px(7) + 200);
        outline.line_to(px(12) + 128, px(30) + 1);
        outline.line_to(px(-4) + 64, px(18) + 99);
        let first = cells(&mut outline);
        assert!(!first.is_empty());
        assert!(outline.num_blocks() > 1);
        for pair in first.windows(2) {
            assert!(pair[0].packed <= pair[1].packed);
        }
        for cell in &first {
            assert!(!cell.is_empty());
        }
        // closed path has zero total coverage
        assert_eq!(first.iter().map(|c| c.coverage).sum::<i32>(), 0);
        // each row also sums to zero
        for row in outline.min_y()..outline.max_y() {
            let sum: i32 = first
                .iter()
                .filter(|c| c.y() == row)
                .map(|c| c.coverage)
                .sum();
            assert_eq!(sum, 0, "row {}", row);
        }

        let second = cells(&mut outline);
        assert_eq!(first, second);

        // no edges accepted after sort
        outline.line_to(px(100), px(100));
        assert_eq!(cells(&mut outline), first);
    }

    #[test]
    fn test_implicit_close() {
        let points = [(px(2) + 30, px(1)), (px(9), px(4) + 100), (px(5) + 7, px(8) + 250)];

        let mut open = Outline::default();
        open.move_to(points[0].0, points[0].1);
        open.line_to(points[1].0, points[1].1);
        open.line_to(points[2].0, points[2].1);

        let mut closed = Outline::default();
        closed.move_to(points[0].0, points[0].1);
        closed.line_to(points[1].0, points[1].1);
        closed.line_to(points[2].0, points[2].1);
        closed.line_to(points[0].0, points[0].1);

        assert_eq!(merged(&cells(&mut open)), merged(&cells(&mut closed)));
    }

    #[test]
    fn test_move_to_closes_subpath() {
        let mut outline = Outline::default();
        outline.move_to(0, 0);
        outline.line_to(px(4), 0);
        outline.line_to(px(4), px(4));
        outline.move_to(px(10), px(10));
        outline.line_to(px(12), px(10));
        outline.line_to(px(12), px(12));
        let cells = cells(&mut outline);
        assert_eq!(cells.iter().map(|c| c.coverage).sum::<i32>(), 0);
        assert!(cells.iter().any(|c| c.y() >= 10));
        assert!(cells.iter().any(|c| c.y() < 4));
    }

    #[test]
    fn test_reset_after_sort() {
        let mut outline = Outline::new(4);
        outline.move_to(0, 0);
        outline.line_to(px(8), px(3));
        outline.line_to(px(1), px(6));
        let count = cells(&mut outline).len();
        assert!(count > 0);
        let blocks = outline.num_blocks();

        // move_to after sort starts a new path
        outline.move_to(px(1), px(1));
        assert!(!outline.is_sorted());
        assert_eq!(outline.num_cells(), 0);
        assert!(outline.bbox().is_empty());
        outline.line_to(px(2), px(1));
        outline.line_to(px(2), px(2));
        let cells = cells(&mut outline);
        assert_eq!(cells.len(), 2);
        // storage is retained
        assert_eq!(outline.num_blocks(), blocks);
    }

    #[test]
    fn test_vertical_line() {
        let mut outline = Outline::default();
        outline.move_to(px(2) + 64, px(1) + 128);
        outline.line_to(px(2) + 64, px(4) + 64);
        // do not close: inspect raw contributions of the single edge
        outline.add_current_cell();
        let cells: Vec<Cell> = outline.cells.iter().copied().collect();
        assert_eq!(
            cells
                .iter()
                .map(|c| (c.x(), c.y(), c.coverage, c.area))
                .collect::<Vec<_>>(),
            vec![
                (2, 1, 128, 128 * 128),
                (2, 2, 256, 128 * 256),
                (2, 3, 256, 128 * 256),
                (2, 4, 64, 128 * 64),
            ]
        );
    }

    #[test]
    fn test_long_edge_split() {
        let mut outline = Outline::default();
        outline.move_to(px(-20000), 0);
        outline.line_to(px(20000), px(2));
        outline.line_to(px(20000), px(4));
        let cells = cells(&mut outline);
        assert_eq!(cells.iter().map(|c| c.coverage).sum::<i32>(), 0);
        assert_eq!(outline.min_x(), -20000);
        assert_eq!(outline.max_x(), 20000);
    }

    #[test]
    fn test_coordinate_out_of_range() {
        let mut outline = Outline::default();
        outline.move_to(0, 0);
        outline.line_to(px(40000), px(1));
        outline.line_to(px(1), px(1));
        assert_eq!(
            outline.sorted_cells().err(),
            Some(Error::CoordinateOutOfRange {
                x: px(40000),
                y: px(1)
            })
        );
        // next path starts clean
        outline.move_to(0, 0);
        outline.line_to(px(1), 0);
        outline.line_to(px(1), px(1));
        assert_eq!(outline.sorted_cells().map(|cells| cells.len()), Ok(2));
    }
}
