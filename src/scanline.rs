//! Coverage spans of a single output row
use crate::Error;

const NONE: i32 = i32::MIN;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct SpanRun {
    offset: usize,
    len: usize,
}

/// Horizontal runs of equal coverage collected for one row
///
/// Buffers are sized to the horizontal extent of the outline and only grow,
/// so a long lived scan line stops allocating after the widest shape.
#[derive(Debug)]
pub struct ScanLine {
    min_x: i32,
    max_len: usize,
    last_x: i32,
    last_y: i32,
    coverage: Vec<u8>,
    spans: Vec<SpanRun>,
}

impl Default for ScanLine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScanLine {
    pub fn new() -> Self {
        Self {
            min_x: 0,
            max_len: 0,
            last_x: NONE,
            last_y: NONE,
            coverage: Vec::new(),
            spans: Vec::new(),
        }
    }

    /// Prepare for columns `min_x..=max_x`, growing buffers if needed
    ///
    /// On allocation failure previous buffers are kept and the scan line is
    /// left empty.
    pub fn reset(&mut self, min_x: i32, max_x: i32) -> Result<(), Error> {
        let max_len = (max_x - min_x + 2).max(0) as usize;
        if max_len > self.max_len {
            let out_of_memory = |_| Error::OutOfMemory {
                what: "scan line",
                requested: max_len,
            };
            let mut coverage = Vec::new();
            coverage.try_reserve_exact(max_len).map_err(out_of_memory)?;
            coverage.resize(max_len, 0);
            let mut spans = Vec::new();
            spans.try_reserve_exact(max_len).map_err(out_of_memory)?;

            self.coverage = coverage;
            self.spans = spans;
            self.max_len = max_len;
            tracing::debug!("[scanline] grown to {} columns", max_len);
        }
        self.min_x = min_x;
        self.reset_spans();
        Ok(())
    }

    /// Drop collected spans, keeping buffers and base column
    pub fn reset_spans(&mut self) {
        self.last_x = NONE;
        self.last_y = NONE;
        self.spans.clear();
    }

    /// Set `len` pixels starting at column `x` of row `y` to `coverage`
    ///
    /// Extends the last span if it ends right before `x` with the same
    /// coverage. Columns must be added in increasing order and stay inside
    /// the range given to `reset`.
    pub fn add_span(&mut self, x: i32, y: i32, len: usize, coverage: u8) {
        if len == 0 {
            return;
        }
        let offset = x - self.min_x;
        debug_assert!(
            offset >= 0 && offset as usize + len <= self.max_len,
            "span {}+{} outside of scan line [{}, {})",
            x,
            len,
            self.min_x,
            self.min_x + self.max_len as i32
        );
        let start = offset as usize;
        self.coverage[start..start + len].fill(coverage);

        let extend = offset == self.last_x + 1 && self.coverage[start - 1] == coverage;
        match self.spans.last_mut() {
            Some(last) if extend => last.len += len,
            _ => self.spans.push(SpanRun { offset: start, len }),
        }
        self.last_x = offset + len as i32 - 1;
        self.last_y = y;
    }

    /// Holds spans of a row other than `y`, and should be flushed first
    pub fn is_ready(&self, y: i32) -> bool {
        !self.spans.is_empty() && y != self.last_y
    }

    /// Row of the collected spans
    pub fn y(&self) -> i32 {
        self.last_y
    }

    /// Column corresponding to offset zero
    pub fn base_x(&self) -> i32 {
        self.min_x
    }

    pub fn num_spans(&self) -> usize {
        self.spans.len()
    }

    /// Number of columns the buffers can hold without allocation
    pub fn capacity(&self) -> usize {
        self.max_len
    }

    /// Spans in increasing column order
    pub fn spans(&self) -> Spans<'_> {
        Spans {
            coverage: &self.coverage,
            spans: self.spans.iter(),
        }
    }
}

/// Run of pixels sharing a coverage value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Span<'a> {
    /// Offset from the scan line base column
    pub offset: i32,
    /// Coverage of each pixel of the run
    pub coverage: &'a [u8],
}

impl Span<'_> {
    /// Number of pixels in the run
    pub fn len(&self) -> usize {
        self.coverage.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coverage.is_empty()
    }
}

pub struct Spans<'a> {
    coverage: &'a [u8],
    spans: std::slice::Iter<'a, SpanRun>,
}

impl<'a> Iterator for Spans<'a> {
    type Item = Span<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let SpanRun { offset, len } = *self.spans.next()?;
        let coverage = self.coverage;
        Some(Span {
            offset: offset as i32,
            coverage: &coverage[offset..offset + len],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.spans.size_hint()
    }
}

impl ExactSizeIterator for Spans<'_> {}

#[cfg(test)]
mod tests {
    use super::*;

    fn runs(scanline: &ScanLine) -> Vec<(i32, Vec<u8>)> {
        scanline
            .spans()
            .map(|span| (span.offset, span.coverage.to_vec()))
            .collect()
    }

    #[test]
    fn test_merge_equal_coverage() -> Result<(), Error> {
        let mut sl = ScanLine::new();
        sl.reset(10, 30)?;
        sl.add_span(12, 3, 1, 200);
        sl.add_span(13, 3, 4, 200);
        assert_eq!(sl.num_spans(), 1);
        assert_eq!(runs(&sl), vec![(2, vec![200; 5])]);
        assert_eq!(sl.y(), 3);
        Ok(())
    }

    #[test]
    fn test_distinct_coverage() -> Result<(), Error> {
        let mut sl = ScanLine::new();
        sl.reset(0, 20)?;
        sl.add_span(4, 0, 1, 90);
        sl.add_span(5, 0, 6, 255);
        sl.add_span(11, 0, 1, 90);
        assert_eq!(
            runs(&sl),
            vec![(4, vec![90]), (5, vec![255; 6]), (11, vec![90])]
        );
        Ok(())
    }

    #[test]
    fn test_gap_opens_span() -> Result<(), Error> {
        let mut sl = ScanLine::new();
        sl.reset(-5, 5)?;
        sl.add_span(-5, 1, 2, 10);
        sl.add_span(-1, 1, 2, 10);
        assert_eq!(runs(&sl), vec![(0, vec![10, 10]), (4, vec![10, 10])]);
        assert_eq!(sl.base_x(), -5);
        Ok(())
    }

    #[test]
    fn test_is_ready() -> Result<(), Error> {
        let mut sl = ScanLine::new();
        sl.reset(0, 10)?;
        assert!(!sl.is_ready(0));
        sl.add_span(1, 4, 1, 1);
        assert!(!sl.is_ready(4));
        assert!(sl.is_ready(5));
        sl.reset_spans();
        assert!(!sl.is_ready(5));
        assert_eq!(sl.num_spans(), 0);
        Ok(())
    }

    #[test]
    fn test_sticky_capacity() -> Result<(), Error> {
        let mut sl = ScanLine::new();
        sl.reset(0, 100)?;
        assert_eq!(sl.capacity(), 102);
        sl.reset(10, 20)?;
        assert_eq!(sl.capacity(), 102);
        assert_eq!(sl.base_x(), 10);
        sl.reset(0, 200)?;
        assert_eq!(sl.capacity(), 202);
        // spans after reset start over
        sl.add_span(0, 0, 202, 7);
        assert_eq!(runs(&sl), vec![(0, vec![7; 202])]);
        Ok(())
    }

    #[test]
    fn test_new_row_does_not_merge() -> Result<(), Error> {
        let mut sl = ScanLine::new();
        sl.reset(0, 10)?;
        sl.add_span(0, 0, 3, 50);
        sl.reset_spans();
        sl.add_span(3, 1, 2, 50);
        assert_eq!(runs(&sl), vec![(3, vec![50, 50])]);
        Ok(())
    }
}
