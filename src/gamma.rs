/// Default exponent of the coverage correction curve
pub const DEFAULT_GAMMA: f64 = 1.2;

/// Coverage correction table, maps linear coverage to corrected coverage
#[derive(Clone)]
pub struct GammaLut([u8; 256]);

impl GammaLut {
    /// Build `round(255 * (i / 255) ^ gamma)` table
    pub fn new(gamma: f64) -> Self {
        let mut table = [0u8; 256];
        for (index, value) in table.iter_mut().enumerate() {
            let linear = index as f64 / 255.0;
            *value = (linear.powf(gamma) * 255.0).round().clamp(0.0, 255.0) as u8;
        }
        Self(table)
    }

    /// Table that leaves coverage unchanged
    pub fn identity() -> Self {
        Self::new(1.0)
    }

    #[inline]
    pub fn apply(&self, coverage: u8) -> u8 {
        self.0[coverage as usize]
    }

    pub fn table(&self) -> &[u8; 256] {
        &self.0
    }
}

impl Default for GammaLut {
    fn default() -> Self {
        Self::new(DEFAULT_GAMMA)
    }
}

impl std::fmt::Debug for GammaLut {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.0.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gamma_endpoints() {
        let lut = GammaLut::default();
        assert_eq!(lut.apply(0), 0);
        assert_eq!(lut.apply(255), 255);
        // 255 * (128 / 255)^1.2 = 111.52
        assert_eq!(lut.apply(128), 112);
        assert_eq!(lut.apply(1), 0);
    }

    #[test]
    fn test_gamma_monotonic() {
        let lut = GammaLut::default();
        for pair in lut.table().windows(2) {
            assert!(pair[0] <= pair[1]);
        }
        // exponent above one darkens mid tones
        assert!((1..255).all(|i| lut.apply(i) <= i));
    }

    #[test]
    fn test_gamma_identity() {
        let lut = GammaLut::identity();
        assert!((0..=255).all(|i| lut.apply(i) == i));
    }
}
