//! Linear and band scales with divide-by-zero guards.

/// Maps a numeric domain onto a pixel range.
///
/// A degenerate domain (zero or non-finite span) maps every value to the
/// start of the range, so an empty or all-zero series draws at the baseline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearScale {
    d0: f64,
    d1: f64,
    r0: f64,
    r1: f64,
}

impl LinearScale {
    pub fn new(domain: (f64, f64), range: (f64, f64)) -> Self {
        Self { d0: domain.0, d1: domain.1, r0: range.0, r1: range.1 }
    }

    pub fn map(&self, value: f64) -> f64 {
        let span = self.d1 - self.d0;
        if span == 0.0 || !span.is_finite() || !value.is_finite() {
            return self.r0;
        }
        self.r0 + (value - self.d0) / span * (self.r1 - self.r0)
    }
}

/// Evenly spaced categorical slots.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BandScale {
    start: f64,
    step: f64,
}

impl BandScale {
    pub fn new(start: f64, width: f64, count: usize) -> Self {
        let step = if count == 0 { 0.0 } else { width / count as f64 };
        Self { start, step }
    }

    /// Width of one slot.
    pub fn step(&self) -> f64 {
        self.step
    }

    /// Center of slot `index`.
    pub fn center(&self, index: usize) -> f64 {
        self.start + index as f64 * self.step + self.step / 2.0
    }
}
