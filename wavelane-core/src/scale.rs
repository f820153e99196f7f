//! Linear time-to-pixel scale
//!
//! A [`Scale`] maps a domain interval (time, amplitude, ...) onto a range
//! interval (pixels). It is strictly monotonic: zero-width or non-finite
//! intervals are rejected when the scale is built or mutated.

use crate::error::{Result, TimelineError};
use serde::{Deserialize, Serialize};

/// Affine map from a domain interval onto a range interval
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Scale {
    domain: [f64; 2],
    range: [f64; 2],
}

fn is_valid_interval(interval: [f64; 2]) -> bool {
    interval[0].is_finite() && interval[1].is_finite() && interval[0] != interval[1]
}

impl Scale {
    /// Create a linear scale
    ///
    /// Fails with [`TimelineError::InvalidScale`] if either interval has
    /// zero width or contains a non-finite bound.
    pub fn linear(domain: [f64; 2], range: [f64; 2]) -> Result<Self> {
        if !is_valid_interval(domain) || !is_valid_interval(range) {
            return Err(TimelineError::InvalidScale { domain, range });
        }
        Ok(Self { domain, range })
    }

    /// Map a domain value to the range
    pub fn apply(&self, value: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        r0 + (value - d0) * (r1 - r0) / (d1 - d0)
    }

    /// Map a range value back to the domain
    pub fn invert(&self, pixel: f64) -> f64 {
        let [d0, d1] = self.domain;
        let [r0, r1] = self.range;
        d0 + (pixel - r0) * (d1 - d0) / (r1 - r0)
    }

    /// Convert a domain length (duration, offset) to a range length
    pub fn apply_extent(&self, extent: f64) -> f64 {
        self.apply(extent) - self.apply(0.0)
    }

    /// Convert a range length back to a domain length
    pub fn invert_extent(&self, extent: f64) -> f64 {
        self.invert(extent) - self.invert(0.0)
    }

    pub fn domain(&self) -> [f64; 2] {
        self.domain
    }

    pub fn range(&self) -> [f64; 2] {
        self.range
    }

    /// Replace the domain, keeping the scale untouched on failure
    pub fn set_domain(&mut self, domain: [f64; 2]) -> Result<()> {
        if !is_valid_interval(domain) {
            return Err(TimelineError::InvalidScale {
                domain,
                range: self.range,
            });
        }
        self.domain = domain;
        Ok(())
    }

    /// Replace the range, keeping the scale untouched on failure
    pub fn set_range(&mut self, range: [f64; 2]) -> Result<()> {
        if !is_valid_interval(range) {
            return Err(TimelineError::InvalidScale {
                domain: self.domain,
                range,
            });
        }
        self.range = range;
        Ok(())
    }

    /// Copy of this scale with another domain
    pub fn with_domain(&self, domain: [f64; 2]) -> Result<Self> {
        Self::linear(domain, self.range)
    }

    /// Width of the domain (signed)
    pub fn domain_span(&self) -> f64 {
        self.domain[1] - self.domain[0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_apply_and_invert() {
        let scale = Scale::linear([0.0, 10.0], [0.0, 1000.0]).unwrap();
        assert_relative_eq!(scale.apply(2.5), 250.0);
        assert_relative_eq!(scale.invert(250.0), 2.5);

        for value in [-3.0, 0.0, 0.125, 7.77, 1e4] {
            assert_relative_eq!(scale.invert(scale.apply(value)), value, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_offset_range_and_descending_domain() {
        let scale = Scale::linear([1.0, -1.0], [20.0, 120.0]).unwrap();
        assert_relative_eq!(scale.apply(1.0), 20.0);
        assert_relative_eq!(scale.apply(-1.0), 120.0);
        assert_relative_eq!(scale.invert(scale.apply(0.3)), 0.3, epsilon = 1e-12);
    }

    #[test]
    fn test_extents_ignore_range_origin() {
        let scale = Scale::linear([0.0, 1.0], [50.0, 150.0]).unwrap();
        assert_relative_eq!(scale.apply_extent(0.5), 50.0);
        assert_relative_eq!(scale.invert_extent(25.0), 0.25);
    }

    #[test]
    fn test_rejects_degenerate_intervals() {
        assert!(Scale::linear([1.0, 1.0], [0.0, 10.0]).is_err());
        assert!(Scale::linear([0.0, 1.0], [5.0, 5.0]).is_err());
        assert!(Scale::linear([0.0, f64::NAN], [0.0, 5.0]).is_err());
        assert!(Scale::linear([0.0, 1.0], [0.0, f64::INFINITY]).is_err());

        let mut scale = Scale::linear([0.0, 1.0], [0.0, 100.0]).unwrap();
        assert!(scale.set_domain([2.0, 2.0]).is_err());
        assert!(scale.set_range([0.0, 0.0]).is_err());
        assert_eq!(scale.domain(), [0.0, 1.0]);
        assert_eq!(scale.range(), [0.0, 100.0]);
    }

    #[test]
    fn test_clone_is_independent() {
        let original = Scale::linear([0.0, 1.0], [0.0, 100.0]).unwrap();
        let mut copy = original;
        copy.set_domain([0.0, 2.0]).unwrap();
        assert_eq!(original.domain(), [0.0, 1.0]);
        assert_eq!(copy.domain(), [0.0, 2.0]);
    }
}
