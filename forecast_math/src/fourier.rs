//! Fourier series terms for periodic (seasonal) effects
//!
//! A seasonality with period `P` and order `N` is represented by `2N` regressors:
//! `sin(2πkt/P)` and `cos(2πkt/P)` for `k = 1..=N`, where `t` is measured in days.

use crate::{MathError, Result};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// A truncated Fourier series with a fixed period and order
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FourierSeries {
    period: f64,
    order: usize,
}

impl FourierSeries {
    /// Create a new Fourier series with the given period (in days) and order
    pub fn new(period: f64, order: usize) -> Result<Self> {
        if !period.is_finite() || period <= 0.0 {
            return Err(MathError::InvalidInput(
                "Period must be a positive, finite number of days".to_string(),
            ));
        }
        if order == 0 {
            return Err(MathError::InvalidInput(
                "Fourier order must be at least 1".to_string(),
            ));
        }

        Ok(Self { period, order })
    }

    /// Get the period in days
    pub fn period(&self) -> f64 {
        self.period
    }

    /// Get the Fourier order
    pub fn order(&self) -> usize {
        self.order
    }

    /// Number of regressors this series contributes (a sine and cosine per order)
    pub fn width(&self) -> usize {
        2 * self.order
    }

    /// Evaluate the terms at time `t` (days), appending them to `out`
    ///
    /// Terms are laid out as `[sin_1, cos_1, sin_2, cos_2, ...]`.
    pub fn extend_terms(&self, t: f64, out: &mut Vec<f64>) {
        for k in 1..=self.order {
            let angle = 2.0 * PI * k as f64 * t / self.period;
            out.push(angle.sin());
            out.push(angle.cos());
        }
    }

    /// Evaluate the terms at time `t` (days)
    pub fn terms(&self, t: f64) -> Vec<f64> {
        let mut out = Vec::with_capacity(self.width());
        self.extend_terms(t, &mut out);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_invalid_parameters() {
        assert!(FourierSeries::new(0.0, 3).is_err());
        assert!(FourierSeries::new(-7.0, 3).is_err());
        assert!(FourierSeries::new(f64::NAN, 3).is_err());
        assert!(FourierSeries::new(7.0, 0).is_err());
    }

    #[test]
    fn test_terms_layout() {
        let weekly = FourierSeries::new(7.0, 3).unwrap();
        assert_eq!(weekly.width(), 6);

        let terms = weekly.terms(0.0);
        assert_eq!(terms.len(), 6);
        // At t = 0 every sine is 0 and every cosine is 1
        for pair in terms.chunks(2) {
            assert_abs_diff_eq!(pair[0], 0.0, epsilon = 1e-12);
            assert_abs_diff_eq!(pair[1], 1.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn test_terms_are_periodic() {
        let monthly = FourierSeries::new(30.5, 4).unwrap();
        let a = monthly.terms(3.0);
        let b = monthly.terms(3.0 + 30.5 * 2.0);

        for (x, y) in a.iter().zip(b.iter()) {
            assert_abs_diff_eq!(x, y, epsilon = 1e-9);
        }
    }
}
