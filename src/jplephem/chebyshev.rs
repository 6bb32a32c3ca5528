//! Chebyshev polynomial evaluation for SPK type 2 and type 3 records
//!
//! Every SPK record stores one Chebyshev series per coordinate over a fixed
//! time window. Evaluation uses the Clenshaw recurrence, which avoids building
//! each T_n(x) separately.

use crate::jplephem::errors::{JplephemError, Result};
use crate::jplephem::spk::seconds_to_jd;

/// Slack allowed past either end of [-1, 1] for round-off at record boundaries
const NORMALIZED_TOLERANCE: f64 = 1e-9;

/// A Chebyshev series `c0*T0(x) + c1*T1(x) + ... + cn*Tn(x)` on [-1, 1]
#[derive(Debug, Clone, Copy)]
pub struct ChebyshevPolynomial<'a> {
    coefficients: &'a [f64],
}

impl<'a> ChebyshevPolynomial<'a> {
    /// Wrap coefficients ordered from lowest to highest degree
    pub fn new(coefficients: &'a [f64]) -> Self {
        Self { coefficients }
    }

    /// Evaluate the series at x
    ///
    /// Returns NaN if x is outside [-1, 1].
    pub fn evaluate(&self, x: f64) -> f64 {
        if self.coefficients.is_empty() {
            return 0.0;
        }
        if !(-1.0..=1.0).contains(&x) {
            return f64::NAN;
        }

        // Clenshaw: b_k = c_k + 2x b_{k+1} - b_{k+2}
        let (mut b1, mut b2) = (0.0, 0.0);
        for &c in self.coefficients[1..].iter().rev() {
            let b0 = c + 2.0 * x * b1 - b2;
            b2 = b1;
            b1 = b0;
        }
        self.coefficients[0] + x * b1 - b2
    }
}

/// Map `time` into [-1, 1] for a record centred on `midpoint`
pub fn normalize_time(time: f64, midpoint: f64, radius: f64) -> Result<f64> {
    if radius <= 0.0 || !radius.is_finite() {
        return Err(JplephemError::InvalidFormat(format!(
            "Invalid record radius {radius}: must be positive"
        )));
    }

    let normalized = (time - midpoint) / radius;
    if normalized.abs() > 1.0 + NORMALIZED_TOLERANCE {
        return Err(JplephemError::OutOfRangeError {
            jd: seconds_to_jd(time),
            start_jd: seconds_to_jd(midpoint - radius),
            end_jd: seconds_to_jd(midpoint + radius),
        });
    }

    Ok(normalized.clamp(-1.0, 1.0))
}
