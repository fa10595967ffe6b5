//! Lagrange interpolation at zero.
//!
//! ```text
//! f(0) = sum_i  y_i * prod_{j != i} (0 - x_j) / (x_i - x_j)     (mod p)
//! ```
//!
//! Given `k` consistent points this is exactly the constant term. Given
//! points from a different polynomial, or too few points accepted by a
//! misconfigured caller, the result is silently wrong: shares carry no
//! integrity check.

use std::collections::HashSet;

use num_bigint::BigUint;
use num_traits::{One, Zero};

use crate::error::{Result, SharingError};
use crate::field::PrimeField;
use crate::part::Point;

/// Recover `f(0)` from the first `required` of `points`.
pub fn interpolate_at_zero(
    points: &[Point],
    required: usize,
    field: &PrimeField,
) -> Result<BigUint> {
    if required == 0 {
        return Err(SharingError::invalid("threshold must be at least 1"));
    }
    if points.len() < required {
        return Err(SharingError::reconstruction(format!(
            "insufficient points: got {}, need {required}",
            points.len()
        )));
    }

    let mut seen = HashSet::with_capacity(points.len());
    for point in points {
        if !seen.insert(field.reduce(point.x())) {
            return Err(SharingError::reconstruction(format!(
                "duplicate x coordinate {}",
                point.x()
            )));
        }
    }

    let points = &points[..required];
    let mut secret = BigUint::zero();

    for (i, pi) in points.iter().enumerate() {
        let mut numerator = BigUint::one();
        let mut denominator = BigUint::one();

        for (j, pj) in points.iter().enumerate() {
            if i != j {
                numerator = field.mul(&numerator, &field.neg(pj.x()));
                denominator = field.mul(&denominator, &field.sub(pi.x(), pj.x()));
            }
        }

        let basis = field.div(&numerator, &denominator).map_err(|e| {
            SharingError::reconstruction(format!("points are not interpolable: {e}"))
        })?;
        secret = field.add(&secret, &field.mul(&field.reduce(pi.y()), &basis));
    }

    Ok(secret)
}
