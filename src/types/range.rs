// src/types/range.rs

use std::fmt;

use crate::error::ValidationError;

/// An optionally bounded `[min, max]` interval.
///
/// Either bound may be absent (unbounded on that side). A constructed
/// `Range` always satisfies `min <= max` when both bounds are present, and
/// never holds an unordered value such as `NaN`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Range<T> {
    min: Option<T>,
    max: Option<T>,
}

impl<T> Default for Range<T> {
    fn default() -> Self {
        Range {
            min: None,
            max: None,
        }
    }
}

impl<T: PartialOrd + Copy + fmt::Display> Range<T> {
    /// Creates a range, failing if a bound is unordered or `min > max`.
    ///
    /// `field` names the value being bounded and is carried in the error.
    pub fn new(field: &str, min: Option<T>, max: Option<T>) -> Result<Self, ValidationError> {
        for (side, bound) in [("minimum", min), ("maximum", max)] {
            if let Some(value) = bound {
                // Only NaN-like values fail to compare with themselves.
                if value.partial_cmp(&value).is_none() {
                    return Err(ValidationError::new(
                        field,
                        format!("{} must be a comparable number", side),
                    ));
                }
            }
        }
        if let (Some(lo), Some(hi)) = (min, max) {
            if lo > hi {
                return Err(ValidationError::new(
                    field,
                    format!("minimum {} must not be greater than maximum {}", lo, hi),
                ));
            }
        }
        Ok(Range { min, max })
    }

    pub fn unbounded() -> Self {
        Range::default()
    }

    /// Checks that every present bound lies within `[lower, upper]`.
    pub fn within(self, field: &str, lower: T, upper: T) -> Result<Self, ValidationError> {
        for value in [self.min, self.max].into_iter().flatten() {
            check_within(field, value, lower, upper)?;
        }
        Ok(self)
    }
}

impl<T: Copy> Range<T> {
    pub fn min(&self) -> Option<T> {
        self.min
    }

    pub fn max(&self) -> Option<T> {
        self.max
    }

    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    /// Applies a monotonic non-decreasing function to both bounds.
    ///
    /// Used for unit conversion and clamping, neither of which can reorder
    /// the bounds, so the result is not re-validated.
    pub(crate) fn map<U>(&self, f: impl Fn(T) -> U) -> Range<U> {
        Range {
            min: self.min.map(&f),
            max: self.max.map(&f),
        }
    }
}

/// Fails unless `lower <= value <= upper`.
pub fn check_within<T: PartialOrd + fmt::Display + Copy>(
    field: &str,
    value: T,
    lower: T,
    upper: T,
) -> Result<(), ValidationError> {
    if !(lower..=upper).contains(&value) {
        return Err(ValidationError::new(
            field,
            format!("{} is outside [{}, {}]", value, lower, upper),
        ));
    }
    Ok(())
}

/// Fails unless `value` is finite and strictly positive.
pub fn check_positive(field: &str, value: f64) -> Result<(), ValidationError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ValidationError::new(
            field,
            format!("{} must be a finite number greater than 0", value),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_ended_ranges_are_valid() {
        let r = Range::new("magnitude", Some(5.0), None).unwrap();
        assert_eq!(r.min(), Some(5.0));
        assert_eq!(r.max(), None);
        assert!(Range::<f64>::unbounded().is_unbounded());
    }

    #[test]
    fn equal_bounds_are_valid() {
        assert!(Range::new("magnitude", Some(6.66), Some(6.66)).is_ok());
    }

    #[test]
    fn nan_bound_is_rejected() {
        let err = Range::new("depth", Some(f64::NAN), None).unwrap_err();
        assert_eq!(err.field, "depth");
    }

    #[test]
    fn within_checks_each_bound() {
        let r = Range::new("intensity", Some(2.0), Some(13.0)).unwrap();
        let err = r.within("intensity", 0.0, 12.0).unwrap_err();
        assert!(err.constraint.contains("13"));
    }

    #[test]
    fn check_within_reports_value_and_bounds() {
        assert!(check_within("latitude", 90.0, -90.0, 90.0).is_ok());
        let err = check_within("latitude", 91.0, -90.0, 90.0).unwrap_err();
        assert_eq!(err.constraint, "91 is outside [-90, 90]");
        assert!(check_within("latitude", f64::NAN, -90.0, 90.0).is_err());
    }

    #[test]
    fn check_positive_rejects_zero_and_infinity() {
        assert!(check_positive("radius", 0.0).is_err());
        assert!(check_positive("radius", f64::INFINITY).is_err());
        assert!(check_positive("radius", 0.5).is_ok());
    }
}
