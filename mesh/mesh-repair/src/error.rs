//! Error types for mesh repair.
//!
//! Validation and [`repair_mesh`](crate::repair_mesh) never fail; these
//! errors come from checking parameters up front.

use thiserror::Error;

/// Result type for repair helpers.
pub type RepairResult<T> = Result<T, RepairError>;

/// Errors raised by repair parameter checks.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RepairError {
    /// A tolerance or threshold is negative or not finite.
    #[error("invalid parameter {name}: {value}")]
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Rejected value.
        value: f64,
    },
}

impl RepairError {
    /// Reject `value` for parameter `name`.
    #[must_use]
    pub const fn invalid(name: &'static str, value: f64) -> Self {
        Self::InvalidParameter { name, value }
    }
}

/// Accept finite, non-negative values.
pub(crate) fn check_non_negative(name: &'static str, value: f64) -> RepairResult<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(RepairError::invalid(name, value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_is_rejected() {
        let err = check_non_negative("merge_tolerance", -1.0).unwrap_err();
        assert_eq!(err, RepairError::invalid("merge_tolerance", -1.0));
        assert_eq!(err.to_string(), "invalid parameter merge_tolerance: -1");
    }

    #[test]
    fn nan_is_rejected() {
        assert!(check_non_negative("x", f64::NAN).is_err());
        assert!(check_non_negative("x", 0.0).is_ok());
    }
}
