// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use serde::Serialize;
use std::fmt;

/// Reason a box has no anchor ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RatioError {
    /// The shorter side is exactly zero.
    ZeroDimension,
    /// The shorter side is negative (inverted corners).
    NegativeDimension,
    /// Width or height is NaN or infinite.
    NonFinite,
}

impl fmt::Display for RatioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatioError::ZeroDimension => write!(f, "zero width or height"),
            RatioError::NegativeDimension => write!(f, "negative width or height"),
            RatioError::NonFinite => write!(f, "non-finite width or height"),
        }
    }
}

/// Rounded ratio of the longer side to the shorter side.
///
/// Halves round to even, so `2.5` becomes `2` and `3.5` becomes `4`. The
/// result is symmetric in its arguments and at least `1` for any pair of
/// positive sides.
pub fn anchor_ratio(width: f64, height: f64) -> Result<u64, RatioError> {
    if !width.is_finite() || !height.is_finite() {
        return Err(RatioError::NonFinite);
    }

    let (long, short) = if width > height {
        (width, height)
    } else {
        (height, width)
    };

    if short == 0.0 {
        Err(RatioError::ZeroDimension)
    } else if short < 0.0 {
        Err(RatioError::NegativeDimension)
    } else {
        Ok((long / short).round_ties_even() as u64)
    }
}
