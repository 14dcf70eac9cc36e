// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use serde::Serialize;
use std::fmt;

/// Upper bound (exclusive) of the `small` bucket: 32×32 pixels.
pub const SMALL_AREA_LIMIT: f64 = 32.0 * 32.0;
/// Upper bound (exclusive) of the `medium` bucket: 96×96 pixels.
pub const MEDIUM_AREA_LIMIT: f64 = 96.0 * 96.0;

/// Object scale class derived from box area.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeBucket {
    Small,
    Medium,
    Large,
}

impl SizeBucket {
    /// Buckets in ascending order.
    pub const ALL: [SizeBucket; 3] = [SizeBucket::Small, SizeBucket::Medium, SizeBucket::Large];

    /// Classify a (possibly negative) area.
    ///
    /// Zero and negative areas are `Small`. A NaN area fails both bounds and
    /// lands in `Large`, which keeps the three buckets a total partition.
    pub fn classify(area: f64) -> Self {
        if area < SMALL_AREA_LIMIT {
            SizeBucket::Small
        } else if area < MEDIUM_AREA_LIMIT {
            SizeBucket::Medium
        } else {
            SizeBucket::Large
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SizeBucket::Small => "small",
            SizeBucket::Medium => "medium",
            SizeBucket::Large => "large",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Box counts per [`SizeBucket`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SizeBuckets {
    pub small: usize,
    pub medium: usize,
    pub large: usize,
}

impl SizeBuckets {
    /// Count every `(width, height)` pair by the bucket of its product.
    pub fn from_dimensions(widths: &[f64], heights: &[f64]) -> Self {
        let mut buckets = Self::default();
        for (w, h) in widths.iter().zip(heights) {
            buckets.add(SizeBucket::classify(w * h));
        }
        buckets
    }

    fn add(&mut self, bucket: SizeBucket) {
        match bucket {
            SizeBucket::Small => self.small += 1,
            SizeBucket::Medium => self.medium += 1,
            SizeBucket::Large => self.large += 1,
        }
    }

    pub fn get(&self, bucket: SizeBucket) -> usize {
        match bucket {
            SizeBucket::Small => self.small,
            SizeBucket::Medium => self.medium,
            SizeBucket::Large => self.large,
        }
    }

    pub fn total(&self) -> usize {
        self.small + self.medium + self.large
    }

    /// `(bucket, count)` pairs in ascending bucket order.
    pub fn iter(&self) -> impl Iterator<Item = (SizeBucket, usize)> + '_ {
        SizeBucket::ALL.into_iter().map(|b| (b, self.get(b)))
    }
}
