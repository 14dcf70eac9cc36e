// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! # Dataset Statistics
//!
//! One forward pass over the normalized records produces every aggregate the
//! charts need:
//!
//! - image and box width/height series (flattened, index-aligned)
//! - per-category box dimensions
//! - anchor ratios, one per box with positive sides
//! - category occurrences and per-category image presence
//! - distinct categories per image and boxes per image
//! - small/medium/large size buckets by box area
//!
//! Malformed geometry never aborts the pass. Boxes whose ratio cannot be
//! computed are left out of the ratio series only and reported through
//! [`Diagnostics`].

mod aggregator;
mod buckets;
mod ratio;

pub use aggregator::{AggregateResults, Diagnostics, Dimensions, RatioSkip, StatisticsAggregator};
pub use buckets::{MEDIUM_AREA_LIMIT, SMALL_AREA_LIMIT, SizeBucket, SizeBuckets};
pub use ratio::{RatioError, anchor_ratio};
