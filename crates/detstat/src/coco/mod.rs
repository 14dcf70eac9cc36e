// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! # COCO Dataset Format Support
//!
//! Reads COCO (Common Objects in Context) detection annotations and converts
//! them into per-image [`AnnotationRecord`](crate::AnnotationRecord)s.
//!
//! COCO boxes are stored as `[x, y, width, height]`; they are converted to
//! corner form (`xmax = x + width`, `ymax = y + height`) without rounding.
//!
//! ## Example
//!
//! ```rust,no_run
//! use detstat::{AnnotationReader, coco::CocoReader};
//! use std::path::Path;
//!
//! let records = CocoReader::new().read(Path::new("annotations/instances_val2017.json"))?;
//! println!("Found {} images", records.len());
//! # Ok::<(), detstat::Error>(())
//! ```

mod reader;
mod types;

pub use types::{CocoAnnotation, CocoCategory, CocoDataset, CocoImage, CocoIndex};

pub use reader::{CocoReadOptions, CocoReader, to_records};
