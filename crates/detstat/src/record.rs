// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Normalized per-image annotation records.
//!
//! Both readers produce the same shape: one [`AnnotationRecord`] per image
//! holding the image size and its boxes in corner (`xmin, ymin, xmax, ymax`)
//! form. Nothing here validates geometry; a box whose `xmax` is left of its
//! `xmin` keeps its negative width.

use serde::{Deserialize, Serialize};

/// Axis-aligned box in corner coordinates with its category label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub xmin: f64,
    pub ymin: f64,
    pub xmax: f64,
    pub ymax: f64,
    /// Class label, taken verbatim from the dataset.
    pub category: String,
}

impl BoundingBox {
    /// Create a new bounding box.
    pub fn new(xmin: f64, ymin: f64, xmax: f64, ymax: f64, category: impl Into<String>) -> Self {
        Self {
            xmin,
            ymin,
            xmax,
            ymax,
            category: category.into(),
        }
    }

    /// `xmax - xmin`, which may be zero or negative.
    pub fn width(&self) -> f64 {
        self.xmax - self.xmin
    }

    /// `ymax - ymin`, which may be zero or negative.
    pub fn height(&self) -> f64 {
        self.ymax - self.ymin
    }

    /// Signed area, `width * height`.
    pub fn area(&self) -> f64 {
        self.width() * self.height()
    }
}

/// All annotations of one image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotationRecord {
    /// File name or other identifier, unique within a dataset.
    pub image_id: String,
    /// Image width in pixels; `0.0` when the source did not provide one.
    pub width: f64,
    /// Image height in pixels; `0.0` when the source did not provide one.
    pub height: f64,
    #[serde(default)]
    pub boxes: Vec<BoundingBox>,
}

impl AnnotationRecord {
    /// Create a record with no boxes.
    pub fn new(image_id: impl Into<String>, width: f64, height: f64) -> Self {
        Self {
            image_id: image_id.into(),
            width,
            height,
            boxes: Vec::new(),
        }
    }

    /// Builder-style helper appending one box.
    pub fn with_box(mut self, bbox: BoundingBox) -> Self {
        self.boxes.push(bbox);
        self
    }

    /// Number of boxes annotated on this image.
    pub fn box_count(&self) -> usize {
        self.boxes.len()
    }

    /// True when width and height are both positive finite numbers.
    pub fn has_valid_size(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width > 0.0 && self.height > 0.0
    }
}
