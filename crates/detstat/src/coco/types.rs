// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! COCO JSON data structures for serde deserialization.
//!
//! Only the fields needed for box statistics are modelled. Dataset info,
//! supercategories, crowd flags, segmentation, keypoints and captions are
//! ignored when present.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Top-level COCO dataset structure.
///
/// This is the root structure for COCO annotation files like `instances_train2017.json`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocoDataset {
    /// List of images in the dataset.
    pub images: Vec<CocoImage>,
    /// List of annotations (one per object instance).
    #[serde(default)]
    pub annotations: Vec<CocoAnnotation>,
    /// List of object categories/classes.
    #[serde(default)]
    pub categories: Vec<CocoCategory>,
}

impl CocoDataset {
    /// Append `other`, keeping the first image and category seen for each id.
    ///
    /// Annotations are appended unchanged; `other` may itself repeat ids.
    pub fn merge(&mut self, other: CocoDataset) {
        let mut image_ids: HashSet<u64> = self.images.iter().map(|i| i.id).collect();
        self.images
            .extend(other.images.into_iter().filter(|i| image_ids.insert(i.id)));

        let mut category_ids: HashSet<u32> = self.categories.iter().map(|c| c.id).collect();
        self.categories.extend(
            other
                .categories
                .into_iter()
                .filter(|c| category_ids.insert(c.id)),
        );

        self.annotations.extend(other.annotations);
    }
}

/// Image metadata.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocoImage {
    /// Unique image ID.
    pub id: u64,
    /// Image width in pixels, `0.0` when absent.
    #[serde(default)]
    pub width: f64,
    /// Image height in pixels, `0.0` when absent.
    #[serde(default)]
    pub height: f64,
    /// Filename (relative path within the images folder).
    pub file_name: String,
}

/// Category definition.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocoCategory {
    /// Unique category ID.
    pub id: u32,
    /// Category name (e.g., "person", "car").
    pub name: String,
}

/// Object annotation. Only the box is read.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CocoAnnotation {
    /// Unique annotation ID.
    pub id: u64,
    /// ID of the image containing this object.
    pub image_id: u64,
    /// Category ID of this object.
    pub category_id: u32,
    /// Bounding box: `[x, y, width, height]` in pixels (top-left corner).
    pub bbox: [f64; 4],
}

impl CocoAnnotation {
    /// Box corners as `(xmin, ymin, xmax, ymax)`.
    pub fn corners(&self) -> (f64, f64, f64, f64) {
        let [x, y, w, h] = self.bbox;
        (x, y, x + w, y + h)
    }
}

/// Borrowed lookup tables over a `CocoDataset`.
#[derive(Debug, Clone)]
pub struct CocoIndex<'a> {
    /// `image_id` → `CocoImage`
    pub images: HashMap<u64, &'a CocoImage>,
    /// `category_id` → `CocoCategory`
    pub categories: HashMap<u32, &'a CocoCategory>,
    /// `image_id` → annotations in file order
    pub annotations_by_image: HashMap<u64, Vec<&'a CocoAnnotation>>,
}

impl<'a> CocoIndex<'a> {
    /// Build lookup index from a `CocoDataset`.
    pub fn from_dataset(dataset: &'a CocoDataset) -> Self {
        let images = dataset.images.iter().map(|img| (img.id, img)).collect();
        let categories = dataset.categories.iter().map(|cat| (cat.id, cat)).collect();

        let mut annotations_by_image: HashMap<u64, Vec<&CocoAnnotation>> = HashMap::new();
        for ann in &dataset.annotations {
            annotations_by_image.entry(ann.image_id).or_default().push(ann);
        }

        Self {
            images,
            categories,
            annotations_by_image,
        }
    }

    /// Get the label name for a category ID.
    pub fn label_name(&self, category_id: u32) -> Option<&'a str> {
        self.categories.get(&category_id).map(|c| c.name.as_str())
    }

    /// Get annotations for an image.
    pub fn annotations_for_image(&self, image_id: u64) -> &[&'a CocoAnnotation] {
        self.annotations_by_image
            .get(&image_id)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}
