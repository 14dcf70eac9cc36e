// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! COCO JSON/ZIP readers.
//!
//! Reads COCO annotation files from JSON files or ZIP archives and flattens
//! the shared image/annotation/category tables into per-image records.

use super::types::*;
use crate::{
    Error,
    reader::AnnotationReader,
    record::{AnnotationRecord, BoundingBox},
};
use log::debug;
use std::collections::HashSet;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// Options for COCO reading.
#[derive(Debug, Clone, Default)]
pub struct CocoReadOptions {
    /// Maximum number of images to read (0 = unlimited).
    pub max_images: usize,
    /// Filter by category names (empty = all).
    pub category_filter: Vec<String>,
}

/// COCO reader producing one record per image.
///
/// # Example
///
/// ```rust,no_run
/// use detstat::coco::CocoReader;
///
/// let reader = CocoReader::new();
/// let dataset = reader.read_json("annotations/instances_val2017.json")?;
/// let records = detstat::coco::to_records(&dataset)?;
/// println!("Loaded {} images", records.len());
/// # Ok::<(), detstat::Error>(())
/// ```
pub struct CocoReader {
    options: CocoReadOptions,
}

impl CocoReader {
    /// Create a new COCO reader with default options.
    pub fn new() -> Self {
        Self {
            options: CocoReadOptions::default(),
        }
    }

    /// Create a new COCO reader with custom options.
    pub fn with_options(options: CocoReadOptions) -> Self {
        Self { options }
    }

    /// Read COCO dataset from a JSON file.
    pub fn read_json<P: AsRef<Path>>(&self, path: P) -> Result<CocoDataset, Error> {
        let file = File::open(path.as_ref())?;
        let reader = BufReader::with_capacity(64 * 1024, file);
        let dataset: CocoDataset = serde_json::from_reader(reader)?;

        Ok(self.apply_filters(dataset))
    }

    /// Read COCO annotations from a ZIP file.
    ///
    /// Every `*.json` entry whose name contains `instances` is parsed and the
    /// results are merged with [`CocoDataset::merge`].
    pub fn read_annotations_zip<P: AsRef<Path>>(&self, path: P) -> Result<CocoDataset, Error> {
        let file = File::open(path.as_ref())?;
        let mut archive = zip::ZipArchive::new(file)?;

        let mut merged = CocoDataset::default();

        for i in 0..archive.len() {
            let mut entry = archive.by_index(i)?;
            let name = entry.name().to_string();

            if name.ends_with(".json") && name.contains("instances") {
                debug!("Reading {} from {}", name, path.as_ref().display());
                let mut contents = String::new();
                entry.read_to_string(&mut contents)?;

                merged.merge(serde_json::from_str(&contents)?);
            }
        }

        Ok(self.apply_filters(merged))
    }

    /// Drop images past `max_images` and categories outside
    /// `category_filter`, along with their annotations.
    ///
    /// Only annotations pointing at something removed here are dropped, so
    /// dangling references in the file still reach [`to_records`].
    fn apply_filters(&self, mut dataset: CocoDataset) -> CocoDataset {
        let CocoReadOptions {
            max_images,
            category_filter,
        } = &self.options;

        let mut dropped_images = HashSet::new();
        if *max_images > 0 && dataset.images.len() > *max_images {
            dropped_images.extend(dataset.images.drain(*max_images..).map(|i| i.id));
            debug!("Skipping {} images past the limit", dropped_images.len());
        }

        let mut dropped_categories = HashSet::new();
        if !category_filter.is_empty() {
            dataset.categories.retain(|c| {
                let keep = category_filter.contains(&c.name);
                if !keep {
                    dropped_categories.insert(c.id);
                }
                keep
            });
        }

        if !dropped_images.is_empty() || !dropped_categories.is_empty() {
            dataset.annotations.retain(|a| {
                !dropped_images.contains(&a.image_id) && !dropped_categories.contains(&a.category_id)
            });
        }

        dataset
    }
}

impl Default for CocoReader {
    fn default() -> Self {
        Self::new()
    }
}

impl AnnotationReader for CocoReader {
    /// Read a `.zip` archive or a JSON file and flatten it into records.
    fn read(&self, path: &Path) -> Result<Vec<AnnotationRecord>, Error> {
        let dataset = if path.extension().is_some_and(|e| e.eq_ignore_ascii_case("zip")) {
            self.read_annotations_zip(path)?
        } else {
            self.read_json(path)?
        };
        to_records(&dataset)
    }
}

/// Flatten a COCO dataset into one record per entry of `images`.
///
/// Records follow the order of the `images` table; an image without
/// annotations yields a record with no boxes. An annotation that references
/// an unknown image or category is an error.
pub fn to_records(dataset: &CocoDataset) -> Result<Vec<AnnotationRecord>, Error> {
    let index = CocoIndex::from_dataset(dataset);

    if let Some(ann) = dataset
        .annotations
        .iter()
        .find(|a| !index.images.contains_key(&a.image_id))
    {
        return Err(Error::CocoError(format!(
            "Annotation {} references non-existent image_id {}",
            ann.id, ann.image_id
        )));
    }

    dataset
        .images
        .iter()
        .map(|image| {
            let boxes = index
                .annotations_for_image(image.id)
                .iter()
                .map(|ann| {
                    let name = index.label_name(ann.category_id).ok_or_else(|| {
                        Error::CocoError(format!(
                            "Annotation {} references non-existent category_id {}",
                            ann.id, ann.category_id
                        ))
                    })?;
                    let (xmin, ymin, xmax, ymax) = ann.corners();
                    Ok(BoundingBox::new(xmin, ymin, xmax, ymax, name))
                })
                .collect::<Result<Vec<_>, Error>>()?;

            Ok(AnnotationRecord {
                image_id: image.file_name.clone(),
                width: image.width,
                height: image.height,
                boxes,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_dataset() -> CocoDataset {
        CocoDataset {
            images: vec![
                CocoImage {
                    id: 10,
                    width: 640.0,
                    height: 480.0,
                    file_name: "b.jpg".to_string(),
                },
                CocoImage {
                    id: 5,
                    width: 320.0,
                    height: 240.0,
                    file_name: "a.jpg".to_string(),
                },
            ],
            categories: vec![
                CocoCategory {
                    id: 1,
                    name: "person".to_string(),
                },
                CocoCategory {
                    id: 2,
                    name: "car".to_string(),
                },
            ],
            annotations: vec![
                CocoAnnotation {
                    id: 1,
                    image_id: 10,
                    category_id: 1,
                    bbox: [10.0, 20.0, 30.0, 40.0],
                    ..Default::default()
                },
                CocoAnnotation {
                    id: 2,
                    image_id: 10,
                    category_id: 2,
                    bbox: [0.5, 0.5, 0.0, 8.0],
                    ..Default::default()
                },
            ],
        }
    }

    #[test]
    fn test_reader_default() {
        let reader = CocoReader::new();
        assert_eq!(reader.options.max_images, 0);
        assert!(reader.options.category_filter.is_empty());
    }

    #[test]
    fn test_to_records_follows_image_table_order() {
        let records = to_records(&sample_dataset()).unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].image_id, "b.jpg");
        assert_eq!(records[0].width, 640.0);
        assert_eq!(records[0].boxes.len(), 2);
        assert_eq!(
            records[0].boxes[0],
            BoundingBox::new(10.0, 20.0, 40.0, 60.0, "person")
        );
        assert_eq!(records[0].boxes[1].width(), 0.0);
        assert_eq!(records[1].image_id, "a.jpg");
        assert!(records[1].boxes.is_empty());
    }

    #[test]
    fn test_to_records_unknown_image() {
        let mut dataset = sample_dataset();
        dataset.annotations[0].image_id = 999;
        let err = to_records(&dataset).unwrap_err();
        assert!(matches!(err, Error::CocoError(_)));
        assert!(err.to_string().contains("image_id 999"));
    }

    #[test]
    fn test_to_records_unknown_category() {
        let mut dataset = sample_dataset();
        dataset.annotations[1].category_id = 42;
        assert!(matches!(to_records(&dataset), Err(Error::CocoError(_))));
    }

    #[test]
    fn test_filters_keep_dangling_references() {
        let reader = CocoReader::with_options(CocoReadOptions {
            max_images: 1,
            category_filter: vec!["person".to_string()],
        });
        let mut dataset = sample_dataset();
        dataset.annotations[0].image_id = 999;

        let filtered = reader.apply_filters(dataset);
        assert_eq!(filtered.annotations.len(), 1);
        assert!(matches!(to_records(&filtered), Err(Error::CocoError(_))));
    }

    #[test]
    fn test_apply_max_images_filter() {
        let reader = CocoReader::with_options(CocoReadOptions {
            max_images: 1,
            ..Default::default()
        });

        let filtered = reader.apply_filters(sample_dataset());
        assert_eq!(filtered.images.len(), 1);
        assert_eq!(filtered.annotations.len(), 2);

        let reader = CocoReader::with_options(CocoReadOptions {
            max_images: 1,
            ..Default::default()
        });
        let mut dataset = sample_dataset();
        dataset.images.reverse();
        let filtered = reader.apply_filters(dataset);
        assert_eq!(filtered.images[0].file_name, "a.jpg");
        assert!(filtered.annotations.is_empty());
    }

    #[test]
    fn test_apply_category_filter() {
        let reader = CocoReader::with_options(CocoReadOptions {
            category_filter: vec!["car".to_string()],
            ..Default::default()
        });

        let filtered = reader.apply_filters(sample_dataset());
        assert_eq!(filtered.categories.len(), 1);
        assert_eq!(filtered.annotations.len(), 1);
        assert_eq!(filtered.annotations[0].category_id, 2);
        // Images are kept so per-image statistics still see them
        assert_eq!(filtered.images.len(), 2);
    }
}
