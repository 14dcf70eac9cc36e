// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Format selection and the common reader interface.

use crate::{
    Error,
    coco::{CocoReadOptions, CocoReader},
    record::AnnotationRecord,
    voc::{VocReadOptions, VocReader},
};
use log::info;
use std::{fmt, path::Path, str::FromStr};

/// Supported on-disk annotation formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatasetFormat {
    /// Pascal VOC: a directory of per-image XML files.
    Voc,
    /// COCO: one JSON file (or a ZIP of them) with shared tables.
    Coco,
}

impl FromStr for DatasetFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "voc" => Ok(DatasetFormat::Voc),
            "coco" => Ok(DatasetFormat::Coco),
            _ => Err(Error::UnsupportedFormat(format!(
                "'{}', only voc and coco are supported",
                s
            ))),
        }
    }
}

impl fmt::Display for DatasetFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DatasetFormat::Voc => write!(f, "voc"),
            DatasetFormat::Coco => write!(f, "coco"),
        }
    }
}

/// Converts a dataset on disk into records, one per image, in a stable order.
pub trait AnnotationReader {
    fn read(&self, path: &Path) -> Result<Vec<AnnotationRecord>, Error>;
}

/// Options shared by [`read_dataset`]; each reader uses the ones it knows.
#[derive(Debug, Clone, Default)]
pub struct ReadOptions {
    /// VOC: skip objects marked `<difficult>1</difficult>`.
    pub ignore_difficult: bool,
    /// COCO: maximum number of images to read (0 = unlimited).
    pub max_images: usize,
    /// COCO: keep only these category names (empty = all).
    pub category_filter: Vec<String>,
}

/// Read a dataset with the reader for `format`.
pub fn read_dataset(
    format: DatasetFormat,
    path: impl AsRef<Path>,
    options: &ReadOptions,
) -> Result<Vec<AnnotationRecord>, Error> {
    let path = path.as_ref();
    let records = match format {
        DatasetFormat::Voc => VocReader::with_options(VocReadOptions {
            ignore_difficult: options.ignore_difficult,
        })
        .read(path)?,
        DatasetFormat::Coco => CocoReader::with_options(CocoReadOptions {
            max_images: options.max_images,
            category_filter: options.category_filter.clone(),
        })
        .read(path)?,
    };

    info!(
        "Read {} images from {} dataset {}",
        records.len(),
        format,
        path.display()
    );
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_from_str() {
        assert_eq!("voc".parse::<DatasetFormat>().unwrap(), DatasetFormat::Voc);
        assert_eq!("COCO".parse::<DatasetFormat>().unwrap(), DatasetFormat::Coco);
        assert_eq!(" Voc ".parse::<DatasetFormat>().unwrap(), DatasetFormat::Voc);
    }

    #[test]
    fn test_unsupported_format() {
        let err = "yolo".parse::<DatasetFormat>().unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat(_)));
        assert!(err.to_string().contains("yolo"));
    }

    #[test]
    fn test_format_display_roundtrip() {
        for format in [DatasetFormat::Voc, DatasetFormat::Coco] {
            assert_eq!(format.to_string().parse::<DatasetFormat>().unwrap(), format);
        }
    }

    #[test]
    fn test_missing_path_is_fatal() {
        let options = ReadOptions::default();
        assert!(read_dataset(DatasetFormat::Voc, "/nonexistent/voc", &options).is_err());
        assert!(read_dataset(DatasetFormat::Coco, "/nonexistent/coco.json", &options).is_err());
    }
}
