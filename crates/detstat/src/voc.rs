// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Pascal VOC XML reader.
//!
//! A VOC dataset is a directory holding one XML file per image:
//!
//! ```xml
//! <annotation>
//!   <filename>000001.jpg</filename>
//!   <size><width>353</width><height>500</height><depth>3</depth></size>
//!   <object>
//!     <name>dog</name>
//!     <difficult>0</difficult>
//!     <bndbox><xmin>48</xmin><ymin>240</ymin><xmax>195</xmax><ymax>371</ymax></bndbox>
//!   </object>
//! </annotation>
//! ```
//!
//! Files are parsed in parallel and returned in file-name order.

use crate::{
    Error,
    reader::AnnotationReader,
    record::{AnnotationRecord, BoundingBox},
};
use log::debug;
use rayon::prelude::*;
use roxmltree::{Document, Node};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Options for VOC reading.
#[derive(Debug, Clone, Default)]
pub struct VocReadOptions {
    /// Skip objects marked `<difficult>1</difficult>`.
    pub ignore_difficult: bool,
}

/// Reader for a directory of VOC XML files, or a single XML file.
#[derive(Debug, Clone, Default)]
pub struct VocReader {
    options: VocReadOptions,
}

impl VocReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(options: VocReadOptions) -> Self {
        Self { options }
    }

    /// List the `*.xml` files directly inside `dir`, sorted by file name.
    ///
    /// Symlinks are followed, so split directories made of links to a
    /// shared annotation pool read the same as copies. A dangling link is an
    /// error.
    pub fn list_files(dir: &Path) -> Result<Vec<PathBuf>, Error> {
        let mut files = Vec::new();
        for entry in WalkDir::new(dir)
            .min_depth(1)
            .max_depth(1)
            .follow_links(true)
            .sort_by_file_name()
        {
            let entry = entry?;
            if entry.file_type().is_file() && is_xml(entry.path()) {
                files.push(entry.into_path());
            }
        }
        Ok(files)
    }

    /// Parse one annotation file.
    pub fn read_file(&self, path: &Path) -> Result<AnnotationRecord, Error> {
        debug!("Reading {}", path.display());
        let text = std::fs::read_to_string(path)?;
        let fallback_id = path
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.parse(&text, &fallback_id, &path.display().to_string())
    }

    /// Parse annotation XML. `fallback_id` is used when `<filename>` is
    /// missing; `source` names the document in error messages.
    pub fn parse(
        &self,
        xml: &str,
        fallback_id: &str,
        source: &str,
    ) -> Result<AnnotationRecord, Error> {
        let doc = Document::parse(xml)?;
        let root = doc.root_element();

        let image_id = child_text(root, "filename")
            .filter(|s| !s.is_empty())
            .unwrap_or(fallback_id)
            .to_string();

        let size = child(root, "size");
        let width = size.and_then(|s| parse_number(s, "width")).unwrap_or(0.0);
        let height = size.and_then(|s| parse_number(s, "height")).unwrap_or(0.0);

        let mut record = AnnotationRecord::new(image_id, width, height);

        for (index, object) in root
            .children()
            .filter(|n| n.has_tag_name("object"))
            .enumerate()
        {
            if self.options.ignore_difficult && is_difficult(object) {
                debug!("{}: skipping difficult object {}", source, index);
                continue;
            }

            let name = child_text(object, "name")
                .filter(|s| !s.is_empty())
                .ok_or_else(|| {
                    Error::InvalidAnnotation(format!("{}: object {} has no <name>", source, index))
                })?;

            let bndbox = child(object, "bndbox").ok_or_else(|| {
                Error::InvalidAnnotation(format!("{}: object {} has no <bndbox>", source, index))
            })?;

            let coord = |tag: &str| -> Result<f64, Error> {
                parse_number(bndbox, tag).ok_or_else(|| {
                    Error::InvalidAnnotation(format!(
                        "{}: object {} has a missing or invalid <{}>",
                        source, index, tag
                    ))
                })
            };

            record.boxes.push(BoundingBox::new(
                coord("xmin")?,
                coord("ymin")?,
                coord("xmax")?,
                coord("ymax")?,
                name,
            ));
        }

        Ok(record)
    }
}

impl AnnotationReader for VocReader {
    fn read(&self, path: &Path) -> Result<Vec<AnnotationRecord>, Error> {
        if path.is_file() {
            return Ok(vec![self.read_file(path)?]);
        }
        if !path.is_dir() {
            return Err(Error::InvalidParameters(format!(
                "{} is not an annotation directory or XML file",
                path.display()
            )));
        }

        let files = Self::list_files(path)?;
        debug!("Found {} XML files in {}", files.len(), path.display());

        files.par_iter().map(|file| self.read_file(file)).collect()
    }
}

fn is_xml(path: &Path) -> bool {
    path.extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("xml"))
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn child_text<'a>(node: Node<'a, '_>, tag: &str) -> Option<&'a str> {
    child(node, tag).and_then(|n| n.text()).map(str::trim)
}

fn parse_number(node: Node<'_, '_>, tag: &str) -> Option<f64> {
    child_text(node, tag).and_then(|s| s.parse().ok())
}

fn is_difficult(object: Node<'_, '_>) -> bool {
    child_text(object, "difficult").is_some_and(|s| s.parse::<i64>().ok() == Some(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<annotation>
        <folder>VOC2007</folder>
        <filename>000005.jpg</filename>
        <size><width>500</width><height>375</height><depth>3</depth></size>
        <object>
            <name>chair</name>
            <difficult>0</difficult>
            <bndbox><xmin>263</xmin><ymin>211</ymin><xmax>324</xmax><ymax>339</ymax></bndbox>
        </object>
        <object>
            <name>chair</name>
            <difficult>1</difficult>
            <bndbox><xmin>5</xmin><ymin>244</ymin><xmax>67</xmax><ymax>374</ymax></bndbox>
        </object>
        <object>
            <name> person </name>
            <bndbox><xmin>10.5</xmin><ymin>20</ymin><xmax>10.5</xmax><ymax>80</ymax></bndbox>
        </object>
    </annotation>"#;

    #[test]
    fn test_parse_sample() {
        let record = VocReader::new().parse(SAMPLE, "fallback", "sample.xml").unwrap();

        assert_eq!(record.image_id, "000005.jpg");
        assert_eq!(record.width, 500.0);
        assert_eq!(record.height, 375.0);
        assert_eq!(record.boxes.len(), 3);
        assert_eq!(
            record.boxes[0],
            BoundingBox::new(263.0, 211.0, 324.0, 339.0, "chair")
        );
        assert_eq!(record.boxes[2].category, "person");
        assert_eq!(record.boxes[2].width(), 0.0);
    }

    #[test]
    fn test_ignore_difficult() {
        let reader = VocReader::with_options(VocReadOptions {
            ignore_difficult: true,
        });
        let record = reader.parse(SAMPLE, "fallback", "sample.xml").unwrap();

        assert_eq!(record.boxes.len(), 2);
        assert_eq!(record.boxes[1].category, "person");
    }

    #[test]
    fn test_missing_size_and_filename() {
        let xml = r#"<annotation>
            <object><name>cat</name>
                <bndbox><xmin>1</xmin><ymin>2</ymin><xmax>3</xmax><ymax>4</ymax></bndbox>
            </object>
        </annotation>"#;
        let record = VocReader::new().parse(xml, "img_7", "img_7.xml").unwrap();

        assert_eq!(record.image_id, "img_7");
        assert_eq!(record.width, 0.0);
        assert_eq!(record.height, 0.0);
        assert_eq!(record.boxes.len(), 1);
    }

    #[test]
    fn test_object_without_name_is_error() {
        let xml = r#"<annotation><filename>a.jpg</filename>
            <object><bndbox><xmin>1</xmin><ymin>2</ymin><xmax>3</xmax><ymax>4</ymax></bndbox></object>
        </annotation>"#;
        let err = VocReader::new().parse(xml, "a", "a.xml").unwrap_err();
        assert!(matches!(err, Error::InvalidAnnotation(_)));
        assert!(err.to_string().contains("a.xml"));
    }

    #[test]
    fn test_bad_coordinate_is_error() {
        let xml = r#"<annotation><filename>a.jpg</filename>
            <object><name>cat</name>
                <bndbox><xmin>one</xmin><ymin>2</ymin><xmax>3</xmax><ymax>4</ymax></bndbox>
            </object>
        </annotation>"#;
        let err = VocReader::new().parse(xml, "a", "a.xml").unwrap_err();
        assert!(err.to_string().contains("<xmin>"));
    }

    #[test]
    fn test_malformed_xml_is_error() {
        let err = VocReader::new()
            .parse("<annotation><filename>", "a", "a.xml")
            .unwrap_err();
        assert!(matches!(err, Error::XmlError(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlinked_files_are_read() {
        let pool = tempfile::TempDir::new().unwrap();
        let split = tempfile::TempDir::new().unwrap();
        std::fs::write(pool.path().join("x.xml"), SAMPLE).unwrap();
        std::os::unix::fs::symlink(pool.path().join("x.xml"), split.path().join("x.xml"))
            .unwrap();

        let records = VocReader::new().read(split.path()).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].image_id, "000005.jpg");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_is_error() {
        let split = tempfile::TempDir::new().unwrap();
        std::os::unix::fs::symlink(split.path().join("gone.xml"), split.path().join("x.xml"))
            .unwrap();

        let err = VocReader::new().read(split.path()).unwrap_err();
        assert!(matches!(err, Error::WalkError(_)));
    }

    #[test]
    fn test_empty_annotation() {
        let xml = "<annotation><filename>bg.jpg</filename>\
                   <size><width>64</width><height>48</height></size></annotation>";
        let record = VocReader::new().parse(xml, "bg", "bg.xml").unwrap();
        assert!(record.boxes.is_empty());
        assert_eq!(record.width, 64.0);
    }
}
