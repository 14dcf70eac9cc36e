// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use plotters::drawing::DrawingAreaErrorKind;

/// Error type for dataset reading, analysis and chart rendering.
///
/// Data-quality findings inside an otherwise readable dataset (zero-sized
/// boxes, missing image sizes) are not errors; they are collected by the
/// aggregator as diagnostics. The variants here are the failures that end a
/// read or a single chart.
#[derive(Debug)]
pub enum Error {
    /// An I/O error occurred during file operations.
    IoError(std::io::Error),
    /// Configuration parsing or loading error.
    ConfigError(config::ConfigError),
    /// JSON serialization or deserialization error.
    JsonError(serde_json::Error),
    /// XML annotation file could not be parsed.
    XmlError(roxmltree::Error),
    /// ZIP archive could not be opened or read.
    ZipError(zip::result::ZipError),
    /// Directory traversal error.
    WalkError(walkdir::Error),
    /// The dataset format string is not one of the supported formats.
    UnsupportedFormat(String),
    /// An annotation file is missing a required element or holds a bad value.
    InvalidAnnotation(String),
    /// A COCO annotation references an image or category that does not exist.
    CocoError(String),
    /// A chart could not be drawn or written.
    PlotError(String),
    /// Invalid parameters provided to an operation.
    InvalidParameters(String),
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::IoError(err)
    }
}

impl From<config::ConfigError> for Error {
    fn from(err: config::ConfigError) -> Self {
        Error::ConfigError(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::JsonError(err)
    }
}

impl From<roxmltree::Error> for Error {
    fn from(err: roxmltree::Error) -> Self {
        Error::XmlError(err)
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipError(err)
    }
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkError(err)
    }
}

impl From<DrawingAreaErrorKind<std::io::Error>> for Error {
    fn from(err: DrawingAreaErrorKind<std::io::Error>) -> Self {
        Error::PlotError(err.to_string())
    }
}

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::IoError(e) => write!(f, "I/O error: {}", e),
            Error::ConfigError(e) => write!(f, "Configuration error: {}", e),
            Error::JsonError(e) => write!(f, "JSON error: {}", e),
            Error::XmlError(e) => write!(f, "XML error: {}", e),
            Error::ZipError(e) => write!(f, "ZIP error: {}", e),
            Error::WalkError(e) => write!(f, "Directory walk error: {}", e),
            Error::UnsupportedFormat(s) => write!(f, "Unsupported format: {}", s),
            Error::InvalidAnnotation(s) => write!(f, "Invalid annotation: {}", s),
            Error::CocoError(s) => write!(f, "COCO error: {}", s),
            Error::PlotError(s) => write!(f, "Plot error: {}", s),
            Error::InvalidParameters(s) => write!(f, "Invalid parameters: {}", s),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::IoError(e) => Some(e),
            Error::ConfigError(e) => Some(e),
            Error::JsonError(e) => Some(e),
            Error::XmlError(e) => Some(e),
            Error::ZipError(e) => Some(e),
            Error::WalkError(e) => Some(e),
            _ => None,
        }
    }
}
