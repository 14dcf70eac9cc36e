// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! # Charts
//!
//! Chart rendering is split in two:
//!
//! 1. [`plan_charts`] turns frozen [`AggregateResults`] into a list of
//!    [`Chart`] descriptions (series, title, axis labels, relative file name).
//! 2. A [`PlotSink`] persists each chart. [`SvgPlotSink`] draws SVG files
//!    with `plotters`.
//!
//! [`render_all`] drives a sink over a plan and isolates failures: a chart
//! that cannot be rendered is logged and reported, and the remaining charts
//! are still produced.

mod svg;

pub use svg::SvgPlotSink;

use crate::{Error, stats::AggregateResults};
use log::{debug, error, warn};
use std::{collections::HashSet, path::PathBuf};

/// Subdirectory holding one scatter per category.
pub const CATEGORY_DIR: &str = "EachCategoryBboxWH";

/// Data series of a chart.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartData {
    /// `(x, y)` points.
    Scatter(Vec<(f64, f64)>),
    /// `(label, count)` bars in display order.
    Bar(Vec<(String, u64)>),
    /// `(label, share)` slices; shares are fractions of the whole.
    Pie(Vec<(String, f64)>),
}

/// One chart to render.
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Output path relative to the sink root, without extension.
    pub file_name: String,
    pub data: ChartData,
}

impl Chart {
    fn new(
        title: impl Into<String>,
        x_label: &str,
        y_label: &str,
        file_name: impl Into<String>,
        data: ChartData,
    ) -> Self {
        Self {
            title: title.into(),
            x_label: x_label.to_string(),
            y_label: y_label.to_string(),
            file_name: file_name.into(),
            data,
        }
    }
}

/// Destination for rendered charts.
pub trait PlotSink {
    /// Render and persist `chart`, returning the written file.
    fn render(&mut self, chart: &Chart) -> Result<PathBuf, Error>;
}

/// Rendering progress, reported after each chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub current: usize,
    pub total: usize,
}

/// A chart that could not be rendered.
#[derive(Debug)]
pub struct ChartFailure {
    pub file_name: String,
    pub error: Error,
}

/// Outcome of [`render_all`].
#[derive(Debug, Default)]
pub struct RenderReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<ChartFailure>,
}

impl RenderReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Describe every chart for `results`.
///
/// Category-keyed charts are left out when the dataset has no categories.
pub fn plan_charts(results: &AggregateResults) -> Vec<Chart> {
    let mut charts = Vec::new();
    let mut taken = HashSet::new();

    for (category, dims) in results.category_box_dimensions() {
        let stem = unique_file_stem(category, &mut taken);
        charts.push(Chart::new(
            format!("{}WH", category),
            "w",
            "h",
            format!("{}/{}WH", CATEGORY_DIR, stem),
            ChartData::Scatter(dims.points().collect()),
        ));
    }

    charts.push(Chart::new(
        "Scatter of image W & H",
        "W",
        "H",
        "imageWH",
        ChartData::Scatter(results.image_dimensions().points().collect()),
    ));
    charts.push(Chart::new(
        "Scatter of bbox W & H",
        "W",
        "H",
        "bboxWH",
        ChartData::Scatter(results.box_dimensions().points().collect()),
    ));
    charts.push(Chart::new(
        "Number of bbox in different sizes",
        "size",
        "num",
        "SizeBboxNum",
        ChartData::Bar(
            results
                .size_buckets()
                .iter()
                .map(|(bucket, count)| (bucket.label().to_string(), count as u64))
                .collect(),
        ),
    ));
    charts.push(Chart::new(
        "AnchorBoxRatioBar",
        "ratio",
        "num",
        "AnchorBoxRatio",
        ChartData::Bar(
            results
                .anchor_ratio_histogram()
                .into_iter()
                .map(|(ratio, count)| (ratio.to_string(), count as u64))
                .collect(),
        ),
    ));

    if results.categories().next().is_some() {
        charts.push(Chart::new(
            "the numbers of images for each category",
            "category",
            "num",
            "EachCategoryImagesNum",
            ChartData::Bar(
                results
                    .category_image_presence()
                    .iter()
                    .map(|(category, images)| (category.clone(), *images as u64))
                    .collect(),
            ),
        ));
        charts.push(Chart::new(
            "the numbers of category",
            "category",
            "num",
            "EachCategoryNum",
            ChartData::Bar(
                results
                    .category_counts()
                    .into_iter()
                    .map(|(category, count)| (category, count as u64))
                    .collect(),
            ),
        ));
        charts.push(Chart::new(
            "the numbers of category",
            "",
            "",
            "EachCategoryNumPie",
            ChartData::Pie(results.category_proportions().into_iter().collect()),
        ));
    }

    charts.push(Chart::new(
        "the numbers of bboxes included in each image",
        "numbers of bboxes in each image",
        "num",
        "EachImageBboxNum",
        ChartData::Bar(
            results
                .boxes_per_image_histogram()
                .into_iter()
                .map(|(boxes, images)| (boxes.to_string(), images as u64))
                .collect(),
        ),
    ));

    charts
}

/// Render every chart through `sink`, continuing past failures.
pub fn render_all<S>(
    charts: &[Chart],
    sink: &mut S,
    mut on_progress: impl FnMut(Progress),
) -> RenderReport
where
    S: PlotSink + ?Sized,
{
    let mut report = RenderReport::default();
    let total = charts.len();

    for (index, chart) in charts.iter().enumerate() {
        match sink.render(chart) {
            Ok(path) => {
                debug!("Wrote {}", path.display());
                report.written.push(path);
            }
            Err(err) => {
                error!("Failed to render {}: {}", chart.file_name, err);
                report.failed.push(ChartFailure {
                    file_name: chart.file_name.clone(),
                    error: err,
                });
            }
        }
        on_progress(Progress {
            current: index + 1,
            total,
        });
    }

    report
}

/// Sanitized stem for `label` that no earlier label has claimed.
///
/// Labels such as `a/b` and `a_b` sanitize to the same stem; later ones get
/// a numeric suffix. Comparison ignores ASCII case so distinct files also
/// survive case-insensitive filesystems.
fn unique_file_stem(label: &str, taken: &mut HashSet<String>) -> String {
    let base = sanitize_file_stem(label);
    let mut stem = base.clone();
    let mut n = 2;
    while !taken.insert(stem.to_ascii_lowercase()) {
        stem = format!("{}_{}", base, n);
        n += 1;
    }
    if stem != base {
        warn!("Category '{}' is written as {}WH", label, stem);
    }
    stem
}

/// Make a category label safe to use as a single path component.
fn sanitize_file_stem(label: &str) -> String {
    let stem: String = label
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '\0' => '_',
            c => c,
        })
        .collect();

    match stem.as_str() {
        "" | "." | ".." => format!("_{}", stem),
        _ => stem,
    }
}
