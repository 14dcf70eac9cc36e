// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! # detstat
//!
//! Dataset statistics for object-detection annotations. Pascal VOC and COCO
//! datasets are read into normalized per-image records, aggregated in a
//! single pass, and rendered as a fixed set of charts.
//!
//! ## Features
//!
//! - **Readers**: Pascal VOC XML directories, COCO JSON files and ZIP
//!   archives
//! - **Aggregation**: image and box dimensions, anchor-box ratios, category
//!   frequencies, per-image box counts and small/medium/large size buckets
//! - **Charts**: scatter, bar and pie charts written as SVG through a
//!   pluggable [`PlotSink`]
//! - **Settings**: layered configuration from files and `DETSTAT_*`
//!   environment variables
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use detstat::{
//!     DatasetFormat, ReadOptions, Settings, StatisticsAggregator, SvgPlotSink, plan_charts,
//!     read_dataset, render_all,
//! };
//!
//! let settings = Settings::load(None)?;
//! let records = read_dataset(DatasetFormat::Voc, "VOC2007/Annotations", &ReadOptions::default())?;
//! let results = StatisticsAggregator::ingest(&records);
//! println!("{}", results);
//!
//! let mut sink = SvgPlotSink::from_settings(&settings);
//! let report = render_all(&plan_charts(&results), &mut sink, |_| {});
//! println!("Wrote {} charts", report.written.len());
//! # Ok::<(), detstat::Error>(())
//! ```

pub mod charts;
pub mod coco;
mod error;
mod reader;
mod record;
pub mod settings;
pub mod stats;
pub mod voc;

pub use crate::{
    charts::{
        Chart, ChartData, ChartFailure, PlotSink, Progress, RenderReport, SvgPlotSink,
        plan_charts, render_all,
    },
    error::Error,
    reader::{AnnotationReader, DatasetFormat, ReadOptions, read_dataset},
    record::{AnnotationRecord, BoundingBox},
    settings::Settings,
    stats::{AggregateResults, Diagnostics, StatisticsAggregator},
};
