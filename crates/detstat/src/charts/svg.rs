// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use super::{Chart, ChartData, PlotSink};
use crate::{Error, settings::Settings};
use plotters::{element::Pie, prelude::*};
use std::{
    fs,
    ops::Range,
    path::{Path, PathBuf},
};

/// Writes each chart as an SVG file below `root`.
///
/// Subdirectories named in [`Chart::file_name`] are created on demand.
#[derive(Debug, Clone)]
pub struct SvgPlotSink {
    root: PathBuf,
    size: (u32, u32),
}

impl SvgPlotSink {
    pub fn new(root: impl Into<PathBuf>, size: (u32, u32)) -> Self {
        Self {
            root: root.into(),
            size,
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(
            &settings.output_dir,
            (settings.chart_width, settings.chart_height),
        )
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Full path of the file written for `chart`.
    pub fn path_for(&self, chart: &Chart) -> PathBuf {
        let mut path = self.root.join(&chart.file_name);
        path.as_mut_os_string().push(".svg");
        path
    }
}

impl PlotSink for SvgPlotSink {
    fn render(&mut self, chart: &Chart) -> Result<PathBuf, Error> {
        let path = self.path_for(chart);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        match &chart.data {
            ChartData::Scatter(points) => draw_scatter(&path, self.size, chart, points)?,
            ChartData::Bar(bars) => draw_bar(&path, self.size, chart, bars)?,
            ChartData::Pie(slices) => draw_pie(&path, self.size, chart, slices)?,
        }

        Ok(path)
    }
}

fn draw_scatter(
    path: &Path,
    size: (u32, u32),
    chart: &Chart,
    points: &[(f64, f64)],
) -> Result<(), Error> {
    let points: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            axis_range(points.iter().map(|p| p.0)),
            axis_range(points.iter().map(|p| p.1)),
        )?;

    ctx.configure_mesh()
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(
        points
            .iter()
            .map(|&point| Circle::new(point, 3, BLUE.mix(0.6).filled())),
    )?;

    root.present()?;
    Ok(())
}

fn draw_bar(
    path: &Path,
    size: (u32, u32),
    chart: &Chart,
    bars: &[(String, u64)],
) -> Result<(), Error> {
    let segments = u32::try_from(bars.len())
        .map_err(|_| Error::PlotError(format!("{}: too many bars", chart.file_name)))?;
    let max = bars.iter().map(|(_, v)| *v).max().unwrap_or(0);

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let mut ctx = ChartBuilder::on(&root)
        .caption(&chart.title, ("sans-serif", 24))
        .margin(15)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(
            (0u32..segments.max(1)).into_segmented(),
            0u64..max + max / 10 + 1,
        )?;

    let label_of = |value: &SegmentValue<u32>| match value {
        SegmentValue::CenterOf(i) => bars
            .get(*i as usize)
            .map(|(label, _)| label.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_labels(bars.len().max(1))
        .x_label_formatter(&label_of)
        .x_desc(chart.x_label.as_str())
        .y_desc(chart.y_label.as_str())
        .draw()?;

    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style(BLUE.mix(0.7).filled())
            .margin(10)
            .data(bars.iter().zip(0u32..).map(|((_, v), i)| (i, *v))),
    )?;

    // Count above each bar.
    ctx.draw_series(bars.iter().zip(0u32..).map(|((_, v), i)| {
        Text::new(
            v.to_string(),
            (SegmentValue::CenterOf(i), *v),
            ("sans-serif", 14).into_font().color(&BLACK),
        )
    }))?;

    root.present()?;
    Ok(())
}

fn draw_pie(
    path: &Path,
    size: (u32, u32),
    chart: &Chart,
    slices: &[(String, f64)],
) -> Result<(), Error> {
    let sizes: Vec<f64> = slices.iter().map(|(_, share)| *share).collect();
    let total: f64 = sizes.iter().sum();
    if !(total.is_finite() && total > 0.0) {
        return Err(Error::PlotError(format!(
            "{}: pie chart has nothing to show",
            chart.file_name
        )));
    }

    let labels: Vec<&str> = slices.iter().map(|(label, _)| label.as_str()).collect();
    let colors: Vec<RGBColor> = (0..slices.len())
        .map(|i| {
            let (r, g, b) = Palette99::pick(i).rgb();
            RGBColor(r, g, b)
        })
        .collect();

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;
    let root = root.titled(&chart.title, ("sans-serif", 24))?;

    let (width, height) = root.dim_in_pixel();
    let center = ((width / 2) as i32, (height / 2) as i32);
    let radius = f64::from(width.min(height)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(90.0);
    pie.label_style(("sans-serif", 16).into_font().color(&BLACK));
    pie.percentages(("sans-serif", 16).into_font().color(&WHITE));
    root.draw(&pie)?;

    root.present()?;
    Ok(())
}

/// Padded axis range over `values`, or `0..1` when there are none.
fn axis_range(values: impl Iterator<Item = f64>) -> Range<f64> {
    let (min, max) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });

    if min > max {
        return 0.0..1.0;
    }
    if min == max {
        return (min - 1.0)..(max + 1.0);
    }

    let pad = (max - min) * 0.05;
    (min - pad)..(max + pad)
}
