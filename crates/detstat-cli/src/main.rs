// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

use clap::{Parser, Subcommand};
use detstat::{
    AggregateResults, DatasetFormat, Error, Progress, ReadOptions, Settings,
    StatisticsAggregator, SvgPlotSink, plan_charts, read_dataset, render_all,
};
use indicatif::{ProgressBar, ProgressStyle};
use log::info;
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Command to run
    #[command(subcommand)]
    cmd: Command,
}

/// Dataset selection and reading options shared by every command.
#[derive(clap::Args, PartialEq, Clone, Debug)]
struct DatasetArgs {
    /// Annotation format: voc or coco
    format: String,

    /// VOC annotation directory (or single XML file), or COCO JSON/ZIP
    path: PathBuf,

    /// Settings file, layered over the user settings file
    #[clap(long, short, env = "DETSTAT_CONFIG")]
    config: Option<PathBuf>,

    /// Skip VOC objects marked difficult
    #[clap(long)]
    ignore_difficult: bool,

    /// COCO: read at most this many images (0 reads all)
    #[clap(long, default_value_t = 0)]
    max_images: usize,

    /// COCO: keep only this category (repeat for several)
    #[clap(long = "category", value_name = "NAME")]
    categories: Vec<String>,
}

#[derive(Subcommand, PartialEq, Clone, Debug)]
enum Command {
    /// Read a dataset, print its statistics and render every chart into the
    /// output directory.
    Analyze {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Output directory for charts (overrides settings)
        #[clap(long, short)]
        out: Option<PathBuf>,
    },
    /// Read a dataset and print its statistics without rendering charts.
    Summary {
        #[command(flatten)]
        dataset: DatasetArgs,

        /// Print the aggregated statistics as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Parse the format argument, reporting an unsupported one on stderr.
fn parse_format(format: &str) -> Option<DatasetFormat> {
    match format.parse() {
        Ok(format) => Some(format),
        Err(err) => {
            eprintln!("{}", err);
            None
        }
    }
}

/// Load settings with the command-line flags applied on top.
fn load_settings(dataset: &DatasetArgs) -> Result<Settings, Error> {
    let mut settings = Settings::load(dataset.config.as_deref())?;
    settings.ignore_difficult |= dataset.ignore_difficult;
    Ok(settings)
}

fn aggregate(
    format: DatasetFormat,
    dataset: &DatasetArgs,
    settings: &Settings,
) -> Result<AggregateResults, Error> {
    let options = ReadOptions {
        ignore_difficult: settings.ignore_difficult,
        max_images: dataset.max_images,
        category_filter: dataset.categories.clone(),
    };
    let records = read_dataset(format, &dataset.path, &options)?;
    Ok(StatisticsAggregator::ingest(&records))
}

fn handle_analyze(dataset: DatasetArgs, out: Option<PathBuf>) -> Result<(), Error> {
    let Some(format) = parse_format(&dataset.format) else {
        return Ok(());
    };

    let mut settings = load_settings(&dataset)?;
    if let Some(out) = out {
        settings.output_dir = out;
    }

    let results = aggregate(format, &dataset, &settings)?;
    println!("{}", results);

    let charts = plan_charts(&results);
    let mut sink = SvgPlotSink::from_settings(&settings);

    let bar = ProgressBar::new(charts.len() as u64);
    bar.set_style(
        ProgressStyle::with_template(
            "[{elapsed_precise} ETA: {eta}] {msg}: {wide_bar:.yellow} {human_pos}/{human_len}",
        )
        .map_err(|e| Error::InvalidParameters(e.to_string()))?
        .progress_chars("█▇▆▅▄▃▂▁  "),
    );
    bar.set_message("Rendering");

    let report = render_all(&charts, &mut sink, |progress: Progress| {
        bar.set_length(progress.total as u64);
        bar.set_position(progress.current as u64);
    });
    bar.finish_and_clear();

    info!(
        "Wrote {} charts to {}",
        report.written.len(),
        sink.root().display()
    );
    for failure in &report.failed {
        eprintln!("Failed to render {}: {}", failure.file_name, failure.error);
    }

    Ok(())
}

fn handle_summary(dataset: DatasetArgs, json: bool) -> Result<(), Error> {
    let Some(format) = parse_format(&dataset.format) else {
        return Ok(());
    };

    let settings = load_settings(&dataset)?;
    let results = aggregate(format, &dataset, &settings)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        println!("{}", results);
    }

    Ok(())
}

fn main() -> Result<(), Error> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    match args.cmd {
        Command::Analyze { dataset, out } => handle_analyze(dataset, out),
        Command::Summary { dataset, json } => handle_summary(dataset, json),
    }
}
