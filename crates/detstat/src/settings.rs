// SPDX-License-Identifier: Apache-2.0
// Copyright © 2025 Au-Zone Technologies. All Rights Reserved.

//! Layered run settings.
//!
//! Lowest to highest precedence: built-in defaults, `detstat.toml` in the
//! user configuration directory, an explicit configuration file, then
//! `DETSTAT_*` environment variables (for example `DETSTAT_OUTPUT_DIR`).
//! Command-line flags are applied on top by the caller.

use crate::Error;
use config::{Config, Environment, File};
use directories::ProjectDirs;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_OUTPUT_DIR: &str = "out";
pub const DEFAULT_CHART_WIDTH: u32 = 1024;
pub const DEFAULT_CHART_HEIGHT: u32 = 768;

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Settings {
    /// Root directory for chart files.
    pub output_dir: PathBuf,
    /// Chart width in pixels.
    pub chart_width: u32,
    /// Chart height in pixels.
    pub chart_height: u32,
    /// Skip VOC objects marked difficult.
    pub ignore_difficult: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            chart_width: DEFAULT_CHART_WIDTH,
            chart_height: DEFAULT_CHART_HEIGHT,
            ignore_difficult: false,
        }
    }
}

impl Settings {
    /// Load settings, reading `config_file` in addition to the user file.
    pub fn load(config_file: Option<&Path>) -> Result<Self, Error> {
        let user_file = ProjectDirs::from("ai", "EdgeFirst", "detstat")
            .map(|dirs| dirs.config_dir().join("detstat.toml"));
        Self::load_from(user_file.as_deref(), config_file)
    }

    /// Load settings from an optional user file and an optional explicit
    /// file. The user file may be absent; the explicit one must exist.
    pub fn load_from(user_file: Option<&Path>, config_file: Option<&Path>) -> Result<Self, Error> {
        let mut builder = Config::builder()
            .set_default("output_dir", DEFAULT_OUTPUT_DIR)?
            .set_default("chart_width", i64::from(DEFAULT_CHART_WIDTH))?
            .set_default("chart_height", i64::from(DEFAULT_CHART_HEIGHT))?
            .set_default("ignore_difficult", false)?;

        if let Some(path) = user_file {
            debug!("User settings: {}", path.display());
            builder = builder.add_source(File::from(path).required(false));
        }
        if let Some(path) = config_file {
            debug!("Settings file: {}", path.display());
            builder = builder.add_source(File::from(path).required(true));
        }

        let settings: Settings = builder
            .add_source(Environment::with_prefix("DETSTAT"))
            .build()?
            .try_deserialize()?;

        if settings.chart_width == 0 || settings.chart_height == 0 {
            return Err(Error::InvalidParameters(format!(
                "chart size must be positive, got {}x{}",
                settings.chart_width, settings.chart_height
            )));
        }

        Ok(settings)
    }
}
