//! Plotting passes over the sump pump logs.
//!
//! The energy log is plotted at six resolutions, from raw 15-minute samples
//! up to monthly totals. Coarser passes only run once the log holds enough
//! history to make them worth looking at.

use crate::aggregate::consolidate;
use crate::chart::{Chart, ChartSink, DAILY_DATE_FORMAT, HOURLY_DATE_FORMAT};
use crate::reader::{find_files_with_prefix, read_csv};
use crate::series::TimeSeries;
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Samples per hour at the 15-minute logging interval
const SAMPLES_PER_HOUR: usize = 4;
const SAMPLES_PER_DAY: usize = 24 * SAMPLES_PER_HOUR;
const SAMPLES_PER_WEEK: usize = 7 * SAMPLES_PER_DAY;
const SAMPLES_PER_MONTH: usize = 30 * SAMPLES_PER_DAY;

/// Where the logs live and which optional passes to run
#[derive(Debug, Clone)]
pub struct PlotConfig {
    /// Prefix shared by every log file, e.g. `sumpMaster`
    pub program_name: String,
    pub data_dir: PathBuf,
    /// Plot each `<program>_logDetails_*` file
    pub details: bool,
    /// Plot each `<program>_logStats_*` file with error bars
    pub stats: bool,
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            program_name: "sumpMaster".to_string(),
            data_dir: PathBuf::from("."),
            details: false,
            stats: false,
        }
    }
}

impl PlotConfig {
    pub fn energy_log(&self) -> PathBuf {
        self.data_dir.join(format!("{}_logEnergy.csv", self.program_name))
    }

    pub fn details_prefix(&self) -> String {
        format!("{}_logDetails_", self.program_name)
    }

    pub fn stats_prefix(&self) -> String {
        format!("{}_logStats_", self.program_name)
    }
}

/// One temporal resolution of the energy log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Chart title prefix; the log file name follows it
    pub title: &'static str,
    /// Samples summed per point; `None` plots raw samples
    pub window: Option<usize>,
    /// Points kept from the end (plus one); 0 keeps all
    pub max_windows: usize,
    /// Minimum history is `window * max_windows / divisor` samples
    pub gate_divisor: Option<usize>,
    pub date_format: &'static str,
}

pub const RESOLUTIONS: [Resolution; 6] = [
    Resolution {
        title: "15-minute interval: ",
        window: None,
        max_windows: 0,
        gate_divisor: None,
        date_format: HOURLY_DATE_FORMAT,
    },
    Resolution {
        title: "Hourly for 48-hours: ",
        window: Some(SAMPLES_PER_HOUR),
        max_windows: 48,
        gate_divisor: None,
        date_format: HOURLY_DATE_FORMAT,
    },
    Resolution {
        title: "Daily for 14-days: ",
        window: Some(SAMPLES_PER_DAY),
        max_windows: 14,
        gate_divisor: Some(2),
        date_format: DAILY_DATE_FORMAT,
    },
    Resolution {
        title: "Daily for 30-days: ",
        window: Some(SAMPLES_PER_DAY),
        max_windows: 30,
        gate_divisor: Some(2),
        date_format: DAILY_DATE_FORMAT,
    },
    Resolution {
        title: "Weekly for 12-months: ",
        window: Some(SAMPLES_PER_WEEK),
        max_windows: 12,
        gate_divisor: Some(4),
        date_format: DAILY_DATE_FORMAT,
    },
    Resolution {
        title: "Monthly for 2-years: ",
        window: Some(SAMPLES_PER_MONTH),
        max_windows: 24,
        gate_divisor: Some(4),
        date_format: DAILY_DATE_FORMAT,
    },
];

impl Resolution {
    /// Samples needed before this resolution is plotted
    pub fn min_samples(&self) -> usize {
        match (self.window, self.gate_divisor) {
            (Some(window), Some(divisor)) => window * self.max_windows / divisor,
            _ => 0,
        }
    }

    pub fn has_enough_history(&self, samples: usize) -> bool {
        samples >= self.min_samples()
    }

    /// Title without the trailing separator
    pub fn name(&self) -> &'static str {
        self.title.trim_end_matches(": ")
    }

    /// Apply this resolution's consolidation
    pub fn apply(&self, series: &TimeSeries) -> Result<TimeSeries> {
        match self.window {
            Some(window) => Ok(consolidate(series, window, self.max_windows)?),
            None => Ok(series.clone()),
        }
    }
}

/// What happened to one resolution pass
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PassOutcome {
    Plotted { charts: usize },
    Skipped { samples: usize, required: usize },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassReport {
    pub resolution: &'static str,
    pub outcome: PassOutcome,
}

pub struct PlotOrchestrator {
    config: PlotConfig,
}

impl PlotOrchestrator {
    pub fn new(config: PlotConfig) -> Self {
        Self { config }
    }

    /// Energy passes, then the optional detail and statistics passes
    pub fn run(&self, sink: &mut dyn ChartSink) -> Result<Vec<PassReport>> {
        if self.config.details {
            let charts = self.plot_details(sink)?;
            info!("Detail logs: {} chart(s) plotted", charts);
        }

        let reports = self.plot_energy(sink)?;

        if self.config.stats {
            let charts = self.plot_stats(sink)?;
            info!("Statistics logs: {} chart(s) plotted", charts);
        }

        Ok(reports)
    }

    /// Load the energy log and run every resolution over it
    pub fn plot_energy(&self, sink: &mut dyn ChartSink) -> Result<Vec<PassReport>> {
        let path = self.config.energy_log();
        let series = read_csv(&path).context("Failed to load energy log")?;
        info!(channels = ?series.channel_names(), "Energy log loaded");
        info!("Cols: {}", series.channels().len());
        info!("Rows: {}", series.len());

        plot_resolutions(&series, &file_label(&path), sink)
    }

    /// One single-channel chart per channel (after the first) of each detail log
    pub fn plot_details(&self, sink: &mut dyn ChartSink) -> Result<usize> {
        let files = find_files_with_prefix(&self.config.data_dir, &self.config.details_prefix())
            .context("Failed to list detail logs")?;
        info!(files = files.len(), "Plotting detail logs");

        let mut charts = 0;
        for path in files {
            let series = read_csv(&path)?;
            let label = file_label(&path);
            for channel in series.channels().iter().skip(1) {
                let chart = Chart::multi_line(series.timestamps(), std::slice::from_ref(channel), &label);
                sink.show(chart)?;
                charts += 1;
            }
        }
        Ok(charts)
    }

    /// Runtime, average and spread of each statistics log as an error-bar chart
    pub fn plot_stats(&self, sink: &mut dyn ChartSink) -> Result<usize> {
        let files = find_files_with_prefix(&self.config.data_dir, &self.config.stats_prefix())
            .context("Failed to list statistics logs")?;
        info!(files = files.len(), "Plotting statistics logs");

        let mut charts = 0;
        for path in files {
            let series = read_csv(&path)?;
            let label = file_label(&path);
            match series.channels() {
                [runtime, average, spread, ..] => {
                    let timestamps = series.timestamps();
                    sink.show(Chart::dual_panel_error_bars(timestamps, runtime, average, spread, &label))?;
                    charts += 1;
                }
                other => warn!(
                    "{}: {} channel(s), need runtime, average and spread; skipped",
                    label,
                    other.len()
                ),
            }
        }
        Ok(charts)
    }
}

/// Run every resolution over an already loaded series
pub fn plot_resolutions(
    series: &TimeSeries,
    file_label: &str,
    sink: &mut dyn ChartSink,
) -> Result<Vec<PassReport>> {
    let mut reports = Vec::with_capacity(RESOLUTIONS.len());

    for resolution in &RESOLUTIONS {
        let outcome = if resolution.has_enough_history(series.len()) {
            info!("{}plotted", resolution.title);
            let resampled = resolution.apply(series)?;
            for channel in resampled.channels() {
                debug!(points = resampled.len(), total = channel.total(), "{}", channel.name);
            }
            let title = format!("{}{}", resolution.title, file_label);
            let charts = plot_channel_pairs(&resampled, &title, resolution.date_format, sink)?;
            PassOutcome::Plotted { charts }
        } else {
            info!("{}Lacking enough data", resolution.name());
            PassOutcome::Skipped {
                samples: series.len(),
                required: resolution.min_samples(),
            }
        };
        reports.push(PassReport {
            resolution: resolution.name(),
            outcome,
        });
    }

    Ok(reports)
}

/// One dual-panel chart per channel pair; an odd last channel gets its own chart
fn plot_channel_pairs(
    series: &TimeSeries,
    title: &str,
    date_format: &str,
    sink: &mut dyn ChartSink,
) -> Result<usize> {
    let mut charts = 0;
    for pair in series.channel_pairs() {
        let chart = match pair {
            [top, bottom] => Chart::dual_panel(series.timestamps(), top, bottom, title, date_format),
            _ => {
                warn!("channel '{}' has no partner; plotting it alone", pair[0].name);
                let mut lone = Chart::multi_line(series.timestamps(), pair, title);
                lone.date_format = date_format.to_string();
                lone
            }
        };
        sink.show(chart)?;
        charts += 1;
    }
    Ok(charts)
}

fn file_label(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
