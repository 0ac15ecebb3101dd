//! Sump pump log plotter.
//!
//! Reads the CSV logs written by the sump pump monitor and charts pump
//! cycles and energy at raw, hourly, daily, weekly and monthly resolution.
//! Charts are written as SVG files and browsed in a terminal gallery.

mod aggregate;
mod chart;
mod display;
mod error;
mod orchestrator;
mod plot;
mod reader;
mod series;

use anyhow::Result;
use clap::Parser;
use display::Gallery;
use orchestrator::{PassOutcome, PlotConfig, PlotOrchestrator};
use plot::SvgWriter;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Plot sump pump energy logs at several time resolutions
#[derive(Parser, Debug)]
#[command(name = "sumpplot")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Program name the log files are prefixed with
    #[arg(short = 'n', long, default_value = "sumpMaster")]
    program: String,

    /// Directory containing the log files
    #[arg(short, long, default_value = ".")]
    data_dir: PathBuf,

    /// Output directory for generated SVG charts
    #[arg(short, long, default_value = "plots")]
    output: PathBuf,

    /// Also plot every per-motor detail log (slow for long logs)
    #[arg(long)]
    details: bool,

    /// Also plot runtime statistics logs with error bars
    #[arg(long)]
    stats: bool,

    /// Skip the terminal gallery and wait for [enter] instead
    #[arg(long)]
    no_tui: bool,
}

impl From<&Args> for PlotConfig {
    fn from(args: &Args) -> Self {
        Self {
            program_name: args.program.clone(),
            data_dir: args.data_dir.clone(),
            details: args.details,
            stats: args.stats,
        }
    }
}

fn init_logging() {
    let stderr_layer = fmt::layer()
        .with_target(false)
        .with_writer(io::stderr)
        .with_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")));

    tracing_subscriber::registry().with(stderr_layer).init();
}

fn wait_for_enter() -> Result<()> {
    print!("Press [enter] key to close plots...");
    io::stdout().flush()?;
    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    println!("Done...");
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging();

    let orchestrator = PlotOrchestrator::new(PlotConfig::from(&args));
    let mut surfaces = (SvgWriter::new(&args.output)?, Gallery::default());

    let reports = orchestrator.run(&mut surfaces)?;
    let (svg, gallery) = surfaces;

    for report in &reports {
        if let PassOutcome::Skipped { samples, required } = report.outcome {
            info!("{}: {} of {} samples needed", report.resolution, samples, required);
        }
    }
    info!(
        "{} chart(s) written to {}, {} in the gallery",
        svg.written().len(),
        args.output.display(),
        gallery.len()
    );

    if args.no_tui {
        wait_for_enter()?;
    } else {
        gallery.run()?;
    }

    Ok(())
}
