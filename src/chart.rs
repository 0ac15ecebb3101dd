//! Backend-independent chart descriptions.
//!
//! A [`Chart`] says what to draw (panels, traces, labels, tick format) and a
//! [`ChartSink`] decides where: SVG files, the terminal gallery, or both.

use crate::series::Channel;
use anyhow::Result;
use chrono::{DateTime, Local, TimeZone};
use std::fmt::Display;

/// Tick format for raw and hourly charts
pub const HOURLY_DATE_FORMAT: &str = "%m-%d %Hh";
/// Tick format for daily and coarser charts
pub const DAILY_DATE_FORMAT: &str = "%Y-%m-%d";
/// Tick format for single-panel multi-line charts
pub const MULTI_LINE_DATE_FORMAT: &str = "%Y-%m-%d %H:%M";

pub type Rgb = (u8, u8, u8);

pub const BLACK: Rgb = (0, 0, 0);

/// Line colours, cycled in channel order
pub const PALETTE: [Rgb; 10] = [
    (31, 119, 180),
    (255, 127, 14),
    (44, 160, 44),
    (214, 39, 40),
    (148, 103, 189),
    (140, 86, 75),
    (227, 119, 194),
    (127, 127, 127),
    (188, 189, 34),
    (23, 190, 207),
];

/// One plotted series
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub label: String,
    pub color: Rgb,
    /// Draw a marker at every sample
    pub markers: bool,
    /// (unix seconds, value)
    pub points: Vec<(f64, f64)>,
    /// Symmetric vertical error magnitude per point
    pub errors: Option<Vec<f64>>,
}

impl Trace {
    fn from_channel(timestamps: &[f64], channel: &Channel, color: Rgb, markers: bool) -> Self {
        Self {
            label: channel.name.clone(),
            color,
            markers,
            points: timestamps.iter().copied().zip(channel.values.iter().copied()).collect(),
            errors: None,
        }
    }
}

/// One set of axes
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Panel {
    pub y_label: Option<String>,
    pub x_label: Option<String>,
    pub legend: bool,
    pub traces: Vec<Trace>,
}

impl Panel {
    /// Time extent of every trace, padded so single points stay visible
    pub fn x_range(&self) -> (f64, f64) {
        let xs = self.traces.iter().flat_map(|t| t.points.iter().map(|p| p.0));
        padded_range(xs, 0.02)
    }

    /// Value extent of every trace including error bars
    pub fn y_range(&self) -> (f64, f64) {
        let ys = self.traces.iter().flat_map(|t| {
            t.points.iter().enumerate().flat_map(move |(i, &(_, y))| {
                let e = t.errors.as_ref().and_then(|e| e.get(i)).copied().unwrap_or(0.0).abs();
                [y - e, y + e]
            })
        });
        padded_range(ys, 0.05)
    }
}

/// A titled figure of one or more stacked panels sharing a date tick format
#[derive(Debug, Clone, PartialEq)]
pub struct Chart {
    pub title: String,
    pub date_format: String,
    pub panels: Vec<Panel>,
}

impl Chart {
    /// Every channel as a line on one panel.
    ///
    /// With several channels a legend tells them apart; a lone channel names
    /// the y axis instead.
    pub fn multi_line(timestamps: &[f64], channels: &[Channel], title: &str) -> Self {
        let traces: Vec<Trace> = channels
            .iter()
            .zip(PALETTE.iter().cycle())
            .map(|(c, &color)| Trace::from_channel(timestamps, c, color, false))
            .collect();

        let single = match channels {
            [only] => Some(only.name.clone()),
            _ => None,
        };

        Self {
            title: title.to_string(),
            date_format: MULTI_LINE_DATE_FORMAT.to_string(),
            panels: vec![Panel {
                legend: channels.len() > 1,
                y_label: single,
                x_label: Some("Time".to_string()),
                traces,
            }],
        }
    }

    /// Two stacked panels, e.g. on/off cycles over energy
    pub fn dual_panel(
        timestamps: &[f64],
        top: &Channel,
        bottom: &Channel,
        title: &str,
        date_format: &str,
    ) -> Self {
        Self {
            title: title.to_string(),
            date_format: date_format.to_string(),
            panels: vec![
                labelled_panel(Trace::from_channel(timestamps, top, PALETTE[0], true)),
                labelled_panel(Trace::from_channel(timestamps, bottom, BLACK, true)),
            ],
        }
    }

    /// Like [`Chart::dual_panel`] but the bottom series carries error bars
    /// of magnitude `errors`
    pub fn dual_panel_error_bars(
        timestamps: &[f64],
        top: &Channel,
        bottom: &Channel,
        errors: &Channel,
        title: &str,
    ) -> Self {
        let mut estimate = Trace::from_channel(timestamps, bottom, PALETTE[0], false);
        estimate.errors = Some(errors.values.clone());

        Self {
            title: title.to_string(),
            date_format: HOURLY_DATE_FORMAT.to_string(),
            panels: vec![
                labelled_panel(Trace::from_channel(timestamps, top, PALETTE[0], true)),
                labelled_panel(estimate),
            ],
        }
    }

    /// Tick label for a unix timestamp in local time
    pub fn tick_label(&self, ts: f64) -> String {
        format_timestamp(ts, &self.date_format)
    }
}

fn labelled_panel(trace: Trace) -> Panel {
    Panel {
        y_label: Some(trace.label.clone()),
        x_label: None,
        legend: false,
        traces: vec![trace],
    }
}

/// A surface that charts are shown on
pub trait ChartSink {
    fn show(&mut self, chart: Chart) -> Result<()>;
}

impl<A: ChartSink, B: ChartSink> ChartSink for (A, B) {
    fn show(&mut self, chart: Chart) -> Result<()> {
        self.0.show(chart.clone())?;
        self.1.show(chart)
    }
}

/// Format unix seconds as local calendar time
pub fn format_timestamp(ts: f64, fmt: &str) -> String {
    format_timestamp_in(ts, fmt, &Local)
}

pub fn format_timestamp_in<Tz: TimeZone>(ts: f64, fmt: &str, tz: &Tz) -> String
where
    Tz::Offset: Display,
{
    let secs = ts.floor();
    let nanos = ((ts - secs) * 1e9) as u32;
    match DateTime::from_timestamp(secs as i64, nanos.min(999_999_999)) {
        Some(utc) => utc.with_timezone(tz).format(fmt).to_string(),
        None => format!("{}", ts),
    }
}

fn padded_range(values: impl Iterator<Item = f64>, margin: f64) -> (f64, f64) {
    let (min, max) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| (lo.min(v), hi.max(v)));

    if min > max {
        return (0.0, 1.0);
    }
    let span = max - min;
    let pad = if span > 0.0 {
        span * margin
    } else {
        (min.abs() * margin).max(1.0)
    };
    (min - pad, max + pad)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    const T0: f64 = 1_616_680_800.0; // 2021-03-25 14:00:00 UTC

    fn channel(name: &str, values: &[f64]) -> Channel {
        Channel::new(name, values.to_vec())
    }

    fn times(n: usize) -> Vec<f64> {
        (0..n).map(|i| T0 + 900.0 * i as f64).collect()
    }

    #[test]
    fn test_single_channel_labels_axis_without_legend() {
        let chart = Chart::multi_line(&times(3), &[channel("Watts", &[1.0, 2.0, 3.0])], "detail");
        let panel = &chart.panels[0];
        assert_eq!(chart.panels.len(), 1);
        assert_eq!(panel.y_label.as_deref(), Some("Watts"));
        assert!(!panel.legend);
        assert_eq!(panel.x_label.as_deref(), Some("Time"));
        assert_eq!(chart.date_format, MULTI_LINE_DATE_FORMAT);
    }

    #[test]
    fn test_several_channels_get_legend_not_axis_label() {
        let chart = Chart::multi_line(
            &times(2),
            &[channel("Volts", &[120.0, 121.0]), channel("Amps", &[3.0, 0.0])],
            "detail",
        );
        let panel = &chart.panels[0];
        assert!(panel.legend);
        assert_eq!(panel.y_label, None);
        let labels: Vec<&str> = panel.traces.iter().map(|t| t.label.as_str()).collect();
        assert_eq!(labels, vec!["Volts", "Amps"]);
        assert_ne!(panel.traces[0].color, panel.traces[1].color);
    }

    #[test]
    fn test_dual_panel_layout() {
        let ts = times(2);
        let chart = Chart::dual_panel(
            &ts,
            &channel("Cycles", &[1.0, 2.0]),
            &channel("Energy", &[10.0, 20.0]),
            "Hourly for 48-hours: pump_logEnergy.csv",
            DAILY_DATE_FORMAT,
        );
        assert_eq!(chart.panels.len(), 2);
        assert_eq!(chart.date_format, DAILY_DATE_FORMAT);

        let (top, bottom) = (&chart.panels[0], &chart.panels[1]);
        assert_eq!(top.y_label.as_deref(), Some("Cycles"));
        assert_eq!(bottom.y_label.as_deref(), Some("Energy"));
        assert!(!top.legend && !bottom.legend);
        assert!(top.traces[0].markers && bottom.traces[0].markers);
        assert_eq!(bottom.traces[0].color, BLACK);
        assert_ne!(top.traces[0].color, BLACK);
        assert_eq!(bottom.traces[0].points, vec![(ts[0], 10.0), (ts[1], 20.0)]);
    }

    #[test]
    fn test_error_bar_panel() {
        let chart = Chart::dual_panel_error_bars(
            &times(2),
            &channel("Runtime (s)", &[30.0, 45.0]),
            &channel("Avg (W)", &[400.0, 420.0]),
            &channel("StdDev (W)", &[12.0, 30.0]),
            "pump_logStats_1.csv",
        );
        let bottom = &chart.panels[1];
        assert_eq!(bottom.y_label.as_deref(), Some("Avg (W)"));
        assert_eq!(bottom.traces[0].errors, Some(vec![12.0, 30.0]));
        assert!(chart.panels[0].traces[0].errors.is_none());

        let (lo, hi) = bottom.y_range();
        assert!(lo < 388.0);
        assert!(hi > 450.0);
    }

    #[test]
    fn test_ranges_are_never_degenerate() {
        let flat = Chart::multi_line(&times(1), &[channel("A", &[5.0])], "flat");
        let (x0, x1) = flat.panels[0].x_range();
        let (y0, y1) = flat.panels[0].y_range();
        assert!(x0 < T0 && T0 < x1);
        assert!(y0 < 5.0 && 5.0 < y1);

        assert_eq!(Panel::default().x_range(), (0.0, 1.0));
    }

    #[test]
    fn test_format_timestamp_in_utc() {
        assert_eq!(format_timestamp_in(T0, HOURLY_DATE_FORMAT, &Utc), "03-25 14h");
        assert_eq!(format_timestamp_in(T0 + 1800.0, MULTI_LINE_DATE_FORMAT, &Utc), "2021-03-25 14:30");
        assert_eq!(format_timestamp_in(T0, DAILY_DATE_FORMAT, &Utc), "2021-03-25");
    }

    #[derive(Default)]
    struct Titles(Vec<String>);

    impl ChartSink for Titles {
        fn show(&mut self, chart: Chart) -> Result<()> {
            self.0.push(chart.title);
            Ok(())
        }
    }

    #[test]
    fn test_sink_pair_shows_on_both() {
        let mut pair = (Titles::default(), Titles::default());
        pair.show(Chart::multi_line(&times(1), &[channel("A", &[1.0])], "one")).unwrap();
        assert_eq!(pair.0 .0, vec!["one"]);
        assert_eq!(pair.1 .0, vec!["one"]);
    }
}
