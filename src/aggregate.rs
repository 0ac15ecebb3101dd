//! Window consolidation: sum fixed-size runs of samples into one point.

use crate::error::PlotError;
use crate::series::{Channel, TimeSeries};

/// Sum consecutive windows of `window` samples.
///
/// Each output point takes the timestamp of the first sample in its window;
/// the last window may be shorter and sums whatever remains. When
/// `max_windows > 0` only the last `max_windows + 1` points are kept.
pub fn consolidate(series: &TimeSeries, window: usize, max_windows: usize) -> Result<TimeSeries, PlotError> {
    if window == 0 {
        return Err(PlotError::InvalidArgument(
            "window size must be at least one sample".to_string(),
        ));
    }

    let mut timestamps: Vec<f64> = series.timestamps().iter().step_by(window).copied().collect();
    let mut channels: Vec<Channel> = series
        .channels()
        .iter()
        .map(|c| {
            let sums = c.values.chunks(window).map(|w| w.iter().sum::<f64>()).collect();
            Channel::new(c.name.clone(), sums)
        })
        .collect();

    if max_windows > 0 {
        let keep = max_windows + 1;
        let skip = timestamps.len().saturating_sub(keep);
        timestamps.drain(..skip);
        for channel in &mut channels {
            channel.values.drain(..skip);
        }
    }

    TimeSeries::new(timestamps, channels)
}
