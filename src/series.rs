//! In-memory time series: shared timestamps plus ordered named channels.

use crate::error::PlotError;

/// One named column of samples
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    pub name: String,
    pub values: Vec<f64>,
}

impl Channel {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn total(&self) -> f64 {
        self.values.iter().sum()
    }
}

/// Unix timestamps (seconds) and the channels sampled at them.
///
/// Every channel holds exactly one value per timestamp and channel names are
/// unique; both are checked by [`TimeSeries::new`].
#[derive(Debug, Clone, PartialEq)]
pub struct TimeSeries {
    timestamps: Vec<f64>,
    channels: Vec<Channel>,
}

impl TimeSeries {
    pub fn new(timestamps: Vec<f64>, channels: Vec<Channel>) -> Result<Self, PlotError> {
        for (idx, channel) in channels.iter().enumerate() {
            if channel.values.len() != timestamps.len() {
                return Err(PlotError::InvalidArgument(format!(
                    "channel '{}' has {} values for {} timestamps",
                    channel.name,
                    channel.values.len(),
                    timestamps.len()
                )));
            }
            if channels[..idx].iter().any(|c| c.name == channel.name) {
                return Err(PlotError::InvalidArgument(format!(
                    "duplicate channel name '{}'",
                    channel.name
                )));
            }
        }
        Ok(Self {
            timestamps,
            channels,
        })
    }

    /// Number of samples
    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[f64] {
        &self.timestamps
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name.as_str()).collect()
    }

    /// Channels taken two at a time in column order. A trailing odd channel
    /// comes back as a one-element slice.
    pub fn channel_pairs(&self) -> std::slice::Chunks<'_, Channel> {
        self.channels.chunks(2)
    }
}
