//! Time-windowed aggregation of station samples.
//!
//! Each [`TimeWindow`] keeps the samples of one series that fall inside a
//! trailing interval and derives one value from them:
//!
//! | Kind | Window | Derived value |
//! |------|--------|---------------|
//! | [`WindowKind::RainTotal`] | 3600 s | counter now minus counter at window start |
//! | [`WindowKind::WindAverage`] | 60 s | arithmetic mean |
//! | [`WindowKind::GustMax`] | 60 s | maximum, 0 when empty |
//!
//! Samples are keyed by their Unix timestamp in seconds. A second sample
//! with the same timestamp replaces the first.
//!
//! # Example
//!
//! ```
//! use fineoffset_core::window::TimeWindow;
//!
//! let mut wind = TimeWindow::wind_average();
//! wind.update(1000, 2.0);
//! assert_eq!(wind.update(1020, 4.0), 3.0);
//! ```

use std::collections::BTreeMap;

/// Length of the rain accumulation window in seconds.
pub const RAIN_WINDOW_SECS: i64 = 3600;

/// Oldest age in seconds an evicted rain sample may have to serve as baseline.
pub const RAIN_BASELINE_MAX_AGE_SECS: i64 = 7200;

/// Length of the wind average and gust windows in seconds.
pub const WIND_WINDOW_SECS: i64 = 60;

/// The statistic a window derives from its samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowKind {
    /// Accumulation of a monotonically increasing counter.
    RainTotal,
    /// Mean of all samples.
    WindAverage,
    /// Maximum of all samples.
    GustMax,
}

impl WindowKind {
    /// Window length in seconds.
    pub fn length_secs(&self) -> i64 {
        match self {
            WindowKind::RainTotal => RAIN_WINDOW_SECS,
            WindowKind::WindAverage | WindowKind::GustMax => WIND_WINDOW_SECS,
        }
    }
}

/// A trailing window of `(timestamp, value)` samples and its derived value.
#[derive(Debug, Clone)]
pub struct TimeWindow {
    kind: WindowKind,
    samples: BTreeMap<i64, f64>,
    baseline: Option<f64>,
    value: f64,
}

impl TimeWindow {
    /// Create an empty window of the given kind.
    pub fn new(kind: WindowKind) -> Self {
        Self {
            kind,
            samples: BTreeMap::new(),
            baseline: None,
            value: 0.0,
        }
    }

    /// Create an hourly rain accumulation window.
    pub fn rain() -> Self {
        Self::new(WindowKind::RainTotal)
    }

    /// Create a one-minute wind average window.
    pub fn wind_average() -> Self {
        Self::new(WindowKind::WindAverage)
    }

    /// Create a one-minute gust maximum window.
    pub fn gust_max() -> Self {
        Self::new(WindowKind::GustMax)
    }

    /// Kind of statistic this window derives.
    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    /// The current derived value.
    pub fn value(&self) -> f64 {
        self.value
    }

    /// Number of retained samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Returns `true` if no samples are retained.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Timestamp of the oldest retained sample.
    pub fn oldest(&self) -> Option<i64> {
        self.samples.keys().next().copied()
    }

    /// Timestamp of the newest retained sample.
    pub fn latest(&self) -> Option<i64> {
        self.samples.keys().next_back().copied()
    }

    /// Insert a sample, evict everything older than the window and return the
    /// recomputed value.
    ///
    /// The window is anchored at the newest timestamp seen, so a late sample
    /// never widens it. A sample already older than the window is discarded
    /// and the current value returned unchanged.
    pub fn update(&mut self, timestamp: i64, raw: f64) -> f64 {
        if let Some(latest) = self.latest() {
            if timestamp < latest - self.kind.length_secs() {
                return self.value;
            }
        }

        self.samples.insert(timestamp, raw);
        let now = self.latest().unwrap_or(timestamp);

        let retained = self.samples.split_off(&(now - self.kind.length_secs()));
        let evicted = std::mem::replace(&mut self.samples, retained);

        match self.kind {
            WindowKind::RainTotal => {
                // The newest evicted sample is the counter at window start,
                // unless it is too old to say anything about the last hour.
                if let Some((ts, v)) = evicted.last_key_value() {
                    self.baseline = (*ts > now - RAIN_BASELINE_MAX_AGE_SECS).then_some(*v);
                }

                if let (Some(base), Some((_, current))) =
                    (self.baseline, self.samples.last_key_value())
                {
                    // A counter reset must not report negative rain.
                    self.value = (current - base).max(0.0);
                }
            }
            WindowKind::WindAverage => {
                if !self.samples.is_empty() {
                    let sum: f64 = self.samples.values().sum();
                    self.value = sum / self.samples.len() as f64;
                }
            }
            WindowKind::GustMax => {
                self.value = self.samples.values().fold(0.0_f64, |max, v| max.max(*v));
            }
        }

        self.value
    }
}
