//! Emulation speed measurement from the in-game frame counter.

use crate::constants::HARDWARE_FRAME_RATE;
use serde::Serialize;

/// Summary of the recorded frame rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FrameRateStats {
    /// Most recent rate (frames per second)
    pub latest: f64,
    /// Mean rate
    pub mean: f64,
    /// Population standard deviation
    pub std_dev: f64,
    /// Number of recorded rates
    pub count: usize,
    /// Mean rate relative to the console, in percent
    pub percent_of_hardware: f64,
    /// Seconds gained (positive) or lost (negative) per hour of play
    pub drift_seconds_per_hour: f64,
}

/// Accumulates frames-per-second readings between consecutive
/// (frame counter, timestamp) pairs.
#[derive(Debug, Clone, Default)]
pub struct FrameRateMeter {
    last: Option<(u32, u64)>,
    rates: Vec<f64>,
}

impl FrameRateMeter {
    /// Create an empty meter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a frame counter reading
    ///
    /// # Arguments
    ///
    /// * `frames` - Frame counter value
    /// * `timestamp_ms` - Wall-clock time of the read, in milliseconds
    ///
    /// # Returns
    ///
    /// The rate since the previous reading, if it was positive. Stalled or
    /// reset counters yield `None` and are not kept.
    pub fn record(&mut self, frames: u32, timestamp_ms: u64) -> Option<f64> {
        let previous = self.last.replace((frames, timestamp_ms));
        let (last_frames, last_ms) = previous?;
        if timestamp_ms <= last_ms {
            return None;
        }
        let df = i64::from(frames) - i64::from(last_frames);
        let fps = df as f64 * 1000.0 / (timestamp_ms - last_ms) as f64;
        (fps > 0.0).then(|| {
            self.rates.push(fps);
            fps
        })
    }

    /// Recorded rates, oldest first.
    pub fn rates(&self) -> &[f64] {
        &self.rates
    }

    /// Statistics over all recorded rates, `None` before the first one.
    pub fn stats(&self) -> Option<FrameRateStats> {
        let latest = *self.rates.last()?;
        let count = self.rates.len();
        let mean = self.rates.iter().sum::<f64>() / count as f64;
        let variance = self.rates.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / count as f64;
        Some(FrameRateStats {
            latest,
            mean,
            std_dev: variance.sqrt(),
            count,
            percent_of_hardware: mean / HARDWARE_FRAME_RATE * 100.0,
            drift_seconds_per_hour: (mean - HARDWARE_FRAME_RATE) / HARDWARE_FRAME_RATE * 3600.0,
        })
    }

    /// Forget every reading.
    pub fn reset(&mut self) {
        self.last = None;
        self.rates.clear();
    }
}
