//! Per-heat lane stopwatches.

use crate::timer::TimerId;
use crate::utils::{elapsed_hundredths, format_elapsed, format_hundredths};
use serde::Serialize;

/// Lanes per heat. The widget times two parallel lanes and no more.
pub const LANE_COUNT: usize = 2;

/// One independently stoppable stopwatch.
#[derive(Debug, Clone, PartialEq)]
pub struct Lane {
    started_at_ms: f64,
    display: String,
    stopped_secs: Option<f64>,
}

impl Lane {
    fn new(started_at_ms: f64) -> Self {
        Self {
            started_at_ms,
            display: format_elapsed(0.0),
            stopped_secs: None,
        }
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped_secs.is_some()
    }

    /// Final elapsed seconds, once stopped.
    pub fn stopped_secs(&self) -> Option<f64> {
        self.stopped_secs
    }

    /// Text currently shown in the lane's time label.
    pub fn display(&self) -> &str {
        &self.display
    }

    /// Refresh the label; a stopped lane keeps its final value.
    fn redraw(&mut self, now_ms: f64) {
        if !self.is_stopped() {
            self.display = format_elapsed(now_ms - self.started_at_ms);
        }
    }

    fn stop(&mut self, now_ms: f64) -> Option<f64> {
        if self.is_stopped() {
            return None;
        }
        // Label and stored result come from the same rounded value
        let hundredths = elapsed_hundredths(now_ms - self.started_at_ms);
        self.display = format_hundredths(hundredths);
        let secs = hundredths as f64 / 100.0;
        self.stopped_secs = Some(secs);
        Some(secs)
    }
}

/// One timed round of [`LANE_COUNT`] lanes started together.
#[derive(Debug, Clone, PartialEq)]
pub struct Heat {
    number: u32,
    started_at_ms: f64,
    lanes: [Lane; LANE_COUNT],
    pub(crate) redraw_timer: Option<TimerId>,
}

impl Heat {
    pub(crate) fn new(number: u32, started_at_ms: f64) -> Self {
        Self {
            number,
            started_at_ms,
            lanes: std::array::from_fn(|_| Lane::new(started_at_ms)),
            redraw_timer: None,
        }
    }

    /// 1-based heat number.
    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn started_at_ms(&self) -> f64 {
        self.started_at_ms
    }

    pub fn lanes(&self) -> &[Lane] {
        &self.lanes
    }

    pub fn lane(&self, index: usize) -> Option<&Lane> {
        self.lanes.get(index)
    }

    /// True while at least one lane is still running.
    pub fn is_running(&self) -> bool {
        self.lanes.iter().any(|lane| !lane.is_stopped())
    }

    pub(crate) fn redraw(&mut self, now_ms: f64) {
        for lane in &mut self.lanes {
            lane.redraw(now_ms);
        }
    }

    /// Stop one lane. `None` if the index is out of range or the lane was
    /// already stopped.
    pub(crate) fn stop_lane(&mut self, index: usize, now_ms: f64) -> Option<f64> {
        self.lanes.get_mut(index)?.stop(now_ms)
    }

    pub(crate) fn summary(&self) -> HeatSummary {
        HeatSummary {
            heat: self.number,
            lanes: self.lanes.iter().map(Lane::stopped_secs).collect(),
        }
    }
}

/// Lane results of one heat, `None` for lanes never stopped.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeatSummary {
    pub heat: u32,
    pub lanes: Vec<Option<f64>>,
}
