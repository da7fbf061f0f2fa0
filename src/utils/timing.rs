// Start/stop/duration reconciliation

/// Optional stop timestamp and duration supplied when stopping an executable
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct StopOptions {
    pub stop: Option<i64>,
    /// Duration in milliseconds, possibly fractional
    pub duration: Option<f64>,
}

impl StopOptions {
    pub fn at(stop: i64) -> Self {
        Self {
            stop: Some(stop),
            duration: None,
        }
    }

    pub fn with_duration(duration: f64) -> Self {
        Self {
            stop: None,
            duration: Some(duration),
        }
    }

    pub fn stop(mut self, stop: i64) -> Self {
        self.stop = Some(stop);
        self
    }
}

/// Resolved start and stop in whole epoch milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub start: i64,
    pub stop: i64,
}

/// Reconcile whatever timing information is known into a start/stop pair.
///
/// A duration always wins: it is clamped to zero and the missing (or conflicting)
/// end is derived from the known one, anchored on `stop` first, then `start`,
/// then `now`. Without a duration a missing stop becomes `now` and a missing
/// start collapses onto the stop.
pub fn reconcile_timing(
    start: Option<i64>,
    stop: Option<i64>,
    duration: Option<f64>,
    now: i64,
) -> Timings {
    if let Some(duration) = duration {
        let duration = duration.max(0.0);
        let (start, stop) = match (start, stop) {
            (_, Some(stop)) => (stop as f64 - duration, stop as f64),
            (Some(start), None) => (start as f64, start as f64 + duration),
            (None, None) => (now as f64 - duration, now as f64),
        };
        return Timings {
            start: start.round() as i64,
            stop: stop.round() as i64,
        };
    }

    let stop = stop.unwrap_or(now);
    let start = start.unwrap_or(stop);
    Timings { start, stop }
}
