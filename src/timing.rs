//! Measurement windows.

use std::time::{Duration, Instant};

/// Start and stop instants around exactly the repeated body of a scenario.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingWindow {
    start: Instant,
    stop: Instant,
}

impl TimingWindow {
    pub fn start(&self) -> Instant {
        self.start
    }

    pub fn stop(&self) -> Instant {
        self.stop
    }

    pub fn elapsed(&self) -> Duration {
        self.stop.duration_since(self.start)
    }
}

/// An open window. Closing it yields a [`TimingWindow`].
#[derive(Debug)]
pub struct Stopwatch {
    start: Instant,
}

impl Stopwatch {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    pub fn stop(self) -> TimingWindow {
        TimingWindow {
            start: self.start,
            stop: Instant::now(),
        }
    }
}

/// Outcome of one timed run.
#[derive(Debug, Clone, Copy)]
pub struct Measurement {
    /// Timed repetitions of the scenario body.
    pub repetitions: u64,
    /// Operations across all repetitions; repetitions times workers for pooled runs.
    pub operations: u64,
    pub window: TimingWindow,
}

impl Measurement {
    pub fn elapsed(&self) -> Duration {
        self.window.elapsed()
    }

    /// Average wall time per operation. Zero when nothing ran.
    pub fn per_operation(&self) -> Duration {
        if self.operations == 0 {
            return Duration::ZERO;
        }
        let nanos = self.elapsed().as_nanos() / u128::from(self.operations);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }

    /// Operations per second over the whole window.
    pub fn throughput(&self) -> f64 {
        let secs = self.elapsed().as_secs_f64();
        if secs == 0.0 {
            return 0.0;
        }
        self.operations as f64 / secs
    }
}
