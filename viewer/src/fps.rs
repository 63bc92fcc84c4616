//! Rendered-frames-per-second meter for the stats display.

#[cfg(test)]
#[path = "fps_test.rs"]
mod fps_test;

/// Counts ticks and reports the total once per elapsed second.
#[derive(Debug, Default)]
pub struct FpsMeter {
    window_start_ms: f64,
    count: u32,
}

impl FpsMeter {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick at `timestamp_ms` (a monotonic clock in milliseconds).
    ///
    /// Returns the number of ticks counted in the window that just closed,
    /// or `None` while the current one-second window is still open.
    pub fn tick(&mut self, timestamp_ms: f64) -> Option<u32> {
        let mut report = None;
        if timestamp_ms - self.window_start_ms >= 1000.0 {
            report = Some(self.count);
            self.count = 0;
            self.window_start_ms = timestamp_ms;
        }
        self.count += 1;
        report
    }
}
