/// Average frame time over one reporting window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameReport {
    pub frames: u32,
    pub average_ms: f64,
}

impl FrameReport {
    pub fn fps(&self) -> f64 {
        if self.average_ms > 0.0 {
            1000.0 / self.average_ms
        } else {
            0.0
        }
    }
}

/// Result of one [`FrameTimer::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameTick {
    /// Seconds since the previous tick; zero on the first tick.
    pub delta: f64,
    /// Present once per reporting window.
    pub report: Option<FrameReport>,
}

/// Measures per-frame deltas and reports the running average frame time
/// roughly once per `window` seconds.
#[derive(Debug, Clone)]
pub struct FrameTimer {
    window: f64,
    last_frame: Option<f64>,
    window_start: f64,
    frames: u32,
    last_report: Option<FrameReport>,
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new(1.0)
    }
}

impl FrameTimer {
    pub fn new(window: f64) -> Self {
        Self {
            window,
            last_frame: None,
            window_start: 0.0,
            frames: 0,
            last_report: None,
        }
    }

    /// Record a frame at `now` seconds on a monotonic clock.
    pub fn tick(&mut self, now: f64) -> FrameTick {
        let Some(last) = self.last_frame.replace(now) else {
            // The first tick only starts the clock.
            self.window_start = now;
            return FrameTick {
                delta: 0.0,
                report: None,
            };
        };
        let delta = (now - last).max(0.0);
        self.frames += 1;

        let elapsed = now - self.window_start;
        let report = if elapsed >= self.window {
            let report = FrameReport {
                frames: self.frames,
                average_ms: elapsed / f64::from(self.frames) * 1000.0,
            };
            tracing::debug!(
                frames = report.frames,
                average_ms = report.average_ms,
                "frame window closed"
            );
            self.frames = 0;
            self.window_start = now;
            self.last_report = Some(report);
            Some(report)
        } else {
            None
        };

        FrameTick { delta, report }
    }

    /// Most recent completed report, if any.
    pub fn last_report(&self) -> Option<FrameReport> {
        self.last_report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_tick_has_zero_delta() {
        let mut timer = FrameTimer::default();
        let tick = timer.tick(5.0);
        assert_eq!(tick.delta, 0.0);
        assert!(tick.report.is_none());
    }

    #[test]
    fn deltas_between_ticks() {
        let mut timer = FrameTimer::default();
        timer.tick(0.0);
        let tick = timer.tick(0.25);
        assert!((tick.delta - 0.25).abs() < 1e-12);
    }

    #[test]
    fn reports_once_per_window() {
        let mut timer = FrameTimer::default();
        let mut reports = Vec::new();
        for i in 0..=128 {
            if let Some(report) = timer.tick(f64::from(i) / 64.0).report {
                reports.push(report);
            }
        }
        // Two seconds of 15.625 ms frames.
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].frames, 64);
        assert_eq!(reports[0].average_ms, 15.625);
        assert_eq!(reports[0].fps(), 64.0);
        assert_eq!(timer.last_report(), Some(reports[1]));
    }

    #[test]
    fn clock_going_backwards_clamps_delta() {
        let mut timer = FrameTimer::default();
        timer.tick(2.0);
        assert_eq!(timer.tick(1.0).delta, 0.0);
    }
}
