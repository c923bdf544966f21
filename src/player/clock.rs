/// Fixed-rate frame pacing driven by animation-frame timestamps.
///
/// A frame is due once strictly more than one interval has elapsed since the
/// last frame. When it is, the last frame time is moved forward by the
/// elapsed time minus the overshoot, so the long-run rate stays at `fps`
/// even though display refreshes do not line up with frame boundaries.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameClock {
    interval: f64,
    last_frame_time: f64,
}

impl FrameClock {
    /// `interval` is the frame duration in milliseconds.
    pub fn new(interval: f64) -> FrameClock {
        FrameClock {
            interval,
            last_frame_time: 0.0,
        }
    }

    pub fn interval(&self) -> f64 {
        self.interval
    }

    pub fn last_frame_time(&self) -> f64 {
        self.last_frame_time
    }

    pub fn reset(&mut self, now: f64) {
        self.last_frame_time = now;
    }

    /// Returns true when a new frame is due at `timestamp`.
    pub fn poll(&mut self, timestamp: f64) -> bool {
        let elapsed = timestamp - self.last_frame_time;
        if elapsed > self.interval {
            self.last_frame_time = timestamp - (elapsed % self.interval);
            true
        } else {
            false
        }
    }
}
