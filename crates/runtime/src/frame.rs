use foundation::time::Time;

/// Deterministic frame metadata.
///
/// Fixed-step timebase shared by the view-model and scripted camera flights.
/// It is intentionally small and pure so it can be recorded and replayed.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Frame {
    /// 0-based frame index.
    pub index: u64,
    /// Fixed delta time (seconds).
    pub dt_s: f64,
    /// Time at the start of the frame (seconds).
    pub time: Time,
}

impl Frame {
    pub fn new(index: u64, dt_s: f64) -> Self {
        Self {
            index,
            dt_s,
            time: Time(index as f64 * dt_s),
        }
    }

    /// Frame `index` of a stream running at `fps` frames per second.
    pub fn at_rate(index: u64, fps: f64) -> Self {
        Self::new(index, 1.0 / fps)
    }

    pub fn next(self) -> Self {
        Self::new(self.index + 1, self.dt_s)
    }

    pub fn time_ms(&self) -> f64 {
        self.time.as_millis()
    }
}
