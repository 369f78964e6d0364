//! Scripted camera flights for frame-by-frame capture.
//!
//! Keyframes are sampled on the fixed-step [`Frame`] timebase so a capture at a
//! given frame rate always produces the same camera sequence. Encoding the
//! captured frames to video happens outside this crate.

use foundation::time::{Time, TimeSpan};
use runtime::Frame;
use serde::{Deserialize, Serialize};

use crate::view_state::{DEFAULT_MAX_PITCH, ViewState};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Easing {
    Linear,
    /// Quadratic ease-in mirrored into an ease-out.
    #[default]
    EaseInOut,
}

impl Easing {
    pub fn apply(self, p: f64) -> f64 {
        let p = p.clamp(0.0, 1.0);
        match self {
            Easing::Linear => p,
            Easing::EaseInOut => {
                if p < 0.5 {
                    2.0 * p * p
                } else {
                    let q = 1.0 - p;
                    1.0 - 2.0 * q * q
                }
            }
        }
    }
}

/// Camera fields animated by a flight.
#[derive(Debug, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub latitude: f64,
    pub longitude: f64,
    pub bearing: f64,
    pub pitch: f64,
    pub zoom: f64,
}

impl CameraPose {
    fn lerp(self, to: Self, t: f64) -> Self {
        let mix = |a: f64, b: f64| a + (b - a) * t;
        Self {
            latitude: mix(self.latitude, to.latitude),
            longitude: mix(self.longitude, to.longitude),
            bearing: mix(self.bearing, to.bearing),
            pitch: mix(self.pitch, to.pitch),
            zoom: mix(self.zoom, to.zoom),
        }
    }

    pub fn to_view_state(self) -> ViewState {
        ViewState {
            latitude: self.latitude,
            longitude: self.longitude,
            bearing: self.bearing,
            pitch: self.pitch,
            zoom: self.zoom,
            max_pitch: DEFAULT_MAX_PITCH,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FlightError {
    NoKeyframes,
    TimingCount { timings: usize, keyframes: usize },
    UnorderedTimings { index: usize },
    EasingCount { easings: usize, segments: usize },
}

impl std::fmt::Display for FlightError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FlightError::NoKeyframes => write!(f, "flight has no keyframes"),
            FlightError::TimingCount { timings, keyframes } => {
                write!(f, "{timings} timings for {keyframes} keyframes")
            }
            FlightError::UnorderedTimings { index } => {
                write!(f, "timing {index} is earlier than the one before it")
            }
            FlightError::EasingCount { easings, segments } => {
                write!(f, "{easings} easings for {segments} segments")
            }
        }
    }
}

impl std::error::Error for FlightError {}

/// Camera keyframes at absolute times (ms) with one easing per segment.
///
/// A single easing is accepted and applies to every segment.
#[derive(Debug, Clone, PartialEq)]
pub struct CameraKeyframes {
    timings_ms: Vec<f64>,
    keyframes: Vec<CameraPose>,
    easings: Vec<Easing>,
}

impl CameraKeyframes {
    pub fn new(
        timings_ms: Vec<f64>,
        keyframes: Vec<CameraPose>,
        easings: Vec<Easing>,
    ) -> Result<Self, FlightError> {
        if keyframes.is_empty() {
            return Err(FlightError::NoKeyframes);
        }
        if timings_ms.len() != keyframes.len() {
            return Err(FlightError::TimingCount {
                timings: timings_ms.len(),
                keyframes: keyframes.len(),
            });
        }
        if let Some(index) = (1..timings_ms.len()).find(|&i| timings_ms[i] < timings_ms[i - 1]) {
            return Err(FlightError::UnorderedTimings { index });
        }
        let segments = keyframes.len() - 1;
        if segments > 0 && easings.len() != 1 && easings.len() != segments {
            return Err(FlightError::EasingCount {
                easings: easings.len(),
                segments,
            });
        }
        Ok(Self {
            timings_ms,
            keyframes,
            easings,
        })
    }

    pub fn duration_ms(&self) -> f64 {
        match (self.timings_ms.first(), self.timings_ms.last()) {
            (Some(first), Some(last)) => last - first,
            _ => 0.0,
        }
    }

    fn easing(&self, segment: usize) -> Easing {
        match self.easings.as_slice() {
            [] => Easing::Linear,
            [only] => *only,
            all => all[segment],
        }
    }

    /// Pose at `ms`, held at the first/last keyframe outside the timeline.
    pub fn pose_at(&self, ms: f64) -> CameraPose {
        let last = self.keyframes.len() - 1;
        let segment = self
            .timings_ms
            .windows(2)
            .position(|w| ms < w[1])
            .unwrap_or(last.saturating_sub(1));
        if last == 0 {
            return self.keyframes[0];
        }
        let span = TimeSpan::new(
            Time::from_millis(self.timings_ms[segment]),
            Time::from_millis(self.timings_ms[segment + 1]),
        );
        let t = self.easing(segment).apply(span.progress(Time::from_millis(ms)));
        self.keyframes[segment].lerp(self.keyframes[segment + 1], t)
    }
}

/// A fixed-length capture of a keyframed flight at a given resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct FlightScene {
    pub keyframes: CameraKeyframes,
    pub length_ms: f64,
    pub width: u32,
    pub height: u32,
}

impl FlightScene {
    /// Five-second orbit over the Grand Canyon at 640×480.
    pub fn grand_canyon_orbit() -> Result<Self, FlightError> {
        let start = CameraPose {
            latitude: 36.1238,
            longitude: -112.1356,
            bearing: -64.2458,
            pitch: 63.3130,
            zoom: 11.51,
        };
        let end = CameraPose {
            bearing: -275.19642857142857,
            ..start
        };
        Ok(Self {
            keyframes: CameraKeyframes::new(
                vec![0.0, 5000.0],
                vec![start, end],
                vec![Easing::EaseInOut],
            )?,
            length_ms: 5000.0,
            width: 640,
            height: 480,
        })
    }

    pub fn view_at(&self, ms: f64) -> ViewState {
        self.keyframes.pose_at(ms).to_view_state()
    }

    pub fn frame_count(&self, fps: f64) -> u64 {
        if fps <= 0.0 || self.length_ms <= 0.0 {
            return 0;
        }
        (self.length_ms / 1000.0 * fps).ceil() as u64
    }

    /// Camera for every frame of the capture.
    pub fn frames(&self, fps: f64) -> impl Iterator<Item = (Frame, ViewState)> + '_ {
        (0..self.frame_count(fps)).map(move |i| {
            let frame = Frame::at_rate(i, fps);
            (frame, self.view_at(frame.time_ms()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "expected {b}, got {a}");
    }

    #[test]
    fn ease_in_out_is_symmetric() {
        let e = Easing::EaseInOut;
        assert_eq!(e.apply(0.0), 0.0);
        assert_eq!(e.apply(0.5), 0.5);
        assert_eq!(e.apply(1.0), 1.0);
        assert_close(e.apply(0.25), 0.125, 1e-12);
        assert_close(e.apply(0.75), 0.875, 1e-12);
        assert_close(e.apply(0.1) + e.apply(0.9), 1.0, 1e-12);
    }

    #[test]
    fn orbit_holds_position_and_sweeps_bearing() {
        let scene = FlightScene::grand_canyon_orbit().unwrap();
        let start = scene.view_at(0.0);
        let mid = scene.view_at(2500.0);
        let end = scene.view_at(5000.0);
        assert_eq!(start.bearing, -64.2458);
        assert_close(end.bearing, -275.19642857142857, 1e-9);
        assert_close(mid.bearing, (-64.2458 + -275.19642857142857) / 2.0, 1e-9);
        assert_eq!(mid.latitude, 36.1238);
        assert_eq!(mid.zoom, 11.51);
        assert_eq!(scene.view_at(9000.0), end);
        assert_eq!(scene.view_at(-10.0), start);
    }

    #[test]
    fn frames_cover_the_scene_length() {
        let scene = FlightScene::grand_canyon_orbit().unwrap();
        assert_eq!(scene.frame_count(30.0), 150);
        let frames: Vec<_> = scene.frames(30.0).collect();
        assert_eq!(frames.len(), 150);
        assert_eq!(frames[0].0.index, 0);
        assert_eq!(frames[0].1, scene.view_at(0.0));
        let (last_frame, last_view) = frames[149];
        assert_close(last_frame.time_ms(), 149.0 * 1000.0 / 30.0, 1e-6);
        assert!(last_view.bearing < frames[75].1.bearing);
        assert_eq!(scene.frame_count(0.0), 0);
    }

    #[test]
    fn keyframes_validate_shape() {
        let pose = CameraPose {
            latitude: 0.0,
            longitude: 0.0,
            bearing: 0.0,
            pitch: 0.0,
            zoom: 1.0,
        };
        assert_eq!(
            CameraKeyframes::new(vec![], vec![], vec![]),
            Err(FlightError::NoKeyframes)
        );
        assert_eq!(
            CameraKeyframes::new(vec![0.0], vec![pose, pose], vec![]),
            Err(FlightError::TimingCount {
                timings: 1,
                keyframes: 2
            })
        );
        assert_eq!(
            CameraKeyframes::new(vec![10.0, 0.0], vec![pose, pose], vec![Easing::Linear]),
            Err(FlightError::UnorderedTimings { index: 1 })
        );
        assert_eq!(
            CameraKeyframes::new(
                vec![0.0, 1.0, 2.0],
                vec![pose, pose, pose],
                vec![Easing::Linear; 3]
            ),
            Err(FlightError::EasingCount {
                easings: 3,
                segments: 2
            })
        );
    }

    #[test]
    fn multi_segment_flight_uses_per_segment_easing() {
        let at = |zoom| CameraPose {
            latitude: 0.0,
            longitude: 0.0,
            bearing: 0.0,
            pitch: 0.0,
            zoom,
        };
        let kf = CameraKeyframes::new(
            vec![0.0, 100.0, 300.0],
            vec![at(0.0), at(10.0), at(20.0)],
            vec![Easing::Linear, Easing::EaseInOut],
        )
        .unwrap();
        assert_close(kf.pose_at(50.0).zoom, 5.0, 1e-12);
        assert_close(kf.pose_at(150.0).zoom, 11.25, 1e-12);
        assert_eq!(kf.duration_ms(), 300.0);
        let single = CameraKeyframes::new(vec![5.0], vec![at(3.0)], vec![]).unwrap();
        assert_eq!(single.pose_at(100.0).zoom, 3.0);
    }
}
