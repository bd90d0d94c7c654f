//! Easing curves for tween timing.
//!
//! Every curve maps an elapsed time inside a tween to a progress value.
//! Most curves return values in `0.0..=1.0`; Back and Elastic deliberately
//! overshoot that range.
//!
//! # Usage
//!
//! ```
//! use rune_scene::animation::easing::{self, EaseType};
//!
//! let p = easing::evaluate(EaseType::QuadOut, 1.0, 2.0, easing::DEFAULT_OVERSHOOT, 0.0);
//! assert!((p - 0.75).abs() < 1e-6);
//!
//! // Ids outside the table fall back to QuadOut.
//! assert_eq!(EaseType::from_id(200), EaseType::QuadOut);
//! ```

use super::path::{GPath, PathPoint};
use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, PI};

const TWO_PI: f32 = PI * 2.0;

/// Default overshoot for Back curves, also used as the Elastic amplitude.
pub const DEFAULT_OVERSHOOT: f32 = 1.70158;

/// Number of samples taken along a custom easing path.
pub const CUSTOM_EASE_SAMPLES: usize = 200;

/// Easing curve identifier.
///
/// The discriminants are the on-disk ids used by packaged gear data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum EaseType {
    Linear = 0,
    SineIn = 1,
    SineOut = 2,
    SineInOut = 3,
    QuadIn = 4,
    #[default]
    QuadOut = 5,
    QuadInOut = 6,
    CubicIn = 7,
    CubicOut = 8,
    CubicInOut = 9,
    QuartIn = 10,
    QuartOut = 11,
    QuartInOut = 12,
    QuintIn = 13,
    QuintOut = 14,
    QuintInOut = 15,
    ExpoIn = 16,
    ExpoOut = 17,
    ExpoInOut = 18,
    CircIn = 19,
    CircOut = 20,
    CircInOut = 21,
    ElasticIn = 22,
    ElasticOut = 23,
    ElasticInOut = 24,
    BackIn = 25,
    BackOut = 26,
    BackInOut = 27,
    BounceIn = 28,
    BounceOut = 29,
    BounceInOut = 30,
    /// Sampled from a path supplied alongside the tween.
    Custom = 31,
}

impl EaseType {
    const TABLE: [EaseType; 32] = [
        Self::Linear,
        Self::SineIn,
        Self::SineOut,
        Self::SineInOut,
        Self::QuadIn,
        Self::QuadOut,
        Self::QuadInOut,
        Self::CubicIn,
        Self::CubicOut,
        Self::CubicInOut,
        Self::QuartIn,
        Self::QuartOut,
        Self::QuartInOut,
        Self::QuintIn,
        Self::QuintOut,
        Self::QuintInOut,
        Self::ExpoIn,
        Self::ExpoOut,
        Self::ExpoInOut,
        Self::CircIn,
        Self::CircOut,
        Self::CircInOut,
        Self::ElasticIn,
        Self::ElasticOut,
        Self::ElasticInOut,
        Self::BackIn,
        Self::BackOut,
        Self::BackInOut,
        Self::BounceIn,
        Self::BounceOut,
        Self::BounceInOut,
        Self::Custom,
    ];

    /// Map a stored id to a curve. Unknown ids become [`EaseType::QuadOut`].
    pub fn from_id(id: u8) -> Self {
        Self::TABLE
            .get(usize::from(id))
            .copied()
            .unwrap_or(Self::QuadOut)
    }

    /// The stored id of this curve.
    pub fn id(self) -> u8 {
        self as u8
    }

    /// Evaluate this curve. See [`evaluate`].
    pub fn evaluate(self, time: f32, duration: f32, overshoot_or_amplitude: f32, period: f32) -> f32 {
        evaluate(self, time, duration, overshoot_or_amplitude, period)
    }
}

/// Evaluate `ease` at `time` seconds into a tween lasting `duration` seconds.
///
/// A non-positive duration is treated as already finished and returns 1.
/// `overshoot_or_amplitude` drives Back (overshoot) and Elastic (amplitude);
/// `period` only affects Elastic, where 0 selects a duration-relative default.
/// [`EaseType::Custom`] has no curve here and evaluates linearly.
pub fn evaluate(
    ease: EaseType,
    time: f32,
    duration: f32,
    overshoot_or_amplitude: f32,
    period: f32,
) -> f32 {
    if duration <= 0.0 {
        return 1.0;
    }

    let d = duration;
    match ease {
        EaseType::Linear | EaseType::Custom => time / d,
        EaseType::SineIn => -(time / d * FRAC_PI_2).cos() + 1.0,
        EaseType::SineOut => (time / d * FRAC_PI_2).sin(),
        EaseType::SineInOut => -0.5 * ((PI * time / d).cos() - 1.0),
        EaseType::QuadIn => {
            let t = time / d;
            t * t
        }
        EaseType::QuadOut => {
            let t = time / d;
            -t * (t - 2.0)
        }
        EaseType::QuadInOut => {
            let mut t = time / (d * 0.5);
            if t < 1.0 {
                return 0.5 * t * t;
            }
            t -= 1.0;
            -0.5 * (t * (t - 2.0) - 1.0)
        }
        EaseType::CubicIn => {
            let t = time / d;
            t * t * t
        }
        EaseType::CubicOut => {
            let t = time / d - 1.0;
            t * t * t + 1.0
        }
        EaseType::CubicInOut => {
            let mut t = time / (d * 0.5);
            if t < 1.0 {
                return 0.5 * t * t * t;
            }
            t -= 2.0;
            0.5 * (t * t * t + 2.0)
        }
        EaseType::QuartIn => {
            let t = time / d;
            t * t * t * t
        }
        EaseType::QuartOut => {
            let t = time / d - 1.0;
            -(t * t * t * t - 1.0)
        }
        EaseType::QuartInOut => {
            let mut t = time / (d * 0.5);
            if t < 1.0 {
                return 0.5 * t * t * t * t;
            }
            t -= 2.0;
            -0.5 * (t * t * t * t - 2.0)
        }
        EaseType::QuintIn => {
            let t = time / d;
            t * t * t * t * t
        }
        EaseType::QuintOut => {
            let t = time / d - 1.0;
            t * t * t * t * t + 1.0
        }
        EaseType::QuintInOut => {
            let mut t = time / (d * 0.5);
            if t < 1.0 {
                return 0.5 * t * t * t * t * t;
            }
            t -= 2.0;
            0.5 * (t * t * t * t * t + 2.0)
        }
        EaseType::ExpoIn => {
            if time == 0.0 {
                0.0
            } else {
                2f32.powf(10.0 * (time / d - 1.0))
            }
        }
        EaseType::ExpoOut => {
            if time == d {
                1.0
            } else {
                -(2f32.powf(-10.0 * time / d)) + 1.0
            }
        }
        EaseType::ExpoInOut => {
            if time == 0.0 {
                return 0.0;
            }
            if time == d {
                return 1.0;
            }
            let mut t = time / (d * 0.5);
            if t < 1.0 {
                return 0.5 * 2f32.powf(10.0 * (t - 1.0));
            }
            t -= 1.0;
            0.5 * (-(2f32.powf(-10.0 * t)) + 2.0)
        }
        EaseType::CircIn => {
            let t = time / d;
            -((1.0 - t * t).sqrt() - 1.0)
        }
        EaseType::CircOut => {
            let t = time / d - 1.0;
            (1.0 - t * t).sqrt()
        }
        EaseType::CircInOut => {
            let mut t = time / (d * 0.5);
            if t < 1.0 {
                return -0.5 * ((1.0 - t * t).sqrt() - 1.0);
            }
            t -= 2.0;
            0.5 * ((1.0 - t * t).sqrt() + 1.0)
        }
        EaseType::ElasticIn => {
            if time == 0.0 {
                return 0.0;
            }
            let mut t = time / d;
            if t == 1.0 {
                return 1.0;
            }
            let period = if period == 0.0 { d * 0.3 } else { period };
            let (amplitude, s) = elastic_shape(overshoot_or_amplitude, period);
            t -= 1.0;
            -(amplitude * 2f32.powf(10.0 * t) * ((t * d - s) * TWO_PI / period).sin())
        }
        EaseType::ElasticOut => {
            if time == 0.0 {
                return 0.0;
            }
            let t = time / d;
            if t == 1.0 {
                return 1.0;
            }
            let period = if period == 0.0 { d * 0.3 } else { period };
            let (amplitude, s) = elastic_shape(overshoot_or_amplitude, period);
            amplitude * 2f32.powf(-10.0 * t) * ((t * d - s) * TWO_PI / period).sin() + 1.0
        }
        EaseType::ElasticInOut => {
            if time == 0.0 {
                return 0.0;
            }
            let mut t = time / (d * 0.5);
            if t == 2.0 {
                return 1.0;
            }
            let period = if period == 0.0 { d * (0.3 * 1.5) } else { period };
            let (amplitude, s) = elastic_shape(overshoot_or_amplitude, period);
            if t < 1.0 {
                t -= 1.0;
                return -0.5
                    * (amplitude * 2f32.powf(10.0 * t) * ((t * d - s) * TWO_PI / period).sin());
            }
            t -= 1.0;
            amplitude * 2f32.powf(-10.0 * t) * ((t * d - s) * TWO_PI / period).sin() * 0.5 + 1.0
        }
        EaseType::BackIn => {
            let s = overshoot_or_amplitude;
            let t = time / d;
            t * t * ((s + 1.0) * t - s)
        }
        EaseType::BackOut => {
            let s = overshoot_or_amplitude;
            let t = time / d - 1.0;
            t * t * ((s + 1.0) * t + s) + 1.0
        }
        EaseType::BackInOut => {
            let s = overshoot_or_amplitude * 1.525;
            let mut t = time / (d * 0.5);
            if t < 1.0 {
                return 0.5 * (t * t * ((s + 1.0) * t - s));
            }
            t -= 2.0;
            0.5 * (t * t * ((s + 1.0) * t + s) + 2.0)
        }
        EaseType::BounceIn => bounce_in(time, d),
        EaseType::BounceOut => bounce_out(time, d),
        EaseType::BounceInOut => {
            if time < d * 0.5 {
                bounce_in(time * 2.0, d) * 0.5
            } else {
                bounce_out(time * 2.0 - d, d) * 0.5 + 0.5
            }
        }
    }
}

/// Resolve the effective Elastic amplitude and phase shift.
fn elastic_shape(amplitude: f32, period: f32) -> (f32, f32) {
    if amplitude < 1.0 {
        (1.0, period / 4.0)
    } else {
        (amplitude, period / TWO_PI * (1.0 / amplitude).asin())
    }
}

fn bounce_in(time: f32, duration: f32) -> f32 {
    1.0 - bounce_out(duration - time, duration)
}

fn bounce_out(time: f32, duration: f32) -> f32 {
    let mut t = time / duration;
    if t < 1.0 / 2.75 {
        7.5625 * t * t
    } else if t < 2.0 / 2.75 {
        t -= 1.5 / 2.75;
        7.5625 * t * t + 0.75
    } else if t < 2.5 / 2.75 {
        t -= 2.25 / 2.75;
        7.5625 * t * t + 0.9375
    } else {
        t -= 2.625 / 2.75;
        7.5625 * t * t + 0.984375
    }
}

/// A user-defined easing curve sampled from a path.
///
/// The path is expected to run left to right over `x` in `0..=1`; the
/// curve's output at time `t` is the path's `y` where its `x` equals `t`.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomEase {
    samples: Vec<[f32; 2]>,
}

impl CustomEase {
    /// Sample `path` at [`CUSTOM_EASE_SAMPLES`] points.
    pub fn new(path: &GPath) -> Self {
        Self::with_density(path, CUSTOM_EASE_SAMPLES)
    }

    /// Build the path described by `points` and sample it.
    pub fn from_points(points: &[PathPoint]) -> Self {
        Self::new(&GPath::new(points))
    }

    /// Sample `path` at `density` evenly spaced points (at least 2).
    pub fn with_density(path: &GPath, density: usize) -> Self {
        let density = density.max(2);
        let last = (density - 1) as f32;
        let samples = (0..density)
            .map(|i| {
                let p = path.point_at(i as f32 / last);
                [p[0], p[1]]
            })
            .collect();
        Self { samples }
    }

    /// Number of stored samples.
    pub fn sample_count(&self) -> usize {
        self.samples.len()
    }

    /// Curve output at normalized time `t`.
    pub fn evaluate(&self, t: f32) -> f32 {
        if t <= 0.0 {
            return 0.0;
        }
        if t >= 1.0 {
            return 1.0;
        }
        let Some(first) = self.samples.first() else {
            return t;
        };
        if t <= first[0] {
            return first[1];
        }
        let index = self.samples.partition_point(|p| p[0] < t);
        match (self.samples.get(index.wrapping_sub(1)), self.samples.get(index)) {
            (Some(a), Some(b)) => {
                let span = b[0] - a[0];
                if span <= f32::EPSILON {
                    b[1]
                } else {
                    a[1] + (b[1] - a[1]) * (t - a[0]) / span
                }
            }
            (Some(a), None) => a[1],
            _ => t,
        }
    }
}
