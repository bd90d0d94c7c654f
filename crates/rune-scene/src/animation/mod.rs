//! Tween engine for the rune-scene runtime.
//!
//! This module provides:
//! - **Easing**: the 31 standard curves plus path-sampled custom curves
//! - **Paths**: straight, Bezier and spline motion paths
//! - **Tweeners**: single jobs with delay, repeat/yoyo, breakpoints and callbacks
//! - **Registry**: the per-runtime set of live jobs, queried by target
//!
//! # Architecture
//!
//! ```text
//! TweenManager
//!   └── TweenHandle (shared, lockable)
//!         └── Tweener (timing state + start/update/complete callbacks)
//!               ├── EaseType / CustomEase
//!               └── PathSampler (optional)
//! ```

pub mod easing;
pub mod manager;
pub mod path;
pub mod tweener;
pub mod types;

pub use easing::{CUSTOM_EASE_SAMPLES, CustomEase, DEFAULT_OVERSHOOT, EaseType};
pub use manager::{TweenHandle, TweenManager};
pub use path::{CurveType, GPath, PathPoint, PathSampler, Vec3};
pub use tweener::{TweenCallback, TweenState, Tweener, ValueKind};
pub use types::{TargetId, TweenId, TweenProp, TweenValue};
