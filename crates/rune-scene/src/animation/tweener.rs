//! A single tween job.
//!
//! A [`Tweener`] interpolates between a start and an end [`TweenValue`]
//! over time, applying delay, easing, repeat/yoyo, time scale, snapping and
//! an optional breakpoint. Jobs are built with the `to*` constructors and the
//! `with_*` builders, then handed to a
//! [`TweenManager`](super::manager::TweenManager) which drives them.
//!
//! # Usage
//!
//! ```
//! use rune_scene::animation::{EaseType, Tweener};
//!
//! let tween = Tweener::to2(0.0, 0.0, 10.0, 20.0, 1.0)
//!     .with_ease(EaseType::Linear)
//!     .with_delay(0.5)
//!     .on_update(|t| println!("{:?}", t.value().xy()));
//! ```

use super::easing::{self, CustomEase, EaseType, DEFAULT_OVERSHOOT};
use super::path::PathSampler;
use super::types::{TargetId, TweenId, TweenProp, TweenValue};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use tracing::error;

/// Callback invoked with the job that fired it.
pub type TweenCallback = Box<dyn FnMut(&Tweener) + Send + 'static>;

/// How many channels a job interpolates, plus the special job kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueKind {
    /// No value; the job only waits and then completes.
    DelayedCall,
    /// Interpolates the first `n` float channels (1 to 4).
    Channels(u8),
    /// Interpolates all four channels as a color.
    Color,
    /// Random displacement around the start position.
    Shake,
}

impl ValueKind {
    fn channel_count(self) -> usize {
        match self {
            Self::DelayedCall | Self::Shake => 0,
            Self::Channels(n) => usize::from(n.min(4)),
            Self::Color => 4,
        }
    }
}

/// Lifecycle of a job as seen from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenState {
    /// Registered but still inside its delay.
    Pending,
    /// Started and not yet terminal.
    Running,
    /// Reached its end (or breakpoint), or was killed with completion.
    Completed,
    /// Killed without reaching its end.
    Killed,
}

/// Why the last step ended the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Termination {
    Complete,
    Breakpoint,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CallbackSlot {
    Start,
    Update,
    Complete,
}

/// A tween job.
pub struct Tweener {
    id: TweenId,
    target: Option<TargetId>,
    prop: Option<TweenProp>,

    kind: ValueKind,
    start_value: TweenValue,
    end_value: TweenValue,
    value: TweenValue,
    delta_value: TweenValue,

    delay: f32,
    duration: f32,
    breakpoint: f32,
    ease: EaseType,
    ease_overshoot_or_amplitude: f32,
    ease_period: f32,
    custom_ease: Option<Arc<CustomEase>>,
    repeat: i32,
    yoyo: bool,
    time_scale: f32,
    snapping: bool,
    path: Option<Arc<dyn PathSampler>>,

    paused: bool,
    started: bool,
    killed: bool,
    ended: Option<Termination>,
    elapsed_time: f32,
    normalized_time: f32,
    catch_panics: bool,

    on_start: Option<TweenCallback>,
    on_update: Option<TweenCallback>,
    on_complete: Option<TweenCallback>,
}

impl Tweener {
    fn with_kind(kind: ValueKind, start: TweenValue, end: TweenValue, duration: f32) -> Self {
        Self {
            id: TweenId::new(),
            target: None,
            prop: None,
            kind,
            start_value: start,
            end_value: end,
            value: start,
            delta_value: TweenValue::default(),
            delay: 0.0,
            duration,
            breakpoint: -1.0,
            ease: EaseType::QuadOut,
            ease_overshoot_or_amplitude: DEFAULT_OVERSHOOT,
            ease_period: 0.0,
            custom_ease: None,
            repeat: 0,
            yoyo: false,
            time_scale: 1.0,
            snapping: false,
            path: None,
            paused: false,
            started: false,
            killed: false,
            ended: None,
            elapsed_time: 0.0,
            normalized_time: 0.0,
            catch_panics: true,
            on_start: None,
            on_update: None,
            on_complete: None,
        }
    }

    /// Tween a single float.
    pub fn to(start: f32, end: f32, duration: f32) -> Self {
        Self::with_kind(
            ValueKind::Channels(1),
            TweenValue { x: start, ..TweenValue::default() },
            TweenValue { x: end, ..TweenValue::default() },
            duration,
        )
    }

    /// Tween two floats, usually a position or size.
    pub fn to2(start_x: f32, start_y: f32, end_x: f32, end_y: f32, duration: f32) -> Self {
        Self::with_kind(
            ValueKind::Channels(2),
            TweenValue::from_xy(start_x, start_y),
            TweenValue::from_xy(end_x, end_y),
            duration,
        )
    }

    pub fn to3(start: [f32; 3], end: [f32; 3], duration: f32) -> Self {
        Self::with_kind(
            ValueKind::Channels(3),
            TweenValue::from_array([start[0], start[1], start[2], 0.0]),
            TweenValue::from_array([end[0], end[1], end[2], 0.0]),
            duration,
        )
    }

    pub fn to4(start: [f32; 4], end: [f32; 4], duration: f32) -> Self {
        Self::with_kind(
            ValueKind::Channels(4),
            TweenValue::from_array(start),
            TweenValue::from_array(end),
            duration,
        )
    }

    /// Tween between two packed `0xAARRGGBB` colors.
    pub fn to_color(start: u32, end: u32, duration: f32) -> Self {
        Self::with_kind(
            ValueKind::Color,
            TweenValue::from_color(start),
            TweenValue::from_color(end),
            duration,
        )
    }

    /// Tween the double-precision channel.
    pub fn to_double(start: f64, end: f64, duration: f32) -> Self {
        Self::with_kind(
            ValueKind::Channels(1),
            TweenValue { d: start, ..TweenValue::default() },
            TweenValue { d: end, ..TweenValue::default() },
            duration,
        )
    }

    /// Shake around `start` with a displacement that decays from `amplitude`.
    pub fn shake(start: [f32; 3], amplitude: f32, duration: f32) -> Self {
        let start = TweenValue::from_array([start[0], start[1], start[2], amplitude]);
        Self::with_kind(ValueKind::Shake, start, start, duration).with_ease(EaseType::Linear)
    }

    /// A job with no value that completes after `delay` seconds.
    pub fn delayed_call(delay: f32) -> Self {
        Self::with_kind(ValueKind::DelayedCall, TweenValue::default(), TweenValue::default(), 0.0)
            .with_delay(delay)
    }

    pub fn with_delay(mut self, delay: f32) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_duration(mut self, duration: f32) -> Self {
        self.duration = duration;
        self
    }

    /// Stop at `breakpoint` seconds after the delay instead of at the end.
    pub fn with_breakpoint(mut self, breakpoint: f32) -> Self {
        self.breakpoint = breakpoint;
        self
    }

    pub fn with_ease(mut self, ease: EaseType) -> Self {
        self.ease = ease;
        self
    }

    pub fn with_ease_period(mut self, period: f32) -> Self {
        self.ease_period = period;
        self
    }

    pub fn with_ease_overshoot_or_amplitude(mut self, value: f32) -> Self {
        self.ease_overshoot_or_amplitude = value;
        self
    }

    /// Curve used when the ease is [`EaseType::Custom`].
    pub fn with_custom_ease(mut self, curve: Option<Arc<CustomEase>>) -> Self {
        self.custom_ease = curve;
        self
    }

    /// Play `repeat` extra rounds (negative repeats forever).
    pub fn with_repeat(mut self, repeat: i32, yoyo: bool) -> Self {
        self.repeat = repeat;
        self.yoyo = yoyo;
        self
    }

    pub fn with_time_scale(mut self, time_scale: f32) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Round every sampled channel to the nearest integer.
    pub fn with_snapping(mut self, snapping: bool) -> Self {
        self.snapping = snapping;
        self
    }

    /// Follow `path` instead of interpolating channels.
    pub fn with_path(mut self, path: Arc<dyn PathSampler>) -> Self {
        self.path = Some(path);
        self
    }

    pub fn with_target(mut self, target: TargetId, prop: Option<TweenProp>) -> Self {
        self.target = Some(target);
        self.prop = prop;
        self
    }

    pub fn with_paused(mut self, paused: bool) -> Self {
        self.paused = paused;
        self
    }

    pub fn on_start(mut self, callback: impl FnMut(&Tweener) + Send + 'static) -> Self {
        self.on_start = Some(Box::new(callback));
        self
    }

    pub fn on_update(mut self, callback: impl FnMut(&Tweener) + Send + 'static) -> Self {
        self.on_update = Some(Box::new(callback));
        self
    }

    pub fn on_complete(mut self, callback: impl FnMut(&Tweener) + Send + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub(crate) fn set_catch_panics(&mut self, catch_panics: bool) {
        self.catch_panics = catch_panics;
    }

    pub fn id(&self) -> TweenId {
        self.id
    }

    pub fn target(&self) -> Option<TargetId> {
        self.target
    }

    pub fn prop(&self) -> Option<TweenProp> {
        self.prop
    }

    pub fn kind(&self) -> ValueKind {
        self.kind
    }

    pub fn delay(&self) -> f32 {
        self.delay
    }

    pub fn duration(&self) -> f32 {
        self.duration
    }

    pub fn breakpoint(&self) -> Option<f32> {
        (self.breakpoint >= 0.0).then_some(self.breakpoint)
    }

    pub fn ease(&self) -> EaseType {
        self.ease
    }

    pub fn repeat(&self) -> i32 {
        self.repeat
    }

    pub fn yoyo(&self) -> bool {
        self.yoyo
    }

    pub fn time_scale(&self) -> f32 {
        self.time_scale
    }

    pub fn start_value(&self) -> TweenValue {
        self.start_value
    }

    pub fn end_value(&self) -> TweenValue {
        self.end_value
    }

    /// The most recently sampled value.
    pub fn value(&self) -> TweenValue {
        self.value
    }

    /// The change between the last two samples.
    pub fn delta_value(&self) -> TweenValue {
        self.delta_value
    }

    /// Seconds accumulated, including the delay.
    pub fn elapsed_time(&self) -> f32 {
        self.elapsed_time
    }

    /// Eased progress of the last sample.
    pub fn normalized_time(&self) -> f32 {
        self.normalized_time
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_killed(&self) -> bool {
        self.killed
    }

    /// True once the job reached its end or its breakpoint.
    pub fn completed(&self) -> bool {
        self.ended.is_some()
    }

    /// True once the job reached its end (not merely its breakpoint).
    pub fn all_completed(&self) -> bool {
        self.ended == Some(Termination::Complete)
    }

    pub fn state(&self) -> TweenState {
        if self.ended.is_some() {
            TweenState::Completed
        } else if self.killed {
            TweenState::Killed
        } else if self.started {
            TweenState::Running
        } else {
            TweenState::Pending
        }
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
    }

    pub fn set_time_scale(&mut self, time_scale: f32) {
        self.time_scale = time_scale;
    }

    /// Jump to `time` seconds (delay included) and sample.
    ///
    /// Reaching the end fires the complete callback and kills the job.
    pub fn seek(&mut self, time: f32) {
        if self.killed {
            return;
        }
        self.elapsed_time = time;
        if self.elapsed_time < self.delay {
            if self.started {
                self.elapsed_time = self.delay;
            } else {
                return;
            }
        }
        self.step();
        if self.ended.is_some() && !self.killed {
            self.fire(CallbackSlot::Complete);
            self.killed = true;
        }
    }

    /// Stop the job. With `complete`, jump to the end state first and fire
    /// the complete callback.
    pub fn kill(&mut self, complete: bool) {
        if self.killed {
            return;
        }
        if complete {
            if self.ended.is_none() {
                self.elapsed_time = if self.breakpoint >= 0.0 {
                    self.delay + self.breakpoint
                } else if self.repeat >= 0 {
                    self.delay + self.duration * (self.repeat + 1) as f32
                } else {
                    self.delay + self.duration * 2.0
                };
                self.step();
                // Endless repeats never reach an end on their own.
                self.ended.get_or_insert(Termination::Complete);
            }
            self.fire(CallbackSlot::Complete);
        }
        self.killed = true;
    }

    /// Advance by `dt` seconds. The caller skips paused jobs.
    pub(crate) fn advance(&mut self, dt: f32) {
        if self.killed {
            return;
        }
        if self.ended.is_some() {
            self.fire(CallbackSlot::Complete);
            self.killed = true;
            return;
        }

        let dt = dt * self.time_scale;
        if dt == 0.0 {
            return;
        }
        self.elapsed_time += dt;
        self.step();

        if self.ended.is_some() && !self.killed {
            self.fire(CallbackSlot::Complete);
            self.killed = true;
        }
    }

    /// Sample at the current elapsed time.
    fn step(&mut self) {
        self.ended = None;

        if self.kind == ValueKind::DelayedCall {
            if self.elapsed_time >= self.delay + self.duration {
                self.ended = Some(Termination::Complete);
            }
            return;
        }

        if !self.started {
            if self.elapsed_time < self.delay {
                return;
            }
            self.started = true;
            self.fire(CallbackSlot::Start);
        }

        let mut reversed = false;
        let mut tt = self.elapsed_time - self.delay;
        if self.breakpoint >= 0.0 && tt >= self.breakpoint {
            tt = self.breakpoint;
            self.ended = Some(Termination::Breakpoint);
        }

        if self.duration <= 0.0 {
            if self.ended.is_none() {
                self.ended = Some(Termination::Complete);
            }
        } else if self.repeat != 0 {
            let round = (tt / self.duration).floor() as i32;
            tt -= self.duration * round as f32;
            if self.yoyo {
                reversed = round.rem_euclid(2) == 1;
            }
            if self.repeat > 0 && self.repeat - round < 0 {
                if self.yoyo {
                    reversed = self.repeat % 2 == 1;
                }
                tt = self.duration;
                self.ended = Some(Termination::Complete);
            }
        } else if tt >= self.duration {
            tt = self.duration;
            self.ended = Some(Termination::Complete);
        }

        let time = if reversed { self.duration - tt } else { tt };
        self.normalized_time = self.ease_at(time);

        let previous = self.value;
        if self.kind == ValueKind::Shake {
            self.sample_shake();
        } else if let Some(path) = &self.path {
            let mut pt = path.point_at(self.normalized_time);
            if self.snapping {
                pt = pt.map(f32::round);
            }
            self.value.x = pt[0];
            self.value.y = pt[1];
            self.value.z = pt[2];
        } else {
            for i in 0..self.kind.channel_count() {
                let from = self.start_value[i];
                let to = self.end_value[i];
                let mut f = from + (to - from) * self.normalized_time;
                if self.snapping {
                    f = f.round();
                }
                self.value[i] = f;
            }
            self.value.d = self.start_value.d
                + (self.end_value.d - self.start_value.d) * f64::from(self.normalized_time);
        }

        self.delta_value = TweenValue {
            x: self.value.x - previous.x,
            y: self.value.y - previous.y,
            z: self.value.z - previous.z,
            w: self.value.w - previous.w,
            d: self.value.d - previous.d,
        };

        self.fire(CallbackSlot::Update);
    }

    fn sample_shake(&mut self) {
        if self.ended.is_some() {
            self.value.x = self.start_value.x;
            self.value.y = self.start_value.y;
            self.value.z = self.start_value.z;
            return;
        }
        let radius = self.start_value.w * (1.0 - self.normalized_time);
        let mut rng = rand::thread_rng();
        let mut offset = || {
            let r = rng.gen_range(-1.0f32..=1.0) * radius;
            if r > 0.0 { r.ceil() } else { r.floor() }
        };
        self.value.x = self.start_value.x + offset();
        self.value.y = self.start_value.y + offset();
        self.value.z = self.start_value.z;
    }

    fn ease_at(&self, time: f32) -> f32 {
        if self.ease == EaseType::Custom
            && let Some(curve) = &self.custom_ease
        {
            if self.duration <= 0.0 {
                return 1.0;
            }
            return curve.evaluate(time / self.duration);
        }
        easing::evaluate(
            self.ease,
            time,
            self.duration,
            self.ease_overshoot_or_amplitude,
            self.ease_period,
        )
    }

    fn slot(&mut self, slot: CallbackSlot) -> &mut Option<TweenCallback> {
        match slot {
            CallbackSlot::Start => &mut self.on_start,
            CallbackSlot::Update => &mut self.on_update,
            CallbackSlot::Complete => &mut self.on_complete,
        }
    }

    fn fire(&mut self, slot: CallbackSlot) {
        let Some(mut callback) = self.slot(slot).take() else {
            return;
        };
        if self.catch_panics {
            let this = &*self;
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| callback(this))) {
                error!(
                    tween = self.id.0,
                    ?slot,
                    message = panic_message(payload.as_ref()),
                    "tween callback panicked"
                );
            }
        } else {
            callback(self);
        }
        *self.slot(slot) = Some(callback);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}

impl fmt::Debug for Tweener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tweener")
            .field("id", &self.id)
            .field("target", &self.target)
            .field("prop", &self.prop)
            .field("kind", &self.kind)
            .field("delay", &self.delay)
            .field("duration", &self.duration)
            .field("ease", &self.ease)
            .field("repeat", &self.repeat)
            .field("yoyo", &self.yoyo)
            .field("elapsed_time", &self.elapsed_time)
            .field("value", &self.value)
            .field("state", &self.state())
            .finish_non_exhaustive()
    }
}
