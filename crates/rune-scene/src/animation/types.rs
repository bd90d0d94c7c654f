//! Core tween types: identifiers, property keys, and the tweened value.

use serde::{Deserialize, Serialize};
use std::ops::{Index, IndexMut};
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TWEEN_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_TARGET_ID: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for a tween job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TweenId(pub u64);

impl TweenId {
    /// Generate a new unique tween ID.
    pub fn new() -> Self {
        Self(NEXT_TWEEN_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TweenId {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of whatever a tween animates.
///
/// The registry only compares targets for equality; it never dereferences
/// them. Gears mint one id each, hosts can mint one per scene object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TargetId(pub u64);

impl TargetId {
    /// Generate a new unique target ID.
    pub fn new() -> Self {
        Self(NEXT_TARGET_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for TargetId {
    fn default() -> Self {
        Self::new()
    }
}

/// Property key used to tell apart several tweens on one target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TweenProp {
    X,
    Y,
    Z,
    Xy,
    Position,
    Width,
    Height,
    Size,
    ScaleX,
    ScaleY,
    Scale,
    Rotation,
    RotationX,
    RotationY,
    Alpha,
    Progress,
}

/// Four float channels plus one double channel.
///
/// Channels are addressed by index: 0 = `x`, 1 = `y`, 2 = `z`, 3 = `w`.
/// Color tweens store red, green, blue, alpha in `x..w` as `0..=1` floats.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TweenValue {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub w: f32,
    pub d: f64,
}

impl TweenValue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_xy(x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::default()
        }
    }

    pub fn from_array(values: [f32; 4]) -> Self {
        Self {
            x: values[0],
            y: values[1],
            z: values[2],
            w: values[3],
            d: 0.0,
        }
    }

    /// Decode a packed `0xAARRGGBB` color into the four float channels.
    pub fn from_color(argb: u32) -> Self {
        let mut value = Self::default();
        value.set_color(argb);
        value
    }

    pub fn xy(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    /// Pack the four float channels as `0xAARRGGBB`, clamping each to `0..=1`.
    pub fn color(&self) -> u32 {
        let channel = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u32;
        (channel(self.w) << 24) | (channel(self.x) << 16) | (channel(self.y) << 8) | channel(self.z)
    }

    pub fn set_color(&mut self, argb: u32) {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
        self.x = channel(16);
        self.y = channel(8);
        self.z = channel(0);
        self.w = channel(24);
    }

    pub fn set_zero(&mut self) {
        *self = Self::default();
    }
}

impl Index<usize> for TweenValue {
    type Output = f32;

    fn index(&self, index: usize) -> &f32 {
        match index {
            0 => &self.x,
            1 => &self.y,
            2 => &self.z,
            3 => &self.w,
            _ => panic!("tween value channel {index} out of range"),
        }
    }
}

impl IndexMut<usize> for TweenValue {
    fn index_mut(&mut self, index: usize) -> &mut f32 {
        match index {
            0 => &mut self.x,
            1 => &mut self.y,
            2 => &mut self.z,
            3 => &mut self.w,
            _ => panic!("tween value channel {index} out of range"),
        }
    }
}
