//! In-crate test doubles: a recording owner, a settable controller, and a
//! writer for gear blobs.

use crate::animation::TweenManager;
use crate::gears::{GearContext, GearKind};
use crate::scene::{Controller, ObjectProp, Owner, PropValue};
use parking_lot::{Mutex, MutexGuard};
use rune_config::AnimationConfig;
use rune_io::StringTable;
use std::collections::HashMap;
use std::sync::Arc;

/// Context with a fresh registry and tweens enabled.
pub fn gear_context() -> GearContext {
    gear_context_with(true)
}

pub fn gear_context_with(tween_enabled: bool) -> GearContext {
    GearContext {
        tweens: Arc::new(TweenManager::new(AnimationConfig::default())),
        tween_enabled,
        links: None,
    }
}

#[derive(Debug, Clone)]
pub struct OwnerState {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    pub alpha: f32,
    pub rotation: f32,
    pub grayed: bool,
    pub touchable: bool,
    pub visible: bool,
    pub parent: Option<(f32, f32)>,
    pub props: HashMap<ObjectProp, PropValue>,
    pub gear_locked: bool,
    pub unlocked_writes: usize,
    pub visible_writes: usize,
    pub last_ignore_pivot: Option<bool>,
    pub stopped: Vec<GearKind>,
}

impl Default for OwnerState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            width: 100.0,
            height: 100.0,
            scale_x: 1.0,
            scale_y: 1.0,
            alpha: 1.0,
            rotation: 0.0,
            grayed: false,
            touchable: true,
            visible: true,
            parent: None,
            props: HashMap::new(),
            gear_locked: false,
            unlocked_writes: 0,
            visible_writes: 0,
            last_ignore_pivot: None,
            stopped: Vec::new(),
        }
    }
}

#[derive(Debug, Default)]
pub struct MockOwner {
    state: Mutex<OwnerState>,
}

impl MockOwner {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_parent(width: f32, height: f32) -> Arc<Self> {
        let owner = Self::default();
        owner.state.lock().parent = Some((width, height));
        Arc::new(owner)
    }

    pub fn state(&self) -> MutexGuard<'_, OwnerState> {
        self.state.lock()
    }

    fn write(&self, f: impl FnOnce(&mut OwnerState)) {
        let mut state = self.state.lock();
        if !state.gear_locked {
            state.unlocked_writes += 1;
        }
        f(&mut state);
    }
}

impl Owner for MockOwner {
    fn position(&self) -> (f32, f32) {
        let s = self.state.lock();
        (s.x, s.y)
    }

    fn set_position(&self, x: f32, y: f32) {
        self.write(|s| {
            s.x = x;
            s.y = y;
        });
    }

    fn size(&self) -> (f32, f32) {
        let s = self.state.lock();
        (s.width, s.height)
    }

    fn set_size(&self, width: f32, height: f32, ignore_pivot: bool) {
        self.write(|s| {
            s.width = width;
            s.height = height;
            s.last_ignore_pivot = Some(ignore_pivot);
        });
    }

    fn scale(&self) -> (f32, f32) {
        let s = self.state.lock();
        (s.scale_x, s.scale_y)
    }

    fn set_scale(&self, scale_x: f32, scale_y: f32) {
        self.write(|s| {
            s.scale_x = scale_x;
            s.scale_y = scale_y;
        });
    }

    fn alpha(&self) -> f32 {
        self.state.lock().alpha
    }

    fn set_alpha(&self, alpha: f32) {
        self.write(|s| s.alpha = alpha);
    }

    fn rotation(&self) -> f32 {
        self.state.lock().rotation
    }

    fn set_rotation(&self, rotation: f32) {
        self.write(|s| s.rotation = rotation);
    }

    fn grayed(&self) -> bool {
        self.state.lock().grayed
    }

    fn set_grayed(&self, grayed: bool) {
        self.write(|s| s.grayed = grayed);
    }

    fn touchable(&self) -> bool {
        self.state.lock().touchable
    }

    fn set_touchable(&self, touchable: bool) {
        self.write(|s| s.touchable = touchable);
    }

    fn visible(&self) -> bool {
        self.state.lock().visible
    }

    fn set_visible(&self, visible: bool) {
        let mut s = self.state.lock();
        s.visible = visible;
        s.visible_writes += 1;
    }

    fn parent_size(&self) -> Option<(f32, f32)> {
        self.state.lock().parent
    }

    fn prop(&self, prop: ObjectProp) -> PropValue {
        self.state.lock().props.get(&prop).cloned().unwrap_or_default()
    }

    fn set_prop(&self, prop: ObjectProp, value: PropValue) {
        self.write(|s| {
            s.props.insert(prop, value);
        });
    }

    fn gear_locked(&self) -> bool {
        self.state.lock().gear_locked
    }

    fn set_gear_locked(&self, locked: bool) {
        self.state.lock().gear_locked = locked;
    }

    fn on_gear_stop(&self, kind: GearKind) {
        self.state.lock().stopped.push(kind);
    }
}

#[derive(Debug)]
pub struct MockController {
    page: Mutex<String>,
}

impl MockController {
    pub fn new(page: &str) -> Arc<Self> {
        Arc::new(Self {
            page: Mutex::new(page.to_string()),
        })
    }

    pub fn select(&self, page: &str) {
        *self.page.lock() = page.to_string();
    }
}

impl Controller for MockController {
    fn selected_page_id(&self) -> String {
        self.page.lock().clone()
    }

    fn selected_index(&self) -> i32 {
        0
    }
}

/// Big-endian writer producing gear blobs and their string table.
#[derive(Debug, Default)]
pub struct Blob {
    data: Vec<u8>,
    strings: Vec<String>,
}

impl Blob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.data.push(v);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(u8::from(v))
    }

    pub fn i16(&mut self, v: i16) -> &mut Self {
        self.data.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn i32(&mut self, v: i32) -> &mut Self {
        self.data.extend_from_slice(&v.to_be_bytes());
        self
    }

    pub fn f32(&mut self, v: f32) -> &mut Self {
        self.data.extend_from_slice(&v.to_be_bytes());
        self
    }

    /// Write a shared-string reference, interning `v`.
    pub fn s(&mut self, v: Option<&str>) -> &mut Self {
        let index = match v {
            None => 0xFFFF,
            Some(v) => match self.strings.iter().position(|s| s == v) {
                Some(i) => i as u16,
                None => {
                    self.strings.push(v.to_string());
                    (self.strings.len() - 1) as u16
                }
            },
        };
        self.data.extend_from_slice(&index.to_be_bytes());
        self
    }

    /// Gear header: controller index then page count.
    pub fn header(&mut self, controller: i16, pages: i16) -> &mut Self {
        self.i16(controller).i16(pages)
    }

    /// Tween block: present flag, ease id, duration, delay.
    pub fn tween(&mut self, ease: u8, duration: f32, delay: f32) -> &mut Self {
        self.bool(true).u8(ease).f32(duration).f32(delay)
    }

    pub fn finish(&self) -> (Vec<u8>, StringTable) {
        (self.data.clone(), StringTable::new(self.strings.clone()))
    }
}
