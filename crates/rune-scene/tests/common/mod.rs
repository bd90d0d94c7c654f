#![allow(dead_code)]

use parking_lot::Mutex;
use rune_io::StringTable;
use rune_scene::{Controller, GearKind, ObjectProp, Owner, PropValue};
use std::collections::HashMap;
use std::sync::Arc;

/// A display object with the handful of properties gears touch.
#[derive(Debug)]
pub struct Sprite {
    inner: Mutex<SpriteState>,
}

#[derive(Debug)]
pub struct SpriteState {
    pub position: (f32, f32),
    pub size: (f32, f32),
    pub scale: (f32, f32),
    pub alpha: f32,
    pub rotation: f32,
    pub grayed: bool,
    pub touchable: bool,
    pub visible: bool,
    pub parent: Option<(f32, f32)>,
    pub props: HashMap<ObjectProp, PropValue>,
    pub gear_locked: bool,
    pub stopped: Vec<GearKind>,
    pub history: Vec<(f32, f32)>,
}

impl Sprite {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            inner: Mutex::new(SpriteState {
                position: (0.0, 0.0),
                size: (100.0, 100.0),
                scale: (1.0, 1.0),
                alpha: 1.0,
                rotation: 0.0,
                grayed: false,
                touchable: true,
                visible: true,
                parent: Some((400.0, 300.0)),
                props: HashMap::new(),
                gear_locked: false,
                stopped: Vec::new(),
                history: Vec::new(),
            }),
        })
    }

    pub fn state(&self) -> parking_lot::MutexGuard<'_, SpriteState> {
        self.inner.lock()
    }
}

impl Owner for Sprite {
    fn position(&self) -> (f32, f32) {
        self.inner.lock().position
    }

    fn set_position(&self, x: f32, y: f32) {
        let mut s = self.inner.lock();
        s.position = (x, y);
        s.history.push((x, y));
    }

    fn size(&self) -> (f32, f32) {
        self.inner.lock().size
    }

    fn set_size(&self, width: f32, height: f32, _ignore_pivot: bool) {
        self.inner.lock().size = (width, height);
    }

    fn scale(&self) -> (f32, f32) {
        self.inner.lock().scale
    }

    fn set_scale(&self, scale_x: f32, scale_y: f32) {
        self.inner.lock().scale = (scale_x, scale_y);
    }

    fn alpha(&self) -> f32 {
        self.inner.lock().alpha
    }

    fn set_alpha(&self, alpha: f32) {
        self.inner.lock().alpha = alpha;
    }

    fn rotation(&self) -> f32 {
        self.inner.lock().rotation
    }

    fn set_rotation(&self, rotation: f32) {
        self.inner.lock().rotation = rotation;
    }

    fn grayed(&self) -> bool {
        self.inner.lock().grayed
    }

    fn set_grayed(&self, grayed: bool) {
        self.inner.lock().grayed = grayed;
    }

    fn touchable(&self) -> bool {
        self.inner.lock().touchable
    }

    fn set_touchable(&self, touchable: bool) {
        self.inner.lock().touchable = touchable;
    }

    fn visible(&self) -> bool {
        self.inner.lock().visible
    }

    fn set_visible(&self, visible: bool) {
        self.inner.lock().visible = visible;
    }

    fn parent_size(&self) -> Option<(f32, f32)> {
        self.inner.lock().parent
    }

    fn prop(&self, prop: ObjectProp) -> PropValue {
        self.inner.lock().props.get(&prop).cloned().unwrap_or_default()
    }

    fn set_prop(&self, prop: ObjectProp, value: PropValue) {
        self.inner.lock().props.insert(prop, value);
    }

    fn gear_locked(&self) -> bool {
        self.inner.lock().gear_locked
    }

    fn set_gear_locked(&self, locked: bool) {
        self.inner.lock().gear_locked = locked;
    }

    fn on_gear_stop(&self, kind: GearKind) {
        self.inner.lock().stopped.push(kind);
    }
}

/// A page selector driven by the test.
#[derive(Debug)]
pub struct PageController {
    pages: Vec<String>,
    selected: Mutex<usize>,
}

impl PageController {
    pub fn new(pages: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            pages: pages.iter().map(|p| p.to_string()).collect(),
            selected: Mutex::new(0),
        })
    }

    pub fn select(&self, page: &str) {
        if let Some(index) = self.pages.iter().position(|p| p == page) {
            *self.selected.lock() = index;
        }
    }
}

impl Controller for PageController {
    fn selected_page_id(&self) -> String {
        self.pages
            .get(*self.selected.lock())
            .cloned()
            .unwrap_or_default()
    }

    fn selected_index(&self) -> i32 {
        *self.selected.lock() as i32
    }
}

/// Writes gear blobs the way the authoring tool lays them out.
#[derive(Debug, Default)]
pub struct GearBlob {
    pub data: Vec<u8>,
    strings: Vec<String>,
}

impl GearBlob {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn u8(&mut self, v: u8) -> &mut Self {
        self.data.push(v);
        self
    }

    pub fn bool(&mut self, v: bool) -> &mut Self {
        self.u8(v as u8)
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

    pub fn string(&mut self, v: &str) -> &mut Self {
        let index = match self.strings.iter().position(|s| s == v) {
            Some(i) => i,
            None => {
                self.strings.push(v.to_string());
                self.strings.len() - 1
            }
        };
        self.data.extend_from_slice(&(index as u16).to_be_bytes());
        self
    }

    pub fn table(&self) -> StringTable {
        StringTable::new(self.strings.clone())
    }
}
