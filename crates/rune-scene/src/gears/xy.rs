//! Position gear, with optional percent-of-parent storage.

use super::base::{GearBase, PageValues};
use super::{Gear, GearKind};
use crate::animation::Tweener;
use crate::scene::{Controller, GearLock};
use rune_io::ByteBuffer;
use std::sync::Arc;

/// Stored position. `px`/`py` are fractions of the parent size.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct XyValue {
    pub x: f32,
    pub y: f32,
    pub px: f32,
    pub py: f32,
}

#[derive(Debug)]
pub struct GearXY {
    base: GearBase,
    values: PageValues<XyValue>,
    /// Apply from `px`/`py` scaled by the parent size.
    pub positions_in_percent: bool,
}

fn fraction(value: f32, total: f32) -> f32 {
    if total != 0.0 { value / total } else { 0.0 }
}

impl GearXY {
    pub fn new(base: GearBase) -> Self {
        Self {
            base,
            values: PageValues::default(),
            positions_in_percent: false,
        }
    }

    pub fn values(&self) -> &PageValues<XyValue> {
        &self.values
    }

    fn snapshot(&self) -> XyValue {
        let (x, y) = self.base.owner.position();
        let (px, py) = match self.base.owner.parent_size() {
            Some((width, height)) => (fraction(x, width), fraction(y, height)),
            None => (0.0, 0.0),
        };
        XyValue { x, y, px, py }
    }

    fn add_ext_status(&mut self, page: Option<&str>, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        let value = self.values.slot_mut(page);
        value.px = buffer.read_f32()?;
        value.py = buffer.read_f32()?;
        Ok(())
    }

    /// Absolute target for `value`, honoring percent mode.
    fn resolve(&self, value: &XyValue) -> (f32, f32) {
        if self.positions_in_percent
            && let Some((width, height)) = self.base.owner.parent_size()
        {
            (value.px * width, value.py * height)
        } else {
            (value.x, value.y)
        }
    }
}

impl Gear for GearXY {
    fn kind(&self) -> GearKind {
        GearKind::Xy
    }

    fn base(&self) -> &GearBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GearBase {
        &mut self.base
    }

    fn ensure_init(&mut self) {
        if !self.values.is_initialized() {
            let seed = self.snapshot();
            self.values.ensure_init(|| seed);
        }
    }

    fn add_status(&mut self, page: Option<&str>, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        let value = self.values.slot_mut(page);
        value.x = buffer.read_i32()? as f32;
        value.y = buffer.read_i32()? as f32;
        Ok(())
    }

    fn read_extension(&mut self, count: usize, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        if !buffer.read_bool()? {
            return Ok(());
        }
        self.positions_in_percent = true;
        for _ in 0..count {
            if let Some(page) = buffer.read_s()? {
                self.add_ext_status(Some(&page), buffer)?;
            }
        }
        if buffer.read_bool()? {
            self.add_ext_status(None, buffer)?;
        }
        Ok(())
    }

    fn set_controller(&mut self, controller: Option<Arc<dyn Controller>>) {
        self.base.rebind(GearKind::Xy, controller);
        if self.base.controller.is_some() {
            self.ensure_init();
            self.update_state();
        }
    }

    fn apply(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let value = *self.values.get(&page);
        let (ex, ey) = self.resolve(&value);

        if self.base.tween_active() {
            if self.base.retarget(|end| end.x == ex && end.y == ey) {
                return;
            }
            let (ox, oy) = self.base.owner.position();
            if ox != ex || oy != ey {
                let owner = Arc::clone(&self.base.owner);
                let tweener = Tweener::to2(ox, oy, ex, ey, self.base.tween_duration());
                self.base.start_tween(GearKind::Xy, tweener, move |t| {
                    let _lock = GearLock::new(&*owner);
                    owner.set_position(t.value().x, t.value().y);
                });
            }
        } else {
            let _lock = GearLock::new(&*self.base.owner);
            self.base.owner.set_position(ex, ey);
        }
    }

    fn update_state(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let snapshot = self.snapshot();
        self.values.set(&page, snapshot);
    }

    fn update_from_relations(&mut self, dx: f32, dy: f32) {
        if self.base.controller.is_none() || !self.values.is_initialized() {
            return;
        }
        for value in self.values.values_mut() {
            value.x += dx;
            value.y += dy;
        }
        self.update_state();
    }
}
