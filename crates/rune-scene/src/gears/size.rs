//! Size and scale gear.

use super::base::{GearBase, PageValues};
use super::{Gear, GearKind};
use crate::animation::Tweener;
use crate::scene::GearLock;
use rune_io::ByteBuffer;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SizeValue {
    pub width: f32,
    pub height: f32,
    pub scale_x: f32,
    pub scale_y: f32,
}

#[derive(Debug)]
pub struct GearSize {
    base: GearBase,
    values: PageValues<SizeValue>,
}

impl GearSize {
    pub fn new(base: GearBase) -> Self {
        Self {
            base,
            values: PageValues::default(),
        }
    }

    pub fn values(&self) -> &PageValues<SizeValue> {
        &self.values
    }

    fn snapshot(&self) -> SizeValue {
        let (width, height) = self.base.owner.size();
        let (scale_x, scale_y) = self.base.owner.scale();
        SizeValue {
            width,
            height,
            scale_x,
            scale_y,
        }
    }

    /// Resizing keeps the pivot still unless an XY gear on the same
    /// controller is positioning the owner.
    fn ignore_pivot(&self) -> bool {
        self.base.linked_to(GearKind::Xy)
    }
}

impl Gear for GearSize {
    fn kind(&self) -> GearKind {
        GearKind::Size
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
        value.width = buffer.read_i32()? as f32;
        value.height = buffer.read_i32()? as f32;
        value.scale_x = buffer.read_f32()?;
        value.scale_y = buffer.read_f32()?;
        Ok(())
    }

    fn apply(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let value = *self.values.get(&page);
        let ignore_pivot = self.ignore_pivot();

        if self.base.tween_active() {
            let wanted = [value.width, value.height, value.scale_x, value.scale_y];
            if self
                .base
                .retarget(|end| [end.x, end.y, end.z, end.w] == wanted)
            {
                return;
            }
            let current = self.snapshot();
            let resize = current.width != value.width || current.height != value.height;
            let rescale = current.scale_x != value.scale_x || current.scale_y != value.scale_y;
            if resize || rescale {
                let owner = Arc::clone(&self.base.owner);
                let tweener = Tweener::to4(
                    [current.width, current.height, current.scale_x, current.scale_y],
                    wanted,
                    self.base.tween_duration(),
                );
                self.base.start_tween(GearKind::Size, tweener, move |t| {
                    let v = t.value();
                    let _lock = GearLock::new(&*owner);
                    if resize {
                        owner.set_size(v.x, v.y, ignore_pivot);
                    }
                    if rescale {
                        owner.set_scale(v.z, v.w);
                    }
                });
            }
        } else {
            let owner = &self.base.owner;
            let _lock = GearLock::new(&**owner);
            owner.set_size(value.width, value.height, ignore_pivot);
            owner.set_scale(value.scale_x, value.scale_y);
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
            value.width += dx;
            value.height += dy;
        }
        self.update_state();
    }
}
