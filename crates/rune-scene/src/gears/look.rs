//! Alpha, rotation, grayed and touchable gear.

use super::base::{GearBase, PageValues};
use super::{Gear, GearKind};
use crate::animation::Tweener;
use crate::scene::GearLock;
use rune_io::ByteBuffer;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookValue {
    pub alpha: f32,
    pub rotation: f32,
    pub grayed: bool,
    pub touchable: bool,
}

#[derive(Debug)]
pub struct GearLook {
    base: GearBase,
    values: PageValues<LookValue>,
}

impl GearLook {
    pub fn new(base: GearBase) -> Self {
        Self {
            base,
            values: PageValues::default(),
        }
    }

    pub fn values(&self) -> &PageValues<LookValue> {
        &self.values
    }

    fn snapshot(&self) -> LookValue {
        let owner = &self.base.owner;
        LookValue {
            alpha: owner.alpha(),
            rotation: owner.rotation(),
            grayed: owner.grayed(),
            touchable: owner.touchable(),
        }
    }
}

impl Gear for GearLook {
    fn kind(&self) -> GearKind {
        GearKind::Look
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
        value.alpha = buffer.read_f32()?;
        value.rotation = buffer.read_f32()?;
        value.grayed = buffer.read_bool()?;
        value.touchable = buffer.read_bool()?;
        Ok(())
    }

    fn apply(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let value = *self.values.get(&page);

        if self.base.tween_active() {
            {
                let owner = &self.base.owner;
                let _lock = GearLock::new(&**owner);
                owner.set_grayed(value.grayed);
                owner.set_touchable(value.touchable);
            }

            if self
                .base
                .retarget(|end| end.x == value.alpha && end.y == value.rotation)
            {
                return;
            }
            let owner = Arc::clone(&self.base.owner);
            let (alpha, rotation) = (owner.alpha(), owner.rotation());
            let fade = alpha != value.alpha;
            let turn = rotation != value.rotation;
            if fade || turn {
                let tweener = Tweener::to2(
                    alpha,
                    rotation,
                    value.alpha,
                    value.rotation,
                    self.base.tween_duration(),
                );
                self.base.start_tween(GearKind::Look, tweener, move |t| {
                    let v = t.value();
                    let _lock = GearLock::new(&*owner);
                    if fade {
                        owner.set_alpha(v.x);
                    }
                    if turn {
                        owner.set_rotation(v.y);
                    }
                });
            }
        } else {
            let owner = &self.base.owner;
            let _lock = GearLock::new(&**owner);
            owner.set_alpha(value.alpha);
            owner.set_rotation(value.rotation);
            owner.set_grayed(value.grayed);
            owner.set_touchable(value.touchable);
        }
    }

    fn update_state(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let snapshot = self.snapshot();
        self.values.set(&page, snapshot);
    }
}
