//! Font size gear.

use super::base::{GearBase, PageValues};
use super::{Gear, GearKind};
use crate::scene::{Controller, GearLock, ObjectProp, PropValue};
use rune_io::ByteBuffer;
use std::sync::Arc;

#[derive(Debug)]
pub struct GearFontSize {
    base: GearBase,
    values: PageValues<i32>,
}

impl GearFontSize {
    pub fn new(base: GearBase) -> Self {
        Self {
            base,
            values: PageValues::default(),
        }
    }

    pub fn values(&self) -> &PageValues<i32> {
        &self.values
    }

    fn current(&self) -> i32 {
        self.base.owner.prop(ObjectProp::FontSize).as_int().unwrap_or(0)
    }
}

impl Gear for GearFontSize {
    fn kind(&self) -> GearKind {
        GearKind::FontSize
    }

    fn base(&self) -> &GearBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GearBase {
        &mut self.base
    }

    fn ensure_init(&mut self) {
        if !self.values.is_initialized() {
            let seed = self.current();
            self.values.ensure_init(|| seed);
        }
    }

    fn add_status(&mut self, page: Option<&str>, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        *self.values.slot_mut(page) = buffer.read_i32()?;
        Ok(())
    }

    fn set_controller(&mut self, controller: Option<Arc<dyn Controller>>) {
        self.base.rebind(GearKind::FontSize, controller);
        if self.base.controller.is_some() {
            self.ensure_init();
            self.update_state();
        }
    }

    fn apply(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let size = *self.values.get(&page);
        let owner = &self.base.owner;
        let _lock = GearLock::new(&**owner);
        owner.set_prop(ObjectProp::FontSize, PropValue::Int(size));
    }

    fn update_state(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let size = self.current();
        self.values.set(&page, size);
    }
}
