//! Icon gear. Stores one resource URL per page.

use super::base::{GearBase, PageValues};
use super::{Gear, GearKind};
use crate::scene::{GearLock, ObjectProp, PropValue};
use rune_io::ByteBuffer;

#[derive(Debug)]
pub struct GearIcon {
    base: GearBase,
    values: PageValues<Option<String>>,
}

impl GearIcon {
    pub fn new(base: GearBase) -> Self {
        Self {
            base,
            values: PageValues::default(),
        }
    }

    pub fn values(&self) -> &PageValues<Option<String>> {
        &self.values
    }
}

impl Gear for GearIcon {
    fn kind(&self) -> GearKind {
        GearKind::Icon
    }

    fn base(&self) -> &GearBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GearBase {
        &mut self.base
    }

    fn ensure_init(&mut self) {
        if !self.values.is_initialized() {
            let seed = self.base.owner.prop(ObjectProp::Icon).into_string();
            self.values.ensure_init(|| seed);
        }
    }

    fn add_status(&mut self, page: Option<&str>, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        *self.values.slot_mut(page) = buffer.read_s()?;
        Ok(())
    }

    fn apply(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let icon = self.values.get(&page).clone();
        let owner = &self.base.owner;
        let _lock = GearLock::new(&**owner);
        owner.set_prop(ObjectProp::Icon, PropValue::from(icon));
    }

    fn update_state(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let icon = self.base.owner.prop(ObjectProp::Icon).into_string();
        self.values.set(&page, icon);
    }
}
