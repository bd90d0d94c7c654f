//! Text gear.

use super::base::{GearBase, PageValues};
use super::{Gear, GearKind};
use crate::scene::{GearLock, ObjectProp, PropValue};
use rune_io::ByteBuffer;

#[derive(Debug)]
pub struct GearText {
    base: GearBase,
    values: PageValues<Option<String>>,
}

impl GearText {
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

impl Gear for GearText {
    fn kind(&self) -> GearKind {
        GearKind::Text
    }

    fn base(&self) -> &GearBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GearBase {
        &mut self.base
    }

    fn ensure_init(&mut self) {
        if !self.values.is_initialized() {
            let seed = self.base.owner.prop(ObjectProp::Text).into_string();
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
        let text = self.values.get(&page).clone();
        let owner = &self.base.owner;
        let _lock = GearLock::new(&**owner);
        owner.set_prop(ObjectProp::Text, PropValue::from(text));
    }

    fn update_state(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let text = self.base.owner.prop(ObjectProp::Text).into_string();
        self.values.set(&page, text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{Controller, Owner};
    use crate::test_support::{Blob, MockController, MockOwner, gear_context};
    use std::sync::Arc;

    #[test]
    fn test_pages_and_default() {
        let owner = MockOwner::new();
        let controller = MockController::new("hello");
        let mut gear = GearText::new(GearBase::new(owner.clone(), gear_context()));
        let mut blob = Blob::new();
        blob.header(0, 2);
        blob.s(Some("hello")).s(Some("Hello!"));
        blob.s(Some("blank")).s(None);
        blob.bool(true).s(Some("fallback"));
        blob.bool(false);
        let (data, table) = blob.finish();
        let mut buffer = ByteBuffer::new(&data).with_string_table(table);
        let controllers: Vec<Arc<dyn Controller>> = vec![controller.clone() as Arc<dyn Controller>];
        gear.setup(&mut buffer, &controllers).unwrap();

        gear.apply();
        assert_eq!(owner.prop(ObjectProp::Text).as_str(), Some("Hello!"));

        controller.select("blank");
        gear.apply();
        assert!(owner.prop(ObjectProp::Text).is_none());

        controller.select("other");
        gear.apply();
        assert_eq!(owner.prop(ObjectProp::Text).as_str(), Some("fallback"));
        assert_eq!(owner.state().unlocked_writes, 0);
    }

    #[test]
    fn test_lazy_rebind_keeps_cache() {
        let owner = MockOwner::new();
        owner.set_prop(ObjectProp::Text, PropValue::Str("first".into()));
        let mut gear = GearText::new(GearBase::new(owner.clone(), gear_context()));
        let controller: Arc<dyn Controller> = MockController::new("p");
        gear.set_controller(Some(controller.clone()));
        owner.set_prop(ObjectProp::Text, PropValue::Str("second".into()));
        gear.set_controller(Some(controller));
        assert_eq!(gear.values().get("p").as_deref(), Some("first"));

        gear.update_state();
        assert_eq!(gear.values().get("p").as_deref(), Some("second"));
        assert_eq!(gear.values().default_value().as_deref(), Some("first"));
    }
}
