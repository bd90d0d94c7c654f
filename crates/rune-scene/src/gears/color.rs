//! Color and outline-color gear. Values are CSS color strings.

use super::base::{GearBase, PageValues};
use super::{Gear, GearKind};
use crate::animation::Tweener;
use crate::scene::{Controller, GearLock, ObjectProp, Owner, PropValue};
use rune_io::{ByteBuffer, format_color, parse_color};
use std::sync::Arc;
use tracing::warn;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColorValue {
    pub color: Option<String>,
    pub outline_color: Option<String>,
}

#[derive(Debug)]
pub struct GearColor {
    base: GearBase,
    values: PageValues<ColorValue>,
}

/// Outline colors are only pushed when they parse and are not transparent.
fn write_outline(owner: &dyn Owner, outline: Option<&str>) {
    if let Some(outline) = outline
        && parse_color(outline).is_some_and(|argb| argb >> 24 != 0)
    {
        owner.set_prop(ObjectProp::OutlineColor, PropValue::Str(outline.to_string()));
    }
}

impl GearColor {
    pub fn new(base: GearBase) -> Self {
        Self {
            base,
            values: PageValues::default(),
        }
    }

    pub fn values(&self) -> &PageValues<ColorValue> {
        &self.values
    }

    fn snapshot(&self) -> ColorValue {
        let owner = &self.base.owner;
        ColorValue {
            color: owner.prop(ObjectProp::Color).into_string(),
            outline_color: owner.prop(ObjectProp::OutlineColor).into_string(),
        }
    }
}

impl Gear for GearColor {
    fn kind(&self) -> GearKind {
        GearKind::Color
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
        let color = buffer.read_s()?;
        let outline_color = buffer.read_s()?;
        *self.values.slot_mut(page) = ColorValue { color, outline_color };
        Ok(())
    }

    fn set_controller(&mut self, controller: Option<Arc<dyn Controller>>) {
        self.base.rebind(GearKind::Color, controller);
        if self.base.controller.is_some() {
            self.ensure_init();
            self.update_state();
        }
    }

    fn apply(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let value = self.values.get(&page).clone();

        if self.base.tween_active() {
            {
                let owner = &self.base.owner;
                let _lock = GearLock::new(&**owner);
                write_outline(&**owner, value.outline_color.as_deref());
            }

            if let Some(target) = value.color.as_deref().and_then(parse_color) {
                if self.base.retarget(|end| end.color() == target) {
                    return;
                }
                // Read after retarget: completing the old tween moves the owner.
                let current = self.base.owner.prop(ObjectProp::Color).as_str().and_then(parse_color);
                if let Some(current) = current {
                    if current != target {
                        let owner = Arc::clone(&self.base.owner);
                        let tweener = Tweener::to_color(current, target, self.base.tween_duration());
                        self.base.start_tween(GearKind::Color, tweener, move |t| {
                            let _lock = GearLock::new(&*owner);
                            owner.set_prop(
                                ObjectProp::Color,
                                PropValue::Str(format_color(t.value().color(), true)),
                            );
                        });
                    }
                    return;
                }
            } else {
                self.base.retarget(|_| false);
            }
            warn!(
                page = %page,
                color = ?value.color,
                "color gear cannot tween an unparseable color, writing directly"
            );
        }

        let owner = &self.base.owner;
        let _lock = GearLock::new(&**owner);
        owner.set_prop(ObjectProp::Color, PropValue::from(value.color.clone()));
        write_outline(&**owner, value.outline_color.as_deref());
    }

    fn update_state(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let snapshot = self.snapshot();
        self.values.set(&page, snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{Blob, MockController, MockOwner, gear_context};

    fn setup(owner: &Arc<MockOwner>, controller: &Arc<MockController>, tween: bool) -> GearColor {
        let mut gear = GearColor::new(GearBase::new(owner.clone(), gear_context()));
        let mut blob = Blob::new();
        blob.header(0, 2);
        blob.s(Some("red")).s(Some("#ff0000")).s(Some("#00000000"));
        blob.s(Some("odd")).s(Some("chartreuse-ish")).s(Some("#112233"));
        blob.bool(false);
        if tween {
            blob.tween(0, 1.0, 0.0);
        } else {
            blob.bool(false);
        }
        let (data, table) = blob.finish();
        let mut buffer = ByteBuffer::new(&data).with_string_table(table);
        let controllers: Vec<Arc<dyn Controller>> = vec![controller.clone() as Arc<dyn Controller>];
        gear.setup(&mut buffer, &controllers).unwrap();
        gear
    }

    #[test]
    fn test_direct_apply_skips_transparent_outline() {
        let owner = MockOwner::new();
        let controller = MockController::new("red");
        let mut gear = setup(&owner, &controller, false);
        gear.apply();
        assert_eq!(owner.prop(ObjectProp::Color).as_str(), Some("#ff0000"));
        assert!(owner.prop(ObjectProp::OutlineColor).is_none());

        controller.select("odd");
        gear.apply();
        assert_eq!(owner.prop(ObjectProp::OutlineColor).as_str(), Some("#112233"));
    }

    #[test]
    fn test_tween_interpolates_channels() {
        let owner = MockOwner::new();
        owner.set_prop(ObjectProp::Color, PropValue::Str("#000000".into()));
        let controller = MockController::new("red");
        let mut gear = setup(&owner, &controller, true);
        gear.apply();
        let tweens = gear.base().context.tweens.clone();
        tweens.advance(0.5);
        assert_eq!(owner.prop(ObjectProp::Color).as_str(), Some("#800000"));
        tweens.advance(0.5);
        assert_eq!(owner.prop(ObjectProp::Color).as_str(), Some("#ff0000"));
        assert_eq!(owner.state().stopped, vec![GearKind::Color]);
    }

    #[test]
    fn test_unparseable_color_written_directly() {
        let owner = MockOwner::new();
        owner.set_prop(ObjectProp::Color, PropValue::Str("#000000".into()));
        let controller = MockController::new("odd");
        let mut gear = setup(&owner, &controller, true);
        gear.apply();
        assert_eq!(owner.prop(ObjectProp::Color).as_str(), Some("chartreuse-ish"));
        assert_eq!(gear.base().context.tweens.active_count(), 0);
    }

    #[test]
    fn test_switch_back_before_first_frame() {
        let owner = MockOwner::new();
        owner.set_prop(ObjectProp::Color, PropValue::Str("#000000".into()));
        let controller = MockController::new("red");
        let mut gear = setup(&owner, &controller, true);
        gear.apply();

        controller.select("");
        gear.apply();
        let tweens = gear.base().context.tweens.clone();
        tweens.advance(2.0);
        assert_eq!(gear.values().get("").color.as_deref(), Some("#000000"));
        assert_eq!(owner.prop(ObjectProp::Color).as_str(), Some("#000000"));
    }

    #[test]
    fn test_unparseable_color_stops_running_tween() {
        let owner = MockOwner::new();
        owner.set_prop(ObjectProp::Color, PropValue::Str("#000000".into()));
        let controller = MockController::new("red");
        let mut gear = setup(&owner, &controller, true);
        gear.apply();
        let tweens = gear.base().context.tweens.clone();
        tweens.advance(0.25);

        controller.select("odd");
        gear.apply();
        tweens.advance(0.25);
        tweens.advance(1.0);
        assert_eq!(owner.prop(ObjectProp::Color).as_str(), Some("chartreuse-ish"));
        assert_eq!(tweens.active_count(), 0);
    }

    #[test]
    fn test_set_controller_resyncs() {
        let owner = MockOwner::new();
        owner.set_prop(ObjectProp::Color, PropValue::Str("#abcdef".into()));
        let mut gear = GearColor::new(GearBase::new(owner.clone(), gear_context()));
        gear.set_controller(Some(MockController::new("p")));
        assert_eq!(gear.values().get("p").color.as_deref(), Some("#abcdef"));

        owner.set_prop(ObjectProp::Color, PropValue::Str("#010101".into()));
        gear.set_controller(gear.controller().cloned());
        assert_eq!(gear.values().get("p").color.as_deref(), Some("#010101"));
    }
}
