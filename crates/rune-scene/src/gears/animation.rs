//! Movie-clip playback gear: playing flag, frame, time scale and delta time.

use super::base::{GearBase, PageValues};
use super::{Gear, GearKind};
use crate::scene::{GearLock, ObjectProp, PropValue};
use rune_io::ByteBuffer;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationValue {
    pub playing: bool,
    pub frame: i32,
    pub time_scale: f32,
    pub delta_time: f32,
}

impl Default for AnimationValue {
    fn default() -> Self {
        Self {
            playing: true,
            frame: 0,
            time_scale: 1.0,
            delta_time: 0.0,
        }
    }
}

#[derive(Debug)]
pub struct GearAnimation {
    base: GearBase,
    values: PageValues<AnimationValue>,
}

impl GearAnimation {
    pub fn new(base: GearBase) -> Self {
        Self {
            base,
            values: PageValues::default(),
        }
    }

    pub fn values(&self) -> &PageValues<AnimationValue> {
        &self.values
    }

    fn snapshot(&self) -> AnimationValue {
        let owner = &self.base.owner;
        let defaults = AnimationValue::default();
        AnimationValue {
            playing: owner.prop(ObjectProp::Playing).as_bool().unwrap_or(defaults.playing),
            frame: owner.prop(ObjectProp::Frame).as_int().unwrap_or(defaults.frame),
            time_scale: owner
                .prop(ObjectProp::TimeScale)
                .as_float()
                .unwrap_or(defaults.time_scale),
            delta_time: owner
                .prop(ObjectProp::DeltaTime)
                .as_float()
                .unwrap_or(defaults.delta_time),
        }
    }
}

impl Gear for GearAnimation {
    fn kind(&self) -> GearKind {
        GearKind::Animation
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

    /// Payload is `bool playing, i32 frame`; time scale and delta time keep
    /// their defaults.
    fn add_status(&mut self, page: Option<&str>, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        let value = self.values.slot_mut(page);
        value.playing = buffer.read_bool()?;
        value.frame = buffer.read_i32()?;
        Ok(())
    }

    fn apply(&mut self) {
        self.ensure_init();
        let page = self.base.selected_page();
        let value = *self.values.get(&page);
        let owner = &self.base.owner;
        let _lock = GearLock::new(&**owner);
        owner.set_prop(ObjectProp::Playing, PropValue::Bool(value.playing));
        owner.set_prop(ObjectProp::Frame, PropValue::Int(value.frame));
        // Always a float, so a zero time scale reads as a pause and not as unset.
        owner.set_prop(ObjectProp::TimeScale, PropValue::Float(value.time_scale));
        owner.set_prop(ObjectProp::DeltaTime, PropValue::Float(value.delta_time));
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
    use crate::scene::{Controller, Owner};
    use crate::test_support::{Blob, MockController, MockOwner, gear_context};
    use std::sync::Arc;

    #[test]
    fn test_page_payload_keeps_time_defaults() {
        let owner = MockOwner::new();
        let controller = MockController::new("stop");
        let mut gear = GearAnimation::new(GearBase::new(owner.clone(), gear_context()));
        let mut blob = Blob::new();
        blob.header(0, 1).s(Some("stop")).bool(false).i32(7).bool(false).bool(false);
        let (data, table) = blob.finish();
        let mut buffer = ByteBuffer::new(&data).with_string_table(table);
        let controllers: Vec<Arc<dyn Controller>> = vec![controller as Arc<dyn Controller>];
        gear.setup(&mut buffer, &controllers).unwrap();

        gear.apply();
        assert_eq!(owner.prop(ObjectProp::Playing).as_bool(), Some(false));
        assert_eq!(owner.prop(ObjectProp::Frame).as_int(), Some(7));
        assert_eq!(owner.prop(ObjectProp::TimeScale).as_float(), Some(1.0));
        assert_eq!(owner.prop(ObjectProp::DeltaTime).as_float(), Some(0.0));
    }

    #[test]
    fn test_zero_time_scale_is_written() {
        let owner = MockOwner::new();
        owner.set_prop(ObjectProp::TimeScale, PropValue::Float(0.0));
        let mut gear = GearAnimation::new(GearBase::new(owner.clone(), gear_context()));
        gear.update_state();
        assert_eq!(gear.values().default_value().time_scale, 0.0);

        owner.set_prop(ObjectProp::TimeScale, PropValue::None);
        gear.apply();
        assert_eq!(owner.prop(ObjectProp::TimeScale), PropValue::Float(0.0));
    }
}
