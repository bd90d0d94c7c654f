//! Gears - per-property links between an owner and a controller page.
//!
//! A gear remembers one value of its owner per controller page and pushes
//! the stored value back onto the owner when the page changes, optionally
//! through a tween.
//!
//! # Architecture
//!
//! ```text
//! GearRuntime ──context()──► GearContext (registry + tween switch)
//!                                 │
//! GearSet (per owner)             ▼
//!   └── AnyGear ×10 ──► GearBase (owner, controller, GearTweenConfig)
//!                         └── PageValues<V> (default + page → value)
//! ```
//!
//! # Binary layout
//!
//! Every gear reads the same envelope (see [`Gear::setup`]): an `i16`
//! controller index, an `i16` page count, `count` × (shared-string page id +
//! payload), an optional default payload, an optional tween block, then
//! version-gated extensions.

pub mod animation;
pub mod base;
pub mod color;
pub mod display;
pub mod display2;
pub mod font_size;
pub mod icon;
pub mod links;
pub mod look;
pub mod set;
pub mod size;
pub mod text;
pub mod xy;

pub use animation::{AnimationValue, GearAnimation};
pub use base::{GearBase, GearTweenConfig, PageValues, read_path};
pub use color::{ColorValue, GearColor};
pub use display::GearDisplay;
pub use display2::{DisplayCondition, GearDisplay2};
pub use font_size::GearFontSize;
pub use icon::GearIcon;
pub use links::{DisplayLocks, GearLinks};
pub use look::{GearLook, LookValue};
pub use set::GearSet;
pub use size::{GearSize, SizeValue};
pub use text::GearText;
pub use xy::{GearXY, XyValue};

use crate::animation::{CustomEase, EaseType, GPath, TweenManager};
use crate::scene::{Controller, ControllerResolver, Owner};
use rune_io::ByteBuffer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

/// Failure while loading gears from a package.
#[derive(Error, Debug)]
pub enum GearError {
    #[error("unknown gear slot {0}")]
    UnknownSlot(usize),

    #[error("malformed {kind:?} gear: {source}")]
    Malformed {
        kind: GearKind,
        #[source]
        source: rune_io::BufferError,
    },
}

/// Gear variant, numbered by its slot in the authoring format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum GearKind {
    Display = 0,
    Xy = 1,
    Size = 2,
    Look = 3,
    Color = 4,
    Text = 5,
    Icon = 6,
    Animation = 7,
    Display2 = 8,
    FontSize = 9,
}

impl GearKind {
    pub const COUNT: usize = 10;

    pub const ALL: [GearKind; Self::COUNT] = [
        Self::Display,
        Self::Xy,
        Self::Size,
        Self::Look,
        Self::Color,
        Self::Text,
        Self::Icon,
        Self::Animation,
        Self::Display2,
        Self::FontSize,
    ];

    pub fn from_slot(slot: usize) -> Option<Self> {
        Self::ALL.get(slot).copied()
    }

    pub fn slot(self) -> usize {
        self as usize
    }
}

/// What a gear needs from the runtime.
#[derive(Debug, Clone)]
pub struct GearContext {
    pub tweens: Arc<TweenManager>,
    /// When false, gears write owners directly instead of tweening.
    pub tween_enabled: bool,
    /// Bindings of the owner's other gears. Set by [`GearSet`]; gears
    /// built on their own have none and never take display locks.
    pub links: Option<Arc<GearLinks>>,
}

/// Contract shared by every gear variant.
pub trait Gear {
    fn kind(&self) -> GearKind;
    fn base(&self) -> &GearBase;
    fn base_mut(&mut self) -> &mut GearBase;

    /// Seed the cached values from the owner, the first time only.
    fn ensure_init(&mut self);

    /// Read one page payload. `None` is the default payload.
    fn add_status(&mut self, page: Option<&str>, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()>;

    /// Push the value for the selected page onto the owner.
    fn apply(&mut self);

    /// Store the owner's current value under the selected page.
    fn update_state(&mut self);

    /// Shift cached geometry after relations moved or resized the owner.
    fn update_from_relations(&mut self, _dx: f32, _dy: f32) {}

    /// Bind a controller. Text, Icon, Look, Animation and Size only seed
    /// their cache, and only when the controller actually changes.
    fn set_controller(&mut self, controller: Option<Arc<dyn Controller>>) {
        let kind = self.kind();
        if self.base_mut().rebind(kind, controller) && self.base().controller.is_some() {
            self.ensure_init();
        }
    }

    fn controller(&self) -> Option<&Arc<dyn Controller>> {
        self.base().controller()
    }

    fn tween_config(&self) -> Option<&GearTweenConfig> {
        self.base().tween_config()
    }

    /// Read the page table and the default payload.
    fn read_pages(&mut self, count: usize, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        for _ in 0..count {
            match buffer.read_s()? {
                Some(page) => self.add_status(Some(&page), buffer)?,
                None => continue,
            }
        }
        if buffer.read_bool()? {
            self.add_status(None, buffer)?;
        }
        Ok(())
    }

    /// Version 2+ trailer. `count` is the page count read by `setup`.
    fn read_extension(&mut self, _count: usize, _buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        Ok(())
    }

    /// Deserialize this gear from `buffer`.
    fn setup(
        &mut self,
        buffer: &mut ByteBuffer<'_>,
        resolver: &dyn ControllerResolver,
    ) -> rune_io::Result<()> {
        let index = buffer.read_i16()?;
        let kind = self.kind();
        self.base_mut().rebind(kind, resolver.controller_at(i32::from(index)));
        self.ensure_init();

        let count = usize::try_from(buffer.read_i16()?).unwrap_or(0);
        self.read_pages(count, buffer)?;

        if buffer.read_bool()? {
            self.base_mut().tween_config = Some(GearTweenConfig::read(buffer)?);
        }

        if buffer.version >= 2 {
            self.read_extension(count, buffer)?;
        }

        if buffer.version >= 4
            && self.tween_config().is_some_and(|c| c.ease == EaseType::Custom)
        {
            let points = read_path(buffer)?;
            let curve = CustomEase::new(&GPath::new(&points));
            self.base_mut().tween_config_mut().custom_ease = Some(Arc::new(curve));
        }
        Ok(())
    }
}

/// One gear of any kind.
#[derive(Debug)]
pub enum AnyGear {
    Display(GearDisplay),
    Xy(GearXY),
    Size(GearSize),
    Look(GearLook),
    Color(GearColor),
    Text(GearText),
    Icon(GearIcon),
    Animation(GearAnimation),
    Display2(GearDisplay2),
    FontSize(GearFontSize),
}

macro_rules! dispatch {
    ($self:expr, $gear:ident => $body:expr) => {
        match $self {
            AnyGear::Display($gear) => $body,
            AnyGear::Xy($gear) => $body,
            AnyGear::Size($gear) => $body,
            AnyGear::Look($gear) => $body,
            AnyGear::Color($gear) => $body,
            AnyGear::Text($gear) => $body,
            AnyGear::Icon($gear) => $body,
            AnyGear::Animation($gear) => $body,
            AnyGear::Display2($gear) => $body,
            AnyGear::FontSize($gear) => $body,
        }
    };
}

impl AnyGear {
    pub fn new(kind: GearKind, owner: Arc<dyn Owner>, context: GearContext) -> Self {
        let base = GearBase::new(owner, context);
        match kind {
            GearKind::Display => Self::Display(GearDisplay::new(base)),
            GearKind::Xy => Self::Xy(GearXY::new(base)),
            GearKind::Size => Self::Size(GearSize::new(base)),
            GearKind::Look => Self::Look(GearLook::new(base)),
            GearKind::Color => Self::Color(GearColor::new(base)),
            GearKind::Text => Self::Text(GearText::new(base)),
            GearKind::Icon => Self::Icon(GearIcon::new(base)),
            GearKind::Animation => Self::Animation(GearAnimation::new(base)),
            GearKind::Display2 => Self::Display2(GearDisplay2::new(base)),
            GearKind::FontSize => Self::FontSize(GearFontSize::new(base)),
        }
    }

    pub fn as_display(&self) -> Option<&GearDisplay> {
        match self {
            Self::Display(gear) => Some(gear),
            _ => None,
        }
    }

    pub fn as_display_mut(&mut self) -> Option<&mut GearDisplay> {
        match self {
            Self::Display(gear) => Some(gear),
            _ => None,
        }
    }

    pub fn as_display2(&self) -> Option<&GearDisplay2> {
        match self {
            Self::Display2(gear) => Some(gear),
            _ => None,
        }
    }

    pub fn as_xy(&self) -> Option<&GearXY> {
        match self {
            Self::Xy(gear) => Some(gear),
            _ => None,
        }
    }
}

impl Gear for AnyGear {
    fn kind(&self) -> GearKind {
        dispatch!(self, g => g.kind())
    }

    fn base(&self) -> &GearBase {
        dispatch!(self, g => g.base())
    }

    fn base_mut(&mut self) -> &mut GearBase {
        dispatch!(self, g => g.base_mut())
    }

    fn ensure_init(&mut self) {
        dispatch!(self, g => g.ensure_init())
    }

    fn add_status(&mut self, page: Option<&str>, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        dispatch!(self, g => g.add_status(page, buffer))
    }

    fn apply(&mut self) {
        dispatch!(self, g => g.apply())
    }

    fn update_state(&mut self) {
        dispatch!(self, g => g.update_state())
    }

    fn update_from_relations(&mut self, dx: f32, dy: f32) {
        dispatch!(self, g => g.update_from_relations(dx, dy))
    }

    fn set_controller(&mut self, controller: Option<Arc<dyn Controller>>) {
        dispatch!(self, g => g.set_controller(controller))
    }

    fn read_pages(&mut self, count: usize, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        dispatch!(self, g => g.read_pages(count, buffer))
    }

    fn read_extension(&mut self, count: usize, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        dispatch!(self, g => g.read_extension(count, buffer))
    }

    fn setup(
        &mut self,
        buffer: &mut ByteBuffer<'_>,
        resolver: &dyn ControllerResolver,
    ) -> rune_io::Result<()> {
        dispatch!(self, g => g.setup(buffer, resolver))
    }
}

/// Build the gear stored in `slot`, or `None` for an unknown slot.
pub fn create_gear(slot: usize, owner: Arc<dyn Owner>, context: GearContext) -> Option<AnyGear> {
    match GearKind::from_slot(slot) {
        Some(kind) => Some(AnyGear::new(kind, owner, context)),
        None => {
            warn!(slot, "unknown gear slot");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::NoControllers;
    use crate::test_support::{Blob, MockController, MockOwner, gear_context as context};

    #[test]
    fn test_slots() {
        for (slot, kind) in GearKind::ALL.iter().enumerate() {
            assert_eq!(kind.slot(), slot);
            assert_eq!(GearKind::from_slot(slot), Some(*kind));
        }
        assert_eq!(GearKind::from_slot(10), None);
    }

    #[test]
    fn test_factory_builds_each_kind() {
        let owner = MockOwner::new();
        for kind in GearKind::ALL {
            let gear = create_gear(kind.slot(), owner.clone(), context()).unwrap();
            assert_eq!(gear.kind(), kind);
        }
        assert!(create_gear(42, owner, context()).is_none());
    }

    #[test]
    fn test_setup_unresolved_controller_binds_nothing() {
        let owner = MockOwner::new();
        let mut gear = AnyGear::new(GearKind::Text, owner, context());
        let mut blob = Blob::new();
        blob.header(3, 0).bool(false).bool(false);
        let (data, table) = blob.finish();
        let mut buffer = ByteBuffer::new(&data).with_string_table(table);
        let controllers: Vec<Arc<dyn Controller>> = vec![MockController::new("p") as Arc<dyn Controller>];
        gear.setup(&mut buffer, &controllers).unwrap();
        assert!(gear.controller().is_none());
        assert!(gear.tween_config().is_none());
    }

    #[test]
    fn test_setup_reads_custom_ease_at_version_4() {
        let owner = MockOwner::new();
        let mut gear = AnyGear::new(GearKind::Look, owner, context());
        let mut blob = Blob::new();
        blob.header(-1, 0).bool(false);
        blob.tween(EaseType::Custom.id(), 1.0, 0.0);
        blob.i32(2);
        blob.u8(3).f32(0.0).f32(0.0);
        blob.u8(3).f32(1.0).f32(1.0);
        let (data, table) = blob.finish();
        let mut buffer = ByteBuffer::new(&data).with_string_table(table).with_version(4);
        gear.setup(&mut buffer, &NoControllers).unwrap();
        let config = gear.tween_config().unwrap();
        assert_eq!(config.ease, EaseType::Custom);
        assert!(config.custom_ease.is_some());
        assert_eq!(buffer.remaining(), 0);
    }

    #[test]
    fn test_setup_overrun_is_error() {
        let owner = MockOwner::new();
        let mut gear = AnyGear::new(GearKind::Xy, owner, context());
        let data = [0xFF, 0xFF, 0x00, 0x01];
        let mut buffer = ByteBuffer::new(&data);
        assert!(gear.setup(&mut buffer, &NoControllers).is_err());
    }
}
