//! Scene traits - what gears need from the objects and controllers they drive.
//!
//! The runtime never owns scene objects. Hosts implement [`Owner`] for their
//! display objects and [`Controller`] for their page selectors; gears hold
//! them through `Arc<dyn ...>` and only talk to them through these traits.

use crate::gears::GearKind;
use std::sync::Arc;

/// Named scalar properties a gear may read or write on its owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectProp {
    Text,
    Icon,
    Color,
    OutlineColor,
    Playing,
    Frame,
    DeltaTime,
    TimeScale,
    FontSize,
    Selected,
}

/// Value carried by an [`ObjectProp`].
#[derive(Debug, Clone, PartialEq, Default)]
pub enum PropValue {
    #[default]
    None,
    Bool(bool),
    Int(i32),
    Float(f32),
    Str(String),
}

impl PropValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(v) => Some(*v),
            _ => None,
        }
    }

    /// Integer view; floats are truncated.
    pub fn as_int(&self) -> Option<i32> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) => Some(*v as i32),
            _ => None,
        }
    }

    /// Float view; integers are widened.
    pub fn as_float(&self) -> Option<f32> {
        match self {
            Self::Float(v) => Some(*v),
            Self::Int(v) => Some(*v as f32),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_string(self) -> Option<String> {
        match self {
            Self::Str(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl From<Option<String>> for PropValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::None, Self::Str)
    }
}

impl From<bool> for PropValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i32> for PropValue {
    fn from(value: i32) -> Self {
        Self::Int(value)
    }
}

impl From<f32> for PropValue {
    fn from(value: f32) -> Self {
        Self::Float(value)
    }
}

/// Token returned by a display lock, used to release it again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LockToken(pub u32);

/// A scene object whose properties gears drive.
///
/// All methods take `&self`; implementations use interior mutability so
/// tween callbacks can write from the thread that advances the registry.
/// Gears call these while their [`GearSet`](crate::GearSet) is applying
/// them, so implementations must not call back into that set.
pub trait Owner: Send + Sync {
    fn position(&self) -> (f32, f32);
    fn set_position(&self, x: f32, y: f32);

    fn size(&self) -> (f32, f32);
    /// `ignore_pivot` keeps the position fixed while resizing.
    fn set_size(&self, width: f32, height: f32, ignore_pivot: bool);

    fn scale(&self) -> (f32, f32);
    fn set_scale(&self, scale_x: f32, scale_y: f32);

    fn alpha(&self) -> f32;
    fn set_alpha(&self, alpha: f32);

    fn rotation(&self) -> f32;
    fn set_rotation(&self, rotation: f32);

    fn grayed(&self) -> bool;
    fn set_grayed(&self, grayed: bool);

    fn touchable(&self) -> bool;
    fn set_touchable(&self, touchable: bool);

    fn visible(&self) -> bool;
    fn set_visible(&self, visible: bool);

    /// Size of the parent container, if the owner has one.
    fn parent_size(&self) -> Option<(f32, f32)>;

    fn prop(&self, prop: ObjectProp) -> PropValue;
    fn set_prop(&self, prop: ObjectProp, value: PropValue);

    /// Set while a gear writes to the owner, so the owner's change
    /// notifications don't feed back into the gears.
    fn gear_locked(&self) -> bool;
    fn set_gear_locked(&self, locked: bool);

    /// A gear-driven tween on this owner finished.
    fn on_gear_stop(&self, _kind: GearKind) {}
}

/// Selects one page out of a set. Gears key their stored values by page id.
pub trait Controller: Send + Sync {
    /// Id of the selected page; empty when nothing is selected.
    fn selected_page_id(&self) -> String;

    fn selected_index(&self) -> i32;
}

/// Turns a stored controller index into a controller.
pub trait ControllerResolver {
    /// `None` for negative or unknown indices.
    fn controller_at(&self, index: i32) -> Option<Arc<dyn Controller>>;
}

impl ControllerResolver for Vec<Arc<dyn Controller>> {
    fn controller_at(&self, index: i32) -> Option<Arc<dyn Controller>> {
        usize::try_from(index)
            .ok()
            .and_then(|index| self.get(index))
            .cloned()
    }
}

/// Resolver for owners without controllers.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoControllers;

impl ControllerResolver for NoControllers {
    fn controller_at(&self, _index: i32) -> Option<Arc<dyn Controller>> {
        None
    }
}

/// Whether two controller references are the same object.
pub fn same_controller(a: &Arc<dyn Controller>, b: &Arc<dyn Controller>) -> bool {
    std::ptr::addr_eq(Arc::as_ptr(a), Arc::as_ptr(b))
}

/// Holds the owner's gear lock for its lifetime.
pub struct GearLock<'a> {
    owner: &'a dyn Owner,
}

impl<'a> GearLock<'a> {
    pub fn new(owner: &'a dyn Owner) -> Self {
        owner.set_gear_locked(true);
        Self { owner }
    }
}

impl Drop for GearLock<'_> {
    fn drop(&mut self) {
        self.owner.set_gear_locked(false);
    }
}
