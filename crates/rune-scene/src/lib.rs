//! Gears and tweens for controller-driven UI state.
//!
//! A [`GearRuntime`] owns the animation settings and the tween registry.
//! Gears bind one property of an [`Owner`] to the selected page of a
//! [`Controller`] and replay the stored value, animated or not, whenever
//! the page changes.

pub mod animation;
pub mod gears;
pub mod runtime;
pub mod scene;

#[cfg(test)]
mod test_support;

pub use animation::{EaseType, TweenHandle, TweenManager, Tweener};
pub use gears::{AnyGear, Gear, GearContext, GearError, GearKind, GearLinks, GearSet, create_gear};
pub use runtime::GearRuntime;
pub use scene::{Controller, ControllerResolver, LockToken, ObjectProp, Owner, PropValue};
