//! Top-level owner of the animation config and the tween registry.

use crate::animation::TweenManager;
use crate::gears::{AnyGear, GearContext, GearSet, create_gear};
use crate::scene::Owner;
use rune_config::{AnimationConfig, RuneConfig};
use std::sync::Arc;
use tracing::debug;

/// One gear runtime per UI tree. Gears built from it share its registry,
/// which the host ticks once per frame with [`advance`](Self::advance).
#[derive(Debug)]
pub struct GearRuntime {
    config: AnimationConfig,
    tweens: Arc<TweenManager>,
}

impl GearRuntime {
    pub fn new(config: AnimationConfig) -> Self {
        debug!(
            tween_enabled = config.tween_enabled,
            catch_callback_panics = config.catch_callback_panics,
            "gear runtime created"
        );
        Self {
            config,
            tweens: Arc::new(TweenManager::new(config)),
        }
    }

    pub fn from_config(config: &RuneConfig) -> Self {
        Self::new(config.animation)
    }

    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    pub fn tweens(&self) -> &Arc<TweenManager> {
        &self.tweens
    }

    pub fn context(&self) -> GearContext {
        GearContext {
            tweens: Arc::clone(&self.tweens),
            tween_enabled: self.config.tween_enabled,
            links: None,
        }
    }

    pub fn create_gear(&self, slot: usize, owner: Arc<dyn Owner>) -> Option<AnyGear> {
        create_gear(slot, owner, self.context())
    }

    pub fn gear_set(&self, owner: Arc<dyn Owner>) -> GearSet {
        GearSet::new(owner, self.context())
    }

    /// Advance every running tween by `dt` seconds.
    pub fn advance(&self, dt: f32) {
        self.tweens.advance(dt);
    }
}

impl Default for GearRuntime {
    fn default() -> Self {
        Self::new(AnimationConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Tweener;
    use crate::gears::{Gear, GearKind};
    use crate::test_support::MockOwner;

    #[test]
    fn test_context_follows_config() {
        let runtime = GearRuntime::new(AnimationConfig {
            tween_enabled: false,
            catch_callback_panics: true,
        });
        let context = runtime.context();
        assert!(!context.tween_enabled);
        assert!(Arc::ptr_eq(&context.tweens, runtime.tweens()));
    }

    #[test]
    fn test_advance_drives_registry() {
        let runtime = GearRuntime::default();
        let handle = runtime.tweens().start(Tweener::to(0.0, 10.0, 1.0));
        runtime.advance(1.0);
        assert_eq!(handle.value().x, 10.0);
        assert_eq!(runtime.tweens().active_count(), 0);
    }

    #[test]
    fn test_factories() {
        let runtime = GearRuntime::from_config(&RuneConfig::default());
        let owner = MockOwner::new();
        let gear = runtime.create_gear(GearKind::Look.slot(), owner.clone()).unwrap();
        assert_eq!(gear.kind(), GearKind::Look);
        assert!(runtime.create_gear(99, owner.clone()).is_none());
        let set = runtime.gear_set(owner);
        assert!(set.gear(GearKind::Look).is_none());
    }
}
