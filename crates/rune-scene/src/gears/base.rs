//! State shared by every gear: owner, controller, tween settings and the
//! per-page value cache.

use super::{GearContext, GearKind};
use crate::animation::{
    CurveType, CustomEase, EaseType, PathPoint, TargetId, TweenHandle, TweenValue, Tweener,
};
use crate::scene::{Controller, Owner, same_controller};
use rune_io::{BufferError, ByteBuffer};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Per-page values with a default, seeded once from the owner.
#[derive(Debug, Clone, Default)]
pub struct PageValues<V> {
    default: V,
    pages: HashMap<String, V>,
    initialized: bool,
}

impl<V: Clone + Default> PageValues<V> {
    /// Seed the default from `seed` and clear all pages, once.
    pub fn ensure_init(&mut self, seed: impl FnOnce() -> V) {
        if self.initialized {
            return;
        }
        self.default = seed();
        self.pages.clear();
        self.initialized = true;
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Value for `page`; the empty page and unknown pages read the default.
    pub fn get(&self, page: &str) -> &V {
        if page.is_empty() {
            return &self.default;
        }
        self.pages.get(page).unwrap_or(&self.default)
    }

    /// Slot for `page` (`None` is the default), created empty if missing.
    pub fn slot_mut(&mut self, page: Option<&str>) -> &mut V {
        match page {
            None => &mut self.default,
            Some(page) => self.pages.entry(page.to_string()).or_default(),
        }
    }

    /// Store `value` for `page`; the empty page writes the default.
    pub fn set(&mut self, page: &str, value: V) {
        if page.is_empty() {
            self.default = value;
        } else {
            self.pages.insert(page.to_string(), value);
        }
    }

    pub fn default_value(&self) -> &V {
        &self.default
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// The default followed by every page value.
    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> {
        std::iter::once(&mut self.default).chain(self.pages.values_mut())
    }
}

/// Tween settings of a gear.
#[derive(Debug, Clone)]
pub struct GearTweenConfig {
    pub tween: bool,
    pub ease: EaseType,
    pub duration: f32,
    pub delay: f32,
    pub custom_ease: Option<Arc<CustomEase>>,
    pub(crate) tweener: Option<TweenHandle>,
}

impl Default for GearTweenConfig {
    fn default() -> Self {
        Self {
            tween: true,
            ease: EaseType::QuadOut,
            duration: 0.3,
            delay: 0.0,
            custom_ease: None,
            tweener: None,
        }
    }
}

impl GearTweenConfig {
    /// Read `u8 ease, f32 duration, f32 delay`.
    pub fn read(buffer: &mut ByteBuffer<'_>) -> rune_io::Result<Self> {
        Ok(Self {
            ease: EaseType::from_id(buffer.read_u8()?),
            duration: buffer.read_f32()?,
            delay: buffer.read_f32()?,
            ..Self::default()
        })
    }

    /// The tween this gear currently runs, if it is still live.
    pub fn tweener(&self) -> Option<&TweenHandle> {
        self.tweener.as_ref().filter(|t| !t.is_killed())
    }
}

/// Read a path: `i32` count, then per point a curve-type byte and its
/// coordinates (position, plus one or two control points for Beziers).
pub fn read_path(buffer: &mut ByteBuffer<'_>) -> rune_io::Result<Vec<PathPoint>> {
    let position = buffer.position();
    let length = buffer.read_i32()?;
    let count = usize::try_from(length).map_err(|_| BufferError::NegativeLength { position, length })?;

    let mut points = Vec::with_capacity(count.min(buffer.remaining()));
    for _ in 0..count {
        let curve_type = CurveType::from_id(buffer.read_u8()?);
        let mut point = PathPoint {
            pos: read_vec2(buffer)?,
            curve_type,
            ..PathPoint::default()
        };
        match curve_type {
            CurveType::Bezier => {
                point.control1 = read_vec2(buffer)?;
            }
            CurveType::CubicBezier => {
                point.control1 = read_vec2(buffer)?;
                point.control2 = read_vec2(buffer)?;
            }
            CurveType::CrSpline | CurveType::Straight => {}
        }
        points.push(point);
    }
    Ok(points)
}

fn read_vec2(buffer: &mut ByteBuffer<'_>) -> rune_io::Result<[f32; 3]> {
    Ok([buffer.read_f32()?, buffer.read_f32()?, 0.0])
}

/// Owner, controller and tween plumbing common to all gears.
pub struct GearBase {
    pub(crate) owner: Arc<dyn Owner>,
    pub(crate) controller: Option<Arc<dyn Controller>>,
    pub(crate) tween_config: Option<GearTweenConfig>,
    pub(crate) context: GearContext,
    target: TargetId,
}

impl fmt::Debug for GearBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GearBase")
            .field("controller", &self.controller.as_ref().map(|c| c.selected_page_id()))
            .field("tween_config", &self.tween_config)
            .field("target", &self.target)
            .finish_non_exhaustive()
    }
}

impl GearBase {
    pub fn new(owner: Arc<dyn Owner>, context: GearContext) -> Self {
        Self {
            owner,
            controller: None,
            tween_config: None,
            context,
            target: TargetId::new(),
        }
    }

    pub fn owner(&self) -> &Arc<dyn Owner> {
        &self.owner
    }

    pub fn controller(&self) -> Option<&Arc<dyn Controller>> {
        self.controller.as_ref()
    }

    pub fn tween_config(&self) -> Option<&GearTweenConfig> {
        self.tween_config.as_ref()
    }

    pub fn tween_config_mut(&mut self) -> &mut GearTweenConfig {
        self.tween_config.get_or_insert_with(GearTweenConfig::default)
    }

    /// Registry identity of this gear's tweens.
    pub fn target(&self) -> TargetId {
        self.target
    }

    /// Selected page of the bound controller, empty when unbound.
    pub fn selected_page(&self) -> String {
        self.controller
            .as_ref()
            .map(|c| c.selected_page_id())
            .unwrap_or_default()
    }

    /// Replace the controller of the `kind` gear. Returns whether it
    /// actually changed.
    pub(crate) fn rebind(&mut self, kind: GearKind, controller: Option<Arc<dyn Controller>>) -> bool {
        let changed = match (&self.controller, &controller) {
            (Some(a), Some(b)) => !same_controller(a, b),
            (None, None) => false,
            _ => true,
        };
        self.controller = controller;
        if let Some(links) = &self.context.links {
            links.bind(kind, self.controller.as_ref());
        }
        changed
    }

    /// Whether the owner's `kind` gear shares this gear's controller.
    pub(crate) fn linked_to(&self, kind: GearKind) -> bool {
        match (&self.controller, &self.context.links) {
            (Some(controller), Some(links)) => links.is_bound(kind, controller),
            _ => false,
        }
    }

    /// Whether `apply` should animate.
    pub(crate) fn tween_active(&self) -> bool {
        self.context.tween_enabled && self.tween_config.as_ref().is_some_and(|c| c.tween)
    }

    pub(crate) fn tween_duration(&self) -> f32 {
        self.tween_config.as_ref().map_or(0.0, |c| c.duration)
    }

    /// Settle any running tween before a new apply.
    ///
    /// Returns true when the running tween already heads for the wanted
    /// value, in which case it keeps running and nothing else should happen.
    /// A tween heading elsewhere is completed immediately.
    pub(crate) fn retarget(&mut self, same_end: impl Fn(&TweenValue) -> bool) -> bool {
        let Some(config) = self.tween_config.as_mut() else {
            return false;
        };
        let Some(handle) = config.tweener.take() else {
            return false;
        };
        if handle.is_killed() {
            return false;
        }
        if same_end(&handle.end_value()) {
            config.tweener = Some(handle);
            return true;
        }
        trace!(tween = handle.id().0, "completing superseded gear tween");
        handle.kill(true);
        false
    }

    /// Register `tweener` for this gear with its configured ease and delay.
    ///
    /// When the Display gear shares this gear's controller, the owner is
    /// held visible until the tween completes. Completion also reports
    /// `on_gear_stop(kind)` to the owner.
    pub(crate) fn start_tween(
        &mut self,
        kind: GearKind,
        tweener: Tweener,
        on_update: impl FnMut(&Tweener) + Send + 'static,
    ) {
        let lock = match (&self.controller, &self.context.links) {
            (Some(controller), Some(links)) => links
                .lock_for(controller)
                .map(|token| (Arc::clone(links), token)),
            _ => None,
        };
        let owner = Arc::clone(&self.owner);
        let config = self.tween_config.get_or_insert_with(GearTweenConfig::default);
        let tweener = tweener
            .with_ease(config.ease)
            .with_custom_ease(config.custom_ease.clone())
            .with_delay(config.delay)
            .with_target(self.target, None)
            .on_update(on_update)
            .on_complete(move |_| {
                if let Some((links, token)) = &lock {
                    links.release(*token);
                }
                owner.on_gear_stop(kind);
            });
        config.tweener = Some(self.context.tweens.start(tweener));
    }
}
