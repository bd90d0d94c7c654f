//! Per-owner container for the ten gear slots.

use super::{AnyGear, Gear, GearContext, GearError, GearKind, GearLinks};
use crate::scene::{Controller, ControllerResolver, LockToken, Owner, same_controller};
use rune_io::ByteBuffer;
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Gears of one owner, created on first use.
///
/// Besides routing controller changes, the set owns the [`GearLinks`] its
/// gears share, which turn the two display gears into the owner's
/// visibility.
pub struct GearSet {
    owner: Arc<dyn Owner>,
    context: GearContext,
    links: Arc<GearLinks>,
    gears: [Option<AnyGear>; GearKind::COUNT],
}

impl fmt::Debug for GearSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GearSet")
            .field("links", &self.links)
            .field("gears", &self.gears)
            .finish_non_exhaustive()
    }
}

impl GearSet {
    pub fn new(owner: Arc<dyn Owner>, mut context: GearContext) -> Self {
        let links = Arc::new(GearLinks::new(Arc::clone(&owner)));
        context.links = Some(Arc::clone(&links));
        Self {
            owner,
            context,
            links,
            gears: std::array::from_fn(|_| None),
        }
    }

    pub fn links(&self) -> &Arc<GearLinks> {
        &self.links
    }

    pub fn gear(&self, kind: GearKind) -> Option<&AnyGear> {
        self.gears[kind.slot()].as_ref()
    }

    /// The gear in `kind`'s slot, created if missing.
    pub fn gear_mut(&mut self, kind: GearKind) -> &mut AnyGear {
        let (owner, context) = (&self.owner, &self.context);
        self.gears[kind.slot()]
            .get_or_insert_with(|| AnyGear::new(kind, Arc::clone(owner), context.clone()))
    }

    /// Create (if needed) and deserialize the gear for `kind`.
    pub fn setup_gear(
        &mut self,
        kind: GearKind,
        buffer: &mut ByteBuffer<'_>,
        resolver: &dyn ControllerResolver,
    ) -> rune_io::Result<()> {
        self.gear_mut(kind).setup(buffer, resolver)
    }

    /// Load the gear stored under a raw package slot index.
    pub fn setup_slot(
        &mut self,
        slot: usize,
        buffer: &mut ByteBuffer<'_>,
        resolver: &dyn ControllerResolver,
    ) -> Result<(), GearError> {
        let kind = GearKind::from_slot(slot).ok_or(GearError::UnknownSlot(slot))?;
        self.setup_gear(kind, buffer, resolver)
            .map_err(|source| GearError::Malformed { kind, source })
    }

    /// Whether the gear in `kind`'s slot is bound to `controller`.
    pub fn check_gear_controller(&self, kind: GearKind, controller: &Arc<dyn Controller>) -> bool {
        self.gear(kind)
            .and_then(|g| g.controller())
            .is_some_and(|c| same_controller(c, controller))
    }

    /// Apply every gear bound to `controller`, then refresh visibility.
    pub fn handle_controller_changed(&mut self, controller: &Arc<dyn Controller>) {
        let mut applied = 0usize;
        for gear in self.gears.iter_mut().flatten() {
            if gear.controller().is_some_and(|c| same_controller(c, controller)) {
                gear.apply();
                applied += 1;
            }
        }
        debug!(applied, page = %controller.selected_page_id(), "controller changed");
        self.check_gear_display();
    }

    /// Snapshot the owner into the gear for `kind`. Skipped while a gear is
    /// writing the owner, so tween frames never overwrite page values.
    pub fn update_gear(&mut self, kind: GearKind) {
        if self.owner.gear_locked() {
            return;
        }
        if let Some(gear) = self.gears[kind.slot()].as_mut()
            && gear.controller().is_some()
        {
            gear.update_state();
        }
    }

    /// Forward a relations displacement to the XY and Size gears.
    pub fn update_from_relations(&mut self, dx: f32, dy: f32) {
        for kind in [GearKind::Xy, GearKind::Size] {
            if let Some(gear) = self.gears[kind.slot()].as_mut() {
                gear.update_from_relations(dx, dy);
            }
        }
    }

    /// Keep the owner visible until the token is released. `None` without a
    /// Display gear.
    pub fn add_display_lock(&mut self) -> Option<LockToken> {
        let token = self.gears[GearKind::Display.slot()]
            .as_mut()
            .and_then(AnyGear::as_display_mut)
            .map(|display| display.add_lock());
        if token.is_some() {
            self.check_gear_display();
        }
        token
    }

    pub fn release_display_lock(&mut self, token: LockToken) {
        if let Some(display) = self.gears[GearKind::Display.slot()]
            .as_mut()
            .and_then(AnyGear::as_display_mut)
        {
            display.release_lock(token);
            self.check_gear_display();
        }
    }

    /// Last visibility pushed to the owner.
    pub fn internal_visible(&self) -> bool {
        self.links.visible()
    }

    /// Recompute visibility from the display gears and push it to the owner
    /// if it changed.
    pub fn check_gear_display(&mut self) {
        self.links.refresh();
    }
}
