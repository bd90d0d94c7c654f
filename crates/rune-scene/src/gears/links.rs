//! Bindings of one owner's gears, shared between its [`GearSet`] and the
//! gears inside it.
//!
//! Gears consult the links while the set is busy applying them, so a tween
//! can take a display lock, and Size can look up its XY sibling, without
//! calling back into the set or the host. The links also own the owner's
//! visibility: Display decides whether the owner is connected, then Display2
//! combines that with its own state, and the result is pushed to the owner
//! only when it changes.
//!
//! [`GearSet`]: super::GearSet

use super::GearKind;
use super::display2::DisplayCondition;
use crate::scene::{Controller, LockToken, Owner, same_controller};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Lock counter of a Display gear.
///
/// Each `reset` starts a new token generation, so locks taken before it
/// release as no-ops.
#[derive(Debug)]
pub struct DisplayLocks {
    state: Mutex<LockCounter>,
}

#[derive(Debug)]
struct LockCounter {
    count: u32,
    generation: u32,
}

impl Default for DisplayLocks {
    fn default() -> Self {
        Self {
            state: Mutex::new(LockCounter {
                count: 0,
                generation: 1,
            }),
        }
    }
}

impl DisplayLocks {
    pub fn add(&self) -> LockToken {
        let mut state = self.state.lock();
        state.count += 1;
        LockToken(state.generation)
    }

    pub fn release(&self, token: LockToken) {
        let mut state = self.state.lock();
        if token.0 == state.generation {
            state.count = state.count.saturating_sub(1);
        } else {
            trace!(token = token.0, current = state.generation, "stale display lock ignored");
        }
    }

    /// Start a new generation with the count set to the page match.
    pub fn reset(&self, shown: bool) {
        let mut state = self.state.lock();
        state.generation = state.generation.wrapping_add(1);
        if state.generation == 0 {
            state.generation = 1;
        }
        state.count = u32::from(shown);
    }

    pub fn count(&self) -> u32 {
        self.state.lock().count
    }
}

/// What Display2 contributes to the owner's visibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Display2Link {
    pub condition: DisplayCondition,
    pub shown: bool,
}

struct LinkState {
    bound: [Option<Arc<dyn Controller>>; GearKind::COUNT],
    display2: Option<Display2Link>,
    visible: bool,
}

pub struct GearLinks {
    owner: Arc<dyn Owner>,
    display_locks: Arc<DisplayLocks>,
    state: Mutex<LinkState>,
}

impl fmt::Debug for GearLinks {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        let bound: Vec<GearKind> = GearKind::ALL
            .into_iter()
            .filter(|kind| state.bound[kind.slot()].is_some())
            .collect();
        f.debug_struct("GearLinks")
            .field("bound", &bound)
            .field("display_locks", &self.display_locks)
            .field("display2", &state.display2)
            .field("visible", &state.visible)
            .finish_non_exhaustive()
    }
}

impl GearLinks {
    pub fn new(owner: Arc<dyn Owner>) -> Self {
        Self {
            owner,
            display_locks: Arc::new(DisplayLocks::default()),
            state: Mutex::new(LinkState {
                bound: std::array::from_fn(|_| None),
                display2: None,
                visible: true,
            }),
        }
    }

    pub fn display_locks(&self) -> &Arc<DisplayLocks> {
        &self.display_locks
    }

    pub(crate) fn bind(&self, kind: GearKind, controller: Option<&Arc<dyn Controller>>) {
        self.state.lock().bound[kind.slot()] = controller.cloned();
    }

    /// Whether the gear in `kind`'s slot is bound to `controller`.
    pub fn is_bound(&self, kind: GearKind, controller: &Arc<dyn Controller>) -> bool {
        self.state.lock().bound[kind.slot()]
            .as_ref()
            .is_some_and(|c| same_controller(c, controller))
    }

    pub(crate) fn set_display2(&self, link: Option<Display2Link>) {
        self.state.lock().display2 = link;
    }

    /// Hold the owner visible for a tween driven by `controller`. `None`
    /// unless the Display gear is bound to that same controller.
    pub fn lock_for(&self, controller: &Arc<dyn Controller>) -> Option<LockToken> {
        if !self.is_bound(GearKind::Display, controller) {
            return None;
        }
        let token = self.display_locks.add();
        self.refresh();
        Some(token)
    }

    pub fn release(&self, token: LockToken) {
        self.display_locks.release(token);
        self.refresh();
    }

    /// Last visibility pushed to the owner.
    pub fn visible(&self) -> bool {
        self.state.lock().visible
    }

    /// Recompute visibility and push it to the owner if it changed.
    pub fn refresh(&self) {
        let changed = {
            let mut state = self.state.lock();
            let mut visible =
                state.bound[GearKind::Display.slot()].is_none() || self.display_locks.count() > 0;
            if let Some(link) = state.display2 {
                visible = link.condition.combine(link.shown, visible);
            }
            (visible != state.visible).then(|| {
                state.visible = visible;
                visible
            })
        };
        if let Some(visible) = changed {
            self.owner.set_visible(visible);
        }
    }
}
