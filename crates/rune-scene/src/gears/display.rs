//! Visibility gear. It never writes the owner's visibility itself; the
//! owner's [`GearLinks`](super::GearLinks) combine its lock count with
//! Display2.

use super::base::GearBase;
use super::links::DisplayLocks;
use super::{Gear, GearKind};
use crate::scene::{Controller, LockToken};
use rune_io::ByteBuffer;
use std::sync::Arc;

#[derive(Debug)]
pub struct GearDisplay {
    base: GearBase,
    /// Pages on which the owner is shown. Empty means every page.
    pub pages: Vec<String>,
    locks: Arc<DisplayLocks>,
}

impl GearDisplay {
    pub fn new(base: GearBase) -> Self {
        let locks = base
            .context
            .links
            .as_ref()
            .map(|links| Arc::clone(links.display_locks()))
            .unwrap_or_default();
        Self {
            base,
            pages: Vec::new(),
            locks,
        }
    }

    /// Hold the owner visible while something (usually a tween) runs.
    pub fn add_lock(&mut self) -> LockToken {
        self.locks.add()
    }

    /// Release a lock from [`add_lock`](Self::add_lock). Tokens issued
    /// before the last `apply` are stale and ignored.
    pub fn release_lock(&mut self, token: LockToken) {
        self.locks.release(token);
    }

    pub fn connected(&self) -> bool {
        self.base.controller.is_none() || self.locks.count() > 0
    }
}

/// Shared by Display and Display2: the page table is a bare id array.
pub(crate) fn read_page_ids(count: usize, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<Vec<String>> {
    Ok(buffer.read_s_array(count)?.into_iter().flatten().collect())
}

pub(crate) fn shown_on(pages: &[String], page: &str) -> bool {
    pages.is_empty() || pages.iter().any(|p| p == page)
}

impl Gear for GearDisplay {
    fn kind(&self) -> GearKind {
        GearKind::Display
    }

    fn base(&self) -> &GearBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut GearBase {
        &mut self.base
    }

    fn ensure_init(&mut self) {}

    fn add_status(&mut self, _page: Option<&str>, _buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        Ok(())
    }

    fn read_pages(&mut self, count: usize, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        self.pages = read_page_ids(count, buffer)?;
        Ok(())
    }

    fn set_controller(&mut self, controller: Option<Arc<dyn Controller>>) {
        self.base.rebind(GearKind::Display, controller);
        if self.base.controller.is_some() {
            self.apply();
        }
    }

    fn apply(&mut self) {
        let page = self.base.selected_page();
        self.locks.reset(shown_on(&self.pages, &page));
    }

    fn update_state(&mut self) {}
}
