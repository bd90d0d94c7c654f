//! Second visibility gear, combined with the first through AND or OR.

use super::base::GearBase;
use super::display::{read_page_ids, shown_on};
use super::links::Display2Link;
use super::{Gear, GearKind};
use crate::scene::Controller;
use rune_io::ByteBuffer;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DisplayCondition {
    #[default]
    And,
    Or,
}

impl DisplayCondition {
    pub fn from_id(id: u8) -> Self {
        if id == 1 { Self::Or } else { Self::And }
    }

    pub fn combine(self, own: bool, upstream: bool) -> bool {
        match self {
            Self::And => own && upstream,
            Self::Or => own || upstream,
        }
    }
}

#[derive(Debug)]
pub struct GearDisplay2 {
    base: GearBase,
    pub pages: Vec<String>,
    pub condition: DisplayCondition,
    visible: bool,
}

impl GearDisplay2 {
    pub fn new(base: GearBase) -> Self {
        let gear = Self {
            base,
            pages: Vec::new(),
            condition: DisplayCondition::And,
            visible: false,
        };
        gear.publish();
        gear
    }

    fn shown(&self) -> bool {
        self.base.controller.is_none() || self.visible
    }

    /// Combine this gear's state with the upstream `connected` signal.
    pub fn evaluate(&self, connected: bool) -> bool {
        self.condition.combine(self.shown(), connected)
    }

    fn publish(&self) {
        if let Some(links) = &self.base.context.links {
            links.set_display2(Some(Display2Link {
                condition: self.condition,
                shown: self.shown(),
            }));
        }
    }
}

impl Gear for GearDisplay2 {
    fn kind(&self) -> GearKind {
        GearKind::Display2
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
        self.publish();
        Ok(())
    }

    fn read_extension(&mut self, _count: usize, buffer: &mut ByteBuffer<'_>) -> rune_io::Result<()> {
        self.condition = DisplayCondition::from_id(buffer.read_u8()?);
        self.publish();
        Ok(())
    }

    fn set_controller(&mut self, controller: Option<Arc<dyn Controller>>) {
        self.base.rebind(GearKind::Display2, controller);
        if self.base.controller.is_some() {
            self.apply();
        } else {
            self.publish();
        }
    }

    fn apply(&mut self) {
        let page = self.base.selected_page();
        self.visible = shown_on(&self.pages, &page);
        self.publish();
    }

    fn update_state(&mut self) {}
}
