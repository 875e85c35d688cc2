// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Per-feature panel state records.
//!
//! A [`PanelState`] is the coordinator's memory for one window feature: the
//! lifecycle booleans, the lazily created [`Menu`], the host-built views, and
//! placement. Records are created on demand by the
//! [`registry`](crate::registry) and reset in place rather than discarded, so
//! view and menu caches survive a close.

use kurbo::Point;

use crate::menu::{ActionViewStates, Menu};
use crate::types::{FeatureId, Gravity, ResourceId};

/// The full state of one feature's panel.
///
/// `V` is the host's view handle type. Handles are opaque here; the
/// coordinator only stores them and hands them back to
/// [`PanelChrome`](crate::host::PanelChrome).
#[derive(Clone, Debug)]
pub struct PanelState<V> {
    /// Which feature this record belongs to.
    pub feature: FeatureId,
    /// The panel is currently showing.
    pub open: bool,
    /// The panel has been prepared and not invalidated since.
    pub prepared: bool,
    /// A key-down was consumed by this panel; the matching key-up should be
    /// treated as handled too.
    pub handled: bool,
    /// The decor container must be rebuilt before the next open.
    pub refresh_decor: bool,
    /// The menu's content is stale and must be re-prepared before showing.
    pub refresh_menu_content: bool,
    /// Shortcut mode the menu was last prepared with.
    pub qwerty_mode: bool,
    /// The menu, once a prepare has created it.
    pub menu: Option<Menu>,
    /// The decor container view the menu view is placed into.
    pub decor: Option<V>,
    /// The view currently shown inside the decor.
    pub shown: Option<V>,
    /// A host-supplied panel view, bypassing menu presentation entirely.
    pub created_view: Option<V>,
    /// Offset from the gravity anchor.
    pub position: Point,
    /// Edge/axis anchoring for the panel window.
    pub gravity: Gravity,
    /// Optional window-animation style for attach/detach.
    pub window_animations: Option<ResourceId>,
    /// Optional background resource applied to the decor.
    pub background: Option<ResourceId>,
    /// Action-view state saved across an invalidation, restored (then
    /// dropped) by the next prepare.
    pub frozen_action_view_state: Option<ActionViewStates>,
}

impl<V> PanelState<V> {
    /// A fresh, never-prepared record for `feature`.
    pub fn new(feature: FeatureId) -> Self {
        Self {
            feature,
            open: false,
            prepared: false,
            handled: false,
            refresh_decor: false,
            refresh_menu_content: false,
            qwerty_mode: true,
            menu: None,
            decor: None,
            shown: None,
            created_view: None,
            position: Point::ZERO,
            gravity: Gravity::panel_default(),
            window_animations: None,
            background: None,
            frozen_action_view_state: None,
        }
    }

    /// Whether this panel has anything to show: a host-supplied view, or a
    /// menu with at least one visible item.
    pub fn has_panel_items(&self) -> bool {
        if self.created_view.is_some() {
            return true;
        }
        self.menu.as_ref().is_some_and(Menu::has_visible_items)
    }

    /// Freeze the menu's action-view state ahead of an invalidation, so the
    /// next prepare can restore it onto the rebuilt menu.
    pub fn freeze_action_view_state(&mut self) {
        if let Some(menu) = &self.menu {
            self.frozen_action_view_state = menu.save_action_view_states();
        }
    }

    /// Restore frozen action-view state onto the current menu, consuming it.
    pub fn thaw_action_view_state(&mut self) {
        if let (Some(states), Some(menu)) =
            (self.frozen_action_view_state.take(), self.menu.as_mut())
        {
            menu.restore_action_view_states(&states);
        }
    }

    /// Drop the menu entirely. Used when menu creation is refused, so a later
    /// prepare starts from scratch.
    pub fn clear_menu(&mut self) {
        self.menu = None;
    }
}
