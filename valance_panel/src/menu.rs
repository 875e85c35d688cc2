// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The menu model the coordinator builds lazily and hands to host hooks.
//!
//! A [`Menu`] is a flat list of [`MenuItem`]s plus the small amount of state
//! the panel protocol needs: a qwerty-mode switch (alphabetic vs numeric
//! shortcuts), a change-dispatch freeze used while the host rebuilds content
//! mid-callback, and save/restore of per-item action-view state so expanded
//! widgets (a search field, say) survive menu invalidation.
//!
//! ## Change dispatch
//!
//! Presenters (the action-bar overflow widget) must not observe a menu in the
//! middle of a rebuild. The coordinator brackets host callbacks with
//! [`Menu::freeze_item_changes`] and [`Menu::thaw_item_changes`]; the thaw
//! reports whether any mutation happened while frozen so the caller can
//! re-push the menu to its presenter exactly once.
//!
//! ```
//! use valance_panel::menu::{Menu, MenuItem, MenuItemId};
//!
//! let mut menu = Menu::new();
//! menu.freeze_item_changes();
//! menu.add(MenuItem::new(MenuItemId(1), "Copy").with_alpha_shortcut('c'));
//! menu.add(MenuItem::new(MenuItemId(2), "Paste").with_alpha_shortcut('v'));
//! assert!(menu.thaw_item_changes()); // changes were pending
//! assert_eq!(menu.find_shortcut('c'), Some(MenuItemId(1)));
//! ```

use alloc::string::String;
use alloc::vec::Vec;

use bitflags::bitflags;
use hashbrown::HashMap;

/// Identifier of a menu item, assigned by the host.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct MenuItemId(pub u32);

bitflags! {
    /// Flags for shortcut performance.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct ShortcutFlags: u8 {
        /// Do not implicitly close the panel after a successful shortcut.
        const NO_CLOSE = 1 << 0;
    }
}

/// Saved per-item action-view state, keyed by item id.
///
/// The payload is opaque to this crate; hosts serialize whatever their view
/// layer needs. Bundles are carried as "frozen state" across menu
/// invalidation and are consumed on restore.
pub type ActionViewStates = HashMap<MenuItemId, Vec<u8>>;

/// A single menu entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MenuItem {
    /// Host-assigned identifier.
    pub id: MenuItemId,
    /// Display title.
    pub title: String,
    /// Shortcut character used in qwerty mode.
    pub alpha_shortcut: Option<char>,
    /// Shortcut character used in numeric mode.
    pub numeric_shortcut: Option<char>,
    /// Disabled items never match shortcuts.
    pub enabled: bool,
    /// Invisible items are not displayed and never match shortcuts.
    pub visible: bool,
    /// Opaque saved state of this item's expanded action view, if any.
    pub action_view_state: Option<Vec<u8>>,
}

impl MenuItem {
    /// Create a visible, enabled item with no shortcuts.
    pub fn new(id: MenuItemId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            alpha_shortcut: None,
            numeric_shortcut: None,
            enabled: true,
            visible: true,
            action_view_state: None,
        }
    }

    /// Builder-style alphabetic shortcut.
    pub fn with_alpha_shortcut(mut self, shortcut: char) -> Self {
        self.alpha_shortcut = Some(shortcut);
        self
    }

    /// Builder-style numeric shortcut.
    pub fn with_numeric_shortcut(mut self, shortcut: char) -> Self {
        self.numeric_shortcut = Some(shortcut);
        self
    }

    /// Builder-style visibility.
    pub fn with_visible(mut self, visible: bool) -> Self {
        self.visible = visible;
        self
    }

    /// Builder-style enabled state.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }
}

/// An options/panel menu: items plus dispatch and shortcut-mode state.
#[derive(Clone, Debug, Default)]
pub struct Menu {
    items: Vec<MenuItem>,
    qwerty_mode: bool,
    dispatch_frozen: bool,
    pending_changes: bool,
}

impl Menu {
    /// Create an empty menu in qwerty mode.
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            qwerty_mode: true,
            dispatch_frozen: false,
            pending_changes: false,
        }
    }

    /// Append an item.
    pub fn add(&mut self, item: MenuItem) -> &mut Self {
        self.items.push(item);
        self.mark_changed();
        self
    }

    /// Remove an item by id, returning it if present.
    pub fn remove(&mut self, id: MenuItemId) -> Option<MenuItem> {
        let idx = self.items.iter().position(|i| i.id == id)?;
        let item = self.items.remove(idx);
        self.mark_changed();
        Some(item)
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        if !self.items.is_empty() {
            self.items.clear();
            self.mark_changed();
        }
    }

    /// All items, in insertion order.
    pub fn items(&self) -> &[MenuItem] {
        &self.items
    }

    /// Look up an item by id.
    pub fn item(&self, id: MenuItemId) -> Option<&MenuItem> {
        self.items.iter().find(|i| i.id == id)
    }

    /// Mutable lookup by id.
    pub fn item_mut(&mut self, id: MenuItemId) -> Option<&mut MenuItem> {
        self.mark_changed();
        self.items.iter_mut().find(|i| i.id == id)
    }

    /// Whether the menu has no items at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Whether any item would actually be displayed.
    pub fn has_visible_items(&self) -> bool {
        self.items.iter().any(|i| i.visible)
    }

    /// Switch between alphabetic and numeric shortcut matching.
    pub fn set_qwerty_mode(&mut self, qwerty: bool) {
        self.qwerty_mode = qwerty;
    }

    /// Current shortcut-matching mode.
    pub fn qwerty_mode(&self) -> bool {
        self.qwerty_mode
    }

    /// Stop reporting item changes; mutations accumulate as pending instead.
    pub fn freeze_item_changes(&mut self) {
        self.dispatch_frozen = true;
    }

    /// Resume change reporting. Returns `true` if mutations happened while
    /// frozen; the caller is responsible for refreshing presenters once.
    pub fn thaw_item_changes(&mut self) -> bool {
        self.dispatch_frozen = false;
        core::mem::take(&mut self.pending_changes)
    }

    /// Whether change dispatch is currently frozen.
    pub fn is_dispatch_frozen(&self) -> bool {
        self.dispatch_frozen
    }

    /// Snapshot every item's action-view state. Returns `None` when no item
    /// carries any state, so callers never freeze an empty bundle.
    pub fn save_action_view_states(&self) -> Option<ActionViewStates> {
        let mut states = ActionViewStates::new();
        for item in &self.items {
            if let Some(state) = &item.action_view_state {
                states.insert(item.id, state.clone());
            }
        }
        if states.is_empty() { None } else { Some(states) }
    }

    /// Restore previously saved action-view state onto matching items.
    /// Items that no longer exist are silently skipped.
    pub fn restore_action_view_states(&mut self, states: &ActionViewStates) {
        for item in &mut self.items {
            if let Some(state) = states.get(&item.id) {
                item.action_view_state = Some(state.clone());
            }
        }
    }

    /// Find the visible, enabled item matching a shortcut character in the
    /// current qwerty/numeric mode. Matching is ASCII case-insensitive.
    pub fn find_shortcut(&self, shortcut: char) -> Option<MenuItemId> {
        self.items
            .iter()
            .filter(|i| i.visible && i.enabled)
            .find(|i| {
                let bound = if self.qwerty_mode {
                    i.alpha_shortcut
                } else {
                    i.numeric_shortcut
                };
                bound.is_some_and(|c| c.eq_ignore_ascii_case(&shortcut))
            })
            .map(|i| i.id)
    }

    fn mark_changed(&mut self) {
        if self.dispatch_frozen {
            self.pending_changes = true;
        }
    }
}
