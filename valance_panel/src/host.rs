// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collaborator traits the host implements.
//!
//! The state machines in this crate never build views or talk to a windowing
//! system directly. Everything environment-shaped goes through one of these
//! traits:
//!
//! - [`WindowCallback`] — the application's hooks (create/prepare menu,
//!   item selection, panel closed, back pressed).
//! - [`PanelChrome`] — the view layer: building decor and menu views,
//!   attaching and detaching panel windows, focus.
//! - [`OverflowWidget`] — an action-bar widget capable of presenting the
//!   options menu as an overflow popup instead of a bottom panel.
//! - [`FrameScheduler`] — requests a callback at the next frame boundary so
//!   menu invalidation can be coalesced.
//!
//! Most methods have conservative defaults so simple hosts implement only
//! what they care about; the tests in this crate are written against exactly
//! these traits with recording mocks.

use crate::menu::{Menu, MenuItemId};
use crate::types::{FeatureId, KeyEvent, LayoutParams, PanelLayout, ResourceId};

/// The application-facing window callback.
///
/// Return values follow one convention: `true` means "proceed" for lifecycle
/// hooks and "consumed" for event hooks, `false` refuses or declines. A
/// refusal is never an error; the coordinator fails closed and moves on.
pub trait WindowCallback {
    /// The host's opaque view handle type.
    type View;

    /// Offered a key event the panel machinery did not consume.
    fn dispatch_key_event(&mut self, event: KeyEvent) -> bool {
        let _ = event;
        false
    }

    /// Supply a whole panel view, bypassing menu presentation. Rarely used.
    fn on_create_panel_view(&mut self, feature: FeatureId) -> Option<Self::View> {
        let _ = feature;
        None
    }

    /// Populate a freshly created menu. Returning `false` refuses the menu;
    /// the panel will have nothing to show.
    fn on_create_panel_menu(&mut self, feature: FeatureId, menu: &mut Menu) -> bool {
        let _ = (feature, menu);
        true
    }

    /// Update menu contents just before every show. Returning `false` aborts
    /// the prepare.
    fn on_prepare_panel(
        &mut self,
        feature: FeatureId,
        view: Option<&Self::View>,
        menu: &mut Menu,
    ) -> bool {
        let _ = (feature, view, menu);
        true
    }

    /// A menu became visible to the user. Returning `false` vetoes the open.
    fn on_menu_opened(&mut self, feature: FeatureId, menu: Option<&Menu>) -> bool {
        let _ = (feature, menu);
        true
    }

    /// A panel was dismissed. Fired at most once per open, and never for a
    /// panel displaced by preparing another.
    fn on_panel_closed(&mut self, feature: FeatureId, menu: Option<&Menu>) {
        let _ = (feature, menu);
    }

    /// The user picked a menu item. Return `true` if handled.
    fn on_menu_item_selected(&mut self, feature: FeatureId, item: MenuItemId) -> bool {
        let _ = (feature, item);
        false
    }

    /// The BACK key was released with no panel open. Return `true` if
    /// consumed.
    fn on_back_pressed(&mut self) -> bool {
        false
    }

    /// The window's content view changed.
    fn on_content_changed(&mut self) {}
}

/// The view layer: container management and panel windows.
///
/// View handles are opaque to this crate; `Clone + PartialEq` is required
/// only so the coordinator can store handles and compare them on teardown.
pub trait PanelChrome {
    /// The host's opaque view handle type.
    type View: Clone + PartialEq;

    /// Build the decor container a panel's content is placed into. `None`
    /// means the environment cannot host a panel right now.
    fn build_panel_decor(&mut self, feature: FeatureId) -> Option<Self::View>;

    /// Build the list view presenting `menu`. `None` means presentation
    /// failed.
    fn build_menu_view(&mut self, feature: FeatureId, menu: &Menu) -> Option<Self::View>;

    /// Number of children currently inside `parent`.
    fn child_count(&self, parent: &Self::View) -> usize;

    /// Remove every child from `parent`.
    fn remove_all_children(&mut self, parent: &Self::View);

    /// Add `child` to `parent` with the given layout request.
    fn add_child(&mut self, parent: &Self::View, child: &Self::View, params: LayoutParams);

    /// Layout params `view` carries from a previous attachment, if any.
    fn layout_params(&self, view: &Self::View) -> Option<LayoutParams> {
        let _ = view;
        None
    }

    /// Apply a background resource to `view`.
    fn set_background(&mut self, view: &Self::View, background: Option<ResourceId>) {
        let _ = (view, background);
    }

    /// Whether `view` currently holds focus.
    fn has_focus(&self, view: &Self::View) -> bool;

    /// Give `view` focus.
    fn request_focus(&mut self, view: &Self::View);

    /// Attach `decor` to the window as a sub-panel with the given placement.
    fn attach_panel(&mut self, decor: &Self::View, layout: &PanelLayout);

    /// Detach a previously attached `decor`.
    fn detach_panel(&mut self, decor: &Self::View);

    /// Play the UI feedback sound for a menu-key press. Return `false` when
    /// the environment has no sound effects; the caller logs and moves on.
    fn play_click_sound(&mut self) -> bool {
        false
    }
}

/// An action-bar widget that can present the options menu as an overflow
/// popup.
///
/// When an overflow widget is installed and able to show, menu-key handling
/// toggles the popup instead of the emulated bottom panel.
pub trait OverflowWidget {
    /// Whether the widget is currently able to present an overflow popup.
    fn can_show_overflow(&self) -> bool;

    /// Whether the popup is showing.
    fn is_overflow_showing(&self) -> bool;

    /// Whether a show has been requested but not yet performed.
    fn is_overflow_show_pending(&self) -> bool {
        false
    }

    /// Open the popup. Returns `false` if the widget could not.
    fn show_overflow(&mut self) -> bool;

    /// Close the popup. Returns `false` if it was not showing.
    fn hide_overflow(&mut self) -> bool;

    /// Install or clear the menu the widget presents.
    fn set_menu(&mut self, menu: Option<&Menu>);

    /// Told that the installed menu has been (re-)prepared.
    fn set_menu_prepared(&mut self) {}

    /// Dismiss any open popups immediately, without animation.
    fn dismiss_popups(&mut self);
}

/// Schedules a callback at the next frame boundary.
///
/// Used to coalesce menu invalidation: many invalidations in one frame cost
/// one scheduled callback and one rebuild.
pub trait FrameScheduler {
    /// Request that the caller be driven once at the next frame boundary.
    fn request_frame(&mut self);
}

/// The absent overflow widget. Never able to show; every operation is a
/// no-op.
#[derive(Copy, Clone, Debug, Default)]
pub struct NoOverflow;

impl OverflowWidget for NoOverflow {
    fn can_show_overflow(&self) -> bool {
        false
    }

    fn is_overflow_showing(&self) -> bool {
        false
    }

    fn show_overflow(&mut self) -> bool {
        false
    }

    fn hide_overflow(&mut self) -> bool {
        false
    }

    fn set_menu(&mut self, _menu: Option<&Menu>) {}

    fn dismiss_popups(&mut self) {}
}
