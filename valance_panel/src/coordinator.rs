// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The panel lifecycle state machine.
//!
//! [`MenuLifecycleCoordinator`] owns the order-sensitive bookkeeping of the
//! panel protocol: a panel must be prepared before it opens, preparing one
//! panel displaces any other prepared panel, closing forces a decor rebuild
//! on the next open, and menu invalidation is deferred to the next frame and
//! coalesced. Collaborators are passed into each operation rather than
//! stored, so a host can keep them wherever its ownership story wants them.
//!
//! The coordinator is written against an opaque view handle type `V` and an
//! optional [`OverflowWidget`] `W`. When an overflow widget is installed and
//! able to show, the options menu is presented through it instead of the
//! emulated bottom panel, and closing the options panel routes through the
//! popup-dismissal path.

use core::fmt;

use crate::host::{FrameScheduler, NoOverflow, OverflowWidget, PanelChrome, WindowCallback};
use crate::menu::{Menu, ShortcutFlags};
use crate::registry::PanelRegistry;
use crate::state::PanelState;
use crate::types::{
    Dimension, FeatureId, KeyCode, KeyEvent, PanelLayout, RequestedFeatures, WindowConfig,
};

/// The panel / options-menu lifecycle state machine.
///
/// One coordinator per window. All operations are synchronous and run on the
/// thread that owns the window; deferred work goes through a
/// [`FrameScheduler`].
pub struct MenuLifecycleCoordinator<V, W = NoOverflow> {
    panels: PanelRegistry<V>,
    overflow: Option<W>,
    config: WindowConfig,
    /// The at-most-one panel that is currently prepared.
    prepared_panel: Option<FeatureId>,
    pending_invalidation: RequestedFeatures,
    invalidation_scheduled: bool,
    /// Re-entrancy guard for the popup-dismissal close path.
    closing_action_menu: bool,
    requested_features: RequestedFeatures,
    features_locked: bool,
    destroyed: bool,
}

impl<V, W> fmt::Debug for MenuLifecycleCoordinator<V, W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MenuLifecycleCoordinator")
            .field("prepared_panel", &self.prepared_panel)
            .field("pending_invalidation", &self.pending_invalidation)
            .field("requested_features", &self.requested_features)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

impl<V: Clone + PartialEq> MenuLifecycleCoordinator<V, NoOverflow> {
    /// A coordinator without an overflow widget; the options menu is always
    /// presented as an emulated bottom panel.
    pub fn new(config: WindowConfig) -> Self {
        Self::build(config, None)
    }
}

impl<V: Clone + PartialEq, W: OverflowWidget> MenuLifecycleCoordinator<V, W> {
    /// A coordinator whose options menu may be presented through `overflow`
    /// when the widget reports it can show.
    pub fn with_overflow(config: WindowConfig, overflow: W) -> Self {
        Self::build(config, Some(overflow))
    }

    fn build(config: WindowConfig, overflow: Option<W>) -> Self {
        Self {
            panels: PanelRegistry::new(),
            overflow,
            config,
            prepared_panel: None,
            pending_invalidation: RequestedFeatures::empty(),
            invalidation_scheduled: false,
            closing_action_menu: false,
            requested_features: RequestedFeatures::empty(),
            features_locked: false,
            destroyed: false,
        }
    }

    /// Prepare `feature`'s panel: build the menu if needed, run the host's
    /// create/prepare hooks, and record it as the currently prepared panel.
    ///
    /// Returns `false` when the delegate is destroyed or the host refused
    /// either hook; refused panels are left unprepared with nothing to show.
    /// Re-preparing an already-prepared panel is a cheap `true` that invokes
    /// no host hook.
    pub fn prepare_panel(
        &mut self,
        feature: FeatureId,
        key: Option<&KeyEvent>,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) -> bool {
        if self.destroyed {
            return false;
        }
        if self.panels.get(feature).is_some_and(|st| st.prepared) {
            return true;
        }
        // Another panel is prepared and possibly open; close it first. The
        // displaced panel's close callback is deliberately not fired.
        if let Some(prev) = self.prepared_panel
            && prev != feature
        {
            self.close_panel_state(prev, false, host, chrome);
        }
        if let Some(overflow) = self.overflow.as_mut() {
            overflow.set_menu_prepared();
        }

        let toolbar_hosted = self.config.toolbar_hosted_action_bar;
        let st = self.panels.get_or_create(feature);

        // A toolbar-hosted action bar owns the options menu outright; even a
        // host-supplied panel view is ignored to avoid duplicate menus.
        if st.created_view.is_none() && !toolbar_hosted {
            st.created_view = host.on_create_panel_view(feature);
        }

        if st.created_view.is_none() && !toolbar_hosted {
            if st.menu.is_none() || st.refresh_menu_content {
                let fresh = st.menu.is_none();
                let menu = st.menu.get_or_insert_with(Menu::new);
                if fresh && let Some(overflow) = self.overflow.as_mut() {
                    overflow.set_menu(Some(&*menu));
                }

                menu.freeze_item_changes();
                if !host.on_create_panel_menu(feature, menu) {
                    st.clear_menu();
                    if let Some(overflow) = self.overflow.as_mut() {
                        overflow.set_menu(None);
                    }
                    return false;
                }
                st.refresh_menu_content = false;
            }

            // Restore saved action-view state before the host sees the menu.
            st.thaw_action_view_state();
            let Some(menu) = st.menu.as_mut() else {
                return false;
            };
            menu.freeze_item_changes();

            if !host.on_prepare_panel(feature, None, menu) {
                if let Some(overflow) = self.overflow.as_mut() {
                    overflow.set_menu(None);
                }
                menu.thaw_item_changes();
                return false;
            }

            st.qwerty_mode = key.is_none_or(|k| k.keymap.is_qwerty());
            menu.set_qwerty_mode(st.qwerty_mode);
            if menu.thaw_item_changes()
                && let Some(overflow) = self.overflow.as_mut()
            {
                overflow.set_menu(Some(&*menu));
            }
        }

        st.prepared = true;
        st.handled = false;
        self.prepared_panel = Some(feature);
        true
    }

    /// Open `feature`'s panel: run the host's open hook, (re)build the decor
    /// and menu content if stale, and attach the decor to the window.
    ///
    /// A no-op when the panel is already open, the delegate is destroyed, or
    /// the legacy extra-large-screen suppression applies. Every failure path
    /// leaves the panel unopened.
    pub fn open_panel(
        &mut self,
        feature: FeatureId,
        key: Option<&KeyEvent>,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) {
        if self.destroyed {
            return;
        }
        if self.panels.get(feature).is_some_and(|st| st.open) {
            return;
        }
        if feature == FeatureId::OptionsPanel && self.config.suppresses_legacy_options_panel() {
            return;
        }

        let accepted = {
            let menu = self.panels.get(feature).and_then(|st| st.menu.as_ref());
            host.on_menu_opened(feature, menu)
        };
        if !accepted {
            // The host doesn't want the menu shown; reset any state.
            self.close_panel_state(feature, true, host, chrome);
            return;
        }

        if !self.prepare_panel(feature, key, host, chrome) {
            return;
        }

        let st = self.panels.get_or_create(feature);
        let mut width = Dimension::WrapContent;

        if st.decor.is_none() || st.refresh_decor {
            if st.decor.is_none() {
                let Some(decor) = chrome.build_panel_decor(feature) else {
                    return;
                };
                st.decor = Some(decor);
            } else if st.refresh_decor
                && let Some(decor) = &st.decor
                && chrome.child_count(decor) > 0
            {
                chrome.remove_all_children(decor);
            }

            st.shown = if let Some(view) = &st.created_view {
                Some(view.clone())
            } else if let Some(menu) = &st.menu {
                chrome.build_menu_view(feature, menu)
            } else {
                None
            };
            if st.shown.is_none() || !st.has_panel_items() {
                return;
            }

            let (Some(decor), Some(shown)) = (&st.decor, &st.shown) else {
                return;
            };
            let params = chrome.layout_params(shown).unwrap_or_default();
            chrome.set_background(decor, st.background);
            chrome.add_child(decor, shown, params);
            if !chrome.has_focus(shown) {
                chrome.request_focus(shown);
            }
            st.refresh_decor = false;
        } else if let Some(created) = &st.created_view {
            // Reusing a host-supplied panel view; carry its full-width
            // request through to the panel window.
            if let Some(params) = chrome.layout_params(created)
                && params.width == Dimension::MatchParent
            {
                width = Dimension::MatchParent;
            }
        }

        st.handled = false;

        let layout = PanelLayout {
            width,
            height: Dimension::WrapContent,
            position: st.position,
            gravity: st.gravity,
            window_animations: st.window_animations,
            translucent: true,
            ime_focusable: false,
        };
        let Some(decor) = &st.decor else {
            return;
        };
        chrome.attach_panel(decor, &layout);
        st.open = true;
    }

    /// Close `feature`'s panel.
    ///
    /// With `do_callback`, an options panel whose menu is showing as an
    /// overflow popup is closed through the popup-dismissal path instead,
    /// which reports the close against the action-bar feature. Otherwise the
    /// decor is detached if open, `on_panel_closed` fires once if requested,
    /// and the panel is reset so its next open rebuilds the decor.
    pub fn close_panel(
        &mut self,
        feature: FeatureId,
        do_callback: bool,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) {
        if do_callback
            && feature == FeatureId::OptionsPanel
            && self.overflow.as_ref().is_some_and(W::is_overflow_showing)
        {
            self.check_close_action_menu(host);
            return;
        }
        self.close_panel_state(feature, do_callback, host, chrome);
    }

    fn close_panel_state(
        &mut self,
        feature: FeatureId,
        do_callback: bool,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) {
        let destroyed = self.destroyed;
        let st = self.panels.get_or_create(feature);
        if st.open {
            if let Some(decor) = &st.decor {
                chrome.detach_panel(decor);
            }
            if do_callback && !destroyed {
                host.on_panel_closed(feature, st.menu.as_ref());
            }
        }
        st.prepared = false;
        st.handled = false;
        st.open = false;
        st.shown = None;
        // Force the decor to be rebuilt next time, so a submenu or expanded
        // item is never shown again on reopen.
        st.refresh_decor = true;
        if self.prepared_panel == Some(feature) {
            self.prepared_panel = None;
        }
    }

    /// Dismiss the overflow popup and report the close against the
    /// action-bar feature, at most once even if dismissal re-enters.
    pub fn check_close_action_menu(&mut self, host: &mut impl WindowCallback<View = V>) {
        if self.closing_action_menu {
            return;
        }
        self.closing_action_menu = true;
        if let Some(overflow) = self.overflow.as_mut() {
            overflow.dismiss_popups();
        }
        if !self.destroyed {
            let menu = self
                .panels
                .get(FeatureId::OptionsPanel)
                .and_then(|st| st.menu.as_ref());
            host.on_panel_closed(FeatureId::ActionBar, menu);
        }
        self.closing_action_menu = false;
    }

    /// Mark `feature`'s menu stale and schedule a rebuild at the next frame
    /// boundary. Any number of invalidations before the flush coalesce into
    /// one scheduled callback and one rebuild pass.
    pub fn invalidate_panel_menu(
        &mut self,
        feature: FeatureId,
        scheduler: &mut impl FrameScheduler,
    ) {
        self.pending_invalidation |= feature.feature_bit();
        if !self.invalidation_scheduled {
            self.invalidation_scheduled = true;
            scheduler.request_frame();
        }
    }

    /// Run the deferred invalidation pass. The host calls this from the
    /// frame callback its [`FrameScheduler`] delivers.
    pub fn flush_invalidation(
        &mut self,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) {
        let mask = self.pending_invalidation;
        self.pending_invalidation = RequestedFeatures::empty();
        self.invalidation_scheduled = false;
        for feature in FeatureId::ALL {
            if mask.contains(feature.feature_bit()) {
                self.invalidate_now(feature, host, chrome);
            }
        }
    }

    fn invalidate_now(
        &mut self,
        feature: FeatureId,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) {
        {
            let st = self.panels.get_or_create(feature);
            st.freeze_action_view_state();
            if let Some(menu) = st.menu.as_mut() {
                // Dispatch resumes when the panel is next prepared.
                menu.freeze_item_changes();
                menu.clear();
            }
            st.refresh_menu_content = true;
            st.refresh_decor = true;
        }

        // With an overflow widget the rebuilt menu must be pushed back into
        // it right away, so re-prepare the options panel eagerly.
        if self.overflow.is_some()
            && let Some(st) = self.panels.get_mut(FeatureId::OptionsPanel)
        {
            st.prepared = false;
            self.prepare_panel(FeatureId::OptionsPanel, None, host, chrome);
        }
    }

    /// Re-show the options menu after its content or presentation changed.
    ///
    /// With an overflow widget able to show (and no permanent hardware menu
    /// key, unless a show is already pending): a showing popup toggles closed
    /// when `toggle_mode` is set; otherwise pending invalidation is flushed
    /// synchronously and the popup is shown if the menu is current and the
    /// host's prepare hook agrees. Without the widget the emulated panel is
    /// closed silently with a forced decor refresh and reopened.
    pub fn reopen_menu(
        &mut self,
        toggle_mode: bool,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) {
        let overflow_path = self.overflow.as_ref().is_some_and(|w| {
            w.can_show_overflow()
                && (!self.config.has_permanent_menu_key || w.is_overflow_show_pending())
        });

        if overflow_path {
            let showing = self.overflow.as_ref().is_some_and(W::is_overflow_showing);
            if showing && toggle_mode {
                if let Some(overflow) = self.overflow.as_mut() {
                    overflow.hide_overflow();
                }
                if !self.destroyed {
                    let menu = self
                        .panels
                        .get(FeatureId::OptionsPanel)
                        .and_then(|st| st.menu.as_ref());
                    host.on_panel_closed(FeatureId::ActionBar, menu);
                }
            } else if !self.destroyed {
                // If a menu invalidation is pending, do it now.
                if self.invalidation_scheduled
                    && self
                        .pending_invalidation
                        .contains(RequestedFeatures::OPTIONS_PANEL)
                {
                    self.flush_invalidation(host, chrome);
                }

                let st = self.panels.get_or_create(FeatureId::OptionsPanel);
                // Without a current menu this is a lingering event that no
                // longer matters.
                if !st.refresh_menu_content
                    && let Some(menu) = st.menu.as_mut()
                {
                    let created = st.created_view.clone();
                    if host.on_prepare_panel(FeatureId::OptionsPanel, created.as_ref(), menu) {
                        host.on_menu_opened(FeatureId::ActionBar, Some(&*menu));
                        if let Some(overflow) = self.overflow.as_mut() {
                            overflow.show_overflow();
                        }
                    }
                }
            }
            return;
        }

        let st = self.panels.get_or_create(FeatureId::OptionsPanel);
        st.refresh_decor = true;
        self.close_panel_state(FeatureId::OptionsPanel, false, host, chrome);
        self.open_panel(FeatureId::OptionsPanel, None, host, chrome);
    }

    /// Try a keyboard shortcut against `feature`'s menu.
    ///
    /// The panel is prepared first if needed. A matching visible, enabled
    /// item is reported through `on_menu_item_selected`; unless `NO_CLOSE`
    /// is set or an overflow widget keeps the menu alive, a successful
    /// shortcut closes the panel. Returns whether an item matched.
    pub fn perform_panel_shortcut(
        &mut self,
        feature: FeatureId,
        key: &KeyEvent,
        flags: ShortcutFlags,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) -> bool {
        let KeyCode::Char(shortcut) = key.code else {
            return false;
        };

        let ready = self.panels.get(feature).is_some_and(|st| st.prepared)
            || self.prepare_panel(feature, Some(key), host, chrome);
        if !ready {
            return false;
        }

        let Some(item) = self
            .panels
            .get(feature)
            .and_then(|st| st.menu.as_ref())
            .and_then(|menu| menu.find_shortcut(shortcut))
        else {
            return false;
        };

        host.on_menu_item_selected(feature, item);
        // Only close down the menu when no action bar is keeping it alive.
        if !flags.contains(ShortcutFlags::NO_CLOSE) && self.overflow.is_none() {
            self.close_panel(feature, true, host, chrome);
        }
        true
    }

    /// Request a window feature. Features can only be requested while the
    /// window is still configurable.
    ///
    /// # Panics
    ///
    /// Panics if called after [`lock_features`](Self::lock_features).
    pub fn request_feature(&mut self, feature: FeatureId) {
        assert!(
            !self.features_locked,
            "window features must be requested before the decor is installed"
        );
        self.requested_features |= feature.feature_bit();
    }

    /// Freeze the requested-feature set; later requests panic.
    pub fn lock_features(&mut self) {
        self.features_locked = true;
    }

    /// Whether `feature` was requested before the lock.
    pub fn has_feature(&self, feature: FeatureId) -> bool {
        self.requested_features.contains(feature.feature_bit())
    }

    /// Put the coordinator in the destroyed state: every later operation is
    /// a silent no-op and no host hook fires again.
    pub fn destroy(&mut self) {
        self.destroyed = true;
    }

    /// Whether [`destroy`](Self::destroy) has been called.
    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// The window configuration this coordinator was built with.
    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    /// The state record for `feature`, if it has ever been touched.
    pub fn panel(&self, feature: FeatureId) -> Option<&PanelState<V>> {
        self.panels.get(feature)
    }

    /// The currently prepared panel, if any.
    pub fn prepared_panel(&self) -> Option<FeatureId> {
        self.prepared_panel
    }

    pub(crate) fn mark_unprepared(&mut self, feature: FeatureId) {
        if let Some(st) = self.panels.get_mut(feature) {
            st.prepared = false;
        }
    }

    pub(crate) fn mark_handled(&mut self, feature: FeatureId) {
        if let Some(st) = self.panels.get_mut(feature) {
            st.handled = true;
        }
    }

    pub(crate) fn overflow_can_show(&self) -> bool {
        self.overflow.as_ref().is_some_and(W::can_show_overflow)
    }

    pub(crate) fn overflow_showing(&self) -> bool {
        self.overflow.as_ref().is_some_and(W::is_overflow_showing)
    }

    pub(crate) fn show_overflow(&mut self) -> bool {
        self.overflow.as_mut().is_some_and(W::show_overflow)
    }

    pub(crate) fn hide_overflow(&mut self) -> bool {
        self.overflow.as_mut().is_some_and(W::hide_overflow)
    }
}
