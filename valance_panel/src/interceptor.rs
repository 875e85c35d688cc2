// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Wrapping the window's original callback.
//!
//! The platform talks to exactly one [`WindowCallback`]. To take over panel
//! semantics without changing that contract, the host registers a
//! [`WindowCallbackInterceptor`] wrapping the application's callback. The
//! interceptor forwards every hook unchanged except for two deliberate
//! overrides: options-panel menu creation is refused (the coordinator owns
//! that menu now) and content-change notifications are swallowed (the
//! coordinator invalidates menus itself). Key events are offered to the
//! [`KeyDispatcher`] first and fall back to the wrapped callback.
//!
//! Wrap once: only the topmost wrapper should be registered with the
//! platform.

use crate::coordinator::MenuLifecycleCoordinator;
use crate::host::{OverflowWidget, PanelChrome, WindowCallback};
use crate::keys::KeyDispatcher;
use crate::menu::{Menu, MenuItemId};
use crate::types::{FeatureId, KeyEvent};

/// Wraps an application's [`WindowCallback`], diverting panel semantics to
/// the coordinator.
#[derive(Clone, Debug, Default)]
pub struct WindowCallbackInterceptor<C> {
    inner: C,
}

impl<C: WindowCallback> WindowCallbackInterceptor<C>
where
    C::View: Clone + PartialEq,
{
    /// Wrap `inner`.
    pub fn new(inner: C) -> Self {
        Self { inner }
    }

    /// The wrapped callback.
    pub fn inner(&self) -> &C {
        &self.inner
    }

    /// Mutable access to the wrapped callback.
    pub fn inner_mut(&mut self) -> &mut C {
        &mut self.inner
    }

    /// Unwrap, returning the original callback.
    pub fn into_inner(self) -> C {
        self.inner
    }

    /// Route a key event: the panel machinery gets the first shot, the
    /// wrapped callback sees whatever was not consumed.
    pub fn dispatch_key_event<W: OverflowWidget>(
        &mut self,
        event: KeyEvent,
        keys: &mut KeyDispatcher,
        coordinator: &mut MenuLifecycleCoordinator<C::View, W>,
        chrome: &mut impl PanelChrome<View = C::View>,
    ) -> bool {
        if keys.dispatch(event, coordinator, &mut self.inner, chrome) {
            return true;
        }
        self.inner.dispatch_key_event(event)
    }

    /// Route a keyboard shortcut to the prepared panel's menu.
    pub fn dispatch_shortcut_event<W: OverflowWidget>(
        &mut self,
        event: KeyEvent,
        keys: &mut KeyDispatcher,
        coordinator: &mut MenuLifecycleCoordinator<C::View, W>,
        chrome: &mut impl PanelChrome<View = C::View>,
    ) -> bool {
        keys.dispatch_shortcut(event, coordinator, &mut self.inner, chrome)
    }
}

impl<C: WindowCallback> WindowCallback for WindowCallbackInterceptor<C> {
    type View = C::View;

    fn dispatch_key_event(&mut self, event: KeyEvent) -> bool {
        self.inner.dispatch_key_event(event)
    }

    fn on_create_panel_view(&mut self, feature: FeatureId) -> Option<Self::View> {
        self.inner.on_create_panel_view(feature)
    }

    fn on_create_panel_menu(&mut self, feature: FeatureId, menu: &mut Menu) -> bool {
        if feature == FeatureId::OptionsPanel {
            // The coordinator owns the options menu; refuse the platform's
            // own creation request so two menus never exist at once.
            return false;
        }
        self.inner.on_create_panel_menu(feature, menu)
    }

    fn on_prepare_panel(
        &mut self,
        feature: FeatureId,
        view: Option<&Self::View>,
        menu: &mut Menu,
    ) -> bool {
        self.inner.on_prepare_panel(feature, view, menu)
    }

    fn on_menu_opened(&mut self, feature: FeatureId, menu: Option<&Menu>) -> bool {
        self.inner.on_menu_opened(feature, menu)
    }

    fn on_panel_closed(&mut self, feature: FeatureId, menu: Option<&Menu>) {
        self.inner.on_panel_closed(feature, menu);
    }

    fn on_menu_item_selected(&mut self, feature: FeatureId, item: MenuItemId) -> bool {
        self.inner.on_menu_item_selected(feature, item)
    }

    fn on_back_pressed(&mut self) -> bool {
        self.inner.on_back_pressed()
    }

    fn on_content_changed(&mut self) {
        // Swallowed: the coordinator drives menu invalidation itself.
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use crate::types::{KeyCode, LayoutParams, PanelLayout, WindowConfig};

    #[derive(Debug, Default)]
    struct Inner {
        content_changes: usize,
        fallback_keys: usize,
        consume_fallback: bool,
        action_bar_menus: usize,
    }

    impl WindowCallback for Inner {
        type View = u32;

        fn dispatch_key_event(&mut self, _event: KeyEvent) -> bool {
            self.fallback_keys += 1;
            self.consume_fallback
        }

        fn on_create_panel_menu(&mut self, feature: FeatureId, _menu: &mut Menu) -> bool {
            if feature == FeatureId::ActionBar {
                self.action_bar_menus += 1;
            }
            true
        }

        fn on_content_changed(&mut self) {
            self.content_changes += 1;
        }
    }

    #[derive(Debug, Default)]
    struct Chrome;

    impl PanelChrome for Chrome {
        type View = u32;

        fn build_panel_decor(&mut self, _feature: FeatureId) -> Option<u32> {
            Some(1)
        }

        fn build_menu_view(&mut self, _feature: FeatureId, _menu: &Menu) -> Option<u32> {
            Some(2)
        }

        fn child_count(&self, _parent: &u32) -> usize {
            0
        }

        fn remove_all_children(&mut self, _parent: &u32) {}

        fn add_child(&mut self, _parent: &u32, _child: &u32, _params: LayoutParams) {}

        fn has_focus(&self, _view: &u32) -> bool {
            true
        }

        fn request_focus(&mut self, _view: &u32) {}

        fn attach_panel(&mut self, _decor: &u32, _layout: &PanelLayout) {}

        fn detach_panel(&mut self, _decor: &u32) {}
    }

    #[test]
    fn options_panel_menu_creation_is_refused() {
        let mut interceptor = WindowCallbackInterceptor::new(Inner::default());
        let mut menu = Menu::new();
        assert!(!interceptor.on_create_panel_menu(FeatureId::OptionsPanel, &mut menu));
        assert!(interceptor.on_create_panel_menu(FeatureId::ActionBar, &mut menu));
        assert_eq!(interceptor.inner().action_bar_menus, 1);
    }

    #[test]
    fn content_changes_are_swallowed() {
        let mut interceptor = WindowCallbackInterceptor::new(Inner::default());
        interceptor.on_content_changed();
        assert_eq!(interceptor.inner().content_changes, 0);
    }

    #[test]
    fn consumed_keys_never_reach_the_wrapped_callback() {
        let mut interceptor = WindowCallbackInterceptor::new(Inner::default());
        let mut keys = KeyDispatcher::new();
        let mut coordinator: MenuLifecycleCoordinator<u32> =
            MenuLifecycleCoordinator::new(WindowConfig::default());
        let mut chrome = Chrome;

        assert!(interceptor.dispatch_key_event(
            KeyEvent::down(KeyCode::Menu),
            &mut keys,
            &mut coordinator,
            &mut chrome,
        ));
        assert_eq!(interceptor.inner().fallback_keys, 0);
    }

    #[test]
    fn unconsumed_keys_fall_back_to_the_wrapped_callback() {
        let mut interceptor = WindowCallbackInterceptor::new(Inner {
            consume_fallback: true,
            ..Inner::default()
        });
        let mut keys = KeyDispatcher::new();
        let mut coordinator: MenuLifecycleCoordinator<u32> =
            MenuLifecycleCoordinator::new(WindowConfig::default());
        let mut chrome = Chrome;

        assert!(interceptor.dispatch_key_event(
            KeyEvent::down(KeyCode::Char('x')),
            &mut keys,
            &mut coordinator,
            &mut chrome,
        ));
        assert_eq!(interceptor.inner().fallback_keys, 1);
    }
}
