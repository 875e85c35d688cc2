// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Key handling for the panel protocol.
//!
//! [`KeyDispatcher`] sits between the platform's key stream and the
//! [`MenuLifecycleCoordinator`]: the MENU key prepares on the down edge and
//! toggles the menu on the up edge, the BACK key closes an open panel unless
//! the press was a long press or the release was canceled, and character keys
//! are offered to the prepared
//! panel's menu as shortcuts. Events the dispatcher does not consume fall
//! back to [`WindowCallback::dispatch_key_event`].

use crate::coordinator::MenuLifecycleCoordinator;
use crate::host::{OverflowWidget, PanelChrome, WindowCallback};
use crate::menu::ShortcutFlags;
use crate::types::{FeatureId, KeyAction, KeyCode, KeyEvent, KeyEventFlags};

/// Routes key events into the panel state machine.
///
/// Holds only cross-event state: whether the in-flight BACK press was
/// recognized as a long press, so the matching release does not also close a
/// panel the long press already acted on.
#[derive(Clone, Debug, Default)]
pub struct KeyDispatcher {
    long_press_back_down: bool,
}

impl KeyDispatcher {
    /// A dispatcher with no press in flight.
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer `event` to the panel machinery. Returns whether it was
    /// consumed; unconsumed events belong to the host's own dispatch.
    pub fn dispatch<V: Clone + PartialEq, W: OverflowWidget>(
        &mut self,
        event: KeyEvent,
        coordinator: &mut MenuLifecycleCoordinator<V, W>,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) -> bool {
        match (event.action, event.code) {
            (KeyAction::Down, KeyCode::Menu) => {
                self.on_menu_key_down(event, coordinator, host, chrome);
                true
            }
            (KeyAction::Down, KeyCode::Back) => {
                self.long_press_back_down = event.flags.contains(KeyEventFlags::LONG_PRESS);
                false
            }
            (KeyAction::Up, KeyCode::Menu) => {
                self.on_menu_key_up(event, coordinator, host, chrome);
                true
            }
            (KeyAction::Up, KeyCode::Back) => self.on_back_key_up(event, coordinator, host, chrome),
            _ => false,
        }
    }

    /// Offer a character key to the menu as a keyboard shortcut.
    ///
    /// A prepared panel gets the first attempt, kept open and marked handled
    /// on success. With no prepared panel the options panel is prepared just
    /// long enough for the attempt and left unprepared afterwards either way.
    pub fn dispatch_shortcut<V: Clone + PartialEq, W: OverflowWidget>(
        &mut self,
        event: KeyEvent,
        coordinator: &mut MenuLifecycleCoordinator<V, W>,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) -> bool {
        if let Some(feature) = coordinator.prepared_panel() {
            if coordinator.perform_panel_shortcut(
                feature,
                &event,
                ShortcutFlags::NO_CLOSE,
                host,
                chrome,
            ) {
                coordinator.mark_handled(feature);
                return true;
            }
        }

        if coordinator.prepared_panel().is_none() {
            coordinator.prepare_panel(FeatureId::OptionsPanel, Some(&event), host, chrome);
            let handled = coordinator.perform_panel_shortcut(
                FeatureId::OptionsPanel,
                &event,
                ShortcutFlags::empty(),
                host,
                chrome,
            );
            // The prepare above was only for the shortcut attempt.
            coordinator.mark_unprepared(FeatureId::OptionsPanel);
            return handled;
        }

        false
    }

    fn on_menu_key_down<V: Clone + PartialEq, W: OverflowWidget>(
        &mut self,
        event: KeyEvent,
        coordinator: &mut MenuLifecycleCoordinator<V, W>,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) {
        if event.repeat_count == 0 {
            let open = coordinator
                .panel(FeatureId::OptionsPanel)
                .is_some_and(|st| st.open);
            if !open {
                coordinator.prepare_panel(FeatureId::OptionsPanel, Some(&event), host, chrome);
            }
        }
    }

    fn on_menu_key_up<V: Clone + PartialEq, W: OverflowWidget>(
        &mut self,
        event: KeyEvent,
        coordinator: &mut MenuLifecycleCoordinator<V, W>,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) {
        let mut handled = false;

        if coordinator.overflow_can_show() && !coordinator.config().has_permanent_menu_key {
            if coordinator.overflow_showing() {
                handled = coordinator.hide_overflow();
            } else if !coordinator.is_destroyed()
                && coordinator.prepare_panel(FeatureId::OptionsPanel, Some(&event), host, chrome)
            {
                handled = coordinator.show_overflow();
            }
        } else {
            let (open, was_handled, prepared, stale) = coordinator
                .panel(FeatureId::OptionsPanel)
                .map_or((false, false, false, false), |st| {
                    (st.open, st.handled, st.prepared, st.refresh_menu_content)
                });

            if open || was_handled {
                // Sound only when the user closed an open menu, not when
                // they released a menu shortcut.
                handled = open;
                coordinator.close_panel(FeatureId::OptionsPanel, true, host, chrome);
            } else if prepared {
                let mut show = true;
                if stale {
                    coordinator.mark_unprepared(FeatureId::OptionsPanel);
                    show = coordinator.prepare_panel(
                        FeatureId::OptionsPanel,
                        Some(&event),
                        host,
                        chrome,
                    );
                }
                if show {
                    coordinator.open_panel(FeatureId::OptionsPanel, Some(&event), host, chrome);
                    handled = true;
                }
            }
        }

        if handled && !chrome.play_click_sound() {
            log::warn!("no audio service available for menu key feedback");
        }
    }

    fn on_back_key_up<V: Clone + PartialEq, W: OverflowWidget>(
        &mut self,
        event: KeyEvent,
        coordinator: &mut MenuLifecycleCoordinator<V, W>,
        host: &mut impl WindowCallback<View = V>,
        chrome: &mut impl PanelChrome<View = V>,
    ) -> bool {
        let was_long_press = self.long_press_back_down;
        self.long_press_back_down = false;
        // A canceled release aborts the gesture: nothing closes and the
        // host's back handling is not invoked.
        let canceled = event.flags.contains(KeyEventFlags::CANCELED);

        let open = coordinator
            .panel(FeatureId::OptionsPanel)
            .is_some_and(|st| st.open);
        if open {
            if !was_long_press && !canceled {
                coordinator.close_panel(FeatureId::OptionsPanel, true, host, chrome);
            }
            return true;
        }
        if canceled {
            return false;
        }

        host.on_back_pressed()
    }
}
