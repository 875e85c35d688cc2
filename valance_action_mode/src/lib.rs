// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Valance Action Mode: contextual action mode lifecycle bookkeeping.
//!
//! ## Overview
//!
//! A contextual action mode temporarily replaces the window's normal chrome
//! with a bar of actions (think text-selection toolbars). This crate owns the
//! order-sensitive rules of that takeover without building any views:
//!
//! - at most one mode is active; starting a second finishes the first, and
//!   the first's destroy callback runs before the second's create callback;
//! - the destroy callback of a started mode fires exactly once, enforced by
//!   a wrapper rather than by caller discipline;
//! - hosting prefers the action-bar widget, then falls back to a floating
//!   bar (a popup for floating windows, a stub pinned into the decor
//!   otherwise);
//! - the bar fades in only after the window has completed a layout pass, and
//!   fades out on finish, with teardown deferred to the fade's completion;
//!   stale fade-completion notifications are ignored by handle comparison.
//!
//! The host implements [`ModeHost`] and [`FadeDriver`]; the mode's owner
//! implements [`ActionModeCallback`]. Menus come from
//! [`valance_panel::menu`].
//!
//! ## Minimal example
//!
//! ```
//! use valance_action_mode::{
//!     ActionModeCallback, ActionModeCoordinator, FadeDriver, ModeHost, ModeId,
//!     PopupDismissError,
//! };
//! use valance_panel::menu::{Menu, MenuItem, MenuItemId};
//!
//! struct Select;
//! impl ActionModeCallback for Select {
//!     fn on_create_action_mode(&mut self, menu: &mut Menu) -> bool {
//!         menu.add(MenuItem::new(MenuItemId(1), "Copy"));
//!         true
//!     }
//! }
//!
//! struct Host {
//!     laid_out: bool,
//! }
//! impl ModeHost for Host {
//!     type View = u32;
//!     fn finish_widget_mode(&mut self) {}
//!     fn build_stub_bar(&mut self) -> Option<u32> {
//!         Some(1)
//!     }
//!     fn has_completed_layout(&self) -> bool {
//!         self.laid_out
//!     }
//!     fn queue_popup_show(&mut self) {}
//!     fn cancel_queued_popup_show(&mut self) {}
//!     fn show_now(&mut self, _bar: &u32) {}
//!     fn hide(&mut self, _bar: &u32) {}
//!     fn dismiss_popup(&mut self) -> Result<(), PopupDismissError> {
//!         Ok(())
//!     }
//!     fn remove_from_decor(&mut self, _bar: &u32) {}
//!     fn on_mode_started(&mut self, _mode: ModeId) {}
//!     fn on_mode_finished(&mut self, _mode: ModeId) {}
//! }
//!
//! struct Fades;
//! impl FadeDriver<u32> for Fades {
//!     type Handle = u32;
//!     fn fade_in(&mut self, _bar: &u32) -> u32 {
//!         1
//!     }
//!     fn fade_out(&mut self, _bar: &u32) -> u32 {
//!         2
//!     }
//!     fn cancel(&mut self, _handle: u32) {}
//! }
//!
//! let mut host = Host { laid_out: false };
//! let mut fades = Fades;
//! let mut coordinator = ActionModeCoordinator::new();
//! let id = coordinator.start_mode(Box::new(Select), &mut host, &mut fades);
//! assert!(id.is_some());
//! assert_eq!(coordinator.active_mode(), id);
//! ```
//!
//! ## Features
//!
//! - `std`: enables `std` support for dependencies such as `kurbo`.
//! - `libm`: enables `no_std` + `alloc` builds that rely on `libm` for
//!   floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

use alloc::boxed::Box;
use core::fmt;

use valance_panel::menu::{Menu, MenuItemId};

/// Identifier of a started action mode, unique within one coordinator.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ModeId(pub u64);

/// The popup hosting an action mode could not be dismissed because it was
/// already gone. A benign race during window teardown; callers log and
/// continue.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PopupDismissError;

impl fmt::Display for PopupDismissError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("action mode popup was already dismissed")
    }
}

impl core::error::Error for PopupDismissError {}

/// The mode owner's hooks.
pub trait ActionModeCallback {
    /// Populate the mode's menu. Returning `false` refuses the mode; a
    /// refused mode is never started and owes no destroy callback.
    fn on_create_action_mode(&mut self, menu: &mut Menu) -> bool;

    /// Refresh the menu on invalidation. Return whether anything changed.
    fn on_prepare_action_mode(&mut self, menu: &mut Menu) -> bool {
        let _ = menu;
        false
    }

    /// An action was picked. Return `true` if handled.
    fn on_action_item_clicked(&mut self, item: MenuItemId) -> bool {
        let _ = item;
        false
    }

    /// The mode ended. Fires exactly once per started mode.
    fn on_destroy_action_mode(&mut self) {}
}

/// The window-side collaborator: hosting surfaces, popup scheduling, and
/// started/finished notifications.
pub trait ModeHost {
    /// The host's opaque view handle type.
    type View: Clone + PartialEq;

    /// Offer the mode to the action-bar widget. Returning `true` means the
    /// widget presents it and no floating bar is needed.
    fn start_widget_mode(&mut self, mode: ModeId, menu: &Menu) -> bool {
        let _ = (mode, menu);
        false
    }

    /// End a widget-hosted mode.
    fn finish_widget_mode(&mut self);

    /// Whether the window floats; floating windows get a popup bar.
    fn is_floating_window(&self) -> bool {
        false
    }

    /// Build the popup-hosted floating bar.
    fn build_popup_bar(&mut self) -> Option<Self::View> {
        None
    }

    /// Build the decor-pinned floating bar.
    fn build_stub_bar(&mut self) -> Option<Self::View> {
        None
    }

    /// Whether the window decor has completed a layout pass. Fades are only
    /// meaningful afterwards.
    fn has_completed_layout(&self) -> bool;

    /// Ask for the popup to be shown once layout settles.
    fn queue_popup_show(&mut self);

    /// Withdraw a queued popup show.
    fn cancel_queued_popup_show(&mut self);

    /// Show `bar` immediately, without animation.
    fn show_now(&mut self, bar: &Self::View);

    /// Hide `bar`.
    fn hide(&mut self, bar: &Self::View);

    /// Dismiss the popup hosting the bar.
    fn dismiss_popup(&mut self) -> Result<(), PopupDismissError>;

    /// Remove `bar` from the window decor.
    fn remove_from_decor(&mut self, bar: &Self::View);

    /// A mode started. Fires exactly once per started mode.
    fn on_mode_started(&mut self, mode: ModeId);

    /// A mode finished and its surface is gone. Fires exactly once per
    /// started mode, after any fade-out completes.
    fn on_mode_finished(&mut self, mode: ModeId);
}

/// Drives fade animations on mode bars.
///
/// Each started fade is identified by a handle; the host reports completion
/// back through [`ActionModeCoordinator::fade_finished`] with that handle, so
/// a completion racing a cancellation can be told apart from the current
/// fade.
pub trait FadeDriver<V> {
    /// Identifies one in-flight fade.
    type Handle: Copy + PartialEq;

    /// Start fading `bar` in.
    fn fade_in(&mut self, bar: &V) -> Self::Handle;

    /// Start fading `bar` out.
    fn fade_out(&mut self, bar: &V) -> Self::Handle;

    /// Cancel an in-flight fade.
    fn cancel(&mut self, handle: Self::Handle);
}

/// Wraps the owner's callback so destroy fires exactly once no matter how
/// many paths try to end the mode.
struct CallbackGuard {
    inner: Box<dyn ActionModeCallback>,
    destroy_sent: bool,
}

impl CallbackGuard {
    fn new(inner: Box<dyn ActionModeCallback>) -> Self {
        Self {
            inner,
            destroy_sent: false,
        }
    }

    fn send_destroy(&mut self) {
        if !self.destroy_sent {
            self.destroy_sent = true;
            self.inner.on_destroy_action_mode();
        }
    }
}

enum Hosting<V> {
    Widget,
    Floating { bar: V, popup: bool },
}

struct ActiveMode<V> {
    id: ModeId,
    callback: CallbackGuard,
    hosting: Hosting<V>,
    menu: Menu,
}

struct FinishingMode<V> {
    id: ModeId,
    bar: V,
    popup: bool,
}

#[derive(Copy, Clone, PartialEq, Eq)]
enum FadeDirection {
    In,
    Out,
}

struct FadeInFlight<H> {
    handle: H,
    direction: FadeDirection,
}

/// The action mode state machine: at most one active mode, one possibly
/// fading-out predecessor, and the current fade handle.
///
/// `V` is the host's view handle type, `H` the fade driver's handle type.
pub struct ActionModeCoordinator<V, H> {
    active: Option<ActiveMode<V>>,
    finishing: Option<FinishingMode<V>>,
    fade: Option<FadeInFlight<H>>,
    next_id: u64,
}

impl<V, H> fmt::Debug for ActionModeCoordinator<V, H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ActionModeCoordinator")
            .field("active", &self.active.as_ref().map(|m| m.id))
            .field("finishing", &self.finishing.as_ref().map(|m| m.id))
            .field("fade_in_flight", &self.fade.is_some())
            .finish_non_exhaustive()
    }
}

impl<V, H> Default for ActionModeCoordinator<V, H> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, H> ActionModeCoordinator<V, H> {
    /// A coordinator with no mode active.
    pub fn new() -> Self {
        Self {
            active: None,
            finishing: None,
            fade: None,
            next_id: 0,
        }
    }

    /// Start an action mode.
    ///
    /// Any active mode is finished first; its destroy callback runs before
    /// the new mode's create callback, and a predecessor still fading out is
    /// torn down immediately. Returns `None` when the owner refuses the mode
    /// or no surface can host it; a refused mode owes no destroy callback.
    pub fn start_mode(
        &mut self,
        callback: Box<dyn ActionModeCallback>,
        host: &mut impl ModeHost<View = V>,
        fade: &mut impl FadeDriver<V, Handle = H>,
    ) -> Option<ModeId> {
        if self.active.is_some() {
            self.finish_mode(host, fade);
        }
        self.complete_pending_finish(host, fade);

        let mut guard = CallbackGuard::new(callback);
        let mut menu = Menu::new();
        if !guard.inner.on_create_action_mode(&mut menu) {
            return None;
        }
        guard.inner.on_prepare_action_mode(&mut menu);

        let id = ModeId(self.next_id);
        self.next_id += 1;

        let hosting = if host.start_widget_mode(id, &menu) {
            Hosting::Widget
        } else {
            let popup = host.is_floating_window();
            let bar = if popup {
                host.build_popup_bar()
            } else {
                host.build_stub_bar()
            };
            let Some(bar) = bar else {
                log::warn!("no surface available to host the action mode");
                return None;
            };
            Hosting::Floating { bar, popup }
        };

        if let Hosting::Floating { bar, popup } = &hosting {
            if host.has_completed_layout() {
                let handle = fade.fade_in(bar);
                self.fade = Some(FadeInFlight {
                    handle,
                    direction: FadeDirection::In,
                });
            } else {
                host.show_now(bar);
            }
            if *popup {
                host.queue_popup_show();
            }
        }

        self.active = Some(ActiveMode {
            id,
            callback: guard,
            hosting,
            menu,
        });
        host.on_mode_started(id);
        Some(id)
    }

    /// Finish the active mode, if any.
    ///
    /// The destroy callback fires immediately. A widget-hosted mode is over
    /// at once; a floating bar fades out first when the window is laid out,
    /// and the finished notification waits for [`fade_finished`].
    ///
    /// [`fade_finished`]: Self::fade_finished
    pub fn finish_mode(
        &mut self,
        host: &mut impl ModeHost<View = V>,
        fade: &mut impl FadeDriver<V, Handle = H>,
    ) {
        let Some(mode) = self.active.take() else {
            return;
        };
        let ActiveMode {
            id,
            mut callback,
            hosting,
            ..
        } = mode;
        callback.send_destroy();

        match hosting {
            Hosting::Widget => {
                host.finish_widget_mode();
                host.on_mode_finished(id);
            }
            Hosting::Floating { bar, popup } => {
                if popup {
                    host.cancel_queued_popup_show();
                }
                if let Some(inflight) = self.fade.take() {
                    fade.cancel(inflight.handle);
                }
                if host.has_completed_layout() {
                    let handle = fade.fade_out(&bar);
                    self.fade = Some(FadeInFlight {
                        handle,
                        direction: FadeDirection::Out,
                    });
                    self.finishing = Some(FinishingMode { id, bar, popup });
                } else {
                    Self::tear_down(&bar, popup, host);
                    host.on_mode_finished(id);
                }
            }
        }
    }

    /// Report a fade's completion.
    ///
    /// Handles that are not the current fade's are ignored; they belong to a
    /// fade that was already cancelled or superseded. Completing a fade-out
    /// tears the finishing bar down and fires the finished notification.
    pub fn fade_finished(&mut self, handle: H, host: &mut impl ModeHost<View = V>)
    where
        H: PartialEq,
    {
        let Some(inflight) = self.fade.as_ref() else {
            return;
        };
        if inflight.handle != handle {
            return;
        }
        let direction = inflight.direction;
        self.fade = None;

        if direction == FadeDirection::Out
            && let Some(finishing) = self.finishing.take()
        {
            Self::tear_down(&finishing.bar, finishing.popup, host);
            host.on_mode_finished(finishing.id);
        }
    }

    /// Re-run the owner's prepare hook on the active mode's menu.
    pub fn invalidate(&mut self) {
        if let Some(mode) = self.active.as_mut() {
            mode.callback.inner.on_prepare_action_mode(&mut mode.menu);
        }
    }

    /// Report an action click to the active mode. Returns whether the owner
    /// handled it.
    pub fn action_item_clicked(&mut self, item: MenuItemId) -> bool {
        self.active
            .as_mut()
            .is_some_and(|mode| mode.callback.inner.on_action_item_clicked(item))
    }

    /// The active mode's id, if a mode is active.
    pub fn active_mode(&self) -> Option<ModeId> {
        self.active.as_ref().map(|m| m.id)
    }

    /// The active mode's menu.
    pub fn menu(&self) -> Option<&Menu> {
        self.active.as_ref().map(|m| &m.menu)
    }

    fn complete_pending_finish(
        &mut self,
        host: &mut impl ModeHost<View = V>,
        fade: &mut impl FadeDriver<V, Handle = H>,
    ) {
        let Some(finishing) = self.finishing.take() else {
            return;
        };
        if let Some(inflight) = self.fade.take() {
            fade.cancel(inflight.handle);
        }
        Self::tear_down(&finishing.bar, finishing.popup, host);
        host.on_mode_finished(finishing.id);
    }

    fn tear_down(bar: &V, popup: bool, host: &mut impl ModeHost<View = V>) {
        host.hide(bar);
        if popup && host.dismiss_popup().is_err() {
            // The popup may already be gone when the window itself is on
            // the way out.
            log::debug!("action mode popup was already dismissed");
        }
        host.remove_from_decor(bar);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::rc::Rc;
    use alloc::string::String;
    use alloc::vec::Vec;
    use alloc::{format, vec};
    use core::cell::RefCell;

    use valance_panel::menu::MenuItem;

    type Log = Rc<RefCell<Vec<String>>>;

    struct Owner {
        name: &'static str,
        refuse: bool,
        log: Log,
    }

    impl Owner {
        fn new(name: &'static str, log: &Log) -> Box<Self> {
            Box::new(Self {
                name,
                refuse: false,
                log: log.clone(),
            })
        }
    }

    impl ActionModeCallback for Owner {
        fn on_create_action_mode(&mut self, menu: &mut Menu) -> bool {
            self.log.borrow_mut().push(format!("create {}", self.name));
            if self.refuse {
                return false;
            }
            menu.add(MenuItem::new(MenuItemId(1), "Copy"));
            true
        }

        fn on_prepare_action_mode(&mut self, _menu: &mut Menu) -> bool {
            self.log.borrow_mut().push(format!("prepare {}", self.name));
            false
        }

        fn on_action_item_clicked(&mut self, item: MenuItemId) -> bool {
            self.log
                .borrow_mut()
                .push(format!("click {} {}", self.name, item.0));
            true
        }

        fn on_destroy_action_mode(&mut self) {
            self.log.borrow_mut().push(format!("destroy {}", self.name));
        }
    }

    #[derive(Debug)]
    struct Host {
        widget_accepts: bool,
        floating: bool,
        laid_out: bool,
        popup_dismiss_fails: bool,
        next_bar: u32,
        shown_now: Vec<u32>,
        hidden: Vec<u32>,
        removed: Vec<u32>,
        queued_shows: usize,
        cancelled_shows: usize,
        widget_finishes: usize,
        started: Vec<ModeId>,
        finished: Vec<ModeId>,
    }

    impl Default for Host {
        fn default() -> Self {
            Self {
                widget_accepts: false,
                floating: false,
                laid_out: true,
                popup_dismiss_fails: false,
                next_bar: 0,
                shown_now: Vec::new(),
                hidden: Vec::new(),
                removed: Vec::new(),
                queued_shows: 0,
                cancelled_shows: 0,
                widget_finishes: 0,
                started: Vec::new(),
                finished: Vec::new(),
            }
        }
    }

    impl ModeHost for Host {
        type View = u32;

        fn start_widget_mode(&mut self, _mode: ModeId, _menu: &Menu) -> bool {
            self.widget_accepts
        }

        fn finish_widget_mode(&mut self) {
            self.widget_finishes += 1;
        }

        fn is_floating_window(&self) -> bool {
            self.floating
        }

        fn build_popup_bar(&mut self) -> Option<u32> {
            self.next_bar += 1;
            Some(self.next_bar)
        }

        fn build_stub_bar(&mut self) -> Option<u32> {
            self.next_bar += 1;
            Some(self.next_bar)
        }

        fn has_completed_layout(&self) -> bool {
            self.laid_out
        }

        fn queue_popup_show(&mut self) {
            self.queued_shows += 1;
        }

        fn cancel_queued_popup_show(&mut self) {
            self.cancelled_shows += 1;
        }

        fn show_now(&mut self, bar: &u32) {
            self.shown_now.push(*bar);
        }

        fn hide(&mut self, bar: &u32) {
            self.hidden.push(*bar);
        }

        fn dismiss_popup(&mut self) -> Result<(), PopupDismissError> {
            if self.popup_dismiss_fails {
                Err(PopupDismissError)
            } else {
                Ok(())
            }
        }

        fn remove_from_decor(&mut self, bar: &u32) {
            self.removed.push(*bar);
        }

        fn on_mode_started(&mut self, mode: ModeId) {
            self.started.push(mode);
        }

        fn on_mode_finished(&mut self, mode: ModeId) {
            self.finished.push(mode);
        }
    }

    #[derive(Debug, Default)]
    struct Fades {
        next: u32,
        cancelled: Vec<u32>,
        ins: usize,
        outs: usize,
    }

    impl FadeDriver<u32> for Fades {
        type Handle = u32;

        fn fade_in(&mut self, _bar: &u32) -> u32 {
            self.ins += 1;
            self.next += 1;
            self.next
        }

        fn fade_out(&mut self, _bar: &u32) -> u32 {
            self.outs += 1;
            self.next += 1;
            self.next
        }

        fn cancel(&mut self, handle: u32) {
            self.cancelled.push(handle);
        }
    }

    fn fixture() -> (ActionModeCoordinator<u32, u32>, Host, Fades, Log) {
        (
            ActionModeCoordinator::new(),
            Host::default(),
            Fades::default(),
            Log::default(),
        )
    }

    #[test]
    fn started_mode_gets_create_prepare_and_started() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        let id = coordinator
            .start_mode(Owner::new("a", &log), &mut host, &mut fades)
            .expect("mode starts");
        assert_eq!(coordinator.active_mode(), Some(id));
        assert_eq!(host.started, vec![id]);
        assert_eq!(*log.borrow(), vec!["create a", "prepare a"]);
        assert!(coordinator.menu().is_some_and(|m| m.has_visible_items()));
    }

    #[test]
    fn second_mode_destroys_the_first_before_its_own_create() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        coordinator.start_mode(Owner::new("b", &log), &mut host, &mut fades);
        assert_eq!(
            *log.borrow(),
            vec!["create a", "prepare a", "destroy a", "create b", "prepare b"]
        );
        // The fading-out predecessor was completed immediately.
        assert_eq!(host.finished.len(), 1);
        assert_eq!(host.started.len(), 2);
    }

    #[test]
    fn refused_mode_owes_no_destroy() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        let mut owner = Owner::new("a", &log);
        owner.refuse = true;
        assert!(coordinator.start_mode(owner, &mut host, &mut fades).is_none());
        assert_eq!(coordinator.active_mode(), None);
        assert!(host.started.is_empty());
        assert_eq!(*log.borrow(), vec!["create a"]);

        coordinator.finish_mode(&mut host, &mut fades);
        assert_eq!(*log.borrow(), vec!["create a"]);
    }

    #[test]
    fn widget_hosting_wins_when_the_widget_accepts() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        host.widget_accepts = true;
        coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        assert_eq!(host.next_bar, 0);
        assert_eq!(fades.ins, 0);

        coordinator.finish_mode(&mut host, &mut fades);
        assert_eq!(host.widget_finishes, 1);
        assert_eq!(host.finished.len(), 1);
    }

    #[test]
    fn floating_window_gets_a_popup_bar_with_a_queued_show() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        host.floating = true;
        coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        assert_eq!(host.queued_shows, 1);
        assert_eq!(fades.ins, 1);
    }

    #[test]
    fn before_first_layout_the_bar_shows_without_a_fade() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        host.laid_out = false;
        coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        assert_eq!(fades.ins, 0);
        assert_eq!(host.shown_now.len(), 1);
    }

    #[test]
    fn finish_fades_out_and_defers_teardown_to_completion() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        let id = coordinator
            .start_mode(Owner::new("a", &log), &mut host, &mut fades)
            .expect("mode starts");
        let fade_in = fades.next;

        coordinator.finish_mode(&mut host, &mut fades);
        // Destroy fires right away; the surface lingers through the fade.
        assert_eq!(*log.borrow(), vec!["create a", "prepare a", "destroy a"]);
        assert_eq!(fades.cancelled, vec![fade_in]);
        assert_eq!(fades.outs, 1);
        assert!(host.finished.is_empty());
        assert!(host.removed.is_empty());

        let fade_out = fades.next;
        coordinator.fade_finished(fade_out, &mut host);
        assert_eq!(host.hidden.len(), 1);
        assert_eq!(host.removed.len(), 1);
        assert_eq!(host.finished, vec![id]);
    }

    #[test]
    fn stale_fade_handles_are_ignored() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        coordinator.finish_mode(&mut host, &mut fades);

        let fade_out = fades.next;
        // The cancelled fade-in handle arrives late.
        coordinator.fade_finished(fade_out - 1, &mut host);
        assert!(host.finished.is_empty());

        coordinator.fade_finished(fade_out, &mut host);
        assert_eq!(host.finished.len(), 1);
        // Completing twice does nothing further.
        coordinator.fade_finished(fade_out, &mut host);
        assert_eq!(host.finished.len(), 1);
    }

    #[test]
    fn finish_before_layout_tears_down_immediately() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        host.laid_out = false;
        let id = coordinator
            .start_mode(Owner::new("a", &log), &mut host, &mut fades)
            .expect("mode starts");
        coordinator.finish_mode(&mut host, &mut fades);
        assert_eq!(fades.outs, 0);
        assert_eq!(host.removed.len(), 1);
        assert_eq!(host.finished, vec![id]);
    }

    #[test]
    fn finishing_a_popup_mode_cancels_the_queued_show() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        host.floating = true;
        coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        coordinator.finish_mode(&mut host, &mut fades);
        assert_eq!(host.cancelled_shows, 1);
    }

    #[test]
    fn failed_popup_dismissal_is_swallowed() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        host.floating = true;
        host.laid_out = false;
        host.popup_dismiss_fails = true;
        let id = coordinator
            .start_mode(Owner::new("a", &log), &mut host, &mut fades)
            .expect("mode starts");
        coordinator.finish_mode(&mut host, &mut fades);
        // Teardown completes despite the dismissal race.
        assert_eq!(host.removed.len(), 1);
        assert_eq!(host.finished, vec![id]);
    }

    #[test]
    fn destroy_fires_exactly_once() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        coordinator.finish_mode(&mut host, &mut fades);
        coordinator.finish_mode(&mut host, &mut fades);
        let destroys = log
            .borrow()
            .iter()
            .filter(|entry| entry.starts_with("destroy"))
            .count();
        assert_eq!(destroys, 1);
    }

    #[test]
    fn clicks_and_invalidation_reach_the_active_owner() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        assert!(coordinator.action_item_clicked(MenuItemId(1)));
        coordinator.invalidate();
        assert_eq!(
            *log.borrow(),
            vec!["create a", "prepare a", "click a 1", "prepare a"]
        );

        coordinator.finish_mode(&mut host, &mut fades);
        assert!(!coordinator.action_item_clicked(MenuItemId(1)));
    }

    #[test]
    fn mode_ids_are_not_reused() {
        let (mut coordinator, mut host, mut fades, log) = fixture();
        let first = coordinator.start_mode(Owner::new("a", &log), &mut host, &mut fades);
        let second = coordinator.start_mode(Owner::new("b", &log), &mut host, &mut fades);
        assert_ne!(first, second);
    }
}
