// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Valance Panel: a user-space window panel and options-menu state machine.
//!
//! ## Overview
//!
//! This crate re-implements, outside the platform's control, the stateful
//! protocol a window manager normally owns: deciding when an options menu may
//! be created, prepared, shown, dismissed, or invalidated. It does not build
//! views, resolve themes, or draw anything. Instead, the host implements a
//! small set of collaborator traits ([`WindowCallback`](host::WindowCallback),
//! [`PanelChrome`](host::PanelChrome), [`OverflowWidget`](host::OverflowWidget),
//! [`FrameScheduler`](host::FrameScheduler)) and feeds key events in; the
//! crate owns the order-sensitive bookkeeping and tells the host what to
//! attach, detach, and rebuild.
//!
//! ## Components
//!
//! - [`registry::PanelRegistry`] — lazily-created, growable per-feature
//!   storage of [`state::PanelState`] records.
//! - [`coordinator::MenuLifecycleCoordinator`] — the core state machine:
//!   prepare → open → close transitions, deferred menu invalidation, overflow
//!   reconciliation, and the single "currently prepared panel" marker.
//! - [`keys::KeyDispatcher`] — menu-key toggling, back-key closing with
//!   long-press suppression, and keyboard shortcut dispatch.
//! - [`interceptor::WindowCallbackInterceptor`] — wraps the window's original
//!   callback so the coordinator can own panel semantics without changing the
//!   callback chain's contract.
//! - [`menu::Menu`] — the menu model the coordinator builds lazily and hands
//!   to the host's hooks.
//!
//! ## Ordering guarantees
//!
//! A panel must be fully prepared before it can be opened; preparing one panel
//! closes any other prepared panel first (silently — the displaced panel's
//! close callback is deliberately not fired); invalidation is coalesced onto
//! the next frame and always flushed before a reopen so stale menu content is
//! never shown.
//!
//! ## Minimal example
//!
//! Preparing and opening the options panel against a recording host:
//!
//! ```
//! use valance_panel::coordinator::MenuLifecycleCoordinator;
//! use valance_panel::host::{PanelChrome, WindowCallback};
//! use valance_panel::menu::{Menu, MenuItem, MenuItemId};
//! use valance_panel::types::{FeatureId, LayoutParams, PanelLayout, WindowConfig};
//!
//! struct Host;
//! impl WindowCallback for Host {
//!     type View = u32;
//!     fn on_create_panel_menu(&mut self, _f: FeatureId, menu: &mut Menu) -> bool {
//!         menu.add(MenuItem::new(MenuItemId(1), "Settings"));
//!         true
//!     }
//! }
//!
//! struct Chrome {
//!     next: u32,
//!     attached: Vec<u32>,
//! }
//! impl PanelChrome for Chrome {
//!     type View = u32;
//!     fn build_panel_decor(&mut self, _f: FeatureId) -> Option<u32> {
//!         self.next += 1;
//!         Some(self.next)
//!     }
//!     fn build_menu_view(&mut self, _f: FeatureId, _menu: &Menu) -> Option<u32> {
//!         self.next += 1;
//!         Some(self.next)
//!     }
//!     fn child_count(&self, _parent: &u32) -> usize {
//!         0
//!     }
//!     fn remove_all_children(&mut self, _parent: &u32) {}
//!     fn add_child(&mut self, _parent: &u32, _child: &u32, _params: LayoutParams) {}
//!     fn has_focus(&self, _view: &u32) -> bool {
//!         false
//!     }
//!     fn request_focus(&mut self, _view: &u32) {}
//!     fn attach_panel(&mut self, decor: &u32, _layout: &PanelLayout) {
//!         self.attached.push(*decor);
//!     }
//!     fn detach_panel(&mut self, decor: &u32) {
//!         self.attached.retain(|v| v != decor);
//!     }
//! }
//!
//! let mut host = Host;
//! let mut chrome = Chrome { next: 0, attached: Vec::new() };
//! let mut coordinator = MenuLifecycleCoordinator::new(WindowConfig::default());
//!
//! assert!(coordinator.prepare_panel(FeatureId::OptionsPanel, None, &mut host, &mut chrome));
//! coordinator.open_panel(FeatureId::OptionsPanel, None, &mut host, &mut chrome);
//!
//! let panel = coordinator.panel(FeatureId::OptionsPanel).unwrap();
//! assert!(panel.open);
//! assert_eq!(chrome.attached.len(), 1);
//! ```
//!
//! ## Concurrency model
//!
//! Single-threaded and cooperative: every operation runs on the thread that
//! owns the window. There is no locking because there is no concurrent
//! mutation — re-entrancy is the hazard, and it is guarded explicitly (the
//! "closing action menu" guard, the single prepared-panel marker). Deferred
//! work is frame-boundary scheduling through
//! [`FrameScheduler`](host::FrameScheduler), never a blocking wait.
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

pub mod coordinator;
pub mod host;
pub mod interceptor;
pub mod keys;
pub mod menu;
pub mod registry;
pub mod state;
pub mod types;
