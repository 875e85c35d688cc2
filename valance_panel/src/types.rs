// Copyright 2025 the Valance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Shared types: feature ids, key events, layout hints, and window
//! configuration.
//!
//! These are plain data carriers. The host constructs them from whatever the
//! platform actually reports (key codes, device keymaps, screen metrics) and
//! the state machines only ever read them.

use bitflags::bitflags;
use kurbo::Point;

/// Window feature whose panel the delegate manages.
///
/// The feature space is deliberately closed: the options panel and the
/// app-compat action-bar feature are the only two panels this delegate owns.
/// Other platform features stay with the original window callback.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum FeatureId {
    /// The emulated options panel (the classic menu-key panel).
    OptionsPanel,
    /// The app-compat action bar's own menu feature.
    ActionBar,
}

impl FeatureId {
    /// Index of this feature in owner-indexed storage.
    pub fn index(self) -> usize {
        match self {
            Self::OptionsPanel => 0,
            Self::ActionBar => 1,
        }
    }

    /// All features, in index order.
    pub const ALL: [Self; 2] = [Self::OptionsPanel, Self::ActionBar];
}

bitflags! {
    /// Flags carried on a [`KeyEvent`].
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct KeyEventFlags: u8 {
        /// The platform recognized this press as a long press.
        const LONG_PRESS = 1 << 0;
        /// The key sequence was canceled (e.g. focus moved away mid-press).
        const CANCELED = 1 << 1;
    }
}

/// Whether a key event is a press or a release.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Key went down.
    Down,
    /// Key went up.
    Up,
}

/// The subset of key codes the panel machinery reacts to.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum KeyCode {
    /// The hardware or virtual MENU key.
    Menu,
    /// The BACK key.
    Back,
    /// A character key, used for keyboard shortcut dispatch.
    Char(char),
}

/// Kind of keymap the originating input device carries.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Keymap {
    /// A full alphabetic keyboard.
    Full,
    /// A numeric keypad.
    Numeric,
    /// The virtual (on-screen) keyboard; treated as full.
    Virtual,
}

impl Keymap {
    /// Whether menus should operate in qwerty (alphabetic shortcut) mode.
    pub fn is_qwerty(self) -> bool {
        !matches!(self, Self::Numeric)
    }
}

/// A platform key event, reduced to what panel dispatch needs.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    /// Press or release.
    pub action: KeyAction,
    /// Which key.
    pub code: KeyCode,
    /// Platform flags (long press, canceled).
    pub flags: KeyEventFlags,
    /// Repeat count; `0` for the initial press.
    pub repeat_count: u32,
    /// Keymap of the originating device.
    pub keymap: Keymap,
}

impl KeyEvent {
    /// A key-down event with default flags and the virtual keymap.
    pub fn down(code: KeyCode) -> Self {
        Self {
            action: KeyAction::Down,
            code,
            flags: KeyEventFlags::empty(),
            repeat_count: 0,
            keymap: Keymap::Virtual,
        }
    }

    /// A key-up event with default flags and the virtual keymap.
    pub fn up(code: KeyCode) -> Self {
        Self {
            action: KeyAction::Up,
            code,
            flags: KeyEventFlags::empty(),
            repeat_count: 0,
            keymap: Keymap::Virtual,
        }
    }

    /// Builder-style flag override.
    pub fn with_flags(mut self, flags: KeyEventFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Builder-style keymap override.
    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.keymap = keymap;
        self
    }

    /// Builder-style repeat-count override.
    pub fn with_repeat(mut self, repeat_count: u32) -> Self {
        self.repeat_count = repeat_count;
        self
    }
}

bitflags! {
    /// Edge/axis anchoring for a panel's window placement.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct Gravity: u8 {
        /// Anchor to the left edge.
        const LEFT = 1 << 0;
        /// Anchor to the top edge.
        const TOP = 1 << 1;
        /// Anchor to the right edge.
        const RIGHT = 1 << 2;
        /// Anchor to the bottom edge.
        const BOTTOM = 1 << 3;
        /// Center along the horizontal axis.
        const CENTER_HORIZONTAL = 1 << 4;
    }
}

impl Gravity {
    /// The default panel placement: bottom edge, horizontally centered.
    pub fn panel_default() -> Self {
        Self::BOTTOM | Self::CENTER_HORIZONTAL
    }
}

/// Opaque identifier for a host-side resource (drawable, animation style).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ResourceId(pub u32);

/// A single layout dimension request.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Dimension {
    /// Size to content.
    WrapContent,
    /// Fill the parent.
    MatchParent,
    /// An exact size in the host's units.
    Exact(f64),
}

/// Width/height request for a child view.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LayoutParams {
    /// Requested width.
    pub width: Dimension,
    /// Requested height.
    pub height: Dimension,
}

impl LayoutParams {
    /// Wrap-content in both dimensions.
    pub fn wrap_content() -> Self {
        Self {
            width: Dimension::WrapContent,
            height: Dimension::WrapContent,
        }
    }
}

impl Default for LayoutParams {
    fn default() -> Self {
        Self::wrap_content()
    }
}

/// Window-level placement for an attached panel decor.
///
/// Produced by the coordinator when a panel opens; consumed by
/// [`PanelChrome::attach_panel`](crate::host::PanelChrome::attach_panel).
/// Panels are always attached as translucent, non-IME-focusable application
/// sub-panels.
#[derive(Clone, Debug, PartialEq)]
pub struct PanelLayout {
    /// Requested width.
    pub width: Dimension,
    /// Requested height.
    pub height: Dimension,
    /// Offset from the gravity anchor.
    pub position: Point,
    /// Edge/axis anchoring.
    pub gravity: Gravity,
    /// Optional window-animation style resource.
    pub window_animations: Option<ResourceId>,
    /// Panels draw over a translucent window format.
    pub translucent: bool,
    /// Panels never take IME focus.
    pub ime_focusable: bool,
}

/// Rough screen-size bucket, as the platform configuration reports it.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum ScreenSize {
    /// Small handset.
    Small,
    /// Typical handset.
    Normal,
    /// Large tablet-ish.
    Large,
    /// Extra-large.
    XLarge,
}

bitflags! {
    /// Window features a host may request before the decor is installed.
    #[derive(Copy, Clone, Debug, PartialEq, Eq)]
    pub struct RequestedFeatures: u8 {
        /// The emulated options panel.
        const OPTIONS_PANEL = 1 << 0;
        /// The app-compat action bar.
        const ACTION_BAR = 1 << 1;
    }
}

impl FeatureId {
    /// The requested-features bit for this feature.
    pub fn feature_bit(self) -> RequestedFeatures {
        match self {
            Self::OptionsPanel => RequestedFeatures::OPTIONS_PANEL,
            Self::ActionBar => RequestedFeatures::ACTION_BAR,
        }
    }
}

/// Environment facts the coordinator needs but cannot discover itself.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct WindowConfig {
    /// The device carries a permanent hardware MENU key.
    pub has_permanent_menu_key: bool,
    /// Screen-size bucket of the current configuration.
    pub screen_size: ScreenSize,
    /// The hosting app targets a release that predates the action bar and
    /// still expects menu-key panels.
    pub legacy_menu_target: bool,
    /// A toolbar-hosted action bar owns the options menu outright; even a
    /// host-supplied panel view is ignored to avoid duplicate menus.
    pub toolbar_hosted_action_bar: bool,
}

impl WindowConfig {
    /// Legacy-targeting apps on extra-large screens don't get an emulated
    /// options panel; they are expected to use an action bar.
    pub fn suppresses_legacy_options_panel(&self) -> bool {
        self.legacy_menu_target && self.screen_size == ScreenSize::XLarge
    }
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            has_permanent_menu_key: false,
            screen_size: ScreenSize::Normal,
            legacy_menu_target: false,
            toolbar_hosted_action_bar: false,
        }
    }
}
