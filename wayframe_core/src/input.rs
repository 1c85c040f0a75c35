// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Routing of seat input to window-level reactions.
//!
//! The [`InputRouter`] turns pointer and keyboard events into at most one
//! [`InputAction`] each. Only four reactions exist:
//!
//! | Event | Condition | Action |
//! |---|---|---|
//! | pointer enter | windowed | [`InputAction::ShowCursor`] |
//! | pointer enter | fullscreen | [`InputAction::HideCursor`] |
//! | button press | primary button | [`InputAction::BeginMove`] |
//! | key press | fullscreen key | [`InputAction::ToggleFullscreen`] |
//! | key press | quit key | [`InputAction::Quit`] |
//!
//! Every other event is accepted and discarded.
//!
//! Seat capability changes are reconciled per device with [`reconcile`].

/// Linux evdev code of the Escape key.
pub const KEY_ESC: u32 = 1;
/// Linux evdev code of the F11 key.
pub const KEY_F11: u32 = 87;
/// Linux evdev code of the primary (left) pointer button.
pub const BTN_LEFT: u32 = 0x110;

/// Keys bound to window-level actions.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct KeyBindings {
    /// Key that toggles fullscreen.
    pub toggle_fullscreen: u32,
    /// Key that requests the run loop to stop.
    pub quit: u32,
}

impl Default for KeyBindings {
    fn default() -> Self {
        Self {
            toggle_fullscreen: KEY_F11,
            quit: KEY_ESC,
        }
    }
}

/// Pointer events relevant to routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEvent {
    /// The pointer entered the surface.
    Enter {
        /// Serial authorizing a cursor change.
        serial: u32,
    },
    /// The pointer left the surface.
    Leave,
    /// The pointer moved.
    Motion,
    /// A button changed state.
    Button {
        /// Serial authorizing a grab.
        serial: u32,
        /// Linux evdev button code.
        button: u32,
        /// `true` on press, `false` on release.
        pressed: bool,
    },
    /// Scroll or other axis motion.
    Axis,
}

/// Keyboard events relevant to routing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum KeyboardEvent {
    /// A keymap was delivered.
    Keymap,
    /// Keyboard focus entered the surface.
    Enter,
    /// Keyboard focus left the surface.
    Leave,
    /// A key changed state.
    Key {
        /// Linux evdev key code.
        key: u32,
        /// `true` on press, `false` on release.
        pressed: bool,
    },
    /// Modifier state changed.
    Modifiers,
}

/// A window-level reaction to input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputAction {
    /// Show the theme's default cursor.
    ShowCursor {
        /// Serial of the enter event.
        serial: u32,
    },
    /// Hide the cursor.
    HideCursor {
        /// Serial of the enter event.
        serial: u32,
    },
    /// Start an interactive move of the toplevel.
    BeginMove {
        /// Serial of the button press.
        serial: u32,
    },
    /// Toggle between fullscreen and windowed.
    ToggleFullscreen,
    /// Stop the run loop.
    Quit,
}

/// Stateless mapper from input events to [`InputAction`]s.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct InputRouter {
    bindings: KeyBindings,
}

impl InputRouter {
    /// Creates a router with the given key bindings.
    #[must_use]
    pub const fn new(bindings: KeyBindings) -> Self {
        Self { bindings }
    }

    /// Returns the active key bindings.
    #[must_use]
    pub const fn bindings(&self) -> KeyBindings {
        self.bindings
    }

    /// Routes a pointer event. `fullscreen` is the surface's current flag.
    #[must_use]
    pub fn pointer(&self, event: PointerEvent, fullscreen: bool) -> Option<InputAction> {
        match event {
            PointerEvent::Enter { serial } if fullscreen => Some(InputAction::HideCursor { serial }),
            PointerEvent::Enter { serial } => Some(InputAction::ShowCursor { serial }),
            PointerEvent::Button {
                serial,
                button: BTN_LEFT,
                pressed: true,
            } => Some(InputAction::BeginMove { serial }),
            _ => None,
        }
    }

    /// Routes a keyboard event.
    #[must_use]
    pub fn keyboard(&self, event: KeyboardEvent) -> Option<InputAction> {
        match event {
            KeyboardEvent::Key { key, pressed: true } if key == self.bindings.toggle_fullscreen => {
                Some(InputAction::ToggleFullscreen)
            }
            KeyboardEvent::Key { key, pressed: true } if key == self.bindings.quit => {
                Some(InputAction::Quit)
            }
            _ => None,
        }
    }
}

/// What to do with one input device after a seat capability event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceChange {
    /// Create the device object and start listening.
    Attach,
    /// Destroy the device object.
    Detach,
    /// Already in the advertised state.
    Keep,
}

/// Reconciles one device slot with the seat's advertised capabilities.
///
/// `present` is whether the device object currently exists; `advertised` is
/// whether the seat now offers the capability.
#[must_use]
pub const fn reconcile(present: bool, advertised: bool) -> DeviceChange {
    match (present, advertised) {
        (false, true) => DeviceChange::Attach,
        (true, false) => DeviceChange::Detach,
        _ => DeviceChange::Keep,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enter_shows_cursor_when_windowed() {
        let router = InputRouter::default();
        assert_eq!(
            router.pointer(PointerEvent::Enter { serial: 4 }, false),
            Some(InputAction::ShowCursor { serial: 4 })
        );
    }

    #[test]
    fn enter_hides_cursor_when_fullscreen() {
        let router = InputRouter::default();
        assert_eq!(
            router.pointer(PointerEvent::Enter { serial: 9 }, true),
            Some(InputAction::HideCursor { serial: 9 })
        );
    }

    #[test]
    fn primary_press_begins_move_with_event_serial() {
        let router = InputRouter::default();
        let press = PointerEvent::Button {
            serial: 77,
            button: BTN_LEFT,
            pressed: true,
        };
        assert_eq!(
            router.pointer(press, false),
            Some(InputAction::BeginMove { serial: 77 })
        );
    }

    #[test]
    fn release_and_other_buttons_are_discarded() {
        let router = InputRouter::default();
        let release = PointerEvent::Button {
            serial: 1,
            button: BTN_LEFT,
            pressed: false,
        };
        let right = PointerEvent::Button {
            serial: 2,
            button: BTN_LEFT + 1,
            pressed: true,
        };
        assert_eq!(router.pointer(release, false), None);
        assert_eq!(router.pointer(right, false), None);
        assert_eq!(router.pointer(PointerEvent::Motion, false), None);
        assert_eq!(router.pointer(PointerEvent::Leave, true), None);
        assert_eq!(router.pointer(PointerEvent::Axis, false), None);
    }

    #[test]
    fn bound_keys_route_on_press_only() {
        let router = InputRouter::default();
        assert_eq!(
            router.keyboard(KeyboardEvent::Key {
                key: KEY_F11,
                pressed: true
            }),
            Some(InputAction::ToggleFullscreen)
        );
        assert_eq!(
            router.keyboard(KeyboardEvent::Key {
                key: KEY_ESC,
                pressed: true
            }),
            Some(InputAction::Quit)
        );
        assert_eq!(
            router.keyboard(KeyboardEvent::Key {
                key: KEY_ESC,
                pressed: false
            }),
            None
        );
    }

    #[test]
    fn unbound_keys_and_other_events_are_discarded() {
        let router = InputRouter::default();
        assert_eq!(
            router.keyboard(KeyboardEvent::Key {
                key: 30,
                pressed: true
            }),
            None
        );
        assert_eq!(router.keyboard(KeyboardEvent::Modifiers), None);
        assert_eq!(router.keyboard(KeyboardEvent::Keymap), None);
        assert_eq!(router.keyboard(KeyboardEvent::Enter), None);
    }

    #[test]
    fn custom_bindings_replace_defaults() {
        let router = InputRouter::new(KeyBindings {
            toggle_fullscreen: 33,
            quit: 16,
        });
        assert_eq!(
            router.keyboard(KeyboardEvent::Key {
                key: 16,
                pressed: true
            }),
            Some(InputAction::Quit)
        );
        assert_eq!(
            router.keyboard(KeyboardEvent::Key {
                key: KEY_ESC,
                pressed: true
            }),
            None
        );
    }

    #[test]
    fn reconcile_is_idempotent() {
        assert_eq!(reconcile(false, true), DeviceChange::Attach);
        assert_eq!(reconcile(true, false), DeviceChange::Detach);
        assert_eq!(reconcile(true, true), DeviceChange::Keep);
        assert_eq!(reconcile(false, false), DeviceChange::Keep);
    }
}
