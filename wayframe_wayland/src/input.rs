// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Seat, pointer and keyboard handling.
//!
//! Events are translated into [`PointerEvent`] / [`KeyboardEvent`] and routed
//! by the core [`InputRouter`](wayframe_core::input::InputRouter); this
//! module only executes the resulting [`InputAction`].

use wayframe_core::input::{DeviceChange, InputAction, KeyboardEvent, PointerEvent, reconcile};
use wayland_client::protocol::wl_compositor::WlCompositor;
use wayland_client::protocol::wl_keyboard::{self, KeyState, WlKeyboard};
use wayland_client::protocol::wl_pointer::{self, ButtonState, WlPointer};
use wayland_client::protocol::wl_seat::{self, Capability, WlSeat};
use wayland_client::protocol::wl_shm::WlShm;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::{Connection, Dispatch, QueueHandle, WEnum};
use wayland_cursor::CursorTheme;

use crate::state::PlatformState;

/// Theme size, in pixels.
const CURSOR_SIZE: u32 = 32;
/// The theme's default pointer.
const CURSOR_NAME: &str = "left_ptr";

/// Default cursor drawn on its own surface.
#[derive(Debug)]
pub(crate) struct Cursor {
    theme: CursorTheme,
    surface: Option<WlSurface>,
}

impl Cursor {
    /// Loads the default theme; a failure only costs the themed cursor.
    pub(crate) fn load(conn: &Connection, shm: WlShm) -> Option<Self> {
        match CursorTheme::load(conn, shm, CURSOR_SIZE) {
            Ok(theme) => Some(Self {
                theme,
                surface: None,
            }),
            Err(err) => {
                tracing::warn!(%err, "loading the cursor theme failed");
                None
            }
        }
    }

    fn show(
        &mut self,
        pointer: &WlPointer,
        serial: u32,
        compositor: &WlCompositor,
        qh: &QueueHandle<PlatformState>,
    ) {
        let Some(cursor) = self.theme.get_cursor(CURSOR_NAME) else {
            tracing::warn!(name = CURSOR_NAME, "cursor missing from theme");
            return;
        };
        let image = &cursor[0];
        let (width, height) = image.dimensions();
        let (hotspot_x, hotspot_y) = image.hotspot();

        let surface = self
            .surface
            .get_or_insert_with(|| compositor.create_surface(qh, ()));
        surface.attach(Some(&**image), 0, 0);
        surface.damage(0, 0, to_i32(width), to_i32(height));
        surface.commit();
        pointer.set_cursor(serial, Some(&*surface), to_i32(hotspot_x), to_i32(hotspot_y));
    }
}

impl Drop for Cursor {
    fn drop(&mut self) {
        if let Some(surface) = self.surface.take() {
            surface.destroy();
        }
    }
}

fn to_i32(value: u32) -> i32 {
    i32::try_from(value).unwrap_or(i32::MAX)
}

impl PlatformState {
    fn apply(
        &mut self,
        action: InputAction,
        pointer: Option<&WlPointer>,
        conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        tracing::debug!(?action, "input action");
        match action {
            InputAction::ShowCursor { serial } => {
                if let (Some(cursor), Some(pointer), Some(compositor)) =
                    (self.cursor.as_mut(), pointer, self.proxies.compositor.as_ref())
                {
                    cursor.show(pointer, serial, compositor, qh);
                }
            }
            InputAction::HideCursor { serial } => {
                if let Some(pointer) = pointer {
                    pointer.set_cursor(serial, None, 0, 0);
                }
            }
            InputAction::BeginMove { serial } => {
                if let (Some(window), Some(seat)) = (self.window.as_ref(), self.proxies.seat.as_ref())
                {
                    window.begin_move(seat, serial);
                }
            }
            InputAction::ToggleFullscreen => {
                if let Some(window) = self.window.as_mut() {
                    window.toggle_fullscreen(conn, qh);
                }
            }
            InputAction::Quit => self.token.request_stop(),
        }
    }
}

fn pointer_event(event: wl_pointer::Event) -> Option<PointerEvent> {
    Some(match event {
        wl_pointer::Event::Enter { serial, .. } => PointerEvent::Enter { serial },
        wl_pointer::Event::Leave { .. } => PointerEvent::Leave,
        wl_pointer::Event::Motion { .. } => PointerEvent::Motion,
        wl_pointer::Event::Button {
            serial,
            button,
            state,
            ..
        } => PointerEvent::Button {
            serial,
            button,
            pressed: state == WEnum::Value(ButtonState::Pressed),
        },
        wl_pointer::Event::Axis { .. } => PointerEvent::Axis,
        _ => return None,
    })
}

fn keyboard_event(event: wl_keyboard::Event) -> Option<KeyboardEvent> {
    Some(match event {
        // Dropping the event closes the keymap fd.
        wl_keyboard::Event::Keymap { .. } => KeyboardEvent::Keymap,
        wl_keyboard::Event::Enter { .. } => KeyboardEvent::Enter,
        wl_keyboard::Event::Leave { .. } => KeyboardEvent::Leave,
        wl_keyboard::Event::Key { key, state, .. } => KeyboardEvent::Key {
            key,
            pressed: state == WEnum::Value(KeyState::Pressed),
        },
        wl_keyboard::Event::Modifiers { .. } => KeyboardEvent::Modifiers,
        _ => return None,
    })
}

impl Dispatch<WlSeat, ()> for PlatformState {
    fn event(
        state: &mut Self,
        seat: &WlSeat,
        event: wl_seat::Event,
        _: &(),
        _: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let wl_seat::Event::Capabilities {
            capabilities: WEnum::Value(capabilities),
        } = event
        else {
            return;
        };

        let devices = &mut state.devices;
        match reconcile(
            devices.pointer.is_some(),
            capabilities.contains(Capability::Pointer),
        ) {
            DeviceChange::Attach => devices.pointer = Some(seat.get_pointer(qh, ())),
            DeviceChange::Detach => devices.release_pointer(),
            DeviceChange::Keep => {}
        }
        match reconcile(
            devices.keyboard.is_some(),
            capabilities.contains(Capability::Keyboard),
        ) {
            DeviceChange::Attach => devices.keyboard = Some(seat.get_keyboard(qh, ())),
            DeviceChange::Detach => devices.release_keyboard(),
            DeviceChange::Keep => {}
        }
        tracing::debug!(
            pointer = devices.pointer.is_some(),
            keyboard = devices.keyboard.is_some(),
            "seat capabilities reconciled"
        );
    }
}

impl Dispatch<WlPointer, ()> for PlatformState {
    fn event(
        state: &mut Self,
        pointer: &WlPointer,
        event: wl_pointer::Event,
        _: &(),
        conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let Some(event) = pointer_event(event) else {
            return;
        };
        if let Some(action) = state.router.pointer(event, state.is_fullscreen()) {
            state.apply(action, Some(pointer), conn, qh);
        }
    }
}

impl Dispatch<WlKeyboard, ()> for PlatformState {
    fn event(
        state: &mut Self,
        _: &WlKeyboard,
        event: wl_keyboard::Event,
        _: &(),
        conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let Some(event) = keyboard_event(event) else {
            return;
        };
        if let Some(action) = state.router.keyboard(event) {
            state.apply(action, None, conn, qh);
        }
    }
}
