// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Dispatch state shared by every event handler.

use wayframe_core::globals::{GlobalKind, GlobalTable};
use wayframe_core::input::InputRouter;
use wayframe_core::run::RunToken;
use wayland_client::protocol::wl_compositor::WlCompositor;
use wayland_client::protocol::wl_keyboard::WlKeyboard;
use wayland_client::protocol::wl_pointer::WlPointer;
use wayland_client::protocol::wl_region::WlRegion;
use wayland_client::protocol::wl_registry::{self, WlRegistry};
use wayland_client::protocol::wl_seat::WlSeat;
use wayland_client::protocol::wl_shm::WlShm;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::{Connection, Dispatch, Proxy, QueueHandle, delegate_noop};
use wayland_protocols::xdg::shell::client::xdg_wm_base::{self, XdgWmBase};

use crate::input::Cursor;
use crate::surface::Window;

/// Bound global proxies.
#[derive(Debug, Default)]
pub(crate) struct Proxies {
    pub(crate) registry: Option<WlRegistry>,
    pub(crate) compositor: Option<WlCompositor>,
    pub(crate) wm_base: Option<XdgWmBase>,
    pub(crate) seat: Option<WlSeat>,
    pub(crate) shm: Option<WlShm>,
}

impl Proxies {
    fn destroy(&mut self) {
        if let Some(wm_base) = self.wm_base.take() {
            wm_base.destroy();
        }
        if let Some(seat) = self.seat.take()
            && seat.version() >= 5
        {
            seat.release();
        }
        self.compositor = None;
        self.shm = None;
        self.registry = None;
    }
}

/// Input devices created from seat capabilities.
#[derive(Debug, Default)]
pub(crate) struct Devices {
    pub(crate) pointer: Option<WlPointer>,
    pub(crate) keyboard: Option<WlKeyboard>,
}

impl Devices {
    pub(crate) fn release_pointer(&mut self) {
        if let Some(pointer) = self.pointer.take()
            && pointer.version() >= 3
        {
            pointer.release();
        }
    }

    pub(crate) fn release_keyboard(&mut self) {
        if let Some(keyboard) = self.keyboard.take()
            && keyboard.version() >= 3
        {
            keyboard.release();
        }
    }
}

/// State threaded through every Wayland event handler.
///
/// Owned by [`Platform`](crate::Platform); it is only public so that
/// [`CompositorConnection`](crate::CompositorConnection) can name its queue.
#[derive(Debug)]
pub struct PlatformState {
    // Field order is teardown order.
    pub(crate) window: Option<Window>,
    pub(crate) cursor: Option<Cursor>,
    pub(crate) devices: Devices,
    pub(crate) proxies: Proxies,
    pub(crate) globals: GlobalTable,
    pub(crate) router: InputRouter,
    pub(crate) token: RunToken,
}

impl PlatformState {
    pub(crate) fn new(router: InputRouter, token: RunToken) -> Self {
        Self {
            window: None,
            cursor: None,
            devices: Devices::default(),
            proxies: Proxies::default(),
            globals: GlobalTable::new(),
            router,
            token,
        }
    }

    /// Whether the window currently asks to be fullscreen.
    pub(crate) fn is_fullscreen(&self) -> bool {
        self.window
            .as_ref()
            .is_some_and(|window| window.surface_state().is_fullscreen())
    }

    /// Releases every protocol object, window first.
    pub(crate) fn release(&mut self) {
        if self.window.take().is_some() {
            tracing::debug!("window destroyed");
        }
        self.cursor = None;
        self.devices.release_pointer();
        self.devices.release_keyboard();
        self.proxies.destroy();
    }

    fn bind(
        &mut self,
        registry: &WlRegistry,
        name: u32,
        interface: &str,
        version: u32,
        conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let Some(entry) = self.globals.advertise(name, interface, version) else {
            return;
        };
        tracing::debug!(interface, name, version = entry.version, "binding global");

        let proxies = &mut self.proxies;
        match entry.kind {
            GlobalKind::Compositor => {
                proxies.compositor = Some(registry.bind(name, entry.version, qh, ()));
            }
            GlobalKind::WmBase => {
                proxies.wm_base = Some(registry.bind(name, entry.version, qh, ()));
            }
            GlobalKind::Seat => {
                proxies.seat = Some(registry.bind(name, entry.version, qh, ()));
            }
            GlobalKind::Shm => {
                let shm: WlShm = registry.bind(name, entry.version, qh, ());
                self.cursor = Cursor::load(conn, shm.clone());
                proxies.shm = Some(shm);
            }
        }
    }
}

impl Dispatch<WlRegistry, ()> for PlatformState {
    fn event(
        state: &mut Self,
        registry: &WlRegistry,
        event: wl_registry::Event,
        _: &(),
        conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        match event {
            wl_registry::Event::Global {
                name,
                interface,
                version,
            } => state.bind(registry, name, &interface, version, conn, qh),
            wl_registry::Event::GlobalRemove { name } => {
                state.globals.note_removed(name);
            }
            _ => {}
        }
    }
}

impl Dispatch<XdgWmBase, ()> for PlatformState {
    fn event(
        _: &mut Self,
        wm_base: &XdgWmBase,
        event: xdg_wm_base::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        if let xdg_wm_base::Event::Ping { serial } = event {
            wm_base.pong(serial);
        }
    }
}

delegate_noop!(PlatformState: WlCompositor);
delegate_noop!(PlatformState: WlRegion);
delegate_noop!(PlatformState: ignore WlShm);
delegate_noop!(PlatformState: ignore WlSurface);
