// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Compositor connection and event-queue ownership.
//!
//! The platform owns one `EventQueue<PlatformState>`. Every object that takes
//! part in event delivery is created with its [`QueueHandle`]:
//!
//! | Object | Created by | User data |
//! |---|---|---|
//! | `wl_registry` | [`CompositorConnection::discover_globals`] | `()` |
//! | `wl_compositor`, `xdg_wm_base`, `wl_seat`, `wl_shm` | registry binding | `()` |
//! | `wl_surface`, `xdg_surface`, `xdg_toplevel` | window creation | `()` |
//! | `wl_pointer`, `wl_keyboard` | seat capability events | `()` |
//! | `wl_callback` | redraw and configure sync | [`CallbackKind`](crate::CallbackKind) |
//!
//! Using another queue handle causes silent non-delivery of events.

use std::ffi::c_void;

use wayland_client::backend::WaylandError;
use wayland_client::{Connection, DispatchError, EventQueue, QueueHandle};

use crate::error::PlatformError;
use crate::state::PlatformState;

/// The transport to the compositor plus the platform's event queue.
#[derive(Debug)]
pub struct CompositorConnection {
    connection: Connection,
    event_queue: EventQueue<PlatformState>,
}

impl CompositorConnection {
    /// Connects to the compositor named by the environment
    /// (`WAYLAND_DISPLAY` / `WAYLAND_SOCKET`).
    ///
    /// # Errors
    ///
    /// Returns [`PlatformError::Connect`] if the compositor is unreachable.
    pub fn connect() -> Result<Self, PlatformError> {
        let connection = Connection::connect_to_env()?;
        tracing::info!("connected to the Wayland compositor");
        Ok(Self {
            event_queue: connection.new_event_queue(),
            connection,
        })
    }

    /// The underlying connection.
    #[must_use]
    pub fn connection(&self) -> &Connection {
        &self.connection
    }

    /// Handle that all platform objects must be created with.
    #[must_use]
    pub fn queue_handle(&self) -> QueueHandle<PlatformState> {
        self.event_queue.handle()
    }

    /// Lists the registry and binds every global of interest in one blocking
    /// round-trip.
    pub(crate) fn discover_globals(&mut self, state: &mut PlatformState) -> Result<(), PlatformError> {
        let qh = self.queue_handle();
        state.proxies.registry = Some(self.connection.display().get_registry(&qh, ()));
        self.event_queue.roundtrip(state)?;

        if let Some(kind) = state.globals.missing_required().next() {
            return Err(PlatformError::MissingGlobal(kind.interface()));
        }
        if state.proxies.seat.is_none() {
            tracing::warn!("no wl_seat advertised; input is disabled");
        }
        if state.proxies.shm.is_none() {
            tracing::warn!("no wl_shm advertised; the cursor is not themed");
        }
        Ok(())
    }

    /// Flushes requests, blocks until events arrive, and dispatches them.
    ///
    /// This is the run loop's only suspension point.
    pub fn dispatch(&mut self, state: &mut PlatformState) -> Result<usize, DispatchError> {
        self.event_queue.blocking_dispatch(state)
    }

    /// Flushes pending outgoing requests to the socket.
    pub fn flush(&self) -> Result<(), WaylandError> {
        self.event_queue.flush()
    }

    /// `wl_display` pointer for EGL.
    pub(crate) fn display_ptr(&self) -> *mut c_void {
        self.connection.backend().display_ptr().cast()
    }
}
