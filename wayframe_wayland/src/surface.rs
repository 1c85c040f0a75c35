// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The accelerated window: xdg-shell objects, the EGL drawable, and the
//! glue that drives [`SurfaceState`] from compositor events.
//!
//! # Configure sequence
//!
//! ```text
//!   xdg_toplevel.configure(w, h, states) ──► SurfaceState::on_toplevel_configure
//!   xdg_surface.configure(serial)        ──► ack_configure(serial)
//!                                            SurfaceState::on_ack
//!   wl_callback.done (sync)              ──► SurfaceState::on_configure_sync
//!   wl_callback.done (frame)             ──► SurfaceState::on_frame_done
//! ```

#![expect(unsafe_code, reason = "glow's GL calls are unsafe")]

use glow::HasContext;
use wayframe_core::config::WindowConfig;
use wayframe_core::geometry::Size;
use wayframe_core::surface::{Configure, FrameInfo, SurfaceRequests, SurfaceState};
use wayland_client::protocol::wl_callback::{self, WlCallback};
use wayland_client::protocol::wl_compositor::WlCompositor;
use wayland_client::protocol::wl_seat::WlSeat;
use wayland_client::protocol::wl_surface::WlSurface;
use wayland_client::{Connection, Dispatch, QueueHandle};
use wayland_protocols::xdg::shell::client::xdg_surface::{self, XdgSurface};
use wayland_protocols::xdg::shell::client::xdg_toplevel::{self, XdgToplevel};
use wayland_protocols::xdg::shell::client::xdg_wm_base::XdgWmBase;

use crate::egl::{GraphicsContext, WindowSurface};
use crate::error::PlatformError;
use crate::program::{DrawFn, FrameContext, Program};
use crate::state::PlatformState;
use crate::time::FrameClock;

/// What a `wl_callback` was requested for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CallbackKind {
    /// `wl_surface.frame`: the compositor is ready for the next frame.
    Frame,
    /// `wl_display.sync` issued after a fullscreen/windowed request.
    ConfigureSync,
}

/// `wl_surface` with its xdg-shell role objects.
///
/// Dropping destroys the shell handles, then the surface.
#[derive(Debug)]
pub(crate) struct ShellSurface {
    surface: WlSurface,
    xdg_surface: XdgSurface,
    toplevel: XdgToplevel,
}

impl ShellSurface {
    fn new(
        compositor: &WlCompositor,
        wm_base: &XdgWmBase,
        config: &WindowConfig,
        qh: &QueueHandle<PlatformState>,
    ) -> Self {
        let surface = compositor.create_surface(qh, ());
        let xdg_surface = wm_base.get_xdg_surface(&surface, qh, ());
        let toplevel = xdg_surface.get_toplevel(qh, ());
        toplevel.set_title(config.title.clone());
        toplevel.set_app_id(config.app_id.clone());
        Self {
            surface,
            xdg_surface,
            toplevel,
        }
    }
}

impl Drop for ShellSurface {
    fn drop(&mut self) {
        self.toplevel.destroy();
        self.xdg_surface.destroy();
        self.surface.destroy();
    }
}

/// The single on-screen window.
pub(crate) struct Window {
    // Field order is teardown order: the EGL drawable goes before the
    // Wayland surface it renders into. The program is deleted in `drop`,
    // ahead of both.
    drawable: WindowSurface,
    shell: ShellSurface,
    compositor: WlCompositor,
    state: SurfaceState,
    program: Program,
    draw: Box<DrawFn>,
    clock: FrameClock,
}

impl std::fmt::Debug for Window {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Window")
            .field("drawable", &self.drawable)
            .field("shell", &self.shell)
            .field("state", &self.state)
            .field("program", &self.program)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl Window {
    /// Creates the shell surface and its drawable.
    ///
    /// The context is current on the drawable afterwards.
    pub(crate) fn create_natives(
        graphics: &GraphicsContext,
        compositor: &WlCompositor,
        wm_base: &XdgWmBase,
        config: &WindowConfig,
        size: Size,
        qh: &QueueHandle<PlatformState>,
    ) -> Result<(ShellSurface, WindowSurface), PlatformError> {
        let shell = ShellSurface::new(compositor, wm_base, config, qh);
        let drawable = graphics.create_window_surface(&shell.surface, size)?;
        Ok((shell, drawable))
    }

    /// Assembles the window and issues the initial state request.
    pub(crate) fn start(
        (shell, drawable): (ShellSurface, WindowSurface),
        compositor: WlCompositor,
        program: Program,
        draw: Box<DrawFn>,
        config: &WindowConfig,
        conn: &Connection,
        qh: &QueueHandle<PlatformState>,
    ) -> Self {
        let size = config.size();
        let mut window = Self {
            drawable,
            shell,
            compositor,
            state: SurfaceState::new(size, config.fullscreen, config.opaque),
            program,
            draw,
            clock: FrameClock::start(),
        };
        // Initial bufferless commit; the compositor answers with a configure.
        window.shell.surface.commit();
        window.drive(conn, qh, |state, io| state.start(io));
        window
    }

    pub(crate) fn surface_state(&self) -> &SurfaceState {
        &self.state
    }

    pub(crate) fn begin_move(&self, seat: &WlSeat, serial: u32) {
        self.shell.toplevel._move(seat, serial);
    }

    pub(crate) fn toggle_fullscreen(&mut self, conn: &Connection, qh: &QueueHandle<PlatformState>) {
        self.drive(conn, qh, |state, io| state.toggle_fullscreen(io));
    }

    fn drive<R>(
        &mut self,
        conn: &Connection,
        qh: &QueueHandle<PlatformState>,
        f: impl FnOnce(&mut SurfaceState, &mut SurfaceIo<'_>) -> R,
    ) -> R {
        let Self {
            drawable,
            shell,
            compositor,
            state,
            program,
            draw,
            clock,
            ..
        } = self;
        let mut io = SurfaceIo {
            drawable,
            shell,
            compositor,
            program,
            draw: &mut **draw,
            clock,
            conn,
            qh,
        };
        f(state, &mut io)
    }

    fn on_surface_configure(&mut self, serial: u32, conn: &Connection, qh: &QueueHandle<PlatformState>) {
        self.shell.xdg_surface.ack_configure(serial);
        self.drive(conn, qh, |state, io| state.on_ack(io));
    }

    fn on_callback(
        &mut self,
        kind: CallbackKind,
        time_ms: u32,
        conn: &Connection,
        qh: &QueueHandle<PlatformState>,
    ) {
        match kind {
            CallbackKind::ConfigureSync => {
                self.drive(conn, qh, |state, io| state.on_configure_sync(time_ms, io));
            }
            CallbackKind::Frame => {
                self.drive(conn, qh, |state, io| state.on_frame_done(time_ms, io));
            }
        }
    }
}

/// Whether a toplevel configure's `states` array contains `fullscreen`.
///
/// The array holds native-endian `u32` values; unknown states are skipped.
fn describes_fullscreen(states: &[u8]) -> bool {
    states
        .chunks_exact(4)
        .filter_map(|raw| raw.try_into().ok().map(u32::from_ne_bytes))
        .any(|raw| matches!(xdg_toplevel::State::try_from(raw), Ok(xdg_toplevel::State::Fullscreen)))
}

impl Drop for Window {
    fn drop(&mut self) {
        // Runs before the fields drop, while the context is still current on
        // the drawable.
        // SAFETY: the program was linked on this context.
        unsafe { self.drawable.gl().delete_program(self.program.raw()) };
        tracing::debug!("shader program deleted");
    }
}

/// [`SurfaceRequests`] against the live compositor and EGL.
struct SurfaceIo<'a> {
    drawable: &'a WindowSurface,
    shell: &'a ShellSurface,
    compositor: &'a WlCompositor,
    program: &'a mut Program,
    draw: &'a mut DrawFn,
    clock: &'a FrameClock,
    conn: &'a Connection,
    qh: &'a QueueHandle<PlatformState>,
}

impl SurfaceRequests for SurfaceIo<'_> {
    fn resize_drawable(&mut self, size: Size) {
        self.drawable.resize(size);
    }

    fn set_fullscreen(&mut self) {
        self.shell.toplevel.set_fullscreen(None);
    }

    fn set_windowed(&mut self) {
        self.shell.toplevel.unset_fullscreen();
    }

    fn request_configure_sync(&mut self) {
        self.conn.display().sync(self.qh, CallbackKind::ConfigureSync);
    }

    fn render(&mut self, frame: FrameInfo) {
        let gl = self.drawable.gl();
        let Size { width, height } = frame.geometry;
        // SAFETY: the context is current on this window's drawable.
        unsafe {
            gl.viewport(0, 0, width, height);
            gl.use_program(Some(self.program.raw()));
        }
        let mut ctx = FrameContext::new(gl, self.program, frame, self.clock.elapsed());
        (self.draw)(&mut ctx);
    }

    fn set_opaque_region(&mut self, region: Option<Size>) {
        let surface = &self.shell.surface;
        match region {
            Some(Size { width, height }) => {
                let region = self.compositor.create_region(self.qh, ());
                region.add(0, 0, width, height);
                surface.set_opaque_region(Some(&region));
                region.destroy();
            }
            None => surface.set_opaque_region(None),
        }
    }

    fn request_frame(&mut self) {
        self.shell.surface.frame(self.qh, CallbackKind::Frame);
    }

    fn swap_buffers(&mut self) {
        if let Err(err) = self.drawable.swap_buffers() {
            tracing::warn!(%err, "eglSwapBuffers failed");
        }
    }
}

impl Dispatch<WlCallback, CallbackKind> for PlatformState {
    fn event(
        state: &mut Self,
        _: &WlCallback,
        event: wl_callback::Event,
        kind: &CallbackKind,
        conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let wl_callback::Event::Done { callback_data } = event else {
            return;
        };
        if let Some(window) = state.window.as_mut() {
            window.on_callback(*kind, callback_data, conn, qh);
        }
    }
}

impl Dispatch<XdgSurface, ()> for PlatformState {
    fn event(
        state: &mut Self,
        xdg_surface: &XdgSurface,
        event: xdg_surface::Event,
        _: &(),
        conn: &Connection,
        qh: &QueueHandle<Self>,
    ) {
        let xdg_surface::Event::Configure { serial } = event else {
            return;
        };
        match state.window.as_mut() {
            Some(window) => window.on_surface_configure(serial, conn, qh),
            None => xdg_surface.ack_configure(serial),
        }
    }
}

impl Dispatch<XdgToplevel, ()> for PlatformState {
    fn event(
        state: &mut Self,
        _: &XdgToplevel,
        event: xdg_toplevel::Event,
        _: &(),
        _: &Connection,
        _: &QueueHandle<Self>,
    ) {
        match event {
            xdg_toplevel::Event::Configure {
                width,
                height,
                states,
            } => {
                let configure = Configure {
                    size: Size::new(width, height),
                    fullscreen: describes_fullscreen(&states),
                };
                tracing::debug!(?configure, "toplevel configure");
                if let Some(window) = state.window.as_mut() {
                    window.state.on_toplevel_configure(configure);
                }
            }
            xdg_toplevel::Event::Close => {
                tracing::info!("compositor asked the window to close");
                state.token.request_stop();
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use wayland_protocols::xdg::shell::client::xdg_toplevel::State;

    use super::describes_fullscreen;

    fn encode(states: &[u32]) -> Vec<u8> {
        states.iter().flat_map(|state| state.to_ne_bytes()).collect()
    }

    #[test]
    fn fullscreen_state_is_found_among_others() {
        let states = encode(&[u32::from(State::Activated), u32::from(State::Fullscreen)]);
        assert!(describes_fullscreen(&states));
    }

    #[test]
    fn windowed_and_unknown_states_are_not_fullscreen() {
        assert!(!describes_fullscreen(&[]));
        assert!(!describes_fullscreen(&encode(&[u32::from(State::Maximized), 0xffff])));
        // A truncated trailing value is ignored.
        let mut states = encode(&[u32::from(State::Activated)]);
        states.extend_from_slice(&[2, 0]);
        assert!(!describes_fullscreen(&states));
    }
}
