// Copyright 2026 the Wayframe Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The process-wide platform facade.
//!
//! ```text
//!   Platform::initialize ── connect ─► discover globals ─► SIGINT ─► EGL
//!   Platform::create_window ── program ─► shell surface ─► drawable
//!   Platform::run ── blocking dispatch until a stop is requested
//!   Platform::terminate ── window, devices, globals, EGL, connection
//! ```
//!
//! Teardown is the reverse of acquisition and runs on drop as well, so an
//! early return between `initialize` and `terminate` releases the same way.

use std::sync::atomic::{AtomicBool, Ordering};

use wayframe_core::config::WindowConfig;
use wayframe_core::globals::GlobalKind;
use wayframe_core::input::InputRouter;
use wayframe_core::run::{RunOutcome, RunToken, run_until_stopped};
use wayframe_core::window::{WindowError, prepare_window};
use wayland_client::DispatchError;

use crate::connection::CompositorConnection;
use crate::egl::GraphicsContext;
use crate::error::PlatformError;
use crate::program::{FrameContext, GlesCompiler};
use crate::signal::install_interrupt_handler;
use crate::state::PlatformState;
use crate::surface::Window;

static INSTANCE_LIVE: AtomicBool = AtomicBool::new(false);

/// Marks the single live platform; releasing it allows a new one.
#[derive(Debug)]
struct InstanceClaim(());

impl InstanceClaim {
    fn acquire() -> Result<Self, PlatformError> {
        INSTANCE_LIVE
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(()))
            .map_err(|_| PlatformError::AlreadyInitialized)
    }
}

impl Drop for InstanceClaim {
    fn drop(&mut self) {
        INSTANCE_LIVE.store(false, Ordering::Release);
    }
}

/// Connection, rendering context and window, owned together.
///
/// At most one exists per process.
#[derive(Debug)]
pub struct Platform {
    // Field order is teardown order.
    state: PlatformState,
    graphics: GraphicsContext,
    connection: CompositorConnection,
    config: WindowConfig,
    _claim: InstanceClaim,
}

impl Platform {
    /// Connects to the compositor, discovers its globals, installs the
    /// interrupt handler and acquires the rendering context.
    ///
    /// # Errors
    ///
    /// Every error is fatal: invalid `config`, a second instance, an
    /// unreachable compositor, a missing required global, or an EGL failure.
    pub fn initialize(config: WindowConfig) -> Result<Self, PlatformError> {
        config.validate()?;
        let claim = InstanceClaim::acquire()?;

        let mut connection = CompositorConnection::connect()?;
        let token = RunToken::new();
        let mut state = PlatformState::new(InputRouter::new(config.key_bindings), token.clone());
        connection.discover_globals(&mut state)?;

        install_interrupt_handler(&token).map_err(PlatformError::Signal)?;
        let graphics = GraphicsContext::acquire(connection.display_ptr(), config.opaque)?;
        tracing::info!(size = ?config.size(), fullscreen = config.fullscreen, "platform initialized");

        Ok(Self {
            state,
            graphics,
            connection,
            config,
            _claim: claim,
        })
    }

    /// Token that stops [`run`](Self::run) once a stop is requested.
    #[must_use]
    pub fn run_token(&self) -> RunToken {
        self.state.token.clone()
    }

    /// The rendering context, e.g. for resources shared across frames.
    #[must_use]
    pub fn graphics(&self) -> &GraphicsContext {
        &self.graphics
    }

    /// Builds the shader program, then creates and maps the window.
    ///
    /// `draw` runs once per redraw with the program current and the viewport
    /// set to the surface size.
    ///
    /// # Errors
    ///
    /// A shader compile or link failure returns before any surface exists.
    /// Calling this twice returns [`PlatformError::WindowExists`].
    pub fn create_window(
        &mut self,
        draw: impl FnMut(&mut FrameContext<'_>) + 'static,
    ) -> Result<(), PlatformError> {
        if self.state.window.is_some() {
            return Err(PlatformError::WindowExists);
        }
        let proxies = &self.state.proxies;
        let compositor = proxies
            .compositor
            .clone()
            .ok_or(PlatformError::MissingGlobal(GlobalKind::Compositor.interface()))?;
        let wm_base = proxies
            .wm_base
            .clone()
            .ok_or(PlatformError::MissingGlobal(GlobalKind::WmBase.interface()))?;

        let qh = self.connection.queue_handle();
        let graphics = &self.graphics;
        let config = &self.config;
        let mut compiler = GlesCompiler::new(graphics.gl());
        let (program, natives) = prepare_window(&mut compiler, config, |size| {
            Window::create_natives(graphics, &compositor, &wm_base, config, size, &qh)
        })
        .map_err(|err| match err {
            WindowError::Program(err) => PlatformError::Program(err),
            WindowError::Surface(err) => err,
        })?;
        tracing::info!("shader program linked, window created");

        let window = Window::start(
            natives,
            compositor,
            program,
            Box::new(draw),
            config,
            self.connection.connection(),
            &qh,
        );
        self.state.window = Some(window);
        self.flush();
        Ok(())
    }

    /// Dispatches compositor events until the run token requests a stop or the
    /// connection fails.
    pub fn run(&mut self) -> RunOutcome<DispatchError> {
        let token = self.state.token.clone();
        let Self {
            state, connection, ..
        } = self;
        let outcome = run_until_stopped(&token, || connection.dispatch(state));
        match &outcome {
            RunOutcome::Stopped => tracing::info!("run loop stopped"),
            RunOutcome::Disconnected(err) => tracing::error!(%err, "compositor connection lost"),
        }
        outcome
    }

    /// Releases every resource in reverse acquisition order.
    ///
    /// Equivalent to dropping the platform.
    pub fn terminate(self) {
        drop(self);
    }

    fn flush(&self) {
        if let Err(err) = self.connection.flush() {
            tracing::warn!(%err, "flushing requests failed");
        }
    }
}

impl Drop for Platform {
    fn drop(&mut self) {
        self.state.release();
        self.flush();
        tracing::info!("platform terminated");
    }
}
